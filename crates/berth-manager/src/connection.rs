//! The write half of one provider's streaming subscription.

use std::convert::Infallible;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::warn;

use berth_core::events::Event;
use berth_core::ids::StreamId;
use berth_wire::recordio;
use berth_wire::{encode_event, externalize, ContentType};

/// Chunks written to the HTTP response body.
///
/// The error type is [`Infallible`]: the manager never injects transport
/// errors, it simply stops writing when the stream is torn down.
pub type BodyChunk = Result<Bytes, Infallible>;

/// The streaming connection to one subscribed provider.
///
/// Events are serialized in the negotiated content type, record-IO framed,
/// and pushed down an unbounded in-process channel whose read half backs the
/// HTTP response body. Writes never block; a closed reader surfaces as a
/// `false` return from [`send`](Self::send).
#[derive(Debug)]
pub struct ProviderConnection {
    writer: mpsc::UnboundedSender<BodyChunk>,
    content_type: ContentType,
    stream_id: StreamId,
}

impl ProviderConnection {
    /// Create a connection and the read half for the HTTP response body.
    ///
    /// A fresh [`StreamId`] is minted per connection; it fences stale calls
    /// after a resubscribe.
    #[must_use]
    pub fn pipe(content_type: ContentType) -> (Self, mpsc::UnboundedReceiver<BodyChunk>) {
        let (writer, reader) = mpsc::unbounded_channel();
        (
            Self {
                writer,
                content_type,
                stream_id: StreamId::new(),
            },
            reader,
        )
    }

    /// The negotiated wire encoding.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// This subscription instance's stream ID.
    #[must_use]
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Serialize, frame, and write one event.
    ///
    /// Returns `false` when the connection is gone. Callers must treat the
    /// operation as failed but must not remove the session themselves; the
    /// reader-closed observer is the single removal authority.
    #[must_use]
    pub fn send(&self, event: &Event) -> bool {
        let wire = externalize(event);
        let payload = match encode_event(self.content_type, &wire) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    event_type = event.event_type(),
                    %error,
                    "failed to serialize event"
                );
                return false;
            }
        };
        self.writer
            .send(Ok(recordio::encode_record(&payload)))
            .is_ok()
    }

    /// Whether the read half has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }

    /// A future resolving once the read half is dropped.
    ///
    /// The future owns its own sender clone, so it can outlive the
    /// connection and be awaited from a watcher task.
    #[must_use]
    pub fn watch_closed(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let writer = self.writer.clone();
        async move { writer.closed().await }
    }
}
