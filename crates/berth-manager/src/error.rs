//! Manager error types.

use thiserror::Error;

use berth_core::ids::ProviderId;

/// Failure of a non-subscribe call dispatched through the manager.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallError {
    /// The call references a provider ID with no live session.
    #[error("Resource provider is not subscribed")]
    NotSubscribed,
    /// A non-subscribe call arrived without a stream ID header.
    #[error("All non-subscribe calls should include the 'Mesos-Stream-Id' header")]
    MissingStreamId,
    /// The supplied stream ID does not match the current session's.
    #[error(
        "The stream ID '{given}' included in this request didn't match the stream ID \
         currently associated with resource provider ID {provider_id}"
    )]
    StaleStreamId {
        /// The stream ID the caller presented.
        given: String,
        /// The provider whose session rejected it.
        provider_id: ProviderId,
    },
    /// The call type is not understood by this manager.
    #[error("Unexpected call type")]
    NotImplemented,
    /// The manager actor is gone.
    #[error("Resource provider manager is shutting down")]
    ShuttingDown,
}

/// Failure of a `publish_resources` operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PublishError {
    /// A resource in the request names a provider with no live session.
    #[error("Resource provider {0} is not subscribed")]
    NotSubscribed(ProviderId),
    /// Writing the publish event failed; the connection is gone.
    #[error("Failed to send PUBLISH_RESOURCES event to resource provider {0}: connection closed")]
    SendFailed(ProviderId),
    /// The session was torn down while the publish was pending.
    #[error("Failed to publish resources from resource provider {0}: connection closed")]
    ConnectionClosed(ProviderId),
    /// The provider reported a non-OK publish status.
    #[error("Failed to publish resources for resource provider {provider_id}: received {status} status")]
    Rejected {
        /// The provider that rejected the publish.
        provider_id: ProviderId,
        /// The stringified reported status.
        status: &'static str,
    },
    /// The manager actor is gone.
    #[error("Resource provider manager is shutting down")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_closed_message() {
        let err = PublishError::ConnectionClosed(ProviderId::from("p1"));
        assert!(err.to_string().contains("connection closed"));
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn rejected_message_names_status() {
        let err = PublishError::Rejected {
            provider_id: ProviderId::from("p1"),
            status: "FAILED",
        };
        assert!(err.to_string().contains("received FAILED status"));
    }

    #[test]
    fn stale_stream_id_message_names_both_ids() {
        let err = CallError::StaleStreamId {
            given: "deadbeef".into(),
            provider_id: ProviderId::from("p1"),
        };
        let text = err.to_string();
        assert!(text.contains("deadbeef"));
        assert!(text.contains("p1"));
    }

    #[test]
    fn missing_stream_id_names_header() {
        assert!(CallError::MissingStreamId
            .to_string()
            .contains("Mesos-Stream-Id"));
    }
}
