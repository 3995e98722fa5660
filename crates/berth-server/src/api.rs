//! The resource provider API endpoint.
//!
//! One `POST` endpoint carries the whole protocol: parse and validate one
//! inbound `Call`, then either open a streaming subscription or dispatch the
//! call to the provider's live session. All registry access happens on the
//! manager's actor; this module only does the stateless transport work.

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

use berth_core::calls::Call;
use berth_manager::{CallError, ProviderConnection, ResourceProviderManager};
use berth_wire::{
    decode_call, internalize, negotiate_accept, ContentType, APPLICATION_JSON,
    APPLICATION_PROTOBUF,
};

/// Header binding non-subscribe calls to the current subscription stream.
pub const STREAM_ID_HEADER: &str = "Mesos-Stream-Id";

/// Authenticated caller identity, extracted by the surrounding HTTP stack.
///
/// The manager performs no authorization; the identity is logged for
/// traceability only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Opaque principal name.
    pub value: String,
}

/// Handle one API request.
///
/// Returns `200 OK` with a streaming body for subscribes, `202 Accepted`
/// for other successful calls, and `4xx`/`5xx` per the protocol's transport
/// contract otherwise.
pub async fn api(
    manager: &ResourceProviderManager,
    headers: &HeaderMap,
    body: &[u8],
    principal: Option<&Principal>,
) -> Response {
    // Content-Type gates everything: absent is a client error, present but
    // unsupported is 415.
    let Some(content_type_header) = headers.get(header::CONTENT_TYPE) else {
        return bad_request("Expecting 'Content-Type' to be present");
    };
    let Some(content_type) = content_type_header
        .to_str()
        .ok()
        .and_then(ContentType::from_media_type)
    else {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Expecting 'Content-Type' of {APPLICATION_JSON} or {APPLICATION_PROTOBUF}"),
        )
            .into_response();
    };

    let wire_call = match decode_call(content_type, body) {
        Ok(call) => call,
        Err(parse_error) => {
            return bad_request(format!("Failed to parse body into Call: {parse_error}"));
        }
    };

    let call = match internalize(wire_call) {
        Ok(call) => call,
        Err(validation_error) => {
            return bad_request(format!("Failed to validate call: {validation_error}"));
        }
    };

    match call {
        Call::Subscribe(subscribe) => {
            let accept = headers
                .get(header::ACCEPT)
                .map(|value| value.to_str().unwrap_or(""));
            let Some(accept_type) = negotiate_accept(accept) else {
                return (
                    StatusCode::NOT_ACCEPTABLE,
                    format!(
                        "Expecting 'Accept' to allow '{APPLICATION_PROTOBUF}' or \
                         '{APPLICATION_JSON}'"
                    ),
                )
                    .into_response();
            };

            // Subscribers do not have a stream ID yet.
            if headers.contains_key(STREAM_ID_HEADER) {
                return bad_request(
                    "Subscribe calls should not include the 'Mesos-Stream-Id' header",
                );
            }

            debug!(
                provider_type = %subscribe.info.kind,
                provider_name = %subscribe.info.name,
                principal = principal.map(|p| p.value.as_str()),
                "received subscribe call"
            );

            let (connection, reader) = ProviderConnection::pipe(accept_type);
            let stream_id = connection.stream_id().to_string();
            manager.subscribe(connection, subscribe);

            match Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, accept_type.as_media_type())
                .header(STREAM_ID_HEADER, stream_id)
                .body(Body::from_stream(UnboundedReceiverStream::new(reader)))
            {
                Ok(response) => response,
                Err(build_error) => {
                    error!(%build_error, "failed to build subscribe response");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Call::Provider {
            resource_provider_id,
            call,
        } => {
            let stream_id = headers
                .get(STREAM_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match manager.call(resource_provider_id, stream_id, call).await {
                Ok(()) => StatusCode::ACCEPTED.into_response(),
                Err(CallError::NotImplemented) => StatusCode::NOT_IMPLEMENTED.into_response(),
                Err(CallError::ShuttingDown) => {
                    (StatusCode::SERVICE_UNAVAILABLE, CallError::ShuttingDown.to_string())
                        .into_response()
                }
                Err(call_error) => bad_request(call_error.to_string()),
            }
        }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, message.into()).into_response()
}
