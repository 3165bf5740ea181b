use log::{error, warn};
use serde::{de, Deserialize};
use serde_json::Value;

use crate::error::{ApiError, PushError, Result};
use crate::models::ApiResultError;
use crate::request::RawResponse;

/// Top-level body of every push service response
#[derive(Deserialize, Debug, Default)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<ApiResultError>>,
}

/// Checks the content type, decodes the envelope and hands back its `data`.
///
/// A JSON body carrying `errors` is reported as an API error whatever the HTTP status is.
pub fn normalize_response(response: RawResponse) -> Result<Value> {
    let status = response.status.as_u16();

    if !is_json(response.content_type.as_deref()) {
        error!("response:: non-JSON response with status {}", status);
        return Err(text_response_error(status, response.text));
    }

    let envelope = match decode_envelope(&response.text) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("response:: undecodable JSON body with status {}: {}", status, e);
            return Err(PushError::Transport {
                message: format!("Could not parse JSON returned from the push service: {e}"),
                status: Some(status),
                body: Some(response.text),
            });
        }
    };

    reduce_envelope(envelope).map_err(|e| match e {
        PushError::Transport { message, .. } => PushError::Transport {
            message: format!("{message} (status {status})"),
            status: Some(status),
            body: Some(response.text),
        },
        other => other,
    })
}

/// Maps a decoded envelope to its `data`, or to one error carrying every reported entry.
pub fn reduce_envelope(envelope: ApiEnvelope) -> Result<Value> {
    if let Some(api_error) = envelope.errors.and_then(ApiError::from_result_errors) {
        warn!(
            "response:: push service reported {} error(s), first: {} ({})",
            api_error.others.len() + 1,
            api_error.message,
            api_error.code
        );
        return Err(PushError::Api(api_error));
    }

    envelope.data.ok_or_else(|| {
        PushError::transport("Push service responded with neither `data` nor `errors`")
    })
}

// Only a JSON object is an envelope; serde would otherwise read a top-level array by position.
fn decode_envelope(text: &str) -> serde_json::Result<ApiEnvelope> {
    match serde_json::from_str::<Value>(text)? {
        value @ Value::Object(_) => serde_json::from_value(value),
        _ => Err(de::Error::custom("expected a JSON object")),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

fn text_response_error(status: u16, text: String) -> PushError {
    let is_error_status = (400..600).contains(&status);
    let message = if is_error_status {
        format!("Push service responded with an error with status code {status}: {text}")
    } else {
        format!("Push service responded with an unexpected non-JSON body: {text}")
    };
    PushError::Transport {
        message,
        status: is_error_status.then_some(status),
        body: Some(text),
    }
}
