use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{PushToken, ReceiptId};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub to: PushToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Seconds the push service keeps retrying delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Unix timestamp after which the message is dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

impl PushMessage {
    pub fn new(to: impl Into<PushToken>) -> Self {
        PushMessage {
            to: to.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Default,
    Normal,
    High,
}

/// Synchronous acknowledgement for one message of a send request.
///
/// The service tags tickets with `status`; an untagged `{ "id": .. }` is read as accepted.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushTicket {
    Ok {
        id: ReceiptId,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<ErrorDetails>,
    },
}

impl PushTicket {
    /// Receipt id to poll later, `None` if the message was rejected up front
    pub fn id(&self) -> Option<&ReceiptId> {
        match self {
            PushTicket::Ok { id } => Some(id),
            PushTicket::Error { .. } => None,
        }
    }
}

impl<'de> Deserialize<'de> for PushTicket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TicketRecord::deserialize(deserializer)?;
        record.into_ticket().map_err(de::Error::custom)
    }
}

#[derive(Deserialize)]
struct TicketRecord {
    status: Option<String>,
    id: Option<ReceiptId>,
    message: Option<String>,
    details: Option<ErrorDetails>,
}

impl TicketRecord {
    fn into_ticket(self) -> Result<PushTicket, String> {
        match (self.status.as_deref(), self.id) {
            (Some("error"), _) => Ok(PushTicket::Error {
                message: self.message.unwrap_or_default(),
                details: self.details,
            }),
            (None | Some("ok"), Some(id)) => Ok(PushTicket::Ok { id }),
            (None | Some("ok"), None) => Err("ticket is missing its receipt id".to_string()),
            (Some(other), _) => Err(format!("unknown ticket status `{other}`")),
        }
    }
}

/// Delivery outcome for one message, fetched later by receipt id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushReceipt {
    #[serde(rename = "ok")]
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
        #[serde(rename = "__debug", default, skip_serializing_if = "Option::is_none")]
        debug: Option<Value>,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<ErrorDetails>,
        #[serde(rename = "__debug", default, skip_serializing_if = "Option::is_none")]
        debug: Option<Value>,
    },
}

impl PushReceipt {
    pub fn is_success(&self) -> bool {
        matches!(self, PushReceipt::Success { .. })
    }

    pub fn error_code(&self) -> Option<&DeliveryErrorCode> {
        match self {
            PushReceipt::Error { details: Some(details), .. } => details.error.as_ref(),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DeliveryErrorCode>,
}

/// Per-item delivery error code. Codes this crate does not know are kept verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DeliveryErrorCode {
    DeviceNotRegistered,
    InvalidCredentials,
    MessageTooBig,
    MessageRateExceeded,
    Other(String),
}

impl DeliveryErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryErrorCode::DeviceNotRegistered => "DeviceNotRegistered",
            DeliveryErrorCode::InvalidCredentials => "InvalidCredentials",
            DeliveryErrorCode::MessageTooBig => "MessageTooBig",
            DeliveryErrorCode::MessageRateExceeded => "MessageRateExceeded",
            DeliveryErrorCode::Other(code) => code,
        }
    }
}

impl From<String> for DeliveryErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "DeviceNotRegistered" => DeliveryErrorCode::DeviceNotRegistered,
            "InvalidCredentials" => DeliveryErrorCode::InvalidCredentials,
            "MessageTooBig" => DeliveryErrorCode::MessageTooBig,
            "MessageRateExceeded" => DeliveryErrorCode::MessageRateExceeded,
            _ => DeliveryErrorCode::Other(code),
        }
    }
}

impl From<DeliveryErrorCode> for String {
    fn from(code: DeliveryErrorCode) -> Self {
        code.as_str().to_string()
    }
}

/// One entry of the `errors` list of a response envelope
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiResultError {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_skips_unset_fields() {
        let mut message = PushMessage::new("ExponentPushToken[abc]");
        message.title = Some("Break is over".to_string());
        message.priority = Some(Priority::High);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "to": "ExponentPushToken[abc]", "title": "Break is over", "priority": "high" })
        );
    }

    #[test]
    fn ticket_reads_tagged_and_bare_shapes() {
        let tickets: Vec<PushTicket> = serde_json::from_value(json!([
            { "status": "ok", "id": "r1" },
            { "id": "r2" },
            { "status": "error", "message": "not a token", "details": { "error": "DeviceNotRegistered" } },
        ]))
        .unwrap();

        assert_eq!(tickets[0].id().map(String::as_str), Some("r1"));
        assert_eq!(tickets[1], PushTicket::Ok { id: "r2".to_string() });
        assert_eq!(
            tickets[2],
            PushTicket::Error {
                message: "not a token".to_string(),
                details: Some(ErrorDetails { error: Some(DeliveryErrorCode::DeviceNotRegistered) }),
            }
        );
    }

    #[test]
    fn ticket_without_id_is_rejected() {
        let result = serde_json::from_value::<PushTicket>(json!({ "status": "ok" }));
        assert!(result.is_err());
    }

    #[test]
    fn receipt_keeps_unknown_error_codes_verbatim() {
        let receipt: PushReceipt = serde_json::from_value(json!({
            "status": "error",
            "message": "slow down",
            "details": { "error": "SomethingNew" },
            "__debug": { "trace": 1 }
        }))
        .unwrap();

        assert!(!receipt.is_success());
        assert_eq!(receipt.error_code(), Some(&DeliveryErrorCode::Other("SomethingNew".to_string())));
        assert_eq!(
            serde_json::to_value(&receipt).unwrap()["details"]["error"],
            json!("SomethingNew")
        );
    }

    #[test]
    fn success_receipt_round_trips_status_tag() {
        let receipt: PushReceipt = serde_json::from_value(json!({ "status": "ok" })).unwrap();
        assert!(receipt.is_success());
        assert_eq!(serde_json::to_value(&receipt).unwrap(), json!({ "status": "ok" }));
    }
}
