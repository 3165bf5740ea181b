use std::collections::HashMap;

use crate::models::PushReceipt;

/// Device push token, e.g. `ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]`
pub type PushToken = String;

/// Id handed out in a ticket, used later to look up the delivery receipt
pub type ReceiptId = String;

/// <receipt_id, receipt>
pub type ReceiptMap = HashMap<ReceiptId, PushReceipt>;
