// Client for the Expo push notification service: chunks batches of messages and receipt ids,
// sends them with bounded concurrency and turns responses into tickets, receipts or errors.
pub mod chunk;
pub mod client;
pub mod error;
pub mod limiter;
pub mod models;
pub mod request;
pub mod response;
pub mod token;
pub mod types;
pub mod util;

pub use chunk::{
    chunk_items, chunk_push_notification_receipt_ids, chunk_push_notifications,
    PUSH_NOTIFICATION_CHUNK_LIMIT, PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
};
pub use client::{ClientOptions, ExpoClient};
pub use error::{ApiError, PushError, Result};
pub use models::{ApiResultError, DeliveryErrorCode, PushMessage, PushReceipt, PushTicket};
pub use token::is_expo_push_token;
pub use types::{PushToken, ReceiptId, ReceiptMap};
