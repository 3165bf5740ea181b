use crate::error::{PushError, Result};
use crate::models::PushMessage;
use crate::types::ReceiptId;

/// Max number of messages accepted by one send request
pub const PUSH_NOTIFICATION_CHUNK_LIMIT: usize = 100;

/// Max number of receipt ids accepted by one receipt lookup
pub const PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT: usize = 300;

/// Splits `items` into ordered chunks of at most `chunk_size` items.
///
/// Only the last chunk may be shorter. An empty input gives no chunks.
pub fn chunk_items<T: Clone>(items: &[T], chunk_size: usize) -> Result<Vec<Vec<T>>> {
    if chunk_size == 0 {
        return Err(PushError::InvalidArgument(
            "chunk size must be a positive integer".to_string(),
        ));
    }
    Ok(split(items, chunk_size))
}

pub fn chunk_push_notifications(messages: &[PushMessage]) -> Vec<Vec<PushMessage>> {
    split(messages, PUSH_NOTIFICATION_CHUNK_LIMIT)
}

pub fn chunk_push_notification_receipt_ids(receipt_ids: &[ReceiptId]) -> Vec<Vec<ReceiptId>> {
    split(receipt_ids, PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT)
}

// chunk_size > 0
fn split<T: Clone>(items: &[T], chunk_size: usize) -> Vec<Vec<T>> {
    items.chunks(chunk_size).map(<[T]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenated_chunks_rebuild_the_input() {
        let items: Vec<u32> = (0..23).collect();

        for chunk_size in 1..=25 {
            let chunks = chunk_items(&items, chunk_size).unwrap();
            let (last, full) = chunks.split_last().unwrap();

            assert!(full.iter().all(|chunk| chunk.len() == chunk_size));
            let expected_last = match items.len() % chunk_size {
                0 => chunk_size.min(items.len()),
                rest => rest,
            };
            assert_eq!(last.len(), expected_last);
            assert_eq!(chunks.concat(), items);
        }
    }

    #[test]
    fn empty_input_gives_no_chunks() {
        let chunks = chunk_items::<u32>(&[], 10).unwrap();
        assert!(chunks.is_empty());
        assert!(chunk_push_notifications(&[]).is_empty());
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        let result = chunk_items(&[1, 2, 3], 0);
        assert!(matches!(result, Err(PushError::InvalidArgument(_))));
    }

    #[test]
    fn named_chunkers_use_their_own_limits() {
        let messages: Vec<PushMessage> = (0..250)
            .map(|i| PushMessage::new(format!("ExponentPushToken[{i}]")))
            .collect();
        let sizes: Vec<usize> = chunk_push_notifications(&messages).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let ids: Vec<ReceiptId> = (0..601).map(|i| format!("receipt-{i}")).collect();
        let sizes: Vec<usize> = chunk_push_notification_receipt_ids(&ids).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![300, 300, 1]);
    }
}
