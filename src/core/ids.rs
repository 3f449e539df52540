//! Identifier allocation.
//!
//! Users get sequential ids from the document's counter. Every other record
//! gets a millisecond timestamp, bumped past the largest id already in its
//! collection so two creations inside the same millisecond (or after a clock
//! step backwards) still receive distinct, strictly increasing ids.

use crate::core::document::Document;
use crate::core::time;

/// Takes the next user id and advances the counter. The counter is persisted
/// with the document by the caller's save.
pub fn next_user_id(doc: &mut Document) -> u64 {
    doc.backfill();
    let id = doc.next_user_id;
    doc.next_user_id += 1;
    id
}

/// Timestamp id that is greater than every id in `existing`.
pub fn next_timestamp_id<I>(existing: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    allocate_after(time::now_epoch_ms(), existing)
}

fn allocate_after<I>(now_ms: u64, existing: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    match existing.into_iter().max() {
        Some(last) if last >= now_ms => last + 1,
        _ => now_ms,
    }
}

pub fn next_account_id(doc: &Document) -> u64 {
    next_timestamp_id(doc.accounts.iter().map(|a| a.id))
}

pub fn next_bot_id(doc: &Document) -> u64 {
    next_timestamp_id(doc.bots.iter().map(|b| b.id))
}

pub fn next_admin_bot_id(doc: &Document) -> u64 {
    next_timestamp_id(doc.admin_bots.iter().map(|b| b.id))
}

pub fn next_career_id(doc: &Document) -> u64 {
    next_timestamp_id(doc.careers.iter().map(|c| c.id))
}
