//! Calendar block storage with atomic create-if-no-conflict semantics.
//!
//! The store is the only shared mutable resource of the scheduling core.
//! Every mutating operation holds one lock across its full
//! check-then-write sequence, so two racing overlapping placements can
//! never both commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::CalendarBlock;
use crate::scheduling::overlap::{overlaps, Interval};

#[derive(Debug, Error)]
pub enum BlockStoreError {
    #[error("invalid dates: {0}")]
    InvalidDates(String),

    #[error("requested interval overlaps calendar block {existing_block} (pump {pump_id})")]
    Conflict {
        existing_block: Uuid,
        pump_id: Uuid,
    },

    #[error("calendar block {0} not found")]
    NotFound(Uuid),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<BlockStoreError> for ServiceError {
    fn from(err: BlockStoreError) -> Self {
        match err {
            BlockStoreError::InvalidDates(msg) => ServiceError::InvalidDates(msg),
            conflict @ BlockStoreError::Conflict { .. } => {
                ServiceError::ScheduleConflict(conflict.to_string())
            }
            BlockStoreError::NotFound(id) => {
                ServiceError::NotFound(format!("Calendar block {} not found", id))
            }
            BlockStoreError::Storage(msg) => ServiceError::TransactionError(msg),
        }
    }
}

/// Storage abstraction owning calendar block lifetime.
///
/// Implementations must execute each mutating call as one atomic unit:
/// the conflict check and the write may not be separated by a window
/// where another writer could interleave. The in-memory implementation
/// serializes through a mutex; a database-backed one would use a
/// serializing transaction.
#[async_trait]
pub trait CalendarBlockStore: Send + Sync {
    /// Creates a block for `[start, end)` unless it overlaps an existing
    /// block anywhere on the shared calendar.
    async fn try_create_block(
        &self,
        pump_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CalendarBlock, BlockStoreError>;

    /// Atomically moves an existing block to a new interval, validating
    /// against all blocks except the one being moved. On conflict the
    /// original placement is left untouched. The returned block carries
    /// a fresh id.
    async fn try_move_block(
        &self,
        block_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CalendarBlock, BlockStoreError>;

    /// Removes a block, returning it for compensation purposes.
    /// Removing an unknown id is a no-op, not an error.
    async fn remove_block(&self, block_id: Uuid)
        -> Result<Option<CalendarBlock>, BlockStoreError>;

    /// Owned snapshot of all active blocks.
    async fn list_blocks(&self) -> Result<Vec<CalendarBlock>, BlockStoreError>;

    /// Clears all blocks. Maintenance/test-isolation operation.
    async fn reset(&self) -> Result<(), BlockStoreError>;
}

/// In-memory store for single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryCalendarBlockStore {
    blocks: Mutex<Vec<CalendarBlock>>,
}

impl InMemoryCalendarBlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Interval, BlockStoreError> {
    Interval::new(start, end).map_err(|e| BlockStoreError::InvalidDates(e.to_string()))
}

// Stored blocks were validated on insertion.
fn interval_of(block: &CalendarBlock) -> Interval {
    Interval::new_unchecked(block.start, block.end)
}

fn find_conflict<'a>(
    blocks: &'a [CalendarBlock],
    candidate: &Interval,
    exclude: Option<Uuid>,
) -> Option<&'a CalendarBlock> {
    blocks
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .find(|b| overlaps(candidate, &interval_of(b)))
}

#[async_trait]
impl CalendarBlockStore for InMemoryCalendarBlockStore {
    async fn try_create_block(
        &self,
        pump_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CalendarBlock, BlockStoreError> {
        let candidate = validate_interval(start, end)?;
        let mut blocks = self.blocks.lock().await;

        if let Some(existing) = find_conflict(&blocks, &candidate, None) {
            return Err(BlockStoreError::Conflict {
                existing_block: existing.id,
                pump_id: existing.pump_id,
            });
        }

        let block = CalendarBlock::new(pump_id, start, end);
        blocks.push(block.clone());
        Ok(block)
    }

    async fn try_move_block(
        &self,
        block_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CalendarBlock, BlockStoreError> {
        let candidate = validate_interval(start, end)?;
        let mut blocks = self.blocks.lock().await;

        let index = blocks
            .iter()
            .position(|b| b.id == block_id)
            .ok_or(BlockStoreError::NotFound(block_id))?;

        if let Some(existing) = find_conflict(&blocks, &candidate, Some(block_id)) {
            return Err(BlockStoreError::Conflict {
                existing_block: existing.id,
                pump_id: existing.pump_id,
            });
        }

        let old = blocks.swap_remove(index);
        let block = CalendarBlock::new(old.pump_id, start, end);
        blocks.push(block.clone());
        Ok(block)
    }

    async fn remove_block(
        &self,
        block_id: Uuid,
    ) -> Result<Option<CalendarBlock>, BlockStoreError> {
        let mut blocks = self.blocks.lock().await;
        let removed = match blocks.iter().position(|b| b.id == block_id) {
            Some(index) => Some(blocks.swap_remove(index)),
            None => None,
        };
        Ok(removed)
    }

    async fn list_blocks(&self) -> Result<Vec<CalendarBlock>, BlockStoreError> {
        let blocks = self.blocks.lock().await;
        Ok(blocks.clone())
    }

    async fn reset(&self) -> Result<(), BlockStoreError> {
        let mut blocks = self.blocks.lock().await;
        blocks.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn creates_block_on_empty_store() {
        let store = InMemoryCalendarBlockStore::new();
        let pump = Uuid::new_v4();

        let block = store.try_create_block(pump, day(3), day(5)).await.unwrap();
        assert_eq!(block.pump_id, pump);
        assert_eq!(store.list_blocks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_overlapping_block() {
        let store = InMemoryCalendarBlockStore::new();
        let first = store
            .try_create_block(Uuid::new_v4(), day(3), day(5))
            .await
            .unwrap();

        let err = store
            .try_create_block(Uuid::new_v4(), day(4), day(6))
            .await
            .unwrap_err();
        assert_matches!(err, BlockStoreError::Conflict { existing_block, .. } if existing_block == first.id);

        // Conflict performed no mutation
        assert_eq!(store.list_blocks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn back_to_back_blocks_are_legal() {
        let store = InMemoryCalendarBlockStore::new();
        store
            .try_create_block(Uuid::new_v4(), day(3), day(5))
            .await
            .unwrap();

        let touching = store.try_create_block(Uuid::new_v4(), day(5), day(7)).await;
        assert!(touching.is_ok());
        assert_eq!(store.list_blocks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_malformed_dates() {
        let store = InMemoryCalendarBlockStore::new();
        let err = store
            .try_create_block(Uuid::new_v4(), day(5), day(5))
            .await
            .unwrap_err();
        assert_matches!(err, BlockStoreError::InvalidDates(_));

        let err = store
            .try_create_block(Uuid::new_v4(), day(7), day(5))
            .await
            .unwrap_err();
        assert_matches!(err, BlockStoreError::InvalidDates(_));
    }

    #[tokio::test]
    async fn removal_is_idempotent() {
        let store = InMemoryCalendarBlockStore::new();
        let block = store
            .try_create_block(Uuid::new_v4(), day(3), day(5))
            .await
            .unwrap();

        let removed = store.remove_block(block.id).await.unwrap();
        assert_eq!(removed.map(|b| b.id), Some(block.id));

        // Second removal and removal of a random id are both no-ops
        assert!(store.remove_block(block.id).await.unwrap().is_none());
        assert!(store.remove_block(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.list_blocks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn move_excludes_own_interval_from_conflict_check() {
        let store = InMemoryCalendarBlockStore::new();
        let pump = Uuid::new_v4();
        let block = store.try_create_block(pump, day(3), day(5)).await.unwrap();

        // Shifting within (or adjacent to) its own old interval is fine
        let moved = store.try_move_block(block.id, day(4), day(6)).await.unwrap();
        assert_ne!(moved.id, block.id);
        assert_eq!(moved.pump_id, pump);

        let blocks = store.list_blocks().await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, day(4));
    }

    #[tokio::test]
    async fn failed_move_leaves_original_untouched() {
        let store = InMemoryCalendarBlockStore::new();
        let block = store
            .try_create_block(Uuid::new_v4(), day(3), day(5))
            .await
            .unwrap();
        let other = store
            .try_create_block(Uuid::new_v4(), day(10), day(12))
            .await
            .unwrap();

        let err = store.try_move_block(block.id, day(11), day(13)).await.unwrap_err();
        assert_matches!(err, BlockStoreError::Conflict { existing_block, .. } if existing_block == other.id);

        let blocks = store.list_blocks().await.unwrap();
        assert_eq!(blocks.len(), 2);
        let original = blocks.iter().find(|b| b.id == block.id).unwrap();
        assert_eq!((original.start, original.end), (day(3), day(5)));
    }

    #[tokio::test]
    async fn move_of_unknown_block_is_not_found() {
        let store = InMemoryCalendarBlockStore::new();
        let err = store
            .try_move_block(Uuid::new_v4(), day(1), day(2))
            .await
            .unwrap_err();
        assert_matches!(err, BlockStoreError::NotFound(_));
    }

    #[tokio::test]
    async fn reset_clears_all_blocks() {
        let store = InMemoryCalendarBlockStore::new();
        store
            .try_create_block(Uuid::new_v4(), day(3), day(5))
            .await
            .unwrap();
        store.reset().await.unwrap();
        assert!(store.list_blocks().await.unwrap().is_empty());
    }
}
