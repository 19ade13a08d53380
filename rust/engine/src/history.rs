use std::sync::RwLock;

use thiserror::Error;
use uuid::Uuid;

use crate::record::HandRecord;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("hand {0} not found")]
    NotFound(Uuid),
    #[error("hand {0} is already stored")]
    Duplicate(Uuid),
    #[error("hand history storage lock poisoned")]
    StoragePoisoned,
    #[error("hand history storage failed: {0}")]
    Storage(String),
    #[error("stored hand could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where settled hands are kept.
///
/// Implementations must hand back exactly what was stored, field for field,
/// and list hands in the order they were stored.
pub trait HandRepository: Send + Sync {
    fn store(&self, record: HandRecord) -> Result<HandRecord, HistoryError>;

    fn fetch_all(&self) -> Result<Vec<HandRecord>, HistoryError>;

    fn fetch_by_id(&self, id: &Uuid) -> Result<HandRecord, HistoryError>;
}

/// Hand history held in process memory
#[derive(Debug, Default)]
pub struct MemoryHistory {
    hands: RwLock<Vec<HandRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.len())
    }

    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len()? == 0)
    }
}

impl HandRepository for MemoryHistory {
    fn store(&self, record: HandRecord) -> Result<HandRecord, HistoryError> {
        let mut hands = self
            .hands
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        if hands.iter().any(|h| h.id == record.id) {
            return Err(HistoryError::Duplicate(record.id));
        }
        hands.push(record.clone());
        Ok(record)
    }

    fn fetch_all(&self) -> Result<Vec<HandRecord>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.clone())
    }

    fn fetch_by_id(&self, id: &Uuid) -> Result<HandRecord, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        hands
            .iter()
            .find(|h| h.id == *id)
            .cloned()
            .ok_or(HistoryError::NotFound(*id))
    }
}
