//! History records kept by the message bus

use super::events::AclEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event history entry, recorded for every unified event published
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventHistoryEntry {
    /// Unique event ID
    pub event_id: Uuid,
    /// The event data
    pub event: AclEvent,
    /// When the bus recorded the event
    pub recorded_at: DateTime<Utc>,
    /// Event sequence number (for ordering)
    pub sequence_number: u64,
}

impl EventHistoryEntry {
    pub fn new(event: AclEvent, sequence_number: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event,
            recorded_at: Utc::now(),
            sequence_number,
        }
    }
}
