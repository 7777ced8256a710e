//! # Message Bus for ACL Notifications
//!
//! Every successful permission mutation is announced on a synchronous pub/sub
//! bus. Listeners subscribe to a concrete event type, or to [`AclEvent`] to see
//! everything, before invoking mutating operations.
//!
//! ## Usage Example
//! ```rust
//! use objectacl::message_bus::{MessageBus, SetObjectPermission};
//! use objectacl::types::{Entity, ObjectId, Role};
//!
//! let bus = MessageBus::new();
//! let mut receiver = bus.subscribe::<SetObjectPermission>();
//!
//! let event = SetObjectPermission::new(Entity::from_low_u64(1), ObjectId(1), Role::from(1));
//! assert_eq!(bus.publish_event(event.clone().into()), 1);
//!
//! assert_eq!(receiver.try_recv().unwrap(), event);
//! assert_eq!(bus.history().len(), 1);
//! ```
//!
//! - [`events`] - event type definitions and the unified [`AclEvent`] enum
//! - [`history`] - entries of the bounded event history
//! - [`sync_bus`] - the `std::sync::mpsc` backed [`MessageBus`]

pub use events::*;
pub use history::EventHistoryEntry;
pub use sync_bus::{Consumer, MessageBus, DEFAULT_HISTORY_LIMIT};

pub mod events;
pub mod history;
pub mod sync_bus;
