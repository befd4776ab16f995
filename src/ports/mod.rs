//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the intake domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Per-sender conversation state
//! - `NotificationGateway` - Outbound text delivery to the sender
//! - `PersistenceGateway` - Durable storage for completed records
//! - `FieldClassifier` - Optional free-text field classification

mod field_classifier;
mod notification_gateway;
mod persistence_gateway;
mod session_store;

pub use field_classifier::FieldClassifier;
pub use notification_gateway::{NotificationError, NotificationGateway};
pub use persistence_gateway::{PersistenceError, PersistenceGateway};
pub use session_store::{SessionStore, SessionStoreError};
