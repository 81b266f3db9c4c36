//! Background Tasks Module
//!
//! Contains the long-running tasks that keep the local cache in sync.
//!
//! # Tasks
//! - Change subscriber: mirrors a watched prefix of the store into the cache

mod backoff;
mod subscriber;

pub use backoff::Backoff;
pub use subscriber::{spawn_subscriber, ChangeSubscriber, SubscriberState};
