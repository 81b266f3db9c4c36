//! Rigel Client - configuration distribution over etcd
//!
//! Serves hierarchical, versioned configuration parameters from a live
//! local mirror of an etcd subtree, kept current by a prefix watch.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod resolver;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, RigelError};
pub use resolver::ConfigResolver;
pub use tasks::{spawn_subscriber, ChangeSubscriber};
