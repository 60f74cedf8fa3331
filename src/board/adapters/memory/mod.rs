//! In-memory stand-in for the remote task store.

mod store;

pub use store::{InMemoryTaskStore, WatchSubscription};
