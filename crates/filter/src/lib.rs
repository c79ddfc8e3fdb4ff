//! Author-group filtering for the dynamic feed.
//!
//! `InterceptedTransport` wraps the raw transport; while a group is selected
//! it answers feed requests through `FeedInterceptor`, everything else goes
//! straight through. `FilterController` is what a tab bar drives.

pub mod controller;
pub mod cursor;
pub mod dispatch;
pub mod engine;
pub mod envelope;
pub mod groups;
pub mod members;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{FilterController, SelectionOutcome};
pub use dispatch::InterceptedTransport;
pub use engine::{EngineLimits, FeedInterceptor};
pub use envelope::{FeedEnvelope, Peek};
pub use groups::GroupDirectory;
pub use members::MembershipResolver;
pub use state::{lock_state, shared_state, FilterState, SharedFilterState};
