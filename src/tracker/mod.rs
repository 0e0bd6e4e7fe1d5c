//! Following Tracker Module
//!
//! Owns the tracking engine: baseline capture on add, per-cycle diffing
//! of fresh following lists against stored state, rotation over the
//! tracked set, and the event channel the notifier consumes.

pub mod engine;
pub mod events;
pub mod rotation;
pub mod types;


pub use engine::FollowingTracker;
pub use events::{NewFollowingEvent, TrackerEvent};
pub use rotation::RotationState;
pub use types::{FollowingDiff, TrackedAccount};
