//! Tracker event channel types.
//!
//! The engine publishes over an unbounded mpsc channel; the notifier is
//! the single subscriber. Errors raised inside engine operations travel
//! this channel instead of propagating to the caller, so the scheduler
//! never observes a failed cycle directly.

use tokio::sync::mpsc;

use crate::error::AppError;
use crate::tracker::types::FollowingDiff;

/// Payload emitted when a tracked account has started following new
/// accounts since the last check.
#[derive(Debug)]
pub struct NewFollowingEvent {
    pub name: String,
    pub username: String,
    pub new_following: FollowingDiff,
    /// Human-readable elapsed time since the previous check.
    pub duration: String,
}

#[derive(Debug)]
pub enum TrackerEvent {
    NewFollowing(NewFollowingEvent),
    Error(AppError),
}

pub type EventSender = mpsc::UnboundedSender<TrackerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TrackerEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
