//! Console notifier.
//!
//! Single subscriber of the tracker event channel: renders new-following
//! events as success lines (one per newly followed account, with its
//! profile URL) and error events as error-level lines. The task ends when
//! every event sender is dropped, which is how one-shot CLI commands
//! flush pending events before exit.

use tokio::task::JoinHandle;

use crate::tracker::events::{EventReceiver, TrackerEvent};

pub fn spawn(mut events: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            render(&event);
        }
    })
}

fn render(event: &TrackerEvent) {
    match event {
        TrackerEvent::NewFollowing(event) => {
            tracing::info!(
                "@{} started to follow {} accounts in the last {}",
                event.username,
                event.new_following.count,
                event.duration
            );
            for record in &event.new_following.all {
                tracing::info!(
                    "- {} (https://twitter.com/{})",
                    record.name,
                    record.username
                );
            }
        }
        TrackerEvent::Error(err) => {
            tracing::error!("{}", err);
        }
    }
}
