//! Periodic tracking scheduler.
//!
//! Drives the main polling loop: each tick selects exactly one tracked
//! account from the engine's rotation and runs a tracking pass for it.
//! The loop owns the tracker exclusively, so at most one periodic driver
//! can exist, and a tick's work is awaited before the next tick fires.
//!
//! Errors from a cycle travel the tracker event channel and are logged —
//! a single failed cycle never takes down the scheduler.
//!
//! Runs until `Ctrl+C` (SIGINT) is received.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::signal;
use tokio::time;

use crate::config::ConfigStore;
use crate::tracker::engine::FollowingTracker;
use crate::tracker::types::format_elapsed;

/// Run the tracking loop. The first cycle fires immediately; subsequent
/// cycles are spaced by the configured interval.
pub async fn run_tracking(mut tracker: FollowingTracker, config: Arc<ConfigStore>) {
    let interval_secs = match config.get().await {
        Ok(conf) => conf.track_interval_secs(),
        Err(err) => {
            tracing::error!("Failed to read track interval, using default: {}", err);
            crate::config::DEFAULT_TRACK_INTERVAL_SECS
        }
    };

    tracker.reset_rotation();

    let now = Utc::now();
    tracing::info!("Tracking started...");
    tracing::info!(
        "Each account will be tracked every {}.",
        format_elapsed(now, now + ChronoDuration::seconds(interval_secs as i64))
    );

    let mut interval = tracking_interval(interval_secs);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                poll_once(&mut tracker).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping tracking.");
                break;
            }
        }
    }

    tracing::info!("Tracking stopped cleanly");
}

/// Build the cycle timer. A configured interval of 0 is floored at one
/// second (a zero period aborts the tokio timer), and missed ticks are
/// delayed so cycles after an overrunning one stay spaced by the full
/// interval instead of firing back-to-back.
fn tracking_interval(interval_secs: u64) -> time::Interval {
    let mut interval =
        time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    interval
}

/// Execute a single tracking cycle. Extracted for testability.
async fn poll_once(tracker: &mut FollowingTracker) {
    match tracker.next_account().await {
        Some(account) => {
            tracker
                .track_new_following_by_username(&account.username)
                .await;
        }
        None => {
            tracing::debug!("No tracked accounts; skipping tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use tokio::sync::mpsc::error::TryRecvError;

    use crate::error::AppError;
    use crate::services::mock_twitter::{following_record, MockTwitterClient};
    use crate::store::AccountStore;
    use crate::tracker::events::{channel, EventReceiver, TrackerEvent};
    use crate::tracker::types::TrackedAccount;

    fn seeded_account(id: &str, username: &str) -> TrackedAccount {
        TrackedAccount {
            id: id.to_string(),
            name: format!("Name {}", username),
            username: username.to_string(),
            following: vec![],
            last_checked: Utc::now() - ChronoDuration::minutes(5),
        }
    }

    async fn make_tracker(
        api: MockTwitterClient,
        seeds: &[(&str, &str)],
    ) -> (FollowingTracker, EventReceiver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let accounts =
            Arc::new(AccountStore::new(dir.path().join("data.json")));
        for (id, username) in seeds {
            accounts
                .upsert(seeded_account(id, username))
                .await
                .unwrap();
        }
        let (tx, rx) = channel();
        let tracker = FollowingTracker::new(Arc::new(api), accounts, tx);
        (tracker, rx, dir)
    }

    #[tokio::test]
    async fn poll_once_checks_exactly_one_account() {
        let api = MockTwitterClient::new()
            .with_following(vec![following_record("X", "x")]);
        let (mut tracker, mut rx, _dir) =
            make_tracker(api, &[("1", "alice")]).await;

        poll_once(&mut tracker).await;

        match rx.try_recv().unwrap() {
            TrackerEvent::NewFollowing(event) => {
                assert_eq!(event.username, "alice");
                assert_eq!(event.new_following.ids, vec!["X"]);
            }
            other => panic!("expected NewFollowing event, got {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn poll_once_with_no_tracked_accounts_is_a_noop() {
        let (mut tracker, mut rx, _dir) =
            make_tracker(MockTwitterClient::new(), &[]).await;

        poll_once(&mut tracker).await;

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn three_cycles_visit_three_accounts_once_each() {
        let api = MockTwitterClient::new()
            .with_following(vec![following_record("X", "x")]);
        let (mut tracker, mut rx, _dir) =
            make_tracker(api, &[("1", "alice"), ("2", "bob"), ("3", "carol")])
                .await;

        for _ in 0..3 {
            poll_once(&mut tracker).await;
        }

        let mut visited = Vec::new();
        while let Ok(TrackerEvent::NewFollowing(event)) = rx.try_recv() {
            visited.push(event.username);
        }
        visited.sort();
        assert_eq!(visited, vec!["alice", "bob", "carol"]);
        assert_eq!(tracker.rotation_cursor(), 3);
    }

    #[tokio::test]
    async fn zero_interval_is_floored_at_one_second() {
        let interval = tracking_interval(0);
        assert_eq!(interval.period(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn missed_ticks_are_delayed_not_bursted() {
        let interval = tracking_interval(600);
        assert_eq!(
            interval.missed_tick_behavior(),
            time::MissedTickBehavior::Delay
        );
    }

    #[tokio::test]
    async fn zero_configured_interval_does_not_crash_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Arc::new(crate::config::ConfigStore::new(dir.path().join("config.json")));
        config.set_track_interval(Some(0)).await.unwrap();

        let (tracker, _rx, _data_dir) =
            make_tracker(MockTwitterClient::new(), &[]).await;

        let driver = tokio::spawn(run_tracking(tracker, config));
        time::sleep(Duration::from_millis(50)).await;
        assert!(!driver.is_finished());

        driver.abort();
        let err = driver.await.unwrap_err();
        assert!(err.is_cancelled(), "loop ended abnormally: {:?}", err);
    }

    #[tokio::test]
    async fn failed_cycle_does_not_stop_subsequent_cycles() {
        let api = MockTwitterClient::new().with_following_error();
        let (mut tracker, mut rx, _dir) =
            make_tracker(api, &[("1", "alice"), ("2", "bob")]).await;

        poll_once(&mut tracker).await;
        poll_once(&mut tracker).await;

        // both cycles ran and both failures reached the channel
        let mut errors = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, TrackerEvent::Error(AppError::Api { .. })));
            errors += 1;
        }
        assert_eq!(errors, 2);
    }
}
