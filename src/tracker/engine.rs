//! Following tracking engine.
//!
//! Orchestrates the tracking lifecycle: baseline capture when an account
//! is added, full-list refetch and diff on every cycle, persistence of
//! grown following sets, and rotation over the tracked set for the
//! scheduler.
//!
//! Error contract: public operations never return `Err`. Failures inside
//! an operation are routed to the tracker event channel, so the scheduler
//! and CLI callers observe only events and log output. Lower-level
//! helpers propagate `Result` upward into that funnel.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;

use crate::error::AppError;
use crate::services::twitter::{TwitterApi, DEFAULT_MAX_RESULTS};
use crate::store::AccountStore;
use crate::tracker::events::{EventSender, NewFollowingEvent, TrackerEvent};
use crate::tracker::rotation::RotationState;
use crate::tracker::types::{
    diff_following, format_elapsed, FollowingDiff, TrackedAccount,
};

enum AddPlan {
    New(TrackedAccount),
    Existing(TrackedAccount),
}

pub struct FollowingTracker {
    api: Arc<dyn TwitterApi + Send + Sync>,
    accounts: Arc<AccountStore>,
    events: EventSender,
    rotation: RotationState,
}

impl FollowingTracker {
    pub fn new(
        api: Arc<dyn TwitterApi + Send + Sync>,
        accounts: Arc<AccountStore>,
        events: EventSender,
    ) -> Self {
        Self {
            api,
            accounts,
            events,
            rotation: RotationState::new(),
        }
    }

    /// Start tracking a username. Idempotent: an already-tracked username
    /// returns its existing record without touching the API. On failure
    /// an error event is emitted and nothing is persisted.
    pub async fn add_target_account(
        &mut self,
        username: &str,
    ) -> Option<TrackedAccount> {
        match self.prepare_add(username).await {
            Ok(AddPlan::Existing(account)) => Some(account),
            Ok(AddPlan::New(account)) => match self.persist_added(account).await
            {
                Ok(account) => {
                    self.rotation.invalidate();
                    Some(account)
                }
                Err(err) => {
                    self.report(err);
                    None
                }
            },
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Add several usernames at once. The API lookups and baseline
    /// fetches run concurrently; each add succeeds or fails on its own
    /// and one failure never aborts the rest of the batch.
    pub async fn add_target_accounts(&mut self, usernames: &[String]) {
        let this: &Self = self;
        let plans =
            join_all(usernames.iter().map(|u| this.prepare_add(u))).await;

        // The store rewrites the whole file on every upsert; interleaved
        // writes would drop records, so persistence stays sequential.
        let mut membership_changed = false;
        for plan in plans {
            match plan {
                Ok(AddPlan::New(account)) => {
                    match self.persist_added(account).await {
                        Ok(_) => membership_changed = true,
                        Err(err) => self.report(err),
                    }
                }
                Ok(AddPlan::Existing(_)) => {}
                Err(err) => self.report(err),
            }
        }
        if membership_changed {
            self.rotation.invalidate();
        }
    }

    /// Resolve a username into a ready-to-persist record without writing
    /// anything. Returns the existing record when already tracked.
    async fn prepare_add(&self, username: &str) -> Result<AddPlan, AppError> {
        if let Some(existing) = self.accounts.get_by_username(username).await? {
            tracing::warn!("@{} already exists", username);
            return Ok(AddPlan::Existing(existing));
        }

        let user = self.api.resolve_user_by_username(username).await?;

        // The entire current list is the baseline: nothing in it counts
        // as "new", so no diff event fires for it.
        let baseline = self
            .api
            .fetch_all_following(&user.id, DEFAULT_MAX_RESULTS)
            .await?;
        tracing::info!(
            "{} following found for @{}",
            baseline.count,
            user.username
        );

        Ok(AddPlan::New(TrackedAccount {
            id: user.id,
            name: user.name,
            username: user.username,
            following: baseline.ids,
            last_checked: Utc::now(),
        }))
    }

    async fn persist_added(
        &self,
        account: TrackedAccount,
    ) -> Result<TrackedAccount, AppError> {
        self.accounts.upsert(account.clone()).await?;
        tracing::info!("@{} added", account.username);
        Ok(account)
    }

    /// Remove a username from the track list. Idempotent when absent.
    pub async fn delist_target_account(&mut self, username: &str) {
        match self.accounts.delete_by_username(username).await {
            Ok(_) => {
                tracing::info!("@{} removed from the track list", username);
                self.rotation.invalidate();
            }
            Err(err) => self.report(err),
        }
    }

    /// Run one tracking pass for a username that must already be tracked.
    pub async fn track_new_following_by_username(
        &self,
        username: &str,
    ) -> Option<FollowingDiff> {
        tracing::info!("@{} tracking started...", username);

        let account = match self.accounts.get_by_username(username).await {
            Ok(account) => account,
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        match account {
            Some(account) => self.update_following_if_exists(account).await,
            None => {
                self.report(AppError::not_tracked(username));
                None
            }
        }
    }

    /// Fetch the account's current following list, diff it against the
    /// stored id set, and on a non-empty diff emit the event and persist
    /// the grown record. A zero diff writes and emits nothing.
    pub async fn update_following_if_exists(
        &self,
        account: TrackedAccount,
    ) -> Option<FollowingDiff> {
        match self.try_update(account).await {
            Ok(diff) => diff,
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    async fn try_update(
        &self,
        account: TrackedAccount,
    ) -> Result<Option<FollowingDiff>, AppError> {
        let fresh = self
            .api
            .fetch_all_following(&account.id, DEFAULT_MAX_RESULTS)
            .await?;
        let diff = diff_following(&fresh, &account.following);

        if diff.is_empty() {
            tracing::info!("No new following for @{}", account.username);
            return Ok(None);
        }

        let now = Utc::now();
        self.send(TrackerEvent::NewFollowing(NewFollowingEvent {
            name: account.name.clone(),
            username: account.username.clone(),
            new_following: diff.clone(),
            duration: format_elapsed(account.last_checked, now),
        }));

        let mut updated = account;
        updated.following.extend(diff.ids.iter().cloned());
        updated.last_checked = now;
        self.accounts.upsert(updated).await?;

        Ok(Some(diff))
    }

    /// Rotation step for the scheduler: rebuild the cache from the store
    /// when empty, then select at the cursor and advance with wraparound.
    /// Returns None when no accounts are tracked.
    pub async fn next_account(&mut self) -> Option<TrackedAccount> {
        if self.rotation.is_empty() {
            match self.accounts.get_all().await {
                Ok(all) => self.rotation.fill(all.into_values().collect()),
                Err(err) => {
                    self.report(err);
                    return None;
                }
            }
        }
        self.rotation.advance().cloned()
    }

    /// Clear the rotation cache and cursor, as a fresh tracking run does.
    pub fn reset_rotation(&mut self) {
        self.rotation.reset();
    }

    pub fn rotation_cursor(&self) -> usize {
        self.rotation.cursor()
    }

    fn report(&self, err: AppError) {
        tracing::error!("{}", err);
        self.send(TrackerEvent::Error(err));
    }

    fn send(&self, event: TrackerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Tracker event dropped: no notifier attached");
        }
    }
}
