//! Scripted [`TwitterApi`] implementation for tests.
//!
//! Responses are configured up front with the builder methods; call
//! counters let tests assert how many network round trips an engine
//! operation performed (or that it performed none at all).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::services::twitter::{
    FollowingPage, FollowingRecord, TwitterApi, UserRecord,
};

#[derive(Default)]
pub struct MockTwitterClient {
    users: Vec<UserRecord>,
    following: Mutex<Vec<FollowingRecord>>,
    endless_pagination: bool,
    fail_following: bool,
    resolve_calls: AtomicUsize,
    page_calls: AtomicUsize,
}

impl MockTwitterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolvable user. Unregistered usernames resolve to
    /// [`AppError::AccountNotFound`].
    pub fn with_user(mut self, id: &str, name: &str, username: &str) -> Self {
        self.users.push(UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            username: username.to_string(),
        });
        self
    }

    /// Set the following list returned (as a single page) for any user.
    pub fn with_following(self, following: Vec<FollowingRecord>) -> Self {
        *self.following.lock().unwrap() = following;
        self
    }

    /// Every page response advertises a continuation token, so only the
    /// caller's page cap can stop a full retrieval.
    pub fn with_endless_pagination(mut self) -> Self {
        self.endless_pagination = true;
        self
    }

    /// Every following-page fetch fails with an API error.
    pub fn with_following_error(mut self) -> Self {
        self.fail_following = true;
        self
    }

    /// Replace the following list between cycles.
    pub fn set_following(&self, following: Vec<FollowingRecord>) {
        *self.following.lock().unwrap() = following;
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

pub fn following_record(id: &str, username: &str) -> FollowingRecord {
    FollowingRecord {
        id: id.to_string(),
        name: format!("Name {}", username),
        username: username.to_string(),
    }
}

#[async_trait]
impl TwitterApi for MockTwitterClient {
    async fn resolve_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserRecord, AppError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or_else(|| AppError::account_not_found(username))
    }

    async fn fetch_following_page(
        &self,
        _user_id: &str,
        _max_results: u32,
        _pagination_token: Option<&str>,
    ) -> Result<FollowingPage, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_following {
            return Err(AppError::api("mock following fetch failure"));
        }

        let all = self.following.lock().unwrap().clone();
        let ids = all.iter().map(|f| f.id.clone()).collect();
        Ok(FollowingPage {
            ids,
            count: all.len(),
            all,
            next_page_token: self
                .endless_pagination
                .then(|| "next".to_string()),
        })
    }
}
