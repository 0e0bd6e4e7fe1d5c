//! Twitter API client.
//!
//! Wraps the three outbound calls the tracker needs: the OAuth2
//! client-credentials token exchange, user lookup by username, and the
//! paginated following-list endpoint. The bearer token is acquired
//! lazily, cached in memory, and persisted back to the [`ConfigStore`]
//! when freshly obtained so later runs skip the exchange entirely.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::ConfigStore;
use crate::error::AppError;

/// Hard cap on pagination requests per full-list retrieval. Bounds the
/// worst-case API cost of a single tracking cycle.
pub const MAX_FOLLOWING_PAGES: usize = 10;

/// Page size requested from the following-list endpoint.
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

const API_BASE_URL: &str = "https://api.twitter.com";
const OAUTH_TOKEN_URL: &str = "https://api.twitter.com/oauth2/token";

/// Resolved identity of an account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// One entry of a following list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct FollowingRecord {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// One page of a following list.
#[derive(Debug, Clone)]
pub struct FollowingPage {
    pub ids: Vec<String>,
    pub count: usize,
    pub all: Vec<FollowingRecord>,
    pub next_page_token: Option<String>,
}

/// Full following list concatenated across pages, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct FollowingList {
    pub ids: Vec<String>,
    pub all: Vec<FollowingRecord>,
    pub count: usize,
}

/// Outbound API surface the tracking engine depends on.
///
/// `fetch_all_following` is a default method so every implementation,
/// including test mocks, gets the same pagination-cap behavior.
#[async_trait]
pub trait TwitterApi {
    /// Resolve id and display name for a handle.
    async fn resolve_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserRecord, AppError>;

    /// Fetch a single following-list page.
    async fn fetch_following_page(
        &self,
        user_id: &str,
        max_results: u32,
        pagination_token: Option<&str>,
    ) -> Result<FollowingPage, AppError>;

    /// Fetch the full following list, up to [`MAX_FOLLOWING_PAGES`] pages.
    /// Stops early when the API returns no continuation token.
    async fn fetch_all_following(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> Result<FollowingList, AppError> {
        let mut list = FollowingList::default();
        let mut next_page_token: Option<String> = None;

        for page_index in 0..MAX_FOLLOWING_PAGES {
            tracing::info!(
                "fetching following list {} to {}",
                page_index as u32 * max_results,
                (page_index as u32 + 1) * max_results,
            );
            let page = self
                .fetch_following_page(
                    user_id,
                    max_results,
                    next_page_token.as_deref(),
                )
                .await?;

            list.ids.extend(page.ids);
            list.all.extend(page.all);
            list.count += page.count;

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        Ok(list)
    }
}

// ---- Wire formats -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserLookupResponse {
    data: Option<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct FollowingPageResponse {
    #[serde(default)]
    data: Vec<FollowingRecord>,
    meta: Option<FollowingPageMeta>,
}

#[derive(Debug, Deserialize)]
struct FollowingPageMeta {
    next_token: Option<String>,
}

// ---- Client -----------------------------------------------------------------

pub struct TwitterClient {
    http: Client,
    api_base_url: String,
    oauth_token_url: String,
    config: Arc<ConfigStore>,
    token: RwLock<Option<String>>,
}

impl TwitterClient {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self::with_base_urls(
            config,
            API_BASE_URL.to_string(),
            OAUTH_TOKEN_URL.to_string(),
        )
    }

    /// Construct against alternate endpoints. Used by tests to point the
    /// client at a stub server.
    pub fn with_base_urls(
        config: Arc<ConfigStore>,
        api_base_url: String,
        oauth_token_url: String,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base_url,
            oauth_token_url,
            config,
            token: RwLock::new(None),
        }
    }

    /// Return the bearer token, acquiring one if necessary.
    ///
    /// Resolution order: in-memory cache, persisted config token, OAuth2
    /// client-credentials exchange. A freshly exchanged token is written
    /// back to the config store so the exchange runs at most once.
    pub async fn fetch_bearer_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let conf = self.config.get().await?;

        if let Some(token) = conf.token {
            *self.token.write().await = Some(token.clone());
            return Ok(token);
        }

        let (consumer_key, consumer_secret) =
            match (conf.consumer_key, conf.consumer_secret) {
                (Some(key), Some(secret)) => (key, secret),
                _ => {
                    return Err(AppError::configuration(
                        "consumer key or/and consumer secret not found",
                    ))
                }
            };

        let response = self
            .http
            .post(&self.oauth_token_url)
            .basic_auth(&consumer_key, Some(&consumer_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|err| AppError::token_acquisition(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::token_acquisition(format!(
                "token endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|err| AppError::token_acquisition(err.to_string()))?;

        let token = body
            .access_token
            .ok_or_else(|| AppError::token_acquisition("can not fetch token"))?;

        if let Err(err) = self.config.set_token(Some(token.clone())).await {
            tracing::warn!("Failed to persist bearer token: {}", err);
        }
        *self.token.write().await = Some(token.clone());

        Ok(token)
    }
}

#[async_trait]
impl TwitterApi for TwitterClient {
    async fn resolve_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserRecord, AppError> {
        let token = self.fetch_bearer_token().await?;
        let url = format!(
            "{}/2/users/by/username/{}",
            self.api_base_url, username
        );

        let response = self.http.get(&url).bearer_auth(&token).send().await?;

        if !response.status().is_success() {
            return Err(AppError::api(format!(
                "user lookup returned HTTP {}",
                response.status()
            )));
        }

        let body: UserLookupResponse = response
            .json()
            .await
            .map_err(|err| AppError::api(err.to_string()))?;

        body.data
            .ok_or_else(|| AppError::account_not_found(username))
    }

    async fn fetch_following_page(
        &self,
        user_id: &str,
        max_results: u32,
        pagination_token: Option<&str>,
    ) -> Result<FollowingPage, AppError> {
        let token = self.fetch_bearer_token().await?;
        let mut url = format!(
            "{}/2/users/{}/following?max_results={}",
            self.api_base_url, user_id, max_results
        );
        if let Some(pagination_token) = pagination_token {
            url.push_str("&pagination_token=");
            url.push_str(pagination_token);
        }

        let response = self.http.get(&url).bearer_auth(&token).send().await?;

        if !response.status().is_success() {
            return Err(AppError::api(format!(
                "following endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: FollowingPageResponse = response
            .json()
            .await
            .map_err(|err| AppError::api(err.to_string()))?;

        let ids = body.data.iter().map(|f| f.id.clone()).collect();
        Ok(FollowingPage {
            ids,
            count: body.data.len(),
            all: body.data,
            next_page_token: body.meta.and_then(|meta| meta.next_token),
        })
    }
}
