//! OAuth-signed wrapper around the Twitter v1.1 REST API.
//!
//! Every fetch is a plain sequence of awaited requests: one failed call aborts
//! the whole operation and no partial results are returned. Retries on
//! 429/5xx are left to the shared [`HttpClient`].
use std::borrow::Cow;
use std::path::Path;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tweetie_http::{Auth, HttpClient, HttpError, OAuth1Keys, RequestOpts};

use crate::error::{Result, SocialError};
use crate::sentiment::{SentimentScorer, VaderScorer};
use crate::twitter::credentials::Credentials;
use crate::twitter::extract;
use crate::twitter::records::{AccountSummary, FollowedAccount};
use crate::twitter::types::{ApiTweet, ApiUser, FriendsPage};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1/";

/// Upper bound Twitter accepts for both `count` parameters used here.
const MAX_PAGE: u32 = 200;

/// Load credentials from `path` and bind them to a client for the public API.
///
/// Purely local: nothing is sent until the first fetch, which is where
/// rejected credentials surface as [`SocialError::Unauthorized`].
pub fn authenticate(path: impl AsRef<Path>) -> Result<TwitterApi> {
    let http = HttpClient::new(DEFAULT_API_BASE)?;
    authenticate_with(path, http)
}

/// Same as [`authenticate`] against a caller-configured HTTP client.
pub fn authenticate_with(path: impl AsRef<Path>, http: HttpClient) -> Result<TwitterApi> {
    let credentials = Credentials::from_file(path)?;
    Ok(TwitterApi::with_http(&credentials, http))
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    keys: OAuth1Keys,
    timeline_count: u32,
    friends_page_size: u32,
}

impl TwitterApi {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Ok(Self::with_http(credentials, HttpClient::new(DEFAULT_API_BASE)?))
    }

    pub fn with_http(credentials: &Credentials, http: HttpClient) -> Self {
        Self {
            http,
            keys: credentials.oauth_keys(),
            timeline_count: 100,
            friends_page_size: MAX_PAGE,
        }
    }

    /// Posts requested per timeline call (1..=200).
    pub fn with_timeline_count(mut self, n: u32) -> Self {
        self.timeline_count = n.clamp(1, MAX_PAGE);
        self
    }

    /// Accounts requested per `friends/list` page (1..=200).
    pub fn with_friends_page_size(mut self, n: u32) -> Self {
        self.friends_page_size = n.clamp(1, MAX_PAGE);
        self
    }

    /// Resolve a screen name to its profile.
    pub async fn get_user(&self, screen_name: &str) -> Result<ApiUser> {
        self.get(
            "users/show.json",
            screen_name,
            vec![
                ("screen_name", screen_name.into()),
                ("include_entities", "false".into()),
            ],
        )
        .await
    }

    /// Recent posts of `screen_name`, each scored by a scorer built for this call.
    pub async fn fetch_tweets(&self, screen_name: &str) -> Result<AccountSummary> {
        let scorer = VaderScorer::new();
        self.fetch_tweets_with(screen_name, &scorer).await
    }

    /// Recent posts of `screen_name` scored by `scorer`, in the order Twitter
    /// returns them (newest first).
    pub async fn fetch_tweets_with<S>(&self, screen_name: &str, scorer: &S) -> Result<AccountSummary>
    where
        S: SentimentScorer + ?Sized,
    {
        let user = self.get_user(screen_name).await?;
        let raw: Vec<ApiTweet> = self
            .get(
                "statuses/user_timeline.json",
                screen_name,
                vec![
                    ("screen_name", screen_name.into()),
                    ("count", self.timeline_count.to_string().into()),
                    ("trim_user", "true".into()),
                ],
            )
            .await?;

        let mut tweets = Vec::with_capacity(raw.len());
        for tweet in raw {
            tweets.push(extract::post(tweet, scorer)?);
        }

        tracing::info!(
            screen_name = %user.screen_name,
            declared = user.statuses_count,
            fetched = tweets.len(),
            "twitter.tweets.fetched"
        );
        Ok(AccountSummary {
            user: user.screen_name,
            count: user.statuses_count,
            tweets,
        })
    }

    /// Every account `screen_name` follows, across all `friends/list` pages.
    pub async fn fetch_following(&self, screen_name: &str) -> Result<Vec<FollowedAccount>> {
        let following: Vec<FollowedAccount> =
            self.following_stream(screen_name).try_collect().await?;
        tracing::info!(
            %screen_name,
            count = following.len(),
            "twitter.following.fetched"
        );
        Ok(following)
    }

    /// Lazily page through `friends/list`, starting at cursor -1 and stopping
    /// once Twitter reports a next cursor of 0. The stream ends after the first
    /// error.
    pub fn following_stream<'a>(
        &'a self,
        screen_name: &'a str,
    ) -> impl Stream<Item = Result<FollowedAccount>> + 'a {
        try_stream! {
            let mut cursor: i64 = -1;
            let mut page_no = 0usize;
            loop {
                page_no += 1;
                let page: FriendsPage = self
                    .get(
                        "friends/list.json",
                        screen_name,
                        vec![
                            ("screen_name", screen_name.into()),
                            ("cursor", cursor.to_string().into()),
                            ("count", self.friends_page_size.to_string().into()),
                            ("skip_status", "true".into()),
                            ("include_user_entities", "false".into()),
                        ],
                    )
                    .await?;

                tracing::debug!(
                    %screen_name,
                    page_no,
                    cursor,
                    users = page.users.len(),
                    next_cursor = page.next_cursor,
                    "twitter.following.page"
                );

                for user in page.users {
                    yield extract::followed_account(user)?;
                }

                if page.next_cursor == 0 {
                    break;
                }
                cursor = page.next_cursor;
            }
        }
    }

    async fn get<T>(
        &self,
        path: &str,
        screen_name: &str,
        query: Vec<(&str, Cow<'_, str>)>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.http
            .get_json(
                path,
                RequestOpts {
                    auth: Some(Auth::OAuth1(&self.keys)),
                    query: Some(query),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| classify(err, screen_name))
    }
}

/// Lift the HTTP statuses callers care about into dedicated variants.
fn classify(err: HttpError, screen_name: &str) -> SocialError {
    match (err.status().map(|s| s.as_u16()), err) {
        (Some(404), _) => SocialError::NotFound {
            screen_name: screen_name.to_owned(),
        },
        (Some(401 | 403), HttpError::Api { message, .. }) => SocialError::Unauthorized { message },
        (_, err) => SocialError::Http(err),
    }
}
