use std::path::PathBuf;

use thiserror::Error;
use tweetie_http::HttpError;

/// Everything that can abort a credential load or a fetch.
///
/// None of these are recovered locally; they propagate to the caller.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("cannot read credentials file {}: {source}", path.display())]
    CredentialsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "credentials file {} has {found} field(s), expected 4: consumer key, consumer secret, access token, access token secret",
        path.display()
    )]
    MalformedCredentials { path: PathBuf, found: usize },

    /// Surfaced on the first authenticated request (HTTP 401/403).
    #[error("twitter rejected the credentials: {message}")]
    Unauthorized { message: String },

    #[error("account @{screen_name} not found")]
    NotFound { screen_name: String },

    #[error("malformed twitter timestamp `{value}`: {source}")]
    Timestamp {
        value: String,
        source: time::error::Parse,
    },

    #[error(transparent)]
    Http(#[from] HttpError),
}

pub type Result<T> = std::result::Result<T, SocialError>;
