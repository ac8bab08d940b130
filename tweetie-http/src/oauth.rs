//! OAuth 1.0a request signing (HMAC-SHA1), as required by Twitter's v1.1
//! user-context endpoints.
//!
//! Every call to [`OAuth1Keys::authorization_header`] draws a fresh nonce and
//! timestamp, so retried requests are re-signed rather than replayed.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Method, Url};
use sha1::Sha1;
use uuid::Uuid;

use crate::HttpError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const OAUTH_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Consumer key pair plus the access token pair of the authorising user.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Keys {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl fmt::Debug for OAuth1Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Keys")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

impl OAuth1Keys {
    /// Start from the application's consumer pair; attach the user's token with
    /// [`OAuth1Keys::with_access_token`].
    ///
    /// ```
    /// use tweetie_http::OAuth1Keys;
    ///
    /// let keys = OAuth1Keys::new("ck", "cs").with_access_token("at", "ats");
    /// assert_eq!(keys.consumer_key(), "ck");
    /// assert!(!format!("{keys:?}").contains("ats"));
    /// ```
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: String::new(),
            token_secret: String::new(),
        }
    }

    pub fn with_access_token(
        mut self,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        self.token = token.into();
        self.token_secret = token_secret.into();
        self
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Build the `Authorization` header value for one request.
    ///
    /// `params` are the request's query (or form) parameters; any query already
    /// present on `url` is folded into the signature as well.
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.authorization_header_at(method, url, params, &nonce, timestamp)
    }

    fn authorization_header_at(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String, HttpError> {
        let timestamp = timestamp.to_string();
        let protocol = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];
        let signature = self.signature(method, url, params, &protocol)?;

        let mut fields: Vec<String> = protocol
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        fields.push(format!("oauth_signature=\"{}\"", encode(&signature)));
        fields.sort();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn signature(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
        protocol: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        let base = signature_base(method, url, params, protocol);
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| HttpError::Signing(e.to_string()))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn signature_base(
    method: &Method,
    url: &Url,
    params: &[(&str, &str)],
    protocol: &[(&str, &str)],
) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(
            params
                .iter()
                .chain(protocol.iter())
                .map(|(k, v)| (encode(k), encode(v))),
        )
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        encode(base_url.as_str()),
        encode(&normalized)
    )
}

/// Percent-encode per RFC 3986 (the only encoding OAuth 1.0a accepts).
pub fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, OAUTH_RESERVED).to_string()
}
