//! Social network clients and extractors used by tweetie.
//!
//! Only Twitter's v1.1 REST API is implemented: credential loading, an
//! OAuth-signed client, and the post / following fetchers that reshape API
//! payloads into flat records. Posts are scored with a [`sentiment`] scorer.
pub mod error;
pub mod sentiment;
pub mod twitter;

pub use error::{Result, SocialError};
