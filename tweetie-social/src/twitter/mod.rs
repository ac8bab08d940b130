//! Twitter v1.1 integration surface.
//!
//! - [`credentials`]: the local key file and its four secrets
//! - [`client`]: [`authenticate`] plus the signed [`TwitterApi`] fetchers
//! - [`types`]: raw API payloads; [`records`]: the flat records callers get
//! - [`extract`]: the mapping between the two
pub mod client;
pub mod credentials;
pub mod extract;
pub mod records;
pub mod types;

pub use client::{DEFAULT_API_BASE, TwitterApi, authenticate, authenticate_with};
pub use credentials::{Credentials, load_keys};
pub use records::{AccountSummary, FollowedAccount, Post};
