//! Loading the four OAuth secrets from a local credential file.
//!
//! The file's first line holds
//! `consumer_key, consumer_secret, access_token, access_token_secret`.
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tweetie_http::OAuth1Keys;

use crate::error::{Result, SocialError};

const FIELD_COUNT: usize = 4;

/// Read the first line of `path` and split it into its fields.
///
/// The delimiter is a comma plus at most one following space, so both
/// `k, s, t, ts` and `k,s,t,ts` yield `["k", "s", "t", "ts"]`. Whitespace
/// inside a field is kept as written.
pub fn load_keys(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let io_err = |source| SocialError::CredentialsIo {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).map_err(io_err)?;

    Ok(split_fields(line.trim()))
}

fn split_fields(line: &str) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    line.split(',')
        .map(|field| field.strip_prefix(' ').unwrap_or(field).to_owned())
        .collect()
}

/// Consumer pair plus access token pair. Held only in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let fields = load_keys(path)?;
        if fields.len() < FIELD_COUNT {
            return Err(SocialError::MalformedCredentials {
                path: path.to_path_buf(),
                found: fields.len(),
            });
        }
        if fields.len() > FIELD_COUNT {
            tracing::warn!(
                path = %path.display(),
                extra = fields.len() - FIELD_COUNT,
                "credentials.extra_fields_ignored"
            );
        }

        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Ok(Self {
            consumer_key: next(),
            consumer_secret: next(),
            access_token: next(),
            access_token_secret: next(),
        })
    }

    /// Consumer pair first, then the access token pair attached to it.
    pub fn oauth_keys(&self) -> OAuth1Keys {
        OAuth1Keys::new(&self.consumer_key, &self.consumer_secret)
            .with_access_token(&self.access_token, &self.access_token_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_comma_space_fields_in_order() {
        let file = key_file("ck, cs, at, ats\n");
        assert_eq!(load_keys(file.path()).unwrap(), vec!["ck", "cs", "at", "ats"]);
    }

    #[test]
    fn loads_bare_comma_fields() {
        let file = key_file("k,s,t,ts");
        assert_eq!(load_keys(file.path()).unwrap(), vec!["k", "s", "t", "ts"]);
    }

    #[test]
    fn only_first_line_is_read() {
        let file = key_file("a, b, c, d\r\ne, f, g, h\n");
        assert_eq!(load_keys(file.path()).unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn inner_whitespace_is_not_trimmed() {
        let file = key_file("a,  b, c , d");
        assert_eq!(load_keys(file.path()).unwrap(), vec!["a", " b", "c ", "d"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_keys(dir.path().join("twitter.csv")).unwrap_err();
        assert!(matches!(err, SocialError::CredentialsIo { .. }));
    }

    #[test]
    fn too_few_fields_fail() {
        for contents in ["", "ck, cs, at", "ck cs at ats"] {
            let file = key_file(contents);
            match Credentials::from_file(file.path()) {
                Err(SocialError::MalformedCredentials { found, .. }) => assert!(found < 4),
                other => panic!("{contents:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn extra_fields_are_ignored() {
        let file = key_file("ck, cs, at, ats, extra");
        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.access_token_secret, "ats");
    }

    #[test]
    fn debug_hides_secrets() {
        let file = key_file("ck, consumer-secret, token, token-secret");
        let creds = Credentials::from_file(file.path()).unwrap();
        let shown = format!("{creds:?}");
        assert!(shown.contains("ck"));
        assert!(!shown.contains("consumer-secret"));
        assert!(!shown.contains("token-secret"));
        assert_eq!(creds.oauth_keys().consumer_key(), "ck");
    }
}
