//! Flat records handed back to callers. Field names double as the JSON keys.
use serde::Serialize;
use time::Date;

/// One post from a user's timeline, annotated with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    /// UTC calendar date of `created_at`.
    pub created: Date,
    /// Repost count.
    pub retweeted: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    /// Compound polarity in `[-1.0, 1.0]`.
    pub score: f64,
}

/// Result of a post fetch: the declared total plus the posts actually returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub user: String,
    pub count: u64,
    pub tweets: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowedAccount {
    pub name: String,
    pub screen_name: String,
    pub followers: u64,
    pub created: Date,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn post_serializes_empty_lists_and_plain_date() {
        let post = Post {
            id: "42".into(),
            created: date!(2018 - 10 - 10),
            retweeted: 3,
            text: "hello".into(),
            hashtags: vec![],
            urls: vec![],
            mentions: vec![],
            score: 0.0,
        };
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({
                "id": "42",
                "created": "2018-10-10",
                "retweeted": 3,
                "text": "hello",
                "hashtags": [],
                "urls": [],
                "mentions": [],
                "score": 0.0
            })
        );
    }
}
