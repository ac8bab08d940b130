//! Raw Twitter v1.1 payloads, restricted to the fields tweetie reads.
//!
//! Required keys are not defaulted: a payload missing one fails to decode.
//! Only entity lists default to empty, since Twitter omits them freely.
use serde::{Deserialize, Serialize};

/// `users/show.json` and the elements of `friends/list.json`'s `users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id_str: String,
    pub name: String,
    pub screen_name: String,
    pub followers_count: u64,
    pub friends_count: u64,
    pub statuses_count: u64,
    /// e.g. `Wed Oct 10 20:19:24 +0000 2018`
    pub created_at: String,
    pub profile_image_url_https: String,
}

/// One element of `statuses/user_timeline.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTweet {
    pub id_str: String,
    pub created_at: String,
    pub retweet_count: u64,
    pub text: String,
    pub entities: Entities,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<MentionEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagEntity {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    /// The t.co link as it appears in the text.
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentionEntity {
    pub screen_name: String,
}

/// One page of `friends/list.json`. A `next_cursor` of 0 marks the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct FriendsPage {
    pub users: Vec<ApiUser>,
    pub next_cursor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tweet_without_entity_lists_decodes_to_empty() {
        let tweet: ApiTweet = serde_json::from_value(json!({
            "id_str": "1",
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "retweet_count": 0,
            "text": "plain",
            "entities": {}
        }))
        .unwrap();
        assert!(tweet.entities.hashtags.is_empty());
        assert!(tweet.entities.urls.is_empty());
        assert!(tweet.entities.user_mentions.is_empty());
    }

    #[test]
    fn tweet_missing_required_key_is_rejected() {
        let result = serde_json::from_value::<ApiTweet>(json!({
            "id_str": "1",
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "text": "no retweet_count",
            "entities": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn null_expanded_url_is_none() {
        let entity: UrlEntity =
            serde_json::from_value(json!({"url": "https://t.co/x", "expanded_url": null})).unwrap();
        assert_eq!(entity.expanded_url, None);
    }
}
