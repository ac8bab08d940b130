//! Reshape raw API payloads into [`Post`] and [`FollowedAccount`] records.
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::{Result, SocialError};
use crate::sentiment::SentimentScorer;
use crate::twitter::records::{FollowedAccount, Post};
use crate::twitter::types::{ApiTweet, ApiUser, Entities};

/// UTC calendar date of a v1.1 timestamp such as `Wed Oct 10 20:19:24 +0000 2018`.
pub fn created_date(raw: &str) -> Result<Date> {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );
    OffsetDateTime::parse(raw, format)
        .map(|dt| dt.to_offset(UtcOffset::UTC).date())
        .map_err(|source| SocialError::Timestamp {
            value: raw.to_owned(),
            source,
        })
}

pub fn post<S>(raw: ApiTweet, scorer: &S) -> Result<Post>
where
    S: SentimentScorer + ?Sized,
{
    let created = created_date(&raw.created_at)?;
    let score = scorer.compound(&raw.text);
    let (hashtags, urls, mentions) = entity_lists(raw.entities);

    Ok(Post {
        id: raw.id_str,
        created,
        retweeted: raw.retweet_count,
        text: raw.text,
        hashtags,
        urls,
        mentions,
        score,
    })
}

pub fn followed_account(raw: ApiUser) -> Result<FollowedAccount> {
    Ok(FollowedAccount {
        created: created_date(&raw.created_at)?,
        name: raw.name,
        screen_name: raw.screen_name,
        followers: raw.followers_count,
        image: raw.profile_image_url_https,
    })
}

/// Hashtag texts, expanded URLs, and mentioned screen names, each in entity order.
fn entity_lists(entities: Entities) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut hashtags = Vec::with_capacity(entities.hashtags.len());
    for tag in entities.hashtags {
        hashtags.push(tag.text);
    }

    let mut urls = Vec::with_capacity(entities.urls.len());
    for link in entities.urls {
        urls.push(link.expanded_url.unwrap_or(link.url));
    }

    let mut mentions = Vec::with_capacity(entities.user_mentions.len());
    for mention in entities.user_mentions {
        mentions.push(mention.screen_name);
    }

    (hashtags, urls, mentions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use time::macros::date;

    fn tweet(value: serde_json::Value) -> ApiTweet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_twitter_timestamps() {
        assert_eq!(
            created_date("Wed Oct 10 20:19:24 +0000 2018").unwrap(),
            date!(2018 - 10 - 10)
        );
        assert_eq!(
            created_date("Thu Apr 06 15:24:15 +0000 2017").unwrap(),
            date!(2017 - 04 - 06)
        );
    }

    #[test]
    fn non_utc_offsets_are_normalised() {
        // 23:30 at -0200 is already the next day in UTC.
        assert_eq!(
            created_date("Sat Dec 31 23:30:00 -0200 2016").unwrap(),
            date!(2017 - 01 - 01)
        );
    }

    #[test]
    fn rejects_other_timestamp_shapes() {
        let err = created_date("2018-10-10T20:19:24Z").unwrap_err();
        assert!(matches!(err, SocialError::Timestamp { .. }));
    }

    #[test]
    fn extracts_entities_in_order() {
        let raw = tweet(json!({
            "id_str": "1050118621198921728",
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "retweet_count": 12,
            "text": "#antlr #parsing with @jack and @parrt https://t.co/a https://t.co/b",
            "entities": {
                "hashtags": [{"text": "antlr", "indices": [0, 6]}, {"text": "parsing", "indices": [7, 15]}],
                "urls": [
                    {"url": "https://t.co/a", "expanded_url": "https://www.antlr.org"},
                    {"url": "https://t.co/b", "expanded_url": null}
                ],
                "user_mentions": [{"screen_name": "jack"}, {"screen_name": "parrt"}]
            }
        }));

        let record = post(raw, &|_: &str| 0.25).unwrap();
        assert_eq!(record.id, "1050118621198921728");
        assert_eq!(record.created, date!(2018 - 10 - 10));
        assert_eq!(record.retweeted, 12);
        assert_eq!(record.hashtags, vec!["antlr", "parsing"]);
        assert_eq!(record.urls, vec!["https://www.antlr.org", "https://t.co/b"]);
        assert_eq!(record.mentions, vec!["jack", "parrt"]);
        assert_eq!(record.score, 0.25);
    }

    #[test]
    fn empty_entities_stay_empty_lists() {
        let raw = tweet(json!({
            "id_str": "7",
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "retweet_count": 0,
            "text": "nothing embedded",
            "entities": {"hashtags": [], "urls": [], "user_mentions": []}
        }));
        let record = post(raw, &|_: &str| 0.0).unwrap();
        assert!(record.hashtags.is_empty());
        assert!(record.urls.is_empty());
        assert!(record.mentions.is_empty());
    }

    #[test]
    fn scorer_sees_the_raw_text() {
        let seen = Cell::new(0usize);
        let scorer = |text: &str| {
            assert_eq!(text, "scored text");
            seen.set(seen.get() + 1);
            -0.5
        };
        let raw = tweet(json!({
            "id_str": "9",
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "retweet_count": 0,
            "text": "scored text",
            "entities": {}
        }));
        let record = post(raw, &scorer).unwrap();
        assert_eq!(record.score, -0.5);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn followed_account_fields() {
        let user: ApiUser = serde_json::from_value(json!({
            "id_str": "783214",
            "name": "Twitter",
            "screen_name": "Twitter",
            "followers_count": 56_000_000u64,
            "friends_count": 10,
            "statuses_count": 14_000,
            "created_at": "Tue Feb 20 14:35:54 +0000 2007",
            "profile_image_url_https": "https://pbs.twimg.com/profile_images/1/a.jpg"
        }))
        .unwrap();

        let account = followed_account(user).unwrap();
        assert_eq!(
            account,
            FollowedAccount {
                name: "Twitter".into(),
                screen_name: "Twitter".into(),
                followers: 56_000_000,
                created: date!(2007 - 02 - 20),
                image: "https://pbs.twimg.com/profile_images/1/a.jpg".into(),
            }
        );
    }
}
