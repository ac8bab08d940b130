//! Stdout rendering. Text mode prints one tab-separated line per record;
//! JSON mode prints the records as a pretty JSON document.
use std::io::Write;

use anyhow::Result;
use tweetie_common::OutputFormat;
use tweetie_social::twitter::types::ApiUser;
use tweetie_social::twitter::{AccountSummary, FollowedAccount};

pub fn following<W: Write>(
    out: &mut W,
    accounts: &[FollowedAccount],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, accounts),
        OutputFormat::Text => {
            for account in accounts {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    one_line(&account.name),
                    account.screen_name,
                    account.followers,
                    account.created,
                    account.image
                )?;
            }
            Ok(())
        }
    }
}

pub fn tweets<W: Write>(out: &mut W, summary: &AccountSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, summary),
        OutputFormat::Text => {
            writeln!(out, "{}\t{}", summary.user, summary.count)?;
            for post in &summary.tweets {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{}",
                    post.id,
                    post.created,
                    post.retweeted,
                    post.score,
                    post.hashtags.join(","),
                    post.urls.join(","),
                    post.mentions.join(","),
                    one_line(&post.text)
                )?;
            }
            Ok(())
        }
    }
}

pub fn profile<W: Write>(out: &mut W, user: &ApiUser, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, user),
        OutputFormat::Text => {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                one_line(&user.name),
                user.screen_name,
                user.statuses_count,
                user.followers_count,
                user.friends_count,
                user.created_at,
                user.profile_image_url_https
            )?;
            Ok(())
        }
    }
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Tabs and newlines would break the one-record-per-line layout.
fn one_line(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use tweetie_social::twitter::Post;

    fn account(screen_name: &str) -> FollowedAccount {
        FollowedAccount {
            name: format!("{screen_name} name"),
            screen_name: screen_name.into(),
            followers: 10,
            created: date!(2012 - 03 - 04),
            image: format!("https://pbs.twimg.com/{screen_name}.png"),
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn following_text_is_one_line_per_account() {
        let accounts = vec![account("alpha"), account("beta")];
        let text = render(|out| following(out, &accounts, OutputFormat::Text));
        assert_eq!(
            text,
            "alpha name\talpha\t10\t2012-03-04\thttps://pbs.twimg.com/alpha.png\n\
             beta name\tbeta\t10\t2012-03-04\thttps://pbs.twimg.com/beta.png\n"
        );
    }

    #[test]
    fn following_json_is_an_array_of_records() {
        let accounts = vec![account("alpha")];
        let text = render(|out| following(out, &accounts, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["screen_name"], "alpha");
        assert_eq!(value[0]["created"], "2012-03-04");
        assert_eq!(value[0]["followers"], 10);
    }

    #[test]
    fn tweets_text_flattens_multiline_posts() {
        let summary = AccountSummary {
            user: "parrt".into(),
            count: 9,
            tweets: vec![Post {
                id: "1".into(),
                created: date!(2020 - 01 - 02),
                retweeted: 0,
                text: "line one\nline two".into(),
                hashtags: vec!["a".into(), "b".into()],
                urls: vec![],
                mentions: vec!["jack".into()],
                score: 0.5,
            }],
        };
        let text = render(|out| tweets(out, &summary, OutputFormat::Text));
        assert_eq!(
            text,
            "parrt\t9\n1\t2020-01-02\t0\t0.5000\ta,b\t\tjack\tline one line two\n"
        );
    }
}
