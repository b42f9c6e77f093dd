use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Rendered, Repository, UserAccount};
use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{embedded_list, opt_datetime, opt_embedded, opt_object, opt_str, Links, Object};

/// A changeset (`type: "commit"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "commit")]
pub struct Commit {
    pub hash: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub summary: Option<Rendered>,
    /// Author as recorded by the SCM, e.g. `Ada <ada@example.org>`.
    pub author_raw: Option<String>,
    /// Bitbucket account matched to the author, if any.
    pub author: Option<UserAccount>,
    /// Parent commits, usually only `hash` and `links` are populated.
    pub parents: Vec<Commit>,
    pub repository: Option<Box<Repository>>,
    pub links: Links,
}

impl Commit {
    /// First 12 characters of the hash, as the web UI shows it.
    pub fn short_hash(&self) -> Option<&str> {
        self.hash.as_deref().map(|hash| hash.get(..12).unwrap_or(hash))
    }
}

impl Resource for Commit {
    const TAGS: &'static [&'static str] = &["commit"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        let (author_raw, author) = match opt_object(obj, "author")? {
            Some(author) => (
                opt_str(author, "raw").map_err(|e| e.within("author"))?,
                opt_embedded::<UserAccount>(author, "user").map_err(|e| e.within("author"))?,
            ),
            None => (None, None),
        };

        Ok(Self {
            hash: opt_str(obj, "hash")?,
            date: opt_datetime(obj, "date")?,
            message: opt_str(obj, "message")?,
            summary: opt_embedded(obj, "summary")?,
            author_raw,
            author,
            parents: embedded_list(obj, "parents")?,
            repository: opt_embedded::<Repository>(obj, "repository")?.map(Box::new),
            links: Links::from_object(obj)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::decode;
    use crate::errors::DecodeError;

    #[test]
    fn decodes_parents_and_author() {
        let commit = decode::<Commit>(&json!({
            "type": "commit",
            "hash": "61d9e64348f9da407e62f64726337fd3bb24b466",
            "date": "2013-10-21T07:21:51+00:00",
            "message": "Fix the widget\n",
            "summary": {"type": "rendered", "raw": "Fix the widget", "markup": "markdown"},
            "author": {
                "type": "author",
                "raw": "Ada <ada@example.org>",
                "user": {"type": "user", "username": "ada"}
            },
            "parents": [
                {"type": "commit", "hash": "0cfe7b4a3b2e"},
                {"type": "commit", "hash": "a8d3f2c9e110"}
            ]
        }))
        .unwrap();

        assert_eq!(commit.short_hash(), Some("61d9e64348f9"));
        assert_eq!(commit.author_raw.as_deref(), Some("Ada <ada@example.org>"));
        assert_eq!(commit.author.unwrap().profile.username.as_deref(), Some("ada"));
        assert_eq!(commit.parents.len(), 2);
        assert_eq!(commit.parents[1].hash.as_deref(), Some("a8d3f2c9e110"));
        assert_eq!(commit.summary.unwrap().markup.as_deref(), Some("markdown"));
    }

    #[test]
    fn bad_parent_reports_indexed_path() {
        let err = decode::<Commit>(&json!({
            "type": "commit",
            "parents": [{"type": "commit"}, {"type": "branch"}]
        }))
        .unwrap_err();

        assert!(matches!(err, DecodeError::TypeMismatch { ref path, .. } if path == "$.parents[1]"));
    }

    #[test]
    fn author_user_with_wrong_tag_is_rejected() {
        let err = decode::<Commit>(&json!({
            "type": "commit",
            "author": {"raw": "acme", "user": {"type": "team"}}
        }))
        .unwrap_err();

        assert_eq!(err.path(), "$.author.user");
    }
}
