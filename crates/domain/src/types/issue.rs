//! Issue tracker entries

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Rendered, Repository, UserAccount};
use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{counter, opt_datetime, opt_embedded, opt_str, Links, Object};

/// An issue (`type: "issue"`).
///
/// `id`, `votes` and `watches` are [`crate::UNKNOWN_COUNT`] when the server
/// omitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "issue")]
pub struct Issue {
    pub id: i64,
    pub title: Option<String>,
    /// `new`, `open`, `resolved`, `on hold`, `invalid`, `duplicate`, `wontfix`, `closed`.
    pub state: Option<String>,
    /// `bug`, `enhancement`, `proposal` or `task`.
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub content: Option<Rendered>,
    pub reporter: Option<UserAccount>,
    pub assignee: Option<UserAccount>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub edited_on: Option<DateTime<Utc>>,
    pub votes: i64,
    pub watches: i64,
    pub repository: Option<Box<Repository>>,
    pub links: Links,
}

impl Issue {
    /// Whether the issue still needs work.
    pub fn is_open(&self) -> bool {
        matches!(self.state.as_deref(), Some("new" | "open" | "on hold"))
    }
}

impl Resource for Issue {
    const TAGS: &'static [&'static str] = &["issue"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self {
            id: counter(obj, "id")?,
            title: opt_str(obj, "title")?,
            state: opt_str(obj, "state")?,
            kind: opt_str(obj, "kind")?,
            priority: opt_str(obj, "priority")?,
            content: opt_embedded(obj, "content")?,
            reporter: opt_embedded(obj, "reporter")?,
            assignee: opt_embedded(obj, "assignee")?,
            created_on: opt_datetime(obj, "created_on")?,
            updated_on: opt_datetime(obj, "updated_on")?,
            edited_on: opt_datetime(obj, "edited_on")?,
            votes: counter(obj, "votes")?,
            watches: counter(obj, "watches")?,
            repository: opt_embedded::<Repository>(obj, "repository")?.map(Box::new),
            links: Links::from_object(obj)?,
        })
    }
}
