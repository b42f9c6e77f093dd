//! Repositories

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use super::{Account, Project, Ref};
use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{counter, flag, opt_datetime, opt_embedded, opt_str, opt_uuid, Links, Object};

/// A source repository (`type: "repository"`).
///
/// Owner, main branch and project are decoded eagerly from the embedded
/// objects; issues and other collections are reachable only through
/// [`Repository::issues_link`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "repository")]
pub struct Repository {
    pub uuid: Option<Uuid>,
    pub name: Option<String>,
    /// `owner/slug`, the path component used by every repository endpoint.
    pub full_name: Option<String>,
    pub description: Option<String>,
    /// Defaults to `false`.
    pub is_private: bool,
    /// `git` or `hg`.
    pub scm: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    /// Size in bytes, [`crate::UNKNOWN_COUNT`] when not reported.
    pub size: i64,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub fork_policy: Option<String>,
    pub language: Option<String>,
    pub website: Option<String>,
    pub owner: Option<Account>,
    pub mainbranch: Option<Ref>,
    pub project: Option<Project>,
    pub links: Links,
}

impl Repository {
    /// Owner part of `full_name`.
    pub fn owner_name(&self) -> Option<&str> {
        self.full_name.as_deref().and_then(|full| full.split_once('/')).map(|(owner, _)| owner)
    }

    /// Repository slug part of `full_name`.
    pub fn slug(&self) -> Option<&str> {
        self.full_name.as_deref().and_then(|full| full.split_once('/')).map(|(_, slug)| slug)
    }

    pub fn issues_link(&self) -> Option<&Url> {
        self.links.get("issues")
    }

    pub fn html_link(&self) -> Option<&Url> {
        self.links.get("html")
    }
}

impl Resource for Repository {
    const TAGS: &'static [&'static str] = &["repository"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self {
            uuid: opt_uuid(obj, "uuid")?,
            name: opt_str(obj, "name")?,
            full_name: opt_str(obj, "full_name")?,
            description: opt_str(obj, "description")?,
            is_private: flag(obj, "is_private")?,
            scm: opt_str(obj, "scm")?,
            created_on: opt_datetime(obj, "created_on")?,
            updated_on: opt_datetime(obj, "updated_on")?,
            size: counter(obj, "size")?,
            has_issues: flag(obj, "has_issues")?,
            has_wiki: flag(obj, "has_wiki")?,
            fork_policy: opt_str(obj, "fork_policy")?,
            language: opt_str(obj, "language")?,
            website: opt_str(obj, "website")?,
            owner: opt_embedded(obj, "owner")?,
            mainbranch: opt_embedded(obj, "mainbranch")?,
            project: opt_embedded(obj, "project")?,
            links: Links::from_object(obj)?,
        })
    }
}
