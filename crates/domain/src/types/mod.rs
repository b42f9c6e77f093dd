//! Typed Bitbucket resources
//!
//! Each resource family is a closed sum type keyed by the `type` tag; shared
//! fields live in a plain struct held by every variant.

pub mod account;
pub mod commit;
pub mod issue;
pub mod project;
pub mod reference;
pub mod rendered;
pub mod repository;

use serde::Serialize;

pub use account::{Account, AccountProfile, TeamAccount, UserAccount};
pub use commit::Commit;
pub use issue::Issue;
pub use project::Project;
pub use reference::{Ref, RefTarget};
pub use rendered::Rendered;
pub use repository::Repository;

use crate::decode::Resource;
use crate::errors::Result;
use crate::json::Object;

/// Any resource this crate knows how to decode, for documents of unknown
/// kind such as webhook payload members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnyResource {
    Account(Account),
    Repository(Box<Repository>),
    Ref(Ref),
    Commit(Box<Commit>),
    Issue(Box<Issue>),
    Project(Project),
    Rendered(Rendered),
}

impl AnyResource {
    /// Tag the resource was decoded from.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Account(account) => account.tag(),
            Self::Repository(_) => "repository",
            Self::Ref(r) => r.tag(),
            Self::Commit(_) => "commit",
            Self::Issue(_) => "issue",
            Self::Project(_) => "project",
            Self::Rendered(_) => "rendered",
        }
    }
}

impl Resource for AnyResource {
    const TAGS: &'static [&'static str] = &[
        "user",
        "team",
        "repository",
        "branch",
        "named_branch",
        "bookmark",
        "tag",
        "commit",
        "issue",
        "project",
        "rendered",
    ];

    fn from_tagged(tag: &str, obj: &Object) -> Result<Self> {
        Ok(match tag {
            "user" | "team" => Self::Account(Account::from_tagged(tag, obj)?),
            "repository" => Self::Repository(Box::new(Repository::from_tagged(tag, obj)?)),
            "commit" => Self::Commit(Box::new(Commit::from_tagged(tag, obj)?)),
            "issue" => Self::Issue(Box::new(Issue::from_tagged(tag, obj)?)),
            "project" => Self::Project(Project::from_tagged(tag, obj)?),
            "rendered" => Self::Rendered(Rendered::from_tagged(tag, obj)?),
            _ => Self::Ref(Ref::from_tagged(tag, obj)?),
        })
    }
}
