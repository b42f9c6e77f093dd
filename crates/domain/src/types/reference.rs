//! Branches, bookmarks and tags

use serde::Serialize;

use super::Commit;
use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{opt_embedded, opt_str, Links, Object};

/// Fields common to every kind of ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefTarget {
    pub name: Option<String>,
    /// Commit the ref points at.
    pub target: Option<Commit>,
    pub links: Links,
}

impl RefTarget {
    fn from_object(obj: &Object) -> Result<Self> {
        Ok(Self {
            name: opt_str(obj, "name")?,
            target: opt_embedded(obj, "target")?,
            links: Links::from_object(obj)?,
        })
    }
}

/// A named pointer into the history of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ref {
    /// Git branch.
    Branch(RefTarget),
    /// Mercurial named branch.
    NamedBranch(RefTarget),
    /// Mercurial bookmark.
    Bookmark(RefTarget),
    Tag(RefTarget),
}

impl Ref {
    pub const fn info(&self) -> &RefTarget {
        match self {
            Self::Branch(info) | Self::NamedBranch(info) | Self::Bookmark(info) | Self::Tag(info) => {
                info
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.info().name.as_deref()
    }

    pub const fn target(&self) -> Option<&Commit> {
        self.info().target.as_ref()
    }

    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Branch(_) => "branch",
            Self::NamedBranch(_) => "named_branch",
            Self::Bookmark(_) => "bookmark",
            Self::Tag(_) => "tag",
        }
    }

    /// Branch-like refs move with new commits; tags do not.
    pub const fn is_branch(&self) -> bool {
        !matches!(self, Self::Tag(_))
    }
}

impl Resource for Ref {
    const TAGS: &'static [&'static str] = &["branch", "named_branch", "bookmark", "tag"];

    fn from_tagged(tag: &str, obj: &Object) -> Result<Self> {
        let info = RefTarget::from_object(obj)?;
        Ok(match tag {
            "named_branch" => Self::NamedBranch(info),
            "bookmark" => Self::Bookmark(info),
            "tag" => Self::Tag(info),
            _ => Self::Branch(info),
        })
    }
}
