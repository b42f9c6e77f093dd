//! User and team accounts

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{flag, opt_datetime, opt_str, opt_uuid, Links, Object};

/// Fields shared by users and teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountProfile {
    pub uuid: Option<Uuid>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub links: Links,
}

impl AccountProfile {
    fn from_object(obj: &Object) -> Result<Self> {
        Ok(Self {
            uuid: opt_uuid(obj, "uuid")?,
            username: opt_str(obj, "username")?,
            display_name: opt_str(obj, "display_name")?,
            website: opt_str(obj, "website")?,
            location: opt_str(obj, "location")?,
            created_on: opt_datetime(obj, "created_on")?,
            links: Links::from_object(obj)?,
        })
    }

    /// Collection link of the account's repositories, when the server sent one.
    pub fn repositories_link(&self) -> Option<&Url> {
        self.links.get("repositories")
    }
}

/// An individual user (`type: "user"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    #[serde(flatten)]
    pub profile: AccountProfile,
    pub account_id: Option<String>,
    pub nickname: Option<String>,
    /// Defaults to `false`.
    pub is_staff: bool,
}

impl Resource for UserAccount {
    const TAGS: &'static [&'static str] = &["user"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self {
            profile: AccountProfile::from_object(obj)?,
            account_id: opt_str(obj, "account_id")?,
            nickname: opt_str(obj, "nickname")?,
            is_staff: flag(obj, "is_staff")?,
        })
    }
}

/// A team (`type: "team"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAccount {
    #[serde(flatten)]
    pub profile: AccountProfile,
}

impl Resource for TeamAccount {
    const TAGS: &'static [&'static str] = &["team"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self { profile: AccountProfile::from_object(obj)? })
    }
}

/// Either kind of account, e.g. a repository owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Account {
    User(UserAccount),
    Team(TeamAccount),
}

impl Account {
    pub const fn profile(&self) -> &AccountProfile {
        match self {
            Self::User(user) => &user.profile,
            Self::Team(team) => &team.profile,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.profile().username.as_deref()
    }

    pub const fn tag(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Team(_) => "team",
        }
    }

    pub const fn as_user(&self) -> Option<&UserAccount> {
        match self {
            Self::User(user) => Some(user),
            Self::Team(_) => None,
        }
    }

    pub const fn as_team(&self) -> Option<&TeamAccount> {
        match self {
            Self::Team(team) => Some(team),
            Self::User(_) => None,
        }
    }
}

impl Resource for Account {
    const TAGS: &'static [&'static str] = &["user", "team"];

    fn from_tagged(tag: &str, obj: &Object) -> Result<Self> {
        if tag == "team" {
            TeamAccount::from_tagged(tag, obj).map(Self::Team)
        } else {
            UserAccount::from_tagged(tag, obj).map(Self::User)
        }
    }
}
