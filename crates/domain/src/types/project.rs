use serde::Serialize;
use uuid::Uuid;

use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{opt_str, opt_uuid, Links, Object};

/// A project grouping repositories of a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "project")]
pub struct Project {
    pub uuid: Option<Uuid>,
    pub key: Option<String>,
    pub name: Option<String>,
    pub links: Links,
}

impl Resource for Project {
    const TAGS: &'static [&'static str] = &["project"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self {
            uuid: opt_uuid(obj, "uuid")?,
            key: opt_str(obj, "key")?,
            name: opt_str(obj, "name")?,
            links: Links::from_object(obj)?,
        })
    }
}
