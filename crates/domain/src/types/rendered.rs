//! Rendered markup (issue bodies, commit summaries)

use serde::Serialize;

use crate::decode::Resource;
use crate::errors::Result;
use crate::json::{opt_str, Object};

/// Text in its raw form plus the server-rendered HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "rendered")]
pub struct Rendered {
    pub raw: Option<String>,
    /// Markup language of `raw`, e.g. `markdown` or `creole`.
    pub markup: Option<String>,
    pub html: Option<String>,
}

impl Resource for Rendered {
    const TAGS: &'static [&'static str] = &["rendered"];

    fn from_tagged(_tag: &str, obj: &Object) -> Result<Self> {
        Ok(Self {
            raw: opt_str(obj, "raw")?,
            markup: opt_str(obj, "markup")?,
            html: opt_str(obj, "html")?,
        })
    }
}
