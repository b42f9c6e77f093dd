//! Field readers over raw JSON resource objects
//!
//! Every reader treats an absent member and an explicit `null` the same way
//! and fails with [`DecodeError::MalformedField`] when the member is present
//! with the wrong shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use crate::constants::UNKNOWN_COUNT;
use crate::decode::{decode, Resource};
use crate::errors::{DecodeError, Result};

/// A JSON object as handed to resource constructors.
pub type Object = Map<String, Value>;

fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|value| !value.is_null())
}

/// Optional string member.
pub fn opt_str(obj: &Object, field: &str) -> Result<Option<String>> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DecodeError::malformed(field, "string", other)),
    }
}

/// Boolean flag, `false` when absent.
pub fn flag(obj: &Object, field: &str) -> Result<bool> {
    match present(obj, field) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(DecodeError::malformed(field, "boolean", other)),
    }
}

/// Integer counter, [`UNKNOWN_COUNT`] when absent.
pub fn counter(obj: &Object, field: &str) -> Result<i64> {
    match present(obj, field) {
        None => Ok(UNKNOWN_COUNT),
        Some(value) => {
            value.as_i64().ok_or_else(|| DecodeError::malformed(field, "integer", value))
        }
    }
}

/// Optional ISO-8601 date-time with offset, normalised to UTC.
pub fn opt_datetime(obj: &Object, field: &str) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = opt_str(obj, field)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw).map(|dt| Some(dt.with_timezone(&Utc))).map_err(|_| {
        DecodeError::MalformedField {
            path: format!("$.{field}"),
            expected: "ISO-8601 date-time",
            found: raw,
        }
    })
}

/// Optional UUID; the API wraps them in braces (`{...}`).
pub fn opt_uuid(obj: &Object, field: &str) -> Result<Option<Uuid>> {
    let Some(raw) = opt_str(obj, field)? else {
        return Ok(None);
    };
    let trimmed = raw.trim_start_matches('{').trim_end_matches('}');
    Uuid::parse_str(trimmed).map(Some).map_err(|_| DecodeError::MalformedField {
        path: format!("$.{field}"),
        expected: "UUID",
        found: raw,
    })
}

/// Optional nested plain object (not a tagged resource).
pub fn opt_object<'a>(obj: &'a Object, field: &str) -> Result<Option<&'a Object>> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(DecodeError::malformed(field, "object", other)),
    }
}

/// Embedded resource decoded eagerly with its own accepted tag set.
pub fn opt_embedded<T: Resource>(obj: &Object, field: &str) -> Result<Option<T>> {
    present(obj, field).map(|value| decode::<T>(value).map_err(|e| e.within(field))).transpose()
}

/// Array of embedded resources, empty when absent.
pub fn embedded_list<T: Resource>(obj: &Object, field: &str) -> Result<Vec<T>> {
    match present(obj, field) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode::<T>(item).map_err(|e| e.within(&format!("{field}[{i}]"))))
            .collect(),
        Some(other) => Err(DecodeError::malformed(field, "array", other)),
    }
}

/// Named hyperlinks from a resource's `links` member.
///
/// Only `{"href": ...}` entries are kept; array-valued entries such as
/// `clone` are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Url>);

impl Links {
    /// Read the `links` member of `obj`.
    pub fn from_object(obj: &Object) -> Result<Self> {
        let Some(links) = opt_object(obj, "links")? else {
            return Ok(Self::default());
        };

        let mut map = BTreeMap::new();
        for (name, entry) in links {
            let Value::Object(entry) = entry else {
                continue;
            };
            let field = format!("links.{name}.href");
            match entry.get("href") {
                None | Some(Value::Null) => {}
                Some(Value::String(href)) => {
                    let url = Url::parse(href).map_err(|_| DecodeError::MalformedField {
                        path: format!("$.{field}"),
                        expected: "absolute URL",
                        found: href.clone(),
                    })?;
                    map.insert(name.clone(), url);
                }
                Some(other) => return Err(DecodeError::malformed(&field, "string", other)),
            }
        }
        Ok(Self(map))
    }

    /// Link called `name`, e.g. `self`, `html`, `issues`.
    pub fn get(&self, name: &str) -> Option<&Url> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn absent_and_null_members_use_defaults() {
        let obj = object(json!({"website": null}));

        assert_eq!(opt_str(&obj, "website").unwrap(), None);
        assert_eq!(opt_str(&obj, "location").unwrap(), None);
        assert!(!flag(&obj, "is_private").unwrap());
        assert_eq!(counter(&obj, "votes").unwrap(), UNKNOWN_COUNT);
        assert_eq!(opt_datetime(&obj, "created_on").unwrap(), None);
    }

    #[test]
    fn zero_counter_is_not_the_sentinel() {
        let obj = object(json!({"votes": 0}));
        assert_eq!(counter(&obj, "votes").unwrap(), 0);
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let obj = object(json!({"created_on": 17, "is_private": "yes", "votes": 1.5}));

        let err = opt_datetime(&obj, "created_on").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { ref path, .. } if path == "$.created_on"));
        assert!(flag(&obj, "is_private").is_err());
        assert!(counter(&obj, "votes").is_err());
    }

    #[test]
    fn unparsable_date_string_is_malformed() {
        let obj = object(json!({"created_on": "last tuesday"}));
        let err = opt_datetime(&obj, "created_on").unwrap_err();
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn parses_offset_dates_into_utc() {
        let obj = object(json!({"created_on": "2013-11-08T01:11:03.263237+02:00"}));
        let dt = opt_datetime(&obj, "created_on").unwrap().unwrap();
        assert_eq!(dt.to_rfc3339(), "2013-11-07T23:11:03.263237+00:00");
    }

    #[test]
    fn strips_braces_from_uuids() {
        let obj = object(json!({"uuid": "{9f3c1a35-2b0e-4e8c-9a57-3d2a4e5f6b70}"}));
        let uuid = opt_uuid(&obj, "uuid").unwrap().unwrap();
        assert_eq!(uuid.to_string(), "9f3c1a35-2b0e-4e8c-9a57-3d2a4e5f6b70");
    }

    #[test]
    fn links_keep_hrefs_and_skip_arrays() {
        let obj = object(json!({
            "links": {
                "self": {"href": "https://api.bitbucket.org/2.0/repositories/acme/widget"},
                "clone": [{"href": "https://bitbucket.org/acme/widget.git", "name": "https"}],
                "avatar": {"href": null}
            }
        }));

        let links = Links::from_object(&obj).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(
            links.get("self").map(Url::as_str),
            Some("https://api.bitbucket.org/2.0/repositories/acme/widget")
        );
        assert!(links.get("clone").is_none());
    }

    #[test]
    fn relative_href_is_malformed() {
        let obj = object(json!({"links": {"html": {"href": "/acme"}}}));
        let err = Links::from_object(&obj).unwrap_err();
        assert_eq!(err.path(), "$.links.html.href");
    }
}
