//! Tag-dispatching resource decoder
//!
//! Every resource object carries a `type` discriminator. Decoding validates
//! it against the accepted tag set *before* touching any other member, then
//! hands the object to the concrete constructor, which decodes embedded
//! resources recursively.
//!
//! ```
//! use bitbucket_domain::{decode, Account, Decoder, TeamAccount};
//! use serde_json::json;
//!
//! let doc = json!({"type": "user", "username": "ada"});
//! assert!(decode::<Account>(&doc).is_ok());
//! assert!(decode::<TeamAccount>(&doc).is_err());
//! assert!(Decoder::<Account>::narrowed(&["team"]).decode(&doc).is_err());
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::constants::TYPE_FIELD;
use crate::errors::{DecodeError, Result};
use crate::json::Object;

/// A resource family with a closed set of accepted tags.
pub trait Resource: Sized {
    /// Every tag this family can be built from.
    const TAGS: &'static [&'static str];

    /// Build the value for an already validated `tag`.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when a member has the wrong shape.
    fn from_tagged(tag: &str, obj: &Object) -> Result<Self>;
}

/// Decode `value` accepting every tag of `T`.
///
/// # Errors
/// [`DecodeError::TypeMismatch`] for a missing or foreign tag,
/// [`DecodeError::MalformedField`] for wrongly shaped members.
pub fn decode<T: Resource>(value: &Value) -> Result<T> {
    decode_with(value, T::TAGS)
}

/// Decode `value` accepting only `expected` (a subset of `T::TAGS`).
///
/// # Errors
/// Same as [`decode`].
pub fn decode_with<T: Resource>(value: &Value, expected: &[&'static str]) -> Result<T> {
    let Value::Object(obj) = value else {
        return Err(DecodeError::MalformedField {
            path: "$".to_string(),
            expected: "resource object",
            found: crate::errors::json_kind(value).to_string(),
        });
    };

    // A non-string tag is reported by its JSON kind.
    let tag = match obj.get(TYPE_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(tag.as_str()),
        Some(other) => {
            return Err(DecodeError::TypeMismatch {
                path: "$".to_string(),
                expected: expected.to_vec(),
                actual: Some(crate::errors::json_kind(other).to_string()),
            })
        }
    };

    match tag {
        Some(tag) if expected.contains(&tag) && T::TAGS.contains(&tag) => T::from_tagged(tag, obj),
        _ => Err(DecodeError::TypeMismatch {
            path: "$".to_string(),
            expected: expected.to_vec(),
            actual: tag.map(str::to_owned),
        }),
    }
}

/// Decode an optional value; `None` and JSON `null` yield `Ok(None)`.
///
/// # Errors
/// Same as [`decode`].
pub fn decode_optional<T: Resource>(value: Option<&Value>) -> Result<Option<T>> {
    value.filter(|v| !v.is_null()).map(decode::<T>).transpose()
}

/// A decoder configured for one resource family, optionally narrowed to a
/// subset of its tags.
///
/// Paginated sequences hold one of these as their element factory.
pub struct Decoder<T> {
    expected: &'static [&'static str],
    _target: PhantomData<fn() -> T>,
}

impl<T: Resource> Decoder<T> {
    /// Accept every tag of `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self { expected: T::TAGS, _target: PhantomData }
    }

    /// Accept only `expected`. Tags outside `T::TAGS` can never match.
    #[must_use]
    pub const fn narrowed(expected: &'static [&'static str]) -> Self {
        Self { expected, _target: PhantomData }
    }

    /// Tags this decoder accepts.
    pub const fn expected(&self) -> &'static [&'static str] {
        self.expected
    }

    /// Decode one element.
    ///
    /// # Errors
    /// Same as [`decode`].
    pub fn decode(&self, value: &Value) -> Result<T> {
        decode_with(value, self.expected)
    }
}

impl<T: Resource> Default for Decoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Decoder<T> {}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").field("expected", &self.expected).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{Account, Issue, TeamAccount, UserAccount};

    /// Decoding a bare user through a team-only configuration fails closed.
    ///
    /// Assertions:
    /// - the error is `TypeMismatch`
    /// - it names the expected set and the actual tag
    #[test]
    fn user_through_team_only_decoder_is_type_mismatch() {
        let doc = json!({"type": "user"});

        let err = decode::<TeamAccount>(&doc).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                path: "$".to_string(),
                expected: vec!["team"],
                actual: Some("user".to_string()),
            }
        );

        let narrowed = Decoder::<Account>::narrowed(&["team"]).decode(&doc);
        assert!(matches!(narrowed, Err(DecodeError::TypeMismatch { .. })));
    }

    /// The same document through a user-only configuration succeeds with
    /// every optional field at its default.
    #[test]
    fn user_through_user_only_decoder_uses_defaults() {
        let user = decode::<UserAccount>(&json!({"type": "user"})).unwrap();

        assert_eq!(user.profile.username, None);
        assert_eq!(user.profile.uuid, None);
        assert_eq!(user.profile.display_name, None);
        assert_eq!(user.profile.created_on, None);
        assert!(user.profile.links.is_empty());
        assert_eq!(user.account_id, None);
        assert!(!user.is_staff);
    }

    #[test]
    fn missing_tag_reports_missing() {
        let err = decode::<Issue>(&json!({"id": 4})).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { actual: None, .. }));
        assert!(err.to_string().ends_with("found missing"));
    }

    #[test]
    fn narrowing_cannot_widen_the_family() {
        let err = Decoder::<TeamAccount>::narrowed(&["team", "user"])
            .decode(&json!({"type": "user"}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn non_object_input_is_malformed() {
        let err = decode::<Account>(&json!([{"type": "user"}])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { ref path, .. } if path == "$"));
    }

    #[test]
    fn non_string_tag_is_type_mismatch() {
        let err = decode::<Account>(&json!({"type": 7})).unwrap_err();
        match err {
            DecodeError::TypeMismatch { ref path, ref actual, .. } => {
                assert_eq!(path, "$");
                assert_eq!(actual.as_deref(), Some("number"));
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn optional_null_is_absent() {
        assert_eq!(decode_optional::<Account>(Some(&Value::Null)).unwrap(), None);
        assert_eq!(decode_optional::<Account>(None).unwrap(), None);
    }
}
