//! Lazy, index-addressable view over a paginated collection
//!
//! Collection endpoints answer with an envelope
//! `{"size": n?, "values": [...], "next": url?}`. A [`PaginatedSequence`]
//! starts from the first page URL and fetches further pages only when an
//! index beyond the buffered elements is requested. Fetched elements are
//! kept, so each page is requested at most once. A `next` link back to a
//! page already fetched is rejected as malformed.
//!
//! A page is decoded completely before anything is buffered: a failed fetch
//! or decode leaves the sequence exactly as it was, and the next access
//! retries the same page.

use std::collections::HashSet;
use std::fmt;

use bitbucket_domain::constants::{PAGE_NEXT_FIELD, PAGE_SIZE_FIELD, PAGE_VALUES_FIELD};
use bitbucket_domain::{Decoder, Resource};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::errors::{ApiError, ApiResult};

/// Source of raw page documents.
///
/// Implemented by the API client (authenticated GET). A missing page is an
/// error here, never an absent value.
pub trait PageFetcher {
    /// Fetch the JSON document at `url`.
    ///
    /// # Errors
    /// Any [`ApiError`] of the underlying request.
    fn fetch_page(&self, url: &Url) -> ApiResult<Value>;
}

/// One decoded page envelope.
struct Page<R> {
    values: Vec<R>,
    next: Option<Url>,
    size: Option<i64>,
}

/// Lazily fetched, cached sequence of resources.
///
/// Borrows its fetcher, and reads take `&mut self`, so one sequence has a
/// single reader at a time.
pub struct PaginatedSequence<'a, R> {
    fetcher: &'a dyn PageFetcher,
    decoder: Decoder<R>,
    next: Option<Url>,
    buffer: Vec<R>,
    declared_size: Option<i64>,
    pages_fetched: usize,
    visited: HashSet<Url>,
}

impl<'a, R: Resource> PaginatedSequence<'a, R> {
    /// Sequence starting at `first_page`, decoding every tag of `R`.
    pub fn new(fetcher: &'a dyn PageFetcher, first_page: Url) -> Self {
        Self::with_decoder(fetcher, first_page, Decoder::new())
    }

    /// Sequence whose elements are built by `decoder`.
    pub fn with_decoder(fetcher: &'a dyn PageFetcher, first_page: Url, decoder: Decoder<R>) -> Self {
        Self {
            fetcher,
            decoder,
            next: Some(first_page),
            buffer: Vec::new(),
            declared_size: None,
            pages_fetched: 0,
            visited: HashSet::new(),
        }
    }

    /// Element at `index`, fetching pages in server order until it is
    /// buffered.
    ///
    /// # Errors
    /// [`ApiError::OutOfBounds`] when the collection is exhausted before
    /// `index`; otherwise the error of the failing page.
    pub fn get(&mut self, index: usize) -> ApiResult<&R> {
        while index >= self.buffer.len() {
            if !self.fetch_next_page()? {
                return Err(ApiError::OutOfBounds { index, len: self.buffer.len() });
            }
        }
        self.buffer.get(index).ok_or(ApiError::OutOfBounds { index, len: self.buffer.len() })
    }

    /// Exact number of elements. Always fetches every remaining page.
    ///
    /// # Errors
    /// The error of the first failing page.
    pub fn size(&mut self) -> ApiResult<usize> {
        while self.fetch_next_page()? {}
        Ok(self.buffer.len())
    }

    /// Element count declared by the first page, if it declared one. Never
    /// fetches. Before exhaustion it may disagree with [`size`](Self::size);
    /// once the last page is buffered it is the buffered length.
    pub const fn declared_size(&self) -> Option<i64> {
        self.declared_size
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether every page has been fetched.
    pub const fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Iterate from the first element, fetching pages as needed.
    ///
    /// Yields owned copies; stops after the first error.
    pub fn iter(&mut self) -> Iter<'_, 'a, R> {
        Iter { sequence: self, index: 0, failed: false }
    }

    /// Fetch everything and return the elements in server order.
    ///
    /// # Errors
    /// The error of the first failing page.
    pub fn try_collect(mut self) -> ApiResult<Vec<R>> {
        self.size()?;
        Ok(self.buffer)
    }

    /// Fetch and buffer the next page. `Ok(false)` once exhausted.
    fn fetch_next_page(&mut self) -> ApiResult<bool> {
        let Some(url) = self.next.clone() else {
            return Ok(false);
        };

        let document = self.fetcher.fetch_page(&url)?;
        let page = parse_page(&url, &document, &self.decoder)?;

        if let Some(next) = &page.next {
            if *next == url || self.visited.contains(next) {
                return Err(ApiError::MalformedPage {
                    url: url.to_string(),
                    reason: format!("`{PAGE_NEXT_FIELD}` points back to already fetched page {next}"),
                });
            }
        }

        if self.pages_fetched == 0 {
            self.declared_size = page.size;
        }
        self.pages_fetched += 1;
        self.buffer.extend(page.values);
        self.visited.insert(url.clone());
        self.next = page.next;
        if self.next.is_none() {
            self.declared_size = i64::try_from(self.buffer.len()).ok();
        }

        debug!(
            %url,
            page = self.pages_fetched,
            buffered = self.buffer.len(),
            exhausted = self.next.is_none(),
            "fetched page"
        );
        Ok(true)
    }
}

impl<R> fmt::Debug for PaginatedSequence<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedSequence")
            .field("next", &self.next.as_ref().map(Url::as_str))
            .field("buffered", &self.buffer.len())
            .field("declared_size", &self.declared_size)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

/// Fallible iterator returned by [`PaginatedSequence::iter`].
pub struct Iter<'s, 'a, R> {
    sequence: &'s mut PaginatedSequence<'a, R>,
    index: usize,
    failed: bool,
}

impl<R: Resource + Clone> Iterator for Iter<'_, '_, R> {
    type Item = ApiResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.sequence.get(self.index) {
            Ok(item) => {
                self.index += 1;
                Some(Ok(item.clone()))
            }
            Err(ApiError::OutOfBounds { .. }) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn parse_page<R: Resource>(url: &Url, document: &Value, decoder: &Decoder<R>) -> ApiResult<Page<R>> {
    let malformed = |reason: String| ApiError::MalformedPage { url: url.to_string(), reason };

    let Value::Object(envelope) = document else {
        return Err(malformed("page is not a JSON object".to_string()));
    };

    let Some(Value::Array(raw_values)) = envelope.get(PAGE_VALUES_FIELD) else {
        return Err(malformed(format!("missing `{PAGE_VALUES_FIELD}` array")));
    };

    let values = raw_values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            decoder.decode(value).map_err(|err| err.within(&format!("{PAGE_VALUES_FIELD}[{i}]")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let next = match envelope.get(PAGE_NEXT_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(next)) => Some(Url::parse(next).map_err(|err| ApiError::InvalidUrl {
            url: next.clone(),
            reason: err.to_string(),
        })?),
        Some(_) => return Err(malformed(format!("`{PAGE_NEXT_FIELD}` is not a string"))),
    };

    let size = envelope.get(PAGE_SIZE_FIELD).and_then(Value::as_i64);

    Ok(Page { values, next, size })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use bitbucket_domain::{Account, DecodeError, UserAccount};
    use serde_json::json;

    use super::*;

    const FIRST: &str = "https://api.bitbucket.org/2.0/repositories/acme/widgets/issues";
    const SECOND: &str = "https://api.bitbucket.org/2.0/repositories/acme/widgets/issues?page=2";

    /// Scripted pages with a per-URL request counter and one-shot failures.
    #[derive(Default)]
    struct ScriptedPages {
        pages: HashMap<String, Value>,
        failures: Mutex<HashMap<String, usize>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedPages {
        fn page(mut self, url: &str, document: Value) -> Self {
            self.pages.insert(url.to_string(), document);
            self
        }

        fn fail_once(self, url: &str) -> Self {
            self.failures.lock().unwrap().insert(url.to_string(), 1);
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl PageFetcher for ScriptedPages {
        fn fetch_page(&self, url: &Url) -> ApiResult<Value> {
            self.calls.lock().unwrap().push(url.to_string());
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(url.as_str()).filter(|n| **n > 0) {
                *remaining -= 1;
                return Err(ApiError::Status { status: 503, url: url.to_string(), body: String::new() });
            }
            self.pages.get(url.as_str()).cloned().ok_or_else(|| ApiError::MalformedPage {
                url: url.to_string(),
                reason: "not scripted".into(),
            })
        }
    }

    fn user(name: &str) -> Value {
        json!({"type": "user", "username": name})
    }

    fn two_pages() -> ScriptedPages {
        ScriptedPages::default()
            .page(FIRST, json!({"size": 3, "values": [user("a"), user("b")], "next": SECOND}))
            .page(SECOND, json!({"values": [user("c")]}))
    }

    fn sequence(pages: &ScriptedPages) -> PaginatedSequence<'_, UserAccount> {
        PaginatedSequence::new(pages, Url::parse(FIRST).unwrap())
    }

    /// Two pages, three elements in total.
    ///
    /// Assertions:
    /// - `get(2)` fetches both pages, in order
    /// - `size()` afterwards is 3 with no further requests
    /// - `get(3)` is out of bounds with length 3
    #[test]
    fn test_two_page_collection() {
        let pages = two_pages();
        let mut seq = sequence(&pages);

        assert_eq!(seq.get(2).unwrap().profile.username.as_deref(), Some("c"));
        assert_eq!(pages.calls_to(FIRST), 1);
        assert_eq!(pages.calls_to(SECOND), 1);

        assert_eq!(seq.size().unwrap(), 3);
        assert_eq!(pages.total_calls(), 2);

        assert!(matches!(seq.get(3), Err(ApiError::OutOfBounds { index: 3, len: 3 })));
    }

    #[test]
    fn test_buffered_elements_are_not_refetched() {
        let pages = two_pages();
        let mut seq = sequence(&pages);

        seq.get(0).unwrap();
        seq.get(1).unwrap();
        seq.get(0).unwrap();

        assert_eq!(pages.total_calls(), 1);
        assert_eq!(seq.buffered_len(), 2);
        assert_eq!(seq.pages_fetched(), 1);
        assert!(!seq.is_exhausted());
        assert_eq!(seq.declared_size(), Some(3));
    }

    #[test]
    fn test_declared_size_never_fetches() {
        let pages = two_pages();
        let seq = sequence(&pages);
        assert_eq!(seq.declared_size(), None);
        assert_eq!(pages.total_calls(), 0);
    }

    #[test]
    fn test_size_counts_actual_elements_not_declared_size() {
        let pages = ScriptedPages::default()
            .page(FIRST, json!({"size": 10, "values": [user("a")], "next": null}));
        let mut seq = sequence(&pages);

        assert_eq!(seq.declared_size(), None);
        seq.get(0).unwrap();
        assert!(seq.is_exhausted());
        assert_eq!(seq.size().unwrap(), 1);
        assert_eq!(seq.declared_size(), Some(1));
    }

    #[test]
    fn test_declared_size_kept_until_exhausted() {
        let pages = ScriptedPages::default()
            .page(FIRST, json!({"size": 10, "values": [user("a")], "next": SECOND}))
            .page(SECOND, json!({"values": [user("b")]}));
        let mut seq = sequence(&pages);

        seq.get(0).unwrap();
        assert_eq!(seq.declared_size(), Some(10));
        assert_eq!(seq.size().unwrap(), 2);
        assert_eq!(seq.declared_size(), Some(2));
    }

    #[test]
    fn test_self_referencing_page_is_malformed() {
        let pages = ScriptedPages::default().page(FIRST, json!({"values": [user("a")], "next": FIRST}));
        let mut seq = sequence(&pages);

        assert!(matches!(seq.get(4), Err(ApiError::MalformedPage { .. })));
        assert!(matches!(seq.size(), Err(ApiError::MalformedPage { .. })));
        assert_eq!(seq.buffered_len(), 0);
        assert_eq!(pages.calls_to(FIRST), 2);
    }

    /// Page 2 links back to page 1.
    ///
    /// Assertions:
    /// - page 1 is fetched once and buffered
    /// - page 2 is rejected without duplicating page 1's elements
    #[test]
    fn test_next_link_to_earlier_page_is_malformed() {
        let pages = ScriptedPages::default()
            .page(FIRST, json!({"values": [user("a"), user("b")], "next": SECOND}))
            .page(SECOND, json!({"values": [user("c")], "next": FIRST}));
        let mut seq = sequence(&pages);

        match seq.get(2) {
            Err(ApiError::MalformedPage { url, reason }) => {
                assert_eq!(url, SECOND);
                assert!(reason.contains("already fetched"), "{reason}");
            }
            other => panic!("expected malformed page, got {other:?}"),
        }
        assert_eq!(seq.buffered_len(), 2);
        assert_eq!(seq.pages_fetched(), 1);
        assert_eq!(pages.calls_to(FIRST), 1);
    }

    /// A failed page leaves the sequence untouched and the next access
    /// retries the same page.
    ///
    /// Assertions:
    /// - first `get(2)` fails with the fetch error
    /// - buffer and page count keep their pre-failure values
    /// - second `get(2)` refetches only the failed page and succeeds
    #[test]
    fn test_retry_after_failed_page() {
        let pages = two_pages().fail_once(SECOND);
        let mut seq = sequence(&pages);

        assert!(matches!(seq.get(2), Err(ApiError::Status { status: 503, .. })));
        assert_eq!(seq.buffered_len(), 2);
        assert_eq!(seq.pages_fetched(), 1);

        assert_eq!(seq.get(2).unwrap().profile.username.as_deref(), Some("c"));
        assert_eq!(pages.calls_to(FIRST), 1);
        assert_eq!(pages.calls_to(SECOND), 2);
    }

    #[test]
    fn test_undecodable_element_rejects_whole_page() {
        let pages = ScriptedPages::default()
            .page(FIRST, json!({"values": [user("a"), {"type": "team", "username": "t"}]}));
        let mut seq = sequence(&pages);

        let err = seq.get(0).unwrap_err();
        match err {
            ApiError::Decode(DecodeError::TypeMismatch { path, actual, .. }) => {
                assert_eq!(path, "$.values[1]");
                assert_eq!(actual.as_deref(), Some("team"));
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
        assert_eq!(seq.buffered_len(), 0);
        assert!(!seq.is_exhausted());
    }

    #[test]
    fn test_missing_values_is_malformed_page() {
        let pages = ScriptedPages::default().page(FIRST, json!({"size": 0}));
        let mut seq = sequence(&pages);
        assert!(matches!(seq.size(), Err(ApiError::MalformedPage { .. })));
    }

    #[test]
    fn test_narrowed_decoder_as_element_factory() {
        let pages = ScriptedPages::default()
            .page(FIRST, json!({"values": [{"type": "team", "username": "t"}]}));
        let mut seq: PaginatedSequence<'_, Account> =
            PaginatedSequence::with_decoder(&pages, Url::parse(FIRST).unwrap(), Decoder::narrowed(&["team"]));

        assert!(seq.get(0).unwrap().as_team().is_some());
    }

    #[test]
    fn test_iter_and_try_collect() {
        let pages = two_pages();
        let mut seq = sequence(&pages);
        let names: Vec<_> = seq
            .iter()
            .map(|user| user.unwrap().profile.username.unwrap_or_default())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);

        let all = sequence(&pages).try_collect().unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_iter_stops_after_error() {
        let pages = ScriptedPages::default().fail_once(FIRST).page(FIRST, json!({"values": []}));
        let mut seq = sequence(&pages);
        let mut iter = seq.iter();
        assert!(matches!(iter.next(), Some(Err(ApiError::Status { .. }))));
        assert!(iter.next().is_none());
    }
}
