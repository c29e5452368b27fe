//! Query string aggregation.
//!
//! A builder accumulates an ordered list of [`QuerySource`]s; building a
//! request merges them, together with any query already present on the URL,
//! into one canonical query string. Merging appends, never overwrites, so
//! repeated keys across sources survive as repeated parameters. The
//! canonical encoding sorts parameter keys, which makes the output
//! deterministic regardless of source order; values within a key keep their
//! insertion order.

use std::collections::BTreeMap;
use std::sync::Arc;

use url::form_urlencoded;

use crate::{Error, Result};

type DeferredEncoder = Arc<dyn Fn() -> Result<Vec<(String, String)>> + Send + Sync>;

/// One query-producing value: either raw pairs used verbatim, or a
/// structured value run through the form encoder when the request is built.
#[derive(Clone)]
pub struct QuerySource {
    kind: SourceKind,
}

#[derive(Clone)]
enum SourceKind {
    Pairs(Vec<(String, String)>),
    Deferred(DeferredEncoder),
}

impl QuerySource {
    /// Raw key/value pairs, used verbatim without structured encoding.
    pub fn pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            kind: SourceKind::Pairs(pairs),
        }
    }

    /// A structured value, encoded to pairs when the request is built.
    ///
    /// Encoding is deferred so a serialization failure surfaces from the
    /// terminal build call, not from configuration.
    pub fn structured<T>(value: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        let encode: DeferredEncoder = Arc::new(move || to_query_pairs(&value));
        Self {
            kind: SourceKind::Deferred(encode),
        }
    }

    fn resolve(&self) -> Result<Vec<(String, String)>> {
        match &self.kind {
            SourceKind::Pairs(pairs) => Ok(pairs.clone()),
            SourceKind::Deferred(encode) => encode(),
        }
    }
}

impl std::fmt::Debug for QuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SourceKind::Pairs(pairs) => f.debug_tuple("QuerySource").field(pairs).finish(),
            SourceKind::Deferred(_) => f.debug_tuple("QuerySource").field(&"<structured>").finish(),
        }
    }
}

/// Encode a structured value to query parameter pairs.
///
/// Uses `serde_html_form`, which supports `Vec<T>` for repeated parameters.
///
/// # Errors
///
/// Returns [`Error::QuerySerialization`] if encoding fails.
pub fn to_query_pairs<T: serde::Serialize>(value: &T) -> Result<Vec<(String, String)>> {
    let encoded = serde_html_form::to_string(value).map_err(Error::QuerySerialization)?;
    Ok(form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Merge the URL's existing raw query with the accumulated sources into one
/// canonical query string.
///
/// Returns `None` when there is nothing to serialize. Source arguments are
/// never mutated.
///
/// # Errors
///
/// Returns an error if the existing query is malformed or a structured
/// source fails to encode.
pub fn merge_query(existing: Option<&str>, sources: &[QuerySource]) -> Result<Option<String>> {
    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if let Some(raw) = existing {
        validate_query(raw)?;
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            merged
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    for source in sources {
        for (key, value) in source.resolve()? {
            merged.entry(key).or_default().push(value);
        }
    }

    if merged.is_empty() {
        return Ok(None);
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in &merged {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    Ok(Some(serializer.finish()))
}

// form_urlencoded::parse silently passes broken escapes through, so invalid
// percent-encoding must be rejected here to fail the whole build.
fn validate_query(raw: &str) -> Result<()> {
    let mut bytes = raw.bytes();
    while let Some(byte) = bytes.next() {
        if byte == b'%' {
            let valid = matches!(
                (bytes.next(), bytes.next()),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            );
            if !valid {
                return Err(Error::query_parse(format!(
                    "invalid percent-encoding in '{raw}'"
                )));
            }
        }
    }
    Ok(())
}
