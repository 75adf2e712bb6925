//! Deterministic cache keys for dashboard queries.
//!
//! A [`QueryKey`] is the ordered tuple `(domain, resource, operation, params)`.
//! Parameters live in a `BTreeMap`, so insertion order never matters, and list
//! values are sorted when the key is built, so `[3, 1, 2]` and `[1, 2, 3]` land
//! on the same cache entry.
//!
//! ```
//! use grabapis::domain::query_key::QueryKey;
//!
//! let a = QueryKey::builder("rickandmorty", "character", "by_ids")
//!     .param("ids", vec![3_i64, 1, 2])
//!     .param("page", 1_u32)
//!     .build();
//! let b = QueryKey::builder("rickandmorty", "character", "by_ids")
//!     .param("page", 1_u32)
//!     .param("ids", vec![1_i64, 2, 3])
//!     .build();
//!
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), r#"["rickandmorty","character","by_ids",{"ids":[1,2,3],"page":1}]"#);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// A normalized parameter value.
///
/// Lists are always stored sorted. Duplicates are kept: `[1, 1, 2]` and
/// `[1, 2]` are different requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    IntList(Vec<i64>),
    StrList(Vec<String>),
    /// A number outside the `i64` range or with a fraction, kept as its JSON text.
    #[serde(serialize_with = "raw_json")]
    Number(String),
    /// A nested object, kept as canonical JSON text.
    #[serde(serialize_with = "raw_json")]
    Object(String),
    /// A list mixing element types; each element is kept as JSON text.
    #[serde(serialize_with = "raw_json_list")]
    Mixed(Vec<String>),
}

fn raw_json<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value.serialize(serializer),
        Err(_) => serializer.serialize_str(text),
    }
}

fn raw_json_list<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        match serde_json::from_str::<serde_json::Value>(item) {
            Ok(value) => seq.serialize_element(&value)?,
            Err(_) => seq.serialize_element(item)?,
        }
    }
    seq.end()
}

impl ParamValue {
    fn int_list(mut values: Vec<i64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        Some(Self::IntList(values))
    }

    fn str_list(mut values: Vec<String>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        Some(Self::StrList(values))
    }

    fn mixed_list(mut values: Vec<String>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        Some(Self::Mixed(values))
    }

    /// Render the value the way it appears in a query string.
    ///
    /// Lists join with commas, matching the upstream multi-id syntax.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Str(s) => s.clone(),
            Self::IntList(items) => items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::StrList(items) => items.join(","),
            Self::Number(text) | Self::Object(text) => text.clone(),
            Self::Mixed(items) => items
                .iter()
                .map(|item| match serde_json::from_str::<serde_json::Value>(item) {
                    Ok(serde_json::Value::String(s)) => s,
                    _ => item.clone(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Conversion into an optional [`ParamValue`].
///
/// Returning `None` drops the parameter from the key: absent options, empty
/// strings and empty lists all mean "not set".
pub trait IntoParamValue {
    fn into_param_value(self) -> Option<ParamValue>;
}

impl IntoParamValue for ParamValue {
    fn into_param_value(self) -> Option<ParamValue> {
        match self {
            ParamValue::Str(s) => s.into_param_value(),
            ParamValue::IntList(items) => ParamValue::int_list(items),
            ParamValue::StrList(items) => ParamValue::str_list(items),
            ParamValue::Mixed(items) => ParamValue::mixed_list(items),
            other => Some(other),
        }
    }
}

impl IntoParamValue for bool {
    fn into_param_value(self) -> Option<ParamValue> {
        Some(ParamValue::Bool(self))
    }
}

impl IntoParamValue for &str {
    fn into_param_value(self) -> Option<ParamValue> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ParamValue::Str(trimmed.to_string()))
        }
    }
}

impl IntoParamValue for String {
    fn into_param_value(self) -> Option<ParamValue> {
        self.as_str().into_param_value()
    }
}

impl IntoParamValue for &String {
    fn into_param_value(self) -> Option<ParamValue> {
        self.as_str().into_param_value()
    }
}

impl IntoParamValue for NaiveDate {
    fn into_param_value(self) -> Option<ParamValue> {
        Some(ParamValue::Str(self.format("%Y-%m-%d").to_string()))
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl IntoParamValue for $ty {
                fn into_param_value(self) -> Option<ParamValue> {
                    Some(ParamValue::Int(i64::from(self)))
                }
            }

            impl IntoParamValue for Vec<$ty> {
                fn into_param_value(self) -> Option<ParamValue> {
                    ParamValue::int_list(self.into_iter().map(i64::from).collect())
                }
            }

            impl IntoParamValue for &[$ty] {
                fn into_param_value(self) -> Option<ParamValue> {
                    ParamValue::int_list(self.iter().copied().map(i64::from).collect())
                }
            }
        )*
    };
}

int_param!(i64, i32, u32, u16, u8);

impl IntoParamValue for Vec<String> {
    fn into_param_value(self) -> Option<ParamValue> {
        ParamValue::str_list(
            self.into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl<T: IntoParamValue> IntoParamValue for Option<T> {
    fn into_param_value(self) -> Option<ParamValue> {
        self.and_then(IntoParamValue::into_param_value)
    }
}

/// Cache key: `(domain, resource, operation, normalized params)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    domain: String,
    resource: String,
    operation: String,
    params: BTreeMap<String, ParamValue>,
}

impl QueryKey {
    /// Key without parameters.
    pub fn new(
        domain: impl Into<String>,
        resource: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            resource: resource.into(),
            operation: operation.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn builder(
        domain: impl Into<String>,
        resource: impl Into<String>,
        operation: impl Into<String>,
    ) -> QueryKeyBuilder {
        QueryKeyBuilder {
            key: Self::new(domain, resource, operation),
        }
    }

    /// Build a key from an arbitrary JSON parameter object.
    ///
    /// `null` values and empty strings are dropped, arrays of numbers or
    /// strings are sorted, and nested objects are kept as their canonical
    /// (key-sorted) JSON text. Non-object `params` yield a key without
    /// parameters.
    pub fn from_json(
        domain: impl Into<String>,
        resource: impl Into<String>,
        operation: impl Into<String>,
        params: &serde_json::Value,
    ) -> Self {
        let mut builder = Self::builder(domain, resource, operation);
        if let serde_json::Value::Object(map) = params {
            for (name, value) in map {
                builder = builder.param(name.as_str(), json_param(value));
            }
        }
        builder.build()
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Same key with a different operation, keeping the parameters.
    #[must_use]
    pub fn with_operation(&self, operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..self.clone()
        }
    }

    /// Whether this key falls under `prefix`.
    #[must_use]
    pub fn matches(&self, prefix: &KeyPrefix) -> bool {
        if self.domain != prefix.domain {
            return false;
        }
        if let Some(resource) = &prefix.resource {
            if &self.resource != resource {
                return false;
            }
        }
        match &prefix.operation {
            Some(operation) => &self.operation == operation,
            None => true,
        }
    }
}

fn json_param(value: &serde_json::Value) -> Option<ParamValue> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(ParamValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(ParamValue::Int(i)),
            None => Some(ParamValue::Number(n.to_string())),
        },
        Value::String(s) => s.as_str().into_param_value(),
        Value::Array(items) => {
            let items: Vec<&Value> = items.iter().filter(|item| !item.is_null()).collect();
            if let Some(ints) = items.iter().map(|item| item.as_i64()).collect::<Option<Vec<_>>>() {
                return ParamValue::int_list(ints);
            }
            if let Some(strings) = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
            {
                return ParamValue::str_list(strings);
            }
            ParamValue::mixed_list(items.iter().map(ToString::to_string).collect())
        }
        Value::Object(_) => Some(ParamValue::Object(value.to_string())),
    }
}

impl Serialize for QueryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.params.is_empty() { 3 } else { 4 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.domain)?;
        seq.serialize_element(&self.resource)?;
        seq.serialize_element(&self.operation)?;
        if !self.params.is_empty() {
            seq.serialize_element(&self.params)?;
        }
        seq.end()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Incremental [`QueryKey`] construction.
#[derive(Debug, Clone)]
pub struct QueryKeyBuilder {
    key: QueryKey,
}

impl QueryKeyBuilder {
    /// Add a parameter. Unset values (see [`IntoParamValue`]) are skipped.
    #[must_use]
    pub fn param(mut self, name: &str, value: impl IntoParamValue) -> Self {
        match value.into_param_value() {
            Some(value) => {
                self.key.params.insert(name.to_string(), value);
            }
            None => {
                self.key.params.remove(name);
            }
        }
        self
    }

    #[must_use]
    pub fn build(self) -> QueryKey {
        self.key
    }
}

/// Selects a family of keys for bulk invalidation.
///
/// Parsed from dotted text: `nasa`, `nasa.apod`, `nasa.apod.detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
    domain: String,
    resource: Option<String>,
    operation: Option<String>,
}

impl KeyPrefix {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            resource: None,
            operation: None,
        }
    }

    pub fn resource(domain: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            resource: Some(resource.into()),
            operation: None,
        }
    }

    /// Parse dotted text. Returns `None` for empty input or more than three
    /// segments.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.').map(str::trim);
        let domain = parts.next().filter(|d| !d.is_empty())?;
        let resource = parts.next().filter(|r| !r.is_empty()).map(str::to_string);
        let operation = parts.next().filter(|o| !o.is_empty()).map(str::to_string);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            domain: domain.to_string(),
            resource,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn character_key(ids: Vec<i64>) -> QueryKey {
        QueryKey::builder("rickandmorty", "character", "by_ids")
            .param("ids", ids)
            .build()
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = QueryKey::builder("rickandmorty", "character", "list")
            .param("name", "rick")
            .param("status", "Alive")
            .param("page", 2_u32)
            .build();
        let b = QueryKey::builder("rickandmorty", "character", "list")
            .param("page", 2_u32)
            .param("status", "Alive")
            .param("name", "rick")
            .build();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn list_permutations_collide() {
        let permutations = [
            vec![1, 2, 3],
            vec![1, 3, 2],
            vec![2, 1, 3],
            vec![2, 3, 1],
            vec![3, 1, 2],
            vec![3, 2, 1],
        ];
        let expected = character_key(vec![1, 2, 3]);

        for ids in permutations {
            assert_eq!(character_key(ids), expected);
        }
    }

    #[test]
    fn duplicates_stay_distinct() {
        assert_ne!(character_key(vec![1, 1, 2]), character_key(vec![1, 2]));
    }

    #[test]
    fn distinct_values_do_not_collide() {
        let int = QueryKey::builder("giphy", "gif", "search").param("q", 3_i64).build();
        let text = QueryKey::builder("giphy", "gif", "search").param("q", "3").build();
        assert_ne!(int, text);

        // A string containing a comma must not look like a two-element list.
        let joined = QueryKey::builder("giphy", "gif", "search")
            .param("tags", vec!["a,b".to_string()])
            .build();
        let split = QueryKey::builder("giphy", "gif", "search")
            .param("tags", vec!["a".to_string(), "b".to_string()])
            .build();
        assert_ne!(joined, split);
    }

    #[test]
    fn json_values_keep_their_type() {
        let key = |params: serde_json::Value| QueryKey::from_json("giphy", "gif", "search", &params);

        assert_ne!(key(json!({"q": 1.5})), key(json!({"q": "1.5"})));
        assert_ne!(key(json!({"q": {"x": 1}})), key(json!({"q": "{\"x\":1}"})));
        assert_ne!(key(json!({"q": [1, "1"]})), key(json!({"q": ["1", "1"]})));
        assert_eq!(key(json!({"q": [1, "a"]})), key(json!({"q": ["a", 1]})));
        assert_eq!(key(json!({"q": 1.5})).to_string(), r#"["giphy","gif","search",{"q":1.5}]"#);
    }

    #[test]
    fn unset_values_are_dropped() {
        let bare = QueryKey::new("rickandmorty", "character", "list");
        let with_empty = QueryKey::builder("rickandmorty", "character", "list")
            .param("name", "  ")
            .param("status", Option::<String>::None)
            .param("ids", Vec::<u32>::new())
            .build();

        assert_eq!(bare, with_empty);
    }

    #[test]
    fn resetting_a_param_to_none_removes_it() {
        let key = QueryKey::builder("nasa", "apod", "detail")
            .param("date", "2024-01-01")
            .param("date", Option::<&str>::None)
            .build();
        assert!(key.param("date").is_none());
    }

    #[test]
    fn json_object_order_does_not_matter() {
        let a = QueryKey::from_json(
            "rickandmorty",
            "character",
            "by_ids",
            &json!({"ids": [3, 1, 2], "page": 1, "name": null}),
        );
        let b = QueryKey::from_json(
            "rickandmorty",
            "character",
            "by_ids",
            &json!({"page": 1, "ids": [1, 2, 3]}),
        );

        assert_eq!(a, b);
        assert_eq!(a, character_key(vec![1, 2, 3]).with_operation("by_ids"));
    }

    #[test]
    fn json_and_builder_agree() {
        let from_json = QueryKey::from_json(
            "nasa",
            "apod",
            "detail",
            &json!({"date": "2024-03-01", "thumbs": true}),
        );
        let built = QueryKey::builder("nasa", "apod", "detail")
            .param("thumbs", true)
            .param(
                "date",
                NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            )
            .build();

        assert_eq!(from_json, built);
    }

    #[test]
    fn display_is_json_array() {
        let key = QueryKey::builder("nasa", "apod", "detail")
            .param("date", "2024-01-01")
            .build();
        assert_eq!(
            key.to_string(),
            r#"["nasa","apod","detail",{"date":"2024-01-01"}]"#
        );
        assert_eq!(
            QueryKey::new("giphy", "gif", "trending").to_string(),
            r#"["giphy","gif","trending"]"#
        );
    }

    #[test]
    fn query_value_joins_sorted_lists() {
        let key = character_key(vec![10, 2, 33]);
        assert_eq!(
            key.param("ids").map(ParamValue::to_query_value).as_deref(),
            Some("2,10,33")
        );
    }

    #[test]
    fn prefix_matching() {
        let key = QueryKey::builder("nasa", "apod", "detail")
            .param("date", "2024-01-01")
            .build();

        assert!(key.matches(&KeyPrefix::domain("nasa")));
        assert!(key.matches(&KeyPrefix::resource("nasa", "apod")));
        assert!(key.matches(&KeyPrefix::parse("nasa.apod.detail").unwrap()));
        assert!(!key.matches(&KeyPrefix::parse("nasa.apod.range").unwrap()));
        assert!(!key.matches(&KeyPrefix::domain("giphy")));
    }

    #[test]
    fn prefix_parse_rejects_garbage() {
        assert!(KeyPrefix::parse("").is_none());
        assert!(KeyPrefix::parse("a.b.c.d").is_none());
        assert_eq!(KeyPrefix::parse("nasa"), Some(KeyPrefix::domain("nasa")));
    }
}
