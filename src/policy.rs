//! Inclusion policy deciding which containers appear in a snapshot.
//!
//! A container must pass both the [`IgnoreList`] (by name) and the
//! [`LabelFilter`] (by label) to be reported.
use std::collections::{HashMap, HashSet};

/// Ignore-list entry that excludes every container.
pub const IGNORE_ALL: &str = "IGNORE_ALL";

/// Set of container names excluded from the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: HashSet<String>,
}

impl IgnoreList {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the container named `name` must be skipped.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(IGNORE_ALL) || self.names.contains(name)
    }
}

/// Optional `key` / `key=value` requirement on container labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    key: Option<String>,
    value: Option<String>,
}

impl LabelFilter {
    /// Parses a label expression.
    ///
    /// The expression is split at the first `=` and both halves are trimmed.
    /// An empty key disables the filter; an empty value (`key=`) only
    /// requires the key to be present.
    ///
    /// # Examples
    ///
    /// ```
    /// # use docker_healthcheck_exporter::policy::LabelFilter;
    /// let filter = LabelFilter::parse(Some("monitor=true"));
    /// assert_eq!(filter.key(), Some("monitor"));
    /// assert_eq!(filter.value(), Some("true"));
    ///
    /// let filter = LabelFilter::parse(Some("monitor="));
    /// assert_eq!(filter.value(), None);
    /// ```
    pub fn parse(expr: Option<&str>) -> Self {
        let Some(expr) = expr else {
            return Self::default();
        };
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        };

        match expr.split_once('=') {
            Some((key, value)) => Self {
                key: non_empty(key),
                value: non_empty(value),
            },
            None => Self {
                key: non_empty(expr),
                value: None,
            },
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns `true` if a container carrying `labels` passes the filter.
    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        let Some(key) = self.key.as_deref() else {
            return true;
        };
        match (labels.get(key), self.value.as_deref()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        }
    }
}

/// Combined name and label policy applied by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionPolicy {
    ignore: IgnoreList,
    labels: LabelFilter,
}

impl InclusionPolicy {
    pub fn new(ignore: IgnoreList, labels: LabelFilter) -> Self {
        Self { ignore, labels }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.is_ignored(name)
    }

    pub fn matches_labels(&self, labels: &HashMap<String, String>) -> bool {
        self.labels.matches(labels)
    }

    /// Returns `true` if the container passes both filters.
    pub fn admits(&self, name: &str, labels: &HashMap<String, String>) -> bool {
        !self.is_ignored(name) && self.matches_labels(labels)
    }
}
