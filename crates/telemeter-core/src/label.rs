//! Label model: canonical key/value pairs.
//!
//! A `Labels` set is kept in canonical order at all times (sorted by key, then
//! value), so its display form doubles as a stable identity string for label
//! vector hashing.

use std::collections::BTreeMap;
use std::fmt;

/// Value paired with a dangling key when an odd number of tokens is supplied.
pub const UNKNOWN_LABEL_VALUE: &str = "unknown";

/// Empty token list for metrics without declared labels.
pub const NO_LABELS: &[&str] = &[];

/// One key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Canonically ordered label set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Labels(Vec<Label>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append pairs from flat `key, value, key, value…` tokens.
    ///
    /// A trailing key without a value is paired with [`UNKNOWN_LABEL_VALUE`].
    pub fn with<I, S>(&self, tokens: I) -> Labels
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = self.0.clone();
        let mut tokens = tokens.into_iter().map(Into::into);
        while let Some(key) = tokens.next() {
            let value = tokens
                .next()
                .unwrap_or_else(|| UNKNOWN_LABEL_VALUE.to_string());
            out.push(Label { key, value });
        }
        Labels::from(out)
    }

    /// Append every label of `other`.
    pub fn with_labels(&self, other: &Labels) -> Labels {
        let mut out = self.0.clone();
        out.extend(other.0.iter().cloned());
        Labels::from(out)
    }

    /// Append pairs from a map-like iterator.
    pub fn with_map<I, K, V>(&self, pairs: I) -> Labels
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = self.0.clone();
        out.extend(pairs.into_iter().map(|(k, v)| Label::new(k, v)));
        Labels::from(out)
    }

    /// Key/value map. On duplicate keys the canonically last value wins.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|l| (l.key.clone(), l.value.clone()))
            .collect()
    }

    /// `overlay` under `local`: on a shared key the value from `local` wins.
    pub fn merged_map(overlay: &Labels, local: &Labels) -> BTreeMap<String, String> {
        let mut out = overlay.to_map();
        out.extend(local.to_map());
        out
    }

    /// `k=v,k=v` join of the canonical order.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Stable 64-bit identity of the canonical string.
    pub fn hash64(&self) -> u64 {
        let digest = blake3::hash(self.canonical().as_bytes());
        let b = digest.as_bytes();
        u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten back into `key, value…` tokens.
    pub fn to_tokens(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|l| [l.key.clone(), l.value.clone()])
            .collect()
    }
}

impl From<Vec<Label>> for Labels {
    fn from(mut labels: Vec<Label>) -> Self {
        labels.sort();
        Labels(labels)
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Labels::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}
