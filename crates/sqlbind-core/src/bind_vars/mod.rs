//! Bind variable extraction and comparison

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::normalize::{strip_templates, BIND_VAR_TOKEN};

/// A bind variable name in its canonical `:name` form.
///
/// Equality is exact; case-insensitive identity is applied by [`BindVarSet::canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindVarName(String);

impl BindVarName {
    /// Build a name, adding the `:` prefix when absent
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if name.starts_with(':') {
            Self(name.to_string())
        } else {
            Self(format!(":{}", name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded identity key
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for BindVarName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distinct bind variable spellings in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindVarSet {
    names: Vec<BindVarName>,
}

impl BindVarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from host-supplied mapping keys (`uid` or `:uid`)
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter().map(BindVarName::new).collect()
    }

    /// Add a name unless the exact spelling is already present
    pub fn insert(&mut self, name: BindVarName) {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindVarName> {
        self.names.iter()
    }

    /// Project into a lowercase-keyed map, keeping the last-seen spelling of each key
    pub fn canonical(&self) -> IndexMap<String, BindVarName> {
        let mut map = IndexMap::new();
        for name in &self.names {
            map.insert(name.key(), name.clone());
        }
        map
    }
}

impl FromIterator<BindVarName> for BindVarSet {
    fn from_iter<T: IntoIterator<Item = BindVarName>>(iter: T) -> Self {
        let mut set = BindVarSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> IntoIterator for &'a BindVarSet {
    type Item = &'a BindVarName;
    type IntoIter = std::slice::Iter<'a, BindVarName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Collect the bind variables a SQL statement references
///
/// Placeholders and string literal contents are stripped first; the
/// `::type` cast syntax is skipped.
pub fn extract_referenced(sql: &str) -> BindVarSet {
    let stripped = strip_templates(sql);
    BIND_VAR_TOKEN
        .captures_iter(&stripped)
        .filter(|caps| caps["cast"].is_empty())
        .map(|caps| BindVarName::new(&caps["name"]))
        .collect()
}

/// Result of comparing expected against supplied bind variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindVarDiff {
    /// Referenced by the SQL but not supplied
    pub missing: BindVarSet,
    /// Supplied but not referenced by the SQL
    pub unexpected: BindVarSet,
}

impl BindVarDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Case-insensitive difference between `expected` and `actual`
pub fn compare(expected: &BindVarSet, actual: &BindVarSet) -> BindVarDiff {
    let expected = expected.canonical();
    let actual = actual.canonical();

    let missing = expected
        .iter()
        .filter(|(key, _)| !actual.contains_key(*key))
        .map(|(_, name)| name.clone())
        .collect();
    let unexpected = actual
        .iter()
        .filter(|(key, _)| !expected.contains_key(*key))
        .map(|(_, name)| name.clone())
        .collect();

    BindVarDiff {
        missing,
        unexpected,
    }
}

/// Find a similar bind variable name (for suggestions)
pub fn find_similar<'a>(
    name: &BindVarName,
    candidates: &'a BindVarSet,
) -> Option<&'a BindVarName> {
    let key = name.key();
    let mut best_match: Option<(usize, &BindVarName)> = None;

    for candidate in candidates {
        let distance = levenshtein_distance(&key, &candidate.key());

        // Only suggest if reasonably similar (distance <= 3)
        if distance <= 3 && best_match.map_or(true, |(best, _)| distance < best) {
            best_match = Some((distance, candidate));
        }
    }

    best_match.map(|(_, name)| name)
}

/// Simple Levenshtein distance implementation
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
