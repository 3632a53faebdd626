//! List-valued configuration arguments.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Ordered collection of string tokens collected from repeatable or
/// comma-separated configuration inputs.
///
/// Each occurrence is split on commas and appended in order. Duplicates are
/// kept, and so are empty entries (a trailing comma produces one); consumers
/// drop empties when they build their allow-sets, so an empty entry never
/// matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ArgumentSetRepr")]
pub struct ArgumentSet(Vec<String>);

impl ArgumentSet {
    /// Build a set from a series of flag occurrences.
    pub fn from_occurrences<I, S>(occurrences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for occurrence in occurrences {
            set.append(occurrence.as_ref());
        }
        set
    }

    /// Append one occurrence, splitting it on commas.
    pub fn append(&mut self, occurrence: &str) {
        self.0.extend(occurrence.split(',').map(str::to_string));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Membership set for enforcement. Empty entries are dropped here rather
    /// than at parse time.
    pub fn allow_set(&self) -> HashSet<String> {
        self.0
            .iter()
            .filter(|entry| !entry.is_empty())
            .cloned()
            .collect()
    }

    /// Rendering for startup summaries: `*` stands for "unrestricted".
    pub fn pretty(&self) -> String {
        if self.0.is_empty() {
            "*".to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ArgumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl Serialize for ArgumentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Config files may carry either a single comma-separated string or an array
/// of strings; both routes go through [`ArgumentSet::append`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ArgumentSetRepr {
    One(String),
    Many(Vec<String>),
}

impl From<ArgumentSetRepr> for ArgumentSet {
    fn from(repr: ArgumentSetRepr) -> Self {
        match repr {
            ArgumentSetRepr::One(value) => ArgumentSet::from_occurrences([value]),
            ArgumentSetRepr::Many(values) => ArgumentSet::from_occurrences(values),
        }
    }
}
