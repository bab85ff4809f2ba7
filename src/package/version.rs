//! Package version ordering.
//!
//! Versions are parsed from version directory names. A version is a sequence
//! of tokens separated by `.` or `-`; each token is made of runs of digits and
//! runs of other characters. Comparison walks tokens and runs in order:
//!
//! - numeric runs compare numerically (leading zeros ignored, any length)
//! - other runs compare lexically
//! - a non-numeric run sorts before a numeric run
//! - a version that is a prefix of another is the smaller one (`1.0 < 1.0.0`)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Run {
    Alpha(String),
    /// Digits with leading zeros stripped.
    Number(String),
}

impl Ord for Run {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Alpha(a), Run::Alpha(b)) => a.cmp(b),
            (Run::Number(a), Run::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Run::Alpha(_), Run::Number(_)) => Ordering::Less,
            (Run::Number(_), Run::Alpha(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Run {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An ordered, comparable package version.
///
/// Equality follows the ordering, so `1.01` and `1.1` are equal versions even
/// though their text differs.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    tokens: Vec<Vec<Run>>,
}

impl Version {
    /// Parse a version string. Every string is a valid version; the empty
    /// string is the smallest version.
    pub fn parse(text: &str) -> Self {
        let tokens = text
            .split(['.', '-'])
            .filter(|t| !t.is_empty())
            .map(split_runs)
            .collect();

        Self {
            text: text.to_string(),
            tokens,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn split_runs(token: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut numeric = false;

    for c in token.chars() {
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != numeric {
            runs.push(make_run(std::mem::take(&mut current), numeric));
        }
        numeric = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        runs.push(make_run(current, numeric));
    }
    runs
}

fn make_run(text: String, numeric: bool) -> Run {
    if numeric {
        Run::Number(text.trim_start_matches('0').to_string())
    } else {
        Run::Alpha(text)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tokens.cmp(&other.tokens)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Version::parse(s))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Version::parse(&text))
    }
}
