// cbm-common/src/model/version.rs
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix carried by the remote directory of a release candidate tree.
pub const CANDIDATES_SUFFIX: &str = "-candidates";

/// Prefix of the numbered build folders inside a version directory.
pub const BUILD_FOLDER_PREFIX: &str = "build";

/// Opaque release identifier, e.g. `128.0b3-candidates`.
///
/// The raw form addresses the remote directory; [`VersionId::clean`] is the
/// form used in published filenames and reported by installed binaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Normalizes user input to the candidate-tree form by appending the
    /// `-candidates` suffix when it is missing.
    pub fn candidate(input: &str) -> Self {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.ends_with(CANDIDATES_SUFFIX) {
            Self(trimmed.to_string())
        } else {
            Self(format!("{trimmed}{CANDIDATES_SUFFIX}"))
        }
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn clean(&self) -> &str {
        self.0.strip_suffix(CANDIDATES_SUFFIX).unwrap_or(&self.0)
    }

    pub fn is_candidate(&self) -> bool {
        self.0.ends_with(CANDIDATES_SUFFIX)
    }

    /// Builds the identifier for `clean_version` in the same form as `self`:
    /// suffixed if `self` is suffixed, bare otherwise.
    pub fn with_clean_version(&self, clean_version: &str) -> Self {
        if self.is_candidate() {
            Self(format!("{clean_version}{CANDIDATES_SUFFIX}"))
        } else {
            Self(clean_version.to_string())
        }
    }

    /// Orders identifiers by their numeric runs, so `99.0` sorts before `100.0`
    /// and `128.0b10` after `128.0b9`.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        natural_cmp(self.clean(), other.clean())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let mut l_run = String::new();
                while let Some(c) = left.next_if(|c| c.is_ascii_digit()) {
                    l_run.push(c);
                }
                let mut r_run = String::new();
                while let Some(c) = right.next_if(|c| c.is_ascii_digit()) {
                    r_run.push(c);
                }
                let l_num = l_run.trim_start_matches('0');
                let r_num = r_run.trim_start_matches('0');
                let ord = l_num.len().cmp(&r_num.len()).then_with(|| l_num.cmp(r_num));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Number of a `build<N>` folder. Ordered by integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Parses `build<digits>`; anything else yields `None`.
    pub fn from_folder_name(name: &str) -> Option<Self> {
        let digits = name.trim_end_matches('/').strip_prefix(BUILD_FOLDER_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    pub fn folder_name(self) -> String {
        format!("{BUILD_FOLDER_PREFIX}{}", self.0)
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BUILD_FOLDER_PREFIX}{}", self.0)
    }
}
