/// Validated newtype wrappers for consolidation domain strings.
///
/// Each newtype enforces a regex-based shape constraint at construction time via
/// [`TryFrom<&str>`]. Serde `Deserialize` impls re-run validation so invalid
/// data cannot enter the type system from untrusted JSON.
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

impl fmt::Display for NewtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                type_name,
                expected,
                got,
            } => write!(f, "invalid {type_name}: expected {expected}, got {got:?}"),
        }
    }
}

impl std::error::Error for NewtypeError {}

// ---------------------------------------------------------------------------
// Regex statics
//
// The pattern is a literal and always compiles. `None` would only mean a
// broken regex engine, in which case every path is rejected.
// ---------------------------------------------------------------------------

/// Matches slash-separated segments, each an optionally prefixed name
/// (`name`, `prefix:name`).
static ITEM_PATH_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z_][\w.-]*:)?[A-Za-z_][\w.-]*(?:/(?:[A-Za-z_][\w.-]*:)?[A-Za-z_][\w.-]*)*$",
    )
    .ok()
});

// ---------------------------------------------------------------------------
// ItemPath
// ---------------------------------------------------------------------------

/// Path of the item being consolidated, e.g. `fullName` or
/// `attributes/ri:mail`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemPath(String);

/// The path of the assignment container item.
pub const ASSIGNMENT_PATH: &str = "assignment";

impl TryFrom<&str> for ItemPath {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let valid = ITEM_PATH_RE.as_ref().is_some_and(|re| re.is_match(s));
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "ItemPath",
                expected: "slash-separated names, optionally prefixed (e.g. attributes/ri:mail)",
                got: s.to_owned(),
            })
        }
    }
}

impl ItemPath {
    /// Returns `true` when this path names the assignment item.
    ///
    /// Namespace prefixes are ignored, so `c:assignment` also qualifies.
    pub fn is_assignment(&self) -> bool {
        let mut segments = self.segments();
        match (segments.next(), segments.next()) {
            (Some(only), None) => local_name(only) == ASSIGNMENT_PATH,
            (Some(_), Some(_)) | (None, _) => false,
        }
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns `true` when both paths name the same item, ignoring
    /// namespace prefixes.
    pub fn equivalent(&self, other: &ItemPath) -> bool {
        let mut a = self.segments().map(local_name);
        let mut b = other.segments().map(local_name);
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x == y => {}
                (Some(_), Some(_)) | (Some(_), None) | (None, Some(_)) => return false,
            }
        }
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn local_name(segment: &str) -> &str {
    segment.rsplit(':').next().unwrap_or(segment)
}

impl Deref for ItemPath {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ItemPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ItemPath::try_from(s.as_str()).map_err(de::Error::custom)
    }
}
