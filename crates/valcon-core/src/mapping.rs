/// Mappings, mapping strength, and the strength selector.
///
/// A [`Mapping`] is the producer of candidate values. Consolidation looks at
/// three of its properties: [`MappingStrength`], whether it is exclusive, and
/// whether it is sourceless.
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MappingStrength
// ---------------------------------------------------------------------------

/// How forcefully a mapping asserts its values.
///
/// ```text
/// Weak   → used only when nothing else gives the item a value
/// Normal → applied unless the item already has a delta
/// Strong → always applied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrength {
    /// Fallback-only mapping.
    Weak,
    /// Regular mapping (default).
    #[default]
    Normal,
    /// Authoritative mapping.
    Strong,
}

impl fmt::Display for MappingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weak => "weak",
            Self::Normal => "normal",
            Self::Strong => "strong",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// The mapping that produced a candidate value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mapping {
    /// Human-readable name, used in conflict messages and provenance.
    pub name: String,
    /// Mapping strength.
    #[serde(default)]
    pub strength: MappingStrength,
    /// Exclusive mappings may not share a resulting value with another
    /// exclusive mapping.
    #[serde(default)]
    pub exclusive: bool,
    /// A sourceless mapping has no input sources (e.g. a constant).
    #[serde(default)]
    pub sourceless: bool,
}

impl Mapping {
    /// Creates a non-exclusive mapping with sources.
    pub fn new(name: impl Into<String>, strength: MappingStrength) -> Self {
        Self {
            name: name.into(),
            strength,
            exclusive: false,
            sourceless: false,
        }
    }

    /// Marks the mapping exclusive.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Marks the mapping sourceless.
    #[must_use]
    pub fn sourceless(mut self) -> Self {
        self.sourceless = true;
        self
    }

    pub fn is_weak(&self) -> bool {
        self.strength == MappingStrength::Weak
    }

    pub fn is_normal(&self) -> bool {
        self.strength == MappingStrength::Normal
    }

    pub fn is_strong(&self) -> bool {
        self.strength == MappingStrength::Strong
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mapping '{}'", self.strength, self.name)?;
        if self.exclusive {
            f.write_str(" (exclusive)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StrengthSelector
// ---------------------------------------------------------------------------

/// Selects which mapping strengths take part in a consolidation run.
///
/// Candidates from unselected strengths are dropped before partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrengthSelector {
    pub weak: bool,
    pub normal: bool,
    pub strong: bool,
}

impl StrengthSelector {
    /// All strengths.
    pub const ALL: Self = Self::new(true, true, true);
    /// Normal and strong.
    pub const ALL_EXCEPT_WEAK: Self = Self::new(false, true, true);
    /// Weak only.
    pub const WEAK_ONLY: Self = Self::new(true, false, false);
    /// Nothing; consolidation is skipped.
    pub const NONE: Self = Self::new(false, false, false);

    pub const fn new(weak: bool, normal: bool, strong: bool) -> Self {
        Self {
            weak,
            normal,
            strong,
        }
    }

    /// Returns `true` if no strength is selected.
    pub fn is_none(&self) -> bool {
        !self.weak && !self.normal && !self.strong
    }

    /// Returns `true` if mappings of `strength` take part.
    pub fn admits(&self, strength: MappingStrength) -> bool {
        match strength {
            MappingStrength::Weak => self.weak,
            MappingStrength::Normal => self.normal,
            MappingStrength::Strong => self.strong,
        }
    }
}

impl Default for StrengthSelector {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for StrengthSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        let parts: Vec<&str> = [
            (self.weak, "weak"),
            (self.normal, "normal"),
            (self.strong, "strong"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        f.write_str(&parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn selector_presets() {
        assert!(StrengthSelector::ALL.admits(MappingStrength::Weak));
        assert!(!StrengthSelector::ALL_EXCEPT_WEAK.admits(MappingStrength::Weak));
        assert!(StrengthSelector::ALL_EXCEPT_WEAK.admits(MappingStrength::Strong));
        assert!(!StrengthSelector::WEAK_ONLY.admits(MappingStrength::Normal));
        assert!(StrengthSelector::NONE.is_none());
        assert!(!StrengthSelector::WEAK_ONLY.is_none());
    }

    #[test]
    fn selector_default_is_all() {
        assert_eq!(StrengthSelector::default(), StrengthSelector::ALL);
    }

    #[test]
    fn selector_display() {
        assert_eq!(StrengthSelector::ALL_EXCEPT_WEAK.to_string(), "normal+strong");
        assert_eq!(StrengthSelector::NONE.to_string(), "none");
    }

    #[test]
    fn mapping_builders() {
        let m = Mapping::new("mail", MappingStrength::Strong)
            .exclusive()
            .sourceless();
        assert!(m.exclusive && m.sourceless && m.is_strong());
        assert_eq!(m.to_string(), "strong mapping 'mail' (exclusive)");
    }

    #[test]
    fn strength_defaults_to_normal_in_json() {
        let m: Mapping = serde_json::from_str(r#"{"name": "x"}"#).expect("valid mapping");
        assert_eq!(m.name, "x");
        assert!(m.is_normal());
    }
}
