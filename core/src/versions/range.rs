//! Version range notation

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::errors::PublishError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Inclusive,
    Exclusive,
}

/// An interval of semantic versions.
///
/// Accepts registry interval notation such as `[2.0.0,3.0.0)`,
/// `(1.0.0,2.0.0]` and `[1.2.0,)`, plus a bare version as a floor
/// (`1.2.0` means `[1.2.0,)`).
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    raw: String,
    min: Option<(Version, Bound)>,
    max: Option<(Version, Bound)>,
}

impl VersionRange {
    /// Whether `version` satisfies the range
    pub fn matches(&self, version: &Version) -> bool {
        if let Some((min, bound)) = &self.min {
            let below = match bound {
                Bound::Inclusive => version < min,
                Bound::Exclusive => version <= min,
            };
            if below {
                return false;
            }
        }
        if let Some((max, bound)) = &self.max {
            let above = match bound {
                Bound::Inclusive => version > max,
                Bound::Exclusive => version >= max,
            };
            if above {
                return false;
            }
        }
        true
    }

    /// The notation the range was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionRange {
    type Err = PublishError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PublishError::InvalidVersionRange("empty range".to_string()));
        }

        if !trimmed.starts_with('[') && !trimmed.starts_with('(') {
            // Bare version: floor semantics
            let version = parse_version(trimmed)?;
            return Ok(Self {
                raw: trimmed.to_string(),
                min: Some((version, Bound::Inclusive)),
                max: None,
            });
        }

        let min_bound = if trimmed.starts_with('[') {
            Bound::Inclusive
        } else {
            Bound::Exclusive
        };
        let max_bound = match trimmed.chars().last() {
            Some(']') => Bound::Inclusive,
            Some(')') => Bound::Exclusive,
            _ => {
                return Err(PublishError::InvalidVersionRange(format!(
                    "unterminated interval: {trimmed}"
                )))
            }
        };

        let inner = &trimmed[1..trimmed.len() - 1];
        let (low, high) = inner.split_once(',').ok_or_else(|| {
            PublishError::InvalidVersionRange(format!("interval needs a comma: {trimmed}"))
        })?;

        let min = match low.trim() {
            "" => None,
            version => Some((parse_version(version)?, min_bound)),
        };
        let max = match high.trim() {
            "" => None,
            version => Some((parse_version(version)?, max_bound)),
        };
        if min.is_none() && max.is_none() {
            return Err(PublishError::InvalidVersionRange(format!(
                "interval has no bounds: {trimmed}"
            )));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            min,
            max,
        })
    }
}

fn parse_version(raw: &str) -> Result<Version, PublishError> {
    Version::parse(raw.trim())
        .map_err(|e| PublishError::InvalidVersionRange(format!("{raw}: {e}")))
}
