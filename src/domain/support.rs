//! Support Level Computation
//!
//! Turns a support manifest entry (a firmware version string, a literal
//! status, or nothing) into one of the four canonical levels, given the
//! latest released firmware version per device generation.

use std::fmt;

use semver::Version;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupportError {
    #[error("Unparseable firmware version '{0}'")]
    BadVersion(String),
}

/// The canonical support levels, in the order they are usually listed.
pub const SUPPORT_LEVELS: [&str; 4] = ["yes", "no", "planned", "soon"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportLevel {
    Yes,
    No,
    Planned,
    Soon,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::Yes => "yes",
            SupportLevel::No => "no",
            SupportLevel::Planned => "planned",
            SupportLevel::Soon => "soon",
        }
    }

    /// Whether `value` is one of the canonical levels.
    pub fn is_valid(value: &str) -> bool {
        SUPPORT_LEVELS.contains(&value)
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a firmware version, tolerating a leading `v` and short forms like
/// `1.6` (padded with zeros to three components).
pub fn parse_version(raw: &str) -> Result<Version, SupportError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Ok(version);
    }

    let components = trimmed.split('.').count();
    if components > 0 && components < 3 {
        let padded = format!("{}{}", trimmed, ".0".repeat(3 - components));
        if let Ok(version) = Version::parse(&padded) {
            return Ok(version);
        }
    }

    Err(SupportError::BadVersion(raw.to_string()))
}

/// Support level for one device generation.
///
/// No manifest entry means unsupported. The literal statuses `soon` and
/// `planned` pass through. Anything else is a firmware version: released
/// (at or below `latest`) means `yes`, newer than the latest release means
/// `soon`.
pub fn support_level(entry: Option<&str>, latest: &Version) -> Result<SupportLevel, SupportError> {
    let entry = match entry {
        Some(entry) => entry.trim(),
        None => return Ok(SupportLevel::No),
    };

    match entry {
        "" => Ok(SupportLevel::No),
        "soon" => Ok(SupportLevel::Soon),
        "planned" => Ok(SupportLevel::Planned),
        version => {
            let required = parse_version(version)?;
            if required <= *latest {
                Ok(SupportLevel::Yes)
            } else {
                Ok(SupportLevel::Soon)
            }
        }
    }
}

/// Whether the first-generation firmware source lists `symbol`.
///
/// Token tables in the C source carry entries like `" BAT"` (symbol padded
/// with a leading space inside the quotes).
pub fn t1_token_level(firmware_source: &str, symbol: &str) -> SupportLevel {
    if firmware_source.contains(&format!("\" {}\"", symbol)) {
        SupportLevel::Yes
    } else {
        SupportLevel::Soon
    }
}

/// Whether the second-generation firmware source lists `symbol`.
///
/// Token tables in the Python source quote the bare symbol, `'BAT'`.
pub fn t2_token_level(firmware_source: &str, symbol: &str) -> SupportLevel {
    if firmware_source.contains(&format!("'{}'", symbol)) {
        SupportLevel::Yes
    } else {
        SupportLevel::Soon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest() -> Version {
        parse_version("1.6.2").unwrap()
    }

    #[test]
    fn test_parse_version_plain() {
        assert_eq!(parse_version("1.6.2").unwrap(), Version::new(1, 6, 2));
    }

    #[test]
    fn test_parse_version_padded() {
        assert_eq!(parse_version("1.6").unwrap(), Version::new(1, 6, 0));
        assert_eq!(parse_version("2").unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_parse_version_leading_v() {
        assert_eq!(parse_version("v2.0.7").unwrap(), Version::new(2, 0, 7));
    }

    #[test]
    fn test_parse_version_garbage() {
        assert_eq!(
            parse_version("not-a-version"),
            Err(SupportError::BadVersion("not-a-version".to_string()))
        );
    }

    #[test]
    fn test_released_version_is_yes() {
        assert_eq!(
            support_level(Some("1.5.0"), &latest()).unwrap(),
            SupportLevel::Yes
        );
        assert_eq!(
            support_level(Some("1.6.2"), &latest()).unwrap(),
            SupportLevel::Yes
        );
    }

    #[test]
    fn test_unreleased_version_is_soon() {
        assert_eq!(
            support_level(Some("1.7.0"), &latest()).unwrap(),
            SupportLevel::Soon
        );
    }

    #[test]
    fn test_missing_entry_is_no() {
        assert_eq!(support_level(None, &latest()).unwrap(), SupportLevel::No);
    }

    #[test]
    fn test_literal_statuses_pass_through() {
        assert_eq!(
            support_level(Some("soon"), &latest()).unwrap(),
            SupportLevel::Soon
        );
        assert_eq!(
            support_level(Some("planned"), &latest()).unwrap(),
            SupportLevel::Planned
        );
    }

    #[test]
    fn test_unknown_manifest_literal_is_an_error() {
        assert_eq!(
            support_level(Some("yes"), &latest()),
            Err(SupportError::BadVersion("yes".to_string()))
        );
    }

    #[test]
    fn test_t1_pattern_needs_leading_space_inside_quotes() {
        let source = r#"{" BAT", 18}, {" REP", 18},"#;
        assert_eq!(t1_token_level(source, "BAT"), SupportLevel::Yes);
        assert_eq!(t1_token_level(source, "GNT"), SupportLevel::Soon);
        // A bare substring match is not enough.
        assert_eq!(t1_token_level(r#""BAT""#, "BAT"), SupportLevel::Soon);
    }

    #[test]
    fn test_t2_pattern_is_single_quoted() {
        let source = "tokens = [('BAT', 18), ('REP', 18)]";
        assert_eq!(t2_token_level(source, "BAT"), SupportLevel::Yes);
        assert_eq!(t2_token_level(source, "GNT"), SupportLevel::Soon);
    }

    #[test]
    fn test_is_valid_levels() {
        for level in SUPPORT_LEVELS {
            assert!(SupportLevel::is_valid(level));
        }
        assert!(!SupportLevel::is_valid("maybe"));
        assert!(!SupportLevel::is_valid("Yes"));
    }
}
