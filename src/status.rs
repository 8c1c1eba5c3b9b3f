//! Parsing of `choco upgrade --what-if --limit-output` output.
//!
//! With `--limit-output`, choco reports a known package as a single
//! pipe-delimited line: `name|currentVersion|availableVersion|pinned`.
//! Anything else (error text, empty output, a differently-shaped line) is
//! indistinguishable from "not present" at this layer, so shape mismatches
//! are surfaced as [`DryRunStatus::Unrecognized`] rather than errors.

use serde::{Deserialize, Serialize};

/// One parsed status line from a choco dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStatus {
    /// Package name as reported by choco
    pub name: String,
    /// Version currently installed on the host
    pub current_version: String,
    /// Newest version available from the configured sources
    pub available_version: String,
    /// Whether the package is pinned against automatic version changes
    pub pinned: bool,
}

/// Interpretation of a dry-run output buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunStatus {
    /// A well-formed status line for an unpinned package
    Recognized(PackageStatus),
    /// A well-formed status line for a pinned package
    Pinned(PackageStatus),
    /// Output did not match the expected four-field shape
    Unrecognized,
}

/// Parse the raw output of a `--what-if` upgrade into a package status.
///
/// Pinned packages are reported separately so the caller can decide how to
/// treat them; they are not folded into `Unrecognized` silently.
pub fn parse_dry_run(raw: &str) -> DryRunStatus {
    let fields: Vec<&str> = raw.trim().split('|').collect();
    if fields.len() != 4 {
        return DryRunStatus::Unrecognized;
    }

    let status = PackageStatus {
        name: fields[0].to_string(),
        current_version: fields[1].to_string(),
        available_version: fields[2].to_string(),
        pinned: fields[3] != "false",
    };

    if status.pinned {
        DryRunStatus::Pinned(status)
    } else {
        DryRunStatus::Recognized(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        let parsed = parse_dry_run("git|1.0.0|1.2.0|false");
        assert_eq!(
            parsed,
            DryRunStatus::Recognized(PackageStatus {
                name: "git".to_string(),
                current_version: "1.0.0".to_string(),
                available_version: "1.2.0".to_string(),
                pinned: false,
            })
        );
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let parsed = parse_dry_run("  git|1.0.0|1.2.0|false\r\n");
        assert!(matches!(parsed, DryRunStatus::Recognized(_)));
    }

    #[test]
    fn test_parse_pinned_package() {
        match parse_dry_run("git|1.0.0|1.2.0|true") {
            DryRunStatus::Pinned(status) => {
                assert!(status.pinned);
                assert_eq!(status.current_version, "1.0.0");
            }
            other => panic!("expected pinned, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_text_is_unrecognized() {
        assert_eq!(parse_dry_run("unexpected error text"), DryRunStatus::Unrecognized);
        assert_eq!(parse_dry_run(""), DryRunStatus::Unrecognized);
        assert_eq!(parse_dry_run("a|b|c"), DryRunStatus::Unrecognized);
        assert_eq!(parse_dry_run("a|b|c|d|e"), DryRunStatus::Unrecognized);
    }
}
