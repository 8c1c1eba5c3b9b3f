//! Comparison between desired and observed package state.
//!
//! Comparison is a pure function of two value types; an empty result means
//! the host is already in the desired state and no action is needed.

use serde::{Deserialize, Serialize};

use crate::types::{ObservedState, PackageSpec};

/// Value shown for a version that is not present or not pinned down.
const NOT_INSTALLED: &str = "not-installed";

/// A single field-level difference between desired and observed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Name of the differing field
    pub field: String,
    /// Value the caller asked for
    pub desired: String,
    /// Value observed on the host
    pub actual: String,
}

impl Difference {
    fn version(desired: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: "version".to_string(),
            desired: desired.into(),
            actual: actual.into(),
        }
    }
}

/// Zero or more differences from one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    differences: Vec<Difference>,
}

impl ComparisonResult {
    fn in_state() -> Self {
        Self::default()
    }

    fn differing(difference: Difference) -> Self {
        Self {
            differences: vec![difference],
        }
    }

    /// Check if the observed state already matches the desired state.
    pub fn in_desired_state(&self) -> bool {
        self.differences.is_empty()
    }

    /// The individual differences found.
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }
}

/// Compare a desired spec against the state observed on the host.
///
/// Version strings are opaque ordinals compared for exact equality; no
/// semantic version parsing happens here, matching choco's own comparison.
/// A spec tracking latest is satisfied by whatever is installed unless a
/// newer version is available.
pub fn compare(spec: &PackageSpec, observed: &ObservedState) -> ComparisonResult {
    match observed {
        ObservedState::NotInstalled => ComparisonResult::differing(Difference::version(
            spec.desired_version().unwrap_or("latest"),
            NOT_INSTALLED,
        )),
        ObservedState::Installed {
            current_version,
            available_version,
        } => match spec.desired_version() {
            None => {
                if current_version == available_version {
                    ComparisonResult::in_state()
                } else {
                    ComparisonResult::differing(Difference::version(
                        available_version,
                        current_version,
                    ))
                }
            }
            Some(desired) => {
                if desired == current_version {
                    ComparisonResult::in_state()
                } else {
                    ComparisonResult::differing(Difference::version(desired, current_version))
                }
            }
        },
    }
}
