//! Core value types for package reconciliation.

use serde::{Deserialize, Serialize};

/// Desired state of a single Chocolatey package.
///
/// A missing or empty version means "track the latest available version".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name as known to Chocolatey (e.g. "git")
    pub name: String,
    /// Optional version to pin; `None` or empty tracks latest
    pub version: Option<String>,
}

impl PackageSpec {
    /// Desire the latest available version of a package.
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Desire a specific version of a package.
    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// The pinned version, if one was requested.
    ///
    /// An empty version string is treated the same as no version at all.
    pub fn desired_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Whether this spec tracks the latest available version.
    pub fn wants_latest(&self) -> bool {
        self.desired_version().is_none()
    }
}

/// Actual state of a package on the host, observed from one dry run.
///
/// Discarded after the comparison step; never persisted across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservedState {
    /// The package is not installed (or the dry run could not recognize it)
    NotInstalled,
    /// The package is installed
    Installed {
        /// Version currently on the host
        current_version: String,
        /// Newest version the tool knows about
        available_version: String,
    },
}

impl ObservedState {
    /// Check if the package was observed as installed.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The installed version, if any.
    pub fn current_version(&self) -> Option<&str> {
        match self {
            Self::Installed {
                current_version, ..
            } => Some(current_version),
            Self::NotInstalled => None,
        }
    }
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The host already matched the desired state; nothing was run
    AlreadySatisfied,
    /// The configure step ran (or was simulated) to close a difference
    Changed {
        /// Version that was installed before, `None` if not installed
        from: Option<String>,
        /// Version being moved to, `None` when tracking latest with no
        /// known target version
        to: Option<String>,
    },
}

impl Outcome {
    /// Check if the reconciliation changed (or would change) the host.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySatisfied => write!(f, "already satisfied"),
            Self::Changed { from, to } => write!(
                f,
                "changed from {} to {}",
                from.as_deref().unwrap_or("not installed"),
                to.as_deref().unwrap_or("latest")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_constructors() {
        let latest = PackageSpec::latest("git");
        assert_eq!(latest.name, "git");
        assert!(latest.wants_latest());

        let pinned = PackageSpec::versioned("git", "2.40.0");
        assert_eq!(pinned.desired_version(), Some("2.40.0"));
        assert!(!pinned.wants_latest());
    }

    #[test]
    fn test_empty_version_means_latest() {
        let spec = PackageSpec::versioned("git", "");
        assert!(spec.wants_latest());
        assert_eq!(spec.desired_version(), None);
    }

    #[test]
    fn test_observed_state_accessors() {
        let installed = ObservedState::Installed {
            current_version: "1.0.0".to_string(),
            available_version: "1.2.0".to_string(),
        };
        assert!(installed.is_installed());
        assert_eq!(installed.current_version(), Some("1.0.0"));
        assert_eq!(ObservedState::NotInstalled.current_version(), None);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = Outcome::Changed {
            from: None,
            to: Some("2.0.0".to_string()),
        };
        assert_eq!(outcome.to_string(), "changed from not installed to 2.0.0");
        assert_eq!(Outcome::AlreadySatisfied.to_string(), "already satisfied");
    }
}
