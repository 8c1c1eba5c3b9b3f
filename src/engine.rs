//! The collect/compare/configure reconciliation engine.
//!
//! One reconciliation runs at most two sequential choco invocations: a
//! `--what-if` dry run to observe state, then, only when the comparison
//! found a difference, the real mutating upgrade. Exactly one child process
//! is live at a time; cancellation aborts the remaining transitions.

use crate::cmdline;
use crate::diff;
use crate::error::{Error, Result};
use crate::process::{CancelToken, ProcessResult, ProcessRunner, ShellRunner, find_choco};
use crate::status::{DryRunStatus, parse_dry_run};
use crate::types::{ObservedState, Outcome, PackageSpec};

/// Reconciliation engine driving the choco CLI.
///
/// The engine wraps a [`ProcessRunner`] so tests can substitute a mock;
/// [`Engine::new`] uses the real shell runner and discovers the choco
/// executable.
pub struct Engine {
    runner: Box<dyn ProcessRunner>,
    choco_path: String,
}

impl Engine {
    /// Create an engine backed by real child processes.
    ///
    /// Returns an error if Chocolatey is not installed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            runner: Box::new(ShellRunner),
            choco_path: find_choco()?,
        })
    }

    /// Create an engine with a custom runner (useful for testing).
    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            choco_path: "choco".to_string(),
        }
    }

    /// Human-readable description of what reconciling a spec would ensure.
    pub fn describe(&self, spec: &PackageSpec) -> String {
        match spec.desired_version() {
            Some(version) => format!(
                "Ensure version {} of {} from Chocolatey is installed",
                version, spec.name
            ),
            None => format!(
                "Ensure latest version of {} from Chocolatey is installed",
                spec.name
            ),
        }
    }

    /// Bring the host to the desired state, doing nothing if it already
    /// matches.
    ///
    /// With `simulate` set, the configure step still runs but passes
    /// `--what-if` through to choco so no real mutation occurs; the state
    /// machine path is identical either way.
    pub fn reconcile(
        &self,
        spec: &PackageSpec,
        simulate: bool,
        cancel: &CancelToken,
    ) -> Result<Outcome> {
        let observed = self.collect(spec, cancel)?;

        let comparison = diff::compare(spec, &observed);
        if comparison.in_desired_state() {
            log::info!("package {} is already in the desired state", spec.name);
            return Ok(Outcome::AlreadySatisfied);
        }
        for difference in comparison.differences() {
            log::debug!(
                "package {}: {} differs, desired {} actual {}",
                spec.name,
                difference.field,
                difference.desired,
                difference.actual
            );
        }

        self.configure(spec, simulate, cancel)?;

        let from = observed.current_version().map(ToString::to_string);
        let to = spec
            .desired_version()
            .map(ToString::to_string)
            .or_else(|| match &observed {
                ObservedState::Installed {
                    available_version, ..
                } => Some(available_version.clone()),
                ObservedState::NotInstalled => None,
            });
        Ok(Outcome::Changed { from, to })
    }

    /// Install or upgrade a package unconditionally, without the
    /// collect/compare cycle.
    pub fn install(&self, spec: &PackageSpec, simulate: bool, cancel: &CancelToken) -> Result<()> {
        self.configure(spec, simulate, cancel)
    }

    /// Observe the package's current state through a `--what-if` dry run.
    fn collect(&self, spec: &PackageSpec, cancel: &CancelToken) -> Result<ObservedState> {
        let args = [
            "upgrade",
            "--yes",
            "--limit-output",
            "--fail-on-unfound",
            "--what-if",
            &spec.name,
        ];
        let result = self.run_choco(&args, cancel)?;
        if !result.success() {
            return Err(Error::CommandFailed {
                message: format!("choco dry run failed for {}", spec.name),
                output: result.output,
            });
        }

        Ok(match parse_dry_run(&result.output) {
            DryRunStatus::Recognized(status) if status.name == spec.name => {
                log::info!(
                    "package {} is at version {}, latest available is {}",
                    status.name,
                    status.current_version,
                    status.available_version
                );
                ObservedState::Installed {
                    current_version: status.current_version,
                    available_version: status.available_version,
                }
            }
            DryRunStatus::Recognized(status) => {
                // The tool answered for a different package; do not trust it.
                log::warn!(
                    "dry run reported {} while checking {}; treating {} as not installed",
                    status.name,
                    spec.name,
                    spec.name
                );
                ObservedState::NotInstalled
            }
            DryRunStatus::Pinned(status) => {
                // Known limitation: a pinned package is reinstalled rather
                // than reported as a distinct outcome.
                log::warn!(
                    "package {} is pinned at {}; treating it as not installed",
                    status.name,
                    status.current_version
                );
                ObservedState::NotInstalled
            }
            DryRunStatus::Unrecognized => {
                log::info!("package {} is not installed", spec.name);
                ObservedState::NotInstalled
            }
        })
    }

    /// Run the mutating upgrade command for a spec.
    fn configure(&self, spec: &PackageSpec, simulate: bool, cancel: &CancelToken) -> Result<()> {
        let mut args = vec!["upgrade", "--yes", "--fail-on-unfound"];
        if simulate {
            args.push("--what-if");
        }
        if let Some(version) = spec.desired_version() {
            args.push("--version");
            args.push(version);
        }
        args.push(&spec.name);

        let result = self.run_choco(&args, cancel)?;
        if !result.success() {
            return Err(Error::CommandFailed {
                message: format!("choco upgrade failed for {}", spec.name),
                output: result.output,
            });
        }
        Ok(())
    }

    fn run_choco(&self, args: &[&str], cancel: &CancelToken) -> Result<ProcessResult> {
        let arguments = cmdline::from_args(args.iter().copied());
        log::debug!("running {} {}", self.choco_path, arguments);
        self.runner.run(
            &self.choco_path,
            &arguments,
            &mut |line| log::debug!("choco: {line}"),
            cancel,
        )
    }
}
