//! # chocokit
//!
//! Pure Rust library for declarative Chocolatey package reconciliation.
//!
//! This crate provides the classic "ensure" pattern for a managed Windows
//! host: given a desired package name and optional version, it observes the
//! host's current state through a `choco` dry run, compares it against the
//! desired state, and runs the real upgrade only when the two differ.
//!
//! ## Example
//!
//! ```no_run
//! use chocokit::{CancelToken, Engine, PackageSpec};
//!
//! let engine = Engine::new().expect("Chocolatey not available");
//! let spec = PackageSpec::versioned("git", "2.40.0");
//!
//! let outcome = engine
//!     .reconcile(&spec, false, &CancelToken::new())
//!     .expect("reconcile failed");
//! println!("{outcome}");
//! ```
//!
//! ## Idempotence
//!
//! Repeated reconciliations of the same spec against an already-reconciled
//! host reach [`Outcome::AlreadySatisfied`] without ever running the
//! mutating upgrade; the dry run is the only process started.
//!
//! ## Cancellation
//!
//! Every reconciliation takes a [`CancelToken`]. Firing the token while a
//! child process is running terminates it best-effort and surfaces
//! [`Error::Cancelled`]; a failed termination never masks the cancellation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cmdline;
pub mod diff;
pub mod engine;
pub mod error;
pub mod process;
pub mod status;
pub mod types;

pub use diff::{ComparisonResult, Difference, compare};
pub use engine::Engine;
pub use error::{Error, Result};
pub use process::{CancelToken, ProcessResult, ProcessRunner, ShellRunner};
pub use status::{DryRunStatus, PackageStatus, parse_dry_run};
pub use types::{ObservedState, Outcome, PackageSpec};
