//! Problem-details error surface
//!
//! Every failed request renders as `application/problem+json` with a body
//! of machine-readable error codes. [`ApiError`] is the taxonomy handlers
//! return, [`ApiProblem`] the response value object, and [`install`] wires
//! the runtime options (code prefix, verbose mode) from configuration at
//! startup.

use std::sync::OnceLock;

mod details;
mod naming;
mod translator;

pub use details::{codes, ApiProblem};
pub use naming::normalize_type_name;
pub use translator::{ApiError, AuthErrorKind};

/// Runtime options for problem rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemOptions {
    /// Surface raw internal failure messages instead of redacting them.
    /// Enabled for `dev`/`test` environments.
    pub verbose: bool,
    /// Namespace prefix applied to every error code.
    pub prefix: String,
}

impl Default for ProblemOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            prefix: codes::PREFIX.to_string(),
        }
    }
}

static OPTIONS: OnceLock<ProblemOptions> = OnceLock::new();

/// Install the problem-rendering options. Call once at startup; later
/// calls are ignored.
pub fn install(opts: ProblemOptions) {
    let _ = OPTIONS.set(opts);
}

/// The installed options, or the production defaults when none were
/// installed.
#[must_use]
pub fn options() -> ProblemOptions {
    OPTIONS.get().cloned().unwrap_or_default()
}
