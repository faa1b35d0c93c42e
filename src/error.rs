/// Fatal, run-level error carrying the process exit code it maps to.
///
/// Exit codes: 2 for usage, data, and IO on user-named files (spectra in,
/// exports out), 3 for inputs left empty after validation, 4 for everything
/// else (rendering, terminal, internal failures).
#[derive(Clone, Debug)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

/// Recoverable failure of a single peak fit.
///
/// Raised by the least-squares solver for any numerical reason (no
/// convergence within the iteration cap, singular normal equations,
/// non-finite values, too few samples). Callers absorb it at the per-column
/// boundary: the failing mode is skipped with a warning and the run goes on.
/// Anything fatal to the whole run is an [`AppError`] instead.
#[derive(Clone, Debug)]
pub struct FitFailure {
    reason: String,
}

impl FitFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Display for FitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for FitFailure {}
