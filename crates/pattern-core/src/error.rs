use thiserror::Error;

/// Fatal errors surfaced to the caller (spec.md §7). Every variant aborts
/// the current run; the CLI prints a single-line diagnostic prefixed by the
/// variant name and exits non-zero (§6/§7). Non-fatal exclusions
/// (`DegenerateResult`, `ValidationIndeterminate`) are not represented here:
/// they are recovered locally and counted in the run summary instead.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("ConfigError: {0}")]
    Config(String),

    #[error("DataOrderError: {0}")]
    DataOrder(String),

    #[error("DataRangeError: {0}")]
    DataRange(String),

    #[error("EmptyFactTable: {0}")]
    EmptyFactTable(String),

    #[error("NumericOverflow: {0}")]
    NumericOverflow(String),
}

pub type PatternResult<T> = Result<T, PatternError>;
