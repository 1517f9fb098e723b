//! CLI surface (spec.md §6):
//!
//! ```text
//! <prog> <mcpt-config> <search-config> {longonly|shortonly|longshort}
//!        {IS|OOS|ISOOS} <search-type 0..4>
//!        {threads:<n>|validate:<runid>}
//!        {--local <daily> <hourly> | --api:<source> <api-config>}
//! ```
//!
//! The positional `{threads:<n>|validate:<runid>}` token and the
//! colon-joined `--api:<source>` flag aren't expressible directly as a
//! `clap` derive shape; both are parsed from plain strings below (see
//! DESIGN.md's resolution of this Open Question). `--local`/`--api` are
//! mutually exclusive data-source selectors; ingesting the `--api` source
//! is out of scope (spec.md §1 "CSV/API ingestion... treated as an
//! external collaborator") and is rejected with `ConfigError` at runtime.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pattern_core::{PatternError, PatternResult, SearchType, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    #[value(name = "longonly")]
    LongOnly,
    #[value(name = "shortonly")]
    ShortOnly,
    #[value(name = "longshort")]
    LongShort,
}

impl SideArg {
    /// The concrete [`Side`] passes this selector runs, in order.
    pub fn sides(self) -> Vec<Side> {
        match self {
            SideArg::LongOnly => vec![Side::Long],
            SideArg::ShortOnly => vec![Side::Short],
            SideArg::LongShort => vec![Side::Long, Side::Short],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleArg {
    #[value(name = "IS")]
    InSample,
    #[value(name = "OOS")]
    OutOfSample,
    #[value(name = "ISOOS")]
    Both,
}

/// `{threads:<n>|validate:<runid>}` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run the full discovery pipeline using `n` worker threads (`0` means
    /// hardware parallelism, spec.md §5).
    Discover { threads: usize },
    /// Re-run only the permutation validator (C9) against a previously
    /// selected run's survivor files.
    Validate { run_id: String },
}

impl RunMode {
    pub fn parse(raw: &str) -> PatternResult<Self> {
        if let Some(n) = raw.strip_prefix("threads:") {
            let threads: usize = n
                .parse()
                .map_err(|_| PatternError::Config(format!("invalid thread count: {n}")))?;
            return Ok(RunMode::Discover { threads });
        }
        if let Some(run_id) = raw.strip_prefix("validate:") {
            if run_id.is_empty() {
                return Err(PatternError::Config("validate: requires a run id".into()));
            }
            return Ok(RunMode::Validate {
                run_id: run_id.to_string(),
            });
        }
        Err(PatternError::Config(format!(
            "mode must be threads:<n> or validate:<runid>, got: {raw}"
        )))
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "palvalidator",
    about = "Price-action pattern discovery and permutation validation engine"
)]
pub struct Args {
    /// Path to the Monte Carlo permutation test (risk parameters) config.
    pub mcpt_config: PathBuf,

    /// Path to the search-space/stepping/survival config.
    pub search_config: PathBuf,

    /// Trade direction(s) to search.
    pub side: SideArg,

    /// In-sample / out-of-sample date partitioning.
    pub sample: SampleArg,

    /// Field universe selector (0=CloseOnly .. 4=Extended).
    pub search_type: u8,

    /// `threads:<n>` or `validate:<runid>`.
    pub mode: String,

    /// Local daily and hourly bar files (CSV: timestamp,open,high,low,close,volume).
    #[arg(long = "local", num_args = 2, value_names = ["DAILY", "HOURLY"])]
    pub local: Option<Vec<PathBuf>>,

    /// Remote data source name and its API config file. Not implemented
    /// (spec.md §1 Non-goals); accepted for CLI-shape parity only.
    #[arg(long = "api", num_args = 2, value_names = ["SOURCE", "API_CONFIG"])]
    pub api: Option<Vec<String>>,
}

impl Args {
    pub fn search_type(&self) -> PatternResult<SearchType> {
        SearchType::from_index(self.search_type)
    }

    pub fn mode(&self) -> PatternResult<RunMode> {
        RunMode::parse(&self.mode)
    }

    pub fn validate_data_source(&self) -> PatternResult<()> {
        match (&self.local, &self.api) {
            (Some(_), None) => Ok(()),
            (None, Some(_)) => Err(PatternError::Config(
                "--api data sources are an external collaborator and are not implemented; use --local".into(),
            )),
            (None, None) => Err(PatternError::Config(
                "one of --local or --api is required".into(),
            )),
            (Some(_), Some(_)) => Err(PatternError::Config(
                "--local and --api are mutually exclusive".into(),
            )),
        }
    }
}
