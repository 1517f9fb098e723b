//! Search-space enumeration and evaluation: C1 through C9 of the
//! pattern-discovery pipeline. `pattern-core` owns the data model; this
//! crate owns the algorithms that run over it.

pub mod backtester;
pub mod counters;
pub mod driver;
pub mod ingest;
pub mod matrix;
pub mod permutation;
pub mod processor;
pub mod returns;
pub mod stepping;
pub mod survival;

pub use backtester::backtest;
pub use counters::RunCounters;
pub use driver::{run as run_forward_stepwise, DriverOutput};
pub use ingest::BarIngest;
pub use matrix::FactMatrix;
pub use permutation::{validate as validate_permutation, ValidatedSurvivor, DEFAULT_ALPHA};
pub use processor::BacktestProcessor;
pub use returns::BaseReturns;
pub use stepping::SteppingPolicy;
