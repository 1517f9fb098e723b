//! Persisted run artifacts (spec.md §6): per target/stop/timeframe, two
//! selected-survivor files (one per side) are written, followed by a merged
//! validated file once the permutation validator (C9) has run. OOS
//! counterparts mirror the naming with `OutOfSample` in place of `InSample`.

use std::path::{Path, PathBuf};

use pattern_core::Side;

use crate::args::SampleArg;

fn sample_label(sample: SampleArg) -> &'static str {
    match sample {
        SampleArg::InSample => "IS",
        SampleArg::OutOfSample => "OOS",
        SampleArg::Both => "ISOOS",
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Long => "Long",
        Side::Short => "Short",
    }
}

/// `<SYM>_<SEARCH>_<TF>_Selected<IS|OOS>Long|Short.txt` (spec.md §6).
pub fn selected_path(
    out_dir: &Path,
    symbol: &str,
    search_label: &str,
    timeframe: &str,
    sample: SampleArg,
    side: Side,
) -> PathBuf {
    out_dir.join(format!(
        "{symbol}_{search_label}_{timeframe}_Selected{}{}.txt",
        sample_label(sample),
        side_label(side),
    ))
}

/// `<SYM>_<SEARCH>_<TF>_InSampleValidated.txt` / `…OutOfSampleValidated.txt`
/// (spec.md §6), produced after merging both sides and running C9.
pub fn validated_path(
    out_dir: &Path,
    symbol: &str,
    search_label: &str,
    timeframe: &str,
    sample: SampleArg,
) -> PathBuf {
    let phase = match sample {
        SampleArg::InSample => "InSample",
        SampleArg::OutOfSample => "OutOfSample",
        SampleArg::Both => "InSampleOutOfSample",
    };
    out_dir.join(format!("{symbol}_{search_label}_{timeframe}_{phase}Validated.txt"))
}
