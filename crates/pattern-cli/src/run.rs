//! Run orchestration: wires CLI args to the C1-C9 pipeline and writes
//! persisted artifacts (spec.md §6).

use std::path::Path;

use pattern_core::{render::render_survivor_block, FactSet, PatternError, PatternResult, Side};
use pattern_search::{backtest, run_forward_stepwise, validate_permutation, BaseReturns, FactMatrix};
use tracing::{info, warn};

use crate::args::{Args, RunMode};
use crate::artifacts;
use crate::config_io::{MctpConfigFile, SearchConfigFile};
use crate::ingest_csv;

pub struct RunSummary {
    pub selected_files: Vec<std::path::PathBuf>,
    pub validated_files: Vec<std::path::PathBuf>,
}

pub fn execute(args: &Args, out_dir: &Path) -> PatternResult<RunSummary> {
    args.validate_data_source()?;
    let search_type = args.search_type()?;
    let mode = args.mode()?;

    if let RunMode::Discover { threads } = mode {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| PatternError::Config(format!("failed to configure {threads} worker threads: {e}")))?;
        }
    }

    let mcpt = MctpConfigFile::load(&args.mcpt_config)?;
    let search_file = SearchConfigFile::load(&args.search_config)?;
    let risk = mcpt.risk_parameters()?;

    let local = args
        .local
        .as_ref()
        .expect("validate_data_source guarantees --local is present");
    let daily_path = &local[0];
    if local.len() > 1 {
        warn!(
            hourly = %local[1].display(),
            "hourly bar file accepted for CLI-shape parity but unused by this run (daily-only discovery)"
        );
    }
    let bars = ingest_csv::load_csv(daily_path)?;
    info!(symbol = %mcpt.symbol, bars = bars.len(), "bars loaded");

    if bars.is_empty() {
        warn!("no bars loaded; producing zero survivors (spec.md §8 boundary case)");
        return Ok(RunSummary {
            selected_files: Vec::new(),
            validated_files: Vec::new(),
        });
    }

    if let RunMode::Validate { run_id } = &mode {
        return run_validate_only(args, run_id, out_dir, &bars, &mcpt, &search_file, &risk, search_type);
    }

    run_discover(args, out_dir, &bars, &mcpt, &search_file, &risk, search_type)
}

#[allow(clippy::too_many_arguments)]
fn run_discover(
    args: &Args,
    out_dir: &Path,
    bars: &[pattern_core::Bar],
    mcpt: &MctpConfigFile,
    search_file: &SearchConfigFile,
    risk: &pattern_core::RiskParameters,
    search_type: pattern_core::SearchType,
) -> PatternResult<RunSummary> {
    let mut summary = RunSummary {
        selected_files: Vec::new(),
        validated_files: Vec::new(),
    };

    let sample_range = search_file.sample_range(bars.len(), args.sample);
    let mut validated_blocks = String::new();

    for side in args.side.sides() {
        let cfg = search_file.build(search_type, side, sample_range.clone())?;
        let matrix = FactMatrix::build(bars, search_file.lookback, search_type);
        if let Err(e) = matrix.validate_non_empty() {
            warn!(?side, %e, "run produces zero survivors for this side");
        }
        let base = BaseReturns::build(bars, side, risk, &cfg.sample_range);

        let output = run_forward_stepwise(&matrix, &base, risk, &cfg);
        info!(
            ?side,
            survivors = output.survivors.len(),
            counters = %output.counters,
            "forward-stepwise search complete"
        );

        let index_date = bars[sample_range_end(&cfg.sample_range, bars.len())].t.date_naive();
        let selected_text = render_selected(
            &output.survivors,
            &matrix,
            &base,
            &cfg,
            risk,
            &mcpt.symbol,
            side,
            index_date,
        );
        let selected_path = artifacts::selected_path(
            out_dir,
            &mcpt.symbol,
            search_type.label(),
            "Daily",
            args.sample,
            side,
        );
        std::fs::write(&selected_path, &selected_text)
            .map_err(|e| PatternError::Config(format!("writing {}: {e}", selected_path.display())))?;
        summary.selected_files.push(selected_path);

        let validated = validate_permutation(
            &output.survivors,
            bars,
            &cfg,
            risk,
            search_file.lookback,
            mcpt.seed,
            mcpt.alpha,
        );
        info!(?side, validated = validated.len(), "permutation validation complete");
        for v in &validated {
            let stats = backtest(&matrix, &base, &v.factset, cfg.backtest_method, cfg.min_trades);
            validated_blocks.push_str(&render_survivor_block(
                matrix.facts(),
                &v.factset,
                &stats,
                &mcpt.symbol,
                0,
                index_date,
                side,
                risk,
            ));
        }
    }

    if !validated_blocks.is_empty() {
        let validated_path = artifacts::validated_path(
            out_dir,
            &mcpt.symbol,
            search_type.label(),
            "Daily",
            args.sample,
        );
        std::fs::write(&validated_path, &validated_blocks)
            .map_err(|e| PatternError::Config(format!("writing {}: {e}", validated_path.display())))?;
        summary.validated_files.push(validated_path);
    }

    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn run_validate_only(
    args: &Args,
    run_id: &str,
    out_dir: &Path,
    bars: &[pattern_core::Bar],
    mcpt: &MctpConfigFile,
    search_file: &SearchConfigFile,
    risk: &pattern_core::RiskParameters,
    search_type: pattern_core::SearchType,
) -> PatternResult<RunSummary> {
    let mut summary = RunSummary {
        selected_files: Vec::new(),
        validated_files: Vec::new(),
    };
    let sample_range = search_file.sample_range(bars.len(), args.sample);
    let mut validated_blocks = String::new();

    for side in args.side.sides() {
        let cfg = search_file.build(search_type, side, sample_range.clone())?;
        let matrix = FactMatrix::build(bars, search_file.lookback, search_type);
        let base = BaseReturns::build(bars, side, risk, &cfg.sample_range);

        let selected_path = artifacts::selected_path(
            out_dir,
            &format!("{}_{run_id}", mcpt.symbol),
            search_type.label(),
            "Daily",
            args.sample,
            side,
        );
        let text = std::fs::read_to_string(&selected_path).map_err(|e| {
            PatternError::Config(format!(
                "validate mode: reading prior run artifact {}: {e}",
                selected_path.display()
            ))
        })?;

        let mut survivors: Vec<FactSet> = Vec::new();
        for line in text.lines() {
            if line.starts_with("IF ") {
                survivors.push(pattern_core::render::parse_if_line(line, matrix.facts())?);
            }
        }

        let validated = validate_permutation(
            &survivors,
            bars,
            &cfg,
            risk,
            search_file.lookback,
            mcpt.seed,
            mcpt.alpha,
        );
        let index_date = bars[sample_range_end(&cfg.sample_range, bars.len())].t.date_naive();
        for v in &validated {
            let stats = backtest(&matrix, &base, &v.factset, cfg.backtest_method, cfg.min_trades);
            validated_blocks.push_str(&render_survivor_block(
                matrix.facts(),
                &v.factset,
                &stats,
                &mcpt.symbol,
                0,
                index_date,
                side,
                risk,
            ));
        }
    }

    if !validated_blocks.is_empty() {
        let validated_path = artifacts::validated_path(
            out_dir,
            &mcpt.symbol,
            search_type.label(),
            "Daily",
            args.sample,
        );
        std::fs::write(&validated_path, &validated_blocks)
            .map_err(|e| PatternError::Config(format!("writing {}: {e}", validated_path.display())))?;
        summary.validated_files.push(validated_path);
    }

    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn render_selected(
    survivors: &[FactSet],
    matrix: &FactMatrix,
    base: &BaseReturns,
    cfg: &pattern_core::SearchConfig,
    risk: &pattern_core::RiskParameters,
    symbol: &str,
    side: Side,
    index_date: chrono::NaiveDate,
) -> String {
    let mut out = String::new();
    for (i, factset) in survivors.iter().enumerate() {
        let stats = backtest(matrix, base, factset, cfg.backtest_method, cfg.min_trades);
        out.push_str(&render_survivor_block(
            matrix.facts(),
            factset,
            &stats,
            symbol,
            i as u32,
            index_date,
            side,
            risk,
        ));
    }
    out
}

fn sample_range_end(range: &pattern_core::SampleRange, n: usize) -> usize {
    let end = match *range {
        pattern_core::SampleRange::InSample { end, .. } => end,
        pattern_core::SampleRange::OutOfSample { end, .. } => end,
        pattern_core::SampleRange::Both { oos_end, .. } => oos_end,
    };
    end.saturating_sub(1).min(n.saturating_sub(1))
}
