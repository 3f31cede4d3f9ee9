use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use aki_cli::load::{load_config, load_datasets};
use aki_core::{Analyser, FrameKeys, Probe};
use aki_ingest::DatasetFileNames;
use aki_report::{StageSummary, default_output_path, write_result_csv};

use crate::cli::RunArgs;
use crate::summary::apply_table_style;
use crate::types::RunResult;

pub fn run_probes() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Probe", "Stage column", "Requires"]);
    apply_table_style(&mut table);
    for probe in Probe::defaults(&FrameKeys::default()) {
        let requires = probe
            .required_kinds()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            probe.name().to_string(),
            probe.stage_column().to_string(),
            requires,
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_stages(args: &RunArgs) -> Result<RunResult> {
    let folder = &args.folder;
    let run_span = info_span!("run", folder = %folder.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(column) = &args.stay_column {
        config.stay_column = column.clone();
    }
    if let Some(column) = &args.time_column {
        config.time_column = column.clone();
    }
    let names = DatasetFileNames {
        urineoutput: args.urineoutput_file.clone(),
        creatinine: args.creatinine_file.clone(),
        rrt: args.rrt_file.clone(),
        demographics: args.demographics_file.clone(),
    };

    let input = info_span!("ingest").in_scope(|| load_datasets(folder, &names))?;
    let analyser = Analyser::from_config(input.datasets, &config).context("prepare datasets")?;
    let result = analyser.process_stays().context("stage stays")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(folder));
    write_result_csv(&output, &result)?;
    let summary = StageSummary::from_frame(&result, analyser.keys())?;

    info!(
        stay_count = summary.stay_count(),
        aki_count = summary.aki_count(),
        row_count = summary.row_count,
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunResult {
        folder: folder.clone(),
        output,
        files: input.files,
        summary,
    })
}
