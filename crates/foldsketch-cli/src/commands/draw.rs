use crate::cli::DrawArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use foldsketch::{
    core::{
        forcefield::field::LayoutForcefield, io::trace, models::sequence::Sequence,
        render::svg::SvgRenderer,
    },
    engine::{error::EngineError, progress::ProgressReporter, report::Report, state::ChainResult},
    workflows::{self, draw::DrawContext},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One row of the optional CSV trace.
#[derive(Debug, Serialize)]
struct TraceRow<'a> {
    chain: &'a str,
    step: usize,
    energy: f64,
    max_force: f64,
    temperature: f64,
    step_size: f64,
    max_force_residue: i64,
}

pub fn run(args: DrawArgs) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let config = build_config(&args)?;

    let sequence = Sequence::new(&config.sequence, config.first_id, &config.missing)
        .map_err(EngineError::from)?;
    info!(
        residues = sequence.len(),
        "Loading annotations from {} file(s)",
        config.annotation_paths.len()
    );
    let annotation = workflows::draw::load_annotations(
        &config.annotation_paths,
        &sequence,
        config.annotation_format,
    )?;

    let forcefield = LayoutForcefield::new(config.core_config.forcefield.clone());
    let renderer = SvgRenderer::default();
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let context = DrawContext {
        sequence: &sequence,
        annotation: &annotation,
        config: &config.core_config,
        forcefield: &forcefield,
        renderer: &renderer,
        reporter: &reporter,
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "Drawing {} chain(s) over {} residues...",
        annotation.chains.len(),
        sequence.len()
    );
    let mut report = Report::new();
    let results = workflows::draw::run(&context, &mut rng, &mut report)?;

    write_outputs(&config, &sequence, &report, &results)
}

fn write_outputs(
    config: &AppConfig,
    sequence: &Sequence,
    report: &Report,
    results: &[ChainResult],
) -> Result<()> {
    let report_path = PathBuf::from(format!("{}.out", config.output_prefix));
    let argv: Vec<String> = std::env::args().collect();
    let content = format!("# {} \n{}", argv.join(" "), report.to_text());
    write_file(&report_path, &content)?;
    println!("✓ Report written to: {}", report_path.display());

    let snapshots = workflows::draw::snapshot_files(&config.output_prefix, results);
    for (name, document) in &snapshots {
        info!("Writing snapshot {}", name);
        write_file(Path::new(name), &document.to_string())?;
    }
    for result in results {
        info!(
            chain = %result.label,
            steps = result.steps,
            reason = %result.reason,
            energy = result.final_energy,
            "Chain finished."
        );
    }
    println!("✓ {} snapshot(s) written.", snapshots.len());

    if let Some(trace_path) = &config.trace_path {
        let rows = trace_rows(sequence, results);
        trace::write_trace_to_path(trace_path, &rows).map_err(|e| CliError::FileWriting {
            path: trace_path.clone(),
            source: e.into(),
        })?;
        println!("✓ Trace written to: {}", trace_path.display());
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn trace_rows<'a>(sequence: &Sequence, results: &'a [ChainResult]) -> Vec<TraceRow<'a>> {
    results
        .iter()
        .flat_map(|result| {
            result.records.iter().map(move |record| TraceRow {
                chain: &result.label,
                step: record.step,
                energy: record.energy,
                max_force: record.max_force,
                temperature: record.temperature,
                step_size: record.step_size,
                max_force_residue: sequence
                    .residue_id(record.max_force_index)
                    .unwrap_or(record.max_force_index as i64),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn draw_args(argv: &[&str]) -> DrawArgs {
        let Commands::Draw(args) = Cli::parse_from(argv).command;
        args
    }

    fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(suffix))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn dot_bracket_run_writes_report_snapshots_and_trace() {
        let dir = tempdir().unwrap();
        let annotation = dir.path().join("hairpin.ANNOTATE.dotbracket.out");
        fs::write(&annotation, "# GGGAAACCC\n(((...)))\n").unwrap();
        let name = dir.path().join("hairpin");
        let trace = dir.path().join("trace.csv");

        run(draw_args(&[
            "foldsketch",
            "draw",
            "-s",
            "GGGAAACCC",
            "--ann",
            annotation.to_str().unwrap(),
            "--dotbracket",
            "--nsteps",
            "20",
            "--draw-interm",
            "2",
            "--seed",
            "7",
            "-o",
            name.to_str().unwrap(),
            "--trace",
            trace.to_str().unwrap(),
        ]))
        .unwrap();

        let report = fs::read_to_string(dir.path().join("hairpin.DRAW.out")).unwrap();
        assert!(report.starts_with("# "));
        assert!(report.contains("res(max_F)"));
        assert!(report.contains("steps of minimization"));

        let svgs = files_with_suffix(dir.path(), ".svg");
        assert!(svgs.contains(&"hairpin.DRAW_000.svg".to_string()));
        assert_eq!(
            svgs.iter().filter(|n| n.ends_with("steps.svg")).count(),
            1
        );
        let final_svg = svgs.iter().find(|n| n.ends_with("steps.svg")).unwrap();
        let content = fs::read_to_string(dir.path().join(final_svg)).unwrap();
        assert!(content.contains("<svg"));

        let csv = fs::read_to_string(&trace).unwrap();
        assert!(csv.starts_with(
            "chain,step,energy,max_force,temperature,step_size,max_force_residue"
        ));
        assert!(csv.lines().count() > 1);
    }

    #[test]
    fn missing_annotation_file_fails_with_its_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.out");
        let result = run(draw_args(&[
            "foldsketch",
            "draw",
            "-s",
            "GGGAAACCC",
            "--ann",
            missing.to_str().unwrap(),
            "-o",
            dir.path().join("x").to_str().unwrap(),
        ]));
        match result {
            Err(CliError::Engine(EngineError::Configuration(msg))) => {
                assert!(msg.contains(missing.to_str().unwrap()))
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }
        assert!(files_with_suffix(dir.path(), ".out").is_empty());
    }

    #[test]
    fn empty_sequence_is_rejected_before_reading_annotations() {
        let result = run(draw_args(&[
            "foldsketch", "draw", "-s", "", "--ann", "unused.out",
        ]));
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::Sequence { .. }))
        ));
    }
}
