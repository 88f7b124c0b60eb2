use crate::core::forcefield::field::ForceField;
use crate::core::forcefield::parameterization::Parameterizer;
use crate::core::io::dotbracket::DotBracketFile;
use crate::core::io::pairing::PairingFile;
use crate::core::io::traits::AnnotationFile;
use crate::core::models::annotation::{AnnotationError, AnnotationSet, ChainAnnotation};
use crate::core::models::sequence::Sequence;
use crate::core::render::{RenderInput, Renderer};
use crate::engine::annealing::AnnealingDriver;
use crate::engine::config::LayoutConfig;
use crate::engine::error::EngineError;
use crate::engine::geometry::{InitialGeometry, initial_positions, layout_dimensions};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{self, ReportSink};
use crate::engine::schedule::ConstraintScheduler;
use crate::engine::state::{ChainResult, LayoutState, Snapshot, SnapshotKind};
use nalgebra::Point2;
use rand::Rng;
use std::path::Path;
use svg::Document;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationFormat {
    /// A single dot-bracket file.
    DotBracket,
    /// One or more pairing/stacking files, merged.
    Pairing,
}

/// Reads and merges the annotation files of a run.
///
/// In dot-bracket mode only the first file is used. Pairing files must agree on frame count
/// and chain set.
#[instrument(skip_all, fields(files = paths.len(), format = ?format))]
pub fn load_annotations<P: AsRef<Path>>(
    paths: &[P],
    sequence: &Sequence,
    format: AnnotationFormat,
) -> Result<AnnotationSet, EngineError> {
    let Some(first) = paths.first() else {
        return Err(EngineError::Configuration(
            "no annotation file given".to_string(),
        ));
    };

    let set = match format {
        AnnotationFormat::DotBracket => {
            for ignored in &paths[1..] {
                warn!(
                    path = %ignored.as_ref().display(),
                    "Only the first dot-bracket file is read; ignoring."
                );
            }
            read_one::<DotBracketFile>(first.as_ref(), sequence)?
        }
        AnnotationFormat::Pairing => {
            let mut merged: Option<AnnotationSet> = None;
            for path in paths {
                let set = read_one::<PairingFile>(path.as_ref(), sequence)?;
                match merged.as_mut() {
                    None => merged = Some(set),
                    Some(m) => m
                        .merge(set)
                        .map_err(|source| EngineError::Consistency { source })?,
                }
            }
            merged.ok_or_else(|| EngineError::Configuration("no annotation parsed".to_string()))?
        }
    };

    if set.chains.is_empty() {
        return Err(EngineError::Configuration(
            "no chains found in the annotation".to_string(),
        ));
    }
    info!(
        chains = set.chains.len(),
        frames = set.n_frames,
        "Loaded annotation."
    );
    Ok(set)
}

fn read_one<F: AnnotationFile>(
    path: &Path,
    sequence: &Sequence,
) -> Result<AnnotationSet, EngineError> {
    F::read_from_path(path, sequence).map_err(|source| match source {
        AnnotationError::Empty => EngineError::Configuration(format!(
            "no annotation found in '{}'",
            path.display()
        )),
        AnnotationError::Io(err) => EngineError::Configuration(format!(
            "cannot read annotation file '{}': {}",
            path.display(),
            err
        )),
        source => EngineError::Annotation {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Inputs and collaborators shared by every chain of a run.
pub struct DrawContext<'a> {
    pub sequence: &'a Sequence,
    pub annotation: &'a AnnotationSet,
    pub config: &'a LayoutConfig,
    pub forcefield: &'a dyn ForceField,
    pub renderer: &'a dyn Renderer,
    pub reporter: &'a ProgressReporter<'a>,
}

/// Lays out every chain in input order, writing the text report to `sink`.
#[instrument(skip_all, name = "draw_workflow", fields(n = context.sequence.len()))]
pub fn run<R: Rng + ?Sized>(
    context: &DrawContext,
    rng: &mut R,
    sink: &mut dyn ReportSink,
) -> Result<Vec<ChainResult>, EngineError> {
    let chains = &context.annotation.chains;
    if chains.is_empty() {
        return Err(EngineError::Configuration(
            "no annotation parsed".to_string(),
        ));
    }

    let multi_chain = chains.len() > 1;
    let mut results = Vec::with_capacity(chains.len());
    for (index, chain) in chains.iter().enumerate() {
        context.reporter.report(Progress::ChainStart {
            index,
            total: chains.len(),
        });
        if multi_chain {
            sink.write_line(report::CHAIN_SEPARATOR.to_string());
            sink.write_line(format!("Chain {}", index));
        }
        results.push(layout_chain(context, chain, &mut *rng, sink));
        context.reporter.report(Progress::ChainFinish);
    }

    info!(chains = results.len(), "Draw workflow complete.");
    Ok(results)
}

#[instrument(skip_all, fields(chain = %chain.label))]
fn layout_chain<R: Rng + ?Sized>(
    context: &DrawContext,
    chain: &ChainAnnotation,
    rng: &mut R,
    sink: &mut dyn ReportSink,
) -> ChainResult {
    let config = context.config;
    let sequence = context.sequence;
    let n = sequence.len();
    let unit = config.forcefield.unit_spacing;
    let dimensions = layout_dimensions(n, unit);

    let derived = Parameterizer::new(config.use_tertiary_contacts).derive(chain, n);
    let geometry = InitialGeometry::select(&derived.schedule, n);
    let mode = geometry.activation_mode();
    info!(
        geometry = ?geometry,
        mode = ?mode,
        scheduled = derived.schedule.len(),
        "Starting chain layout."
    );

    let mut scheduler = ConstraintScheduler::new(
        &derived.base,
        &derived.schedule,
        &derived.angles,
        mode,
        config.wait_period,
    );
    let state = LayoutState::new(
        initial_positions(geometry, n, unit),
        config.annealing.initial_temperature,
        config.annealing.step.initial,
    );

    let draw = |positions: &[Point2<f64>]| -> Document {
        context.renderer.draw(&RenderInput {
            positions,
            annotation: chain,
            sequence,
            dimensions,
            use_residue_ids: config.label_with_ids,
        })
    };

    sink.write_line(report::column_header());
    context.reporter.report(Progress::TaskStart {
        total_steps: config.annealing.num_steps as u64 + 1,
    });
    let mut snapshots = Vec::new();
    let outcome = AnnealingDriver::new(context.forcefield, &config.annealing)
        .with_snapshot_interval(config.snapshot_interval())
        .run(state, &mut scheduler, rng, context.reporter, |step, positions| {
            snapshots.push(Snapshot {
                step,
                kind: SnapshotKind::Intermediate,
                document: draw(positions),
            });
        });
    context.reporter.report(Progress::TaskFinish);

    for event in scheduler.events() {
        debug!(%event, "Activation.");
    }

    let steps = outcome.final_record.step;
    for record in &outcome.records {
        sink.write_line(report::record_line(
            record,
            &residue_label(sequence, record.max_force_index),
        ));
    }
    sink.write_line(report::convergence_line(outcome.reason, steps));
    sink.write_line(report::record_line(
        &outcome.final_record,
        &residue_label(sequence, outcome.final_record.max_force_index),
    ));
    sink.write_line(report::summary_line(steps));

    snapshots.push(Snapshot {
        step: steps,
        kind: SnapshotKind::Final,
        document: draw(&outcome.state.positions),
    });

    ChainResult {
        label: chain.label.clone(),
        geometry,
        activations: scheduler.events().to_vec(),
        positions: outcome.state.positions,
        reason: outcome.reason,
        records: outcome.records,
        snapshots,
        final_energy: outcome.final_record.energy,
        final_max_force: outcome.final_record.max_force,
        steps,
    }
}

fn residue_label(sequence: &Sequence, index: usize) -> String {
    sequence
        .residue_id(index)
        .map(|id| id.to_string())
        .unwrap_or_else(|| index.to_string())
}

/// File name of a snapshot. `chain` is only given when the run has more than one chain.
pub fn snapshot_file_name(prefix: &str, chain: Option<usize>, snapshot: &Snapshot) -> String {
    match (chain, snapshot.kind) {
        (None, SnapshotKind::Intermediate) => format!("{}_{:03}.svg", prefix, snapshot.step),
        (None, SnapshotKind::Final) => format!("{}_{}steps.svg", prefix, snapshot.step),
        (Some(c), SnapshotKind::Intermediate) => {
            format!("{}_{}_{:03}.svg", prefix, c, snapshot.step)
        }
        (Some(c), SnapshotKind::Final) => format!("{}_{}_{}steps.svg", prefix, c, snapshot.step),
    }
}

/// Every snapshot of a run paired with its file name, chains in order.
pub fn snapshot_files<'a>(prefix: &str, results: &'a [ChainResult]) -> Vec<(String, &'a Document)> {
    let multi_chain = results.len() > 1;
    results
        .iter()
        .enumerate()
        .flat_map(|(c, result)| {
            let chain = multi_chain.then_some(c);
            result
                .snapshots
                .iter()
                .map(move |s| (snapshot_file_name(prefix, chain, s), &s.document))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::field::LayoutForcefield;
    use crate::core::forcefield::term::PotentialTerm;
    use crate::core::models::annotation::PairClass;
    use crate::core::render::svg::SvgRenderer;
    use crate::engine::config::LayoutConfigBuilder;
    use crate::engine::report::Report;
    use crate::engine::schedule::ActivationKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn dot_bracket(sequence: &Sequence, structure: &str) -> AnnotationSet {
        let mut reader = Cursor::new(format!("# {}\n{}\n", sequence.as_string(), structure));
        DotBracketFile::read_from(&mut reader, sequence).unwrap()
    }

    fn config(temperature: f64, steps: usize, snapshots: usize) -> LayoutConfig {
        LayoutConfigBuilder::new()
            .initial_temperature(temperature)
            .num_steps(steps)
            .snapshot_count(snapshots)
            .build()
            .unwrap()
    }

    fn draw(
        sequence: &Sequence,
        annotation: &AnnotationSet,
        config: &LayoutConfig,
    ) -> (Vec<ChainResult>, Report) {
        let forcefield = LayoutForcefield::new(config.forcefield.clone());
        let renderer = SvgRenderer::default();
        let reporter = ProgressReporter::new();
        let context = DrawContext {
            sequence,
            annotation,
            config,
            forcefield: &forcefield,
            renderer: &renderer,
            reporter: &reporter,
        };
        let mut report = Report::new();
        let results = run(&context, &mut StdRng::seed_from_u64(42), &mut report).unwrap();
        (results, report)
    }

    #[test]
    fn hairpin_closing_the_chain_starts_on_a_circle_with_everything_active() {
        let sequence = Sequence::new("GGGAAACCC", 1, &[]).unwrap();
        let annotation = dot_bracket(&sequence, "(((...)))");
        let (results, report) = draw(&sequence, &annotation, &config(0.0, 100, 0));

        assert_eq!(results.len(), 1);
        let chain = &results[0];
        assert_eq!(chain.geometry, InitialGeometry::Circle);
        assert!(chain.activations.iter().all(|e| e.step == 0));
        let kinds: Vec<ActivationKind> = chain.activations.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivationKind::Term(PotentialTerm::pair(2, 6, PairClass::Canonical)),
                ActivationKind::Term(PotentialTerm::pair(1, 7, PairClass::Canonical)),
                ActivationKind::Term(PotentialTerm::pair(0, 8, PairClass::Canonical)),
                ActivationKind::Angles { count: 8 },
            ]
        );
        assert_eq!(chain.positions.len(), 9);
        assert!(chain.steps <= 100);
        assert!(!report.lines().iter().any(|l| l.starts_with("Chain")));
        assert_eq!(report.lines()[0], report::column_header());
        assert!(report.lines().last().unwrap().ends_with("steps of minimization"));
    }

    #[test]
    fn interior_helix_folds_from_a_line_one_contact_at_a_time() {
        let sequence = Sequence::new("AAGGAAACCAA", 1, &[]).unwrap();
        let annotation = dot_bracket(&sequence, "..((...))..");
        let (results, _) = draw(&sequence, &annotation, &config(0.0, 100, 0));

        let chain = &results[0];
        assert_eq!(chain.geometry, InitialGeometry::Line);
        let terms: Vec<(usize, ActivationKind)> =
            chain.activations.iter().map(|e| (e.step, e.kind)).collect();
        assert!(terms.len() >= 2);
        assert_eq!(terms[0].0, 0);
        assert!(terms[1].0 >= 20);
        assert!(matches!(terms[0].1, ActivationKind::Term(_)));
    }

    #[test]
    fn two_chains_give_two_final_snapshots_and_one_report() {
        let sequence = Sequence::new("GGAACCGGAACC", 1, &[]).unwrap();
        let annotation = dot_bracket(&sequence, "((..))&((..))");
        let (results, report) = draw(&sequence, &annotation, &config(0.0, 40, 0));

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.final_snapshot().is_some()));
        assert!(results.iter().all(|r| r.positions.len() == 12));

        let lines = report.lines();
        let headers: Vec<&String> = lines.iter().filter(|l| l.starts_with("Chain ")).collect();
        assert_eq!(headers, vec!["Chain 0", "Chain 1"]);
        assert_eq!(lines[0], report::CHAIN_SEPARATOR);

        let names: Vec<String> = snapshot_files("run.DRAW", &results)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("run.DRAW_0_"));
        assert!(names[1].starts_with("run.DRAW_1_"));
        assert!(names.iter().all(|n| n.ends_with("steps.svg")));
    }

    #[test]
    fn intermediate_snapshots_are_numbered_by_step() {
        let sequence = Sequence::new("AAGGAAACCAA", 1, &[]).unwrap();
        let annotation = dot_bracket(&sequence, "..((...))..");
        let (results, _) = draw(&sequence, &annotation, &config(0.0, 40, 4));

        let names: Vec<String> = snapshot_files("x", &results)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names[0], "x_000.svg");
        assert!(names.contains(&"x_010.svg".to_string()));
        assert!(names.last().unwrap().ends_with("steps.svg"));
    }

    #[test]
    fn snapshot_file_names_follow_chain_and_step() {
        let snapshot = |step, kind| Snapshot {
            step,
            kind,
            document: Document::new(),
        };
        assert_eq!(
            snapshot_file_name("a.DRAW", None, &snapshot(5, SnapshotKind::Intermediate)),
            "a.DRAW_005.svg"
        );
        assert_eq!(
            snapshot_file_name("a.DRAW", None, &snapshot(120, SnapshotKind::Final)),
            "a.DRAW_120steps.svg"
        );
        assert_eq!(
            snapshot_file_name("a.DRAW", Some(1), &snapshot(40, SnapshotKind::Intermediate)),
            "a.DRAW_1_040.svg"
        );
        assert_eq!(
            snapshot_file_name("a.DRAW", Some(0), &snapshot(7, SnapshotKind::Final)),
            "a.DRAW_0_7steps.svg"
        );
    }

    #[test]
    fn pairing_files_are_merged_and_must_agree() {
        let sequence = Sequence::new("GGGAAACCC", 1, &[]).unwrap();
        let mut pairs = NamedTempFile::new().unwrap();
        writeln!(pairs, "# sequence GGGAAACCC").unwrap();
        writeln!(pairs, "G_1_0 C_9_0 WCc").unwrap();
        let mut stacks = NamedTempFile::new().unwrap();
        writeln!(stacks, "G_1_0 G_2_0 >>").unwrap();
        let mut other_chain = NamedTempFile::new().unwrap();
        writeln!(other_chain, "G_1_B C_9_B WCc").unwrap();

        let set = load_annotations(
            &[pairs.path(), stacks.path()],
            &sequence,
            AnnotationFormat::Pairing,
        )
        .unwrap();
        assert_eq!(set.chains.len(), 1);
        assert_eq!(set.chains[0].interactions().len(), 2);

        let err = load_annotations(
            &[pairs.path(), other_chain.path()],
            &sequence,
            AnnotationFormat::Pairing,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Consistency { .. }));
    }

    #[test]
    fn missing_or_empty_annotations_are_configuration_errors() {
        let sequence = Sequence::new("GGGAAACCC", 1, &[]).unwrap();
        let none: [&Path; 0] = [];
        assert!(matches!(
            load_annotations(&none, &sequence, AnnotationFormat::Pairing),
            Err(EngineError::Configuration(_))
        ));

        let empty = NamedTempFile::new().unwrap();
        assert!(matches!(
            load_annotations(&[empty.path()], &sequence, AnnotationFormat::DotBracket),
            Err(EngineError::Configuration(_))
        ));

        match load_annotations(
            &[Path::new("/nonexistent/ann.out")],
            &sequence,
            AnnotationFormat::Pairing,
        ) {
            Err(EngineError::Configuration(msg)) => assert!(msg.contains("/nonexistent/ann.out")),
            other => panic!("expected a configuration error, got {:?}", other),
        }

        let mut short = NamedTempFile::new().unwrap();
        writeln!(short, "((..))").unwrap();
        assert!(matches!(
            load_annotations(&[short.path()], &sequence, AnnotationFormat::DotBracket),
            Err(EngineError::Annotation { .. })
        ));
    }

    #[test]
    fn dot_bracket_mode_reads_only_the_first_file() {
        let sequence = Sequence::new("GGGAAACCC", 1, &[]).unwrap();
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "(((...)))").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "not a structure").unwrap();

        let set = load_annotations(
            &[first.path(), second.path()],
            &sequence,
            AnnotationFormat::DotBracket,
        )
        .unwrap();
        assert_eq!(set.chains[0].pairs().len(), 3);
    }
}
