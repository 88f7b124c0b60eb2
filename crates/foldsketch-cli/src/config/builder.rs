use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileStepSizeConfig};
use super::models::AppConfig;
use crate::cli::DrawArgs;
use crate::error::{CliError, Result};
use foldsketch::core::forcefield::params::ForcefieldParams;
use foldsketch::engine::config::{LayoutConfigBuilder, StepControl};
use foldsketch::workflows::draw::AnnotationFormat;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub fn build_config(args: &DrawArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let annealing_file = file_config.annealing.take().unwrap_or_default();
    let schedule_file = file_config.schedule.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();
    let forcefield_file = file_config.forcefield.take().unwrap_or_default();

    let initial_temperature = args
        .temperature
        .or(annealing_file.initial_temperature)
        .unwrap_or(defaults.initial_temperature);
    let num_steps = args
        .nsteps
        .or(annealing_file.num_steps)
        .unwrap_or(defaults.num_steps);
    let snapshot_count = args
        .draw_interm
        .or(output_file.snapshots)
        .unwrap_or(defaults.snapshot_count);

    let use_tertiary_contacts = if args.no_tertiary_contacts {
        false
    } else {
        schedule_file
            .tertiary_contacts
            .unwrap_or(defaults.use_tertiary_contacts)
    };
    let label_with_ids = if args.output_ids {
        true
    } else {
        output_file.residue_ids.unwrap_or(defaults.label_with_ids)
    };

    let forcefield = match args.forcefield.as_deref().or(forcefield_file.path.as_deref()) {
        Some(path) => load_forcefield(path)?,
        None => ForcefieldParams::default(),
    };

    let core_config = LayoutConfigBuilder::new()
        .initial_temperature(initial_temperature)
        .num_steps(num_steps)
        .force_threshold(
            annealing_file
                .force_threshold
                .unwrap_or(defaults.force_threshold),
        )
        .cooling_factor(
            annealing_file
                .cooling_factor
                .unwrap_or(defaults.cooling_factor),
        )
        .log_points(annealing_file.log_points.unwrap_or(defaults.log_points))
        .step_control(merge_step_size(annealing_file.step_size))
        .wait_period(schedule_file.wait_period.unwrap_or(defaults.wait_period))
        .snapshot_count(snapshot_count)
        .use_tertiary_contacts(use_tertiary_contacts)
        .label_with_ids(label_with_ids)
        .forcefield(forcefield)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let name = args
        .name
        .clone()
        .or(output_file.name)
        .unwrap_or_else(|| defaults.output_name.to_string());

    Ok(AppConfig {
        sequence: args.sequence.clone(),
        first_id: args.first_id,
        missing: args.missing.clone(),
        annotation_paths: args.annotations.clone(),
        annotation_format: if args.dotbracket {
            AnnotationFormat::DotBracket
        } else {
            AnnotationFormat::Pairing
        },
        output_prefix: format!("{}.DRAW", name),
        trace_path: args.trace.clone(),
        seed: args.seed,
        core_config,
    })
}

fn load_forcefield(path: &Path) -> Result<ForcefieldParams> {
    debug!("Loading forcefield parameters from {:?}", path);
    ForcefieldParams::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn merge_step_size(file_val: Option<FileStepSizeConfig>) -> StepControl {
    let defaults = StepControl::default();
    let Some(file_val) = file_val else {
        return defaults;
    };
    StepControl {
        initial: file_val.initial.unwrap_or(defaults.initial),
        max: file_val.max.unwrap_or(defaults.max),
        growth: file_val.growth.unwrap_or(defaults.growth),
        shrink: file_val.shrink.unwrap_or(defaults.shrink),
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            kind, key, value_str
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "annealing.initial-temperature" => {
                config.annealing.get_or_insert_with(Default::default).initial_temperature =
                    Some(parse_value(key, value_str, "float")?);
            }
            "annealing.num-steps" => {
                config.annealing.get_or_insert_with(Default::default).num_steps =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "annealing.force-threshold" => {
                config.annealing.get_or_insert_with(Default::default).force_threshold =
                    Some(parse_value(key, value_str, "float")?);
            }
            "annealing.cooling-factor" => {
                config.annealing.get_or_insert_with(Default::default).cooling_factor =
                    Some(parse_value(key, value_str, "float")?);
            }
            "annealing.log-points" => {
                config.annealing.get_or_insert_with(Default::default).log_points =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "annealing.step-size.initial"
            | "annealing.step-size.max"
            | "annealing.step-size.growth"
            | "annealing.step-size.shrink" => {
                let value = Some(parse_value(key, value_str, "float")?);
                let step = config
                    .annealing
                    .get_or_insert_with(Default::default)
                    .step_size
                    .get_or_insert_with(Default::default);
                match key.rsplit('.').next() {
                    Some("initial") => step.initial = value,
                    Some("max") => step.max = value,
                    Some("growth") => step.growth = value,
                    _ => step.shrink = value,
                }
            }
            "schedule.wait-period" => {
                config.schedule.get_or_insert_with(Default::default).wait_period =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "schedule.tertiary-contacts" => {
                config
                    .schedule
                    .get_or_insert_with(Default::default)
                    .tertiary_contacts = Some(parse_value(key, value_str, "boolean")?);
            }
            "output.name" => {
                config.output.get_or_insert_with(Default::default).name =
                    Some(value_str.to_string());
            }
            "output.snapshots" => {
                config.output.get_or_insert_with(Default::default).snapshots =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "output.residue-ids" => {
                config.output.get_or_insert_with(Default::default).residue_ids =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "forcefield.path" => {
                config.forcefield.get_or_insert_with(Default::default).path =
                    Some(value_str.into());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn draw_args(extra: &[&str]) -> DrawArgs {
        let mut argv = vec!["foldsketch", "draw", "-s", "GGGAAACCC", "--ann", "hairpin.out"];
        argv.extend_from_slice(extra);
        let Commands::Draw(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = build_config(&draw_args(&[])).unwrap();
        let core = &config.core_config;
        assert_eq!(core.annealing.initial_temperature, 0.0);
        assert_eq!(core.annealing.num_steps, 1000);
        assert_eq!(core.annealing.force_threshold, 1e-4);
        assert_eq!(core.annealing.log_points, 20);
        assert_eq!(core.annealing.step, StepControl::default());
        assert_eq!(core.wait_period, 20);
        assert_eq!(core.snapshot_count, 0);
        assert!(core.use_tertiary_contacts);
        assert!(!core.label_with_ids);
        assert_eq!(core.forcefield, ForcefieldParams::default());
        assert_eq!(config.output_prefix, "outfile.DRAW");
        assert_eq!(config.annotation_format, AnnotationFormat::Pairing);
        assert_eq!(config.first_id, 1);
        assert!(config.seed.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config_path = write_config_file(
            "file_values.toml",
            r#"
            [annealing]
            initial-temperature = 2.0
            num-steps = 300

            [annealing.step-size]
            initial = 1.0

            [schedule]
            wait-period = 5
            tertiary-contacts = false

            [output]
            name = "tRNA"
            snapshots = 3
            "#,
        );
        let config =
            build_config(&draw_args(&["-c", config_path.to_str().unwrap()])).unwrap();
        let core = &config.core_config;
        assert_eq!(core.annealing.initial_temperature, 2.0);
        assert_eq!(core.annealing.num_steps, 300);
        assert_eq!(core.annealing.step.initial, 1.0);
        assert_eq!(core.annealing.step.max, 2.0);
        assert_eq!(core.wait_period, 5);
        assert!(!core.use_tertiary_contacts);
        assert_eq!(core.snapshot_count, 3);
        assert_eq!(config.output_prefix, "tRNA.DRAW");
    }

    #[test]
    fn set_values_override_file_and_flags_override_both() {
        let config_path = write_config_file(
            "layered.toml",
            r#"
            [annealing]
            initial-temperature = 2.0
            num-steps = 300

            [schedule]
            wait-period = 5
            "#,
        );
        let config = build_config(&draw_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-S",
            "annealing.num-steps=400",
            "-S",
            "schedule.wait-period=7",
            "-S",
            "annealing.step-size.shrink=0.5",
            "--nsteps",
            "50",
            "-T",
            "4.0",
            "--output-ids",
            "-o",
            "run",
        ]))
        .unwrap();
        let core = &config.core_config;
        assert_eq!(core.annealing.num_steps, 50);
        assert_eq!(core.annealing.initial_temperature, 4.0);
        assert_eq!(core.wait_period, 7);
        assert_eq!(core.annealing.step.shrink, 0.5);
        assert!(core.label_with_ids);
        assert_eq!(config.output_prefix, "run.DRAW");
    }

    #[test]
    fn dotbracket_flag_selects_the_format() {
        let config = build_config(&draw_args(&["--dotbracket", "--seed", "9"])).unwrap();
        assert_eq!(config.annotation_format, AnnotationFormat::DotBracket);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn forcefield_flag_loads_parameters() {
        let ff_path = write_config_file("ff.toml", "unit-spacing = 4.0\npair-k = 3.0\n");
        let config =
            build_config(&draw_args(&["--forcefield", ff_path.to_str().unwrap()])).unwrap();
        assert_eq!(config.core_config.forcefield.unit_spacing, 4.0);
        assert_eq!(config.core_config.forcefield.pair_k, 3.0);
        assert_eq!(
            config.core_config.forcefield.bond_k,
            ForcefieldParams::default().bond_k
        );
    }

    #[test]
    fn unreadable_forcefield_reports_its_path() {
        let ff_path = write_config_file("bad_ff.toml", "no-such-parameter = 1.0\n");
        let result = build_config(&draw_args(&["--forcefield", ff_path.to_str().unwrap()]));
        assert!(matches!(result, Err(CliError::FileParsing { path, .. }) if path == ff_path));
    }

    #[test]
    fn malformed_or_unknown_set_values_are_rejected() {
        for bad in ["annealing.num-steps", "annealing.num-steps=ten", "optimization.x=1"] {
            let result = build_config(&draw_args(&["-S", bad]));
            assert!(matches!(result, Err(CliError::Config(_))), "{} accepted", bad);
        }
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let result = build_config(&draw_args(&["-S", "schedule.wait-period=0"]));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("wait_period")),
            other => panic!("expected a config error, got {:?}", other.map(|_| ())),
        }
    }
}
