//! Command-line entry point for running a plan file end to end.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{Config, PlanContext, PlanFile};

#[derive(Parser, Debug)]
#[command(
    name = "wireplan",
    version,
    about = "Route, size and price the wiring for an annotated floor plan"
)]
pub struct Args {
    /// Plan file (.json) with device symbols and room outlines
    pub plan: PathBuf,

    /// Planner config (.toml or .json); defaults to the user config file
    pub config: Option<PathBuf>,
}

impl Args {
    /// Explicit config file, else the user config, else built-in defaults
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => match Config::default_path() {
                Ok(path) => Config::load_or_default(&path)
                    .with_context(|| format!("Failed to load config {}", path.display())),
                Err(e) => {
                    warn!("{}; using default configuration", e);
                    Ok(Config::default())
                }
            },
        }
    }
}

/// Parse the command line, run the pipeline and print the report as JSON
pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    let plan = PlanFile::load_from_file(&args.plan)?;
    info!(
        "Loaded {} device(s) from {}",
        plan.symbols.len(),
        args.plan.display()
    );

    let (mut context, outlines) = PlanContext::from_plan(plan, config);
    let design = context.run(&outlines)?;

    for warning in &design.bom.warnings {
        warn!(
            "Manual sizing needed: wire {} from device {} ({:.1} A)",
            warning.wire, warning.device, warning.amperage
        );
    }
    info!(
        "Panel {} at {:.2} A, total cost ${:.2}",
        design.network.panel().tier,
        design.network.panel().max_amps,
        design.bom.total
    );

    let report = serde_json::to_string_pretty(&design.report(&context))
        .context("Failed to serialize design report")?;
    println!("{report}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_plan_and_optional_config() {
        let args = Args::try_parse_from(["wireplan", "house.json"]).unwrap();
        assert_eq!(args.plan, PathBuf::from("house.json"));
        assert_eq!(args.config, None);

        let args = Args::try_parse_from(["wireplan", "house.json", "planner.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("planner.toml")));
    }

    #[test]
    fn test_help_and_version_are_not_plan_paths() {
        let err = Args::try_parse_from(["wireplan", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Args::try_parse_from(["wireplan", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_missing_plan_and_extra_arguments_rejected() {
        let err = Args::try_parse_from(["wireplan"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Args::try_parse_from(["wireplan", "a.json", "b.toml", "extra"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        let mut config = Config::default();
        config.planner.cluster_threshold = 7;
        config.save_to_file(&path).unwrap();

        let args = Args {
            plan: PathBuf::from("house.json"),
            config: Some(path),
        };
        assert_eq!(args.load_config().unwrap().planner.cluster_threshold, 7);
    }
}
