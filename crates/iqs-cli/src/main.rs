//! Integration quality scale validator CLI
//!
//! The `iqs` command checks `quality_scale.yaml` declarations of the
//! integrations in a Home Assistant checkout.
//!
//! ## Commands
//!
//! - `validate`: Check every (or the selected) integration and report errors
//! - `rules`: List the rule catalog by tier

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iqs_core::{
    load_integrations, telemetry, Config, ExemptionLists, QualityScaleChecker, RuleCatalog, Tier,
    ValidationReport,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "iqs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Integration quality scale validator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines and a JSON report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quality scale declarations
    Validate {
        /// Repository root containing homeassistant/components
        #[arg(long, env = "HASSFEST_ROOT", default_value = ".")]
        root: PathBuf,

        /// Only validate these integrations (domain or path, repeatable)
        #[arg(short, long = "integration")]
        integrations: Vec<String>,

        /// YAML file with extra exemption lists, merged into the built-in ones
        ///
        /// Format: `no_quality_scale: [domain, ...]` and
        /// `without_file: [domain, ...]`. The built-in lists already forbid
        /// entity platforms and core helpers, and grandfather the
        /// integrations that predate the quality scale.
        #[arg(long, env = "IQS_EXEMPTIONS")]
        exemptions: Option<PathBuf>,
    },

    /// List quality scale rules
    Rules {
        /// Only list rules of this tier
        #[arg(short, long)]
        tier: Option<Tier>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    iqs_core::init_tracing(cli.json, telemetry::default_level(cli.verbose));

    match cli.command {
        Commands::Validate {
            root,
            integrations,
            exemptions,
        } => cmd_validate(&root, integrations, exemptions.as_deref(), cli.json),
        Commands::Rules { tier } => cmd_rules(tier, cli.json),
    }
}

fn load_exemptions(path: Option<&Path>) -> Result<ExemptionLists> {
    let builtin = ExemptionLists::builtin();
    match path {
        Some(path) => {
            let extra = ExemptionLists::load(path)
                .with_context(|| format!("Failed to load exemptions from {}", path.display()))?;
            Ok(builtin.merge(extra))
        }
        None => Ok(builtin),
    }
}

fn run_validation(
    root: &Path,
    integrations: Vec<String>,
    exemptions: Option<&Path>,
) -> Result<ValidationReport> {
    let checker = QualityScaleChecker::new(
        RuleCatalog::standard().context("Invalid rule catalog")?,
        load_exemptions(exemptions)?,
    );
    let config = Config::new(root).with_specific_integrations(integrations);

    let mut registry = load_integrations(&config.components_dir(), true, &config)
        .context("Failed to load integrations")?;
    info!(count = registry.len(), root = %root.display(), "Loaded integrations");

    checker.validate(&config, &mut registry);
    Ok(ValidationReport::collect(&registry))
}

fn cmd_validate(
    root: &Path,
    integrations: Vec<String>,
    exemptions: Option<&Path>,
    json: bool,
) -> Result<()> {
    let report = run_validation(root, integrations, exemptions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
        println!(
            "Checked {} integrations: {} with errors ({} errors)",
            report.checked,
            report.integrations.len(),
            report.error_count()
        );
    }

    if report.has_errors() {
        anyhow::bail!("Quality scale validation failed");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RuleListing {
    name: String,
    tier: Tier,
    validated: bool,
}

fn list_rules(catalog: &RuleCatalog, tier: Option<Tier>) -> Vec<RuleListing> {
    let mut rules: Vec<RuleListing> = catalog
        .rules()
        .iter()
        .filter(|rule| tier.map_or(true, |t| rule.tier == t))
        .map(|rule| RuleListing {
            name: rule.name.clone(),
            tier: rule.tier,
            validated: rule.validator.is_some(),
        })
        .collect();
    rules.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.name.cmp(&b.name)));
    rules
}

fn cmd_rules(tier: Option<Tier>, json: bool) -> Result<()> {
    let catalog = RuleCatalog::standard().context("Invalid rule catalog")?;
    let rules = list_rules(&catalog, tier);

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    let mut current = None;
    for rule in &rules {
        if current != Some(rule.tier) {
            println!("{}:", rule.tier);
            current = Some(rule.tier);
        }
        let marker = if rule.validated { " (validated)" } else { "" };
        println!("  {}{}", rule.name, marker);
    }
    Ok(())
}
