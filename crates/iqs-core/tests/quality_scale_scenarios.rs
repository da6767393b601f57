//! End-to-end checks over on-disk integration trees with the standard catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use iqs_core::{
    load_integrations, Config, ExemptionLists, Integration, QualityScaleChecker, RuleCatalog,
    Tier, ValidationReport, CATEGORY, DECLARATION_FILE,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

struct Repo {
    dir: TempDir,
}

impl Repo {
    fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("homeassistant/components")).expect("mkdir");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn integration(&self, domain: &str, manifest: Value) -> PathBuf {
        let path = self.root().join("homeassistant/components").join(domain);
        fs::create_dir_all(&path).expect("mkdir");
        let mut manifest = manifest;
        manifest["domain"] = json!(domain);
        fs::write(path.join("manifest.json"), manifest.to_string()).expect("write manifest");
        path
    }

    fn file(&self, domain: &str, name: &str, body: &str) {
        let path = self.root().join("homeassistant/components").join(domain);
        fs::write(path.join(name), body).expect("write");
    }

    fn run(&self, checker: &QualityScaleChecker) -> BTreeMap<String, Integration> {
        let config = Config::new(self.root());
        let mut integrations =
            load_integrations(&config.components_dir(), true, &config).expect("load");
        checker.validate(&config, &mut integrations);
        integrations
    }
}

fn checker_with(exemptions: ExemptionLists) -> QualityScaleChecker {
    QualityScaleChecker::new(RuleCatalog::standard().expect("catalog"), exemptions)
}

fn errors(integrations: &BTreeMap<String, Integration>, domain: &str) -> Vec<String> {
    integrations[domain]
        .errors_in(CATEGORY)
        .map(str::to_string)
        .collect()
}

/// Every rule of `tiers` as a declaration document with all rules done.
fn all_done(tiers: &[Tier]) -> String {
    let catalog = RuleCatalog::standard().expect("catalog");
    let mut doc = String::from("rules:\n");
    for tier in tiers {
        for rule in catalog.required_rules(*tier) {
            doc.push_str(&format!("  {rule}:\n    status: exempt\n    comment: test fixture\n"));
        }
    }
    doc
}

#[test]
fn missing_file_for_new_integration() {
    let repo = Repo::new();
    repo.integration("shiny_new", json!({}));

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    let errs = errors(&result, "shiny_new");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].starts_with("Quality scale definition not found"));
    assert!(errs[0].ends_with("Bronze tier."));
}

#[test]
fn forbidden_domain_with_file() {
    let repo = Repo::new();
    repo.integration("sensor", json!({ "integration_type": "entity" }));
    repo.file("sensor", DECLARATION_FILE, "rules: {}\n");

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert_eq!(
        errors(&result, "sensor"),
        vec!["This integration is not supposed to have a quality scale file.".to_string()]
    );
}

#[test]
fn shipped_grandfathered_integrations_with_and_without_file() {
    let repo = Repo::new();
    repo.integration("abode", json!({}));
    repo.integration("accuweather", json!({}));
    repo.file("accuweather", DECLARATION_FILE, "rules: {}\n");

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert!(errors(&result, "abode").is_empty());
    let errs = errors(&result, "accuweather");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].starts_with("Quality scale file found!"));
}

#[test]
fn grandfathered_integration_declaring_tier_without_file() {
    let repo = Repo::new();
    repo.integration("abode", json!({ "quality_scale": "silver" }));

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    let errs = errors(&result, "abode");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("must have a quality scale definition"));
}

#[test]
fn virtual_integration_without_file_is_fine() {
    let repo = Repo::new();
    repo.integration("some_brand", json!({ "integration_type": "virtual" }));

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert!(result["some_brand"].errors().is_empty());
}

#[test]
fn gold_with_only_bronze_met() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({ "quality_scale": "gold" }));
    repo.file("acme_cloud", DECLARATION_FILE, &all_done(&[Tier::Bronze]));

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    let errs = errors(&result, "acme_cloud");
    assert_eq!(errs.len(), 2, "{errs:#?}");
    assert!(errs[0].starts_with("Quality scale tier silver requires"));
    assert!(errs[0].contains("\n  action-exceptions: todo"));
    assert!(errs[1].starts_with("Quality scale tier gold requires"));
    assert!(errs[1].contains("\n  devices: todo"));
    assert!(!errs.iter().any(|e| e.contains("tier bronze") || e.contains("tier platinum")));
}

#[test]
fn platinum_fully_met_is_clean() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({ "quality_scale": "platinum" }));
    repo.file(
        "acme_cloud",
        DECLARATION_FILE,
        &all_done(&[Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Platinum]),
    );

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert!(result["acme_cloud"].errors().is_empty(), "{:?}", result["acme_cloud"].errors());
}

#[test]
fn unknown_rule_name_is_named_in_schema_error() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({}));
    repo.file("acme_cloud", DECLARATION_FILE, "rules:\n  made-up-rule: done\n");

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    let errs = errors(&result, "acme_cloud");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("made-up-rule"));
    assert!(errs[0].contains("extra keys not allowed"));
}

#[test]
fn done_rule_failing_its_validator() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({ "config_flow": false }));
    repo.file(
        "acme_cloud",
        DECLARATION_FILE,
        "rules:\n  config-flow: done\n  diagnostics: done\n  discovery:\n    status: exempt\n    comment: cloud only\n",
    );

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    let errs = errors(&result, "acme_cloud");
    assert_eq!(
        errs,
        vec![
            "[config-flow] Integration does not set config_flow in its manifest".to_string(),
            "[config-flow] Integration does not have a config_flow.py".to_string(),
            "Please check the documentation at https://developers.home-assistant.io/docs/core/integration-quality-scale/rules/config-flow/".to_string(),
            "[diagnostics] Integration does not implement the diagnostics platform (is missing diagnostics.py)".to_string(),
            "Please check the documentation at https://developers.home-assistant.io/docs/core/integration-quality-scale/rules/diagnostics/".to_string(),
        ]
    );
}

#[test]
fn done_rules_backed_by_source_pass() {
    let repo = Repo::new();
    repo.integration(
        "acme_cloud",
        json!({ "config_flow": true, "single_config_entry": true }),
    );
    repo.file("acme_cloud", "config_flow.py", "class DemoFlow(ConfigFlow, domain=DOMAIN):\n    async def async_step_reauth(self, data):\n        pass\n");
    repo.file("acme_cloud", "__init__.py", "async def async_setup_entry(hass, entry):\n    entry.runtime_data = Client()\n\nasync def async_unload_entry(hass, entry):\n    return True\n");
    repo.file("acme_cloud", "sensor.py", "PARALLEL_UPDATES = 0\n");
    repo.file(
        "acme_cloud",
        DECLARATION_FILE,
        "rules:\n  config-flow: done\n  unique-config-entry: done\n  runtime-data: done\n  config-entry-unloading: done\n  reauthentication-flow: done\n  parallel-updates: done\n",
    );

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert!(result["acme_cloud"].errors().is_empty(), "{:?}", result["acme_cloud"].errors());
}

#[test]
fn invalid_yaml_reports_once() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({ "quality_scale": "bronze" }));
    repo.file("acme_cloud", DECLARATION_FILE, "rules:\n  config-flow: [done\n");

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert_eq!(
        errors(&result, "acme_cloud"),
        vec!["Invalid quality_scale.yaml".to_string()]
    );
}

#[test]
fn one_bad_integration_does_not_stop_the_run() {
    let repo = Repo::new();
    repo.integration("broken", json!({}));
    repo.file("broken", DECLARATION_FILE, "::: not yaml :::\n  - [");
    repo.integration("healthy", json!({ "quality_scale": "bronze" }));
    repo.file("healthy", DECLARATION_FILE, &all_done(&[Tier::Bronze]));

    let result = repo.run(&checker_with(ExemptionLists::builtin()));
    assert_eq!(errors(&result, "broken").len(), 1);
    assert!(errors(&result, "healthy").is_empty());

    let report = ValidationReport::collect(&result);
    assert_eq!(report.checked, 2);
    assert_eq!(report.integrations.len(), 1);
    assert_eq!(report.integrations[0].domain, "broken");
}

#[test]
fn repeated_runs_report_the_same_errors() {
    let repo = Repo::new();
    repo.integration("acme_cloud", json!({ "quality_scale": "silver" }));
    repo.file("acme_cloud", DECLARATION_FILE, "rules:\n  config-flow: done\n  brands: todo\n");

    let checker = checker_with(ExemptionLists::builtin());
    let first = errors(&repo.run(&checker), "acme_cloud");
    let second = errors(&repo.run(&checker), "acme_cloud");
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn specific_integrations_limit_the_run() {
    let repo = Repo::new();
    repo.integration("alpha", json!({}));
    repo.integration("beta", json!({}));

    let config = Config::new(repo.root()).with_specific_integrations(vec!["beta".to_string()]);
    let mut integrations =
        load_integrations(&config.components_dir(), true, &config).expect("load");
    checker_with(ExemptionLists::builtin()).validate(&config, &mut integrations);

    assert_eq!(integrations.keys().collect::<Vec<_>>(), vec!["beta"]);
    assert_eq!(errors(&integrations, "beta").len(), 1);
}
