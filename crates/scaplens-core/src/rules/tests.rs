//! Tests for rule loading and YAML shape normalization.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::shape;
use super::RuleLoader;
use crate::error::Lookup;
use crate::index::RuleIndex;
use crate::repo::ContentRepo;
use crate::types::Severity;

fn yaml(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).unwrap()
}

fn write_rule(root: &Path, rel_dir: &str, content: &str) {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("rule.yml"), content).unwrap();
}

// ==================== Shape Normalization ====================

#[test]
fn test_scalar_string_coerces_numbers_and_bools() {
    assert_eq!(shape::scalar_string(&yaml("hello")), Some("hello".to_string()));
    assert_eq!(shape::scalar_string(&yaml("42")), Some("42".to_string()));
    assert_eq!(shape::scalar_string(&yaml("true")), Some("true".to_string()));
    assert_eq!(shape::scalar_string(&yaml("null")), None);
    assert_eq!(shape::scalar_string(&yaml("[a, b]")), None);
}

#[test]
fn test_string_or_list_normalizes() {
    assert_eq!(shape::string_or_list(&yaml("CM-6")), vec!["CM-6".to_string()]);
    assert_eq!(
        shape::string_or_list(&yaml("[CM-6, AC-17]")),
        vec!["CM-6".to_string(), "AC-17".to_string()]
    );
    assert!(shape::string_or_list(&yaml("null")).is_empty());
    assert!(shape::string_or_list(&yaml("{a: b}")).is_empty());
}

#[test]
fn test_identifiers_well_known_and_extra() {
    let doc = yaml(
        "identifiers:\n  cce:\n    - CCE-80901-2\n    - CCE-80902-0\n  cis: '5.2.12'\n  stigid: RHEL-08-010201\n  cce@rhel8: CCE-80901-2\n",
    );
    let identifiers = shape::identifiers_from(doc.get("identifiers"));

    assert_eq!(identifiers.cce.as_deref(), Some("CCE-80901-2"));
    assert_eq!(identifiers.cis, Some(vec!["5.2.12".to_string()]));
    assert_eq!(identifiers.stigid.as_deref(), Some("RHEL-08-010201"));
    assert_eq!(
        identifiers.extra.get("cce@rhel8").map(String::as_str),
        Some("CCE-80901-2")
    );
}

#[test]
fn test_references_string_or_list_and_extra() {
    let doc = yaml(
        "references:\n  nist: CM-6(a)\n  disa:\n    - CCI-000366\n    - CCI-001453\n  ospp@rhel8: FMT_MOF_EXT.1\n",
    );
    let references = shape::references_from(doc.get("references"));

    assert_eq!(references.nist, vec!["CM-6(a)".to_string()]);
    assert_eq!(
        references.disa,
        vec!["CCI-000366".to_string(), "CCI-001453".to_string()]
    );
    assert!(references.cis.is_empty());
    assert_eq!(
        references.extra.get("ospp@rhel8"),
        Some(&vec!["FMT_MOF_EXT.1".to_string()])
    );
}

#[test]
fn test_products_inferred_sorted_and_deduplicated() {
    let doc = yaml(
        "identifiers:\n  stigid@rhel9: RHEL-09-255045\n  cce@rhel8: CCE-80901-2\nreferences:\n  nist@rhel8: CM-6\n  srg@ol9: SRG-OS-000163\n",
    );
    assert_eq!(
        shape::products_from(&doc),
        vec!["ol9".to_string(), "rhel8".to_string(), "rhel9".to_string()]
    );
}

#[test]
fn test_products_empty_without_suffixed_keys() {
    let doc = yaml("identifiers:\n  cce: CCE-80901-2\nreferences:\n  nist: CM-6\n");
    assert!(shape::products_from(&doc).is_empty());
}

#[test]
fn test_truncate_chars_is_boundary_safe() {
    assert_eq!(shape::truncate_chars("abcdef", 4), "abcd");
    assert_eq!(shape::truncate_chars("ab", 4), "ab");
    // Multi-byte characters count as one.
    assert_eq!(shape::truncate_chars("αβγδε", 3), "αβγ");
}

// ==================== Severity ====================

#[test]
fn test_severity_round_trips_known_values() {
    assert_eq!(Severity::from("medium".to_string()), Severity::Medium);
    assert_eq!(Severity::from("medium".to_string()).as_str(), "medium");
    assert_eq!(Severity::from("unknown".to_string()), Severity::Unknown);
}

#[test]
fn test_severity_preserves_unrecognized_values() {
    let severity = Severity::from("CRITICAL".to_string());
    assert_eq!(severity, Severity::Other("CRITICAL".to_string()));
    assert_eq!(severity.as_str(), "CRITICAL");
}

// ==================== Rule Loading ====================

#[test]
fn test_load_details_full_rule() {
    let temp = TempDir::new().unwrap();
    write_rule(
        temp.path(),
        "linux_os/guide/services/ssh/sshd_set_idle_timeout",
        "title: Set SSH Idle Timeout Interval\nseverity: medium\ndescription: Terminate idle sessions.\nrationale: Limits exposure.\nplatform: machine\nidentifiers:\n  cce@rhel8: CCE-80901-2\nreferences:\n  nist:\n    - CM-6\ntemplate:\n  name: sshd_lineinfile\n",
    );
    let rule_dir = temp
        .path()
        .join("linux_os/guide/services/ssh/sshd_set_idle_timeout");
    fs::create_dir_all(rule_dir.join("bash")).unwrap();
    fs::write(rule_dir.join("bash/shared.sh"), "# fix\n").unwrap();
    fs::write(rule_dir.join("ansible.yml"), "- name: fix\n").unwrap();
    fs::create_dir_all(rule_dir.join("oval")).unwrap();
    fs::write(rule_dir.join("oval/shared.xml"), "<def/>\n").unwrap();
    fs::create_dir_all(rule_dir.join("tests")).unwrap();
    fs::write(rule_dir.join("tests/correct_value.pass.sh"), "true\n").unwrap();
    fs::write(rule_dir.join("tests/wrong_value.fail.sh"), "false\n").unwrap();
    fs::write(rule_dir.join("tests/notes.md"), "notes\n").unwrap();

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);

    let Lookup::Found(details) = loader.load_details("sshd_set_idle_timeout") else {
        panic!("expected rule to load");
    };

    assert_eq!(details.title, "Set SSH Idle Timeout Interval");
    assert_eq!(details.severity, Severity::Medium);
    assert_eq!(details.rationale.as_deref(), Some("Limits exposure."));
    assert_eq!(details.platforms, vec!["machine".to_string()]);
    assert_eq!(details.products, vec!["rhel8".to_string()]);
    assert_eq!(details.references.nist, vec!["CM-6".to_string()]);

    assert_eq!(details.remediations.get("bash"), Some(&true));
    assert_eq!(details.remediations.get("ansible"), Some(&true));
    assert_eq!(details.remediations.get("puppet"), Some(&false));
    assert_eq!(details.checks.get("oval"), Some(&true));
    assert_eq!(
        details.test_scenarios,
        vec![
            "correct_value.pass.sh".to_string(),
            "wrong_value.fail.sh".to_string()
        ]
    );

    assert!(details.file_path.ends_with("sshd_set_idle_timeout/rule.yml"));
    assert!(!details.file_path.starts_with('/'));
    assert!(details.last_modified.is_some());
    assert!(details.template.is_some());
    assert!(details.rendered.is_none());
}

#[test]
fn test_load_details_defaults_for_sparse_rule() {
    let temp = TempDir::new().unwrap();
    write_rule(temp.path(), "shared/bare_rule", "description: Only a description.\n");

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);

    let Lookup::Found(details) = loader.load_details("bare_rule") else {
        panic!("expected rule to load");
    };

    // Title falls back to the rule id, severity to unknown.
    assert_eq!(details.title, "bare_rule");
    assert_eq!(details.severity, Severity::Unknown);
    assert!(details.products.is_empty());
    assert!(details.platforms.is_empty());
    assert!(details.test_scenarios.is_empty());
    assert_eq!(details.checks.get("oval"), Some(&false));
}

#[test]
fn test_load_details_unknown_rule() {
    let temp = TempDir::new().unwrap();
    write_rule(temp.path(), "shared/known_rule", "title: Known\n");

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);

    assert!(matches!(
        loader.load_details("no_such_rule"),
        Lookup::NotFound
    ));
}

#[test]
fn test_load_details_malformed_yaml() {
    let temp = TempDir::new().unwrap();
    write_rule(temp.path(), "shared/broken_rule", "title: [unclosed\n");

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);

    assert!(matches!(
        loader.load_details("broken_rule"),
        Lookup::Malformed(_)
    ));
}

#[test]
fn test_load_details_rejects_non_mapping_top_level() {
    let temp = TempDir::new().unwrap();
    write_rule(temp.path(), "shared/list_rule", "- just\n- a\n- list\n");

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);

    assert!(matches!(
        loader.load_details("list_rule"),
        Lookup::Malformed(_)
    ));
}

#[test]
fn test_search_projection_truncates_description() {
    let temp = TempDir::new().unwrap();
    let long_description = "x".repeat(450);
    write_rule(
        temp.path(),
        "shared/wordy_rule",
        &format!("title: Wordy\ndescription: {long_description}\n"),
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let index = RuleIndex::new(repo.clone());
    let loader = RuleLoader::new(&repo, &index);
    let path = index.lookup("wordy_rule").unwrap();

    let Lookup::Found(result) = loader.load_search_result("wordy_rule", &path) else {
        panic!("expected projection to load");
    };
    assert_eq!(result.description.chars().count(), 200);
}
