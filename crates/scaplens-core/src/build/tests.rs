//! Tests for build artifact access, datastream status, and rendered search.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::search::extract_snippet;
use super::BuildArtifacts;
use crate::error::Lookup;
use crate::repo::ContentRepo;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ==================== Built Products ====================

#[test]
fn test_list_built_products_requires_indicators() {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("build");
    fs::create_dir_all(build.join("rhel9/rules")).unwrap();
    fs::create_dir_all(build.join("rhel8/guides")).unwrap();
    write(&build.join("ol9/ssg-ol9-ds.xml"), "<ds/>");
    fs::create_dir_all(build.join("scratch")).unwrap();
    fs::create_dir_all(build.join(".cache")).unwrap();

    let repo = ContentRepo::open(temp.path()).unwrap();
    let products = BuildArtifacts::new(&repo).list_built_products();

    assert_eq!(
        products,
        vec!["ol9".to_string(), "rhel8".to_string(), "rhel9".to_string()]
    );
}

#[test]
fn test_list_built_products_without_build_dir() {
    let temp = TempDir::new().unwrap();
    let repo = ContentRepo::open(temp.path()).unwrap();
    assert!(BuildArtifacts::new(&repo).list_built_products().is_empty());
}

// ==================== Rendered Rules ====================

#[test]
fn test_rendered_rule_with_partial_artifacts() {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("build/rhel9");
    write(
        &build.join("rules/sshd_set_idle_timeout.json"),
        r#"{"title": "Set SSH Idle Timeout", "severity": "medium"}"#,
    );
    write(
        &build.join("fixes_from_templates/bash/sshd_set_idle_timeout.sh"),
        "echo 'ClientAliveInterval 300' >> /etc/ssh/sshd_config\n",
    );
    // No OVAL, no other remediation types.

    let repo = ContentRepo::open(temp.path()).unwrap();
    let Lookup::Found(rule) =
        BuildArtifacts::new(&repo).rendered_rule("rhel9", "sshd_set_idle_timeout")
    else {
        panic!("expected rendered rule");
    };

    assert_eq!(rule.product, "rhel9");
    assert!(rule.rendered_yaml.contains("Set SSH Idle Timeout"));
    assert!(rule.rendered_oval.is_none());
    assert_eq!(rule.rendered_remediations.len(), 1);
    assert!(rule
        .rendered_remediations
        .get("bash")
        .is_some_and(|text| text.contains("ClientAliveInterval")));
    assert_eq!(rule.build_path, "build/rhel9/rules");
}

#[test]
fn test_rendered_rule_includes_oval() {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("build/rhel9");
    write(&build.join("rules/accounts_tmout.json"), r#"{"title": "TMOUT"}"#);
    write(
        &build.join("checks/oval/accounts_tmout.xml"),
        "<def id=\"oval:ssg-accounts_tmout:def:1\"/>",
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let Lookup::Found(rule) = BuildArtifacts::new(&repo).rendered_rule("rhel9", "accounts_tmout")
    else {
        panic!("expected rendered rule");
    };
    assert!(rule
        .rendered_oval
        .is_some_and(|oval| oval.contains("accounts_tmout")));
}

#[test]
fn test_rendered_rule_missing_cases() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("build/rhel9/rules")).unwrap();

    let repo = ContentRepo::open(temp.path()).unwrap();
    let artifacts = BuildArtifacts::new(&repo);

    // Product built, rule absent.
    assert!(matches!(
        artifacts.rendered_rule("rhel9", "no_such_rule"),
        Lookup::NotFound
    ));
    // Product not built at all.
    assert!(matches!(
        artifacts.rendered_rule("fedora", "no_such_rule"),
        Lookup::NotFound
    ));
}

#[test]
fn test_rendered_rule_malformed_json() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("build/rhel9/rules/broken.json"),
        "{not json",
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    assert!(matches!(
        BuildArtifacts::new(&repo).rendered_rule("rhel9", "broken"),
        Lookup::Malformed(_)
    ));
}

// ==================== Datastream Info ====================

#[test]
fn test_datastream_info_missing() {
    let temp = TempDir::new().unwrap();
    let repo = ContentRepo::open(temp.path()).unwrap();

    let info = BuildArtifacts::new(&repo).datastream_info("rhel9");

    assert!(!info.exists);
    assert_eq!(info.datastream_path, "build/ssg-rhel9-ds.xml");
    assert_eq!(info.file_size, 0);
    assert_eq!(info.profiles_count, 0);
    assert_eq!(info.rules_count, 0);
    assert!(info.build_time.is_none());
}

#[test]
fn test_datastream_info_counts_profiles_and_rules() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("build/ssg-rhel9-ds.xml"),
        r#"<?xml version="1.0"?>
<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.2">
  <Profile id="ospp"/>
  <Profile id="stig"/>
  <Group id="services">
    <Rule id="rule_a"/>
    <Rule id="rule_b"/>
    <Rule id="rule_c"/>
  </Group>
</Benchmark>
"#,
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let info = BuildArtifacts::new(&repo).datastream_info("rhel9");

    assert!(info.exists);
    assert_eq!(info.datastream_path, "build/ssg-rhel9-ds.xml");
    assert!(info.file_size > 0);
    assert!(info.build_time.is_some());
    assert_eq!(info.profiles_count, 2);
    assert_eq!(info.rules_count, 3);
}

#[test]
fn test_datastream_info_ignores_foreign_namespaces() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("build/ssg-rhel9-ds.xml"),
        r#"<root xmlns:x="urn:other"><x:Profile/><Rule/></root>"#,
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let info = BuildArtifacts::new(&repo).datastream_info("rhel9");

    assert!(info.exists);
    assert_eq!(info.profiles_count, 0);
    assert_eq!(info.rules_count, 0);
}

#[test]
fn test_datastream_info_fallback_locations() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("build/rhel9/ssg-rhel9-ds.xml"),
        "<Benchmark xmlns=\"http://checklists.nist.gov/xccdf/1.2\"><Profile/></Benchmark>",
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let info = BuildArtifacts::new(&repo).datastream_info("rhel9");

    assert!(info.exists);
    assert_eq!(info.datastream_path, "build/rhel9/ssg-rhel9-ds.xml");
    assert_eq!(info.profiles_count, 1);
}

#[test]
fn test_datastream_info_survives_invalid_xml() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("build/ssg-rhel9-ds.xml"), "<unclosed");

    let repo = ContentRepo::open(temp.path()).unwrap();
    let info = BuildArtifacts::new(&repo).datastream_info("rhel9");

    // Still a found record; only the counts degrade.
    assert!(info.exists);
    assert!(info.file_size > 0);
    assert_eq!(info.profiles_count, 0);
    assert_eq!(info.rules_count, 0);
}

// ==================== Rendered Search ====================

#[test]
fn test_search_rendered_content_match_types() {
    let temp = TempDir::new().unwrap();
    let build = temp.path().join("build/rhel9");
    write(
        &build.join("rules/sshd_set_idle_timeout.json"),
        r#"{"description": "Sets ClientAliveInterval"}"#,
    );
    write(
        &build.join("fixes_from_templates/bash/sshd_set_idle_timeout.sh"),
        "grep clientaliveinterval /etc/ssh/sshd_config\n",
    );
    write(
        &build.join("checks/oval/sshd_set_idle_timeout.xml"),
        "<def comment=\"ClientAliveInterval is set\"/>",
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let hits =
        BuildArtifacts::new(&repo).search_rendered_content("clientaliveinterval", None, 10);

    let types: Vec<&str> = hits.iter().map(|hit| hit.match_type.as_str()).collect();
    assert_eq!(types, vec!["rule_json", "remediation_bash", "oval"]);
    assert!(hits
        .iter()
        .all(|hit| hit.rule_id == "sshd_set_idle_timeout"));
    assert!(hits.iter().all(|hit| !hit.match_snippet.is_empty()));
}

#[test]
fn test_search_rendered_content_stops_at_limit() {
    let temp = TempDir::new().unwrap();
    let rules = temp.path().join("build/rhel9/rules");
    for i in 0..5 {
        write(
            &rules.join(format!("rule_{i}.json")),
            r#"{"description": "audit rules"}"#,
        );
    }

    let repo = ContentRepo::open(temp.path()).unwrap();
    let hits = BuildArtifacts::new(&repo).search_rendered_content("audit", None, 2);
    assert_eq!(hits.len(), 2);
}

#[test]
fn test_search_rendered_content_product_filter() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("build/rhel8/rules/rule_a.json"),
        r#"{"description": "audit"}"#,
    );
    write(
        &temp.path().join("build/rhel9/rules/rule_a.json"),
        r#"{"description": "audit"}"#,
    );

    let repo = ContentRepo::open(temp.path()).unwrap();
    let artifacts = BuildArtifacts::new(&repo);

    let hits = artifacts.search_rendered_content("audit", Some("rhel8"), 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].product, "rhel8");

    // Unbuilt product filter yields nothing rather than an error.
    assert!(artifacts
        .search_rendered_content("audit", Some("fedora"), 10)
        .is_empty());
}

// ==================== Snippets ====================

#[test]
fn test_extract_snippet_marks_both_sides() {
    let content = format!("{}NEEDLE{}", "a".repeat(500), "b".repeat(500));
    let snippet = extract_snippet(&content, "needle", 100);

    assert!(snippet.starts_with("..."));
    assert!(snippet.ends_with("..."));
    assert!(snippet.contains("NEEDLE"));
    // 100 characters of context per side plus the markers.
    assert_eq!(snippet.chars().count(), 3 + 100 + 6 + 100 + 3);
}

#[test]
fn test_extract_snippet_at_content_start() {
    let content = format!("NEEDLE{}", "b".repeat(500));
    let snippet = extract_snippet(&content, "needle", 100);

    assert!(snippet.starts_with("NEEDLE"));
    assert!(snippet.ends_with("..."));
}

#[test]
fn test_extract_snippet_short_content_unmarked() {
    let snippet = extract_snippet("just a needle here", "needle", 100);
    assert_eq!(snippet, "just a needle here");
}

#[test]
fn test_extract_snippet_multibyte_content() {
    let content = format!("{}NEEDLE{}", "α".repeat(300), "β".repeat(300));
    let snippet = extract_snippet(&content, "needle", 100);

    assert!(snippet.contains("NEEDLE"));
    assert!(snippet.starts_with("..."));
    assert!(snippet.ends_with("..."));
    assert_eq!(snippet.chars().count(), 3 + 100 + 6 + 100 + 3);
}

#[test]
fn test_extract_snippet_no_match() {
    assert_eq!(extract_snippet("haystack", "needle", 100), "");
}
