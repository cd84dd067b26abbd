//! Record types returned by the discovery surface.
//!
//! These are plain data carriers: loaders normalize the loosely-shaped
//! source files into them, and they serialize cleanly for hosts that ship
//! results over a wire. Unknown keys from the sources are preserved in
//! `extra` maps rather than dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule severity as authored in `rule.yml`.
///
/// Unrecognized values are carried through verbatim rather than rejected;
/// filters compare against the stored string exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// `low`
    Low,
    /// `medium`
    Medium,
    /// `high`
    High,
    /// `unknown`, also the fallback when the field is absent.
    #[default]
    Unknown,
    /// Any other value, kept as written.
    Other(String),
}

impl Severity {
    /// The stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unknown => "unknown",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "unknown" => Self::Unknown,
            _ => Self::Other(raw),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// How much rendered content a rule-detail lookup carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Sizes and availability only; textual content omitted.
    #[default]
    Metadata,

    /// Full rendered YAML, OVAL, and remediation text.
    Full,
}

/// One rule in a search result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSearchResult {
    /// Rule identifier (the rule's directory name).
    pub rule_id: String,

    /// Rule title, falling back to the rule id.
    pub title: String,

    /// Severity as stored.
    #[serde(default)]
    pub severity: Severity,

    /// Description, truncated for listings.
    #[serde(default)]
    pub description: String,

    /// Products inferred from identifier and reference keys.
    #[serde(default)]
    pub products: Vec<String>,

    /// Path to `rule.yml`, relative to the repository root.
    pub file_path: String,
}

/// Stable identifiers attached to a rule.
///
/// Only the bare well-known keys populate typed fields; product-suffixed
/// keys such as `cce@rhel8` land in `extra` verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identifiers {
    /// CCE identifier; the first entry when authored as a list.
    #[serde(default)]
    pub cce: Option<String>,

    /// CIS benchmark identifiers.
    #[serde(default)]
    pub cis: Option<Vec<String>>,

    /// NIST identifiers.
    #[serde(default)]
    pub nist: Option<Vec<String>>,

    /// STIG identifier.
    #[serde(default)]
    pub stigid: Option<String>,

    /// Every other identifier key, kept as written.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

/// References into compliance frameworks.
///
/// Values are normalized to lists: a bare string becomes a one-element
/// list, anything else non-list contributes nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct References {
    /// NIST SP 800-53 controls.
    #[serde(default)]
    pub nist: Vec<String>,

    /// CIS benchmark sections.
    #[serde(default)]
    pub cis: Vec<String>,

    /// CUI references.
    #[serde(default)]
    pub cui: Vec<String>,

    /// DISA STIG references.
    #[serde(default)]
    pub disa: Vec<String>,

    /// ISA-62443 references.
    #[serde(default, rename = "isa-62443")]
    pub isa_62443: Vec<String>,

    /// PCI-DSS references.
    #[serde(default)]
    pub pcidss: Vec<String>,

    /// HIPAA references.
    #[serde(default)]
    pub hipaa: Vec<String>,

    /// Every other framework key, values normalized to lists.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Vec<String>>,
}

/// Full detail record for one rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDetails {
    /// Rule identifier.
    pub rule_id: String,

    /// Rule title, falling back to the rule id.
    pub title: String,

    /// Full description.
    #[serde(default)]
    pub description: String,

    /// Rationale, when authored.
    #[serde(default)]
    pub rationale: Option<String>,

    /// Severity as stored.
    #[serde(default)]
    pub severity: Severity,

    /// Stable identifiers.
    #[serde(default)]
    pub identifiers: Identifiers,

    /// Compliance framework references.
    #[serde(default)]
    pub references: References,

    /// Products inferred from identifier and reference keys.
    #[serde(default)]
    pub products: Vec<String>,

    /// Applicable platforms, normalized to a list.
    #[serde(default)]
    pub platforms: Vec<String>,

    /// Source remediation availability by type.
    #[serde(default)]
    pub remediations: BTreeMap<String, bool>,

    /// Source check availability by type.
    #[serde(default)]
    pub checks: BTreeMap<String, bool>,

    /// Test scenario script names under `tests/`, sorted.
    #[serde(default)]
    pub test_scenarios: Vec<String>,

    /// Path to `rule.yml`, relative to the repository root.
    pub file_path: String,

    /// Rule directory, relative to the repository root.
    pub rule_dir: String,

    /// Modification time of `rule.yml`.
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,

    /// Template reference, when the rule is template-generated.
    #[serde(default)]
    pub template: Option<serde_yaml::Value>,

    /// Rendered build content by product, when requested and available.
    #[serde(default)]
    pub rendered: Option<BTreeMap<String, RenderedContent>>,
}

/// Rendered build content for one `(product, rule)` pair, with metadata.
///
/// Sizes and availability are populated at every detail level; the
/// textual fields survive only under [`DetailLevel::Full`]. Sizes count
/// characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedContent {
    /// Product this content was rendered for.
    pub product: String,

    /// Rendered rule YAML, full detail only.
    #[serde(default)]
    pub rendered_yaml: Option<String>,

    /// Rendered OVAL XML, full detail only.
    #[serde(default)]
    pub rendered_oval: Option<String>,

    /// Rendered remediation text by type, full detail only.
    #[serde(default)]
    pub rendered_remediations: BTreeMap<String, String>,

    /// Build artifact directory, relative to the repository root.
    pub build_path: String,

    /// Datastream build time, when a datastream exists.
    #[serde(default)]
    pub build_time: Option<DateTime<Utc>>,

    /// Rendered YAML length in characters.
    #[serde(default)]
    pub yaml_size: usize,

    /// Rendered OVAL length in characters; zero when absent.
    #[serde(default)]
    pub oval_size: usize,

    /// Remediation lengths in characters, by type.
    #[serde(default)]
    pub remediation_sizes: BTreeMap<String, usize>,

    /// Whether rendered YAML exists for the pair.
    #[serde(default)]
    pub has_yaml: bool,

    /// Whether rendered OVAL exists for the pair.
    #[serde(default)]
    pub has_oval: bool,

    /// Remediation types with rendered content.
    #[serde(default)]
    pub available_remediations: Vec<String>,
}

/// Raw rendered artifacts for one `(product, rule)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedRule {
    /// Rule identifier.
    pub rule_id: String,

    /// Product the artifacts were built for.
    pub product: String,

    /// Rendered rule content, re-dumped as YAML.
    pub rendered_yaml: String,

    /// Rendered OVAL XML, when present.
    #[serde(default)]
    pub rendered_oval: Option<String>,

    /// Rendered remediation text by type.
    #[serde(default)]
    pub rendered_remediations: BTreeMap<String, String>,

    /// Directory holding the rule JSON, relative to the repository root.
    pub build_path: String,
}

/// Datastream build status for one product.
///
/// Always a full record: an unbuilt product answers with `exists: false`
/// and the conventional path filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastreamInfo {
    /// Product identifier.
    pub product: String,

    /// Datastream path relative to the repository root; the conventional
    /// location when no datastream exists yet.
    pub datastream_path: String,

    /// File size in bytes; zero when absent.
    #[serde(default)]
    pub file_size: u64,

    /// File modification time, standing in for the build time.
    #[serde(default)]
    pub build_time: Option<DateTime<Utc>>,

    /// Profiles counted in the datastream; zero on parse failure.
    #[serde(default)]
    pub profiles_count: usize,

    /// Rules counted in the datastream; zero on parse failure.
    #[serde(default)]
    pub rules_count: usize,

    /// Whether a datastream file was found.
    #[serde(default)]
    pub exists: bool,
}

/// One hit from a rendered-content search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSearchResult {
    /// Rule identifier (the artifact's file stem).
    pub rule_id: String,

    /// Product whose artifacts matched.
    pub product: String,

    /// What matched: `rule_json`, `remediation_<type>`, or `oval`.
    pub match_type: String,

    /// Window around the first match, `...`-marked where truncated.
    pub match_snippet: String,

    /// Matched file, relative to the repository root.
    pub file_path: String,
}

/// One profile in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile identifier (the file stem).
    pub profile_id: String,

    /// Profile title, falling back to the profile id.
    pub title: String,

    /// Description, truncated for listings.
    #[serde(default)]
    pub description: String,

    /// Product the profile belongs to.
    pub product: String,

    /// Number of selected rules.
    #[serde(default)]
    pub rule_count: usize,
}

/// Full detail record for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDetails {
    /// Profile identifier.
    pub profile_id: String,

    /// Profile title, falling back to the profile id.
    pub title: String,

    /// Full description; empty when the profile has none.
    #[serde(default)]
    pub description: String,

    /// Product the profile belongs to.
    pub product: String,

    /// Parent profile, when this one extends another.
    #[serde(default)]
    pub extends: Option<String>,

    /// Selected rule ids, in file order.
    #[serde(default)]
    pub selections: Vec<String>,

    /// Variable overrides.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Path to the profile file, relative to the repository root.
    pub file_path: String,

    /// Number of selected rules.
    #[serde(default)]
    pub rule_count: usize,

    /// Control file reference, when the profile is controls-based.
    #[serde(default)]
    pub control_file: Option<String>,
}

/// One product in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product identifier (the directory name).
    pub product_id: String,

    /// Display name from `product.yml`, falling back to the id.
    pub name: String,

    /// Product type; `unknown` when unspecified.
    pub product_type: String,

    /// Product version.
    #[serde(default)]
    pub version: Option<String>,

    /// Product description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Full detail record for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Product identifier.
    pub product_id: String,

    /// Display name from `product.yml`, falling back to the id.
    pub name: String,

    /// Product type; `unknown` when unspecified.
    pub product_type: String,

    /// Product version.
    #[serde(default)]
    pub version: Option<String>,

    /// Product description.
    #[serde(default)]
    pub description: Option<String>,

    /// Profile ids available for the product, sorted.
    #[serde(default)]
    pub profiles: Vec<String>,

    /// Benchmark root relative to the repository root.
    pub benchmark_root: String,

    /// Product directory, relative to the repository root.
    pub product_dir: String,

    /// CPE identifier, when declared.
    #[serde(default)]
    pub cpe: Option<String>,
}
