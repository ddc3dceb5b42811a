// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine and category configuration loading, validation, and merging.
//!
//! This crate provides [`EngineConfig`] — the top-level runtime settings —
//! together with helpers for loading from TOML files, merging overlays,
//! applying `spec.md` §6.5 environment variable overrides, and producing
//! advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod schema;

pub use schema::{load_category_schema, CategorySchema};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// An environment variable held a value of the wrong type.
    #[error("invalid environment variable {var}: {reason}")]
    EnvParseError {
        /// Name of the offending variable.
        var: String,
        /// Why it could not be parsed.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// A deprecated field was used in the configuration.
    DeprecatedField {
        /// Name of the deprecated field.
        field: String,
        /// Suggested replacement, if any.
        suggestion: Option<String>,
    },
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// A budget is unusually large relative to its peers.
    LargeBudget {
        /// Category name.
        category: String,
        /// Monthly budget value in USD.
        usd: f64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::DeprecatedField { field, suggestion } => {
                write!(f, "deprecated field '{field}'")?;
                if let Some(s) = suggestion {
                    write!(f, " — use '{s}' instead")?;
                }
                Ok(())
            }
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeBudget { category, usd } => {
                write!(f, "category '{category}' has an unusually large monthly budget (${usd})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level runtime configuration for the engine.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct EngineConfig {
    /// Category used when none is specified on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,

    /// Working directory used for staged run artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Path to the Spec DB SQLite file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specdb_path: Option<String>,

    /// Directory for the optional JSON-ndjson billing ledger mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_ledger_dir: Option<String>,

    /// Root directory for manufacturer helper files (`spec.md` §6.5
    /// `HELPER_FILES_ROOT`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_files_root: Option<String>,

    /// Per-category configuration, keyed by category name.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_category: None,
            workspace_dir: None,
            log_level: Some("info".into()),
            specdb_path: None,
            billing_ledger_dir: None,
            helper_files_root: None,
            categories: BTreeMap::new(),
        }
    }
}

/// Per-category settings: host policy, planner limits, and LLM budget caps.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct CategoryConfig {
    /// Host glob patterns treated as manufacturer/lab/retailer tiers.
    #[serde(default)]
    pub approved_hosts: Vec<String>,
    /// Host glob patterns that are never fetched.
    #[serde(default)]
    pub denied_hosts: Vec<String>,
    /// Planner and fetcher limits for this category.
    #[serde(default)]
    pub planner: PlannerLimitsConfig,
    /// LLM budget caps for this category.
    #[serde(default)]
    pub llm_budget: LlmBudgetConfig,
    /// Minimum article-extractor confidence score to accept a page as a
    /// product page (`spec.md` §6.5 `ARTICLE_EXTRACTOR_MIN_SCORE`).
    #[serde(default = "default_article_extractor_min_score")]
    pub article_extractor_min_score: f64,
    /// Enable OCR fallback for scanned PDF sources.
    #[serde(default)]
    pub scanned_pdf_ocr_enabled: bool,
    /// Fraction of rounds sampled for verification-mode LLM re-dispatch,
    /// in `[0, 1]`. `0.0` (the default) disables verification mode.
    #[serde(default)]
    pub verification_sample_rate: f64,
}

fn default_article_extractor_min_score() -> f64 {
    0.5
}

/// Source Planner limits (`spec.md` §4.2, §6.5).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct PlannerLimitsConfig {
    /// Maximum URLs enqueued per product (`MAX_URLS_PER_PRODUCT`).
    pub max_urls_per_product: usize,
    /// Maximum pages fetched per domain (`MAX_PAGES_PER_DOMAIN`).
    pub max_pages_per_domain: usize,
    /// Wall-clock ceiling for one run, in seconds (`MAX_RUN_SECONDS`).
    pub max_run_seconds: u64,
    /// Fetch pool worker count (`FETCH_CONCURRENCY`).
    pub fetch_concurrency: usize,
}

impl Default for PlannerLimitsConfig {
    fn default() -> Self {
        Self {
            max_urls_per_product: 40,
            max_pages_per_domain: 5,
            max_run_seconds: 3_600,
            fetch_concurrency: 4,
        }
    }
}

/// LLM Router & Budget Guard caps (`spec.md` §4.9, §6.5).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct LlmBudgetConfig {
    /// `LLM_MONTHLY_BUDGET_USD`.
    pub monthly_budget_usd: f64,
    /// `LLM_PER_PRODUCT_BUDGET_USD`.
    pub per_product_budget_usd: f64,
    /// `LLM_MAX_CALLS_PER_PRODUCT_TOTAL`.
    pub max_calls_per_product_total: u32,
    /// `LLM_MAX_CALLS_PER_ROUND`.
    pub max_calls_per_round: u32,
    /// `LLM_DISABLE_BUDGET_GUARDS` — test/debug escape hatch.
    #[serde(default)]
    pub disable_budget_guards: bool,
}

impl Default for LlmBudgetConfig {
    fn default() -> Self {
        Self {
            monthly_budget_usd: 500.0,
            per_product_budget_usd: 2.0,
            max_calls_per_product_total: 40,
            max_calls_per_round: 12,
            disable_budget_guards: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Monthly budget above which [`ConfigWarning::LargeBudget`] fires.
const LARGE_BUDGET_THRESHOLD_USD: f64 = 5_000.0;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`EngineConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`EngineConfig::default()`].
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Parse a TOML string into an [`EngineConfig`].
pub fn parse_toml(content: &str) -> Result<EngineConfig, ConfigError> {
    toml::from_str::<EngineConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides (`spec.md` §6.5)
// ---------------------------------------------------------------------------

/// Typed snapshot of the `spec.md` §6.5 environment variables, parsed with
/// defaults and surfaced `ConfigError::EnvParseError` on malformed values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// `MAX_URLS_PER_PRODUCT`.
    pub max_urls_per_product: Option<usize>,
    /// `MAX_PAGES_PER_DOMAIN`.
    pub max_pages_per_domain: Option<usize>,
    /// `MAX_RUN_SECONDS`.
    pub max_run_seconds: Option<u64>,
    /// `FETCH_CONCURRENCY`.
    pub fetch_concurrency: Option<usize>,
    /// `DYNAMIC_FETCH_POLICY_MAP_JSON`, parsed as opaque JSON.
    pub dynamic_fetch_policy_map: Option<serde_json::Value>,
    /// `LLM_MONTHLY_BUDGET_USD`.
    pub llm_monthly_budget_usd: Option<f64>,
    /// `LLM_PER_PRODUCT_BUDGET_USD`.
    pub llm_per_product_budget_usd: Option<f64>,
    /// `LLM_MAX_CALLS_PER_PRODUCT_TOTAL`.
    pub llm_max_calls_per_product_total: Option<u32>,
    /// `LLM_MAX_CALLS_PER_ROUND`.
    pub llm_max_calls_per_round: Option<u32>,
    /// `LLM_DISABLE_BUDGET_GUARDS`.
    pub llm_disable_budget_guards: bool,
    /// `STRUCTURED_METADATA_ENABLED`.
    pub structured_metadata_enabled: bool,
    /// `STRUCTURED_METADATA_URL`.
    pub structured_metadata_url: Option<String>,
    /// `ARTICLE_EXTRACTOR_MIN_SCORE`.
    pub article_extractor_min_score: Option<f64>,
    /// `SCANNED_PDF_OCR_ENABLED`.
    pub scanned_pdf_ocr_enabled: bool,
    /// `HELPER_FILES_ROOT`.
    pub helper_files_root: Option<String>,
}

fn parse_env_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvParseError {
                var: name.to_string(),
                reason: format!("could not parse '{raw}'"),
            }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::EnvParseError {
            var: name.to_string(),
            reason: "value is not valid UTF-8".to_string(),
        }),
    }
}

fn parse_env_bool(name: &str) -> Result<bool, ConfigError> {
    Ok(parse_env_var::<String>(name)?
        .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")))
}

impl EnvConfig {
    /// Read the `spec.md` §6.5 environment variables, applying defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dynamic_fetch_policy_map = match std::env::var("DYNAMIC_FETCH_POLICY_MAP_JSON") {
            Ok(raw) => Some(serde_json::from_str(&raw).map_err(|e| ConfigError::EnvParseError {
                var: "DYNAMIC_FETCH_POLICY_MAP_JSON".to_string(),
                reason: e.to_string(),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            max_urls_per_product: parse_env_var("MAX_URLS_PER_PRODUCT")?,
            max_pages_per_domain: parse_env_var("MAX_PAGES_PER_DOMAIN")?,
            max_run_seconds: parse_env_var("MAX_RUN_SECONDS")?,
            fetch_concurrency: parse_env_var("FETCH_CONCURRENCY")?,
            dynamic_fetch_policy_map,
            llm_monthly_budget_usd: parse_env_var("LLM_MONTHLY_BUDGET_USD")?,
            llm_per_product_budget_usd: parse_env_var("LLM_PER_PRODUCT_BUDGET_USD")?,
            llm_max_calls_per_product_total: parse_env_var("LLM_MAX_CALLS_PER_PRODUCT_TOTAL")?,
            llm_max_calls_per_round: parse_env_var("LLM_MAX_CALLS_PER_ROUND")?,
            llm_disable_budget_guards: parse_env_bool("LLM_DISABLE_BUDGET_GUARDS")?,
            structured_metadata_enabled: parse_env_bool("STRUCTURED_METADATA_ENABLED")?,
            structured_metadata_url: parse_env_var("STRUCTURED_METADATA_URL")?,
            article_extractor_min_score: parse_env_var("ARTICLE_EXTRACTOR_MIN_SCORE")?,
            scanned_pdf_ocr_enabled: parse_env_bool("SCANNED_PDF_OCR_ENABLED")?,
            helper_files_root: parse_env_var("HELPER_FILES_ROOT")?,
        })
    }

    /// Apply this environment snapshot on top of `config`'s named category,
    /// creating the category entry if it does not exist yet.
    pub fn apply_to_category(&self, config: &mut EngineConfig, category: &str) {
        if let Some(root) = &self.helper_files_root {
            config.helper_files_root = Some(root.clone());
        }
        let entry = config.categories.entry(category.to_string()).or_default();
        if let Some(v) = self.max_urls_per_product {
            entry.planner.max_urls_per_product = v;
        }
        if let Some(v) = self.max_pages_per_domain {
            entry.planner.max_pages_per_domain = v;
        }
        if let Some(v) = self.max_run_seconds {
            entry.planner.max_run_seconds = v;
        }
        if let Some(v) = self.fetch_concurrency {
            entry.planner.fetch_concurrency = v;
        }
        if let Some(v) = self.llm_monthly_budget_usd {
            entry.llm_budget.monthly_budget_usd = v;
        }
        if let Some(v) = self.llm_per_product_budget_usd {
            entry.llm_budget.per_product_budget_usd = v;
        }
        if let Some(v) = self.llm_max_calls_per_product_total {
            entry.llm_budget.max_calls_per_product_total = v;
        }
        if let Some(v) = self.llm_max_calls_per_round {
            entry.llm_budget.max_calls_per_round = v;
        }
        if self.llm_disable_budget_guards {
            entry.llm_budget.disable_budget_guards = true;
        }
        if let Some(v) = self.article_extractor_min_score {
            entry.article_extractor_min_score = v;
        }
        if self.scanned_pdf_ocr_enabled {
            entry.scanned_pdf_ocr_enabled = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (out-of-range budgets, empty category names) are returned as
/// a [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &EngineConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    for (name, category) in &config.categories {
        if name.is_empty() {
            errors.push("category name must not be empty".into());
        }
        if category.planner.max_urls_per_product == 0 {
            errors.push(format!("category '{name}': max_urls_per_product must be > 0"));
        }
        if category.llm_budget.monthly_budget_usd <= 0.0 {
            errors.push(format!(
                "category '{name}': llm monthly_budget_usd must be > 0"
            ));
        } else if category.llm_budget.monthly_budget_usd > LARGE_BUDGET_THRESHOLD_USD {
            warnings.push(ConfigWarning::LargeBudget {
                category: name.clone(),
                usd: category.llm_budget.monthly_budget_usd,
            });
        }
        if !(0.0..=1.0).contains(&category.article_extractor_min_score) {
            errors.push(format!(
                "category '{name}': article_extractor_min_score must be in [0, 1]"
            ));
        }
    }

    if config.default_category.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "default_category".into(),
            hint: "callers must always specify --category explicitly".into(),
        });
    }
    if config.specdb_path.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "specdb_path".into(),
            hint: "billing ledger and route matrix will not persist across runs".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`.
///
/// Category maps are combined; on name collisions the overlay entry wins.
pub fn merge_configs(base: EngineConfig, overlay: EngineConfig) -> EngineConfig {
    let mut categories = base.categories;
    categories.extend(overlay.categories);
    EngineConfig {
        default_category: overlay.default_category.or(base.default_category),
        workspace_dir: overlay.workspace_dir.or(base.workspace_dir),
        log_level: overlay.log_level.or(base.log_level),
        specdb_path: overlay.specdb_path.or(base.specdb_path),
        billing_ledger_dir: overlay.billing_ledger_dir.or(base.billing_ledger_dir),
        helper_files_root: overlay.helper_files_root.or(base.helper_files_root),
        categories,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = EngineConfig::default();
        let warnings = validate_config(&cfg).expect("default config should be valid");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn default_config_has_sensible_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
        assert!(cfg.categories.is_empty());
    }

    #[test]
    fn parse_valid_toml_string() {
        let toml = r#"
            default_category = "mice"
            log_level = "debug"
            specdb_path = "/var/lib/specfactory/spec.db"

            [categories.mice]
            approved_hosts = ["*.logitechg.com"]

            [categories.mice.planner]
            max_urls_per_product = 30
            max_pages_per_domain = 4
            max_run_seconds = 1800
            fetch_concurrency = 4

            [categories.mice.llm_budget]
            monthly_budget_usd = 100.0
            per_product_budget_usd = 1.5
            max_calls_per_product_total = 20
            max_calls_per_round = 8
        "#;
        let cfg = parse_toml(toml).unwrap();
        assert_eq!(cfg.default_category.as_deref(), Some("mice"));
        assert_eq!(cfg.categories.len(), 1);
        assert_eq!(cfg.categories["mice"].planner.max_urls_per_product, 30);
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let bad = "this is [not valid toml =";
        let err = parse_toml(bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn validation_catches_invalid_log_level() {
        let cfg = EngineConfig {
            log_level: Some("verbose".into()),
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn validation_catches_zero_url_limit() {
        let mut cfg = EngineConfig::default();
        let mut category = CategoryConfig::default();
        category.planner.max_urls_per_product = 0;
        category.llm_budget = LlmBudgetConfig::default();
        cfg.categories.insert("mice".into(), category);
        let err = validate_config(&cfg).unwrap_err();
        match err {
            ConfigError::ValidationError { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("max_urls_per_product")));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn validation_catches_non_positive_budget() {
        let mut cfg = EngineConfig::default();
        let mut category = CategoryConfig {
            planner: PlannerLimitsConfig::default(),
            ..Default::default()
        };
        category.llm_budget.monthly_budget_usd = 0.0;
        cfg.categories.insert("mice".into(), category);
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn large_budget_produces_warning() {
        let mut cfg = EngineConfig {
            default_category: Some("mice".into()),
            specdb_path: Some("/tmp/spec.db".into()),
            ..Default::default()
        };
        let mut category = CategoryConfig {
            planner: PlannerLimitsConfig::default(),
            ..Default::default()
        };
        category.llm_budget.monthly_budget_usd = 10_000.0;
        cfg.categories.insert("mice".into(), category);
        let warnings = validate_config(&cfg).unwrap();
        assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::LargeBudget { .. })));
    }

    #[test]
    fn merge_overlay_overrides_base() {
        let base = EngineConfig {
            default_category: Some("mice".into()),
            log_level: Some("info".into()),
            ..Default::default()
        };
        let overlay = EngineConfig {
            default_category: Some("keyboards".into()),
            log_level: None,
            ..Default::default()
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.default_category.as_deref(), Some("keyboards"));
        assert_eq!(merged.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn merge_combines_category_maps() {
        let base = EngineConfig {
            categories: BTreeMap::from([("mice".into(), CategoryConfig::default())]),
            ..Default::default()
        };
        let overlay = EngineConfig {
            categories: BTreeMap::from([("keyboards".into(), CategoryConfig::default())]),
            ..Default::default()
        };
        let merged = merge_configs(base, overlay);
        assert!(merged.categories.contains_key("mice"));
        assert!(merged.categories.contains_key("keyboards"));
    }

    #[test]
    fn merge_overlay_category_wins_on_collision() {
        let mut base_category = CategoryConfig::default();
        base_category.planner.max_urls_per_product = 10;
        let mut overlay_category = CategoryConfig::default();
        overlay_category.planner.max_urls_per_product = 99;
        let base = EngineConfig {
            categories: BTreeMap::from([("mice".into(), base_category)]),
            ..Default::default()
        };
        let overlay = EngineConfig {
            categories: BTreeMap::from([("mice".into(), overlay_category)]),
            ..Default::default()
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.categories["mice"].planner.max_urls_per_product, 99);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = EngineConfig {
            default_category: Some("mice".into()),
            workspace_dir: Some("/ws".into()),
            log_level: Some("debug".into()),
            specdb_path: Some("/spec.db".into()),
            billing_ledger_dir: Some("/billing".into()),
            helper_files_root: Some("/helpers".into()),
            categories: BTreeMap::from([("mice".into(), CategoryConfig::default())]),
        };
        let serialized = toml::to_string(&cfg).unwrap();
        let deserialized: EngineConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specfactory.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "default_category = \"mice\"\nlog_level = \"warn\"").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.default_category.as_deref(), Some("mice"));
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/specfactory.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn load_none_returns_default() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError::FileNotFound { path: "/foo".into() };
        assert!(e.to_string().contains("/foo"));
        let e = ConfigError::ParseError { reason: "bad toml".into() };
        assert!(e.to_string().contains("bad toml"));
    }

    #[test]
    fn config_warning_display() {
        let w = ConfigWarning::DeprecatedField {
            field: "old_field".into(),
            suggestion: Some("new_field".into()),
        };
        assert!(w.to_string().contains("new_field"));
        let w = ConfigWarning::LargeBudget {
            category: "mice".into(),
            usd: 9999.0,
        };
        assert!(w.to_string().contains("9999"));
    }

    #[test]
    fn env_config_applies_defaults_when_unset_and_does_not_panic() {
        // Reading the real process environment here; we only assert the
        // function succeeds and produces a well-formed snapshot.
        let env = EnvConfig::from_env();
        assert!(env.is_ok());
    }

    #[test]
    fn env_config_apply_to_category_creates_entry() {
        let env = EnvConfig {
            max_urls_per_product: Some(25),
            max_pages_per_domain: None,
            max_run_seconds: None,
            fetch_concurrency: None,
            dynamic_fetch_policy_map: None,
            llm_monthly_budget_usd: Some(42.0),
            llm_per_product_budget_usd: None,
            llm_max_calls_per_product_total: None,
            llm_max_calls_per_round: None,
            llm_disable_budget_guards: false,
            structured_metadata_enabled: false,
            structured_metadata_url: None,
            article_extractor_min_score: None,
            scanned_pdf_ocr_enabled: false,
            helper_files_root: None,
        };
        let mut cfg = EngineConfig::default();
        env.apply_to_category(&mut cfg, "mice");
        assert_eq!(cfg.categories["mice"].planner.max_urls_per_product, 25);
        assert_eq!(cfg.categories["mice"].llm_budget.monthly_budget_usd, 42.0);
    }
}
