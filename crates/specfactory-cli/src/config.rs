// SPDX-License-Identifier: MIT OR Apache-2.0
//! Config resolution: merge the TOML engine config, the `spec.md` §6.5
//! environment overlay, and a category's field schema into what a round
//! controller needs to run.

use anyhow::{Context, Result};
use clap::ValueEnum;
use specfactory_config::{
    load_category_schema, load_config, CategoryConfig, CategorySchema, EngineConfig, EnvConfig,
};
use std::path::Path;

/// Round-count posture requested on the command line (`spec.md` §4.1: "round
/// 0 is a fast pass... execute up to `max_rounds`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum Mode {
    /// Round 0 only — tier 1+2 sources, no LLM escalation.
    Fast,
    /// Up to 4 rounds.
    Balanced,
    /// Up to 8 rounds, the ceiling `run-until-complete` raises further with
    /// `--max-rounds`.
    Aggressive,
}

impl Mode {
    /// Default round cap for this mode.
    #[must_use]
    pub fn default_max_rounds(self) -> u32 {
        match self {
            Mode::Fast => 1,
            Mode::Balanced => 4,
            Mode::Aggressive => 8,
        }
    }
}

/// Everything resolved from the engine config, category config, and schema
/// for one category, ready to feed a [`specfactory_runtime::ControllerConfig`].
#[derive(Debug)]
pub struct EngineSetup {
    /// Parsed top-level engine config (workspace dir, Spec DB path, etc.).
    pub engine: EngineConfig,
    /// This category's host policy, planner limits, and LLM budget.
    pub category_config: CategoryConfig,
    /// This category's field rules, route matrix, and search templates.
    pub schema: CategorySchema,
}

/// Load and merge the engine config, environment overlay, and category
/// schema for `category`. Config warnings are logged, not fatal.
pub fn load_engine_setup(category: &str, config_path: Option<&Path>, schema_path: &Path) -> Result<EngineSetup> {
    let mut engine = load_config(config_path).context("load engine config")?;

    let env = EnvConfig::from_env().context("read spec.md §6.5 environment overrides")?;
    env.apply_to_category(&mut engine, category);

    for warning in specfactory_config::validate_config(&engine).context("validate engine config")? {
        tracing::warn!(%warning, "config warning");
    }

    let category_config = engine.categories.get(category).cloned().unwrap_or_default();
    let schema = load_category_schema(schema_path)
        .with_context(|| format!("load category schema from {}", schema_path.display()))?;

    Ok(EngineSetup { engine, category_config, schema })
}

/// Split a `--product-key` of the form `category/product_id` into its two
/// parts.
pub fn parse_product_key(key: &str) -> Result<(String, String)> {
    let (category, product_id) = key
        .split_once('/')
        .with_context(|| format!("product key '{key}' must be 'category/product_id'"))?;
    if category.is_empty() || product_id.is_empty() {
        anyhow::bail!("product key '{key}' must be 'category/product_id'");
    }
    Ok((category.to_string(), product_id.to_string()))
}

/// Deterministic `product_id` slug for a brand/model pair, matching the
/// convention product JSON files are keyed under (`spec.md` §6.1/§6.2):
/// lowercase, words joined by hyphens, everything but alphanumerics dropped.
#[must_use]
pub fn slugify_product_id(brand: &str, model: &str) -> String {
    format!("{brand} {model}")
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
