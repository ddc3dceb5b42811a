// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand bodies: wires the config loaders in [`crate::config`] into a
//! live [`RoundController`], and handles the two read-only reporting
//! commands against whatever a prior run left in blob storage.

use crate::config::{load_engine_setup, parse_product_key, slugify_product_id, Mode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use specfactory_capability::BlobStorage;
use specfactory_config::CategorySchema;
use specfactory_fetch::{HttpFetcher, NullMetadataParser, SidecarMetadataParser};
use specfactory_gates::{IdentityGateDecision, QualityGateReport};
use specfactory_llm::{ledger_key, BudgetGuard, BudgetLimits, HttpLlmClient, MonthlyCostTracker, PricingTable};
use specfactory_needset::{assign_unknown_reason, compute_needset, EffortSpent};
use specfactory_planner::{NoHelperDatabase, PlannerLimits};
use specfactory_routematrix::RouteMatrix;
use specfactory_runtime::{exit_code, CancellationToken, ControllerConfig, RoundController, RoundSummary, StopReason};
use specfactory_specdb::SpecDb;
use specfactory_storage::{input_key, latest_key, run_artifact_key, Codec, FileBlobStorage, NdjsonLedgerSink, RunStage};
use specfactory_types::{BillingEntry, ProductJob, Provenance};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marginal-yield threshold passed into [`ControllerConfig`]. Not currently
/// exposed through `EngineConfig`/`EnvConfig`; hardcoded here until the
/// config layer grows a field for it.
const MARGINAL_YIELD_THRESHOLD: f64 = 0.02;

/// The persisted shape of a finished run, written once per `run` /
/// `run-until-complete` invocation so `explain-unk` and operators have
/// something to read back without re-running the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Category this run belongs to.
    pub category: String,
    /// Product slug this run belongs to.
    pub product_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Number of rounds actually executed.
    pub rounds_run: u32,
    /// Why the run stopped, if it reached a terminal round.
    pub stop_reason: Option<StopReason>,
    /// Final identity gate decision.
    pub identity_decision: IdentityGateDecision,
    /// Final quality gate report.
    pub quality: QualityGateReport,
    /// Final per-field provenance.
    pub provenance: BTreeMap<String, Provenance>,
}

impl RunRecord {
    fn from_summaries(category: &str, product_id: &str, run_id: &str, summaries: &[RoundSummary]) -> Option<Self> {
        let last = summaries.last()?;
        Some(Self {
            category: category.to_string(),
            product_id: product_id.to_string(),
            run_id: run_id.to_string(),
            rounds_run: summaries.len() as u32,
            stop_reason: last.stop_reason,
            identity_decision: last.identity_decision.clone(),
            quality: last.quality.clone(),
            provenance: last.provenance.clone(),
        })
    }
}

fn workspace_root(engine: &specfactory_config::EngineConfig) -> PathBuf {
    PathBuf::from(engine.workspace_dir.clone().unwrap_or_else(|| "./specfactory-data".to_string()))
}

fn specdb_path(engine: &specfactory_config::EngineConfig, root: &Path) -> String {
    engine
        .specdb_path
        .clone()
        .unwrap_or_else(|| root.join("specfactory.db").to_string_lossy().into_owned())
}

fn build_route_matrix(schema: &CategorySchema) -> RouteMatrix {
    let mut matrix = RouteMatrix::new();
    for rule in schema.route_matrix.clone() {
        matrix.add_rule(rule);
    }
    matrix
}

/// Run one product through the round controller until it stops, shared by
/// both `run` (bounded by `mode`) and `run-until-complete` (bounded by
/// `--max-rounds`, always at `aggressive` effort).
pub async fn execute_run(
    category: &str,
    product_id: &str,
    mode: Mode,
    max_rounds_override: Option<u32>,
    config_path: Option<&Path>,
    schema_path: &Path,
) -> Result<(Vec<RoundSummary>, u8)> {
    let setup = load_engine_setup(category, config_path, schema_path)?;
    let root = workspace_root(&setup.engine);
    let storage: Arc<dyn BlobStorage> = Arc::new(FileBlobStorage::new(root.clone(), Codec::Gzip));

    let job_bytes = storage
        .get(&input_key("inputs", category, product_id))
        .await?
        .with_context(|| format!("no input job found for {category}/{product_id}"))?;
    let job: ProductJob = serde_json::from_slice(&job_bytes).context("parse product job json")?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let max_rounds = max_rounds_override.unwrap_or_else(|| mode.default_max_rounds());

    let fetcher = Arc::new(HttpFetcher::default());

    let structured_metadata_enabled = std::env::var("STRUCTURED_METADATA_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let metadata_parser: Arc<dyn specfactory_capability::StructuredMetadataParser> =
        match (structured_metadata_enabled, std::env::var("STRUCTURED_METADATA_URL")) {
            (true, Ok(url)) => Arc::new(SidecarMetadataParser::new(url, std::time::Duration::from_secs(10))),
            _ => Arc::new(NullMetadataParser),
        };

    let supported_models =
        setup.schema.route_matrix.iter().flat_map(|rule| rule.decision.model_ladder.clone()).collect();
    let manifest = specfactory_capability::LlmCapabilityManifest {
        supported_models,
        websearch_supported: true,
        max_tokens_ceiling: 8192,
    };
    let llm_client = Arc::new(HttpLlmClient::new(
        std::env::var("LLM_ENDPOINT_URL").context("LLM_ENDPOINT_URL must be set to dispatch LLM calls")?,
        std::env::var("LLM_API_KEY").ok(),
        manifest,
        std::time::Duration::from_secs(60),
    ));

    let ledger = Arc::new(NdjsonLedgerSink::new(storage.clone()));
    let route_matrix = build_route_matrix(&setup.schema);
    let specdb = SpecDb::open(&specdb_path(&setup.engine, &root)).await?;

    let budget = BudgetGuard::new(
        BudgetLimits {
            max_calls_per_round: Some(setup.category_config.llm_budget.max_calls_per_round),
            max_calls_per_product: Some(setup.category_config.llm_budget.max_calls_per_product_total),
            product_budget_usd: Some(setup.category_config.llm_budget.per_product_budget_usd),
            monthly_budget_usd: Some(setup.category_config.llm_budget.monthly_budget_usd),
        },
        Arc::new(MonthlyCostTracker::new()),
    );

    let controller_config = ControllerConfig {
        schema: setup.schema.clone(),
        approved_hosts: setup.category_config.approved_hosts.clone(),
        denied_hosts: setup.category_config.denied_hosts.clone(),
        planner_limits: PlannerLimits {
            max_urls_per_product: setup.category_config.planner.max_urls_per_product,
            max_pages_per_domain: setup.category_config.planner.max_pages_per_domain,
            preferred_hosts: Vec::new(),
        },
        max_rounds,
        marginal_yield_threshold: MARGINAL_YIELD_THRESHOLD,
        constraints: Vec::new(),
        budget,
        pricing: PricingTable::empty(),
        run_id: run_id.clone(),
        llm_provider: std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "unknown".to_string()),
        verification_sample_rate: setup.category_config.verification_sample_rate,
    };

    let mut controller = RoundController::new(
        job,
        controller_config,
        fetcher,
        metadata_parser,
        llm_client,
        ledger,
        storage.clone(),
        route_matrix,
        specdb,
        &NoHelperDatabase,
        CancellationToken::new(),
    )?;

    let summaries = controller.run().await?;

    if let Some(record) = RunRecord::from_summaries(category, product_id, &run_id, &summaries) {
        let bytes = serde_json::to_vec_pretty(&record)?;
        storage
            .put(&run_artifact_key("outputs", category, product_id, &run_id, RunStage::Summary, "summary.json"), &bytes)
            .await?;
        storage.put(&latest_key("outputs", category, product_id, "summary.json"), &bytes).await?;
    }

    let code = summaries.last().and_then(|s| s.stop_reason).map(exit_code).unwrap_or(1);
    Ok((summaries, code))
}

/// `specfactory run --product-key <category>/<product_id> --mode <mode>`.
pub async fn cmd_run(
    product_key: &str,
    mode: Mode,
    config_path: Option<&Path>,
    schema_path: &Path,
) -> Result<(Vec<RoundSummary>, u8)> {
    let (category, product_id) = parse_product_key(product_key)?;
    let (summaries, code) = execute_run(&category, &product_id, mode, None, config_path, schema_path).await?;
    for summary in &summaries {
        tracing::info!(round = summary.round, validated = summary.quality.validated, "round complete");
    }
    Ok((summaries, code))
}

/// `specfactory run-until-complete --product-key <key> --max-rounds N`.
pub async fn cmd_run_until_complete(
    product_key: &str,
    max_rounds: u32,
    config_path: Option<&Path>,
    schema_path: &Path,
) -> Result<(Vec<RoundSummary>, u8)> {
    let (category, product_id) = parse_product_key(product_key)?;
    let (summaries, code) =
        execute_run(&category, &product_id, Mode::Aggressive, Some(max_rounds), config_path, schema_path).await?;
    for summary in &summaries {
        tracing::info!(round = summary.round, validated = summary.quality.validated, "round complete");
    }
    Ok((summaries, code))
}

/// Aggregate cost and call count for one model within a billing report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelTotals {
    /// Calls made against this model.
    pub calls: u64,
    /// Total prompt tokens billed.
    pub prompt_tokens: u64,
    /// Total completion tokens billed.
    pub completion_tokens: u64,
    /// Total cost in USD.
    pub cost_usd: f64,
}

/// `billing-report`'s aggregated result.
#[derive(Debug, Clone, Serialize)]
pub struct BillingReport {
    /// `YYYY-MM` the report covers.
    pub month: String,
    /// Total spend across every model.
    pub total_usd: f64,
    /// Total calls across every model.
    pub total_calls: u64,
    /// Per-model totals.
    pub by_model: BTreeMap<String, ModelTotals>,
}

/// `specfactory billing-report --month YYYY-MM`: aggregates the raw ndjson
/// ledger for `month` by model, since [`specfactory_llm::CostLedger`]'s
/// monthly rollup is not regenerated on every append.
pub async fn cmd_billing_report(month: &str, config_path: Option<&Path>) -> Result<BillingReport> {
    let engine = specfactory_config::load_config(config_path).context("load engine config")?;
    let root = workspace_root(&engine);
    let storage = FileBlobStorage::new(root, Codec::Gzip);

    let bytes = storage.get(&ledger_key(month)).await?.unwrap_or_default();
    let mut by_model: BTreeMap<String, ModelTotals> = BTreeMap::new();
    let mut total_usd = 0.0;
    let mut total_calls = 0u64;

    for line in bytes.split(|b| *b == b'\n') {
        if line.is_empty() {
            continue;
        }
        let entry: BillingEntry = serde_json::from_slice(line).context("parse billing ledger line")?;
        let totals = by_model.entry(entry.model.clone()).or_default();
        totals.calls += 1;
        totals.prompt_tokens += entry.prompt_tokens;
        totals.completion_tokens += entry.completion_tokens;
        totals.cost_usd += entry.cost_usd;
        total_usd += entry.cost_usd;
        total_calls += 1;
    }

    Ok(BillingReport { month: month.to_string(), total_usd, total_calls, by_model })
}

/// `explain-unk`'s result: one row per field still in the needset against
/// the most recently persisted run, with its assigned unknown reason.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainUnkRow {
    /// Field name.
    pub field: String,
    /// Deficit reason computed from the persisted provenance.
    pub deficit_reason: specfactory_types::DeficitReason,
    /// Terminal unknown-reason code assigned.
    pub unknown_reason: &'static str,
}

/// `specfactory explain-unk --category <cat> --brand <b> --model <m>`.
///
/// Approximation: no per-round `EffortSpent` or constraint-violation
/// history is persisted across rounds, so this re-derives `EffortSpent`
/// from the persisted run's round count and whether the category schema
/// defines any `search_templates`, and assumes no outstanding cross-field
/// constraint violations. A field genuinely blocked on a constraint is
/// reported as `not_found_after_search`/`not_publicly_disclosed` rather
/// than `conflicting_sources_unresolved` by this command alone.
pub async fn cmd_explain_unk(
    category: &str,
    brand: &str,
    model: &str,
    config_path: Option<&Path>,
    schema_path: &Path,
) -> Result<Vec<ExplainUnkRow>> {
    let setup = load_engine_setup(category, config_path, schema_path)?;
    let root = workspace_root(&setup.engine);
    let storage = FileBlobStorage::new(root, Codec::Gzip);

    let product_id = slugify_product_id(brand, model);
    let bytes = storage
        .get(&latest_key("outputs", category, &product_id, "summary.json"))
        .await?
        .with_context(|| format!("no persisted run found for {category}/{product_id}"))?;
    let record: RunRecord = serde_json::from_slice(&bytes).context("parse persisted run summary")?;

    let identity_locked = record.identity_decision.is_locked();
    let searches_issued = u32::from(!setup.schema.search_templates.is_empty());
    let effort = EffortSpent { rounds_attempted: record.rounds_run, searches_issued };

    let needset = compute_needset(&setup.schema.field_plans, &record.provenance, &HashSet::new());
    let rows = needset
        .into_iter()
        .map(|row| {
            let unknown_reason =
                assign_unknown_reason(row.deficit_reason, row.availability_class, effort, identity_locked);
            ExplainUnkRow { field: row.field, deficit_reason: row.deficit_reason, unknown_reason }
        })
        .collect();
    Ok(rows)
}
