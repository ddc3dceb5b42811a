// SPDX-License-Identifier: MIT OR Apache-2.0
//! Round controller: drives one [`ProductJob`] through discovery, fetch,
//! extraction, consensus, and the gates, round by round (`spec.md` §4.1).

use crate::cancel::CancellationToken;
use crate::identity::score_source;
use crate::pools::Pools;
use crate::stop::{evaluate_stop, StopCheckInputs, StopReason};

use specfactory_capability::{BlobStorage, Fetcher, LlmClient, StructuredMetadataParser};
use specfactory_config::CategorySchema;
use specfactory_consensus::{apply_constraints, evaluate_field, CrossFieldConstraint};
use specfactory_extract::{
    extract_definitions, extract_inline_kv, extract_json_candidates, extract_structured_metadata,
    extract_tables, extract_windows, pack_from_candidates, readability_score, LlmFieldEmission,
    StructuredMetadataFormat, READABILITY_THRESHOLD,
};
use specfactory_fetch::{FetchResult, FetchScheduler, SchedulerConfig};
use specfactory_gates::{
    evaluate_identity_gate, evaluate_quality_gate, GateAuditor, IdentityGateDecision,
    QualityGateReport,
};
use specfactory_llm::{verification, BudgetGuard, CallOutcome, CallRequest, LedgerSink, LlmRouter, PricingTable};
use specfactory_needset::{compute_needset, plan_queries};
use specfactory_planner::{HelperDatabase, PlannerLimits, SourcePlanner};
use specfactory_provenance::ProvenanceTracker;
use specfactory_routematrix::{RouteMatrix, RouteQuery};
use specfactory_specdb::SpecDb;
use specfactory_telemetry::{MetricsCollector, RoundMetrics};
use specfactory_types::{BillingEntry, Candidate, EvidencePack, FetchMethod, Provenance, ProductJob, Source};

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one completed round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    /// Round number, 0-indexed.
    pub round: u32,
    /// Why the controller stopped after this round, if it did.
    pub stop_reason: Option<StopReason>,
    /// Current identity gate decision.
    pub identity_decision: IdentityGateDecision,
    /// Current quality gate report.
    pub quality: QualityGateReport,
    /// Resolved provenance for every field touched so far.
    pub provenance: BTreeMap<String, Provenance>,
}

impl RoundSummary {
    /// `true` once the controller should stop producing further rounds.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.stop_reason.is_some()
    }
}

/// Collaborators and policy the round controller needs, beyond the
/// `ProductJob` itself.
pub struct ControllerConfig {
    /// Category field contracts.
    pub schema: CategorySchema,
    /// Host allow/deny lists for this category.
    pub approved_hosts: Vec<String>,
    /// Host deny list, checked before approved hosts.
    pub denied_hosts: Vec<String>,
    /// Planner limits (URL/page/time caps).
    pub planner_limits: PlannerLimits,
    /// Maximum extraction/consensus rounds before `max_rounds_reached`.
    pub max_rounds: u32,
    /// Marginal-yield rule threshold (`spec.md` §4.1).
    pub marginal_yield_threshold: f64,
    /// Cross-field constraints checked after consensus (`spec.md` §4.6 step 6).
    pub constraints: Vec<CrossFieldConstraint>,
    /// LLM budget and pricing policy.
    pub budget: BudgetGuard,
    /// Pricing table used to compute call cost.
    pub pricing: PricingTable,
    /// Run identifier, used to namespace Spec DB rows.
    pub run_id: String,
    /// LLM provider name recorded on every billing entry.
    pub llm_provider: String,
    /// Fraction of rounds sampled for verification-mode re-dispatch, in
    /// `[0, 1]`. `0.0` disables verification mode entirely.
    pub verification_sample_rate: f64,
}

/// Orchestrates one product job from round 0 until a stop condition fires.
pub struct RoundController {
    job: ProductJob,
    config: ControllerConfig,
    pools: Pools,
    specdb: SpecDb,
    fetcher: Arc<dyn Fetcher>,
    metadata_parser: Arc<dyn StructuredMetadataParser>,
    llm_client: Arc<dyn LlmClient>,
    llm_router: LlmRouter,
    ledger: Arc<dyn LedgerSink>,
    storage: Arc<dyn BlobStorage>,
    route_matrix: RouteMatrix,
    planner: SourcePlanner,
    provenance_tracker: ProvenanceTracker,
    gate_auditor: GateAuditor,
    metrics: MetricsCollector,
    cancel_token: CancellationToken,
    round: u32,
}

impl RoundController {
    /// Build a controller and the round-0 discovery queue for `job`.
    ///
    /// `helpers` is only consulted here, to seed the discovery queue with a
    /// lab-database source when one matches; the controller keeps no
    /// reference to it afterward.
    ///
    /// # Errors
    /// Returns an error if the host-policy globs in `config` are invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job: ProductJob,
        config: ControllerConfig,
        fetcher: Arc<dyn Fetcher>,
        metadata_parser: Arc<dyn StructuredMetadataParser>,
        llm_client: Arc<dyn LlmClient>,
        ledger: Arc<dyn LedgerSink>,
        storage: Arc<dyn BlobStorage>,
        route_matrix: RouteMatrix,
        specdb: SpecDb,
        helpers: &dyn HelperDatabase,
        cancel_token: CancellationToken,
    ) -> anyhow::Result<Self> {
        let planner = SourcePlanner::plan(
            &job,
            config.planner_limits.clone(),
            &config.approved_hosts,
            &config.denied_hosts,
            helpers,
        )?;
        let required_fields = job.requirements.required_fields.clone();
        Ok(Self {
            llm_router: LlmRouter::new(config.pricing.clone()),
            job,
            config,
            pools: Pools::default(),
            specdb,
            fetcher,
            metadata_parser,
            llm_client,
            ledger,
            storage,
            route_matrix,
            planner,
            provenance_tracker: ProvenanceTracker::new(required_fields),
            gate_auditor: GateAuditor::new(),
            metrics: MetricsCollector::new(),
            cancel_token,
            round: 0,
        })
    }

    /// A clone of this controller's cancellation token. Cancelling it (from
    /// a signal handler or an API call racing a [`Self::run`] in progress)
    /// stops the controller before its next round rather than mid-round.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run rounds until a stop condition fires or the cancellation token is
    /// signalled, returning every round's summary in order. A cancellation
    /// that lands between rounds ends the run without an extra
    /// [`RoundSummary`] — the caller distinguishes "stopped" from
    /// "cancelled" by checking `cancellation_token().is_cancelled()`.
    pub async fn run(&mut self) -> anyhow::Result<Vec<RoundSummary>> {
        let mut summaries = Vec::new();
        loop {
            if self.cancel_token.is_cancelled() {
                break;
            }
            let summary = self.run_round().await?;
            let terminal = summary.is_terminal();
            summaries.push(summary);
            if terminal {
                break;
            }
        }
        Ok(summaries)
    }

    /// Run one round: fetch the next batch of planned sources, extract and
    /// persist candidates, re-run consensus over the accumulated set, and
    /// evaluate the gates and stop conditions.
    async fn run_round(&mut self) -> anyhow::Result<RoundSummary> {
        let started = Instant::now();
        self.config.budget.start_round();
        let mut sources_fetched = 0u64;
        let mut sources_failed = 0u64;
        let mut candidates_promoted = 0u64;
        let errors_count = 0u64;
        let mut llm_calls = 0u64;
        let mut round_packs: Vec<(String, String, EvidencePack)> = Vec::new();

        while self.planner.has_next() {
            let Some(planned) = self.planner.next() else { break };
            if planned.synthetic {
                continue;
            }

            let source_id = format!(
                "{}::{}::{}::{}",
                self.job.category, self.job.product_id, planned.host, self.config.run_id
            );
            let _permit = self.pools.acquire_fetch().await;
            let scheduler = FetchScheduler::new(self.fetcher.clone(), SchedulerConfig::default());
            let (result, _telemetry) = scheduler
                .fetch_source(&source_id, &planned.url, &planned.host, FetchMethod::Http)
                .await;
            drop(_permit);

            let page = match result {
                FetchResult::Fetched(page) => page,
                FetchResult::Failed { outcome } => {
                    warn!(source = %planned.url, ?outcome, "source fetch failed");
                    sources_failed += 1;
                    continue;
                }
            };
            sources_fetched += 1;

            let _parse_permit = self.pools.acquire_parse().await;
            let source = Source {
                source_id: source_id.clone(),
                url: planned.url.clone(),
                final_url: page.final_url.clone(),
                host: planned.host.clone(),
                root_domain: planned.host.clone(),
                tier: planned.tier,
                role: planned.role.clone(),
                fetched_at: chrono::Utc::now().to_rfc3339(),
                http_status: page.http_status,
                fetch_method: FetchMethod::Http,
                content_hash: specfactory_evidence::content_hash(&page.body),
                text_hash: specfactory_evidence::text_hash(&String::from_utf8_lossy(&page.body)),
            };

            let html = String::from_utf8_lossy(&page.body).into_owned();
            let mut candidates = self.extract_deterministic(&source, &html).await;
            let pack = pack_from_candidates(
                &source_id,
                20_000,
                &mut candidates,
                &source.content_hash,
                &source.text_hash,
            );
            candidates_promoted += candidates.len() as u64;
            let pack_bytes = serde_json::to_vec(&pack)?;
            self.storage.put(&format!("evidence/{}/{source_id}.json", self.config.run_id), &pack_bytes).await?;
            round_packs.push((source_id.clone(), planned.host.clone(), pack));

            self.specdb
                .insert_source(&source, &self.job.category, &self.job.product_id, &self.config.run_id)
                .await?;
            for candidate in &candidates {
                self.specdb
                    .insert_candidate(
                        candidate,
                        &self.job.category,
                        &self.job.product_id,
                        &self.config.run_id,
                        self.round,
                    )
                    .await?;
                for snippet_id in &candidate.evidence_refs {
                    self.specdb.insert_evidence_ref(&candidate.candidate_id, &source_id, snippet_id).await?;
                }
            }

            self.planner.discover_from_html(&planned.url, &html);
        }

        let (provenance, identity_report, violated) = self.resolve_consensus().await?;
        let anchor_conflict = identity_report.decision.suppresses_non_identity_fields();

        let quality = evaluate_quality_gate(
            &provenance,
            &self.job.requirements,
            &self.config.schema.non_editorial_fields,
            identity_report.identity_confidence,
            anchor_conflict,
        );
        self.gate_auditor.record(self.round, identity_report.decision.clone(), identity_report.identity_confidence, &quality);

        if verification::should_sample(&self.config.run_id, self.round, self.config.verification_sample_rate) {
            self.sample_and_reverify_round(&provenance, &round_packs).await?;
        }

        let delta = self.provenance_tracker.record_round(self.round, provenance.clone()).clone();
        let marginal_yield = self.provenance_tracker.marginal_yield_reached(self.config.marginal_yield_threshold);
        let budget_exhausted = self.config.budget.check(true) != specfactory_llm::BudgetDecision::Allow;

        let stop_reason = evaluate_stop(&StopCheckInputs {
            identity_conflict: matches!(identity_report.decision, IdentityGateDecision::IdentityConflict { .. }),
            quality_satisfied: quality.validated,
            budget_exhausted,
            marginal_yield,
            next_round: self.round + 1,
            max_rounds: self.config.max_rounds,
        });

        if stop_reason.is_none() {
            let needset = compute_needset(
                &self.config.schema.field_plans,
                &provenance,
                &violated,
            );
            let _queries = plan_queries(&self.job, &needset, &self.config.schema.search_templates, &|_| Vec::new());

            for row in &needset {
                let essential = row.force_high || row.required_level == "required";
                for (source_id, host, pack) in &round_packs {
                    let Some((payload, valid_snippet_ids)) = llm_payload_for(pack, &row.field) else { continue };
                    llm_calls += 1;
                    let escalated = self
                        .dispatch_llm_field(
                            &row.field,
                            &row.required_level,
                            payload,
                            essential,
                            host,
                            source_id,
                            &valid_snippet_ids,
                            row.min_evidence_refs,
                        )
                        .await?;
                    for candidate in &escalated {
                        self.specdb
                            .insert_candidate(candidate, &self.job.category, &self.job.product_id, &self.config.run_id, self.round)
                            .await?;
                        for snippet_id in &candidate.evidence_refs {
                            self.specdb.insert_evidence_ref(&candidate.candidate_id, source_id, snippet_id).await?;
                        }
                    }
                    candidates_promoted += escalated.len() as u64;
                }
            }
        }

        self.metrics.record(RoundMetrics {
            product_id: self.job.product_id.clone(),
            round: self.round,
            duration_ms: started.elapsed().as_millis() as u64,
            sources_fetched,
            sources_failed,
            llm_calls,
            llm_budget_guard_blocked: 0,
            llm_cost_usd: self.config.budget.product_cost_usd(),
            candidates_promoted,
            fields_gained: delta.fields_gained as u64,
            errors_count,
        });

        info!(
            product_id = %self.job.product_id,
            round = self.round,
            stop_reason = ?stop_reason.map(StopReason::as_str),
            validated = quality.validated,
            "round_summary"
        );

        let summary = RoundSummary {
            round: self.round,
            stop_reason,
            identity_decision: identity_report.decision,
            quality,
            provenance,
        };
        self.round += 1;
        Ok(summary)
    }

    /// Run every deterministic (non-LLM) extraction method over one fetched
    /// page: structured metadata via the sidecar parser, DOM tables/
    /// definitions, and readability-gated article windows.
    async fn extract_deterministic(&self, source: &Source, html: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        let fetched_page = specfactory_capability::FetchedPage {
            final_url: source.final_url.clone(),
            http_status: source.http_status,
            body: html.as_bytes().to_vec(),
            outcome: specfactory_types::FetchOutcome::Ok,
        };
        if let Ok(Some(payload)) = self.metadata_parser.parse(&source.url, &fetched_page).await {
            candidates.extend(extract_structured_metadata(
                Some(&payload),
                &self.config.schema.field_pointers,
                StructuredMetadataFormat::JsonLd,
                &source.source_id,
            ));
        }

        if let Ok(payload) = serde_json::from_str::<serde_json::Value>(html) {
            candidates.extend(extract_json_candidates(
                &payload,
                &self.config.schema.field_pointers,
                specfactory_types::CandidateMethod::NetworkJson,
                &source.source_id,
            ));
        }

        candidates.extend(extract_tables(html, &source.source_id));
        candidates.extend(extract_definitions(html, &source.source_id));
        candidates.extend(extract_inline_kv(html, "dl, table", &source.source_id));

        let text = html_to_text(html);
        let heading_count = html.matches("<h").count();
        if readability_score(&text, heading_count) >= READABILITY_THRESHOLD {
            let field_tokens: Vec<&str> = self
                .job
                .requirements
                .required_fields
                .iter()
                .map(String::as_str)
                .collect();
            candidates.extend(extract_windows(&text, &field_tokens, 400, &source.source_id));
        }

        candidates
    }

    /// Re-run consensus over every candidate accumulated so far (all
    /// rounds), one field at a time, applying cross-field constraints
    /// afterward, then re-score identity against the resulting provenance.
    ///
    /// Identity is scored twice against the same per-source signals: once
    /// provisionally (`anchor_conflict = false`) to seed `evaluate_field`'s
    /// `identity_confidence` input, and once finally once the provenance
    /// that scoring produced is known to carry an `anchor_conflict` reason
    /// or not. Both passes reuse one `list_all_candidates` fetch.
    async fn resolve_consensus(
        &self,
    ) -> anyhow::Result<(BTreeMap<String, Provenance>, specfactory_gates::IdentityGateReport, HashSet<String>)> {
        let sources: BTreeMap<String, Source> = self
            .specdb
            .list_sources(&self.job.category, &self.job.product_id, &self.config.run_id)
            .await?
            .into_iter()
            .map(|s| (s.source_id.clone(), s))
            .collect();
        let approved_domains: HashSet<String> = self.config.approved_hosts.iter().cloned().collect();

        let all_candidates = self
            .specdb
            .list_all_candidates(&self.job.category, &self.job.product_id, &self.config.run_id)
            .await?;
        let mut by_source: BTreeMap<&str, Vec<&Candidate>> = BTreeMap::new();
        let mut by_field: BTreeMap<&str, Vec<Candidate>> = BTreeMap::new();
        for candidate in &all_candidates {
            by_source.entry(candidate.source_id.as_str()).or_default().push(candidate);
            by_field.entry(candidate.field.as_str()).or_default().push(candidate.clone());
        }

        let identity_scores: Vec<specfactory_gates::SourceIdentityScore> = sources
            .values()
            .map(|source| {
                let empty = Vec::new();
                let relevant = by_source.get(source.source_id.as_str()).unwrap_or(&empty);
                let relevant: Vec<Candidate> = relevant.iter().map(|c| (*c).clone()).collect();
                score_source(source, &relevant, &self.job.identity_lock, &self.job.anchors)
            })
            .collect();
        let matched_sources: HashSet<String> = identity_scores
            .iter()
            .filter(|s| s.matches())
            .map(|s| s.source_id.clone())
            .collect();
        let provisional_report = evaluate_identity_gate(&self.job.identity_lock, &identity_scores, false);

        let mut provenance = BTreeMap::new();
        let empty = Vec::new();
        for rule in &self.config.schema.field_rules {
            let candidates = by_field.get(rule.field.as_str()).unwrap_or(&empty);
            let field_provenance = evaluate_field(
                rule,
                candidates,
                &sources,
                &approved_domains,
                &matched_sources,
                &self.job.anchors,
                provisional_report.identity_confidence,
            );
            provenance.insert(rule.field.clone(), field_provenance);
        }

        let violated = apply_constraints(&mut provenance, &self.config.constraints);
        if !violated.is_empty() {
            warn!(?violated, "cross_field_constraint_violated");
        }

        let anchor_conflict = provenance
            .values()
            .any(|p| p.reasoning.reasons.iter().any(|r| r == "anchor_conflict"));
        let identity_report = evaluate_identity_gate(&self.job.identity_lock, &identity_scores, anchor_conflict);

        Ok((provenance, identity_report, violated.into_iter().collect()))
    }

    /// If this round falls in the verification sample, re-dispatch one
    /// resolved field's LLM route against the evidence pack that produced
    /// it and record the resulting disagreement delta to blob storage.
    ///
    /// Tries fields in schema order and stops at the first one with both a
    /// known scalar value and a pack hinting it — samples at most one field
    /// per sampled round. The delta is written for operators to inspect;
    /// `provenance` itself is never touched (`spec.md` §4.9).
    async fn sample_and_reverify_round(
        &self,
        provenance: &BTreeMap<String, Provenance>,
        round_packs: &[(String, String, EvidencePack)],
    ) -> anyhow::Result<()> {
        for rule in &self.config.schema.field_rules {
            let Some(known_value) = provenance.get(&rule.field).and_then(|p| match &p.value {
                specfactory_types::FieldValue::Scalar { value } => Some(value.clone()),
                _ => None,
            }) else {
                continue;
            };
            let Some((payload, _)) = round_packs.iter().find_map(|(_, _, pack)| llm_payload_for(pack, &rule.field)) else {
                continue;
            };

            let baseline = BTreeMap::from([(rule.field.clone(), known_value)]);
            let delta = verification::sample_and_reverify(
                &self.llm_router,
                &self.route_matrix,
                &self.config.budget,
                self.llm_client.as_ref(),
                &rule.field,
                &rule.required_level,
                payload,
                &baseline,
            )
            .await?;

            if let Some(delta) = delta {
                let key = verification::verification_key(&self.config.run_id, self.round, &rule.field);
                self.storage.put(&key, &serde_json::to_vec(&delta)?).await?;
                info!(
                    field = %rule.field,
                    round = self.round,
                    disagreements = delta.disagreements().len(),
                    "verification_sample_recorded"
                );
            }
            return Ok(());
        }
        Ok(())
    }

    /// Resolve an LLM route for `field`, dispatch through the router, and
    /// turn a successful response's `candidates` array into extracted
    /// candidates attributed to `source_id`. No ledger entry is recorded
    /// unless the call actually dispatched (an unmatched route, a budget
    /// block, or a capability mismatch all cost nothing).
    async fn dispatch_llm_field(
        &self,
        field: &str,
        required_level: &str,
        payload: serde_json::Value,
        essential: bool,
        host: &str,
        source_id: &str,
        valid_snippet_ids: &HashSet<String>,
        min_evidence_refs_required: u32,
    ) -> anyhow::Result<Vec<Candidate>> {
        let _permit = self.pools.acquire_llm().await;
        let query = RouteQuery { field, scope: specfactory_types::RouteScope::Scalar, required_level };
        let evidence_chars = payload.to_string().len();
        let outcome = self
            .llm_router
            .dispatch(&self.route_matrix, &self.config.budget, self.llm_client.as_ref(), CallRequest { query, payload, essential })
            .await;

        let CallOutcome::Dispatched { response, cost_usd, model, usage } = outcome else {
            return Ok(Vec::new());
        };

        let now = chrono::Utc::now();
        self.ledger
            .append(&BillingEntry {
                ts: now.to_rfc3339(),
                month: now.format("%Y-%m").to_string(),
                day: now.format("%d").to_string().parse().unwrap_or(1),
                provider: self.config.llm_provider.clone(),
                model,
                category: self.job.category.clone(),
                product_id: self.job.product_id.clone(),
                run_id: self.config.run_id.clone(),
                round: self.round,
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                cached_prompt_tokens: usage.cached_prompt_tokens,
                cost_usd,
                reason: format!("extract:{field}"),
                host: host.to_string(),
                evidence_chars: evidence_chars as u32,
                estimated_usage: false,
            })
            .await?;

        let emissions: Vec<LlmFieldEmission> = response
            .get("candidates")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(parse_llm_emission).collect())
            .unwrap_or_default();
        Ok(specfactory_extract::extract_llm_candidates(
            &emissions,
            valid_snippet_ids,
            min_evidence_refs_required,
            source_id,
        ))
    }
}

/// Collect one pack's snippets hinted at `field` into an LLM payload, or
/// `None` if the pack has nothing relevant (nothing to escalate).
fn llm_payload_for(pack: &EvidencePack, field: &str) -> Option<(serde_json::Value, HashSet<String>)> {
    let mut valid_snippet_ids = HashSet::new();
    let mut snippets = Vec::new();
    for snippet in &pack.snippets {
        if snippet.field_hints.iter().any(|hint| hint == field) {
            valid_snippet_ids.insert(snippet.id.clone());
            snippets.push(serde_json::json!({"id": snippet.id, "text": snippet.text}));
        }
    }
    if snippets.is_empty() {
        return None;
    }
    Some((serde_json::json!({"field": field, "snippets": snippets}), valid_snippet_ids))
}

/// Parse one entry of an LLM response's `candidates` array into a field
/// emission. `LlmFieldEmission` carries no `Deserialize` impl since its
/// `shape` field must be validated against the category schema rather than
/// trusted verbatim from the model.
fn parse_llm_emission(value: &serde_json::Value) -> Option<LlmFieldEmission> {
    let field = value.get("field")?.as_str()?.to_string();
    let shape = match value.get("shape")?.as_str()? {
        "scalar" => specfactory_types::FieldShape::Scalar,
        "list" => specfactory_types::FieldShape::List,
        "component" => specfactory_types::FieldShape::Component,
        _ => return None,
    };
    let emitted_value = value.get("value")?.clone();
    let evidence_refs = value
        .get("evidence_refs")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    Some(LlmFieldEmission { field, shape, value: emitted_value, evidence_refs })
}

/// Strip HTML tags down to whitespace-joined text for readability scoring
/// and article-window extraction. Not a full DOM parse — just enough to
/// feed the downstream text-based extractors.
fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_to_text_strips_tags() {
        let text = html_to_text("<p>Weight: <b>63 g</b></p>");
        assert!(text.contains("Weight:"));
        assert!(text.contains("63 g"));
        assert!(!text.contains('<'));
    }
}
