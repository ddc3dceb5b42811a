//! Unified error taxonomy with stable error codes for the SpecFactory engine.
//!
//! Every error raised across the harvesting pipeline carries an
//! [`ErrorCode`] (a machine-readable, stable string tag), a human-readable
//! message, an optional cause chain, and arbitrary key-value context. The
//! same codes back `stop_reason`, `validated_reason`, and per-field
//! `unknown_reason` values surfaced in run summaries, so a code that appears
//! in a log line is the same code that appears in persisted output.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Fetch-stage failures (network, robots/ToS, bot challenges).
    Fetch,
    /// Extraction-stage failures (parse, shape mismatch).
    Extraction,
    /// Structured-metadata sidecar failures.
    Sidecar,
    /// LLM call and output-contract failures.
    Llm,
    /// Budget and cost-accounting failures.
    Budget,
    /// Identity locking / conflict failures.
    Identity,
    /// Consensus and quality-gate failures.
    Consensus,
    /// Configuration errors.
    Config,
    /// Storage / Spec DB write failures.
    Persistence,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Sidecar => "sidecar",
            Self::Llm => "llm",
            Self::Budget => "budget",
            Self::Identity => "identity",
            Self::Consensus => "consensus",
            Self::Config => "config",
            Self::Persistence => "persistence",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serializes to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases. Many of these codes
/// double as `stop_reason` / `unknown_reason` / `validated_reason` values in
/// `spec.md` §7 and §8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Fetch --
    /// Fetch outcome classified as blocked, rate-limited, or similar.
    FetchBlocked,
    /// Fetch exceeded the per-host/route deadline.
    FetchTimeout,
    /// All fetcher modes in the fallback ladder were exhausted.
    FetchFallbackExhausted,
    /// Source content looked like a login wall or paywall.
    FetchLoginWall,
    /// Source is excluded by robots.txt or terms of service.
    FetchBlockedByRobotsOrTos,

    // -- Extraction --
    /// An extractor raised an exception; isolated to that method.
    ExtractorException,
    /// Candidate value's shape did not match the field's declared shape.
    ShapeMismatchScalar,
    /// List-field candidate failed to parse as a list.
    ShapeMismatchList,
    /// Page extraction failed entirely (no method produced output).
    ParseFailure,

    // -- Sidecar --
    /// Structured-metadata sidecar did not respond in time; fail-open.
    SidecarUnavailable,

    // -- LLM --
    /// LLM output failed schema validation (non-JSON or missing fields).
    LlmSchemaViolation,
    /// LLM call exceeded its deadline.
    LlmTimeout,
    /// LLM candidate cited a snippet ID absent from the evidence pack.
    DanglingSnippetRef,

    // -- Budget --
    /// A per-round or per-product budget guard rejected a call.
    BudgetGuardBlocked,
    /// Cumulative product budget was exhausted.
    BudgetExhausted,
    /// Monthly budget was exhausted; only essential calls proceed.
    MonthlyBudgetExhausted,

    // -- Identity --
    /// Identity gate detected a major-anchor conflict with no eligible match.
    IdentityConflictFatal,
    /// Identity confidence is below the threshold for the source tier.
    IdentityAmbiguous,

    // -- Consensus --
    /// Winning cluster has fewer evidence refs than required.
    BelowMinEvidence,
    /// Two top clusters disagree and both carry tier-1 support.
    ConflictingSourcesUnresolved,
    /// A cross-field constraint was violated after consensus.
    ConstraintConflict,
    /// Candidate value violates a closed-enum vocabulary.
    EnumValueNotAllowed,
    /// Candidate value contradicts a hard anchor lock.
    AnchorConflict,

    // -- Config --
    /// Configuration file or value is invalid.
    ConfigInvalid,

    // -- Persistence --
    /// Storage or Spec DB write failed; fatal for the round.
    PipelineError,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FetchBlocked
            | Self::FetchTimeout
            | Self::FetchFallbackExhausted
            | Self::FetchLoginWall
            | Self::FetchBlockedByRobotsOrTos => ErrorCategory::Fetch,

            Self::ExtractorException
            | Self::ShapeMismatchScalar
            | Self::ShapeMismatchList
            | Self::ParseFailure => ErrorCategory::Extraction,

            Self::SidecarUnavailable => ErrorCategory::Sidecar,

            Self::LlmSchemaViolation | Self::LlmTimeout | Self::DanglingSnippetRef => {
                ErrorCategory::Llm
            }

            Self::BudgetGuardBlocked | Self::BudgetExhausted | Self::MonthlyBudgetExhausted => {
                ErrorCategory::Budget
            }

            Self::IdentityConflictFatal | Self::IdentityAmbiguous => ErrorCategory::Identity,

            Self::BelowMinEvidence
            | Self::ConflictingSourcesUnresolved
            | Self::ConstraintConflict
            | Self::EnumValueNotAllowed
            | Self::AnchorConflict => ErrorCategory::Consensus,

            Self::ConfigInvalid => ErrorCategory::Config,

            Self::PipelineError => ErrorCategory::Persistence,

            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation (e.g. `"FETCH_TIMEOUT"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchBlocked => "FETCH_BLOCKED",
            Self::FetchTimeout => "FETCH_TIMEOUT",
            Self::FetchFallbackExhausted => "FETCH_FALLBACK_EXHAUSTED",
            Self::FetchLoginWall => "FETCH_LOGIN_WALL",
            Self::FetchBlockedByRobotsOrTos => "FETCH_BLOCKED_BY_ROBOTS_OR_TOS",
            Self::ExtractorException => "EXTRACTOR_EXCEPTION",
            Self::ShapeMismatchScalar => "SHAPE_MISMATCH_SCALAR",
            Self::ShapeMismatchList => "SHAPE_MISMATCH_LIST",
            Self::ParseFailure => "PARSE_FAILURE",
            Self::SidecarUnavailable => "SIDECAR_UNAVAILABLE",
            Self::LlmSchemaViolation => "LLM_SCHEMA_VIOLATION",
            Self::LlmTimeout => "LLM_TIMEOUT",
            Self::DanglingSnippetRef => "DANGLING_SNIPPET_REF",
            Self::BudgetGuardBlocked => "BUDGET_GUARD_BLOCKED",
            Self::BudgetExhausted => "BUDGET_EXHAUSTED",
            Self::MonthlyBudgetExhausted => "MONTHLY_BUDGET_EXHAUSTED",
            Self::IdentityConflictFatal => "IDENTITY_CONFLICT_FATAL",
            Self::IdentityAmbiguous => "IDENTITY_AMBIGUOUS",
            Self::BelowMinEvidence => "BELOW_MIN_EVIDENCE",
            Self::ConflictingSourcesUnresolved => "CONFLICTING_SOURCES_UNRESOLVED",
            Self::ConstraintConflict => "CONSTRAINT_CONFLICT",
            Self::EnumValueNotAllowed => "ENUM_VALUE_NOT_ALLOWED",
            Self::AnchorConflict => "ANCHOR_CONFLICT",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::PipelineError => "PIPELINE_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SpecFactoryError
// ---------------------------------------------------------------------------

/// Unified engine error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context (e.g.
/// `host`, `source_id`, `field`).
#[derive(thiserror::Error)]
#[error("[{code}] {message}")]
pub struct SpecFactoryError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl SpecFactoryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialization
    /// fails, the entry is silently skipped.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for SpecFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SpecFactoryError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

/// Serializable snapshot of a [`SpecFactoryError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&SpecFactoryError> for ErrorDto {
    fn from(err: &SpecFactoryError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(std::string::ToString::to_string),
        }
    }
}

/// Convenience alias used throughout engine crates.
pub type Result<T> = std::result::Result<T, SpecFactoryError>;
