//! Stable domain types for the SpecFactory harvesting engine.
//!
//! This crate defines the wire- and storage-level contract shared by every
//! other engine crate: the [`ProductJob`] a run is locked to, the [`Source`]
//! and [`Candidate`] rows extraction produces, the [`EvidencePack`] bound to
//! each source, the [`Provenance`] consensus assembles per field, the
//! [`Needset`] the round planner derives, the [`RouteDecision`] the LLM
//! router resolves, and the [`BillingEntry`] the cost ledger appends.
//!
//! Types here carry no behavior beyond small, pure helpers (fingerprinting,
//! shape checks); the engines that produce and consume them live in their
//! own crates.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod billing;
mod candidate;
mod evidence;
mod fingerprint;
mod needset;
mod product;
mod provenance;
mod route;
mod source;
mod value;

pub use billing::BillingEntry;
pub use candidate::{Candidate, CandidateMethod};
pub use evidence::{CandidateBindings, EvidencePack, Snippet, SnippetType};
pub use fingerprint::{candidate_fingerprint, sha256_hex};
pub use needset::{AvailabilityClass, DeficitReason, NeedsetRow};
pub use product::{Anchors, IdentityLock, ProductJob, Requirements};
pub use provenance::{EvidenceRow, FieldReasoning, Provenance};
pub use route::{InsufficientEvidenceAction, RouteDecision, RouteScope, SendPacket};
pub use source::{FetchMethod, FetchOutcome, Source, Tier};
pub use value::{FieldShape, FieldValue};
