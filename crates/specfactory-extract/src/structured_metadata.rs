// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured metadata extraction via the sidecar parser (`spec.md` §4.4
//! #3): JSON-LD, microdata, OpenGraph, RDFa/microformats. Fails open: a
//! missing or errored sidecar response yields no candidates, never a run
//! failure (`spec.md` §7).

use crate::json::{extract_json_candidates, FieldPointerMap};
use serde_json::Value;
use specfactory_types::{Candidate, CandidateMethod};

/// Structured-metadata surface a sidecar parser can report, each with its
/// own confidence base (`spec.md` §4.4: json_ld 0.90, microdata 0.88,
/// open_graph 0.80, rdfa_microformats 0.78).
///
/// `specfactory_types::CandidateMethod` only distinguishes `json_ld` and
/// `microdata`; OpenGraph and RDFa/microformats are recorded as
/// `microdata`-method candidates with their own `confidence_base`
/// override, since all four are the same "sidecar structured data" family
/// rather than distinct extraction mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredMetadataFormat {
    /// `<script type="application/ld+json">` product node.
    JsonLd,
    /// `itemscope`/`itemprop` microdata.
    Microdata,
    /// `og:*` meta tags.
    OpenGraph,
    /// RDFa attributes or microformats2 classes.
    RdfaMicroformats,
}

impl StructuredMetadataFormat {
    /// Confidence base for this surface.
    #[must_use]
    pub fn confidence_base(self) -> f64 {
        match self {
            Self::JsonLd => 0.90,
            Self::Microdata => 0.88,
            Self::OpenGraph => 0.80,
            Self::RdfaMicroformats => 0.78,
        }
    }

    fn candidate_method(self) -> CandidateMethod {
        match self {
            Self::JsonLd => CandidateMethod::JsonLd,
            Self::Microdata | Self::OpenGraph | Self::RdfaMicroformats => CandidateMethod::Microdata,
        }
    }
}

/// Extract candidates from one sidecar-parsed structured-metadata payload.
#[must_use]
pub fn extract_structured_metadata(
    payload: Option<&Value>,
    field_pointers: &FieldPointerMap,
    format: StructuredMetadataFormat,
    source_id: &str,
) -> Vec<Candidate> {
    let Some(payload) = payload else {
        return Vec::new();
    };
    let mut candidates = extract_json_candidates(payload, field_pointers, format.candidate_method(), source_id);
    for candidate in &mut candidates {
        candidate.confidence_base = format.confidence_base();
    }
    candidates
}
