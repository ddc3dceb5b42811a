// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Extraction Pipeline: the seven confidence-ordered extraction methods,
//! per-candidate shape normalization, and the multi-product identity gate
//! (`spec.md` §4.4).

mod article;
mod dom;
mod identity;
mod json;
mod llm;
mod pdf;
mod pipeline;
mod structured_metadata;

pub use article::{extract_windows, readability_score, READABILITY_THRESHOLD};
pub use dom::{extract_definitions, extract_inline_kv, extract_tables, DomShape};
pub use identity::{drop_unmatched, tag_candidates, target_match_score, IdentityTag, PageProductCluster, TARGET_MATCH_THRESHOLD};
pub use json::{extract_json_candidates, FieldPointerMap};
pub use llm::{extract_llm_candidate, extract_llm_candidates, LlmFieldEmission};
pub use pdf::{extract_pdf_candidates, PdfRow, MIN_OCR_CONFIDENCE};
pub use pipeline::{bind_candidate_evidence, pack_from_candidates};
pub use structured_metadata::{extract_structured_metadata, StructuredMetadataFormat};
