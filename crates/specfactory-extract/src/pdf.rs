// SPDX-License-Identifier: MIT OR Apache-2.0
//! PDF extraction (`spec.md` §4.4 #6): table and key-value rows out of text
//! already isolated by the backend router. The text-layer parse, table-dense
//! backend dispatch, and scanned-PDF OCR all happen upstream of this crate
//! (external backend concerns, `spec.md` §2); this module only converts
//! already-isolated rows into candidates and enforces the OCR confidence
//! floor.

use specfactory_types::{Candidate, CandidateMethod};

/// One row already isolated by the PDF backend.
#[derive(Debug, Clone)]
pub struct PdfRow {
    /// Field name, already normalized by the backend.
    pub field: String,
    /// Raw value text.
    pub value: String,
    /// Source page index, zero-based.
    pub page: usize,
    /// `true` if the row came from a detected table rather than free k/v text.
    pub is_table_row: bool,
    /// OCR confidence, `None` for text-layer (non-scanned) PDFs.
    pub ocr_confidence: Option<f64>,
}

/// Minimum OCR confidence below which a row is dropped entirely rather than
/// promoted as a low-confidence candidate.
pub const MIN_OCR_CONFIDENCE: f64 = 0.5;

/// Convert backend-isolated PDF rows into candidates, dropping any row whose
/// `ocr_confidence` (when present) falls below [`MIN_OCR_CONFIDENCE`].
#[must_use]
pub fn extract_pdf_candidates(rows: &[PdfRow], source_id: &str) -> Vec<Candidate> {
    rows.iter()
        .filter(|row| row.ocr_confidence.is_none_or(|c| c >= MIN_OCR_CONFIDENCE))
        .enumerate()
        .map(|(idx, row)| {
            let method = if row.is_table_row {
                CandidateMethod::PdfTable
            } else {
                CandidateMethod::PdfKv
            };
            Candidate::new(
                row.field.clone(),
                row.value.clone(),
                method,
                format!("pdf/page[{}]/row[{idx}]", row.page),
                source_id,
                vec![],
            )
        })
        .collect()
}
