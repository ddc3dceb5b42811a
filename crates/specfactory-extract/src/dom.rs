// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static DOM extraction: `<table>` rows, `<dl>` definition pairs, and
//! inline `key: value` text rows (`spec.md` §4.4 #4).

use scraper::{Html, Selector};
use specfactory_types::{Candidate, CandidateMethod};

/// Shape static DOM evidence was found in, each carrying its own confidence
/// base within the 0.75-0.85 band `spec.md` §4.4 allots this method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomShape {
    /// An HTML `<table>` row.
    Table,
    /// A `<dl>`/`<dt>`/`<dd>` definition pair.
    Definition,
    /// An inline `Key: Value` text row.
    InlineKv,
}

impl DomShape {
    /// Confidence base for this shape.
    #[must_use]
    pub fn confidence_base(self) -> f64 {
        match self {
            Self::Table => 0.85,
            Self::Definition => 0.80,
            Self::InlineKv => 0.75,
        }
    }
}

fn make_candidate(field: &str, value: &str, shape: DomShape, key_path: String, source_id: &str) -> Candidate {
    let mut candidate = Candidate::new(field, value, CandidateMethod::SpecTable, key_path, source_id, vec![]);
    candidate.confidence_base = shape.confidence_base();
    candidate
}

/// Lowercase, collapse whitespace, and swap spaces for underscores so DOM
/// label text becomes a stable field-name token.
fn normalize_field_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Parse `<table>` rows of the form `<tr><th>Field</th><td>Value</td></tr>`
/// into candidates keyed by the lowercased, whitespace-collapsed header
/// cell text. Rows with fewer than two cells are skipped.
#[must_use]
pub fn extract_tables(html: &str, source_id: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("static selector");
    let row_sel = Selector::parse("tr").expect("static selector");
    let cell_sel = Selector::parse("th, td").expect("static selector");

    let mut candidates = Vec::new();
    for (table_idx, table) in document.select(&table_sel).enumerate() {
        for (row_idx, row) in table.select(&row_sel).enumerate() {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if cells.len() < 2 {
                continue;
            }
            let field = normalize_field_name(&cells[0]);
            let value = cells[1..].join(", ");
            if field.is_empty() || value.is_empty() {
                continue;
            }
            candidates.push(make_candidate(
                &field,
                &value,
                DomShape::Table,
                format!("table[{table_idx}]/tr[{row_idx}]"),
                source_id,
            ));
        }
    }
    candidates
}

/// Parse `<dl><dt>Field</dt><dd>Value</dd></dl>` definition pairs,
/// pairing terms and definitions positionally within each list.
#[must_use]
pub fn extract_definitions(html: &str, source_id: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let dl_sel = Selector::parse("dl").expect("static selector");
    let dt_sel = Selector::parse("dt").expect("static selector");
    let dd_sel = Selector::parse("dd").expect("static selector");

    let mut candidates = Vec::new();
    for (dl_idx, dl) in document.select(&dl_sel).enumerate() {
        let terms: Vec<_> = dl.select(&dt_sel).collect();
        let defs: Vec<_> = dl.select(&dd_sel).collect();
        for (pair_idx, (term, def)) in terms.iter().zip(defs.iter()).enumerate() {
            let field = normalize_field_name(&term.text().collect::<String>());
            let value = def.text().collect::<String>().trim().to_string();
            if field.is_empty() || value.is_empty() {
                continue;
            }
            candidates.push(make_candidate(
                &field,
                &value,
                DomShape::Definition,
                format!("dl[{dl_idx}]/pair[{pair_idx}]"),
                source_id,
            ));
        }
    }
    candidates
}

/// Parse inline `Key: Value` text rows out of every element matched by
/// `selector` (e.g. `li`, `p`, `span`).
#[must_use]
pub fn extract_inline_kv(html: &str, selector: &str, source_id: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for (idx, el) in document.select(&sel).enumerate() {
        let text = el.text().collect::<String>();
        let Some((raw_field, raw_value)) = text.split_once(':') else {
            continue;
        };
        let field = normalize_field_name(raw_field);
        let value = raw_value.trim().to_string();
        if field.is_empty() || value.is_empty() {
            continue;
        }
        candidates.push(make_candidate(
            &field,
            &value,
            DomShape::InlineKv,
            format!("{selector}[{idx}]"),
            source_id,
        ));
    }
    candidates
}
