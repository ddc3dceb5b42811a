// SPDX-License-Identifier: MIT OR Apache-2.0
//! Next-round search query planning (`spec.md` §4.10).

use specfactory_types::{NeedsetRow, ProductJob};

/// Expand one category search template against a product identity and a
/// needset row, substituting `{brand}`, `{model}`, and `{field_name}`.
#[must_use]
pub fn expand_template(template: &str, job: &ProductJob, row: &NeedsetRow) -> String {
    template
        .replace("{brand}", &job.identity_lock.brand)
        .replace("{model}", &job.identity_lock.model)
        .replace("{field_name}", &row.field.replace('_', " "))
}

/// Build the next round's search queries: every template expanded against
/// every needset row, with domain hints appended for hosts that have
/// historically yielded the deficit field (`domain_hints` keyed by field
/// name, the availability learning artifact `spec.md` §4.10 describes).
#[must_use]
pub fn plan_queries(job: &ProductJob, needset: &[NeedsetRow], templates: &[String], domain_hints: &dyn Fn(&str) -> Vec<String>) -> Vec<String> {
    let mut queries = Vec::new();
    for row in needset {
        for template in templates {
            let mut query = expand_template(template, job, row);
            let hints = domain_hints(&row.field);
            if let Some(hint) = hints.first() {
                query.push_str(&format!(" site:{hint}"));
            }
            queries.push(query);
        }
    }
    queries
}
