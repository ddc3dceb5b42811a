//! Tagged field-value variant with an explicit `unk` sentinel.
//!
//! Incoming candidate values are heterogeneous (string, number, bool, list,
//! object). `spec.md` §9 calls for replacing this dynamic typing with a
//! tagged variant per field shape plus an explicit `unk` fallback state —
//! `unk` is a reason-bearing state, never an actual value.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The shape a field's value is declared to have in the category rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// A single scalar (string or number rendered as string).
    Scalar,
    /// A deduplicated, order-preserving list of scalars.
    List,
    /// A structured component (nested key-value group).
    Component,
}

/// A field's resolved value: known, or `unk` with a reason code.
///
/// `unk` is never itself a value — `spec.md` §3.3 requires that a candidate
/// whose textual value is `"unk"`/`"unknown"`/`"n/a"`/empty is never
/// actionable, so this type makes "unknown with a reason" a first-class
/// state instead of a magic string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FieldValue {
    /// A single scalar value.
    Scalar {
        /// The value's string representation.
        value: String,
    },
    /// An ordered, deduplicated list of values.
    List {
        /// Values in first-seen order, deduplicated case-insensitively.
        values: Vec<String>,
    },
    /// Unknown, with a stable reason code (see `specfactory_error::ErrorCode`
    /// for codes shared with `stop_reason`/`validated_reason`).
    Unk {
        /// Why the field could not be resolved.
        reason: String,
    },
}

impl FieldValue {
    /// `true` unless this is [`FieldValue::Unk`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unk { .. })
    }

    /// Construct an `unk` value with the given reason.
    #[must_use]
    pub fn unk(reason: impl Into<String>) -> Self {
        Self::Unk {
            reason: reason.into(),
        }
    }

    /// Raw textual tokens commonly used by extractors to denote "no value".
    ///
    /// Per `spec.md` §3.3, a candidate carrying any of these is never
    /// actionable.
    pub const UNKNOWN_TOKENS: &'static [&'static str] = &["unk", "unknown", "n/a", ""];

    /// `true` if `raw` (already trimmed and lowercased by the caller) is one
    /// of the unknown-equivalent tokens.
    #[must_use]
    pub fn is_unknown_token(raw: &str) -> bool {
        Self::UNKNOWN_TOKENS.contains(&raw)
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A scalar's JSON shape is always a string under `value`, never an
        /// array or object, for any value that round-trips through the
        /// tagged representation.
        #[test]
        fn scalar_round_trips_and_never_serializes_as_array_or_object(value in ".{0,64}") {
            let fv = FieldValue::Scalar { value: value.clone() };
            let json = serde_json::to_value(&fv).expect("serialize scalar");
            prop_assert!(json.get("value").expect("value field present").is_string());
            let back: FieldValue = serde_json::from_value(json).expect("deserialize scalar");
            prop_assert_eq!(back, fv);
        }

        /// A list's JSON shape is always an array under `values`, and
        /// round-trips preserving order exactly (no dedup is applied by
        /// serialization itself — dedup is a construction-time concern).
        #[test]
        fn list_round_trips_preserving_order(values in prop::collection::vec("[a-z ]{0,12}", 0..8)) {
            let fv = FieldValue::List { values: values.clone() };
            let json = serde_json::to_value(&fv).expect("serialize list");
            prop_assert!(json.get("values").expect("values field present").is_array());
            let back: FieldValue = serde_json::from_value(json).expect("deserialize list");
            prop_assert_eq!(back, fv);
        }

        /// `is_unknown_token` only ever accepts the four literal tokens;
        /// any other already-normalized string is actionable.
        #[test]
        fn is_unknown_token_rejects_anything_outside_the_fixed_set(raw in "[a-z0-9 ]{1,16}") {
            prop_assume!(!FieldValue::UNKNOWN_TOKENS.contains(&raw.as_str()));
            prop_assert!(!FieldValue::is_unknown_token(&raw));
        }
    }
}
