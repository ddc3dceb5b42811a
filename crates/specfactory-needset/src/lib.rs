// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Needset derivation and next-round planning (`spec.md` §3.6, §4.10).
//!
//! After consensus runs each round, [`compute_needset`] turns the round's
//! [`specfactory_types::Provenance`] map into the set of fields still
//! requiring work, [`plan_queries`] expands category search templates
//! against that needset, and [`assign_unknown_reason`] labels fields the
//! run ultimately gives up on.

mod availability;
mod config;
mod derive;
mod query;
mod reason;

pub use availability::{effort_exhausted, required_effort_rounds, EffortSpent};
pub use config::FieldPlan;
pub use derive::compute_needset;
pub use query::{expand_template, plan_queries};
pub use reason::assign_unknown_reason;
