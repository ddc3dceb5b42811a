// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! SQLite-backed Spec DB tables the engine owns, and the billing ledger's
//! primary sink (`spec.md` §4.9, §6.3).

mod billing;
mod candidates;
mod db;
mod evidence_refs;
mod route_matrix;
mod sources;

pub use db::SpecDb;
