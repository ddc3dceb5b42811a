// SPDX-License-Identifier: MIT OR Apache-2.0
//! specfactory-runtime
//!
//! Round controller and worker pools orchestrating one [`ProductJob`] through
//! discovery, fetch, extraction, consensus, and the gates (`spec.md` §4.1,
//! §5), until a stop condition fires.
//!
//! [`ProductJob`]: specfactory_types::ProductJob

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Cancellation primitives for in-flight product runs.
pub mod cancel;
/// The round controller itself.
pub mod controller;
/// Per-source identity scoring feeding the identity gate.
pub mod identity;
/// Semaphore-gated worker pools bounding per-round concurrency.
pub mod pools;
/// Round-controller stop conditions.
pub mod stop;

pub use cancel::{CancellableRun, CancellationReason, CancellationToken};
pub use controller::{ControllerConfig, RoundController, RoundSummary};
pub use identity::score_source;
pub use pools::Pools;
pub use stop::{evaluate_stop, StopCheckInputs, StopReason};

/// CLI exit code for a finished product run, per `spec.md` §6.4: `0` for a
/// validated run, `2` for one that stopped on budget or yield exhaustion,
/// `3` for an identity-gate abort. Pipeline errors (a [`RoundController::run`]
/// that returned `Err` rather than a terminal [`RoundSummary`]) are not
/// covered here — callers map those to exit code `1` directly.
#[must_use]
pub fn exit_code(stop_reason: StopReason) -> u8 {
    match stop_reason {
        StopReason::Satisfied => 0,
        StopReason::IdentityConflictFatal => 3,
        StopReason::BudgetExhausted | StopReason::MarginalYield | StopReason::MaxRoundsReached => 2,
    }
}
