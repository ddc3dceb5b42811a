// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
//! Library half of the `specfactory` binary: config resolution, the
//! subcommand bodies, and output formatting, kept testable without
//! spawning the binary.

pub mod commands;
pub mod config;
pub mod format;
