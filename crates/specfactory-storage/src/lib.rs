// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Blob key-value storage for SpecFactory: a filesystem-backed
//! [`BlobStorage`](specfactory_capability::BlobStorage) with transparent
//! at-rest gzip compression, the non-billing half of the `spec.md` §6.2 key
//! layout, and an ndjson [`LedgerSink`](specfactory_llm::LedgerSink) built on
//! top of it.

mod blob;
mod compression;
mod keys;
mod ndjson_ledger;

pub use blob::FileBlobStorage;
pub use compression::{compress, decompress, Codec, CompressionStats};
pub use keys::{evidence_pack_key, input_key, latest_key, run_artifact_key, RunStage};
pub use ndjson_ledger::NdjsonLedgerSink;
