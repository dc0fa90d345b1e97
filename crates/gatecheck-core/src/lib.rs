//! Artifact verification and check-in pipeline for staged promotion gates.
//!
//! A promotion bundle (ranked runs, finalists, finalists summary, optional
//! promotion receipt) only counts as evidence after it passes strict check-in:
//! schema validation, cross-field consistency, sample/fixture classification,
//! and digest binding. Every run emits a durable receipt so failures are
//! themselves auditable artifacts, never console-only output.

pub mod checkin;
pub mod classify;
pub mod consistency;
pub mod digest;
pub mod discover;
pub mod error;
pub mod finding;
pub mod receipt;
pub mod report;
pub mod schema;
pub mod types;

// Convenience re-exports
pub use checkin::{
    dry_run, run_check, run_with_outputs, BundleJsonSpec, BundleSource, CheckInConfig, DryRunPlan,
    Mode, OutputPaths, ResolvedBundle, Resolution,
};
pub use classify::{classify, Provenance};
pub use digest::{digest_file, sha256_hex};
pub use discover::{discover, BundleLayout, DiscoveryResult, RejectReason, RejectedCandidate};
pub use error::GateError;
pub use finding::{Finding, FindingKind};
pub use receipt::{write_receipt, ArtifactRecord, ReceiptStatus, ValidationReceipt};
pub use types::{
    ArtifactDescriptor, FinalistsPayload, GridTarget, PromotionReceipt, RankedRun,
    RankedRunsPayload, DEFAULT_MAX_FINALISTS, DEFAULT_MIN_FINALISTS, PILOT_GRID,
};
