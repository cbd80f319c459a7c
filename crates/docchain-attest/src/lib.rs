#![deny(missing_docs)]
//! # docchain-attest — Attestation Orchestrator
//!
//! Drives the two user-initiated workflows over a [`ContentStore`] and a
//! [`Ledger`]:
//!
//! ```text
//! store:  Idle → Hashing → Storing → Anchoring → Done
//! verify: Idle → Hashing → Anchoring → Done
//! ```
//!
//! The orchestrator is the only component that talks to both the content
//! store and the ledger. Every failure is attributed to the [`Stage`] that
//! produced it, the component error is kept verbatim as the source, and the
//! state returns to [`WorkflowState::Idle`].
//!
//! A content id pinned by a run that later failed to anchor is kept until a
//! new document is selected, so [`Attestor::anchor`] (or a repeated
//! [`Attestor::store`]) retries the ledger write without uploading again.
//!
//! [`ContentStore`]: docchain_pinning::ContentStore
//! [`Ledger`]: docchain_ledger::Ledger

pub mod document;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use document::{Document, DocumentSource};
pub use error::{ErrorKind, FailureReport, Precondition, StageError, WorkflowError};
pub use orchestrator::{Attestor, AttestorOptions, StoreOutcome, VerifyOutcome};
pub use state::{Stage, WorkflowState};
