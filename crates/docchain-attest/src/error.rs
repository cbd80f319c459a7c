//! # Workflow Errors
//!
//! Component errors are never reinterpreted. A stage failure wraps the
//! original error as its source and adds only the stage it came from;
//! [`WorkflowError::kind`] flattens both into the reported error kind.

use docchain_core::HashError;
use docchain_ledger::LedgerError;
use docchain_pinning::StoreError;
use serde::{Deserialize, Serialize};

use crate::state::Stage;

/// A precondition checked before a workflow touches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// No document is selected.
    NoDocument,
    /// No wallet session is connected.
    NoSession,
    /// Anchor-only retry requested but nothing is pinned for the selection.
    NothingPinned,
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoDocument => "no document selected",
            Self::NoSession => "no wallet session (connect first)",
            Self::NothingPinned => "nothing pinned for the selected document",
        })
    }
}

/// The component error behind a stage failure.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The pinning store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors returned by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A precondition failed; no stage was entered.
    #[error("precondition failed: {0}")]
    PreconditionFailed(Precondition),

    /// A stage failed; the remaining stages were not run.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The stage that failed.
        stage: Stage,
        /// What the component reported.
        #[source]
        source: StageError,
    },
}

/// Flat error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No document, session, or pinned content when one was required.
    PreconditionFailed,
    /// A credential or address is missing.
    Misconfigured,
    /// Wallet or session on the wrong chain.
    NetworkMismatch,
    /// Content store unreachable.
    StoreUnavailable,
    /// Content store answered but refused or returned nothing usable.
    StoreRejected,
    /// Ledger refused the call, including a duplicate fingerprint.
    LedgerRejected,
    /// Ledger unreachable, or a deadline expired.
    LedgerUnavailable,
    /// The document could not be read.
    HashFailure,
}

impl WorkflowError {
    pub(crate) fn stage(stage: Stage, source: impl Into<StageError>) -> Self {
        Self::Stage {
            stage,
            source: source.into(),
        }
    }

    /// The stage that failed, if any was entered.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::PreconditionFailed(_) => None,
            Self::Stage { stage, .. } => Some(*stage),
        }
    }

    /// Classify the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Self::Stage { source, .. } => match source {
                StageError::Hash(_) => ErrorKind::HashFailure,
                StageError::Store(e) => match e {
                    StoreError::Misconfigured(_) => ErrorKind::Misconfigured,
                    StoreError::Unavailable { .. } => ErrorKind::StoreUnavailable,
                    StoreError::Rejected { .. } => ErrorKind::StoreRejected,
                },
                StageError::Ledger(e) => match e {
                    LedgerError::Unconfigured => ErrorKind::Misconfigured,
                    LedgerError::NetworkMismatch { .. } => ErrorKind::NetworkMismatch,
                    LedgerError::NoAccounts | LedgerError::Rejected { .. } => {
                        ErrorKind::LedgerRejected
                    }
                    LedgerError::Unavailable { .. } | LedgerError::Storage { .. } => {
                        ErrorKind::LedgerUnavailable
                    }
                },
            },
        }
    }

    /// Whether the content store already holds the document, so a retry
    /// must go straight to anchoring.
    pub fn is_anchor_failure(&self) -> bool {
        self.failed_stage() == Some(Stage::Anchor)
    }
}

/// A retained, cloneable summary of the last failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Stage the failure is attributed to; `None` for a precondition.
    pub stage: Option<Stage>,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// The full human-readable message.
    pub message: String,
}

impl From<&WorkflowError> for FailureReport {
    fn from(e: &WorkflowError) -> Self {
        Self {
            stage: e.failed_stage(),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
