//! # Workflow State
//!
//! One instance per orchestrator. A failed run is not a state of its own:
//! the state returns to `Idle` and the failure is reported alongside.

use serde::{Deserialize, Serialize};

/// Where the current (or last) run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No run in flight.
    #[default]
    Idle,
    /// Reading and fingerprinting the document.
    Hashing,
    /// Pinning the document to the content store.
    Storing,
    /// Writing to, or reading from, the ledger.
    Anchoring,
    /// The last run completed. Terminal until the next action.
    Done,
}

impl WorkflowState {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Hashing => "hashing",
            Self::Storing => "storing",
            Self::Anchoring => "anchoring",
            Self::Done => "done",
        }
    }

    /// Whether a run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Hashing | Self::Storing | Self::Anchoring)
    }

    /// States reachable from this one. Every busy state may also fall back
    /// to `Idle` on failure.
    pub fn valid_transitions(&self) -> &'static [WorkflowState] {
        match self {
            Self::Idle | Self::Done => &[Self::Hashing, Self::Anchoring, Self::Idle],
            Self::Hashing => &[Self::Storing, Self::Anchoring, Self::Idle],
            Self::Storing => &[Self::Anchoring, Self::Idle],
            Self::Anchoring => &[Self::Done, Self::Idle],
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The workflow step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Wallet connection.
    Connect,
    /// Reading and fingerprinting the document.
    Hash,
    /// Pinning to the content store.
    Upload,
    /// Writing the attestation record.
    Anchor,
    /// Reading the attestation record.
    Resolve,
}

impl Stage {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Hash => "hash",
            Self::Upload => "upload",
            Self::Anchor => "anchor",
            Self::Resolve => "resolve",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(WorkflowState::default(), WorkflowState::Idle);
    }

    #[test]
    fn busy_states_can_fail_back_to_idle() {
        for s in [
            WorkflowState::Hashing,
            WorkflowState::Storing,
            WorkflowState::Anchoring,
        ] {
            assert!(s.is_busy());
            assert!(s.valid_transitions().contains(&WorkflowState::Idle));
        }
    }

    #[test]
    fn storing_is_only_reached_from_hashing() {
        let sources: Vec<_> = [
            WorkflowState::Idle,
            WorkflowState::Hashing,
            WorkflowState::Storing,
            WorkflowState::Anchoring,
            WorkflowState::Done,
        ]
        .into_iter()
        .filter(|s| s.valid_transitions().contains(&WorkflowState::Storing))
        .collect();
        assert_eq!(sources, vec![WorkflowState::Hashing]);
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&WorkflowState::Anchoring).unwrap();
        assert_eq!(json, "\"anchoring\"");
        assert_eq!(Stage::Upload.to_string(), "upload");
    }
}
