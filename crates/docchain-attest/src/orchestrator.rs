//! # Attestor
//!
//! Sequential store and verify pipelines over a content store and a ledger.
//!
//! Runs are not interleaved: every workflow takes `&mut self`, so a second
//! run cannot start while one is in flight. The session identity returned by
//! [`Attestor::connect`] is held for the life of the attestor and passed
//! explicitly into every ledger write.
//!
//! ## Derived State
//!
//! | Field | Set by | Cleared by |
//! |-------|--------|------------|
//! | fingerprint | hash stage | [`Attestor::select`] |
//! | pinned content id | upload stage | [`Attestor::select`] |
//! | pinned manifest id | upload stage | [`Attestor::select`] |
//! | verification | verify | [`Attestor::select`], next verify |
//! | last failure | any failed action | next action, [`Attestor::select`] |

use std::future::Future;
use std::time::Duration;

use docchain_core::{
    fingerprint, ContentId, Fingerprint, Resolution, SessionIdentity, TransactionReceipt,
};
use docchain_ledger::{Ledger, LedgerError};
use docchain_pinning::{ContentStore, StoreError};
use serde::Serialize;

use crate::document::Document;
use crate::error::{FailureReport, Precondition, WorkflowError};
use crate::state::{Stage, WorkflowState};

/// Orchestrator options.
#[derive(Debug, Clone, Default)]
pub struct AttestorOptions {
    /// Deadline applied to each network-facing call. Expiry is reported as
    /// the component being unavailable.
    pub stage_deadline: Option<Duration>,
    /// Also pin a JSON manifest describing the attested document.
    pub pin_manifest: bool,
}

/// Result of a completed store workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOutcome {
    /// Fingerprint the record is keyed by.
    pub fingerprint: Fingerprint,
    /// Content id of the pinned document.
    pub content_id: ContentId,
    /// Retrieval URL for the pinned document.
    pub url: String,
    /// Content id of the pinned manifest, when one was requested.
    pub manifest_id: Option<ContentId>,
    /// Confirmation of the ledger write.
    pub receipt: TransactionReceipt,
    /// Whether the upload stage reused a content id pinned by an earlier
    /// run instead of uploading.
    pub reused_upload: bool,
}

/// Result of a completed verify workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOutcome {
    /// Fingerprint that was looked up.
    pub fingerprint: Fingerprint,
    /// What the ledger holds for it.
    pub resolution: Resolution,
    /// Retrieval URL of the attested copy, when a record exists.
    pub url: Option<String>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    fingerprint: &'a Fingerprint,
    name: &'a str,
    label: &'a str,
    size: usize,
}

/// The attestation orchestrator.
#[derive(Debug)]
pub struct Attestor<S, L> {
    store: S,
    ledger: L,
    options: AttestorOptions,
    state: WorkflowState,
    session: Option<SessionIdentity>,
    document: Option<Document>,
    fingerprint: Option<Fingerprint>,
    pinned: Option<ContentId>,
    manifest: Option<ContentId>,
    verification: Option<Resolution>,
    last_failure: Option<FailureReport>,
}

impl<S: ContentStore, L: Ledger> Attestor<S, L> {
    /// Create an idle orchestrator with nothing selected and no session.
    pub fn new(store: S, ledger: L, options: AttestorOptions) -> Self {
        Self {
            store,
            ledger,
            options,
            state: WorkflowState::Idle,
            session: None,
            document: None,
            fingerprint: None,
            pinned: None,
            manifest: None,
            verification: None,
            last_failure: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Current workflow state. Back at `Idle` after a failure.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The connected session, if any.
    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    /// The selected document.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Fingerprint of the selected document, once hashed.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Content id pinned for the selected document. Survives a failed
    /// anchoring stage.
    pub fn pinned(&self) -> Option<&ContentId> {
        self.pinned.as_ref()
    }

    /// Result of the last verify run for the selected document.
    pub fn verification(&self) -> Option<&Resolution> {
        self.verification.as_ref()
    }

    /// The failure of the last action, retained until the next action or
    /// selection.
    pub fn last_failure(&self) -> Option<&FailureReport> {
        self.last_failure.as_ref()
    }

    /// The content store client.
    pub fn content_store(&self) -> &S {
        &self.store
    }

    /// The ledger client.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Retrieval URL for a content id. Empty for an empty id.
    pub fn locate(&self, content_id: &str) -> String {
        self.store.locate(content_id)
    }

    /// Non-blocking health check of the content store.
    pub async fn probe_store(&self) -> bool {
        self.store.probe().await
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Select a document, discarding everything derived from the previous
    /// selection. The session is kept.
    pub fn select(&mut self, document: Document) {
        tracing::debug!(name = document.name(), "document selected");
        self.document = Some(document);
        self.fingerprint = None;
        self.pinned = None;
        self.manifest = None;
        self.verification = None;
        self.last_failure = None;
        self.state = WorkflowState::Idle;
    }

    /// Select a document whose bytes were pinned by an earlier process, so
    /// the next [`store`](Self::store) goes straight to anchoring.
    pub fn select_pinned(&mut self, document: Document, content_id: ContentId) {
        self.select(document);
        tracing::debug!(content_id = %content_id, "resuming with pinned content");
        self.pinned = Some(content_id);
    }

    /// Connect the wallet and hold the resulting session. Calling again
    /// re-asserts the network.
    pub async fn connect(&mut self) -> Result<SessionIdentity, WorkflowError> {
        self.last_failure = None;
        let deadline = self.options.stage_deadline;
        let result = with_deadline(deadline, self.ledger.connect(), |d| {
            ledger_deadline("connect", d)
        })
        .await
        .map_err(|e| WorkflowError::stage(Stage::Connect, e));

        match result {
            Ok(session) => {
                self.session = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                self.session = None;
                Err(self.fail(e))
            }
        }
    }

    /// Store workflow: hash, pin, anchor.
    ///
    /// Requires a selected document and a session; a missing precondition
    /// fails before anything is read or sent. A content id already pinned
    /// for this selection is reused.
    pub async fn store(&mut self, label: &str) -> Result<StoreOutcome, WorkflowError> {
        self.last_failure = None;
        let result = self.run_store(label).await;
        self.finish(result)
    }

    /// Anchor-only retry: write the record for the already pinned content
    /// id without hashing or uploading again.
    pub async fn anchor(&mut self, label: &str) -> Result<StoreOutcome, WorkflowError> {
        self.last_failure = None;
        let result = self.run_anchor_only(label).await;
        self.finish(result)
    }

    /// Verify workflow: hash, resolve. Not-found is a normal outcome.
    pub async fn verify(&mut self) -> Result<VerifyOutcome, WorkflowError> {
        self.last_failure = None;
        self.verification = None;
        let result = self.run_verify().await;
        self.finish(result)
    }

    // ── Pipelines ────────────────────────────────────────────────────

    async fn run_store(&mut self, label: &str) -> Result<StoreOutcome, WorkflowError> {
        let document = self
            .document
            .clone()
            .ok_or(WorkflowError::PreconditionFailed(Precondition::NoDocument))?;
        let session = self
            .session
            .clone()
            .ok_or(WorkflowError::PreconditionFailed(Precondition::NoSession))?;

        let (fp, bytes) = self.hash_stage(&document).await?;
        let size = bytes.len();

        self.enter(WorkflowState::Storing);
        let reused_upload = self.pinned.is_some();
        let content_id = match self.pinned.clone() {
            Some(id) => {
                tracing::info!(fingerprint = %fp, content_id = %id, "reusing pinned content");
                id
            }
            None => {
                let id = self.upload(bytes, document.name()).await?;
                self.pinned = Some(id.clone());
                tracing::info!(fingerprint = %fp, content_id = %id, size, "document pinned");
                id
            }
        };

        if self.options.pin_manifest && self.manifest.is_none() {
            let manifest = serde_json::to_value(Manifest {
                fingerprint: &fp,
                name: document.name(),
                label,
                size,
            })
            .map_err(|e| {
                WorkflowError::stage(
                    Stage::Upload,
                    StoreError::Misconfigured(format!("manifest encoding failed: {e}")),
                )
            })?;
            let name = format!("{}.manifest.json", document.name());
            let deadline = self.options.stage_deadline;
            let id = with_deadline(deadline, self.store.put_json(&manifest, &name), |d| {
                store_deadline("POST /pinning/pinJSONToIPFS", d)
            })
            .await
            .map_err(|e| WorkflowError::stage(Stage::Upload, e))?;
            tracing::info!(fingerprint = %fp, manifest_id = %id, "manifest pinned");
            self.manifest = Some(id);
        }

        let receipt = self.anchor_stage(&session, &fp, &content_id, label).await?;

        Ok(StoreOutcome {
            fingerprint: fp,
            url: self.store.locate(content_id.as_str()),
            content_id,
            manifest_id: self.manifest.clone(),
            receipt,
            reused_upload,
        })
    }

    async fn run_anchor_only(&mut self, label: &str) -> Result<StoreOutcome, WorkflowError> {
        let session = self
            .session
            .clone()
            .ok_or(WorkflowError::PreconditionFailed(Precondition::NoSession))?;
        let (fp, content_id) = match (self.fingerprint, self.pinned.clone()) {
            (Some(fp), Some(id)) => (fp, id),
            _ => return Err(WorkflowError::PreconditionFailed(Precondition::NothingPinned)),
        };

        let receipt = self.anchor_stage(&session, &fp, &content_id, label).await?;

        Ok(StoreOutcome {
            fingerprint: fp,
            url: self.store.locate(content_id.as_str()),
            content_id,
            manifest_id: self.manifest.clone(),
            receipt,
            reused_upload: true,
        })
    }

    async fn run_verify(&mut self) -> Result<VerifyOutcome, WorkflowError> {
        let document = self
            .document
            .clone()
            .ok_or(WorkflowError::PreconditionFailed(Precondition::NoDocument))?;

        let (fp, _) = self.hash_stage(&document).await?;

        self.enter(WorkflowState::Anchoring);
        let deadline = self.options.stage_deadline;
        let resolution = with_deadline(deadline, self.ledger.resolve(&fp), |d| {
            ledger_deadline("verifyDocument", d)
        })
        .await
        .map_err(|e| WorkflowError::stage(Stage::Resolve, e))?;

        tracing::info!(fingerprint = %fp, exists = resolution.exists(), "verification resolved");

        let url = resolution
            .record()
            .and_then(|r| r.content_id.as_ref())
            .map(|id| self.store.locate(id.as_str()));
        self.verification = Some(resolution.clone());
        Ok(VerifyOutcome {
            fingerprint: fp,
            resolution,
            url,
        })
    }

    // ── Stages ───────────────────────────────────────────────────────

    async fn hash_stage(
        &mut self,
        document: &Document,
    ) -> Result<(Fingerprint, Vec<u8>), WorkflowError> {
        self.enter(WorkflowState::Hashing);
        let bytes = document
            .read()
            .await
            .map_err(|e| WorkflowError::stage(Stage::Hash, e))?;
        let fp = fingerprint(&bytes);
        if self.fingerprint.is_some_and(|prev| prev != fp) {
            // The file changed on disk since the last run; nothing pinned
            // for the old bytes applies to the new ones.
            self.pinned = None;
            self.manifest = None;
        }
        self.fingerprint = Some(fp);
        tracing::debug!(fingerprint = %fp, size = bytes.len(), "document hashed");
        Ok((fp, bytes))
    }

    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<ContentId, WorkflowError> {
        let deadline = self.options.stage_deadline;
        with_deadline(deadline, self.store.put(bytes, name), |d| {
            store_deadline("POST /pinning/pinFileToIPFS", d)
        })
        .await
        .map_err(|e| WorkflowError::stage(Stage::Upload, e))
    }

    async fn anchor_stage(
        &mut self,
        session: &SessionIdentity,
        fp: &Fingerprint,
        content_id: &ContentId,
        label: &str,
    ) -> Result<TransactionReceipt, WorkflowError> {
        self.enter(WorkflowState::Anchoring);
        let deadline = self.options.stage_deadline;
        with_deadline(
            deadline,
            self.ledger.append(session, fp, content_id, label),
            |d| ledger_deadline("storeDocument", d),
        )
        .await
        .map_err(|e| WorkflowError::stage(Stage::Anchor, e))
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn enter(&mut self, next: WorkflowState) {
        tracing::debug!(from = %self.state, to = %next, "workflow transition");
        self.state = next;
    }

    fn finish<T>(&mut self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        match result {
            Ok(v) => {
                self.enter(WorkflowState::Done);
                Ok(v)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: WorkflowError) -> WorkflowError {
        tracing::warn!(
            stage = ?e.failed_stage(),
            kind = ?e.kind(),
            pinned = ?self.pinned.as_ref().map(ContentId::as_str),
            "workflow failed: {e}"
        );
        self.last_failure = Some(FailureReport::from(&e));
        self.state = WorkflowState::Idle;
        e
    }
}

/// Await `fut`, bounded by `deadline` when one is set.
async fn with_deadline<T, E>(
    deadline: Option<Duration>,
    fut: impl Future<Output = Result<T, E>>,
    expired: impl FnOnce(Duration) -> E,
) -> Result<T, E> {
    match deadline {
        None => fut.await,
        Some(d) => match tokio::time::timeout(d, fut).await {
            Ok(result) => result,
            Err(_) => Err(expired(d)),
        },
    }
}

fn store_deadline(endpoint: &str, d: Duration) -> StoreError {
    StoreError::Unavailable {
        endpoint: endpoint.to_string(),
        reason: format!("deadline of {d:?} expired"),
    }
}

fn ledger_deadline(operation: &str, d: Duration) -> LedgerError {
    LedgerError::Unavailable {
        operation: operation.to_string(),
        reason: format!("deadline of {d:?} expired"),
    }
}
