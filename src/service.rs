//! Service layer API for reception workflow operations
use super::form::ReceptionForm;
use super::ledger::DiscrepancyLedger;
use super::notify::{Notification, Notifier};
use super::store::ReceptionStore;
use super::transfer::Transfer;
use super::wire::{RawReceptionResponse, ReceiveTransferPayload, ResolveAllPayload, build_resolve_all_payload};
use tracing::{error, info};

/// The backend reception API, the single external seam of the workflow.
/// Implementations perform the actual network calls; tests substitute fakes.
pub trait ReceptionBackend {
    fn submit_reception(&self, payload: &ReceiveTransferPayload) -> anyhow::Result<RawReceptionResponse>;
    fn resolve_all_discrepancies(&self, payload: &ResolveAllPayload) -> anyhow::Result<()>;
}

impl<T: ReceptionBackend + ?Sized> ReceptionBackend for &T {
    fn submit_reception(&self, payload: &ReceiveTransferPayload) -> anyhow::Result<RawReceptionResponse> {
        (**self).submit_reception(payload)
    }
    fn resolve_all_discrepancies(&self, payload: &ResolveAllPayload) -> anyhow::Result<()> {
        (**self).resolve_all_discrepancies(payload)
    }
}

/// Result of a receive attempt, mirroring the `{success, skipToNext}` shape
/// the wizard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The backend accepted the submission and the record is stored.
    Submitted,
    /// A submission is in flight or already recorded; nothing was sent.
    AlreadyRecorded,
    /// The backend rejected the submission or the call failed; state is
    /// unchanged and the operator may retry.
    Failed,
}

impl ReceiveOutcome {
    pub fn success(&self) -> bool {
        !matches!(self, ReceiveOutcome::Failed)
    }
    pub fn skip_to_next(&self) -> bool {
        matches!(self, ReceiveOutcome::AlreadyRecorded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    NothingToResolve,
    Failed,
}

pub struct ReceptionService<B, N> {
    backend: B,
    notifier: N,
}

impl<B: ReceptionBackend, N: Notifier> ReceptionService<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        Self { backend, notifier }
    }

    /// Record the physical receipt of the transfer, at most once per session.
    ///
    /// Re-entrant calls (a pending submission, or a record already held) are
    /// short-circuited to [`ReceiveOutcome::AlreadyRecorded`] without touching
    /// the backend. Backend rejections and call failures come back as
    /// [`ReceiveOutcome::Failed`] with one error notification; only a
    /// form/transfer consistency fault propagates as `Err`, since that is a
    /// bug in the calling code rather than a recoverable runtime condition.
    pub fn handle_receive_transfer(
        &self,
        store: &mut ReceptionStore,
        transfer: &Transfer,
        form: &ReceptionForm,
    ) -> anyhow::Result<ReceiveOutcome> {
        if store.is_receiving() || store.reception().is_some() {
            info!(transfer_id = %transfer.id, "receive already in flight or recorded, skipping");
            return Ok(ReceiveOutcome::AlreadyRecorded);
        }

        // The guard must be raised before the backend call is issued; it is
        // the only thing standing between a double-click and a double
        // submission.
        store.set_receiving(true);
        let outcome = self.submit_reception(store, transfer, form);
        store.set_receiving(false);
        outcome
    }

    fn submit_reception(
        &self,
        store: &mut ReceptionStore,
        transfer: &Transfer,
        form: &ReceptionForm,
    ) -> anyhow::Result<ReceiveOutcome> {
        let receipts = form.finalize(transfer)?;
        let payload = ReceiveTransferPayload::from_receipts(transfer.id.clone(), &receipts);

        let raw = match self.backend.submit_reception(&payload) {
            Ok(raw) => raw,
            Err(err) => {
                error!(transfer_id = %transfer.id, %err, "reception submission failed");
                self.notifier
                    .notify(Notification::error("Could not record the reception, please retry"));
                return Ok(ReceiveOutcome::Failed);
            }
        };

        if let Some(message) = raw.error.as_deref() {
            error!(transfer_id = %transfer.id, %message, "backend rejected the reception");
            self.notifier
                .notify(Notification::error("Could not record the reception, please retry"));
            return Ok(ReceiveOutcome::Failed);
        }

        let record = match raw.normalize() {
            Ok(record) => record,
            Err(err) => {
                error!(transfer_id = %transfer.id, %err, "reception response failed validation");
                self.notifier
                    .notify(Notification::error("Could not record the reception, please retry"));
                return Ok(ReceiveOutcome::Failed);
            }
        };

        info!(transfer_id = %transfer.id, reception_id = %record.id, "reception recorded");
        store.set_reception_data(record);
        store.mark_completed();
        self.notifier
            .notify(Notification::success("Reception recorded"));
        Ok(ReceiveOutcome::Submitted)
    }

    /// Commit every pending working-map resolution to the backend in one
    /// bulk call. On success the resolved transfer item ids move into the
    /// permanent set; on a failed attempt the working map is reset and the
    /// operator re-enters resolutions against fresh server state.
    pub fn resolve_all_discrepancies(
        &self,
        store: &ReceptionStore,
        ledger: &mut DiscrepancyLedger,
    ) -> anyhow::Result<ResolveOutcome> {
        if ledger.working().is_empty() {
            return Ok(ResolveOutcome::NothingToResolve);
        }
        let reception = store
            .reception()
            .ok_or_else(|| anyhow::anyhow!("cannot resolve discrepancies before a reception is recorded"))?;

        let payload = build_resolve_all_payload(ledger.working(), reception)?;
        let resolved_ids: Vec<String> = ledger.working().keys().cloned().collect();

        match self.backend.resolve_all_discrepancies(&payload) {
            Ok(()) => {
                info!(reception_id = %reception.id, count = resolved_ids.len(), "discrepancies resolved");
                ledger.mark_as_permanently_resolved(resolved_ids);
                self.notifier
                    .notify(Notification::success("All discrepancies resolved"));
                Ok(ResolveOutcome::Resolved)
            }
            Err(err) => {
                error!(reception_id = %reception.id, %err, "bulk discrepancy resolution failed");
                ledger.clear_resolved_discrepancies();
                self.notifier
                    .notify(Notification::error("Could not resolve the discrepancies, please retry"));
                Ok(ResolveOutcome::Failed)
            }
        }
    }
}
