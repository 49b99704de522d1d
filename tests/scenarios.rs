//! End-to-end reception workflow scenarios against a fake backend

use std::cell::{Cell, RefCell};

use chrono::Utc;
use transfer_reception::{
    form::{DiscrepancyKind, ReceptionForm},
    ledger::{DiscrepancyLedger, DiscrepancyResolution, DiscrepancyStatus},
    notify::{RecordingNotifier, Severity},
    service::{ReceiveOutcome, ReceptionBackend, ReceptionService, ResolveOutcome},
    store::{ReceptionStatus, ReceptionStore},
    transfer::Transfer,
    validators,
    wire::{RawReceptionItem, RawReceptionResponse, ReceiveTransferPayload, ResolveAllPayload},
    wizard::Wizard,
};

/// In-memory stand-in for the reception API. Confirms whatever it is sent
/// and keeps every payload for later assertions.
#[derive(Default)]
struct FakeBackend {
    submissions: RefCell<Vec<ReceiveTransferPayload>>,
    resolutions: RefCell<Vec<ResolveAllPayload>>,
    fail_submit: Cell<bool>,
    fail_resolve: Cell<bool>,
}

impl FakeBackend {
    fn submission_count(&self) -> usize {
        self.submissions.borrow().len()
    }
}

impl ReceptionBackend for FakeBackend {
    fn submit_reception(&self, payload: &ReceiveTransferPayload) -> anyhow::Result<RawReceptionResponse> {
        if self.fail_submit.get() {
            anyhow::bail!("warehouse api returned 503");
        }
        self.submissions.borrow_mut().push(payload.clone());

        let with_discrepancies = payload.items.iter().any(|i| i.discrepancy_type.is_some());
        let items = payload
            .items
            .iter()
            .enumerate()
            .map(|(n, item)| RawReceptionItem {
                id: Some(format!("ritem_{n}")),
                transfer_item_id: Some(item.transfer_item_id.clone()),
                quantity_received: Some(item.quantity_received),
            })
            .collect();

        Ok(RawReceptionResponse {
            id: Some(format!("rec_{}", payload.transfer_id)),
            transfer_id: Some(payload.transfer_id.clone()),
            status: Some(if with_discrepancies { "WithDiscrepancies" } else { "Completed" }.to_string()),
            items,
            comments: vec![],
            received_at: Some(Utc::now()),
            notes: None,
            error: None,
        })
    }

    fn resolve_all_discrepancies(&self, payload: &ResolveAllPayload) -> anyhow::Result<()> {
        if self.fail_resolve.get() {
            anyhow::bail!("warehouse api returned 503");
        }
        self.resolutions.borrow_mut().push(payload.clone());
        Ok(())
    }
}

fn two_line_transfer() -> Transfer {
    Transfer::new("tr_1", "wh_central", "wh_north")
        .with_item("it_1", "Brake pads", 10)
        .with_item("it_2", "Oil filters", 4)
}

#[test]
fn full_receipt_happy_path() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    assert!(validators::reception_step_valid(&transfer, &form));

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);

    let outcome = service.handle_receive_transfer(&mut store, &transfer, &form)?;
    assert_eq!(outcome, ReceiveOutcome::Submitted);
    assert!(outcome.success());
    assert!(store.is_reception_completed());
    assert!(!store.is_receiving());
    assert_eq!(store.reception().unwrap().status, ReceptionStatus::Completed);

    // both lines received in full, so nothing to show the operator
    let ledger = DiscrepancyLedger::new();
    assert!(ledger.generate_discrepancies(&form, &transfer).is_empty());

    assert_eq!(backend.submission_count(), 1);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].severity, Severity::Success);

    Ok(())
}

#[test]
fn short_receipt_without_reason_blocks_the_step() {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 7);
    form.set_quantity_received("it_2", 4);

    assert!(!validators::reception_step_valid(&transfer, &form));

    // the wizard must not advance while the gate is closed
    let mut wizard = Wizard::new(3);
    if validators::reception_step_valid(&transfer, &form) {
        wizard.handle_next(None::<fn()>);
    }
    assert_eq!(wizard.current_step(), 0);
}

#[test]
fn short_receipt_with_reason_then_resolve() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 7);
    form.set_discrepancy("it_1", DiscrepancyKind::Damaged, Some("water damage".into()));
    form.set_quantity_received("it_2", 4);

    assert!(validators::reception_step_valid(&transfer, &form));

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);

    let outcome = service.handle_receive_transfer(&mut store, &transfer, &form)?;
    assert_eq!(outcome, ReceiveOutcome::Submitted);
    assert_eq!(store.reception().unwrap().status, ReceptionStatus::WithDiscrepancies);

    let mut ledger = DiscrepancyLedger::new();
    let views = ledger.generate_discrepancies(&form, &transfer);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].status, DiscrepancyStatus::Pending);

    ledger.add_resolved_discrepancy(
        "it_1",
        DiscrepancyResolution {
            resolution: "Replaced".into(),
            resolved_at: Utc::now(),
            quantity_accepted: 7,
        },
    );
    let views = ledger.generate_discrepancies(&form, &transfer);
    assert_eq!(views[0].status, DiscrepancyStatus::Resolved);

    // commit the working map in one bulk call
    let outcome = service.resolve_all_discrepancies(&store, &mut ledger)?;
    assert_eq!(outcome, ResolveOutcome::Resolved);
    assert!(ledger.working().is_empty());
    assert!(ledger.is_permanently_resolved("it_1"));

    // the view keeps reporting resolved after the working map cleared
    let views = ledger.generate_discrepancies(&form, &transfer);
    assert_eq!(views[0].status, DiscrepancyStatus::Resolved);

    let resolutions = backend.resolutions.borrow();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].items_to_accept[0].final_quantity_accepted, 7);
    assert_eq!(resolutions[0].items_to_return, vec!["ritem_0".to_string()]);

    Ok(())
}

#[test]
fn receive_is_idempotent_within_a_session() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);

    let first = service.handle_receive_transfer(&mut store, &transfer, &form)?;
    let second = service.handle_receive_transfer(&mut store, &transfer, &form)?;

    assert_eq!(first, ReceiveOutcome::Submitted);
    assert_eq!(second, ReceiveOutcome::AlreadyRecorded);
    assert!(second.success());
    assert!(second.skip_to_next());
    assert_eq!(backend.submission_count(), 1);

    Ok(())
}

#[test]
fn in_flight_submission_short_circuits() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);

    // a submission is pending; a second entry must not reach the backend
    store.set_receiving(true);
    let outcome = service.handle_receive_transfer(&mut store, &transfer, &form)?;

    assert_eq!(outcome, ReceiveOutcome::AlreadyRecorded);
    assert_eq!(backend.submission_count(), 0);

    Ok(())
}

#[test]
fn failed_submission_leaves_state_unchanged() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    let backend = FakeBackend::default();
    backend.fail_submit.set(true);
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);

    let outcome = service.handle_receive_transfer(&mut store, &transfer, &form)?;
    assert_eq!(outcome, ReceiveOutcome::Failed);
    assert!(!outcome.success());
    assert!(store.reception().is_none());
    assert!(!store.is_reception_completed());
    assert!(!store.is_receiving());

    // exactly one error toast, then a retry succeeds
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].severity, Severity::Error);

    backend.fail_submit.set(false);
    let outcome = service.handle_receive_transfer(&mut store, &transfer, &form)?;
    assert_eq!(outcome, ReceiveOutcome::Submitted);
    assert_eq!(backend.submission_count(), 1);

    Ok(())
}

#[test]
fn resume_after_reload_locks_entry_steps() {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    // the page reloads on an already-received transfer
    let existing: RawReceptionResponse = serde_json::from_value(serde_json::json!({
        "id": "rec_tr_1",
        "transferId": "tr_1",
        "status": "Completed",
        "receivedAt": "2026-04-07T08:00:00Z"
    }))
    .unwrap();
    let store = ReceptionStore::initialize(Some(existing.normalize().unwrap()));
    assert!(store.is_reception_completed());

    let notifier = RecordingNotifier::new();
    let mut wizard = Wizard::new(3);
    wizard.handle_next(None::<fn()>);
    wizard.handle_next(None::<fn()>);

    // rewinding past the recorded receipt is forbidden
    wizard.handle_previous(!store.is_reception_completed(), &notifier);
    assert_eq!(wizard.current_step(), 2);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].severity, Severity::Warning);

    // clicking back into the entry step is equally blocked
    wizard.handle_step_click(0, !store.is_reception_completed(), true);
    assert_eq!(wizard.current_step(), 2);
}

#[test]
fn bulk_resolve_failure_resets_working_map() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 7);
    form.set_discrepancy("it_1", DiscrepancyKind::Missing, None);
    form.set_quantity_received("it_2", 4);

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);
    service.handle_receive_transfer(&mut store, &transfer, &form)?;

    let mut ledger = DiscrepancyLedger::new();
    ledger.add_resolved_discrepancy(
        "it_1",
        DiscrepancyResolution {
            resolution: "credited".into(),
            resolved_at: Utc::now(),
            quantity_accepted: 7,
        },
    );

    backend.fail_resolve.set(true);
    let outcome = service.resolve_all_discrepancies(&store, &mut ledger)?;
    assert_eq!(outcome, ResolveOutcome::Failed);
    assert!(ledger.working().is_empty());
    assert!(!ledger.is_permanently_resolved("it_1"));

    Ok(())
}

#[test]
fn resolving_an_unknown_item_fails_fast() -> anyhow::Result<()> {
    let transfer = two_line_transfer();
    let mut form = ReceptionForm::for_transfer(&transfer);
    form.set_quantity_received("it_1", 10);
    form.set_quantity_received("it_2", 4);

    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let mut store = ReceptionStore::initialize(None);
    service.handle_receive_transfer(&mut store, &transfer, &form)?;

    // a working entry that no reception item can account for
    let mut ledger = DiscrepancyLedger::new();
    ledger.add_resolved_discrepancy(
        "it_ghost",
        DiscrepancyResolution {
            resolution: "recounted".into(),
            resolved_at: Utc::now(),
            quantity_accepted: 1,
        },
    );

    let result = service.resolve_all_discrepancies(&store, &mut ledger);
    assert!(result.is_err());
    assert!(backend.resolutions.borrow().is_empty());

    Ok(())
}

#[test]
fn resolve_with_empty_working_map_is_a_noop() -> anyhow::Result<()> {
    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::new();
    let service = ReceptionService::new(&backend, &notifier);
    let store = ReceptionStore::initialize(None);
    let mut ledger = DiscrepancyLedger::new();

    let outcome = service.resolve_all_discrepancies(&store, &mut ledger)?;
    assert_eq!(outcome, ResolveOutcome::NothingToResolve);
    assert!(backend.resolutions.borrow().is_empty());

    Ok(())
}
