//! Discrepancy resolution bookkeeping for the active session
use super::form::ReceptionForm;
use super::transfer::Transfer;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// How one short-received line was handled. Either absent or complete;
/// there is no partially-filled resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscrepancyResolution {
    pub resolution: String,
    pub resolved_at: DateTime<Utc>,
    pub quantity_accepted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscrepancyStatus {
    Pending,
    Resolved,
}

/// Operator-facing view of one discrepancy, derived on demand from the form
/// and the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscrepancyView {
    pub id: String,
    pub product_name: String,
    pub kind: super::form::DiscrepancyKind,
    pub status: DiscrepancyStatus,
    pub description: Option<String>,
    pub resolution: Option<String>,
}

/// Tracks discrepancy resolution independently of the raw reception record.
///
/// The working map holds resolutions not yet committed to the backend. The
/// permanent set holds item ids whose resolution the backend has accepted; it
/// only grows within a session and survives working-map clears, so a
/// bulk-resolved item never re-appears as pending.
#[derive(Debug, Default)]
pub struct DiscrepancyLedger {
    working: HashMap<String, DiscrepancyResolution>,
    permanent: HashSet<String>,
}

impl DiscrepancyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the working resolution for one item.
    pub fn add_resolved_discrepancy(&mut self, item_id: impl Into<String>, resolution: DiscrepancyResolution) {
        self.working.insert(item_id.into(), resolution);
    }

    /// Commit: move the given ids into the permanent set and clear the whole
    /// working map. The bulk-resolve call supersedes every pending working
    /// entry, not just the ids being committed.
    pub fn mark_as_permanently_resolved<I, S>(&mut self, item_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in item_ids {
            self.permanent.insert(id.into());
        }
        self.working.clear();
    }

    /// Reset after a failed or abandoned bulk attempt. Permanent set is
    /// untouched.
    pub fn clear_resolved_discrepancies(&mut self) {
        self.working.clear();
    }

    pub fn working(&self) -> &HashMap<String, DiscrepancyResolution> {
        &self.working
    }

    pub fn is_permanently_resolved(&self, item_id: &str) -> bool {
        self.permanent.contains(item_id)
    }

    fn is_resolved(&self, item_id: &str) -> bool {
        self.working.contains_key(item_id) || self.permanent.contains(item_id)
    }

    /// Derive the operator-facing discrepancy list. Only form lines carrying
    /// a discrepancy reason appear; full receipts are excluded entirely.
    pub fn generate_discrepancies(&self, form: &ReceptionForm, transfer: &Transfer) -> Vec<DiscrepancyView> {
        form.items()
            .iter()
            .filter_map(|line| {
                let reason = line.discrepancy.as_ref()?;
                let product_name = transfer
                    .item(&line.transfer_item_id)
                    .map(|i| i.product_descriptor.clone())
                    .unwrap_or_default();
                let status = if self.is_resolved(&line.transfer_item_id) {
                    DiscrepancyStatus::Resolved
                } else {
                    DiscrepancyStatus::Pending
                };
                Some(DiscrepancyView {
                    id: line.transfer_item_id.clone(),
                    product_name,
                    kind: reason.kind,
                    status,
                    description: reason.notes.clone(),
                    resolution: self
                        .working
                        .get(&line.transfer_item_id)
                        .map(|r| r.resolution.clone()),
                })
            })
            .collect()
    }
}
