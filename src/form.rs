//! Operator-entered reception form state and its validated submission shape
use super::error::ReceptionError;
use super::transfer::Transfer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason code attached to a short-received line. Closed set, mirrored on
/// the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscrepancyKind {
    Damaged,
    Missing,
    Expired,
    WrongItem,
    Other,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscrepancyKind::Damaged => "Damaged",
            DiscrepancyKind::Missing => "Missing",
            DiscrepancyKind::Expired => "Expired",
            DiscrepancyKind::WrongItem => "WrongItem",
            DiscrepancyKind::Other => "Other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscrepancyReason {
    pub kind: DiscrepancyKind,
    pub notes: Option<String>,
}

/// In-progress operator input for one transfer line item. Deliberately
/// loose: quantities arrive keystroke by keystroke, so incomplete and
/// inconsistent states must be representable for the step validators to
/// reject. The strict shape is [`LineReceipt`], produced by
/// [`ReceptionForm::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLineItem {
    pub transfer_item_id: String,
    pub quantity_received: Option<u32>,
    pub discrepancy: Option<DiscrepancyReason>,
}

/// A fully validated line entry: the reason is present exactly when the
/// receipt is short, by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineReceipt {
    Full {
        transfer_item_id: String,
        quantity: u32,
    },
    Short {
        transfer_item_id: String,
        quantity: u32,
        reason: DiscrepancyKind,
        notes: Option<String>,
    },
}

impl LineReceipt {
    pub fn transfer_item_id(&self) -> &str {
        match self {
            LineReceipt::Full { transfer_item_id, .. } => transfer_item_id,
            LineReceipt::Short { transfer_item_id, .. } => transfer_item_id,
        }
    }
    pub fn quantity(&self) -> u32 {
        match self {
            LineReceipt::Full { quantity, .. } => *quantity,
            LineReceipt::Short { quantity, .. } => *quantity,
        }
    }
}

/// The active wizard session's form: one entry per transfer line item,
/// keyed by that item's id. Discarded once the submission succeeds and the
/// server-confirmed record takes over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceptionForm {
    items: Vec<FormLineItem>,
}

impl ReceptionForm {
    /// Seed one empty entry per transfer line item.
    pub fn for_transfer(transfer: &Transfer) -> Self {
        let items = transfer
            .items
            .iter()
            .map(|item| FormLineItem {
                transfer_item_id: item.id.clone(),
                quantity_received: None,
                discrepancy: None,
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[FormLineItem] {
        &self.items
    }

    pub fn item(&self, transfer_item_id: &str) -> Option<&FormLineItem> {
        self.items.iter().find(|i| i.transfer_item_id == transfer_item_id)
    }

    fn item_mut(&mut self, transfer_item_id: &str) -> Option<&mut FormLineItem> {
        self.items.iter_mut().find(|i| i.transfer_item_id == transfer_item_id)
    }

    /// Record the received quantity for a line. Unknown ids are ignored;
    /// the form only ever tracks lines seeded from the transfer.
    pub fn set_quantity_received(&mut self, transfer_item_id: &str, quantity: u32) {
        if let Some(item) = self.item_mut(transfer_item_id) {
            item.quantity_received = Some(quantity);
        }
    }

    pub fn set_discrepancy(
        &mut self,
        transfer_item_id: &str,
        kind: DiscrepancyKind,
        notes: Option<String>,
    ) {
        if let Some(item) = self.item_mut(transfer_item_id) {
            item.discrepancy = Some(DiscrepancyReason { kind, notes });
        }
    }

    pub fn clear_discrepancy(&mut self, transfer_item_id: &str) {
        if let Some(item) = self.item_mut(transfer_item_id) {
            item.discrepancy = None;
        }
    }

    /// Validating transform into the strict per-line shape. Fails on any
    /// line the step validators would reject: a transfer item without a form
    /// entry, a missing quantity, or a short receipt without a reason.
    pub fn finalize(&self, transfer: &Transfer) -> Result<Vec<LineReceipt>, ReceptionError> {
        let mut receipts = Vec::with_capacity(transfer.items.len());

        for line in &transfer.items {
            let form = self
                .item(&line.id)
                .ok_or_else(|| ReceptionError::MissingFormItem(line.id.clone()))?;
            let quantity = form
                .quantity_received
                .ok_or_else(|| ReceptionError::QuantityMissing(line.id.clone()))?;

            if quantity < line.quantity_requested {
                let reason = form
                    .discrepancy
                    .as_ref()
                    .ok_or_else(|| ReceptionError::MissingDiscrepancyReason(line.id.clone()))?;
                receipts.push(LineReceipt::Short {
                    transfer_item_id: line.id.clone(),
                    quantity,
                    reason: reason.kind,
                    notes: reason.notes.clone(),
                });
            } else {
                receipts.push(LineReceipt::Full {
                    transfer_item_id: line.id.clone(),
                    quantity,
                });
            }
        }

        Ok(receipts)
    }
}
