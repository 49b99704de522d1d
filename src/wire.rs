//! JSON shapes exchanged with the backend reception API
//!
//! Outbound payloads carry the exact field names the backend expects.
//! Inbound responses are loosely shaped and pass through one validating
//! transform at this boundary; a missing required field fails the operation
//! instead of defaulting silently.
use super::error::ReceptionError;
use super::form::{DiscrepancyKind, LineReceipt};
use super::ledger::DiscrepancyResolution;
use super::store::{ReceptionComment, ReceptionItem, ReceptionRecord, ReceptionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed wording the backend stores alongside a bulk resolution.
pub const RESOLVE_ALL_DESCRIPTION: &str = "Todas las discrepancias han sido resueltas";
/// Backend discriminator for the bulk "accept with adjustment" resolution.
pub const RESOLVE_ALL_TYPE: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveItemPayload {
    pub transfer_item_id: String,
    pub quantity_received: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy_type: Option<DiscrepancyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveTransferPayload {
    pub transfer_id: String,
    pub items: Vec<ReceiveItemPayload>,
}

impl ReceiveTransferPayload {
    /// Build the submission body from the validated line receipts. The sum
    /// type guarantees a reason is present exactly on short lines.
    pub fn from_receipts(transfer_id: impl Into<String>, receipts: &[LineReceipt]) -> Self {
        let items = receipts
            .iter()
            .map(|receipt| match receipt {
                LineReceipt::Full { transfer_item_id, quantity } => ReceiveItemPayload {
                    transfer_item_id: transfer_item_id.clone(),
                    quantity_received: *quantity,
                    discrepancy_type: None,
                    discrepancy_notes: None,
                },
                LineReceipt::Short { transfer_item_id, quantity, reason, notes } => ReceiveItemPayload {
                    transfer_item_id: transfer_item_id.clone(),
                    quantity_received: *quantity,
                    discrepancy_type: Some(*reason),
                    discrepancy_notes: notes.clone(),
                },
            })
            .collect();
        Self {
            transfer_id: transfer_id.into(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAcceptItem {
    pub transfer_reception_item_id: String,
    pub final_quantity_accepted: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAllPayload {
    pub resolution_description: String,
    pub resolution_type: i32,
    pub items_to_return: Vec<String>,
    pub items_to_accept: Vec<ResolveAcceptItem>,
}

/// Build the single bulk-resolution request from the working map. Every
/// working entry must match a server-confirmed reception item; a miss means
/// the ledger and the record have diverged, and silently dropping the entry
/// would let a discrepancy vanish without reaching the backend, so this
/// fails fast instead.
pub fn build_resolve_all_payload(
    working: &HashMap<String, DiscrepancyResolution>,
    reception: &ReceptionRecord,
) -> Result<ResolveAllPayload, ReceptionError> {
    let mut items_to_return = Vec::with_capacity(working.len());
    let mut items_to_accept = Vec::with_capacity(working.len());

    for (transfer_item_id, resolution) in working {
        let reception_item = reception
            .item_for_transfer_item(transfer_item_id)
            .ok_or_else(|| ReceptionError::MissingReceptionItem(transfer_item_id.clone()))?;

        items_to_return.push(reception_item.id.clone());
        items_to_accept.push(ResolveAcceptItem {
            transfer_reception_item_id: reception_item.id.clone(),
            final_quantity_accepted: resolution.quantity_accepted,
            adjustment_notes: Some(resolution.resolution.clone()),
        });
    }

    Ok(ResolveAllPayload {
        resolution_description: RESOLVE_ALL_DESCRIPTION.to_string(),
        resolution_type: RESOLVE_ALL_TYPE,
        items_to_return,
        items_to_accept,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawReceptionItem {
    pub id: Option<String>,
    pub transfer_item_id: Option<String>,
    pub quantity_received: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawReceptionComment {
    pub author: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Reception response as the backend actually sends it. Everything is
/// optional here; [`RawReceptionResponse::normalize`] decides what is
/// required.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawReceptionResponse {
    pub id: Option<String>,
    pub transfer_id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<RawReceptionItem>,
    #[serde(default)]
    pub comments: Vec<RawReceptionComment>,
    pub received_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Error indicator; a populated value means the submission was rejected
    /// even though the call itself returned.
    pub error: Option<String>,
}

impl RawReceptionResponse {
    /// Validating transform into the canonical record. Rejects on any
    /// missing required field or unknown status string.
    pub fn normalize(self) -> Result<ReceptionRecord, ReceptionError> {
        let id = self.id.ok_or(ReceptionError::MalformedResponse("id"))?;
        let transfer_id = self
            .transfer_id
            .ok_or(ReceptionError::MalformedResponse("transferId"))?;
        let status: ReceptionStatus = self
            .status
            .ok_or(ReceptionError::MalformedResponse("status"))?
            .parse()?;
        let received_at = self
            .received_at
            .ok_or(ReceptionError::MalformedResponse("receivedAt"))?;

        let mut items = Vec::with_capacity(self.items.len());
        for raw in self.items {
            items.push(ReceptionItem {
                id: raw.id.ok_or(ReceptionError::MalformedResponse("items.id"))?,
                transfer_item_id: raw
                    .transfer_item_id
                    .ok_or(ReceptionError::MalformedResponse("items.transferItemId"))?,
                quantity_received: raw
                    .quantity_received
                    .ok_or(ReceptionError::MalformedResponse("items.quantityReceived"))?,
            });
        }

        let comments = self
            .comments
            .into_iter()
            .map(|raw| ReceptionComment {
                author: raw.author.unwrap_or_default(),
                text: raw.text.unwrap_or_default(),
                created_at: raw.created_at.unwrap_or(received_at),
            })
            .collect();

        Ok(ReceptionRecord {
            id,
            transfer_id,
            status,
            items,
            comments,
            received_at,
            notes: self.notes,
        })
    }
}
