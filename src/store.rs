//! Server-confirmed reception record and the session-local state store
use super::error::ReceptionError;
use chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceptionStatus {
    Pending,
    Completed,
    WithDiscrepancies,
}

impl FromStr for ReceptionStatus {
    type Err = ReceptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReceptionStatus::Pending),
            "Completed" => Ok(ReceptionStatus::Completed),
            "WithDiscrepancies" => Ok(ReceptionStatus::WithDiscrepancies),
            other => Err(ReceptionError::UnknownStatus(other.to_string())),
        }
    }
}

/// One server-confirmed received line. `id` is the backend's reception-item
/// identifier, distinct from the transfer item it fulfils.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionItem {
    pub id: String,
    pub transfer_item_id: String,
    pub quantity_received: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionComment {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The reception as confirmed by the backend. Created exactly once per
/// transfer; `id` and `transfer_id` never change afterwards, the record is
/// only refined as discrepancies get resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionRecord {
    pub id: String,
    pub transfer_id: String,
    pub status: ReceptionStatus,
    pub items: Vec<ReceptionItem>,
    pub comments: Vec<ReceptionComment>,
    pub received_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ReceptionRecord {
    pub fn item_for_transfer_item(&self, transfer_item_id: &str) -> Option<&ReceptionItem> {
        self.items.iter().find(|i| i.transfer_item_id == transfer_item_id)
    }
}

/// Shallow-merge patch for [`ReceptionStore::update_reception_data`].
#[derive(Debug, Clone, Default)]
pub struct ReceptionPatch {
    pub status: Option<ReceptionStatus>,
    pub notes: Option<String>,
    pub comments: Vec<ReceptionComment>,
}

/// Single authoritative in-memory projection of the reception for the active
/// wizard session. All reads and mutations are synchronous; the session is
/// single-threaded, so last-write-wins is the only ordering needed.
#[derive(Debug, Default)]
pub struct ReceptionStore {
    reception: Option<ReceptionRecord>,
    is_receiving: bool,
    is_reception_completed: bool,
}

impl ReceptionStore {
    /// Seed the store, optionally from a reception that already exists on
    /// the backend (page reload on an already-received transfer). Supplying
    /// an existing record locks the session as completed.
    pub fn initialize(existing: Option<ReceptionRecord>) -> Self {
        let is_reception_completed = existing.is_some();
        Self {
            reception: existing,
            is_receiving: false,
            is_reception_completed,
        }
    }

    pub fn reception(&self) -> Option<&ReceptionRecord> {
        self.reception.as_ref()
    }

    /// Wholesale replacement, used after a successful submission.
    pub fn set_reception_data(&mut self, record: ReceptionRecord) {
        self.reception = Some(record);
    }

    /// Shallow merge into the held record. No-op when nothing is held yet.
    pub fn update_reception_data(&mut self, patch: ReceptionPatch) {
        let Some(reception) = self.reception.as_mut() else {
            return;
        };
        if let Some(status) = patch.status {
            reception.status = status;
        }
        if let Some(notes) = patch.notes {
            reception.notes = Some(notes);
        }
        reception.comments.extend(patch.comments);
    }

    pub fn is_receiving(&self) -> bool {
        self.is_receiving
    }

    /// Set before the backend call is issued so a re-entrant receive attempt
    /// sees the flag and short-circuits.
    pub fn set_receiving(&mut self, receiving: bool) {
        self.is_receiving = receiving;
    }

    pub fn is_reception_completed(&self) -> bool {
        self.is_reception_completed
    }

    pub fn mark_completed(&mut self) {
        self.is_reception_completed = true;
    }
}
