//! Transfer definition types, read-only input to the reception workflow
use uuid7::uuid7;

/// One line item of a warehouse-to-warehouse transfer. Issued by the backend
/// when the transfer is created; never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLineItem {
    pub id: String,
    pub product_descriptor: String,
    pub quantity_requested: u32,
}

/// A transfer of inventory line items from an origin warehouse to a
/// destination warehouse, as supplied by the surrounding container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub id: String,
    pub origin_id: String,
    pub destination_id: String,
    pub items: Vec<TransferLineItem>,
}

impl Transfer {
    pub fn new(id: impl Into<String>, origin_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin_id: origin_id.into(),
            destination_id: destination_id.into(),
            items: vec![],
        }
    }

    /// Append a line item with a caller-supplied id.
    pub fn with_item(
        mut self,
        id: impl Into<String>,
        product_descriptor: impl Into<String>,
        quantity_requested: u32,
    ) -> Self {
        self.items.push(TransferLineItem {
            id: id.into(),
            product_descriptor: product_descriptor.into(),
            quantity_requested,
        });
        self
    }

    /// Append a line item with a generated id. Convenience for fixtures.
    pub fn with_new_item(self, product_descriptor: impl Into<String>, quantity_requested: u32) -> Self {
        let id = format!("titem_{}", uuid7());
        self.with_item(id, product_descriptor, quantity_requested)
    }

    pub fn item(&self, item_id: &str) -> Option<&TransferLineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}
