use std::{collections::HashMap, sync::Arc};

/// Quantity ledger seam. The real ledger lives outside this subsystem;
/// placement only ever checks, then debits, and trusts neither call.
pub trait Inventory {
    fn has_quantity(&self, item_id: &str, quantity: u32) -> bool;

    /// Returns false (and changes nothing) when the ledger holds less
    /// than `quantity`.
    fn debit(&mut self, item_id: &str, quantity: u32) -> bool;

    fn credit(&mut self, item_id: &str, quantity: u32);
}

/// Reference in-memory ledger. Zeroed entries are removed.
#[derive(Default)]
pub struct MemoryInventory {
    items: HashMap<Arc<str>, u32>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: &[(&str, u32)]) -> Self {
        let mut inventory = Self::new();
        for (item_id, quantity) in items {
            inventory.credit(item_id, *quantity);
        }
        inventory
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn first_available(&self) -> Option<Arc<str>> {
        self.items
            .iter()
            .find(|(_, quantity)| **quantity > 0)
            .map(|(item_id, _)| item_id.clone())
    }
}

impl Inventory for MemoryInventory {
    fn has_quantity(&self, item_id: &str, quantity: u32) -> bool {
        self.quantity(item_id) >= quantity
    }

    fn debit(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(held) = self.items.get_mut(item_id) else {
            log::warn!("Failed to remove {} x {}: not in ledger", quantity, item_id);
            return false;
        };
        if *held < quantity {
            log::warn!("Failed to remove {} x {}: only {} held", quantity, item_id, held);
            return false;
        }
        *held -= quantity;
        if *held == 0 {
            self.items.remove(item_id);
        }
        log::debug!("Removed {} x {} from inventory", quantity, item_id);
        true
    }

    fn credit(&mut self, item_id: &str, quantity: u32) {
        *self.items.entry(item_id.into()).or_insert(0) += quantity;
        log::debug!("Added {} x {} to inventory", quantity, item_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_refuses_overdraw_and_removes_zeroed_entries() {
        let mut inventory = MemoryInventory::with_items(&[("rock", 2)]);

        assert!(!inventory.debit("rock", 3));
        assert_eq!(inventory.quantity("rock"), 2);

        assert!(inventory.debit("rock", 2));
        assert_eq!(inventory.quantity("rock"), 0);
        assert!(!inventory.has_quantity("rock", 1));
        assert!(!inventory.debit("rock", 1));
    }

    #[test]
    fn first_available_skips_nothing_held() {
        let inventory = MemoryInventory::with_items(&[("rock", 1)]);
        assert_eq!(inventory.first_available().as_deref(), Some("rock"));
        assert!(MemoryInventory::new().first_available().is_none());
    }
}
