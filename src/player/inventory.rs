//! Inventory and equipment.
//!
//! The inventory is a fixed row of optional slots; equipment has one
//! optional item per [`EquipSlot`]. Moving loot between them (or to the
//! ground) always moves the value, never clones it.

use serde::{Deserialize, Serialize};

use crate::constants::INVENTORY_SIZE;
use crate::loot::{EquipSlot, Item, Loot, WeaponProfile};
use crate::stats::Bonuses;

/// Fixed-size bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<Loot>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(INVENTORY_SIZE)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Put loot in the first empty slot. Hands it back when full.
    pub fn add(&mut self, loot: Loot) -> Result<usize, Loot> {
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(loot);
                Ok(idx)
            }
            None => Err(loot),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Loot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Empty a slot, returning whatever was in it
    pub fn take(&mut self, index: usize) -> Option<Loot> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Fill an empty slot; gives the loot back if the slot is taken or missing
    pub fn put(&mut self, index: usize, loot: Loot) -> Result<(), Loot> {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(loot);
                Ok(())
            }
            _ => Err(loot),
        }
    }

    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn slots(&self) -> &[Option<Loot>] {
        &self.slots
    }
}

/// Currently equipped gear, one item per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    slots: [Option<Item>; 5],
}

impl Equipment {
    pub fn get(&self, slot: EquipSlot) -> Option<&Item> {
        self.slots[slot.index()].as_ref()
    }

    /// Equip an item, returning what it replaced
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        let idx = item.slot.index();
        self.slots[idx].replace(item)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Option<Item> {
        self.slots[slot.index()].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.slots.iter().flatten()
    }

    pub fn weapon(&self) -> Option<&WeaponProfile> {
        self.get(EquipSlot::Weapon).and_then(|w| w.weapon.as_ref())
    }

    /// Bonus map of every equipped item
    pub fn bonuses(&self) -> Vec<Bonuses> {
        self.iter().map(Item::equipped_bonuses).collect()
    }
}
