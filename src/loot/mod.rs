//! Item and potion generation.
//!
//! Rarity is a weighted roll, the base template comes from the floor's
//! allow-list, and non-Common items pick up prefix/suffix affixes whose
//! bonuses accumulate additively. Potions are a separate, rarity-free pool.

pub mod tables;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{FULL_POTION_POOL_FLOOR, LEGENDARY_EXTRA_PREFIX_MULT};
use crate::stats::{Bonuses, StatKey};
use crate::utils::weighted_choice;

/// Item rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Magic,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Magic,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    /// Relative drop weight
    pub fn weight(&self) -> f32 {
        match self {
            Self::Common => 60.0,
            Self::Magic => 25.0,
            Self::Rare => 12.0,
            Self::Legendary => 3.0,
        }
    }

    /// Multiplier applied to base damage and armor
    pub fn stat_multiplier(&self) -> f32 {
        match self {
            Self::Common => 1.0,
            Self::Magic => 1.5,
            Self::Rare => 2.2,
            Self::Legendary => 3.5,
        }
    }

    pub fn has_prefix(&self) -> bool {
        *self != Self::Common
    }

    pub fn has_suffix(&self) -> bool {
        matches!(self, Self::Rare | Self::Legendary)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Magic => "Magic",
            Self::Rare => "Rare",
            Self::Legendary => "Legendary",
        }
    }
}

/// Equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Helmet,
    Chest,
    Boots,
    Ring,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 5] = [
        EquipSlot::Weapon,
        EquipSlot::Helmet,
        EquipSlot::Chest,
        EquipSlot::Boots,
        EquipSlot::Ring,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Weapon => 0,
            Self::Helmet => 1,
            Self::Chest => 2,
            Self::Boots => 3,
            Self::Ring => 4,
        }
    }
}

/// Weapon-only fields. Unset range/cooldown/arc fall back to the class defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub damage: (i32, i32),
    #[serde(default)]
    pub range: Option<f32>,
    #[serde(default)]
    pub cooldown: Option<f32>,
    #[serde(default)]
    pub arc: Option<f32>,
}

/// Item template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBase {
    pub key: String,
    pub name: String,
    pub slot: EquipSlot,
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub dodge: i32,
}

/// Named bonus bundle attached to non-Common items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    pub name: String,
    pub bonuses: Bonuses,
}

/// Potion effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PotionEffect {
    Heal(i32),
    Mana(i32),
    Buff {
        stat: StatKey,
        value: f32,
        duration: f32,
    },
}

/// Potion template; `min_floor` gates when it enters the drop pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotionDef {
    pub name: String,
    pub effect: PotionEffect,
    #[serde(default = "default_min_floor")]
    pub min_floor: u32,
}

fn default_min_floor() -> u32 {
    1
}

/// All loot data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTables {
    pub bases: Vec<ItemBase>,
    pub prefixes: Vec<Affix>,
    pub suffixes: Vec<Affix>,
    pub potions: Vec<PotionDef>,
    /// Allow-list of base keys per floor tier; the last tier covers deeper floors
    pub floor_loot: Vec<Vec<String>>,
}

impl Default for LootTables {
    fn default() -> Self {
        tables::default_loot_tables()
    }
}

impl LootTables {
    pub fn base(&self, key: &str) -> Option<&ItemBase> {
        self.bases.iter().find(|b| b.key == key)
    }

    /// Allow-list for a floor (floors below 1 use tier 1)
    pub fn floor_table(&self, floor: u32) -> &[String] {
        let idx = (floor.max(1) as usize - 1).min(self.floor_loot.len().saturating_sub(1));
        self.floor_loot.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Potions that can drop on a floor
    pub fn potion_pool(&self, floor: u32) -> Vec<&PotionDef> {
        self.potions.iter().filter(|p| floor >= p.min_floor).collect()
    }
}

/// A generated piece of equipment. Rarity and bonuses are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub base_key: String,
    pub name: String,
    pub slot: EquipSlot,
    pub rarity: Rarity,
    pub bonuses: Bonuses,
    pub weapon: Option<WeaponProfile>,
    pub armor: i32,
    pub dodge: i32,
}

impl Item {
    /// Everything this item adds while equipped: affixes plus base armor/dodge
    pub fn equipped_bonuses(&self) -> Bonuses {
        let mut bonuses = self.bonuses.clone();
        if self.armor != 0 {
            bonuses.add(StatKey::Armor, self.armor as f32);
        }
        if self.dodge != 0 {
            bonuses.add(StatKey::Dodge, self.dodge as f32);
        }
        bonuses
    }

    /// Human-readable stat lines
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(weapon) = &self.weapon {
            lines.push(format!("Damage: {}-{}", weapon.damage.0, weapon.damage.1));
        }
        if self.armor != 0 {
            lines.push(format!("Armor: +{}", self.armor));
        }
        if self.dodge != 0 {
            lines.push(format!("Dodge: +{}%", self.dodge));
        }
        for (key, value) in self.bonuses.iter() {
            lines.push(format!("+{} {}", value, key.label()));
        }
        lines
    }
}

/// A generated consumable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Potion {
    pub name: String,
    pub effect: PotionEffect,
}

/// Anything that can sit in an inventory slot or on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loot {
    Gear(Item),
    Potion(Potion),
}

impl Loot {
    pub fn name(&self) -> &str {
        match self {
            Loot::Gear(item) => &item.name,
            Loot::Potion(potion) => &potion.name,
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            Loot::Gear(item) => item.rarity,
            Loot::Potion(_) => Rarity::Common,
        }
    }
}

/// Roll a rarity tier by weight
pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
    let weights = Rarity::ALL.map(|r| r.weight());
    weighted_choice(&Rarity::ALL, &weights, rng)
        .copied()
        .unwrap_or(Rarity::Common)
}

/// Generate an item for `floor`. `None` only when the floor's table is empty.
pub fn generate_item<R: Rng + ?Sized>(tables: &LootTables, floor: u32, rng: &mut R) -> Option<Item> {
    let rarity = roll_rarity(rng);
    let base_key = tables.floor_table(floor).choose(rng)?;
    let base = tables.base(base_key)?;
    let mult = rarity.stat_multiplier();

    let weapon = base.weapon.map(|w| WeaponProfile {
        damage: (
            (w.damage.0 as f32 * mult).round() as i32,
            (w.damage.1 as f32 * mult).round() as i32,
        ),
        ..w
    });
    let armor = (base.armor as f32 * mult).round() as i32;

    let mut bonuses = Bonuses::new();
    let mut name = base.name.clone();

    if rarity.has_prefix() {
        if let Some(prefix) = tables.prefixes.choose(rng) {
            name = format!("{} {}", prefix.name, name);
            bonuses.merge(&prefix.bonuses);
        }
    }
    if rarity.has_suffix() {
        if let Some(suffix) = tables.suffixes.choose(rng) {
            name = format!("{} {}", name, suffix.name);
            bonuses.merge(&suffix.bonuses);
        }
    }
    if rarity == Rarity::Legendary {
        if let Some(extra) = tables.prefixes.choose(rng) {
            bonuses.merge_scaled_rounded(&extra.bonuses, LEGENDARY_EXTRA_PREFIX_MULT);
        }
    }

    trace!(floor, base = %base.key, rarity = rarity.name(), "Generated item");

    Some(Item {
        base_key: base.key.clone(),
        name,
        slot: base.slot,
        rarity,
        bonuses,
        weapon,
        armor,
        dodge: base.dodge,
    })
}

/// Generate a potion for `floor`. Fewer potion types exist before floor 3.
pub fn generate_potion<R: Rng + ?Sized>(
    tables: &LootTables,
    floor: u32,
    rng: &mut R,
) -> Option<Potion> {
    let pool = tables.potion_pool(floor);
    let def = pool.choose(rng)?;
    Some(Potion {
        name: def.name.clone(),
        effect: def.effect,
    })
}

/// Whether a floor has the full potion pool
pub fn full_potion_pool(floor: u32) -> bool {
    floor >= FULL_POTION_POOL_FLOOR
}
