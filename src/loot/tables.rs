//! Shipped loot data: item bases, affixes, potions and floor allow-lists.

use super::{Affix, EquipSlot, ItemBase, LootTables, PotionDef, PotionEffect, WeaponProfile};
use crate::constants::FULL_POTION_POOL_FLOOR;
use crate::stats::StatKey;

fn weapon(key: &str, name: &str, damage: (i32, i32)) -> ItemBase {
    ItemBase {
        key: key.into(),
        name: name.into(),
        slot: EquipSlot::Weapon,
        weapon: Some(WeaponProfile {
            damage,
            range: None,
            cooldown: None,
            arc: None,
        }),
        armor: 0,
        dodge: 0,
    }
}

fn armor(key: &str, name: &str, slot: EquipSlot, armor: i32, dodge: i32) -> ItemBase {
    ItemBase {
        key: key.into(),
        name: name.into(),
        slot,
        weapon: None,
        armor,
        dodge,
    }
}

fn affix(name: &str, bonuses: &[(StatKey, f32)]) -> Affix {
    Affix {
        name: name.into(),
        bonuses: bonuses.iter().copied().collect(),
    }
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

pub fn default_item_bases() -> Vec<ItemBase> {
    use EquipSlot::*;
    vec![
        weapon("rusty_sword", "Rusty Sword", (4, 8)),
        weapon("iron_sword", "Iron Sword", (7, 13)),
        weapon("dark_blade", "Dark Blade", (10, 18)),
        weapon("flame_sword", "Flame Sword", (14, 24)),
        weapon("doom_axe", "Doom Axe", (18, 30)),
        armor("leather_cap", "Leather Cap", Helmet, 2, 0),
        armor("iron_helm", "Iron Helm", Helmet, 5, 0),
        armor("dark_crown", "Dark Crown", Helmet, 8, 0),
        armor("cloth_robe", "Cloth Robe", Chest, 3, 0),
        armor("chain_mail", "Chain Mail", Chest, 7, 0),
        armor("plate_armor", "Plate Armor", Chest, 12, 0),
        armor("sandals", "Sandals", Boots, 1, 2),
        armor("iron_boots", "Iron Boots", Boots, 4, 0),
        armor("shadow_boots", "Shadow Boots", Boots, 2, 8),
        armor("copper_ring", "Copper Ring", Ring, 0, 0),
        armor("gold_ring", "Gold Ring", Ring, 0, 0),
    ]
}

pub fn default_prefixes() -> Vec<Affix> {
    use StatKey::*;
    vec![
        affix("Sharp", &[(StrPercent, 10.0)]),
        affix("Sturdy", &[(Armor, 3.0)]),
        affix("Quick", &[(CritChance, 5.0)]),
        affix("Vital", &[(MaxHp, 15.0)]),
        affix("Arcane", &[(MaxMp, 15.0)]),
        affix("Deadly", &[(CritMulti, 0.2)]),
        affix("Evasive", &[(Dodge, 5.0)]),
        affix("Mighty", &[(Str, 3.0)]),
    ]
}

pub fn default_suffixes() -> Vec<Affix> {
    use StatKey::*;
    vec![
        affix("of Power", &[(Str, 5.0)]),
        affix("of the Bear", &[(MaxHp, 25.0)]),
        affix("of the Fox", &[(Dodge, 4.0), (CritChance, 3.0)]),
        affix("of the Owl", &[(MaxMp, 20.0), (Int, 3.0)]),
        affix("of Fury", &[(CritMulti, 0.3)]),
        affix("of Iron", &[(Armor, 5.0)]),
        affix("of Haste", &[(Dex, 4.0)]),
        affix("of Life", &[(MaxHp, 20.0), (Armor, 2.0)]),
    ]
}

pub fn default_potions() -> Vec<PotionDef> {
    vec![
        PotionDef {
            name: "Health Potion".into(),
            effect: PotionEffect::Heal(30),
            min_floor: 1,
        },
        PotionDef {
            name: "Greater Health Potion".into(),
            effect: PotionEffect::Heal(60),
            min_floor: 1,
        },
        PotionDef {
            name: "Mana Potion".into(),
            effect: PotionEffect::Mana(25),
            min_floor: 1,
        },
        PotionDef {
            name: "Strength Elixir".into(),
            effect: PotionEffect::Buff {
                stat: StatKey::Str,
                value: 5.0,
                duration: 20.0,
            },
            min_floor: FULL_POTION_POOL_FLOOR,
        },
    ]
}

pub fn default_floor_loot() -> Vec<Vec<String>> {
    vec![
        keys(&["rusty_sword", "leather_cap", "cloth_robe", "sandals", "copper_ring"]),
        keys(&[
            "rusty_sword",
            "iron_sword",
            "leather_cap",
            "iron_helm",
            "cloth_robe",
            "chain_mail",
            "sandals",
            "iron_boots",
            "copper_ring",
        ]),
        keys(&[
            "iron_sword",
            "dark_blade",
            "iron_helm",
            "chain_mail",
            "iron_boots",
            "shadow_boots",
            "copper_ring",
            "gold_ring",
        ]),
        keys(&[
            "dark_blade",
            "flame_sword",
            "iron_helm",
            "dark_crown",
            "chain_mail",
            "plate_armor",
            "shadow_boots",
            "gold_ring",
        ]),
        keys(&[
            "flame_sword",
            "doom_axe",
            "dark_crown",
            "plate_armor",
            "shadow_boots",
            "gold_ring",
        ]),
    ]
}

pub fn default_loot_tables() -> LootTables {
    LootTables {
        bases: default_item_bases(),
        prefixes: default_prefixes(),
        suffixes: default_suffixes(),
        potions: default_potions(),
        floor_loot: default_floor_loot(),
    }
}
