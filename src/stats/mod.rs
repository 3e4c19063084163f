//! Stat keys, additive bonus maps and the derived stat block.
//!
//! Every stat source (class base, equipment, skill tree, buffs) is a
//! [`Bonuses`] map. The derived [`StatBlock`] is always rebuilt from the
//! full list of sources by [`derive_stats`]; it is never patched in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every stat a bonus can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    MaxHp,
    MaxMp,
    Str,
    Dex,
    Int,
    Armor,
    CritChance,
    CritMulti,
    Dodge,
    DamagePercent,
    StrPercent,
    DexPercent,
    IntPercent,
    HpPercent,
    MpPercent,
    ArmorPercent,
    LifeOnHit,
    ManaOnHit,
}

impl StatKey {
    pub fn label(&self) -> &'static str {
        match self {
            StatKey::MaxHp => "Max HP",
            StatKey::MaxMp => "Max MP",
            StatKey::Str => "STR",
            StatKey::Dex => "DEX",
            StatKey::Int => "INT",
            StatKey::Armor => "Armor",
            StatKey::CritChance => "% Crit Chance",
            StatKey::CritMulti => "x Crit Multi",
            StatKey::Dodge => "% Dodge",
            StatKey::DamagePercent => "% Damage",
            StatKey::StrPercent => "% STR",
            StatKey::DexPercent => "% DEX",
            StatKey::IntPercent => "% INT",
            StatKey::HpPercent => "% Max HP",
            StatKey::MpPercent => "% Max MP",
            StatKey::ArmorPercent => "% Armor",
            StatKey::LifeOnHit => "Life on Hit",
            StatKey::ManaOnHit => "Mana on Hit",
        }
    }
}

/// Additive stat bonuses. Repeated keys sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bonuses(BTreeMap<StatKey, f32>);

impl Bonuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Bonuses::add`]
    pub fn with(mut self, key: StatKey, value: f32) -> Self {
        self.add(key, value);
        self
    }

    pub fn add(&mut self, key: StatKey, value: f32) {
        *self.0.entry(key).or_insert(0.0) += value;
    }

    pub fn merge(&mut self, other: &Bonuses) {
        for (&key, &value) in &other.0 {
            self.add(key, value);
        }
    }

    /// Merge `other` with each magnitude scaled and rounded to a whole number
    pub fn merge_scaled_rounded(&mut self, other: &Bonuses, scale: f32) {
        for (&key, &value) in &other.0 {
            self.add(key, (value * scale).round());
        }
    }

    pub fn get(&self, key: StatKey) -> f32 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f32)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(StatKey, f32)> for Bonuses {
    fn from_iter<I: IntoIterator<Item = (StatKey, f32)>>(iter: I) -> Self {
        let mut bonuses = Bonuses::new();
        for (key, value) in iter {
            bonuses.add(key, value);
        }
        bonuses
    }
}

/// Concrete stats after all sources and percent multipliers are applied
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub max_hp: f32,
    pub max_mp: f32,
    pub str: f32,
    pub dex: f32,
    pub int: f32,
    pub armor: f32,
    pub crit_chance: f32,
    pub crit_multi: f32,
    pub dodge: f32,
    #[serde(default)]
    pub damage_percent: f32,
    #[serde(default)]
    pub life_on_hit: f32,
    #[serde(default)]
    pub mana_on_hit: f32,
}

impl StatBlock {
    /// Flat view of this block as a bonus map
    pub fn to_bonuses(&self) -> Bonuses {
        [
            (StatKey::MaxHp, self.max_hp),
            (StatKey::MaxMp, self.max_mp),
            (StatKey::Str, self.str),
            (StatKey::Dex, self.dex),
            (StatKey::Int, self.int),
            (StatKey::Armor, self.armor),
            (StatKey::CritChance, self.crit_chance),
            (StatKey::CritMulti, self.crit_multi),
            (StatKey::Dodge, self.dodge),
            (StatKey::DamagePercent, self.damage_percent),
            (StatKey::LifeOnHit, self.life_on_hit),
            (StatKey::ManaOnHit, self.mana_on_hit),
        ]
        .into_iter()
        .collect()
    }

    /// Resolve summed totals into a stat block.
    ///
    /// Each of str/dex/int/max hp/max mp/armor is scaled by its own
    /// percent key and rounded. Armor never goes below zero.
    pub fn from_totals(totals: &Bonuses) -> Self {
        let scaled = |flat: StatKey, pct: StatKey| {
            (totals.get(flat) * (1.0 + totals.get(pct) / 100.0)).round()
        };
        Self {
            max_hp: scaled(StatKey::MaxHp, StatKey::HpPercent),
            max_mp: scaled(StatKey::MaxMp, StatKey::MpPercent),
            str: scaled(StatKey::Str, StatKey::StrPercent),
            dex: scaled(StatKey::Dex, StatKey::DexPercent),
            int: scaled(StatKey::Int, StatKey::IntPercent),
            armor: scaled(StatKey::Armor, StatKey::ArmorPercent).max(0.0),
            crit_chance: totals.get(StatKey::CritChance),
            crit_multi: totals.get(StatKey::CritMulti),
            dodge: totals.get(StatKey::Dodge),
            damage_percent: totals.get(StatKey::DamagePercent),
            life_on_hit: totals.get(StatKey::LifeOnHit),
            mana_on_hit: totals.get(StatKey::ManaOnHit),
        }
    }
}

/// Rebuild a stat block from a base block plus every bonus source.
pub fn derive_stats<'a>(
    base: &StatBlock,
    sources: impl IntoIterator<Item = &'a Bonuses>,
) -> StatBlock {
    let mut totals = base.to_bonuses();
    for source in sources {
        totals.merge(source);
    }
    StatBlock::from_totals(&totals)
}
