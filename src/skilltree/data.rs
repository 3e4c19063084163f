//! Shipped passive tree: an Origin node with STR (top), DEX (bottom-left)
//! and INT (bottom-right) clusters plus three cross-cluster connectors.

use super::{NodeCategory, NodeKind, SkillNodeDef};
use crate::stats::StatKey::{self, *};

#[allow(clippy::too_many_arguments)]
fn n(
    id: &str,
    name: &str,
    description: &str,
    kind: NodeKind,
    category: NodeCategory,
    bonuses: &[(StatKey, f32)],
    position: (f32, f32),
    connections: &[&str],
) -> SkillNodeDef {
    SkillNodeDef {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        kind,
        category,
        bonuses: bonuses.iter().copied().collect(),
        connections: connections.iter().map(|c| c.to_string()).collect(),
        min_level: None,
        position,
    }
}

pub fn default_nodes() -> Vec<SkillNodeDef> {
    use NodeCategory::{Dex as D, Int as I, Neutral as N, Str as S};
    use NodeKind::{Keystone as K, Notable as No, Small as Sm, Start as St};

    vec![
        n("start", "Origin", "Starting point", St, N, &[], (0.0, 0.0),
            &["str_path_1", "dex_path_1", "int_path_1"]),

        // Strength
        n("str_path_1", "Toughness", "+10 Max HP", Sm, S, &[(MaxHp, 10.0)], (0.0, -80.0),
            &["start", "str_path_2", "str_path_1a"]),
        n("str_path_1a", "Thick Skin", "+2 Armor", Sm, S, &[(Armor, 2.0)], (70.0, -60.0),
            &["str_path_1", "str_path_3"]),
        n("str_path_2", "Brute Force", "+2 STR", Sm, S, &[(Str, 2.0)], (-50.0, -140.0),
            &["str_path_1", "str_notable_1"]),
        n("str_path_3", "Resilience", "+15 Max HP", Sm, S, &[(MaxHp, 15.0)], (80.0, -140.0),
            &["str_path_1a", "str_notable_1"]),
        n("str_notable_1", "Warrior's Resolve", "+25 Max HP, +3 Armor", No, S,
            &[(MaxHp, 25.0), (Armor, 3.0)], (0.0, -200.0),
            &["str_path_2", "str_path_3", "str_path_4", "str_path_5"]),
        n("str_path_4", "Iron Fist", "+3 STR", Sm, S, &[(Str, 3.0)], (-80.0, -260.0),
            &["str_notable_1", "str_path_6"]),
        n("str_path_5", "Fortify", "+4 Armor", Sm, S, &[(Armor, 4.0)], (80.0, -260.0),
            &["str_notable_1", "str_path_7"]),
        n("str_path_6", "Savage Blows", "+10% Damage", Sm, S, &[(DamagePercent, 10.0)],
            (-120.0, -330.0), &["str_path_4", "str_notable_2"]),
        n("str_path_7", "Bulwark", "+20 Max HP, +2 Armor", Sm, S,
            &[(MaxHp, 20.0), (Armor, 2.0)], (120.0, -330.0), &["str_path_5", "str_notable_2"]),
        n("str_notable_2", "Berserker Rage", "+15% Damage, +4 STR", No, S,
            &[(DamagePercent, 15.0), (Str, 4.0)], (0.0, -390.0),
            &["str_path_6", "str_path_7", "str_keystone"]),
        n("str_path_8", "Endless Vitality", "+30 Max HP", Sm, S, &[(MaxHp, 30.0)],
            (60.0, -450.0), &["str_notable_2", "str_keystone"]),
        n("str_keystone", "Glass Cannon", "2x All Damage, but -50 Max HP", K, S,
            &[(DamagePercent, 100.0), (MaxHp, -50.0)], (-60.0, -470.0),
            &["str_notable_2", "str_path_8"]),

        // Dexterity
        n("dex_path_1", "Precision", "+2% Crit Chance", Sm, D, &[(CritChance, 2.0)],
            (-70.0, 60.0), &["start", "dex_path_2", "dex_path_1a"]),
        n("dex_path_1a", "Nimbleness", "+3% Dodge", Sm, D, &[(Dodge, 3.0)], (-40.0, 120.0),
            &["dex_path_1", "dex_path_3"]),
        n("dex_path_2", "Quick Reflexes", "+2 DEX", Sm, D, &[(Dex, 2.0)], (-140.0, 100.0),
            &["dex_path_1", "dex_notable_1"]),
        n("dex_path_3", "Agility", "+3% Dodge, +1% Crit", Sm, D,
            &[(Dodge, 3.0), (CritChance, 1.0)], (-100.0, 180.0),
            &["dex_path_1a", "dex_notable_1"]),
        n("dex_notable_1", "Shadow Step", "+5% Crit Chance, +5% Dodge", No, D,
            &[(CritChance, 5.0), (Dodge, 5.0)], (-180.0, 180.0),
            &["dex_path_2", "dex_path_3", "dex_path_4", "dex_path_5"]),
        n("dex_path_4", "Lethal Strikes", "+0.2x Crit Multiplier", Sm, D, &[(CritMulti, 0.2)],
            (-250.0, 140.0), &["dex_notable_1", "dex_path_6"]),
        n("dex_path_5", "Evasion Mastery", "+5% Dodge", Sm, D, &[(Dodge, 5.0)],
            (-220.0, 250.0), &["dex_notable_1", "dex_path_7"]),
        n("dex_path_6", "Assassin's Mark", "+4% Crit, +3 DEX", Sm, D,
            &[(CritChance, 4.0), (Dex, 3.0)], (-310.0, 200.0), &["dex_path_4", "dex_notable_2"]),
        n("dex_path_7", "Wind Walker", "+4% Dodge, +2 DEX", Sm, D,
            &[(Dodge, 4.0), (Dex, 2.0)], (-280.0, 310.0), &["dex_path_5", "dex_notable_2"]),
        n("dex_notable_2", "Perfect Strikes", "+0.3x Crit Multi, +5% Crit", No, D,
            &[(CritMulti, 0.3), (CritChance, 5.0)], (-340.0, 280.0),
            &["dex_path_6", "dex_path_7", "dex_keystone"]),
        n("dex_path_8", "Phantom", "+8% Dodge", Sm, D, &[(Dodge, 8.0)], (-380.0, 350.0),
            &["dex_notable_2", "dex_keystone"]),
        n("dex_keystone", "Acrobatics", "+30% Dodge, but Armor set to 0", K, D,
            &[(Dodge, 30.0), (Armor, -100.0)], (-420.0, 280.0),
            &["dex_notable_2", "dex_path_8"]),

        // Intelligence
        n("int_path_1", "Focus", "+10 Max MP", Sm, I, &[(MaxMp, 10.0)], (70.0, 60.0),
            &["start", "int_path_2", "int_path_1a"]),
        n("int_path_1a", "Insight", "+2 INT", Sm, I, &[(Int, 2.0)], (40.0, 120.0),
            &["int_path_1", "int_path_3"]),
        n("int_path_2", "Mana Well", "+15 Max MP", Sm, I, &[(MaxMp, 15.0)], (140.0, 100.0),
            &["int_path_1", "int_notable_1"]),
        n("int_path_3", "Wisdom", "+3 INT, +5 Max HP", Sm, I, &[(Int, 3.0), (MaxHp, 5.0)],
            (100.0, 180.0), &["int_path_1a", "int_notable_1"]),
        n("int_notable_1", "Arcane Shield", "+30 Max MP, +10 Max HP", No, I,
            &[(MaxMp, 30.0), (MaxHp, 10.0)], (180.0, 180.0),
            &["int_path_2", "int_path_3", "int_path_4", "int_path_5"]),
        n("int_path_4", "Spell Power", "+10% Damage", Sm, I, &[(DamagePercent, 10.0)],
            (250.0, 140.0), &["int_notable_1", "int_path_6"]),
        n("int_path_5", "Mystic Ward", "+3 Armor, +10 Max MP", Sm, I,
            &[(Armor, 3.0), (MaxMp, 10.0)], (220.0, 250.0), &["int_notable_1", "int_path_7"]),
        n("int_path_6", "Sorcery", "+5 INT, +5% Damage", Sm, I,
            &[(Int, 5.0), (DamagePercent, 5.0)], (310.0, 200.0), &["int_path_4", "int_notable_2"]),
        n("int_path_7", "Barrier", "+20 Max HP, +15 Max MP", Sm, I,
            &[(MaxHp, 20.0), (MaxMp, 15.0)], (280.0, 310.0), &["int_path_5", "int_notable_2"]),
        n("int_notable_2", "Elemental Mastery", "+20% Damage, +5 INT", No, I,
            &[(DamagePercent, 20.0), (Int, 5.0)], (340.0, 280.0),
            &["int_path_6", "int_path_7", "int_keystone"]),
        n("int_path_8", "Mana Surge", "+40 Max MP", Sm, I, &[(MaxMp, 40.0)], (380.0, 350.0),
            &["int_notable_2", "int_keystone"]),
        n("int_keystone", "Mind Over Matter", "+50 Max MP, -20 Max HP", K, I,
            &[(MaxMp, 50.0), (MaxHp, -20.0)], (420.0, 280.0), &["int_notable_2", "int_path_8"]),

        // Connectors (listed one way only; the graph makes them symmetric)
        n("hybrid_str_dex", "Combat Training", "+2 STR, +2 DEX, +5% Damage", Sm, N,
            &[(Str, 2.0), (Dex, 2.0), (DamagePercent, 5.0)], (-80.0, -20.0),
            &["str_path_1", "dex_path_1"]),
        n("hybrid_str_int", "Battle Mage", "+2 STR, +2 INT, +10 HP", Sm, N,
            &[(Str, 2.0), (Int, 2.0), (MaxHp, 10.0)], (80.0, -20.0),
            &["str_path_1", "int_path_1"]),
        n("hybrid_dex_int", "Shadow Arts", "+2 DEX, +2 INT, +3% Crit", Sm, N,
            &[(Dex, 2.0), (Int, 2.0), (CritChance, 3.0)], (0.0, 130.0),
            &["dex_path_1a", "int_path_1a"]),
    ]
}
