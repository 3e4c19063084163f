//! Playable classes and their two active skills.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{INT_DAMAGE_DIVISOR, STR_DAMAGE_DIVISOR};
use crate::stats::{StatBlock, StatKey};

/// Class identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Warrior,
    Rogue,
    Mage,
}

impl ClassKind {
    pub const ALL: [ClassKind; 3] = [ClassKind::Warrior, ClassKind::Rogue, ClassKind::Mage];

    pub fn name(&self) -> &'static str {
        match self {
            ClassKind::Warrior => "Warrior",
            ClassKind::Rogue => "Rogue",
            ClassKind::Mage => "Mage",
        }
    }
}

/// Basic attack shape. Weapons may override each field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub range: f32,
    pub cooldown: f32,
    /// Full cone width in radians
    pub arc: f32,
}

/// Flat damage bonus of `floor(stat / divisor)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatScaling {
    pub stat: StatKey,
    pub divisor: f32,
}

impl StatScaling {
    pub fn bonus(&self, stats: &StatBlock) -> i32 {
        let value = match self.stat {
            StatKey::Str => stats.str,
            StatKey::Dex => stats.dex,
            StatKey::Int => stats.int,
            _ => 0.0,
        };
        if self.divisor <= 0.0 {
            return 0;
        }
        (value / self.divisor).floor() as i32
    }
}

/// Skill archetype and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Damage and knockback everything in a cone
    ArcStrike {
        damage: i32,
        scaling: StatScaling,
        range: f32,
        arc: f32,
        knockback: f32,
    },
    /// Move along the aim line, hitting everything near the travelled segment
    Dash {
        damage: i32,
        scaling: StatScaling,
        distance: f32,
        width: f32,
    },
    /// Explosion at a point projected along the aim
    Blast {
        damage: i32,
        scaling: StatScaling,
        radius: f32,
        range: f32,
    },
    /// Timed flat stat buff on the caster
    StatBuff {
        stat: StatKey,
        value: f32,
        duration: f32,
    },
    /// The next `hits` basic attacks that land deal `damage` extra
    PoisonCoat { hits: u32, damage: i32 },
    /// Absorb shield plus a timed slow on nearby enemies
    FrostWard {
        shield: i32,
        slow_radius: f32,
        slow_factor: f32,
        duration: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSkillDef {
    pub id: String,
    pub name: String,
    pub cooldown: f32,
    pub mana_cost: i32,
    pub kind: SkillKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub kind: ClassKind,
    pub name: String,
    pub base: StatBlock,
    pub speed: f32,
    pub attack: AttackProfile,
    /// Stat that adds to basic attack damage
    pub attack_scaling: StatScaling,
    pub skills: Vec<PlayerSkillDef>,
}

fn scaling(stat: StatKey, divisor: f32) -> StatScaling {
    StatScaling { stat, divisor }
}

fn skill(id: &str, name: &str, cooldown: f32, mana_cost: i32, kind: SkillKind) -> PlayerSkillDef {
    PlayerSkillDef {
        id: id.into(),
        name: name.into(),
        cooldown,
        mana_cost,
        kind,
    }
}

pub fn default_classes() -> Vec<ClassDef> {
    vec![
        ClassDef {
            kind: ClassKind::Warrior,
            name: "Warrior".into(),
            base: StatBlock {
                max_hp: 140.0,
                max_mp: 30.0,
                str: 16.0,
                dex: 8.0,
                int: 6.0,
                armor: 4.0,
                crit_chance: 5.0,
                crit_multi: 1.5,
                dodge: 2.0,
                ..Default::default()
            },
            speed: 3.8,
            attack: AttackProfile {
                range: 1.2,
                cooldown: 0.5,
                arc: PI / 2.0,
            },
            attack_scaling: scaling(StatKey::Str, STR_DAMAGE_DIVISOR),
            skills: vec![
                skill(
                    "shield_bash",
                    "Shield Bash",
                    8.0,
                    10,
                    SkillKind::ArcStrike {
                        damage: 25,
                        scaling: scaling(StatKey::Str, 3.0),
                        range: 1.5,
                        arc: PI * 0.8,
                        knockback: 1.5,
                    },
                ),
                skill(
                    "war_cry",
                    "War Cry",
                    15.0,
                    8,
                    SkillKind::StatBuff {
                        stat: StatKey::DamagePercent,
                        value: 50.0,
                        duration: 5.0,
                    },
                ),
            ],
        },
        ClassDef {
            kind: ClassKind::Rogue,
            name: "Rogue".into(),
            base: StatBlock {
                max_hp: 85.0,
                max_mp: 40.0,
                str: 10.0,
                dex: 16.0,
                int: 8.0,
                armor: 1.0,
                crit_chance: 15.0,
                crit_multi: 2.0,
                dodge: 12.0,
                ..Default::default()
            },
            speed: 5.5,
            attack: AttackProfile {
                range: 0.9,
                cooldown: 0.25,
                arc: PI / 3.0,
            },
            attack_scaling: scaling(StatKey::Str, STR_DAMAGE_DIVISOR),
            skills: vec![
                skill(
                    "shadow_dash",
                    "Shadow Dash",
                    6.0,
                    12,
                    SkillKind::Dash {
                        damage: 20,
                        scaling: scaling(StatKey::Dex, 3.0),
                        distance: 3.0,
                        width: 0.8,
                    },
                ),
                skill(
                    "poison_blade",
                    "Poison Blade",
                    12.0,
                    15,
                    SkillKind::PoisonCoat { hits: 3, damage: 8 },
                ),
            ],
        },
        ClassDef {
            kind: ClassKind::Mage,
            name: "Mage".into(),
            base: StatBlock {
                max_hp: 70.0,
                max_mp: 100.0,
                str: 5.0,
                dex: 8.0,
                int: 18.0,
                armor: 0.0,
                crit_chance: 8.0,
                crit_multi: 1.8,
                dodge: 4.0,
                ..Default::default()
            },
            speed: 4.0,
            attack: AttackProfile {
                range: 3.5,
                cooldown: 0.6,
                arc: PI / 6.0,
            },
            attack_scaling: scaling(StatKey::Int, INT_DAMAGE_DIVISOR),
            skills: vec![
                skill(
                    "fireball",
                    "Fireball",
                    5.0,
                    20,
                    SkillKind::Blast {
                        damage: 35,
                        scaling: scaling(StatKey::Int, 2.0),
                        radius: 2.0,
                        range: 5.0,
                    },
                ),
                skill(
                    "frost_shield",
                    "Frost Shield",
                    18.0,
                    25,
                    SkillKind::FrostWard {
                        shield: 50,
                        slow_radius: 2.5,
                        slow_factor: 0.5,
                        duration: 6.0,
                    },
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_class_has_two_skills() {
        let classes = default_classes();
        assert_eq!(classes.len(), 3);
        for class in &classes {
            assert_eq!(class.skills.len(), 2, "{}", class.name);
        }
    }

    #[test]
    fn test_stat_scaling_floors() {
        let stats = StatBlock {
            str: 16.0,
            int: 19.0,
            ..Default::default()
        };
        assert_eq!(scaling(StatKey::Str, 3.0).bonus(&stats), 5);
        assert_eq!(scaling(StatKey::Int, 4.0).bonus(&stats), 4);
        assert_eq!(scaling(StatKey::Dodge, 4.0).bonus(&stats), 0);
        assert_eq!(scaling(StatKey::Str, 0.0).bonus(&stats), 0);
    }

    #[test]
    fn test_warrior_arc_is_ninety_degrees() {
        let warrior = &default_classes()[0];
        assert_eq!(warrior.kind, ClassKind::Warrior);
        assert!((warrior.attack.arc.to_degrees() - 90.0).abs() < 1e-3);
    }
}
