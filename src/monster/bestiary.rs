//! Enemy, monster-skill and per-floor spawn definitions.

use serde::{Deserialize, Serialize};

/// Area a monster skill covers, relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkillShape {
    Circle { radius: f32 },
    Line { length: f32, width: f32 },
}

/// Telegraphed enemy skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSkillDef {
    pub id: String,
    pub name: String,
    pub shape: SkillShape,
    /// Multiplier on the caster's rolled base damage
    pub damage_scale: f32,
    pub cast_time: f32,
    pub cooldown: f32,
    /// Activation distance; 0 means self-centred and always in range
    pub range: f32,
    #[serde(default)]
    pub knockback: bool,
}

impl MonsterSkillDef {
    pub fn self_targeted(&self) -> bool {
        self.range == 0.0
    }

    pub fn in_range(&self, distance: f32) -> bool {
        distance <= self.range || self.self_targeted()
    }
}

/// Unscaled enemy type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub key: String,
    pub name: String,
    pub hp: i32,
    pub damage: (i32, i32),
    pub armor: i32,
    pub xp: u32,
    /// Multiplier on base patrol and chase speed
    pub speed: f32,
    pub sight_range: f32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_boss: bool,
}

/// Enemy pool and regular spawn count for one floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSpawnTable {
    pub pool: Vec<String>,
    pub count: u32,
}

fn circle(id: &str, name: &str, radius: f32, scale: f32, cast: f32, cd: f32, range: f32) -> MonsterSkillDef {
    MonsterSkillDef {
        id: id.into(),
        name: name.into(),
        shape: SkillShape::Circle { radius },
        damage_scale: scale,
        cast_time: cast,
        cooldown: cd,
        range,
        knockback: false,
    }
}

pub fn default_monster_skills() -> Vec<MonsterSkillDef> {
    vec![
        circle("smash", "Smash", 1.5, 1.5, 1.5, 8.0, 1.2),
        circle("poison_nova", "Poison Nova", 2.0, 0.8, 1.2, 10.0, 0.0),
        circle("fire_zone", "Fire Zone", 1.5, 1.2, 1.5, 12.0, 5.0),
        MonsterSkillDef {
            id: "charge".into(),
            name: "Charge".into(),
            shape: SkillShape::Line {
                length: 5.0,
                width: 1.0,
            },
            damage_scale: 1.2,
            cast_time: 1.0,
            cooldown: 8.0,
            range: 4.0,
            knockback: true,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn enemy(
    key: &str,
    name: &str,
    hp: i32,
    damage: (i32, i32),
    armor: i32,
    xp: u32,
    speed: f32,
    sight_range: f32,
    skills: &[&str],
) -> EnemyDef {
    EnemyDef {
        key: key.into(),
        name: name.into(),
        hp,
        damage,
        armor,
        xp,
        speed,
        sight_range,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        is_boss: false,
    }
}

/// Key of the guaranteed last-room spawn
pub const BOSS_KEY: &str = "boss";

pub fn default_enemies() -> Vec<EnemyDef> {
    vec![
        enemy("skeleton", "Skeleton", 25, (5, 10), 2, 15, 1.0, 6.0, &["charge"]),
        enemy("slime", "Slime", 15, (3, 7), 0, 10, 0.5, 4.0, &["poison_nova"]),
        enemy("goblin", "Goblin", 30, (7, 13), 3, 20, 1.0, 7.0, &["charge"]),
        enemy("dark_mage", "Dark Mage", 20, (10, 18), 1, 30, 1.0, 8.0, &["fire_zone"]),
        EnemyDef {
            is_boss: true,
            ..enemy(BOSS_KEY, "Floor Guardian", 80, (12, 25), 8, 100, 1.0, 10.0, &["smash", "charge"])
        },
    ]
}

pub fn default_floor_spawns() -> Vec<FloorSpawnTable> {
    let table = |pool: &[&str], count| FloorSpawnTable {
        pool: pool.iter().map(|k| k.to_string()).collect(),
        count,
    };
    vec![
        table(&["skeleton", "slime"], 5),
        table(&["skeleton", "slime", "goblin"], 7),
        table(&["skeleton", "goblin", "dark_mage"], 9),
        table(&["goblin", "dark_mage"], 11),
        table(&["goblin", "dark_mage"], 13),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_targeted_skill_always_in_range() {
        let skills = default_monster_skills();
        let nova = skills.iter().find(|s| s.id == "poison_nova").unwrap();
        assert!(nova.self_targeted());
        assert!(nova.in_range(100.0));
        let smash = skills.iter().find(|s| s.id == "smash").unwrap();
        assert!(smash.in_range(1.2));
        assert!(!smash.in_range(1.3));
    }

    #[test]
    fn test_only_boss_is_flagged() {
        let bosses: Vec<_> = default_enemies().into_iter().filter(|e| e.is_boss).collect();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].key, BOSS_KEY);
    }

    #[test]
    fn test_spawn_counts_grow_per_floor() {
        let counts: Vec<u32> = default_floor_spawns().iter().map(|t| t.count).collect();
        assert_eq!(counts, vec![5, 7, 9, 11, 13]);
    }
}
