//! Simulation configuration.
//!
//! [`SimConfig`] holds every data table and tuning knob the simulation
//! reads. It is built once (from defaults or a RON/JSON file), validated,
//! wrapped in an `Arc` and shared read-only; nothing mutates it afterwards.

pub mod error;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::*;
use crate::loot::LootTables;
use crate::monster::bestiary::{
    default_enemies, default_floor_spawns, default_monster_skills, EnemyDef, FloorSpawnTable,
    MonsterSkillDef,
};
use crate::player::class::{default_classes, ClassDef, ClassKind};
use crate::skilltree::data::default_nodes;
use crate::skilltree::{NodeKind, SkillNodeDef};

pub use error::{ConfigError, Result};

/// Map size and room placement knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonConfig {
    pub width: i32,
    pub height: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub placement_attempts: u32,
    /// Last floor; it has no stairs and descending past it wins the run
    pub max_floors: u32,
    pub min_chests: u32,
    pub max_chests: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            min_room_size: MIN_ROOM_SIZE,
            max_room_size: MAX_ROOM_SIZE,
            min_rooms: MIN_ROOMS,
            max_rooms: MAX_ROOMS,
            placement_attempts: ROOM_PLACEMENT_ATTEMPTS,
            max_floors: MAX_FLOORS,
            min_chests: MIN_CHESTS,
            max_chests: MAX_CHESTS,
        }
    }
}

/// Leveling curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub xp_per_level: f32,
    pub xp_growth: f32,
    pub skill_points_per_level: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: XP_PER_LEVEL,
            xp_growth: XP_GROWTH,
            skill_points_per_level: SKILL_POINTS_PER_LEVEL,
        }
    }
}

impl ProgressionConfig {
    /// XP needed to leave `level`
    pub fn threshold(&self, level: u32) -> u32 {
        let exp = level.saturating_sub(1) as i32;
        (self.xp_per_level * self.xp_growth.powi(exp)).round().max(1.0) as u32
    }
}

/// Everything the simulation needs to know about the game's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub dungeon: DungeonConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    pub classes: Vec<ClassDef>,
    pub enemies: Vec<EnemyDef>,
    pub monster_skills: Vec<MonsterSkillDef>,
    pub floor_spawns: Vec<FloorSpawnTable>,
    pub loot: LootTables,
    pub skill_tree: Vec<SkillNodeDef>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dungeon: DungeonConfig::default(),
            progression: ProgressionConfig::default(),
            classes: default_classes(),
            enemies: default_enemies(),
            monster_skills: default_monster_skills(),
            floor_spawns: default_floor_spawns(),
            loot: LootTables::default(),
            skill_tree: default_nodes(),
        }
    }
}

impl SimConfig {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load and validate a `.ron` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config = match ext.as_deref() {
            Some("ron") => Self::from_ron_str(&text)?,
            Some("json") => Self::from_json(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(ext)),
        };
        config.validate()?;
        info!(path = %path.display(), "Loaded simulation config");
        Ok(config)
    }

    pub fn class(&self, kind: ClassKind) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.kind == kind)
    }

    pub fn enemy(&self, key: &str) -> Option<&EnemyDef> {
        self.enemies.iter().find(|e| e.key == key)
    }

    pub fn monster_skill(&self, id: &str) -> Option<&MonsterSkillDef> {
        self.monster_skills.iter().find(|s| s.id == id)
    }

    /// The boss definition, if the bestiary has one
    pub fn boss(&self) -> Option<&EnemyDef> {
        self.enemies.iter().find(|e| e.is_boss)
    }

    /// Spawn table for a floor; deeper floors reuse the last table
    pub fn floor_spawns(&self, floor: u32) -> Option<&FloorSpawnTable> {
        let idx = floor.max(1) as usize - 1;
        self.floor_spawns.get(idx).or_else(|| self.floor_spawns.last())
    }

    /// Cross-check every reference between tables
    pub fn validate(&self) -> Result<()> {
        let d = &self.dungeon;
        if d.min_room_size < 3 || d.min_room_size > d.max_room_size {
            return Err(ConfigError::InvalidDungeon(format!(
                "room size range {}..={} is invalid",
                d.min_room_size, d.max_room_size
            )));
        }
        if d.width < d.max_room_size + 3 || d.height < d.max_room_size + 3 {
            return Err(ConfigError::InvalidDungeon(format!(
                "{}x{} map cannot hold a {} tile room",
                d.width, d.height, d.max_room_size
            )));
        }
        if d.min_rooms == 0 || d.min_rooms > d.max_rooms || d.min_chests > d.max_chests {
            return Err(ConfigError::InvalidDungeon(
                "room or chest count range is invalid".into(),
            ));
        }

        for kind in ClassKind::ALL {
            if self.class(kind).is_none() {
                return Err(ConfigError::UnknownClass(kind.name().to_string()));
            }
        }

        let mut seen = HashSet::new();
        for skill in &self.monster_skills {
            if !seen.insert(skill.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "monster skill",
                    id: skill.id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for enemy in &self.enemies {
            if !seen.insert(enemy.key.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "enemy",
                    id: enemy.key.clone(),
                });
            }
            for skill in &enemy.skills {
                if self.monster_skill(skill).is_none() {
                    return Err(ConfigError::UnknownMonsterSkill {
                        enemy: enemy.key.clone(),
                        skill: skill.clone(),
                    });
                }
            }
        }

        if self.floor_spawns.is_empty() {
            return Err(ConfigError::EmptyTable("floor_spawns"));
        }
        for (i, table) in self.floor_spawns.iter().enumerate() {
            if table.pool.is_empty() {
                return Err(ConfigError::EmptyTable("floor_spawns.pool"));
            }
            for key in &table.pool {
                if self.enemy(key).is_none() {
                    return Err(ConfigError::UnknownEnemy {
                        context: format!("floor {} spawn pool", i + 1),
                        key: key.clone(),
                    });
                }
            }
        }

        if self.loot.floor_loot.is_empty() {
            return Err(ConfigError::EmptyTable("loot.floor_loot"));
        }
        for (i, tier) in self.loot.floor_loot.iter().enumerate() {
            if tier.is_empty() {
                return Err(ConfigError::EmptyTable("loot.floor_loot tier"));
            }
            for key in tier {
                if self.loot.base(key).is_none() {
                    return Err(ConfigError::UnknownItemBase {
                        tier: i + 1,
                        key: key.clone(),
                    });
                }
            }
        }
        if self.loot.potions.is_empty() {
            return Err(ConfigError::EmptyTable("loot.potions"));
        }

        let ids: HashSet<&str> = self.skill_tree.iter().map(|n| n.id.as_str()).collect();
        if ids.len() != self.skill_tree.len() {
            let mut seen = HashSet::new();
            if let Some(dup) = self.skill_tree.iter().find(|n| !seen.insert(n.id.as_str())) {
                return Err(ConfigError::DuplicateId {
                    kind: "skill node",
                    id: dup.id.clone(),
                });
            }
        }
        for node in &self.skill_tree {
            for target in &node.connections {
                if !ids.contains(target.as_str()) {
                    return Err(ConfigError::UnknownTreeNode {
                        node: node.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        let starts = self
            .skill_tree
            .iter()
            .filter(|n| n.kind == NodeKind::Start)
            .count();
        if starts != 1 {
            return Err(ConfigError::StartNodeCount(starts));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn test_threshold_curve() {
        let p = ProgressionConfig::default();
        assert_eq!(p.threshold(1), 50);
        assert_eq!(p.threshold(2), 75);
        assert_eq!(p.threshold(3), 113); // 112.5 rounds up
    }

    #[test]
    fn test_floor_spawns_clamp_to_last() {
        let config = SimConfig::default();
        assert_eq!(config.floor_spawns(1).unwrap().count, 5);
        assert_eq!(config.floor_spawns(8).unwrap().count, 13);
    }

    #[test]
    fn test_validate_catches_unknown_enemy() {
        let mut config = SimConfig::default();
        config.floor_spawns[0].pool.push("dragon".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownEnemy { key, .. }) if key == "dragon"
        ));
    }

    #[test]
    fn test_validate_catches_unknown_monster_skill() {
        let mut config = SimConfig::default();
        config.enemies[0].skills.push("meteor".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownMonsterSkill { .. })
        ));
    }

    #[test]
    fn test_validate_catches_missing_class() {
        let mut config = SimConfig::default();
        config.classes.retain(|c| c.kind != ClassKind::Mage);
        assert!(matches!(config.validate(), Err(ConfigError::UnknownClass(_))));
    }

    #[test]
    fn test_validate_catches_tiny_map() {
        let mut config = SimConfig::default();
        config.dungeon.width = 10;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDungeon(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SimConfig::default();
        let restored = SimConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = SimConfig::default();
        let text = config.to_ron().unwrap();
        let restored = SimConfig::from_ron_str(&text).unwrap();
        assert_eq!(restored.classes, config.classes);
        assert_eq!(restored.skill_tree.len(), 40);
        assert_eq!(restored.loot, config.loot);
    }
}
