//! The run orchestrator.
//!
//! A [`Session`] owns one run: the current floor, the player, the enemy
//! arena, ground items and the skill tree. The driver calls
//! [`Session::tick`] once per frame and the command methods in between.
//!
//! Tick order:
//! 1. Player movement
//! 2. Enemy AI, resolving attacks and skills against the player
//! 3. Stairs and chests
//! 4. Field of view refresh
//! 5. Cooldowns, buffs and the derived stat rebuild
//! 6. Feedback decay

use std::collections::HashSet;
use std::sync::Arc;

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::commands::{
    AttackOutcome, AttackReport, InventoryAction, InventoryOutcome, PickupOutcome, SkillOutcome,
    SkillRejection, SkillReport,
};
use super::messages::{GroundItemSnapshot, MapSnapshot, SessionSnapshot};
use crate::combat::{
    self, defense::knockback_offset, enemy_attack_player, monster_skill_hit_player,
    DefenseOutcome,
};
use crate::config::{ConfigError, Result, SimConfig};
use crate::constants::{
    CHEST_ITEM_CHANCE, CHEST_MAX_LOOT, CHEST_MIN_LOOT, CHEST_TRIGGER_RANGE, FOV_RADIUS,
    FOV_REFRESH_INTERVAL, ITEM_DROP_CHANCE, MAX_TICK_DELTA, MONSTER_KNOCKBACK_DISTANCE,
    PICKUP_RANGE, POTION_DROP_CHANCE, STAIRS_TRIGGER_RANGE,
};
use crate::dungeon::{self, Dungeon};
use crate::events::{EffectKind, FeedbackQueue, TextTone};
use crate::loot::{generate_item, generate_potion, Loot};
use crate::monster::{EnemyAction, EnemyArena, EnemyId, Telegraph};
use crate::player::{ClassKind, Player};
use crate::skilltree::{SkillTree, TreeRejection};
use crate::utils::{roll_chance, roll_range, TilePos};

/// Where the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Playing,
    Dead,
    Victory,
}

/// End-of-run summary numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub kills: u32,
    pub floors_cleared: u32,
    /// Simulated seconds
    pub elapsed: f32,
}

/// Loot lying on the floor
#[derive(Debug, Clone, PartialEq)]
pub struct GroundItem {
    pub pos: Vec2,
    pub loot: Loot,
}

pub struct Session {
    config: Arc<SimConfig>,
    rng: Xoshiro256PlusPlus,
    floor: u32,
    dungeon: Dungeon,
    player: Player,
    enemies: EnemyArena,
    ground: Vec<GroundItem>,
    tree: SkillTree,
    state: RunState,
    record: RunRecord,
    fov_timer: f32,
    visible: HashSet<TilePos>,
    feedback: FeedbackQueue,
}

impl Session {
    /// Start a run on floor 1 with an entropy-seeded generator
    pub fn new(config: Arc<SimConfig>, class: ClassKind) -> Result<Self> {
        Self::with_rng(config, class, Xoshiro256PlusPlus::from_entropy())
    }

    /// Start a run with a fixed seed
    pub fn with_seed(config: Arc<SimConfig>, class: ClassKind, seed: u64) -> Result<Self> {
        Self::with_rng(config, class, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(config: Arc<SimConfig>, class: ClassKind, rng: Xoshiro256PlusPlus) -> Result<Self> {
        let class_def = config
            .class(class)
            .ok_or_else(|| ConfigError::UnknownClass(class.name().to_string()))?;
        let tree = SkillTree::from_defs(&config.skill_tree)?;
        let player = Player::new(class_def, &config.progression, Vec2::ZERO);
        let dungeon = Dungeon::filled(0, config.dungeon.width, config.dungeon.height);

        let mut session = Self {
            config,
            rng,
            floor: 0,
            dungeon,
            player,
            enemies: EnemyArena::new(),
            ground: Vec::new(),
            tree,
            state: RunState::Playing,
            record: RunRecord::default(),
            fov_timer: 0.0,
            visible: HashSet::new(),
            feedback: FeedbackQueue::default(),
        };
        session.generate_floor(1);
        info!(class = class.name(), "Run started");
        Ok(session)
    }

    // =====================================================
    // Accessors
    // =====================================================

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct player access for tooling and tests
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &EnemyArena {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut EnemyArena {
        &mut self.enemies
    }

    pub fn ground_items(&self) -> &[GroundItem] {
        &self.ground
    }

    pub fn tree(&self) -> &SkillTree {
        &self.tree
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state != RunState::Playing
    }

    pub fn record(&self) -> RunRecord {
        self.record
    }

    pub fn visible_tiles(&self) -> &HashSet<TilePos> {
        &self.visible
    }

    pub fn feedback(&self) -> &FeedbackQueue {
        &self.feedback
    }

    // =====================================================
    // Floor lifecycle
    // =====================================================

    /// Replace the current floor with a freshly generated `floor`
    pub fn generate_floor(&mut self, floor: u32) {
        self.floor = floor;
        self.dungeon = dungeon::generate(&self.config, floor, &mut self.rng);

        self.enemies.clear();
        for spawn in &self.dungeon.spawns {
            match self.config.enemy(&spawn.key) {
                Some(def) => {
                    self.enemies.spawn(def, spawn.pos, floor, &mut self.rng);
                }
                None => warn!(key = %spawn.key, "Spawn names an unknown enemy"),
            }
        }

        self.ground.clear();
        self.feedback.clear();
        self.player.pos = self.dungeon.player_start.center();
        self.player.intent = Vec2::ZERO;
        self.refresh_fov();

        info!(floor, enemies = self.enemies.len(), "Entered floor");
    }

    /// Go down one floor; past the last floor the run is won
    pub fn descend(&mut self) {
        if self.is_over() {
            return;
        }
        self.record.floors_cleared += 1;
        if self.floor >= self.config.dungeon.max_floors {
            self.state = RunState::Victory;
            info!(
                kills = self.record.kills,
                floors = self.record.floors_cleared,
                elapsed = self.record.elapsed,
                "Run won"
            );
            return;
        }
        self.generate_floor(self.floor + 1);
    }

    /// Spawn an enemy of type `key` centred in `tile`
    pub fn spawn_enemy(&mut self, key: &str, tile: TilePos) -> Option<EnemyId> {
        let def = self.config.enemy(key)?;
        Some(self.enemies.spawn(def, tile, self.floor, &mut self.rng))
    }

    fn refresh_fov(&mut self) {
        let center = TilePos::containing(self.player.pos);
        self.visible = self.dungeon.reveal_area(center, FOV_RADIUS);
        self.fov_timer = 0.0;
    }

    fn recalculate(&mut self) {
        self.player.recalculate(&self.tree.total_bonuses());
    }

    // =====================================================
    // Tick
    // =====================================================

    /// Advance the simulation. `dt` is clamped to [0, 0.05].
    pub fn tick(&mut self, dt: f32) {
        if self.is_over() {
            return;
        }
        let dt = dt.clamp(0.0, MAX_TICK_DELTA);
        self.record.elapsed += dt;

        self.player.update_movement(dt, &self.dungeon);

        let actions = self.enemies.update_all(
            dt,
            &self.dungeon,
            self.player.pos,
            &self.config,
            &mut self.rng,
        );
        for (id, action) in actions {
            self.resolve_enemy_action(id, action);
            if self.player.is_dead() {
                self.state = RunState::Dead;
                info!(
                    floor = self.floor,
                    kills = self.record.kills,
                    elapsed = self.record.elapsed,
                    "Player died"
                );
                return;
            }
        }

        if self.dungeon.on_stairs(self.player.pos, STAIRS_TRIGGER_RANGE) {
            self.descend();
            return;
        }
        if let Some(idx) = self.dungeon.chest_near(self.player.pos, CHEST_TRIGGER_RANGE) {
            self.open_chest(idx);
        }

        self.fov_timer += dt;
        if self.fov_timer >= FOV_REFRESH_INTERVAL {
            self.refresh_fov();
        }

        self.player.tick_cooldowns(dt);
        self.player.tick_buffs(dt);
        self.recalculate();

        self.feedback.update(dt);
        trace!(elapsed = self.record.elapsed, "Tick");
    }

    fn resolve_enemy_action(&mut self, id: EnemyId, action: EnemyAction) {
        match action {
            EnemyAction::Attack { damage } => {
                let outcome = enemy_attack_player(damage, &mut self.player, &mut self.rng);
                self.report_defense(outcome);
            }
            EnemyAction::Skill {
                skill_id,
                damage,
                telegraph,
                knockback,
                ..
            } => {
                let (center, radius) = match telegraph {
                    Telegraph::Circle { center, radius } => (center, radius),
                    Telegraph::Line {
                        origin,
                        dir,
                        length,
                        width,
                    } => (origin + dir * length, width),
                };
                self.feedback.effect(center, EffectKind::Impact { radius });

                let Some(outcome) = monster_skill_hit_player(&telegraph, damage, &mut self.player)
                else {
                    debug!(enemy = id, skill = %skill_id, "Player avoided skill");
                    return;
                };
                self.report_defense(outcome);

                if knockback {
                    if let Some(source) = self.enemies.get(id).map(|e| e.pos) {
                        let offset =
                            knockback_offset(source, self.player.pos, MONSTER_KNOCKBACK_DISTANCE);
                        self.player.knock_back(offset, &self.dungeon);
                    }
                }
            }
        }
    }

    fn report_defense(&mut self, outcome: DefenseOutcome) {
        let pos = self.player.pos;
        match outcome {
            DefenseOutcome::Dodged => self.feedback.text(pos, "DODGE", TextTone::Dodge, false),
            DefenseOutcome::Absorbed { .. } => {
                self.feedback.text(pos, "SHIELDED", TextTone::Shielded, false)
            }
            DefenseOutcome::Hit { damage, .. } => {
                self.feedback
                    .text(pos, format!("-{damage}"), TextTone::PlayerHurt, false)
            }
        }
    }

    // =====================================================
    // Loot
    // =====================================================

    fn drop_loot(&mut self, pos: Vec2, item_chance: f64, always_item: bool) {
        let item_roll = roll_chance(&mut self.rng, item_chance);
        if item_roll || always_item {
            if let Some(item) = generate_item(&self.config.loot, self.floor, &mut self.rng) {
                debug!(name = %item.name, "Item dropped");
                self.ground.push(GroundItem {
                    pos,
                    loot: Loot::Gear(item),
                });
            }
        }
        if roll_chance(&mut self.rng, POTION_DROP_CHANCE) {
            if let Some(potion) = generate_potion(&self.config.loot, self.floor, &mut self.rng) {
                self.ground.push(GroundItem {
                    pos,
                    loot: Loot::Potion(potion),
                });
            }
        }
    }

    fn open_chest(&mut self, idx: usize) {
        let Some(pos) = self.dungeon.chests.get(idx).map(|c| c.pos.center()) else {
            return;
        };
        if !self.dungeon.open_chest(idx) {
            return;
        }
        let rolls = roll_range(&mut self.rng, CHEST_MIN_LOOT as i32, CHEST_MAX_LOOT as i32);
        for _ in 0..rolls {
            let loot = if roll_chance(&mut self.rng, CHEST_ITEM_CHANCE) {
                generate_item(&self.config.loot, self.floor, &mut self.rng).map(Loot::Gear)
            } else {
                generate_potion(&self.config.loot, self.floor, &mut self.rng).map(Loot::Potion)
            };
            if let Some(loot) = loot {
                self.ground.push(GroundItem { pos, loot });
            }
        }
        self.feedback.text(pos, "Chest opened", TextTone::Loot, false);
        info!(floor = self.floor, rolls, "Chest opened");
    }

    /// Award XP and roll drops for a dead enemy, then remove it
    fn on_enemy_killed(&mut self, id: EnemyId) -> (u32, Vec<u32>) {
        let Some(enemy) = self.enemies.remove(id) else {
            return (0, Vec::new());
        };
        self.record.kills += 1;
        let level_ups = self.player.gain_xp(enemy.xp, &self.config.progression);
        self.feedback
            .text(enemy.pos, format!("+{} XP", enemy.xp), TextTone::Xp, false);
        for level in &level_ups {
            self.feedback.text(
                self.player.pos,
                format!("LEVEL {level}"),
                TextTone::LevelUp,
                true,
            );
        }
        if !level_ups.is_empty() {
            self.recalculate();
        }
        self.drop_loot(enemy.pos, ITEM_DROP_CHANCE, enemy.is_boss);
        debug!(enemy = id, name = %enemy.name, xp = enemy.xp, "Enemy killed");
        (enemy.xp, level_ups)
    }

    // =====================================================
    // Commands
    // =====================================================

    /// Movement direction; zero stops. Normalized when applied.
    pub fn set_intent(&mut self, intent: Vec2) {
        self.player.intent = intent;
    }

    pub fn set_aim(&mut self, aim: f32) {
        self.player.aim = aim;
    }

    /// Basic attack toward `aim`
    pub fn attack(&mut self, aim: f32) -> AttackOutcome {
        if self.is_over() {
            return AttackOutcome::RunOver;
        }
        self.player.aim = aim;
        if !self.player.can_attack() {
            return AttackOutcome::NotReady;
        }

        let p = &self.player;
        self.feedback.effect(
            p.pos,
            EffectKind::Slash {
                angle: aim,
                range: p.attack.range,
                arc: p.attack.arc,
            },
        );
        let target = combat::nearest_in_arc(&self.enemies, p.pos, aim, p.attack.arc, p.attack.range);

        let Some(enemy) = target.and_then(|id| self.enemies.get_mut(id)) else {
            self.player.start_attack_cooldown();
            return AttackOutcome::Missed;
        };
        let hit = combat::player_attack_enemy(&mut self.player, enemy, &mut self.rng);
        let (id, pos) = (enemy.id, enemy.pos);

        let (tone, text) = if hit.crit {
            (TextTone::Crit, format!("{}!", hit.damage))
        } else {
            (TextTone::Damage, hit.damage.to_string())
        };
        self.feedback.text(pos, text, tone, hit.crit);
        if let Some(poison) = hit.poison {
            self.feedback
                .text(pos, format!("{poison} poison"), TextTone::Poison, false);
        }

        let (xp_gained, level_ups) = if hit.killed {
            self.on_enemy_killed(id)
        } else {
            (0, Vec::new())
        };
        AttackOutcome::Hit(AttackReport {
            target: id,
            damage: hit.damage,
            crit: hit.crit,
            poison: hit.poison,
            killed: hit.killed,
            xp_gained,
            level_ups,
        })
    }

    /// Cast the skill in `slot` toward `aim`
    pub fn use_skill(&mut self, slot: usize, aim: f32) -> SkillOutcome {
        if self.is_over() {
            return SkillOutcome::Rejected(SkillRejection::RunOver);
        }
        self.player.aim = aim;
        let skill = match self.player.spend_skill(slot) {
            Ok(skill) => skill,
            Err(rejection) => return SkillOutcome::Rejected(rejection),
        };

        let effect = combat::execute_skill(
            &skill,
            &mut self.player,
            &mut self.enemies,
            &self.dungeon,
            &mut self.feedback,
        );
        if effect.stats_changed {
            self.recalculate();
        }

        let killed: Vec<EnemyId> = effect.kills().collect();
        let mut level_ups = Vec::new();
        for &id in &killed {
            level_ups.extend(self.on_enemy_killed(id).1);
        }

        info!(skill = %skill.id, hits = effect.hits.len(), kills = killed.len(), "Skill cast");
        SkillOutcome::Cast(SkillReport {
            skill_id: skill.id,
            mana_spent: skill.mana_cost,
            affected: effect.affected(),
            kills: killed.len() as u32,
            level_ups,
        })
    }

    /// Pick up the nearest ground item within reach
    pub fn pickup(&mut self) -> PickupOutcome {
        let pos = self.player.pos;
        let nearest = self
            .ground
            .iter()
            .enumerate()
            .map(|(i, g)| (i, g.pos.distance(pos)))
            .filter(|&(_, d)| d < PICKUP_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        let Some(idx) = nearest else {
            return PickupOutcome::NothingInRange;
        };
        if self.player.inventory.is_full() {
            return PickupOutcome::InventoryFull;
        }

        let ground = self.ground.remove(idx);
        let name = ground.loot.name().to_string();
        match self.player.inventory.add(ground.loot) {
            Ok(slot) => {
                self.feedback.text(pos, name.clone(), TextTone::Loot, false);
                PickupOutcome::PickedUp { name, slot }
            }
            Err(loot) => {
                self.ground.insert(idx, GroundItem { pos: ground.pos, loot });
                PickupOutcome::InventoryFull
            }
        }
    }

    /// Use, drop or unequip
    pub fn inventory(&mut self, action: InventoryAction) -> InventoryOutcome {
        let outcome = match action {
            InventoryAction::Use(idx) => match self.player.inventory.take(idx) {
                None => InventoryOutcome::EmptySlot,
                Some(Loot::Potion(potion)) => {
                    self.player.drink(&potion);
                    InventoryOutcome::UsedPotion {
                        name: potion.name,
                        effect: potion.effect,
                    }
                }
                Some(Loot::Gear(item)) => {
                    let name = item.name.clone();
                    let replaced = self.player.equipment.equip(item).map(|old| {
                        let old_name = old.name.clone();
                        if let Err(loot) = self.player.inventory.put(idx, Loot::Gear(old)) {
                            self.ground.push(GroundItem {
                                pos: self.player.pos,
                                loot,
                            });
                        }
                        old_name
                    });
                    InventoryOutcome::Equipped { name, replaced }
                }
            },
            InventoryAction::Drop(idx) => match self.player.inventory.take(idx) {
                None => InventoryOutcome::EmptySlot,
                Some(loot) => {
                    let name = loot.name().to_string();
                    self.ground.push(GroundItem {
                        pos: self.player.pos,
                        loot,
                    });
                    InventoryOutcome::Dropped { name }
                }
            },
            InventoryAction::Unequip(slot) => match self.player.equipment.unequip(slot) {
                None => InventoryOutcome::EmptySlot,
                Some(item) => {
                    let name = item.name.clone();
                    match self.player.inventory.add(Loot::Gear(item)) {
                        Ok(idx) => InventoryOutcome::Unequipped { name, slot: idx },
                        Err(loot) => {
                            self.ground.push(GroundItem {
                                pos: self.player.pos,
                                loot,
                            });
                            InventoryOutcome::UnequippedToGround { name }
                        }
                    }
                }
            },
        };
        self.recalculate();
        debug!(?outcome, "Inventory action");
        outcome
    }

    // =====================================================
    // Skill tree
    // =====================================================

    pub fn allocate_node(&mut self, id: &str) -> std::result::Result<(), TreeRejection> {
        self.tree
            .check_allocate(id, self.player.skill_points, self.player.level)?;
        self.tree.allocate(id)?;
        self.player.skill_points -= 1;
        self.recalculate();
        Ok(())
    }

    pub fn deallocate_node(&mut self, id: &str) -> std::result::Result<(), TreeRejection> {
        self.tree.deallocate(id)?;
        self.player.skill_points += 1;
        self.recalculate();
        Ok(())
    }

    /// Clear the tree and refund every point; returns the refund
    pub fn reset_tree(&mut self) -> u32 {
        let refunded = self.tree.reset() as u32;
        self.player.skill_points += refunded;
        self.recalculate();
        refunded
    }

    // =====================================================
    // Snapshot
    // =====================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut visible: Vec<TilePos> = self.visible.iter().copied().collect();
        visible.sort_unstable();
        SessionSnapshot {
            floor: self.floor,
            state: self.state,
            record: self.record,
            map: MapSnapshot {
                width: self.dungeon.width(),
                height: self.dungeon.height(),
                tiles: self.dungeon.tiles().to_vec(),
                explored: self.dungeon.explored().to_vec(),
                visible,
            },
            player: (&self.player).into(),
            enemies: self.enemies.iter().map(Into::into).collect(),
            ground_items: self
                .ground
                .iter()
                .map(|g| GroundItemSnapshot {
                    x: g.pos.x,
                    y: g.pos.y,
                    name: g.loot.name().to_string(),
                    rarity: g.loot.rarity(),
                })
                .collect(),
            texts: self.feedback.texts.clone(),
            effects: self.feedback.effects.clone(),
        }
    }
}
