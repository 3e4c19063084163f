//! The player character.
//!
//! Derived stats are never patched: [`Player::recalculate`] rebuilds them
//! from class base, equipment, skill-tree bonuses and active buffs every
//! time one of those changes.

pub mod class;
pub mod inventory;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ProgressionConfig;
use crate::constants::{DEX_SPEED_PER_POINT, DEX_SPEED_PIVOT, PLAYER_RADIUS, UNARMED_DAMAGE};
use crate::dungeon::Dungeon;
use crate::engine::commands::SkillRejection;
use crate::loot::{Potion, PotionEffect};
use crate::stats::{derive_stats, Bonuses, StatBlock, StatKey};
use crate::utils::{aim_angle_of, roll_percent, roll_range};

pub use class::{AttackProfile, ClassDef, ClassKind, PlayerSkillDef, SkillKind, StatScaling};
pub use inventory::{Equipment, Inventory};

/// Timed stat bonus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub stat: StatKey,
    pub value: f32,
    pub remaining: f32,
}

/// Poison coat on the player's weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonCoat {
    pub hits: u32,
    pub damage: i32,
}

/// Output of the stat pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub stats: StatBlock,
    pub attack: AttackProfile,
    pub speed: f32,
}

/// Pure stat derivation: class base, then equipment, weapon overrides,
/// tree bonuses, buffs and finally the percent multipliers.
pub fn derive_player_stats(
    class: &ClassDef,
    equipment: &Equipment,
    tree: &Bonuses,
    buffs: &[Buff],
) -> DerivedStats {
    let gear = equipment.bonuses();
    let buff_bonuses: Bonuses = buffs.iter().map(|b| (b.stat, b.value)).collect();
    let stats = derive_stats(
        &class.base,
        gear.iter().chain([tree, &buff_bonuses]),
    );

    let attack = match equipment.weapon() {
        Some(w) => AttackProfile {
            range: w.range.unwrap_or(class.attack.range),
            cooldown: w.cooldown.unwrap_or(class.attack.cooldown),
            arc: w.arc.unwrap_or(class.attack.arc),
        },
        None => class.attack,
    };

    let speed = class.speed * (1.0 + (stats.dex - DEX_SPEED_PIVOT) * DEX_SPEED_PER_POINT);

    DerivedStats {
        stats,
        attack,
        speed,
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub class: ClassDef,
    pub pos: Vec2,
    pub radius: f32,
    /// Movement intent; normalized when applied
    pub intent: Vec2,
    /// Last movement direction as an aim angle
    pub facing: f32,
    /// Direction of attacks and skills
    pub aim: f32,

    pub hp: i32,
    pub mp: i32,
    pub shield: i32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub skill_points: u32,

    pub stats: StatBlock,
    pub attack: AttackProfile,
    pub speed: f32,

    pub equipment: Equipment,
    pub inventory: Inventory,
    pub buffs: Vec<Buff>,
    pub poison: Option<PoisonCoat>,
    pub attack_cooldown: f32,
    pub skill_cooldowns: Vec<f32>,
}

impl Player {
    pub fn new(class: &ClassDef, progression: &ProgressionConfig, pos: Vec2) -> Self {
        let mut player = Self {
            class: class.clone(),
            pos,
            radius: PLAYER_RADIUS,
            intent: Vec2::ZERO,
            facing: 0.0,
            aim: 0.0,
            hp: 0,
            mp: 0,
            shield: 0,
            level: 1,
            xp: 0,
            xp_to_next: progression.threshold(1),
            skill_points: 0,
            stats: class.base,
            attack: class.attack,
            speed: class.speed,
            equipment: Equipment::default(),
            inventory: Inventory::default(),
            buffs: Vec::new(),
            poison: None,
            attack_cooldown: 0.0,
            skill_cooldowns: vec![0.0; class.skills.len()],
        };
        player.recalculate(&Bonuses::new());
        player.hp = player.max_hp();
        player.mp = player.max_mp();
        player
    }

    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp as i32
    }

    pub fn max_mp(&self) -> i32 {
        self.stats.max_mp as i32
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Rebuild derived stats; current hp/mp are capped, never raised
    pub fn recalculate(&mut self, tree: &Bonuses) {
        let derived = derive_player_stats(&self.class, &self.equipment, tree, &self.buffs);
        self.stats = derived.stats;
        self.attack = derived.attack;
        self.speed = derived.speed;
        self.hp = self.hp.min(self.max_hp());
        self.mp = self.mp.min(self.max_mp());
    }

    pub fn collides_at(&self, pos: Vec2, dungeon: &Dungeon) -> bool {
        dungeon.collides_circle(pos, self.radius)
    }

    /// Apply movement intent for `dt`, one axis at a time so walls slide
    pub fn update_movement(&mut self, dt: f32, dungeon: &Dungeon) {
        if self.intent == Vec2::ZERO {
            return;
        }
        let step = self.intent.normalize_or_zero() * self.speed * dt;

        let next = Vec2::new(self.pos.x + step.x, self.pos.y);
        if !self.collides_at(next, dungeon) {
            self.pos = next;
        }
        let next = Vec2::new(self.pos.x, self.pos.y + step.y);
        if !self.collides_at(next, dungeon) {
            self.pos = next;
        }

        self.facing = aim_angle_of(self.intent);
    }

    /// Push by `offset`, axis by axis, stopping at walls
    pub fn knock_back(&mut self, offset: Vec2, dungeon: &Dungeon) {
        let next = Vec2::new(self.pos.x + offset.x, self.pos.y);
        if !self.collides_at(next, dungeon) {
            self.pos = next;
        }
        let next = Vec2::new(self.pos.x, self.pos.y + offset.y);
        if !self.collides_at(next, dungeon) {
            self.pos = next;
        }
    }

    pub fn can_attack(&self) -> bool {
        self.attack_cooldown <= 0.0
    }

    pub fn start_attack_cooldown(&mut self) {
        self.attack_cooldown = self.attack.cooldown;
    }

    /// Add XP and process every level-up it pays for. Returns the new levels.
    pub fn gain_xp(&mut self, amount: u32, progression: &ProgressionConfig) -> Vec<u32> {
        self.xp += amount;
        let mut level_ups = Vec::new();
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.skill_points += progression.skill_points_per_level;
            self.xp_to_next = progression.threshold(self.level);
            self.hp = self.max_hp();
            self.mp = self.max_mp();
            level_ups.push(self.level);
            info!(level = self.level, next = self.xp_to_next, "Level up");
        }
        level_ups
    }

    /// Basic attack damage before crit and armor
    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let (lo, hi) = self
            .equipment
            .weapon()
            .map(|w| w.damage)
            .unwrap_or(UNARMED_DAMAGE);
        let base = roll_range(rng, lo, hi) + self.class.attack_scaling.bonus(&self.stats);
        (base as f32 * (1.0 + self.stats.damage_percent / 100.0)).round() as i32
    }

    /// Roll against crit chance; returns the final damage and whether it crit
    pub fn apply_crit<R: Rng + ?Sized>(&self, damage: i32, rng: &mut R) -> (i32, bool) {
        if roll_percent(rng, self.stats.crit_chance) {
            ((damage as f32 * self.stats.crit_multi).round() as i32, true)
        } else {
            (damage, false)
        }
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp());
    }

    pub fn restore_mana(&mut self, amount: i32) {
        self.mp = (self.mp + amount).min(self.max_mp());
    }

    /// Leech from a landed hit
    pub fn apply_on_hit(&mut self) {
        if self.stats.life_on_hit > 0.0 {
            self.heal(self.stats.life_on_hit as i32);
        }
        if self.stats.mana_on_hit > 0.0 {
            self.restore_mana(self.stats.mana_on_hit as i32);
        }
    }

    /// Consume one poison charge, returning its damage
    pub fn consume_poison(&mut self) -> Option<i32> {
        let coat = self.poison.as_mut()?;
        let damage = coat.damage;
        coat.hits = coat.hits.saturating_sub(1);
        if coat.hits == 0 {
            self.poison = None;
            debug!("Poison faded");
        }
        Some(damage)
    }

    /// Shield absorbs first, the rest hits health. Returns (absorbed, taken).
    pub fn take_damage_with_shield(&mut self, damage: i32) -> (i32, i32) {
        let absorbed = self.shield.min(damage).max(0);
        self.shield -= absorbed;
        let taken = damage - absorbed;
        if taken > 0 {
            self.hp = (self.hp - taken).max(0);
        }
        (absorbed, taken.max(0))
    }

    pub fn add_buff(&mut self, stat: StatKey, value: f32, duration: f32) {
        self.buffs.push(Buff {
            stat,
            value,
            remaining: duration,
        });
    }

    /// Count buffs down; true when any expired
    pub fn tick_buffs(&mut self, dt: f32) -> bool {
        let before = self.buffs.len();
        for buff in &mut self.buffs {
            buff.remaining -= dt;
        }
        self.buffs.retain(|b| b.remaining > 0.0);
        self.buffs.len() != before
    }

    pub fn tick_cooldowns(&mut self, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }
        for cd in &mut self.skill_cooldowns {
            if *cd > 0.0 {
                *cd = (*cd - dt).max(0.0);
            }
        }
    }

    /// Whether the skill in `slot` can be cast right now
    pub fn check_skill(&self, slot: usize) -> Result<&PlayerSkillDef, SkillRejection> {
        let skill = self.class.skills.get(slot).ok_or(SkillRejection::NoSkill)?;
        if self.skill_cooldowns.get(slot).copied().unwrap_or(0.0) > 0.0 {
            return Err(SkillRejection::OnCooldown);
        }
        if self.mp < skill.mana_cost {
            return Err(SkillRejection::NotEnoughMana);
        }
        Ok(skill)
    }

    /// Pay mana and start the cooldown for `slot`
    pub fn spend_skill(&mut self, slot: usize) -> Result<PlayerSkillDef, SkillRejection> {
        let skill = self.check_skill(slot)?.clone();
        self.mp -= skill.mana_cost;
        if let Some(cd) = self.skill_cooldowns.get_mut(slot) {
            *cd = skill.cooldown;
        }
        Ok(skill)
    }

    pub fn drink(&mut self, potion: &Potion) {
        match potion.effect {
            PotionEffect::Heal(amount) => self.heal(amount),
            PotionEffect::Mana(amount) => self.restore_mana(amount),
            PotionEffect::Buff {
                stat,
                value,
                duration,
            } => self.add_buff(stat, value, duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Tile;
    use crate::loot::{EquipSlot, Item, Rarity, WeaponProfile};
    use crate::utils::TilePos;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn warrior() -> Player {
        let class = class::default_classes().remove(0);
        Player::new(&class, &ProgressionConfig::default(), Vec2::new(5.5, 5.5))
    }

    fn mage() -> Player {
        let class = class::default_classes().remove(2);
        Player::new(&class, &ProgressionConfig::default(), Vec2::new(5.5, 5.5))
    }

    fn room() -> Dungeon {
        let mut d = Dungeon::filled(1, 12, 12);
        for y in 1..11 {
            for x in 1..11 {
                d.set_tile(TilePos::new(x, y), Tile::Floor);
            }
        }
        d
    }

    fn sword(lo: i32, hi: i32) -> Item {
        Item {
            base_key: "iron_sword".into(),
            name: "Iron Sword".into(),
            slot: EquipSlot::Weapon,
            rarity: Rarity::Common,
            bonuses: Bonuses::new().with(StatKey::Str, 4.0),
            weapon: Some(WeaponProfile {
                damage: (lo, hi),
                range: Some(2.0),
                cooldown: None,
                arc: None,
            }),
            armor: 0,
            dodge: 0,
        }
    }

    #[test]
    fn test_new_player_full_vitals() {
        let p = warrior();
        assert_eq!(p.hp, 140);
        assert_eq!(p.mp, 30);
        assert_eq!(p.xp_to_next, 50);
        // dex 8: 3.8 * (1 - 0.02)
        assert!((p.speed - 3.724).abs() < 1e-4);
    }

    #[test]
    fn test_weapon_overrides_fall_back_to_class() {
        let mut p = warrior();
        p.equipment.equip(sword(7, 13));
        p.recalculate(&Bonuses::new());
        assert_eq!(p.attack.range, 2.0);
        assert_eq!(p.attack.cooldown, p.class.attack.cooldown);
        assert_eq!(p.stats.str, 20.0);
    }

    #[test]
    fn test_recalculate_caps_but_never_raises() {
        let mut p = warrior();
        let tree = Bonuses::new().with(StatKey::MaxHp, -50.0);
        p.recalculate(&tree);
        assert_eq!(p.hp, 90);
        p.recalculate(&Bonuses::new());
        assert_eq!(p.hp, 90);
        assert_eq!(p.max_hp(), 140);
    }

    #[test]
    fn test_gain_xp_cascades() {
        let mut p = warrior();
        p.hp = 10;
        let levels = p.gain_xp(50 + 75 + 10, &ProgressionConfig::default());
        assert_eq!(levels, vec![2, 3]);
        assert_eq!(p.xp, 10);
        assert_eq!(p.xp_to_next, 113);
        assert_eq!(p.skill_points, 2);
        assert_eq!(p.hp, p.max_hp());
    }

    #[test]
    fn test_damage_scaling_by_class_stat() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut p = warrior();
        p.equipment.equip(sword(10, 10));
        p.recalculate(&Bonuses::new());
        // 10 + floor(20 / 5)
        assert_eq!(p.roll_damage(&mut rng), 14);

        let m = mage();
        for _ in 0..50 {
            // 3..=6 + floor(18 / 4)
            let d = m.roll_damage(&mut rng);
            assert!((7..=10).contains(&d), "{d}");
        }
    }

    #[test]
    fn test_damage_percent_multiplier() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut p = warrior();
        p.equipment.equip(sword(10, 10));
        p.add_buff(StatKey::DamagePercent, 50.0, 5.0);
        p.recalculate(&Bonuses::new());
        assert_eq!(p.roll_damage(&mut rng), 21);
    }

    #[test]
    fn test_wall_sliding() {
        let d = room();
        let mut p = warrior();
        p.pos = Vec2::new(1.35, 5.5);
        p.intent = Vec2::new(-1.0, 1.0);
        p.update_movement(0.1, &d);
        assert!((p.pos.x - 1.35).abs() < 1e-6, "x blocked by wall");
        assert!(p.pos.y > 5.5, "y still moves");
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut p = warrior();
        p.shield = 30;
        assert_eq!(p.take_damage_with_shield(50), (30, 20));
        assert_eq!(p.shield, 0);
        assert_eq!(p.hp, 120);
        assert_eq!(p.take_damage_with_shield(500), (0, 500));
        assert_eq!(p.hp, 0);
    }

    #[test]
    fn test_skill_gates() {
        let mut p = warrior();
        assert_eq!(p.check_skill(5).unwrap_err(), SkillRejection::NoSkill);
        let skill = p.spend_skill(0).unwrap();
        assert_eq!(skill.id, "shield_bash");
        assert_eq!(p.mp, 20);
        assert_eq!(p.check_skill(0).unwrap_err(), SkillRejection::OnCooldown);
        p.mp = 0;
        assert_eq!(p.check_skill(1).unwrap_err(), SkillRejection::NotEnoughMana);
        p.tick_cooldowns(100.0);
        assert_eq!(p.skill_cooldowns[0], 0.0);
    }

    #[test]
    fn test_buffs_expire() {
        let mut p = warrior();
        p.add_buff(StatKey::Str, 5.0, 1.0);
        assert!(!p.tick_buffs(0.5));
        assert!(p.tick_buffs(0.6));
        assert!(p.buffs.is_empty());
    }

    #[test]
    fn test_poison_coat_consumed() {
        let mut p = warrior();
        p.poison = Some(PoisonCoat { hits: 2, damage: 8 });
        assert_eq!(p.consume_poison(), Some(8));
        assert_eq!(p.consume_poison(), Some(8));
        assert_eq!(p.consume_poison(), None);
    }

    #[test]
    fn test_potions() {
        let mut p = warrior();
        p.hp = 100;
        p.drink(&Potion {
            name: "Greater Health Potion".into(),
            effect: PotionEffect::Heal(60),
        });
        assert_eq!(p.hp, 140);
        p.drink(&Potion {
            name: "Strength Elixir".into(),
            effect: PotionEffect::Buff {
                stat: StatKey::Str,
                value: 5.0,
                duration: 20.0,
            },
        });
        p.recalculate(&Bonuses::new());
        assert_eq!(p.stats.str, 21.0);
    }
}
