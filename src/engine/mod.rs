//! Run orchestration
//!
//! - [`session`]: the owning state machine and its per-frame tick
//! - [`commands`]: structured results for player commands
//! - [`messages`]: serializable snapshots for renderers and tooling
//! - [`plugin`]: Bevy wiring around a shared session

pub mod commands;
pub mod messages;
pub mod plugin;
pub mod session;

pub use commands::{
    AttackOutcome, AttackReport, InventoryAction, InventoryOutcome, PickupOutcome, SkillOutcome,
    SkillRejection, SkillReport,
};
pub use messages::{EnemySnapshot, PlayerSnapshot, SessionSnapshot, TelegraphMsg};
pub use plugin::{RunFinished, SessionResource, SimulationPlugin};
pub use session::{GroundItem, RunRecord, RunState, Session};

// =====================================================
// Tests
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::player::ClassKind;
    use std::sync::Arc;

    fn session(seed: u64) -> Session {
        Session::with_seed(Arc::new(SimConfig::default()), ClassKind::Rogue, seed).unwrap()
    }

    #[test]
    fn test_same_seed_same_floor() {
        let a = session(99);
        let b = session(99);
        assert_eq!(a.dungeon().tiles(), b.dungeon().tiles());
        assert_eq!(a.enemies().len(), b.enemies().len());
        assert_eq!(a.player().pos, b.player().pos);
    }

    #[test]
    fn test_unknown_class_rejected() {
        let mut config = SimConfig::default();
        config.classes.retain(|c| c.kind != ClassKind::Mage);
        match Session::new(Arc::new(config), ClassKind::Mage) {
            Err(crate::config::ConfigError::UnknownClass(name)) => assert_eq!(name, "Mage"),
            Err(other) => panic!("Expected UnknownClass, got {:?}", other),
            Ok(_) => panic!("Expected UnknownClass, got a session"),
        }
    }

    #[test]
    fn test_idle_ticks_advance_clock() {
        let mut s = session(5);
        s.enemies_mut().clear();
        for _ in 0..60 {
            s.tick(1.0 / 60.0);
        }
        assert!((s.record().elapsed - 1.0).abs() < 1e-3);
        assert_eq!(s.state(), RunState::Playing);
    }

    #[test]
    fn test_snapshot_tracks_commands() {
        let mut s = session(5);
        s.enemies_mut().clear();
        s.attack(1.0);
        let snap = s.snapshot();
        assert!((snap.player.aim - 1.0).abs() < 1e-6);
        assert!(snap.player.attack_cooldown > 0.0);
        assert_eq!(snap.effects.len(), 1);
    }
}
