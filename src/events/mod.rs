//! Transient presentation feedback.
//!
//! Floating combat text and skill/attack visual effects are written once
//! when something happens and expire on their own. A renderer reads the
//! queues from the session snapshot; nothing in the simulation reads them back.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{FLOATING_TEXT_DECAY, VISUAL_EFFECT_SECS};

/// Colour class of a floating text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTone {
    Damage,
    Crit,
    PlayerHurt,
    Dodge,
    Shielded,
    Poison,
    Skill,
    Heal,
    Mana,
    Xp,
    LevelUp,
    Loot,
}

/// Text floating above a position; `life` drains from 1.0 to 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub tone: TextTone,
    pub large: bool,
    pub life: f32,
}

/// Shape of a visual effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// Basic attack swing
    Slash { angle: f32, range: f32, arc: f32 },
    /// Cone skill
    Shockwave { angle: f32, range: f32, arc: f32 },
    DashTrail { to_x: f32, to_y: f32 },
    Explosion { radius: f32 },
    Aura { radius: f32 },
    FrostRing { radius: f32 },
    /// A monster skill going off
    Impact { radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEffect {
    pub x: f32,
    pub y: f32,
    #[serde(flatten)]
    pub kind: EffectKind,
    pub remaining: f32,
}

/// Both feedback queues
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackQueue {
    pub texts: Vec<FloatingText>,
    pub effects: Vec<VisualEffect>,
}

impl FeedbackQueue {
    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, tone: TextTone, large: bool) {
        self.texts.push(FloatingText {
            x: pos.x,
            y: pos.y,
            text: text.into(),
            tone,
            large,
            life: 1.0,
        });
    }

    pub fn effect(&mut self, pos: Vec2, kind: EffectKind) {
        self.effects.push(VisualEffect {
            x: pos.x,
            y: pos.y,
            kind,
            remaining: VISUAL_EFFECT_SECS,
        });
    }

    /// Age everything by `dt` and drop what expired
    pub fn update(&mut self, dt: f32) {
        self.texts.retain_mut(|t| {
            t.life -= dt * FLOATING_TEXT_DECAY;
            t.life > 0.0
        });
        self.effects.retain_mut(|e| {
            e.remaining -= dt;
            e.remaining > 0.0
        });
    }

    pub fn clear(&mut self) {
        self.texts.clear();
        self.effects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.effects.is_empty()
    }
}
