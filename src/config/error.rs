//! Errors raised while loading or validating simulation data.

use thiserror::Error;

/// Structural problems with a [`super::SimConfig`].
///
/// Gameplay rejections (full inventory, invalid tree allocation, ...) are
/// outcome values, not errors; this type only covers bad data and I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(Option<String>),

    #[error("no definition for class {0}")]
    UnknownClass(String),

    #[error("{context} references unknown enemy {key}")]
    UnknownEnemy { context: String, key: String },

    #[error("enemy {enemy} references unknown monster skill {skill}")]
    UnknownMonsterSkill { enemy: String, skill: String },

    #[error("floor loot tier {tier} references unknown item base {key}")]
    UnknownItemBase { tier: usize, key: String },

    #[error("skill tree node {node} connects to unknown node {target}")]
    UnknownTreeNode { node: String, target: String },

    #[error("skill tree has {0} start nodes, expected exactly one")]
    StartNodeCount(usize),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("table {0} must not be empty")]
    EmptyTable(&'static str),

    #[error("invalid dungeon dimensions: {0}")]
    InvalidDungeon(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
