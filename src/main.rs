//! Headless driver: plays one run with a simple autopilot and logs the result.
//!
//! Usage: `crypt-sim [config.ron|config.json]`
//!
//! Environment:
//! - `CRYPT_CLASS`: warrior, rogue or mage (default warrior)
//! - `CRYPT_SEED`: fixed session seed
//! - `CRYPT_MAX_SECS`: simulated time limit (default 600)
//! - `CRYPT_SURVEY`: when set, print a balance survey instead of playing
//! - `CRYPT_LOG`: default log level (trace, debug, info, warn, error)

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use tracing::{debug, info, warn};

use crypt_core::balance::{run_survey, SurveyConfig};
use crypt_core::config::SimConfig;
use crypt_core::dungeon::Dungeon;
use crypt_core::engine::{
    InventoryAction, RunFinished, Session, SessionResource, SimulationPlugin,
};
use crypt_core::loot::{Loot, PotionEffect};
use crypt_core::logging::{init_tracing, LogLevel, TracingConfig};
use crypt_core::player::ClassKind;
use crypt_core::utils::{aim_angle_of, TilePos};

const FRAME_SECS: f32 = 1.0 / 60.0;

#[derive(Resource)]
struct TimeLimit(f32);

fn parse_class(name: &str) -> anyhow::Result<ClassKind> {
    match name.to_ascii_lowercase().as_str() {
        "warrior" => Ok(ClassKind::Warrior),
        "rogue" => Ok(ClassKind::Rogue),
        "mage" => Ok(ClassKind::Mage),
        other => bail!("unknown class '{other}'"),
    }
}

fn load_config() -> anyhow::Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = SimConfig::load(&path).with_context(|| format!("loading {path}"))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        None => Ok(SimConfig::default()),
    }
}

fn tracing_config() -> TracingConfig {
    let config = TracingConfig::default();
    match std::env::var("CRYPT_LOG") {
        Ok(name) => match LogLevel::parse(&name) {
            Some(level) => config.with_level(level),
            None => {
                eprintln!("ignoring unknown CRYPT_LOG level '{name}'");
                config
            }
        },
        Err(_) => config,
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing(&tracing_config());

    let config = Arc::new(load_config()?);

    if std::env::var_os("CRYPT_SURVEY").is_some() {
        let report = run_survey(&config, &SurveyConfig::default());
        println!("{}", report.to_json());
        return Ok(());
    }

    let class = match std::env::var("CRYPT_CLASS") {
        Ok(name) => parse_class(&name)?,
        Err(_) => ClassKind::Warrior,
    };
    let session = match std::env::var("CRYPT_SEED") {
        Ok(seed) => {
            let seed: u64 = seed.parse().context("CRYPT_SEED must be an integer")?;
            Session::with_seed(Arc::clone(&config), class, seed)?
        }
        Err(_) => Session::new(Arc::clone(&config), class)?,
    };
    let limit: f32 = std::env::var("CRYPT_MAX_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(600.0);

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            FRAME_SECS,
        )))
        .insert_resource(TimeLimit(limit))
        .add_plugins(SimulationPlugin::new(session))
        .add_systems(Update, (autopilot_system, exit_system))
        .run();

    Ok(())
}

/// First step of a shortest walkable path, by breadth-first search
fn next_step(dungeon: &Dungeon, from: TilePos, to: TilePos) -> Option<TilePos> {
    if from == to {
        return Some(to);
    }
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    came_from.insert(from, from);

    while let Some(cur) = queue.pop_front() {
        if cur == to {
            let mut step = cur;
            while let Some(&prev) = came_from.get(&step) {
                if prev == from {
                    return Some(step);
                }
                step = prev;
            }
            return None;
        }
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = cur.offset(dx, dy);
            if dungeon.is_walkable(next) && !came_from.contains_key(&next) {
                came_from.insert(next, cur);
                queue.push_back(next);
            }
        }
    }
    None
}

fn drink_if_hurt(session: &mut Session) {
    let player = session.player();
    if player.hp * 10 > player.max_hp() * 4 {
        return;
    }
    let slot = player
        .inventory
        .slots()
        .iter()
        .position(|s| matches!(s, Some(Loot::Potion(p)) if matches!(p.effect, PotionEffect::Heal(_))));
    if let Some(slot) = slot {
        session.inventory(InventoryAction::Use(slot));
    }
}

/// Fight whatever is visible, otherwise walk to the stairs
fn autopilot_system(session_res: Res<SessionResource>) {
    let Ok(mut session) = session_res.0.write() else {
        return;
    };
    if session.is_over() {
        return;
    }
    drink_if_hurt(&mut session);
    session.pickup();

    let pos = session.player().pos;
    let here = TilePos::containing(pos);
    let target = session
        .enemies()
        .iter()
        .filter(|e| !e.is_dead() && session.visible_tiles().contains(&TilePos::containing(e.pos)))
        .min_by(|a, b| a.pos.distance(pos).total_cmp(&b.pos.distance(pos)))
        .map(|e| e.pos);

    let goal = match target {
        Some(enemy_pos) => {
            let aim = aim_angle_of(enemy_pos - pos);
            session.set_aim(aim);
            if enemy_pos.distance(pos) <= session.player().attack.range {
                session.use_skill(0, aim);
                session.attack(aim);
                session.set_intent(Vec2::ZERO);
                return;
            }
            Some(TilePos::containing(enemy_pos))
        }
        None => session.dungeon().stairs,
    };

    let intent = goal
        .and_then(|g| next_step(session.dungeon(), here, g))
        .map(|step| step.center() - pos)
        .unwrap_or(Vec2::ZERO);
    session.set_intent(intent);
}

fn exit_system(
    session_res: Res<SessionResource>,
    limit: Res<TimeLimit>,
    mut finished: EventReader<RunFinished>,
    mut exit: EventWriter<AppExit>,
) {
    if let Some(run) = finished.read().next() {
        info!(
            state = ?run.state,
            kills = run.record.kills,
            floors = run.record.floors_cleared,
            elapsed = run.record.elapsed,
            "Run finished"
        );
        if let Ok(session) = session_res.0.read() {
            debug!("Final floor:\n{}", session.dungeon().render_ascii());
            for item in session.player().equipment.iter() {
                debug!(name = %item.name, stats = ?item.describe(), "Equipped");
            }
        }
        exit.send(AppExit::Success);
        return;
    }
    if let Ok(session) = session_res.0.read() {
        if session.record().elapsed >= limit.0 {
            warn!(
                floor = session.floor(),
                elapsed = session.record().elapsed,
                "Time limit reached"
            );
            exit.send(AppExit::Success);
        }
    }
}
