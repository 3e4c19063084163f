use bevy::prelude::*;
use std::sync::{Arc, RwLock};
use tracing::error;

use crate::engine::session::{RunRecord, RunState, Session};

/// Drives a shared [`Session`] from Bevy's `Update` schedule.
///
/// The session stays behind an `Arc<RwLock<_>>` so input and render layers
/// outside the ECS can hold the same handle.
pub struct SimulationPlugin {
    session: Arc<RwLock<Session>>,
}

impl SimulationPlugin {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Clone of the handle the plugin will insert
    pub fn handle(&self) -> Arc<RwLock<Session>> {
        Arc::clone(&self.session)
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SessionResource(self.handle()))
            .add_event::<RunFinished>()
            .add_systems(Update, session_tick_system);
    }
}

#[derive(Resource)]
pub struct SessionResource(pub Arc<RwLock<Session>>);

/// Sent once when the run ends in death or victory
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RunFinished {
    pub state: RunState,
    pub record: RunRecord,
}

fn session_tick_system(
    time: Res<Time>,
    session_res: Res<SessionResource>,
    mut finished: EventWriter<RunFinished>,
    mut reported: Local<bool>,
) {
    let mut session = match session_res.0.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            // A panic elsewhere left the lock poisoned; the session data is still whole
            error!("Session lock poisoned, recovering");
            session_res.0.clear_poison();
            poisoned.into_inner()
        }
    };
    session.tick(time.delta_secs());
    if session.is_over() && !*reported {
        *reported = true;
        finished.send(RunFinished {
            state: session.state(),
            record: session.record(),
        });
    }
}
