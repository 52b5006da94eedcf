//! Per-frame simulation tick
//!
//! One tick: steer, advance the platform window, resolve the predicted
//! landing, then commit the character's motion.

use super::platform::Outcome;
use super::state::{GamePhase, Session};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal axis in `-1..=1`
    pub horizontal: f32,
    /// Start a new run once the current one is over
    pub restart: bool,
}

fn sanitize(value: f32, what: &str) -> f32 {
    if value.is_finite() {
        return value;
    }
    log::warn!("Non-finite {} {}, treated as 0", what, value);
    0.0
}

/// Advance the session by `delta_frames` reference frames
pub fn tick(session: &mut Session, input: &TickInput, delta_frames: f32) {
    let mut dt = sanitize(delta_frames, "frame delta");
    if dt < 0.0 {
        log::warn!("Negative frame delta {}, treated as 0", dt);
        dt = 0.0;
    }

    if session.phase == GamePhase::GameOver {
        if input.restart {
            session.reset();
        }
        return;
    }
    if let GamePhase::Dying { remaining_ticks } = session.phase {
        let remaining_ticks = remaining_ticks.saturating_sub(1);
        if remaining_ticks == 0 {
            session.declare_game_over();
            return;
        }
        session.phase = GamePhase::Dying { remaining_ticks };
    }

    session.time_ticks += 1;
    session.rhythm += dt;

    let horizontal = sanitize(input.horizontal, "horizontal axis");
    session.character.steer(horizontal, &session.config);
    session.window.update(
        dt,
        session.rhythm,
        &session.config,
        &session.camera,
        &mut session.rng,
    );

    if !session.character.status().is_terminal() {
        let prediction = session.character.predict(dt, &session.config);
        let outcome =
            session
                .window
                .check_collision(&prediction, &mut session.character, &session.config);
        apply_outcome(session, outcome);
    }

    session.character.update(
        dt,
        &session.config,
        &mut session.camera,
        &mut session.rng,
    );
}

/// Turn a collision outcome into character and session events
fn apply_outcome(session: &mut Session, outcome: Outcome) {
    match outcome {
        Outcome::None => {}
        Outcome::Jump => session.character.jump(&session.config),
        Outcome::Bounce => session.character.bounce(&session.config),
        Outcome::Power => {
            if session.character.power_up() {
                log::debug!("Power-up at altitude {:.0}", session.character.altitude);
            }
        }
        Outcome::Hurt => {
            if session.character.hurt() {
                session.camera.prepare_shake();
                session.begin_dying();
            }
        }
        Outcome::Fall => {
            if session.character.fall() {
                session.begin_dying();
            }
        }
    }
}
