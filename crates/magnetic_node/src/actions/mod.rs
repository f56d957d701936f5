//! Action runner: scheduled visual changes с completion token'ами
//!
//! Заменяет fire-and-forget engine actions (action стартует со следующего кадра):
//! `run(action) -> ActionToken`, завершение приходит событием `ActionCompleted`
//! на одном из следующих кадров.
//!
//! Каналы (scale / fade) независимы. Новый action на занятом канале прерывает
//! текущий (interrupt-and-restart от текущего значения), прерванный action
//! никогда не завершается.

use bevy::prelude::*;

pub mod runner;


pub use runner::{Action, ActionChannel, ActionKind, ActionRunner, ActionToken, NodeOpacity, Tween};

/// Событие: action отыграл до конца (ровно один раз на token)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ActionCompleted {
    pub node: Entity,
    pub token: ActionToken,
    pub kind: ActionKind,
}

/// Система: продвигает все ActionRunner'ы на `Time::delta_secs`
///
/// Применяет tween'ы к Transform/NodeOpacity и шлёт ActionCompleted.
pub fn advance_actions(
    mut runners: Query<(Entity, &mut ActionRunner, &mut Transform, &mut NodeOpacity)>,
    mut completed_events: EventWriter<ActionCompleted>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (node, mut runner, mut transform, mut opacity) in runners.iter_mut() {
        if runner.is_idle() {
            continue;
        }

        for (token, kind) in runner.tick(delta, &mut transform, &mut opacity) {
            completed_events.write(ActionCompleted { node, token, kind });
        }
    }
}
