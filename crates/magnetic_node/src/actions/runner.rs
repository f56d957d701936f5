//! ActionRunner: per-node очередь tween'ов

use bevy::prelude::*;

use crate::config::Easing;

/// Накопленный float-шум от сложения кадровых delta (0.05 × 4 ≠ 0.2)
const COMPLETION_EPSILON: f32 = 1e-5;

/// Уникальный (в пределах runner'а) id запущенного action'а
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ActionToken(pub u64);

/// Какая анимация узла породила action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ActionKind {
    Selected,
    Deselected,
    Removed,
}

/// Канал = визуальное свойство, которое двигает tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionChannel {
    Scale,
    Fade,
}

/// Прозрачность узла целиком (1.0 = непрозрачный)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NodeOpacity(pub f32);

impl Default for NodeOpacity {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Визуальное изменение. Стартовое значение снимается на первом tick'е.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tween {
    /// Uniform scale узла
    Scale { to: f32 },
    /// Opacity узла
    Fade { to: f32 },
}

impl Tween {
    pub fn fade_out() -> Self {
        Tween::Fade { to: 0.0 }
    }

    pub fn channel(&self) -> ActionChannel {
        match self {
            Tween::Scale { .. } => ActionChannel::Scale,
            Tween::Fade { .. } => ActionChannel::Fade,
        }
    }

    fn target(&self) -> f32 {
        match self {
            Tween::Scale { to } | Tween::Fade { to } => *to,
        }
    }

    fn read(&self, transform: &Transform, opacity: &NodeOpacity) -> f32 {
        match self {
            // Uniform scale: x == y
            Tween::Scale { .. } => transform.scale.x,
            Tween::Fade { .. } => opacity.0,
        }
    }

    fn write(&self, value: f32, transform: &mut Transform, opacity: &mut NodeOpacity) {
        match self {
            Tween::Scale { .. } => {
                transform.scale.x = value;
                transform.scale.y = value;
            }
            Tween::Fade { .. } => opacity.0 = value,
        }
    }
}

/// Запрос на анимацию
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    pub tween: Tween,
    pub duration: f32,
    pub easing: Easing,
}

impl Action {
    pub fn new(kind: ActionKind, tween: Tween, duration: f32) -> Self {
        Self {
            kind,
            tween,
            duration: duration.max(0.0),
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Debug, Clone)]
struct RunningAction {
    token: ActionToken,
    action: Action,
    from: Option<f32>,
    elapsed: f32,
}

/// Per-node runner. Живёт на entity узла рядом с Transform/NodeOpacity.
#[derive(Component, Debug, Clone, Default)]
pub struct ActionRunner {
    running: Vec<RunningAction>,
    next_token: u64,
}

impl ActionRunner {
    /// Планирует action. Action на том же канале прерывается без completion.
    pub fn run(&mut self, action: Action) -> ActionToken {
        let channel = action.tween.channel();
        self.running
            .retain(|running| running.action.tween.channel() != channel);

        self.next_token += 1;
        let token = ActionToken(self.next_token);

        self.running.push(RunningAction {
            token,
            action,
            from: None,
            elapsed: 0.0,
        });

        token
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, token: ActionToken) -> bool {
        self.running.iter().any(|running| running.token == token)
    }

    /// Текущий action на канале (kind + token)
    pub fn active(&self, channel: ActionChannel) -> Option<(ActionToken, ActionKind)> {
        self.running
            .iter()
            .find(|running| running.action.tween.channel() == channel)
            .map(|running| (running.token, running.action.kind))
    }

    /// Целевое значение action'а на канале (куда анимация придёт)
    pub fn target(&self, channel: ActionChannel) -> Option<f32> {
        self.running
            .iter()
            .find(|running| running.action.tween.channel() == channel)
            .map(|running| running.action.tween.target())
    }

    /// Продвигает время. Возвращает завершённые action'ы в порядке запуска.
    ///
    /// Новый action на первом tick'е не двигается и не завершается
    /// (даже с нулевой длительностью).
    pub fn tick(
        &mut self,
        delta: f32,
        transform: &mut Transform,
        opacity: &mut NodeOpacity,
    ) -> Vec<(ActionToken, ActionKind)> {
        let mut finished = Vec::new();

        for running in self.running.iter_mut() {
            let tween = running.action.tween;
            // Кадр запуска: только снимаем стартовое значение. Delta этого кадра
            // относится ко времени до запроса и не должна двигать tween.
            let Some(from) = running.from else {
                running.from = Some(tween.read(transform, opacity));
                continue;
            };

            running.elapsed += delta.max(0.0);

            let progress = if running.elapsed + COMPLETION_EPSILON >= running.action.duration {
                1.0
            } else {
                (running.elapsed / running.action.duration).min(1.0)
            };

            let eased = running.action.easing.apply(progress);
            let value = from + (tween.target() - from) * eased;
            tween.write(value, transform, opacity);

            if progress >= 1.0 {
                // Финальный кадр ровно в target (без float drift)
                tween.write(tween.target(), transform, opacity);
                finished.push((running.token, running.action.kind));
            }
        }

        self.running
            .retain(|running| !finished.iter().any(|(token, _)| *token == running.token));

        finished
    }
}
