//! Системы пузырей: intent'ы → состояние узла → анимации → удаление
//!
//! Порядок (MagneticSet, chain):
//! 1. apply_image_intents — конвертация картинок, показ default если sprite пуст
//! 2. apply_color_intents — tint sprite'а
//! 3. apply_selection_intents — selection FSM + selected/deselected анимации
//! 4. apply_removal_intents — fade-out (removedAnimation)
//! 5. advance_actions — tick tween'ов (actions модуль)
//! 6. finish_bubble_removal — detach + despawn после fade-out

use bevy::prelude::*;

use super::components::{
    BubbleNode, BubbleSprite, Removing, SelectionTransition, VisualTree,
};
use super::events::{
    BubbleAnimationStarted, BubbleRemoved, RemoveBubble, SetBubbleColor, SetBubbleImage,
    SetBubbleSelected,
};
use crate::actions::{
    Action, ActionChannel, ActionCompleted, ActionKind, ActionRunner, ActionToken, Tween,
};
use crate::config::BubbleConfig;
use crate::texture::BubbleTexture;

/// selectedAnimation / deselectedAnimation
///
/// Scale через runner (interrupt-and-restart), текстура меняется сразу,
/// если нужная есть. Если нет — sprite остаётся как был.
pub fn selection_animation(
    transition: SelectionTransition,
    node: &BubbleNode,
    runner: &mut ActionRunner,
    sprite: Option<&mut BubbleSprite>,
    config: &BubbleConfig,
) -> (ActionKind, ActionToken) {
    let (kind, duration) = match transition {
        SelectionTransition::Selected => (ActionKind::Selected, config.selected_duration),
        SelectionTransition::Deselected => (ActionKind::Deselected, config.deselected_duration),
    };

    let (scale, texture) = node.transition_target(transition);
    let token = runner.run(Action::new(kind, Tween::Scale { to: scale }, duration).with_easing(config.easing));

    if let (Some(texture), Some(sprite)) = (texture, sprite) {
        sprite.texture = Some(texture.clone());
    }

    (kind, token)
}

/// removedAnimation: fade-out, completion = ActionCompleted с этим token'ом
pub fn removed_animation(runner: &mut ActionRunner, config: &BubbleConfig) -> ActionToken {
    runner.run(
        Action::new(ActionKind::Removed, Tween::fade_out(), config.removed_duration)
            .with_easing(config.easing),
    )
}

/// Система: SetBubbleImage → texture → (опционально) sprite
pub fn apply_image_intents(
    mut image_events: EventReader<SetBubbleImage>,
    mut nodes: Query<(&mut BubbleNode, &VisualTree)>,
    mut sprites: Query<&mut BubbleSprite>,
) {
    for event in image_events.read() {
        let Ok((mut node, tree)) = nodes.get_mut(event.node) else {
            crate::logger::log_warning(&format!(
                "SetBubbleImage: entity {:?} is not a bubble",
                event.node
            ));
            continue;
        };

        let Some(texture) = BubbleTexture::from_image(&event.image) else {
            crate::logger::log(&format!(
                "SetBubbleImage: empty {:?} image for {:?} ignored",
                event.slot, event.node
            ));
            continue;
        };

        let Ok(mut sprite) = sprites.get_mut(tree.sprite) else {
            crate::logger::log_error(&format!(
                "Bubble {:?} lost its sprite {:?}",
                event.node, tree.sprite
            ));
            continue;
        };

        if let Some(shown) = node.assign_texture(event.slot, texture, sprite.texture.is_none()) {
            sprite.texture = Some(shown);
        }
    }
}

/// Система: SetBubbleColor → sprite tint
pub fn apply_color_intents(
    mut color_events: EventReader<SetBubbleColor>,
    nodes: Query<&VisualTree, With<BubbleNode>>,
    mut sprites: Query<&mut BubbleSprite>,
) {
    for event in color_events.read() {
        let Ok(tree) = nodes.get(event.node) else {
            crate::logger::log_warning(&format!(
                "SetBubbleColor: entity {:?} is not a bubble",
                event.node
            ));
            continue;
        };

        if let Ok(mut sprite) = sprites.get_mut(tree.sprite) {
            sprite.color = event.color;
        }
    }
}

/// Система: SetBubbleSelected → FSM → анимация
///
/// Self-loop (то же значение) ничего не запускает. Узлы в процессе удаления
/// игнорируют selection.
pub fn apply_selection_intents(
    mut selection_events: EventReader<SetBubbleSelected>,
    mut nodes: Query<(&mut BubbleNode, &VisualTree, &mut ActionRunner), Without<Removing>>,
    removing: Query<(), With<Removing>>,
    mut sprites: Query<&mut BubbleSprite>,
    mut started_events: EventWriter<BubbleAnimationStarted>,
    config: Res<BubbleConfig>,
) {
    for event in selection_events.read() {
        let Ok((mut node, tree, mut runner)) = nodes.get_mut(event.node) else {
            if removing.contains(event.node) {
                crate::logger::log(&format!(
                    "SetBubbleSelected: bubble {:?} is being removed, ignored",
                    event.node
                ));
            } else {
                crate::logger::log_warning(&format!(
                    "SetBubbleSelected: entity {:?} is not a bubble",
                    event.node
                ));
            }
            continue;
        };

        // Удаление уже запрошено в этом кадре (Removing ещё не вставлен)
        if matches!(runner.active(ActionChannel::Fade), Some((_, ActionKind::Removed))) {
            continue;
        }

        let Some(transition) = node.set_selected(event.selected) else {
            continue;
        };

        let sprite = sprites.get_mut(tree.sprite).ok();
        let (kind, token) = selection_animation(
            transition,
            &node,
            &mut runner,
            sprite.map(|sprite| sprite.into_inner()),
            &config,
        );

        started_events.write(BubbleAnimationStarted {
            node: event.node,
            kind,
            token,
        });
    }
}

/// Система: RemoveBubble → fade-out (removeFromParent не синхронный)
///
/// Повторный запрос для уже исчезающего узла игнорируется.
pub fn apply_removal_intents(
    mut commands: Commands,
    mut removal_events: EventReader<RemoveBubble>,
    mut nodes: Query<&mut ActionRunner, (With<BubbleNode>, Without<Removing>)>,
    mut started_events: EventWriter<BubbleAnimationStarted>,
    config: Res<BubbleConfig>,
) {
    for event in removal_events.read() {
        let Ok(mut runner) = nodes.get_mut(event.node) else {
            crate::logger::log(&format!(
                "RemoveBubble: {:?} is not a live bubble (already removing?)",
                event.node
            ));
            continue;
        };

        if matches!(runner.active(ActionChannel::Fade), Some((_, ActionKind::Removed))) {
            continue;
        }

        let token = removed_animation(&mut runner, &config);
        commands.entity(event.node).insert(Removing { token });

        started_events.write(BubbleAnimationStarted {
            node: event.node,
            kind: ActionKind::Removed,
            token,
        });
    }
}

/// Система: completion fade-out → detach от родителя + despawn дерева
///
/// Выполняется ровно один раз на узел (token совпадает с `Removing`).
pub fn finish_bubble_removal(
    mut commands: Commands,
    mut completed_events: EventReader<ActionCompleted>,
    nodes: Query<(&Removing, Option<&ChildOf>), With<BubbleNode>>,
    mut removed_events: EventWriter<BubbleRemoved>,
) {
    for event in completed_events.read() {
        if event.kind != ActionKind::Removed {
            continue;
        }

        let Ok((removing, child_of)) = nodes.get(event.node) else {
            continue;
        };

        if removing.token != event.token {
            continue;
        }

        let parent = child_of.map(|child_of| child_of.parent());

        commands.entity(event.node).remove::<ChildOf>().despawn();

        removed_events.write(BubbleRemoved {
            node: event.node,
            parent,
        });

        crate::logger::log_info(&format!(
            "Bubble {:?} removed (parent {:?})",
            event.node, parent
        ));
    }
}
