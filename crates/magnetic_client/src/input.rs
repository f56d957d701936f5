//! Ввод: клик = toggle selection, Delete = удалить выбранные, Space = новый пузырь

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use magnetic_node::{
    logger, BubbleConfig, BubbleNode, RemoveBubble, Removing, SetBubbleImage, SetBubbleSelected,
};

use crate::field::{spawn_random_bubble, BubbleField};

pub struct BubbleInputPlugin;

impl Plugin for BubbleInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (toggle_selection_on_click, remove_selected_bubbles, spawn_bubble_on_key)
                .before(magnetic_node::MagneticSet),
        );
    }
}

/// Курсор в мировых координатах (если он над окном)
fn cursor_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

/// Система: клик по пузырю переключает selection
fn toggle_selection_on_click(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    bubbles: Query<(Entity, &BubbleNode, &GlobalTransform), Without<Removing>>,
    mut selection_events: EventWriter<SetBubbleSelected>,
) {
    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }

    let Some(cursor) = cursor_world_position(&windows, &cameras) else {
        return;
    };

    // Верхний (ближайший к камере) пузырь под курсором
    let hit = bubbles
        .iter()
        .filter(|(_, bubble, transform)| {
            let (scale, _, translation) = transform.to_scale_rotation_translation();
            translation.truncate().distance(cursor) <= bubble.radius() * scale.x
        })
        .max_by(|(_, _, a), (_, _, b)| a.translation().z.total_cmp(&b.translation().z));

    if let Some((entity, bubble, _)) = hit {
        selection_events.write(SetBubbleSelected {
            node: entity,
            selected: !bubble.is_selected(),
        });
    }
}

/// Система: Delete/Backspace удаляет все выбранные пузыри
fn remove_selected_bubbles(
    keys: Res<ButtonInput<KeyCode>>,
    bubbles: Query<(Entity, &BubbleNode), Without<Removing>>,
    mut removal_events: EventWriter<RemoveBubble>,
) {
    if !keys.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        return;
    }

    let mut count = 0;
    for (entity, bubble) in bubbles.iter() {
        if bubble.is_selected() {
            removal_events.write(RemoveBubble { node: entity });
            count += 1;
        }
    }

    logger::log(&format!("Removal requested for {} bubbles", count));
}

/// Система: Space добавляет случайный пузырь
fn spawn_bubble_on_key(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    fields: Query<Entity, With<BubbleField>>,
    mut image_events: EventWriter<SetBubbleImage>,
    config: Res<BubbleConfig>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }

    let Ok(field) = fields.single() else {
        return;
    };

    let mut rng = rand::thread_rng();
    spawn_random_bubble(&mut commands, &mut image_events, &config, field, &mut rng);
}
