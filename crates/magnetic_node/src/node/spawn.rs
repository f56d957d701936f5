//! Создание пузыря: контейнер + physics body, затем визуальное дерево
//!
//! Two-phase init: `spawn_bubble` спавнит пустой узел, потом один раз
//! вызывает `build_visual_tree`. Никакой lazy-инициализации детей.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use super::components::{
    BubbleMask, BubbleNode, BubbleSprite, CircleShape, MaskOverlay, MaskShape, VisualTree,
};
use crate::config::{
    BubbleConfig, DEFAULT_SELECTION_SCALE, MASK_SHAPE_Z, MASK_Z, OVERLAY_Z, SPRITE_Z,
};
use crate::error::BubbleError;

/// Параметры нового пузыря
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleSpec {
    pub radius: f32,
    pub selection_scale: f32,
    pub position: Vec2,
    pub stroke_color: Color,
    pub fill_color: Color,
    /// Родитель в сцене (контейнер пузырей)
    pub parent: Option<Entity>,
}

impl BubbleSpec {
    pub fn new(radius: f32, selection_scale: f32) -> Self {
        Self {
            radius,
            selection_scale,
            ..default()
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }

    pub fn child_of(mut self, parent: Entity) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn validate(&self) -> Result<(), BubbleError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(BubbleError::InvalidRadius(self.radius));
        }
        if !self.selection_scale.is_finite() || self.selection_scale <= 0.0 {
            return Err(BubbleError::InvalidSelectionScale(self.selection_scale));
        }
        Ok(())
    }
}

impl Default for BubbleSpec {
    fn default() -> Self {
        Self {
            radius: 1.0,
            selection_scale: DEFAULT_SELECTION_SCALE,
            position: Vec2::ZERO,
            stroke_color: Color::NONE,
            fill_color: Color::WHITE,
            parent: None,
        }
    }
}

/// Physics body пузыря: круг чуть больше визуального, без вращения и трения
pub fn bubble_physics(radius: f32, config: &BubbleConfig) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Collider::ball(radius + config.physics_radius_padding),
        LockedAxes::ROTATION_LOCKED,
        Friction::coefficient(config.friction),
        Damping {
            linear_damping: config.linear_damping,
            angular_damping: 0.0,
        },
        Velocity::zero(),
    )
}

/// Спавнит пузырь: узел + physics body + визуальное дерево
///
/// Scale = 1.0, selection = false, opacity = 1.0.
pub fn spawn_bubble(
    commands: &mut Commands,
    spec: &BubbleSpec,
    config: &BubbleConfig,
) -> Result<Entity, BubbleError> {
    spec.validate()?;

    let node = BubbleNode::new(spec.radius, spec.selection_scale, spec.stroke_color);
    let shape = CircleShape {
        radius: spec.radius,
        fill: Color::NONE,
        stroke: spec.stroke_color,
    };

    // Фаза 1: пустой контейнер
    let mut entity_commands = commands.spawn((
        Name::new("Bubble"),
        Transform::from_translation(spec.position.extend(0.0)),
        shape,
        bubble_physics(spec.radius, config),
    ));
    if let Some(parent) = spec.parent {
        entity_commands.insert(ChildOf(parent));
    }
    let entity = entity_commands.id();

    // Фаза 2: дети (ровно один раз)
    let tree = build_visual_tree(commands, entity, &node, spec.fill_color);
    commands.entity(entity).insert((node, tree));

    crate::logger::log(&format!(
        "Spawned bubble {:?} (radius {}, selection scale {})",
        entity, spec.radius, spec.selection_scale
    ));

    Ok(entity)
}

/// Строит mask → (mask shape, sprite) и overlay под узлом `entity`
///
/// Overlay копирует stroke узла на момент создания.
pub fn build_visual_tree(
    commands: &mut Commands,
    entity: Entity,
    node: &BubbleNode,
    sprite_color: Color,
) -> VisualTree {
    let radius = node.radius();

    let mask_shape = commands
        .spawn((
            Name::new("BubbleMaskShape"),
            MaskShape,
            CircleShape {
                radius,
                fill: Color::WHITE,
                stroke: Color::NONE,
            },
            Transform::from_xyz(0.0, 0.0, MASK_SHAPE_Z),
        ))
        .id();

    let mask = commands
        .spawn((
            Name::new("BubbleMask"),
            BubbleMask { shape: mask_shape },
            Transform::from_xyz(0.0, 0.0, MASK_Z),
            ChildOf(entity),
        ))
        .id();
    commands.entity(mask_shape).insert(ChildOf(mask));

    // Masking даёт aliasing по краю, overlay его прячет
    let overlay = commands
        .spawn((
            Name::new("BubbleMaskOverlay"),
            MaskOverlay,
            CircleShape {
                radius,
                fill: Color::NONE,
                stroke: node.stroke_color(),
            },
            Transform::from_xyz(0.0, 0.0, OVERLAY_Z),
            ChildOf(entity),
        ))
        .id();

    let sprite = commands
        .spawn((
            Name::new("BubbleSprite"),
            BubbleSprite {
                texture: None,
                color: sprite_color,
                size: Vec2::splat(node.diameter()),
            },
            Transform::from_xyz(0.0, 0.0, SPRITE_Z),
            ChildOf(mask),
        ))
        .id();

    VisualTree {
        mask,
        mask_shape,
        overlay,
        sprite,
    }
}
