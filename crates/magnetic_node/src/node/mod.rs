//! Bubble node: круглый узел с картинкой, selection и анимированным удалением
//!
//! Архитектура:
//! - components: BubbleNode + визуальное дерево (mask, overlay, sprite)
//! - spawn: two-phase init (контейнер → build_visual_tree), physics body
//! - events: intent'ы (SetBubbleImage/Color/Selected, RemoveBubble) и outcome'ы
//! - systems: обработка intent'ов, removal через completion fade-out'а

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod spawn;
pub mod systems;

pub use components::{
    BubbleMask, BubbleNode, BubbleSprite, CircleShape, ImageSlot, MaskOverlay, MaskShape, Removing,
    SelectionTransition, VisualTree,
};
pub use events::{
    BubbleAnimationStarted, BubbleRemoved, RemoveBubble, SetBubbleColor, SetBubbleImage,
    SetBubbleSelected,
};
pub use spawn::{build_visual_tree, bubble_physics, spawn_bubble, BubbleSpec};

use crate::texture::TextureId;

/// Tint sprite'а пузыря (getter `color`)
pub fn bubble_color(world: &World, node: Entity) -> Option<Color> {
    let tree = world.get::<VisualTree>(node)?;
    world.get::<BubbleSprite>(tree.sprite).map(|sprite| sprite.color)
}

/// Id текстуры, которая сейчас на sprite'е
pub fn displayed_texture(world: &World, node: Entity) -> Option<TextureId> {
    let tree = world.get::<VisualTree>(node)?;
    world
        .get::<BubbleSprite>(tree.sprite)?
        .texture
        .as_ref()
        .map(|texture| texture.id())
}

/// Getter `isSelected` (false для не-пузыря)
pub fn is_bubble_selected(world: &World, node: Entity) -> bool {
    world
        .get::<BubbleNode>(node)
        .is_some_and(|bubble| bubble.is_selected())
}
