//! Intent'ы (вход от вызывающего кода) и outcome-события пузырей

use bevy::prelude::*;
use image::DynamicImage;

use super::components::ImageSlot;
use crate::actions::{ActionKind, ActionToken};

/// Intent: назначить картинку в слот (default/selected)
///
/// Картинка конвертируется в текстуру и дальше не хранится.
#[derive(Event, Debug, Clone)]
pub struct SetBubbleImage {
    pub node: Entity,
    pub slot: ImageSlot,
    pub image: DynamicImage,
}

/// Intent: tint sprite'а (blend с текстурой)
#[derive(Event, Debug, Clone, Copy)]
pub struct SetBubbleColor {
    pub node: Entity,
    pub color: Color,
}

/// Intent: выставить selection flag
#[derive(Event, Debug, Clone, Copy)]
pub struct SetBubbleSelected {
    pub node: Entity,
    pub selected: bool,
}

/// Intent: удалить пузырь (fade-out → detach → despawn)
#[derive(Event, Debug, Clone, Copy)]
pub struct RemoveBubble {
    pub node: Entity,
}

/// Событие: запущена анимация узла
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BubbleAnimationStarted {
    pub node: Entity,
    pub kind: ActionKind,
    pub token: ActionToken,
}

/// Событие: узел окончательно удалён (после fade-out)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BubbleRemoved {
    pub node: Entity,
    /// Родитель, от которого узел был отсоединён
    pub parent: Option<Entity>,
}
