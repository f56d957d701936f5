//! Компоненты пузыря и его визуального дерева
//!
//! Дерево (локальные z в скобках):
//! ```text
//! BubbleNode (0)
//! ├── BubbleMask (10)
//! │   ├── MaskShape (20)   clip-круг
//! │   └── BubbleSprite (40)
//! └── MaskOverlay (30)    stroke поверх aliasing'а маски
//! ```
//! Дети ссылаются на узел через `ChildOf` (back-reference), узел хранит
//! id детей в `VisualTree`.

use bevy::prelude::*;

use crate::actions::{ActionRunner, NodeOpacity};
use crate::texture::BubbleTexture;

/// Какая текстура должна быть на sprite'е
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Default,
    Selected,
}

/// Переход selection FSM (Deselected ⇄ Selected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTransition {
    Selected,
    Deselected,
}

/// Круглый пузырь (корень визуального дерева)
///
/// Radius фиксируется при создании. Fill color делегирован sprite'у
/// (`BubbleSprite::color`).
#[derive(Component, Debug, Clone)]
#[require(Transform, NodeOpacity, ActionRunner)]
pub struct BubbleNode {
    radius: f32,
    selection_scale: f32,
    selected: bool,
    stroke_color: Color,
    default_texture: Option<BubbleTexture>,
    selected_texture: Option<BubbleTexture>,
}

impl BubbleNode {
    pub(crate) fn new(radius: f32, selection_scale: f32, stroke_color: Color) -> Self {
        Self {
            radius,
            selection_scale,
            selected: false,
            stroke_color,
            default_texture: None,
            selected_texture: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn selection_scale(&self) -> f32 {
        self.selection_scale
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke_color
    }

    /// Меняет stroke самого круга. Overlay НЕ синхронизируется (снимок при создании).
    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    pub fn texture(&self, slot: ImageSlot) -> Option<&BubbleTexture> {
        match slot {
            ImageSlot::Default => self.default_texture.as_ref(),
            ImageSlot::Selected => self.selected_texture.as_ref(),
        }
    }

    /// Сохраняет текстуру в слот. Возвращает текстуру, которую надо показать
    /// прямо сейчас: только default и только если sprite ещё пустой.
    pub fn assign_texture(
        &mut self,
        slot: ImageSlot,
        texture: BubbleTexture,
        sprite_is_empty: bool,
    ) -> Option<BubbleTexture> {
        match slot {
            ImageSlot::Default => {
                self.default_texture = Some(texture.clone());
                sprite_is_empty.then_some(texture)
            }
            ImageSlot::Selected => {
                self.selected_texture = Some(texture);
                None
            }
        }
    }

    /// Selection FSM. `None` = self-loop (значение не изменилось), анимаций нет.
    pub fn set_selected(&mut self, selected: bool) -> Option<SelectionTransition> {
        if self.selected == selected {
            return None;
        }

        self.selected = selected;

        Some(if selected {
            SelectionTransition::Selected
        } else {
            SelectionTransition::Deselected
        })
    }

    /// Целевой scale и текстура для перехода (текстура может отсутствовать)
    pub fn transition_target(&self, transition: SelectionTransition) -> (f32, Option<&BubbleTexture>) {
        match transition {
            SelectionTransition::Selected => (self.selection_scale, self.selected_texture.as_ref()),
            SelectionTransition::Deselected => (1.0, self.default_texture.as_ref()),
        }
    }
}

/// Id детей узла (создаются ровно один раз в `build_visual_tree`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualTree {
    pub mask: Entity,
    pub mask_shape: Entity,
    pub overlay: Entity,
    pub sprite: Entity,
}

/// Crop node: клипает детей по силуэту `MaskShape`
#[derive(Component, Debug, Clone, Copy)]
pub struct BubbleMask {
    pub shape: Entity,
}

/// Круглая форма (geometry + fill + stroke)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub radius: f32,
    pub fill: Color,
    pub stroke: Color,
}

/// Clip-силуэт маски
#[derive(Component, Debug, Clone, Copy)]
#[require(CircleShape)]
pub struct MaskShape;

/// Stroke-only круг поверх маски
#[derive(Component, Debug, Clone, Copy)]
#[require(CircleShape)]
pub struct MaskOverlay;

impl Default for CircleShape {
    fn default() -> Self {
        Self {
            radius: 0.0,
            fill: Color::NONE,
            stroke: Color::NONE,
        }
    }
}

/// Картинка внутри маски: текущая текстура + tint
#[derive(Component, Debug, Clone)]
pub struct BubbleSprite {
    pub texture: Option<BubbleTexture>,
    pub color: Color,
    pub size: Vec2,
}

/// Маркер: узел в процессе удаления (fade-out идёт)
#[derive(Component, Debug, Clone, Copy)]
pub struct Removing {
    pub token: crate::actions::ActionToken,
}
