//! Magnetic bubble node
//!
//! Headless ECS-ядро пузырькового UI на Bevy 0.16:
//! круглый узел с картинкой, обрезанной маской, selection-анимацией
//! и fade-out удалением. Рендер и физический шаг подключает клиент.
//!
//! Поток данных:
//! intent events → BubbleNode/BubbleSprite → ActionRunner → ActionCompleted → removal

use bevy::prelude::*;

pub mod actions;
pub mod config;
pub mod error;
pub mod logger;
pub mod node;
pub mod texture;

pub use actions::{
    advance_actions, Action, ActionChannel, ActionCompleted, ActionKind, ActionRunner, ActionToken,
    NodeOpacity, Tween,
};
pub use config::{BubbleConfig, Easing};
pub use error::BubbleError;
pub use logger::init_logger;
pub use node::*;
pub use texture::{BubbleTexture, TextureId};

/// SystemSet всех систем пузырей (клиент ставит свой sync после него)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MagneticSet;

/// Главный plugin пузырей
///
/// Регистрирует события, BubbleConfig (если не вставлен заранее) и системы в Update.
/// Физический шаг (RapierPhysicsPlugin) НЕ добавляется — это забота клиента.
#[derive(Default)]
pub struct MagneticPlugin {
    /// `None` = оставить уже вставленный resource или взять Default
    pub config: Option<BubbleConfig>,
}

impl Plugin for MagneticPlugin {
    fn build(&self, app: &mut App) {
        match &self.config {
            Some(config) => {
                app.insert_resource(config.clone());
            }
            None => {
                app.init_resource::<BubbleConfig>();
            }
        }

        app.add_event::<SetBubbleImage>()
            .add_event::<SetBubbleColor>()
            .add_event::<SetBubbleSelected>()
            .add_event::<RemoveBubble>()
            .add_event::<BubbleAnimationStarted>()
            .add_event::<BubbleRemoved>()
            .add_event::<ActionCompleted>();

        app.add_systems(
            Update,
            (
                node::systems::apply_image_intents,
                node::systems::apply_color_intents,
                node::systems::apply_selection_intents,
                node::systems::apply_removal_intents,
                actions::advance_actions,
                node::systems::finish_bubble_removal,
            )
                .chain() // Intent'ы одного кадра обрабатываются по порядку
                .in_set(MagneticSet),
        );
    }
}

/// Создаёт minimal Bevy App для headless пузырей
pub fn create_headless_app(config: BubbleConfig) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(MagneticPlugin {
            config: Some(config),
        });

    app
}
