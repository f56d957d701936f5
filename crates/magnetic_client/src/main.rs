use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use magnetic_node::{BubbleConfig, MagneticPlugin};

mod camera;
mod field;
mod input;
mod log_bridge;
mod rendering;

use camera::CameraPlugin;
use field::BubbleFieldPlugin;
use input::BubbleInputPlugin;
use log_bridge::LogBridgePlugin;
use rendering::RenderingSyncPlugin;

fn main() {
    magnetic_node::init_logger();

    // Путь к JSON конфигу — первый аргумент (опционально)
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path),
        None => BubbleConfig::default(),
    };

    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Magnetic".to_string(),
                resolution: (1024., 768.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(LogBridgePlugin)
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
        // Физический шаг (core только вешает components)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(100.0))
        // Bubbles (headless ECS logic)
        .add_plugins(MagneticPlugin {
            config: Some(config),
        })
        // Rendering sync (BubbleSprite/CircleShape → Sprite/Mesh2d)
        .add_plugins(RenderingSyncPlugin)
        .add_plugins((BubbleFieldPlugin, BubbleInputPlugin, CameraPlugin))
        .run();
}

fn load_config(path: &str) -> BubbleConfig {
    let loaded = std::fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|json| BubbleConfig::from_json_str(&json).map_err(|err| err.to_string()));

    match loaded {
        Ok(config) => {
            magnetic_node::logger::log_info(&format!("Loaded bubble config from {}", path));
            config
        }
        Err(err) => {
            magnetic_node::logger::log_error(&format!(
                "Failed to load bubble config {}: {} (using defaults)",
                path, err
            ));
            BubbleConfig::default()
        }
    }
}
