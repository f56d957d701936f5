//! Headless сессия пузырей
//!
//! Спавнит пару пузырей, переключает selection и удаляет один,
//! печатает состояние. Без рендера и без физического шага.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use image::{DynamicImage, Rgba, RgbaImage};
use magnetic_node::*;

fn solid_image(color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba(color)))
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|json| BubbleConfig::from_json_str(&json).map_err(|err| err.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load bubble config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => BubbleConfig::default(),
    };

    println!("Starting magnetic headless session ({:?})", config);

    let mut app = create_headless_app(config.clone());
    // 60 FPS детерминированно, независимо от wall clock
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / 60.0)));

    let world = app.world_mut();
    let container = world.spawn((Name::new("BubbleField"), Transform::default())).id();

    let specs = [
        BubbleSpec::new(20.0, 1.5).at(Vec2::new(-50.0, 0.0)).child_of(container),
        BubbleSpec::new(30.0, 4.0 / 3.0).at(Vec2::new(50.0, 0.0)).child_of(container),
    ];

    let mut bubbles = Vec::new();
    {
        let mut commands = world.commands();
        for spec in &specs {
            match spawn_bubble(&mut commands, spec, &config) {
                Ok(bubble) => bubbles.push(bubble),
                Err(err) => eprintln!("Failed to spawn bubble: {}", err),
            }
        }
    }
    world.flush();

    for &bubble in &bubbles {
        world.send_event(SetBubbleImage {
            node: bubble,
            slot: ImageSlot::Default,
            image: solid_image([40, 120, 220, 255]),
        });
        world.send_event(SetBubbleImage {
            node: bubble,
            slot: ImageSlot::Selected,
            image: solid_image([220, 80, 40, 255]),
        });
        world.send_event(SetBubbleSelected {
            node: bubble,
            selected: true,
        });
    }

    for tick in 0..60 {
        if tick == 20 {
            if let Some(&first) = bubbles.first() {
                app.world_mut().send_event(RemoveBubble { node: first });
            }
        }

        app.update();

        if tick % 10 == 0 {
            for &bubble in &bubbles {
                let world = app.world();
                let Some(transform) = world.get::<Transform>(bubble) else {
                    println!("Tick {}: bubble {:?} gone", tick, bubble);
                    continue;
                };
                let opacity = world.get::<NodeOpacity>(bubble).map_or(0.0, |opacity| opacity.0);
                println!(
                    "Tick {}: bubble {:?} scale {:.3} opacity {:.3} selected {} texture {:?}",
                    tick,
                    bubble,
                    transform.scale.x,
                    opacity,
                    is_bubble_selected(world, bubble),
                    displayed_texture(world, bubble),
                );
            }
        }
    }

    println!("Session complete!");
}
