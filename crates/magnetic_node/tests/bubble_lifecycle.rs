//! Bubble lifecycle integration test
//!
//! Headless App с ручным временем (50ms кадр).
//!
//! Проверяем:
//! - Начальное состояние (deselected, scale 1.0, дерево собрано)
//! - Selection FSM (self-loop без анимаций, toggle)
//! - Смена текстур default/selected
//! - Physics body параметры

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};
use magnetic_node::*;

const FRAME: f32 = 0.05;

/// Helper: headless App с фиксированным шагом времени
fn create_bubble_app() -> App {
    let mut app = create_headless_app(BubbleConfig::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME)));
    app
}

/// Helper: spawn пузыря напрямую через World commands
fn spawn(app: &mut App, spec: BubbleSpec) -> Entity {
    let config = app.world().resource::<BubbleConfig>().clone();
    let world = app.world_mut();
    let bubble = spawn_bubble(&mut world.commands(), &spec, &config).expect("valid spec");
    world.flush();
    bubble
}

fn image(color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(color)))
}

fn set_image(app: &mut App, node: Entity, slot: ImageSlot, image: DynamicImage) {
    app.world_mut().send_event(SetBubbleImage { node, slot, image });
}

fn set_selected(app: &mut App, node: Entity, selected: bool) {
    app.world_mut().send_event(SetBubbleSelected { node, selected });
}

fn scale_of(app: &App, node: Entity) -> f32 {
    app.world().get::<Transform>(node).expect("bubble transform").scale.x
}

fn scale_target(app: &App, node: Entity) -> Option<f32> {
    app.world()
        .get::<ActionRunner>(node)
        .and_then(|runner| runner.target(ActionChannel::Scale))
}

fn sprite_texture(app: &App, node: Entity) -> Option<BubbleTexture> {
    let tree = app.world().get::<VisualTree>(node)?;
    app.world().get::<BubbleSprite>(tree.sprite)?.texture.clone()
}

fn node_texture(app: &App, node: Entity, slot: ImageSlot) -> Option<BubbleTexture> {
    app.world().get::<BubbleNode>(node)?.texture(slot).cloned()
}

/// Helper: прогнать кадры и собрать BubbleAnimationStarted
fn run_frames(app: &mut App, frames: usize) -> Vec<BubbleAnimationStarted> {
    // Cursor с текущего конца: события до вызова не считаются
    let mut cursor = app
        .world()
        .resource::<Events<BubbleAnimationStarted>>()
        .get_cursor_current();
    let mut started = Vec::new();
    for _ in 0..frames {
        app.update();
        let events = app.world().resource::<Events<BubbleAnimationStarted>>();
        started.extend(cursor.read(events).copied());
    }
    started
}

#[test]
fn test_new_bubble_is_deselected_at_unit_scale() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));
    app.update();

    assert!(!is_bubble_selected(app.world(), bubble));
    assert_eq!(scale_of(&app, bubble), 1.0);
    assert_eq!(app.world().get::<NodeOpacity>(bubble), Some(&NodeOpacity(1.0)));
    assert!(displayed_texture(app.world(), bubble).is_none());
}

#[test]
fn test_visual_tree_structure_and_z_order() {
    let mut app = create_bubble_app();
    let bubble = spawn(
        &mut app,
        BubbleSpec::new(20.0, 1.5).with_stroke(Color::srgb(1.0, 0.0, 0.0)),
    );
    let world = app.world();
    let tree = *world.get::<VisualTree>(bubble).expect("tree built on spawn");

    let parent_of = |entity: Entity| world.get::<ChildOf>(entity).map(|child_of| child_of.parent());
    assert_eq!(parent_of(tree.mask), Some(bubble));
    assert_eq!(parent_of(tree.overlay), Some(bubble));
    assert_eq!(parent_of(tree.mask_shape), Some(tree.mask));
    assert_eq!(parent_of(tree.sprite), Some(tree.mask));

    let z = |entity: Entity| world.get::<Transform>(entity).expect("transform").translation.z;
    assert_eq!(z(tree.mask), 10.0);
    assert_eq!(z(tree.mask_shape), 20.0);
    assert_eq!(z(tree.overlay), 30.0);
    assert_eq!(z(tree.sprite), 40.0);

    let overlay = world.get::<CircleShape>(tree.overlay).expect("overlay shape");
    assert_eq!(overlay.stroke, Color::srgb(1.0, 0.0, 0.0));
    assert_eq!(overlay.fill, Color::NONE);
    assert_eq!(overlay.radius, 20.0);

    let mask_shape = world.get::<CircleShape>(tree.mask_shape).expect("mask shape");
    assert_eq!(mask_shape.fill, Color::WHITE);
    assert_eq!(world.get::<BubbleMask>(tree.mask).map(|mask| mask.shape), Some(tree.mask_shape));

    let sprite = world.get::<BubbleSprite>(tree.sprite).expect("sprite");
    assert_eq!(sprite.size, Vec2::splat(40.0));
}

#[test]
fn test_physics_body_parameters() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));
    let world = app.world();

    let collider = world.get::<Collider>(bubble).expect("collider");
    let ball = collider.as_ball().expect("circle collider");
    assert_eq!(ball.radius(), 22.0);

    assert_eq!(world.get::<RigidBody>(bubble), Some(&RigidBody::Dynamic));
    assert_eq!(world.get::<LockedAxes>(bubble), Some(&LockedAxes::ROTATION_LOCKED));
    assert_eq!(world.get::<Friction>(bubble).map(|friction| friction.coefficient), Some(0.0));
    assert_eq!(
        world.get::<Damping>(bubble).map(|damping| damping.linear_damping),
        Some(3.0)
    );
}

#[test]
fn test_invalid_spec_is_rejected() {
    let mut app = create_bubble_app();
    let config = BubbleConfig::default();
    let world = app.world_mut();
    let mut commands = world.commands();

    assert!(matches!(
        spawn_bubble(&mut commands, &BubbleSpec::new(0.0, 1.5), &config),
        Err(BubbleError::InvalidRadius(_))
    ));
    assert!(matches!(
        spawn_bubble(&mut commands, &BubbleSpec::new(20.0, f32::NAN), &config),
        Err(BubbleError::InvalidSelectionScale(_))
    ));
}

#[test]
fn test_repeated_selection_does_not_restart_animation() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_selected(&mut app, bubble, false);
    assert!(run_frames(&mut app, 1).is_empty());

    set_selected(&mut app, bubble, true);
    let started = run_frames(&mut app, 1);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].kind, ActionKind::Selected);

    set_selected(&mut app, bubble, true);
    set_selected(&mut app, bubble, true);
    assert!(run_frames(&mut app, 3).is_empty());
    assert!(is_bubble_selected(app.world(), bubble));
}

#[test]
fn test_default_image_shown_only_when_sprite_empty() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, image([255, 0, 0, 255]));
    app.update();
    let first = sprite_texture(&app, bubble).expect("default texture shown");
    assert_eq!(Some(first.clone()), node_texture(&app, bubble, ImageSlot::Default));

    set_image(&mut app, bubble, ImageSlot::Default, image([0, 255, 0, 255]));
    app.update();

    // Новая default сохранена, но на экране старая
    assert_eq!(sprite_texture(&app, bubble), Some(first.clone()));
    assert_ne!(node_texture(&app, bubble, ImageSlot::Default), Some(first));
}

#[test]
fn test_empty_image_is_ignored() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, DynamicImage::new_rgba8(0, 0));
    app.update();

    assert!(sprite_texture(&app, bubble).is_none());
    assert!(node_texture(&app, bubble, ImageSlot::Default).is_none());
}

#[test]
fn test_selected_image_does_not_change_display() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Selected, image([0, 0, 255, 255]));
    app.update();

    assert!(sprite_texture(&app, bubble).is_none());
    assert!(node_texture(&app, bubble, ImageSlot::Selected).is_some());
}

#[test]
fn test_selection_without_texture_keeps_current_texture() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, image([255, 0, 0, 255]));
    app.update();
    let default = sprite_texture(&app, bubble);

    // Selected текстуры нет → sprite не меняется
    set_selected(&mut app, bubble, true);
    run_frames(&mut app, 6);

    assert_eq!(sprite_texture(&app, bubble), default);
    assert_eq!(scale_of(&app, bubble), 1.5);
}

#[test]
fn test_select_then_deselect_same_frame_ends_at_default() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, image([255, 0, 0, 255]));
    set_image(&mut app, bubble, ImageSlot::Selected, image([0, 0, 255, 255]));
    app.update();

    set_selected(&mut app, bubble, true);
    set_selected(&mut app, bubble, false);
    app.update();

    assert_eq!(scale_target(&app, bubble), Some(1.0));

    run_frames(&mut app, 10);
    assert_eq!(sprite_texture(&app, bubble), node_texture(&app, bubble, ImageSlot::Default));
    assert_eq!(scale_of(&app, bubble), 1.0);
    assert!(!is_bubble_selected(app.world(), bubble));
}

#[test]
fn test_select_deselect_across_frames_ends_at_default() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, image([255, 0, 0, 255]));
    set_image(&mut app, bubble, ImageSlot::Selected, image([0, 0, 255, 255]));
    set_selected(&mut app, bubble, true);
    run_frames(&mut app, 2);

    // Прерываем scale-анимацию посередине
    set_selected(&mut app, bubble, false);
    run_frames(&mut app, 10);

    assert_eq!(sprite_texture(&app, bubble), node_texture(&app, bubble, ImageSlot::Default));
    assert_eq!(scale_of(&app, bubble), 1.0);
}

#[test]
fn test_scenario_default_then_selected_image() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5));

    set_image(&mut app, bubble, ImageSlot::Default, image([255, 0, 0, 255]));
    app.update();
    let texture_a = node_texture(&app, bubble, ImageSlot::Default).expect("texture A");
    assert_eq!(sprite_texture(&app, bubble), Some(texture_a));

    set_selected(&mut app, bubble, true);
    app.update();
    assert_eq!(scale_target(&app, bubble), Some(1.5));

    set_image(&mut app, bubble, ImageSlot::Selected, image([0, 0, 255, 255]));
    app.update();
    let texture_b = node_texture(&app, bubble, ImageSlot::Selected).expect("texture B");

    set_selected(&mut app, bubble, false);
    app.update();
    set_selected(&mut app, bubble, true);
    app.update();

    assert_eq!(sprite_texture(&app, bubble), Some(texture_b));
    assert_eq!(scale_target(&app, bubble), Some(1.5));

    run_frames(&mut app, 10);
    assert_eq!(scale_of(&app, bubble), 1.5);
}

#[test]
fn test_color_proxies_to_sprite() {
    let mut app = create_bubble_app();
    let bubble = spawn(
        &mut app,
        BubbleSpec::new(20.0, 1.5).with_color(Color::srgb(0.2, 0.4, 0.6)),
    );
    assert_eq!(bubble_color(app.world(), bubble), Some(Color::srgb(0.2, 0.4, 0.6)));

    app.world_mut().send_event(SetBubbleColor {
        node: bubble,
        color: Color::srgb(1.0, 1.0, 0.0),
    });
    app.update();

    assert_eq!(bubble_color(app.world(), bubble), Some(Color::srgb(1.0, 1.0, 0.0)));
}

#[test]
fn test_overlay_stroke_not_synced_after_creation() {
    let mut app = create_bubble_app();
    let bubble = spawn(&mut app, BubbleSpec::new(20.0, 1.5).with_stroke(Color::WHITE));

    app.world_mut()
        .get_mut::<BubbleNode>(bubble)
        .expect("bubble")
        .set_stroke_color(Color::BLACK);
    app.update();

    let tree = *app.world().get::<VisualTree>(bubble).expect("tree");
    let overlay = app.world().get::<CircleShape>(tree.overlay).expect("overlay");
    assert_eq!(overlay.stroke, Color::WHITE);
}
