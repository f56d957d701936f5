//! Поле пузырей: контейнер, начальный спавн и "магнитное" притяжение к центру

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};
use magnetic_node::{
    logger, spawn_bubble, BubbleConfig, BubbleNode, BubbleSpec, ImageSlot, Removing, SetBubbleImage,
};
use rand::Rng;

pub struct BubbleFieldPlugin;

impl Plugin for BubbleFieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_field)
            .add_systems(FixedUpdate, magnetic_pull);
    }
}

/// Контейнер всех пузырей (родитель в сцене)
#[derive(Component)]
pub struct BubbleField;

/// Сила притяжения к центру поля
const PULL_STRENGTH: f32 = 40.0;
const INITIAL_BUBBLES: usize = 12;
const FIELD_HALF_EXTENT: f32 = 350.0;

fn spawn_field(
    mut commands: Commands,
    mut image_events: EventWriter<SetBubbleImage>,
    config: Res<BubbleConfig>,
) {
    let field = commands
        .spawn((
            Name::new("BubbleField"),
            BubbleField,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let mut rng = rand::thread_rng();
    for _ in 0..INITIAL_BUBBLES {
        spawn_random_bubble(&mut commands, &mut image_events, &config, field, &mut rng);
    }

    logger::log_info(&format!("Spawned bubble field with {} bubbles", INITIAL_BUBBLES));
}

/// Спавнит пузырь со случайной позицией/цветом и парой картинок
pub fn spawn_random_bubble(
    commands: &mut Commands,
    image_events: &mut EventWriter<SetBubbleImage>,
    config: &BubbleConfig,
    field: Entity,
    rng: &mut impl Rng,
) -> Option<Entity> {
    let radius = rng.gen_range(28.0..44.0);
    let position = Vec2::new(
        rng.gen_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
        rng.gen_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
    );
    let base = [rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()];

    let spec = BubbleSpec::new(radius, 4.0 / 3.0)
        .at(position)
        .with_stroke(Color::srgb(0.9, 0.9, 0.95))
        .child_of(field);

    let bubble = match spawn_bubble(commands, &spec, config) {
        Ok(bubble) => bubble,
        Err(err) => {
            logger::log_error(&format!("Failed to spawn bubble: {}", err));
            return None;
        }
    };

    // Физика поля: без гравитации, тянем ExternalForce'ом
    commands
        .entity(bubble)
        .insert((GravityScale(0.0), ExternalForce::default()));

    image_events.write(SetBubbleImage {
        node: bubble,
        slot: ImageSlot::Default,
        image: gradient_image(base, false),
    });
    image_events.write(SetBubbleImage {
        node: bubble,
        slot: ImageSlot::Selected,
        image: gradient_image(base, true),
    });

    Some(bubble)
}

/// Вертикальный градиент; selected вариант светлее
fn gradient_image(base: [u8; 3], highlighted: bool) -> DynamicImage {
    const SIZE: u32 = 128;
    let lift = if highlighted { 90 } else { 0 };

    let pixels = RgbaImage::from_fn(SIZE, SIZE, |_, y| {
        let shade = (y * 80 / SIZE) as u8;
        let channel = |value: u8| value.saturating_add(lift).saturating_sub(shade);
        Rgba([channel(base[0]), channel(base[1]), channel(base[2]), 255])
    });

    DynamicImage::ImageRgba8(pixels)
}

/// Система: тянет живые пузыри к центру поля
fn magnetic_pull(
    mut bubbles: Query<(&GlobalTransform, &mut ExternalForce), (With<BubbleNode>, Without<Removing>)>,
) {
    for (transform, mut force) in bubbles.iter_mut() {
        let position = transform.translation().truncate();
        force.force = -position * PULL_STRENGTH;
    }
}
