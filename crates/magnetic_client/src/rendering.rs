//! Rendering sync: headless компоненты пузырей → Bevy Sprite/Mesh2d
//!
//! Crop mask реализуется на upload'е: текстура обрезается по кругу
//! (`BubbleTexture::clipped_to_circle`) перед загрузкой в GPU Image.
//! GPU image живёт, пока его текстура есть хоть у одного пузыря.

use std::collections::{HashMap, HashSet};

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};
use magnetic_node::{
    BubbleNode, BubbleSprite, BubbleTexture, CircleShape, ImageSlot, MagneticSet, MaskOverlay,
    NodeOpacity, TextureId, VisualTree,
};

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_texture_cache)
            .add_systems(
                Update,
                (
                    attach_visuals,
                    sync_sprites,
                    sync_overlay_opacity,
                    evict_unused_textures,
                )
                    .chain()
                    .after(MagneticSet),
            );
    }
}

/// Ширина stroke overlay'а (px)
const OVERLAY_STROKE_WIDTH: f32 = 2.0;
/// Размер белого круга для sprite'а без текстуры
const BLANK_TEXTURE_SIZE: u32 = 64;

/// GPU images по id текстуры (upload один раз)
#[derive(Resource)]
pub struct TextureCache {
    images: HashMap<TextureId, Handle<Image>>,
    blank: Handle<Image>,
}

impl TextureCache {
    fn handle_for(&mut self, texture: &BubbleTexture, images: &mut Assets<Image>) -> Handle<Image> {
        self.images
            .entry(texture.id())
            .or_insert_with(|| images.add(to_gpu_image(&texture.clipped_to_circle())))
            .clone()
    }

    /// Отпускает handles текстур, которых нет в `live`.
    /// Сам asset выгружается, когда его перестаёт держать и Sprite.
    fn retain_live(&mut self, live: &HashSet<TextureId>) {
        self.images.retain(|id, _| live.contains(id));
    }
}

fn to_gpu_image(pixels: &RgbaImage) -> Image {
    Image::new(
        Extent3d {
            width: pixels.width(),
            height: pixels.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        pixels.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

fn init_texture_cache(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    // Sprite без текстуры = залитый круг цвета tint'а
    let blank = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        BLANK_TEXTURE_SIZE,
        BLANK_TEXTURE_SIZE,
        Rgba([255, 255, 255, 255]),
    ));
    let blank = match BubbleTexture::from_image(&blank) {
        Some(texture) => images.add(to_gpu_image(&texture.clipped_to_circle())),
        None => Handle::default(),
    };

    commands.insert_resource(TextureCache {
        images: HashMap::new(),
        blank,
    });
}

/// Система: новым пузырям — Visibility по всему дереву, Sprite, overlay mesh
fn attach_visuals(
    mut commands: Commands,
    bubbles: Query<(Entity, &BubbleNode, &VisualTree), Added<VisualTree>>,
    shapes: Query<&CircleShape, With<MaskOverlay>>,
    sprites: Query<&BubbleSprite>,
    cache: Res<TextureCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (entity, bubble, tree) in bubbles.iter() {
        for part in [entity, tree.mask, tree.mask_shape] {
            commands.entity(part).insert(Visibility::default());
        }

        if let Ok(shape) = shapes.get(tree.overlay) {
            let inner = (shape.radius - OVERLAY_STROKE_WIDTH).max(0.0);
            commands.entity(tree.overlay).insert((
                Mesh2d(meshes.add(Annulus::new(inner, shape.radius))),
                MeshMaterial2d(materials.add(ColorMaterial::from_color(shape.stroke))),
            ));
        }

        if let Ok(sprite) = sprites.get(tree.sprite) {
            commands.entity(tree.sprite).insert(Sprite {
                image: cache.blank.clone(),
                color: sprite.color,
                custom_size: Some(Vec2::splat(bubble.diameter())),
                ..default()
            });
        }
    }
}

/// Система: BubbleSprite (texture + tint) × NodeOpacity → Sprite
fn sync_sprites(
    bubbles: Query<(&VisualTree, &NodeOpacity), With<BubbleNode>>,
    mut sprites: Query<(&BubbleSprite, &mut Sprite)>,
    mut cache: ResMut<TextureCache>,
    mut images: ResMut<Assets<Image>>,
) {
    for (tree, opacity) in bubbles.iter() {
        let Ok((bubble_sprite, mut sprite)) = sprites.get_mut(tree.sprite) else {
            continue;
        };

        let handle = match &bubble_sprite.texture {
            Some(texture) => cache.handle_for(texture, &mut images),
            None => cache.blank.clone(),
        };
        if sprite.image != handle {
            sprite.image = handle;
        }

        let alpha = bubble_sprite.color.alpha() * opacity.0;
        sprite.color = bubble_sprite.color.with_alpha(alpha);
        sprite.custom_size = Some(bubble_sprite.size);
    }
}

/// Система: fade-out узла → alpha stroke overlay'а
fn sync_overlay_opacity(
    bubbles: Query<(&VisualTree, &NodeOpacity), (With<BubbleNode>, Changed<NodeOpacity>)>,
    overlays: Query<(&CircleShape, &MeshMaterial2d<ColorMaterial>), With<MaskOverlay>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (tree, opacity) in bubbles.iter() {
        let Ok((shape, material)) = overlays.get(tree.overlay) else {
            continue;
        };

        if let Some(material) = materials.get_mut(&material.0) {
            material.color = shape.stroke.with_alpha(shape.stroke.alpha() * opacity.0);
        }
    }
}

/// Система: удалённые пузыри и заменённые картинки → eviction из кэша
fn evict_unused_textures(
    mut removed: RemovedComponents<BubbleNode>,
    changed_nodes: Query<(), Changed<BubbleNode>>,
    changed_sprites: Query<(), Changed<BubbleSprite>>,
    nodes: Query<&BubbleNode>,
    sprites: Query<&BubbleSprite>,
    mut cache: ResMut<TextureCache>,
) {
    let any_removed = removed.read().count() > 0;
    if !any_removed && changed_nodes.is_empty() && changed_sprites.is_empty() {
        return;
    }

    let mut live = HashSet::new();
    for node in nodes.iter() {
        for slot in [ImageSlot::Default, ImageSlot::Selected] {
            if let Some(texture) = node.texture(slot) {
                live.insert(texture.id());
            }
        }
    }
    live.extend(
        sprites
            .iter()
            .filter_map(|sprite| sprite.texture.as_ref().map(BubbleTexture::id)),
    );

    cache.retain_live(&live);
}
