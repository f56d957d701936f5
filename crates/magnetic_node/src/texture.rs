//! Текстуры пузырей
//!
//! Исходная картинка (`image::DynamicImage`) конвертируется один раз в RGBA8
//! и больше не хранится. Идентичность текстуры = `TextureId`, поэтому
//! сравнение "какая текстура сейчас на sprite" дешёвое.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Display-ready текстура (shared pixels, clone дешёвый)
#[derive(Debug, Clone)]
pub struct BubbleTexture {
    id: TextureId,
    pixels: Arc<RgbaImage>,
}

impl PartialEq for BubbleTexture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BubbleTexture {}

impl BubbleTexture {
    /// `None` для пустой картинки (0 px по любой оси)
    pub fn from_image(image: &DynamicImage) -> Option<Self> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        Some(Self {
            id: TextureId::next(),
            pixels: Arc::new(image.to_rgba8()),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Копия пикселей, обрезанная по вписанному кругу (crop mask).
    ///
    /// Всё вне круга становится полностью прозрачным.
    pub fn clipped_to_circle(&self) -> RgbaImage {
        let mut clipped = (*self.pixels).clone();
        let (width, height) = clipped.dimensions();

        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let radius = center_x.min(center_y);
        let radius_sq = radius * radius;

        for (x, y, pixel) in clipped.enumerate_pixels_mut() {
            // Центр пикселя, а не угол
            let dx = x as f32 + 0.5 - center_x;
            let dy = y as f32 + 0.5 - center_y;

            if dx * dx + dy * dy > radius_sq {
                *pixel = Rgba([0, 0, 0, 0]);
            }
        }

        clipped
    }
}
