//! Константы и runtime-конфиг пузырей
//!
//! Все magic numbers узла собраны здесь. `BubbleConfig` позволяет
//! переопределить тайминги и физику без пересборки (JSON).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::BubbleError;

// Z-порядок внутри узла (локальный, относительно родителя). Никогда не меняется в runtime.
/// Crop mask поверх круга
pub const MASK_Z: f32 = 10.0;
/// Clip-круг маски
pub const MASK_SHAPE_Z: f32 = 20.0;
/// Stroke overlay, прячет aliasing маски
pub const OVERLAY_Z: f32 = 30.0;
/// Картинка внутри маски
pub const SPRITE_Z: f32 = 40.0;

// Анимации (секунды)
pub const SELECTED_DURATION: f32 = 0.2;
pub const DESELECTED_DURATION: f32 = 0.2;
pub const REMOVED_DURATION: f32 = 0.2;

/// Масштаб выбранного пузыря, если не задан явно
pub const DEFAULT_SELECTION_SCALE: f32 = 4.0 / 3.0;

// Физика
/// Physics body чуть больше визуального радиуса
pub const PHYSICS_RADIUS_PADDING: f32 = 2.0;
pub const PHYSICS_FRICTION: f32 = 0.0;
pub const PHYSICS_LINEAR_DAMPING: f32 = 3.0;

/// Кривая прогресса tween'а
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInOut,
}

impl Easing {
    /// `t` в [0, 1] → прогресс в [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            // smoothstep
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Runtime-настройки пузырей (resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    pub selected_duration: f32,
    pub deselected_duration: f32,
    pub removed_duration: f32,
    pub easing: Easing,
    pub physics_radius_padding: f32,
    pub friction: f32,
    pub linear_damping: f32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            selected_duration: SELECTED_DURATION,
            deselected_duration: DESELECTED_DURATION,
            removed_duration: REMOVED_DURATION,
            easing: Easing::Linear,
            physics_radius_padding: PHYSICS_RADIUS_PADDING,
            friction: PHYSICS_FRICTION,
            linear_damping: PHYSICS_LINEAR_DAMPING,
        }
    }
}

impl BubbleConfig {
    /// Парсит JSON (отсутствующие поля берутся из Default) и валидирует
    pub fn from_json_str(json: &str) -> Result<Self, BubbleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BubbleError> {
        let durations = [
            ("selected_duration", self.selected_duration),
            ("deselected_duration", self.deselected_duration),
            ("removed_duration", self.removed_duration),
        ];

        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(BubbleError::InvalidDuration { name, value });
            }
        }

        // Padding ≥ 0: physics body не меньше визуального круга
        let physics = [
            ("physics_radius_padding", self.physics_radius_padding),
            ("friction", self.friction),
            ("linear_damping", self.linear_damping),
        ];

        for (name, value) in physics {
            if !value.is_finite() || value < 0.0 {
                return Err(BubbleError::InvalidPhysics { name, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_order_is_strictly_increasing() {
        assert!(0.0 < MASK_Z);
        assert!(MASK_Z < MASK_SHAPE_Z);
        assert!(MASK_SHAPE_Z < OVERLAY_Z);
        assert!(OVERLAY_Z < SPRITE_Z);
    }

    #[test]
    fn test_default_config_matches_constants() {
        let config = BubbleConfig::default();
        assert_eq!(config.selected_duration, 0.2);
        assert_eq!(config.deselected_duration, 0.2);
        assert_eq!(config.removed_duration, 0.2);
        assert_eq!(config.physics_radius_padding, 2.0);
        assert_eq!(config.friction, 0.0);
        assert_eq!(config.linear_damping, 3.0);
        assert_eq!(config.easing, Easing::Linear);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BubbleConfig::from_json_str(r#"{ "removed_duration": 0.5, "easing": "ease_in_out" }"#)
            .expect("valid config");

        assert_eq!(config.removed_duration, 0.5);
        assert_eq!(config.easing, Easing::EaseInOut);
        assert_eq!(config.selected_duration, SELECTED_DURATION);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result = BubbleConfig::from_json_str(r#"{ "selected_duration": -1.0 }"#);
        assert!(matches!(
            result,
            Err(BubbleError::InvalidDuration { name: "selected_duration", .. })
        ));
    }

    #[test]
    fn test_negative_physics_rejected() {
        let result = BubbleConfig::from_json_str(r#"{ "physics_radius_padding": -50.0 }"#);
        assert!(matches!(
            result,
            Err(BubbleError::InvalidPhysics { name: "physics_radius_padding", .. })
        ));

        let result = BubbleConfig::from_json_str(r#"{ "linear_damping": -3.0 }"#);
        assert!(matches!(
            result,
            Err(BubbleError::InvalidPhysics { name: "linear_damping", .. })
        ));

        let result = BubbleConfig::from_json_str(r#"{ "friction": -1.0 }"#);
        assert!(matches!(
            result,
            Err(BubbleError::InvalidPhysics { name: "friction", .. })
        ));
    }

    #[test]
    fn test_nan_physics_rejected() {
        let config = BubbleConfig {
            physics_radius_padding: f32::NAN,
            ..BubbleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BubbleError::InvalidPhysics { name: "physics_radius_padding", .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            BubbleConfig::from_json_str("{ not json"),
            Err(BubbleError::Config(_))
        ));
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
    }
}
