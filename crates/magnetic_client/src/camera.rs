use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, (zoom_camera_controls, update_camera_transform).chain());
    }
}

#[derive(Component)]
pub struct FieldCamera {
    pub zoom: f32,
    pub zoom_speed: f32,
}

impl Default for FieldCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            zoom_speed: 0.1,
        }
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, FieldCamera::default()));
}

/// Mouse wheel: zoom
fn zoom_camera_controls(
    mut query: Query<&mut FieldCamera>,
    mut mouse_wheel: EventReader<MouseWheel>,
) {
    let mut camera = match query.single_mut() {
        Ok(cam) => cam,
        Err(_) => return,
    };

    for wheel in mouse_wheel.read() {
        camera.zoom -= wheel.y * camera.zoom_speed;
        camera.zoom = camera.zoom.clamp(0.25, 4.0);
    }
}

/// Zoom через scale transform'а камеры (2D)
fn update_camera_transform(
    mut query: Query<(&FieldCamera, &mut Transform), Changed<FieldCamera>>,
) {
    for (camera, mut transform) in query.iter_mut() {
        transform.scale = Vec3::new(camera.zoom, camera.zoom, 1.0);
    }
}
