use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;
use bevy::window::WindowResized;
use constants::render_settings::CLEAR_COLOUR;
use constants::scene_layout::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_START_POSITION};

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY: f32 = 0.0015;
const ZOOM_STEP: f32 = 0.1;
const MIN_RADIUS: f32 = 1.0;
const MAX_RADIUS: f32 = 500.0;
const PITCH_LIMIT: f32 = 1.55;

/// Target orbit around a focus point. The camera transform eases towards
/// it every frame.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Navigation is suspended while a measurement handle is dragged.
    pub enabled: bool,
}

impl OrbitCamera {
    pub fn from_position(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let radius = offset.length().max(MIN_RADIUS);
        Self {
            focus,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: -(offset.y / radius).clamp(-1.0, 1.0).asin(),
            enabled: true,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus + self.rotation() * Vec3::Z * self.radius
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ROTATE_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * ROTATE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn pan(&mut self, delta: Vec2) {
        let rotation = self.rotation();
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        self.focus += (-right * delta.x + up * delta.y) * self.radius * PAN_SENSITIVITY;
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.radius = (self.radius * (1.0 - scroll * ZOOM_STEP)).clamp(MIN_RADIUS, MAX_RADIUS);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_position(CAMERA_START_POSITION, Vec3::ZERO)
    }
}

pub fn spawn_viewport_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(CLEAR_COLOUR),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_START_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(OrbitCamera::from_position(CAMERA_START_POSITION, Vec3::ZERO));
}

/// Left drag orbits, right drag pans, wheel zooms. The damped step runs
/// every frame even when navigation is disabled.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();

    if orbit.enabled {
        if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
            orbit.rotate(mouse_delta);
        } else if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
            orbit.pan(mouse_delta);
        }
        if scroll.abs() > f32::EPSILON {
            orbit.zoom(scroll);
        }
    }

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    damp_towards(&mut camera_transform, &orbit, time.delta_secs());
}

pub fn damp_towards(transform: &mut Transform, orbit: &OrbitCamera, dt: f32) {
    let lerp_speed = (12.0 * dt).min(1.0);
    transform.translation = transform.translation.lerp(orbit.eye(), lerp_speed);
    transform.rotation = transform.rotation.slerp(orbit.rotation(), lerp_speed);
}

pub fn handle_viewport_resize(
    mut resize_events: EventReader<WindowResized>,
    mut projections: Query<&mut Projection, With<Camera3d>>,
) {
    let Some(resized) = resize_events.read().last() else {
        return;
    };
    if resized.height <= 0.0 {
        return;
    }
    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = resized.width / resized.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_round_trips_through_orbit() {
        let orbit = OrbitCamera::default();
        assert!(orbit.eye().distance(CAMERA_START_POSITION) < 1e-3);

        // Looking down -Z from the eye reaches the focus.
        let forward = orbit.rotation() * Vec3::NEG_Z;
        let towards_focus = (orbit.focus - orbit.eye()).normalize();
        assert!(forward.dot(towards_focus) > 0.9999);
    }

    #[test]
    fn pitch_is_clamped_and_zoom_bounded() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(Vec2::new(0.0, -100_000.0));
        assert_eq!(orbit.pitch, PITCH_LIMIT);

        orbit.zoom(1_000.0);
        assert_eq!(orbit.radius, MIN_RADIUS);
    }

    #[test]
    fn damping_converges_on_target() {
        let orbit = OrbitCamera::default();
        let mut transform = Transform::from_xyz(0.0, 50.0, 0.0);
        for _ in 0..200 {
            damp_towards(&mut transform, &orbit, 1.0 / 60.0);
        }
        assert!(transform.translation.distance(orbit.eye()) < 1e-3);

        // A long frame snaps without overshoot.
        let mut snapped = Transform::IDENTITY;
        damp_towards(&mut snapped, &orbit, 1.0);
        assert!(snapped.translation.distance(orbit.eye()) < 1e-4);
    }
}
