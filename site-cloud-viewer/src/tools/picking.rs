use bevy::math::Affine3A;
use bevy::prelude::*;
use constants::render_settings::{HANDLE_PICK_RADIUS, POINT_PICK_THRESHOLD};

use super::measure::{EndpointRole, MeasureHandle, MeasurementId};
use crate::session::state::ClipPlane;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleHit {
    pub id: MeasurementId,
    pub role: EndpointRole,
    /// Ray parameter of the hit.
    pub distance: f32,
}

/// Ray queries the pointer state machine runs against the scene.
pub trait ScenePicker {
    /// Nearest handle sphere along the ray.
    fn pick_handle(&self, ray: &Ray3d) -> Option<HandleHit>;

    /// Nearest visible cloud point within the pick threshold, as the closest
    /// point on the ray.
    fn pick_cloud(&self, ray: &Ray3d) -> Option<Vec3>;
}

/// Cloud tile as seen by picking: local points, their local bounds and the
/// tile's world transform.
pub struct TileView<'a> {
    pub points: &'a [Vec3],
    pub local_min: Vec3,
    pub local_max: Vec3,
    pub world_from_local: Affine3A,
}

/// Snapshot of everything pickable for one pointer event.
#[derive(Default)]
pub struct PickScene<'a> {
    pub handles: Vec<(MeasureHandle, Vec3)>,
    pub tiles: Vec<TileView<'a>>,
    /// Points on the hidden side are not pickable while clipping is on.
    pub clip: Option<ClipPlane>,
}

impl ScenePicker for PickScene<'_> {
    fn pick_handle(&self, ray: &Ray3d) -> Option<HandleHit> {
        self.handles
            .iter()
            .filter_map(|(handle, centre)| {
                ray_sphere_hit_t(ray.origin, *ray.direction, *centre, HANDLE_PICK_RADIUS).map(
                    |distance| HandleHit {
                        id: handle.id,
                        role: handle.role,
                        distance,
                    },
                )
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn pick_cloud(&self, ray: &Ray3d) -> Option<Vec3> {
        let origin = ray.origin;
        let dir = *ray.direction;
        let threshold_sq = POINT_PICK_THRESHOLD * POINT_PICK_THRESHOLD;
        let mut best: Option<(f32, Vec3)> = None;

        for tile in &self.tiles {
            let local_from_world = tile.world_from_local.inverse();
            let local_origin = local_from_world.transform_point3(origin);
            let local_dir = local_from_world.transform_vector3(dir);
            let pad = Vec3::splat(POINT_PICK_THRESHOLD);
            if ray_aabb_hit_t(local_origin, local_dir, tile.local_min - pad, tile.local_max + pad)
                .is_none()
            {
                continue;
            }

            for local in tile.points {
                let point = tile.world_from_local.transform_point3(*local);
                let t = (point - origin).dot(dir);
                if t < 0.0 || best.is_some_and(|(best_t, _)| t >= best_t) {
                    continue;
                }
                let on_ray = origin + dir * t;
                if on_ray.distance_squared(point) > threshold_sq {
                    continue;
                }
                if self.clip.is_some_and(|plane| !plane.keeps(point)) {
                    continue;
                }
                best = Some((t, on_ray));
            }
        }

        best.map(|(_, hit)| hit)
    }
}

/// Nearest non-negative ray parameter at which the ray enters the sphere.
pub fn ray_sphere_hit_t(origin: Vec3, dir: Vec3, centre: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - centre;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    let far = -b + root;
    if far < 0.0 {
        return None;
    }
    Some(if near >= 0.0 { near } else { far })
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let (o, d) = (ray_origin[axis], ray_direction[axis]);
        if d == 0.0 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}
