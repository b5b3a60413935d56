//! Ray intersection and screen projection helpers
//!
//! All hit-testing runs against these pure primitives so that selection
//! behavior is testable without a rendering context. A miss is a normal
//! `None`, never an error.

use glam::{Mat4, Quat, Vec2, Vec3};

/// A world-space picking ray with a normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Oriented bounding box used as a member's hit volume.
#[derive(Debug, Clone)]
pub struct Obb {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

/// Slab-test a ray against an oriented box. Returns the entry distance along
/// the ray, or `None` when the box is missed or lies entirely behind the
/// origin.
pub fn ray_obb_intersection(ray: &Ray, obb: &Obb) -> Option<f32> {
    // Transform the ray into the box's local frame, where the test reduces
    // to an axis-aligned slab test around the origin.
    let inv_rot = obb.rotation.inverse();
    let local_origin = inv_rot * (ray.origin - obb.center);
    let local_dir = inv_rot * ray.direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = local_origin[axis];
        let dir = local_dir[axis];
        let half = obb.half_extents[axis];

        if dir.abs() < 1e-8 {
            // Parallel to this slab; miss unless the origin is inside it
            if origin.abs() > half {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let mut t0 = (-half - origin) * inv;
        let mut t1 = (half - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

/// Ray/sphere intersection. Returns the distance to the nearest hit in front
/// of the origin.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let proj = to_center.dot(ray.direction);
    let closest_sq = to_center.length_squared() - proj * proj;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }
    let half_chord = (radius_sq - closest_sq).sqrt();
    let t = if proj - half_chord >= 0.0 {
        proj - half_chord
    } else {
        proj + half_chord
    };
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// A world point projected to viewport pixel coordinates.
///
/// `visible == false` means the point is behind the camera; its overlay must
/// be suppressed entirely, not just hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenAnchor {
    pub position: Vec2,
    pub visible: bool,
}

/// Project `world` through `view_proj` into pixel coordinates of a viewport
/// of `viewport_size` (origin top-left, y down).
pub fn project_to_screen(view_proj: Mat4, viewport_size: Vec2, world: Vec3) -> ScreenAnchor {
    let clip = view_proj * world.extend(1.0);

    // Points on or behind the camera plane have no meaningful projection
    if clip.w <= f32::EPSILON {
        return ScreenAnchor {
            position: Vec2::ZERO,
            visible: false,
        };
    }

    let ndc = clip.truncate() / clip.w;
    let position = Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport_size.x,
        (1.0 - ndc.y) * 0.5 * viewport_size.y,
    );
    ScreenAnchor {
        position,
        visible: ndc.z <= 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_axis_aligned_box() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let obb = Obb {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(1.0),
            rotation: Quat::IDENTITY,
        };
        let t = ray_obb_intersection(&ray, &obb).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_offset_box() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, -10.0), Vec3::Z);
        let obb = Obb {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(1.0),
            rotation: Quat::IDENTITY,
        };
        assert!(ray_obb_intersection(&ray, &obb).is_none());
    }

    #[test]
    fn test_ray_hits_rotated_box() {
        // A thin box rotated 45 degrees around Y presents its long diagonal
        // to a ray fired down -X
        let obb = Obb {
            center: Vec3::ZERO,
            half_extents: Vec3::new(2.0, 0.1, 0.1),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
        };
        let ray = Ray::new(Vec3::new(10.0, 0.0, 1.0), -Vec3::X);
        assert!(ray_obb_intersection(&ray, &obb).is_some());

        // The unrotated box would miss at that z offset
        let unrotated = Obb {
            rotation: Quat::IDENTITY,
            ..obb
        };
        assert!(ray_obb_intersection(&ray, &unrotated).is_none());
    }

    #[test]
    fn test_box_behind_origin_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        let obb = Obb {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(1.0),
            rotation: Quat::IDENTITY,
        };
        assert!(ray_obb_intersection(&ray, &obb).is_none());
    }

    #[test]
    fn test_ray_inside_box_hits_at_zero() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let obb = Obb {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(1.0),
            rotation: Quat::IDENTITY,
        };
        assert_eq!(ray_obb_intersection(&ray, &obb), Some(0.0));
    }

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        assert!(ray_sphere_intersection(&ray, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
        // Sphere behind the origin
        assert!(ray_sphere_intersection(&ray, Vec3::new(0.0, 0.0, -20.0), 1.0).is_none());
    }

    #[test]
    fn test_projection_centers_the_look_at_point() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
        let viewport = Vec2::new(1280.0, 720.0);

        let anchor = project_to_screen(proj * view, viewport, Vec3::ZERO);
        assert!(anchor.visible);
        assert!((anchor.position.x - 640.0).abs() < 0.5);
        assert!((anchor.position.y - 360.0).abs() < 0.5);
    }

    #[test]
    fn test_projection_flags_points_behind_camera() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
        let viewport = Vec2::new(1280.0, 720.0);

        let behind = project_to_screen(proj * view, viewport, Vec3::new(0.0, 0.0, 20.0));
        assert!(!behind.visible);
    }
}
