//! Orbit camera rig
//!
//! The rig keeps the camera on a horizontal circle around a fixed look-at
//! target: drag deltas turn into azimuth rotation and a clamped height
//! offset, zoom scales the horizontal distance inside a fixed band, and
//! auto-rotation advances the azimuth a small step per frame.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Tuning and clamp bands for the camera rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraLimits {
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "default_min_height")]
    pub min_height: f32,
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    /// Radians of azimuth per pixel of horizontal drag
    #[serde(default = "default_orbit_sensitivity")]
    pub orbit_sensitivity: f32,
    /// Meters of height per pixel of vertical drag
    #[serde(default = "default_height_sensitivity")]
    pub height_sensitivity: f32,
    /// Azimuth advance per frame while auto-rotating
    #[serde(default = "default_auto_rotate_step")]
    pub auto_rotate_step: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            orbit_sensitivity: default_orbit_sensitivity(),
            height_sensitivity: default_height_sensitivity(),
            auto_rotate_step: default_auto_rotate_step(),
        }
    }
}

fn default_min_distance() -> f32 {
    8.0
}

fn default_max_distance() -> f32 {
    60.0
}

fn default_min_height() -> f32 {
    1.5
}

fn default_max_height() -> f32 {
    26.0
}

fn default_orbit_sensitivity() -> f32 {
    0.008
}

fn default_height_sensitivity() -> f32 {
    0.05
}

fn default_auto_rotate_step() -> f32 {
    0.003
}

/// Discrete zoom factor for one zoom-in request; zoom-out uses the inverse.
const ZOOM_STEP_IN: f32 = 0.9;
const ZOOM_STEP_OUT: f32 = 1.1;
/// Wheel zoom factors, chosen by scroll sign.
const WHEEL_ZOOM_IN: f32 = 0.92;
const WHEEL_ZOOM_OUT: f32 = 1.08;

/// Spherical camera position derived from the rig, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPosition {
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

/// The orbit camera state.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    /// Horizontal distance from the look-at target
    pub distance: f32,
    /// Rotation around the vertical axis, radians
    pub azimuth: f32,
    /// Camera height above the ground plane
    pub height: f32,
    /// Fixed look-at target
    pub target: Vec3,
    pub limits: CameraLimits,
    home_distance: f32,
    home_azimuth: f32,
    home_height: f32,
}

impl CameraRig {
    pub fn new(target: Vec3, distance: f32, azimuth: f32, height: f32, limits: CameraLimits) -> Self {
        let mut rig = Self {
            distance,
            azimuth,
            height,
            target,
            limits,
            home_distance: distance,
            home_azimuth: azimuth,
            home_height: height,
        };
        rig.clamp();
        rig.home_distance = rig.distance;
        rig.home_height = rig.height;
        rig
    }

    /// Apply a pointer drag delta: horizontal motion orbits, vertical motion
    /// raises or lowers the camera inside the configured height band.
    pub fn orbit(&mut self, delta: Vec2) {
        self.azimuth -= delta.x * self.limits.orbit_sensitivity;
        self.height = (self.height - delta.y * self.limits.height_sensitivity)
            .clamp(self.limits.min_height, self.limits.max_height);
    }

    /// Advance the idle auto-rotation by one frame step.
    pub fn auto_rotate(&mut self) {
        self.azimuth += self.limits.auto_rotate_step;
    }

    pub fn zoom_in(&mut self) {
        self.apply_zoom(ZOOM_STEP_IN);
    }

    pub fn zoom_out(&mut self) {
        self.apply_zoom(ZOOM_STEP_OUT);
    }

    /// Wheel zoom; only the sign of the scroll amount matters.
    pub fn zoom_scroll(&mut self, scroll: f32) {
        if scroll > 0.0 {
            self.apply_zoom(WHEEL_ZOOM_IN);
        } else if scroll < 0.0 {
            self.apply_zoom(WHEEL_ZOOM_OUT);
        }
    }

    fn apply_zoom(&mut self, factor: f32) {
        self.distance =
            (self.distance * factor).clamp(self.limits.min_distance, self.limits.max_distance);
    }

    fn clamp(&mut self) {
        self.distance = self
            .distance
            .clamp(self.limits.min_distance, self.limits.max_distance);
        self.height = self
            .height
            .clamp(self.limits.min_height, self.limits.max_height);
    }

    /// Restore the default view.
    pub fn reset(&mut self) {
        self.distance = self.home_distance;
        self.azimuth = self.home_azimuth;
        self.height = self.home_height;
    }

    /// World-space camera position.
    pub fn eye(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.azimuth.cos(),
                self.height,
                self.distance * self.azimuth.sin(),
            )
    }

    /// Spherical position derived from the cartesian rig state.
    pub fn spherical(&self) -> SphericalPosition {
        SphericalPosition {
            radius: (self.distance * self.distance + self.height * self.height).sqrt(),
            azimuth: self.azimuth,
            elevation: self.height.atan2(self.distance),
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, 2.6, 0.0),
            28.0,
            0.8,
            12.0,
            CameraLimits::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_never_leaves_the_band() {
        let mut rig = CameraRig::default();
        for _ in 0..200 {
            rig.zoom_in();
        }
        assert!((rig.distance - rig.limits.min_distance).abs() < 1e-4);

        for _ in 0..200 {
            rig.zoom_out();
        }
        assert!((rig.distance - rig.limits.max_distance).abs() < 1e-4);

        for _ in 0..100 {
            rig.zoom_scroll(1.0);
        }
        assert!(rig.distance >= rig.limits.min_distance - 1e-4);
        for _ in 0..100 {
            rig.zoom_scroll(-1.0);
        }
        assert!(rig.distance <= rig.limits.max_distance + 1e-4);
    }

    #[test]
    fn test_zero_scroll_is_a_no_op() {
        let mut rig = CameraRig::default();
        let before = rig.distance;
        rig.zoom_scroll(0.0);
        assert_eq!(rig.distance, before);
    }

    #[test]
    fn test_drag_height_stays_in_band() {
        let mut rig = CameraRig::default();
        rig.orbit(Vec2::new(0.0, -10_000.0));
        assert!((rig.height - rig.limits.max_height).abs() < 1e-4);
        rig.orbit(Vec2::new(0.0, 10_000.0));
        assert!((rig.height - rig.limits.min_height).abs() < 1e-4);
    }

    #[test]
    fn test_auto_rotate_advances_azimuth() {
        let mut rig = CameraRig::default();
        let before = rig.azimuth;
        rig.auto_rotate();
        rig.auto_rotate();
        assert!((rig.azimuth - before - 2.0 * rig.limits.auto_rotate_step).abs() < 1e-6);
    }

    #[test]
    fn test_reset_restores_home_view() {
        let mut rig = CameraRig::default();
        let home_eye = rig.eye();
        rig.orbit(Vec2::new(300.0, -40.0));
        rig.zoom_in();
        rig.reset();
        assert!((rig.eye() - home_eye).length() < 1e-4);
    }

    #[test]
    fn test_spherical_readback() {
        let rig = CameraRig::new(
            Vec3::ZERO,
            30.0,
            1.2,
            10.0,
            CameraLimits::default(),
        );
        let s = rig.spherical();
        assert!((s.radius - (30.0f32 * 30.0 + 10.0 * 10.0).sqrt()).abs() < 1e-4);
        assert_eq!(s.azimuth, 1.2);
        assert!((s.elevation - (10.0f32).atan2(30.0)).abs() < 1e-6);
        // Eye sits at the derived radius from the target
        assert!(((rig.eye() - rig.target).length() - s.radius).abs() < 1e-4);
    }
}
