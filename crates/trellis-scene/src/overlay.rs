//! Screen-space overlay anchors
//!
//! Each frame, every alert coordinate is projected from world space to
//! viewport pixels to drive 2D tooltips anchored to 3D points. Anchors
//! behind the camera are flagged not visible; the UI must skip them
//! entirely so they never intercept pointer events.

use bevy::prelude::*;

use trellis_core::geometry::project_to_screen;

use crate::scene::MainCamera;
use crate::types::{AlertAnchor, AlertAnchors, SiteData};

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AlertAnchors>()
            // Runs after the camera systems so anchors match this frame's view
            .add_systems(PostUpdate, project_alert_anchors);
    }
}

fn project_alert_anchors(
    site: Res<SiteData>,
    mut anchors: ResMut<AlertAnchors>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    windows: Query<&Window>,
) {
    anchors.0.clear();

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };

    let view_proj =
        camera.clip_from_view() * Mat4::from(camera_transform.affine().inverse());
    let viewport = Vec2::new(window.width(), window.height());

    for alert in &site.alerts {
        if !alert.coordinates.is_finite() {
            // Malformed coordinates are skipped, never fatal
            continue;
        }
        let anchor = project_to_screen(view_proj, viewport, alert.coordinates.to_vec3());
        anchors.0.push(AlertAnchor {
            alert_id: alert.id.clone(),
            anchor,
        });
    }
}
