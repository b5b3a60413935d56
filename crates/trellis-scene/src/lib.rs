//! Trellis Scene - 3D viewport and interaction systems
//!
//! This crate realizes a generated `Structure` into a bevy scene and runs
//! the viewport controller: orbit camera, hover/click hit-testing against
//! members and live markers, marker pulse and ping animation, and per-frame
//! screen-space anchors for alert overlays.

pub mod markers;
pub mod overlay;
pub mod scene;
pub mod structure;
pub mod types;

use bevy::prelude::*;

/// Frame ordering inside one render tick: the viewport controller (input,
/// selection, camera) runs before marker animation; overlay projection runs
/// in `PostUpdate` against the frame's final camera.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportSet {
    Controller,
    Markers,
}

/// Plugin bundle that sets up the whole viewport.
pub struct TrellisScenePlugin;

impl Plugin for TrellisScenePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (ViewportSet::Controller, ViewportSet::Markers).chain(),
        )
        .add_plugins(scene::ScenePlugin)
        .add_plugins(structure::StructurePlugin)
        .add_plugins(markers::MarkersPlugin)
        .add_plugins(overlay::OverlayPlugin);
    }
}

// Re-export commonly used types
pub use scene::MainCamera;
pub use structure::MemberRef;
pub use types::{
    AlertAnchor, AlertAnchors, BuildingModel, MarkerSet, PingQueue, PingState, SiteData,
    ViewState, WorldSettings,
};
