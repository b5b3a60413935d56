//! Shared resources for the viewport systems

use bevy::prelude::*;

use trellis_core::generator::MemberHitVolume;
use trellis_core::geometry::ScreenAnchor;
use trellis_core::telemetry::{Alert, EntityMarker, Panel, PingTracker, Sensor};
use trellis_core::{CameraRig, InteractionState, Structure};

/// Live site data supplied by the data layer. Markers are rebuilt wholesale
/// whenever `revision` changes.
#[derive(Debug, Clone, Resource, Default)]
pub struct SiteData {
    pub panels: Vec<Panel>,
    pub sensors: Vec<Sensor>,
    pub alerts: Vec<Alert>,
    pub revision: u64,
}

impl SiteData {
    /// Replace the whole data set, invalidating the current marker set.
    pub fn replace(&mut self, panels: Vec<Panel>, sensors: Vec<Sensor>, alerts: Vec<Alert>) {
        self.panels = panels;
        self.sensors = sensors;
        self.alerts = alerts;
        self.revision += 1;
    }
}

/// The viewport controller state: pointer state machine plus the camera rig.
#[derive(Debug, Clone, Resource, Default)]
pub struct ViewState {
    pub interaction: InteractionState,
    pub rig: CameraRig,
}

/// The generated building, with its member hit volumes cached for picking.
#[derive(Debug, Clone, Resource, Default)]
pub struct BuildingModel {
    pub structure: Structure,
    pub hit_volumes: Vec<MemberHitVolume>,
}

impl BuildingModel {
    pub fn new(structure: Structure) -> Self {
        let hit_volumes = structure.hit_volumes();
        Self {
            structure,
            hit_volumes,
        }
    }
}

/// The marker set derived from the current `SiteData` revision; the source
/// of truth for marker hit-testing and ping placement.
#[derive(Debug, Clone, Resource, Default)]
pub struct MarkerSet {
    pub markers: Vec<EntityMarker>,
}

/// Ping requests queued by the UI, drained once per frame.
#[derive(Debug, Clone, Resource, Default)]
pub struct PingQueue(pub Vec<String>);

/// Active time-boxed ping pulses.
#[derive(Debug, Clone, Resource, Default)]
pub struct PingState(pub PingTracker);

/// World underlay visibility settings.
#[derive(Debug, Clone, Resource)]
pub struct WorldSettings {
    pub show_grid: bool,
    pub show_axes: bool,
    pub grid_spacing: f32,
    /// Grid half-extent in lines per side
    pub grid_lines: i32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: false,
            grid_spacing: 2.0,
            grid_lines: 12,
        }
    }
}

/// One alert's projected overlay anchor for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertAnchor {
    pub alert_id: String,
    pub anchor: ScreenAnchor,
}

/// Per-frame screen-space anchors for alert tooltips. Anchors flagged not
/// visible must not be rendered at all.
#[derive(Debug, Clone, Resource, Default)]
pub struct AlertAnchors(pub Vec<AlertAnchor>);
