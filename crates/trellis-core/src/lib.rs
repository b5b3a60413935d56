//! Trellis Core - Building model, picking math, and interaction state
//!
//! This crate provides the rendering-independent foundation of the Trellis
//! structural-health twin:
//! - Parametric building description and validation
//! - The procedural structure generator and its member registry
//! - Ray/volume intersection and screen projection helpers
//! - The orbit camera rig and the pointer interaction state machine
//! - Telemetry records (panels, sensors, alerts) and marker construction

pub mod camera;
pub mod generator;
pub mod geometry;
pub mod interaction;
pub mod member;
pub mod params;
pub mod telemetry;

pub use camera::{CameraLimits, CameraRig, SphericalPosition};
pub use generator::{
    generate, pick_member, MemberHitVolume, Placement, PlacementRole, PrimitiveShape, Structure,
};
pub use geometry::{project_to_screen, Obb, Ray, ScreenAnchor};
pub use interaction::{InteractionState, PointerRelease, SelectedEntity, CLICK_THRESHOLD_PX};
pub use member::{HealthStatus, LiveReading, MemberKind, StructuralMember};
pub use params::{BuildingParams, ConfigurationError, CurvedWing, Opening, WallSide};
pub use telemetry::{
    build_markers, panel_for_sensor, pick_marker, sensor_location_name, sensors_for_panel, Alert,
    AlertKind, AlertSeverity, EntityMarker, MarkerKind, Panel, PanelStatus, PingTracker, Sensor,
    SensorStatus, SensorType, WorldPosition,
};
