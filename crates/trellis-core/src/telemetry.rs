//! Telemetry records and live overlay markers
//!
//! Panels, sensors, and alerts arrive from the data layer as plain records;
//! this module turns them into placeable markers, resolves the sensor→panel
//! relationship, and tracks time-boxed ping pulses. A sensor whose panel is
//! missing resolves to "Unknown", never an error.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{ray_sphere_intersection, Ray};

/// Marker sphere radius for panels.
pub const PANEL_MARKER_RADIUS: f32 = 0.30;
/// Rest radius of the pulsing ring around a panel marker.
pub const PANEL_RING_RADIUS: f32 = 0.55;
/// Marker sphere radius for sensors.
pub const SENSOR_MARKER_RADIUS: f32 = 0.16;
/// Ambient pulse period, seconds.
pub const PULSE_PERIOD_SECS: f32 = 2.4;
/// Phase offset between successive sensor markers, radians.
pub const SENSOR_PHASE_STEP: f32 = 0.9;
/// Lifetime of a ping pulse, seconds.
pub const PING_DURATION_SECS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Online,
    Warning,
    Critical,
    Offline,
}

impl SensorStatus {
    /// Fixed status→color table (linear RGB).
    pub fn color(self) -> [f32; 3] {
        match self {
            SensorStatus::Online => [0.18, 0.80, 0.44],
            SensorStatus::Warning => [0.95, 0.61, 0.07],
            SensorStatus::Critical => [0.86, 0.21, 0.27],
            SensorStatus::Offline => [0.45, 0.47, 0.50],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Good,
    Warning,
    Critical,
    Offline,
}

impl PanelStatus {
    pub fn color(self) -> [f32; 3] {
        match self {
            PanelStatus::Good => [0.18, 0.80, 0.44],
            PanelStatus::Warning => [0.95, 0.61, 0.07],
            PanelStatus::Critical => [0.86, 0.21, 0.27],
            PanelStatus::Offline => [0.45, 0.47, 0.50],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Moisture,
    Thermal,
    Strain,
    Vibration,
    Tilt,
}

impl SensorType {
    pub fn display_name(self) -> &'static str {
        match self {
            SensorType::Moisture => "Moisture",
            SensorType::Thermal => "Thermal",
            SensorType::Strain => "Strain",
            SensorType::Vibration => "Vibration",
            SensorType::Tilt => "Tilt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Moisture,
    Thermal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A world coordinate as supplied by the data layer. May be non-finite when
/// the upstream record is malformed; such markers are skipped defensively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A monitoring panel record as supplied by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: String,
    pub panel_name: String,
    pub status: PanelStatus,
    pub position: WorldPosition,
}

/// A sensor record as supplied by the data layer. `panel_id` is a weak
/// reference; resolution is a lookup, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub status: SensorStatus,
    pub battery_level: u8,
    pub last_reading: f32,
    pub reading_unit: String,
    pub panel_id: String,
    pub position: WorldPosition,
}

/// An active alert anchored to a world coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub location_name: String,
    pub metric: String,
    pub value: f32,
    pub coordinates: WorldPosition,
}

/// Which record a marker visualizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Panel,
    Sensor,
}

/// A placeable overlay marker derived from a panel or sensor record.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMarker {
    pub kind: MarkerKind,
    pub ref_id: String,
    pub position: Vec3,
    pub color: [f32; 3],
    /// Ambient pulse phase offset, radians; sensors are offset by index so
    /// they do not pulse in lockstep.
    pub pulse_phase: f32,
}

impl EntityMarker {
    /// Hit radius of the whole marker group. The panel group includes its
    /// ring, so a click on the ring resolves to the panel marker.
    pub fn hit_radius(&self) -> f32 {
        match self.kind {
            MarkerKind::Panel => PANEL_RING_RADIUS * 1.1,
            MarkerKind::Sensor => SENSOR_MARKER_RADIUS * 1.6,
        }
    }
}

/// Build the marker set for one data refresh. Records with non-finite
/// positions are skipped for placement and hit-testing.
pub fn build_markers(panels: &[Panel], sensors: &[Sensor]) -> Vec<EntityMarker> {
    let mut markers = Vec::with_capacity(panels.len() + sensors.len());

    for panel in panels {
        if !panel.position.is_finite() {
            warn!(panel_id = %panel.panel_id, "skipping panel marker with malformed position");
            continue;
        }
        markers.push(EntityMarker {
            kind: MarkerKind::Panel,
            ref_id: panel.panel_id.clone(),
            position: panel.position.to_vec3(),
            color: panel.status.color(),
            pulse_phase: 0.0,
        });
    }

    for (index, sensor) in sensors.iter().enumerate() {
        if !sensor.position.is_finite() {
            warn!(sensor_id = %sensor.sensor_id, "skipping sensor marker with malformed position");
            continue;
        }
        markers.push(EntityMarker {
            kind: MarkerKind::Sensor,
            ref_id: sensor.sensor_id.clone(),
            position: sensor.position.to_vec3(),
            color: sensor.status.color(),
            pulse_phase: index as f32 * SENSOR_PHASE_STEP,
        });
    }

    markers
}

/// Nearest marker hit by `ray`, if any. Markers are tested as whole groups
/// (sphere + ring) so child geometry resolves to its owning marker.
pub fn pick_marker<'a>(ray: &Ray, markers: &'a [EntityMarker]) -> Option<&'a EntityMarker> {
    let mut best: Option<(f32, &EntityMarker)> = None;
    for marker in markers {
        if let Some(t) = ray_sphere_intersection(ray, marker.position, marker.hit_radius()) {
            if best.map(|(bt, _)| t < bt).unwrap_or(true) {
                best = Some((t, marker));
            }
        }
    }
    best.map(|(_, m)| m)
}

/// Resolve a sensor's owning panel. `None` when the panel is gone; callers
/// display "Unknown" rather than failing.
pub fn panel_for_sensor<'a>(panels: &'a [Panel], panel_id: &str) -> Option<&'a Panel> {
    panels.iter().find(|p| p.panel_id == panel_id)
}

/// Display location for a sensor, falling back to "Unknown" on a missing
/// panel reference.
pub fn sensor_location_name(panels: &[Panel], panel_id: &str) -> String {
    panel_for_sensor(panels, panel_id)
        .map(|p| p.panel_name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// All sensors attached to a panel, in record order.
pub fn sensors_for_panel<'a>(sensors: &'a [Sensor], panel_id: &str) -> Vec<&'a Sensor> {
    sensors.iter().filter(|s| s.panel_id == panel_id).collect()
}

/// One active ping pulse.
#[derive(Debug, Clone, PartialEq)]
struct PingPulse {
    panel_id: String,
    started_at: f32,
}

/// Time-boxed ping pulses keyed by panel id.
///
/// A ping on an unknown panel is a no-op; a ping on an already-pinging panel
/// restarts its pulse. Pulses expire on their own after
/// [`PING_DURATION_SECS`]; no explicit cancellation exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingTracker {
    active: Vec<PingPulse>,
}

impl PingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ping request at time `now` (seconds of elapsed wall clock).
    pub fn request(&mut self, panel_id: &str, panels: &[Panel], now: f32) {
        if !panels.iter().any(|p| p.panel_id == panel_id) {
            warn!(panel_id, "ignoring ping for unknown panel");
            return;
        }
        if let Some(pulse) = self.active.iter_mut().find(|p| p.panel_id == panel_id) {
            pulse.started_at = now;
        } else {
            self.active.push(PingPulse {
                panel_id: panel_id.to_string(),
                started_at: now,
            });
        }
    }

    /// Drop expired pulses. Call once per frame with the frame's time sample.
    pub fn advance(&mut self, now: f32) {
        self.active
            .retain(|p| now - p.started_at < PING_DURATION_SECS);
    }

    /// Progress of the pulse on `panel_id` in [0, 1), if one is active.
    pub fn progress(&self, panel_id: &str, now: f32) -> Option<f32> {
        self.active
            .iter()
            .find(|p| p.panel_id == panel_id)
            .map(|p| ((now - p.started_at) / PING_DURATION_SECS).clamp(0.0, 1.0))
            .filter(|t| *t < 1.0)
    }

    /// All live pulses as `(panel_id, progress)` pairs.
    pub fn active_pulses(&self, now: f32) -> Vec<(&str, f32)> {
        self.active
            .iter()
            .filter_map(|p| {
                let t = (now - p.started_at) / PING_DURATION_SECS;
                (t < 1.0).then(|| (p.panel_id.as_str(), t.max(0.0)))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, status: PanelStatus, x: f32) -> Panel {
        Panel {
            panel_id: id.to_string(),
            panel_name: format!("Panel {id}"),
            status,
            position: WorldPosition { x, y: 2.0, z: 0.0 },
        }
    }

    fn sensor(id: &str, panel_id: &str, x: f32) -> Sensor {
        Sensor {
            sensor_id: id.to_string(),
            sensor_type: SensorType::Strain,
            status: SensorStatus::Online,
            battery_level: 88,
            last_reading: 120.5,
            reading_unit: "µε".to_string(),
            panel_id: panel_id.to_string(),
            position: WorldPosition { x, y: 3.0, z: 1.0 },
        }
    }

    #[test]
    fn test_markers_skip_non_finite_positions() {
        let panels = vec![panel("p1", PanelStatus::Good, 1.0), {
            let mut p = panel("p2", PanelStatus::Warning, 2.0);
            p.position.y = f32::NAN;
            p
        }];
        let sensors = vec![sensor("s1", "p1", 0.0), {
            let mut s = sensor("s2", "p1", 1.0);
            s.position.x = f32::INFINITY;
            s
        }];

        let markers = build_markers(&panels, &sensors);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().any(|m| m.ref_id == "p1"));
        assert!(markers.iter().any(|m| m.ref_id == "s1"));
    }

    #[test]
    fn test_sensor_pulse_phases_differ_by_index() {
        let panels = vec![];
        let sensors = vec![
            sensor("s1", "p1", 0.0),
            sensor("s2", "p1", 1.0),
            sensor("s3", "p1", 2.0),
        ];
        let markers = build_markers(&panels, &sensors);
        assert_eq!(markers[0].pulse_phase, 0.0);
        assert!((markers[1].pulse_phase - SENSOR_PHASE_STEP).abs() < 1e-6);
        assert!((markers[2].pulse_phase - 2.0 * SENSOR_PHASE_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_marker_colors_follow_the_status_table() {
        let panels = vec![
            panel("good", PanelStatus::Good, 0.0),
            panel("crit", PanelStatus::Critical, 1.0),
        ];
        let markers = build_markers(&panels, &[]);
        assert_eq!(markers[0].color, PanelStatus::Good.color());
        assert_eq!(markers[1].color, PanelStatus::Critical.color());
    }

    #[test]
    fn test_pick_marker_prefers_the_nearest_hit() {
        let panels = vec![
            panel("near", PanelStatus::Good, 0.0),
            panel("far", PanelStatus::Good, 0.0),
        ];
        let mut markers = build_markers(&panels, &[]);
        markers[0].position = Vec3::new(0.0, 0.0, 2.0);
        markers[1].position = Vec3::new(0.0, 0.0, 8.0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = pick_marker(&ray, &markers).unwrap();
        assert_eq!(hit.ref_id, "near");
    }

    #[test]
    fn test_ring_hit_resolves_to_the_panel_group() {
        // A ray grazing outside the sphere but inside the ring radius still
        // selects the panel.
        let panels = vec![panel("p1", PanelStatus::Good, 0.0)];
        let mut markers = build_markers(&panels, &[]);
        markers[0].position = Vec3::ZERO;

        let graze = PANEL_MARKER_RADIUS + 0.1;
        let ray = Ray::new(Vec3::new(graze, 0.0, -5.0), Vec3::Z);
        assert!(pick_marker(&ray, &markers).is_some());
    }

    #[test]
    fn test_unknown_panel_resolves_to_unknown() {
        let panels = vec![panel("p1", PanelStatus::Good, 0.0)];
        assert!(panel_for_sensor(&panels, "missing").is_none());
        assert_eq!(sensor_location_name(&panels, "missing"), "Unknown");
        assert_eq!(sensor_location_name(&panels, "p1"), "Panel p1");
    }

    #[test]
    fn test_sensors_for_panel_filters_by_reference() {
        let sensors = vec![
            sensor("s1", "p1", 0.0),
            sensor("s2", "p2", 1.0),
            sensor("s3", "p1", 2.0),
        ];
        let attached = sensors_for_panel(&sensors, "p1");
        assert_eq!(attached.len(), 2);
        assert_eq!(attached[0].sensor_id, "s1");
        assert_eq!(attached[1].sensor_id, "s3");
    }

    #[test]
    fn test_ping_unknown_panel_is_a_no_op() {
        let panels = vec![panel("p1", PanelStatus::Good, 0.0)];
        let mut pings = PingTracker::new();
        pings.request("nope", &panels, 0.0);
        assert!(pings.is_empty());
    }

    #[test]
    fn test_ping_expires_on_its_own() {
        let panels = vec![panel("p1", PanelStatus::Good, 0.0)];
        let mut pings = PingTracker::new();
        pings.request("p1", &panels, 10.0);

        assert!(pings.progress("p1", 10.5).is_some());
        pings.advance(11.9);
        assert!(pings.progress("p1", 11.9).is_some());

        pings.advance(12.1);
        assert!(pings.is_empty());
        assert!(pings.progress("p1", 12.1).is_none());
    }

    #[test]
    fn test_overlapping_pings_are_independent() {
        let panels = vec![
            panel("p1", PanelStatus::Good, 0.0),
            panel("p2", PanelStatus::Good, 1.0),
        ];
        let mut pings = PingTracker::new();
        pings.request("p1", &panels, 0.0);
        pings.request("p2", &panels, 1.5);

        pings.advance(2.1);
        assert!(pings.progress("p1", 2.1).is_none());
        let p2 = pings.progress("p2", 2.1).unwrap();
        assert!((p2 - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_repinging_restarts_the_pulse() {
        let panels = vec![panel("p1", PanelStatus::Good, 0.0)];
        let mut pings = PingTracker::new();
        pings.request("p1", &panels, 0.0);
        pings.request("p1", &panels, 1.5);
        pings.advance(2.5);
        // Would have expired at 2.0 without the restart
        assert!(pings.progress("p1", 2.5).is_some());
    }

    #[test]
    fn test_records_parse_the_upstream_field_names() {
        let sensor: Sensor = serde_json::from_str(
            r#"{
                "sensor_id": "s-101",
                "sensor_type": "moisture",
                "status": "warning",
                "battery_level": 72,
                "last_reading": 18.4,
                "reading_unit": "%",
                "panel_id": "p-7",
                "position": {"x": 1.0, "y": 2.5, "z": -3.0}
            }"#,
        )
        .unwrap();
        assert_eq!(sensor.sensor_type, SensorType::Moisture);
        assert_eq!(sensor.status, SensorStatus::Warning);
        assert_eq!(sensor.panel_id, "p-7");

        let alert: Alert = serde_json::from_str(
            r#"{
                "id": "a-1",
                "type": "thermal",
                "severity": "high",
                "title": "Roof cavity overheating",
                "location_name": "North roof",
                "metric": "Temperature",
                "value": 54.2,
                "coordinates": {"x": 0.0, "y": 7.0, "z": -3.5}
            }"#,
        )
        .unwrap();
        assert_eq!(alert.kind, AlertKind::Thermal);
        assert_eq!(alert.severity, AlertSeverity::High);
    }
}
