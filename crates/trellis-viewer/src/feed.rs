//! Site data feed loading
//!
//! The data-fetch layer proper is out of scope for the viewer; this module
//! stands in for it by loading a JSON feed of panels, sensors, and alerts,
//! or by serving a built-in demo feed shaped to the default building.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use trellis_core::telemetry::{
    Alert, AlertKind, AlertSeverity, Panel, PanelStatus, Sensor, SensorStatus, SensorType,
    WorldPosition,
};

/// One complete site data set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFeed {
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Load a feed file.
pub fn load_feed(path: &Path) -> Result<SiteFeed> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading feed {}", path.display()))?;
    let feed: SiteFeed = serde_json::from_str(&content)
        .with_context(|| format!("parsing feed {}", path.display()))?;
    info!(
        path = %path.display(),
        panels = feed.panels.len(),
        sensors = feed.sensors.len(),
        alerts = feed.alerts.len(),
        "Loaded site feed"
    );
    Ok(feed)
}

fn pos(x: f32, y: f32, z: f32) -> WorldPosition {
    WorldPosition { x, y, z }
}

fn panel(id: &str, name: &str, status: PanelStatus, position: WorldPosition) -> Panel {
    Panel {
        panel_id: id.to_string(),
        panel_name: name.to_string(),
        status,
        position,
    }
}

#[allow(clippy::too_many_arguments)]
fn sensor(
    id: &str,
    sensor_type: SensorType,
    status: SensorStatus,
    battery: u8,
    reading: f32,
    unit: &str,
    panel_id: &str,
    position: WorldPosition,
) -> Sensor {
    Sensor {
        sensor_id: id.to_string(),
        sensor_type,
        status,
        battery_level: battery,
        last_reading: reading,
        reading_unit: unit.to_string(),
        panel_id: panel_id.to_string(),
        position,
    }
}

/// The built-in demo feed, laid out for the default building.
pub fn demo_feed() -> SiteFeed {
    let panels = vec![
        panel("P-01", "South-west bay", PanelStatus::Good, pos(-10.0, 3.2, -7.3)),
        panel("P-02", "South entrance", PanelStatus::Good, pos(2.0, 3.0, -7.3)),
        panel("P-03", "North wall mid", PanelStatus::Warning, pos(-4.0, 3.4, 7.3)),
        panel("P-04", "East gable", PanelStatus::Good, pos(12.3, 3.0, 0.0)),
        panel("P-05", "Ridge line", PanelStatus::Critical, pos(0.0, 8.2, 0.0)),
        panel("P-06", "Curved wing", PanelStatus::Offline, pos(24.4, 3.0, 0.0)),
    ];

    let sensors = vec![
        sensor("S-101", SensorType::Moisture, SensorStatus::Online, 91, 11.2, "%", "P-01", pos(-10.4, 1.2, -7.1)),
        sensor("S-102", SensorType::Strain, SensorStatus::Online, 84, 132.0, "µε", "P-01", pos(-9.6, 4.6, -7.1)),
        sensor("S-103", SensorType::Moisture, SensorStatus::Warning, 77, 21.6, "%", "P-02", pos(2.4, 0.8, -7.1)),
        sensor("S-104", SensorType::Vibration, SensorStatus::Online, 66, 0.8, "mm/s", "P-02", pos(1.5, 4.8, -7.1)),
        sensor("S-105", SensorType::Thermal, SensorStatus::Online, 88, 19.4, "°C", "P-03", pos(-4.4, 2.2, 7.1)),
        sensor("S-106", SensorType::Moisture, SensorStatus::Critical, 41, 27.9, "%", "P-03", pos(-3.6, 0.9, 7.1)),
        sensor("S-107", SensorType::Tilt, SensorStatus::Online, 95, 0.3, "°", "P-04", pos(12.1, 4.9, -1.2)),
        sensor("S-108", SensorType::Strain, SensorStatus::Online, 72, 88.0, "µε", "P-04", pos(12.1, 2.4, 1.4)),
        sensor("S-109", SensorType::Thermal, SensorStatus::Warning, 58, 38.5, "°C", "P-05", pos(0.8, 7.9, -0.4)),
        sensor("S-110", SensorType::Strain, SensorStatus::Online, 69, 164.0, "µε", "P-05", pos(-1.1, 7.7, 0.5)),
        sensor("S-111", SensorType::Moisture, SensorStatus::Offline, 3, 14.0, "%", "P-06", pos(23.8, 1.5, 2.1)),
        // References a panel that no longer exists; the UI shows "Unknown"
        sensor("S-112", SensorType::Vibration, SensorStatus::Online, 82, 1.4, "mm/s", "P-99", pos(6.0, 5.0, 7.1)),
    ];

    let alerts = vec![
        Alert {
            id: "AL-01".to_string(),
            kind: AlertKind::Moisture,
            severity: AlertSeverity::High,
            title: "Moisture ingress at south plate".to_string(),
            location_name: "South wall, entrance bay".to_string(),
            metric: "Moisture".to_string(),
            value: 27.9,
            coordinates: pos(2.4, 0.8, -7.0),
        },
        Alert {
            id: "AL-02".to_string(),
            kind: AlertKind::Thermal,
            severity: AlertSeverity::Medium,
            title: "Roof cavity temperature rising".to_string(),
            location_name: "Ridge line".to_string(),
            metric: "Temperature".to_string(),
            value: 38.5,
            coordinates: pos(0.8, 7.9, -0.4),
        },
        Alert {
            id: "AL-03".to_string(),
            kind: AlertKind::Moisture,
            severity: AlertSeverity::Low,
            title: "Damp reading on north girt".to_string(),
            location_name: "North wall mid".to_string(),
            metric: "Moisture".to_string(),
            value: 21.6,
            coordinates: pos(-3.6, 0.9, 7.0),
        },
    ];

    SiteFeed {
        panels,
        sensors,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use trellis_core::telemetry::sensor_location_name;

    #[test]
    fn test_demo_ids_are_unique() {
        let feed = demo_feed();
        let panel_ids: HashSet<_> = feed.panels.iter().map(|p| p.panel_id.as_str()).collect();
        assert_eq!(panel_ids.len(), feed.panels.len());
        let sensor_ids: HashSet<_> = feed.sensors.iter().map(|s| s.sensor_id.as_str()).collect();
        assert_eq!(sensor_ids.len(), feed.sensors.len());
    }

    #[test]
    fn test_demo_contains_a_dangling_sensor_reference() {
        // The demo deliberately includes one sensor whose panel is missing,
        // which must resolve to "Unknown" rather than fail
        let feed = demo_feed();
        let dangling = feed
            .sensors
            .iter()
            .find(|s| !feed.panels.iter().any(|p| p.panel_id == s.panel_id))
            .expect("demo should carry one dangling reference");
        assert_eq!(sensor_location_name(&feed.panels, &dangling.panel_id), "Unknown");
    }

    #[test]
    fn test_partial_feed_document_parses() {
        // Omitted sections default to empty rather than failing the load
        let feed: SiteFeed = serde_json::from_str(
            r#"{
                "panels": [{
                    "panel_id": "P-1",
                    "panel_name": "Entry",
                    "status": "good",
                    "position": {"x": 0.0, "y": 2.0, "z": -7.0}
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(feed.panels.len(), 1);
        assert!(feed.sensors.is_empty());
        assert!(feed.alerts.is_empty());
    }

    #[test]
    fn test_missing_feed_file_is_an_error() {
        assert!(load_feed(Path::new("/definitely/not/here.json")).is_err());
    }
}
