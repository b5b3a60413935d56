//! UI overlays using bevy_egui
//!
//! Side panels for the current selection, site status, view controls, and
//! alert tooltips anchored at the projected overlay positions. The "ping"
//! and "reboot" actions are simulated UI feedback only: each one is
//! time-boxed state with a scheduled expiry, and actions on different
//! targets never block one another.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use trellis_core::telemetry::{
    panel_for_sensor, sensor_location_name, sensors_for_panel, AlertSeverity, Panel, PanelStatus,
    Sensor, SensorStatus,
};
use trellis_core::{HealthStatus, SelectedEntity, StructuralMember};
use trellis_scene::{AlertAnchors, BuildingModel, PingQueue, SiteData, ViewState, WorldSettings};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SensorActions>()
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// One simulated action's transient feedback line.
#[derive(Debug, Clone)]
struct PendingAction {
    label: String,
    until: f32,
}

/// Transient per-sensor action feedback ("reboot sent", "ping sent").
/// Entries expire on their own; actions on different sensors are
/// independent.
#[derive(Resource, Default)]
pub struct SensorActions {
    pending: HashMap<String, PendingAction>,
}

impl SensorActions {
    fn begin(&mut self, sensor_id: &str, label: String, now: f32) {
        self.pending.insert(
            sensor_id.to_string(),
            PendingAction {
                label,
                until: now + 2.0,
            },
        );
    }

    fn current(&mut self, sensor_id: &str, now: f32) -> Option<&str> {
        self.pending.retain(|_, action| action.until > now);
        self.pending.get(sensor_id).map(|a| a.label.as_str())
    }
}

fn severity_color(severity: AlertSeverity) -> egui::Color32 {
    match severity {
        AlertSeverity::Low => egui::Color32::from_rgb(120, 150, 190),
        AlertSeverity::Medium => egui::Color32::from_rgb(230, 190, 60),
        AlertSeverity::High => egui::Color32::from_rgb(240, 140, 40),
        AlertSeverity::Critical => egui::Color32::from_rgb(220, 60, 70),
    }
}

fn health_color(health: HealthStatus) -> egui::Color32 {
    match health {
        HealthStatus::Good => egui::Color32::from_rgb(70, 200, 110),
        HealthStatus::Warning => egui::Color32::from_rgb(230, 190, 60),
        HealthStatus::Critical => egui::Color32::from_rgb(220, 60, 70),
    }
}

fn panel_status_color(status: PanelStatus) -> egui::Color32 {
    let [r, g, b] = status.color();
    egui::Color32::from_rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn sensor_status_color(status: SensorStatus) -> egui::Color32 {
    let [r, g, b] = status.color();
    egui::Color32::from_rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

#[allow(clippy::too_many_arguments)]
fn ui_system(
    mut contexts: EguiContexts,
    site: Res<SiteData>,
    model: Res<BuildingModel>,
    mut view_state: ResMut<ViewState>,
    mut world_settings: ResMut<WorldSettings>,
    mut ping_queue: ResMut<PingQueue>,
    anchors: Res<AlertAnchors>,
    mut actions: ResMut<SensorActions>,
    time: Res<Time>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let now = time.elapsed_secs();

    egui::SidePanel::left("site_panel")
        .default_width(270.0)
        .show(ctx, |ui| {
            ui.heading("Trellis");
            ui.label("Structural health twin");
            ui.separator();

            site_summary(ui, &site);
            ui.separator();

            ui.label(egui::RichText::new("View").strong());
            ui.horizontal(|ui| {
                if ui.button("Zoom in").clicked() {
                    view_state.rig.zoom_in();
                }
                if ui.button("Zoom out").clicked() {
                    view_state.rig.zoom_out();
                }
                if ui.button("Reset view").clicked() {
                    view_state.rig.reset();
                    view_state.interaction.reset_view();
                }
            });
            ui.checkbox(&mut world_settings.show_grid, "Show grid");
            ui.checkbox(&mut world_settings.show_axes, "Show axes");

            let spherical = view_state.rig.spherical();
            ui.label(format!(
                "Camera: r {:.1} m, az {:.0}°, el {:.0}°",
                spherical.radius,
                spherical.azimuth.to_degrees().rem_euclid(360.0),
                spherical.elevation.to_degrees()
            ));
            ui.separator();

            ui.label(egui::RichText::new("Alerts").strong());
            if site.alerts.is_empty() {
                ui.label("No active alerts");
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for alert in &site.alerts {
                    ui.horizontal(|ui| {
                        ui.colored_label(severity_color(alert.severity), "●");
                        ui.label(format!("{} — {}", alert.title, alert.location_name));
                    });
                }
            });
        });

    egui::SidePanel::right("detail_panel")
        .default_width(320.0)
        .show(ctx, |ui| match selection(&view_state) {
            Selection::Member(id) => match model.structure.member(&id) {
                Some(member) => member_properties(ui, member),
                None => {
                    ui.label("Selection no longer exists");
                }
            },
            Selection::Panel(id) => {
                panel_detail(ui, &site, &id, &mut ping_queue, &mut view_state)
            }
            Selection::Sensor(id) => sensor_detail(
                ui,
                &site,
                &id,
                &mut ping_queue,
                &mut view_state,
                &mut actions,
                now,
            ),
            Selection::None => {
                ui.heading("Nothing selected");
                ui.label("Click a structural member or a live marker.");
                ui.label("Drag to orbit, scroll to zoom, Esc to deselect.");
            }
        });

    alert_tooltips(ctx, &site, &anchors);
}

/// A cloned-out view of the current selection, so panel closures can borrow
/// `ViewState` mutably.
enum Selection {
    None,
    Member(String),
    Panel(String),
    Sensor(String),
}

fn selection(view_state: &ViewState) -> Selection {
    if let Some(id) = &view_state.interaction.selected_member {
        return Selection::Member(id.clone());
    }
    match &view_state.interaction.selected_entity {
        SelectedEntity::Panel(id) => Selection::Panel(id.clone()),
        SelectedEntity::Sensor(id) => Selection::Sensor(id.clone()),
        SelectedEntity::None => Selection::None,
    }
}

fn site_summary(ui: &mut egui::Ui, site: &SiteData) {
    let panels_ok = site
        .panels
        .iter()
        .filter(|p| p.status == PanelStatus::Good)
        .count();
    let panels_down = site
        .panels
        .iter()
        .filter(|p| matches!(p.status, PanelStatus::Critical | PanelStatus::Offline))
        .count();
    let sensors_online = site
        .sensors
        .iter()
        .filter(|s| s.status == SensorStatus::Online)
        .count();

    ui.label(format!(
        "Panels: {} ({} good, {} down)",
        site.panels.len(),
        panels_ok,
        panels_down
    ));
    ui.label(format!(
        "Sensors: {} ({} online)",
        site.sensors.len(),
        sensors_online
    ));
    ui.label(format!("Active alerts: {}", site.alerts.len()));
}

fn member_properties(ui: &mut egui::Ui, member: &StructuralMember) {
    ui.heading(member.kind.display_name());
    ui.monospace(&member.id);
    ui.separator();

    egui::Grid::new("member_props").num_columns(2).show(ui, |ui| {
        ui.label("Material");
        ui.label(&member.material_name);
        ui.end_row();

        ui.label("Dimensions");
        ui.label(&member.dimensions_label);
        ui.end_row();

        ui.label("Weight");
        ui.label(&member.weight_label);
        ui.end_row();

        ui.label("Load rating");
        ui.label(&member.load_rating_label);
        ui.end_row();

        ui.label("Health");
        ui.colored_label(
            health_color(member.health_status),
            format!("{:?}", member.health_status),
        );
        ui.end_row();

        ui.label("Position");
        ui.label(format!(
            "{:.2}, {:.2}, {:.2}",
            member.position_world.x, member.position_world.y, member.position_world.z
        ));
        ui.end_row();

        ui.label("Sensors attached");
        ui.label(member.sensors_attached.to_string());
        ui.end_row();

        ui.label("Installed");
        ui.label(member.install_date.to_string());
        ui.end_row();

        ui.label("Last inspection");
        ui.label(member.last_inspection.to_string());
        ui.end_row();
    });

    ui.separator();
    ui.label(egui::RichText::new("Live readings").strong());
    for reading in &member.live_readings {
        ui.horizontal(|ui| {
            ui.label(&reading.label);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.monospace(&reading.value);
            });
        });
    }
}

fn panel_detail(
    ui: &mut egui::Ui,
    site: &SiteData,
    panel_id: &str,
    ping_queue: &mut PingQueue,
    view_state: &mut ViewState,
) {
    let Some(panel) = site.panels.iter().find(|p| p.panel_id == panel_id) else {
        ui.label("Panel is no longer in the feed");
        return;
    };

    ui.heading(&panel.panel_name);
    ui.monospace(&panel.panel_id);
    ui.horizontal(|ui| {
        ui.label("Status:");
        ui.colored_label(panel_status_color(panel.status), format!("{:?}", panel.status));
    });
    if ui.button("Ping panel").clicked() {
        ping_queue.0.push(panel.panel_id.clone());
    }
    ui.separator();

    ui.label(egui::RichText::new("Sensors").strong());
    let attached: Vec<&Sensor> = sensors_for_panel(&site.sensors, panel_id);
    if attached.is_empty() {
        ui.label("No sensors attached");
    }
    for sensor in attached {
        ui.horizontal(|ui| {
            ui.colored_label(sensor_status_color(sensor.status), "●");
            ui.label(format!(
                "{} {} — {:.1} {} ({}%)",
                sensor.sensor_id,
                sensor.sensor_type.display_name(),
                sensor.last_reading,
                sensor.reading_unit,
                sensor.battery_level
            ));
            if ui.small_button("View").clicked() {
                view_state.interaction.select_sensor(&sensor.sensor_id);
            }
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn sensor_detail(
    ui: &mut egui::Ui,
    site: &SiteData,
    sensor_id: &str,
    ping_queue: &mut PingQueue,
    view_state: &mut ViewState,
    actions: &mut SensorActions,
    now: f32,
) {
    let Some(sensor) = site.sensors.iter().find(|s| s.sensor_id == sensor_id) else {
        ui.label("Sensor is no longer in the feed");
        return;
    };

    ui.heading(format!("{} sensor", sensor.sensor_type.display_name()));
    ui.monospace(&sensor.sensor_id);
    ui.horizontal(|ui| {
        ui.label("Status:");
        ui.colored_label(sensor_status_color(sensor.status), format!("{:?}", sensor.status));
    });

    egui::Grid::new("sensor_props").num_columns(2).show(ui, |ui| {
        ui.label("Last reading");
        ui.monospace(format!("{:.1} {}", sensor.last_reading, sensor.reading_unit));
        ui.end_row();

        ui.label("Battery");
        ui.label(format!("{}%", sensor.battery_level));
        ui.end_row();

        ui.label("Location");
        ui.label(sensor_location_name(&site.panels, &sensor.panel_id));
        ui.end_row();
    });

    let owning_panel: Option<&Panel> = panel_for_sensor(&site.panels, &sensor.panel_id);
    ui.separator();
    ui.horizontal(|ui| {
        if let Some(panel) = owning_panel {
            if ui.button("Ping panel").clicked() {
                ping_queue.0.push(panel.panel_id.clone());
                actions.begin(&sensor.sensor_id, "Ping sent".to_string(), now);
            }
            if ui.small_button("Open panel").clicked() {
                view_state.interaction.select_panel(&panel.panel_id);
            }
        }
        if ui.button("Reboot sensor").clicked() {
            actions.begin(
                &sensor.sensor_id,
                format!("Reboot command sent to {}", sensor.sensor_id),
                now,
            );
        }
    });
    if let Some(message) = actions.current(&sensor.sensor_id, now) {
        ui.colored_label(egui::Color32::from_rgb(120, 180, 240), message);
    }
}

/// Tooltips anchored at the projected alert positions. Anchors behind the
/// camera were flagged not visible and are skipped entirely, so they cannot
/// intercept pointer events.
fn alert_tooltips(ctx: &egui::Context, site: &SiteData, anchors: &AlertAnchors) {
    for anchored in &anchors.0 {
        if !anchored.anchor.visible {
            continue;
        }
        let Some(alert) = site.alerts.iter().find(|a| a.id == anchored.alert_id) else {
            continue;
        };
        egui::Area::new(egui::Id::new(("alert_tooltip", &anchored.alert_id)))
            .fixed_pos(egui::pos2(
                anchored.anchor.position.x + 10.0,
                anchored.anchor.position.y - 10.0,
            ))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(severity_color(alert.severity), "▲");
                        ui.label(
                            egui::RichText::new(&alert.title).small().strong(),
                        );
                    });
                    ui.label(
                        egui::RichText::new(format!("{} {:.1}", alert.metric, alert.value))
                            .small(),
                    );
                });
            });
    }
}
