//! Live entity markers and their animation
//!
//! Panels render as a status-colored sphere with a flat pulsing ring;
//! sensors as a smaller sphere pulsing on a phase offset. Pings are
//! time-boxed expanding rings. All animation keys off one elapsed-time
//! sample per frame, so pulse speed is independent of frame rate, and none
//! of it touches the hit-test geometry in `MarkerSet`.

use bevy::prelude::*;

use trellis_core::telemetry::{
    build_markers, MarkerKind, PANEL_MARKER_RADIUS, PANEL_RING_RADIUS, PULSE_PERIOD_SECS,
    SENSOR_MARKER_RADIUS,
};

use crate::types::{MarkerSet, PingQueue, PingState, SiteData};

pub struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkerSet>()
            .init_resource::<PingQueue>()
            .init_resource::<PingState>()
            .add_systems(
                Update,
                (sync_markers, animate_markers, drain_ping_queue, animate_pings)
                    .chain()
                    .in_set(crate::ViewportSet::Markers),
            );
    }
}

/// Root entity of any live marker; everything with this tag is despawned on
/// a data refresh.
#[derive(Component)]
pub struct LiveMarker;

/// A panel's marker group root.
#[derive(Component)]
pub struct PanelMarker {
    pub panel_id: String,
}

/// The pulsing ring child of a panel marker.
#[derive(Component)]
pub struct PanelRing;

/// A sensor's marker sphere.
#[derive(Component)]
pub struct SensorMarker {
    pub sensor_id: String,
    pub phase: f32,
}

/// A time-boxed ping ring.
#[derive(Component)]
pub struct PingRing {
    pub panel_id: String,
}

/// Rebuild the marker set and its entities when the site data changes
/// identity. Markers with malformed positions were already dropped by
/// `build_markers`.
fn sync_markers(
    mut commands: Commands,
    site: Res<SiteData>,
    mut marker_set: ResMut<MarkerSet>,
    mut last_revision: Local<Option<u64>>,
    existing: Query<Entity, With<LiveMarker>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if *last_revision == Some(site.revision) {
        return;
    }
    *last_revision = Some(site.revision);

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    marker_set.markers = build_markers(&site.panels, &site.sensors);

    let panel_sphere = meshes.add(Sphere::new(PANEL_MARKER_RADIUS));
    let panel_ring = meshes.add(Torus::new(
        PANEL_RING_RADIUS - 0.04,
        PANEL_RING_RADIUS + 0.04,
    ));
    let sensor_sphere = meshes.add(Sphere::new(SENSOR_MARKER_RADIUS));

    for marker in &marker_set.markers {
        let color = Color::srgb(marker.color[0], marker.color[1], marker.color[2]);
        let glow = LinearRgba::new(
            marker.color[0] * 0.6,
            marker.color[1] * 0.6,
            marker.color[2] * 0.6,
            1.0,
        );
        match marker.kind {
            MarkerKind::Panel => {
                let sphere_material = materials.add(StandardMaterial {
                    base_color: color,
                    emissive: glow,
                    ..default()
                });
                let ring_material = materials.add(StandardMaterial {
                    base_color: color.with_alpha(0.45),
                    emissive: glow,
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                });
                commands
                    .spawn((
                        Transform::from_translation(marker.position),
                        Visibility::default(),
                        LiveMarker,
                        PanelMarker {
                            panel_id: marker.ref_id.clone(),
                        },
                    ))
                    .with_children(|parent| {
                        parent.spawn((
                            Mesh3d(panel_sphere.clone()),
                            MeshMaterial3d(sphere_material),
                            Transform::default(),
                        ));
                        parent.spawn((
                            Mesh3d(panel_ring.clone()),
                            MeshMaterial3d(ring_material),
                            Transform::default(),
                            PanelRing,
                        ));
                    });
            }
            MarkerKind::Sensor => {
                let material = materials.add(StandardMaterial {
                    base_color: color,
                    emissive: glow,
                    ..default()
                });
                commands.spawn((
                    Mesh3d(sensor_sphere.clone()),
                    MeshMaterial3d(material),
                    Transform::from_translation(marker.position),
                    LiveMarker,
                    SensorMarker {
                        sensor_id: marker.ref_id.clone(),
                        phase: marker.pulse_phase,
                    },
                ));
            }
        }
    }
}

/// Ambient pulse: ring scale and opacity for panels, sphere scale for
/// sensors on their per-index phase offset.
fn animate_markers(
    time: Res<Time>,
    mut rings: Query<
        (&mut Transform, &MeshMaterial3d<StandardMaterial>),
        (With<PanelRing>, Without<SensorMarker>),
    >,
    mut sensors: Query<(&mut Transform, &SensorMarker), Without<PanelRing>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let t = time.elapsed_secs();
    let omega = std::f32::consts::TAU / PULSE_PERIOD_SECS;

    for (mut transform, material_handle) in rings.iter_mut() {
        let wave = (t * omega).sin();
        transform.scale = Vec3::splat(1.0 + 0.22 * wave);
        if let Some(material) = materials.get_mut(&material_handle.0) {
            let alpha = 0.45 - 0.25 * wave;
            material.base_color = material.base_color.with_alpha(alpha);
        }
    }

    for (mut transform, sensor) in sensors.iter_mut() {
        let wave = (t * omega + sensor.phase).sin();
        transform.scale = Vec3::splat(1.0 + 0.15 * wave);
    }
}

/// Move queued ping requests into the tracker. Unknown panel ids are dropped
/// by the tracker itself.
fn drain_ping_queue(
    mut queue: ResMut<PingQueue>,
    mut pings: ResMut<PingState>,
    site: Res<SiteData>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for panel_id in queue.0.drain(..) {
        pings.0.request(&panel_id, &site.panels, now);
    }
}

/// Expanding-ring ping animation. Each active pulse owns one ring entity;
/// rings despawn themselves when their pulse expires, with no explicit
/// cancellation path.
fn animate_pings(
    mut commands: Commands,
    time: Res<Time>,
    mut pings: ResMut<PingState>,
    panel_query: Query<(&PanelMarker, &Transform), Without<PingRing>>,
    mut ring_query: Query<
        (Entity, &PingRing, &mut Transform, &MeshMaterial3d<StandardMaterial>),
        Without<PanelMarker>,
    >,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let now = time.elapsed_secs();
    pings.0.advance(now);

    // Grow, fade, or retire existing rings
    let mut ringed: Vec<String> = Vec::new();
    for (entity, ring, mut transform, material_handle) in ring_query.iter_mut() {
        match pings.0.progress(&ring.panel_id, now) {
            Some(progress) => {
                transform.scale = Vec3::splat(1.0 + 2.5 * progress);
                if let Some(material) = materials.get_mut(&material_handle.0) {
                    material.base_color =
                        material.base_color.with_alpha(0.8 * (1.0 - progress));
                }
                ringed.push(ring.panel_id.clone());
            }
            None => commands.entity(entity).despawn(),
        }
    }

    // Spawn rings for pulses that do not have one yet
    for (panel_id, _) in pings.0.active_pulses(now) {
        if ringed.iter().any(|id| id == panel_id) {
            continue;
        }
        let Some((_, panel_transform)) = panel_query
            .iter()
            .find(|(marker, _)| marker.panel_id == panel_id)
        else {
            continue;
        };
        let material = materials.add(StandardMaterial {
            base_color: Color::srgba(0.30, 0.75, 0.95, 0.8),
            emissive: LinearRgba::new(0.2, 0.5, 0.7, 1.0),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(Torus::new(
                PANEL_RING_RADIUS + 0.06,
                PANEL_RING_RADIUS + 0.14,
            ))),
            MeshMaterial3d(material),
            Transform::from_translation(panel_transform.translation),
            LiveMarker,
            PingRing {
                panel_id: panel_id.to_string(),
            },
        ));
    }
}
