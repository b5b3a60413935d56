//! Scene setup and the viewport controller systems
//!
//! One render tick runs, in order: pointer input and selection resolution,
//! hover ray-cast, camera update (manual orbit or auto-rotation), then the
//! marker and overlay systems registered by the sibling plugins. All pointer
//! handling goes through the `InteractionState` owned by `ViewState`.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use trellis_core::generator::pick_member;
use trellis_core::telemetry::{pick_marker, MarkerKind};
use trellis_core::{HealthStatus, PointerRelease, Ray};

use crate::types::{BuildingModel, MarkerSet, ViewState, WorldSettings};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewState>()
            .init_resource::<WorldSettings>()
            .init_resource::<ClickIntent>()
            .init_resource::<TintState>()
            .init_resource::<ActiveTouch>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    pointer_input,
                    touch_input,
                    resolve_selection,
                    update_hover,
                    handle_deselection,
                    update_camera,
                    apply_member_tints,
                    update_world_visibility,
                )
                    .chain()
                    .in_set(crate::ViewportSet::Controller),
            );
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker for grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker for the world axis lines
#[derive(Component)]
pub struct WorldAxis;

/// A click position waiting to be resolved against the scene.
#[derive(Resource, Default)]
pub struct ClickIntent(pub Option<Vec2>);

/// Which members currently carry an emissive tint, so tints are only
/// rewritten when the interaction state changes.
#[derive(Resource, Default)]
struct TintState {
    hovered: Option<String>,
    selected: Option<String>,
}

/// Neutral emissive tint applied to the hovered member.
const HOVERED_EMISSIVE: LinearRgba = LinearRgba::new(0.16, 0.17, 0.19, 1.0);

/// Emissive tint for the selected member, keyed by its health status.
fn selected_emissive(health: HealthStatus) -> LinearRgba {
    match health {
        HealthStatus::Good => LinearRgba::new(0.55, 0.36, 0.06, 1.0),
        HealthStatus::Warning => LinearRgba::new(0.62, 0.25, 0.02, 1.0),
        HealthStatus::Critical => LinearRgba::new(0.62, 0.10, 0.10, 1.0),
    }
}

/// Touch gesture bookkeeping: the press anchor lives in `InteractionState`;
/// this only remembers which touch id is driving it.
#[derive(Resource, Default)]
struct ActiveTouch(Option<u64>);

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    view_state: Res<ViewState>,
    world_settings: Res<WorldSettings>,
) {
    // Camera, placed from the rig so the transform and the rig never
    // disagree about the starting view
    let rig = &view_state.rig;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.05,
            far: 500.0,
            ..default()
        }),
        Transform::from_translation(rig.eye()).looking_at(rig.target, Vec3::Y),
        MainCamera,
    ));

    // Soft sky ambient plus a sun with shadows and a warm fill
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.85, 0.9, 1.0),
        brightness: 250.0,
        ..default()
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 6500.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(18.0, 30.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            intensity: 600_000.0,
            color: Color::srgb(1.0, 0.95, 0.85),
            shadows_enabled: false,
            range: 80.0,
            ..default()
        },
        Transform::from_xyz(-14.0, 12.0, -10.0),
    ));

    // Ground grid on the X-Z plane
    let spacing = world_settings.grid_spacing;
    let lines = world_settings.grid_lines;
    let extent = lines as f32 * spacing;
    let thickness = 0.02;
    let grid_visibility = if world_settings.show_grid {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.4, 0.42, 0.45, 0.5),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let line_mesh_x = meshes.add(Cuboid::new(extent * 2.0, thickness, thickness));
    let line_mesh_z = meshes.add(Cuboid::new(thickness, thickness, extent * 2.0));

    for i in -lines..=lines {
        let offset = i as f32 * spacing;
        commands.spawn((
            Mesh3d(line_mesh_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(0.0, 0.0, offset)),
            GridLine,
            grid_visibility,
        ));
        commands.spawn((
            Mesh3d(line_mesh_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(offset, 0.0, 0.0)),
            GridLine,
            grid_visibility,
        ));
    }

    // World axes at the origin
    let axis_visibility = if world_settings.show_axes {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    let axis_length = 2.0;
    let axis_thickness = 0.04;
    let axis_specs = [
        (Vec3::X, Color::srgb(0.85, 0.25, 0.25)),
        (Vec3::Y, Color::srgb(0.25, 0.85, 0.25)),
        (Vec3::Z, Color::srgb(0.25, 0.35, 0.9)),
    ];
    for (dir, color) in axis_specs {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        });
        let rotation = Quat::from_rotation_arc(Vec3::Y, dir);
        commands.spawn((
            Mesh3d(meshes.add(Cylinder::new(axis_thickness, axis_length))),
            MeshMaterial3d(material),
            Transform::from_translation(dir * axis_length / 2.0).with_rotation(rotation),
            WorldAxis,
            axis_visibility,
        ));
    }
}

/// Mouse input: press/drag/release through the interaction state machine,
/// orbit deltas to the camera rig, wheel zoom.
fn pointer_input(
    mut view_state: ResMut<ViewState>,
    mut click_intent: ResMut<ClickIntent>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    windows: Query<&Window>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    let mut total_scroll = 0.0;
    for scroll in mouse_wheel.read() {
        total_scroll += scroll.y;
    }

    if egui_wants_pointer {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        if let Some(pos) = cursor {
            view_state.interaction.pointer_pressed(pos);
        }
    }

    if mouse_button.pressed(MouseButton::Left) {
        if let Some(pos) = cursor {
            let dragging = view_state.interaction.pointer_moved(pos);
            if dragging && total_motion != Vec2::ZERO {
                view_state.rig.orbit(total_motion);
            }
        }
    }

    if mouse_button.just_released(MouseButton::Left) {
        if let Some(pos) = cursor {
            if let PointerRelease::Click(at) = view_state.interaction.pointer_released(pos) {
                click_intent.0 = Some(at);
            }
        }
    }

    if total_scroll != 0.0 {
        view_state.rig.zoom_scroll(total_scroll);
    }
}

/// Single-finger touch: drag orbits, a short tap selects, through the same
/// state machine and threshold as the mouse path.
fn touch_input(
    mut view_state: ResMut<ViewState>,
    mut click_intent: ResMut<ClickIntent>,
    touch_input: Res<Touches>,
    mut active: ResMut<ActiveTouch>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    for touch in touch_input.iter() {
        if touch_input.just_pressed(touch.id()) && active.0.is_none() {
            active.0 = Some(touch.id());
            view_state.interaction.pointer_pressed(touch.position());
        }
    }

    let Some(touch_id) = active.0 else {
        return;
    };

    if let Some(touch) = touch_input.iter().find(|t| t.id() == touch_id) {
        let dragging = view_state.interaction.pointer_moved(touch.position());
        if dragging && touch.delta() != Vec2::ZERO {
            view_state.rig.orbit(touch.delta());
        }
        if touch_input.just_released(touch_id) {
            if let PointerRelease::Click(at) =
                view_state.interaction.pointer_released(touch.position())
            {
                click_intent.0 = Some(at);
            }
            active.0 = None;
        }
    } else {
        // Touch vanished without a release event
        view_state.interaction.pointer_released(Vec2::ZERO);
        active.0 = None;
    }
}

/// Resolve a pending click: entity markers first, structural members second.
/// The ordering is deliberate; markers sit in front of structural selection.
fn resolve_selection(
    mut click_intent: ResMut<ClickIntent>,
    mut view_state: ResMut<ViewState>,
    model: Res<BuildingModel>,
    marker_set: Res<MarkerSet>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) {
    let Some(position) = click_intent.0.take() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(view_ray) = camera.viewport_to_world(camera_transform, position) else {
        return;
    };
    let ray = Ray::new(view_ray.origin, *view_ray.direction);

    if let Some(marker) = pick_marker(&ray, &marker_set.markers) {
        match marker.kind {
            MarkerKind::Panel => view_state.interaction.select_panel(&marker.ref_id),
            MarkerKind::Sensor => view_state.interaction.select_sensor(&marker.ref_id),
        }
        return;
    }

    if let Some((id, _)) = pick_member(&ray, &model.hit_volumes) {
        let id = id.to_string();
        view_state.interaction.select_member(&id);
    }
    // A miss is a normal outcome and leaves the selection untouched
}

/// Hover ray-cast against structural members only, skipped while dragging.
fn update_hover(
    mut view_state: ResMut<ViewState>,
    model: Res<BuildingModel>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    windows: Query<&Window>,
    mut contexts: bevy_egui::EguiContexts,
) {
    if view_state.interaction.dragging {
        return;
    }
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        view_state.interaction.set_hover(None);
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        view_state.interaction.set_hover(None);
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(view_ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let ray = Ray::new(view_ray.origin, *view_ray.direction);
    let hit = pick_member(&ray, &model.hit_volumes).map(|(id, _)| id.to_string());
    view_state.interaction.set_hover(hit.as_deref());
}

/// Escape clears the current selection.
fn handle_deselection(mut view_state: ResMut<ViewState>, keyboard: Res<ButtonInput<KeyCode>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        view_state.interaction.clear_selection();
    }
}

/// Advance auto-rotation and write the rig to the camera transform.
fn update_camera(
    mut view_state: ResMut<ViewState>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    if view_state.interaction.auto_rotate && !view_state.interaction.dragging {
        view_state.rig.auto_rotate();
    }

    if let Ok(mut transform) = camera_query.single_mut() {
        let target = view_state.rig.target;
        transform.translation = view_state.rig.eye();
        transform.look_at(target, Vec3::Y);
    }
}

/// Keep member emissive tints in sync with the interaction state. At most
/// one member carries the selected tint and one the hover tint; the selected
/// tint always wins on the same member.
fn apply_member_tints(
    view_state: Res<ViewState>,
    model: Res<BuildingModel>,
    mut tints: ResMut<TintState>,
    members: Query<(&crate::structure::MemberRef, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let desired_selected = view_state.interaction.selected_member.clone();
    let desired_hovered = view_state.interaction.hovered_member.clone();
    if tints.selected == desired_selected && tints.hovered == desired_hovered {
        return;
    }

    for (member, material_handle) in members.iter() {
        let emissive = if desired_selected.as_deref() == Some(member.id.as_str()) {
            let health = model
                .structure
                .member(&member.id)
                .map(|m| m.health_status)
                .unwrap_or_default();
            selected_emissive(health)
        } else if desired_hovered.as_deref() == Some(member.id.as_str()) {
            HOVERED_EMISSIVE
        } else if tints.selected.as_deref() == Some(member.id.as_str())
            || tints.hovered.as_deref() == Some(member.id.as_str())
        {
            LinearRgba::BLACK
        } else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material_handle.0) {
            material.emissive = emissive;
        }
    }

    tints.selected = desired_selected;
    tints.hovered = desired_hovered;
}

/// Toggle grid and axis visibility when the settings change.
fn update_world_visibility(
    world_settings: Res<WorldSettings>,
    mut grid_query: Query<&mut Visibility, (With<GridLine>, Without<WorldAxis>)>,
    mut axis_query: Query<&mut Visibility, With<WorldAxis>>,
) {
    if !world_settings.is_changed() {
        return;
    }

    let grid_visibility = if world_settings.show_grid {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut visibility in grid_query.iter_mut() {
        *visibility = grid_visibility;
    }

    let axis_visibility = if world_settings.show_axes {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut visibility in axis_query.iter_mut() {
        *visibility = axis_visibility;
    }
}
