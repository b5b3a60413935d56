//! Bevy application setup

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use trellis_core::{generate, InteractionState};
use trellis_scene::{BuildingModel, SiteData, TrellisScenePlugin, ViewState};

use crate::config::ViewerConfig;
use crate::feed::SiteFeed;
use crate::ui::UiPlugin;

/// Generate the building and run the 3D viewer until the window closes.
///
/// Window, render context, and input listeners are all owned by the bevy
/// `App`; dropping it on exit tears the whole mount down together.
pub fn run_viewer(config: ViewerConfig, feed: SiteFeed) -> Result<()> {
    let structure =
        generate(&config.building).context("generating structure from building parameters")?;
    tracing::info!(
        members = structure.registry.len(),
        placements = structure.placements.len(),
        "generated building"
    );

    let target = glam::Vec3::new(0.0, config.building.eave_height / 2.0, 0.0);
    let rig = config.camera.rig(target);

    let mut site = SiteData::default();
    site.replace(feed.panels, feed.sensors, feed.alerts);

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.09, 0.10, 0.13)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Trellis — Structural Health Twin".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .insert_resource(BuildingModel::new(structure))
        .insert_resource(site)
        .insert_resource(ViewState {
            interaction: InteractionState::new(),
            rig,
        })
        .add_plugins(TrellisScenePlugin)
        .add_plugins(UiPlugin)
        .run();

    Ok(())
}
