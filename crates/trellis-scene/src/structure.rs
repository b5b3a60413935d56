//! Structure realization
//!
//! Turns the generator's placement records into meshes. Render entities
//! carry only a member-id back-reference; all member metadata stays in the
//! registry owned by `BuildingModel`.

use bevy::prelude::*;
use tracing::info;

use trellis_core::generator::{PlacementRole, PrimitiveShape};
use trellis_core::MemberKind;

use crate::types::BuildingModel;

pub struct StructurePlugin;

impl Plugin for StructurePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, realize_structure);
    }
}

/// Back-reference from a rendered member entity into the registry.
#[derive(Component)]
pub struct MemberRef {
    pub id: String,
}

/// Tag for decorative (non-selectable) geometry.
#[derive(Component)]
pub struct DecorMesh;

/// Spawn one mesh entity per placement record.
///
/// Selectable members get an individual material instance so hover and
/// selection tints can be applied per member; decorative placements share
/// one material per kind.
fn realize_structure(
    mut commands: Commands,
    model: Res<BuildingModel>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut decor_materials: std::collections::HashMap<MemberKind, Handle<StandardMaterial>> =
        std::collections::HashMap::new();

    let mut member_count = 0usize;
    let mut decor_count = 0usize;

    for placement in &model.structure.placements {
        let mesh = match &placement.shape {
            PrimitiveShape::Box { size } => meshes.add(Cuboid::new(size.x, size.y, size.z)),
            PrimitiveShape::Cylinder { radius, length } => {
                meshes.add(Cylinder::new(*radius, *length))
            }
        };
        let transform = Transform::from_translation(placement.translation)
            .with_rotation(placement.rotation);

        match &placement.role {
            PlacementRole::Member { id } => {
                let kind = model
                    .structure
                    .member(id)
                    .map(|m| m.kind)
                    .unwrap_or(MemberKind::Stud);
                let material = materials.add(kind_material(kind));
                commands.spawn((
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    transform,
                    MemberRef { id: id.clone() },
                ));
                member_count += 1;
            }
            PlacementRole::Decorative { kind } => {
                let material = decor_materials
                    .entry(*kind)
                    .or_insert_with(|| materials.add(kind_material(*kind)))
                    .clone();
                commands.spawn((Mesh3d(mesh), MeshMaterial3d(material), transform, DecorMesh));
                decor_count += 1;
            }
        }
    }

    info!(
        members = member_count,
        decorative = decor_count,
        "realized structure"
    );
}

/// Base material per member kind.
fn kind_material(kind: MemberKind) -> StandardMaterial {
    let (color, metallic, roughness) = match kind {
        MemberKind::Column | MemberKind::RidgeBeam => (Color::srgb(0.42, 0.31, 0.20), 0.0, 0.85),
        MemberKind::Plate | MemberKind::Header | MemberKind::ChordTie => {
            (Color::srgb(0.55, 0.42, 0.28), 0.0, 0.85)
        }
        MemberKind::Rafter | MemberKind::Purlin => (Color::srgb(0.60, 0.45, 0.30), 0.0, 0.8),
        MemberKind::Stud
        | MemberKind::Trimmer
        | MemberKind::JackStud
        | MemberKind::Sill
        | MemberKind::Girt => (Color::srgb(0.70, 0.58, 0.42), 0.0, 0.9),
        MemberKind::Bracing | MemberKind::WebStrut | MemberKind::KingPost => {
            (Color::srgb(0.52, 0.55, 0.60), 0.7, 0.45)
        }
        MemberKind::Trim => (Color::srgb(0.88, 0.88, 0.85), 0.0, 0.7),
        MemberKind::Gutter => (Color::srgb(0.35, 0.37, 0.40), 0.8, 0.5),
        MemberKind::Cladding => {
            return StandardMaterial {
                base_color: Color::srgba(0.72, 0.76, 0.80, 0.35),
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: 0.6,
                ..default()
            }
        }
    };
    StandardMaterial {
        base_color: color,
        metallic,
        perceptual_roughness: roughness,
        ..default()
    }
}
