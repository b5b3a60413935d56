//! Procedural structure generation
//!
//! `generate` turns a `BuildingParams` into a flat list of placement records
//! plus the registry of selectable members. No rendering API is touched
//! here: a placement is pure data (shape, transform, role), and the
//! realization step elsewhere turns records into meshes. Geometry, member
//! ids, kinds, and counts are fully determined by the parameters; only the
//! cosmetic metadata (readings, dates, health) draws from a random source.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use glam::{Quat, Vec3};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::geometry::{ray_obb_intersection, Obb, Ray};
use crate::member::{HealthStatus, LiveReading, MemberKind, StructuralMember};
use crate::params::{BuildingParams, ConfigurationError, Opening, WallSide};

// Section sizes, meters
const COLUMN_SECTION: f32 = 0.28;
const STUD_WIDTH: f32 = 0.12;
const STUD_DEPTH: f32 = 0.06;
const TRIMMER_WIDTH: f32 = 0.14;
const PLATE_HEIGHT: f32 = 0.10;
const PLATE_DEPTH: f32 = 0.16;
const GIRT_HEIGHT: f32 = 0.09;
const GIRT_DEPTH: f32 = 0.05;
const BRACE_WIDTH: f32 = 0.08;
const BRACE_DEPTH: f32 = 0.05;
const RAFTER_WIDTH: f32 = 0.08;
const RAFTER_DEPTH: f32 = 0.20;
const CHORD_WIDTH: f32 = 0.08;
const CHORD_HEIGHT: f32 = 0.16;
const KING_SECTION: f32 = 0.12;
const WEB_SECTION: f32 = 0.07;
const RIDGE_WIDTH: f32 = 0.12;
const RIDGE_HEIGHT: f32 = 0.24;
const PURLIN_SECTION: f32 = 0.09;
const HEADER_HEIGHT: f32 = 0.18;
const HEADER_DEPTH: f32 = 0.12;
const SILL_HEIGHT: f32 = 0.08;
const SILL_DEPTH: f32 = 0.14;
const CLADDING_THICKNESS: f32 = 0.03;
const TRIM_SECTION: f32 = 0.06;
const GUTTER_RADIUS: f32 = 0.07;

/// Coordinate tolerance when matching stud positions against grid lines and
/// opening boundaries.
const COORD_EPS: f32 = 0.02;

/// A renderable primitive. Boxes keep their long axis on local Z when placed
/// via [`beam_between`]; cylinders run along local Y.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveShape {
    Box { size: Vec3 },
    Cylinder { radius: f32, length: f32 },
}

/// Whether a placement is selectable (and therefore in the registry) or
/// purely decorative.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementRole {
    Member { id: String },
    Decorative { kind: MemberKind },
}

/// One placed primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub shape: PrimitiveShape,
    pub translation: Vec3,
    pub rotation: Quat,
    pub role: PlacementRole,
}

/// Hit volume of one selectable member.
#[derive(Debug, Clone)]
pub struct MemberHitVolume {
    pub id: String,
    pub obb: Obb,
}

/// The generated scene: every placement in placement order, plus the
/// registry of selectable members keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub placements: Vec<Placement>,
    pub registry: Vec<StructuralMember>,
}

impl Structure {
    pub fn member(&self, id: &str) -> Option<&StructuralMember> {
        self.registry.iter().find(|m| m.id == id)
    }

    /// Hit volumes for all selectable placements, in placement order.
    pub fn hit_volumes(&self) -> Vec<MemberHitVolume> {
        self.placements
            .iter()
            .filter_map(|p| match &p.role {
                PlacementRole::Member { id } => Some(MemberHitVolume {
                    id: id.clone(),
                    obb: Obb {
                        center: p.translation,
                        half_extents: match &p.shape {
                            PrimitiveShape::Box { size } => *size / 2.0,
                            PrimitiveShape::Cylinder { radius, length } => {
                                Vec3::new(*radius, *length / 2.0, *radius)
                            }
                        },
                        rotation: p.rotation,
                    },
                }),
                PlacementRole::Decorative { .. } => None,
            })
            .collect()
    }
}

/// Nearest selectable member hit by `ray`, with the hit distance.
pub fn pick_member<'a>(ray: &Ray, volumes: &'a [MemberHitVolume]) -> Option<(&'a str, f32)> {
    let mut best: Option<(&str, f32)> = None;
    for volume in volumes {
        if let Some(t) = ray_obb_intersection(ray, &volume.obb) {
            if best.map(|(_, bt)| t < bt).unwrap_or(true) {
                best = Some((volume.id.as_str(), t));
            }
        }
    }
    best
}

/// Generate the building described by `params`.
///
/// Fails with a `ConfigurationError` on invalid parameters; no partial
/// structure is ever returned.
pub fn generate(params: &BuildingParams) -> Result<Structure, ConfigurationError> {
    params.validate()?;
    let mut builder = StructureBuilder::new(params);

    builder.place_columns();
    for wall in [WallSide::South, WallSide::North, WallSide::West, WallSide::East] {
        builder.place_wall(wall);
    }
    builder.place_bracing();
    builder.place_roof();
    builder.place_curved_wing();
    builder.place_cladding_and_trim();

    Ok(builder.finish())
}

/// Geometry of one perimeter wall: origin at the wall's floor-level
/// midpoint, `dir` along the running coordinate, `normal` facing outward.
struct WallFrame {
    dir: Vec3,
    normal: Vec3,
    origin: Vec3,
    length: f32,
    /// Bay pitch along this wall
    pitch: f32,
    /// Number of bays along this wall
    bays: u32,
}

impl WallFrame {
    fn point(&self, s: f32, y: f32) -> Vec3 {
        self.origin + self.dir * s + Vec3::Y * y
    }

    /// Rotation aligning a box whose long axis is X with the wall direction.
    fn axis_rotation(&self) -> Quat {
        if self.dir.x.abs() > 0.5 {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)
        }
    }

    /// True when `s` coincides with a bay grid line on this wall.
    fn on_grid_line(&self, s: f32) -> bool {
        let half = self.length / 2.0;
        (0..=self.bays).any(|j| (s - (-half + j as f32 * self.pitch)).abs() < COORD_EPS)
    }
}

struct StructureBuilder<'a> {
    params: &'a BuildingParams,
    bays_x: u32,
    bays_z: u32,
    pitch_x: f32,
    pitch_z: f32,
    placements: Vec<Placement>,
    registry: Vec<StructuralMember>,
    counters: HashMap<&'static str, u32>,
    rng: ThreadRng,
    today: NaiveDate,
}

impl<'a> StructureBuilder<'a> {
    fn new(params: &'a BuildingParams) -> Self {
        // Never zero bays: round to nearest, floor at one
        let bays_x = (params.length / params.bay_spacing).round().max(1.0) as u32;
        let bays_z = (params.width / params.bay_spacing).round().max(1.0) as u32;
        Self {
            params,
            bays_x,
            bays_z,
            pitch_x: params.length / bays_x as f32,
            pitch_z: params.width / bays_z as f32,
            placements: Vec::new(),
            registry: Vec::new(),
            counters: HashMap::new(),
            rng: rand::rng(),
            today: Utc::now().date_naive(),
        }
    }

    fn wall_frame(&self, side: WallSide) -> WallFrame {
        let (length, pitch, bays) = match side {
            WallSide::South | WallSide::North => (self.params.length, self.pitch_x, self.bays_x),
            WallSide::West | WallSide::East => (self.params.width, self.pitch_z, self.bays_z),
        };
        let half_w = self.params.width / 2.0;
        let half_l = self.params.length / 2.0;
        let (origin, dir, normal) = match side {
            WallSide::South => (Vec3::new(0.0, 0.0, -half_w), Vec3::X, -Vec3::Z),
            WallSide::North => (Vec3::new(0.0, 0.0, half_w), Vec3::X, Vec3::Z),
            WallSide::West => (Vec3::new(-half_l, 0.0, 0.0), Vec3::Z, -Vec3::X),
            WallSide::East => (Vec3::new(half_l, 0.0, 0.0), Vec3::Z, Vec3::X),
        };
        WallFrame {
            dir,
            normal,
            origin,
            length,
            pitch,
            bays,
        }
    }

    // ---- member / decor emission ------------------------------------------

    fn next_id(&mut self, kind: MemberKind) -> String {
        let counter = self.counters.entry(kind.id_prefix()).or_insert(0);
        *counter += 1;
        format!("{}-{:03}", kind.id_prefix(), counter)
    }

    fn push_member(
        &mut self,
        kind: MemberKind,
        shape: PrimitiveShape,
        translation: Vec3,
        rotation: Quat,
    ) {
        let id = self.next_id(kind);
        let member = self.describe(&id, kind, &shape, translation, rotation);
        self.registry.push(member);
        self.placements.push(Placement {
            shape,
            translation,
            rotation,
            role: PlacementRole::Member { id },
        });
    }

    fn push_decor(
        &mut self,
        kind: MemberKind,
        shape: PrimitiveShape,
        translation: Vec3,
        rotation: Quat,
    ) {
        self.placements.push(Placement {
            shape,
            translation,
            rotation,
            role: PlacementRole::Decorative { kind },
        });
    }

    /// Fill in the display metadata for a member. Everything here is
    /// cosmetic; the geometry above never consults the random source.
    fn describe(
        &mut self,
        id: &str,
        kind: MemberKind,
        shape: &PrimitiveShape,
        translation: Vec3,
        rotation: Quat,
    ) -> StructuralMember {
        let (dimensions_label, volume) = match shape {
            PrimitiveShape::Box { size } => (
                format!("{:.2} × {:.2} × {:.2} m", size.x, size.y, size.z),
                size.x * size.y * size.z,
            ),
            PrimitiveShape::Cylinder { radius, length } => (
                format!("Ø{:.2} × {:.2} m", radius * 2.0, length),
                std::f32::consts::PI * radius * radius * length,
            ),
        };
        let weight_kg = volume * kind.density();
        let weight_label = if weight_kg >= 10.0 {
            format!("{:.0} kg", weight_kg)
        } else {
            format!("{:.1} kg", weight_kg)
        };

        let health_roll: f32 = self.rng.random();
        let health_status = if health_roll < 0.92 {
            HealthStatus::Good
        } else if health_roll < 0.985 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        };

        let install_date = self.today - Duration::days(self.rng.random_range(900..4000));
        let last_inspection = self.today - Duration::days(self.rng.random_range(14..360));

        StructuralMember {
            id: id.to_string(),
            kind,
            material_name: kind.material_name().to_string(),
            position_world: translation,
            rotation,
            dimensions_label,
            weight_label,
            load_rating_label: load_rating(kind),
            health_status,
            sensors_attached: self.rng.random_range(0..3),
            last_inspection,
            install_date,
            live_readings: self.live_readings(kind),
        }
    }

    fn live_readings(&mut self, kind: MemberKind) -> Vec<LiveReading> {
        let mut readings = Vec::with_capacity(3);
        let strain: f32 = self.rng.random_range(40.0..220.0);
        readings.push(LiveReading {
            label: "Strain".to_string(),
            value: format!("{:.0} µε", strain),
        });
        match kind.material_name() {
            "Steel S355" | "Galvanized steel" => {
                let vib: f32 = self.rng.random_range(0.2..2.8);
                readings.push(LiveReading {
                    label: "Vibration".to_string(),
                    value: format!("{:.1} mm/s", vib),
                });
            }
            _ => {
                let moisture: f32 = self.rng.random_range(8.0..19.0);
                readings.push(LiveReading {
                    label: "Moisture".to_string(),
                    value: format!("{:.1} %", moisture),
                });
            }
        }
        let temp: f32 = self.rng.random_range(11.0..29.0);
        readings.push(LiveReading {
            label: "Temperature".to_string(),
            value: format!("{:.1} °C", temp),
        });
        readings
    }

    // ---- primary frame ----------------------------------------------------

    /// Columns at every perimeter grid intersection.
    fn place_columns(&mut self) {
        let eave = self.params.eave_height;
        let half_l = self.params.length / 2.0;
        let half_w = self.params.width / 2.0;
        for j in 0..=self.bays_z {
            for i in 0..=self.bays_x {
                let interior = i > 0 && i < self.bays_x && j > 0 && j < self.bays_z;
                if interior {
                    continue;
                }
                let x = -half_l + i as f32 * self.pitch_x;
                let z = -half_w + j as f32 * self.pitch_z;
                self.push_member(
                    MemberKind::Column,
                    PrimitiveShape::Box {
                        size: Vec3::new(COLUMN_SECTION, eave, COLUMN_SECTION),
                    },
                    Vec3::new(x, eave / 2.0, z),
                    Quat::IDENTITY,
                );
            }
        }
    }

    /// Plates, girts, studs, and opening framing for one wall.
    fn place_wall(&mut self, side: WallSide) {
        let wall = self.wall_frame(side);
        let eave = self.params.eave_height;
        let half = wall.length / 2.0;
        let rotation = wall.axis_rotation();

        // Top and bottom plates plus a mid-height girt row, one per bay
        // segment
        for j in 0..wall.bays {
            let s0 = -half + j as f32 * wall.pitch;
            let mid = s0 + wall.pitch / 2.0;
            for y in [PLATE_HEIGHT / 2.0, eave - PLATE_HEIGHT / 2.0] {
                self.push_member(
                    MemberKind::Plate,
                    PrimitiveShape::Box {
                        size: Vec3::new(wall.pitch, PLATE_HEIGHT, PLATE_DEPTH),
                    },
                    wall.point(mid, y),
                    rotation,
                );
            }
            self.push_member(
                MemberKind::Girt,
                PrimitiveShape::Box {
                    size: Vec3::new(wall.pitch, GIRT_HEIGHT, GIRT_DEPTH),
                },
                wall.point(mid, eave / 2.0),
                rotation,
            );
        }

        // Nominal studs at the stud pitch, walked as integer multiples to
        // avoid drift. Grid-line positions already carry a column; positions
        // inside or exactly on an opening boundary are handled by the
        // opening framing below.
        let openings: Vec<Opening> = self.params.openings_on(side).cloned().collect();
        let mut k = 1u32;
        loop {
            let s = -half + k as f32 * self.params.stud_pitch;
            if s >= half - COORD_EPS {
                break;
            }
            k += 1;
            if wall.on_grid_line(s) {
                continue;
            }
            if openings.iter().any(|o| suppresses_stud(o, s)) {
                continue;
            }
            self.push_member(
                MemberKind::Stud,
                PrimitiveShape::Box {
                    size: Vec3::new(STUD_WIDTH, eave, STUD_DEPTH),
                },
                wall.point(s, eave / 2.0),
                rotation,
            );
        }

        for opening in openings {
            self.place_opening(&wall, rotation, &opening);
        }
    }

    /// Trimmers, header, sill, and jack studs for one opening.
    fn place_opening(&mut self, wall: &WallFrame, rotation: Quat, opening: &Opening) {
        let eave = self.params.eave_height;
        let header_y = opening.header_height;

        // Trimmers exactly on the opening boundaries, floor to header
        // underside
        for s in [opening.start, opening.end] {
            self.push_member(
                MemberKind::Trimmer,
                PrimitiveShape::Box {
                    size: Vec3::new(TRIMMER_WIDTH, header_y, STUD_DEPTH),
                },
                wall.point(s, header_y / 2.0),
                rotation,
            );
        }

        // Header beam spanning the opening width
        self.push_member(
            MemberKind::Header,
            PrimitiveShape::Box {
                size: Vec3::new(opening.width(), HEADER_HEIGHT, HEADER_DEPTH),
            },
            wall.point(opening.center(), header_y + HEADER_HEIGHT / 2.0),
            rotation,
        );

        // Window sill, top face at the declared sill height
        if let Some(sill_y) = opening.sill_height {
            self.push_member(
                MemberKind::Sill,
                PrimitiveShape::Box {
                    size: Vec3::new(opening.width(), SILL_HEIGHT, SILL_DEPTH),
                },
                wall.point(opening.center(), sill_y - SILL_HEIGHT / 2.0),
                rotation,
            );
        }

        // Jack studs at the nominal pitch inside the opening span: above the
        // header up to the top plate, and below the sill for windows
        let half = wall.length / 2.0;
        let mut k = 1u32;
        loop {
            let s = -half + k as f32 * self.params.stud_pitch;
            if s >= half - COORD_EPS {
                break;
            }
            k += 1;
            if s <= opening.start + COORD_EPS || s >= opening.end - COORD_EPS {
                continue;
            }

            let above_h = eave - (header_y + HEADER_HEIGHT);
            if above_h > COORD_EPS {
                self.push_member(
                    MemberKind::JackStud,
                    PrimitiveShape::Box {
                        size: Vec3::new(STUD_WIDTH, above_h, STUD_DEPTH),
                    },
                    wall.point(s, header_y + HEADER_HEIGHT + above_h / 2.0),
                    rotation,
                );
            }
            if let Some(sill_y) = opening.sill_height {
                let below_h = sill_y - SILL_HEIGHT;
                if below_h > COORD_EPS {
                    self.push_member(
                        MemberKind::JackStud,
                        PrimitiveShape::Box {
                            size: Vec3::new(STUD_WIDTH, below_h, STUD_DEPTH),
                        },
                        wall.point(s, below_h / 2.0),
                        rotation,
                    );
                }
            }
        }
    }

    /// Diagonal braces in the end bays of the long walls.
    fn place_bracing(&mut self) {
        let eave = self.params.eave_height;
        for side in [WallSide::South, WallSide::North] {
            let wall = self.wall_frame(side);
            let half = wall.length / 2.0;
            let pairs = [
                (wall.point(-half, eave), wall.point(-half + wall.pitch, 0.0)),
                (wall.point(half, eave), wall.point(half - wall.pitch, 0.0)),
            ];
            for (a, b) in pairs {
                let (shape, translation, rotation) = beam_between(a, b, BRACE_WIDTH, BRACE_DEPTH);
                self.push_member(MemberKind::Bracing, shape, translation, rotation);
            }
        }
    }

    /// King-post trusses on every bay line, ridge beam, and purlins.
    fn place_roof(&mut self) {
        let eave = self.params.eave_height;
        let rise = self.params.ridge_rise;
        let half_l = self.params.length / 2.0;
        let half_w = self.params.width / 2.0;

        for i in 0..=self.bays_x {
            let x = -half_l + i as f32 * self.pitch_x;

            // Rafter pair, eave to ridge
            for eave_z in [-half_w, half_w] {
                let (shape, translation, rotation) = beam_between(
                    Vec3::new(x, eave, eave_z),
                    Vec3::new(x, eave + rise, 0.0),
                    RAFTER_WIDTH,
                    RAFTER_DEPTH,
                );
                self.push_member(MemberKind::Rafter, shape, translation, rotation);
            }

            // Ceiling tie across the full span
            self.push_member(
                MemberKind::ChordTie,
                PrimitiveShape::Box {
                    size: Vec3::new(CHORD_WIDTH, CHORD_HEIGHT, self.params.width),
                },
                Vec3::new(x, eave, 0.0),
                Quat::IDENTITY,
            );

            // King post and webs only exist on a pitched roof
            if rise > COORD_EPS {
                self.push_member(
                    MemberKind::KingPost,
                    PrimitiveShape::Box {
                        size: Vec3::new(KING_SECTION, rise, KING_SECTION),
                    },
                    Vec3::new(x, eave + rise / 2.0, 0.0),
                    Quat::IDENTITY,
                );

                // Webs from the king-post base to each rafter midpoint
                let base = Vec3::new(x, eave, 0.0);
                for eave_z in [-half_w, half_w] {
                    let mid = Vec3::new(x, eave + rise / 2.0, eave_z / 2.0);
                    let (shape, translation, rotation) =
                        beam_between(base, mid, WEB_SECTION, WEB_SECTION);
                    self.push_member(MemberKind::WebStrut, shape, translation, rotation);
                }
            }
        }

        // Ridge beam along the full length
        self.push_member(
            MemberKind::RidgeBeam,
            PrimitiveShape::Box {
                size: Vec3::new(self.params.length, RIDGE_HEIGHT, RIDGE_WIDTH),
            },
            Vec3::new(0.0, eave + rise, 0.0),
            Quat::IDENTITY,
        );

        // Two purlin rows per roof plane
        for t in [1.0 / 3.0, 2.0 / 3.0] {
            let y = eave + rise * t;
            for sign in [-1.0, 1.0] {
                let z = sign * half_w * (1.0 - t);
                self.push_member(
                    MemberKind::Purlin,
                    PrimitiveShape::Box {
                        size: Vec3::new(self.params.length, PURLIN_SECTION, PURLIN_SECTION),
                    },
                    Vec3::new(0.0, y, z),
                    Quat::IDENTITY,
                );
            }
        }
    }

    /// Curved wing: studs and plates sampled along an arc, each segment
    /// rotated by the tangent between consecutive sample points so segments
    /// miter end-to-end.
    fn place_curved_wing(&mut self) {
        let Some(wing) = self.params.curved_wing.clone() else {
            return;
        };
        let eave = self.params.eave_height;
        let n = wing.segments as usize;

        let points: Vec<Vec3> = (0..=n)
            .map(|k| {
                let theta = wing.start_angle + wing.angular_span * k as f32 / n as f32;
                Vec3::new(
                    wing.center[0] + wing.radius * theta.cos(),
                    0.0,
                    wing.center[1] + wing.radius * theta.sin(),
                )
            })
            .collect();

        // Segment yaw from the chord delta, not the absolute arc angle
        let segment_yaw = |k: usize| -> f32 {
            let delta = points[k + 1] - points[k];
            (-delta.z).atan2(delta.x)
        };

        for (k, point) in points.iter().enumerate() {
            // Studs take the yaw of the adjacent segment so corners miter
            let yaw = if k < n { segment_yaw(k) } else { segment_yaw(n - 1) };
            self.push_member(
                MemberKind::Stud,
                PrimitiveShape::Box {
                    size: Vec3::new(STUD_WIDTH, eave, STUD_DEPTH),
                },
                *point + Vec3::Y * (eave / 2.0),
                Quat::from_rotation_y(yaw),
            );
        }

        for k in 0..n {
            let a = points[k];
            let b = points[k + 1];
            let chord = (b - a).length();
            let mid = (a + b) / 2.0;
            let rotation = Quat::from_rotation_y(segment_yaw(k));

            for y in [PLATE_HEIGHT / 2.0, eave - PLATE_HEIGHT / 2.0] {
                self.push_member(
                    MemberKind::Plate,
                    PrimitiveShape::Box {
                        size: Vec3::new(chord, PLATE_HEIGHT, PLATE_DEPTH),
                    },
                    mid + Vec3::Y * y,
                    rotation,
                );
            }
            self.push_member(
                MemberKind::Girt,
                PrimitiveShape::Box {
                    size: Vec3::new(chord, GIRT_HEIGHT, GIRT_DEPTH),
                },
                mid + Vec3::Y * (eave / 2.0),
                rotation,
            );

            // Curved cladding, offset radially outward from the arc center
            let center = Vec3::new(wing.center[0], 0.0, wing.center[1]);
            let radial = (mid - center).normalize_or_zero();
            self.push_decor(
                MemberKind::Cladding,
                PrimitiveShape::Box {
                    size: Vec3::new(chord, eave, CLADDING_THICKNESS),
                },
                mid + Vec3::Y * (eave / 2.0) + radial * (STUD_DEPTH / 2.0 + CLADDING_THICKNESS),
                rotation,
            );
        }
    }

    /// Non-selectable skin: wall cladding, roof sheets, corner trim, and
    /// gutters. None of these get registry entries.
    fn place_cladding_and_trim(&mut self) {
        let eave = self.params.eave_height;
        let rise = self.params.ridge_rise;
        let half_l = self.params.length / 2.0;
        let half_w = self.params.width / 2.0;

        for side in [WallSide::South, WallSide::North, WallSide::West, WallSide::East] {
            let wall = self.wall_frame(side);
            let half = wall.length / 2.0;
            let rotation = wall.axis_rotation();
            let openings: Vec<Opening> = self.params.openings_on(side).cloned().collect();
            for j in 0..wall.bays {
                let s0 = -half + j as f32 * wall.pitch;
                let s1 = s0 + wall.pitch;
                // Leave bays with openings unclad
                if openings.iter().any(|o| o.start < s1 && o.end > s0) {
                    continue;
                }
                let offset = wall.normal * (PLATE_DEPTH / 2.0 + CLADDING_THICKNESS);
                self.push_decor(
                    MemberKind::Cladding,
                    PrimitiveShape::Box {
                        size: Vec3::new(wall.pitch, eave, CLADDING_THICKNESS),
                    },
                    wall.point(s0 + wall.pitch / 2.0, eave / 2.0) + offset,
                    rotation,
                );
            }
        }

        // Roof sheets, one per plane, offset along the plane normal
        for eave_z in [-half_w, half_w] {
            let (shape, translation, rotation) = beam_between(
                Vec3::new(0.0, eave, eave_z),
                Vec3::new(0.0, eave + rise, 0.0),
                self.params.length,
                CLADDING_THICKNESS,
            );
            let normal = rotation * Vec3::Y;
            self.push_decor(
                MemberKind::Cladding,
                shape,
                translation + normal * (RAFTER_DEPTH / 2.0 + CLADDING_THICKNESS),
                rotation,
            );
        }

        // Corner trim boards
        for x in [-half_l, half_l] {
            for z in [-half_w, half_w] {
                self.push_decor(
                    MemberKind::Trim,
                    PrimitiveShape::Box {
                        size: Vec3::new(TRIM_SECTION, eave, TRIM_SECTION),
                    },
                    Vec3::new(
                        x + x.signum() * COLUMN_SECTION / 2.0,
                        eave / 2.0,
                        z + z.signum() * COLUMN_SECTION / 2.0,
                    ),
                    Quat::IDENTITY,
                );
            }
        }

        // Gutters along both eave lines
        for z in [-half_w, half_w] {
            self.push_decor(
                MemberKind::Gutter,
                PrimitiveShape::Cylinder {
                    radius: GUTTER_RADIUS,
                    length: self.params.length,
                },
                Vec3::new(0.0, eave + 0.05, z + z.signum() * 0.18),
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            );
        }
    }

    fn finish(self) -> Structure {
        Structure {
            placements: self.placements,
            registry: self.registry,
        }
    }
}

/// True when the nominal stud at `s` must be suppressed for `opening`:
/// strictly inside the range, or exactly on a boundary (the trimmer takes
/// the boundary position, never both).
fn suppresses_stud(opening: &Opening, s: f32) -> bool {
    s > opening.start - COORD_EPS && s < opening.end + COORD_EPS
}

/// Place a box spanning `a` to `b` with its long axis on local Z.
fn beam_between(a: Vec3, b: Vec3, width: f32, depth: f32) -> (PrimitiveShape, Vec3, Quat) {
    let delta = b - a;
    let length = delta.length();
    let rotation = Quat::from_rotation_arc(Vec3::Z, delta / length);
    (
        PrimitiveShape::Box {
            size: Vec3::new(width, depth, length),
        },
        (a + b) / 2.0,
        rotation,
    )
}

fn load_rating(kind: MemberKind) -> String {
    let kn = match kind {
        MemberKind::Column => 62.0,
        MemberKind::Plate | MemberKind::Header => 38.0,
        MemberKind::RidgeBeam => 44.0,
        MemberKind::Rafter => 24.0,
        MemberKind::ChordTie => 30.0,
        MemberKind::KingPost => 55.0,
        MemberKind::WebStrut | MemberKind::Bracing => 48.0,
        MemberKind::Purlin => 12.0,
        MemberKind::Stud | MemberKind::Trimmer | MemberKind::JackStud => 11.0,
        MemberKind::Girt | MemberKind::Sill => 9.0,
        MemberKind::Cladding | MemberKind::Trim | MemberKind::Gutter => 2.0,
    };
    format!("{kn:.0} kN")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bare_params() -> BuildingParams {
        BuildingParams {
            openings: Vec::new(),
            curved_wing: None,
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = BuildingParams::default();
        let a = generate(&params).unwrap();
        let b = generate(&params).unwrap();

        assert_eq!(a.registry.len(), b.registry.len());
        assert_eq!(a.placements.len(), b.placements.len());
        for (ma, mb) in a.registry.iter().zip(b.registry.iter()) {
            assert_eq!(ma.id, mb.id);
            assert_eq!(ma.kind, mb.kind);
            assert_eq!(ma.position_world, mb.position_world);
            assert_eq!(ma.rotation, mb.rotation);
        }
        for (pa, pb) in a.placements.iter().zip(b.placements.iter()) {
            assert_eq!(pa.shape, pb.shape);
            assert_eq!(pa.translation, pb.translation);
        }
    }

    #[test]
    fn test_member_ids_are_unique() {
        let structure = generate(&BuildingParams::default()).unwrap();
        let ids: HashSet<_> = structure.registry.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), structure.registry.len());
    }

    #[test]
    fn test_ids_follow_the_prefix_sequence_format() {
        let structure = generate(&BuildingParams::default()).unwrap();
        for member in &structure.registry {
            let (prefix, seq) = member.id.split_once('-').unwrap();
            assert_eq!(prefix, member.kind.id_prefix());
            assert!(seq.parse::<u32>().unwrap() >= 1);
        }
    }

    #[test]
    fn test_registry_positions_match_placements() {
        let structure = generate(&BuildingParams::default()).unwrap();
        for placement in &structure.placements {
            if let PlacementRole::Member { id } = &placement.role {
                let member = structure.member(id).unwrap();
                assert_eq!(member.position_world, placement.translation);
                assert_eq!(member.rotation, placement.rotation);
            }
        }
    }

    #[test]
    fn test_degenerate_params_fail_without_partial_result() {
        let params = BuildingParams {
            width: -1.0,
            ..Default::default()
        };
        assert!(generate(&params).is_err());
    }

    #[test]
    fn test_tiny_span_still_yields_one_bay() {
        let params = BuildingParams {
            length: 1.0,
            width: 1.0,
            openings: Vec::new(),
            curved_wing: None,
            ..Default::default()
        };
        let structure = generate(&params).unwrap();
        // One bay per axis: exactly four corner columns
        let columns = structure
            .registry
            .iter()
            .filter(|m| m.kind == MemberKind::Column)
            .count();
        assert_eq!(columns, 4);
    }

    #[test]
    fn test_truss_member_counts_per_bay_line() {
        let params = bare_params();
        let structure = generate(&params).unwrap();
        let lines = ((params.length / params.bay_spacing).round() as usize) + 1;

        let count = |kind: MemberKind| {
            structure
                .registry
                .iter()
                .filter(|m| m.kind == kind)
                .count()
        };
        assert_eq!(count(MemberKind::Rafter), 2 * lines);
        assert_eq!(count(MemberKind::ChordTie), lines);
        assert_eq!(count(MemberKind::KingPost), lines);
        assert_eq!(count(MemberKind::WebStrut), 2 * lines);
        assert_eq!(count(MemberKind::RidgeBeam), 1);
    }

    #[test]
    fn test_rafter_length_and_pitch_angle() {
        let params = bare_params();
        let structure = generate(&params).unwrap();
        let half_span = params.width / 2.0;
        let expected_len = (half_span * half_span + params.ridge_rise * params.ridge_rise).sqrt();
        let expected_angle = params.ridge_rise.atan2(half_span);

        let rafters: Vec<_> = structure
            .placements
            .iter()
            .filter(|p| {
                matches!(&p.role, PlacementRole::Member { id } if id.starts_with("RFT-"))
            })
            .collect();
        assert!(!rafters.is_empty());

        for rafter in rafters {
            let PrimitiveShape::Box { size } = &rafter.shape else {
                panic!("rafter must be a box");
            };
            assert!((size.z - expected_len).abs() < 1e-4);

            // The placed long axis climbs at the pitch angle
            let dir = rafter.rotation * Vec3::Z;
            let angle = dir.y.asin();
            assert!((angle - expected_angle).abs() < 1e-4);
        }
    }

    #[test]
    fn test_door_opening_scenario() {
        // Door {start: -0.5, end: 0.5, header 4.6} on a 14 m wall at 0.45 m
        // stud pitch. Bay spacing is chosen so no grid column lands inside
        // the door.
        let params = BuildingParams {
            length: 14.0,
            width: 10.0,
            bay_spacing: 4.7,
            stud_pitch: 0.45,
            eave_height: 5.2,
            ridge_rise: 2.2,
            openings: vec![Opening {
                wall: WallSide::South,
                start: -0.5,
                end: 0.5,
                header_height: 4.6,
                sill_height: None,
            }],
            curved_wing: None,
        };
        let structure = generate(&params).unwrap();
        let south_z = -params.width / 2.0;
        let on_south = |m: &&StructuralMember| (m.position_world.z - south_z).abs() < 0.2;

        // No nominal stud inside the door span
        let inside_studs: Vec<_> = structure
            .registry
            .iter()
            .filter(on_south)
            .filter(|m| m.kind == MemberKind::Stud && m.position_world.x.abs() < 0.5 - 1e-3)
            .collect();
        assert!(inside_studs.is_empty(), "found studs in the door: {inside_studs:?}");

        // Trimmers exactly at the boundaries
        let trimmers: Vec<_> = structure
            .registry
            .iter()
            .filter(on_south)
            .filter(|m| m.kind == MemberKind::Trimmer)
            .collect();
        assert_eq!(trimmers.len(), 2);
        let mut xs: Vec<f32> = trimmers.iter().map(|m| m.position_world.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((xs[0] + 0.5).abs() < 1e-4);
        assert!((xs[1] - 0.5).abs() < 1e-4);

        // One header centered on the opening
        let headers: Vec<_> = structure
            .registry
            .iter()
            .filter(on_south)
            .filter(|m| m.kind == MemberKind::Header)
            .collect();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].position_world.x.abs() < 1e-4);
        assert!((headers[0].position_world.y - (4.6 + HEADER_HEIGHT / 2.0)).abs() < 1e-4);

        // A door gets no sill
        assert!(!structure
            .registry
            .iter()
            .filter(on_south)
            .any(|m| m.kind == MemberKind::Sill));
    }

    #[test]
    fn test_boundary_coincident_stud_becomes_the_trimmer() {
        // With a 0.5 m pitch the opening boundary at s = 1.0 falls exactly on
        // a nominal stud position; the trimmer must take it alone.
        let params = BuildingParams {
            length: 12.0,
            width: 8.0,
            bay_spacing: 4.3,
            stud_pitch: 0.5,
            eave_height: 4.0,
            ridge_rise: 1.6,
            openings: vec![Opening {
                wall: WallSide::South,
                start: 1.0,
                end: 2.0,
                header_height: 3.2,
                sill_height: None,
            }],
            curved_wing: None,
        };
        let structure = generate(&params).unwrap();
        let south_z = -params.width / 2.0;

        for boundary in [1.0f32, 2.0] {
            let at_boundary: Vec<_> = structure
                .registry
                .iter()
                .filter(|m| (m.position_world.z - south_z).abs() < 0.2)
                .filter(|m| {
                    matches!(m.kind, MemberKind::Stud | MemberKind::Trimmer)
                        && (m.position_world.x - boundary).abs() < 1e-3
                })
                .collect();
            assert_eq!(at_boundary.len(), 1, "exactly one vertical at {boundary}");
            assert_eq!(at_boundary[0].kind, MemberKind::Trimmer);
        }
    }

    #[test]
    fn test_window_gets_a_sill_and_jack_studs() {
        let params = BuildingParams {
            length: 12.0,
            width: 8.0,
            bay_spacing: 4.3,
            stud_pitch: 0.45,
            eave_height: 4.0,
            ridge_rise: 1.6,
            openings: vec![Opening {
                wall: WallSide::North,
                start: -2.0,
                end: 0.2,
                header_height: 3.0,
                sill_height: Some(1.0),
            }],
            curved_wing: None,
        };
        let structure = generate(&params).unwrap();
        let north_z = params.width / 2.0;
        let on_north: Vec<_> = structure
            .registry
            .iter()
            .filter(|m| (m.position_world.z - north_z).abs() < 0.2)
            .collect();

        assert_eq!(
            on_north.iter().filter(|m| m.kind == MemberKind::Sill).count(),
            1
        );
        // Jack studs exist both above the header and below the sill
        let jacks: Vec<_> = on_north
            .iter()
            .filter(|m| m.kind == MemberKind::JackStud)
            .collect();
        assert!(jacks.iter().any(|m| m.position_world.y > 3.0));
        assert!(jacks.iter().any(|m| m.position_world.y < 1.0));
    }

    #[test]
    fn test_curved_wing_segments_follow_the_tangent() {
        let params = BuildingParams {
            openings: Vec::new(),
            ..Default::default()
        };
        let wing = params.curved_wing.clone().unwrap();
        let structure = generate(&params).unwrap();

        let n = wing.segments as usize;
        let point = |k: usize| {
            let theta = wing.start_angle + wing.angular_span * k as f32 / n as f32;
            Vec3::new(
                wing.center[0] + wing.radius * theta.cos(),
                0.0,
                wing.center[1] + wing.radius * theta.sin(),
            )
        };

        // Wing plates are the plates placed away from the rectangular hall
        let wing_plates: Vec<_> = structure
            .placements
            .iter()
            .filter(|p| {
                matches!(&p.role, PlacementRole::Member { id } if id.starts_with("PLT-"))
                    && p.translation.x > params.length / 2.0 + 1.0
            })
            .collect();
        assert!(!wing_plates.is_empty());

        for plate in &wing_plates {
            // Find the segment whose midpoint matches this plate
            let matched = (0..n).find(|&k| {
                let mid = (point(k) + point(k + 1)) / 2.0;
                (Vec3::new(plate.translation.x, 0.0, plate.translation.z) - mid).length() < 1e-3
            });
            let Some(k) = matched else {
                panic!("wing plate not on any segment midpoint");
            };
            let delta = point(k + 1) - point(k);
            // The placed long axis must be the chord tangent, not the
            // absolute arc angle
            let axis = plate.rotation * Vec3::X;
            let tangent = delta.normalize();
            assert!(axis.dot(tangent).abs() > 0.9999);
        }
    }

    #[test]
    fn test_decorative_geometry_stays_out_of_the_registry() {
        let structure = generate(&BuildingParams::default()).unwrap();
        let decor = structure
            .placements
            .iter()
            .filter(|p| matches!(p.role, PlacementRole::Decorative { .. }))
            .count();
        assert!(decor > 0);
        assert_eq!(
            structure.placements.len() - decor,
            structure.registry.len()
        );
        // And the hit volumes cover exactly the selectable placements
        assert_eq!(structure.hit_volumes().len(), structure.registry.len());
    }

    #[test]
    fn test_pick_member_returns_the_nearest() {
        let structure = generate(&bare_params()).unwrap();
        let volumes = structure.hit_volumes();

        // Fire along +Z at a non-corner column on the south wall, so the ray
        // does not travel lengthwise through a gable wall
        let half_l = 24.0 / 2.0;
        let half_w = 14.0 / 2.0;
        let target = structure
            .registry
            .iter()
            .find(|m| {
                m.kind == MemberKind::Column
                    && (m.position_world.z + half_w).abs() < 1e-3
                    && m.position_world.x.abs() < half_l - 0.5
            })
            .unwrap();
        let origin = target.position_world + Vec3::new(0.0, 0.0, -50.0);
        let ray = Ray::new(origin, Vec3::Z);
        let (id, t) = pick_member(&ray, &volumes).unwrap();
        let hit = structure.member(id).unwrap();
        // The nearest member along the ray is on the near (south) side
        assert!(t > 0.0);
        assert!(hit.position_world.z <= target.position_world.z + 1e-3);
    }

    #[test]
    fn test_pick_member_miss_is_none() {
        let structure = generate(&bare_params()).unwrap();
        let volumes = structure.hit_volumes();
        let ray = Ray::new(Vec3::new(0.0, 500.0, 0.0), Vec3::Y);
        assert!(pick_member(&ray, &volumes).is_none());
    }
}
