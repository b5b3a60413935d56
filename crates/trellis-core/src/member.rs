//! Structural member kinds and the per-member metadata record

use chrono::NaiveDate;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// What a placed member is, structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Column,
    Plate,
    Stud,
    Girt,
    Bracing,
    Rafter,
    ChordTie,
    KingPost,
    WebStrut,
    RidgeBeam,
    Purlin,
    Trimmer,
    Header,
    Sill,
    JackStud,
    Cladding,
    Trim,
    Gutter,
}

impl MemberKind {
    /// Stable id prefix; ids are `"<PREFIX>-<sequence>"` in placement order.
    pub fn id_prefix(self) -> &'static str {
        match self {
            MemberKind::Column => "COL",
            MemberKind::Plate => "PLT",
            MemberKind::Stud => "STD",
            MemberKind::Girt => "GRT",
            MemberKind::Bracing => "BRC",
            MemberKind::Rafter => "RFT",
            MemberKind::ChordTie => "TIE",
            MemberKind::KingPost => "KNG",
            MemberKind::WebStrut => "WEB",
            MemberKind::RidgeBeam => "RDG",
            MemberKind::Purlin => "PUR",
            MemberKind::Trimmer => "TMR",
            MemberKind::Header => "HDR",
            MemberKind::Sill => "SIL",
            MemberKind::JackStud => "JCK",
            MemberKind::Cladding => "CLD",
            MemberKind::Trim => "TRM",
            MemberKind::Gutter => "GTR",
        }
    }

    /// Human-facing name for the properties panel.
    pub fn display_name(self) -> &'static str {
        match self {
            MemberKind::Column => "Column",
            MemberKind::Plate => "Plate beam",
            MemberKind::Stud => "Wall stud",
            MemberKind::Girt => "Girt",
            MemberKind::Bracing => "Diagonal brace",
            MemberKind::Rafter => "Rafter",
            MemberKind::ChordTie => "Ceiling tie",
            MemberKind::KingPost => "King post",
            MemberKind::WebStrut => "Web strut",
            MemberKind::RidgeBeam => "Ridge beam",
            MemberKind::Purlin => "Purlin",
            MemberKind::Trimmer => "Trimmer stud",
            MemberKind::Header => "Header beam",
            MemberKind::Sill => "Window sill",
            MemberKind::JackStud => "Jack stud",
            MemberKind::Cladding => "Cladding panel",
            MemberKind::Trim => "Trim board",
            MemberKind::Gutter => "Gutter",
        }
    }

    /// Default material for this kind of member.
    pub fn material_name(self) -> &'static str {
        match self {
            MemberKind::Column | MemberKind::RidgeBeam => "Glulam GL28c",
            MemberKind::Plate | MemberKind::Header | MemberKind::ChordTie => "Glulam GL24h",
            MemberKind::Rafter | MemberKind::Purlin => "C24 softwood",
            MemberKind::Stud
            | MemberKind::Trimmer
            | MemberKind::JackStud
            | MemberKind::Sill
            | MemberKind::Girt => "C16 softwood",
            MemberKind::Bracing | MemberKind::WebStrut | MemberKind::KingPost => "Steel S355",
            MemberKind::Cladding => "Fibre cement board",
            MemberKind::Trim => "Painted pine",
            MemberKind::Gutter => "Galvanized steel",
        }
    }

    /// Approximate material density in kg/m^3, used for the weight label.
    pub fn density(self) -> f32 {
        match self.material_name() {
            "Steel S355" | "Galvanized steel" => 7850.0,
            "Fibre cement board" => 1400.0,
            _ => 470.0,
        }
    }
}

/// Display health of a member, as shown in the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    #[default]
    Good,
    Warning,
    Critical,
}

/// One label/value display pair, e.g. `("Strain", "118 µε")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    pub label: String,
    pub value: String,
}

/// Metadata for one selectable member.
///
/// `position_world` is the member's placed centroid and must match the
/// placement transform exactly; hit-test feedback and the properties panel
/// both read it from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralMember {
    pub id: String,
    pub kind: MemberKind,
    pub material_name: String,
    pub position_world: Vec3,
    pub rotation: Quat,
    pub dimensions_label: String,
    pub weight_label: String,
    pub load_rating_label: String,
    pub health_status: HealthStatus,
    pub sensors_attached: u8,
    pub last_inspection: NaiveDate,
    pub install_date: NaiveDate,
    pub live_readings: Vec<LiveReading>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_prefixes_are_unique() {
        let kinds = [
            MemberKind::Column,
            MemberKind::Plate,
            MemberKind::Stud,
            MemberKind::Girt,
            MemberKind::Bracing,
            MemberKind::Rafter,
            MemberKind::ChordTie,
            MemberKind::KingPost,
            MemberKind::WebStrut,
            MemberKind::RidgeBeam,
            MemberKind::Purlin,
            MemberKind::Trimmer,
            MemberKind::Header,
            MemberKind::Sill,
            MemberKind::JackStud,
            MemberKind::Cladding,
            MemberKind::Trim,
            MemberKind::Gutter,
        ];
        let prefixes: HashSet<_> = kinds.iter().map(|k| k.id_prefix()).collect();
        assert_eq!(prefixes.len(), kinds.len());
    }
}
