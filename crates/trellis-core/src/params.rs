//! Building parameters and validation
//!
//! A `BuildingParams` value fully determines the generated structure:
//! identical parameters always produce an identical member layout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("degenerate span on {axis} axis: {value}")]
    DegenerateSpan { axis: &'static str, value: f32 },
    #[error("bay spacing must be positive, got {0}")]
    InvalidBaySpacing(f32),
    #[error("stud pitch must be positive, got {0}")]
    InvalidStudPitch(f32),
    #[error("eave height must be positive, got {0}")]
    InvalidEaveHeight(f32),
    #[error("ridge rise must be non-negative, got {0}")]
    InvalidRidgeRise(f32),
    #[error("opening [{start}, {end}] is empty or reversed")]
    EmptyOpening { start: f32, end: f32 },
    #[error("opening [{start}, {end}] does not fit the {wall:?} wall (length {wall_length})")]
    OpeningOutOfRange {
        wall: WallSide,
        start: f32,
        end: f32,
        wall_length: f32,
    },
    #[error("opening header at {header} must sit below the eave ({eave}) and above the sill")]
    InvalidOpeningHeights { header: f32, eave: f32 },
    #[error("curved wing needs a positive radius, got {0}")]
    InvalidWingRadius(f32),
    #[error("curved wing needs at least one segment")]
    EmptyWingArc,
}

/// Which perimeter wall an opening belongs to.
///
/// South/North walls run along X at z = -width/2 / +width/2; West/East walls
/// run along Z at x = -length/2 / +length/2. The running coordinate of an
/// opening is measured along the wall, centered on the wall midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    South,
    North,
    West,
    East,
}

/// A door or window declared as a range along a wall's running coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub wall: WallSide,
    /// Running coordinate of the opening's left edge (meters, wall-centered)
    pub start: f32,
    /// Running coordinate of the opening's right edge
    pub end: f32,
    /// Underside of the header beam above the opening
    pub header_height: f32,
    /// Top of the sill beam; present for windows, absent for doors
    #[serde(default)]
    pub sill_height: Option<f32>,
}

impl Opening {
    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    pub fn center(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    pub fn is_window(&self) -> bool {
        self.sill_height.is_some()
    }
}

/// A curved wall section sampled along a circular arc.
///
/// The wing is free-standing relative to the main hall; `center` places the
/// arc center on the ground plane (x, z).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvedWing {
    /// Arc center on the ground plane
    #[serde(default = "default_wing_center")]
    pub center: [f32; 2],
    /// Arc radius in meters
    #[serde(default = "default_wing_radius")]
    pub radius: f32,
    /// Angle of the first sample point, radians
    #[serde(default = "default_wing_start_angle")]
    pub start_angle: f32,
    /// Angular span of the arc, radians
    #[serde(default = "default_wing_span")]
    pub angular_span: f32,
    /// Number of wall segments along the arc
    #[serde(default = "default_wing_segments")]
    pub segments: u32,
}

impl Default for CurvedWing {
    fn default() -> Self {
        Self {
            center: default_wing_center(),
            radius: default_wing_radius(),
            start_angle: default_wing_start_angle(),
            angular_span: default_wing_span(),
            segments: default_wing_segments(),
        }
    }
}

fn default_wing_center() -> [f32; 2] {
    [18.0, 0.0]
}

fn default_wing_radius() -> f32 {
    6.0
}

fn default_wing_start_angle() -> f32 {
    -std::f32::consts::FRAC_PI_2
}

fn default_wing_span() -> f32 {
    std::f32::consts::PI
}

fn default_wing_segments() -> u32 {
    12
}

/// Fixed architectural parameters for one generated building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingParams {
    /// Hall length along X, meters
    #[serde(default = "default_length")]
    pub length: f32,
    /// Hall width along Z (the gable span), meters
    #[serde(default = "default_width")]
    pub width: f32,
    /// Nominal bay spacing along both horizontal axes
    #[serde(default = "default_bay_spacing")]
    pub bay_spacing: f32,
    /// Nominal wall stud pitch
    #[serde(default = "default_stud_pitch")]
    pub stud_pitch: f32,
    /// Wall height from floor (y = 0) to eave
    #[serde(default = "default_eave_height")]
    pub eave_height: f32,
    /// Ridge rise above the eave line
    #[serde(default = "default_ridge_rise")]
    pub ridge_rise: f32,
    /// Declared doors and windows
    #[serde(default)]
    pub openings: Vec<Opening>,
    /// Optional curved wall wing
    #[serde(default)]
    pub curved_wing: Option<CurvedWing>,
}

impl Default for BuildingParams {
    fn default() -> Self {
        Self {
            length: default_length(),
            width: default_width(),
            bay_spacing: default_bay_spacing(),
            stud_pitch: default_stud_pitch(),
            eave_height: default_eave_height(),
            ridge_rise: default_ridge_rise(),
            openings: vec![
                Opening {
                    wall: WallSide::South,
                    start: 1.4,
                    end: 2.6,
                    header_height: 4.6,
                    sill_height: None,
                },
                Opening {
                    wall: WallSide::South,
                    start: 4.4,
                    end: 6.2,
                    header_height: 3.4,
                    sill_height: Some(1.1),
                },
                Opening {
                    wall: WallSide::North,
                    start: -6.2,
                    end: -4.4,
                    header_height: 3.4,
                    sill_height: Some(1.1),
                },
            ],
            curved_wing: Some(CurvedWing::default()),
        }
    }
}

fn default_length() -> f32 {
    24.0
}

fn default_width() -> f32 {
    14.0
}

fn default_bay_spacing() -> f32 {
    4.0
}

fn default_stud_pitch() -> f32 {
    0.45
}

fn default_eave_height() -> f32 {
    5.2
}

fn default_ridge_rise() -> f32 {
    2.6
}

impl BuildingParams {
    /// Wall length along the running coordinate of `wall`.
    pub fn wall_length(&self, wall: WallSide) -> f32 {
        match wall {
            WallSide::South | WallSide::North => self.length,
            WallSide::West | WallSide::East => self.width,
        }
    }

    /// Openings declared on `wall`, in declaration order.
    pub fn openings_on(&self, wall: WallSide) -> impl Iterator<Item = &Opening> {
        self.openings.iter().filter(move |o| o.wall == wall)
    }

    /// Validate the parameter set. Generation refuses to start on any error;
    /// a partial structure is never produced.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.length <= 0.0 {
            return Err(ConfigurationError::DegenerateSpan {
                axis: "length",
                value: self.length,
            });
        }
        if self.width <= 0.0 {
            return Err(ConfigurationError::DegenerateSpan {
                axis: "width",
                value: self.width,
            });
        }
        if self.bay_spacing <= 0.0 {
            return Err(ConfigurationError::InvalidBaySpacing(self.bay_spacing));
        }
        if self.stud_pitch <= 0.0 {
            return Err(ConfigurationError::InvalidStudPitch(self.stud_pitch));
        }
        if self.eave_height <= 0.0 {
            return Err(ConfigurationError::InvalidEaveHeight(self.eave_height));
        }
        if self.ridge_rise < 0.0 {
            return Err(ConfigurationError::InvalidRidgeRise(self.ridge_rise));
        }

        for opening in &self.openings {
            if opening.end <= opening.start {
                return Err(ConfigurationError::EmptyOpening {
                    start: opening.start,
                    end: opening.end,
                });
            }
            let half = self.wall_length(opening.wall) / 2.0;
            if opening.start < -half || opening.end > half {
                return Err(ConfigurationError::OpeningOutOfRange {
                    wall: opening.wall,
                    start: opening.start,
                    end: opening.end,
                    wall_length: self.wall_length(opening.wall),
                });
            }
            let sill = opening.sill_height.unwrap_or(0.0);
            if opening.header_height >= self.eave_height || opening.header_height <= sill {
                return Err(ConfigurationError::InvalidOpeningHeights {
                    header: opening.header_height,
                    eave: self.eave_height,
                });
            }
        }

        if let Some(wing) = &self.curved_wing {
            if wing.radius <= 0.0 {
                return Err(ConfigurationError::InvalidWingRadius(wing.radius));
            }
            if wing.segments == 0 || wing.angular_span <= 0.0 {
                return Err(ConfigurationError::EmptyWingArc);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(BuildingParams::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_span_rejected() {
        let params = BuildingParams {
            length: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::DegenerateSpan { axis: "length", .. })
        ));

        let params = BuildingParams {
            width: -3.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::DegenerateSpan { axis: "width", .. })
        ));
    }

    #[test]
    fn test_bad_pitch_rejected() {
        let params = BuildingParams {
            stud_pitch: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::InvalidStudPitch(_))
        ));
    }

    #[test]
    fn test_opening_outside_wall_rejected() {
        let params = BuildingParams {
            openings: vec![Opening {
                wall: WallSide::West,
                start: 5.0,
                end: 9.0,
                header_height: 3.0,
                sill_height: None,
            }],
            ..Default::default()
        };
        // West wall is width (14) long, so its running coordinate tops out at 7
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::OpeningOutOfRange { .. })
        ));
    }

    #[test]
    fn test_reversed_opening_rejected() {
        let params = BuildingParams {
            openings: vec![Opening {
                wall: WallSide::South,
                start: 2.0,
                end: 1.0,
                header_height: 3.0,
                sill_height: None,
            }],
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::EmptyOpening { .. })
        ));
    }

    #[test]
    fn test_header_above_eave_rejected() {
        let params = BuildingParams {
            openings: vec![Opening {
                wall: WallSide::South,
                start: -1.0,
                end: 1.0,
                header_height: 9.0,
                sill_height: None,
            }],
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::InvalidOpeningHeights { .. })
        ));
    }
}
