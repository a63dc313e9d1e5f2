use bevy::prelude::*;
use constants::scene_layout::{CLIP_PLANE_NORMAL, GROUND_LEVEL};
use constants::synthesis::MAX_SOURCE_IMAGES;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::measure::{Measurement, MeasurementId};

/// Colour assignment rule used when synthesising points.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticMode {
    /// Source pixel colour.
    #[default]
    Rgb,
    /// Heat map over the tile's vertical coordinate.
    Height,
    /// Cyan/green tint on luminance extremes.
    Structure,
}

impl DiagnosticMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rgb" => Some(Self::Rgb),
            "height" => Some(Self::Height),
            "structure" => Some(Self::Structure),
            _ => None,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Height => "height",
            Self::Structure => "structure",
        }
    }
}

/// Viewer presentation settings. Values are taken as given; range checks
/// belong to whatever edits them.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub point_size: f32,
    /// Height of the section cut above the ground grid.
    pub section_height: f32,
    pub is_clipping_active: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            point_size: 0.05,
            section_height: 5.0,
            is_clipping_active: false,
        }
    }
}

impl ViewSettings {
    /// World-space height of the section plane.
    pub fn section_plane_y(&self) -> f32 {
        self.section_height + GROUND_LEVEL
    }

    /// Clipping plane to bind to point materials, if clipping is on.
    pub fn clip_plane(&self) -> Option<ClipPlane> {
        self.is_clipping_active
            .then(|| ClipPlane::new(CLIP_PLANE_NORMAL, self.section_plane_y()))
    }
}

/// Half-space `dot(normal, p) + constant >= 0` that stays visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub constant: f32,
}

impl ClipPlane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    pub fn keeps(&self, point: Vec3) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// Packed as `(normal.xyz, constant)` for shader uniforms.
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.constant)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("reference length must be a finite number, got {0}")]
    NotFinite(f32),
    #[error("reference length must be positive, got {0} mm")]
    NotPositive(f32),
}

/// Scene units to real-world millimetres: `mm = units * scale * 1000`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationScale(pub f32);

impl Default for CalibrationScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl CalibrationScale {
    /// Scale that makes one scene unit read as `reference_mm`.
    pub fn from_reference_mm(reference_mm: f32) -> Result<Self, CalibrationError> {
        if !reference_mm.is_finite() {
            return Err(CalibrationError::NotFinite(reference_mm));
        }
        if reference_mm <= 0.0 {
            return Err(CalibrationError::NotPositive(reference_mm));
        }
        Ok(Self(reference_mm / 1000.0))
    }

    pub fn to_millimetres(&self, scene_units: f32) -> f32 {
        scene_units * self.0 * 1000.0
    }

    /// Ratio shown in the HUD, `1:N`.
    pub fn ratio_denominator(&self) -> f32 {
        1.0 / self.0
    }
}

/// Image URIs the reconstruction is built from, in tile order.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceImages {
    pub uris: Vec<String>,
}

impl SourceImages {
    pub fn new(uris: Vec<String>) -> Self {
        Self { uris }
    }

    /// URIs that get a tile slot.
    pub fn placed(&self) -> &[String] {
        let count = self.uris.len().min(MAX_SOURCE_IMAGES);
        &self.uris[..count]
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// Measurements owned by the host session. The viewer only reads this list;
/// changes arrive through [`super::host`] events.
#[derive(Resource, Debug, Clone, Default)]
pub struct MeasurementList {
    items: Vec<Measurement>,
}

impl MeasurementList {
    pub fn add(&mut self, measurement: Measurement) {
        self.items.push(measurement);
    }

    /// Replace both endpoints and the cached distance of `id`. Returns false
    /// when no such measurement exists.
    pub fn update(&mut self, id: MeasurementId, start: Vec3, end: Vec3, distance: f32) -> bool {
        match self.items.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.start = start;
                m.end = end;
                m.distance = distance;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
