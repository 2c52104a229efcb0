use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::{FarmError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_finite, validate_range, Validate,
};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl FromStr for GeoPoint {
    type Err = FarmError;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| FarmError::validation(format!("expected 'lat,lon', got '{}'", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| FarmError::validation(format!("invalid coordinate '{}': {}", part, e)))
        };
        Ok(GeoPoint::new(parse(lat)?, parse(lon)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Corn,
    Wheat,
    Soybeans,
    Rice,
    Cotton,
}

impl Crop {
    pub const ALL: [Crop; 5] = [
        Crop::Corn,
        Crop::Wheat,
        Crop::Soybeans,
        Crop::Rice,
        Crop::Cotton,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Crop::Corn => "Corn",
            Crop::Wheat => "Wheat",
            Crop::Soybeans => "Soybeans",
            Crop::Rice => "Rice",
            Crop::Cotton => "Cotton",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Crop::Corn => "High-yield grain crop for feed and ethanol",
            Crop::Wheat => "Versatile cereal grain for bread and pasta",
            Crop::Soybeans => "Protein-rich legume for oil and feed",
            Crop::Rice => "Staple grain crop for global consumption",
            Crop::Cotton => "Fiber crop for textiles and clothing",
        }
    }

    /// Nominal tonnes per hectare.
    pub fn base_yield_per_ha(&self) -> f64 {
        match self {
            Crop::Corn => 9.0,
            Crop::Wheat => 4.5,
            Crop::Soybeans => 3.0,
            Crop::Rice => 6.5,
            Crop::Cotton => 2.2,
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Crop {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self> {
        Crop::ALL
            .iter()
            .copied()
            .find(|crop| crop.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                FarmError::validation(format!(
                    "unknown crop '{}'; expected one of corn, wheat, soybeans, rice, cotton",
                    s
                ))
            })
    }
}

/// Regions offered by the planning form and their yield factors.
pub const KNOWN_REGIONS: [(&str, f64); 4] = [
    ("Midwest", 1.1),
    ("Great Plains", 1.0),
    ("Southeast", 0.95),
    ("West", 0.9),
];

/// Unknown regions fall back to a neutral factor of 1.0.
pub fn region_factor(region: &str) -> f64 {
    KNOWN_REGIONS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

pub fn is_known_region(region: &str) -> bool {
    KNOWN_REGIONS.iter().any(|(name, _)| *name == region)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlanInput {
    pub crop: Crop,
    pub region: String,
    pub soil_quality: u8,
    pub farm_size_ha: f64,
}

impl FarmPlanInput {
    pub fn new(crop: Crop, region: impl Into<String>, soil_quality: u8, farm_size_ha: f64) -> Self {
        Self {
            crop,
            region: region.into(),
            soil_quality,
            farm_size_ha,
        }
    }

    /// Builds a validated input from raw form values; the farm size arrives as text.
    pub fn from_form(crop: Crop, region: &str, soil_quality: u8, farm_size_text: &str) -> Result<Self> {
        let farm_size_ha = farm_size_text.trim().parse::<f64>().map_err(|_| {
            FarmError::validation(format!(
                "Please enter a valid farm size (got '{}')",
                farm_size_text
            ))
        })?;
        let input = Self::new(crop, region, soil_quality, farm_size_ha);
        input.validate()?;
        Ok(input)
    }
}

impl Validate for FarmPlanInput {
    fn validate(&self) -> Result<()> {
        let as_input_error = |e: FarmError| FarmError::validation(e.to_string());
        validate_range("soil_quality", self.soil_quality, 1, 5).map_err(as_input_error)?;
        validate_positive_finite("farm_size_ha", self.farm_size_ha).map_err(as_input_error)?;
        validate_non_empty_string("region", &self.region).map_err(as_input_error)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub tonnes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPrediction {
    pub total_yield_tonnes: f64,
    pub monthly_yields: Vec<YieldPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub level: Priority,
}

impl Recommendation {
    pub fn new(text: impl Into<String>, level: Priority) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlan {
    pub id: Uuid,
    pub crop: Crop,
    pub region: String,
    pub soil_quality: u8,
    pub farm_size_ha: f64,
    pub planting_dates: Vec<NaiveDate>,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    SoilPh,
    Optical,
    Electrochemical,
    Mechanical,
    AirFlow,
    Environmental,
    Moisture,
    Weather,
}

/// One sample from a field sensor, keyed by metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_type: SensorType,
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PestSeverity {
    Mild,
    Moderate,
    Severe,
}

impl PestSeverity {
    pub const ALL: [PestSeverity; 3] =
        [PestSeverity::Mild, PestSeverity::Moderate, PestSeverity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            PestSeverity::Mild => "mild",
            PestSeverity::Moderate => "moderate",
            PestSeverity::Severe => "severe",
        }
    }
}

impl fmt::Display for PestSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PestSeverity {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        PestSeverity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == needle)
            .ok_or_else(|| {
                FarmError::validation(format!(
                    "unknown severity '{}'; expected mild, moderate or severe",
                    s
                ))
            })
    }
}

/// Outcome of one crop scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestAnalysisResult {
    pub id: Uuid,
    pub disease_name: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    pub severity: PestSeverity,
    pub recommendation: String,
    pub date: DateTime<Utc>,
}
