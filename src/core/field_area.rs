//! Field area estimation for hand-drawn boundaries.
//!
//! Points are projected onto a local plane with an equirectangular transform
//! centred on the mean latitude, then the shoelace formula is applied. This is
//! accurate for field-sized polygons but degrades over large extents and near
//! the poles. Polygons that cross the ±180° meridian are not unwrapped.

use serde::{Deserialize, Serialize};

use crate::domain::model::GeoPoint;
use crate::utils::error::{FarmError, Result};

/// Meridional arc length of one degree of latitude, in metres.
pub const METERS_PER_DEGREE: f64 = 111_320.0;
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Enclosed area of `points` in hectares. Fewer than three points yields 0.
///
/// The sequence is treated as a closed ring. Orientation does not matter.
/// Coordinates must be finite; see [`validate_boundary`].
pub fn polygon_area_hectares(points: &[GeoPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mean_lat = points.iter().map(|p| p.latitude).sum::<f64>() / n as f64;
    let meters_per_deg_lat = METERS_PER_DEGREE;
    let meters_per_deg_lon = METERS_PER_DEGREE * mean_lat.to_radians().cos();

    if spans_antimeridian(points) {
        tracing::warn!(
            "Boundary spans {:.1}° of longitude; anti-meridian crossings are not supported",
            longitude_span(points)
        );
    }

    let sum: f64 = (0..n)
        .map(|i| {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            let x1 = p1.longitude * meters_per_deg_lon;
            let y1 = p1.latitude * meters_per_deg_lat;
            let x2 = p2.longitude * meters_per_deg_lon;
            let y2 = p2.latitude * meters_per_deg_lat;
            x1 * y2 - x2 * y1
        })
        .sum();

    sum.abs() / 2.0 / SQUARE_METERS_PER_HECTARE
}

fn longitude_span(points: &[GeoPoint]) -> f64 {
    let (min_lon, max_lon) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.longitude), hi.max(p.longitude))
        });
    max_lon - min_lon
}

/// True when the boundary covers more than 180° of longitude, which for a
/// field-sized polygon means it wraps across the ±180° meridian. The area of
/// such a boundary is computed without unwrapping and is far too large.
pub fn spans_antimeridian(points: &[GeoPoint]) -> bool {
    points.len() >= 2 && longitude_span(points) > 180.0
}

/// Rejects non-finite or out-of-range coordinates before estimation.
pub fn validate_boundary(points: &[GeoPoint]) -> Result<()> {
    for (index, point) in points.iter().enumerate() {
        if !point.latitude.is_finite() || !point.longitude.is_finite() {
            return Err(FarmError::validation(format!(
                "point {} has a non-finite coordinate ({}, {})",
                index, point.latitude, point.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&point.latitude) {
            return Err(FarmError::validation(format!(
                "point {} latitude {} is outside [-90, 90]",
                index, point.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&point.longitude) {
            return Err(FarmError::validation(format!(
                "point {} longitude {} is outside [-180, 180]",
                index, point.longitude
            )));
        }
    }
    Ok(())
}

/// Reads boundary points from CSV with `latitude,longitude` (or `lat,lon`) headers.
pub fn read_boundary_csv<R: std::io::Read>(reader: R) -> Result<Vec<GeoPoint>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let points = csv_reader
        .deserialize::<GeoPoint>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    tracing::debug!("Read {} boundary points", points.len());
    Ok(points)
}

/// Boundary drawn on the map during a single field-selection session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSelection {
    markers: Vec<GeoPoint>,
    polygon: Vec<GeoPoint>,
}

impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both markers and polygon, e.g. after the map reports a drag.
    pub fn update(&mut self, markers: Vec<GeoPoint>, polygon: Vec<GeoPoint>) {
        self.markers = markers;
        self.polygon = polygon;
    }

    pub fn add_marker(&mut self, point: GeoPoint) {
        self.markers.push(point);
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.polygon.clear();
    }

    pub fn markers(&self) -> &[GeoPoint] {
        &self.markers
    }

    pub fn polygon(&self) -> &[GeoPoint] {
        &self.polygon
    }

    /// The polygon, or the raw markers when no polygon was closed but at
    /// least three markers exist.
    pub fn boundary(&self) -> &[GeoPoint] {
        if self.polygon.is_empty() && self.markers.len() >= 3 {
            &self.markers
        } else {
            &self.polygon
        }
    }

    pub fn area_hectares(&self) -> f64 {
        polygon_area_hectares(self.boundary())
    }

    /// Short label of the first four boundary points.
    pub fn coordinates_text(&self) -> String {
        let boundary = self.boundary();
        if boundary.is_empty() {
            return "No area selected".to_string();
        }

        let formatted = boundary
            .iter()
            .take(4)
            .map(|p| format!("{:.4}, {:.4}", p.latitude, p.longitude))
            .collect::<Vec<_>>()
            .join(" • ");

        if boundary.len() > 4 {
            format!("{}...", formatted)
        } else {
            formatted
        }
    }
}
