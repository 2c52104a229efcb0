use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::str::FromStr;

use crate::domain::model::{SensorReading, SensorType};
use crate::domain::ports::SensorSource;
use crate::utils::error::FarmError;

impl SensorType {
    pub const ALL: [SensorType; 8] = [
        SensorType::SoilPh,
        SensorType::Optical,
        SensorType::Electrochemical,
        SensorType::Mechanical,
        SensorType::AirFlow,
        SensorType::Environmental,
        SensorType::Moisture,
        SensorType::Weather,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SensorType::SoilPh => "Soil pH",
            SensorType::Optical => "Optical",
            SensorType::Electrochemical => "Electrochemical",
            SensorType::Mechanical => "Mechanical",
            SensorType::AirFlow => "Air Flow",
            SensorType::Environmental => "Environmental",
            SensorType::Moisture => "Moisture",
            SensorType::Weather => "Weather",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SensorType::SoilPh => "Measures soil acidity/alkalinity levels",
            SensorType::Optical => "Monitors plant health via NDVI, light intensity, canopy density",
            SensorType::Electrochemical => {
                "Detects nutrient concentrations (nitrates, phosphates, ion levels)"
            }
            SensorType::Mechanical => "Measures soil compaction and resistance",
            SensorType::AirFlow => "Monitors soil aeration and air movement",
            SensorType::Environmental => "Tracks temperature, humidity, light intensity, CO2 levels",
            SensorType::Moisture => "Soil and air humidity monitoring",
            SensorType::Weather => "Wind speed, precipitation, atmospheric pressure",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::SoilPh => "pH",
            SensorType::Optical => "NDVI/Lux",
            SensorType::Electrochemical => "mg/kg",
            SensorType::Mechanical => "kPa",
            SensorType::AirFlow => "cm/s",
            SensorType::Environmental => "°C/%/ppm",
            SensorType::Moisture => "%",
            SensorType::Weather => "m/s/mm/hPa",
        }
    }

    /// Metric names with their plausible `(min, max)` ranges.
    pub fn metric_ranges(&self) -> &'static [(&'static str, f64, f64)] {
        match self {
            SensorType::SoilPh => &[("pH", 4.5, 8.5)],
            SensorType::Optical => &[
                ("NDVI", 0.1, 0.9),
                ("Plant Health", 60.0, 95.0),
                ("Light Intensity", 20_000.0, 120_000.0),
            ],
            SensorType::Electrochemical => &[
                ("Nitrogen", 15.0, 45.0),
                ("Phosphorus", 8.0, 25.0),
                ("Potassium", 12.0, 35.0),
            ],
            SensorType::Mechanical => &[("Compaction", 100.0, 800.0), ("Resistance", 0.5, 3.0)],
            SensorType::AirFlow => &[("Air Permeability", 0.1, 2.5), ("Oxygen Level", 15.0, 21.0)],
            SensorType::Environmental => &[
                ("Temperature", 15.0, 35.0),
                ("Humidity", 40.0, 85.0),
                ("CO2", 350.0, 450.0),
                ("Light", 50_000.0, 100_000.0),
            ],
            SensorType::Moisture => &[("Soil Moisture", 25.0, 75.0), ("Air Humidity", 45.0, 90.0)],
            SensorType::Weather => &[
                ("Wind Speed", 0.0, 25.0),
                ("Precipitation", 0.0, 15.0),
                ("Pressure", 980.0, 1020.0),
            ],
        }
    }
}

impl FromStr for SensorType {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        SensorType::ALL
            .iter()
            .copied()
            .find(|t| t.display_name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| FarmError::validation(format!("unknown sensor type '{}'", s)))
    }
}

/// Simulated hardware: every metric drawn uniformly within its range.
pub struct RandomSensorSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomSensorSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSensorSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SensorSource for RandomSensorSource<R> {
    fn read(&mut self, sensor_type: SensorType) -> SensorReading {
        let values = sensor_type
            .metric_ranges()
            .iter()
            .map(|(name, min, max)| (name.to_string(), self.rng.gen_range(*min..=*max)))
            .collect::<BTreeMap<_, _>>();

        SensorReading {
            sensor_type,
            timestamp: Utc::now(),
            values,
            unit: sensor_type.unit().to_string(),
        }
    }
}

/// Replays queued readings per sensor type; the last one repeats once the
/// queue drains. Types without fixtures yield range midpoints.
#[derive(Debug, Default)]
pub struct FixtureSensorSource {
    queued: HashMap<SensorType, VecDeque<SensorReading>>,
    last: HashMap<SensorType, SensorReading>,
    timestamp: Option<DateTime<Utc>>,
}

impl FixtureSensorSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the timestamp used for midpoint readings.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn push(&mut self, reading: SensorReading) {
        self.queued
            .entry(reading.sensor_type)
            .or_default()
            .push_back(reading);
    }

    fn midpoint(&self, sensor_type: SensorType) -> SensorReading {
        SensorReading {
            sensor_type,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            values: sensor_type
                .metric_ranges()
                .iter()
                .map(|(name, min, max)| (name.to_string(), (min + max) / 2.0))
                .collect(),
            unit: sensor_type.unit().to_string(),
        }
    }
}

impl SensorSource for FixtureSensorSource {
    fn read(&mut self, sensor_type: SensorType) -> SensorReading {
        if let Some(reading) = self
            .queued
            .get_mut(&sensor_type)
            .and_then(|queue| queue.pop_front())
        {
            self.last.insert(sensor_type, reading.clone());
            return reading;
        }
        self.last
            .get(&sensor_type)
            .cloned()
            .unwrap_or_else(|| self.midpoint(sensor_type))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Searching,
    Pairing,
    Connected,
}

/// A paired field sensor. Connection progress and sampling are driven by the
/// caller through [`Sensor::advance`] and [`Sensor::poll`].
#[derive(Debug, Clone)]
pub struct Sensor {
    sensor_type: SensorType,
    name: String,
    status: ConnectionStatus,
    latest: Option<SensorReading>,
}

impl Sensor {
    pub fn new(sensor_type: SensorType, name: impl Into<String>) -> Self {
        Self {
            sensor_type,
            name: name.into(),
            status: ConnectionStatus::Disconnected,
            latest: None,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn latest(&self) -> Option<&SensorReading> {
        self.latest.as_ref()
    }

    pub fn connect(&mut self) {
        if self.status == ConnectionStatus::Disconnected {
            self.status = ConnectionStatus::Searching;
            tracing::debug!("{}: searching", self.name);
        }
    }

    /// Moves one step along searching → pairing → connected.
    pub fn advance(&mut self) -> ConnectionStatus {
        self.status = match self.status {
            ConnectionStatus::Searching => ConnectionStatus::Pairing,
            ConnectionStatus::Pairing => ConnectionStatus::Connected,
            other => other,
        };
        tracing::debug!("{}: {:?}", self.name, self.status);
        self.status
    }

    pub fn disconnect(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.latest = None;
    }

    /// Takes a fresh reading when connected.
    pub fn poll<S: SensorSource + ?Sized>(&mut self, source: &mut S) -> Option<&SensorReading> {
        if !self.is_connected() {
            return None;
        }
        self.latest = Some(source.read(self.sensor_type));
        self.latest.as_ref()
    }
}
