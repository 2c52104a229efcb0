use crate::domain::model::{SensorReading, SensorType};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Source of the per-prediction weather multiplier, in `[0.9, 1.2)`.
pub trait WeatherSource {
    fn draw_boost(&mut self) -> f64;
}

/// Source of sensor samples; replaces timer-driven generation.
pub trait SensorSource {
    fn read(&mut self, sensor_type: SensorType) -> SensorReading;
}

/// Maps a disease name to a treatment text.
pub trait TreatmentLookup {
    fn treatment(&self, disease: &str) -> Option<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn seed(&self) -> Option<u64>;
    fn default_region(&self) -> &str;
}
