pub mod export;
pub mod field_area;
pub mod optimization;
pub mod pest;
pub mod profile;
pub mod sensor;
pub mod yield_predictor;

pub use crate::domain::model::{FarmPlan, FarmPlanInput, GeoPoint, YieldPrediction};
pub use crate::domain::ports::{ConfigProvider, SensorSource, Storage, TreatmentLookup, WeatherSource};
pub use crate::utils::error::Result;
