pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::cli::LocalStorage;

pub use crate::config::toml_config::FarmConfig;
pub use crate::core::field_area::{polygon_area_hectares, FieldSelection};
pub use crate::core::yield_predictor::{predict_yield, FixedWeather, RandomWeather, YieldPredictor};
pub use crate::domain::model::{Crop, FarmPlan, FarmPlanInput, GeoPoint, YieldPoint, YieldPrediction};
pub use crate::utils::error::{FarmError, Result};
