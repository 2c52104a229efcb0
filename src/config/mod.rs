pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "smart-farm")]
#[command(about = "Field area, yield and optimization calculators for farm planning")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the output directory from the configuration
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Estimate the area of a field boundary in hectares
    Area {
        /// Boundary point as "lat,lon"; repeat for each corner
        #[arg(short, long = "point", allow_hyphen_values = true)]
        points: Vec<String>,

        /// CSV file with latitude,longitude columns
        #[arg(long)]
        points_file: Option<String>,
    },

    /// Predict total and monthly yield, optionally exporting a plan
    Predict {
        #[arg(long)]
        crop: String,

        /// Defaults to prediction.default_region from the configuration
        #[arg(long)]
        region: Option<String>,

        #[arg(long, default_value = "3")]
        soil: u8,

        /// Farm size in hectares
        #[arg(long)]
        size: String,

        /// Seed the weather draw for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Write the plan CSV (and bundle, if configured) to the output directory
        #[arg(long)]
        export: bool,
    },

    /// Irrigation and fertilization advice for current field conditions
    Optimize {
        #[arg(long, default_value = "40")]
        moisture: i32,

        #[arg(long, default_value = "10")]
        rainfall: i32,

        #[arg(long, default_value = "vegetative")]
        stage: String,
    },

    /// Take one reading from each simulated sensor
    Sensors {
        /// Only read this sensor type
        #[arg(long = "type")]
        sensor_type: Option<String>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record a crop scan result and list the scan history
    Pest {
        /// Disease reported by the scan; omit to only list the history
        #[arg(long)]
        disease: Option<String>,

        #[arg(long, default_value = "0.91")]
        confidence: f64,

        #[arg(long, default_value = "severe")]
        severity: String,

        /// Only list scans of this severity
        #[arg(long)]
        filter: Option<String>,

        /// JSON file with {"treatments": [{"name", "treatment"}]}
        #[arg(long)]
        treatments: Option<String>,
    },

    /// Show or update the saved user profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        farm: Option<String>,
    },

    /// Validate the configuration file and print a summary
    CheckConfig,
}
