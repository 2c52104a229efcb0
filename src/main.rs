use chrono::{Local, Utc};
use clap::Parser;
use smart_farm::core::export::PlanExporter;
use smart_farm::core::field_area::{read_boundary_csv, validate_boundary};
use smart_farm::core::optimization::{advise, usage_trend_sample, OptimizationInput};
use smart_farm::core::pest::{ScanHistory, StaticTreatments};
use smart_farm::core::profile::ProfileStore;
use smart_farm::core::sensor::{RandomSensorSource, Sensor};
use smart_farm::core::yield_predictor::{default_recommendations, generate_plan};
use smart_farm::core::{ConfigProvider, SensorSource, WeatherSource};
use smart_farm::domain::model::{PestSeverity, SensorType};
use smart_farm::utils::error::ErrorSeverity;
use smart_farm::utils::{logger, validation::Validate};
use smart_farm::{
    polygon_area_hectares, CliConfig, Command, Crop, FarmConfig, FarmError, FarmPlanInput,
    GeoPoint, LocalStorage, RandomWeather, Result, YieldPredictor,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let level = config.logging.level.as_deref();
    if cli.log_json || config.logging.json {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_config(cli: &CliConfig) -> Result<FarmConfig> {
    let mut config = match &cli.config {
        Some(path) => FarmConfig::from_file(path)?,
        None => FarmConfig::default(),
    };
    if let Some(output_path) = &cli.output_path {
        config.output.path = output_path.clone();
    }
    Ok(config)
}

async fn run(command: Command, config: FarmConfig) -> Result<()> {
    match command {
        Command::Area {
            points,
            points_file,
        } => run_area(points, points_file),
        Command::Predict {
            crop,
            region,
            soil,
            size,
            seed,
            export,
        } => {
            let crop: Crop = crop.parse()?;
            let region = region.unwrap_or_else(|| config.default_region().to_string());
            let input = FarmPlanInput::from_form(crop, &region, soil, &size)?;
            let weather = match seed.or(config.seed()) {
                Some(seed) => RandomWeather::seeded(seed),
                None => RandomWeather::from_entropy(),
            };
            run_predict(input, weather, export, config).await
        }
        Command::Optimize {
            moisture,
            rainfall,
            stage,
        } => {
            let input = OptimizationInput {
                soil_moisture_pct: moisture,
                recent_rainfall_mm: rainfall,
                growth_stage: stage.parse()?,
            };
            run_optimize(&input)
        }
        Command::Sensors { sensor_type, seed } => {
            let types = match sensor_type {
                Some(name) => vec![name.parse::<SensorType>()?],
                None => SensorType::ALL.to_vec(),
            };
            let mut source = match seed {
                Some(seed) => RandomSensorSource::seeded(seed),
                None => RandomSensorSource::from_entropy(),
            };
            run_sensors(&types, &mut source);
            Ok(())
        }
        Command::Pest {
            disease,
            confidence,
            severity,
            filter,
            treatments,
        } => {
            let lookup = match treatments {
                Some(path) => StaticTreatments::from_json(&std::fs::read(&path)?)?,
                None => StaticTreatments::builtin(),
            };
            let scan = match disease {
                Some(disease) => Some((disease, confidence, severity.parse::<PestSeverity>()?)),
                None => None,
            };
            let filter = filter.map(|f| f.parse::<PestSeverity>()).transpose()?;
            run_pest(&lookup, scan, filter, &config).await
        }
        Command::Profile { name, farm } => run_profile(name, farm, &config).await,
        Command::CheckConfig => {
            println!("📋 Configuration Summary:");
            println!("  Output: {}", config.output_path());
            println!("  Bundle: {}", config.output.bundle);
            println!("  Default region: {}", config.default_region());
            match config.seed() {
                Some(seed) => println!("  Seed: {}", seed),
                None => println!("  Seed: (random)"),
            }
            if let Some(start) = config.prediction.plan_start {
                println!("  Plan start: {}", start);
            }
            println!("✅ Configuration is valid");
            Ok(())
        }
    }
}

fn run_area(points: Vec<String>, points_file: Option<String>) -> Result<()> {
    let mut boundary = points
        .iter()
        .map(|p| p.parse::<GeoPoint>())
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = points_file {
        let file = std::fs::File::open(&path)?;
        boundary.extend(read_boundary_csv(file)?);
    }

    if boundary.is_empty() {
        return Err(FarmError::validation(
            "no boundary points given; use --point lat,lon or --points-file",
        ));
    }
    validate_boundary(&boundary)?;

    let area = polygon_area_hectares(&boundary);
    tracing::info!("Estimated area for {} points: {:.4} ha", boundary.len(), area);
    if boundary.len() < 3 {
        tracing::warn!("At least three points are needed to enclose an area");
    }
    println!("📐 Area: {:.2} ha", area);
    Ok(())
}

async fn run_predict<W: WeatherSource>(
    input: FarmPlanInput,
    weather: W,
    export: bool,
    config: FarmConfig,
) -> Result<()> {
    let mut predictor = YieldPredictor::new(weather);
    let prediction = predictor.predict(&input)?;

    println!(
        "🌾 {} in {} ({} ha, soil {})",
        input.crop, input.region, input.farm_size_ha, input.soil_quality
    );
    println!("  Total yield: {:.2} t", prediction.total_yield_tonnes);
    for point in &prediction.monthly_yields {
        println!("  {}  {:>10.2} t", point.month.format("%Y-%m"), point.tonnes);
    }

    if !export {
        return Ok(());
    }

    let start = config
        .prediction
        .plan_start
        .unwrap_or_else(|| Local::now().date_naive());
    let plan = generate_plan(&input, start, default_recommendations())?;
    let bundle = config.output.bundle;

    let storage = LocalStorage::new(config.output_path().to_string());
    let exporter = PlanExporter::new(storage, config);

    let csv_path = exporter.export_csv(&plan, Some(&prediction)).await?;
    println!("📁 Plan saved to: {}", csv_path);
    if bundle {
        let bundle_path = exporter.export_bundle(&plan, Some(&prediction)).await?;
        println!("📦 Bundle saved to: {}", bundle_path);
    }
    Ok(())
}

fn run_optimize(input: &OptimizationInput) -> Result<()> {
    let advice = advise(input, Utc::now())?;
    for tip in &advice.tips {
        println!("  [{}] {}", tip.icon, tip.text);
    }
    println!(
        "🗓  Next task: {}",
        advice.next_task_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!("💧 Water usage (last 4 weeks):");
    for point in usage_trend_sample() {
        println!("  {}  {:>6.0} L", point.week, point.liters);
    }
    Ok(())
}

fn run_sensors<S: SensorSource>(types: &[SensorType], source: &mut S) {
    for sensor_type in types {
        let mut sensor = Sensor::new(*sensor_type, sensor_type.display_name());
        sensor.connect();
        while !sensor.is_connected() {
            sensor.advance();
        }
        let name = sensor.name().to_string();
        if let Some(reading) = sensor.poll(source) {
            println!("📡 {} ({})", name, reading.unit);
            for (metric, value) in &reading.values {
                println!("  {:<18} {:>10.2}", metric, value);
            }
        }
    }
}

async fn run_pest(
    lookup: &StaticTreatments,
    scan: Option<(String, f64, PestSeverity)>,
    filter: Option<PestSeverity>,
    config: &FarmConfig,
) -> Result<()> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let mut history = ScanHistory::load(&storage).await?;
    if history.is_empty() {
        history = ScanHistory::sample(Utc::now());
    }

    if let Some((disease, confidence, severity)) = scan {
        let result = history.record_scan(lookup, &disease, confidence, severity, Utc::now())?;
        println!(
            "🔬 {} ({}, {:.0}%)",
            result.disease_name,
            result.severity,
            result.confidence * 100.0
        );
        println!("  Treatment: {}", result.recommendation);
        history.save(&storage).await?;
    }

    history.set_filter(filter);
    println!("🗂  Scan history:");
    for entry in history.filtered() {
        println!(
            "  {}  {:<16} {:<9} {}",
            entry.date.with_timezone(&Local).format("%Y-%m-%d"),
            entry.disease_name,
            entry.severity,
            entry.recommendation
        );
    }
    Ok(())
}

async fn run_profile(name: Option<String>, farm: Option<String>, config: &FarmConfig) -> Result<()> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let mut store = ProfileStore::load(storage).await?;

    if name.is_some() || farm.is_some() {
        store
            .update_and_persist(|profile| {
                if let Some(name) = name {
                    profile.full_name = name;
                }
                if let Some(farm) = farm {
                    profile.farm_name = farm;
                }
            })
            .await?;
        tracing::info!("✅ Profile updated");
    }

    let profile = store.profile();
    println!("👤 {} ({})", profile.full_name, profile.farm_name);
    Ok(())
}
