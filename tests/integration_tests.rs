use chrono::NaiveDate;
use smart_farm::core::export::{PlanExporter, PLAN_BUNDLE_FILENAME, PLAN_CSV_FILENAME};
use smart_farm::core::profile::ProfileStore;
use smart_farm::core::yield_predictor::{default_recommendations, generate_plan};
use smart_farm::{
    Crop, FarmConfig, FarmPlanInput, FixedWeather, LocalStorage, RandomWeather, YieldPredictor,
};
use tempfile::TempDir;

fn config_for(output_path: &str, bundle: bool) -> FarmConfig {
    let mut config = FarmConfig::default();
    config.output.path = output_path.to_string();
    config.output.bundle = bundle;
    config
}

#[tokio::test]
async fn test_end_to_end_prediction_and_export() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let input = FarmPlanInput::from_form(Crop::Corn, "Midwest", 3, "50").unwrap();
    let mut predictor = YieldPredictor::new(FixedWeather(1.0));
    let prediction = predictor.predict_for_year(&input, 2025).unwrap();
    assert!((prediction.total_yield_tonnes - 495.0).abs() < 1e-9);

    let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let plan = generate_plan(&input, start, default_recommendations()).unwrap();

    let storage = LocalStorage::new(output_path.clone());
    let exporter = PlanExporter::new(storage, config_for(&output_path, true));

    let csv_path = exporter.export_csv(&plan, Some(&prediction)).await.unwrap();
    assert!(csv_path.ends_with(PLAN_CSV_FILENAME));

    let csv = std::fs::read_to_string(temp_dir.path().join(PLAN_CSV_FILENAME)).unwrap();
    assert!(csv.starts_with("Smart Farm AI Plan\n"));
    assert!(csv.contains("Corn,Midwest,3,50.00,"));
    assert!(csv.contains("2025-04-01"));
    assert!(csv.contains("Monthly Yields"));
    // January: 495 / 12 * 0.7
    let january: f64 = csv
        .lines()
        .find_map(|line| line.strip_prefix("2025-01,"))
        .unwrap()
        .parse()
        .unwrap();
    assert!((january - 495.0 / 12.0 * 0.7).abs() < 0.01, "got {}", january);

    exporter
        .export_bundle(&plan, Some(&prediction))
        .await
        .unwrap();
    let zip_data = std::fs::read(temp_dir.path().join(PLAN_BUNDLE_FILENAME)).unwrap();
    let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);
}

#[test]
fn test_successive_predictions_vary_with_random_weather() {
    let input = FarmPlanInput::new(Crop::Wheat, "West", 4, 30.0);
    let mut predictor = YieldPredictor::new(RandomWeather::seeded(2024));

    let first = predictor.predict_for_year(&input, 2025).unwrap();
    let second = predictor.predict_for_year(&input, 2025).unwrap();
    assert_ne!(first.total_yield_tonnes, second.total_yield_tonnes);

    let nominal = 4.5 * 30.0 * 1.1 * 0.9;
    for prediction in [first, second] {
        let boost = prediction.total_yield_tonnes / nominal;
        assert!((0.9 - 1e-9..1.2).contains(&boost), "boost {}", boost);
    }
}

#[tokio::test]
async fn test_profile_round_trip_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut store = ProfileStore::load(LocalStorage::new(output_path.clone()))
        .await
        .unwrap();
    assert_eq!(store.profile().full_name, "Farmer");

    store
        .update_and_persist(|p| {
            p.full_name = "Grace".to_string();
            p.farm_name = "Hillside Acres".to_string();
        })
        .await
        .unwrap();

    let reloaded = ProfileStore::load(LocalStorage::new(output_path))
        .await
        .unwrap();
    assert_eq!(reloaded.profile().full_name, "Grace");
    assert_eq!(reloaded.profile().farm_name, "Hillside Acres");
}
