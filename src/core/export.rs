use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

use crate::core::{ConfigProvider, Storage};
use crate::domain::model::{FarmPlan, YieldPrediction};
use crate::utils::error::{FarmError, Result};

pub const PLAN_CSV_FILENAME: &str = "SmartFarmAI-Plan.csv";
pub const PLAN_BUNDLE_FILENAME: &str = "SmartFarmAI-Plan.zip";

/// Encodes one CSV record without its line terminator.
fn csv_row(fields: &[&str]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer.into_inner().map_err(|e| FarmError::ProcessingError {
        message: format!("failed to flush CSV row: {}", e),
    })?;
    let row = String::from_utf8(bytes).map_err(|e| FarmError::ProcessingError {
        message: format!("CSV row is not UTF-8: {}", e),
    })?;
    Ok(row.trim_end_matches('\n').to_string())
}

/// Sectioned CSV: plan summary, planting dates, then monthly yields when a
/// prediction is available. Sections are separated by blank lines.
pub fn plan_csv(plan: &FarmPlan, prediction: Option<&YieldPrediction>) -> Result<String> {
    let mut lines = vec![
        csv_row(&["Smart Farm AI Plan"])?,
        csv_row(&["Crop", "Region", "Soil", "Farm Size (ha)", "Created"])?,
        csv_row(&[
            plan.crop.display_name(),
            &plan.region,
            &plan.soil_quality.to_string(),
            &format!("{:.2}", plan.farm_size_ha),
            &plan.created_at.to_rfc3339(),
        ])?,
        String::new(),
        csv_row(&["Planting Dates"])?,
    ];
    for date in &plan.planting_dates {
        lines.push(date.format("%Y-%m-%d").to_string());
    }

    if let Some(prediction) = prediction {
        lines.push(String::new());
        lines.push(csv_row(&["Monthly Yields"])?);
        for point in &prediction.monthly_yields {
            lines.push(csv_row(&[
                &point.month.format("%Y-%m").to_string(),
                &format!("{:.2}", point.tonnes),
            ])?);
        }
    }

    Ok(lines.join("\n"))
}

pub fn prediction_json(prediction: &YieldPrediction) -> Result<String> {
    Ok(serde_json::to_string_pretty(prediction)?)
}

pub struct PlanExporter<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> PlanExporter<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_location(&self, filename: &str) -> String {
        format!("{}/{}", self.config.output_path(), filename)
    }

    pub async fn export_csv(
        &self,
        plan: &FarmPlan,
        prediction: Option<&YieldPrediction>,
    ) -> Result<String> {
        let csv = plan_csv(plan, prediction)?;
        tracing::debug!("Writing plan CSV ({} bytes)", csv.len());
        self.storage
            .write_file(PLAN_CSV_FILENAME, csv.as_bytes())
            .await?;
        Ok(self.output_location(PLAN_CSV_FILENAME))
    }

    /// ZIP with `plan.csv`, `plan.json` and, if present, `prediction.json`.
    pub async fn export_bundle(
        &self,
        plan: &FarmPlan,
        prediction: Option<&YieldPrediction>,
    ) -> Result<String> {
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("plan.csv", FileOptions::default())?;
            zip.write_all(plan_csv(plan, prediction)?.as_bytes())?;

            zip.start_file::<_, ()>("plan.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(plan)?.as_bytes())?;

            if let Some(prediction) = prediction {
                zip.start_file::<_, ()>("prediction.json", FileOptions::default())?;
                zip.write_all(prediction_json(prediction)?.as_bytes())?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing plan bundle ({} bytes)", zip_data.len());
        self.storage
            .write_file(PLAN_BUNDLE_FILENAME, &zip_data)
            .await?;
        Ok(self.output_location(PLAN_BUNDLE_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::yield_predictor::{default_recommendations, generate_plan, predict_yield};
    use crate::domain::model::{Crop, FarmPlanInput};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.lock().await.get(path).cloned().ok_or_else(|| {
                FarmError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            "test_output"
        }

        fn seed(&self) -> Option<u64> {
            None
        }

        fn default_region(&self) -> &str {
            "Midwest"
        }
    }

    fn sample_plan() -> (FarmPlan, YieldPrediction) {
        let input = FarmPlanInput::new(Crop::Corn, "Great Plains", 4, 20.0);
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let plan = generate_plan(&input, start, default_recommendations()).unwrap();
        let prediction = predict_yield(&input, 1.0, 2024);
        (plan, prediction)
    }

    #[test]
    fn test_plan_csv_sections() {
        let (plan, prediction) = sample_plan();
        let csv = plan_csv(&plan, Some(&prediction)).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines[0], "Smart Farm AI Plan");
        assert_eq!(lines[1], "Crop,Region,Soil,Farm Size (ha),Created");
        assert!(lines[2].starts_with("Corn,Great Plains,4,20.00,"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Planting Dates");
        assert_eq!(lines[5], "2024-03-04");
        assert_eq!(lines[7], "2024-04-15");
        assert_eq!(lines[8], "2024-05-06");
        assert_eq!(lines[9], "");
        assert_eq!(lines[10], "Monthly Yields");
        assert!(lines[11].starts_with("2024-01,"));
        assert!(lines[22].starts_with("2024-12,"));
        assert_eq!(lines.len(), 23);
    }

    #[test]
    fn test_plan_csv_without_prediction() {
        let (plan, _) = sample_plan();
        let csv = plan_csv(&plan, None).unwrap();
        assert!(!csv.contains("Monthly Yields"));
        assert_eq!(csv.split('\n').count(), 9);
    }

    #[test]
    fn test_region_with_comma_is_quoted() {
        let (mut plan, _) = sample_plan();
        plan.region = "West, Coastal".to_string();
        let csv = plan_csv(&plan, None).unwrap();
        assert!(csv.contains("\"West, Coastal\""));
    }

    #[tokio::test]
    async fn test_export_csv_writes_to_storage() {
        let storage = MockStorage::default();
        let exporter = PlanExporter::new(storage.clone(), MockConfig);
        let (plan, prediction) = sample_plan();

        let path = exporter.export_csv(&plan, Some(&prediction)).await.unwrap();
        assert_eq!(path, "test_output/SmartFarmAI-Plan.csv");

        let data = storage.get_file(PLAN_CSV_FILENAME).await.unwrap();
        assert!(String::from_utf8(data).unwrap().starts_with("Smart Farm AI Plan"));
    }

    #[tokio::test]
    async fn test_export_bundle_contents() {
        let storage = MockStorage::default();
        let exporter = PlanExporter::new(storage.clone(), MockConfig);
        let (plan, prediction) = sample_plan();

        exporter.export_bundle(&plan, Some(&prediction)).await.unwrap();

        let zip_bytes = storage.get_file(PLAN_BUNDLE_FILENAME).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["plan.csv", "plan.json", "prediction.json"]);

        let mut content = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("prediction.json").unwrap(), &mut content)
            .unwrap();
        let decoded: YieldPrediction = serde_json::from_str(&content).unwrap();
        assert_eq!(decoded.monthly_yields.len(), 12);
        assert!((decoded.total_yield_tonnes - prediction.total_yield_tonnes).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_export_bundle_without_prediction() {
        let storage = MockStorage::default();
        let exporter = PlanExporter::new(storage.clone(), MockConfig);
        let (plan, _) = sample_plan();

        exporter.export_bundle(&plan, None).await.unwrap();

        let zip_bytes = storage.get_file(PLAN_BUNDLE_FILENAME).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 2);
    }
}
