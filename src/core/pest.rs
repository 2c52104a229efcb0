//! Crop scan results: treatment lookup and the scan history.
//!
//! Image capture and classification happen elsewhere; this module starts from
//! a disease name, a confidence and a severity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::{Storage, TreatmentLookup};
use crate::domain::model::{PestAnalysisResult, PestSeverity};
use crate::utils::error::{FarmError, Result};
use crate::utils::validation::validate_non_empty_string;

pub const SCAN_HISTORY_FILENAME: &str = "scans.json";

/// Used when the lookup has no entry for a disease.
pub const FALLBACK_TREATMENT: &str = "Consult agronomist.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub name: String,
    pub treatment: String,
}

#[derive(Debug, Deserialize)]
struct TreatmentFile {
    treatments: Vec<Treatment>,
}

/// In-memory treatment table keyed by exact disease name.
#[derive(Debug, Clone, Default)]
pub struct StaticTreatments {
    by_name: HashMap<String, String>,
}

impl StaticTreatments {
    pub fn new(treatments: impl IntoIterator<Item = Treatment>) -> Self {
        Self {
            by_name: treatments
                .into_iter()
                .map(|t| (t.name, t.treatment))
                .collect(),
        }
    }

    /// Parses `{"treatments": [{"name": ..., "treatment": ...}]}`.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: TreatmentFile = serde_json::from_slice(data)?;
        Ok(Self::new(file.treatments))
    }

    pub fn builtin() -> Self {
        Self::new(
            [
                ("Early Blight", "Remove infected leaves and apply a copper-based fungicide."),
                ("Leaf Spot", "Improve air circulation and avoid overhead watering."),
                ("Powdery Mildew", "Use sulfur-based fungicide."),
                ("Leaf Rust", "Monitor and apply fungicide if spreading."),
            ]
            .into_iter()
            .map(|(name, treatment)| Treatment {
                name: name.to_string(),
                treatment: treatment.to_string(),
            }),
        )
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl TreatmentLookup for StaticTreatments {
    fn treatment(&self, disease: &str) -> Option<String> {
        self.by_name.get(disease).cloned()
    }
}

pub fn recommendation_for<T: TreatmentLookup>(lookup: &T, disease: &str) -> String {
    lookup.treatment(disease).unwrap_or_else(|| {
        tracing::debug!("No treatment on file for '{}'", disease);
        FALLBACK_TREATMENT.to_string()
    })
}

/// Scan results, newest first, with an optional severity filter for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanHistory {
    entries: Vec<PestAnalysisResult>,
    #[serde(skip)]
    filter: Option<PestSeverity>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two example scans from the previous days, shown before any real scan exists.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let mut history = Self::new();
        history.entries = vec![
            PestAnalysisResult {
                id: Uuid::new_v4(),
                disease_name: "Powdery Mildew".to_string(),
                confidence: 0.82,
                severity: PestSeverity::Moderate,
                recommendation: "Use sulfur-based fungicide.".to_string(),
                date: now - Duration::days(1),
            },
            PestAnalysisResult {
                id: Uuid::new_v4(),
                disease_name: "Leaf Rust".to_string(),
                confidence: 0.65,
                severity: PestSeverity::Mild,
                recommendation: "Monitor and apply fungicide if spreading.".to_string(),
                date: now - Duration::days(2),
            },
        ];
        history
    }

    /// Builds a result for `disease` and puts it at the front of the history.
    pub fn record_scan<T: TreatmentLookup>(
        &mut self,
        lookup: &T,
        disease: &str,
        confidence: f64,
        severity: PestSeverity,
        date: DateTime<Utc>,
    ) -> Result<&PestAnalysisResult> {
        validate_non_empty_string("disease_name", disease)
            .map_err(|e| FarmError::validation(e.to_string()))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(FarmError::validation(format!(
                "confidence {} is outside [0, 1]",
                confidence
            )));
        }

        let result = PestAnalysisResult {
            id: Uuid::new_v4(),
            disease_name: disease.trim().to_string(),
            confidence,
            severity,
            recommendation: recommendation_for(lookup, disease.trim()),
            date,
        };
        tracing::info!(
            "Scan recorded: {} ({}, {:.0}% confidence)",
            result.disease_name,
            result.severity,
            result.confidence * 100.0
        );
        self.entries.insert(0, result);
        Ok(&self.entries[0])
    }

    pub fn latest(&self) -> Option<&PestAnalysisResult> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[PestAnalysisResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter(&self) -> Option<PestSeverity> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Option<PestSeverity>) {
        self.filter = filter;
    }

    /// Entries matching the current filter, or all of them when unset.
    pub fn filtered(&self) -> Vec<&PestAnalysisResult> {
        self.entries
            .iter()
            .filter(|entry| self.filter.map_or(true, |f| entry.severity == f))
            .collect()
    }

    /// Loads saved scans, or an empty history when none were saved.
    pub async fn load<S: Storage>(storage: &S) -> Result<Self> {
        if !storage.exists(SCAN_HISTORY_FILENAME).await {
            return Ok(Self::new());
        }
        let data = storage.read_file(SCAN_HISTORY_FILENAME).await?;
        let entries: Vec<PestAnalysisResult> = serde_json::from_slice(&data)?;
        Ok(Self {
            entries,
            filter: None,
        })
    }

    pub async fn save<S: Storage>(&self, storage: &S) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.entries)?;
        storage.write_file(SCAN_HISTORY_FILENAME, &data).await?;
        tracing::debug!("Saved {} scans", self.entries.len());
        Ok(())
    }
}
