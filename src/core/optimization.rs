use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{FarmError, Result};
use crate::utils::validation::{validate_range, Validate};

const DRY_SOIL_MOISTURE_PCT: i32 = 35;
const LOW_RAINFALL_MM: i32 = 15;
const URGENT_IRRIGATION_HOURS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    GrainFill,
    Maturity,
}

impl GrowthStage {
    pub const ALL: [GrowthStage; 5] = [
        GrowthStage::Seedling,
        GrowthStage::Vegetative,
        GrowthStage::Flowering,
        GrowthStage::GrainFill,
        GrowthStage::Maturity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "seedling",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::GrainFill => "grain_fill",
            GrowthStage::Maturity => "maturity",
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthStage {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        GrowthStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| FarmError::validation(format!("unknown growth stage '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationInput {
    pub soil_moisture_pct: i32,
    pub recent_rainfall_mm: i32,
    pub growth_stage: GrowthStage,
}

impl Default for OptimizationInput {
    fn default() -> Self {
        Self {
            soil_moisture_pct: 40,
            recent_rainfall_mm: 10,
            growth_stage: GrowthStage::Vegetative,
        }
    }
}

impl Validate for OptimizationInput {
    fn validate(&self) -> Result<()> {
        validate_range("soil_moisture_pct", self.soil_moisture_pct, 0, 100)
            .and_then(|_| validate_range("recent_rainfall_mm", self.recent_rainfall_mm, 0, i32::MAX))
            .map_err(|e| FarmError::validation(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationTip {
    pub icon: String,
    pub text: String,
}

impl OptimizationTip {
    fn new(icon: &str, text: &str) -> Self {
        Self {
            icon: icon.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAdvice {
    pub irrigation_needed: bool,
    pub tips: Vec<OptimizationTip>,
    pub next_task_at: DateTime<Utc>,
}

pub fn irrigation_needed(input: &OptimizationInput) -> bool {
    input.soil_moisture_pct < DRY_SOIL_MOISTURE_PCT && input.recent_rainfall_mm < LOW_RAINFALL_MM
}

pub fn advise(input: &OptimizationInput, now: DateTime<Utc>) -> Result<OptimizationAdvice> {
    input.validate()?;

    let irrigation_needed = irrigation_needed(input);
    let tips = vec![
        OptimizationTip::new(
            "drop",
            if irrigation_needed {
                "Irrigate 15 mm within 24 hours."
            } else {
                "No irrigation needed today."
            },
        ),
        OptimizationTip::new(
            "leaf",
            if input.growth_stage == GrowthStage::Vegetative {
                "Apply nitrogen side-dress (30 kg/ha)."
            } else {
                "Maintain current fertilization schedule."
            },
        ),
        OptimizationTip::new("clock", "Re-evaluate after next rainfall."),
    ];

    let next_task_at = if irrigation_needed {
        now + Duration::hours(URGENT_IRRIGATION_HOURS)
    } else {
        now + Duration::days(1)
    };

    tracing::debug!(
        "Moisture {}%, rainfall {} mm, stage {}: irrigation needed = {}",
        input.soil_moisture_pct,
        input.recent_rainfall_mm,
        input.growth_stage,
        irrigation_needed
    );

    Ok(OptimizationAdvice {
        irrigation_needed,
        tips,
        next_task_at,
    })
}

/// Field task times, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSchedule {
    tasks: Vec<DateTime<Utc>>,
}

impl TaskSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, at: DateTime<Utc>) {
        let index = self.tasks.partition_point(|t| *t <= at);
        self.tasks.insert(index, at);
    }

    pub fn tasks(&self) -> &[DateTime<Utc>] {
        &self.tasks
    }

    pub fn upcoming(&self, now: DateTime<Utc>) -> impl Iterator<Item = &DateTime<Utc>> {
        self.tasks.iter().filter(move |t| **t >= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePoint {
    pub week: String,
    pub liters: f64,
}

/// Water usage over the last four weeks, as shown on the dashboard.
pub fn usage_trend_sample() -> Vec<UsagePoint> {
    [("W1", 120.0), ("W2", 98.0), ("W3", 110.0), ("W4", 90.0)]
        .into_iter()
        .map(|(week, liters)| UsagePoint {
            week: week.to_string(),
            liters,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_dry_field_needs_irrigation() {
        let input = OptimizationInput {
            soil_moisture_pct: 20,
            recent_rainfall_mm: 0,
            growth_stage: GrowthStage::Vegetative,
        };
        let advice = advise(&input, now()).unwrap();
        assert!(advice.irrigation_needed);
        assert!(advice.tips.iter().any(|t| t.text.contains("Irrigate")));
        assert!(advice.tips.iter().any(|t| t.text.contains("nitrogen")));
        assert_eq!(advice.next_task_at, now() + Duration::hours(20));
    }

    #[test]
    fn test_recent_rain_skips_irrigation() {
        let input = OptimizationInput {
            soil_moisture_pct: 20,
            recent_rainfall_mm: 15,
            growth_stage: GrowthStage::Flowering,
        };
        let advice = advise(&input, now()).unwrap();
        assert!(!advice.irrigation_needed);
        assert_eq!(advice.tips[0].text, "No irrigation needed today.");
        assert_eq!(advice.tips[1].text, "Maintain current fertilization schedule.");
        assert_eq!(advice.next_task_at, now() + Duration::days(1));
    }

    #[test]
    fn test_moisture_threshold_is_exclusive() {
        let input = OptimizationInput {
            soil_moisture_pct: 35,
            recent_rainfall_mm: 0,
            growth_stage: GrowthStage::Seedling,
        };
        assert!(!irrigation_needed(&input));
    }

    #[test]
    fn test_invalid_moisture_is_rejected() {
        let input = OptimizationInput {
            soil_moisture_pct: 140,
            ..OptimizationInput::default()
        };
        assert!(advise(&input, now()).is_err());
    }

    #[test]
    fn test_growth_stage_parsing() {
        assert_eq!("grain-fill".parse::<GrowthStage>().unwrap(), GrowthStage::GrainFill);
        assert_eq!("Vegetative".parse::<GrowthStage>().unwrap(), GrowthStage::Vegetative);
        assert!("sprouting".parse::<GrowthStage>().is_err());
    }

    #[test]
    fn test_schedule_stays_sorted() {
        let mut schedule = TaskSchedule::new();
        schedule.add(now() + Duration::days(3));
        schedule.add(now() + Duration::days(1));
        schedule.add(now() + Duration::days(2));
        schedule.add(now() - Duration::days(1));

        let tasks = schedule.tasks();
        assert!(tasks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(schedule.upcoming(now()).count(), 3);
    }

    #[test]
    fn test_usage_trend_sample() {
        let trend = usage_trend_sample();
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0].week, "W1");
        assert_eq!(trend[3].liters, 90.0);
    }
}
