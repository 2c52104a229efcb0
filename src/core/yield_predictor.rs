//! Mock yield model used by the planning form.
//!
//! Total yield is `base × size × soil × region × weather`. The weather boost
//! is the only random term and is drawn once per prediction from an injected
//! [`WeatherSource`]. The monthly curve multiplies `total / 12` by a seasonal
//! factor in `[0.4, 1.0]` that averages 0.7 over a year, so the monthly points
//! sum to roughly 70% of the total rather than to the total itself.

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use uuid::Uuid;

use crate::domain::model::{
    region_factor, FarmPlan, FarmPlanInput, Priority, Recommendation, YieldPoint, YieldPrediction,
};
use crate::domain::ports::WeatherSource;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub const WEATHER_BOOST_MIN: f64 = 0.9;
pub const WEATHER_BOOST_SPAN: f64 = 0.3;

const PLANTING_DATE_COUNT: i64 = 4;
const PLANTING_INTERVAL_WEEKS: i64 = 3;

/// Weather boost drawn uniformly from `[0.9, 1.2)`.
pub struct RandomWeather<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomWeather<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomWeather<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> WeatherSource for RandomWeather<R> {
    fn draw_boost(&mut self) -> f64 {
        WEATHER_BOOST_MIN + self.rng.gen_range(0.0..WEATHER_BOOST_SPAN)
    }
}

/// Always returns the same boost.
#[derive(Debug, Clone, Copy)]
pub struct FixedWeather(pub f64);

impl WeatherSource for FixedWeather {
    fn draw_boost(&mut self) -> f64 {
        self.0
    }
}

pub fn soil_multiplier(soil_quality: u8) -> f64 {
    0.7 + 0.1 * f64::from(soil_quality)
}

/// Seasonal weight for a zero-based month index.
pub fn seasonal_factor(month_index: u32) -> f64 {
    (f64::from(month_index) / 12.0 * 2.0 * PI).sin() * 0.3 + 0.7
}

/// Deterministic core of the model. `input` is expected to be validated.
pub fn predict_yield(input: &FarmPlanInput, weather_boost: f64, year: i32) -> YieldPrediction {
    let total = input.crop.base_yield_per_ha()
        * input.farm_size_ha
        * soil_multiplier(input.soil_quality)
        * region_factor(&input.region)
        * weather_boost;

    let monthly_yields = (0..12u32)
        .filter_map(|m| {
            NaiveDate::from_ymd_opt(year, m + 1, 1).map(|month| YieldPoint {
                month,
                tonnes: (total / 12.0 * seasonal_factor(m)).max(0.0),
            })
        })
        .collect();

    YieldPrediction {
        total_yield_tonnes: total,
        monthly_yields,
    }
}

pub struct YieldPredictor<W: WeatherSource> {
    weather: W,
}

impl<W: WeatherSource> YieldPredictor<W> {
    pub fn new(weather: W) -> Self {
        Self { weather }
    }

    /// Predicts for the current calendar year.
    pub fn predict(&mut self, input: &FarmPlanInput) -> Result<YieldPrediction> {
        self.predict_for_year(input, Local::now().year())
    }

    pub fn predict_for_year(&mut self, input: &FarmPlanInput, year: i32) -> Result<YieldPrediction> {
        input.validate()?;

        let boost = self.weather.draw_boost();
        tracing::debug!(
            "Predicting {} in {} ({} ha, soil {}), weather boost {:.3}",
            input.crop,
            input.region,
            input.farm_size_ha,
            input.soil_quality,
            boost
        );

        let prediction = predict_yield(input, boost, year);
        tracing::info!(
            "Predicted total yield: {:.2} t",
            prediction.total_yield_tonnes
        );
        Ok(prediction)
    }
}

pub fn default_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new("Apply nitrogen at early growth stage.", Priority::Medium),
        Recommendation::new("Consider irrigation during flowering weeks.", Priority::High),
        Recommendation::new("Schedule pest scouting bi-weekly.", Priority::Low),
    ]
}

/// Four planting dates three weeks apart, starting at `start`.
pub fn planting_dates(start: NaiveDate) -> Vec<NaiveDate> {
    (0..PLANTING_DATE_COUNT)
        .map(|offset| start + Duration::weeks(offset * PLANTING_INTERVAL_WEEKS))
        .collect()
}

pub fn generate_plan(
    input: &FarmPlanInput,
    start: NaiveDate,
    recommendations: Vec<Recommendation>,
) -> Result<FarmPlan> {
    input.validate()?;

    let plan = FarmPlan {
        id: Uuid::new_v4(),
        crop: input.crop,
        region: input.region.clone(),
        soil_quality: input.soil_quality,
        farm_size_ha: input.farm_size_ha,
        planting_dates: planting_dates(start),
        recommendations,
        created_at: Utc::now(),
    };
    tracing::debug!("Generated plan {} starting {}", plan.id, start);
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Crop;

    fn corn_midwest() -> FarmPlanInput {
        FarmPlanInput::new(Crop::Corn, "Midwest", 3, 50.0)
    }

    #[test]
    fn test_reference_corn_prediction() {
        let mut predictor = YieldPredictor::new(FixedWeather(1.0));
        let prediction = predictor.predict_for_year(&corn_midwest(), 2024).unwrap();
        assert!((prediction.total_yield_tonnes - 495.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_product_of_factors_with_unit_boost() {
        for crop in Crop::ALL {
            for soil in 1..=5u8 {
                let input = FarmPlanInput::new(crop, "Southeast", soil, 12.5);
                let prediction = predict_yield(&input, 1.0, 2024);
                let expected = crop.base_yield_per_ha() * 12.5 * soil_multiplier(soil) * 0.95;
                assert_eq!(prediction.total_yield_tonnes, expected);
            }
        }
    }

    #[test]
    fn test_soil_multiplier_range() {
        assert!((soil_multiplier(1) - 0.8).abs() < 1e-12);
        assert!((soil_multiplier(3) - 1.0).abs() < 1e-12);
        assert!((soil_multiplier(5) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_region_is_neutral() {
        let known = predict_yield(&FarmPlanInput::new(Crop::Wheat, "Great Plains", 3, 10.0), 1.0, 2024);
        let unknown = predict_yield(&FarmPlanInput::new(Crop::Wheat, "Patagonia", 3, 10.0), 1.0, 2024);
        assert_eq!(known.total_yield_tonnes, unknown.total_yield_tonnes);
        assert!((unknown.total_yield_tonnes - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_breakdown_covers_calendar_year() {
        let prediction = predict_yield(&corn_midwest(), 1.0, 2025);
        assert_eq!(prediction.monthly_yields.len(), 12);
        for (i, point) in prediction.monthly_yields.iter().enumerate() {
            assert_eq!(point.month, NaiveDate::from_ymd_opt(2025, i as u32 + 1, 1).unwrap());
            assert!(point.tonnes >= 0.0);
        }
        // January has factor 0.7, April peaks at 1.0, October bottoms at 0.4.
        let per_month = prediction.total_yield_tonnes / 12.0;
        assert!((prediction.monthly_yields[0].tonnes - per_month * 0.7).abs() < 1e-9);
        assert!((prediction.monthly_yields[3].tonnes - per_month).abs() < 1e-9);
        assert!((prediction.monthly_yields[9].tonnes - per_month * 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_sum_is_seventy_percent_of_total() {
        let prediction = predict_yield(&corn_midwest(), 1.0, 2024);
        let sum: f64 = prediction.monthly_yields.iter().map(|p| p.tonnes).sum();
        assert!((sum - 0.7 * prediction.total_yield_tonnes).abs() < 1e-6);
    }

    #[test]
    fn test_seasonal_factor_bounds() {
        for m in 0..12 {
            let f = seasonal_factor(m);
            assert!((0.4 - 1e-12..=1.0 + 1e-12).contains(&f), "month {} factor {}", m, f);
        }
    }

    #[test]
    fn test_random_weather_within_bounds() {
        let mut weather = RandomWeather::seeded(7);
        for _ in 0..1000 {
            let boost = weather.draw_boost();
            assert!((0.9..1.2).contains(&boost), "boost {}", boost);
        }
    }

    #[test]
    fn test_seeded_weather_is_reproducible() {
        let mut a = YieldPredictor::new(RandomWeather::seeded(42));
        let mut b = YieldPredictor::new(RandomWeather::seeded(42));
        let input = corn_midwest();
        let pa = a.predict_for_year(&input, 2024).unwrap();
        let pb = b.predict_for_year(&input, 2024).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_one_draw_per_prediction() {
        struct Counting(u32);
        impl WeatherSource for Counting {
            fn draw_boost(&mut self) -> f64 {
                self.0 += 1;
                1.0
            }
        }

        let mut predictor = YieldPredictor::new(Counting(0));
        predictor.predict_for_year(&corn_midwest(), 2024).unwrap();
        predictor.predict_for_year(&corn_midwest(), 2024).unwrap();
        assert_eq!(predictor.weather.0, 2);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_drawing() {
        let mut predictor = YieldPredictor::new(FixedWeather(1.0));
        let bad_soil = FarmPlanInput::new(Crop::Rice, "West", 0, 10.0);
        let bad_size = FarmPlanInput::new(Crop::Rice, "West", 3, -2.0);
        assert!(predictor.predict_for_year(&bad_soil, 2024).is_err());
        assert!(predictor.predict_for_year(&bad_size, 2024).is_err());
    }

    #[test]
    fn test_planting_dates_are_three_weeks_apart() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates = planting_dates(start);
        assert_eq!(
            dates,
            vec![
                start,
                NaiveDate::from_ymd_opt(2024, 3, 22).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_generate_plan_copies_input() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let plan = generate_plan(&corn_midwest(), start, default_recommendations()).unwrap();
        assert_eq!(plan.crop, Crop::Corn);
        assert_eq!(plan.region, "Midwest");
        assert_eq!(plan.soil_quality, 3);
        assert_eq!(plan.farm_size_ha, 50.0);
        assert_eq!(plan.planting_dates.len(), 4);
        assert_eq!(plan.recommendations.len(), 3);
        assert_eq!(plan.recommendations[1].level, Priority::High);
    }
}
