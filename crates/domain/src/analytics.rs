//! Hourly analytics: usage buckets merged with carbon intensity and price.
//!
//! Readings are bucketed on the top of the hour and averaged. Each hour is
//! then joined with the grid carbon intensity for that hour (falling back to
//! its neighbours, then to [`DEFAULT_CARBON_INTENSITY`]) and with a price
//! from a [`PriceModel`]. In local peak hours the suggested usage is
//! [`PEAK_USAGE_FACTOR`] of the measured usage.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{FixedOffset, TimeDelta, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::carbon::CarbonPoint;
use crate::time::{Timestamp, truncate_to_hour};
use crate::usage::Reading;

/// gCO₂/kWh used when no intensity is known around an hour.
pub const DEFAULT_CARBON_INTENSITY: f64 = 150.0;

/// Local hours (start of hour) considered peak: 16:00 to 20:00.
pub const PEAK_HOURS: RangeInclusive<u32> = 16..=19;

/// Share of usage suggested during peak hours.
pub const PEAK_USAGE_FACTOR: f64 = 0.7;

/// Longest window seeded with empty buckets (31 days).
const MAX_SEEDED_HOURS: i64 = 31 * 24;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bucket {
    sum: f64,
    count: u32,
}

impl Bucket {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn average(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Sums and counts readings per hour.
#[derive(Debug, Clone, Default)]
pub struct HourlyAggregator {
    buckets: BTreeMap<Timestamp, Bucket>,
}

impl HourlyAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one empty bucket per hour of `from..=to`, so hours without
    /// readings still show up with usage `0`.
    #[must_use]
    pub fn with_window(from: Timestamp, to: Timestamp) -> Self {
        let mut buckets = BTreeMap::new();
        let mut hour = truncate_to_hour(from);
        let last = truncate_to_hour(to);
        let mut seeded = 0;
        while hour <= last && seeded < MAX_SEEDED_HOURS {
            buckets.insert(hour, Bucket::default());
            hour += TimeDelta::hours(1);
            seeded += 1;
        }
        Self { buckets }
    }

    /// Add a reading. Returns `false` when it carries no usable value.
    pub fn push(&mut self, reading: &Reading) -> bool {
        let Some(power) = reading.usable_power() else {
            return false;
        };
        self.buckets
            .entry(truncate_to_hour(reading.timestamp))
            .or_default()
            .add(power);
        true
    }

    /// Add every reading, returning how many were usable.
    pub fn extend<'a>(&mut self, readings: impl IntoIterator<Item = &'a Reading>) -> usize {
        readings
            .into_iter()
            .filter(|reading| self.push(reading))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `(hour, average)` pairs in ascending order.
    pub fn averages(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.buckets
            .iter()
            .map(|(hour, bucket)| (*hour, bucket.average()))
    }
}

/// Carbon intensity per hour, with neighbour fallback.
#[derive(Debug, Clone, Default)]
pub struct CarbonSeries {
    hourly: BTreeMap<Timestamp, f64>,
}

impl CarbonSeries {
    /// Half-hourly points falling in the same hour are averaged.
    #[must_use]
    pub fn from_points(points: &[CarbonPoint]) -> Self {
        let mut buckets: BTreeMap<Timestamp, Bucket> = BTreeMap::new();
        for point in points.iter().filter(|p| p.intensity.is_finite()) {
            buckets
                .entry(truncate_to_hour(point.timestamp))
                .or_default()
                .add(point.intensity);
        }
        Self {
            hourly: buckets
                .into_iter()
                .map(|(hour, bucket)| (hour, bucket.average()))
                .collect(),
        }
    }

    /// Intensity for `hour`, else the hour before, else the hour after,
    /// else [`DEFAULT_CARBON_INTENSITY`].
    #[must_use]
    pub fn intensity_at(&self, hour: Timestamp) -> f64 {
        let hour = truncate_to_hour(hour);
        [hour, hour - TimeDelta::hours(1), hour + TimeDelta::hours(1)]
            .iter()
            .find_map(|candidate| self.hourly.get(candidate).copied())
            .unwrap_or(DEFAULT_CARBON_INTENSITY)
    }
}

/// Source of energy prices (pence per kWh) for a given hour.
pub trait PriceModel {
    fn price(&self, hour: Timestamp, peak: bool) -> f64;
}

/// Placeholder tariff until a real price feed exists.
///
/// Prices are pseudo-random but reproducible: the same seed and hour always
/// give the same price. Peak hours draw from a higher band.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticTariff {
    seed: u64,
}

impl SyntheticTariff {
    pub const OFF_PEAK_BASE: f64 = 12.0;
    pub const PEAK_BASE: f64 = 25.0;
    const SPREAD: f64 = 8.0;

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl PriceModel for SyntheticTariff {
    fn price(&self, hour: Timestamp, peak: bool) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ hour.timestamp().unsigned_abs());
        let base = if peak {
            Self::PEAK_BASE
        } else {
            Self::OFF_PEAK_BASE
        };
        let price = base + rng.gen_range(0.0..Self::SPREAD);
        (price * 100.0).round() / 100.0
    }
}

/// Whether `hour` falls in [`PEAK_HOURS`] at the given local offset.
#[must_use]
pub fn is_peak_hour(hour: Timestamp, offset: FixedOffset) -> bool {
    PEAK_HOURS.contains(&hour.with_timezone(&offset).hour())
}

/// One merged hourly row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub timestamp: Timestamp,
    /// Average wattage over the hour.
    pub usage: f64,
    pub carbon_intensity: f64,
    pub energy_price: f64,
    pub suggested_usage: f64,
}

/// Whether the rows were built from real readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    /// Readings were unavailable and fabricated by [`synthetic_readings`].
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub rows: Vec<AnalyticsRow>,
    pub source: DataSource,
}

impl AnalyticsReport {
    #[must_use]
    pub fn total_usage(&self) -> f64 {
        self.rows.iter().map(|row| row.usage).sum()
    }

    /// Usage that following the peak-hour suggestion would avoid.
    #[must_use]
    pub fn potential_saving(&self) -> f64 {
        self.rows
            .iter()
            .map(|row| row.usage - row.suggested_usage)
            .sum()
    }

    #[must_use]
    pub fn average_carbon_intensity(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let sum: f64 = self.rows.iter().map(|row| row.carbon_intensity).sum();
        #[allow(clippy::cast_precision_loss)]
        Some(sum / self.rows.len() as f64)
    }
}

/// Merge hourly usage with carbon intensity and price, ascending by hour.
#[must_use]
pub fn merge_hourly(
    usage: &HourlyAggregator,
    carbon: &CarbonSeries,
    prices: &impl PriceModel,
    offset: FixedOffset,
) -> Vec<AnalyticsRow> {
    usage
        .averages()
        .map(|(hour, usage)| {
            let peak = is_peak_hour(hour, offset);
            AnalyticsRow {
                timestamp: hour,
                usage,
                carbon_intensity: carbon.intensity_at(hour),
                energy_price: prices.price(hour, peak),
                suggested_usage: if peak { usage * PEAK_USAGE_FACTOR } else { usage },
            }
        })
        .collect()
}

/// One plausible reading (20 to 119 W) per hour for the `hours` hours up to `now`.
#[must_use]
pub fn synthetic_readings(now: Timestamp, hours: u32, seed: u64) -> Vec<Reading> {
    let mut rng = StdRng::seed_from_u64(seed);
    let end = truncate_to_hour(now);
    (0..hours)
        .rev()
        .map(|ago| {
            let power = f64::from(rng.gen_range(20u32..120));
            Reading::new(end - TimeDelta::hours(i64::from(ago)), power)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 12, 1, hour, minute, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    struct FlatPrice;

    impl PriceModel for FlatPrice {
        fn price(&self, _hour: Timestamp, peak: bool) -> f64 {
            if peak { 30.0 } else { 10.0 }
        }
    }

    #[test]
    fn should_average_readings_within_the_hour() {
        let mut agg = HourlyAggregator::new();
        agg.push(&Reading::new(at(10, 5), 100.0));
        agg.push(&Reading::new(at(10, 55), 50.0));
        agg.push(&Reading::new(at(11, 0), 10.0));
        let averages: Vec<_> = agg.averages().collect();
        assert_eq!(averages, vec![(at(10, 0), 75.0), (at(11, 0), 10.0)]);
    }

    #[test]
    fn should_skip_readings_without_usable_value() {
        let mut agg = HourlyAggregator::new();
        let readings = [
            Reading {
                timestamp: at(9, 0),
                power: None,
            },
            Reading::new(at(9, 10), f64::INFINITY),
            Reading::new(at(9, 20), 40.0),
        ];
        assert_eq!(agg.extend(&readings), 1);
        assert_eq!(agg.averages().collect::<Vec<_>>(), vec![(at(9, 0), 40.0)]);
    }

    #[test]
    fn should_average_empty_bucket_to_zero_when_window_seeded() {
        let agg = HourlyAggregator::with_window(at(8, 30), at(10, 15));
        let averages: Vec<_> = agg.averages().collect();
        assert_eq!(averages.len(), 3);
        assert!(averages.iter().all(|(_, avg)| *avg == 0.0 && !avg.is_nan()));
    }

    #[test]
    fn should_produce_no_rows_for_empty_input() {
        let rows = merge_hourly(
            &HourlyAggregator::new(),
            &CarbonSeries::default(),
            &FlatPrice,
            utc(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn should_sort_rows_ascending_for_unsorted_input() {
        let mut agg = HourlyAggregator::new();
        for hour in [14, 3, 22, 9] {
            agg.push(&Reading::new(at(hour, 30), 10.0));
        }
        let rows = merge_hourly(&agg, &CarbonSeries::default(), &FlatPrice, utc());
        let hours: Vec<u32> = rows.iter().map(|r| r.timestamp.hour()).collect();
        assert_eq!(hours, vec![3, 9, 14, 22]);
    }

    #[test]
    fn should_fall_back_to_previous_hour_before_next_hour() {
        let carbon = CarbonSeries::from_points(&[
            CarbonPoint {
                timestamp: at(9, 0),
                intensity: 90.0,
            },
            CarbonPoint {
                timestamp: at(11, 0),
                intensity: 110.0,
            },
        ]);
        assert!((carbon.intensity_at(at(10, 0)) - 90.0).abs() < f64::EPSILON);
        assert!((carbon.intensity_at(at(12, 0)) - 110.0).abs() < f64::EPSILON);
        assert!(
            (carbon.intensity_at(at(20, 0)) - DEFAULT_CARBON_INTENSITY).abs() < f64::EPSILON
        );
    }

    #[test]
    fn should_average_half_hourly_carbon_points() {
        let carbon = CarbonSeries::from_points(&[
            CarbonPoint {
                timestamp: at(9, 0),
                intensity: 80.0,
            },
            CarbonPoint {
                timestamp: at(9, 30),
                intensity: 100.0,
            },
        ]);
        assert!((carbon.intensity_at(at(9, 0)) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reduce_suggested_usage_only_in_peak_hours() {
        let mut agg = HourlyAggregator::new();
        agg.push(&Reading::new(at(15, 0), 100.0));
        agg.push(&Reading::new(at(17, 0), 100.0));
        agg.push(&Reading::new(at(20, 0), 100.0));
        let rows = merge_hourly(&agg, &CarbonSeries::default(), &FlatPrice, utc());
        let suggested: Vec<f64> = rows.iter().map(|r| r.suggested_usage).collect();
        assert!((suggested[0] - 100.0).abs() < f64::EPSILON);
        assert!((suggested[1] - 70.0).abs() < 1e-9);
        assert!((suggested[2] - 100.0).abs() < f64::EPSILON);
        assert!((rows[1].energy_price - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_detect_peak_hours_in_local_time() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert!(is_peak_hour(at(15, 0), plus_two));
        assert!(!is_peak_hour(at(15, 0), utc()));
        assert!(is_peak_hour(at(19, 0), utc()));
        assert!(!is_peak_hour(at(20, 0), utc()));
    }

    #[test]
    fn should_price_deterministically_and_higher_in_peak() {
        let tariff = SyntheticTariff::new(42);
        assert!((tariff.price(at(17, 0), true) - tariff.price(at(17, 0), true)).abs() < f64::EPSILON);
        for hour in 0..24 {
            let off_peak = tariff.price(at(hour, 0), false);
            let peak = tariff.price(at(hour, 0), true);
            assert!((SyntheticTariff::OFF_PEAK_BASE..SyntheticTariff::PEAK_BASE).contains(&off_peak));
            assert!(peak >= SyntheticTariff::PEAK_BASE);
        }
    }

    #[test]
    fn should_generate_one_synthetic_reading_per_hour() {
        let readings = synthetic_readings(at(12, 40), 24, 7);
        assert_eq!(readings.len(), 24);
        assert_eq!(readings.last().map(|r| r.timestamp), Some(at(12, 0)));
        assert!(readings.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(
            readings
                .iter()
                .all(|r| r.power.is_some_and(|p| (20.0..120.0).contains(&p)))
        );
    }

    #[test]
    fn should_summarise_report() {
        let report = AnalyticsReport {
            rows: vec![
                AnalyticsRow {
                    timestamp: at(16, 0),
                    usage: 100.0,
                    carbon_intensity: 100.0,
                    energy_price: 30.0,
                    suggested_usage: 70.0,
                },
                AnalyticsRow {
                    timestamp: at(21, 0),
                    usage: 50.0,
                    carbon_intensity: 200.0,
                    energy_price: 10.0,
                    suggested_usage: 50.0,
                },
            ],
            source: DataSource::Live,
        };
        assert!((report.total_usage() - 150.0).abs() < f64::EPSILON);
        assert!((report.potential_saving() - 30.0).abs() < 1e-9);
        assert_eq!(report.average_carbon_intensity(), Some(150.0));
    }
}
