//! Analytics service: hourly usage report and dashboard summary cards.

use chrono::FixedOffset;
use serde::Serialize;

use plugdash_domain::analytics::{
    AnalyticsReport, CarbonSeries, DataSource, HourlyAggregator, PriceModel, merge_hourly,
    synthetic_readings,
};
use plugdash_domain::carbon::CarbonIntensity;
use plugdash_domain::device::{merge_last_usage, total_usage};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::HardwareName;
use plugdash_domain::time::Timestamp;
use plugdash_domain::usage::{BarDataPoint, Lookback, WeeklyTotal};

use crate::ports::{DeviceApi, UsageApi};

/// Everything the dashboard overview shows. Each card is fetched on its own
/// and is `None` when its fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub monthly: Option<Vec<BarDataPoint>>,
    pub weekly: Option<Vec<WeeklyTotal>>,
    pub carbon: Option<CarbonIntensity>,
    pub device_count: Option<usize>,
    /// Sum of the latest wattage of every device.
    pub current_usage: Option<f64>,
}

pub struct AnalyticsService<U, D, P> {
    usage: U,
    devices: D,
    prices: P,
    offset: FixedOffset,
    synthetic_seed: u64,
}

impl<U: UsageApi, D: DeviceApi, P: PriceModel> AnalyticsService<U, D, P> {
    /// `offset` is the local time zone used for peak-hour detection.
    pub fn new(usage: U, devices: D, prices: P, offset: FixedOffset) -> Self {
        Self {
            usage,
            devices,
            prices,
            offset,
            synthetic_seed: 0,
        }
    }

    /// Seed used when readings have to be fabricated.
    #[must_use]
    pub fn with_synthetic_seed(mut self, seed: u64) -> Self {
        self.synthetic_seed = seed;
        self
    }

    /// Hourly usage of one device over `lookback`, merged with carbon
    /// intensity and price.
    ///
    /// When readings cannot be fetched or contain no usable value, plausible
    /// readings are generated instead and the report is marked
    /// [`DataSource::Synthetic`]. Missing carbon history falls back to the
    /// default intensity.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::Unauthorized`] when the token is rejected.
    /// Every other failure degrades as described above.
    #[tracing::instrument(skip(self), fields(hardware_name = %hardware_name, lookback = %lookback))]
    pub async fn report(
        &self,
        hardware_name: &HardwareName,
        lookback: Lookback,
        now: Timestamp,
    ) -> Result<AnalyticsReport, PlugDashError> {
        let (from, to) = lookback.window(now);

        let (readings, carbon) = tokio::join!(
            self.usage.readings(hardware_name, from, to),
            self.usage.carbon_history(from, to),
        );

        let readings = match readings {
            Ok(readings) => readings,
            Err(PlugDashError::Unauthorized) => return Err(PlugDashError::Unauthorized),
            Err(err) => {
                tracing::warn!(error = %err, "readings unavailable");
                Vec::new()
            }
        };
        let mut aggregator = HourlyAggregator::with_window(from, to);
        let usable = aggregator.extend(&readings);

        let source = if usable == 0 {
            tracing::warn!("no usable readings, substituting synthetic data");
            // The seeded window spans both the start and the end hour.
            let hours = u32::try_from(lookback.hours() + 1).unwrap_or(u32::MAX);
            aggregator = HourlyAggregator::with_window(from, to);
            aggregator.extend(&synthetic_readings(now, hours, self.synthetic_seed));
            DataSource::Synthetic
        } else {
            DataSource::Live
        };

        let carbon = match carbon {
            Ok(points) => CarbonSeries::from_points(&points),
            Err(err) => {
                tracing::warn!(error = %err, "carbon history unavailable, using default intensity");
                CarbonSeries::default()
            }
        };

        let rows = merge_hourly(&aggregator, &carbon, &self.prices, self.offset);
        tracing::debug!(rows = rows.len(), ?source, "report built");
        Ok(AnalyticsReport { rows, source })
    }

    /// Gather the overview cards concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn dashboard(&self) -> DashboardSummary {
        let (monthly, weekly, carbon, devices, last_usage) = tokio::join!(
            self.usage.monthly_summary(),
            self.usage.weekly_total(),
            self.usage.carbon_intensity(),
            self.devices.list_devices(),
            self.devices.last_usage(),
        );

        let (device_count, current_usage) = match devices {
            Ok(mut devices) => {
                let current = match last_usage {
                    Ok(usage) => {
                        merge_last_usage(&mut devices, &usage);
                        Some(total_usage(&devices))
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, card = "current_usage", "card unavailable");
                        None
                    }
                };
                (Some(devices.len()), current)
            }
            Err(err) => {
                tracing::warn!(error = %err, card = "devices", "card unavailable");
                (None, None)
            }
        };

        DashboardSummary {
            monthly: card("monthly", monthly),
            weekly: card("weekly", weekly),
            carbon: card("carbon", carbon),
            device_count,
            current_usage,
        }
    }
}

fn card<T>(name: &'static str, result: Result<T, PlugDashError>) -> Option<T> {
    result
        .inspect_err(|err| tracing::warn!(error = %err, card = name, "card unavailable"))
        .ok()
}
