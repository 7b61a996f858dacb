//! Usage port: readings, consumption summaries and grid carbon intensity.

use std::future::Future;

use plugdash_domain::carbon::{CarbonIntensity, CarbonPoint};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::HardwareName;
use plugdash_domain::time::Timestamp;
use plugdash_domain::usage::{BarDataPoint, Reading, WeeklyTotal};

pub trait UsageApi {
    /// Raw readings of one device within `from..=to`.
    fn readings(
        &self,
        hardware_name: &HardwareName,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reading>, PlugDashError>> + Send;

    /// Per-room consumption, one row per day of the current month.
    fn monthly_summary(
        &self,
    ) -> impl Future<Output = Result<Vec<BarDataPoint>, PlugDashError>> + Send;

    fn weekly_total(&self) -> impl Future<Output = Result<Vec<WeeklyTotal>, PlugDashError>> + Send;

    fn carbon_intensity(&self) -> impl Future<Output = Result<CarbonIntensity, PlugDashError>> + Send;

    fn carbon_history(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<CarbonPoint>, PlugDashError>> + Send;
}

impl<T: UsageApi + Send + Sync> UsageApi for std::sync::Arc<T> {
    fn readings(
        &self,
        hardware_name: &HardwareName,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reading>, PlugDashError>> + Send {
        (**self).readings(hardware_name, from, to)
    }

    fn monthly_summary(
        &self,
    ) -> impl Future<Output = Result<Vec<BarDataPoint>, PlugDashError>> + Send {
        (**self).monthly_summary()
    }

    fn weekly_total(&self) -> impl Future<Output = Result<Vec<WeeklyTotal>, PlugDashError>> + Send {
        (**self).weekly_total()
    }

    fn carbon_intensity(&self) -> impl Future<Output = Result<CarbonIntensity, PlugDashError>> + Send {
        (**self).carbon_intensity()
    }

    fn carbon_history(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<CarbonPoint>, PlugDashError>> + Send {
        (**self).carbon_history(from, to)
    }
}
