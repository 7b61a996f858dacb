//! [`UsageApi`] over `/data` and `/external/carbon-intensity`.

use std::future::Future;

use chrono::SecondsFormat;
use reqwest::Url;

use plugdash_app::ports::{TokenStore, UsageApi};
use plugdash_domain::carbon::{CarbonIntensity, CarbonPoint};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::HardwareName;
use plugdash_domain::time::Timestamp;
use plugdash_domain::usage::{BarDataPoint, Reading, WeeklyTotal};

use crate::client::HttpApiClient;

fn with_range(mut url: Url, from: Timestamp, to: Timestamp) -> Url {
    url.query_pairs_mut()
        .append_pair("from", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
        .append_pair("to", &to.to_rfc3339_opts(SecondsFormat::Secs, true));
    url
}

impl<T: TokenStore + Sync> UsageApi for HttpApiClient<T> {
    fn readings(
        &self,
        hardware_name: &HardwareName,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reading>, PlugDashError>> + Send {
        let mut url = self.endpoint(&["data", "readings"]);
        url.query_pairs_mut()
            .append_pair("hardware_name", hardware_name.as_str());
        self.get_json(with_range(url, from, to), None)
    }

    fn monthly_summary(
        &self,
    ) -> impl Future<Output = Result<Vec<BarDataPoint>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["data", "monthly-summary"]), None)
    }

    fn weekly_total(&self) -> impl Future<Output = Result<Vec<WeeklyTotal>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["data", "weekly-total"]), None)
    }

    fn carbon_intensity(&self) -> impl Future<Output = Result<CarbonIntensity, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["external", "carbon-intensity"]), None)
    }

    fn carbon_history(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<CarbonPoint>, PlugDashError>> + Send {
        let url = self.endpoint(&["external", "carbon-intensity", "history"]);
        self.get_json(with_range(url, from, to), None)
    }
}
