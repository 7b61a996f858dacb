//! [`DeviceApi`] over `/devices` and the controller endpoint.

use std::future::Future;

use reqwest::Method;

use plugdash_app::ports::{DeviceApi, TokenStore};
use plugdash_domain::device::{Device, DeviceUpdate, LastUsage};
use plugdash_domain::error::{NotFoundError, PlugDashError};
use plugdash_domain::id::HardwareName;

use crate::client::HttpApiClient;

fn device_lookup(hardware_name: &HardwareName) -> Option<NotFoundError> {
    Some(NotFoundError {
        entity: "Device",
        id: hardware_name.to_string(),
    })
}

impl<T: TokenStore + Sync> DeviceApi for HttpApiClient<T> {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["devices", ""]), None)
    }

    fn update_device(
        &self,
        hardware_name: &HardwareName,
        update: &DeviceUpdate,
    ) -> impl Future<Output = Result<Device, PlugDashError>> + Send {
        let url = self.endpoint(&["devices", hardware_name.as_str()]);
        self.send_json(Method::PUT, url, update, device_lookup(hardware_name))
    }

    fn toggle_power(
        &self,
        hardware_name: &HardwareName,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        let url = self.endpoint(&[
            "controller",
            "device",
            hardware_name.as_str(),
            "TOGGLE_POWER",
        ]);
        self.send_empty(Method::PUT, url, device_lookup(hardware_name))
    }

    fn last_usage(&self) -> impl Future<Output = Result<LastUsage, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["data", "last_usage"]), None)
    }
}
