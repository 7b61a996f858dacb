//! Device port: listing, editing and powering plugs.

use std::future::Future;

use plugdash_domain::device::{Device, DeviceUpdate, LastUsage};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::HardwareName;

/// Remote device registry and controller.
pub trait DeviceApi {
    /// All devices known to the backend.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, PlugDashError>> + Send;

    /// Apply a partial update and return the stored device.
    fn update_device(
        &self,
        hardware_name: &HardwareName,
        update: &DeviceUpdate,
    ) -> impl Future<Output = Result<Device, PlugDashError>> + Send;

    /// Ask the controller to flip the plug's relay.
    fn toggle_power(
        &self,
        hardware_name: &HardwareName,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send;

    /// Latest wattage per device.
    fn last_usage(&self) -> impl Future<Output = Result<LastUsage, PlugDashError>> + Send;
}

impl<T: DeviceApi + Send + Sync> DeviceApi for std::sync::Arc<T> {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, PlugDashError>> + Send {
        (**self).list_devices()
    }

    fn update_device(
        &self,
        hardware_name: &HardwareName,
        update: &DeviceUpdate,
    ) -> impl Future<Output = Result<Device, PlugDashError>> + Send {
        (**self).update_device(hardware_name, update)
    }

    fn toggle_power(
        &self,
        hardware_name: &HardwareName,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).toggle_power(hardware_name)
    }

    fn last_usage(&self) -> impl Future<Output = Result<LastUsage, PlugDashError>> + Send {
        (**self).last_usage()
    }
}
