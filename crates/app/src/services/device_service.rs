//! Device service: list, edit and power smart plugs.

use plugdash_domain::device::{Device, DeviceUpdate, PowerNotice, merge_last_usage};
use plugdash_domain::error::{NotFoundError, PlugDashError};
use plugdash_domain::id::HardwareName;

use crate::ports::DeviceApi;

/// Application service for device operations.
pub struct DeviceService<A> {
    api: A,
}

impl<A: DeviceApi> DeviceService<A> {
    /// Create a new service backed by the given API.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// List devices with their latest wattage.
    ///
    /// A failing last-usage fetch is logged and the devices are returned
    /// with the usage they were listed with.
    ///
    /// # Errors
    ///
    /// Returns the error of the device list fetch.
    #[tracing::instrument(skip(self))]
    pub async fn list_devices(&self) -> Result<Vec<Device>, PlugDashError> {
        let mut devices = self.api.list_devices().await?;
        match self.api.last_usage().await {
            Ok(usage) => merge_last_usage(&mut devices, &usage),
            Err(err) => tracing::warn!(error = %err, "last usage unavailable"),
        }
        tracing::debug!(count = devices.len(), "devices listed");
        Ok(devices)
    }

    /// Look up a single device by hardware name.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::NotFound`] when the backend does not list it.
    #[tracing::instrument(skip(self), fields(hardware_name = %hardware_name))]
    pub async fn get_device(&self, hardware_name: &HardwareName) -> Result<Device, PlugDashError> {
        self.list_devices()
            .await?
            .into_iter()
            .find(|device| &device.hardware_name == hardware_name)
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Device",
                    id: hardware_name.to_string(),
                }
                .into()
            })
    }

    /// Rename, move or retag a device.
    ///
    /// # Errors
    ///
    /// Returns the backend error, e.g. [`PlugDashError::NotFound`].
    #[tracing::instrument(skip(self, update), fields(hardware_name = %hardware_name))]
    pub async fn update_device(
        &self,
        hardware_name: &HardwareName,
        update: &DeviceUpdate,
    ) -> Result<Device, PlugDashError> {
        if update.is_empty() {
            tracing::debug!("empty update, nothing sent");
            return self.get_device(hardware_name).await;
        }
        self.api.update_device(hardware_name, update).await
    }

    /// Flip the plug and return it in its new state with a user notice.
    ///
    /// # Errors
    ///
    /// Returns the controller error; `device` is then left as it was.
    #[tracing::instrument(skip(self, device), fields(hardware_name = %device.hardware_name))]
    pub async fn toggle_power(&self, mut device: Device) -> Result<(Device, PowerNotice), PlugDashError> {
        self.api.toggle_power(&device.hardware_name).await?;
        let notice = device.toggle_power();
        tracing::info!(power = %device.power, "device toggled");
        Ok((device, notice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugdash_domain::device::{LastUsage, LastUsageEntry, PowerState, Severity};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryDeviceApi {
        devices: Mutex<HashMap<HardwareName, Device>>,
        usage: Option<LastUsage>,
        toggled: Mutex<Vec<HardwareName>>,
        updates: Mutex<usize>,
    }

    impl InMemoryDeviceApi {
        fn with(devices: Vec<Device>) -> Self {
            Self {
                devices: Mutex::new(
                    devices
                        .into_iter()
                        .map(|d| (d.hardware_name.clone(), d))
                        .collect(),
                ),
                ..Self::default()
            }
        }
    }

    impl DeviceApi for InMemoryDeviceApi {
        fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, PlugDashError>> + Send {
            let mut devices: Vec<Device> = self.devices.lock().unwrap().values().cloned().collect();
            devices.sort_by(|a, b| a.hardware_name.cmp(&b.hardware_name));
            async { Ok(devices) }
        }

        fn update_device(
            &self,
            hardware_name: &HardwareName,
            update: &DeviceUpdate,
        ) -> impl Future<Output = Result<Device, PlugDashError>> + Send {
            *self.updates.lock().unwrap() += 1;
            let mut devices = self.devices.lock().unwrap();
            let result = match devices.get_mut(hardware_name) {
                Some(device) => {
                    device.apply(update);
                    Ok(device.clone())
                }
                None => Err(NotFoundError {
                    entity: "Device",
                    id: hardware_name.to_string(),
                }
                .into()),
            };
            async { result }
        }

        fn toggle_power(
            &self,
            hardware_name: &HardwareName,
        ) -> impl Future<Output = Result<(), PlugDashError>> + Send {
            self.toggled.lock().unwrap().push(hardware_name.clone());
            async { Ok(()) }
        }

        fn last_usage(&self) -> impl Future<Output = Result<LastUsage, PlugDashError>> + Send {
            let result = self.usage.clone().ok_or_else(|| {
                PlugDashError::Remote(Box::new(std::io::Error::other("influx down")))
            });
            async { result }
        }
    }

    fn hw(name: &str) -> HardwareName {
        HardwareName::new(name).unwrap()
    }

    fn plug(name: &str, power: PowerState) -> Device {
        let mut device = Device::new(hw(name));
        device.power = power;
        device
    }

    #[tokio::test]
    async fn should_merge_last_usage_when_available() {
        let mut api = InMemoryDeviceApi::with(vec![plug("device1", PowerState::On)]);
        api.usage = Some(HashMap::from([(
            "device1".to_string(),
            LastUsageEntry { last_usage: 42.5 },
        )]));
        let devices = DeviceService::new(api).list_devices().await.unwrap();
        assert!((devices[0].last_usage - 42.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_still_list_devices_when_last_usage_fails() {
        let api = InMemoryDeviceApi::with(vec![plug("device1", PowerState::On), plug("device2", PowerState::Off)]);
        let devices = DeviceService::new(api).list_devices().await.unwrap();
        assert_eq!(devices.len(), 2);
    }

    #[tokio::test]
    async fn should_return_not_found_when_device_unknown() {
        let service = DeviceService::new(InMemoryDeviceApi::default());
        let err = service.get_device(&hw("ghost")).await.unwrap_err();
        assert!(matches!(err, PlugDashError::NotFound(e) if e.id == "ghost"));
    }

    #[tokio::test]
    async fn should_turn_off_powered_device_with_destructive_notice() {
        let service = DeviceService::new(InMemoryDeviceApi::default());
        let (device, notice) = service
            .toggle_power(plug("device1", PowerState::On))
            .await
            .unwrap();
        assert_eq!(device.power, PowerState::Off);
        assert_eq!(notice.title, "Device Powered Off");
        assert_eq!(notice.severity, Severity::Destructive);
        assert_eq!(*service.api.toggled.lock().unwrap(), vec![hw("device1")]);
    }

    #[tokio::test]
    async fn should_turn_on_unreachable_device() {
        let service = DeviceService::new(InMemoryDeviceApi::default());
        let (device, notice) = service
            .toggle_power(plug("device1", PowerState::Unreachable))
            .await
            .unwrap();
        assert_eq!(device.power, PowerState::On);
        assert_eq!(notice.severity, Severity::Default);
    }

    #[tokio::test]
    async fn should_apply_update_remotely() {
        let service = DeviceService::new(InMemoryDeviceApi::with(vec![plug("device1", PowerState::On)]));
        let update = DeviceUpdate {
            room: Some("Kitchen".to_string()),
            ..DeviceUpdate::default()
        };
        let device = service.update_device(&hw("device1"), &update).await.unwrap();
        assert_eq!(device.room.as_deref(), Some("Kitchen"));
    }

    #[tokio::test]
    async fn should_skip_request_when_update_is_empty() {
        let service = DeviceService::new(InMemoryDeviceApi::with(vec![plug("device1", PowerState::On)]));
        service
            .update_device(&hw("device1"), &DeviceUpdate::default())
            .await
            .unwrap();
        assert_eq!(*service.api.updates.lock().unwrap(), 0);
    }
}
