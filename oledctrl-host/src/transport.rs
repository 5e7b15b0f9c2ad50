//! Raw HID transport to the keyboard

use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use oledctrl_protocol::{FrameBuf, FRAME_LEN};
use tracing::{debug, info};

use crate::error::HostError;

/// Vendor usage page of the raw HID interface
pub const USAGE_PAGE: u16 = 0xFF60;

/// Vendor usage of the raw HID interface
pub const USAGE: u16 = 0x61;

/// Report-level access to the keyboard
pub trait Transport {
    /// Send one 32-byte report
    fn write_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), HostError>;

    /// Wait up to `timeout` for a report; `None` when nothing arrived
    fn read_report(&mut self, timeout: Duration) -> Result<Option<FrameBuf>, HostError>;
}

/// How to pick the raw HID interface among the keyboard's interfaces
#[derive(Debug, Clone, Copy)]
pub struct DeviceFilter {
    pub vid: u16,
    pub pid: u16,
    /// Interface number, for platforms that do not report usage pages
    pub interface: Option<i32>,
}

impl DeviceFilter {
    fn matches(&self, info: &hidapi::DeviceInfo) -> bool {
        if info.vendor_id() != self.vid || info.product_id() != self.pid {
            return false;
        }
        match self.interface {
            Some(interface) => info.interface_number() == interface,
            None => info.usage_page() == USAGE_PAGE && info.usage() == USAGE,
        }
    }
}

pub struct HidTransport {
    device: HidDevice,
}

impl HidTransport {
    /// Open the first matching raw HID interface
    pub fn open(api: &HidApi, filter: &DeviceFilter) -> Result<Self, HostError> {
        let info = api
            .device_list()
            .find(|info| filter.matches(info))
            .ok_or(HostError::DeviceNotFound {
                vid: filter.vid,
                pid: filter.pid,
            })?;

        info!(
            "Opening {:?} (interface {})",
            info.path(),
            info.interface_number()
        );
        let device = info.open_device(api)?;
        Ok(Self { device })
    }
}

impl Transport for HidTransport {
    fn write_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), HostError> {
        // Report ID 0 goes first
        let mut buf = [0u8; FRAME_LEN + 1];
        buf[1..].copy_from_slice(report);
        debug!("> {:02X?}", report);
        self.device.write(&buf)?;
        Ok(())
    }

    fn read_report(&mut self, timeout: Duration) -> Result<Option<FrameBuf>, HostError> {
        let mut buf = [0u8; FRAME_LEN];
        let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let size = self.device.read_timeout(&mut buf, ms)?;
        if size == 0 {
            return Ok(None);
        }
        debug!("< {:02X?}", &buf[..size]);
        Ok(Some(FrameBuf::from_slice(&buf[..size])?))
    }
}
