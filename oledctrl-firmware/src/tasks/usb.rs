//! USB tasks
//!
//! The USB device runs in its own task. The raw HID task answers host
//! requests and forwards queued event reports.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::HidReaderWriter;
use embassy_usb::UsbDevice;

use oledctrl_core::Outcome;
use oledctrl_protocol::{FrameBuf, FRAME_LEN};

use crate::channels::{SharedScreen, HID_EVENTS, RELAY_PENDING, SCREEN_CHANGED};

pub type UsbDriver = Driver<'static, USB>;
pub type RawHid = HidReaderWriter<'static, UsbDriver, FRAME_LEN, FRAME_LEN>;

/// Runs the USB device stack
#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) {
    info!("USB task started");
    usb.run().await;
}

/// Raw HID task - answers host requests and sends events
#[embassy_executor::task]
pub async fn raw_hid_task(hid: RawHid, screen: &'static SharedScreen) {
    info!("Raw HID task started");

    let (mut reader, mut writer) = hid.split();
    reader.ready().await;
    info!("Raw HID interface configured");

    let mut buf = [0u8; FRAME_LEN];

    loop {
        match select(reader.read(&mut buf), HID_EVENTS.receive()).await {
            Either::First(Ok(n)) => {
                let Some(response) = handle_report(&buf[..n], screen).await else {
                    continue;
                };
                if let Err(e) = writer.write(response.as_report()).await {
                    warn!("Failed to send response: {:?}", e);
                }
            }
            Either::First(Err(e)) => {
                warn!("Raw HID read error: {:?}", e);
            }
            Either::Second(report) => {
                trace!("Sending event {}", report[2]);
                if let Err(e) = writer.write(&report).await {
                    warn!("Failed to send event: {:?}", e);
                }
            }
        }
    }
}

/// Run one host report through the dispatcher
async fn handle_report(data: &[u8], screen: &'static SharedScreen) -> Option<FrameBuf> {
    let mut frame = match FrameBuf::from_slice(data) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Bad report: {:?}", e);
            return None;
        }
    };

    let mut screen = screen.lock().await;
    match screen.execute(&mut frame) {
        Ok(Outcome::Applied(command)) => {
            debug!("Applied {:?}", command);
            SCREEN_CHANGED.signal(());
        }
        Ok(Outcome::Relayed { overwritten }) => {
            if overwritten {
                warn!("Relay frame overwritten before it was sent");
            }
            RELAY_PENDING.signal(());
        }
        Err(e) => {
            debug!("Request failed: {:?}", e);
        }
    }
    screen.reply(frame)
}
