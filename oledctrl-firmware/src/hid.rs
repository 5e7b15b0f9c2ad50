//! Raw HID interface
//!
//! One vendor-defined interface with 32-byte input and output reports,
//! on the usage page host tools look for.

use defmt::*;
use usbd_hid::descriptor::generator_prelude::*;

use oledctrl_core::traits::HidSink;
use oledctrl_protocol::FRAME_LEN;

use crate::channels::HID_EVENTS;

/// Raw HID report pair
#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = 0xFF60, usage = 0x61) = {
        (usage = 0x62, logical_min = 0x00,) = {
            #[item_settings data,variable,absolute] input=input;
        };
        (usage = 0x63, logical_min = 0x00,) = {
            #[item_settings data,variable,absolute] output=output;
        };
    }
)]
pub struct RawHidReport {
    pub input: [u8; FRAME_LEN],
    pub output: [u8; FRAME_LEN],
}

/// Queues event reports for the USB task
pub struct EventQueue;

impl HidSink for EventQueue {
    type Error = ();

    fn send_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), ()> {
        HID_EVENTS.try_send(*report).map_err(|_| {
            warn!("HID event queue full, dropping event");
        })
    }
}
