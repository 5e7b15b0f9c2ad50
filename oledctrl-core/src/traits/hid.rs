//! Raw HID output trait

use oledctrl_protocol::FRAME_LEN;

/// Somewhere to put reports bound for the host.
///
/// Implementations must not block; the firmware queues the report for the
/// USB task and returns.
pub trait HidSink {
    type Error;

    /// Queue one full-length input report
    fn send_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), Self::Error>;
}
