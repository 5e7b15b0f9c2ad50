//! Command dispatch
//!
//! Every raw HID report from the host goes through [`Dispatcher::handle`].
//! The report buffer is reused for the answer: bytes 0 and 1 become the
//! result code and message kind, the rest echoes the request.
//!
//! ```text
//!   request:  [0x02, 0x00, command, screen, payload...]
//!   response: [result, 0x00, command, screen, payload...]
//! ```
//!
//! Frames for the slave screen received by the master are not executed
//! locally; they go to the relay [`Mailbox`] unchanged.

use oledctrl_protocol::frame::MIN_RESPONSE_LEN;
use oledctrl_protocol::{Command, FrameBuf, ResultCode, ScreenId};

use crate::config::{ConfigError, Geometry, Role};
use crate::relay::Mailbox;
use crate::screen::{BufferError, ScreenBuffers};

/// Why a frame was answered with a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Not enough bytes for a command header
    FrameTooShort,
    /// Screen byte is neither master nor slave
    UnknownScreen(u8),
    /// Command byte is not a known command
    UnknownCommand(u8),
    /// `set_line` without a line number
    MissingPayload,
    /// `set_line` past the last row
    LineOutOfBounds { line: u8, rows: u8 },
    /// Relayed frame arrived on the master
    NotSlave,
}

impl From<BufferError> for DispatchError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::LineOutOfBounds { line, rows } => {
                DispatchError::LineOutOfBounds { line, rows }
            }
        }
    }
}

/// What a successful frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Ran on the local screen
    Applied(Command),
    /// Parked for the slave; `overwritten` if an unsent frame was replaced
    Relayed { overwritten: bool },
}

/// Routes decoded frames to the local screen or the relay
pub struct Dispatcher<const CELLS: usize> {
    role: Role,
    screen: ScreenBuffers<CELLS>,
    mailbox: Mailbox,
}

impl<const CELLS: usize> Dispatcher<CELLS> {
    pub fn new(role: Role, geometry: Geometry) -> Result<Self, ConfigError> {
        Ok(Self {
            role,
            screen: ScreenBuffers::new(geometry)?,
            mailbox: Mailbox::new(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Local screen buffers, for the render loop
    pub fn screen(&self) -> &ScreenBuffers<CELLS> {
        &self.screen
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Outbound relay slot, for the link task
    pub fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    /// Handle one report from the host.
    ///
    /// Returns the response to send back. Only the master answers; frames
    /// too short to carry a result are dropped silently.
    pub fn handle(&mut self, mut frame: FrameBuf) -> Option<FrameBuf> {
        // Failures are already encoded in the response
        let _ = self.execute(&mut frame);
        self.reply(frame)
    }

    /// The response for a frame that went through [`execute`](Self::execute)
    pub fn reply(&self, frame: FrameBuf) -> Option<FrameBuf> {
        if self.role.is_master() && frame.len() >= MIN_RESPONSE_LEN {
            Some(frame)
        } else {
            None
        }
    }

    /// Run a frame and rewrite it into its response in place.
    ///
    /// The error says why the result byte reads failure.
    pub fn execute(&mut self, frame: &mut FrameBuf) -> Result<Outcome, DispatchError> {
        if frame.len() < MIN_RESPONSE_LEN {
            return Err(DispatchError::FrameTooShort);
        }

        let inbound = frame.clone();
        frame.begin_response(ResultCode::Failure);

        let outcome = self.apply(&inbound, frame)?;
        frame.set_result(ResultCode::Success);
        Ok(outcome)
    }

    /// Entry point for frames the split link delivers to the slave.
    ///
    /// The response is built and dropped; the slave has no host to answer.
    pub fn handle_relayed(&mut self, bytes: &[u8]) -> Result<Outcome, DispatchError> {
        if self.role.is_master() {
            return Err(DispatchError::NotSlave);
        }
        let mut frame = FrameBuf::clamped(bytes).map_err(|_| DispatchError::FrameTooShort)?;
        self.execute(&mut frame)
    }

    fn apply(&mut self, inbound: &FrameBuf, out: &mut FrameBuf) -> Result<Outcome, DispatchError> {
        let request = inbound
            .request()
            .map_err(|_| DispatchError::FrameTooShort)?;
        let screen =
            ScreenId::from_byte(request.screen).ok_or(DispatchError::UnknownScreen(request.screen))?;

        if screen == ScreenId::Slave && self.role.is_master() {
            let overwritten = self.mailbox.send(inbound.as_bytes());
            return Ok(Outcome::Relayed { overwritten });
        }

        let command = Command::from_byte(request.command)
            .ok_or(DispatchError::UnknownCommand(request.command))?;

        match command {
            Command::SetUp => {
                let Geometry { cols, rows } = self.screen.set_up();
                out.write_payload(&[cols, rows]);
            }
            Command::Clear => self.screen.clear(),
            Command::SetLine => {
                let (&line, text) = request
                    .payload
                    .split_first()
                    .ok_or(DispatchError::MissingPayload)?;
                // Hosts zero-pad reports; text ends at the first zero
                let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
                self.screen.set_line(line, &text[..end])?;
            }
            Command::Present => self.screen.present(),
        }

        Ok(Outcome::Applied(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oledctrl_protocol::{HostRequest, Response};

    type Master = Dispatcher<84>;

    fn master() -> Master {
        Dispatcher::new(Role::Master, Geometry::SSD1306_128X32).unwrap()
    }

    fn frame(bytes: &[u8]) -> FrameBuf {
        FrameBuf::from_slice(bytes).unwrap()
    }

    fn padded(bytes: &[u8]) -> FrameBuf {
        let mut f = frame(bytes);
        f.pad_to_report();
        f
    }

    #[test]
    fn test_clear_master() {
        let mut d = master();
        d.handle(HostRequest::SetLine {
            screen: ScreenId::Master,
            line: 0,
            text: b"old",
        }
        .to_frame());
        d.handle(HostRequest::Present(ScreenId::Master).to_frame());
        assert!(d.screen().has_content());

        let response = d.handle(frame(&[0x02, 0x00, 0x01, 0x00])).unwrap();
        assert_eq!(response.as_bytes(), &[0x00, 0x00, 0x01, 0x00]);
        assert!(d.screen().front().iter().all(|&b| b == 0));
        assert!(d.screen().back().iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_set_line_padded_report() {
        let mut d: Dispatcher<8> = Dispatcher::new(Role::Master, Geometry::new(4, 2)).unwrap();
        let response = d
            .handle(padded(&[0x02, 0x00, 0x02, 0x00, 0x01, b'h', b'i']))
            .unwrap();
        assert_eq!(response.result(), Some(ResultCode::Success));
        assert_eq!(response.len(), 32);
        assert_eq!(d.screen().back_line(1), Some(&b"hi  "[..]));
        assert!(!d.screen().has_content());

        d.handle(frame(&[0x02, 0x00, 0x03, 0x00])).unwrap();
        assert_eq!(d.screen().front_line(1), Some(&b"hi  "[..]));
    }

    #[test]
    fn test_master_relays_slave_frames() {
        let mut d = master();
        let response = d.handle(frame(&[0x02, 0x00, 0x01, 0x01])).unwrap();
        assert_eq!(response.as_bytes(), &[0x00, 0x00, 0x01, 0x01]);

        assert!(d.mailbox().is_pending());
        let message = d.mailbox().sync_info();
        // Relayed bytes are the request, not the response
        assert_eq!(&message[..4], &[0x02, 0x00, 0x01, 0x01]);
        assert!(message[4..].iter().all(|&b| b == 0));
        assert!(!d.screen().has_content());
    }

    #[test]
    fn test_relay_reports_overwrite() {
        let mut d = master();
        let mut f = frame(&[0x02, 0x00, 0x03, 0x01]);
        assert_eq!(
            d.execute(&mut f),
            Ok(Outcome::Relayed { overwritten: false })
        );
        let mut f = frame(&[0x02, 0x00, 0x01, 0x01]);
        assert_eq!(
            d.execute(&mut f),
            Ok(Outcome::Relayed { overwritten: true })
        );
        assert_eq!(d.mailbox().sync_info()[2], 0x01);
    }

    #[test]
    fn test_set_up_reports_dimensions() {
        let mut d = master();
        let response = d.handle(HostRequest::SetUp(ScreenId::Master).to_frame()).unwrap();
        assert_eq!(response.len(), 6);
        let parsed = Response::parse(response.as_bytes()).unwrap().unwrap();
        assert_eq!(parsed.result, ResultCode::Success);
        assert_eq!(parsed.dimensions(), Some((21, 4)));
    }

    #[test]
    fn test_set_up_on_padded_report() {
        let mut d = master();
        let response = d.handle(padded(&[0x02, 0x00, 0x00, 0x00])).unwrap();
        assert_eq!(response.len(), 32);
        assert_eq!(&response.as_bytes()[..6], &[0x00, 0x00, 0x00, 0x00, 21, 4]);
    }

    #[test]
    fn test_unknown_command_and_screen() {
        let mut d = master();
        let mut f = frame(&[0x02, 0x00, 0x09, 0x00]);
        assert_eq!(d.execute(&mut f), Err(DispatchError::UnknownCommand(0x09)));
        assert_eq!(f.as_bytes(), &[0x01, 0x00, 0x09, 0x00]);

        let mut f = frame(&[0x02, 0x00, 0x01, 0x05]);
        assert_eq!(d.execute(&mut f), Err(DispatchError::UnknownScreen(0x05)));
        assert_eq!(f.result(), Some(ResultCode::Failure));
        assert!(!d.mailbox().is_pending());
    }

    #[test]
    fn test_short_frames() {
        let mut d = master();
        assert_eq!(d.handle(frame(&[0x02])), None);

        let mut f = frame(&[0x02]);
        assert_eq!(d.execute(&mut f), Err(DispatchError::FrameTooShort));
        assert_eq!(f.as_bytes(), &[0x02]);

        let response = d.handle(frame(&[0x02, 0x00, 0x01])).unwrap();
        assert_eq!(response.as_bytes(), &[0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_set_line_without_line_number() {
        let mut d = master();
        let mut f = frame(&[0x02, 0x00, 0x02, 0x00]);
        assert_eq!(d.execute(&mut f), Err(DispatchError::MissingPayload));
        assert_eq!(f.result(), Some(ResultCode::Failure));
    }

    #[test]
    fn test_set_line_out_of_bounds() {
        let mut d = master();
        let mut f = frame(&[0x02, 0x00, 0x02, 0x00, 4, b'x']);
        assert_eq!(
            d.execute(&mut f),
            Err(DispatchError::LineOutOfBounds { line: 4, rows: 4 })
        );
        assert!(d.screen().back().iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_slave_applies_without_reply() {
        let mut d: Dispatcher<84> =
            Dispatcher::new(Role::Slave, Geometry::SSD1306_128X32).unwrap();
        let set = HostRequest::SetLine {
            screen: ScreenId::Slave,
            line: 0,
            text: b"slave",
        };
        assert_eq!(d.handle(set.to_frame()), None);
        assert_eq!(d.handle(HostRequest::Present(ScreenId::Slave).to_frame()), None);
        assert_eq!(&d.screen().front_line(0).unwrap()[..5], b"slave");
        assert!(!d.mailbox().is_pending());
    }

    #[test]
    fn test_handle_relayed_requires_slave() {
        let mut d = master();
        assert_eq!(
            d.handle_relayed(&[0x02, 0x00, 0x01, 0x01]),
            Err(DispatchError::NotSlave)
        );

        let mut s: Dispatcher<84> =
            Dispatcher::new(Role::Slave, Geometry::SSD1306_128X32).unwrap();
        assert_eq!(
            s.handle_relayed(&[0x02, 0x00, 0x01, 0x01]),
            Ok(Outcome::Applied(Command::Clear))
        );
        assert_eq!(s.handle_relayed(&[]), Err(DispatchError::FrameTooShort));
    }
}
