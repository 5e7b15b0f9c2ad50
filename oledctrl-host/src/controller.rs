//! Screen controller
//!
//! Sends commands one at a time and waits for the matching response.
//! Events the keyboard sends in between are queued and handed out by
//! [`Controller::poll_event`].

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use oledctrl_protocol::{FrameBuf, HostRequest, Response, ResultCode, ScreenId, TagEvent};
use tracing::{debug, warn};

use crate::error::HostError;
use crate::transport::Transport;

/// How long to wait for a response
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause between lines; the slave screen drops commands sent back to back
pub const LINE_DELAY: Duration = Duration::from_millis(10);

pub struct Controller<T> {
    transport: T,
    geometry: Option<(u8, u8)>,
    events: VecDeque<TagEvent>,
    timeout: Duration,
    line_delay: Duration,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            geometry: None,
            events: VecDeque::new(),
            timeout: RESPONSE_TIMEOUT,
            line_delay: LINE_DELAY,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = delay;
        self
    }

    /// `(cols, rows)` reported by the last set up
    pub fn geometry(&self) -> Option<(u8, u8)> {
        self.geometry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Clear the master screen and learn the screen size
    pub fn set_up(&mut self) -> Result<(u8, u8), HostError> {
        let frame = self.request(&HostRequest::SetUp(ScreenId::Master))?;
        let dimensions = Response::parse(frame.as_bytes())?.and_then(|r| r.dimensions());
        let (cols, rows) = match dimensions {
            Some((cols, rows)) if cols > 0 && rows > 0 => (cols, rows),
            Some((cols, rows)) => return Err(HostError::BadGeometry { cols, rows }),
            None => return Err(HostError::BadGeometry { cols: 0, rows: 0 }),
        };
        self.geometry = Some((cols, rows));
        Ok((cols, rows))
    }

    pub fn clear(&mut self, screen: ScreenId) -> Result<(), HostError> {
        self.request(&HostRequest::Clear(screen)).map(|_| ())
    }

    /// Replace the screen content with `lines` and present it.
    ///
    /// Lines past the screen height are dropped; long lines are cut off by
    /// the keyboard.
    pub fn draw_screen<S: AsRef<str>>(
        &mut self,
        screen: ScreenId,
        lines: &[S],
    ) -> Result<(), HostError> {
        let (cols, rows) = self.geometry.unwrap_or((u8::MAX, u8::MAX));
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if i >= rows as usize {
                warn!("Drawing {} lines on a {} row screen", lines.len(), rows);
                break;
            }
            if line.len() > cols as usize {
                warn!("Line {} is {} wide, screen has {} columns", i, line.len(), cols);
            }
            self.request(&HostRequest::SetLine {
                screen,
                line: i as u8,
                text: line.as_bytes(),
            })?;
            if !self.line_delay.is_zero() {
                thread::sleep(self.line_delay);
            }
        }
        self.request(&HostRequest::Present(screen)).map(|_| ())
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, request: &HostRequest<'_>) -> Result<FrameBuf, HostError> {
        let command = request.command();
        let screen = request.screen();
        self.transport.write_report(request.to_frame().as_report())?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(HostError::Timeout { command, screen });
            }
            let Some(frame) = self.transport.read_report(remaining)? else {
                return Err(HostError::Timeout { command, screen });
            };
            if self.queue_event(&frame) {
                continue;
            }

            match Response::parse(frame.as_bytes()) {
                Ok(Some(response))
                    if response.command == command.to_byte()
                        && response.screen == screen.to_byte() =>
                {
                    return match response.result {
                        ResultCode::Success => Ok(frame),
                        ResultCode::Failure => Err(HostError::Rejected { command, screen }),
                    };
                }
                Ok(_) => debug!("Skipping unrelated report {:02X?}", frame.as_bytes()),
                Err(e) => warn!("Malformed report {:02X?}: {:?}", frame.as_bytes(), e),
            }
        }
    }

    /// Next event from the keyboard, waiting up to `timeout` for one
    pub fn poll_event(&mut self, timeout: Duration) -> Result<Option<TagEvent>, HostError> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(frame) = self.transport.read_report(remaining)? else {
                return Ok(None);
            };
            if self.queue_event(&frame) {
                return Ok(self.events.pop_front());
            }
            debug!("Skipping report {:02X?}", frame.as_bytes());
            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }

    /// Queue the frame if it is an event; returns whether it was one
    fn queue_event(&mut self, frame: &FrameBuf) -> bool {
        match TagEvent::from_frame(frame.as_bytes()) {
            Ok(Some(event)) => {
                debug!("Event {:?}", event);
                self.events.push_back(event);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oledctrl_core::{Dispatcher, Geometry, Role};
    use oledctrl_protocol::FRAME_LEN;

    /// A master half running the real dispatcher
    struct Keyboard {
        dispatcher: Dispatcher<84>,
        replies: VecDeque<FrameBuf>,
        /// Events sent before the reply to the next command
        pending_events: Vec<TagEvent>,
        mute: bool,
    }

    impl Keyboard {
        fn new() -> Self {
            Self {
                dispatcher: Dispatcher::new(Role::Master, Geometry::new(21, 4)).unwrap(),
                replies: VecDeque::new(),
                pending_events: Vec::new(),
                mute: false,
            }
        }

        fn front_line(&self, row: u8) -> String {
            let line = self.dispatcher.screen().front_line(row).unwrap();
            String::from_utf8_lossy(line).trim_end().to_string()
        }
    }

    impl Transport for Keyboard {
        fn write_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), HostError> {
            for event in self.pending_events.drain(..) {
                self.replies.push_back(event.to_frame());
            }
            let frame = FrameBuf::from_slice(report).unwrap();
            if let Some(reply) = self.dispatcher.handle(frame) {
                if !self.mute {
                    self.replies.push_back(reply);
                }
            }
            Ok(())
        }

        fn read_report(&mut self, _timeout: Duration) -> Result<Option<FrameBuf>, HostError> {
            Ok(self.replies.pop_front())
        }
    }

    fn controller() -> Controller<Keyboard> {
        Controller::new(Keyboard::new()).with_line_delay(Duration::ZERO)
    }

    #[test]
    fn test_set_up_reports_geometry() {
        let mut ctl = controller();
        assert_eq!(ctl.set_up().unwrap(), (21, 4));
        assert_eq!(ctl.geometry(), Some((21, 4)));
    }

    #[test]
    fn test_draw_screen_presents_lines() {
        let mut ctl = controller();
        ctl.set_up().unwrap();
        ctl.draw_screen(ScreenId::Master, &["Layer: %l", "You look great today!"])
            .unwrap();

        let kb = ctl.transport();
        assert_eq!(kb.front_line(0), "Layer: %l");
        assert_eq!(kb.front_line(1), "You look great today!");
        assert!(kb.dispatcher.screen().has_variables());
    }

    #[test]
    fn test_draw_screen_drops_extra_lines() {
        let mut ctl = controller();
        ctl.set_up().unwrap();
        let lines = ["a", "b", "c", "d", "e", "f"];
        ctl.draw_screen(ScreenId::Master, &lines).unwrap();
        assert_eq!(ctl.transport().front_line(3), "d");
    }

    #[test]
    fn test_slave_screen_is_relayed() {
        let mut ctl = controller();
        ctl.set_up().unwrap();
        ctl.clear(ScreenId::Slave).unwrap();

        let mailbox = ctl.transport().dispatcher.mailbox();
        assert!(mailbox.is_pending());
        assert_eq!(&mailbox.sync_info()[..4], &[0x02, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn test_rejected_command() {
        let mut ctl = controller();
        let err = ctl
            .request(&HostRequest::SetLine {
                screen: ScreenId::Master,
                line: 9,
                text: b"nope",
            })
            .unwrap_err();
        assert!(matches!(
            err,
            HostError::Rejected {
                screen: ScreenId::Master,
                ..
            }
        ));
    }

    #[test]
    fn test_events_between_responses_are_kept() {
        let mut ctl = controller();
        let event = TagEvent::SetTag {
            screen: ScreenId::Slave,
            tag: 3,
        };
        let mut kb = Keyboard::new();
        kb.pending_events.push(event);
        ctl.transport = kb;

        assert_eq!(ctl.set_up().unwrap(), (21, 4));
        assert_eq!(ctl.poll_event(Duration::ZERO).unwrap(), Some(event));
        assert_eq!(ctl.poll_event(Duration::ZERO).unwrap(), None);
    }

    #[test]
    fn test_poll_event_reads_transport() {
        let mut ctl = controller();
        let event = TagEvent::Increment {
            screen: ScreenId::Master,
        };
        ctl.transport.replies.push_back(event.to_frame());
        assert_eq!(ctl.poll_event(Duration::ZERO).unwrap(), Some(event));
    }

    #[test]
    fn test_timeout_without_response() {
        let mut ctl = controller();
        ctl.transport.mute = true;
        let err = ctl.set_up().unwrap_err();
        assert!(matches!(err, HostError::Timeout { .. }));
    }
}
