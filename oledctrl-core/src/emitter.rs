//! Events from the keyboard to the host
//!
//! Events are unsolicited input reports. Only the master has a USB
//! connection, so a slave refuses to emit.

use oledctrl_protocol::{event_frame, EventId, FrameBuf, TagEvent};

use crate::config::Role;
use crate::traits::HidSink;

/// Event emission errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EmitError<E> {
    /// This half has no host connection
    NotMaster,
    /// The sink refused the report
    Sink(E),
}

/// Builds event reports and hands them to the HID sink
pub struct EventEmitter<S> {
    role: Role,
    sink: S,
}

impl<S: HidSink> EventEmitter<S> {
    pub fn new(role: Role, sink: S) -> Self {
        Self { role, sink }
    }

    /// Send a tag event to the host
    pub fn emit(&mut self, event: TagEvent) -> Result<(), EmitError<S::Error>> {
        self.send(event.to_frame())
    }

    /// Send an event with arbitrary argument bytes.
    ///
    /// Arguments past what fits in one report are dropped.
    pub fn emit_raw(&mut self, id: EventId, args: &[u8]) -> Result<(), EmitError<S::Error>> {
        self.send(event_frame(id, args))
    }

    fn send(&mut self, frame: FrameBuf) -> Result<(), EmitError<S::Error>> {
        if !self.role.is_master() {
            return Err(EmitError::NotMaster);
        }
        self.sink.send_report(frame.as_report()).map_err(EmitError::Sink)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oledctrl_protocol::{ScreenId, FRAME_LEN};

    #[derive(Default)]
    struct Recorder {
        reports: Vec<[u8; FRAME_LEN]>,
        full: bool,
    }

    impl HidSink for Recorder {
        type Error = ();

        fn send_report(&mut self, report: &[u8; FRAME_LEN]) -> Result<(), ()> {
            if self.full {
                return Err(());
            }
            self.reports.push(*report);
            Ok(())
        }
    }

    #[test]
    fn test_set_tag_event() {
        let mut emitter = EventEmitter::new(Role::Master, Recorder::default());
        emitter
            .emit(TagEvent::SetTag {
                screen: ScreenId::Slave,
                tag: 7,
            })
            .unwrap();

        let report = emitter.sink().reports[0];
        assert_eq!(&report[..5], &[0x00, 0x01, 0x00, 0x01, 7]);
        assert!(report[5..].iter().all(|&b| b == 0));
        assert_eq!(TagEvent::from_frame(&report), Ok(Some(TagEvent::SetTag {
            screen: ScreenId::Slave,
            tag: 7,
        })));
    }

    #[test]
    fn test_increment_event() {
        let mut emitter = EventEmitter::new(Role::Master, Recorder::default());
        emitter
            .emit(TagEvent::Increment {
                screen: ScreenId::Master,
            })
            .unwrap();
        let report = emitter.into_inner().reports[0];
        assert_eq!(&report[..4], &[0x00, 0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_args_truncated() {
        let mut emitter = EventEmitter::new(Role::Master, Recorder::default());
        emitter.emit_raw(EventId::DecrementTag, &[0xEE; 40]).unwrap();
        let report = emitter.sink().reports[0];
        assert_eq!(report[2], 0x02);
        assert!(report[3..31].iter().all(|&b| b == 0xEE));
        assert_eq!(report[31], 0);
    }

    #[test]
    fn test_slave_refuses() {
        let mut emitter = EventEmitter::new(Role::Slave, Recorder::default());
        let result = emitter.emit(TagEvent::Decrement {
            screen: ScreenId::Master,
        });
        assert_eq!(result, Err(EmitError::NotMaster));
        assert!(emitter.sink().reports.is_empty());
    }

    #[test]
    fn test_sink_error() {
        let mut emitter = EventEmitter::new(
            Role::Master,
            Recorder {
                full: true,
                ..Default::default()
            },
        );
        let result = emitter.emit(TagEvent::Increment {
            screen: ScreenId::Slave,
        });
        assert_eq!(result, Err(EmitError::Sink(())));
    }
}
