//! Split link tasks
//!
//! The master writes relayed frames to the UART; the slave parses them
//! back out and runs them on its own screen.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use oledctrl_core::{deliver, Inbox, Outcome};
use oledctrl_protocol::{LinkFrame, LinkParser, LINK_RELAY, MAX_LINK_FRAME};

use crate::channels::{SharedScreen, RELAY_PENDING, SCREEN_CHANGED};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link TX task (master) - sends parked relay frames to the slave
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx, screen: &'static SharedScreen) {
    info!("Link TX task started");

    loop {
        RELAY_PENDING.wait().await;

        let Some(message) = screen.lock().await.mailbox_mut().take() else {
            continue;
        };

        let frame = match LinkFrame::relay(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to build link frame: {:?}", e);
                continue;
            }
        };

        let mut buf = [0u8; MAX_LINK_FRAME];
        match frame.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Failed to send relay frame: {:?}", e);
                } else {
                    trace!("Relay frame sent ({} bytes)", len);
                }
            }
            Err(e) => warn!("Failed to encode link frame: {:?}", e),
        }
    }
}

/// Link RX task (slave) - receives relay frames and runs them locally
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx, screen: &'static SharedScreen) {
    info!("Link RX task started");

    let mut parser = LinkParser::new();
    let mut inbox = Inbox::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) if frame.msg_type == LINK_RELAY => {
                            inbox.update_sync(&frame.payload);
                            run_relayed(&mut inbox, screen).await;
                        }
                        Ok(Some(frame)) => {
                            warn!("Unknown link message type {:#x}", frame.msg_type);
                        }
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Link frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

async fn run_relayed(inbox: &mut Inbox, screen: &'static SharedScreen) {
    let mut screen = screen.lock().await;
    match deliver(inbox, &mut *screen) {
        Some(Ok(Outcome::Applied(command))) => {
            debug!("Relayed {:?} applied", command);
            SCREEN_CHANGED.signal(());
        }
        Some(Ok(outcome)) => debug!("Relayed frame: {:?}", outcome),
        Some(Err(e)) => debug!("Relayed frame failed: {:?}", e),
        None => {}
    }
}
