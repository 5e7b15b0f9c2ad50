//! OLED render task
//!
//! Redraws the character grid whenever the screen changes or the refresh
//! ticker fires (the layer name behind `%l` can change at any time).
//! Pixels are only pushed over I2C when the grid differs from the one on
//! the panel.

use defmt::*;
use display_interface_i2c::I2CInterface;
use embassy_futures::select::select;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::{Duration, Ticker};
use embedded_graphics::mono_font::{ascii::FONT_6X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use portable_atomic::Ordering;
use ssd1306::mode::BufferedGraphicsModeAsync;
use ssd1306::prelude::*;
use ssd1306::Ssd1306Async;

use oledctrl_core::traits::{CharDisplay, DisplayError};
use oledctrl_core::{CharMatrix, LayerNames, LayerTable, Role};

use crate::channels::{SharedScreen, LAYER_STATE, SCREEN_CHANGED};
use crate::config::{DISPLAY_CELLS, GEOMETRY, LAYER_NAMES};

/// Refresh period when nothing signals a change
const REFRESH_MS: u64 = 100;

/// Pixel height of one text row
const ROW_HEIGHT: i32 = 8;

pub type Oled = Ssd1306Async<
    I2CInterface<I2c<'static, I2C1, Async>>,
    DisplaySize128x32,
    BufferedGraphicsModeAsync<DisplaySize128x32>,
>;

type Matrix = CharMatrix<DISPLAY_CELLS>;

fn panel_error(_: display_interface::DisplayError) -> DisplayError {
    DisplayError::Communication
}

/// Render task - draws the local screen on the OLED
#[embassy_executor::task]
pub async fn render_task(mut oled: Oled, screen: &'static SharedScreen, role: Role) {
    info!("Render task started");

    if oled.init().await.is_err() {
        error!("OLED initialization failed");
        return;
    }

    let (mut shown, blank) = match (Matrix::new(GEOMETRY), Matrix::new(GEOMETRY)) {
        (Ok(shown), Ok(blank)) => (shown, blank),
        _ => {
            error!("Display geometry {:?} does not fit the buffer", GEOMETRY);
            return;
        }
    };

    let mut layers = LayerTable::new(LAYER_NAMES);
    let mut ticker = Ticker::every(Duration::from_millis(REFRESH_MS));

    loop {
        layers.set_state(LAYER_STATE.load(Ordering::Relaxed));

        let mut next = blank.clone();
        let drawn = screen.lock().await.screen().draw(&layers, &mut next);
        let result = match drawn {
            Ok(true) => Ok(()),
            Ok(false) => draw_default(&mut next, role, &layers),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Screen draw error: {:?}", e);
        }

        if shown.update_from(&next) {
            match flush(&mut oled, &shown).await {
                Ok(()) => shown.mark_clean(),
                Err(e) => warn!("OLED flush failed: {:?}", e),
            }
        }

        select(ticker.next(), SCREEN_CHANGED.wait()).await;
    }
}

/// Screen shown while the host has not put anything up
fn draw_default(
    display: &mut impl CharDisplay,
    role: Role,
    layers: &LayerTable,
) -> Result<(), DisplayError> {
    match role {
        Role::Master => {
            let mut name: String<32> = String::new();
            // Names longer than the buffer are left out
            let _ = layers.write_layer_name(&mut name);
            display.write_str(b"Layer: ")?;
            display.write_line(name.as_bytes())?;
        }
        Role::Slave => {
            display.write_line(b"oledctrl")?;
        }
    }
    Ok(())
}

/// Draw the grid into the frame buffer and send it to the panel
async fn flush(oled: &mut Oled, matrix: &Matrix) -> Result<(), DisplayError> {
    oled.clear_buffer();
    let style = MonoTextStyle::new(&FONT_6X8, BinaryColor::On);

    for (row, line) in matrix.lines().enumerate() {
        let mut text: String<32> = String::new();
        for &b in line {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            let _ = text.push(c);
        }
        Text::with_baseline(&text, Point::new(0, row as i32 * ROW_HEIGHT), style, Baseline::Top)
            .draw(oled)
            .map_err(panel_error)?;
    }

    oled.flush().await.map_err(panel_error)
}
