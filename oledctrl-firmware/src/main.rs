//! oledctrl - Host-controlled OLEDs for split keyboards
//!
//! Firmware binary for RP2040 keyboard halves. The half with USB power
//! becomes the master: it answers raw HID requests from the host and
//! relays commands for the other half over the split UART. The other
//! half becomes the slave and only runs what the master relays.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, UART0, USB};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::usb::{self, Driver};
use embassy_sync::mutex::Mutex;
use embassy_usb::class::hid::{self as usb_hid, HidReaderWriter, State};
use embassy_usb::{Builder, Config as UsbConfig};
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306Async};
use static_cell::StaticCell;
use usbd_hid::descriptor::SerializedDescriptor;
use {defmt_rtt as _, panic_probe as _};

use oledctrl_core::{Keymap, Role};
use oledctrl_protocol::FRAME_LEN;

use crate::channels::SharedScreen;
use crate::hid::RawHidReport;
use crate::matrix::Matrix;

mod channels;
mod config;
mod hid;
mod keymap;
mod matrix;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
    USBCTRL_IRQ => usb::InterruptHandler<USB>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Static cells for the USB stack
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<State<'static>> = StaticCell::new();

static SCREEN: StaticCell<SharedScreen> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("oledctrl firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // VBUS sense is GPIO24 on Pico-compatible controllers
    let vbus = Input::new(p.PIN_24, Pull::None);
    let role = Role::from_usb_present(vbus.is_high());
    info!("Running as {:?}", role);

    let screen: &'static SharedScreen =
        SCREEN.init(Mutex::new(unwrap!(config::Screen::new(role, config::GEOMETRY))));
    info!(
        "Screen buffers ready: {}x{}",
        config::DISPLAY_COLS,
        config::DISPLAY_ROWS
    );

    // OLED on I2C1 (GPIO2 SDA, GPIO3 SCL)
    let i2c = I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c::Config::default());
    let interface = I2CDisplayInterface::new_custom_address(i2c, config::OLED_I2C_ADDRESS);
    let oled = Ssd1306Async::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    // Split link on UART0 (GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config::SPLIT_BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for split link");

    // Key matrix: rows GPIO4-8 driven, columns GPIO9-14 read
    let rows = [
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
        Output::new(p.PIN_6, Level::Low),
        Output::new(p.PIN_7, Level::Low),
        Output::new(p.PIN_8, Level::Low),
    ];
    let cols = [
        Input::new(p.PIN_9, Pull::Down),
        Input::new(p.PIN_10, Pull::Down),
        Input::new(p.PIN_11, Pull::Down),
        Input::new(p.PIN_12, Pull::Down),
        Input::new(p.PIN_13, Pull::Down),
        Input::new(p.PIN_14, Pull::Down),
    ];
    let matrix = Matrix::new(rows, cols);
    let keymap = unwrap!(Keymap::new(&keymap::LAYERS, Some(keymap::TRI_LAYER)));

    match role {
        Role::Master => {
            let driver = Driver::new(p.USB, Irqs);

            let mut usb_config = UsbConfig::new(config::USB_VID, config::USB_PID);
            usb_config.manufacturer = Some(config::USB_MANUFACTURER);
            usb_config.product = Some(config::USB_PRODUCT);
            usb_config.max_power = 100;
            usb_config.max_packet_size_0 = 64;

            let mut builder = Builder::new(
                driver,
                usb_config,
                CONFIG_DESCRIPTOR.init([0; 256]),
                BOS_DESCRIPTOR.init([0; 256]),
                MSOS_DESCRIPTOR.init([0; 256]),
                CONTROL_BUF.init([0; 64]),
            );

            let hid_config = usb_hid::Config {
                report_descriptor: RawHidReport::desc(),
                request_handler: None,
                poll_ms: 1,
                max_packet_size: FRAME_LEN as u16,
            };
            let hid = HidReaderWriter::<_, FRAME_LEN, FRAME_LEN>::new(
                &mut builder,
                HID_STATE.init(State::new()),
                hid_config,
            );
            let usb = builder.build();

            info!("USB raw HID initialized");

            spawner.spawn(tasks::usb_task(usb)).unwrap();
            spawner.spawn(tasks::raw_hid_task(hid, screen)).unwrap();
            spawner.spawn(tasks::link_tx_task(tx, screen)).unwrap();
        }
        Role::Slave => {
            spawner.spawn(tasks::link_rx_task(rx, screen)).unwrap();
        }
    }

    spawner.spawn(tasks::render_task(oled, screen, role)).unwrap();
    spawner.spawn(tasks::keys_task(role)).unwrap();
    spawner.spawn(tasks::matrix_task(matrix, keymap)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
