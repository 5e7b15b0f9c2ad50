//! oledctrl-host - drives the OLEDs of a split keyboard from the computer
//!
//! The master screen shows the active layer, a message and the tags. The
//! slave screen shows system statistics, refreshed every interval.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use hidapi::HidApi;
use tracing::{debug, error, info, warn};

use oledctrl_host::{
    perf_lines, Controller, DeviceFilter, HidTransport, HostError, PerfSampler, Tags, Transport,
};
use oledctrl_protocol::ScreenId;

/// Pause between device searches
const RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Longest wait for an event before checking the clock again
const EVENT_POLL: Duration = Duration::from_millis(100);

fn parse_hex(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "oledctrl-host", version, about = "Drive split keyboard OLEDs over raw HID")]
struct Cli {
    /// USB vendor id (hex)
    #[arg(long, default_value = "0x04D8", value_parser = parse_hex)]
    vid: u16,

    /// USB product id (hex)
    #[arg(long, default_value = "0xEB2D", value_parser = parse_hex)]
    pid: u16,

    /// Raw HID interface number, for platforms without usage pages
    #[arg(long)]
    interface: Option<i32>,

    /// Second line of the master screen
    #[arg(long, default_value = "You look great today!")]
    message: String,

    /// Statistics refresh interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Mount point whose disk usage is shown
    #[arg(long, default_value = "/")]
    disk: PathBuf,

    /// Number of tags per screen
    #[arg(long, default_value_t = 10)]
    tags: u8,
}

fn master_lines(cli: &Cli, tags: &Tags) -> [String; 3] {
    ["Layer: %l".to_string(), cli.message.clone(), tags.summary()]
}

/// Drive one connected keyboard until it goes away or we are stopped
fn run<T: Transport>(transport: T, cli: &Cli, running: &AtomicBool) -> Result<(), HostError> {
    let mut ctl = Controller::new(transport);
    let (cols, rows) = ctl.set_up()?;
    info!("OLED size {}x{}", cols, rows);

    let mut tags = Tags::new(cli.tags);
    let mut sampler = PerfSampler::new(&cli.disk);
    let interval = Duration::from_millis(cli.interval_ms);

    ctl.draw_screen(ScreenId::Master, &master_lines(cli, &tags))?;
    let mut next_stats = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= next_stats {
            let stats = sampler.sample();
            debug!("Stats: {:?}", stats);
            ctl.draw_screen(ScreenId::Slave, &perf_lines(&stats, cols))?;
            next_stats = now + interval;
        }

        let wait = next_stats.saturating_duration_since(Instant::now()).min(EVENT_POLL);
        if let Some(event) = ctl.poll_event(wait)? {
            info!("Tag event: {:?}", event);
            if let Some(screen) = tags.apply(event) {
                info!("{:?} screen now on tag {}", screen, tags.get(screen));
                ctl.draw_screen(ScreenId::Master, &master_lines(cli, &tags))?;
            }
        }
    }

    info!("Clearing screens");
    ctl.clear(ScreenId::Master)?;
    ctl.clear(ScreenId::Slave)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oledctrl_host=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!("Started");

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        warn!("Could not set Ctrl+C handler: {e}");
    }

    let filter = DeviceFilter {
        vid: cli.vid,
        pid: cli.pid,
        interface: cli.interface,
    };
    let mut api = HidApi::new()?;

    while running.load(Ordering::SeqCst) {
        api.refresh_devices()?;
        match HidTransport::open(&api, &filter) {
            Ok(transport) => match run(transport, &cli, &running) {
                Ok(()) => break,
                Err(e @ HostError::PermissionDenied(_)) => return Err(e.into()),
                Err(e) => error!("Keyboard session ended: {e}"),
            },
            Err(HostError::DeviceNotFound { .. }) => debug!("Keyboard not found, retrying"),
            Err(e) => return Err(e.into()),
        }
        thread::sleep(RETRY_INTERVAL);
    }

    info!("Stopped");
    Ok(())
}
