//! Build script for oledctrl-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates keyboard.toml and turns it into Rust constants

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Widest grid a 128x32 panel shows with a 6x8 font
const MAX_COLS: i64 = 128 / 6;
const MAX_ROWS: i64 = 32 / 8;

fn main() {
    setup_linker();
    let config = load_config();
    validate(&config);
    generate(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=keyboard.toml");

    let config_path = Path::new("keyboard.toml");
    if !config_path.exists() {
        fail("keyboard.toml not found", &["Create one in the oledctrl-firmware directory".to_string()]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read keyboard.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in keyboard.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    }
}

/// Print a boxed error and stop the build
fn fail(title: &str, errors: &[String]) -> ! {
    let lines = errors
        .iter()
        .map(|e| {
            let e = if e.len() > 60 { format!("{}...", &e[..57]) } else { e.clone() };
            format!("║  • {:<62} ║", e)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, lines
    );
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn string<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a str> {
    config.get(section)?.get(key)?.as_str()
}

fn layer_names(config: &toml::Value) -> Vec<String> {
    config
        .get("layers")
        .and_then(|l| l.get("names"))
        .and_then(|n| n.as_array())
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn check_range(errors: &mut Vec<String>, config: &toml::Value, section: &str, key: &str, min: i64, max: i64) {
    match int(config, section, key) {
        Some(v) if v < min || v > max => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => {}
        None => errors.push(format!("[{}] missing '{}'", section, key)),
    }
}

fn validate(config: &toml::Value) {
    let mut errors = Vec::new();

    for section in ["display", "split", "usb", "layers"] {
        if config.get(section).is_none() {
            errors.push(format!("Missing [{}] section", section));
        }
    }
    if !errors.is_empty() {
        fail("Missing required sections in keyboard.toml", &errors);
    }

    check_range(&mut errors, config, "display", "cols", 1, MAX_COLS);
    check_range(&mut errors, config, "display", "rows", 1, MAX_ROWS);
    check_range(&mut errors, config, "display", "i2c_address", 0x08, 0x77);
    check_range(&mut errors, config, "split", "baud_rate", 9600, 1_000_000);
    check_range(&mut errors, config, "usb", "vid", 0, 0xFFFF);
    check_range(&mut errors, config, "usb", "pid", 0, 0xFFFF);

    for key in ["manufacturer", "product"] {
        if string(config, "usb", key).is_none() {
            errors.push(format!("[usb] missing '{}'", key));
        }
    }

    let names = layer_names(config);
    if names.is_empty() {
        errors.push("[layers] names must list at least one layer".to_string());
    }
    if names.len() > 32 {
        errors.push("[layers] at most 32 layers".to_string());
    }

    if !errors.is_empty() {
        fail("Invalid keyboard configuration", &errors);
    }

    println!("cargo:warning=keyboard.toml validated successfully");
}

/// Write `keyboard_config.rs` into OUT_DIR
fn generate(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // validate() has checked every value below
    let cols = int(config, "display", "cols").unwrap();
    let rows = int(config, "display", "rows").unwrap();
    let mut src = String::new();
    writeln!(src, "// Generated from keyboard.toml by build.rs").unwrap();
    writeln!(src, "pub const DISPLAY_COLS: u8 = {};", cols).unwrap();
    writeln!(src, "pub const DISPLAY_ROWS: u8 = {};", rows).unwrap();
    writeln!(src, "pub const DISPLAY_CELLS: usize = {};", cols * rows).unwrap();
    writeln!(
        src,
        "pub const OLED_I2C_ADDRESS: u8 = {:#04x};",
        int(config, "display", "i2c_address").unwrap()
    )
    .unwrap();
    writeln!(
        src,
        "pub const SPLIT_BAUD_RATE: u32 = {};",
        int(config, "split", "baud_rate").unwrap()
    )
    .unwrap();
    writeln!(src, "pub const USB_VID: u16 = {:#06x};", int(config, "usb", "vid").unwrap()).unwrap();
    writeln!(src, "pub const USB_PID: u16 = {:#06x};", int(config, "usb", "pid").unwrap()).unwrap();
    writeln!(
        src,
        "pub const USB_MANUFACTURER: &str = {:?};",
        string(config, "usb", "manufacturer").unwrap()
    )
    .unwrap();
    writeln!(
        src,
        "pub const USB_PRODUCT: &str = {:?};",
        string(config, "usb", "product").unwrap()
    )
    .unwrap();
    writeln!(src, "pub const LAYER_NAMES: &[&str] = &{:?};", layer_names(config)).unwrap();

    fs::write(out_dir.join("keyboard_config.rs"), src).unwrap();
}
