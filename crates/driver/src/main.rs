//! rnr-usb driver
//!
//! Host-side driver that runs one handshake-and-listen session against a
//! vendor bulk interface: open the claimed interface, send the fixed JSON
//! handshake to the OUT endpoint, read the reply, then keep listening on
//! the IN endpoint for a bounded window before releasing everything.

use anyhow::{Context as _, Result};
use clap::Parser;
use driver::config::{self, DriverConfig};
use driver::usb::{self, RusbInterface};
use rusb::UsbContext as _;
use session::{ThreadDelay, run_session, setup_logging};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rnr-usb-driver")]
#[command(
    author,
    version,
    about = "rnr-usb driver - handshake and listen on a vendor bulk interface"
)]
#[command(long_about = "
Runs one session against the configured USB device: claim its vendor
interface, send the JSON handshake to the OUT endpoint, read the reply,
then poll the IN endpoint for a bounded listening window. Exits 0 when
the final read succeeded, 1 otherwise.

EXAMPLES:
    # Run with default config
    rnr-usb-driver

    # Run with custom config
    rnr-usb-driver --config /path/to/driver.toml

    # Drive a specific device
    rnr-usb-driver --device 18d1:2d00

    # List USB devices without running a session
    rnr-usb-driver --list-devices

    # Run with debug logging
    rnr-usb-driver --log-level debug

CONFIGURATION:
    The driver looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/rnr-usb/driver.toml
    3. /etc/rnr-usb/driver.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Device to drive as VID:PID, overriding the configuration
    #[arg(short, long, value_name = "VID:PID")]
    device: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool> {
    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = DriverConfig::default();
        let path = DriverConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(true);
    }

    // Load configuration first (to get log level from config if not specified)
    let mut config = if let Some(path) = args.config.as_deref() {
        DriverConfig::load(Some(path)).context("Failed to load configuration")?
    } else {
        DriverConfig::load_or_default()
    };

    if let Some(ref spec) = args.device {
        let (vendor_id, product_id) = config::parse_device_spec(spec)?;
        config.device.vendor_id = vendor_id;
        config.device.product_id = product_id;
    }

    // Use CLI log level if specified, otherwise use config value
    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.driver.log_level);

    setup_logging(log_level).context("Failed to setup logging")?;

    info!("rnr-usb driver v{}", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", log_level);

    let ctx = rusb::Context::new().context("Failed to initialise USB context")?;

    if args.list_devices {
        list_devices_mode(&ctx)?;
        return Ok(true);
    }

    let handle = usb::open_device(&ctx, config.device.vendor_id, config.device.product_id)?;
    let mut iface = RusbInterface::new(handle, config.device.interface)?;

    let report = run_session(&mut iface, &config.session_config(), &ThreadDelay);

    Ok(report.success)
}

/// List USB devices and exit
fn list_devices_mode(ctx: &rusb::Context) -> Result<()> {
    let devices = usb::list_devices(ctx)?;

    if devices.is_empty() {
        println!("No USB devices found.");
    } else {
        println!("Found {} USB device(s):\n", devices.len());
        for device in devices {
            println!(
                "  {:04x}:{:04x} - {} {}",
                device.vendor_id,
                device.product_id,
                device
                    .manufacturer
                    .as_deref()
                    .unwrap_or("Unknown Manufacturer"),
                device.product.as_deref().unwrap_or("Unknown Product")
            );
            println!(
                "      Bus {:03} Device {:03}",
                device.bus_number, device.device_address
            );
            if let Some(serial) = &device.serial_number {
                println!("      Serial: {}", serial);
            }
            println!();
        }
    }

    Ok(())
}
