//! Driver configuration management

use anyhow::{Context, Result, anyhow};
use protocol::{BULK_IN, BULK_OUT, EndpointAddress};
use serde::{Deserialize, Serialize};
use session::buffers::DEFAULT_INBOUND_CEILING;
use session::{PollPolicy, SessionConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub driver: DriverSettings,
    pub device: DeviceSettings,
    #[serde(default)]
    pub endpoints: EndpointSettings,
    #[serde(default)]
    pub transfer: TransferSettings,
    #[serde(default)]
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSettings {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Interface number to claim
    #[serde(default)]
    pub interface: u8,
}

/// Fixed bulk endpoint addresses on the claimed interface.
///
/// These are protocol constants for the real device; tests override them to
/// point at simulated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// IN endpoint address (direction bit set)
    #[serde(default = "EndpointSettings::default_in")]
    pub bulk_in: u8,
    /// OUT endpoint address (direction bit clear)
    #[serde(default = "EndpointSettings::default_out")]
    pub bulk_out: u8,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            bulk_in: Self::default_in(),
            bulk_out: Self::default_out(),
        }
    }
}

impl EndpointSettings {
    fn default_in() -> u8 {
        BULK_IN.0
    }

    fn default_out() -> u8 {
        BULK_OUT.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Per-transfer timeout in milliseconds
    #[serde(default = "TransferSettings::default_timeout_ms")]
    pub timeout_ms: u64,
    /// Inbound transfer ceiling in bytes
    #[serde(default = "TransferSettings::default_inbound_ceiling")]
    pub inbound_ceiling: usize,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            inbound_ceiling: Self::default_inbound_ceiling(),
        }
    }
}

impl TransferSettings {
    fn default_timeout_ms() -> u64 {
        1000
    }

    fn default_inbound_ceiling() -> usize {
        DEFAULT_INBOUND_CEILING
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    /// Number of reads in the listening window
    #[serde(default = "PollSettings::default_iterations")]
    pub iterations: u32,
    /// Delay between reads in milliseconds
    #[serde(default = "PollSettings::default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            iterations: Self::default_iterations(),
            interval_ms: Self::default_interval_ms(),
        }
    }
}

impl PollSettings {
    fn default_iterations() -> u32 {
        10
    }

    fn default_interval_ms() -> u64 {
        100
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver: DriverSettings {
                log_level: "info".to_string(),
            },
            device: DeviceSettings {
                // Accessory-mode identity of the target device.
                vendor_id: 0x18d1,
                product_id: 0x2d00,
                interface: 0,
            },
            endpoints: EndpointSettings::default(),
            transfer: TransferSettings::default(),
            poll: PollSettings::default(),
        }
    }
}

impl DriverConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(p).as_ref())
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/rnr-usb/driver.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: DriverConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("rnr-usb").join("driver.toml")
        } else {
            PathBuf::from(".config/rnr-usb/driver.toml")
        }
    }

    /// Session parameters derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bulk_in: EndpointAddress(self.endpoints.bulk_in),
            bulk_out: EndpointAddress(self.endpoints.bulk_out),
            timeout: Duration::from_millis(self.transfer.timeout_ms),
            inbound_ceiling: self.transfer.inbound_ceiling,
            poll: PollPolicy {
                iterations: self.poll.iterations,
                interval: Duration::from_millis(self.poll.interval_ms),
            },
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.driver.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.driver.log_level,
                valid_levels.join(", ")
            ));
        }

        // The direction bit must match each endpoint's role
        if !EndpointAddress(self.endpoints.bulk_in).is_in() {
            return Err(anyhow!(
                "Invalid IN endpoint {:#04x}: direction bit not set",
                self.endpoints.bulk_in
            ));
        }
        if EndpointAddress(self.endpoints.bulk_out).is_in() {
            return Err(anyhow!(
                "Invalid OUT endpoint {:#04x}: direction bit set",
                self.endpoints.bulk_out
            ));
        }

        if self.transfer.timeout_ms == 0 {
            return Err(anyhow!("Transfer timeout must be greater than 0"));
        }

        if self.transfer.inbound_ceiling == 0 {
            return Err(anyhow!("Inbound ceiling must be greater than 0"));
        }

        Ok(())
    }
}

/// Parse a `VID:PID` device override from the command line.
///
/// Accepts plain or `0x`-prefixed hex, e.g. `18d1:2d00` or `0x18d1:0x2d00`.
pub fn parse_device_spec(spec: &str) -> Result<(u16, u16)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 2 {
        return Err(anyhow!(
            "Invalid device spec '{}', expected VID:PID (e.g., '18d1:2d00')",
            spec
        ));
    }

    let vendor_id = parse_hex_id(parts[0], "VID")?;
    let product_id = parse_hex_id(parts[1], "PID")?;
    Ok((vendor_id, product_id))
}

/// Parse a hex ID (VID or PID), with or without `0x` prefix
fn parse_hex_id(id: &str, name: &str) -> Result<u16> {
    let hex_part = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);

    if hex_part.is_empty() || hex_part.len() > 4 {
        return Err(anyhow!(
            "Invalid {} '{}', hex part must be 1-4 digits",
            name,
            id
        ));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| anyhow!("Invalid {} '{}', not a valid hex number", name, id))
}
