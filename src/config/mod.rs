//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/ride-offer/config.toml

pub mod defaults;

use crate::constants::api::NOMINATIM_URL;
use crate::constants::fare::{
    DEFAULT_FUEL_PRICE_PER_LITER, DEFAULT_MILEAGE_KM_PER_LITER, DEFAULT_SEATS,
};
use crate::error::{Error, Result};
use crate::fare::FareParams;
use crate::geo::nominatim::NominatimBackend;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fare model defaults
    #[serde(default)]
    pub fare: FareConfig,

    /// Geocoding settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Ride backend settings
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Fare model defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareConfig {
    /// Vehicle mileage in km per liter
    #[serde(default = "default_mileage")]
    pub mileage_km_per_liter: f64,

    /// Fuel price per liter
    #[serde(default = "default_fuel_price")]
    pub fuel_price_per_liter: f64,

    /// Default passenger seats offered
    #[serde(default = "default_seats")]
    pub default_seats: u32,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    /// Comma-separated country filter for search; empty disables it
    #[serde(default = "default_country_codes")]
    pub country_codes: String,
}

/// Ride backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Bearer token for authenticated endpoints
    #[serde(default)]
    pub auth_token: String,
}

// Default value functions for serde
fn default_mileage() -> f64 {
    DEFAULT_MILEAGE_KM_PER_LITER
}
fn default_fuel_price() -> f64 {
    DEFAULT_FUEL_PRICE_PER_LITER
}
fn default_seats() -> u32 {
    DEFAULT_SEATS
}
fn default_geocode_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_country_codes() -> String {
    DEFAULT_COUNTRY_CODES.to_string()
}
fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            mileage_km_per_liter: default_mileage(),
            fuel_price_per_liter: default_fuel_price(),
            default_seats: default_seats(),
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
            country_codes: default_country_codes(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            auth_token: String::new(),
        }
    }
}

impl FareConfig {
    /// The fare parameters described by this config
    pub fn params(&self) -> FareParams {
        FareParams::new(self.mileage_km_per_liter, self.fuel_price_per_liter)
    }
}

impl GeocodeConfig {
    /// Build the geocoding backend described by this config
    pub fn backend(&self) -> NominatimBackend {
        NominatimBackend::with_base_url(&self.base_url).country_codes(&self.country_codes)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["fare", "mileage_km_per_liter"] => Some(self.fare.mileage_km_per_liter.to_string()),
            ["fare", "fuel_price_per_liter"] => Some(self.fare.fuel_price_per_liter.to_string()),
            ["fare", "default_seats"] => Some(self.fare.default_seats.to_string()),

            ["geocode", "base_url"] => Some(self.geocode.base_url.clone()),
            ["geocode", "country_codes"] => Some(self.geocode.country_codes.clone()),

            ["backend", "base_url"] => Some(self.backend.base_url.clone()),
            ["backend", "auth_token"] => Some(self.backend.auth_token.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["fare", "mileage_km_per_liter"] => {
                self.fare.mileage_km_per_liter = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid mileage value: {}", value)))?;
            }
            ["fare", "fuel_price_per_liter"] => {
                self.fare.fuel_price_per_liter = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid fuel price value: {}", value)))?;
            }
            ["fare", "default_seats"] => {
                self.fare.default_seats = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid seats value: {}", value)))?;
            }
            ["geocode", "base_url"] => {
                self.geocode.base_url = value.to_string();
            }
            ["geocode", "country_codes"] => {
                self.geocode.country_codes = value.to_string();
            }
            ["backend", "base_url"] => {
                self.backend.base_url = value.to_string();
            }
            ["backend", "auth_token"] => {
                self.backend.auth_token = value.to_string();
            }
            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "fare.mileage_km_per_liter",
            "fare.fuel_price_per_liter",
            "fare.default_seats",
            "geocode.base_url",
            "geocode.country_codes",
            "backend.base_url",
            "backend.auth_token",
        ]
    }
}
