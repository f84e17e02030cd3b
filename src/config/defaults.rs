//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default country filter for address search (empty disables the filter)
pub const DEFAULT_COUNTRY_CODES: &str = "pk";

/// Default ride backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "ride-offer";
