// config lets you read a separate config file
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::dates::{DEFAULT_MARKUP, DEFAULT_PIVOT};
use crate::error::Result;

/// Tunables for comparator compilation.
///
/// ```toml
/// # rowshape.toml
/// pivot_year = 50
/// markup = "()[]"
/// default_numeric = false
/// ```
/// Every key can also be given as an environment variable, e.g. `ROWSHAPE_PIVOT_YEAR=50`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Two-digit years below the pivot are in the 2000s, the rest in the 1900s.
    pub pivot_year: u32,
    /// Characters stripped from date values before matching.
    pub markup: String,
    /// Compare numerically when a clause names no operator.
    pub default_numeric: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pivot_year: DEFAULT_PIVOT,
            markup: DEFAULT_MARKUP.to_string(),
            default_numeric: false,
        }
    }
}

impl Settings {
    /// Reads `path` (any format `config` recognizes, the file may be absent)
    /// and then `ROWSHAPE_*` environment variables on top of the defaults.
    pub fn load(path: &str) -> Result<Settings> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("ROWSHAPE"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
