use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_LINE_LENGTH, MIN_LINE_LENGTH};
use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub parse: ParseConfig,
    pub serialize: SerializeConfig,
    pub logging: LoggingConfig,
}

/// How documents are read.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    /// Promote transcode errors to a single fatal error.
    pub strict: bool,
    /// Decode property values into native types after building the tree.
    pub transcode: bool,
    /// Accept content lines outside any `BEGIN`/`END` pair.
    pub allow_bare_lines: bool,
    /// Drop content lines that fail the grammar instead of aborting.
    pub skip_invalid_lines: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializeConfig {
    pub line_length: usize,
    pub implicit_lines: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict: false,
            transcode: true,
            allow_bare_lines: false,
            skip_invalid_lines: false,
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            implicit_lines: false,
        }
    }
}

impl SerializeConfig {
    /// ## Summary
    /// Checks that the configured line length leaves room for folding.
    ///
    /// ## Errors
    /// Returns [`CoreError::ConfigError`] if `line_length` is below
    /// [`MIN_LINE_LENGTH`].
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.line_length < MIN_LINE_LENGTH {
            return Err(CoreError::ConfigError(format!(
                "serialize.line_length must be at least {MIN_LINE_LENGTH}, got {}",
                self.line_length
            )));
        }
        Ok(())
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `CALCARD_*` environment variables and an
    /// optional `config.toml`.
    ///
    /// Nested keys use a double underscore, e.g. `CALCARD_SERIALIZE__LINE_LENGTH`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("parse.strict", false)?
            .set_default("parse.transcode", true)?
            .set_default("parse.allow_bare_lines", false)?
            .set_default("parse.skip_invalid_lines", false)?
            .set_default("serialize.line_length", DEFAULT_LINE_LENGTH as u64)?
            .set_default("serialize.implicit_lines", false)?
            .set_default("logging.level", "info")?
            .add_source(
                config::Environment::with_prefix("CALCARD")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.serialize.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
