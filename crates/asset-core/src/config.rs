//! Configuration for registries, needed sets and inclusions
//!
//! All sections are plain `serde` structs with defaults, so a host can load
//! them from a TOML file or build them in code:
//!
//! ```toml
//! [registry]
//! check_files = true
//!
//! [needed]
//! versioning = "yes"
//! base_url = "https://cdn.example.com"
//!
//! [inclusion]
//! bundle = true
//! minified = true
//! ```
//!
//! Boolean keys also accept the strings `true/yes/on/y/t/1` and
//! `false/no/off/n/f/0`, in any case.

use std::path::Path;

use asset_fs::SignatureKind;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// URL segment under which libraries are published by default.
pub const DEFAULT_PUBLISHER_SIGNATURE: &str = "assets";

/// Parse a boolean from its textual forms.
///
/// # Errors
///
/// Returns `Error::Configuration` for anything that is not a known boolean
/// word.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "t" | "1" => Ok(true),
        "false" | "no" | "off" | "n" | "f" | "0" => Ok(false),
        _ => Err(Error::configuration(format!(
            "String is not true/false: '{value}'"
        ))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Text(String),
}

fn de_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(value) => Ok(value),
        BoolLike::Text(text) => parse_bool(&text).map_err(D::Error::custom),
    }
}

fn default_true() -> bool {
    true
}

fn default_publisher_signature() -> String {
    DEFAULT_PUBLISHER_SIGNATURE.to_string()
}

/// Declaration-time checks of a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// Reject resources whose file is missing under the library root.
    #[serde(default, deserialize_with = "de_bool")]
    pub check_files: bool,
}

/// Settings of a [`NeededResources`](crate::NeededResources).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeededConfig {
    /// Add a `:version:` segment with the library signature to URLs.
    #[serde(default, deserialize_with = "de_bool")]
    pub versioning: bool,

    /// Sign libraries by content hash instead of modification time.
    #[serde(default, deserialize_with = "de_bool")]
    pub versioning_use_md5: bool,

    /// Recompute signatures for every needed set instead of once.
    #[serde(default = "default_true", deserialize_with = "de_bool")]
    pub recompute_hashes: bool,

    /// Prefix of every library URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Fallback prefix when no base URL is set.
    #[serde(default)]
    pub script_name: Option<String>,

    /// URL segment libraries are published under; empty to omit.
    #[serde(default = "default_publisher_signature")]
    pub publisher_signature: String,
}

impl Default for NeededConfig {
    fn default() -> Self {
        Self {
            versioning: false,
            versioning_use_md5: false,
            recompute_hashes: true,
            base_url: None,
            script_name: None,
            publisher_signature: default_publisher_signature(),
        }
    }
}

impl NeededConfig {
    /// Signature strategy selected by `versioning_use_md5`.
    pub fn signature_kind(&self) -> SignatureKind {
        if self.versioning_use_md5 {
            SignatureKind::ContentHash
        } else {
            SignatureKind::Mtime
        }
    }
}

/// Settings of the inclusion pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionConfig {
    #[serde(default, deserialize_with = "de_bool")]
    pub rollup: bool,

    #[serde(default, deserialize_with = "de_bool")]
    pub bundle: bool,

    #[serde(default, deserialize_with = "de_bool")]
    pub debug: bool,

    #[serde(default, deserialize_with = "de_bool")]
    pub minified: bool,

    /// Allow bottom-safe resources at the end of the page.
    #[serde(default, deserialize_with = "de_bool")]
    pub bottom: bool,

    /// With `bottom`, move every script to the end of the page.
    #[serde(default, deserialize_with = "de_bool")]
    pub force_bottom: bool,
}

/// All configuration sections of a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub registry: RegistryOptions,

    #[serde(default)]
    pub needed: NeededConfig,

    #[serde(default)]
    pub inclusion: InclusionConfig,
}

impl AssetConfig {
    /// Parse configuration from TOML content.
    ///
    /// # Example
    ///
    /// ```
    /// use asset_core::AssetConfig;
    ///
    /// let config = AssetConfig::from_toml_str(r#"
    /// [needed]
    /// versioning = "on"
    /// publisher_signature = "static"
    /// "#).unwrap();
    ///
    /// assert!(config.needed.versioning);
    /// assert_eq!(config.needed.publisher_signature, "static");
    /// assert!(config.needed.recompute_hashes);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fs` when the file cannot be read and `Error::TomlDe`
    /// when it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| asset_fs::Error::io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded asset configuration");
        Ok(config)
    }
}
