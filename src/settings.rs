//! Service configuration. Read once at startup from defaults, an optional
//! TOML file, and the environment (`TF_ENDPOINT`, `PORT`, `HOST`,
//! `MAX_PAYLOAD`).

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,actix_web=debug";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Largest accepted request body. Base 64 images are big.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The `:predict` url of the inference server
    pub tf_endpoint: Url,

    pub host: String,

    pub port: u16,

    pub max_payload: usize,
}

#[derive(Deserialize)]
struct RawSettings {
    tf_endpoint: String,
    host: String,
    port: u16,
    max_payload: usize,
}

impl Settings {
    /// Load from an optional config file, overridden by environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path));
        }
        let builder = builder.add_source(::config::Environment::default());

        Self::from_builder(builder)
    }

    /// Apply the defaults beneath `builder` and deserialize
    pub fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self> {
        let raw: RawSettings = builder
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("max_payload", DEFAULT_MAX_PAYLOAD as i64)?
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        let tf_endpoint = Url::parse(&raw.tf_endpoint)
            .with_context(|| format!("tf_endpoint {:?} is not a url", raw.tf_endpoint))?;
        if !matches!(tf_endpoint.scheme(), "http" | "https") {
            anyhow::bail!("tf_endpoint {tf_endpoint} is not an http url");
        }

        Ok(Settings {
            tf_endpoint,
            host: raw.host,
            port: raw.port,
            max_payload: raw.max_payload,
        })
    }

    /// The address the HTTP server binds to
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
