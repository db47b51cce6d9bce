use crate::abi::{AbiDescriptor, Address};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Prefix for environment overrides, e.g. `CHAIN_BLOG__RPC__ENDPOINT_URL`
pub const ENV_PREFIX: &str = "CHAIN_BLOG";

const GALILEO_ENDPOINT: &str = "https://galileo.web3q.io:8545";
const GATEWAY_DOMAIN: &str = "w3q-g.w3link.io";

// 0x7241925dFAe027d30a0913f800AA982865F27a37
const GALILEO_BLOG_CONTRACT: Address = Address::new([
    0x72, 0x41, 0x92, 0x5d, 0xfa, 0xe0, 0x27, 0xd3, 0x0a, 0x09, 0x13, 0xf8, 0x00, 0xaa, 0x98, 0x28,
    0x65, 0xf2, 0x7a, 0x37,
]);
// 0x80BFB57Ff7820AccB9fCFA2c9633fFAaeEf60f62
const GALILEO_FILE_CONTRACT: Address = Address::new([
    0x80, 0xbf, 0xb5, 0x7f, 0xf7, 0x82, 0x0a, 0xcc, 0xb9, 0xfc, 0xfa, 0x2c, 0x96, 0x33, 0xff, 0xaa,
    0xee, 0xf6, 0x0f, 0x62,
]);
// 0x5454fcF773C6Af515CecC5626f383949f9a0159B
const LEGACY_BLOG_CONTRACT: Address = Address::new([
    0x54, 0x54, 0xfc, 0xf7, 0x73, 0xc6, 0xaf, 0x51, 0x5c, 0xec, 0xc5, 0x62, 0x6f, 0x38, 0x39, 0x49,
    0xf9, 0xa0, 0x15, 0x9b,
]);
// 0xC9f9A8c8adFA479C0D3438e8FD1B614049af4136
const LEGACY_FILE_CONTRACT: Address = Address::new([
    0xc9, 0xf9, 0xa8, 0xc8, 0xad, 0xfa, 0x47, 0x9c, 0x0d, 0x34, 0x38, 0xe8, 0xfd, 0x1b, 0x61, 0x40,
    0x49, 0xaf, 0x41, 0x36,
]);

/// Deployed contract versions the reader ships defaults for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Current blog and file contracts on the Galileo testnet
    #[default]
    Galileo,
    /// The first deployment, kept for old links
    Legacy,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub contract: ContractConfig,
    pub logging: LoggingConfig,
}

/// JSON-RPC endpoint and HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub endpoint_url: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Block tag passed to `eth_call`
    pub block_tag: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint_url: GALILEO_ENDPOINT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("chain-blog-reader/{}", env!("CARGO_PKG_VERSION")),
            block_tag: "latest".to_string(),
        }
    }
}

impl RpcConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Which contract to read and how to interpret it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Blog contract exposing the list and content functions
    pub address: Address,
    /// File contract whose gateway serves cover images. When unset, cover
    /// fields are returned as stored.
    pub secondary_address: Option<Address>,
    pub gateway_domain: String,
    pub abi: AbiDescriptor,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: GALILEO_BLOG_CONTRACT,
            secondary_address: Some(GALILEO_FILE_CONTRACT),
            gateway_domain: GATEWAY_DOMAIN.to_string(),
            abi: AbiDescriptor::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Command-line overrides applied on top of file and environment sources
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint_url: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl Config {
    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Galileo => Self::default(),
            Preset::Legacy => Self {
                contract: ContractConfig {
                    address: LEGACY_BLOG_CONTRACT,
                    secondary_address: Some(LEGACY_FILE_CONTRACT),
                    ..ContractConfig::default()
                },
                ..Self::default()
            },
        }
    }

    /// Layer a preset, an optional TOML file and `CHAIN_BLOG__*` variables.
    pub fn load(preset: Preset, path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::preset(preset))?);

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.endpoint_url {
            self.rpc.endpoint_url.clone_from(endpoint);
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level.clone_from(level);
        }
        if let Some(json) = overrides.json_logs {
            self.logging.json = json;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.rpc.endpoint_url).map_err(|e| {
            Error::invalid_input("rpc.endpoint_url", format!("'{}': {e}", self.rpc.endpoint_url))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::invalid_input(
                "rpc.endpoint_url",
                format!("unsupported scheme '{}'", endpoint.scheme()),
            ));
        }

        if self.rpc.timeout_secs == 0 {
            return Err(Error::invalid_input("rpc.timeout_secs", "must be greater than 0"));
        }
        if self.rpc.block_tag.trim().is_empty() {
            return Err(Error::invalid_input("rpc.block_tag", "cannot be empty"));
        }

        if self.contract.address.is_zero() {
            return Err(Error::invalid_input("contract.address", "cannot be the zero address"));
        }
        if self.contract.secondary_address.is_some()
            && self.contract.gateway_domain.trim_matches('/').is_empty()
        {
            return Err(Error::invalid_input(
                "contract.gateway_domain",
                "required when secondary_address is set",
            ));
        }

        self.contract.abi.validate()
    }
}
