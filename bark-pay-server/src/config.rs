//! Dispatcher server configuration.
//!
//! Loads configuration from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8787
//! rpc_url = "$SOLANA_RPC_URL"
//! merchant_address = "BARKmeRcHanT..."
//! merchant_label = "BARK Store"
//! escrow_keypair_path = "/etc/bark/escrow.json"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override server bind address and port
//! - Any `$VAR` referenced by a string value in the file

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `8787`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Solana RPC endpoint URL.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address receiving payment-request funds.
    pub merchant_address: String,

    /// Label shown by paying wallets.
    #[serde(default)]
    pub merchant_label: Option<String>,

    /// Path to the escrow authority keypair file. When unset, an
    /// ephemeral escrow is generated at startup and gift cards do not
    /// survive a restart.
    #[serde(default)]
    pub escrow_keypair_path: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    8787
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_owned()
}

impl ServerConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `HOST` and `PORT` env
    /// vars override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            // No config file: rely on defaults and env overrides.
            String::new()
        };

        let expanded = expand_env_vars(&content);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        Ok(config)
    }
}

/// Expands `$VAR` and `${VAR}` patterns from environment variables,
/// leaving unresolved references in place.
fn expand_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if braced && chars.peek() == Some(&'}') {
            chars.next();
        }
        if name.is_empty() {
            output.push('$');
            continue;
        }
        match std::env::var(&name) {
            Ok(value) => output.push_str(&value),
            Err(_) => {
                output.push('$');
                if braced {
                    output.push('{');
                }
                output.push_str(&name);
                if braced {
                    output.push('}');
                }
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_plain_and_braced_vars() {
        // SAFETY: test-only env mutation.
        unsafe {
            std::env::set_var("BARK_TEST_RPC", "https://rpc.example");
        }
        assert_eq!(expand_env_vars("url = \"$BARK_TEST_RPC\""), "url = \"https://rpc.example\"");
        assert_eq!(
            expand_env_vars("url = \"${BARK_TEST_RPC}/v1\""),
            "url = \"https://rpc.example/v1\""
        );
    }

    #[test]
    fn test_unresolved_vars_are_left_in_place() {
        assert_eq!(
            expand_env_vars("key = \"$BARK_TEST_UNSET_VAR\""),
            "key = \"$BARK_TEST_UNSET_VAR\""
        );
    }

    #[test]
    fn test_defaults_apply_to_minimal_config() {
        let config: ServerConfig =
            toml::from_str("merchant_address = \"11111111111111111111111111111111\"").unwrap();
        assert_eq!(config.port, 8787);
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert!(config.escrow_keypair_path.is_none());
    }
}
