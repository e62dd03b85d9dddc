//! Client and server configuration

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tuio_core::ConvertorRegistry;

use crate::error::Result;

/// Largest UDP payload
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Local address to listen on
    #[serde(default = "default_client_bind")]
    pub bind_addr: String,
    /// Keep messages with unknown or disabled addresses as generic messages
    #[serde(default)]
    pub accept_unknown: bool,
    /// Addresses to decode; empty decodes every catalog message
    #[serde(default)]
    pub convertors: Vec<String>,
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
}

fn default_client_bind() -> String {
    format!("0.0.0.0:{}", tuio_core::DEFAULT_UDP_PORT)
}

fn default_max_packet_size() -> usize {
    MAX_UDP_PAYLOAD
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_client_bind(),
            accept_unknown: false,
            convertors: Vec::new(),
            max_packet_size: MAX_UDP_PAYLOAD,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decoder table with only the configured addresses enabled
    pub fn registry(&self) -> ConvertorRegistry {
        let mut registry = ConvertorRegistry::with_defaults();
        registry.restrict_to(&self.convertors);
        registry
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_bind")]
    pub bind_addr: String,
    /// Where bundles are sent
    #[serde(default = "default_target")]
    pub target_addr: String,
    /// Abort a send on the first adaptor error instead of skipping the adaptor
    #[serde(default)]
    pub paranoid: bool,
    /// Application name written into extended frame messages
    #[serde(default = "default_source_name")]
    pub source_name: String,
    #[serde(default = "default_source_address")]
    pub source_address: Ipv4Addr,
    #[serde(default)]
    pub instance_id: u32,
    /// Sensor width and height; `[0, 0]` leaves it unset
    #[serde(default)]
    pub dimension: [u16; 2],
}

fn default_server_bind() -> String {
    "0.0.0.0:0".to_string()
}

fn default_target() -> String {
    format!("127.0.0.1:{}", tuio_core::DEFAULT_UDP_PORT)
}

fn default_source_name() -> String {
    "tuio-rs".to_string()
}

fn default_source_address() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_server_bind(),
            target_addr: default_target(),
            paranoid: false,
            source_name: default_source_name(),
            source_address: default_source_address(),
            instance_id: 0,
            dimension: [0, 0],
        }
    }
}

impl ServerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults_from_empty_json() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:3333");
    }

    #[test]
    fn test_client_convertor_subset() {
        let config =
            ClientConfig::from_json(r#"{"convertors": ["/tuio2/frm", "/tuio2/alv"]}"#).unwrap();
        let registry = config.registry();
        assert!(registry.is_enabled("/tuio2/frm"));
        assert!(!registry.is_enabled("/tuio2/ptr"));
    }

    #[test]
    fn test_server_config_fields() {
        let config = ServerConfig::from_json(
            r#"{"paranoid": true, "source_address": "10.1.2.3", "dimension": [1920, 1080]}"#,
        )
        .unwrap();
        assert!(config.paranoid);
        assert_eq!(config.source_address, Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(config.dimension, [1920, 1080]);
        assert_eq!(config.source_name, "tuio-rs");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = ServerConfig::from_json("{\"paranoid\": 3}").unwrap_err();
        assert!(matches!(err, crate::ClientError::Config(_)));
    }
}
