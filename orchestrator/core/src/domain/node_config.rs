// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Host Configuration Types
//
// Defines the configuration schema for a Bailiff host, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Host identity (room, user) and network binding
// - Static peer list used for discovery across processes
// - Roaming timings for Dexter agents launched from this host
// - Observability settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "gotag/v1";
pub const KIND: &str = "HostConfig";

/// Top-level Kubernetes-style host configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfigManifest {
    /// API version (must be "gotag/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "HostConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: HostConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable host name
    pub name: String,
}

/// Host configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfigSpec {
    #[serde(default)]
    pub host: HostSettings,

    /// Base URLs of peer Bailiffs, e.g. "http://10.0.0.2:8700"
    #[serde(default)]
    pub peers: Vec<String>,

    #[serde(default)]
    pub roaming: RoamingSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Physical room the host is in
    #[serde(default = "default_room")]
    pub room: String,

    /// Owning user
    #[serde(default = "default_user")]
    pub user: String,

    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// HTTP API port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address reported in ping replies. Resolved from the host name if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertise_address: Option<String>,

    /// Verbose per-agent logging
    #[serde(default)]
    pub debug: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            room: default_room(),
            user: default_user(),
            bind: default_bind_address(),
            port: default_port(),
            advertise_address: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoamingSettings {
    /// Pause before every discovery round
    #[serde(default = "default_restraint_sleep")]
    pub restraint_sleep_ms: u64,

    /// Pause before retrying after discovery found nothing
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,

    /// Upper bound on Bailiffs returned by one lookup
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Timeout for each remote call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl RoamingSettings {
    pub fn restraint_sleep(&self) -> Duration {
        Duration::from_millis(self.restraint_sleep_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RoamingSettings {
    fn default() -> Self {
        Self {
            restraint_sleep_ms: default_restraint_sleep(),
            retry_interval_ms: default_retry_interval(),
            max_matches: default_max_matches(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Prometheus exporter port; no exporter when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

// Default value functions

fn default_room() -> String {
    "anywhere".to_string()
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "anonymous".to_string())
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8700
}

fn default_restraint_sleep() -> u64 {
    5_000
}

fn default_retry_interval() -> u64 {
    20_000
}

fn default_max_matches() -> usize {
    8
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for HostConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "bailiff".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata { name: hostname },
            spec: HostConfigSpec::default(),
        }
    }
}

impl HostConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. GOTAG_CONFIG_PATH environment variable
    /// 2. ./gotag.yaml (working directory)
    /// 3. ~/.gotag/config.yaml (user home)
    /// 4. /etc/gotag/config.yaml (system, Unix) or C:\ProgramData\GoTag\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GOTAG_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./gotag.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".gotag").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/gotag/config.yaml");

        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\GoTag\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path (fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(room) = std::env::var("GOTAG_ROOM") {
            tracing::info!("Environment override: GOTAG_ROOM={}", room);
            self.spec.host.room = room;
        }

        if let Ok(user) = std::env::var("GOTAG_USER") {
            tracing::info!("Environment override: GOTAG_USER={}", user);
            self.spec.host.user = user;
        }

        if let Ok(val) = std::env::var("GOTAG_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: GOTAG_PORT={}", port);
                    self.spec.host.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for GOTAG_PORT: '{}'. Expected a port number. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.host.room.trim().is_empty() {
            anyhow::bail!("spec.host.room cannot be empty");
        }

        if self.spec.host.port == 0 {
            anyhow::bail!("spec.host.port must be non-zero");
        }

        for peer in &self.spec.peers {
            let parsed = url::Url::parse(peer)
                .map_err(|e| anyhow::anyhow!("Invalid peer URL '{}': {}", peer, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Peer URL '{}' must use http or https", peer);
            }
        }

        if self.spec.roaming.max_matches == 0 {
            anyhow::bail!("spec.roaming.max_matches must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = HostConfigManifest::default();
        assert_eq!(manifest.api_version, "gotag/v1");
        assert_eq!(manifest.kind, "HostConfig");
        assert!(!manifest.metadata.name.is_empty());
        assert_eq!(manifest.spec.host.room, "anywhere");
        assert_eq!(manifest.spec.host.port, 8700);
        assert_eq!(manifest.spec.roaming.restraint_sleep(), Duration::from_secs(5));
        assert_eq!(manifest.spec.roaming.retry_interval(), Duration::from_secs(20));
        assert_eq!(manifest.spec.roaming.max_matches, 8);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_fills_defaults() {
        let yaml = r#"
apiVersion: gotag/v1
kind: HostConfig
metadata:
  name: bailiff-1
spec:
  host:
    room: lab
    user: alice
    port: 8701
  peers:
    - http://127.0.0.1:8702
  roaming:
    restraint_sleep_ms: 100
"#;
        let manifest = HostConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.metadata.name, "bailiff-1");
        assert_eq!(manifest.spec.host.room, "lab");
        assert_eq!(manifest.spec.host.bind, "127.0.0.1");
        assert_eq!(manifest.spec.peers.len(), 1);
        assert_eq!(manifest.spec.roaming.restraint_sleep_ms, 100);
        assert_eq!(manifest.spec.roaming.retry_interval_ms, 20_000);
        assert!(manifest.spec.observability.is_none());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_unknown_metadata_keys_are_ignored() {
        let yaml = r#"
apiVersion: gotag/v1
kind: HostConfig
metadata:
  name: bailiff-2
  labels:
    zone: east
spec: {}
"#;
        let manifest = HostConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.metadata.name, "bailiff-2");
        let rendered = serde_yaml::to_string(&manifest).unwrap();
        assert!(!rendered.contains("labels"));
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gotag.yaml");

        let mut manifest = HostConfigManifest::default();
        manifest.metadata.name = "roundtrip".to_string();
        manifest.spec.observability = Some(ObservabilityConfig {
            metrics_port: Some(9100),
        });
        manifest.to_yaml_file(&path).unwrap();

        let loaded = HostConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "roundtrip");
        assert_eq!(loaded.spec.observability.unwrap().metrics_port, Some(9100));
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let missing = PathBuf::from("/nonexistent/gotag.yaml");
        let result = HostConfigManifest::load_or_default(Some(missing));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_manifests() {
        let mut wrong_version = HostConfigManifest::default();
        wrong_version.api_version = "v2".to_string();
        assert!(wrong_version.validate().is_err());

        let mut wrong_kind = HostConfigManifest::default();
        wrong_kind.kind = "NodeConfig".to_string();
        assert!(wrong_kind.validate().is_err());

        let mut no_room = HostConfigManifest::default();
        no_room.spec.host.room = "  ".to_string();
        assert!(no_room.validate().is_err());

        let mut zero_port = HostConfigManifest::default();
        zero_port.spec.host.port = 0;
        assert!(zero_port.validate().is_err());

        let mut bad_peer = HostConfigManifest::default();
        bad_peer.spec.peers = vec!["not a url".to_string()];
        assert!(bad_peer.validate().is_err());

        let mut ftp_peer = HostConfigManifest::default();
        ftp_peer.spec.peers = vec!["ftp://10.0.0.1".to_string()];
        assert!(ftp_peer.validate().is_err());

        let mut no_matches = HostConfigManifest::default();
        no_matches.spec.roaming.max_matches = 0;
        assert!(no_matches.validate().is_err());
    }
}
