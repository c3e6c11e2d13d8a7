//! Process configuration from the environment

use crate::domain::Domain;
use std::path::PathBuf;
use std::time::Duration;

const MAINNET_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";
const LOCAL_IDENTITY_PROVIDER: &str = "http://rdmx6-jaaaa-aaaaa-aaadq-cai.localhost:4943";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:4943/api";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 120;

/// Where each domain's backend lives
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Shared root; a domain without an override uses `{base_url}/{domain}`
    pub base_url: String,
    pub agri_url: Option<String>,
    pub legal_url: Option<String>,
}

impl BackendConfig {
    pub fn url_for(&self, domain: Domain) -> String {
        let override_url = match domain {
            Domain::Agriculture => self.agri_url.as_ref(),
            Domain::Legal => self.legal_url.as_ref(),
        };
        override_url.cloned().unwrap_or_else(|| {
            format!("{}/{}", self.base_url.trim_end_matches('/'), domain.as_str())
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Interactive login endpoint handed to the browser
    pub identity_provider_url: String,
    pub backend: BackendConfig,
    pub gateway_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("ADVISOR_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = var("ADVISOR_DATA_DIR").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".advisory-chat")
            },
            PathBuf::from,
        );

        let identity_provider_url = var("II_URL").unwrap_or_else(|| {
            if var("DFX_NETWORK").as_deref() == Some("ic") {
                MAINNET_IDENTITY_PROVIDER.to_string()
            } else {
                LOCAL_IDENTITY_PROVIDER.to_string()
            }
        });

        let backend = BackendConfig {
            base_url: var("ADVISOR_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            agri_url: var("AGRI_BACKEND_URL"),
            legal_url: var("LEGAL_BACKEND_URL"),
        };

        let gateway_timeout = Duration::from_secs(
            var("ADVISOR_GATEWAY_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS),
        );

        Self {
            port,
            data_dir,
            identity_provider_url,
            backend,
            gateway_timeout,
        }
    }

    pub fn identity_file(&self) -> PathBuf {
        self.data_dir.join("identity.json")
    }
}
