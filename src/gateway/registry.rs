//! Per-domain gateway lookup

use super::{ChatMessage, Gateway, GatewayError, HttpGateway, LoggingGateway};
use crate::config::BackendConfig;
use crate::domain::Domain;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Gateways keyed by domain
#[derive(Clone, Default)]
pub struct GatewayRegistry {
    gateways: HashMap<Domain, Arc<dyn Gateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP gateways for every domain from the backend configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, GatewayError> {
        let mut registry = Self::new();
        for domain in Domain::ALL {
            let url = config.url_for(domain);
            let gateway = HttpGateway::new(domain.as_str(), &url)?;
            tracing::info!(domain = %domain, endpoint = %gateway.endpoint(), "Gateway configured");
            registry = registry.with(domain, Arc::new(LoggingGateway::new(Arc::new(gateway))));
        }
        Ok(registry)
    }

    pub fn with(mut self, domain: Domain, gateway: Arc<dyn Gateway>) -> Self {
        self.gateways.insert(domain, gateway);
        self
    }

    /// Gateway for `domain`; an unconfigured domain gets one that always fails
    pub fn get(&self, domain: Domain) -> Arc<dyn Gateway> {
        self.gateways.get(&domain).cloned().unwrap_or_else(|| {
            tracing::warn!(domain = %domain, "No gateway configured for domain");
            Arc::new(UnavailableGateway { domain })
        })
    }
}

struct UnavailableGateway {
    domain: Domain,
}

#[async_trait]
impl Gateway for UnavailableGateway {
    async fn chat(&self, _history: &[ChatMessage]) -> Result<String, GatewayError> {
        Err(GatewayError::network(format!(
            "No backend available for {}",
            self.domain
        )))
    }

    fn name(&self) -> &str {
        self.domain.as_str()
    }
}
