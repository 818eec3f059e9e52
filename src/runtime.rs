//! Tool runtime shared by the MCP and HTTP surfaces.
//!
//! The runtime is built once at process start with its collaborators and an explicit tool
//! registry, then handed to whichever serving layer runs.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::{
    abuseipdb::{AbuseIpDbClient, AbuseIpDbError, IpReputationApi},
    config::Config,
    storage::{self, SnippetStore},
    tools::{Registry, ToolError, TriggerPayload},
};

/// Dispatches tool invocations to registered handlers.
#[derive(Clone)]
pub struct ToolRuntime {
    store: Arc<dyn SnippetStore>,
    reputation: Arc<dyn IpReputationApi>,
    registry: Arc<Registry>,
}

impl ToolRuntime {
    /// Create a runtime over the supplied collaborators with the default tool set.
    pub fn new(store: Arc<dyn SnippetStore>, reputation: Arc<dyn IpReputationApi>) -> Self {
        Self::with_registry(store, reputation, Registry::with_default_tools())
    }

    /// Create a runtime with a caller-supplied registry.
    pub fn with_registry(
        store: Arc<dyn SnippetStore>,
        reputation: Arc<dyn IpReputationApi>,
        registry: Registry,
    ) -> Self {
        Self {
            store,
            reputation,
            registry: Arc::new(registry),
        }
    }

    /// Build the runtime described by configuration.
    pub fn from_config(config: &Config) -> Result<Self, AbuseIpDbError> {
        let store = storage::store_from_config(config);
        let reputation = Arc::new(AbuseIpDbClient::from_config(config)?);
        tracing::info!(
            snippet_store = ?config.snippet_store,
            abuseipdb_base_url = %config.abuseipdb_base_url,
            "Tool runtime initialized"
        );
        Ok(Self::new(store, reputation))
    }

    /// Snippet store used by the snippet bindings.
    pub fn store(&self) -> Arc<dyn SnippetStore> {
        self.store.clone()
    }

    /// Reputation client used by the AbuseIPDB tools.
    pub fn reputation(&self) -> Arc<dyn IpReputationApi> {
        self.reputation.clone()
    }

    /// Registered tools.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the tool registered as `name` against `payload`.
    pub async fn invoke(&self, name: &str, payload: TriggerPayload) -> Result<String, ToolError> {
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let span = tracing::info_span!("tool", tool = name, invocation_id = %Uuid::new_v4());
        async move {
            tracing::debug!("Invoking tool");
            let outcome = handler(self, payload).await;
            if let Err(err) = &outcome {
                tracing::error!(error = %err, "Tool invocation failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }
}
