//! Policy store seam.
//!
//! Persistence of tools and policies is owned by the embedding
//! application; the engine only reads a consistent snapshot through this
//! trait. A failed lookup must propagate: callers are required to fail
//! closed (treat the call as denied and the data as untrusted) instead of
//! proceeding permissively.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::policy::{ToolConfig, ToolInvocationPolicy, TrustedDataPolicy};

/// Read-only lookup of tool configuration and policies.
///
/// Implementations must return a consistent snapshot for the duration of
/// one conversation evaluation: a policy set must not change between the
/// block pass and the trust pass. Policy lists are returned in creation
/// order; semantics are match-any either way, ordering only fixes which
/// policy's reason is reported.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Look up a tool's configuration by name.
    async fn tool_by_name(&self, name: &str) -> Result<Option<ToolConfig>, StoreError>;

    /// Trusted-data policies for a tool, in creation order.
    async fn trusted_data_policies(
        &self,
        tool_id: Uuid,
    ) -> Result<Vec<TrustedDataPolicy>, StoreError>;

    /// Invocation policies for a tool, in creation order.
    async fn invocation_policies(
        &self,
        tool_id: Uuid,
    ) -> Result<Vec<ToolInvocationPolicy>, StoreError>;
}

/// In-memory store preserving insertion order.
///
/// Built once, then read through the trait; suitable for tests and for
/// embedders that hold their policy snapshot in process.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    tools: Vec<ToolConfig>,
    trust_policies: Vec<TrustedDataPolicy>,
    invocation_policies: Vec<ToolInvocationPolicy>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tool(&mut self, tool: ToolConfig) {
        self.tools.push(tool);
    }

    pub fn add_trusted_data_policy(&mut self, policy: TrustedDataPolicy) {
        self.trust_policies.push(policy);
    }

    pub fn add_invocation_policy(&mut self, policy: ToolInvocationPolicy) {
        self.invocation_policies.push(policy);
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn tool_by_name(&self, name: &str) -> Result<Option<ToolConfig>, StoreError> {
        Ok(self.tools.iter().find(|tool| tool.name == name).cloned())
    }

    async fn trusted_data_policies(
        &self,
        tool_id: Uuid,
    ) -> Result<Vec<TrustedDataPolicy>, StoreError> {
        Ok(self
            .trust_policies
            .iter()
            .filter(|policy| policy.tool_id == tool_id)
            .cloned()
            .collect())
    }

    async fn invocation_policies(
        &self,
        tool_id: Uuid,
    ) -> Result<Vec<ToolInvocationPolicy>, StoreError> {
        Ok(self
            .invocation_policies
            .iter()
            .filter(|policy| policy.tool_id == tool_id)
            .cloned()
            .collect())
    }
}
