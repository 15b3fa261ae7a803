//! Explicit session context threaded through every state-changing operation.

use serde::{Deserialize, Serialize};

use crate::id::{TenantId, UserId};

/// Who is acting, and on behalf of which tenant.
///
/// Every write is partitioned by `tenant_id`; `actor_id` and `actor_name` are copied
/// onto stock movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    tenant_id: TenantId,
    actor_id: UserId,
    actor_name: String,
}

impl SessionContext {
    pub fn new(tenant_id: TenantId, actor_id: UserId, actor_name: impl Into<String>) -> Self {
        Self {
            tenant_id,
            actor_id,
            actor_name: actor_name.into(),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn actor_id(&self) -> UserId {
        self.actor_id
    }

    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }
}
