use serde::{Deserialize, Serialize};

use orderdesk_core::{AggregateId, TenantId};

use crate::tenant::TenantScoped;

/// One committed mutation of a stored record.
///
/// `revision` is the collection-wide write counter at the time of the change, so a
/// consumer can discard changes it has already seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change<R> {
    Added {
        tenant_id: TenantId,
        id: AggregateId,
        revision: u64,
        record: R,
    },
    Updated {
        tenant_id: TenantId,
        id: AggregateId,
        revision: u64,
        record: R,
    },
    Removed {
        tenant_id: TenantId,
        id: AggregateId,
        revision: u64,
    },
}

impl<R> Change<R> {
    pub fn record_id(&self) -> AggregateId {
        match self {
            Change::Added { id, .. } | Change::Updated { id, .. } | Change::Removed { id, .. } => {
                *id
            }
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            Change::Added { revision, .. }
            | Change::Updated { revision, .. }
            | Change::Removed { revision, .. } => *revision,
        }
    }

    /// The record after the change; `None` for removals.
    pub fn record(&self) -> Option<&R> {
        match self {
            Change::Added { record, .. } | Change::Updated { record, .. } => Some(record),
            Change::Removed { .. } => None,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Change::Removed { .. })
    }
}

impl<R> TenantScoped for Change<R> {
    fn tenant_id(&self) -> TenantId {
        match self {
            Change::Added { tenant_id, .. }
            | Change::Updated { tenant_id, .. }
            | Change::Removed { tenant_id, .. } => *tenant_id,
        }
    }
}
