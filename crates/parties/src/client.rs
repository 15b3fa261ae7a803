use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{AggregateId, DomainError, DomainResult, Entity};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub AggregateId);

impl ClientId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterClient {
    pub client_id: ClientId,
    pub name: String,
    /// Company registration identifier (ICE).
    pub ice: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// A company client. Orders for companies always apply VAT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub ice: String,
    pub contact: ContactInfo,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn register(cmd: RegisterClient) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("client name cannot be empty"));
        }

        Ok(Self {
            id: cmd.client_id,
            name: name.to_string(),
            ice: cmd.ice.trim().to_string(),
            contact: normalize(cmd.contact),
            created_at: cmd.occurred_at,
        })
    }
}

fn normalize(contact: ContactInfo) -> ContactInfo {
    let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    ContactInfo {
        email: keep(contact.email),
        phone: keep(contact.phone),
        address: keep(contact.address),
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
