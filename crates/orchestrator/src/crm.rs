//! CRM integration seam.
//!
//! The orchestrator only needs two operations: look a caller up by
//! phone number and attach a note after the call. Real deployments
//! implement [`Crm`] over their system of record; [`MockCrm`] backs
//! tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Error from a CRM operation.
#[derive(Debug, Clone, Error)]
#[error("crm error: {0}")]
pub struct CrmError(pub String);

/// A customer record, as much of it as the assistant needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Customer lookup and note recording.
#[async_trait]
pub trait Crm: Send + Sync {
    /// Find a customer by phone number. `Ok(None)` means the caller
    /// is simply unknown, not an error.
    async fn lookup_customer(&self, phone: &str) -> Result<Option<CustomerProfile>, CrmError>;

    /// Attach a note to a customer (or raw caller id for unknowns).
    async fn record_note(&self, customer_id: &str, note: &str) -> Result<(), CrmError>;
}

/// A note recorded by [`MockCrm`].
#[derive(Debug, Clone)]
pub struct CrmNote {
    pub customer_id: String,
    pub note: String,
}

/// In-memory CRM for tests and demos.
#[derive(Debug, Default)]
pub struct MockCrm {
    customers: RwLock<HashMap<String, CustomerProfile>>,
    notes: RwLock<Vec<CrmNote>>,
}

impl MockCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer, keyed by phone number.
    pub async fn add_customer(&self, profile: CustomerProfile) {
        self.customers
            .write()
            .await
            .insert(profile.phone.clone(), profile);
    }

    /// All notes recorded so far.
    pub async fn notes(&self) -> Vec<CrmNote> {
        self.notes.read().await.clone()
    }
}

#[async_trait]
impl Crm for MockCrm {
    async fn lookup_customer(&self, phone: &str) -> Result<Option<CustomerProfile>, CrmError> {
        Ok(self.customers.read().await.get(phone).cloned())
    }

    async fn record_note(&self, customer_id: &str, note: &str) -> Result<(), CrmError> {
        self.notes.write().await.push(CrmNote {
            customer_id: customer_id.to_string(),
            note: note.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CustomerProfile {
        CustomerProfile {
            id: "cust-42".to_string(),
            name: "Dana Reyes".to_string(),
            phone: "+15551234567".to_string(),
            email: Some("dana@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_lookup_known_and_unknown() {
        let crm = MockCrm::new();
        crm.add_customer(profile()).await;

        let found = crm.lookup_customer("+15551234567").await.unwrap();
        assert_eq!(found.unwrap().name, "Dana Reyes");

        let missing = crm.lookup_customer("+15550000000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_record_note() {
        let crm = MockCrm::new();
        crm.record_note("cust-42", "Asked about an oil change.")
            .await
            .unwrap();

        let notes = crm.notes().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].customer_id, "cust-42");
    }
}
