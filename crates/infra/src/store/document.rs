use serde::Serialize;
use serde::de::DeserializeOwned;

use orderdesk_core::AggregateId;
use orderdesk_invoicing::Invoice;
use orderdesk_parties::Client;
use orderdesk_products::Product;
use orderdesk_sales::Order;

/// A record kept in a `DocumentCollection`.
///
/// Ids are generated by the caller (UUIDv7) before the first write, so a record
/// knows its own key.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in logs and error messages.
    const COLLECTION: &'static str;

    fn document_id(&self) -> AggregateId;
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn document_id(&self) -> AggregateId {
        self.id().0
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn document_id(&self) -> AggregateId {
        self.id.0
    }
}

impl Document for Client {
    const COLLECTION: &'static str = "clients";

    fn document_id(&self) -> AggregateId {
        self.id.0
    }
}

impl Document for Invoice {
    const COLLECTION: &'static str = "invoices";

    fn document_id(&self) -> AggregateId {
        self.id.0
    }
}
