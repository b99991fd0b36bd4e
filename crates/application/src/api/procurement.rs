//! Purchase order and inventory services.

use procura_domain::ApiRequest;
use procura_domain::workflow::{
    InventoryItem, InventoryStats, OrderStatus, ProcurementStats, PurchaseOrder,
};

use super::client::ApiClient;
use crate::error::ApiResult;

const ORDERS: &str = "/pro/api/procurement";
const INVENTORY: &str = "/pro/api/inventory";

/// Read access to purchase orders.
#[derive(Debug, Clone)]
pub struct OrderService {
    client: ApiClient,
}

impl OrderService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All purchase orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn all(&self) -> ApiResult<Vec<PurchaseOrder>> {
        self.client.json(ApiRequest::get(ORDERS)).await
    }

    /// One purchase order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_po(&self, po_number: &str) -> ApiResult<PurchaseOrder> {
        let path = format!("{ORDERS}/{}", urlencoding::encode(po_number));
        self.client.json(ApiRequest::get(path)).await
    }

    /// Orders in `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_status(&self, status: OrderStatus) -> ApiResult<Vec<PurchaseOrder>> {
        let path = format!("{ORDERS}/status/{}", status.as_str());
        self.client.json(ApiRequest::get(path)).await
    }

    /// Orders raised by `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_requester(&self, email: &str) -> ApiResult<Vec<PurchaseOrder>> {
        let path = format!("{ORDERS}/requester/{}", urlencoding::encode(email));
        self.client.json(ApiRequest::get(path)).await
    }

    /// Aggregate figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn stats(&self) -> ApiResult<ProcurementStats> {
        self.client.json(ApiRequest::get(format!("{ORDERS}/stats"))).await
    }
}

/// Read access to stocked items.
#[derive(Debug, Clone)]
pub struct InventoryService {
    client: ApiClient,
}

impl InventoryService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All items.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn all(&self) -> ApiResult<Vec<InventoryItem>> {
        self.client.json(ApiRequest::get(INVENTORY)).await
    }

    /// One item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn by_id(&self, id: &str) -> ApiResult<InventoryItem> {
        let path = format!("{INVENTORY}/{}", urlencoding::encode(id));
        self.client.json(ApiRequest::get(path)).await
    }

    /// Items matching an optional type and brand; absent criteria are not
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn search(
        &self,
        item_type: Option<&str>,
        brand: Option<&str>,
    ) -> ApiResult<Vec<InventoryItem>> {
        let mut request = ApiRequest::get(format!("{INVENTORY}/search"));
        if let Some(item_type) = item_type {
            request = request.query("type", item_type);
        }
        if let Some(brand) = brand {
            request = request.query("brand", brand);
        }
        self.client.json(request).await
    }

    /// Aggregate figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn stats(&self) -> ApiResult<InventoryStats> {
        self.client
            .json(ApiRequest::get(format!("{INVENTORY}/stats")))
            .await
    }
}
