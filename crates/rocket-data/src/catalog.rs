//! Storefront API implementation of the cart's collaborator ports.

use async_trait::async_trait;
use rocket_commerce::catalog::{ProductDetails, StockInfo};
use rocket_commerce::ports::{ProductLookup, StockLookup};
use rocket_commerce::{CartError, ProductId};

use crate::client::FetchClient;
use crate::dependency::DependencyTag;

/// Stock and product lookups over the storefront REST API.
///
/// - `GET {base}/stock/{id}` -> `{ "id": .., "amount": .. }`
/// - `GET {base}/products/{id}` -> product record
///
/// Every failure, including 404, surfaces as `CartError::RemoteFailure`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }
}

#[async_trait]
impl StockLookup for HttpCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockInfo, CartError> {
        let stock: StockInfo = self
            .client
            .get_json(&format!("/stock/{}", id), DependencyTag::Inventory)
            .await?;

        if stock.id != id {
            return Err(CartError::RemoteFailure(format!(
                "stock service returned id {} for {}",
                stock.id, id
            )));
        }
        Ok(stock)
    }
}

#[async_trait]
impl ProductLookup for HttpCatalog {
    async fn product(&self, id: ProductId) -> Result<ProductDetails, CartError> {
        let product: ProductDetails = self
            .client
            .get_json(&format!("/products/{}", id), DependencyTag::Catalog)
            .await?;

        if product.id != id {
            return Err(CartError::RemoteFailure(format!(
                "product service returned id {} for {}",
                product.id, id
            )));
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ScriptedTransport;
    use crate::transport::Response;
    use rocket_commerce::ErrorKind;

    fn catalog(replies: Vec<Response>) -> (HttpCatalog, ScriptedTransport) {
        let transport = ScriptedTransport::new(replies.into_iter().map(Ok).collect());
        let client = FetchClient::new("http://localhost:3333", transport.clone());
        (HttpCatalog::new(client), transport)
    }

    #[tokio::test]
    async fn test_stock_lookup() {
        let (catalog, transport) = catalog(vec![Response::new(200, r#"{"id":1,"amount":5}"#)]);

        let stock = catalog.stock(ProductId::new(1)).await.unwrap();

        assert_eq!(stock, StockInfo::new(ProductId::new(1), 5));
        assert_eq!(transport.requested(), vec!["http://localhost:3333/stock/1".to_string()]);
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let (catalog, transport) = catalog(vec![Response::new(
            200,
            r#"{"id":2,"title":"Tenis VR Caminhada","price":139.9,"image":"x.jpg"}"#,
        )]);

        let product = catalog.product(ProductId::new(2)).await.unwrap();

        assert_eq!(product.title(), Some("Tenis VR Caminhada"));
        assert_eq!(transport.requested(), vec!["http://localhost:3333/products/2".to_string()]);
    }

    #[tokio::test]
    async fn test_not_found_is_remote_failure() {
        let (catalog, _) = catalog(vec![Response::new(404, "{}")]);

        let err = catalog.product(ProductId::new(99)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    }

    #[tokio::test]
    async fn test_malformed_stock_is_remote_failure() {
        let (catalog, _) = catalog(vec![Response::new(200, r#"{"id":1}"#)]);

        let err = catalog.stock(ProductId::new(1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    }

    #[tokio::test]
    async fn test_mismatched_id_is_remote_failure() {
        let (catalog, _) = catalog(vec![Response::new(200, r#"{"id":2,"amount":5}"#)]);

        let err = catalog.stock(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::RemoteFailure(msg) if msg.contains("returned id 2")));
    }
}
