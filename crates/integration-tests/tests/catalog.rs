//! Catalog reads and confirm-then-commit writes.

use std::sync::Arc;

use shopsync_client::persist::MemoryStorage;
use shopsync_client::{ClientError, StorefrontService, notify};
use shopsync_core::{Price, ProductDraft, ProductId, ProductPatch};
use shopsync_integration_tests::{MockGateway, product};

use shopsync_client::gateway::GatewayError;

type Service = StorefrontService<MockGateway, Arc<MemoryStorage>>;

fn stack() -> (Service, MockGateway) {
    let gateway = MockGateway::new();
    let (notifier, _stream) = notify::channel();
    let service = StorefrontService::new(
        gateway.clone(),
        Arc::new(MemoryStorage::new()),
        notifier,
    );
    (service, gateway)
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "A fine item".to_string(),
        category: "Kitchen".to_string(),
        available_qty: 4,
        price: Price::from_cents(2500),
        image_url: None,
        rating: Some(4.0),
    }
}

#[tokio::test]
async fn test_load_products_replaces_section() {
    let (service, gateway) = stack();
    gateway.products.push_ok(vec![product(1, 500), product(2, 300)]);

    let products = service.load_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(service.snapshot().products, products);
}

#[tokio::test]
async fn test_create_commits_server_assigned_identifier() {
    let (service, gateway) = stack();
    gateway.product_create.push_ok(draft("Kettle").with_id(ProductId::new(41)));

    let created = service.create_product(draft("Kettle")).await.unwrap();
    assert_eq!(created.id, ProductId::new(41));

    let products = service.snapshot().products;
    assert_eq!(products, vec![created]);
}

#[tokio::test]
async fn test_create_rejects_malformed_input_before_any_call() {
    let (service, gateway) = stack();

    let err = service.create_product(draft("  ")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let mut overrated = draft("Kettle");
    overrated.rating = Some(6.0);
    let err = service.create_product(overrated).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_create_leaves_store_unchanged() {
    let (service, gateway) = stack();
    gateway.products.push_ok(vec![product(1, 500)]);
    service.load_products().await.unwrap();

    gateway
        .product_create
        .push_err(GatewayError::Validation("duplicate name".to_string()));
    assert!(service.create_product(draft("Kettle")).await.is_err());

    assert_eq!(service.snapshot().products, vec![product(1, 500)]);
}

#[tokio::test]
async fn test_update_replaces_matching_entry_with_canonical_payload() {
    let (service, gateway) = stack();
    gateway.products.push_ok(vec![product(1, 500), product(2, 300)]);
    service.load_products().await.unwrap();

    let mut canonical = product(2, 350);
    canonical.name = "Renamed".to_string();
    gateway.product_update.push_ok(canonical.clone());

    let patch = ProductPatch {
        name: Some("Renamed".to_string()),
        price: Some(Price::from_cents(350)),
        ..ProductPatch::default()
    };
    let updated = service
        .update_product(ProductId::new(2), patch)
        .await
        .unwrap();
    assert_eq!(updated, canonical);
    assert_eq!(
        service.snapshot().products,
        vec![product(1, 500), canonical]
    );
}

#[tokio::test]
async fn test_delete_removes_entry() {
    let (service, gateway) = stack();
    gateway.products.push_ok(vec![product(1, 500), product(2, 300)]);
    service.load_products().await.unwrap();

    service.delete_product(ProductId::new(1)).await.unwrap();
    assert_eq!(service.snapshot().products, vec![product(2, 300)]);
}
