//! Cart mutations: optimistic commit, rollback, and persistence mirroring.

use std::sync::Arc;

use shopsync_client::persist::{CartStorage, MemoryStorage};
use shopsync_client::{ClientError, NotificationKind, NotificationStream, StorefrontService, notify};
use shopsync_core::{Price, ProductId};
use shopsync_integration_tests::{Call, MockGateway, line, product, session};

use shopsync_client::gateway::GatewayError;

type Service = StorefrontService<MockGateway, Arc<MemoryStorage>>;

fn stack() -> (Service, MockGateway, Arc<MemoryStorage>, NotificationStream) {
    let gateway = MockGateway::new();
    let storage = Arc::new(MemoryStorage::new());
    let (notifier, stream) = notify::channel();
    let service = StorefrontService::new(gateway.clone(), Arc::clone(&storage), notifier);
    service.set_session(session(7));
    (service, gateway, storage, stream)
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_add_commits_and_mirrors_to_storage() {
    let (service, gateway, storage, _stream) = stack();

    service.add_to_cart(product(1, 500), 2).await.unwrap();

    let snapshot = service.snapshot();
    assert_eq!(snapshot.cart, vec![line(1, 500, 2)]);
    assert_eq!(storage.load(), snapshot.cart);
    assert_eq!(
        gateway.calls(),
        vec![Call::AddCartLine {
            user: 7,
            product: 1,
            quantity: 2
        }]
    );
}

#[tokio::test]
async fn test_repeat_add_merges_into_one_line() {
    let (service, _gateway, _storage, _stream) = stack();

    service.add_to_cart(product(2, 300), 1).await.unwrap();
    service.add_to_cart(product(1, 500), 1).await.unwrap();
    service.add_to_cart(product(2, 300), 2).await.unwrap();

    let cart = service.snapshot().cart;
    // One line per product, first-add order preserved.
    assert_eq!(cart, vec![line(2, 300, 3), line(1, 500, 1)]);
}

#[tokio::test]
async fn test_optimistic_value_is_visible_while_in_flight() {
    let (service, gateway, _storage, _stream) = stack();
    let gate = gateway.cart_add.push_gated(Ok(()));

    let svc = service.clone();
    let task = tokio::spawn(async move { svc.add_to_cart(product(1, 500), 1).await });
    settle().await;

    // Committed before the remote write resolves.
    assert_eq!(service.snapshot().cart, vec![line(1, 500, 1)]);

    gate.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert_eq!(service.snapshot().cart, vec![line(1, 500, 1)]);
}

#[tokio::test]
async fn test_failed_add_rolls_back_to_captured_value() {
    let (service, gateway, storage, mut stream) = stack();
    service.add_to_cart(product(1, 500), 1).await.unwrap();
    let before = service.snapshot().cart;

    gateway
        .cart_add
        .push_err(GatewayError::Unreachable("connection refused".to_string()));
    let err = service.add_to_cart(product(2, 300), 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(_)));

    // Exactly the captured pre-mutation value, not a recomputation.
    assert_eq!(service.snapshot().cart, before);
    assert_eq!(storage.load(), before);

    let note = stream.try_recv().expect("rollback notification");
    assert_eq!(note.kind, NotificationKind::Cart);
    assert!(stream.try_recv().is_none(), "exactly one notification");
}

#[tokio::test]
async fn test_quantity_update_rolls_back_subtotal() {
    let (service, gateway, _storage, _stream) = stack();
    service.add_to_cart(product(1, 500), 1).await.unwrap();
    assert_eq!(service.snapshot().cart_subtotal(), Price::from_cents(500));

    let gate = gateway
        .cart_update
        .push_gated(Err(GatewayError::Unreachable("timeout".to_string())));
    let svc = service.clone();
    let task = tokio::spawn(async move { svc.set_quantity(ProductId::new(1), 3).await });
    settle().await;

    assert_eq!(service.snapshot().cart_subtotal(), Price::from_cents(1500));

    gate.send(()).unwrap();
    assert!(task.await.unwrap().is_err());
    assert_eq!(service.snapshot().cart_subtotal(), Price::from_cents(500));
}

#[tokio::test]
async fn test_subtotal_tracks_merge_and_removal() {
    let (service, _gateway, _storage, _stream) = stack();

    service.add_to_cart(product(1, 500), 1).await.unwrap();
    assert_eq!(service.snapshot().cart, vec![line(1, 500, 1)]);
    assert_eq!(service.snapshot().cart_subtotal(), Price::from_cents(500));

    service.add_to_cart(product(1, 500), 2).await.unwrap();
    assert_eq!(service.snapshot().cart, vec![line(1, 500, 3)]);
    assert_eq!(service.snapshot().cart_subtotal(), Price::from_cents(1500));

    service.set_quantity(ProductId::new(1), 0).await.unwrap();
    assert!(service.snapshot().cart.is_empty());
    assert_eq!(service.snapshot().cart_subtotal(), Price::ZERO);
}

#[tokio::test]
async fn test_zero_quantity_routes_through_removal() {
    let (service, gateway, _storage, _stream) = stack();
    service.add_to_cart(product(1, 500), 2).await.unwrap();

    service.set_quantity(ProductId::new(1), 0).await.unwrap();

    assert!(service.snapshot().cart.is_empty());
    assert!(
        gateway
            .calls_where(|c| matches!(c, Call::UpdateCartLine { .. }))
            .is_empty()
    );
    assert_eq!(
        gateway.calls_where(|c| matches!(c, Call::RemoveCartLine { .. })),
        vec![Call::RemoveCartLine { user: 7, product: 1 }]
    );
}

#[tokio::test]
async fn test_clear_rolls_back_on_partial_failure() {
    let (service, gateway, storage, _stream) = stack();
    service.add_to_cart(product(1, 500), 1).await.unwrap();
    service.add_to_cart(product(2, 300), 2).await.unwrap();
    let before = service.snapshot().cart;

    gateway.cart_remove.push_ok(());
    gateway
        .cart_remove
        .push_err(GatewayError::Unknown("500".to_string()));
    assert!(service.clear_cart().await.is_err());

    // One delete succeeded remotely, but locally the whole mutation is
    // rolled back as a unit.
    assert_eq!(service.snapshot().cart, before);
    assert_eq!(storage.load(), before);
    assert_eq!(
        gateway
            .calls_where(|c| matches!(c, Call::RemoveCartLine { .. }))
            .len(),
        2
    );
}

#[tokio::test]
async fn test_logged_out_mutation_is_refused_without_side_effects() {
    let gateway = MockGateway::new();
    let storage = Arc::new(MemoryStorage::new());
    let (notifier, mut stream) = notify::channel();
    let service = StorefrontService::new(gateway.clone(), Arc::clone(&storage), notifier);

    let err = service.add_to_cart(product(1, 500), 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    assert!(service.snapshot().cart.is_empty());
    assert!(storage.load().is_empty());
    assert!(gateway.calls().is_empty(), "no network call");
    assert!(stream.try_recv().is_none(), "refusal is not a notification");
}

#[tokio::test]
async fn test_overlapping_mutations_commit_in_invocation_order() {
    let (service, gateway, _storage, _stream) = stack();
    let mut sub = service.store().subscribe();

    let first_gate = gateway.cart_add.push_gated(Ok(()));
    let second_gate = gateway.cart_add.push_gated(Ok(()));

    let svc = service.clone();
    let first = tokio::spawn(async move { svc.add_to_cart(product(1, 500), 1).await });
    settle().await;
    let svc = service.clone();
    let second = tokio::spawn(async move { svc.add_to_cart(product(2, 300), 1).await });
    settle().await;

    // Resolve out of order; commits already happened in invocation order.
    second_gate.send(()).unwrap();
    first_gate.send(()).unwrap();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let transitions: Vec<_> = std::iter::from_fn(|| sub.try_recv()).collect();
    let carts: Vec<_> = transitions
        .iter()
        .filter(|s| !s.cart.is_empty())
        .map(|s| s.cart.clone())
        .collect();
    assert_eq!(
        carts,
        vec![
            vec![line(1, 500, 1)],
            vec![line(1, 500, 1), line(2, 300, 1)],
        ]
    );
}
