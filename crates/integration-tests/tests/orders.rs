//! Order placement and its interaction with the cart.

use std::sync::Arc;

use shopsync_client::persist::{CartStorage, MemoryStorage};
use shopsync_client::{ClientError, NotificationKind, NotificationStream, StorefrontService, notify};
use shopsync_core::{OrderDraft, OrderStatus, UserId};
use shopsync_integration_tests::{Call, MockGateway, line, placed_order, product, session};

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

#[tokio::test]
async fn test_place_order_clears_cart_and_storage() {
    let (service, gateway, storage, _stream) = stack();
    service.add_to_cart(product(1, 500), 2).await.unwrap();
    service.add_to_cart(product(2, 300), 1).await.unwrap();

    let draft = OrderDraft::from_cart(UserId::new(7), &service.snapshot().cart);
    gateway.order_create.push_ok(placed_order(99, &draft));

    let order = service.place_order().await.unwrap();
    assert_eq!(order.id.as_i64(), 99);
    assert_eq!(order.total_amount, draft.total_amount);

    assert!(service.snapshot().cart.is_empty());
    assert!(storage.load().is_empty());

    // Remote lines are cleaned up after the order, best effort.
    assert_eq!(
        gateway.calls_where(|c| matches!(c, Call::RemoveCartLine { .. })),
        vec![
            Call::RemoveCartLine { user: 7, product: 1 },
            Call::RemoveCartLine { user: 7, product: 2 },
        ]
    );
    assert_eq!(
        gateway.calls_where(|c| matches!(c, Call::CreateOrder { .. })),
        vec![Call::CreateOrder {
            user: 7,
            total: "13.00".to_string()
        }]
    );
}

#[tokio::test]
async fn test_failed_order_leaves_cart_untouched() {
    let (service, gateway, storage, mut stream) = stack();
    service.add_to_cart(product(1, 500), 2).await.unwrap();
    let before = service.snapshot().cart;

    gateway
        .order_create
        .push_err(GatewayError::Validation("out of stock".to_string()));
    assert!(service.place_order().await.is_err());

    assert_eq!(service.snapshot().cart, before);
    assert_eq!(storage.load(), before);
    assert!(
        gateway
            .calls_where(|c| matches!(c, Call::RemoveCartLine { .. }))
            .is_empty(),
        "no cleanup for an order that was never placed"
    );
    let note = stream.try_recv().expect("failure notification");
    assert_eq!(note.kind, NotificationKind::Order);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let (service, gateway, _storage, _stream) = stack();

    let err = service.place_order().await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_place_order_requires_session() {
    let gateway = MockGateway::new();
    let (notifier, _stream) = notify::channel();
    let service: Service =
        StorefrontService::new(gateway.clone(), Arc::new(MemoryStorage::new()), notifier);

    let err = service.place_order().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn test_remote_cleanup_failure_does_not_fail_the_order() {
    let (service, gateway, _storage, _stream) = stack();
    service.add_to_cart(product(1, 500), 1).await.unwrap();

    let draft = OrderDraft::from_cart(UserId::new(7), &service.snapshot().cart);
    gateway.order_create.push_ok(placed_order(11, &draft));
    gateway
        .cart_remove
        .push_err(GatewayError::Unreachable("down".to_string()));

    let order = service.place_order().await.unwrap();
    assert_eq!(order.id.as_i64(), 11);
    assert!(service.snapshot().cart.is_empty());
}

#[tokio::test]
async fn test_list_and_status_update_pass_through() {
    let (service, gateway, _storage, _stream) = stack();

    let draft = OrderDraft::from_cart(UserId::new(7), &[line(1, 500, 1)]);
    gateway.orders.push_ok(vec![placed_order(5, &draft)]);
    let orders = service.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);

    let mut shipped = placed_order(5, &draft);
    shipped.status = OrderStatus::Shipped;
    gateway.order_status.push_ok(shipped);
    let updated = service
        .update_order_status(orders.first().unwrap().id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    assert_eq!(
        gateway.calls_where(|c| matches!(c, Call::UpdateOrderStatus { .. })),
        vec![Call::UpdateOrderStatus {
            order: 5,
            status: OrderStatus::Shipped
        }]
    );
}
