//! Order commands.

use shopsync_client::gateway::RemoteGateway;
use shopsync_core::{Order, OrderId};

use super::CliError;

/// List the user's orders.
#[allow(clippy::print_stdout)]
pub async fn list(user: i64) -> Result<(), CliError> {
    let (service, _notices) = super::service_for(user)?;
    let orders = service.list_orders().await?;
    if orders.is_empty() {
        tracing::info!("No orders for user {user}");
        return Ok(());
    }
    println!("{:>8}  {:<12} {:>10}  {}", "ID", "STATUS", "TOTAL", "DATE");
    for order in &orders {
        println!(
            "{:>8}  {:<12} {:>10}  {}",
            order.id,
            order.status.as_str(),
            order.total_amount,
            order.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Show one order in detail.
pub async fn get(id: i64) -> Result<(), CliError> {
    let gateway = super::gateway()?;
    let order = gateway.get_order(OrderId::new(id)).await?;
    print_order(&order);
    Ok(())
}

/// Place an order from the current cart.
#[allow(clippy::print_stdout)]
pub async fn place(user: i64) -> Result<(), CliError> {
    let (service, _notices) = super::service_for(user)?;
    service.hydrate().await;
    let order = service.place_order().await?;
    println!("Order {} placed, total {}", order.id, order.total_amount);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!("{:>8}  {}", "id", order.id);
    println!("{:>8}  {}", "user", order.user_id);
    println!("{:>8}  {}", "status", order.status.as_str());
    println!("{:>8}  {}", "total", order.total_amount);
    println!("{:>8}  {}", "date", order.created_at.format("%Y-%m-%d %H:%M"));
    for item in &order.items {
        println!("    {:>4} x {:<32} {}", item.quantity, item.product_name, item.price);
    }
}
