//! Cart commands.
//!
//! Each command hydrates the client stack first so the mutation runs
//! against the authoritative remote cart, then prints the resulting
//! snapshot.

use shopsync_client::{NotificationStream, Snapshot};
use shopsync_core::ProductId;

use super::CliError;

/// Show the cart with line totals and subtotal.
pub async fn show(user: i64) -> Result<(), CliError> {
    let (service, _notices) = super::service_for(user)?;
    service.hydrate().await;
    print_cart(&service.snapshot());
    Ok(())
}

/// Add a product to the cart.
pub async fn add(user: i64, product: i64, quantity: u32) -> Result<(), CliError> {
    let (service, mut notices) = super::service_for(user)?;
    service.hydrate().await;
    let product = service.get_product(ProductId::new(product)).await?;
    let result = service.add_to_cart(product, quantity).await;
    drain_notices(&mut notices);
    result?;
    print_cart(&service.snapshot());
    Ok(())
}

/// Remove a product's line from the cart.
pub async fn remove(user: i64, product: i64) -> Result<(), CliError> {
    let (service, mut notices) = super::service_for(user)?;
    service.hydrate().await;
    let result = service.remove_from_cart(ProductId::new(product)).await;
    drain_notices(&mut notices);
    result?;
    print_cart(&service.snapshot());
    Ok(())
}

/// Empty the cart.
pub async fn clear(user: i64) -> Result<(), CliError> {
    let (service, mut notices) = super::service_for(user)?;
    service.hydrate().await;
    let result = service.clear_cart().await;
    drain_notices(&mut notices);
    result?;
    print_cart(&service.snapshot());
    Ok(())
}

fn drain_notices(notices: &mut NotificationStream) {
    while let Some(notice) = notices.try_recv() {
        tracing::warn!("{}", notice.message);
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(snapshot: &Snapshot) {
    if snapshot.cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    println!("{:>8}  {:<32} {:>4} {:>10}", "ID", "NAME", "QTY", "TOTAL");
    for line in &snapshot.cart {
        println!(
            "{:>8}  {:<32} {:>4} {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.line_total()
        );
    }
    println!(
        "{} items, subtotal {}",
        snapshot.cart_count(),
        snapshot.cart_subtotal()
    );
}
