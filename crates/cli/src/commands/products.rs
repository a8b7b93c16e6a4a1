//! Catalog browsing commands.

use shopsync_client::gateway::RemoteGateway;
use shopsync_core::{Product, ProductId};

use super::CliError;

/// List the full catalog.
pub async fn list() -> Result<(), CliError> {
    let gateway = super::gateway()?;
    let products = gateway.list_products().await?;
    print_products(&products);
    Ok(())
}

/// Search the catalog.
pub async fn search(query: &str) -> Result<(), CliError> {
    let gateway = super::gateway()?;
    let products = gateway.search_products(query).await?;
    if products.is_empty() {
        tracing::info!("No products matched {query:?}");
        return Ok(());
    }
    print_products(&products);
    Ok(())
}

/// Show one product in detail.
#[allow(clippy::print_stdout)]
pub async fn get(id: i64) -> Result<(), CliError> {
    let gateway = super::gateway()?;
    let product = gateway.get_product(ProductId::new(id)).await?;
    println!("{:>12}  {}", "id", product.id);
    println!("{:>12}  {}", "name", product.name);
    println!("{:>12}  {}", "category", product.category);
    println!("{:>12}  {}", "price", product.price);
    println!("{:>12}  {}", "available", product.available_qty);
    if let Some(rating) = product.rating {
        println!("{:>12}  {rating:.1}", "rating");
    }
    if !product.description.is_empty() {
        println!("{:>12}  {}", "description", product.description);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    println!("{:>8}  {:<32} {:<16} {:>10} {:>6}", "ID", "NAME", "CATEGORY", "PRICE", "QTY");
    for p in products {
        println!(
            "{:>8}  {:<32} {:<16} {:>10} {:>6}",
            p.id, p.name, p.category, p.price, p.available_qty
        );
    }
}
