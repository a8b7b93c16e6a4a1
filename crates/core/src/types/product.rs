//! Catalog, cart, and wishlist entity types.
//!
//! Field renames follow the remote catalog service's JSON shape
//! (`prodName`, `availableQty`, ...), so these types deserialize straight
//! off the wire and round-trip through the persisted cart unchanged.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A catalog entry.
///
/// Immutable from the client's perspective except via explicit
/// update/delete mutations; replaced wholesale on successful server writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned unique identifier.
    pub id: ProductId,
    #[serde(rename = "prodName")]
    pub name: String,
    #[serde(rename = "prodDesc")]
    pub description: String,
    #[serde(rename = "prodCat")]
    pub category: String,
    #[serde(rename = "availableQty")]
    pub available_qty: u32,
    pub price: Price,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Rating in [0, 5], when the catalog has one.
    #[serde(rename = "prodRating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Product {
    /// Whether any stock is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.available_qty > 0
    }
}

/// A new product to be created; the server assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "prodName")]
    pub name: String,
    #[serde(rename = "prodDesc")]
    pub description: String,
    #[serde(rename = "prodCat")]
    pub category: String,
    #[serde(rename = "availableQty")]
    pub available_qty: u32,
    pub price: Price,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "prodRating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl ProductDraft {
    /// Attach the server-assigned identifier to produce a full [`Product`].
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            available_qty: self.available_qty,
            price: self.price,
            image_url: self.image_url,
            rating: self.rating,
        }
    }
}

/// A partial product update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(rename = "prodName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "prodDesc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "prodCat", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "availableQty", skip_serializing_if = "Option::is_none")]
    pub available_qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "prodRating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

/// One cart line: a product plus a positive quantity.
///
/// Invariant (enforced by the store mutations, not by this type): at most
/// one line per distinct product identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Wishlist membership is a bare product reference; set semantics by
/// product identifier.
pub type WishlistEntry = Product;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Espresso Cup".to_string(),
            description: "Double-walled".to_string(),
            category: "Kitchen".to_string(),
            available_qty: 12,
            price: Price::from_cents(1250),
            image_url: None,
            rating: Some(4.5),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert_eq!(json["prodName"], "Espresso Cup");
        assert_eq!(json["availableQty"], 12);
        assert_eq!(json["prodRating"], 4.5);
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_deserialize_without_optionals() {
        let json = r#"{
            "id": 2,
            "prodName": "Kettle",
            "prodDesc": "Stovetop",
            "prodCat": "Kitchen",
            "availableQty": 0,
            "price": "39.99"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(!product.in_stock());
        assert!(product.image_url.is_none());
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(sample_product(), 3);
        assert_eq!(line.line_total(), Price::from_cents(3750));
    }

    #[test]
    fn test_draft_with_id() {
        let draft = ProductDraft {
            name: "Kettle".to_string(),
            description: "Stovetop".to_string(),
            category: "Kitchen".to_string(),
            available_qty: 4,
            price: Price::from_cents(3999),
            image_url: None,
            rating: None,
        };
        let product = draft.with_id(ProductId::new(9));
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.name, "Kettle");
    }
}
