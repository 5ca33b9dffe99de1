use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A product as persisted in the `product` collection
///
/// `id` is `None` until the store assigns one on insert and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product(id={}, name={}, description={}, price={})",
            self.id.as_deref().unwrap_or("null"),
            self.name,
            self.description,
            self.price
        )
    }
}

/// Body of `POST /api/product`
///
/// Carries no identifier; ids are server-assigned. `price` accepts a JSON
/// number or a decimal string. A missing or `null` description is `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub price: Decimal,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Element of the `GET /api/product` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl From<ProductRequest> for Product {
    fn from(request: ProductRequest) -> Self {
        Self {
            id: None,
            name: request.name,
            description: request.description,
            price: request.price,
        }
    }
}

impl From<Product> for ProductResponse {
    /// Stored products always carry an id; an unsaved one maps to `""`.
    fn from(product: Product) -> Self {
        Self {
            id: product.id.unwrap_or_default(),
            name: product.name,
            description: product.description,
            price: product.price,
        }
    }
}

impl From<ProductResponse> for Product {
    fn from(response: ProductResponse) -> Self {
        Self {
            id: Some(response.id),
            name: response.name,
            description: response.description,
            price: response.price,
        }
    }
}
