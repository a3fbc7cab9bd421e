//! # Products
//!
//! Product model and the repository interface the HTTP layer talks to.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};
use super::pagination::{Page, Pagination, SortField, SortOrder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: i64,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Product as shown in list responses (owner hidden)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductListing {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            created_at: p.created_at,
        }
    }
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: i64,
}

/// Validated update payload; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<i64>,
}

/// List filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !contains_ci(&product.category.to_string(), category) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let in_name = contains_ci(&product.name, search);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, search));
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Storage collaborator for products
pub trait ProductRepository: Send + Sync {
    fn find_by_id(&self, id: i64) -> StorageResult<Option<Product>>;

    fn create(&self, owner_id: i64, product: NewProduct) -> StorageResult<Product>;

    /// Fails with `NotFound` when `id` does not exist
    fn update(&self, id: i64, patch: ProductPatch) -> StorageResult<Product>;

    /// Fails with `NotFound` when `id` does not exist
    fn delete(&self, id: i64) -> StorageResult<()>;

    fn find_many(&self, filter: &ProductFilter, pagination: &Pagination) -> StorageResult<Page<Product>>;
}

/// In-memory product repository
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_by_id(&self, id: i64) -> StorageResult<Option<Product>> {
        let products = self.products.read().map_err(|_| StorageError::poisoned())?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    fn create(&self, owner_id: i64, product: NewProduct) -> StorageResult<Product> {
        let mut products = self.products.write().map_err(|_| StorageError::poisoned())?;

        let created = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            user_id: owner_id,
            created_at: Utc::now(),
        };
        products.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: i64, patch: ProductPatch) -> StorageResult<Product> {
        let mut products = self.products.write().map_err(|_| StorageError::poisoned())?;

        let existing = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StorageError::not_found("Product", id))?;

        if let Some(name) = patch.name {
            existing.name = name;
        }
        if let Some(description) = patch.description {
            existing.description = Some(description);
        }
        if let Some(price) = patch.price {
            existing.price = price;
        }
        if let Some(category) = patch.category {
            existing.category = category;
        }
        Ok(existing.clone())
    }

    fn delete(&self, id: i64) -> StorageResult<()> {
        let mut products = self.products.write().map_err(|_| StorageError::poisoned())?;

        let len_before = products.len();
        products.retain(|p| p.id != id);

        if products.len() == len_before {
            Err(StorageError::not_found("Product", id))
        } else {
            Ok(())
        }
    }

    fn find_many(&self, filter: &ProductFilter, pagination: &Pagination) -> StorageResult<Page<Product>> {
        let products = self.products.read().map_err(|_| StorageError::poisoned())?;

        let mut matching: Vec<Product> = products.iter().filter(|p| filter.matches(p)).cloned().collect();

        matching.sort_by(|a, b| {
            let ordering = match pagination.sort_by {
                SortField::Price => a.price.total_cmp(&b.price),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            };
            match pagination.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let skip = usize::try_from(pagination.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();

        Ok(Page { items, total })
    }
}
