//! # Storage Collaborator
//!
//! The narrow repository interface the HTTP layer delegates persistence to.
//! The in-memory implementations back the server and the test suite; a real
//! database client plugs in by implementing the same traits.

mod errors;
pub mod pagination;
pub mod product;

pub use errors::{StorageError, StorageResult};
pub use pagination::{Page, Pagination, PaginationMeta, SortField, SortOrder};
pub use product::{
    InMemoryProductRepository, NewProduct, Product, ProductFilter, ProductListing, ProductPatch,
    ProductRepository,
};
