//! Cumulative update catalog
//!
//! Resolves CU keys such as `2016_CU7` to download locators and answers
//! "latest CU for a product line" queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌─────────────┐
//! │   Loader    │────▶│ VersionCatalog │◀────│   Product   │
//! │   (JSON)    │     │ (ordered map)  │     │ (15.x→line) │
//! └─────────────┘     └────────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version_catalog`]: ordered key -> locator mapping with `resolve` and `latest_for_line`
//! - [`loader`]: JSON catalog file parsing and the built-in catalog
//! - [`product`]: installed version parsing and the product line table
//! - [`types`]: `Locator`, `CatalogEntry`, `Availability`
//! - [`error`]: catalog construction and loading errors

pub mod error;
pub mod loader;
pub mod product;
pub mod types;
pub mod version_catalog;

pub use error::CatalogError;
pub use loader::{default_catalog, load_catalog};
pub use product::{ProductVersion, product_line_for};
pub use types::{Availability, CatalogEntry, Locator};
pub use version_catalog::VersionCatalog;
