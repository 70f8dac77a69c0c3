//! Seed an account's inventory from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: Kopi Susu Gula Aren
//!   category: Minuman
//!   price: "18000"
//!   stock: 40
//! - name: Keripik Singkong Balado
//!   category: Camilan
//!   price: "12500"
//!   stock: 4
//!   image_url: https://example.com/keripik.jpg
//! ```

use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use tokoku_core::{Email, ProductInput};
use tokoku_web::db::{self, UserRepository};
use tokoku_web::services::{ChangeHub, InventoryError, InventoryService};

use super::{CommandError, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No account with email: {0}")]
    UnknownUser(String),

    #[error("{0} products failed validation")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Parse and validate a product list.
///
/// # Errors
///
/// Returns `SeedError::Yaml` for malformed YAML and `SeedError::Invalid`
/// when any product fails validation (each failure is logged).
pub fn parse_products(content: &str) -> Result<Vec<ProductInput>, SeedError> {
    let products: Vec<ProductInput> = serde_yaml::from_str(content)?;

    let mut valid = Vec::with_capacity(products.len());
    let mut failures = 0;
    for (index, product) in products.into_iter().enumerate() {
        match product.validate() {
            Ok(product) => valid.push(product),
            Err(e) => {
                error!("  - product {}: {e}", index + 1);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(SeedError::Invalid(failures));
    }
    Ok(valid)
}

/// Add every product in `file` to the inventory of the account `email`.
///
/// The whole file is validated before anything is written.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, the account does not
/// exist, or a database operation fails.
pub async fn inventory(email: &str, file: &Path) -> Result<(), SeedError> {
    if !file.exists() {
        return Err(SeedError::FileNotFound(file.display().to_string()));
    }

    info!(path = %file.display(), "Loading products from file");
    let content = tokio::fs::read_to_string(file).await?;
    let products = parse_products(&content)?;
    info!(products = products.len(), "Parsed configuration");

    let email = Email::parse(email).map_err(|_| SeedError::InvalidEmail(email.to_owned()))?;

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| SeedError::UnknownUser(email.to_string()))?;

    let hub = ChangeHub::new();
    let inventory = InventoryService::new(&pool, &hub);
    for product in products {
        let name = product.name.clone();
        inventory.add_product(user.id, product).await?;
        info!("  + {name}");
    }

    info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let yaml = r#"
- name: Kopi Susu
  category: Minuman
  price: "18000"
  stock: 40
- name: "  Keripik  "
  category: ""
  price: "12500"
  stock: 4
"#;
        let products = parse_products(yaml).expect("valid yaml");
        assert_eq!(products.len(), 2);
        assert_eq!(products.get(1).map(|p| p.name.as_str()), Some("Keripik"));
        assert_eq!(products.get(1).map(|p| p.category.as_str()), Some("Lainnya"));
    }

    #[test]
    fn test_parse_products_rejects_negative_stock() {
        let yaml = r#"
- name: Kopi Susu
  category: Minuman
  price: "18000"
  stock: -1
"#;
        assert!(matches!(parse_products(yaml), Err(SeedError::Invalid(1))));
    }

    #[test]
    fn test_parse_products_rejects_bad_yaml() {
        assert!(matches!(parse_products("name: ["), Err(SeedError::Yaml(_))));
    }
}
