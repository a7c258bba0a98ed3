//! Unified error types for the license fulfillment service.
//!
//! Business-rule failures (not found, forbidden, insufficient stock) carry
//! enough context to be translated into structured API responses; database
//! and I/O failures are wrapped and surface as generic server errors.

use thiserror::Error;

/// All errors the service can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A request carried an invalid or incomplete payload
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No software matches the given name or id
    #[error("Software '{name}' not found")]
    SoftwareNotFound { name: String },

    /// No software version matches the given selector or id
    #[error("Software version '{name}' not found")]
    VersionNotFound { name: String },

    /// No license row with the given id
    #[error("License {id} not found")]
    LicenseNotFound { id: i64 },

    /// No order row with the given id
    #[error("Order {id} not found")]
    OrderNotFound { id: i64 },

    /// The requester does not own the order being mutated
    #[error("Order {id} belongs to another user")]
    Forbidden { id: i64 },

    /// Fewer unused license keys are available than requested
    #[error("Insufficient license stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },

    /// Requested quantity must be at least 1
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    /// The software does not draw from the license pool
    #[error("Software {id} does not require licenses")]
    LicenseNotRequired { id: i64 },

    /// The license key has already been consumed
    #[error("License {id} is already in use")]
    LicenseAlreadyUsed { id: i64 },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
