//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod license;
pub mod order;
pub mod order_license;
pub mod software;
pub mod software_version;

// Re-export specific types to avoid conflicts
pub use license::{Column as LicenseColumn, Entity as License, Model as LicenseModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_license::{
    Column as OrderLicenseColumn, Entity as OrderLicense, Model as OrderLicenseModel,
};
pub use software::{Column as SoftwareColumn, Entity as Software, Model as SoftwareModel};
pub use software_version::{
    Column as SoftwareVersionColumn, Entity as SoftwareVersion, Model as SoftwareVersionModel,
};
