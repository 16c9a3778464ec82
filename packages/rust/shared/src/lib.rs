//! Shared types, error model, and configuration for guidegen.
//!
//! This crate is the foundation depended on by all other guidegen crates.
//! It provides:
//! - [`GuideError`]: the unified error type
//! - Domain types ([`GuideMetadata`], [`GuideSections`], [`GuideId`], [`CategoryMap`], ...)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, AssetsConfig, DefaultsConfig, TaxonomyConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GuideError, Result};
pub use types::{
    AssetRecord, CategoryMap, GuideId, GuideMetadata, GuideSections, Language, Status, Step,
    TAXONOMY_PREFIX, TaxonomyPath, UploadedFile,
};
