//! Harvest module - builds the environment snapshot of a running host.
//!
//! This module provides:
//! - **Context**: explicit ambient host state via [`EnvironmentContext`]
//! - **Versions**: comparable integer encoding in [`version`]
//! - **Database**: version-dependent detection via [`database`]
//! - **Packages**: dependency-manager flag and installed module list
//! - **Builder**: one-shot snapshot construction via [`SnapshotBuilder`]

pub mod builder;
pub mod context;
pub mod database;
pub mod packages;
pub mod version;

// Re-export commonly used types
pub use context::{
    application_context, ApplicationContext, ContextError, DatabaseAccess, EnvironmentContext,
    RootContext,
};

pub use database::{
    detect_database_version, select_mechanism, DetectionMechanism, DetectionRule,
    DEFAULT_DETECTION_RULES,
};

pub use builder::SnapshotBuilder;
pub use packages::{list_installed_modules, uses_dependency_manager};
pub use version::{integer_to_version, version_to_integer};
