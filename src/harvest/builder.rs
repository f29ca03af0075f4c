//! Snapshot builder.
//!
//! [`SnapshotBuilder`] reads an [`EnvironmentContext`] and produces a
//! [`DataHarvest`] in one pass:
//! - Version strings, site name and server header are copied as-is
//! - The database version goes through [`detect_database_version`], bounded
//!   by an optional timeout
//! - Dependency-manager usage and installed modules come from
//!   [`crate::harvest::packages`]
//!
//! The builder keeps no state between calls and can be shared freely.

use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, instrument};

use crate::harvest::context::{application_context, EnvironmentContext};
use crate::harvest::database::{detect_database_version, DetectionRule, DEFAULT_DETECTION_RULES};
use crate::harvest::packages::{list_installed_modules, uses_dependency_manager};
use crate::model::DataHarvest;
use crate::traits::HarvestError;

/// Builds [`DataHarvest`] snapshots.
///
/// # Example
///
/// ```ignore
/// use site_harvester::harvest::{EnvironmentContext, SnapshotBuilder};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let ctx = EnvironmentContext::from_process_env("9.5.0", "7.4.3")?
///         .with_connection_pool(pool);
///     let builder = SnapshotBuilder::new().with_database_timeout(Duration::from_secs(5));
///
///     let harvest = builder.build(&ctx).await?;
///     println!("{}", harvest.to_json()?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    /// Ordered version → mechanism table for database detection
    rules: Vec<DetectionRule>,

    /// Upper limit for the database round trip (default: 30 seconds)
    database_timeout: Option<Duration>,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_DETECTION_RULES.to_vec(),
            database_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Replaces the detection table. Rules are evaluated in order.
    pub fn with_detection_rules(mut self, rules: Vec<DetectionRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_database_timeout(mut self, limit: Duration) -> Self {
        self.database_timeout = Some(limit);
        self
    }

    /// Waits on the database for as long as it takes.
    pub fn without_database_timeout(mut self) -> Self {
        self.database_timeout = None;
        self
    }

    pub fn detection_rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Builds a complete snapshot of `ctx`.
    ///
    /// Missing site name or server software never fail the build; they stay
    /// `None` in the result.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] if the database layer fails or exceeds the
    /// configured timeout. No partial snapshot is returned.
    #[instrument(skip(self, ctx), fields(platform_version = %ctx.platform_version))]
    pub async fn build(&self, ctx: &EnvironmentContext) -> Result<DataHarvest, HarvestError> {
        let start = Instant::now();

        let database_version = match self.database_timeout {
            Some(limit) => timeout(limit, detect_database_version(ctx, &self.rules))
                .await
                .map_err(|_| HarvestError::DatabaseTimeout {
                    timeout_ms: limit.as_millis() as u64,
                })??,
            None => detect_database_version(ctx, &self.rules).await?,
        };

        let harvest = DataHarvest {
            platform_version: ctx.platform_version.clone(),
            runtime_version: ctx.runtime_version.clone(),
            site_name: ctx.site_configuration.site_name(),
            server_software: ctx.server_software.clone(),
            database_version,
            deployment_context: application_context(ctx),
            uses_dependency_manager: uses_dependency_manager(ctx),
            installed_modules: list_installed_modules(ctx),
        };

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            database_version = %harvest.database_version,
            modules = harvest.installed_modules.len(),
            "Data harvest completed"
        );

        Ok(harvest)
    }
}
