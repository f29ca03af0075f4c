//! Database version detection across the host's three database layers.
//!
//! Which layer is asked depends on the host version. The choice is driven by
//! an ordered table of [`DetectionRule`]s: the first rule whose upper bound is
//! greater than or equal to the host version wins, so a host exactly at a
//! bound uses the older mechanism.

use tracing::{debug, instrument, warn};

use crate::harvest::context::EnvironmentContext;
use crate::harvest::version::{integer_to_version, version_to_integer};
use crate::model::DATABASE_VERSION_UNAVAILABLE;
use crate::traits::HarvestError;

const VERSION_QUERY: &str = "SELECT @@version";
const VERSION_COLUMN: &str = "@@version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMechanism {
    /// `SELECT @@version` through the legacy database layer.
    RawQuery,
    /// Version accessor on the global database handle.
    HandleAccessor,
    /// Version accessor on the first connection of the connection pool.
    ConnectionPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionRule {
    /// Inclusive upper bound; `None` matches every version.
    pub upper_bound: Option<&'static str>,
    pub mechanism: DetectionMechanism,
}

impl DetectionRule {
    pub const fn up_to(bound: &'static str, mechanism: DetectionMechanism) -> Self {
        Self {
            upper_bound: Some(bound),
            mechanism,
        }
    }

    pub const fn unbounded(mechanism: DetectionMechanism) -> Self {
        Self {
            upper_bound: None,
            mechanism,
        }
    }

    fn matches(&self, version: u64) -> bool {
        self.upper_bound
            .map_or(true, |bound| version <= version_to_integer(bound))
    }
}

pub const DEFAULT_DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule::up_to("7.0.0", DetectionMechanism::RawQuery),
    DetectionRule::up_to("8.0.0", DetectionMechanism::HandleAccessor),
    DetectionRule::unbounded(DetectionMechanism::ConnectionPool),
];

/// Picks the mechanism for `platform_version`. First match wins.
pub fn select_mechanism(rules: &[DetectionRule], platform_version: &str) -> Option<DetectionMechanism> {
    let version = version_to_integer(platform_version);
    rules
        .iter()
        .find(|rule| rule.matches(version))
        .map(|rule| rule.mechanism)
}

/// Asks the database for its server version.
///
/// Falls back to `"n/a"` when no rule matches or when the selected layer is
/// not available. Errors raised by the layer itself are returned unchanged.
#[instrument(skip(ctx, rules), fields(platform_version = %ctx.platform_version))]
pub async fn detect_database_version(
    ctx: &EnvironmentContext,
    rules: &[DetectionRule],
) -> Result<String, HarvestError> {
    let Some(mechanism) = select_mechanism(rules, &ctx.platform_version) else {
        warn!("No detection rule matches host version");
        return Ok(DATABASE_VERSION_UNAVAILABLE.to_string());
    };

    debug!(
        host_version = %integer_to_version(version_to_integer(&ctx.platform_version)),
        ?mechanism,
        "Selected database version mechanism"
    );

    let version = match mechanism {
        DetectionMechanism::RawQuery => match &ctx.database.legacy {
            Some(db) => db
                .query_row(VERSION_QUERY)
                .await?
                .and_then(|mut row| row.remove(VERSION_COLUMN)),
            None => None,
        },
        DetectionMechanism::HandleAccessor => match &ctx.database.handle {
            Some(handle) => Some(handle.server_version().await?),
            None => None,
        },
        DetectionMechanism::ConnectionPool => match &ctx.database.pool {
            // Only the first registered connection is asked.
            Some(pool) => match pool.connection_names().first() {
                Some(name) => Some(pool.connection_by_name(name).await?.server_version().await?),
                None => None,
            },
            None => None,
        },
    };

    Ok(version.unwrap_or_else(|| {
        warn!(?mechanism, "Database version unavailable");
        DATABASE_VERSION_UNAVAILABLE.to_string()
    }))
}
