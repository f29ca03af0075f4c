use tracing::debug;

use crate::harvest::context::EnvironmentContext;
use crate::harvest::version::version_to_integer;
use crate::model::ExtensionVersion;

/// Hosts older than this could not be installed through a dependency manager.
pub const DEPENDENCY_MANAGER_SINCE: &str = "7.0.0";

pub fn uses_dependency_manager(ctx: &EnvironmentContext) -> bool {
    version_to_integer(&ctx.platform_version) >= version_to_integer(DEPENDENCY_MANAGER_SINCE)
        && ctx.dependency_manager_detected
}

/// Active modules that are not part of the core distribution, in registry order.
///
/// A module whose version equals the platform version is treated as bundled
/// with the core even when it lacks the factory-default flag. A third-party
/// module that happens to share the platform version is dropped as well.
pub fn list_installed_modules(ctx: &EnvironmentContext) -> Vec<ExtensionVersion> {
    ctx.packages
        .active_packages()
        .into_iter()
        .filter(|package| {
            let keep =
                !package.part_of_factory_default && package.version != ctx.platform_version;
            if !keep {
                debug!(key = %package.key, version = %package.version, "Skipping core module");
            }
            keep
        })
        .map(|package| ExtensionVersion {
            key: package.key,
            version: package.version,
        })
        .collect()
}
