//! Ambient host state passed explicitly into the builder.
//!
//! [`EnvironmentContext`] carries every value the snapshot reads: version
//! strings, site configuration, server header, deployment context, the
//! database collaborators and the package registry.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfiguration;
use crate::traits::{ConnectionPool, DatabaseHandle, LegacyDatabase, PackageRegistry};

/// Environment variable holding the deployment context, e.g. `Production/Staging`.
pub const CONTEXT_ENV_VAR: &str = "APP_CONTEXT";

/// Environment variable the HTTP server uses to report itself.
pub const SERVER_SOFTWARE_ENV_VAR: &str = "SERVER_SOFTWARE";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("Unknown root context '{0}', expected Production, Development or Testing")]
    UnknownRoot(String),
    #[error("Empty sub-context in '{0}'")]
    EmptySegment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootContext {
    Production,
    Development,
    Testing,
}

impl RootContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootContext::Production => "Production",
            RootContext::Development => "Development",
            RootContext::Testing => "Testing",
        }
    }
}

/// Deployment context: a root plus optional sub-contexts.
///
/// `"Production/Staging/Server1"` has root `Production` and sub-contexts
/// `Staging` and `Server1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationContext {
    root: RootContext,
    sub_contexts: Vec<String>,
}

impl ApplicationContext {
    pub fn new(root: RootContext) -> Self {
        Self {
            root,
            sub_contexts: Vec::new(),
        }
    }

    /// Reads [`CONTEXT_ENV_VAR`]. Unset or blank means `Production`.
    pub fn from_env() -> Result<Self, ContextError> {
        match std::env::var(CONTEXT_ENV_VAR) {
            Ok(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn root(&self) -> RootContext {
        self.root
    }

    pub fn sub_contexts(&self) -> &[String] {
        &self.sub_contexts
    }

    /// The context one level up, or `None` for a bare root.
    pub fn parent(&self) -> Option<Self> {
        if self.sub_contexts.is_empty() {
            return None;
        }
        let mut sub_contexts = self.sub_contexts.clone();
        sub_contexts.pop();
        Some(Self {
            root: self.root,
            sub_contexts,
        })
    }

    pub fn is_production(&self) -> bool {
        self.root == RootContext::Production
    }

    pub fn is_development(&self) -> bool {
        self.root == RootContext::Development
    }

    pub fn is_testing(&self) -> bool {
        self.root == RootContext::Testing
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new(RootContext::Production)
    }
}

impl FromStr for ApplicationContext {
    type Err = ContextError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let mut segments = raw.split('/');

        let root = match segments.next().unwrap_or_default() {
            "Production" => RootContext::Production,
            "Development" => RootContext::Development,
            "Testing" => RootContext::Testing,
            other => return Err(ContextError::UnknownRoot(other.to_string())),
        };

        let sub_contexts = segments
            .map(|segment| {
                if segment.is_empty() {
                    Err(ContextError::EmptySegment(raw.to_string()))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, sub_contexts })
    }
}

impl fmt::Display for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.as_str())?;
        for segment in &self.sub_contexts {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Database collaborators a host exposes. Any of them may be missing.
#[derive(Clone, Default)]
pub struct DatabaseAccess {
    pub legacy: Option<Arc<dyn LegacyDatabase>>,
    pub handle: Option<Arc<dyn DatabaseHandle>>,
    pub pool: Option<Arc<dyn ConnectionPool>>,
}

impl fmt::Debug for DatabaseAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseAccess")
            .field("legacy", &self.legacy.is_some())
            .field("handle", &self.handle.is_some())
            .field("pool", &self.pool.is_some())
            .finish()
    }
}

/// Everything the snapshot builder reads from the running host.
#[derive(Clone)]
pub struct EnvironmentContext {
    pub platform_version: String,
    pub runtime_version: String,
    pub site_configuration: SiteConfiguration,
    pub server_software: Option<String>,
    pub application_context: ApplicationContext,

    /// Host-provided flag: installed through the dependency manager.
    pub dependency_manager_detected: bool,

    pub database: DatabaseAccess,
    pub packages: Arc<dyn PackageRegistry>,
}

impl EnvironmentContext {
    /// Creates a context with empty configuration, no database and no packages.
    pub fn new(platform_version: impl Into<String>, runtime_version: impl Into<String>) -> Self {
        Self {
            platform_version: platform_version.into(),
            runtime_version: runtime_version.into(),
            site_configuration: SiteConfiguration::default(),
            server_software: None,
            application_context: ApplicationContext::default(),
            dependency_manager_detected: false,
            database: DatabaseAccess::default(),
            packages: Arc::new(Vec::new()),
        }
    }

    /// Like [`new`](Self::new), with server software and deployment context
    /// taken from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if [`CONTEXT_ENV_VAR`] holds an unknown root.
    pub fn from_process_env(
        platform_version: impl Into<String>,
        runtime_version: impl Into<String>,
    ) -> Result<Self, ContextError> {
        let mut ctx = Self::new(platform_version, runtime_version);
        ctx.server_software = std::env::var(SERVER_SOFTWARE_ENV_VAR).ok();
        ctx.application_context = ApplicationContext::from_env()?;
        Ok(ctx)
    }

    pub fn with_site_configuration(mut self, config: SiteConfiguration) -> Self {
        self.site_configuration = config;
        self
    }

    pub fn with_server_software(mut self, server_software: impl Into<String>) -> Self {
        self.server_software = Some(server_software.into());
        self
    }

    pub fn with_application_context(mut self, context: ApplicationContext) -> Self {
        self.application_context = context;
        self
    }

    pub fn with_dependency_manager(mut self, detected: bool) -> Self {
        self.dependency_manager_detected = detected;
        self
    }

    pub fn with_legacy_database(mut self, db: Arc<dyn LegacyDatabase>) -> Self {
        self.database.legacy = Some(db);
        self
    }

    pub fn with_database_handle(mut self, handle: Arc<dyn DatabaseHandle>) -> Self {
        self.database.handle = Some(handle);
        self
    }

    pub fn with_connection_pool(mut self, pool: Arc<dyn ConnectionPool>) -> Self {
        self.database.pool = Some(pool);
        self
    }

    pub fn with_packages(mut self, packages: Arc<dyn PackageRegistry>) -> Self {
        self.packages = packages;
        self
    }
}

impl fmt::Debug for EnvironmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentContext")
            .field("platform_version", &self.platform_version)
            .field("runtime_version", &self.runtime_version)
            .field("server_software", &self.server_software)
            .field("application_context", &self.application_context)
            .field("dependency_manager_detected", &self.dependency_manager_detected)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Deployment context in its string form.
pub fn application_context(ctx: &EnvironmentContext) -> String {
    ctx.application_context.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_contexts() {
        let ctx: ApplicationContext = "Development".parse().unwrap();
        assert!(ctx.is_development());
        assert!(ctx.sub_contexts().is_empty());

        assert!("Testing".parse::<ApplicationContext>().unwrap().is_testing());
        assert!(" Production ".parse::<ApplicationContext>().unwrap().is_production());
    }

    #[test]
    fn test_parse_sub_contexts_and_display() {
        let ctx: ApplicationContext = "Production/Staging/Server1".parse().unwrap();
        assert_eq!(ctx.root(), RootContext::Production);
        assert_eq!(ctx.sub_contexts(), ["Staging", "Server1"]);
        assert_eq!(ctx.to_string(), "Production/Staging/Server1");

        let parent = ctx.parent().unwrap();
        assert_eq!(parent.to_string(), "Production/Staging");
        assert_eq!(parent.parent().unwrap().to_string(), "Production");
        assert!(parent.parent().unwrap().parent().is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_root() {
        assert_eq!(
            "Staging".parse::<ApplicationContext>(),
            Err(ContextError::UnknownRoot("Staging".to_string()))
        );
        assert!("production".parse::<ApplicationContext>().is_err());
        assert!(matches!(
            "Production//Server1".parse::<ApplicationContext>(),
            Err(ContextError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_default_context_is_production() {
        let ctx = EnvironmentContext::new("9.5.0", "7.4.3");
        assert_eq!(application_context(&ctx), "Production");
    }

    #[test]
    fn test_from_process_env() {
        // All environment mutation stays in this one test.
        std::env::remove_var(CONTEXT_ENV_VAR);
        std::env::remove_var(SERVER_SOFTWARE_ENV_VAR);
        let ctx = EnvironmentContext::from_process_env("9.5.0", "7.4.3").unwrap();
        assert!(ctx.application_context.is_production());
        assert!(ctx.application_context.sub_contexts().is_empty());
        assert_eq!(ctx.server_software, None);

        std::env::set_var(CONTEXT_ENV_VAR, "   ");
        assert_eq!(ApplicationContext::from_env(), Ok(ApplicationContext::default()));

        std::env::set_var(CONTEXT_ENV_VAR, "Development/Local");
        std::env::set_var(SERVER_SOFTWARE_ENV_VAR, "Apache/2.4.41 (Ubuntu)");
        let ctx = EnvironmentContext::from_process_env("9.5.0", "7.4.3").unwrap();
        assert_eq!(application_context(&ctx), "Development/Local");
        assert_eq!(ctx.server_software.as_deref(), Some("Apache/2.4.41 (Ubuntu)"));

        std::env::set_var(CONTEXT_ENV_VAR, "Staging");
        assert_eq!(
            EnvironmentContext::from_process_env("9.5.0", "7.4.3").unwrap_err(),
            ContextError::UnknownRoot("Staging".to_string())
        );

        std::env::remove_var(CONTEXT_ENV_VAR);
        std::env::remove_var(SERVER_SOFTWARE_ENV_VAR);
    }

    #[test]
    fn test_builder_setters() {
        let ctx = EnvironmentContext::new("9.5.0", "7.4.3")
            .with_server_software("nginx/1.18")
            .with_dependency_manager(true)
            .with_application_context("Testing/Ci".parse().unwrap());

        assert_eq!(ctx.server_software.as_deref(), Some("nginx/1.18"));
        assert!(ctx.dependency_manager_detected);
        assert_eq!(application_context(&ctx), "Testing/Ci");
        assert!(ctx.database.pool.is_none());
        assert!(ctx.packages.active_packages().is_empty());
    }
}
