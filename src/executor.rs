use crate::harvest::{EnvironmentContext, SnapshotBuilder};
use crate::model::DataHarvest;
use crate::traits::HarvestError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

/// Limits how many snapshot builds hit the host database at once.
pub struct HarvestExecutor {
    semaphore: Arc<Semaphore>,
}

impl HarvestExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
        }
    }

    /// Rejects further builds. Builds already holding a permit finish normally.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    #[instrument(skip(self, builder, ctx))]
    pub async fn execute(
        &self,
        builder: &SnapshotBuilder,
        ctx: &EnvironmentContext,
    ) -> Result<DataHarvest, HarvestError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| HarvestError::ExecutorClosed)?;

        info!("Starting harvest for platform: {}", ctx.platform_version);
        let result = builder.build(ctx).await;
        info!("Finished harvest for platform: {}", ctx.platform_version);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{DatabaseError, DatabaseHandle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandle {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DatabaseHandle for CountingHandle {
        async fn server_version(&self) -> Result<String, DatabaseError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("5.7.31".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_executor_limits_concurrency() {
        let handle = Arc::new(CountingHandle {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let ctx = Arc::new(
            EnvironmentContext::new("7.6.32", "7.2.0").with_database_handle(handle.clone()),
        );
        let builder = Arc::new(SnapshotBuilder::new());
        let executor = Arc::new(HarvestExecutor::new(2));

        let mut runs = tokio::task::JoinSet::new();
        for _ in 0..5 {
            let (executor, builder, ctx) = (executor.clone(), builder.clone(), ctx.clone());
            runs.spawn(async move { executor.execute(&builder, &ctx).await });
        }

        while let Some(result) = runs.join_next().await {
            assert_eq!(result.unwrap().unwrap().database_version, "5.7.31");
        }
        assert_eq!(handle.peak.load(Ordering::SeqCst), 2);
        assert_eq!(executor.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_closed_executor_rejects_builds() {
        let ctx = EnvironmentContext::new("9.5.0", "7.4.3");
        let builder = SnapshotBuilder::new();
        let executor = HarvestExecutor::new(1);

        assert!(executor.execute(&builder, &ctx).await.is_ok());

        executor.close();
        let err = executor.execute(&builder, &ctx).await.unwrap_err();
        assert!(matches!(err, HarvestError::ExecutorClosed));
    }
}
