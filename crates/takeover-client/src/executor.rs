use async_trait::async_trait;
use std::sync::Arc;
use takeover_core::{ExecOutcome, ProbeSpec};

/// Something that can send a probe and report what happened
#[async_trait]
pub trait Executor: Send + Sync {
    /// Send one probe. Must not fail: transport errors are part of the outcome.
    async fn execute(&self, probe: &ProbeSpec) -> ExecOutcome;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn execute(&self, probe: &ProbeSpec) -> ExecOutcome {
        (**self).execute(probe).await
    }
}
