//! Resolution: evaluate every provider of a tree and merge the results
//!
//! Provider jobs run concurrently on a `ProviderPool`; their outputs are
//! merged by a single thread strictly in traversal order, so the result
//! does not depend on which job finished first.

mod expand;
mod merge;

use crate::config::Config;
use crate::executor::{CancelHandle, PoolJob, ProviderPool};
use crate::provider::ResolvePass;
use crate::spec::RootSpec;
use crate::types::{ResolvedEntry, SpecError};
use expand::{expand_provider, NodePlan};
use merge::EntryAccumulator;
use std::sync::Arc;

/// Resolve `root` into its ordered archive entries
///
/// All-or-nothing: the first failure in traversal order is returned and no
/// partial output is produced. Called from inside an async runtime it
/// returns `SpecError::Config`; use `spawn_blocking` there.
pub fn resolve(root: &RootSpec, config: &Config) -> Result<Vec<ResolvedEntry>, SpecError> {
    resolve_cancellable(root, config, &CancelHandle::new())
}

/// `resolve` that aborts with `SourceUnavailable` once `cancel` fires
pub fn resolve_cancellable(
    root: &RootSpec,
    config: &Config,
    cancel: &CancelHandle,
) -> Result<Vec<ResolvedEntry>, SpecError> {
    config.validate()?;
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(SpecError::Config(
            "resolve cannot run inside an async runtime; call it from spawn_blocking".to_string(),
        ));
    }

    let pass = Arc::new(ResolvePass::new());
    let mut jobs = Vec::new();
    for index in root.traversal_indices() {
        let node = root.node(index);
        if node.providers.is_empty() {
            continue;
        }

        let plan = Arc::new(NodePlan::new(root, index));
        for provider in &node.providers {
            let plan = Arc::clone(&plan);
            let provider = Arc::clone(provider);
            let pass = Arc::clone(&pass);
            let label = format!("{} <- {}", plan.label, provider.describe());
            jobs.push(PoolJob::new(label, move || {
                expand_provider(&plan, provider.as_ref(), &pass)
            }));
        }
    }

    if jobs.is_empty() {
        tracing::debug!("specification has no providers");
        return Ok(Vec::new());
    }

    let pool = ProviderPool::new(config.workers.min(jobs.len()), config.provider_timeout)?
        .with_cancel(cancel.clone());
    let output = pool.run(jobs)?;
    tracing::debug!(
        workers = output.stats.workers,
        jobs = output.stats.submitted,
        failed = output.stats.failed,
        "providers evaluated"
    );

    let mut accumulator = EntryAccumulator::new(config.duplicates);
    for result in output.results {
        for entry in result? {
            accumulator.push(entry)?;
        }
    }

    tracing::debug!(
        entries = accumulator.len(),
        duplicates = config.duplicates.as_str(),
        "resolution complete"
    );
    Ok(accumulator.into_entries())
}
