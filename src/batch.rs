use crate::job::{CondenseJob, CondenseOpts};
use crate::report::{self, Stats};

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::Semaphore;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOpts {
    pub check: bool,
    pub jobs: Option<usize>,
}

pub async fn run(jobs: Vec<CondenseJob>, opts: CondenseOpts, batch: BatchOpts) -> Result<()> {
    let opts = Arc::new(opts);
    let transcode_opts = Arc::clone(&opts);

    run_with(
        jobs,
        batch,
        move |mut job| {
            let opts = Arc::clone(&opts);
            async move {
                job.prepare(&opts).await?;
                Ok::<_, anyhow::Error>(job)
            }
        },
        move |job| {
            let opts = Arc::clone(&transcode_opts);
            async move {
                job.transcode(&opts).await?;
                info!(output = %job.output.display(), "Wrote condensed audio");
                Ok::<_, anyhow::Error>(job)
            }
        },
    )
    .await
}

/// Prepares every job, reports, and transcodes only once all of them prepared.
async fn run_with<P, PF, T, TF>(
    jobs: Vec<CondenseJob>,
    batch: BatchOpts,
    prepare: P,
    transcode: T,
) -> Result<()>
where
    P: Fn(CondenseJob) -> PF,
    PF: Future<Output = Result<CondenseJob>> + Send + 'static,
    T: Fn(CondenseJob) -> TF,
    TF: Future<Output = Result<CondenseJob>> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(
        batch
            .jobs
            .unwrap_or(Semaphore::MAX_PERMITS)
            .clamp(1, Semaphore::MAX_PERMITS),
    ));
    let total = jobs.len();
    info!(files = total, "Condensing");

    let prepared = join_all(jobs, &permits, prepare).await;
    let jobs = settle(prepared, total)?;

    let stats: Vec<Stats> = jobs.iter().map(Stats::from).collect();
    for stat in &stats {
        report::print_file(stat);
    }
    if stats.len() > 1 {
        report::print_summary(&stats);
    }

    if batch.check {
        return Ok(());
    }

    let written = join_all(jobs, &permits, transcode).await;
    settle(written, total)?;

    Ok(())
}

async fn join_all<F, Fut>(
    jobs: Vec<CondenseJob>,
    permits: &Arc<Semaphore>,
    task: F,
) -> Vec<(PathBuf, Result<CondenseJob>)>
where
    F: Fn(CondenseJob) -> Fut,
    Fut: Future<Output = Result<CondenseJob>> + Send + 'static,
{
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let input = job.input.clone();
            let permits = Arc::clone(permits);
            let work = task(job);
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                work.await
            });
            (input, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (input, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(anyhow!(err).context("Worker task failed")),
        };
        results.push((input, result));
    }
    results
}

fn settle(results: Vec<(PathBuf, Result<CondenseJob>)>, total: usize) -> Result<Vec<CondenseJob>> {
    let mut jobs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (input, result) in results {
        match result {
            Ok(job) => jobs.push(job),
            Err(err) => {
                error!(path = %input.display(), "{:#}", err);
                failures.push(err);
            }
        }
    }

    let failed = failures.len();
    match failures.into_iter().next() {
        Some(first) => Err(first.context(format!("{} of {} files failed", failed, total))),
        None => Ok(jobs),
    }
}
