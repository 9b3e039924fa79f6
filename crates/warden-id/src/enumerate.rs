//! The enumeration scheduler.
//!
//! Periodically re-enumerates the directory into the local store, users
//! strictly before groups, tracking a modification-timestamp watermark
//! per phase so later cycles only fetch entries modified since the last
//! successful pass.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use warden_directory::filter;

use crate::conn;
use crate::context::ProviderContext;
use crate::error::IdResult;

/// Drives the periodic enumeration task for one domain.
///
/// The first cycle fires immediately; later cycles are scheduled
/// `enum_refresh_timeout` after the *start* of the previous cycle. A
/// cycle that fails (or overruns its slot and is cut down by the
/// watchdog) reschedules from now instead, and leaves the watermarks
/// untouched.
#[derive(Debug)]
pub struct EnumerationScheduler {
    handle: JoinHandle<()>,
}

impl EnumerationScheduler {
    /// Start the scheduler task.
    #[must_use]
    pub fn spawn(ctx: Arc<ProviderContext>) -> Self {
        let handle = tokio::spawn(async move {
            run(&ctx).await;
        });
        Self { handle }
    }

    /// Stop the scheduler, discarding any in-flight cycle.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

async fn run(ctx: &ProviderContext) {
    let refresh = ctx.config().domain.enum_refresh_timeout();
    info!(
        domain = %ctx.config().domain.name,
        period_secs = refresh.as_secs(),
        "enumeration scheduler started"
    );

    loop {
        let started = Instant::now();
        // The watchdog: a cycle gets at most one refresh period before its
        // outstanding work is discarded and the slot is handed back.
        let next = match tokio::time::timeout(refresh, run_cycle(ctx)).await {
            Ok(Ok(())) => {
                debug!("enumeration cycle complete");
                started + refresh
            },
            Ok(Err(err)) => {
                warn!(error = %err, "enumeration cycle failed");
                Instant::now() + refresh
            },
            Err(_) => {
                warn!("enumeration cycle overran its slot, cancelled");
                Instant::now() + refresh
            },
        };
        tokio::time::sleep_until(next).await;
    }
}

/// One full enumeration pass: users, then groups.
///
/// A user-phase failure fails the cycle; the group phase never starts
/// ahead of a completed user phase.
pub async fn run_cycle(ctx: &ProviderContext) -> IdResult<()> {
    let result = async {
        enumerate_users(ctx).await?;
        enumerate_groups(ctx).await
    }
    .await;

    if let Err(err) = &result {
        if err.is_transport() {
            ctx.online().mark_offline();
        }
    }
    result
}

async fn enumerate_users(ctx: &ProviderContext) -> IdResult<()> {
    let map = &ctx.config().directory.user_map;
    let watermark = ctx.watermarks().user;
    let search_filter = filter::enum_users(map, watermark.as_deref());
    let attrs = map.requested_attrs();

    let session = conn::ensure_connected(ctx).await?;
    let outcome = session.search_users(&search_filter, &attrs).await?;
    let fetched = outcome.entries.len();
    ctx.store().upsert_users(outcome.entries).await?;

    if let Some(modstamp) = outcome.max_modstamp {
        ctx.advance_user_watermark(&modstamp);
    }
    debug!(users = fetched, "user enumeration phase complete");
    Ok(())
}

async fn enumerate_groups(ctx: &ProviderContext) -> IdResult<()> {
    let map = &ctx.config().directory.group_map;
    let watermark = ctx.watermarks().group;
    let search_filter = filter::enum_groups(map, watermark.as_deref());
    let attrs = map.requested_attrs();

    let session = conn::ensure_connected(ctx).await?;
    let outcome = session.search_groups(&search_filter, &attrs).await?;
    let fetched = outcome.entries.len();
    ctx.store().upsert_groups(outcome.entries).await?;

    if let Some(modstamp) = outcome.max_modstamp {
        ctx.advance_group_watermark(&modstamp);
    }
    debug!(groups = fetched, "group enumeration phase complete");
    Ok(())
}
