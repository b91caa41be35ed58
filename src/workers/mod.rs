//! Periodic background sweeps: token discovery and price refresh.
//!
//! Sweeps run on fixed intervals with no mutual exclusion against
//! interactive requests; concurrent writes to the same keys resolve as
//! last-writer-wins. A failing sweep iteration is logged and skipped,
//! never fatal.

use std::sync::Arc;

use tokio::time::{interval_at, Duration, Instant};

use crate::chains::NetworkType;
use crate::config::WorkerSettings;
use crate::context::AppContext;

/// Run both sweep loops until the task is dropped. The first tick of each
/// loop fires one full period after startup, not immediately.
pub async fn run(ctx: Arc<AppContext>, settings: WorkerSettings) {
    if !settings.enabled {
        log::info!("background sweeps disabled");
        return;
    }

    let token_period = Duration::from_secs(settings.token_sweep_secs);
    let price_period = Duration::from_secs(settings.price_sweep_secs);
    let start = Instant::now();
    let mut token_tick = interval_at(start + token_period, token_period);
    let mut price_tick = interval_at(start + price_period, price_period);

    log::info!(
        "background sweeps started (tokens every {}s, prices every {}s)",
        settings.token_sweep_secs,
        settings.price_sweep_secs
    );

    loop {
        tokio::select! {
            _ = token_tick.tick() => sweep_tokens(&ctx).await,
            _ = price_tick.tick() => sweep_prices(&ctx).await,
        }
    }
}

/// Diff every registered mainnet pair against its upstream token list.
async fn sweep_tokens(ctx: &AppContext) {
    for id in ctx.chains.identifiers() {
        if id.network != NetworkType::Mainnet {
            continue;
        }
        match ctx.tokens.check_for_new_tokens(id.chain, id.network).await {
            Ok(list) => {
                log::info!("token sweep {}: {} tokens tracked", id, list.tokens.len())
            }
            Err(e) => log::warn!("token sweep {} failed: {}", id, e),
        }
    }
}

/// Force-refresh prices for every registered mainnet pair.
async fn sweep_prices(ctx: &AppContext) {
    for id in ctx.chains.identifiers() {
        if id.network != NetworkType::Mainnet {
            continue;
        }
        match ctx.prices.refresh(id.chain, id.network).await {
            Ok(book) => log::debug!("price sweep {}: {} prices", id, book.prices.len()),
            Err(e) => log::warn!("price sweep {} failed: {}", id, e),
        }
    }
}
