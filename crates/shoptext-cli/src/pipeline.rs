//! End-to-end parse pipeline: acquire a message payload, notify
//! observers, parse, and fall back to the cached catalog when parsing
//! yields nothing. Cache writes happen separately via [`persist`] so the
//! caller can fire them off without blocking on the result.

use shoptext_core::ShopData;
use shoptext_parser::parse_shop_text;
use shoptext_store::{shop_cache, MessageSource, ParseObserver, Scope, VariableStore};

pub struct PipelineOptions {
    pub cache_fallback: bool,
    pub scope: Scope,
}

/// Runs one parse over the source's best message candidate.
pub fn run<S, M, O>(source: &M, store: &S, observer: &O, options: &PipelineOptions) -> ShopData
where
    S: VariableStore,
    M: MessageSource,
    O: ParseObserver,
{
    let Some(payload) = source.payload(None) else {
        tracing::warn!("no message payload available");
        return fallback(store, options);
    };

    observer.parse_requested(&payload.message_id);
    let data = parse_shop_text(&payload.text);

    if data.is_empty() {
        observer.parse_done(&payload.message_id, 0, &["empty result".to_string()]);
        return fallback(store, options);
    }

    observer.parse_done(&payload.message_id, data.shops.len(), &[]);
    data
}

/// Best-effort cache write; failures are logged and swallowed so they can
/// never affect the already-returned parse result.
pub fn persist<S: VariableStore>(store: &S, scope: &Scope, data: &ShopData) {
    if let Err(error) = shop_cache(store, scope.clone()).push(data.clone()) {
        tracing::warn!(%error, "shop cache write failed");
    }
}

fn fallback<S: VariableStore>(store: &S, options: &PipelineOptions) -> ShopData {
    if !options.cache_fallback {
        return ShopData::default();
    }
    match shop_cache(store, options.scope.clone()).latest() {
        Ok(Some(cached)) => {
            tracing::debug!(
                shops = cached.shops.len(),
                "serving last known-good catalog from cache"
            );
            cached
        }
        Ok(None) => ShopData::default(),
        Err(error) => {
            tracing::warn!(%error, "cache fallback read failed");
            ShopData::default()
        }
    }
}
