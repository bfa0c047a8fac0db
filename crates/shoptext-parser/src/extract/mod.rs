//! Strategy orchestration.
//!
//! Extraction strategies run in priority order (anchor, JS template,
//! bracket tags, YAML, strict JSON, tolerant chunk scan, plain text) and
//! the first result that passes the meaningfulness check wins. Every
//! strategy failure is recoverable: a `None` means "dialect absent or
//! unparseable, try the next one", and the orchestrator itself never
//! panics or returns an error; total exhaustion produces an empty result
//! set that upstream UI renders as "nothing to display".

pub(crate) mod anchor;
pub(crate) mod fields;
pub(crate) mod json;
pub(crate) mod tags;
pub(crate) mod template;
pub(crate) mod text;
pub(crate) mod tolerant;
pub(crate) mod yaml;

use shoptext_core::{flatten_packages, ShopData};

use crate::normalize;
use crate::preprocess;
use crate::types::{IdFactory, RawShop};

/// One entry in the priority chain: a name for logging and an attempt
/// function with the common strategy signature.
struct Strategy {
    name: &'static str,
    attempt: fn(&str, &mut IdFactory) -> Option<Vec<RawShop>>,
}

/// Priority order matters: explicit signals (the anchor phrase, a template
/// assignment) outrank structural guesses, and the plain-text scan runs
/// dead last because it can hallucinate packages out of keyword-shaped
/// prose.
const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "anchor",
        attempt: anchor::attempt,
    },
    Strategy {
        name: "template",
        attempt: template::attempt,
    },
    Strategy {
        name: "tags",
        attempt: tags::attempt,
    },
    Strategy {
        name: "yaml",
        attempt: yaml::attempt,
    },
    Strategy {
        name: "json",
        attempt: json::attempt,
    },
    Strategy {
        name: "tolerant",
        attempt: tolerant::attempt,
    },
    Strategy {
        name: "text",
        attempt: text::attempt,
    },
];

/// Parses free-form chat text into validated shop/package records.
///
/// Never panics and never returns an error; the worst outcome is an empty
/// [`ShopData`]. Repeated calls on identical input yield identical ids.
#[must_use]
pub fn parse_shop_text(input: &str) -> ShopData {
    let cleaned = preprocess::clean(input);
    if cleaned.trim().is_empty() {
        tracing::debug!("input empty after preprocessing");
        return ShopData::default();
    }

    let mut ids = IdFactory::default();
    for strategy in STRATEGIES {
        let Some(raw_shops) = (strategy.attempt)(&cleaned, &mut ids) else {
            continue;
        };
        let data = normalize::finalize(raw_shops);
        if is_meaningful(&data) {
            tracing::debug!(
                strategy = strategy.name,
                shops = data.shops.len(),
                packages = data.packages.len(),
                "strategy accepted"
            );
            return accept(data);
        }
        tracing::debug!(strategy = strategy.name, "result judged noise, falling through");
    }

    tracing::debug!("all strategies exhausted");
    ShopData::default()
}

/// A result is meaningful when it carries at least one package, or at
/// least one shop whose name is not a sentinel. An all-default,
/// package-less result is structurally valid noise (typically ordinary
/// prose misread as an empty shop) and is discarded.
fn is_meaningful(data: &ShopData) -> bool {
    !data.packages.is_empty() || data.shops.iter().any(|shop| !shop.has_sentinel_name())
}

/// Ghost filtering runs on every accepted result regardless of the
/// producing strategy, then the package union is rebuilt to match.
fn accept(mut data: ShopData) -> ShopData {
    let before = data.shops.len();
    data.shops.retain(|shop| {
        if shop.is_ghost() {
            tracing::debug!(shop_id = %shop.id, "filtered ghost shop");
            false
        } else {
            true
        }
    });
    if data.shops.len() != before {
        let mut seen = std::collections::HashSet::new();
        data.packages = flatten_packages(&data.shops)
            .into_iter()
            .filter(|pkg| seen.insert(pkg.id.clone()))
            .collect();
    }
    data
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
