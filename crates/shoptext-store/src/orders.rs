//! Service-order glue over the host's state variables.
//!
//! Orders live in the host state under `active_orders`, either as an array
//! or as an id-keyed map depending on which schema generation wrote them.
//! Normalization fills gaps with neutral defaults and clamps the percent
//! attributes, so the status bar can render whatever survives.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shoptext_core::schema;

/// State key holding in-flight orders.
pub const ACTIVE_ORDERS_KEY: &str = "active_orders";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InService,
    Completed,
}

impl OrderStatus {
    /// Status strings are free text from the model; anything mentioning
    /// completion counts as completed, everything else is in service.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("complet") {
            OrderStatus::Completed
        } else {
            OrderStatus::InService
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::InService => write!(f, "in service"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub role: String,
    pub age: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPackage {
    pub name: String,
    pub price: f64,
    pub discounted_price: f64,
    pub category: String,
    pub features: Vec<String>,
}

/// Character attributes; `affinity` and `excitement` clamp to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsycheState {
    pub affinity: f64,
    pub excitement: f64,
    pub current_thought: String,
    pub temperament: String,
}

/// Per-service counters; `heart_rate` clamps to [60, 200].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub heart_rate: f64,
    pub sessions: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: String,
    pub status: OrderStatus,
    pub client: ClientInfo,
    pub package: OrderPackage,
    pub psyche: PsycheState,
    pub stats: ServiceStats,
}

/// Normalizes one raw order value, filling defaults for anything absent.
#[must_use]
pub fn normalize_order(order: &Value, idx: usize) -> ServiceOrder {
    let id = order
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("order_{idx}"), ToString::to_string);

    let status = OrderStatus::from_label(str_at(order, &["status"], ""));

    ServiceOrder {
        id,
        status,
        client: ClientInfo {
            name: str_at(order, &["client", "name"], "unknown").to_string(),
            role: str_at(order, &["client", "role"], "unknown").to_string(),
            age: num_at(order, &["client", "age"], 0.0),
            description: str_at(order, &["client", "description"], "").to_string(),
        },
        package: OrderPackage {
            name: str_at(order, &["package", "name"], "Unnamed Package").to_string(),
            price: num_at(order, &["package", "price"], 0.0),
            discounted_price: num_at(order, &["package", "discounted_price"], 0.0),
            category: str_at(order, &["package", "category"], "unknown").to_string(),
            features: list_at(order, &["package", "features"]),
        },
        psyche: PsycheState {
            affinity: schema::clamp_percent(num_at(order, &["psyche", "affinity"], 0.0)),
            excitement: schema::clamp_percent(num_at(order, &["psyche", "excitement"], 0.0)),
            current_thought: str_at(order, &["psyche", "current_thought"], "").to_string(),
            temperament: str_at(order, &["psyche", "temperament"], "").to_string(),
        },
        stats: ServiceStats {
            heart_rate: schema::clamp_heart_rate(num_at(order, &["stats", "heart_rate"], 60.0)),
            sessions: num_at(order, &["stats", "sessions"], 0.0),
        },
    }
}

/// Extracts and normalizes every order from a host state value. Accepts
/// both the array form and the id-keyed map form; the map form iterates in
/// key order so output is deterministic.
#[must_use]
pub fn orders_from_state(state: &Value) -> Vec<ServiceOrder> {
    let root = state.get("stat_data").unwrap_or(state);
    let Some(orders) = root.get(ACTIVE_ORDERS_KEY) else {
        return Vec::new();
    };
    match orders {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| normalize_order(item, idx))
            .collect(),
        Value::Object(map) => map
            .values()
            .enumerate()
            .map(|(idx, item)| normalize_order(item, idx))
            .collect(),
        _ => Vec::new(),
    }
}

#[must_use]
pub fn filter_active(orders: &[ServiceOrder]) -> Vec<ServiceOrder> {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::InService)
        .cloned()
        .collect()
}

#[must_use]
pub fn filter_completed(orders: &[ServiceOrder]) -> Vec<ServiceOrder> {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .cloned()
        .collect()
}

/// Renders a percent-like value for display: fractions scale up, plain
/// percentages pass through, anything else comes back verbatim or as `-`.
#[must_use]
pub fn normalize_percent(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) if s.trim().is_empty() => "-".to_string(),
        Value::String(s) if s.contains('%') => s.trim().to_string(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(num) => format_percent(num),
            Err(_) => s.trim().to_string(),
        },
        Value::Number(n) => n.as_f64().map_or_else(|| "-".to_string(), format_percent),
        _ => "-".to_string(),
    }
}

fn format_percent(num: f64) -> String {
    if num <= 1.0 {
        format!("{:.0}%", num * 100.0)
    } else if num <= 100.0 {
        format!("{num:.0}%")
    } else {
        format!("{num}")
    }
}

fn str_at<'a>(value: &'a Value, path: &[&str], default: &'a str) -> &'a str {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return default,
        }
    }
    current.as_str().unwrap_or(default)
}

fn num_at(value: &Value, path: &[&str], default: f64) -> f64 {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return default,
        }
    }
    match current {
        Value::Number(n) => n.as_f64().unwrap_or(default),
        Value::String(s) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

fn list_at(value: &Value, path: &[&str]) -> Vec<String> {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }
    current.as_array().map_or_else(Vec::new, |items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect()
    })
}
