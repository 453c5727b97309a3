//! Token-budget truncation of search results.
//!
//! Results arrive relevance-ranked from the remote service. When their
//! combined `token_count` exceeds [`TOKEN_BUDGET`], the longest prefix that
//! fits is kept and the first kept item is annotated with a `warning`.
//! Items are never reordered, and nothing after the first item that does not
//! fit is considered.

use serde_json::Value;
use tracing::debug;

/// Maximum cumulative `token_count` returned to the caller.
pub const TOKEN_BUDGET: f64 = 2000.0;

/// Field carrying an item's token cost.
const TOKEN_COUNT_FIELD: &str = "token_count";

/// Field injected into the first kept item after truncation.
const WARNING_FIELD: &str = "warning";

/// Token cost of a result item; missing or non-numeric counts are zero.
pub fn token_cost(item: &Value) -> f64 {
    item.get(TOKEN_COUNT_FIELD)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Applies the token budget to `items`.
///
/// Returns `items` untouched when their total cost fits `budget`. Otherwise
/// returns the longest fitting prefix, with a truncation warning on its
/// first item. When not even the first item fits, the result is empty and
/// carries no warning.
pub fn shape_results(items: Vec<Value>, budget: f64) -> Vec<Value> {
    let total_cost: f64 = items.iter().map(token_cost).sum();
    if total_cost <= budget {
        return items;
    }

    let total = items.len();
    let mut running = 0.0;
    let mut kept: Vec<Value> = Vec::new();
    for item in items {
        let cost = token_cost(&item);
        if running + cost > budget {
            break;
        }
        running += cost;
        kept.push(item);
    }

    debug!(
        kept = kept.len(),
        total,
        total_cost,
        budget,
        "Truncated search results to token budget"
    );

    let kept_count = kept.len();
    if let Some(Value::Object(first)) = kept.first_mut() {
        first.insert(
            WARNING_FIELD.to_string(),
            Value::String(format!(
                "Results truncated due to token limit. Showing {kept_count} of {total} results."
            )),
        );
    }
    kept
}

/// Renders shaped results as two-space indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_results(items: &[Value]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(items)
}
