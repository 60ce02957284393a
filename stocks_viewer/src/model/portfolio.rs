//! Rendering a snapshot as a plain-text portfolio summary.
//!
//! The renderer consumes nothing but a [`Snapshot`] value: one row per symbol
//! in sorted order, followed by the portfolio totals. Absent fields render as
//! placeholders so that "unknown" stays visually distinct from an actual zero.
use stocks_common::{Quote, Snapshot};

/// Message shown when no snapshot has ever been published.
pub const EMPTY_STATE: &str = "no snapshot yet";

/// Renders the whole snapshot, rows then totals, as displayable text.
pub fn render(snapshot: &Snapshot) -> String {
    if snapshot.is_empty() {
        return format!("{}\n", EMPTY_STATE);
    }

    let mut out = String::new();
    for (symbol, quote) in snapshot.iter() {
        out.push_str(&render_row(symbol, quote));
        out.push('\n');
    }

    out.push_str(&format!("Balance: {}\n", money(snapshot.total_value())));
    out.push_str(&format!(
        "Original: {}\n",
        money(snapshot.total_original_value())
    ));
    out.push_str(&format!("Difference: {}\n", money(snapshot.difference())));

    if let Some(captured_at) = snapshot.captured_at() {
        out.push_str(&format!(
            "as of {}\n",
            captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    out
}

/// One display row: symbol, price, margin with trend, capture time.
fn render_row(symbol: &str, quote: &Quote) -> String {
    let price = match quote.price {
        Some(price) => money(price),
        None => "-".to_string(),
    };
    format!(
        "{:<8} {:>10} {:>16} {}",
        symbol,
        price,
        margin(quote),
        quote.time.as_deref().unwrap_or("-")
    )
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Formats the margin together with its trend; an absent margin renders as
/// `n/a`, never as `0.00%`.
fn margin(quote: &Quote) -> String {
    match quote.margin {
        Some(m) => format!("{:+.2}% ({})", m, quote.trend()),
        None => "n/a".to_string(),
    }
}
