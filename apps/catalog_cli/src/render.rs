//! Plain-text rendering of store snapshots.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use client_core::StoreSnapshot;
use shared::domain::Product;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn listing(snapshot: &StoreSnapshot) -> String {
    let mut out = String::new();
    if snapshot.products.is_empty() {
        out.push_str("no products\n");
    } else {
        let _ = writeln!(
            out,
            "{:>6}  {:<28} {:>10} {:>7}  {}",
            "ID", "NAME", "PRICE", "STOCK", "UPDATED"
        );
        for product in &snapshot.products {
            let _ = writeln!(
                out,
                "{:>6}  {:<28} {:>10.2} {:>7}  {}",
                product.id.0,
                truncate(&product.name, 28),
                product.price,
                product.stock,
                timestamp(product.updated_at)
            );
        }
    }

    if let Some(meta) = snapshot.pagination {
        let _ = writeln!(
            out,
            "page {}/{} ({} products, {} per page)",
            meta.current_page, meta.last_page, meta.total, meta.per_page
        );
    }
    let active: Vec<String> = snapshot
        .filters
        .active()
        .map(|(field, value)| format!("{field}={value}"))
        .collect();
    if !active.is_empty() {
        let _ = writeln!(out, "filters: {}", active.join(", "));
    }
    out
}

pub fn detail(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:          {}", product.id);
    let _ = writeln!(out, "name:        {}", product.name);
    let _ = writeln!(
        out,
        "description: {}",
        product.description.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "price:       {:.2}", product.price);
    let _ = writeln!(out, "stock:       {}", product.stock);
    let _ = writeln!(out, "created:     {}", timestamp(product.created_at));
    let _ = writeln!(out, "updated:     {}", timestamp(product.updated_at));
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
