//! Sequential order numbers: `<prefix>-<year>-<counter>`.

use chrono::Datelike;

use crate::order::Order;

pub const DEFAULT_ORDER_PREFIX: &str = "CMD";

/// Counter is zero-padded to three digits and grows past 999 unpadded.
pub fn format_order_number(prefix: &str, year: i32, counter: u32) -> String {
    format!("{prefix}-{year}-{counter:03}")
}

/// Next free number for `year` among a tenant's `existing` orders.
///
/// The candidate counter is the count of orders dated in `year` plus one. Deleted
/// orders can make that candidate collide with a surviving number, so the counter is
/// bumped until the number is unused.
pub fn next_order_number<'a>(
    prefix: &str,
    year: i32,
    existing: impl IntoIterator<Item = &'a Order>,
) -> String {
    let existing: Vec<&Order> = existing.into_iter().collect();
    let in_year = existing
        .iter()
        .filter(|o| o.ordered_at().year() == year)
        .count();

    let mut counter = u32::try_from(in_year).unwrap_or(u32::MAX).saturating_add(1);
    loop {
        let candidate = format_order_number(prefix, year, counter);
        if !existing.iter().any(|o| o.number() == candidate) || counter == u32::MAX {
            return candidate;
        }
        counter += 1;
    }
}
