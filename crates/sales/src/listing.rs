//! Order list queries: search, filter, sort, paginate and per-status counters.
//!
//! Pure functions over an order snapshot; the caller supplies "now".

use core::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    #[default]
    All,
    /// Same UTC calendar day as now.
    Today,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl DateWindow {
    pub fn contains(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateWindow::All => true,
            DateWindow::Today => at.date_naive() == now.date_naive(),
            DateWindow::Week => at >= now - Duration::days(7),
            DateWindow::Month => at >= now - Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive; matches number, client name or any product name.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub window: DateWindow,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if order.status() != status {
                return false;
            }
        }
        if !self.window.contains(order.ordered_at(), now) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                order.number().to_lowercase().contains(&term)
                    || order.client().display_name().to_lowercase().contains(&term)
                    || order
                        .items()
                        .iter()
                        .any(|i| i.product_name.to_lowercase().contains(&term))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Client,
    Total,
    Status,
    Number,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl OrderSort {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        let ord = match self.key {
            SortKey::Date => a.ordered_at().cmp(&b.ordered_at()),
            SortKey::Client => a
                .client()
                .display_name()
                .to_lowercase()
                .cmp(&b.client().display_name().to_lowercase()),
            SortKey::Total => a.totals().total_ttc.cmp(&b.totals().total_ttc),
            SortKey::Status => a.status().as_str().cmp(b.status().as_str()),
            SortKey::Number => a.number().cmp(b.number()),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Filter then sort (stable, so ties keep snapshot order).
pub fn query_orders<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    filter: &OrderFilter,
    sort: OrderSort,
    now: DateTime<Utc>,
) -> Vec<&'a Order> {
    let mut hits: Vec<&Order> = orders
        .into_iter()
        .filter(|o| filter.matches(o, now))
        .collect();
    hits.sort_by(|a, b| sort.compare(a, b));
    hits
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Never below 1, even for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into 1-based pages. Out-of-range page numbers are clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items.get(start..end).unwrap_or_default().to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: usize,
    pub in_delivery: usize,
    pub delivered: usize,
    pub cancelled: usize,
}

impl OrderStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut acc, o| {
            acc.total += 1;
            match o.status() {
                OrderStatus::InDelivery => acc.in_delivery += 1,
                OrderStatus::Delivered => acc.delivered += 1,
                OrderStatus::Cancelled => acc.cancelled += 1,
            }
            acc
        })
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::InDelivery => self.in_delivery,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ClientSelection, DeliveryChoice, LineDraft, OrderDraft};
    use crate::order::{ChangeStatus, OrderAggregate, OrderCommand, OrderId, PlaceOrder};
    use orderdesk_core::{Aggregate, AggregateId, AggregateRoot, Money, TenantId};
    use orderdesk_products::ProductId;
    use proptest::prelude::*;

    struct Row<'a> {
        number: &'a str,
        client: &'a str,
        product: &'a str,
        price: i64,
        days_ago: i64,
        status: OrderStatus,
    }

    fn build(now: DateTime<Utc>, s: Row<'_>) -> Order {
        let tenant_id = TenantId::new();
        let mut agg = OrderAggregate::empty(OrderId::new(AggregateId::new()));
        let ordered_at = now - Duration::days(s.days_ago);
        let place = PlaceOrder {
            tenant_id,
            order_id: *agg.id(),
            number: s.number.to_string(),
            draft: OrderDraft {
                client: ClientSelection::Individual(s.client.to_string()),
                ordered_at,
                delivery: DeliveryChoice::Immediate,
                lines: vec![LineDraft::bound(
                    ProductId::new(AggregateId::new()),
                    s.product,
                    1,
                    Money::from_major(s.price),
                )],
                apply_vat: false,
            },
            occurred_at: ordered_at,
        };
        for e in agg.handle(&OrderCommand::PlaceOrder(place)).unwrap() {
            agg.apply(&e);
        }
        if s.status != OrderStatus::Delivered {
            let change = ChangeStatus {
                tenant_id,
                order_id: *agg.id(),
                status: s.status,
                occurred_at: now,
            };
            for e in agg.handle(&OrderCommand::ChangeStatus(change)).unwrap() {
                agg.apply(&e);
            }
        }
        agg.into_order().unwrap()
    }

    fn sample(now: DateTime<Utc>) -> Vec<Order> {
        vec![
            build(now, Row { number: "CMD-2026-001", client: "Karim", product: "Cement", price: 30, days_ago: 40, status: OrderStatus::Delivered }),
            build(now, Row { number: "CMD-2026-002", client: "amal", product: "Sand", price: 10, days_ago: 10, status: OrderStatus::Cancelled }),
            build(now, Row { number: "CMD-2026-003", client: "Brahim", product: "Steel bar", price: 50, days_ago: 3, status: OrderStatus::InDelivery }),
            build(now, Row { number: "CMD-2026-004", client: "Zineb", product: "Cement", price: 20, days_ago: 0, status: OrderStatus::Delivered }),
        ]
    }

    fn numbers(orders: &[&Order]) -> Vec<String> {
        orders.iter().map(|o| o.number().to_string()).collect()
    }

    #[test]
    fn search_matches_product_names_case_insensitively() {
        let now = Utc::now();
        let orders = sample(now);
        let filter = OrderFilter {
            search: Some("CEMENT".to_string()),
            ..OrderFilter::default()
        };
        let hits = query_orders(&orders, &filter, OrderSort::new(SortKey::Number, SortDirection::Ascending), now);
        assert_eq!(numbers(&hits), ["CMD-2026-001", "CMD-2026-004"]);
    }

    #[test]
    fn search_matches_number_and_client() {
        let now = Utc::now();
        let orders = sample(now);
        let by_number = OrderFilter {
            search: Some("-003".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(query_orders(&orders, &by_number, OrderSort::default(), now).len(), 1);

        let by_client = OrderFilter {
            search: Some("AMAL".to_string()),
            ..OrderFilter::default()
        };
        let hits = query_orders(&orders, &by_client, OrderSort::default(), now);
        assert_eq!(numbers(&hits), ["CMD-2026-002"]);
    }

    #[test]
    fn windows_and_status_filter_combine() {
        let now = Utc::now();
        let orders = sample(now);
        let week = OrderFilter {
            window: DateWindow::Week,
            ..OrderFilter::default()
        };
        assert_eq!(query_orders(&orders, &week, OrderSort::default(), now).len(), 2);

        let month_delivered = OrderFilter {
            window: DateWindow::Month,
            status: Some(OrderStatus::Delivered),
            ..OrderFilter::default()
        };
        let hits = query_orders(&orders, &month_delivered, OrderSort::default(), now);
        assert_eq!(numbers(&hits), ["CMD-2026-004"]);

        let today = OrderFilter {
            window: DateWindow::Today,
            ..OrderFilter::default()
        };
        assert_eq!(numbers(&query_orders(&orders, &today, OrderSort::default(), now)), ["CMD-2026-004"]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let now = Utc::now();
        let orders = sample(now);
        let hits = query_orders(&orders, &OrderFilter::default(), OrderSort::default(), now);
        assert_eq!(
            numbers(&hits),
            ["CMD-2026-004", "CMD-2026-003", "CMD-2026-002", "CMD-2026-001"]
        );
    }

    #[test]
    fn sorts_by_client_ignoring_case() {
        let now = Utc::now();
        let orders = sample(now);
        let hits = query_orders(
            &orders,
            &OrderFilter::default(),
            OrderSort::new(SortKey::Client, SortDirection::Ascending),
            now,
        );
        let names: Vec<&str> = hits.iter().map(|o| o.client().display_name()).collect();
        assert_eq!(names, ["amal", "Brahim", "Karim", "Zineb"]);
    }

    #[test]
    fn sorts_by_total_descending() {
        let now = Utc::now();
        let orders = sample(now);
        let hits = query_orders(
            &orders,
            &OrderFilter::default(),
            OrderSort::new(SortKey::Total, SortDirection::Descending),
            now,
        );
        assert_eq!(hits[0].number(), "CMD-2026-003");
        assert_eq!(hits[3].number(), "CMD-2026-002");
    }

    #[test]
    fn stats_count_each_status() {
        let now = Utc::now();
        let stats = OrderStats::from_orders(&sample(now));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(OrderStatus::Delivered), 2);
        assert_eq!(stats.in_delivery, 1);
        assert_eq!(stats.cancelled, 1);
    }

    #[test]
    fn pages_are_one_based_and_clamped() {
        let items: Vec<u32> = (1..=23).collect();
        let first = paginate(&items, 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 99, 10);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![21, 22, 23]);

        let zero = paginate(&items, 0, 10);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate::<u32>(&[], 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }

    proptest! {
        #[test]
        fn pages_cover_every_item_once(len in 0usize..200, size in 1usize..25) {
            let items: Vec<usize> = (0..len).collect();
            let first = paginate(&items, 1, size);
            let mut seen = Vec::new();
            for p in 1..=first.total_pages {
                let page = paginate(&items, p, size);
                prop_assert!(page.items.len() <= size);
                seen.extend(page.items);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
