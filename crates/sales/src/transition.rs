//! Status derivation and the stock effect of status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

/// Initial status of a new order, evaluated once against `now`.
///
/// No delivery date means same-day delivery. A delivery date in the past (or exactly
/// now) also counts as delivered. Only a future date leaves the order in delivery.
/// Creation never yields `Cancelled`.
pub fn derive_initial_status(delivery_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> OrderStatus {
    match delivery_at {
        None => OrderStatus::Delivered,
        Some(at) if at <= now => OrderStatus::Delivered,
        Some(_) => OrderStatus::InDelivery,
    }
}

/// What a status change does to the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockImpact {
    /// One negative movement per line.
    Debit,
    /// One positive movement per line.
    Return,
    Unchanged,
}

impl StockImpact {
    /// Stock effect of moving an order to `new_status`.
    ///
    /// Keyed on the order's `stock_debited` flag rather than its old status. While the
    /// flag agrees with the status (active ⇔ debited) this is the old-active/new-active
    /// table. If they disagree, the flag decides.
    pub fn of_transition(stock_debited: bool, new_status: OrderStatus) -> Self {
        match (stock_debited, new_status.is_active()) {
            (false, true) => StockImpact::Debit,
            (true, false) => StockImpact::Return,
            _ => StockImpact::Unchanged,
        }
    }

    /// Stock effect of deleting an order.
    pub fn of_removal(stock_debited: bool) -> Self {
        if stock_debited {
            StockImpact::Return
        } else {
            StockImpact::Unchanged
        }
    }

    /// The `stock_debited` flag once this impact has been applied.
    pub fn debited_after(self, debited_before: bool) -> bool {
        match self {
            StockImpact::Debit => true,
            StockImpact::Return => false,
            StockImpact::Unchanged => debited_before,
        }
    }

    pub fn moves_stock(self) -> bool {
        self != StockImpact::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::InDelivery),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Cancelled),
        ]
    }

    #[test]
    fn no_delivery_date_is_delivered() {
        assert_eq!(derive_initial_status(None, Utc::now()), OrderStatus::Delivered);
    }

    #[test]
    fn delivery_exactly_now_is_delivered() {
        let now = Utc::now();
        assert_eq!(derive_initial_status(Some(now), now), OrderStatus::Delivered);
    }

    #[test]
    fn future_delivery_is_in_delivery() {
        let now = Utc::now();
        assert_eq!(
            derive_initial_status(Some(now + Duration::minutes(1)), now),
            OrderStatus::InDelivery
        );
    }

    #[test]
    fn transition_table() {
        use OrderStatus::*;
        assert_eq!(StockImpact::of_transition(false, InDelivery), StockImpact::Debit);
        assert_eq!(StockImpact::of_transition(false, Delivered), StockImpact::Debit);
        assert_eq!(StockImpact::of_transition(true, Cancelled), StockImpact::Return);
        assert_eq!(StockImpact::of_transition(true, Delivered), StockImpact::Unchanged);
        assert_eq!(StockImpact::of_transition(false, Cancelled), StockImpact::Unchanged);
    }

    proptest! {
        #[test]
        fn derived_status_is_never_cancelled(offset_secs in -10_000_000i64..10_000_000) {
            let now = Utc::now();
            let status = derive_initial_status(Some(now + Duration::seconds(offset_secs)), now);
            prop_assert_ne!(status, OrderStatus::Cancelled);
            prop_assert_eq!(status == OrderStatus::InDelivery, offset_secs > 0);
        }

        /// Any status sequence keeps `debited == status.is_active()` when started
        /// from a freshly created (active, debited) order.
        #[test]
        fn flag_tracks_active_status(seq in proptest::collection::vec(status_strategy(), 0..30)) {
            let mut status = OrderStatus::Delivered;
            let mut debited = true;
            let mut net: i64 = -1;
            for next in seq {
                let impact = StockImpact::of_transition(debited, next);
                net += match impact {
                    StockImpact::Debit => -1,
                    StockImpact::Return => 1,
                    StockImpact::Unchanged => 0,
                };
                debited = impact.debited_after(debited);
                status = next;
                prop_assert_eq!(debited, status.is_active());
            }
            prop_assert_eq!(net == 0, !status.is_active());
        }
    }
}
