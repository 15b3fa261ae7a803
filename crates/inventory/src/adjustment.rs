//! Manual stock corrections.

use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult};

/// How the operator expressed the correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "quantity", rename_all = "lowercase")]
pub enum AdjustmentMode {
    /// Counted quantity on hand.
    Set(i64),
    Add(i64),
    /// Floors at zero.
    Subtract(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub mode: AdjustmentMode,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    pub previous_stock: i64,
    pub new_stock: i64,
}

impl AdjustmentOutcome {
    pub fn delta(&self) -> i64 {
        self.new_stock.saturating_sub(self.previous_stock)
    }
}

impl StockAdjustment {
    pub fn new(mode: AdjustmentMode, reason: impl Into<String>) -> Self {
        Self {
            mode,
            reason: reason.into(),
        }
    }

    /// Reason as it will be recorded on the movement.
    pub fn recorded_reason(&self) -> &str {
        self.reason.trim()
    }

    /// Validate against the current stock and compute the resulting level.
    pub fn evaluate(&self, current_stock: i64) -> DomainResult<AdjustmentOutcome> {
        if self.recorded_reason().is_empty() {
            return Err(DomainError::validation("an adjustment reason is required"));
        }

        let new_stock = match self.mode {
            AdjustmentMode::Set(q) => {
                if q < 0 {
                    return Err(DomainError::validation("stock cannot be set below zero"));
                }
                q
            }
            AdjustmentMode::Add(q) => {
                if q < 0 {
                    return Err(DomainError::validation("quantity to add cannot be negative"));
                }
                current_stock.saturating_add(q)
            }
            AdjustmentMode::Subtract(q) => {
                if q < 0 {
                    return Err(DomainError::validation(
                        "quantity to subtract cannot be negative",
                    ));
                }
                if q > current_stock {
                    return Err(DomainError::validation(
                        "cannot subtract more than the current stock",
                    ));
                }
                (current_stock - q).max(0)
            }
        };

        // Derived stock can be negative, so the movement quantity may not fit.
        if new_stock.checked_sub(current_stock).is_none() {
            return Err(DomainError::validation(
                "adjustment is out of range for the current stock",
            ));
        }

        Ok(AdjustmentOutcome {
            previous_stock: current_stock,
            new_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn set_replaces_level() {
        let out = StockAdjustment::new(AdjustmentMode::Set(4), "Physical count")
            .evaluate(10)
            .unwrap();
        assert_eq!(out.new_stock, 4);
        assert_eq!(out.delta(), -6);
    }

    #[test]
    fn blank_reason_is_rejected() {
        let err = StockAdjustment::new(AdjustmentMode::Add(1), "  ")
            .evaluate(0)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn cannot_subtract_more_than_on_hand() {
        assert!(
            StockAdjustment::new(AdjustmentMode::Subtract(11), "Theft")
                .evaluate(10)
                .is_err()
        );
    }

    #[test]
    fn negative_set_is_rejected() {
        assert!(
            StockAdjustment::new(AdjustmentMode::Set(-1), "Typo")
                .evaluate(3)
                .is_err()
        );
    }

    #[test]
    fn set_far_above_negative_stock_is_rejected() {
        let err = StockAdjustment::new(AdjustmentMode::Set(i64::MAX), "Recount")
            .evaluate(-1)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn set_from_negative_stock_within_range() {
        let out = StockAdjustment::new(AdjustmentMode::Set(5), "Recount")
            .evaluate(-3)
            .unwrap();
        assert_eq!(out.delta(), 8);
    }

    proptest! {
        #[test]
        fn add_then_delta_is_quantity(current in -1_000i64..1_000, q in 0i64..1_000) {
            let out = StockAdjustment::new(AdjustmentMode::Add(q), "Goods received")
                .evaluate(current)
                .unwrap();
            prop_assert_eq!(out.delta(), q);
        }

        #[test]
        fn subtract_never_goes_negative(current in 0i64..1_000, q in 0i64..1_000) {
            let result = StockAdjustment::new(AdjustmentMode::Subtract(q), "Breakage").evaluate(current);
            match result {
                Ok(out) => prop_assert!(out.new_stock >= 0),
                Err(_) => prop_assert!(q > current),
            }
        }
    }
}
