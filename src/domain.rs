//! Closed domain enums and the pure parts of the order engine.
//!
//! Everything here is side-effect-free; the store layer maps these types to
//! and from Postgres text columns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ShopError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Shopper,
    Admin,
}

impl Role {
    /// Registration policy: addresses on the admin domain become admins,
    /// everyone else is a shopper.
    pub fn for_email(email: &str) -> Self {
        if email.to_lowercase().contains("@admin.com") {
            Role::Admin
        } else {
            Role::Shopper
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Order lifecycle. Nothing ever leaves `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Inventory guard: can `requested` units be taken from `on_hand` stock?
///
/// Used twice — as a soft check when a line enters the cart, and as the hard
/// transactional gate at payment commit. The two may disagree when stock
/// moves in between; the commit-time re-validation is authoritative.
pub fn can_fulfill(on_hand: i32, requested: i32) -> bool {
    requested >= 1 && requested <= on_hand
}

/// Line total in minor units.
pub fn line_total(unit_price_cents: i64, quantity: i32) -> i64 {
    unit_price_cents * quantity as i64
}

/// Merged quantity of a cart line after an additive add: repeat adds fold
/// into the existing line instead of opening a second one.
pub fn merged_cart_quantity(existing: Option<i32>, added: i32) -> i32 {
    existing.unwrap_or(0) + added
}

/// One order line at commit time, paired with the stock just re-read under
/// row lock.
#[derive(Debug, Clone)]
pub struct CommitLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub requested: i32,
    pub on_hand: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Decides the commit: either every line passes the inventory guard and the
/// full set of decrements comes back, or the first shortfall aborts the plan
/// naming the offending product. There is no partial plan, so a caller that
/// applies the result can never drive stock negative.
pub fn plan_commit(lines: &[CommitLine]) -> Result<Vec<StockDecrement>> {
    let mut decrements = Vec::with_capacity(lines.len());
    for line in lines {
        if !can_fulfill(line.on_hand, line.requested) {
            return Err(ShopError::InsufficientStock { product: line.product_name.clone() });
        }
        decrements.push(StockDecrement { product_id: line.product_id, quantity: line.requested });
    }
    Ok(decrements)
}

/// Simulated payment instrument. Fields are validated for presence only;
/// no external gateway is modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub holder: String,
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    pub fn is_complete(&self) -> bool {
        !(self.holder.trim().is_empty()
            || self.number.trim().is_empty()
            || self.expiry.trim().is_empty()
            || self.cvv.trim().is_empty())
    }
}

/// Opaque reference stamped on an order when payment completes.
pub fn generate_payment_ref() -> String {
    format!("PAY-{:08}", rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for_email() {
        assert_eq!(Role::for_email("root@admin.com"), Role::Admin);
        assert_eq!(Role::for_email("ROOT@ADMIN.COM"), Role::Admin);
        assert_eq!(Role::for_email("alice@example.com"), Role::Shopper);
    }

    #[test]
    fn test_can_fulfill() {
        assert!(can_fulfill(5, 5));
        assert!(can_fulfill(5, 1));
        assert!(!can_fulfill(5, 6));
        assert!(!can_fulfill(0, 1));
        assert!(!can_fulfill(5, 0));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(1000, 2), 2000);
        assert_eq!(line_total(0, 3), 0);
    }

    #[test]
    fn test_repeat_adds_merge_into_one_line() {
        // add 2, then add 3: one line of 5, never two lines
        let first = merged_cart_quantity(None, 2);
        assert_eq!(first, 2);
        assert_eq!(merged_cart_quantity(Some(first), 3), 5);
    }

    fn commit_line(name: &str, requested: i32, on_hand: i32) -> CommitLine {
        CommitLine {
            product_id: Uuid::new_v4(),
            product_name: name.into(),
            requested,
            on_hand,
        }
    }

    #[test]
    fn test_plan_commit_decrements_every_line() {
        let lines = [commit_line("Widget", 2, 5), commit_line("Gadget", 1, 1)];
        let plan = plan_commit(&lines).unwrap();
        assert_eq!(plan.len(), 2);
        for (d, l) in plan.iter().zip(&lines) {
            assert_eq!(d.product_id, l.product_id);
            assert_eq!(d.quantity, l.requested);
            // stock never goes negative, even when the last unit is taken
            assert!(l.on_hand - d.quantity >= 0);
        }
        assert_eq!(lines[0].on_hand - plan[0].quantity, 3);
    }

    #[test]
    fn test_plan_commit_shortfall_aborts_whole_plan() {
        let lines = [commit_line("Widget", 2, 5), commit_line("Gadget", 3, 2)];
        match plan_commit(&lines) {
            Err(ShopError::InsufficientStock { product }) => assert_eq!(product, "Gadget"),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        // the earlier, fulfillable line produced no decrement either
    }

    #[test]
    fn test_plan_commit_empty_is_empty() {
        assert!(plan_commit(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_card_presence() {
        let card = CardDetails {
            holder: "A Shopper".into(),
            number: "4242424242424242".into(),
            expiry: "12/30".into(),
            cvv: "123".into(),
        };
        assert!(card.is_complete());
        let blank_cvv = CardDetails { cvv: "  ".into(), ..card };
        assert!(!blank_cvv.is_complete());
    }

    #[test]
    fn test_payment_ref_shape() {
        let r = generate_payment_ref();
        assert!(r.starts_with("PAY-"));
        assert!(r.len() >= 12);
    }
}
