//! Price gate for model-proposed calls
//!
//! Calls strictly below [`AUTO_APPROVE_THRESHOLD`] run without asking;
//! everything else needs explicit approval. Comparisons use exact decimals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Price (MNEE) at and above which a call needs approval
pub const AUTO_APPROVE_THRESHOLD: Decimal = dec!(0.05);

/// Outcome of gating a call by price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    AutoApprove,
    RequiresApproval,
}

impl ApprovalDecision {
    pub fn for_price(price: Decimal) -> Self {
        if should_auto_approve(price) {
            Self::AutoApprove
        } else {
            Self::RequiresApproval
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AutoApprove)
    }
}

pub fn should_auto_approve(price: Decimal) -> bool {
    price < AUTO_APPROVE_THRESHOLD
}
