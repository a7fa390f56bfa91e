//! Promotion codes
//!
//! A single table of known codes maps to a fractional discount applied on top
//! of per-product discounts. An actor holds at most one active promotion.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Known codes and their discount fraction, in hundredths.
const PROMO_TABLE: &[(&str, i64)] = &[
    ("WELCOME10", 10),
    ("SUMMER20", 20),
    ("SPECIAL50", 50),
    ("FREESHIP", 15),
    ("FLASH25", 25),
];

/// Trims and upper-cases raw user input.
pub fn normalize_code(raw: &str) -> String { raw.trim().to_uppercase() }

/// Discount fraction for an already normalized code.
pub fn lookup(code: &str) -> Option<Decimal> {
    PROMO_TABLE.iter().find(|(c, _)| *c == code).map(|(_, hundredths)| Decimal::new(*hundredths, 2))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionState {
    code: Option<String>,
    discount: Decimal,
}

impl PromotionState {
    /// Builds the state for a code, or `None` when the code is not in the table.
    pub fn for_code(raw: &str) -> Option<Self> {
        let code = normalize_code(raw);
        lookup(&code).map(|discount| Self { code: Some(code), discount })
    }

    pub fn code(&self) -> Option<&str> { self.code.as_deref() }
    pub fn discount(&self) -> Decimal { self.discount }
    pub fn is_active(&self) -> bool { self.code.is_some() }

    /// True for the empty state or a code whose fraction matches the table.
    pub fn is_consistent(&self) -> bool {
        match &self.code {
            None => self.discount.is_zero(),
            Some(code) => lookup(code) == Some(self.discount),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PromoOutcome {
    Applied { code: String, discount: Decimal },
    Rejected { reason: PromoRejection },
}

impl PromoOutcome {
    pub fn is_applied(&self) -> bool { matches!(self, Self::Applied { .. }) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromoRejection { UnknownCode }

impl std::fmt::Display for PromoRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::UnknownCode => write!(f, "unknown promotion code") }
    }
}
