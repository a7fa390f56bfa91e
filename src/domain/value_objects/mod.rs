//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money arithmetic that saturates at `Decimal::MAX` instead of panicking.
pub mod money {
    use super::Decimal;

    pub fn mul(a: Decimal, b: Decimal) -> Decimal { a.checked_mul(b).unwrap_or(Decimal::MAX) }

    pub fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
        values.into_iter().fold(Decimal::ZERO, |acc, v| acc.checked_add(v).unwrap_or(Decimal::MAX))
    }

    /// Never below zero.
    pub fn sub(a: Decimal, b: Decimal) -> Decimal { a.checked_sub(b).unwrap_or(Decimal::ZERO).max(Decimal::ZERO) }
}

/// Identity that scopes every persisted collection.
///
/// Either an authenticated user id or the `"guest"` sentinel. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    pub const GUEST: &'static str = "guest";

    pub fn new(value: impl Into<String>) -> Result<Self, ActorIdError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(ActorIdError::Empty); }
        if value.len() > 128 { return Err(ActorIdError::TooLong); }
        Ok(Self(value))
    }
    pub fn guest() -> Self { Self(Self::GUEST.to_string()) }
    pub fn is_guest(&self) -> bool { self.0 == Self::GUEST }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for ActorId { fn default() -> Self { Self::guest() } }

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for ActorId {
    type Error = ActorIdError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self { id.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ActorIdError { Empty, TooLong }
impl std::error::Error for ActorIdError {}
impl fmt::Display for ActorIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "Actor id empty"), Self::TooLong => write!(f, "Actor id too long") }
    }
}
