use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical exchange identifiers covered by the registry.
///
/// The numeric id is the stable key used in snapshot storage and must never
/// be reassigned once an exchange has been snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Binance,
    Bitfinex,
}

impl ExchangeId {
    pub const ALL: [Self; 2] = [Self::Binance, Self::Bitfinex];

    /// Stable numeric id used in snapshot keys.
    pub const fn numeric_id(self) -> u16 {
        match self {
            Self::Binance => 1,
            Self::Bitfinex => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bitfinex => "bitfinex",
        }
    }

    pub fn from_numeric_id(id: u16) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|exchange| exchange.numeric_id() == id)
            .ok_or(ValidationError::UnknownExchangeId { id })
    }
}

/// Parse an `@`-separated exchange name filter.
///
/// `None`, an empty string, or a separator-only string all mean "every known
/// exchange". Duplicate names are collapsed; an unknown name fails the whole
/// filter.
pub fn parse_exchange_filter(filter: Option<&str>) -> Result<Vec<ExchangeId>, ValidationError> {
    let Some(filter) = filter else {
        return Ok(ExchangeId::ALL.to_vec());
    };

    let names: Vec<&str> = filter
        .split('@')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Ok(ExchangeId::ALL.to_vec());
    }

    let mut exchanges = Vec::with_capacity(names.len());
    for name in names {
        let parsed: ExchangeId = name.parse()?;
        if !exchanges.contains(&parsed) {
            exchanges.push(parsed);
        }
    }
    Ok(exchanges)
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|exchange| exchange.as_str() == normalized)
            .ok_or(ValidationError::UnknownExchange { value: normalized })
    }
}
