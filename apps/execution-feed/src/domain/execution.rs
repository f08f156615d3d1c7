//! Execution Event Record
//!
//! The immutable record of a single trade fill as reported by the exchange.
//! Both the live WebSocket stream and the REST recovery path decode into this
//! type, which is what makes identifier-based deduplication across the two
//! sources possible: the exchange assigns one `exec_id` per fill, stable
//! across both interfaces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a trade fill.
///
/// Matches the exchange's wire spelling (`"Buy"` / `"Sell"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Buyer side of the fill.
    Buy,
    /// Seller side of the fill.
    Sell,
}

impl Side {
    /// Get the side name as the exchange spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed trade fill reported by the exchange.
///
/// Immutable once constructed. `exec_id` is globally unique per exchange and
/// identical for the same underlying fill whether it arrived over the stream
/// or the recovery query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionEvent {
    /// Exchange-assigned execution identifier.
    pub exec_id: String,
    /// Trading symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Fill price. Exact decimal, parsed from the wire's decimal string.
    pub price: Decimal,
    /// Fill quantity. Exact decimal, parsed from the wire's decimal string.
    pub qty: Decimal,
    /// Execution time in milliseconds since the Unix epoch.
    pub exec_time_ms: i64,
    /// Side of the fill.
    pub side: Side,
}

impl ExecutionEvent {
    /// Execution time as a UTC datetime, for presentation.
    ///
    /// Returns `None` if the millisecond timestamp is outside the range
    /// chrono can represent.
    #[must_use]
    pub fn exec_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exec_time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event() -> ExecutionEvent {
        ExecutionEvent {
            exec_id: "a1".to_string(),
            symbol: "BTCUSDT".to_string(),
            price: dec!(42391.5),
            qty: dec!(0.001),
            exec_time_ms: 1_700_000_000_000,
            side: Side::Buy,
        }
    }

    #[test]
    fn side_display_matches_wire_spelling() {
        assert_eq!(Side::Buy.to_string(), "Buy");
        assert_eq!(Side::Sell.to_string(), "Sell");
    }

    #[test]
    fn side_serde_round_trip() {
        let json = serde_json::to_string(&Side::Sell).unwrap();
        assert_eq!(json, r#""Sell""#);
        let side: Side = serde_json::from_str(r#""Buy""#).unwrap();
        assert_eq!(side, Side::Buy);
    }

    #[test]
    fn exec_time_converts_milliseconds() {
        let ts = event().exec_time().unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn events_with_same_fields_are_equal() {
        assert_eq!(event(), event());
    }
}
