//! Status and category enums for sales, payments, chat, and stock.
//!
//! Enums stored in the database are kept as `TEXT` columns and round-trip
//! through [`Display`](std::fmt::Display) / [`FromStr`](std::str::FromStr).

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted enum value is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stable identifier stored in the database and used in URLs.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Outcome of a sale. Set once when the transaction is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

text_enum!(TransactionStatus, "transaction status", {
    Completed => "completed",
    Pending => "pending",
    Cancelled => "cancelled",
});

impl TransactionStatus {
    /// Indonesian label shown in the sales table.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Selesai",
            Self::Pending => "Menunggu",
            Self::Cancelled => "Dibatalkan",
        }
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Qris,
    Transfer,
    EWallet,
}

text_enum!(PaymentMethod, "payment method", {
    Cash => "cash",
    Qris => "qris",
    Transfer => "transfer",
    EWallet => "e_wallet",
});

impl PaymentMethod {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Tunai",
            Self::Qris => "QRIS",
            Self::Transfer => "Transfer Bank",
            Self::EWallet => "E-Wallet",
        }
    }
}

/// Where a sale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    /// Rung up at the point-of-sale screen.
    #[default]
    Pos,
    Online,
    Marketplace,
    /// Bulk-imported sales history.
    Import,
}

text_enum!(SalesChannel, "sales channel", {
    Pos => "pos",
    Online => "online",
    Marketplace => "marketplace",
    Import => "import",
});

/// Chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

text_enum!(ChatRole, "chat role", {
    User => "user",
    Model => "model",
});

/// Stock status bucket shown next to each product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Low,
    Medium,
    InStock,
}

impl StockLevel {
    /// Highest stock count still considered low.
    pub const LOW_MAX: i32 = 5;
    /// Highest stock count still considered medium.
    pub const MEDIUM_MAX: i32 = 20;

    /// Bucket a stock count: 5 or fewer is low, 6 to 20 is medium.
    #[must_use]
    pub const fn from_stock(stock: i32) -> Self {
        if stock <= Self::LOW_MAX {
            Self::Low
        } else if stock <= Self::MEDIUM_MAX {
            Self::Medium
        } else {
            Self::InStock
        }
    }

    /// Badge label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Stock",
            Self::Medium => "Medium",
            Self::InStock => "In Stock",
        }
    }

    /// CSS modifier for the badge.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "badge--danger",
            Self::Medium => "badge--warning",
            Self::InStock => "badge--success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_boundaries() {
        for stock in [-3, 0, 1, 5] {
            assert_eq!(StockLevel::from_stock(stock).label(), "Low Stock");
        }
        for stock in [6, 7, 19, 20] {
            assert_eq!(StockLevel::from_stock(stock).label(), "Medium");
        }
        for stock in [21, 22, 500] {
            assert_eq!(StockLevel::from_stock(stock).label(), "In Stock");
        }
    }

    #[test]
    fn test_text_enums_round_trip_through_str() {
        for status in TransactionStatus::ALL {
            assert_eq!(status.as_str().parse::<TransactionStatus>(), Ok(*status));
        }
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(*method));
        }
        assert_eq!("model".parse::<ChatRole>(), Ok(ChatRole::Model));
    }

    #[test]
    fn test_parse_unknown_value() {
        let err = "refunded".parse::<TransactionStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid transaction status: refunded");
    }

    #[test]
    fn test_serde_matches_text_form() {
        let json = serde_json::to_string(&PaymentMethod::EWallet).expect("serialize");
        assert_eq!(json, "\"e_wallet\"");
        let channel: SalesChannel = serde_json::from_str("\"marketplace\"").expect("deserialize");
        assert_eq!(channel, SalesChannel::Marketplace);
    }
}
