//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: User errors
/// - 4xxx: Order errors
/// - 5xxx: Review errors
/// - 6xxx: Product errors (incl. 65xx file upload)
/// - 7xxx: Cart and favorites errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// User errors (1xxx)
    User,
    /// Order errors (4xxx)
    Order,
    /// Review errors (5xxx)
    Review,
    /// Product errors (6xxx)
    Product,
    /// Cart and favorites errors (7xxx)
    Cart,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::User,
            4000..5000 => Self::Order,
            5000..6000 => Self::Review,
            6000..7000 => Self::Product,
            7000..8000 => Self::Cart,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::User => "user",
            Self::Order => "order",
            Self::Review => "review",
            Self::Product => "product",
            Self::Cart => "cart",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(8), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);

        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(1999), ErrorCategory::User);

        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Review);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(6501), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Cart);
        assert_eq!(ErrorCategory::from_code(7101), ErrorCategory::Cart);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::UserNotFound.category(), ErrorCategory::User);
        assert_eq!(ErrorCode::OrderNotFound.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::AlreadyReviewed.category(), ErrorCategory::Review);
        assert_eq!(
            ErrorCode::ProductNotFound.category(),
            ErrorCategory::Product
        );
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Product);
        assert_eq!(ErrorCode::CartLineNotFound.category(), ErrorCategory::Cart);
        assert_eq!(ErrorCode::AlreadyFavorited.category(), ErrorCategory::Cart);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::General.name(), "general");
        assert_eq!(ErrorCategory::User.name(), "user");
        assert_eq!(ErrorCategory::Order.name(), "order");
        assert_eq!(ErrorCategory::Review.name(), "review");
        assert_eq!(ErrorCategory::Product.name(), "product");
        assert_eq!(ErrorCategory::Cart.name(), "cart");
        assert_eq!(ErrorCategory::System.name(), "system");
    }

    #[test]
    fn test_category_serialize() {
        let category = ErrorCategory::User;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"user\"");

        let category = ErrorCategory::Cart;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"cart\"");
    }

    #[test]
    fn test_category_deserialize() {
        let category: ErrorCategory = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(category, ErrorCategory::User);

        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}
