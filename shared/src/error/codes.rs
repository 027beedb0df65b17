//! Unified error codes for the Moda store backend
//!
//! This module defines all error codes used across the server and frontend.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: User errors
//! - 4xxx: Order errors
//! - 5xxx: Review errors
//! - 6xxx: Product errors (65xx: file upload)
//! - 7xxx: Cart and favorites errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: User ====================
    /// User not found
    UserNotFound = 1001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has not been completed yet (review not eligible)
    OrderNotCompleted = 4002,
    /// Order status is not one of the allowed states
    OrderStatusInvalid = 4003,
    /// Order has no line items
    OrderEmpty = 4004,

    // ==================== 5xxx: Review ====================
    /// Review not found
    ReviewNotFound = 5001,
    /// Every submitted item was already reviewed
    AlreadyReviewed = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// No variant with the requested color
    VariantNotFound = 6002,
    /// Variant has no entry for the requested size
    SizeNotFound = 6003,
    /// Requested quantity exceeds available stock
    ProductOutOfStock = 6004,
    /// Product has invalid price
    ProductInvalidPrice = 6005,
    /// Product name already exists
    ProductNameExists = 6006,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// Empty file provided
    EmptyFile = 6504,
    /// File storage failed
    FileStorageFailed = 6505,

    // ==================== 7xxx: Cart and Favorites ====================
    /// Cart has no line matching the requested key
    CartLineNotFound = 7001,
    /// Quantity must be a positive integer
    InvalidQuantity = 7002,
    /// Unknown cart action
    UnknownCartAction = 7003,
    /// Product is already in favorites
    AlreadyFavorited = 7101,
    /// Product is not in favorites
    FavoriteNotFound = 7102,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Check if this code reports a missing resource (drives the
    /// `NOT_FOUND` envelope status and the 404 mapping)
    #[inline]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::NotFound
                | ErrorCode::UserNotFound
                | ErrorCode::OrderNotFound
                | ErrorCode::ReviewNotFound
                | ErrorCode::ProductNotFound
                | ErrorCode::VariantNotFound
                | ErrorCode::SizeNotFound
                | ErrorCode::CartLineNotFound
                | ErrorCode::FavoriteNotFound
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // User
            ErrorCode::UserNotFound => "User not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNotCompleted => "Order has not been completed",
            ErrorCode::OrderStatusInvalid => "Invalid order status",
            ErrorCode::OrderEmpty => "Order has no items",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::AlreadyReviewed => "All products were already reviewed",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::VariantNotFound => "Product variant not found",
            ErrorCode::SizeNotFound => "Size not available for this variant",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductNameExists => "Product name already exists",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Cart and Favorites
            ErrorCode::CartLineNotFound => "Cart line not found",
            ErrorCode::InvalidQuantity => "Quantity must be positive",
            ErrorCode::UnknownCartAction => "Unknown cart action",
            ErrorCode::AlreadyFavorited => "Product is already in favorites",
            ErrorCode::FavoriteNotFound => "Product is not in favorites",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // User
            1001 => Ok(ErrorCode::UserNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderNotCompleted),
            4003 => Ok(ErrorCode::OrderStatusInvalid),
            4004 => Ok(ErrorCode::OrderEmpty),

            // Review
            5001 => Ok(ErrorCode::ReviewNotFound),
            5002 => Ok(ErrorCode::AlreadyReviewed),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::VariantNotFound),
            6003 => Ok(ErrorCode::SizeNotFound),
            6004 => Ok(ErrorCode::ProductOutOfStock),
            6005 => Ok(ErrorCode::ProductInvalidPrice),
            6006 => Ok(ErrorCode::ProductNameExists),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::EmptyFile),
            6505 => Ok(ErrorCode::FileStorageFailed),

            // Cart and Favorites
            7001 => Ok(ErrorCode::CartLineNotFound),
            7002 => Ok(ErrorCode::InvalidQuantity),
            7003 => Ok(ErrorCode::UnknownCartAction),
            7101 => Ok(ErrorCode::AlreadyFavorited),
            7102 => Ok(ErrorCode::FavoriteNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
