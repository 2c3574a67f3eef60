//! Business logic services.

#![allow(missing_docs)]

pub mod catalog;
pub mod identity;
pub mod media;
pub mod order;
pub mod payment;
pub mod review;

pub use catalog::{
    CatalogService, CreateListingInput, ListingDetail, ListingSummary, OwnedListing,
};
pub use identity::{IdentityService, LoginInput, LoginResponse, RegisterInput};
pub use media::{ImageUpload, MediaService, StoredImage};
pub use order::{
    CreateOrderInput, CreateOrderResponse, OrderRecord, OrderService, OrderSummary,
    VerifyPaymentInput,
};
pub use payment::{
    GatewayOrder, HttpPaymentGateway, PaymentGateway, PaymentService, payment_signature,
    signature_matches,
};
pub use review::{CreateReviewInput, ReviewService, ReviewView};
