//! Database repositories.

mod listing;
mod listing_image;
mod order;
mod review;
mod user;

pub use listing::{ListingFilter, ListingRepository};
pub use listing_image::ListingImageRepository;
pub use order::OrderRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
