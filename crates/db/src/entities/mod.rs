//! Database entities.

pub mod listing;
pub mod listing_image;
pub mod order;
pub mod review;
pub mod user;

pub use listing::Entity as Listing;
pub use listing_image::Entity as ListingImage;
pub use order::Entity as Order;
pub use review::Entity as Review;
pub use user::Entity as User;
pub use user::Role;
