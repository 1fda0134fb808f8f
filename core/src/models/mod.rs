// core/src/models/mod.rs

//! Data structures for the four persisted entities and their admin inputs.

pub mod offer;
pub mod order;
pub mod product;
pub mod settings;

pub use offer::{Offer, OfferInput};
pub use order::{Order, RecentOrder, ORDER_STATUS_COMPLETED};
pub use product::{Product, ProductFilter, ProductInput};
pub use settings::{SettingsUpdate, StoreSettings};
