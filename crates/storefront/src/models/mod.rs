//! Domain models for storefront.
//!
//! These types represent validated domain objects separate from database row
//! types. The cart, wishlist and address models also carry the pure rules
//! that decide what a mutation should do before anything is written.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod wishlist;

pub use address::{Address, AddressInput, AddressRuleError, AddressWrite};
pub use cart::{AddPlan, CartItem, CartRuleError, CartSnapshot, MAX_LINE_QUANTITY};
pub use order::{AddressSnapshot, CheckoutError, CheckoutTotals, Order, OrderItem, OrderRuleError};
pub use product::{Product, ProductDetail, ProductFilter, ProductPage, ProductVariant};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use wishlist::{WishlistItem, WishlistSnapshot};
