//! Shopping cart domain module (event-sourced).
//!
//! This crate contains the cart aggregate and the figures derived from it,
//! implemented purely as deterministic domain logic (no IO, no rendering).

pub mod cart;
pub mod shared;
pub mod summary;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartEvent, CartId, CartLine, CartLineView, ClearCart,
    ItemAdded, ItemRemoved, QuantitySet, RemoveItem, SetQuantity,
};
pub use shared::SharedCart;
pub use summary::{DEFAULT_TAX_RATE_BPS, OrderSummary, PricingPolicy};
