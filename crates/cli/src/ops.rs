//! Textual cart operations for scripted sessions.
//!
//! Grammar: `add:<id>`, `add:<id>x<qty>`, `remove:<id>`, `set:<id>=<qty>`,
//! `clear`.

use core::str::FromStr;

use storefront_catalog::{Catalog, ProductId};
use storefront_cart::Cart;
use storefront_core::{DomainError, DomainResult, Quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    Add { product_id: ProductId, quantity: Quantity },
    Remove { product_id: ProductId },
    /// Raw value, so sub-1 requests reach the cart's clamp policy unchanged.
    Set { product_id: ProductId, quantity: i64 },
    Clear,
}

impl FromStr for CartOp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "clear" {
            return Ok(CartOp::Clear);
        }

        let (verb, arg) = s
            .split_once(':')
            .ok_or_else(|| DomainError::validation(format!("malformed cart operation '{s}'")))?;

        match verb {
            "add" => {
                let (id, quantity) = match arg.split_once('x') {
                    Some((id, qty)) => (id, Quantity::parse(qty)?),
                    None => (arg, Quantity::ONE),
                };
                Ok(CartOp::Add {
                    product_id: id.parse()?,
                    quantity,
                })
            }
            "remove" => Ok(CartOp::Remove {
                product_id: arg.parse()?,
            }),
            "set" => {
                let (id, qty) = arg.split_once('=').ok_or_else(|| {
                    DomainError::validation(format!("set needs '<id>=<qty>', got '{arg}'"))
                })?;
                let quantity = qty.trim().parse::<i64>().map_err(|_| {
                    DomainError::invalid_quantity(format!("'{}' is not a whole number", qty.trim()))
                })?;
                Ok(CartOp::Set {
                    product_id: id.parse()?,
                    quantity,
                })
            }
            other => Err(DomainError::validation(format!("unknown cart operation '{other}'"))),
        }
    }
}

impl CartOp {
    /// Apply to `cart`, resolving product ids against `catalog`.
    pub fn apply(&self, cart: &mut Cart, catalog: &Catalog) -> DomainResult<()> {
        match *self {
            CartOp::Add { product_id, quantity } => {
                let product = catalog.get(product_id).ok_or_else(DomainError::not_found)?;
                cart.add_item(product, i64::from(quantity.get()))
            }
            CartOp::Remove { product_id } => {
                cart.remove_item(product_id);
                Ok(())
            }
            CartOp::Set { product_id, quantity } => cart.set_quantity(product_id, quantity),
            CartOp::Clear => {
                cart.clear();
                Ok(())
            }
        }
    }
}
