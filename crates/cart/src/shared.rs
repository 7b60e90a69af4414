//! Thread-safe handle to a single cart.
//!
//! Every mutation holds the write lock for its whole handle+apply step, so at
//! most one mutation is in flight per cart. Reads share the read lock and
//! always observe a fully applied state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use storefront_catalog::{Product, ProductId, ProductLookup};
use storefront_core::{Aggregate, AggregateRoot, DomainError, DomainResult, ExpectedVersion, Money};

use crate::cart::{Cart, CartCommand, CartEvent, CartId};

#[derive(Debug, Clone, Default)]
pub struct SharedCart {
    inner: Arc<RwLock<Cart>>,
}

impl SharedCart {
    pub fn new(cart: Cart) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cart)),
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Cart>> {
        self.inner
            .read()
            .map_err(|_| DomainError::conflict("cart lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Cart>> {
        self.inner
            .write()
            .map_err(|_| DomainError::conflict("cart lock poisoned"))
    }

    pub fn id(&self) -> DomainResult<CartId> {
        Ok(self.read()?.id_typed())
    }

    pub fn add_item(&self, product: &Product, quantity: i64) -> DomainResult<()> {
        self.write()?.add_item(product, quantity)
    }

    pub fn remove_item(&self, product_id: ProductId) -> DomainResult<()> {
        self.write()?.remove_item(product_id);
        Ok(())
    }

    pub fn set_quantity(&self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        self.write()?.set_quantity(product_id, quantity)
    }

    pub fn clear(&self) -> DomainResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Run a command, optionally guarded by the version the caller last saw.
    pub fn execute(
        &self,
        command: &CartCommand,
        expected: ExpectedVersion,
    ) -> DomainResult<Vec<CartEvent>> {
        let mut cart = self.write()?;
        expected.check(cart.version())?;
        cart.execute(command)
    }

    pub fn total_item_count(&self) -> DomainResult<u64> {
        Ok(self.read()?.total_item_count())
    }

    pub fn total_amount<L: ProductLookup + ?Sized>(&self, lookup: &L) -> DomainResult<Money> {
        Ok(self.read()?.total_amount(lookup))
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> DomainResult<Cart> {
        Ok(self.read()?.clone())
    }
}
