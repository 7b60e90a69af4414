use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::{Product, ProductId, ProductLookup};
use storefront_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Event, Money, Quantity,
};

/// Cart identifier (one cart per shopping session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line: a product reference and a quantity of at least 1.
///
/// Unit price and line total are derived from the catalog on read and never
/// stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart line joined with its product, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineView<'a> {
    pub product: &'a Product,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Aggregate root: Cart.
///
/// Lines keep insertion order; at most one line exists per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: CartId,
    lines: Vec<CartLine>,
    version: u64,
}

impl Cart {
    /// Fresh, empty cart for a new session.
    pub fn new() -> Self {
        Self::empty(CartId::generate())
    }

    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            version: 0,
        }
    }

    /// Restore a cart from previously captured lines.
    ///
    /// Duplicate products are merged into the first occurrence and zero
    /// quantities are raised to 1.
    pub fn from_lines(id: CartId, lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self {
            id,
            lines: lines.into_iter().collect(),
            version: 0,
        };
        cart.restore_invariants();
        cart
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.line(product_id).is_some()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.line(product_id).map(|l| l.quantity)
    }

    /// Sum of quantities across all lines (badge count).
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `effective_price × quantity` across all lines.
    ///
    /// Lines whose product the lookup does not know contribute nothing.
    pub fn total_amount<L: ProductLookup + ?Sized>(&self, lookup: &L) -> Money {
        self.lines
            .iter()
            .filter_map(|line| match lookup.product(line.product_id) {
                Some(product) => Some(product.effective_price().times(line.quantity)),
                None => {
                    tracing::warn!(
                        cart_id = %self.id,
                        product_id = %line.product_id,
                        "cart line references a product missing from the catalog"
                    );
                    None
                }
            })
            .sum()
    }

    /// Lines joined with their products, in cart order.
    pub fn line_views<'a, L: ProductLookup + ?Sized>(&self, lookup: &'a L) -> Vec<CartLineView<'a>> {
        self.lines
            .iter()
            .filter_map(|line| {
                let product = lookup.product(line.product_id)?;
                let unit_price = product.effective_price();
                Some(CartLineView {
                    product,
                    quantity: line.quantity,
                    unit_price,
                    line_total: unit_price.times(line.quantity),
                })
            })
            .collect()
    }

    /// Add `quantity` of `product`: an existing line grows in place, otherwise
    /// a new line is appended.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> DomainResult<()> {
        let quantity = Quantity::new(quantity)?;
        let events = self.decide_add(product.id, quantity, Utc::now())?;
        self.apply_all(&events);
        Ok(())
    }

    pub fn add_one(&mut self, product: &Product) -> DomainResult<()> {
        self.add_item(product, 1)
    }

    /// Remove the line for `product_id`; absent lines are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let events = self.decide_remove(product_id, Utc::now());
        self.apply_all(&events);
    }

    /// Replace the quantity of an existing line.
    ///
    /// Values below 1 leave the line unchanged; use `remove_item` to drop it.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        let events = self.decide_set_quantity(product_id, quantity, Utc::now())?;
        self.apply_all(&events);
        Ok(())
    }

    pub fn clear(&mut self) {
        let events = self.decide_clear(Utc::now());
        self.apply_all(&events);
    }

    fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    fn apply_all(&mut self, events: &[CartEvent]) {
        for event in events {
            self.apply(event);
        }
    }

    /// Merge duplicate lines (first position wins) and clamp quantities to 1.
    fn restore_invariants(&mut self) {
        let mut first_seen: HashMap<ProductId, usize> = HashMap::with_capacity(self.lines.len());
        let mut merged: Vec<CartLine> = Vec::with_capacity(self.lines.len());
        for line in self.lines.drain(..) {
            match first_seen.get(&line.product_id) {
                Some(&pos) => {
                    merged[pos].quantity = merged[pos].quantity.saturating_add(line.quantity);
                }
                None => {
                    first_seen.insert(line.product_id, merged.len());
                    merged.push(line);
                }
            }
        }
        for line in &mut merged {
            line.quantity = line.quantity.max(1);
        }
        self.lines = merged;
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    /// Raw quantity as received; validated when handled.
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantity {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    SetQuantity(SetQuantity),
    ClearCart(ClearCart),
}

/// Event: ItemAdded. Applies as "grow the existing line, or append one".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantitySet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    QuantitySet(QuantitySet),
    CartCleared(CartCleared),
}

impl CartEvent {
    pub fn cart_id(&self) -> CartId {
        match self {
            CartEvent::ItemAdded(e) => e.cart_id,
            CartEvent::ItemRemoved(e) => e.cart_id,
            CartEvent::QuantitySet(e) => e.cart_id,
            CartEvent::CartCleared(e) => e.cart_id,
        }
    }
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item_added",
            CartEvent::ItemRemoved(_) => "cart.item_removed",
            CartEvent::QuantitySet(_) => "cart.quantity_set",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::QuantitySet(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        // Events addressed to another cart leave state and version untouched.
        if event.cart_id() != self.id {
            tracing::warn!(
                cart_id = %self.id,
                event_cart_id = %event.cart_id(),
                event = event.event_type(),
                "ignoring event for another cart"
            );
            return;
        }

        match event {
            CartEvent::ItemAdded(e) => match self.line_mut(e.product_id) {
                Some(line) => line.quantity = line.quantity.saturating_add(e.quantity),
                None => self.lines.push(CartLine {
                    product_id: e.product_id,
                    quantity: e.quantity,
                }),
            },
            CartEvent::ItemRemoved(e) => {
                self.lines.retain(|l| l.product_id != e.product_id);
            }
            CartEvent::QuantitySet(e) => {
                if let Some(line) = self.line_mut(e.product_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        // Replayed streams may carry events this aggregate would never emit.
        self.restore_invariants();

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;

        tracing::debug!(
            cart_id = %self.id,
            event = event.event_type(),
            lines = self.lines.len(),
            items = self.total_item_count(),
            "cart updated"
        );
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => {
                self.ensure_cart_id(cmd.cart_id)?;
                let quantity = Quantity::new(cmd.quantity)?;
                self.decide_add(cmd.product_id, quantity, cmd.occurred_at)
            }
            CartCommand::RemoveItem(cmd) => {
                self.ensure_cart_id(cmd.cart_id)?;
                Ok(self.decide_remove(cmd.product_id, cmd.occurred_at))
            }
            CartCommand::SetQuantity(cmd) => {
                self.ensure_cart_id(cmd.cart_id)?;
                self.decide_set_quantity(cmd.product_id, cmd.quantity, cmd.occurred_at)
            }
            CartCommand::ClearCart(cmd) => {
                self.ensure_cart_id(cmd.cart_id)?;
                Ok(self.decide_clear(cmd.occurred_at))
            }
        }
    }
}

impl Cart {
    fn ensure_cart_id(&self, cart_id: CartId) -> Result<(), DomainError> {
        if self.id != cart_id {
            return Err(DomainError::invariant("cart_id mismatch"));
        }
        Ok(())
    }

    fn decide_add(
        &self,
        product_id: ProductId,
        quantity: Quantity,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, DomainError> {
        // No per-line cap beyond what a u32 can hold.
        if let Some(existing) = self.quantity_of(product_id) {
            if existing.checked_add(quantity.get()).is_none() {
                return Err(DomainError::invalid_quantity(format!(
                    "line for product {product_id} would exceed {} items",
                    u32::MAX
                )));
            }
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            cart_id: self.id,
            product_id,
            quantity: quantity.get(),
            occurred_at,
        })])
    }

    fn decide_remove(&self, product_id: ProductId, occurred_at: DateTime<Utc>) -> Vec<CartEvent> {
        if !self.contains(product_id) {
            tracing::trace!(cart_id = %self.id, %product_id, "remove of absent line ignored");
            return Vec::new();
        }

        vec![CartEvent::ItemRemoved(ItemRemoved {
            cart_id: self.id,
            product_id,
            occurred_at,
        })]
    }

    fn decide_set_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<CartEvent>, DomainError> {
        if quantity < 1 {
            tracing::trace!(cart_id = %self.id, %product_id, quantity, "quantity below 1 ignored");
            return Ok(Vec::new());
        }
        let quantity = Quantity::new(quantity)?;

        match self.quantity_of(product_id) {
            None => {
                tracing::trace!(cart_id = %self.id, %product_id, "set quantity of absent line ignored");
                Ok(Vec::new())
            }
            Some(current) if current == quantity.get() => Ok(Vec::new()),
            Some(_) => Ok(vec![CartEvent::QuantitySet(QuantitySet {
                cart_id: self.id,
                product_id,
                quantity: quantity.get(),
                occurred_at,
            })]),
        }
    }

    fn decide_clear(&self, occurred_at: DateTime<Utc>) -> Vec<CartEvent> {
        if self.lines.is_empty() {
            return Vec::new();
        }

        vec![CartEvent::CartCleared(CartCleared {
            cart_id: self.id,
            occurred_at,
        })]
    }
}
