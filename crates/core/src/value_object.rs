//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity; they are defined entirely by their
/// attribute values and are never mutated in place. `Money` and `Quantity`
/// are the value objects of the storefront:
///
/// ```
/// use storefront_core::Money;
///
/// let a = Money::from_cents(4999);
/// let b = Money::from_cents(4999);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
