//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values:
/// `Money { minor: 1050, currency: USD }` equals any other amount of 1050 USD
/// minor units. [`Money`](crate::Money) and [`Currency`](crate::Currency)
/// implement it; records with identity implement [`Entity`](crate::Entity) or
/// [`AggregateRoot`](crate::AggregateRoot) instead.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
