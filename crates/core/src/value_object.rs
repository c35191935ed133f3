//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// instances with the same values are interchangeable. `Sku` and `UnitPrice`
/// are the value objects of this domain.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
