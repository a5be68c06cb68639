//! # Variant — Erased Hierarchy Members
//!
//! Defines [`Variant`], the object-safe trait every registered concrete
//! type satisfies. Dispatch returns `Box<dyn Variant>` whose runtime type
//! is exactly the registered type; callers recover it with the downcast
//! helpers below.
//!
//! ## Design
//!
//! The trait is never implemented by hand. A blanket impl covers every
//! `T: Any + Debug + Serialize + PartialEq + Send + Sync`, so a plain
//! `#[derive(Debug, PartialEq, Serialize, Deserialize)]` struct is a
//! valid variant with no further ceremony. Encoding delegates to
//! serde_json; structural equality delegates to the type's own
//! `PartialEq` after a runtime type check.

use std::any::Any;
use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

/// An erased member of a discriminated hierarchy.
///
/// Blanket-implemented for every `'static` type that is `Debug`,
/// `Serialize`, `PartialEq`, `Send`, and `Sync`. The registry stores and
/// returns variants behind `Box<dyn Variant>`.
pub trait Variant: Any + Debug + Send + Sync {
    /// Borrow the variant as `Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Convert the boxed variant into `Box<dyn Any>` for owned downcasts.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The concrete type's name, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Encode the variant's declared fields to a JSON value.
    ///
    /// Does not include the `kind` discriminator; the registry injects it
    /// from its reverse map during [`serialize`](crate::Registry::serialize).
    fn to_value(&self) -> Result<Value, serde_json::Error>;

    /// Structural equality against another erased variant.
    ///
    /// True only when `other` has the same runtime type and the two values
    /// compare equal field-by-field.
    fn eq_dyn(&self, other: &dyn Variant) -> bool;
}

impl<T> Variant for T
where
    T: Any + Debug + Serialize + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn eq_dyn(&self, other: &dyn Variant) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }
}

/// Structural equality between erased variants.
///
/// Two variants of different runtime types are never equal, even if their
/// serialized mappings happen to coincide.
impl PartialEq for dyn Variant {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

impl dyn Variant {
    /// Whether the erased variant's runtime type is `T`.
    pub fn is<T: Variant>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the variant as `T` if that is its runtime type.
    pub fn downcast_ref<T: Variant>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take ownership of the variant as `Box<T>` if that is its runtime
    /// type.
    pub fn downcast<T: Variant>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Rectangle {
        width: u32,
        height: u32,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Circle {
        radius: u32,
    }

    #[test]
    fn test_eq_same_type_same_fields() {
        let a: Box<dyn Variant> = Box::new(Rectangle {
            width: 3,
            height: 4,
        });
        let b: Box<dyn Variant> = Box::new(Rectangle {
            width: 3,
            height: 4,
        });
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_eq_same_type_different_fields() {
        let a: Box<dyn Variant> = Box::new(Circle { radius: 1 });
        let b: Box<dyn Variant> = Box::new(Circle { radius: 2 });
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_eq_different_types_never_equal() {
        // Same serialized shape would not matter; the runtime type gates
        // equality first.
        let a: Box<dyn Variant> = Box::new(Rectangle {
            width: 1,
            height: 1,
        });
        let b: Box<dyn Variant> = Box::new(Circle { radius: 1 });
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_downcast_ref() {
        let v: Box<dyn Variant> = Box::new(Circle { radius: 7 });
        assert!(v.is::<Circle>());
        assert!(!v.is::<Rectangle>());
        assert_eq!(v.downcast_ref::<Circle>(), Some(&Circle { radius: 7 }));
        assert_eq!(v.downcast_ref::<Rectangle>(), None);
    }

    #[test]
    fn test_downcast_owned() {
        let v: Box<dyn Variant> = Box::new(Rectangle {
            width: 2,
            height: 5,
        });
        let rect = v.downcast::<Rectangle>().unwrap();
        assert_eq!(*rect, Rectangle { width: 2, height: 5 });
    }

    #[test]
    fn test_to_value_excludes_kind() {
        let v: Box<dyn Variant> = Box::new(Circle { radius: 7 });
        let value = v.to_value().unwrap();
        assert_eq!(value, serde_json::json!({"radius": 7}));
    }
}
