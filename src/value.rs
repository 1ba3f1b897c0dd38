//! # Dynamic value box
//!
//! A small type-erased container used for [`crate::blackboard::Blackboard`]
//! entries and behavior-tree user data. It is the in-crate stand-in for the
//! "generic dynamic value container" that a full game engine would supply
//! externally — here there is no such collaborator, so the runtime owns a
//! minimal one.
//!
//! Supports construction from any `'static + Send + Sync` value, exact-type
//! retrieval (fails with [`ValueError::TypeMismatch`] rather than panicking),
//! clone, equality (delegated to the stored type; mismatched types compare
//! unequal without invoking user equality), and an emptiness query.
//! Small-value optimisation is not implemented — boxing every value is
//! simpler and the spec permits, but does not mandate, inlining.

use crate::error::ValueError;
use std::any::{type_name, Any, TypeId};
use std::fmt;

/// Vtable for the operations [`DynValue`] needs but `dyn Any` doesn't give
/// us for free: cloning and equality of the erased value.
struct ValueVTable {
    clone: fn(&(dyn Any + Send + Sync)) -> Box<dyn Any + Send + Sync>,
    eq: fn(&(dyn Any + Send + Sync), &(dyn Any + Send + Sync)) -> bool,
    type_name: &'static str,
}

/// A type-erased, cloneable, equality-comparable container for one value.
pub struct DynValue {
    inner: Option<Box<dyn Any + Send + Sync>>,
    vtable: Option<&'static ValueVTable>,
}

fn vtable_for<T>() -> &'static ValueVTable
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    // One vtable instance per `T`, built lazily — avoids re-allocating
    // function pointers on every `DynValue::new`.
    fn clone_impl<T: Clone + Send + Sync + 'static>(
        any: &(dyn Any + Send + Sync),
    ) -> Box<dyn Any + Send + Sync> {
        Box::new(any.downcast_ref::<T>().expect("vtable type mismatch").clone())
    }
    fn eq_impl<T: PartialEq + Send + Sync + 'static>(
        lhs: &(dyn Any + Send + Sync),
        rhs: &(dyn Any + Send + Sync),
    ) -> bool {
        match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<T>()) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }

    thread_local! {
        static TABLES: std::cell::RefCell<std::collections::HashMap<TypeId, &'static ValueVTable>> =
            std::cell::RefCell::new(std::collections::HashMap::new());
    }

    TABLES.with(|tables| {
        let mut tables = tables.borrow_mut();
        let id = TypeId::of::<T>();
        if let Some(vt) = tables.get(&id) {
            return *vt;
        }
        let leaked: &'static ValueVTable = Box::leak(Box::new(ValueVTable {
            clone: clone_impl::<T>,
            eq: eq_impl::<T>,
            type_name: type_name::<T>(),
        }));
        tables.insert(id, leaked);
        leaked
    })
}

impl DynValue {
    /// Box `value`, erasing its type.
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        Self {
            inner: Some(Box::new(value)),
            vtable: Some(vtable_for::<T>()),
        }
    }

    /// An empty container, holding no value.
    pub fn empty() -> Self {
        Self {
            inner: None,
            vtable: None,
        }
    }

    /// Whether this container holds no value.
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The `TypeId` of the stored value, if any. Comparable by value, so
    /// callers can check type identity without downcasting.
    pub fn type_id(&self) -> Option<TypeId> {
        self.inner.as_deref().map(Any::type_id)
    }

    /// Borrow the stored value as `T`, failing if the stored type differs.
    pub fn downcast_ref<T: 'static>(&self) -> Result<&T, ValueError> {
        let inner = self.inner.as_deref().ok_or(ValueError::Empty)?;
        inner.downcast_ref::<T>().ok_or_else(|| ValueError::TypeMismatch {
            expected: type_name::<T>(),
            actual: self.vtable.map(|v| v.type_name).unwrap_or("<unknown>"),
        })
    }

    /// Consume the container, returning the stored value as `T`.
    pub fn downcast<T: 'static>(self) -> Result<T, ValueError> {
        let expected = type_name::<T>();
        let actual = self.vtable.map(|v| v.type_name).unwrap_or("<unknown>");
        let inner = self.inner.ok_or(ValueError::Empty)?;
        inner
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| ValueError::TypeMismatch { expected, actual })
    }
}

impl Clone for DynValue {
    fn clone(&self) -> Self {
        match (&self.inner, self.vtable) {
            (Some(inner), Some(vt)) => Self {
                inner: Some((vt.clone)(inner.as_ref())),
                vtable: Some(vt),
            },
            _ => Self::empty(),
        }
    }
}

impl PartialEq for DynValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner, self.vtable) {
            (None, None, _) => true,
            (Some(a), Some(b), Some(vt)) => (vt.eq)(a.as_ref(), b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vtable {
            Some(vt) => f.debug_tuple("DynValue").field(&vt.type_name).finish(),
            None => f.write_str("DynValue(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_by_value() {
        let v = DynValue::new(42i32);
        assert_eq!(*v.downcast_ref::<i32>().unwrap(), 42);
        assert_eq!(v.downcast::<i32>().unwrap(), 42);
    }

    #[test]
    fn type_mismatch_is_recoverable_not_a_panic() {
        let v = DynValue::new(42i32);
        let err = v.downcast_ref::<&str>().unwrap_err();
        assert!(matches!(err, ValueError::TypeMismatch { .. }));
    }

    #[test]
    fn empty_is_distinguished() {
        let v = DynValue::empty();
        assert!(v.is_empty());
        assert_eq!(v.downcast_ref::<i32>().unwrap_err(), ValueError::Empty);
    }

    #[test]
    fn clone_is_deep_for_owned_types() {
        let v = DynValue::new(String::from("hello"));
        let cloned = v.clone();
        assert_eq!(v, cloned);
    }

    #[test]
    fn equality_across_mismatched_types_is_false_without_invoking_user_eq() {
        let a = DynValue::new(1i32);
        let b = DynValue::new(1i64);
        assert_ne!(a, b);
    }

    #[test]
    fn equality_within_same_type() {
        assert_eq!(DynValue::new(7i32), DynValue::new(7i32));
        assert_ne!(DynValue::new(7i32), DynValue::new(8i32));
    }
}
