//! Field-level injection metadata of aggregate types.
//!
//! An aggregate describes its fields through [`Inject`]. Each field may carry a [`Marker`] that
//! tells the registry to fill it, either by the type of the field or by an explicit name. The
//! field itself is reached through a [`Slot`], which knows whether it is still unset and how to
//! accept a type-erased value.

use crate::erased::Erased;
use crate::type_descriptor::TypeDescriptor;

/// How a marked field is resolved from a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Resolve by the declared type of the field, among anonymous values.
    ByType,
    /// Resolve by the name of a registered value.
    ByName(&'static str),
}

/// Injection metadata of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub marker: Option<Marker>,
}

impl FieldInfo {
    /// A field that is never injected.
    pub const fn unmarked(name: &'static str) -> Self {
        Self { name, marker: None }
    }

    /// A field injected by its declared type.
    pub const fn by_type(name: &'static str) -> Self {
        Self {
            name,
            marker: Some(Marker::ByType),
        }
    }

    /// A field injected from the value registered under `lookup`.
    ///
    /// An empty `lookup` falls back to [`Marker::ByType`].
    pub const fn by_name(name: &'static str, lookup: &'static str) -> Self {
        let marker = if lookup.is_empty() {
            Marker::ByType
        } else {
            Marker::ByName(lookup)
        };
        Self {
            name,
            marker: Some(marker),
        }
    }
}

/// An aggregate type whose fields can be populated from a registry.
///
/// Most aggregates implement this trait through the [`injectable!`](crate::injectable) macro.
/// A manual implementation can list a marked field in [`fields`](Self::fields) while refusing to
/// hand out its [`slot`](Self::slot); populating such a field fails with
/// [`Error::UnsettableField`](crate::Error::UnsettableField).
pub trait Inject: Send + Sync + 'static {
    /// Returns the injection metadata of the fields, in declaration order.
    fn fields() -> Vec<FieldInfo>;

    /// Returns the slot of the field called `field`, or `None` if it cannot be set from outside.
    fn slot(&mut self, field: &str) -> Option<&mut dyn Slot>;
}

/// A field that can receive an injected value.
///
/// This trait is dyn-compatible and implemented for every [`FieldValue`].
pub trait Slot {
    /// Returns `true` if the field still holds its zero value.
    fn is_unset(&self) -> bool;

    /// Returns the type a value must have to be assigned to the field.
    fn target_type(&self) -> TypeDescriptor;

    /// Assigns a clone of `value` to the field.
    ///
    /// # Errors
    ///
    /// Returns the [`TypeDescriptor`] of `value` if it is not of the target type. The field is
    /// left untouched in that case.
    fn assign(&mut self, value: &Erased) -> Result<(), TypeDescriptor>;
}

/// A field type with a zero value that injection may replace.
pub trait FieldValue {
    /// The type of values that can be injected into the field.
    type Target: Clone + Send + Sync + 'static;

    /// Returns `true` if `self` is the zero value of its type.
    fn is_zero(&self) -> bool;

    /// Replaces `self` with an injected value.
    fn set(&mut self, value: Self::Target);
}

impl<F> Slot for F
where
    F: FieldValue,
{
    fn is_unset(&self) -> bool {
        self.is_zero()
    }

    fn target_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<F::Target>()
    }

    fn assign(&mut self, value: &Erased) -> Result<(), TypeDescriptor> {
        let value = value
            .clone_as::<F::Target>()
            .ok_or_else(|| value.type_descriptor())?;
        self.set(value);
        Ok(())
    }
}

// `None` plays the role of a nil reference.
impl<T> FieldValue for Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_none()
    }

    #[inline]
    fn set(&mut self, value: Self::Target) {
        *self = Some(value);
    }
}

impl<T> FieldValue for Vec<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = Self;

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    #[inline]
    fn set(&mut self, value: Self::Target) {
        *self = value;
    }
}

macro_rules! impl_field_value_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                type Target = Self;

                #[inline]
                fn is_zero(&self) -> bool {
                    *self == <$ty>::default()
                }

                #[inline]
                fn set(&mut self, value: Self::Target) {
                    *self = value;
                }
            }
        )*
    };
}

impl_field_value_default!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);

/// Implements [`Inject`] for a struct from the list of its marked fields.
///
/// A field marked `inject` is resolved by its declared type, a field marked `inject("name")` is
/// resolved by name. Fields that are not listed are never touched.
///
/// ```
/// use std::sync::Arc;
///
/// use ioc_core::{FieldInfo, Inject, Slot, injectable};
///
/// #[derive(Debug, Default)]
/// struct Model {
///     now: Option<Arc<String>>,
///     version: i32,
///     label: String,
/// }
///
/// injectable!(Model {
///     now: inject,
///     version: inject("version"),
/// });
///
/// assert_eq!(
///     Model::fields(),
///     vec![FieldInfo::by_type("now"), FieldInfo::by_name("version", "version")],
/// );
///
/// let mut model = Model::default();
/// assert!(model.slot("version").unwrap().is_unset());
/// assert!(model.slot("label").is_none());
/// ```
#[macro_export]
macro_rules! injectable {
    (@field $field:ident) => {
        $crate::field::FieldInfo::by_type(stringify!($field))
    };
    (@field $field:ident $name:literal) => {
        $crate::field::FieldInfo::by_name(stringify!($field), $name)
    };
    ($ty:ident { $($field:ident : inject $(($name:literal))?),* $(,)? }) => {
        impl $crate::field::Inject for $ty {
            fn fields() -> ::std::vec::Vec<$crate::field::FieldInfo> {
                ::std::vec![$($crate::injectable!(@field $field $($name)?)),*]
            }

            fn slot(&mut self, field: &str) -> ::std::option::Option<&mut dyn $crate::field::Slot> {
                match field {
                    $(stringify!($field) => ::std::option::Option::Some(
                        &mut self.$field as &mut dyn $crate::field::Slot,
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}
