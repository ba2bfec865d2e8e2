//! Population of aggregate fields.

use ioc_core::{Erased, Error, FieldInfo, Inject, Key, Marker, Result, Slot, TypeDescriptor};

use crate::registry::Registry;
use crate::shared::Shared;

/// Populates the aggregate behind a registered [`Shared`] handle.
///
/// The write lock is held while the fields of this aggregate are filled. Lookups only clone
/// registered values, so an aggregate may depend on a handle of its own type.
pub(crate) fn populate_shared<T>(value: &Erased, registry: &Registry) -> Result<()>
where
    T: Inject,
{
    let shared = value
        .downcast_ref::<Shared<T>>()
        .ok_or_else(|| Error::TypeMismatch {
            expected: TypeDescriptor::of::<Shared<T>>(),
            found: value.type_descriptor(),
        })?;
    let mut aggregate = shared.write();
    populate_fields(&mut *aggregate, registry)
}

/// Fills the unset, marked fields of `aggregate` from `registry`, in declaration order.
///
/// Fields assigned before an error stay assigned.
///
/// # Errors
///
/// - [`Error::UnsettableField`] if a marked field has no slot.
/// - [`Error::MissingDependency`] if a marked field has no value in the registry.
/// - [`Error::TypeMismatch`] if the resolved value cannot be assigned to the field.
pub fn populate_fields<T>(aggregate: &mut T, registry: &Registry) -> Result<()>
where
    T: Inject,
{
    for FieldInfo {
        name: field,
        marker,
    } in T::fields()
    {
        let Some(marker) = marker else {
            continue;
        };

        let Some(slot) = aggregate.slot(field) else {
            return Err(Error::unsettable_field::<T>(field));
        };

        if !slot.is_unset() {
            trace!(field, "already set");
            continue;
        }

        let expected = slot.target_type();
        let resolved = match marker {
            Marker::ByType => registry.lookup_by_type(expected),
            Marker::ByName(name) => registry.lookup_by_name(name),
        };

        let Some(value) = resolved else {
            let key = match marker {
                Marker::ByType => Key::Type(expected),
                Marker::ByName(name) => Key::Name(name.to_owned()),
            };
            return Err(Error::missing_dependency::<T>(field, key));
        };

        slot.assign(value)
            .map_err(|found| Error::TypeMismatch { expected, found })?;
        trace!(field, "injected");
    }

    Ok(())
}
