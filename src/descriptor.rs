//! Values as they are stored in a [`Registry`].

use std::fmt;

use ioc_core::{Erased, Inject, Result, TypeDescriptor};

use crate::registry::{Registry, populate};
use crate::shared::Shared;

type DebugFn = fn(&Erased, &mut fmt::Formatter<'_>) -> fmt::Result;
type PopulateFn = fn(&Erased, &Registry) -> Result<()>;

/// [`Descriptor`] is a value registered in a [`Registry`], along with its optional name and its
/// type.
///
/// The type is always derived from the value when the descriptor is created. An empty name is
/// the same as no name at all: the value can only be looked up by type.
#[derive(Clone)]
pub struct Descriptor {
    name: Option<String>,
    value: Erased,
    ty: TypeDescriptor,
    debug: DebugFn,
    populate: Option<PopulateFn>,
}

fn debug_value<T>(value: &Erased, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: fmt::Debug + 'static,
{
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => fmt::Debug::fmt(value, f),
    }
}

impl Descriptor {
    /// Creates an anonymous descriptor, which can be looked up by type.
    ///
    /// The value is never populated, even if it is a [`Shared`] handle to an [`Inject`] type.
    /// Use [`aggregate`](Self::aggregate) for that.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        Self::with_name(None, value)
    }

    /// Creates a named descriptor, which can only be looked up by name.
    ///
    /// Like [`new`](Self::new), the value is never populated.
    #[must_use]
    pub fn named<T>(name: impl Into<String>, value: T) -> Self
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        Self::with_name(Some(name.into()), value)
    }

    /// Creates an anonymous descriptor of an aggregate whose fields are filled by
    /// [`Registry::populate`].
    #[must_use]
    pub fn aggregate<T>(value: Shared<T>) -> Self
    where
        T: Inject + fmt::Debug,
    {
        Self {
            populate: Some(populate::populate_shared::<T>),
            ..Self::new(value)
        }
    }

    /// Creates a named descriptor of an aggregate whose fields are filled by
    /// [`Registry::populate`].
    #[must_use]
    pub fn named_aggregate<T>(name: impl Into<String>, value: Shared<T>) -> Self
    where
        T: Inject + fmt::Debug,
    {
        Self {
            populate: Some(populate::populate_shared::<T>),
            ..Self::named(name, value)
        }
    }

    fn with_name<T>(name: Option<String>, value: T) -> Self
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let value = Erased::new(value);
        Self {
            name: name.filter(|name| !name.is_empty()),
            ty: value.type_descriptor(),
            value,
            debug: debug_value::<T>,
            populate: None,
        }
    }

    /// Returns the name of the value, or `None` if it is anonymous.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub const fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    #[inline]
    pub const fn value(&self) -> &Erased {
        &self.value
    }

    /// Returns the type of the value, as computed at creation.
    #[inline]
    pub const fn type_descriptor(&self) -> TypeDescriptor {
        self.ty
    }

    /// Returns `true` if the value is an aggregate visited by [`Registry::populate`].
    #[inline]
    pub const fn is_aggregate(&self) -> bool {
        self.populate.is_some()
    }

    /// Fills the fields of the aggregate, if this is one.
    pub(crate) fn populate(&self, registry: &Registry) -> Result<()> {
        match self.populate {
            Some(populate) => populate(&self.value, registry),
            None => Ok(()),
        }
    }

    /// Returns a [`Debug`](fmt::Debug) view of the value itself.
    pub fn debug_value(&self) -> impl fmt::Debug + '_ {
        DebugValue(self)
    }
}

struct DebugValue<'a>(&'a Descriptor);

impl fmt::Debug for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0.debug)(&self.0.value, f)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("value", &self.debug_value())
            .finish()
    }
}
