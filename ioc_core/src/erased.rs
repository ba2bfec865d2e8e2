//! Utilites around opaque values with erased type informations.

use std::any::Any;

use crate::type_descriptor::TypeDescriptor;

/// [`CloneBoxed`] is a trait to clone a reference to an `?Sized` type into a [`Box`].
///
/// This trait is used to work around [`Sized`] bound on [`Clone`]. It also remembers the
/// descriptor of the concrete type, as [`Any`] only knows its [`TypeId`](std::any::TypeId).
trait CloneBoxed: Any + Send + Sync {
    /// Returns the boxed clone of `self`.
    fn clone_boxed(&self) -> Box<dyn CloneBoxed>;

    /// Returns the descriptor of the concrete type of `self`.
    fn type_descriptor(&self) -> TypeDescriptor;
}

impl<T> CloneBoxed for T
where
    T: Any + Clone + Send + Sync,
{
    fn clone_boxed(&self) -> Box<dyn CloneBoxed> {
        Box::new(self.clone())
    }

    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }
}

/// [`Erased`] is a container for value of an arbitrary type, as long as it
/// implements [`Clone`], [`Send`], and [`Sync`] and is `'static`.
///
/// This is the form in which values are stored in a registry and passed around as supplemental
/// arguments.
pub struct Erased(Box<dyn CloneBoxed + Send + Sync>);

impl Erased {
    /// Creates a new `Erased` with the provided `value` of type `T`.
    ///
    /// `T` must be `'static` implement [`Clone`], [`Send`], and [`Sync`].
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self(Box::new(value) as Box<dyn CloneBoxed + Send + Sync>)
    }

    /// Returns the descriptor of the type of the underlying value.
    #[inline]
    pub fn type_descriptor(&self) -> TypeDescriptor {
        (*self.0).type_descriptor()
    }

    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        (&*self.0 as &dyn Any).is::<T>()
    }

    /// Returns a clone of the underlying value if it is of type `T`.
    pub fn clone_as<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        (&*self.0 as &dyn Any).downcast_ref::<T>().cloned()
    }

    /// Tries to downcast `self` into type `T`.
    ///
    /// # Errors
    ///
    /// If the underlying value is not of type `T`, this method will return
    /// itself as error.
    pub fn downcast<T>(self) -> Result<T, Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.is::<T>() {
            #[expect(clippy::missing_panics_doc, reason = "already checked")]
            let concrete = (self.0 as Box<dyn Any + Send + Sync>)
                .downcast::<T>()
                .expect("the concrete type of this box should be `T` as it was checked before downcasting.");
            Ok(*concrete)
        } else {
            Err(self)
        }
    }
}

impl std::ops::Deref for Erased {
    type Target = dyn Any + Send + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl std::ops::DerefMut for Erased {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

impl Clone for Erased {
    fn clone(&self) -> Self {
        Self(self.0.clone_boxed())
    }
}

impl std::fmt::Debug for Erased {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erased")
            .field("type", &self.type_descriptor().name())
            .finish_non_exhaustive()
    }
}
