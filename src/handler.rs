//! Handlers invoked with parameters resolved from a [`Registry`].

use std::any::type_name;
use std::sync::Arc;

use ioc_core::{Erased, Error, Result};

use crate::registry::Registry;

/// Resolves a single parameter of type `T`.
///
/// Anonymous registry values come first, then the first supplemental argument of type `T`.
fn resolve_argument<T>(registry: &Registry, extras: &[Erased]) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(value) = registry.get::<T>() {
        trace!(ty = type_name::<T>(), "resolved from registry");
        return Ok(value);
    }

    extras
        .iter()
        .find_map(Erased::clone_as::<T>)
        .inspect(|_| trace!(ty = type_name::<T>(), "resolved from supplemental arguments"))
        .ok_or_else(Error::missing_argument::<T>)
}

/// A callable whose parameters are resolved from a [`Registry`].
///
/// In most cases, you don't need to implement this trait manually, as it is implemented for
/// every function or closure taking up to twelve parameters that implement [`Clone`], [`Send`],
/// and [`Sync`] and are `'static`.
pub trait Handler<Args> {
    /// The type returned by the handler.
    type Output;

    /// Resolves every parameter, then calls the handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] if a parameter cannot be resolved, in which case the
    /// handler is not called.
    fn call(self, registry: &Registry, extras: &[Erased]) -> Result<Self::Output>;
}

impl<F, O> Handler<()> for F
where
    F: FnOnce() -> O,
{
    type Output = O;

    #[inline]
    fn call(self, _registry: &Registry, _extras: &[Erased]) -> Result<Self::Output> {
        Ok(self())
    }
}

macro_rules! impl_handler_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, O, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> O,
            $( $ty: Clone + Send + Sync + 'static, )*
        {
            type Output = O;

            fn call(self, registry: &Registry, extras: &[Erased]) -> Result<Self::Output> {
                $( let $ty = resolve_argument::<$ty>(registry, extras)?; )*
                Ok(self($($ty,)*))
            }
        }
    };
}

apply_tuples!(impl_handler_fn);

/// Same as [`Handler`], for callables returning a future.
pub trait AsyncHandler<Args> {
    /// The type the future resolves to.
    type Output;

    /// The future returned by the handler.
    type Future: Future<Output = Self::Output>;

    /// Resolves every parameter, then calls the handler and returns its future.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] if a parameter cannot be resolved, in which case the
    /// handler is not called.
    fn call(self, registry: &Registry, extras: &[Erased]) -> Result<Self::Future>;
}

impl<F, Fut> AsyncHandler<()> for F
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    type Output = Fut::Output;

    type Future = Fut;

    #[inline]
    fn call(self, _registry: &Registry, _extras: &[Erased]) -> Result<Self::Future> {
        Ok(self())
    }
}

macro_rules! impl_async_handler_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, Fut, $($ty,)*> AsyncHandler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut,
            Fut: Future,
            $( $ty: Clone + Send + Sync + 'static, )*
        {
            type Output = Fut::Output;

            type Future = Fut;

            fn call(self, registry: &Registry, extras: &[Erased]) -> Result<Self::Future> {
                $( let $ty = resolve_argument::<$ty>(registry, extras)?; )*
                Ok(self($($ty,)*))
            }
        }
    };
}

apply_tuples!(impl_async_handler_fn);

type BoxedCall = dyn Fn(&Registry, &[Erased]) -> Result<Erased> + Send + Sync;

/// A type-erased [`Handler`] that can be stored in a [`Registry`] like any other value.
///
/// The handler is cloned for every call, and its output is returned as an [`Erased`] value.
#[derive(Clone)]
pub struct HandlerObject {
    boxed: Arc<BoxedCall>,
    concrete_type: &'static str,
}

impl HandlerObject {
    /// Creates a new `HandlerObject` from a concrete handler.
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args> + Clone + Send + Sync + 'static,
        H::Output: Clone + Send + Sync + 'static,
    {
        let wrapped = move |registry: &Registry, extras: &[Erased]| {
            handler.clone().call(registry, extras).map(Erased::new)
        };

        Self {
            boxed: Arc::new(wrapped),
            concrete_type: type_name::<H>(),
        }
    }

    /// Calls the handler with parameters resolved from `registry` and `extras`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] if a parameter cannot be resolved.
    #[inline]
    pub fn call(&self, registry: &Registry, extras: &[Erased]) -> Result<Erased> {
        (self.boxed)(registry, extras)
    }

    /// Returns the name of the concrete handler type.
    #[inline]
    pub const fn concrete_type(&self) -> &'static str {
        self.concrete_type
    }
}

impl std::fmt::Debug for HandlerObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerObject")
            .field("concrete_type", &self.concrete_type)
            .finish_non_exhaustive()
    }
}
