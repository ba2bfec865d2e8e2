use std::fmt::Debug;

use ioc_core::Inject;

use crate::descriptor::Descriptor;
use crate::handler::{Handler, HandlerObject};
use crate::registry::Registry;
use crate::shared::Shared;

/// A builder for [`Registry`].
///
/// Descriptors are registered in the order the `with_*` methods are called.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<Descriptor>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Registers an anonymous value.
    ///
    /// The value is never populated. Use [`with_aggregate`](Self::with_aggregate) for a
    /// [`Shared`] handle whose fields should be filled.
    #[must_use]
    pub fn with_value<T>(self, value: T) -> Self
    where
        T: Clone + Debug + Send + Sync + 'static,
    {
        self.with_descriptor(Descriptor::new(value))
    }

    /// Registers a named value, which is never populated.
    #[must_use]
    pub fn with_named<T>(self, name: impl Into<String>, value: T) -> Self
    where
        T: Clone + Debug + Send + Sync + 'static,
    {
        self.with_descriptor(Descriptor::named(name, value))
    }

    /// Registers an anonymous aggregate.
    #[must_use]
    pub fn with_aggregate<T>(self, value: Shared<T>) -> Self
    where
        T: Inject + Debug,
    {
        self.with_descriptor(Descriptor::aggregate(value))
    }

    /// Registers a named aggregate.
    #[must_use]
    pub fn with_named_aggregate<T>(self, name: impl Into<String>, value: Shared<T>) -> Self
    where
        T: Inject + Debug,
    {
        self.with_descriptor(Descriptor::named_aggregate(name, value))
    }

    /// Registers a handler under `name`, to be called with [`Registry::invoke_dyn`].
    #[must_use]
    pub fn with_handler<H, Args>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args> + Clone + Send + Sync + 'static,
        H::Output: Clone + Send + Sync + 'static,
    {
        self.with_descriptor(Descriptor::named(name, HandlerObject::new(handler)))
    }

    /// Finalizes the building process and returns the built registry.
    #[must_use]
    pub fn build(self) -> Registry {
        let mut registry = Registry::new();
        registry.register(self.descriptors);
        registry
    }
}
