//! [`Registry`] and its operations.

use std::fmt;

use ioc_core::{Erased, Error, Result, TypeDescriptor};

use crate::descriptor::Descriptor;
use crate::handler::{AsyncHandler, Handler, HandlerObject};

mod builder;
pub use builder::RegistryBuilder;

pub mod populate;

/// An ordered collection of [`Descriptor`]s.
///
/// Values are looked up either by name or, for anonymous values, by type. Neither names nor
/// types have to be unique: the first matching value in registration order always wins, later
/// duplicates are shadowed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use ioc::{Descriptor, Erased, Registry, Shared, injectable};
///
/// #[derive(Debug)]
/// struct Clock {
///     now: u64,
/// }
///
/// #[derive(Debug, Default)]
/// struct Model {
///     clock: Option<Arc<Clock>>,
///     version: i32,
/// }
///
/// injectable!(Model {
///     clock: inject,
///     version: inject("version"),
/// });
///
/// fn hello(model: Shared<Model>, clock: Arc<Clock>, tag: String) -> String {
///     let model = model.read();
///     format!("{tag}: version {} at {}", model.version, clock.now)
/// }
///
/// # fn main() -> ioc::Result<()> {
/// let model = Shared::new(Model::default());
///
/// let mut registry = Registry::new();
/// registry.register([
///     Descriptor::aggregate(model.clone()),
///     Descriptor::new(Arc::new(Clock { now: 42 })),
///     Descriptor::named("version", 20150922),
/// ]);
///
/// // Fill `clock` by type and `version` by name.
/// registry.populate()?;
/// assert_eq!(model.read().version, 20150922);
/// assert_eq!(model.read().clock.as_ref().unwrap().now, 42);
///
/// // `String` is not registered anonymously, so it is taken from the supplemental arguments.
/// let greeting = registry.invoke(hello, &[Erased::new("hello".to_string())])?;
/// assert_eq!(greeting, "hello: version 20150922 at 42");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new builder for `Registry`.
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Appends descriptors to the registry, in order.
    ///
    /// Duplicated names or types are not rejected.
    pub fn register<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = Descriptor>,
    {
        for descriptor in descriptors {
            debug!(
                name = descriptor.name(),
                ty = descriptor.type_descriptor().name(),
                "register"
            );
            self.descriptors.push(descriptor);
        }
    }

    /// Removes every descriptor.
    pub fn reset(&mut self) {
        debug!(count = self.descriptors.len(), "reset");
        self.descriptors.clear();
    }

    /// Returns the first value registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Erased> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name() == Some(name))
            .map(Descriptor::value)
    }

    /// Returns the first anonymous value of type `ty`.
    ///
    /// Named values are never returned, even if their type matches.
    pub fn lookup_by_type(&self, ty: TypeDescriptor) -> Option<&Erased> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.is_anonymous() && descriptor.type_descriptor() == ty)
            .map(Descriptor::value)
    }

    /// Returns a clone of the first anonymous value of type `T`.
    pub fn get<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.lookup_by_type(TypeDescriptor::of::<T>())
            .and_then(Erased::clone_as)
    }

    /// Returns a clone of the first value registered under `name`, if it is of type `T`.
    pub fn get_named<T>(&self, name: &str) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.lookup_by_name(name).and_then(Erased::clone_as)
    }

    /// Fills the unset, marked fields of every registered aggregate.
    ///
    /// Aggregates are visited once, in registration order. An aggregate depending on another
    /// aggregate sees it as it is at that point of the pass.
    ///
    /// # Errors
    ///
    /// Stops at the first error, see [`populate_fields`](populate::populate_fields). Fields
    /// assigned before the error stay assigned.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn populate(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("populate", descriptors = self.descriptors.len()).entered();

        for descriptor in self.descriptors.iter().filter(|d| d.is_aggregate()) {
            descriptor
                .populate(self)
                .inspect_err(|error| debug!(%error, ty = descriptor.type_descriptor().name(), "populate failed"))?;
        }

        Ok(())
    }

    /// Calls `handler` with parameters resolved from the registry.
    ///
    /// Each parameter is looked up by type among the anonymous values first, then among `extras`.
    /// The handler is only called once every parameter is resolved. Its return value is handed
    /// back untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] for the first parameter that cannot be resolved.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn invoke<H, Args>(&self, handler: H, extras: &[Erased]) -> Result<H::Output>
    where
        H: Handler<Args>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("invoke", handler = std::any::type_name::<H>()).entered();

        handler
            .call(self, extras)
            .inspect_err(|error| debug!(%error, "invoke failed"))
    }

    /// Same as [`invoke`](Self::invoke), for handlers returning a future.
    ///
    /// Parameters are resolved before the future is created, then the future is awaited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] for the first parameter that cannot be resolved.
    pub async fn invoke_async<H, Args>(&self, handler: H, extras: &[Erased]) -> Result<H::Output>
    where
        H: AsyncHandler<Args>,
    {
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let fut = handler
            .call(self, extras)
            .inspect_err(|error| debug!(%error, "invoke failed"))?;
        Ok(fut.await)
    }

    /// Calls a type-erased value, which must be a [`HandlerObject`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandler`] if `value` is not a [`HandlerObject`], or
    /// [`Error::MissingArgument`] if a parameter cannot be resolved.
    pub fn invoke_dyn(&self, value: &Erased, extras: &[Erased]) -> Result<Erased> {
        let handler = value
            .downcast_ref::<HandlerObject>()
            .ok_or_else(|| Error::InvalidHandler(value.type_descriptor()))?;
        handler.call(self, extras)
    }

    /// Returns the number of registered descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates over descriptors in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }

    /// Returns a table of every descriptor, for diagnostics. Same as [`Display`](fmt::Display).
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Descriptor> for Registry {
    fn extend<I: IntoIterator<Item = Descriptor>>(&mut self, iter: I) {
        self.register(iter);
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID\tNAME\t\tTYPE\t\tVALUE")?;
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            writeln!(
                f,
                "{i:04}: {}\t\t{}\t\t{:?}",
                descriptor.name().unwrap_or_default(),
                descriptor.type_descriptor(),
                descriptor.debug_value(),
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.descriptors).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::shared::Shared;

    use super::*;

    #[derive(Debug)]
    struct Clock {
        started: u64,
    }

    #[derive(Debug, Default)]
    struct Model {
        now: Option<Arc<Clock>>,
        version: i32,
    }

    crate::injectable!(Model {
        now: inject,
        version: inject("version"),
    });

    fn hello(model: Shared<Model>, clock: Arc<Clock>, version: String) -> String {
        let model = model.read();
        format!(
            "Model=>{}@{}, Version=>{version}",
            model.version, clock.started
        )
    }

    fn scenario() -> (Registry, Shared<Model>, Arc<Clock>) {
        let model = Shared::new(Model::default());
        let clock = Arc::new(Clock { started: 1_442_880_000 });

        let mut registry = Registry::new();
        registry.register([
            Descriptor::aggregate(model.clone()),
            Descriptor::new(Arc::clone(&clock)),
            Descriptor::named("version", 20_150_922_i32),
            Descriptor::new(1.1_f64),
            Descriptor::named("hello", "Hello, it-package!".to_string()),
        ]);

        (registry, model, clock)
    }

    #[test]
    fn test_lookup_by_type_skips_named() {
        let mut registry = Registry::new();
        registry.register([Descriptor::named("answer", 42_i32)]);
        assert!(registry.lookup_by_type(TypeDescriptor::of::<i32>()).is_none());
        assert_eq!(registry.get_named::<i32>("answer"), Some(42));

        registry.register([Descriptor::new(7_i32)]);
        assert_eq!(registry.get::<i32>(), Some(7));
        assert_eq!(registry.get_named::<i32>("answer"), Some(42));
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = Registry::new();
        registry.register([
            Descriptor::named("name", "first".to_string()),
            Descriptor::new(1_u8),
        ]);
        registry.register([
            Descriptor::named("name", "second".to_string()),
            Descriptor::new(2_u8),
        ]);

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get_named::<String>("name").unwrap(), "first");
        assert_eq!(registry.get::<u8>(), Some(1));
    }

    #[test]
    fn test_lookup_not_found() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup_by_name("missing").is_none());
        assert!(registry.lookup_by_type(TypeDescriptor::of::<u8>()).is_none());
        assert!(registry.get::<String>().is_none());
    }

    #[test]
    fn test_get_named_wrong_type() {
        let mut registry = Registry::new();
        registry.register([Descriptor::named("version", 1_i32)]);
        assert!(registry.lookup_by_name("version").is_some());
        assert!(registry.get_named::<i64>("version").is_none());
    }

    #[test]
    fn test_populate() {
        let (registry, model, clock) = scenario();
        registry.populate().unwrap();

        let model = model.read();
        assert!(Arc::ptr_eq(model.now.as_ref().unwrap(), &clock));
        assert_eq!(model.version, 20_150_922);
    }

    #[test]
    fn test_populate_again_is_noop() {
        let (mut registry, model, _) = scenario();
        registry.populate().unwrap();
        let now = model.read().now.clone().unwrap();

        registry.register([Descriptor::new(Arc::new(Clock { started: 0 }))]);
        registry.populate().unwrap();

        let model = model.read();
        assert!(Arc::ptr_eq(model.now.as_ref().unwrap(), &now));
        assert_eq!(model.version, 20_150_922);
    }

    #[test]
    fn test_populate_keeps_preset_fields() {
        let model = Shared::new(Model {
            version: 7,
            ..Model::default()
        });
        let mut registry = Registry::new();
        registry.register([
            Descriptor::aggregate(model.clone()),
            Descriptor::new(Arc::new(Clock { started: 0 })),
        ]);

        // `version` is not registered, but it is already set.
        registry.populate().unwrap();
        assert_eq!(model.read().version, 7);
        assert!(model.read().now.is_some());
    }

    #[test]
    fn test_populate_missing_version() {
        let model = Shared::new(Model::default());
        let mut registry = Registry::new();
        registry.register([
            Descriptor::aggregate(model.clone()),
            Descriptor::new(Arc::new(Clock { started: 0 })),
        ]);

        let err = registry.populate().unwrap_err();
        assert!(err.is_missing_dependency_named("version"), "{err}");
        assert!(err.to_string().contains("`version`"));
        // `now` comes before `version` and stays assigned.
        assert!(model.read().now.is_some());
    }

    #[test]
    fn test_populate_type_mismatch() {
        let model = Shared::new(Model::default());
        let mut registry = Registry::new();
        registry.register([
            Descriptor::named_aggregate("model", model.clone()),
            Descriptor::new(Arc::new(Clock { started: 0 })),
            Descriptor::named("version", 20_150_922_i64),
        ]);

        let err = registry.populate().unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { expected, found } if expected.is::<i32>() && found.is::<i64>()
        ));
        assert_eq!(model.read().version, 0);
    }

    #[test]
    fn test_aggregate_depends_on_aggregate() {
        #[derive(Debug, Default)]
        struct View {
            model: Option<Shared<Model>>,
        }

        crate::injectable!(View { model: inject });

        let (mut registry, model, _) = scenario();
        let view = Shared::new(View::default());
        registry.register([Descriptor::aggregate(view.clone())]);
        registry.populate().unwrap();

        assert!(view.read().model.as_ref().unwrap().ptr_eq(&model));
    }

    #[test]
    fn test_aggregate_depends_on_itself() {
        #[derive(Debug, Default)]
        struct Looped {
            me: Option<Shared<Looped>>,
        }

        crate::injectable!(Looped { me: inject });

        let looped = Shared::new(Looped::default());
        let mut registry = Registry::new();
        registry.register([Descriptor::aggregate(looped.clone())]);
        registry.populate().unwrap();
        assert!(looped.read().me.as_ref().unwrap().ptr_eq(&looped));

        let table = registry.describe();
        assert!(
            table.contains("Shared(Looped { me: Some(Shared(<cycle>)) })"),
            "{table}"
        );
        assert!(format!("{registry:?}").contains("Shared(<cycle>)"));

        looped.write().me = None;
    }

    #[test]
    fn test_plain_shared_value_is_not_populated() {
        let model = Shared::new(Model::default());
        let mut registry = Registry::builder()
            .with_value(model.clone())
            .with_value(Arc::new(Clock { started: 0 }))
            .with_named("version", 20_150_922_i32)
            .build();
        registry.populate().unwrap();
        assert!(model.read().now.is_none());
        assert_eq!(model.read().version, 0);

        // Registered as an aggregate, the same handle is filled.
        registry.register([Descriptor::aggregate(model.clone())]);
        registry.populate().unwrap();
        assert!(model.read().now.is_some());
        assert_eq!(model.read().version, 20_150_922);
    }

    #[test]
    fn test_invoke() {
        let (registry, _, _) = scenario();
        registry.populate().unwrap();

        let got = registry
            .invoke(hello, &[Erased::new("v20150923".to_string())])
            .unwrap();
        assert_eq!(got, "Model=>20150922@1442880000, Version=>v20150923");
    }

    #[test]
    fn test_invoke_prefers_registry() {
        let mut registry = Registry::new();
        registry.register([Descriptor::new("registry".to_string())]);

        let got = registry
            .invoke(
                |value: String| value,
                &[Erased::new("extra".to_string())],
            )
            .unwrap();
        assert_eq!(got, "registry");
    }

    #[test]
    fn test_invoke_first_matching_extra() {
        let registry = Registry::new();
        let got = registry
            .invoke(
                |value: u8, text: String| (value, text),
                &[
                    Erased::new("first".to_string()),
                    Erased::new(3_u8),
                    Erased::new("second".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(got, (3, "first".to_string()));
    }

    #[test]
    fn test_invoke_missing_argument() {
        let (registry, _, _) = scenario();
        let mut called = false;

        let err = registry
            .invoke(
                |_: Arc<Clock>, _: String| {
                    called = true;
                },
                &[],
            )
            .unwrap_err();
        assert!(err.is_missing_argument_for::<String>(), "{err}");
        assert!(!called);
    }

    #[test]
    fn test_invoke_named_values_are_not_arguments() {
        let (registry, _, _) = scenario();
        // `version` is only registered by name.
        let err = registry.invoke(|version: i32| version, &[]).unwrap_err();
        assert!(err.is_missing_argument_for::<i32>());
    }

    #[test]
    fn test_invoke_passes_output_through() {
        let registry = Registry::new();
        assert_eq!(registry.invoke(|| 42, &[]).unwrap(), 42);

        let got = registry
            .invoke(|| -> std::result::Result<(), String> { Err("boom".into()) }, &[])
            .unwrap();
        assert_eq!(got, Err("boom".to_string()));
    }

    #[test]
    fn test_invoke_dyn() {
        let mut registry = Registry::new();
        registry.register([
            Descriptor::new(Arc::new(Clock { started: 5 })),
            Descriptor::named(
                "greet",
                HandlerObject::new(|clock: Arc<Clock>, name: String| {
                    format!("{name}@{}", clock.started)
                }),
            ),
            Descriptor::named("version", 1_i32),
        ]);

        let handler = registry.lookup_by_name("greet").unwrap();
        let got = registry
            .invoke_dyn(handler, &[Erased::new("bob".to_string())])
            .unwrap();
        assert_eq!(got.clone_as::<String>().unwrap(), "bob@5");

        let err = registry.invoke_dyn(handler, &[]).unwrap_err();
        assert!(err.is_missing_argument_for::<String>());

        let not_handler = registry.lookup_by_name("version").unwrap();
        let err = registry.invoke_dyn(not_handler, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidHandler(ty) if ty.is::<i32>()));
    }

    #[test]
    fn test_describe() {
        let mut registry = Registry::new();
        registry.register([
            Descriptor::new(7_i32),
            Descriptor::named("name", "x".to_string()),
        ]);

        assert_eq!(
            registry.describe(),
            "ID\tNAME\t\tTYPE\t\tVALUE\n\
             0000: \t\ti32\t\t7\n\
             0001: name\t\talloc::string::String\t\t\"x\"\n"
        );
    }

    #[test]
    fn test_describe_after_populate() {
        let (registry, _, _) = scenario();
        registry.populate().unwrap();

        let table = registry.to_string();
        assert_eq!(table.lines().count(), 6);
        assert!(table.contains("version: 20150922"), "{table}");
        assert!(table.contains("0002: version\t\ti32\t\t20150922"), "{table}");
    }

    #[test]
    fn test_reset() {
        let (mut registry, _, _) = scenario();
        assert_eq!(registry.iter().count(), 5);
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.lookup_by_name("version").is_none());
        assert_eq!(registry.describe(), "ID\tNAME\t\tTYPE\t\tVALUE\n");
    }
}
