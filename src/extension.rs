use crate::{InjectResult, Injector, Service};
use std::borrow::Cow;

/// Names of the registry's own registration methods. Extensions can't use
/// them.
pub(crate) const RESERVED_EXTENSION_NAMES: &[&str] =
    &["inject", "inject_factory", "inject_module", "build"];

/// A named registration hook. Extensions are registered once on a
/// [`Registry`](crate::Registry) and can then be applied by name, from the
/// registry itself or from a module's [`Injector`].
pub trait InjectorExtension: Service {
    /// The name the extension is applied by.
    fn name(&self) -> &str;

    /// Registers tokens through `injector`.
    fn extend(&self, injector: &mut Injector<'_>) -> InjectResult<()>;
}

/// An [`InjectorExtension`] backed by a closure. Created by [`extension`].
pub struct FnExtension<F> {
    name: Cow<'static, str>,
    func: F,
}

impl<F> InjectorExtension for FnExtension<F>
where
    F: Service + Fn(&mut Injector<'_>) -> InjectResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extend(&self, injector: &mut Injector<'_>) -> InjectResult<()> {
        (self.func)(injector)
    }
}

/// Creates an extension from a name and a closure.
///
/// ```
/// use athlete::{deps, extension, Registry, Token};
///
/// struct Metrics;
///
/// let metrics = Token::class(|| Metrics);
/// let metrics_token = metrics.clone();
///
/// let mut registry = Registry::new();
/// registry.register_extension(extension("metrics", move |injector| {
///     injector.inject(&metrics_token, deps![])?;
///     Ok(())
/// }))?;
/// registry.extend("metrics")?;
///
/// let container = registry.build()?;
/// assert!(container.can_be_resolved(&metrics));
/// # Ok::<(), athlete::InjectError>(())
/// ```
pub fn extension<F>(name: impl Into<Cow<'static, str>>, func: F) -> FnExtension<F>
where
    F: Service + Fn(&mut Injector<'_>) -> InjectResult<()>,
{
    FnExtension {
        name: name.into(),
        func,
    }
}
