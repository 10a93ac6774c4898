use crate::{
    container::ContainerInner, Container, DynSvc, InjectError, InjectResult,
    Service, Svc, Token, WeakSvc,
};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
};

/// A read-only handle to a built [`Container`].
///
/// Every registry provides one under its
/// [`locator_token`](crate::Registry::locator_token), and commands receive it
/// when they are executed. The locator doesn't keep its container alive:
/// using it before the container is built or after it is dropped fails with
/// [`InjectError::DetachedLocator`].
///
/// ```
/// use athlete::{deps, InjectResult, Locator, Registry, Svc, Token};
///
/// struct Plugin(u8);
/// struct PluginHost(Svc<Locator>);
///
/// impl PluginHost {
///     fn load(&self, plugin: &Token) -> InjectResult<u8> {
///         Ok(self.0.resolve::<Plugin>(plugin)?.0)
///     }
/// }
///
/// let plugin = Token::class(|| Plugin(3));
/// let host = Token::class(PluginHost);
///
/// let mut registry = Registry::new();
/// let locator = registry.locator_token().clone();
/// registry
///     .inject(&plugin, deps![])?
///     .inject(&host, deps![&locator])?;
///
/// let container = registry.build()?;
/// assert_eq!(3, container.resolve::<PluginHost>(&host)?.load(&plugin)?);
/// # Ok::<(), athlete::InjectError>(())
/// ```
pub struct Locator {
    #[cfg(feature = "arc")]
    container: std::sync::OnceLock<WeakSvc<ContainerInner>>,
    #[cfg(feature = "rc")]
    container: std::cell::OnceCell<WeakSvc<ContainerInner>>,
}

impl Locator {
    pub(crate) fn detached() -> Self {
        Locator {
            container: Default::default(),
        }
    }

    pub(crate) fn attach(&self, container: WeakSvc<ContainerInner>) {
        if self.container.set(container).is_err() {
            tracing::warn!("locator is already attached to a container");
        }
    }

    /// Whether the locator's container is built and still alive.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.container().is_ok()
    }

    /// Gets a handle to the container.
    pub fn container(&self) -> InjectResult<Container> {
        self.container
            .get()
            .and_then(|container| container.upgrade())
            .map(|inner| Container { inner })
            .ok_or(InjectError::DetachedLocator)
    }

    /// Gets an instance of `token`. See [`Container::resolve_instance`].
    pub fn resolve_instance(&self, token: &Token) -> InjectResult<DynSvc> {
        self.container()?.resolve_instance(token)
    }

    /// Gets an instance of `token` as a `T`. See [`Container::resolve`].
    pub fn resolve<T: Service>(&self, token: &Token) -> InjectResult<Svc<T>> {
        self.container()?.resolve(token)
    }

    /// Whether `candidate` can be resolved. A detached locator can't resolve
    /// anything.
    #[must_use]
    pub fn can_be_resolved(&self, candidate: &dyn Any) -> bool {
        self.container()
            .map_or(false, |container| container.can_be_resolved(candidate))
    }
}

impl Debug for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("attached", &self.is_attached())
            .finish()
    }
}
