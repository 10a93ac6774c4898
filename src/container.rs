mod locator;

pub use locator::*;

use crate::{
    downcast_svc, Dependency, DynSvc, Graph, GraphChecker, InjectError,
    InjectResult, Instances, ModuleInstances, Resolver, Service, Svc, Token,
    TokenRole, Validator,
};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
};

pub(crate) struct ContainerInner {
    tokens: Graph,
    modules: Graph,
    module_instances: ModuleInstances,
    instances: Option<Instances>,
    locator: Svc<Locator>,
    validator: Validator,
    checker: GraphChecker,
    resolver: Resolver,
}

/// A read-only view of the graphs held by a [`Container`].
#[derive(Clone, Copy, Debug)]
pub struct ContainerInfo<'a> {
    /// Every registered token, including those exported by modules.
    pub tokens: &'a Graph,
    /// Every registered module.
    pub modules: &'a Graph,
}

/// A built graph of tokens. The set of tokens is fixed; only instances are
/// created on demand.
///
/// Cloning a container clones a handle to the same graph, so singletons are
/// shared between clones.
///
/// ```
/// use athlete::{deps, Registry, Svc, Token};
/// use std::sync::Mutex;
///
/// struct Counter(Mutex<u32>);
///
/// let counter = Token::class(|| Counter(Mutex::new(0)));
/// let mut registry = Registry::new();
/// registry.inject(&counter, deps![])?;
///
/// let container = registry.build()?;
/// let first = container.resolve::<Counter>(&counter)?;
/// let second = container.clone().resolve::<Counter>(&counter)?;
/// assert!(Svc::ptr_eq(&first, &second));
/// # Ok::<(), athlete::InjectError>(())
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Svc<ContainerInner>,
}

impl Container {
    pub(crate) fn new(
        tokens: Graph,
        modules: Graph,
        module_instances: ModuleInstances,
        instances: Option<Instances>,
        locator: Svc<Locator>,
    ) -> Self {
        let inner = Svc::new(ContainerInner {
            tokens,
            modules,
            module_instances,
            instances,
            locator,
            validator: Validator,
            checker: GraphChecker::default(),
            resolver: Resolver::default(),
        });
        inner.locator.attach(Svc::downgrade(&inner));

        Container { inner }
    }

    /// Gets an instance of `token`. Singletons return the same instance on
    /// every call, factories a new one.
    pub fn resolve_instance(&self, token: &Token) -> InjectResult<DynSvc> {
        let inner = &*self.inner;
        match &inner.instances {
            Some(instances) => inner.resolver.resolve_instance(token, instances),
            None => inner
                .tokens
                .get(token)
                .ok_or_else(|| InjectError::UnresolvableToken {
                    token: token.clone(),
                })?
                .instantiate(&inner.tokens),
        }
    }

    /// Gets an instance of `token` as a `T`.
    pub fn resolve<T: Service>(&self, token: &Token) -> InjectResult<Svc<T>> {
        let instance = self.resolve_instance(token)?;
        downcast_svc(instance).map_err(|_| InjectError::TypeMismatch {
            token: token.clone(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Whether `candidate` is a token registered in this container. Anything
    /// that isn't a [`Token`] can't be resolved.
    #[must_use]
    pub fn can_be_resolved(&self, candidate: &dyn Any) -> bool {
        candidate
            .downcast_ref::<Token>()
            .map_or(false, |token| self.inner.tokens.contains(token))
    }

    /// Constructs the command `token` and executes it. Dependencies naming a
    /// module receive its instance, other registered tokens are forwarded as
    /// [`Token`] values, and literal values are passed verbatim. Commands are
    /// never reused.
    ///
    /// Returns the container so that commands can be chained.
    pub fn execute_command(
        &self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&Self> {
        let inner = &*self.inner;
        inner.validator.ensure_role(token, TokenRole::Command)?;
        inner
            .validator
            .ensure_dependencies(token, &dependencies, true)?;

        let missing = inner.checker.found_unknown_dependency(
            token,
            &dependencies,
            &[&inner.modules, &inner.tokens],
            |_| true,
        );
        if let Some(missing) = missing {
            return Err(missing.into_error());
        }

        tracing::debug!(command = %token, "executing command");
        let command = inner.resolver.resolve_command(
            token,
            &dependencies,
            &inner.module_instances,
        )?;
        command.execute(&inner.locator)?;

        Ok(self)
    }

    /// The container's [`Locator`].
    #[must_use]
    pub fn locator(&self) -> Svc<Locator> {
        self.inner.locator.clone()
    }

    /// A read-only view of the registered tokens and modules.
    #[must_use]
    pub fn get_info(&self) -> ContainerInfo<'_> {
        ContainerInfo {
            tokens: &self.inner.tokens,
            modules: &self.inner.modules,
        }
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("tokens", &self.inner.tokens)
            .field("modules", &self.inner.modules)
            .field("eager", &self.inner.instances.is_some())
            .finish()
    }
}
