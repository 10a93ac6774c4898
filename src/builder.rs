mod options;

pub use options::*;

use crate::{
    extension::RESERVED_EXTENSION_NAMES, Container, Dependency, Graph,
    GraphChecker, InjectError, InjectResult, InjectorExtension, Injector,
    Lifetime, Locator, Provider, Resolver, Svc, Token, TokenRole, Validator,
};
use indexmap::IndexMap;

/// Collects token registrations and builds them into a [`Container`].
///
/// Every registration is validated immediately. Nothing is constructed until
/// [`build`](Registry::build) runs, which consumes the registry.
///
/// ```
/// use athlete::{deps, Dependency, Registry, Svc, Token};
///
/// struct Greeter {
///     greeting: Svc<String>,
/// }
///
/// let greeter = Token::class(|greeting: Svc<String>| Greeter { greeting });
///
/// let mut registry = Registry::new();
/// registry.inject(&greeter, deps![Dependency::value("hello".to_string())])?;
/// let container = registry.build()?;
///
/// assert_eq!("hello", *container.resolve::<Greeter>(&greeter)?.greeting);
/// # Ok::<(), athlete::InjectError>(())
/// ```
pub struct Registry {
    tokens: Graph,
    modules: Graph,
    extensions: IndexMap<String, Svc<dyn InjectorExtension>>,
    locator: Svc<Locator>,
    locator_token: Token,
    options: BuildOptions,
    validator: Validator,
    checker: GraphChecker,
    resolver: Resolver,
}

impl Registry {
    /// Creates a registry with default [`BuildOptions`]. Only the
    /// [`Locator`] token is registered.
    #[must_use]
    pub fn new() -> Self {
        Registry::with_options(BuildOptions::default())
    }

    /// Creates a registry which builds its container with `options`.
    #[must_use]
    pub fn with_options(options: BuildOptions) -> Self {
        let locator = Svc::new(Locator::detached());
        let locator_token =
            Token::function(|locator: Svc<Locator>| locator).with_name("Locator");

        let mut tokens = Graph::new();
        tokens.insert(Provider::singleton(
            locator_token.clone(),
            vec![Dependency::shared(locator.clone())],
        ));

        Registry {
            tokens,
            modules: Graph::new(),
            extensions: IndexMap::new(),
            locator,
            locator_token,
            options,
            validator: Validator,
            checker: GraphChecker::default(),
            resolver: Resolver::default(),
        }
    }

    /// The options the container will be built with.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Changes the options the container will be built with.
    pub fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    /// The token resolving to the container's [`Locator`]. Tokens can depend
    /// on it to look up other tokens after the container is built.
    #[must_use]
    pub fn locator_token(&self) -> &Token {
        &self.locator_token
    }

    /// Registers a singleton token. Its instance is created once and shared
    /// by every dependent and every resolution.
    ///
    /// Registering a token again replaces its provider.
    pub fn inject(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&mut Self> {
        self.register(token, dependencies, Lifetime::Singleton)
    }

    /// Registers a factory token. A new instance is created for every
    /// dependent and every resolution.
    ///
    /// Registering a token again replaces its provider.
    pub fn inject_factory(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&mut Self> {
        self.register(token, dependencies, Lifetime::Factory)
    }

    /// Registers a module. Its dependencies may only be tokens: module tokens
    /// are received as module instances and other tokens are forwarded as
    /// [`Token`] values.
    pub fn inject_module(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&mut Self> {
        self.validator.ensure_role(token, TokenRole::Module)?;
        self.validator
            .ensure_dependencies(token, &dependencies, false)?;

        tracing::trace!(module = %token, "registering module");
        let replaced = self
            .modules
            .insert(Provider::module(token.clone(), dependencies));
        if replaced.is_some() {
            tracing::warn!(module = %token, "module was already registered, replacing it");
        }

        Ok(self)
    }

    fn register(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> InjectResult<&mut Self> {
        self.validator.ensure_role(token, TokenRole::Service)?;
        self.validator.ensure_dependencies(token, &dependencies, true)?;

        tracing::trace!(%token, ?lifetime, "registering token");
        let provider = match lifetime {
            Lifetime::Singleton => Provider::singleton(token.clone(), dependencies),
            Lifetime::Factory => Provider::factory(token.clone(), dependencies),
        };
        if self.tokens.insert(provider).is_some() {
            tracing::warn!(%token, "token was already registered, replacing its provider");
        }

        Ok(self)
    }

    /// Registers an extension, which can then be applied by name.
    ///
    /// Names must be non-empty, unique, and different from the registry's
    /// own registration methods.
    pub fn register_extension<E>(&mut self, extension: E) -> InjectResult<&mut Self>
    where
        E: InjectorExtension,
    {
        let name = extension.name().to_owned();
        let reason = if name.is_empty() {
            Some("extension names cannot be empty")
        } else if RESERVED_EXTENSION_NAMES.contains(&name.as_str()) {
            Some("the name is reserved by the registry")
        } else if self.extensions.contains_key(&name) {
            Some("an extension with this name is already registered")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(InjectError::InvalidInjectorExtension { name, reason });
        }

        tracing::debug!(extension = %name, "registering extension");
        self.extensions.insert(name, Svc::new(extension));
        Ok(self)
    }

    /// Applies the extension registered under `name`.
    pub fn extend(&mut self, name: &str) -> InjectResult<&mut Self> {
        let extension = self.extensions.get(name).cloned().ok_or_else(|| {
            InjectError::InvalidInjectorExtension {
                name: name.to_owned(),
                reason: "no extension is registered under this name",
            }
        })?;

        tracing::debug!(extension = %name, "applying extension");
        extension.extend(&mut Injector::new(self))?;
        Ok(self)
    }

    /// Builds the container.
    ///
    /// Modules are validated and constructed first, then each one exports
    /// its tokens in dependency order. The complete token graph is then
    /// checked for unknown tokens and cycles before the container is
    /// returned. With [`Activation::Eager`] every singleton is also
    /// constructed here.
    pub fn build(mut self) -> InjectResult<Container> {
        let modules = std::mem::take(&mut self.modules);

        tracing::debug!(modules = modules.len(), "resolving modules");
        let missing = self
            .checker
            .found_first_unknown_token_matching(&modules, |token| {
                token.role() == TokenRole::Module
            });
        if let Some(missing) = missing {
            return Err(missing.into_error());
        }
        let module_instances = self.resolver.resolve_modules(&modules)?;

        for (token, instance) in &module_instances {
            let module = token.as_module(instance.clone()).ok_or_else(|| {
                InjectError::InvalidToken {
                    token: token.clone(),
                    expected: TokenRole::Module,
                }
            })?;

            tracing::debug!(module = %token, "exporting module");
            module.export(&mut Injector::new(&mut self))?;
        }

        tracing::debug!(tokens = self.tokens.len(), "validating token graph");
        if let Some(missing) = self.checker.found_first_unknown_token(&self.tokens) {
            return Err(missing.into_error());
        }
        // Tokens forwarded to modules must have been exported by now
        let missing = modules.iter().find_map(|(module, provider)| {
            self.checker.found_unknown_dependency(
                module,
                provider.dependencies(),
                &[&modules, &self.tokens],
                |_| true,
            )
        });
        if let Some(missing) = missing {
            return Err(missing.into_error());
        }
        if let Some(cycle) = self.checker.found_cyclic_dependencies(&self.tokens) {
            return Err(InjectError::CyclicDependency { cycle });
        }

        let instances = match self.options.activation {
            Activation::Lazy => None,
            Activation::Eager => {
                tracing::debug!("constructing singletons eagerly");
                Some(self.resolver.resolve_instances(&self.tokens)?)
            }
        };

        Ok(Container::new(
            self.tokens,
            modules,
            module_instances,
            instances,
            self.locator,
        ))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
