use crate::{Dependency, InjectResult, Locator, Registry, Service, Token};

/// A group of registrations. A module is constructed while the container is
/// being built, after the modules it depends on, and then exports its tokens
/// through an [`Injector`].
///
/// Dependencies of a module are either other modules, received as their
/// instances, or plain tokens, received as [`Token`] values. Forwarded tokens
/// let a module register tokens that it does not create itself.
///
/// ```
/// use athlete::{deps, InjectResult, Injector, Module, Registry, Svc, Token};
///
/// struct Database;
/// struct UserStore(Svc<Database>);
///
/// struct StorageModule {
///     database: Token,
///     users: Token,
/// }
///
/// impl Module for StorageModule {
///     fn export(&self, injector: &mut Injector<'_>) -> InjectResult<()> {
///         injector
///             .inject(&self.database, deps![])?
///             .inject(&self.users, deps![&self.database])?;
///         Ok(())
///     }
/// }
///
/// let database = Token::class(|| Database);
/// let users = Token::class(UserStore);
/// let storage = Token::module(|database: Token, users: Token| StorageModule { database, users });
///
/// let mut registry = Registry::new();
/// registry.inject_module(&storage, deps![&database, &users])?;
/// let container = registry.build()?;
///
/// let store = container.resolve::<UserStore>(&users)?;
/// let database = container.resolve::<Database>(&database)?;
/// assert!(Svc::ptr_eq(&database, &store.0));
/// # Ok::<(), athlete::InjectError>(())
/// ```
pub trait Module: Service {
    /// Registers this module's tokens.
    fn export(&self, injector: &mut Injector<'_>) -> InjectResult<()>;
}

/// A one-shot unit of work, constructed from module instances and executed
/// against a [`Locator`] each time it is requested.
pub trait Command: Service {
    /// Runs the command.
    fn execute(&self, locator: &Locator) -> InjectResult<()>;
}

/// The registration surface handed to modules and extensions. It can add
/// tokens to the registry, but cannot build the container.
pub struct Injector<'a> {
    registry: &'a mut Registry,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(registry: &'a mut Registry) -> Self {
        Injector { registry }
    }

    /// Registers a singleton token. See [`Registry::inject`].
    pub fn inject(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&mut Self> {
        self.registry.inject(token, dependencies)?;
        Ok(self)
    }

    /// Registers a factory token. See [`Registry::inject_factory`].
    pub fn inject_factory(
        &mut self,
        token: &Token,
        dependencies: Vec<Dependency>,
    ) -> InjectResult<&mut Self> {
        self.registry.inject_factory(token, dependencies)?;
        Ok(self)
    }

    /// Applies a registered extension. See [`Registry::extend`].
    pub fn extend(&mut self, name: &str) -> InjectResult<&mut Self> {
        self.registry.extend(name)?;
        Ok(self)
    }

    /// The token of the container's [`Locator`].
    #[must_use]
    pub fn locator_token(&self) -> &Token {
        self.registry.locator_token()
    }
}
