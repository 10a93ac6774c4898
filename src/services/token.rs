use crate::{
    downcast_svc, Command, Constructor, DynSvc, InjectResult, Module, Service,
    Svc,
};
use derive_more::Display;
use std::{
    borrow::Cow,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Anonymous callables are named after their truncated type name.
const MAX_NAME_LENGTH: usize = 20;

/// How a token turns its constructor's output into an instance.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TokenKind {
    /// The output is a new value, moved into a fresh service pointer.
    ConstructorLike,
    /// The callable returns a service pointer itself, which is used as-is.
    PlainCallable,
}

/// What a token can be registered as.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display)]
pub enum TokenRole {
    /// An ordinary token, registered as a singleton or a factory.
    #[display(fmt = "service")]
    Service,
    /// A module, which exports further tokens while the container is built.
    #[display(fmt = "module")]
    Module,
    /// A command, executed once per request against a built container.
    #[display(fmt = "command")]
    Command,
}

#[derive(Clone, Copy)]
enum Role {
    Service,
    Module(fn(DynSvc) -> Option<Svc<dyn Module>>),
    Command(fn(DynSvc) -> Option<Svc<dyn Command>>),
}

/// Type-erased constructor stored inside a token.
trait Construct: Service {
    fn arity(&self) -> usize;

    fn construct(
        &self,
        token: &Token,
        arguments: Vec<DynSvc>,
    ) -> InjectResult<DynSvc>;
}

struct NewInstance<D, F> {
    constructor: F,
    marker: PhantomData<fn(D)>,
}

impl<D, F> Construct for NewInstance<D, F>
where
    D: 'static,
    F: Service + Constructor<D>,
    F::Output: Service,
{
    fn arity(&self) -> usize {
        Constructor::<D>::arity(&self.constructor)
    }

    fn construct(
        &self,
        token: &Token,
        arguments: Vec<DynSvc>,
    ) -> InjectResult<DynSvc> {
        let instance =
            Constructor::<D>::construct(&self.constructor, token, arguments)?;
        Ok(Svc::new(instance) as DynSvc)
    }
}

struct CallResult<D, R, F> {
    callable: F,
    marker: PhantomData<fn(D) -> R>,
}

impl<D, R, F> Construct for CallResult<D, R, F>
where
    D: 'static,
    R: Service,
    F: Service + Constructor<D, Output = Svc<R>>,
{
    fn arity(&self) -> usize {
        Constructor::<D>::arity(&self.callable)
    }

    fn construct(
        &self,
        token: &Token,
        arguments: Vec<DynSvc>,
    ) -> InjectResult<DynSvc> {
        let instance =
            Constructor::<D>::construct(&self.callable, token, arguments)?;
        Ok(instance as DynSvc)
    }
}

fn module_view<M: Module>(instance: DynSvc) -> Option<Svc<dyn Module>> {
    downcast_svc::<M>(instance)
        .ok()
        .map(|module| module as Svc<dyn Module>)
}

fn command_view<C: Command>(instance: DynSvc) -> Option<Svc<dyn Command>> {
    downcast_svc::<C>(instance)
        .ok()
        .map(|command| command as Svc<dyn Command>)
}

fn display_name(type_name: &'static str) -> Cow<'static, str> {
    let path = type_name.split('<').next().unwrap_or(type_name);
    match path.rsplit("::").next() {
        Some(name) if !name.is_empty() && !name.starts_with('{') => {
            Cow::Borrowed(name)
        }
        _ => Cow::Owned(type_name.chars().take(MAX_NAME_LENGTH).collect()),
    }
}

struct TokenInner {
    name: Cow<'static, str>,
    kind: TokenKind,
    role: Role,
    constructor: Box<dyn Construct>,
}

/// A constructible unit that can be registered in a [`Registry`] and used as
/// a key in its graphs.
///
/// Tokens are compared by identity: cloning a token clones a handle to the
/// same unit, while two tokens created from the same constructor are
/// different tokens.
///
/// ```
/// use athlete::{Svc, Token, TokenKind};
///
/// struct Config {
///     verbose: bool,
/// }
///
/// let config = Token::class(|| Config { verbose: true });
/// assert_eq!("Config", config.name());
/// assert_eq!(TokenKind::ConstructorLike, config.kind());
/// assert_eq!(config, config.clone());
/// assert_ne!(config, Token::class(|| Config { verbose: false }));
/// ```
///
/// [`Registry`]: crate::Registry
#[derive(Clone)]
pub struct Token {
    inner: Svc<TokenInner>,
}

impl Token {
    fn new(
        name: Cow<'static, str>,
        kind: TokenKind,
        role: Role,
        constructor: Box<dyn Construct>,
    ) -> Self {
        Token {
            inner: Svc::new(TokenInner {
                name,
                kind,
                role,
                constructor,
            }),
        }
    }

    /// Creates a constructor-like service token. Each construction moves the
    /// constructor's output into a new service pointer.
    #[must_use]
    pub fn class<D, F>(constructor: F) -> Self
    where
        D: 'static,
        F: Service + Constructor<D>,
        F::Output: Service,
    {
        Token::new(
            display_name(std::any::type_name::<F::Output>()),
            TokenKind::ConstructorLike,
            Role::Service,
            Box::new(NewInstance {
                constructor,
                marker: PhantomData,
            }),
        )
    }

    /// Creates a plain callable service token. The callable returns a service
    /// pointer which becomes the instance unchanged, so it may hand out an
    /// existing instance (for example one of its own arguments).
    ///
    /// ```
    /// use athlete::{deps, Dependency, Registry, Svc, Token, TokenKind};
    ///
    /// fn forward(value: Svc<u32>) -> Svc<u32> {
    ///     value
    /// }
    ///
    /// let shared = Svc::new(7u32);
    /// let token = Token::function(forward);
    /// assert_eq!("forward", token.name());
    /// assert_eq!(TokenKind::PlainCallable, token.kind());
    ///
    /// let mut registry = Registry::new();
    /// registry.inject(&token, deps![Dependency::shared(shared.clone())])?;
    /// let container = registry.build()?;
    ///
    /// let resolved = container.resolve::<u32>(&token)?;
    /// assert!(Svc::ptr_eq(&shared, &resolved));
    /// # Ok::<(), athlete::InjectError>(())
    /// ```
    #[must_use]
    pub fn function<D, R, F>(callable: F) -> Self
    where
        D: 'static,
        R: Service,
        F: Service + Constructor<D, Output = Svc<R>>,
    {
        Token::new(
            display_name(std::any::type_name::<F>()),
            TokenKind::PlainCallable,
            Role::Service,
            Box::new(CallResult {
                callable,
                marker: PhantomData,
            }),
        )
    }

    /// Creates a module token. See [`Module`] for what modules can do.
    #[must_use]
    pub fn module<D, F>(constructor: F) -> Self
    where
        D: 'static,
        F: Service + Constructor<D>,
        F::Output: Module,
    {
        Token::new(
            display_name(std::any::type_name::<F::Output>()),
            TokenKind::ConstructorLike,
            Role::Module(module_view::<F::Output>),
            Box::new(NewInstance {
                constructor,
                marker: PhantomData,
            }),
        )
    }

    /// Creates a command token. See [`Command`] for how commands run.
    #[must_use]
    pub fn command<D, F>(constructor: F) -> Self
    where
        D: 'static,
        F: Service + Constructor<D>,
        F::Output: Command,
    {
        Token::new(
            display_name(std::any::type_name::<F::Output>()),
            TokenKind::ConstructorLike,
            Role::Command(command_view::<F::Output>),
            Box::new(NewInstance {
                constructor,
                marker: PhantomData,
            }),
        )
    }

    /// Replaces the display name of a freshly created token. Names can only
    /// be changed before the token has been cloned.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        if let Some(inner) = Svc::get_mut(&mut self.inner) {
            inner.name = name;
            return self;
        }

        tracing::warn!(
            token = %self,
            requested = %name,
            "token is already shared, keeping its original name"
        );
        self
    }

    /// The name used for this token in errors and logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// How this token's constructor produces instances.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.inner.kind
    }

    /// What this token can be registered as.
    #[must_use]
    pub fn role(&self) -> TokenRole {
        match self.inner.role {
            Role::Service => TokenRole::Service,
            Role::Module(_) => TokenRole::Module,
            Role::Command(_) => TokenRole::Command,
        }
    }

    /// The number of dependencies this token's constructor takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inner.constructor.arity()
    }

    /// Constructs a new instance from already collected arguments.
    pub(crate) fn construct(
        &self,
        arguments: Vec<DynSvc>,
    ) -> InjectResult<DynSvc> {
        tracing::trace!(token = %self, "constructing instance");
        self.inner.constructor.construct(self, arguments)
    }

    pub(crate) fn as_module(
        &self,
        instance: DynSvc,
    ) -> Option<Svc<dyn Module>> {
        match self.inner.role {
            Role::Module(view) => view(instance),
            _ => None,
        }
    }

    pub(crate) fn as_command(
        &self,
        instance: DynSvc,
    ) -> Option<Svc<dyn Command>> {
        match self.inner.role {
            Role::Command(view) => view(instance),
            _ => None,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        Svc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Svc::as_ptr(&self.inner).hash(state);
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("role", &self.role())
            .finish()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    fn make_widget() -> Svc<Widget> {
        Svc::new(Widget)
    }

    #[test]
    fn names_come_from_the_produced_type() {
        assert_eq!("Widget", Token::class(|| Widget).name());
        assert_eq!("Vec", Token::class(Vec::<u8>::new).name());
    }

    #[test]
    fn plain_callables_are_named_after_the_function() {
        assert_eq!("make_widget", Token::function(make_widget).name());
    }

    #[test]
    fn anonymous_callables_fall_back_to_a_truncated_type_name() {
        let token = Token::function(|| Svc::new(Widget));
        assert_eq!(MAX_NAME_LENGTH, token.name().chars().count());
        assert!(token.name().starts_with("athlete::"));
    }

    #[test]
    fn with_name_renames_fresh_tokens_only() {
        let token = Token::class(|| Widget).with_name("Gadget");
        assert_eq!("Gadget", token.name());

        let shared = token.clone();
        let renamed = token.with_name("Gizmo");
        assert_eq!("Gadget", renamed.name());
        assert_eq!(shared, renamed);
    }

    #[test]
    fn identity_is_by_handle() {
        let first = Token::class(|| Widget);
        let second = Token::class(|| Widget);
        assert_eq!(first, first.clone());
        assert_ne!(first, second);

        let mut set = std::collections::HashSet::new();
        set.insert(first.clone());
        assert!(set.contains(&first));
        assert!(!set.contains(&second));
    }

    #[test]
    fn roles_follow_the_constructor_used() {
        assert_eq!(TokenRole::Service, Token::class(|| Widget).role());
        assert_eq!(TokenRole::Service, Token::function(make_widget).role());
        assert_eq!(0, Token::class(|| Widget).arity());
    }
}
