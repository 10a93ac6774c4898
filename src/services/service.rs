#![allow(clippy::used_underscore_binding)]

use crate::{Token, TokenRole};
use derive_more::{Display, Error};
use std::{
    fmt::{Display, Formatter},
    ops::Deref,
};

#[cfg(feature = "rc")]
macro_rules! feature_unique {
    ({ $($common:tt)* }, { $($rc:tt)* }, { $($_arc:tt)* }) => {
        $($common)*
        $($rc)*
    };
}

#[cfg(feature = "arc")]
macro_rules! feature_unique {
    ({ $($common:tt)* }, { $($_rc:tt)* }, { $($arc:tt)* }) => {
        $($common)*
        $($arc)*
    };
}

feature_unique!(
    {
        /// A reference-counted pointer holding a service. The pointer type is
        /// determined by the feature flags passed to this crate.
        ///
        /// - **rc**: Pointer type is [`Rc<T>`](std::rc::Rc)
        /// - **arc**: Pointer type is [`Arc<T>`](std::sync::Arc) (default)
    },
    {
        #[cfg_attr(
            not(doc),
            doc = "",
            doc = "The current pointer type is [`Rc<T>`](std::rc::Rc)."
        )]
        pub type Svc<T> = std::rc::Rc<T>;
        pub(crate) type WeakSvc<T> = std::rc::Weak<T>;
    },
    {
        #[cfg_attr(
            not(doc),
            doc = "",
            doc = "The current pointer type is [`Arc<T>`](std::sync::Arc)."
        )]
        pub type Svc<T> = std::sync::Arc<T>;
        pub(crate) type WeakSvc<T> = std::sync::Weak<T>;
    }
);

/// A service pointer holding an instance of `dyn Service`. Every instance the
/// container constructs is stored and passed around behind one of these.
pub type DynSvc = Svc<dyn Service>;

feature_unique!(
    {
        /// Implemented automatically on types that are capable of being a
        /// service.
    },
    {
        pub trait Service: downcast_rs::Downcast {}
        impl<T: ?Sized + downcast_rs::Downcast> Service for T {}
    },
    {
        pub trait Service: downcast_rs::DowncastSync {}
        impl<T: ?Sized + downcast_rs::DowncastSync> Service for T {}
    }
);

#[cfg(feature = "arc")]
downcast_rs::impl_downcast!(sync Service);

#[cfg(feature = "rc")]
downcast_rs::impl_downcast!(Service);

/// Converts an erased service pointer back into a typed one. On failure the
/// original pointer is handed back.
pub(crate) fn downcast_svc<T: Service>(service: DynSvc) -> Result<Svc<T>, DynSvc> {
    #[cfg(feature = "arc")]
    let result = service.downcast_arc::<T>();
    #[cfg(feature = "rc")]
    let result = service.downcast_rc::<T>();
    result
}

/// A result from attempting to register, validate or resolve tokens.
pub type InjectResult<T> = Result<T, InjectError>;

/// An ordered chain of tokens, used to report dependency cycles. The first
/// and last entries of a cycle are the same token.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TokenPath(Vec<Token>);

impl TokenPath {
    /// Creates a path from its tokens.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenPath(tokens)
    }

    /// The display names of each token along the path.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Token::name).collect()
    }
}

impl Deref for TokenPath {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for TokenPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// An error that has occurred while building the graph or resolving a token.
/// All of these are structural errors: retrying the same operation always
/// fails the same way.
#[derive(Debug, Display, Error)]
#[display(fmt = "an error occurred during injection: {}")]
#[non_exhaustive]
pub enum InjectError {
    /// A registration target does not have the role the registration needs.
    #[display(fmt = "[ {} ] is not a {} token", token, expected)]
    InvalidToken {
        /// The token that was registered.
        token: Token,
        /// The role the registration required.
        expected: TokenRole,
    },

    /// An entry in a dependency list can't be used by the token declaring it.
    #[display(
        fmt = "dependency #{} of [ {} ] is invalid: {}",
        position,
        token,
        reason
    )]
    InvalidDependency {
        /// The token declaring the dependency.
        token: Token,
        /// The position of the dependency in the list.
        position: usize,
        /// Why the dependency was rejected.
        reason: &'static str,
    },

    /// A dependency list does not fit the token's constructor.
    #[display(
        fmt = "wrong dependencies for [ {} ]: its constructor takes {} arguments but {} were declared",
        token,
        expected,
        found
    )]
    InvalidDependencyList {
        /// The token declaring the dependencies.
        token: Token,
        /// The arity of the token's constructor.
        expected: usize,
        /// The number of dependencies that were declared.
        found: usize,
    },

    /// A declared dependency names a token that was never registered.
    #[display(fmt = "[ {} ] is not registered (required by [ {} ])", token, dependent)]
    UnknownToken {
        /// The missing token.
        token: Token,
        /// The first token found declaring it as a dependency.
        dependent: Token,
    },

    /// The dependency relation contains a cycle.
    #[display(fmt = "cyclic dependency detected: [ {} ]", cycle)]
    CyclicDependency {
        /// The cycle, starting and ending with the same token.
        cycle: TokenPath,
    },

    /// The requested token is not part of the built graph.
    #[display(fmt = "dependency not found for token: [ {} ]", token)]
    UnresolvableToken {
        /// The token that was requested.
        token: Token,
    },

    /// An injector extension could not be registered or applied.
    #[display(fmt = "invalid injector extension [ {} ]: {}", name, reason)]
    InvalidInjectorExtension {
        /// The name of the extension.
        name: String,
        /// Why the extension was rejected.
        reason: &'static str,
    },

    /// A constructor received an argument of the wrong type.
    #[display(
        fmt = "argument #{} of [ {} ] should be a {}",
        position,
        token,
        expected
    )]
    InvalidArgument {
        /// The token being constructed.
        token: Token,
        /// The position of the argument.
        position: usize,
        /// The type the constructor expected.
        expected: &'static str,
    },

    /// A resolved instance is not of the requested type.
    #[display(fmt = "[ {} ] does not resolve to a {}", token, expected)]
    TypeMismatch {
        /// The token that was resolved.
        token: Token,
        /// The type that was requested.
        expected: &'static str,
    },

    /// A locator was used while no container was attached to it.
    #[display(fmt = "the locator is not attached to a live container")]
    DetachedLocator,

    /// An unexpected error has occurred. This is usually caused by a bug in
    /// the library itself.
    #[display(fmt = "an unexpected error occurred (please report this): {}", _0)]
    InternalError(#[error(ignore)] String),
}
