use crate::{DynSvc, Service, Svc, Token};
use std::fmt::{Debug, Formatter};

/// A positional input to a token's construction.
#[derive(Clone)]
pub enum Dependency {
    /// Another token, resolved from the graph before the dependent is built.
    Token(Token),
    /// A literal value passed to the constructor verbatim. It is never looked
    /// up in the graph.
    Value(DynSvc),
}

impl Dependency {
    /// Wraps a literal value. Every construction receives the same pointer to
    /// it.
    #[must_use]
    pub fn value<T: Service>(value: T) -> Self {
        Dependency::Value(Svc::new(value))
    }

    /// Wraps an existing service pointer so that exactly this pointer reaches
    /// the constructor.
    #[must_use]
    pub fn shared<T: Service>(value: Svc<T>) -> Self {
        Dependency::Value(value)
    }

    /// Gets the token this dependency refers to, if it is not a literal.
    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Dependency::Token(token) => Some(token),
            Dependency::Value(_) => None,
        }
    }

    /// Whether this is a literal value.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Dependency::Value(_))
    }
}

impl From<Token> for Dependency {
    fn from(token: Token) -> Self {
        Dependency::Token(token)
    }
}

impl From<&Token> for Dependency {
    fn from(token: &Token) -> Self {
        Dependency::Token(token.clone())
    }
}

impl Debug for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::Token(token) => {
                f.debug_tuple("Token").field(&token.name()).finish()
            }
            Dependency::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// Builds a list of [`Dependency`] values from tokens (owned or borrowed) and
/// dependencies.
///
/// ## Example
///
/// ```
/// use athlete::{deps, Dependency, Token};
///
/// struct Logger;
///
/// let logger = Token::class(|| Logger);
/// let dependencies = deps![&logger, Dependency::value("smtp://localhost".to_string())];
///
/// assert_eq!(2, dependencies.len());
/// assert_eq!(Some(&logger), dependencies[0].as_token());
/// assert!(dependencies[1].is_value());
/// ```
#[macro_export]
macro_rules! deps {
    ($($dependency:expr),* $(,)?) => {
        ::std::vec![$(<$crate::Dependency as ::std::convert::From<_>>::from($dependency)),*]
    };
}
