mod checker;
mod topology;

pub use checker::*;
pub use topology::*;

use crate::{Dependency, Provider, Token};
use indexmap::{map::Iter, IndexMap};
use std::fmt::{Debug, Formatter};

/// A mapping from each registered token to its provider. Tokens keep the
/// position of their first registration, which makes every traversal and
/// every reported error deterministic.
#[derive(Default)]
pub struct Graph {
    providers: IndexMap<Token, Provider>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Graph::default()
    }

    /// Whether `token` has a provider in this graph.
    #[must_use]
    pub fn contains(&self, token: &Token) -> bool {
        self.providers.contains_key(token)
    }

    /// Gets the provider registered for `token`.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<&Provider> {
        self.providers.get(token)
    }

    /// Gets the declared dependencies of `token`.
    #[must_use]
    pub fn dependencies_of(&self, token: &Token) -> Option<&[Dependency]> {
        self.get(token).map(Provider::dependencies)
    }

    /// Iterates over the registered tokens in registration order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.providers.keys()
    }

    /// Iterates over every token and its provider in registration order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, Token, Provider> {
        self.providers.iter()
    }

    /// The number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no token has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registers a provider under its token. A previous provider for the same
    /// token is replaced in place and returned.
    pub(crate) fn insert(&mut self, provider: Provider) -> Option<Provider> {
        self.providers.insert(provider.token().clone(), provider)
    }
}

impl<'g> IntoIterator for &'g Graph {
    type Item = (&'g Token, &'g Provider);
    type IntoIter = Iter<'g, Token, Provider>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.values()).finish()
    }
}
