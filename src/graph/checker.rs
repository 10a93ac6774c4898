use crate::{Dependency, Graph, InjectError, Token, TokenPath, Topology};

/// A declared dependency on a token that has no provider.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MissingDependency<'g> {
    /// The token that was never registered.
    pub token: &'g Token,
    /// The token declaring the dependency.
    pub dependent: &'g Token,
}

impl MissingDependency<'_> {
    /// Converts this finding into an [`InjectError::UnknownToken`].
    #[must_use]
    pub fn into_error(self) -> InjectError {
        InjectError::UnknownToken {
            token: self.token.clone(),
            dependent: self.dependent.clone(),
        }
    }
}

/// Validates graphs before anything in them is constructed.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphChecker {
    topology: Topology,
}

impl GraphChecker {
    /// Finds the first dependency token without a provider in `graph`,
    /// scanning providers in registration order and each dependency list in
    /// declaration order. Literal values are never looked up.
    #[must_use]
    pub fn found_first_unknown_token<'g>(
        &self,
        graph: &'g Graph,
    ) -> Option<MissingDependency<'g>> {
        self.found_first_unknown_token_matching(graph, |_| true)
    }

    /// Like [`found_first_unknown_token`](Self::found_first_unknown_token),
    /// but only dependencies accepted by `checked` need to be registered.
    pub fn found_first_unknown_token_matching<'g, P>(
        &self,
        graph: &'g Graph,
        checked: P,
    ) -> Option<MissingDependency<'g>>
    where
        P: Fn(&Token) -> bool,
    {
        graph.iter().find_map(|(dependent, provider)| {
            self.found_unknown_dependency(
                dependent,
                provider.dependencies(),
                &[graph],
                &checked,
            )
        })
    }

    /// Finds the first token in `dependencies` which none of `graphs`
    /// provides, skipping tokens rejected by `checked`.
    pub fn found_unknown_dependency<'d, P>(
        &self,
        dependent: &'d Token,
        dependencies: &'d [Dependency],
        graphs: &[&Graph],
        checked: P,
    ) -> Option<MissingDependency<'d>>
    where
        P: Fn(&Token) -> bool,
    {
        dependencies
            .iter()
            .filter_map(Dependency::as_token)
            .filter(|&token| checked(token))
            .find(|&token| !graphs.iter().any(|graph| graph.contains(token)))
            .map(|token| MissingDependency { token, dependent })
    }

    /// Runs a cycle check from every token of `graph` and returns the first
    /// cycle found.
    #[must_use]
    pub fn found_cyclic_dependencies(&self, graph: &Graph) -> Option<TokenPath> {
        self.topology.walk(graph).err()
    }
}
