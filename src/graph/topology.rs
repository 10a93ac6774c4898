use crate::{Graph, InjectError, InjectResult, Token, TokenPath};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Orders a graph so that every dependency comes before its dependents.
#[derive(Clone, Copy, Debug, Default)]
pub struct Topology;

impl Topology {
    /// Sorts the tokens of `graph` in post-order, starting a depth-first walk
    /// from every token in registration order. Dependencies without a
    /// provider in `graph` are skipped.
    ///
    /// ```
    /// use athlete::{deps, Registry, Svc, Token, Topology};
    ///
    /// struct Engine;
    /// struct Car(Svc<Engine>);
    ///
    /// let engine = Token::class(|| Engine);
    /// let car = Token::class(Car);
    ///
    /// let mut registry = Registry::new();
    /// registry.inject(&car, deps![&engine])?;
    /// registry.inject(&engine, deps![])?;
    ///
    /// let container = registry.build()?;
    /// let order = Topology.sort(container.get_info().tokens)?;
    /// let position = |token: &Token| order.iter().position(|&sorted| sorted == token);
    /// assert!(position(&engine) < position(&car));
    /// # Ok::<(), athlete::InjectError>(())
    /// ```
    pub fn sort<'g>(&self, graph: &'g Graph) -> InjectResult<Vec<&'g Token>> {
        self.walk(graph)
            .map_err(|cycle| InjectError::CyclicDependency { cycle })
    }

    pub(crate) fn walk<'g>(
        &self,
        graph: &'g Graph,
    ) -> Result<Vec<&'g Token>, TokenPath> {
        let mut visitor = Visitor::new(graph);
        for token in graph.tokens() {
            visitor.visit(token)?;
        }
        Ok(visitor.order)
    }
}

struct Visitor<'g> {
    graph: &'g Graph,
    visiting: IndexSet<&'g Token>,
    visited: HashSet<&'g Token>,
    order: Vec<&'g Token>,
}

impl<'g> Visitor<'g> {
    fn new(graph: &'g Graph) -> Self {
        Visitor {
            graph,
            visiting: IndexSet::new(),
            visited: HashSet::new(),
            order: Vec::with_capacity(graph.len()),
        }
    }

    fn visit(&mut self, token: &'g Token) -> Result<(), TokenPath> {
        if self.visited.contains(token) {
            return Ok(());
        }

        let provider = match self.graph.get(token) {
            Some(provider) => provider,
            None => return Ok(()),
        };

        if let Some(start) = self.visiting.get_index_of(token) {
            let mut cycle: Vec<Token> = self
                .visiting
                .iter()
                .skip(start)
                .map(|&token| token.clone())
                .collect();
            cycle.push(token.clone());
            return Err(TokenPath::new(cycle));
        }

        self.visiting.insert(token);
        for dependency in provider.dependencies() {
            if let Some(dependency) = dependency.as_token() {
                self.visit(dependency)?;
            }
        }
        self.visiting.pop();

        self.visited.insert(token);
        self.order.push(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deps, Dependency, Provider, Svc};

    struct Node;

    fn node(name: &'static str) -> Token {
        Token::class(|_: Svc<Node>| Node).with_name(name)
    }

    fn leaf(name: &'static str) -> Token {
        Token::class(|| Node).with_name(name)
    }

    fn graph_of(providers: Vec<(&Token, Vec<Dependency>)>) -> Graph {
        let mut graph = Graph::new();
        for (token, dependencies) in providers {
            graph.insert(Provider::singleton(token.clone(), dependencies));
        }
        graph
    }

    #[test]
    fn dependencies_come_first() {
        let a = node("A");
        let b = node("B");
        let c = leaf("C");
        let graph = graph_of(vec![(&a, deps![&b]), (&b, deps![&c]), (&c, deps![])]);

        let order = Topology.sort(&graph).unwrap();
        assert_eq!(vec![&c, &b, &a], order);
    }

    #[test]
    fn every_token_is_sorted_once() {
        let shared = leaf("Shared");
        let left = node("Left");
        let right = node("Right");
        let graph = graph_of(vec![
            (&left, deps![&shared]),
            (&right, deps![&shared]),
            (&shared, deps![]),
        ]);

        let order = Topology.sort(&graph).unwrap();
        assert_eq!(vec![&shared, &left, &right], order);
    }

    #[test]
    fn unregistered_dependencies_are_skipped() {
        let a = node("A");
        let missing = leaf("Missing");
        let graph = graph_of(vec![(&a, deps![&missing])]);

        assert_eq!(vec![&a], Topology.sort(&graph).unwrap());
    }

    #[test]
    fn cycle_path_starts_and_ends_with_the_repeated_token() {
        let entry = node("Entry");
        let a = node("A");
        let b = node("B");
        let graph =
            graph_of(vec![(&entry, deps![&a]), (&a, deps![&b]), (&b, deps![&a])]);

        match Topology.sort(&graph) {
            Err(InjectError::CyclicDependency { cycle }) => {
                assert_eq!(vec!["A", "B", "A"], cycle.names());
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let a = node("A");
        let graph = graph_of(vec![(&a, deps![&a])]);

        let cycle = Topology.walk(&graph).unwrap_err();
        assert_eq!(vec!["A", "A"], cycle.names());
    }
}
