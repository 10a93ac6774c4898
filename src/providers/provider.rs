use crate::{
    providers::singleton::SingletonSlot, Dependency, DynSvc, Graph,
    InjectError, InjectResult, Svc, Token,
};
use std::fmt::{Debug, Formatter};

/// How long an instance created by a provider lives.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Lifetime {
    /// The instance is created on first request and shared afterwards.
    Singleton,
    /// A new instance is created for every request.
    Factory,
}

enum Instancer {
    Singleton(SingletonSlot),
    Factory,
}

/// What happens to a dependency token that has no provider in the graph the
/// provider is instantiated against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ArgumentStrategy {
    /// The token must be resolved.
    Resolve,
    /// The token itself is forwarded to the constructor.
    PassThrough,
}

/// The graph's record for a token: its dependency list plus its lifetime
/// policy.
pub struct Provider {
    token: Token,
    dependencies: Vec<Dependency>,
    instancer: Instancer,
    arguments: ArgumentStrategy,
}

impl Provider {
    fn new(
        token: Token,
        dependencies: Vec<Dependency>,
        instancer: Instancer,
        arguments: ArgumentStrategy,
    ) -> Self {
        Provider {
            token,
            dependencies,
            instancer,
            arguments,
        }
    }

    /// Creates a provider which constructs its token once and shares the
    /// instance with every later request.
    #[must_use]
    pub fn singleton(token: Token, dependencies: Vec<Dependency>) -> Self {
        Provider::new(
            token,
            dependencies,
            Instancer::Singleton(SingletonSlot::default()),
            ArgumentStrategy::Resolve,
        )
    }

    /// Creates a provider which constructs a new instance of its token for
    /// every request.
    #[must_use]
    pub fn factory(token: Token, dependencies: Vec<Dependency>) -> Self {
        Provider::new(
            token,
            dependencies,
            Instancer::Factory,
            ArgumentStrategy::Resolve,
        )
    }

    /// Creates a module provider. Modules are singletons, and dependencies
    /// which are not part of the module graph reach the module's constructor
    /// as [`Token`] values.
    #[must_use]
    pub fn module(token: Token, dependencies: Vec<Dependency>) -> Self {
        Provider::new(
            token,
            dependencies,
            Instancer::Singleton(SingletonSlot::default()),
            ArgumentStrategy::PassThrough,
        )
    }

    /// The token this provider constructs.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The declared dependencies, in constructor argument order.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// The lifetime of instances created by this provider.
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        match self.instancer {
            Instancer::Singleton(_) => Lifetime::Singleton,
            Instancer::Factory => Lifetime::Factory,
        }
    }

    /// Whether a singleton provider has created its instance yet. Factory
    /// providers never hold an instance.
    #[must_use]
    pub fn is_instantiated(&self) -> bool {
        match &self.instancer {
            Instancer::Singleton(slot) => slot.is_filled(),
            Instancer::Factory => false,
        }
    }

    /// Gets an instance of this provider's token, recursively instantiating
    /// its dependencies from `graph`.
    pub fn instantiate(&self, graph: &Graph) -> InjectResult<DynSvc> {
        match &self.instancer {
            Instancer::Singleton(slot) => {
                slot.get_or_create(&self.token, || self.construct(graph))
            }
            Instancer::Factory => self.construct(graph),
        }
    }

    fn construct(&self, graph: &Graph) -> InjectResult<DynSvc> {
        let arguments = self
            .dependencies
            .iter()
            .map(|dependency| self.collect_argument(dependency, graph))
            .collect::<InjectResult<Vec<_>>>()?;
        self.token.construct(arguments)
    }

    fn collect_argument(
        &self,
        dependency: &Dependency,
        graph: &Graph,
    ) -> InjectResult<DynSvc> {
        let token = match dependency {
            Dependency::Value(value) => return Ok(value.clone()),
            Dependency::Token(token) => token,
        };

        match (graph.get(token), self.arguments) {
            (Some(provider), _) => provider.instantiate(graph),
            (None, ArgumentStrategy::PassThrough) => {
                Ok(Svc::new(token.clone()) as DynSvc)
            }
            (None, ArgumentStrategy::Resolve) => {
                Err(InjectError::UnknownToken {
                    token: token.clone(),
                    dependent: self.token.clone(),
                })
            }
        }
    }
}

impl Debug for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("token", &self.token.name())
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Engine;
    struct Car(Svc<Engine>);

    fn graph_of(providers: Vec<Provider>) -> Graph {
        let mut graph = Graph::new();
        for provider in providers {
            graph.insert(provider);
        }
        graph
    }

    #[test]
    fn singleton_instantiates_once() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);
        let engine = Token::class(|| {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Engine
        });
        let graph = graph_of(vec![Provider::singleton(engine.clone(), vec![])]);
        let provider = graph.get(&engine).unwrap();
        assert!(!provider.is_instantiated());

        let first = provider.instantiate(&graph).unwrap();
        let second = provider.instantiate(&graph).unwrap();

        assert!(Svc::ptr_eq(&first, &second));
        assert!(provider.is_instantiated());
        assert_eq!(1, CREATED.load(Ordering::SeqCst));
    }

    #[test]
    fn factory_instantiates_every_time() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);
        let engine = Token::class(|| {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Engine
        });
        let graph = graph_of(vec![Provider::factory(engine.clone(), vec![])]);
        let provider = graph.get(&engine).unwrap();

        let first = provider.instantiate(&graph).unwrap();
        let second = provider.instantiate(&graph).unwrap();

        assert!(!Svc::ptr_eq(&first, &second));
        assert!(!provider.is_instantiated());
        assert_eq!(2, CREATED.load(Ordering::SeqCst));
    }

    #[test]
    fn dependencies_are_instantiated_recursively() {
        let engine = Token::class(|| Engine);
        let car = Token::class(Car);
        let graph = graph_of(vec![
            Provider::singleton(engine.clone(), vec![]),
            Provider::factory(car.clone(), deps![&engine]),
        ]);

        let shared = graph.get(&engine).unwrap().instantiate(&graph).unwrap();
        let car = graph.get(&car).unwrap().instantiate(&graph).unwrap();
        let car = car.downcast_ref::<Car>().unwrap();
        let shared = crate::downcast_svc::<Engine>(shared).ok().unwrap();
        assert!(Svc::ptr_eq(&shared, &car.0));
    }

    #[test]
    fn missing_dependency_fails_for_services() {
        let engine = Token::class(|| Engine);
        let car = Token::class(Car);
        let graph = graph_of(vec![Provider::singleton(car.clone(), deps![&engine])]);

        match graph.get(&car).unwrap().instantiate(&graph) {
            Err(InjectError::UnknownToken { token, dependent }) => {
                assert_eq!(engine, token);
                assert_eq!(car, dependent);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("the engine was never registered"),
        }
    }

    #[test]
    fn missing_dependency_is_forwarded_for_modules() {
        let engine = Token::class(|| Engine);
        let holder = Token::class(|token: Token| token);
        let graph = graph_of(vec![Provider::module(holder.clone(), deps![&engine])]);

        let provider = graph.get(&holder).unwrap();
        assert_eq!(Lifetime::Singleton, provider.lifetime());
        let forwarded = provider.instantiate(&graph).unwrap();
        assert_eq!(Some(&engine), forwarded.downcast_ref::<Token>());
    }

    #[test]
    fn literal_values_are_passed_verbatim() {
        let payload = Svc::new("x".to_string());
        let echo = Token::function(|value: Svc<String>| value);
        let graph = graph_of(vec![Provider::factory(
            echo.clone(),
            deps![Dependency::shared(payload.clone())],
        )]);

        let instance = graph.get(&echo).unwrap().instantiate(&graph).unwrap();
        let instance = crate::downcast_svc::<String>(instance).ok().unwrap();
        assert!(Svc::ptr_eq(&payload, &instance));
    }
}
