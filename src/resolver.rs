use crate::{
    Command, Dependency, DynSvc, Graph, InjectError, InjectResult, Lifetime,
    Svc, Token, TokenRole, Topology,
};
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};

/// Live module instances, in the order they were constructed.
pub type ModuleInstances = IndexMap<Token, DynSvc>;

/// Everything the instance resolver produced, in topological order.
pub type Instances = IndexMap<Token, Resolved>;

/// A resolved token.
#[derive(Clone)]
pub enum Resolved {
    /// A singleton constructed up front.
    Instance(DynSvc),
    /// A factory, constructed again from these dependencies on every request.
    Deferred(Vec<Dependency>),
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolved::Instance(_) => f.write_str("Instance(..)"),
            Resolved::Deferred(dependencies) => {
                f.debug_tuple("Deferred").field(dependencies).finish()
            }
        }
    }
}

/// Materializes whole graphs at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct Resolver {
    topology: Topology,
}

impl Resolver {
    /// Constructs every module of `modules` in topological order. Module
    /// dependencies receive the instance of the depended-on module, and any
    /// other token is forwarded as a [`Token`] value.
    pub fn resolve_modules(
        &self,
        modules: &Graph,
    ) -> InjectResult<ModuleInstances> {
        let order = self.topology.sort(modules)?;
        let mut instances = ModuleInstances::with_capacity(order.len());
        for token in order {
            let provider = modules.get(token).ok_or_else(|| {
                InjectError::InternalError(format!(
                    "sorted module {} has no provider",
                    token
                ))
            })?;

            tracing::debug!(module = %token, "constructing module");
            instances.insert(token.clone(), provider.instantiate(modules)?);
        }

        Ok(instances)
    }

    /// Constructs every singleton of `graph` in topological order through its
    /// provider, so the provider holds the same instance afterwards.
    /// Factories are stored as deferred entries and only constructed on
    /// request.
    pub fn resolve_instances(&self, graph: &Graph) -> InjectResult<Instances> {
        let order = self.topology.sort(graph)?;
        let mut instances = Instances::with_capacity(order.len());
        for token in order {
            let provider = graph.get(token).ok_or_else(|| {
                InjectError::InternalError(format!(
                    "sorted token {} has no provider",
                    token
                ))
            })?;

            let resolved = match provider.lifetime() {
                Lifetime::Singleton => {
                    Resolved::Instance(provider.instantiate(graph)?)
                }
                Lifetime::Factory => {
                    Resolved::Deferred(provider.dependencies().to_vec())
                }
            };
            instances.insert(token.clone(), resolved);
        }

        Ok(instances)
    }

    /// Gets an instance of `token` from resolved `instances`, constructing a
    /// new one for factories.
    pub fn resolve_instance(
        &self,
        token: &Token,
        instances: &Instances,
    ) -> InjectResult<DynSvc> {
        match instances.get(token) {
            Some(Resolved::Instance(instance)) => Ok(instance.clone()),
            Some(Resolved::Deferred(dependencies)) => {
                self.create_instance(token, dependencies, instances)
            }
            None => Err(InjectError::UnresolvableToken {
                token: token.clone(),
            }),
        }
    }

    /// Constructs a command. Dependencies naming a module receive its live
    /// instance, and any other token is forwarded as a [`Token`] value.
    pub fn resolve_command(
        &self,
        token: &Token,
        dependencies: &[Dependency],
        modules: &ModuleInstances,
    ) -> InjectResult<Svc<dyn Command>> {
        let arguments = dependencies
            .iter()
            .map(|dependency| match dependency {
                Dependency::Value(value) => value.clone(),
                Dependency::Token(dependency) => match modules.get(dependency) {
                    Some(module) => module.clone(),
                    None => Svc::new(dependency.clone()) as DynSvc,
                },
            })
            .collect();

        let instance = token.construct(arguments)?;
        token
            .as_command(instance)
            .ok_or_else(|| InjectError::InvalidToken {
                token: token.clone(),
                expected: TokenRole::Command,
            })
    }

    fn create_instance(
        &self,
        token: &Token,
        dependencies: &[Dependency],
        instances: &Instances,
    ) -> InjectResult<DynSvc> {
        let arguments = dependencies
            .iter()
            .map(|dependency| match dependency {
                Dependency::Value(value) => Ok(value.clone()),
                Dependency::Token(dependency)
                    if instances.contains_key(dependency) =>
                {
                    self.resolve_instance(dependency, instances)
                }
                Dependency::Token(dependency) => {
                    Err(InjectError::UnknownToken {
                        token: dependency.clone(),
                        dependent: token.clone(),
                    })
                }
            })
            .collect::<InjectResult<Vec<_>>>()?;

        token.construct(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deps, Locator, Module, Injector, Provider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Clock;
    struct Schedule(Svc<Clock>);

    struct Base;
    impl Module for Base {
        fn export(&self, _injector: &mut Injector<'_>) -> InjectResult<()> {
            Ok(())
        }
    }

    struct Feature {
        base: Svc<Base>,
        exported: Token,
    }
    impl Module for Feature {
        fn export(&self, _injector: &mut Injector<'_>) -> InjectResult<()> {
            Ok(())
        }
    }

    struct Report(Svc<Feature>);
    impl Command for Report {
        fn execute(&self, _locator: &Locator) -> InjectResult<()> {
            Ok(())
        }
    }

    #[test]
    fn singletons_are_built_up_front_and_factories_deferred() {
        static SCHEDULES: AtomicUsize = AtomicUsize::new(0);
        let clock = Token::class(|| Clock);
        let schedule = Token::class(|clock: Svc<Clock>| {
            SCHEDULES.fetch_add(1, Ordering::SeqCst);
            Schedule(clock)
        });
        let mut graph = Graph::new();
        graph.insert(Provider::factory(schedule.clone(), deps![&clock]));
        graph.insert(Provider::singleton(clock.clone(), vec![]));

        let resolver = Resolver::default();
        let instances = resolver.resolve_instances(&graph).unwrap();
        assert_eq!(vec![&clock, &schedule], instances.keys().collect::<Vec<_>>());
        assert!(matches!(instances[&clock], Resolved::Instance(_)));
        assert!(matches!(instances[&schedule], Resolved::Deferred(_)));
        assert_eq!(0, SCHEDULES.load(Ordering::SeqCst));

        let clock_provider = graph.get(&clock).unwrap();
        assert!(clock_provider.is_instantiated());
        let from_provider = clock_provider.instantiate(&graph).unwrap();
        match &instances[&clock] {
            Resolved::Instance(instance) => {
                assert!(Svc::ptr_eq(instance, &from_provider));
            }
            Resolved::Deferred(_) => unreachable!("clock is a singleton"),
        }

        let first = resolver.resolve_instance(&schedule, &instances).unwrap();
        let second = resolver.resolve_instance(&schedule, &instances).unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
        assert_eq!(2, SCHEDULES.load(Ordering::SeqCst));

        let clock_instance = resolver.resolve_instance(&clock, &instances).unwrap();
        let first = first.downcast_ref::<Schedule>().unwrap();
        let clock_instance = crate::downcast_svc::<Clock>(clock_instance).ok().unwrap();
        assert!(Svc::ptr_eq(&clock_instance, &first.0));
    }

    #[test]
    fn unresolved_tokens_are_reported() {
        let clock = Token::class(|| Clock);
        let resolver = Resolver::default();
        let instances = resolver.resolve_instances(&Graph::new()).unwrap();
        assert!(matches!(
            resolver.resolve_instance(&clock, &instances),
            Err(InjectError::UnresolvableToken { .. })
        ));
    }

    #[test]
    fn modules_receive_modules_and_forwarded_tokens() {
        let clock = Token::class(|| Clock);
        let base = Token::module(|| Base);
        let feature = Token::module(|base: Svc<Base>, exported: Token| Feature {
            base,
            exported,
        });
        let mut modules = Graph::new();
        modules.insert(Provider::module(feature.clone(), deps![&base, &clock]));
        modules.insert(Provider::module(base.clone(), vec![]));

        let instances = Resolver::default().resolve_modules(&modules).unwrap();
        assert_eq!(vec![&base, &feature], instances.keys().collect::<Vec<_>>());

        let feature = instances[&feature].downcast_ref::<Feature>().unwrap();
        let base = crate::downcast_svc::<Base>(instances[&base].clone())
            .ok()
            .unwrap();
        assert!(Svc::ptr_eq(&base, &feature.base));
        assert_eq!(clock, feature.exported);
    }

    #[test]
    fn commands_are_built_from_module_instances() {
        let base = Token::module(|| Base);
        let clock = Token::class(|| Clock);
        let feature = Token::module(|base: Svc<Base>, exported: Token| Feature {
            base,
            exported,
        });
        let report = Token::command(Report);
        let mut modules = Graph::new();
        modules.insert(Provider::module(base.clone(), vec![]));
        modules.insert(Provider::module(feature.clone(), deps![&base, &clock]));
        let resolver = Resolver::default();
        let instances = resolver.resolve_modules(&modules).unwrap();

        let first = resolver
            .resolve_command(&report, &deps![&feature], &instances)
            .unwrap();
        let second = resolver
            .resolve_command(&report, &deps![&feature], &instances)
            .unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }
}
