use crate::{Dependency, InjectError, InjectResult, Token, TokenRole};
use std::any::Any;

/// Checks the shape of registrations before they are recorded.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator;

impl Validator {
    /// Whether `candidate` is a [`Token`].
    ///
    /// ```
    /// use athlete::{Token, Validator};
    ///
    /// struct Cache;
    ///
    /// assert!(Validator.is_token(&Token::class(|| Cache)));
    /// assert!(!Validator.is_token(&"Cache"));
    /// ```
    #[must_use]
    pub fn is_token(&self, candidate: &dyn Any) -> bool {
        candidate.is::<Token>()
    }

    /// Whether `candidate` can be used in a dependency list, either as a
    /// [`Token`] or as a [`Dependency`].
    #[must_use]
    pub fn is_dependency(&self, candidate: &dyn Any) -> bool {
        self.is_token(candidate) || candidate.is::<Dependency>()
    }

    /// Fails with [`InjectError::InvalidToken`] unless `token` has the
    /// `expected` role.
    pub fn ensure_role(
        &self,
        token: &Token,
        expected: TokenRole,
    ) -> InjectResult<()> {
        if token.role() == expected {
            Ok(())
        } else {
            Err(InjectError::InvalidToken {
                token: token.clone(),
                expected,
            })
        }
    }

    /// Checks that `dependencies` fit the constructor of `token`. Literal
    /// values are only accepted when `allow_values` is set.
    pub fn ensure_dependencies(
        &self,
        token: &Token,
        dependencies: &[Dependency],
        allow_values: bool,
    ) -> InjectResult<()> {
        if dependencies.len() != token.arity() {
            return Err(InjectError::InvalidDependencyList {
                token: token.clone(),
                expected: token.arity(),
                found: dependencies.len(),
            });
        }

        for (position, dependency) in dependencies.iter().enumerate() {
            let reason = match dependency {
                Dependency::Token(dependency)
                    if dependency.role() == TokenRole::Command =>
                {
                    "commands cannot be dependencies"
                }
                Dependency::Value(_) if !allow_values => {
                    "literal values are not accepted here"
                }
                _ => continue,
            };

            return Err(InjectError::InvalidDependency {
                token: token.clone(),
                position,
                reason,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deps, Command, Locator, Svc};

    struct Plain;
    struct Wrapper(Svc<Plain>);
    struct Noop;

    impl Command for Noop {
        fn execute(&self, _locator: &Locator) -> InjectResult<()> {
            Ok(())
        }
    }

    #[test]
    fn classifies_candidates() {
        let token = Token::class(|| Plain);
        assert!(Validator.is_token(&token));
        assert!(Validator.is_dependency(&token));
        assert!(Validator.is_dependency(&Dependency::value(Plain)));
        assert!(!Validator.is_token(&Dependency::value(Plain)));
        assert!(!Validator.is_dependency(&42));
    }

    #[test]
    fn roles_must_match() {
        let token = Token::class(|| Plain);
        assert!(Validator.ensure_role(&token, TokenRole::Service).is_ok());
        assert!(matches!(
            Validator.ensure_role(&token, TokenRole::Module),
            Err(InjectError::InvalidToken {
                expected: TokenRole::Module,
                ..
            })
        ));
    }

    #[test]
    fn arity_must_match() {
        let wrapper = Token::class(Wrapper);
        match Validator.ensure_dependencies(&wrapper, &[], true) {
            Err(InjectError::InvalidDependencyList {
                expected, found, ..
            }) => {
                assert_eq!(1, expected);
                assert_eq!(0, found);
            }
            other => panic!("expected a wrong dependency list, got {:?}", other),
        }
    }

    #[test]
    fn commands_are_never_dependencies() {
        let wrapper = Token::class(Wrapper);
        let noop = Token::command(|| Noop);
        assert!(matches!(
            Validator.ensure_dependencies(&wrapper, &deps![&noop], true),
            Err(InjectError::InvalidDependency { position: 0, .. })
        ));
    }

    #[test]
    fn values_are_rejected_when_not_allowed() {
        let wrapper = Token::class(Wrapper);
        let dependencies = deps![Dependency::value(Plain)];
        assert!(Validator
            .ensure_dependencies(&wrapper, &dependencies, true)
            .is_ok());
        assert!(matches!(
            Validator.ensure_dependencies(&wrapper, &dependencies, false),
            Err(InjectError::InvalidDependency { position: 0, .. })
        ));
    }
}
