use crate::{downcast_svc, DynSvc, InjectError, InjectResult, Service, Svc, Token};

/// A value that can be received as a positional constructor argument.
///
/// Arguments arrive as erased [`DynSvc`] pointers: resolved instances,
/// literal values, or (for modules and commands) forwarded tokens.
pub trait FromArgument: Sized {
    /// Converts the argument, returning `None` if it has the wrong type.
    fn from_argument(argument: DynSvc) -> Option<Self>;
}

/// Receives an instance or literal value as a typed service pointer.
impl<T: Service> FromArgument for Svc<T> {
    #[inline]
    fn from_argument(argument: DynSvc) -> Option<Self> {
        downcast_svc(argument).ok()
    }
}

/// Receives a forwarded token reference.
impl FromArgument for Token {
    #[inline]
    fn from_argument(argument: DynSvc) -> Option<Self> {
        downcast_svc::<Token>(argument)
            .ok()
            .map(|token| Token::clone(&token))
    }
}

/// Something that can construct a value from positional arguments. All
/// functions and closures of arity 12 or less are constructors if each of
/// their parameters implements [`FromArgument`].
///
/// ## Type parameters
/// * `D` - Tuple of the constructor's parameter types.
///
/// ## Example
///
/// ```
/// use athlete::{Constructor, DynSvc, Svc, Token};
///
/// struct Greeting(String);
///
/// fn greet(name: Svc<String>) -> Greeting {
///     Greeting(format!("hello {}", name))
/// }
///
/// let token = Token::class(greet);
/// let argument: DynSvc = Svc::new("world".to_string());
/// let greeting = greet.construct(&token, vec![argument]).unwrap();
/// assert_eq!("hello world", greeting.0);
/// assert_eq!(1, Constructor::arity(&greet));
/// ```
pub trait Constructor<D> {
    /// The value produced by this constructor.
    type Output;

    /// The number of arguments the constructor takes.
    fn arity(&self) -> usize;

    /// Invokes the constructor. `token` is only used for error reporting.
    fn construct(
        &self,
        token: &Token,
        arguments: Vec<DynSvc>,
    ) -> InjectResult<Self::Output>;
}

macro_rules! impl_constructor {
    () => {
        impl_constructor!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_constructor!(@impl ($first $(, $rest)*));
        impl_constructor!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl<F, R $(, $type_name)*> Constructor<($($type_name,)*)> for F
        where
            F: Fn($($type_name),*) -> R,
            $($type_name: FromArgument,)*
        {
            type Output = R;

            fn arity(&self) -> usize {
                let parameters: &[&str] = &[$(stringify!($type_name)),*];
                parameters.len()
            }

            #[allow(unused_variables, unused_mut, non_snake_case)]
            fn construct(
                &self,
                token: &Token,
                arguments: Vec<DynSvc>,
            ) -> InjectResult<Self::Output> {
                let expected =
                    <Self as Constructor<($($type_name,)*)>>::arity(self);
                if arguments.len() != expected {
                    return Err(InjectError::InvalidDependencyList {
                        token: token.clone(),
                        expected,
                        found: arguments.len(),
                    });
                }

                let mut arguments = arguments.into_iter().enumerate();
                let result = self($(
                    match arguments.next() {
                        Some((position, argument)) => {
                            <$type_name as FromArgument>::from_argument(argument)
                                .ok_or_else(|| InjectError::InvalidArgument {
                                    token: token.clone(),
                                    position,
                                    expected: std::any::type_name::<$type_name>(),
                                })?
                        }
                        None => {
                            return Err(InjectError::InternalError(format!(
                                "ran out of arguments while constructing {}",
                                token
                            )))
                        }
                    }
                ),*);
                Ok(result)
            }
        }
    };
}

impl_constructor!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(Svc<i32>, Svc<String>);

    #[test]
    fn arguments_are_passed_positionally() {
        let token = Token::class(Pair);
        let arguments =
            vec![Svc::new(4i32) as DynSvc, Svc::new("four".to_string())];
        let pair = Pair.construct(&token, arguments).unwrap();
        assert_eq!(4, *pair.0);
        assert_eq!("four", pair.1.as_str());
    }

    #[test]
    fn wrong_argument_type_is_reported_with_its_position() {
        let token = Token::class(Pair);
        let arguments = vec![Svc::new(4i32) as DynSvc, Svc::new(4i32)];
        match Pair.construct(&token, arguments) {
            Err(InjectError::InvalidArgument {
                token: failed,
                position,
                ..
            }) => {
                assert_eq!(token, failed);
                assert_eq!(1, position);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("argument types should not match"),
        }
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let token = Token::class(Pair);
        match Pair.construct(&token, vec![Svc::new(4i32) as DynSvc]) {
            Err(InjectError::InvalidDependencyList {
                expected, found, ..
            }) => {
                assert_eq!(2, expected);
                assert_eq!(1, found);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("argument count should not match"),
        }
    }

    #[test]
    fn forwarded_tokens_are_received_as_tokens() {
        let forwarded = Token::class(|| 1u8);
        let receiver = Token::class(|token: Token| token);
        let argument: DynSvc = Svc::new(forwarded.clone());
        let received = (|token: Token| token)
            .construct(&receiver, vec![argument])
            .unwrap();
        assert_eq!(forwarded, received);
    }
}
