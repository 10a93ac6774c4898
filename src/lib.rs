//! Runtime dependency injection with explicit dependency lists.
//!
//! Every constructible unit is a [`Token`]. Tokens are registered in a
//! [`Registry`] together with the tokens (or literal values) their
//! constructor receives, in order. Building the registry checks the whole
//! graph for unknown tokens and cycles before anything is constructed, and
//! produces a read-only [`Container`] that creates instances on demand.
//!
//! By default, instances are held in `Arc<T>` and the container can be shared
//! between threads. Disabling default features and enabling the "rc" feature
//! switches to `Rc<T>`:
//!
//! ```text
//! athlete = {
//!     version = "*",
//!     default_features = false,
//!     features = ["rc"]
//! }
//! ```
//!
//! # Lifetimes
//!
//! - Singleton ([`Registry::inject`]): the instance is created once, on first
//!   resolution, and shared afterwards.
//! - Factory ([`Registry::inject_factory`]): a new instance is created for
//!   every resolution and every dependent.
//!
//! With [`Activation::Eager`] every singleton is created while the container
//! is built instead.
//!
//! # Modules and commands
//!
//! A [`Module`] is constructed while the container is being built and exports
//! further tokens through an [`Injector`]. A [`Command`] is constructed from
//! module instances every time it is executed, and looks up tokens through a
//! [`Locator`].
//!
//! # Example
//!
//! ```
//! use athlete::{deps, Dependency, InjectError, Registry, Svc, Token};
//!
//! struct Logger;
//!
//! struct Mailer {
//!     logger: Svc<Logger>,
//!     host: Svc<String>,
//! }
//!
//! struct Signup {
//!     mailer: Svc<Mailer>,
//! }
//!
//! fn main() -> Result<(), InjectError> {
//!     let logger = Token::class(|| Logger);
//!     let mailer = Token::class(|logger: Svc<Logger>, host: Svc<String>| Mailer { logger, host });
//!     let signup = Token::class(|mailer: Svc<Mailer>| Signup { mailer });
//!
//!     // Registration order doesn't matter, only the dependency lists do.
//!     let mut registry = Registry::new();
//!     registry
//!         .inject(&signup, deps![&mailer])?
//!         .inject(&mailer, deps![&logger, Dependency::value("smtp.local".to_string())])?
//!         .inject_factory(&logger, deps![])?;
//!
//!     let container = registry.build()?;
//!     let first = container.resolve::<Signup>(&signup)?;
//!     let second = container.resolve::<Signup>(&signup)?;
//!
//!     assert!(Svc::ptr_eq(&first, &second));
//!     assert_eq!("smtp.local", *first.mailer.host);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

mod builder;
mod container;
mod dependency;
mod extension;
mod graph;
mod module;
mod providers;
mod resolver;
mod services;
mod validator;

pub use builder::*;
pub use container::*;
pub use dependency::*;
pub use extension::*;
pub use graph::*;
pub use module::*;
pub use providers::*;
pub use resolver::*;
pub use services::*;
pub use validator::*;
