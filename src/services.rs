mod constructor;
mod service;
mod token;

pub use constructor::*;
pub use service::*;
pub use token::*;
