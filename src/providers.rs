mod provider;
mod singleton;

pub use provider::*;
