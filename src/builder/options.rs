/// When singletons are constructed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Activation {
    /// Singletons are constructed by their provider on first resolution.
    #[default]
    Lazy,
    /// Every singleton is constructed while the container is built, in
    /// dependency order. Factories are still constructed on request.
    Eager,
}

/// Settings applied when a [`Registry`](crate::Registry) builds its
/// container.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BuildOptions {
    /// When singletons are constructed.
    pub activation: Activation,
}
