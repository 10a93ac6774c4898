use crate::{DynSvc, InjectError, InjectResult, Token};

/// The memoized instance slot of a singleton provider. It is filled at most
/// once.
#[derive(Default)]
pub(crate) struct SingletonSlot {
    #[cfg(feature = "arc")]
    instance: std::sync::RwLock<Option<DynSvc>>,
    #[cfg(feature = "rc")]
    instance: std::cell::RefCell<Option<DynSvc>>,
}

impl SingletonSlot {
    /// Returns the stored instance, creating it with `create` if the slot is
    /// still empty.
    pub fn get_or_create<F>(&self, token: &Token, create: F) -> InjectResult<DynSvc>
    where
        F: FnOnce() -> InjectResult<DynSvc>,
    {
        #[cfg(feature = "arc")]
        let result = {
            // Check if already stored - fast path
            let stored = self.instance.read().map_err(|_| poisoned(token))?;
            if let Some(instance) = stored.as_ref() {
                return Ok(instance.clone());
            }
            drop(stored);

            // Create new instance if needed - slow path
            let mut stored =
                self.instance.write().map_err(|_| poisoned(token))?;
            let instance = match &mut *stored {
                Some(instance) => instance.clone(),
                stored @ None => stored.insert(create()?).clone(),
            };
            instance
        };
        #[cfg(feature = "rc")]
        let result = {
            // A held borrow means the singleton is being resolved from inside
            // its own construction
            let mut stored =
                self.instance.try_borrow_mut().map_err(|_| {
                    InjectError::CyclicDependency {
                        cycle: crate::TokenPath::new(vec![
                            token.clone(),
                            token.clone(),
                        ]),
                    }
                })?;
            let instance = match &mut *stored {
                Some(instance) => instance.clone(),
                stored @ None => stored.insert(create()?).clone(),
            };
            instance
        };
        Ok(result)
    }

    /// Whether the instance has been created yet.
    pub fn is_filled(&self) -> bool {
        #[cfg(feature = "arc")]
        let filled = self
            .instance
            .read()
            .map(|stored| stored.is_some())
            .unwrap_or(false);
        #[cfg(feature = "rc")]
        let filled = self
            .instance
            .try_borrow()
            .map(|stored| stored.is_some())
            .unwrap_or(false);
        filled
    }
}

#[cfg(feature = "arc")]
fn poisoned(token: &Token) -> InjectError {
    InjectError::InternalError(format!(
        "the singleton slot of {} was poisoned by a panicking constructor",
        token
    ))
}
