use crate::nn::module::Module;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A module whose lifetime is shared between several holders.
pub type SharedModule = Arc<RwLock<Box<dyn Module>>>;

/// Wraps a concrete module for shared ownership.
pub fn share<M: Module + 'static>(module: M) -> SharedModule {
    let boxed: Box<dyn Module> = Box::new(module);
    Arc::new(RwLock::new(boxed))
}

/// Ownership cell for a container child.
///
/// Holds nothing, a uniquely owned module, or a shared one. Cloning follows
/// the ownership mode: an owned module is deep-cloned, a shared module is
/// aliased.
#[derive(Default)]
pub enum ModuleWrapper {
    #[default]
    Empty,
    Owned(Box<dyn Module>),
    Shared(SharedModule),
}

/// Non-owning read access to a wrapped module.
pub enum ModuleRef<'a> {
    Owned(&'a (dyn Module + 'static)),
    Shared(RwLockReadGuard<'a, Box<dyn Module>>),
}

/// Non-owning write access to a wrapped module.
pub enum ModuleRefMut<'a> {
    Owned(&'a mut (dyn Module + 'static)),
    Shared(RwLockWriteGuard<'a, Box<dyn Module>>),
}

impl Deref for ModuleRef<'_> {
    type Target = dyn Module;

    fn deref(&self) -> &Self::Target {
        match self {
            ModuleRef::Owned(module) => *module,
            ModuleRef::Shared(guard) => &***guard,
        }
    }
}

impl Deref for ModuleRefMut<'_> {
    type Target = dyn Module;

    fn deref(&self) -> &Self::Target {
        match self {
            ModuleRefMut::Owned(module) => &**module,
            ModuleRefMut::Shared(guard) => &***guard,
        }
    }
}

impl DerefMut for ModuleRefMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            ModuleRefMut::Owned(module) => &mut **module,
            ModuleRefMut::Shared(guard) => &mut ***guard,
        }
    }
}

impl ModuleWrapper {
    /// Takes unique ownership of `module`.
    pub fn owned<M: Module + 'static>(module: M) -> Self {
        ModuleWrapper::Owned(Box::new(module))
    }

    pub fn from_box(module: Box<dyn Module>) -> Self {
        ModuleWrapper::Owned(module)
    }

    /// Joins the shared ownership of `module`.
    pub fn shared(module: SharedModule) -> Self {
        ModuleWrapper::Shared(module)
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ModuleWrapper::Owned(_))
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, ModuleWrapper::Shared(_))
    }

    /// True iff a module is held and reachable.
    ///
    /// A shared module whose lock was poisoned by a panicking holder counts as
    /// invalid; this never panics.
    pub fn is_valid(&self) -> bool {
        match self {
            ModuleWrapper::Empty => false,
            ModuleWrapper::Owned(_) => true,
            ModuleWrapper::Shared(shared) => !shared.is_poisoned(),
        }
    }

    /// Releases the held module, leaving the wrapper empty.
    ///
    /// An owned module is dropped; a shared one only loses this holder.
    pub fn reset(&mut self) {
        *self = ModuleWrapper::Empty;
    }

    /// Read access to the module, `None` when empty or invalid.
    ///
    /// The observer borrows the wrapper and cannot extend the module's
    /// lifetime. For a shared module it holds a read lock while alive.
    pub fn get(&self) -> Option<ModuleRef<'_>> {
        match self {
            ModuleWrapper::Empty => None,
            ModuleWrapper::Owned(module) => Some(ModuleRef::Owned(&**module)),
            ModuleWrapper::Shared(shared) => shared.read().ok().map(ModuleRef::Shared),
        }
    }

    /// Write access to the module, `None` when empty or invalid.
    pub fn get_mut(&mut self) -> Option<ModuleRefMut<'_>> {
        match self {
            ModuleWrapper::Empty => None,
            ModuleWrapper::Owned(module) => Some(ModuleRefMut::Owned(&mut **module)),
            ModuleWrapper::Shared(shared) => shared.write().ok().map(ModuleRefMut::Shared),
        }
    }

    /// Promotes unique ownership to shared ownership in place.
    ///
    /// The module is moved, not copied, into the shared cell. A shared wrapper
    /// hands out another handle unchanged; an empty wrapper yields `None`.
    pub fn make_shared(&mut self) -> Option<SharedModule> {
        match std::mem::take(self) {
            ModuleWrapper::Empty => None,
            ModuleWrapper::Owned(module) => {
                let shared: SharedModule = Arc::new(RwLock::new(module));
                *self = ModuleWrapper::Shared(Arc::clone(&shared));
                Some(shared)
            }
            ModuleWrapper::Shared(shared) => {
                *self = ModuleWrapper::Shared(Arc::clone(&shared));
                Some(shared)
            }
        }
    }

    /// True if both wrappers share the same module instance.
    pub fn ptr_eq(&self, other: &ModuleWrapper) -> bool {
        match (self, other) {
            (ModuleWrapper::Shared(a), ModuleWrapper::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of holders of a shared module; 1 for an owned one, 0 when empty.
    pub fn holders(&self) -> usize {
        match self {
            ModuleWrapper::Empty => 0,
            ModuleWrapper::Owned(_) => 1,
            ModuleWrapper::Shared(shared) => Arc::strong_count(shared),
        }
    }
}

impl Clone for ModuleWrapper {
    fn clone(&self) -> Self {
        match self {
            ModuleWrapper::Empty => ModuleWrapper::Empty,
            ModuleWrapper::Owned(module) => ModuleWrapper::Owned(module.clone_module()),
            ModuleWrapper::Shared(shared) => ModuleWrapper::Shared(Arc::clone(shared)),
        }
    }
}

impl fmt::Debug for ModuleWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleWrapper::Empty => write!(f, "ModuleWrapper::Empty"),
            ModuleWrapper::Owned(module) => write!(f, "ModuleWrapper::Owned({:?})", module),
            ModuleWrapper::Shared(shared) => match shared.read() {
                Ok(guard) => write!(f, "ModuleWrapper::Shared({:?})", &**guard),
                Err(_) => write!(f, "ModuleWrapper::Shared(Error: RwLock poisoned)"),
            },
        }
    }
}

impl From<Box<dyn Module>> for ModuleWrapper {
    fn from(module: Box<dyn Module>) -> Self {
        ModuleWrapper::Owned(module)
    }
}

impl From<SharedModule> for ModuleWrapper {
    fn from(module: SharedModule) -> Self {
        ModuleWrapper::Shared(module)
    }
}

#[cfg(test)]
#[path = "wrapper_test.rs"]
mod tests;
