use crate::error::EmberError;
use crate::nn::config::ModuleConfig;
use crate::nn::module::{Module, ModuleParams};
use crate::nn::wrapper::{ModuleWrapper, SharedModule};
use crate::variable::Variable;
use log::{debug, trace, warn};
use std::collections::{BTreeMap, HashMap};

/// Orphaned flat positions keyed by the index of the child they follow.
///
/// `None` collects positions seen before any child.
pub type OrphanedParams = BTreeMap<Option<usize>, Vec<usize>>;

/// A collection of child modules and the flattened list of their parameters.
///
/// Each child's parameters are appended to the flat list when the child is
/// added, and `child_param_idx` maps every such flat position back to
/// `(child index, local index)`. Parameters pushed with [`Container::add_param`]
/// belong to the container itself and are not indexed.
///
/// `Container` does not implement [`Module`] on its own since it has no forward
/// computation; composite modules such as
/// [`Sequential`](crate::nn::sequential::Sequential) embed it.
#[derive(Debug)]
pub struct Container {
    params: ModuleParams,
    modules: Vec<ModuleWrapper>,
    // flat param index -> (module index, module param index)
    child_param_idx: HashMap<usize, (usize, usize)>,
}

impl Default for Container {
    fn default() -> Self {
        Self::with_config(&ModuleConfig::default())
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ModuleConfig) -> Self {
        Container {
            params: ModuleParams::with_config(config),
            modules: Vec::new(),
            child_param_idx: HashMap::new(),
        }
    }

    /// Adds a uniquely owned module. Its parameters stay aliased between the
    /// child and the flat list.
    pub fn add<M: Module + 'static>(&mut self, module: M) {
        let params = module.params();
        self.push_child(ModuleWrapper::owned(module), params);
    }

    pub fn add_boxed(&mut self, module: Box<dyn Module>) {
        let params = module.params();
        self.push_child(ModuleWrapper::Owned(module), params);
    }

    /// Adds a module shared with other holders.
    ///
    /// # Errors
    /// Returns `EmberError::InvalidArgument` if the module's lock is poisoned.
    pub fn add_shared(&mut self, module: SharedModule) -> Result<(), EmberError> {
        self.add_wrapper(ModuleWrapper::Shared(module))
    }

    /// Adds a child keeping the wrapper's ownership mode.
    ///
    /// # Errors
    /// Returns `EmberError::InvalidArgument` for an empty or invalid wrapper.
    pub fn add_wrapper(&mut self, wrapper: ModuleWrapper) -> Result<(), EmberError> {
        let params = wrapper
            .get()
            .map(|module| module.params())
            .ok_or_else(|| {
                EmberError::InvalidArgument("can't add null module to container".to_string())
            })?;
        self.push_child(wrapper, params);
        Ok(())
    }

    fn push_child(&mut self, wrapper: ModuleWrapper, params: Vec<Variable>) {
        let module_idx = self.modules.len();
        let first = self.params.len();
        for (local_idx, param) in params.into_iter().enumerate() {
            self.child_param_idx
                .insert(self.params.len(), (module_idx, local_idx));
            self.params.push(param);
        }
        debug!(
            "Container: added child {} ({}) with params [{}..{})",
            module_idx,
            if wrapper.is_shared() { "shared" } else { "owned" },
            first,
            self.params.len()
        );
        self.modules.push(wrapper);
    }

    /// Adds a parameter owned by the container itself.
    pub fn add_param(&mut self, var: Variable) {
        debug!("Container: added direct param at {}", self.params.len());
        self.params.push(var);
    }

    /// Removes all children and parameters.
    pub fn clear(&mut self) {
        self.child_param_idx.clear();
        self.modules.clear();
        self.params.clear();
        debug!("Container: cleared");
    }

    /// Finds parameters not contributed by any child.
    ///
    /// Scans the flat list: an indexed position skips over the owning child's
    /// whole block (its current parameter count, assumed contiguous), an
    /// unindexed one is recorded under the most recently seen child. This is
    /// an introspection aid; "after child k" is not ownership by child k.
    pub fn orphaned_params_idx_map(&self) -> OrphanedParams {
        let mut prev_module_idx: Option<usize> = None;
        let mut orphans = OrphanedParams::new();
        let mut i = 0;
        while i < self.params.len() {
            match self.child_param_idx.get(&i) {
                Some(&(module_idx, _)) => {
                    prev_module_idx = Some(module_idx);
                    let block = self
                        .modules
                        .get(module_idx)
                        .and_then(|wrapper| wrapper.get().map(|module| module.num_params()))
                        .unwrap_or(1);
                    i += block.max(1);
                }
                None => {
                    orphans.entry(prev_module_idx).or_default().push(i);
                    i += 1;
                }
            }
        }
        orphans
    }

    /// Returns the child at `id`.
    ///
    /// # Errors
    /// Returns `EmberError::ModuleIndexOutOfRange` for an invalid index.
    pub fn module(&self, id: usize) -> Result<&ModuleWrapper, EmberError> {
        self.modules.get(id).ok_or(EmberError::ModuleIndexOutOfRange {
            index: id,
            len: self.modules.len(),
        })
    }

    pub fn module_mut(&mut self, id: usize) -> Result<&mut ModuleWrapper, EmberError> {
        let len = self.modules.len();
        self.modules
            .get_mut(id)
            .ok_or(EmberError::ModuleIndexOutOfRange { index: id, len })
    }

    /// Copies the children; each wrapper is cloned per its ownership mode.
    pub fn modules(&self) -> Vec<ModuleWrapper> {
        self.modules.clone()
    }

    pub fn children(&self) -> &[ModuleWrapper] {
        &self.modules
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolves a flat position to `(child index, local index)`.
    pub fn child_param_index(&self, position: usize) -> Option<(usize, usize)> {
        self.child_param_idx.get(&position).copied()
    }

    pub fn params(&self) -> Vec<Variable> {
        self.params.to_vec()
    }

    pub fn param(&self, position: usize) -> Result<Variable, EmberError> {
        self.params.get(position).cloned()
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    pub fn is_training(&self) -> bool {
        self.params.is_training()
    }

    /// Switches the container and every child into train mode.
    pub fn train(&mut self) {
        self.set_mode(true);
    }

    /// Switches the container and every child into eval mode.
    pub fn eval(&mut self) {
        self.set_mode(false);
    }

    // Only container-owned params are toggled here; children handle their own.
    fn set_mode(&mut self, train: bool) {
        self.params.set_training(train);
        for (i, param) in self.params.as_slice().iter().enumerate() {
            if !self.child_param_idx.contains_key(&i) {
                param.set_calc_grad(train);
            }
        }
        for (idx, wrapper) in self.modules.iter_mut().enumerate() {
            match wrapper.get_mut() {
                Some(mut module) => {
                    trace!("Container: child {} -> train={}", idx, train);
                    if train {
                        module.train();
                    } else {
                        module.eval();
                    }
                }
                None => warn!("Container: skipping invalid child {} on mode switch", idx),
            }
        }
    }

    /// Replaces the flat parameter at `position`, writing through to the
    /// owning child when the position is indexed.
    ///
    /// # Errors
    /// `ParamIndexOutOfRange` for an invalid position and `InvalidModuleState`
    /// for an unreachable child. Nothing is modified on error.
    pub fn set_params(&mut self, var: Variable, position: usize) -> Result<(), EmberError> {
        self.params.check_position(position)?;
        if let Some((module_idx, local_idx)) = self.child_param_index(position) {
            let mut child = self
                .modules
                .get_mut(module_idx)
                .and_then(|wrapper| wrapper.get_mut())
                .ok_or(EmberError::InvalidModuleState { index: module_idx })?;
            child.set_params(var.clone(), local_idx)?;
        }
        self.params.set(var, position)
    }

    /// Pipeline diagram followed by one line per child.
    pub fn pretty_string(&self) -> String {
        let mut out = String::from(" [input");
        for i in 0..self.modules.len() {
            out.push_str(&format!(" -> ({})", i));
        }
        out.push_str(" -> output]");
        for (i, wrapper) in self.modules.iter().enumerate() {
            let child = wrapper
                .get()
                .map(|module| module.pretty_string())
                .unwrap_or_else(|| "<invalid>".to_string());
            out.push_str(&format!("\n\t({}): {}", i, child));
        }
        out
    }

    /// Deep copy of children and parameters.
    ///
    /// Every child is cloned into unique ownership, shared ones included.
    /// Container-owned params are copied and re-inserted after the child they
    /// followed, keeping their gradient flag.
    ///
    /// A child that is unreachable (poisoned shared lock) cannot be cloned and
    /// is kept as [`ModuleWrapper::Empty`] at the same index, contributing no
    /// parameters. This is the only way a container ends up holding an empty
    /// child; [`Container::add_wrapper`] refuses them. Check
    /// [`ModuleWrapper::is_valid`] on the copy's children when the source may
    /// hold poisoned modules. Forwarding through such a copy fails with
    /// `InvalidModuleState`.
    pub fn copy(&self) -> Container {
        let orphans = self.orphaned_params_idx_map();
        let mut copy = Container {
            params: ModuleParams::with_config(&ModuleConfig::new().train(self.is_training())),
            modules: Vec::with_capacity(self.modules.len()),
            child_param_idx: HashMap::new(),
        };
        let keys = std::iter::once(None).chain((0..self.modules.len()).map(Some));
        for key in keys {
            if let Some(idx) = key {
                match self.modules[idx].get() {
                    Some(module) => copy.add_boxed(module.clone_module()),
                    None => {
                        warn!("Container: child {} is invalid, copied as empty", idx);
                        copy.modules.push(ModuleWrapper::Empty);
                    }
                }
            }
            for &position in orphans.get(&key).into_iter().flatten() {
                copy.params.push(self.params.as_slice()[position].deep_copy());
            }
        }
        debug!(
            "Container: deep copied {} children, {} params",
            copy.modules.len(),
            copy.params.len()
        );
        copy
    }
}

#[cfg(test)]
#[path = "container_test.rs"]
mod tests;
