use crate::error::EmberError;
use crate::nn::config::ModuleConfig;
use crate::variable::Variable;
use std::fmt::Debug;

/// The base trait for all neural network modules (layers, containers, etc.).
///
/// A module performs forward computation over a sequence of [`Variable`]s and
/// owns an ordered list of parameters. The ordering is defined by the module
/// and must be stable: containers, checkpointing and gradient synchronization
/// all address parameters by position.
pub trait Module: Debug + Send + Sync {
    /// Performs a forward pass of the module.
    ///
    /// # Arguments
    /// * `inputs`: The values to run forward computation on.
    ///
    /// # Returns
    /// The output values, or an `EmberError` if the computation fails.
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError>;

    /// Returns handles to the module's parameters, in position order.
    ///
    /// Handles alias the module's own storage.
    fn params(&self) -> Vec<Variable>;

    /// Returns the parameter at `position`.
    ///
    /// # Errors
    /// Returns `EmberError::ParamIndexOutOfRange` if `position` is not valid.
    fn param(&self, position: usize) -> Result<Variable, EmberError> {
        let params = self.params();
        let len = params.len();
        params
            .into_iter()
            .nth(position)
            .ok_or(EmberError::ParamIndexOutOfRange { index: position, len })
    }

    /// Number of parameters (not elements) held by the module.
    fn num_params(&self) -> usize {
        self.params().len()
    }

    /// Replaces the parameter at `position` with `var`.
    ///
    /// A new slot is never created: an invalid position is an error and
    /// leaves the module untouched.
    fn set_params(&mut self, var: Variable, position: usize) -> Result<(), EmberError>;

    /// Switches the module to training mode.
    fn train(&mut self);

    /// Switches the module to evaluation mode.
    fn eval(&mut self);

    /// Whether the module is in training mode.
    fn is_training(&self) -> bool;

    /// Clears the gradient buffers of all parameters.
    fn zero_grad(&self) {
        for param in self.params() {
            param.zero_grad();
        }
    }

    /// Deep copy of the module and its parameters.
    fn clone_module(&self) -> Box<dyn Module>;

    /// Human readable description of the module.
    fn pretty_string(&self) -> String;
}

/// A module mapping exactly one input to exactly one output.
pub trait UnaryModule: Module {
    fn forward_unary(&self, input: &Variable) -> Result<Variable, EmberError>;
}

/// Adapts a [`UnaryModule`] to the sequence form of [`Module::forward`].
///
/// # Errors
/// Returns `EmberError::InvalidArgument` unless `inputs` holds exactly one value.
pub fn unary_forward<M: UnaryModule + ?Sized>(
    module: &M,
    inputs: &[Variable],
) -> Result<Vec<Variable>, EmberError> {
    match inputs {
        [input] => Ok(vec![module.forward_unary(input)?]),
        _ => Err(EmberError::InvalidArgument(format!(
            "unary module expects 1 input, got {}",
            inputs.len()
        ))),
    }
}

/// Parameter storage and mode flag shared by module implementations.
///
/// Provides the default behaviours of a module: bounds-checked replacement,
/// and train/eval toggling gradient computation on every parameter it holds.
#[derive(Debug)]
pub struct ModuleParams {
    params: Vec<Variable>,
    train: bool,
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self::with_config(&ModuleConfig::default())
    }
}

impl ModuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ModuleConfig) -> Self {
        ModuleParams {
            params: Vec::new(),
            train: config.train,
        }
    }

    /// Builds storage from existing parameters with the default config
    /// (train mode).
    pub fn from_params(params: Vec<Variable>) -> Self {
        Self::from_params_with_config(params, &ModuleConfig::default())
    }

    /// Builds storage from existing parameters, starting in the mode `config`
    /// names. Only the flag is set; call [`ModuleParams::train`] or
    /// [`ModuleParams::eval`] to align the parameters' `calc_grad`.
    pub fn from_params_with_config(params: Vec<Variable>, config: &ModuleConfig) -> Self {
        ModuleParams {
            params,
            train: config.train,
        }
    }

    pub fn as_slice(&self) -> &[Variable] {
        &self.params
    }

    pub fn to_vec(&self) -> Vec<Variable> {
        self.params.clone()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn push(&mut self, var: Variable) {
        self.params.push(var);
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn get(&self, position: usize) -> Result<&Variable, EmberError> {
        self.params.get(position).ok_or(EmberError::ParamIndexOutOfRange {
            index: position,
            len: self.params.len(),
        })
    }

    /// Bounds check without mutation.
    pub fn check_position(&self, position: usize) -> Result<(), EmberError> {
        self.get(position).map(|_| ())
    }

    /// Replaces the slot at `position`.
    pub fn set(&mut self, var: Variable, position: usize) -> Result<(), EmberError> {
        let len = self.params.len();
        let slot = self
            .params
            .get_mut(position)
            .ok_or(EmberError::ParamIndexOutOfRange { index: position, len })?;
        *slot = var;
        Ok(())
    }

    pub fn is_training(&self) -> bool {
        self.train
    }

    /// Sets the mode flag only; parameters are left untouched.
    pub fn set_training(&mut self, train: bool) {
        self.train = train;
    }

    /// Training mode: every parameter computes gradients.
    pub fn train(&mut self) {
        self.train = true;
        for param in &self.params {
            param.set_calc_grad(true);
        }
    }

    /// Evaluation mode: no parameter computes gradients.
    pub fn eval(&mut self) {
        self.train = false;
        for param in &self.params {
            param.set_calc_grad(false);
        }
    }

    /// Copies every parameter into fresh storage, keeping the mode flag.
    pub fn deep_copy(&self) -> Self {
        ModuleParams {
            params: self.params.iter().map(Variable::deep_copy).collect(),
            train: self.train,
        }
    }
}

#[cfg(test)]
#[path = "module_test.rs"]
mod tests;
