use crate::error::EmberError;
use crate::nn::config::ModuleConfig;
use crate::nn::container::Container;
use crate::nn::module::Module;
use crate::variable::Variable;
use std::ops::{Deref, DerefMut};

/// A container applying its children in order.
///
/// Each child's outputs are fed as the next child's inputs. The structural
/// API (`add`, `add_shared`, `module`, ...) is the embedded [`Container`]'s.
///
/// ```ignore
/// let mut model = Sequential::new();
/// model.add(Linear::new(4, 8, true)?);
/// model.add(ReLU::new());
/// model.add(Linear::new(8, 1, true)?);
/// let y = model.forward_one(&x)?;
/// ```
#[derive(Debug, Default)]
pub struct Sequential {
    container: Container,
}

impl Sequential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ModuleConfig) -> Self {
        Sequential {
            container: Container::with_config(config),
        }
    }

    /// Adds a uniquely owned child and returns `self` for chaining.
    pub fn with<M: Module + 'static>(mut self, module: M) -> Self {
        self.container.add(module);
        self
    }

    /// Runs the pipeline on a single value.
    ///
    /// # Errors
    /// Returns `EmberError::InvalidArgument` if the last stage does not produce
    /// exactly one value.
    pub fn forward_one(&self, input: &Variable) -> Result<Variable, EmberError> {
        let mut output = self.forward(std::slice::from_ref(input))?;
        if output.len() != 1 {
            return Err(EmberError::InvalidArgument(format!(
                "module output size is not 1 (got {})",
                output.len()
            )));
        }
        Ok(output.remove(0))
    }

    /// Same as [`Sequential::forward_one`].
    pub fn call(&self, input: &Variable) -> Result<Variable, EmberError> {
        self.forward_one(input)
    }

    pub fn pretty_string(&self) -> String {
        format!("Sequential{}", self.container.pretty_string())
    }
}

impl Deref for Sequential {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

impl DerefMut for Sequential {
    fn deref_mut(&mut self) -> &mut Container {
        &mut self.container
    }
}

impl Module for Sequential {
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError> {
        let mut output = inputs.to_vec();
        for (idx, wrapper) in self.container.children().iter().enumerate() {
            let module = wrapper
                .get()
                .ok_or(EmberError::InvalidModuleState { index: idx })?;
            output = module.forward(&output)?;
        }
        Ok(output)
    }

    fn params(&self) -> Vec<Variable> {
        self.container.params()
    }

    fn set_params(&mut self, var: Variable, position: usize) -> Result<(), EmberError> {
        self.container.set_params(var, position)
    }

    fn train(&mut self) {
        self.container.train();
    }

    fn eval(&mut self) {
        self.container.eval();
    }

    fn is_training(&self) -> bool {
        self.container.is_training()
    }

    fn clone_module(&self) -> Box<dyn Module> {
        Box::new(Sequential {
            container: self.container.copy(),
        })
    }

    fn pretty_string(&self) -> String {
        Sequential::pretty_string(self)
    }
}

#[cfg(test)]
#[path = "sequential_test.rs"]
mod tests;
