use crate::error::EmberError;
use crate::nn::module::{unary_forward, Module, UnaryModule};
use crate::variable::Variable;

/// Passes its input through unchanged. Has no parameters.
#[derive(Debug, Clone)]
pub struct Identity {
    train: bool,
}

impl Default for Identity {
    fn default() -> Self {
        Identity { train: true }
    }
}

impl Identity {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnaryModule for Identity {
    fn forward_unary(&self, input: &Variable) -> Result<Variable, EmberError> {
        Ok(input.clone())
    }
}

impl Module for Identity {
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError> {
        unary_forward(self, inputs)
    }

    fn params(&self) -> Vec<Variable> {
        Vec::new()
    }

    fn set_params(&mut self, _var: Variable, position: usize) -> Result<(), EmberError> {
        Err(EmberError::ParamIndexOutOfRange { index: position, len: 0 })
    }

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_training(&self) -> bool {
        self.train
    }

    fn clone_module(&self) -> Box<dyn Module> {
        Box::new(self.clone())
    }

    fn pretty_string(&self) -> String {
        "Identity".to_string()
    }
}
