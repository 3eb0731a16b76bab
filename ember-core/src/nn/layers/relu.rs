use crate::error::EmberError;
use crate::nn::module::{unary_forward, Module, UnaryModule};
use crate::variable::Variable;

/// Layer that applies the Rectified Linear Unit (ReLU) activation function.
///
/// This layer does not have any learnable parameters.
#[derive(Debug, Clone)]
pub struct ReLU {
    train: bool,
}

impl Default for ReLU {
    fn default() -> Self {
        ReLU { train: true }
    }
}

impl ReLU {
    /// Creates a new ReLU layer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnaryModule for ReLU {
    fn forward_unary(&self, input: &Variable) -> Result<Variable, EmberError> {
        Ok(input.map(|x| x.max(0.0)))
    }
}

impl Module for ReLU {
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError> {
        unary_forward(self, inputs)
    }

    fn params(&self) -> Vec<Variable> {
        Vec::new() // ReLU has no parameters
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
        "ReLU".to_string()
    }
}
