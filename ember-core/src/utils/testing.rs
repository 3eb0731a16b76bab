use crate::error::EmberError;
use crate::nn::module::{Module, ModuleParams};
use crate::variable::Variable;

/// A leaf module with a configurable number of parameters and outputs.
///
/// Parameter `i` is a `[1]` variable holding `i`, with gradient tracking on.
/// `forward` adds one to the first input and emits it `outputs` times.
#[derive(Debug)]
pub struct MockModule {
    label: String,
    params: ModuleParams,
    outputs: usize,
}

impl MockModule {
    pub fn new(label: &str, num_params: usize) -> Self {
        let params = (0..num_params)
            .map(|i| {
                let var = Variable::scalar(i as f32);
                var.set_calc_grad(true);
                var
            })
            .collect();
        MockModule {
            label: label.to_string(),
            params: ModuleParams::from_params(params),
            outputs: 1,
        }
    }

    /// Sets how many values `forward` produces.
    pub fn with_outputs(mut self, outputs: usize) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Module for MockModule {
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError> {
        let first = inputs.first().ok_or_else(|| {
            EmberError::InvalidArgument(format!("{} received no inputs", self.label))
        })?;
        let out = first.map(|x| x + 1.0);
        Ok(vec![out; self.outputs])
    }

    fn params(&self) -> Vec<Variable> {
        self.params.to_vec()
    }

    fn set_params(&mut self, var: Variable, position: usize) -> Result<(), EmberError> {
        self.params.set(var, position)
    }

    fn train(&mut self) {
        self.params.train();
    }

    fn eval(&mut self) {
        self.params.eval();
    }

    fn is_training(&self) -> bool {
        self.params.is_training()
    }

    fn clone_module(&self) -> Box<dyn Module> {
        Box::new(MockModule {
            label: self.label.clone(),
            params: self.params.deep_copy(),
            outputs: self.outputs,
        })
    }

    fn pretty_string(&self) -> String {
        format!("Mock({}, params={})", self.label, self.params.len())
    }
}
