use crate::error::EmberError;
use crate::nn::init::kaiming_uniform;
use crate::nn::module::{unary_forward, Module, ModuleParams, UnaryModule};
use crate::variable::Variable;

/// Applies a linear transformation to the incoming data: y = xW^T + b
///
/// Parameter order is `[weight, bias]`, weight shaped `[out_features, in_features]`
/// and bias `[out_features]`. Inputs may be `[in_features]` or
/// `[batch, in_features]`.
#[derive(Debug)]
pub struct Linear {
    params: ModuleParams,
    in_features: usize,
    out_features: usize,
    has_bias: bool,
}

impl Linear {
    /// Creates a new Linear layer with uniformly initialized weights and bias.
    ///
    /// # Arguments
    /// * `in_features` - Size of each input sample.
    /// * `out_features` - Size of each output sample.
    /// * `has_bias` - If `true`, the layer will learn an additive bias.
    pub fn new(in_features: usize, out_features: usize, has_bias: bool) -> Result<Self, EmberError> {
        let weight = kaiming_uniform(&[out_features, in_features], in_features)?;
        let mut params = vec![weight];
        if has_bias {
            params.push(kaiming_uniform(&[out_features], in_features)?);
        }
        Self::from_params(params, in_features, out_features)
    }

    /// Builds a layer from explicit weight (and optional bias) variables.
    ///
    /// # Errors
    /// Returns `EmberError::ShapeMismatch` if the bias does not match the weight.
    pub fn from_weights(weight: Variable, bias: Option<Variable>) -> Result<Self, EmberError> {
        let shape = weight.shape();
        let (out_features, in_features) = match shape.as_slice() {
            [out, inp] => (*out, *inp),
            _ => {
                return Err(EmberError::ShapeMismatch {
                    expected: vec![0, 0],
                    actual: shape,
                    operation: "Linear::from_weights".to_string(),
                })
            }
        };
        let mut params = vec![weight];
        if let Some(bias) = bias {
            if bias.shape() != [out_features] {
                return Err(EmberError::ShapeMismatch {
                    expected: vec![out_features],
                    actual: bias.shape(),
                    operation: "Linear::from_weights".to_string(),
                });
            }
            params.push(bias);
        }
        Self::from_params(params, in_features, out_features)
    }

    fn from_params(
        params: Vec<Variable>,
        in_features: usize,
        out_features: usize,
    ) -> Result<Self, EmberError> {
        let has_bias = params.len() == 2;
        let mut params = ModuleParams::from_params(params);
        params.train();
        Ok(Linear {
            params,
            in_features,
            out_features,
            has_bias,
        })
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weight(&self) -> Result<&Variable, EmberError> {
        self.params.get(0)
    }

    pub fn bias(&self) -> Option<&Variable> {
        if self.has_bias {
            self.params.get(1).ok()
        } else {
            None
        }
    }
}

impl UnaryModule for Linear {
    fn forward_unary(&self, input: &Variable) -> Result<Variable, EmberError> {
        let shape = input.shape();
        let (batch, out_shape) = match shape.as_slice() {
            [n] if *n == self.in_features => (1, vec![self.out_features]),
            [b, n] if *n == self.in_features => (*b, vec![*b, self.out_features]),
            _ => {
                return Err(EmberError::ShapeMismatch {
                    expected: vec![self.in_features],
                    actual: shape,
                    operation: "Linear::forward".to_string(),
                })
            }
        };

        let x = input.to_vec();
        let w = self.weight()?.to_vec();
        let b = self.bias().map(Variable::to_vec);
        let mut out = vec![0.0f32; batch * self.out_features];
        for row in 0..batch {
            let xr = &x[row * self.in_features..(row + 1) * self.in_features];
            for o in 0..self.out_features {
                let wr = &w[o * self.in_features..(o + 1) * self.in_features];
                let dot: f32 = xr.iter().zip(wr).map(|(a, b)| a * b).sum();
                let bias = b.as_ref().map_or(0.0, |b| b[o]);
                out[row * self.out_features + o] = dot + bias;
            }
        }
        Variable::with_calc_grad(out, out_shape, input.is_calc_grad() || self.params.is_training())
    }
}

impl Module for Linear {
    fn forward(&self, inputs: &[Variable]) -> Result<Vec<Variable>, EmberError> {
        unary_forward(self, inputs)
    }

    fn params(&self) -> Vec<Variable> {
        self.params.to_vec()
    }

    /// Replaces the weight (position 0) or bias (position 1).
    ///
    /// # Errors
    /// `ShapeMismatch` if `var` does not have the slot's shape, in which case
    /// the layer is left untouched.
    fn set_params(&mut self, var: Variable, position: usize) -> Result<(), EmberError> {
        self.params.check_position(position)?;
        let expected = if position == 0 {
            vec![self.out_features, self.in_features]
        } else {
            vec![self.out_features]
        };
        let actual = var.shape();
        if actual != expected {
            return Err(EmberError::ShapeMismatch {
                expected,
                actual,
                operation: "Linear::set_params".to_string(),
            });
        }
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
        Box::new(Linear {
            params: self.params.deep_copy(),
            in_features: self.in_features,
            out_features: self.out_features,
            has_bias: self.has_bias,
        })
    }

    fn pretty_string(&self) -> String {
        let mut out = format!("Linear ({}->{})", self.in_features, self.out_features);
        if !self.has_bias {
            out.push_str(" (without bias)");
        }
        out
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
