use crate::error::EmberError;
use crate::nn::module::Module;
use crate::variable::Variable;
use log::debug;

/// Snapshot of one parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamState {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
    pub calc_grad: bool,
}

/// Parameter snapshots of a model, in its flat parameter order.
///
/// Entries are matched to parameters by position only, so a dict restores
/// correctly as long as the model's structure did not change in between.
/// Serializing it is left to the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateDict {
    pub params: Vec<ParamState>,
}

impl StateDict {
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Copies every parameter of `model`.
pub fn state_dict(model: &dyn Module) -> StateDict {
    let params = model
        .params()
        .iter()
        .map(|p| {
            let data = p.read_data();
            ParamState {
                shape: data.shape.clone(),
                values: data.values.clone(),
                calc_grad: data.calc_grad,
            }
        })
        .collect();
    StateDict { params }
}

/// Restores parameters from `state` through [`Module::set_params`].
///
/// Fresh variables are installed, so any previous handles keep the old values.
///
/// # Errors
/// `StateDictMismatch` if the parameter counts differ and `ShapeMismatch` if any
/// shape differs. Both are checked before the first parameter is replaced.
pub fn load_state_dict(model: &mut dyn Module, state: &StateDict) -> Result<(), EmberError> {
    let current = model.params();
    if current.len() != state.len() {
        return Err(EmberError::StateDictMismatch {
            expected: current.len(),
            actual: state.len(),
        });
    }
    for (param, saved) in current.iter().zip(&state.params) {
        let shape = param.shape();
        if shape != saved.shape {
            return Err(EmberError::ShapeMismatch {
                expected: shape,
                actual: saved.shape.clone(),
                operation: "load_state_dict".to_string(),
            });
        }
    }
    for (position, saved) in state.params.iter().enumerate() {
        let var =
            Variable::with_calc_grad(saved.values.clone(), saved.shape.clone(), saved.calc_grad)?;
        model.set_params(var, position)?;
    }
    debug!("load_state_dict: restored {} params", state.len());
    Ok(())
}
