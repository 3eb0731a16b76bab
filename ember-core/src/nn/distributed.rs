use crate::error::EmberError;
use crate::nn::module::Module;
use crate::variable::VariableData;
use log::{debug, trace};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Reduces one gradient buffer across workers.
///
/// Implementations own the transport. `position` is the parameter's index in
/// the model's flat parameter list, which is identical on every worker as long
/// as all of them built the same structure.
pub trait GradientReducer: Send + Sync {
    fn reduce(&self, position: usize, grad: &mut Vec<f32>) -> Result<(), EmberError>;
}

/// Reduces every present gradient of `model` in flat parameter order.
///
/// Parameters without a gradient are skipped. A parameter reachable from
/// several flat positions (a shared child registered more than once) is
/// reduced once, keyed by its first position. Returns the number of buffers
/// reduced.
///
/// # Errors
/// Propagates the first reducer failure; earlier buffers stay reduced.
pub fn sync_gradients(
    model: &dyn Module,
    reducer: &dyn GradientReducer,
) -> Result<usize, EmberError> {
    let mut seen: HashSet<*const RwLock<VariableData>> = HashSet::new();
    let mut reduced = 0;
    for (position, param) in model.params().iter().enumerate() {
        if !seen.insert(Arc::as_ptr(&param.data)) {
            trace!("sync_gradients: param {} already reduced", position);
            continue;
        }
        let Some(mut grad) = param.grad() else {
            trace!("sync_gradients: param {} has no grad", position);
            continue;
        };
        reducer.reduce(position, &mut grad)?;
        param.set_grad(grad)?;
        reduced += 1;
    }
    debug!("sync_gradients: reduced {} buffers", reduced);
    Ok(reduced)
}

/// Single-process stand-in for an all-reduce mean: scales by `1 / world_size`.
#[derive(Clone, Debug)]
pub struct MeanReducer {
    world_size: usize,
}

impl MeanReducer {
    /// # Errors
    /// Returns `EmberError::InvalidArgument` for a zero world size.
    pub fn new(world_size: usize) -> Result<Self, EmberError> {
        if world_size == 0 {
            return Err(EmberError::InvalidArgument(
                "world size must be at least 1".to_string(),
            ));
        }
        Ok(MeanReducer { world_size })
    }

    pub fn world_size(&self) -> usize {
        self.world_size
    }
}

impl GradientReducer for MeanReducer {
    fn reduce(&self, _position: usize, grad: &mut Vec<f32>) -> Result<(), EmberError> {
        let scale = 1.0 / self.world_size as f32;
        grad.iter_mut().for_each(|g| *g *= scale);
        Ok(())
    }
}
