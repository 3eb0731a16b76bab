use crate::error::EmberError;
use crate::variable::Variable;
use rand::distributions::{Distribution, Uniform};
use rand_distr::Normal;

/// Variable of `shape` drawn from `U(-bound, bound)`.
///
/// # Errors
/// Returns `EmberError::InvalidArgument` unless `bound` is positive and finite.
pub fn uniform(shape: &[usize], bound: f32) -> Result<Variable, EmberError> {
    if !(bound > 0.0 && bound.is_finite()) {
        return Err(EmberError::InvalidArgument(format!(
            "uniform bound must be positive, got {}",
            bound
        )));
    }
    let dist = Uniform::new(-bound, bound);
    let mut rng = rand::thread_rng();
    let numel = shape.iter().product();
    let values: Vec<f32> = (0..numel).map(|_| dist.sample(&mut rng)).collect();
    Variable::new(values, shape.to_vec())
}

/// Variable of `shape` drawn from `N(mean, std^2)`.
pub fn normal(shape: &[usize], mean: f32, std: f32) -> Result<Variable, EmberError> {
    let dist = Normal::new(mean, std)
        .map_err(|e| EmberError::InvalidArgument(format!("normal init: {}", e)))?;
    let mut rng = rand::thread_rng();
    let numel = shape.iter().product();
    let values: Vec<f32> = (0..numel).map(|_| dist.sample(&mut rng)).collect();
    Variable::new(values, shape.to_vec())
}

/// Uniform init with bound `1/sqrt(fan_in)`, the usual default for dense layers.
pub fn kaiming_uniform(shape: &[usize], fan_in: usize) -> Result<Variable, EmberError> {
    if fan_in == 0 {
        return Err(EmberError::InvalidArgument(
            "kaiming_uniform requires fan_in > 0".to_string(),
        ));
    }
    uniform(shape, 1.0 / (fan_in as f32).sqrt())
}
