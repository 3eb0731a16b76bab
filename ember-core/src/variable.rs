// src/variable.rs

use crate::error::EmberError;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Storage and autograd metadata behind a [`Variable`].
///
/// Values are stored flat in row-major order.
#[derive(Debug, Clone)]
pub struct VariableData {
    /// Flattened row-major values.
    pub(crate) values: Vec<f32>,
    pub(crate) shape: Vec<usize>,
    /// Whether gradients should be computed for this value.
    pub(crate) calc_grad: bool,
    /// Gradient buffer, same length as `values` once populated.
    pub(crate) grad: Option<Vec<f32>>,
}

impl VariableData {
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

/// An autograd-capable value handle.
///
/// `Variable` wraps `Arc<RwLock<VariableData>>`:
/// 1.  **Shared Ownership:** cloning a `Variable` is cheap and the clone aliases
///     the same storage, so a container's flat parameter list and the child
///     that contributed a parameter see the same value.
/// 2.  **Interior Mutability:** the gradient flag and buffer can be changed
///     through a shared reference.
///
/// Use [`Variable::deep_copy`] for an independent copy.
pub struct Variable {
    pub(crate) data: Arc<RwLock<VariableData>>,
}

impl Variable {
    /// Creates a new Variable from flattened data and a shape.
    ///
    /// Gradient tracking starts disabled.
    ///
    /// # Errors
    /// Returns `EmberError::TensorCreationError` if `values.len()` does not
    /// match the number of elements implied by `shape`.
    pub fn new(values: Vec<f32>, shape: Vec<usize>) -> Result<Self, EmberError> {
        let numel: usize = shape.iter().product();
        if values.len() != numel {
            return Err(EmberError::TensorCreationError {
                data_len: values.len(),
                shape,
            });
        }
        Ok(Self::from_data(VariableData {
            values,
            shape,
            calc_grad: false,
            grad: None,
        }))
    }

    /// Creates a Variable with an explicit gradient flag.
    pub fn with_calc_grad(
        values: Vec<f32>,
        shape: Vec<usize>,
        calc_grad: bool,
    ) -> Result<Self, EmberError> {
        let var = Self::new(values, shape)?;
        var.set_calc_grad(calc_grad);
        Ok(var)
    }

    /// Creates a one-element Variable of shape `[1]`.
    pub fn scalar(value: f32) -> Self {
        Self::from_data(VariableData {
            values: vec![value],
            shape: vec![1],
            calc_grad: false,
            grad: None,
        })
    }

    /// Creates a Variable filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Creates a Variable filled with `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        let numel = shape.iter().product();
        Self::from_data(VariableData {
            values: vec![value; numel],
            shape: shape.to_vec(),
            calc_grad: false,
            grad: None,
        })
    }

    fn from_data(data: VariableData) -> Self {
        Variable {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Acquires a read lock on the variable's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, VariableData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the variable's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, VariableData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns a clone of the variable's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the flattened values.
    pub fn to_vec(&self) -> Vec<f32> {
        self.read_data().values.clone()
    }

    /// Checks if gradient computation is enabled for this variable.
    pub fn is_calc_grad(&self) -> bool {
        self.read_data().calc_grad
    }

    /// Enables or disables gradient computation for this variable.
    pub fn set_calc_grad(&self, calc_grad: bool) {
        self.write_data().calc_grad = calc_grad;
    }

    /// Returns a clone of the gradient buffer, if one exists.
    pub fn grad(&self) -> Option<Vec<f32>> {
        self.read_data().grad.clone()
    }

    /// Replaces the gradient buffer.
    ///
    /// # Errors
    /// Returns `EmberError::ShapeMismatch` if `grad` does not have one entry
    /// per element.
    pub fn set_grad(&self, grad: Vec<f32>) -> Result<(), EmberError> {
        let mut guard = self.write_data();
        if grad.len() != guard.numel() {
            return Err(EmberError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: vec![grad.len()],
                operation: "set_grad".to_string(),
            });
        }
        guard.grad = Some(grad);
        Ok(())
    }

    /// Drops the gradient buffer.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// Copies values, shape and gradient flag into fresh storage.
    ///
    /// The gradient buffer is not carried over.
    pub fn deep_copy(&self) -> Self {
        let guard = self.read_data();
        Self::from_data(VariableData {
            values: guard.values.clone(),
            shape: guard.shape.clone(),
            calc_grad: guard.calc_grad,
            grad: None,
        })
    }

    /// Returns true if both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Applies `f` element-wise, producing a new Variable of the same shape.
    /// The result inherits the gradient flag.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        let guard = self.read_data();
        Self::from_data(VariableData {
            values: guard.values.iter().map(|&v| f(v)).collect(),
            shape: guard.shape.clone(),
            calc_grad: guard.calc_grad,
            grad: None,
        })
    }
}

impl Clone for Variable {
    /// Shallow clone: the new handle shares storage with `self`.
    fn clone(&self) -> Self {
        Variable {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.read() {
            Ok(guard) => write!(
                f,
                "Variable(shape={:?}, calc_grad={}, has_grad={})",
                guard.shape,
                guard.calc_grad,
                guard.grad.is_some()
            ),
            Err(_) => write!(f, "Variable(Error: RwLock poisoned)"),
        }
    }
}

impl PartialEq for Variable {
    /// Value equality: same shape and same values. Identity is [`Variable::ptr_eq`].
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let lhs = self.read_data();
        let rhs = other.read_data();
        lhs.shape == rhs.shape && lhs.values == rhs.values
    }
}

#[cfg(test)]
#[path = "variable_test.rs"]
mod tests;
