use super::*;
use crate::nn::container::Container;
use approx::assert_relative_eq;

#[test]
fn test_linear_creation() -> Result<(), EmberError> {
    let linear = Linear::new(10, 5, true)?;
    assert_eq!(linear.num_params(), 2);
    assert_eq!(linear.weight()?.shape(), vec![5, 10]);
    assert_eq!(linear.bias().map(Variable::shape), Some(vec![5]));
    assert!(linear.params().iter().all(Variable::is_calc_grad));
    assert_eq!(linear.pretty_string(), "Linear (10->5)");
    Ok(())
}

#[test]
fn test_linear_creation_no_bias() -> Result<(), EmberError> {
    let linear = Linear::new(3, 2, false)?;
    assert_eq!(linear.num_params(), 1);
    assert!(linear.bias().is_none());
    assert_eq!(linear.pretty_string(), "Linear (3->2) (without bias)");
    Ok(())
}

#[test]
fn test_linear_forward_batch() -> Result<(), EmberError> {
    let weight = Variable::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
    let bias = Variable::new(vec![0.5, -0.5], vec![2])?;
    let linear = Linear::from_weights(weight, Some(bias))?;

    let x = Variable::new(vec![1.0, 0.0, -1.0, 2.0, 1.0, 0.0], vec![2, 3])?;
    let y = linear.forward_unary(&x)?;
    assert_eq!(y.shape(), vec![2, 2]);
    let values = y.to_vec();
    // row 0: [1-3, 4-6] + b ; row 1: [2+2, 8+5] + b
    assert_relative_eq!(values[0], -1.5);
    assert_relative_eq!(values[1], -2.5);
    assert_relative_eq!(values[2], 4.5);
    assert_relative_eq!(values[3], 12.5);
    Ok(())
}

#[test]
fn test_linear_forward_vector_and_shape_error() -> Result<(), EmberError> {
    let weight = Variable::new(vec![1.0, 1.0], vec![1, 2])?;
    let linear = Linear::from_weights(weight, None)?;
    let y = linear.forward(&[Variable::new(vec![2.0, 3.0], vec![2])?])?;
    assert_eq!(y[0].shape(), vec![1]);
    assert_relative_eq!(y[0].to_vec()[0], 5.0);

    let err = linear.forward_unary(&Variable::zeros(&[3])).unwrap_err();
    assert!(matches!(err, EmberError::ShapeMismatch { .. }));
    Ok(())
}

#[test]
fn test_linear_from_weights_checks_bias() -> Result<(), EmberError> {
    let weight = Variable::zeros(&[2, 3]);
    let bad_bias = Variable::zeros(&[3]);
    assert!(Linear::from_weights(weight, Some(bad_bias)).is_err());
    assert!(Linear::from_weights(Variable::zeros(&[6]), None).is_err());
    Ok(())
}

#[test]
fn test_linear_clone_module_is_deep() -> Result<(), EmberError> {
    let linear = Linear::new(4, 2, true)?;
    let cloned = linear.clone_module();
    for (a, b) in linear.params().iter().zip(cloned.params().iter()) {
        assert_eq!(a, b);
        assert!(!a.ptr_eq(b));
    }
    assert_eq!(cloned.pretty_string(), linear.pretty_string());
    Ok(())
}

#[test]
fn test_linear_set_params_rejects_wrong_shape() -> Result<(), EmberError> {
    let mut linear = Linear::new(3, 2, true)?;
    let weight = linear.weight()?.clone();

    let err = linear.set_params(Variable::zeros(&[1]), 0).unwrap_err();
    assert!(matches!(err, EmberError::ShapeMismatch { .. }));
    assert!(linear.weight()?.ptr_eq(&weight));
    assert!(linear.set_params(Variable::zeros(&[3]), 1).is_err());
    assert!(matches!(
        linear.set_params(Variable::zeros(&[2]), 2),
        Err(EmberError::ParamIndexOutOfRange { index: 2, len: 2 })
    ));

    // The layer still runs after the rejected writes.
    let y = linear.forward(&[Variable::zeros(&[3])])?;
    assert_eq!(y[0].shape(), vec![2]);

    linear.set_params(Variable::full(&[2, 3], 1.0), 0)?;
    linear.set_params(Variable::zeros(&[2]), 1)?;
    let y = linear.forward_unary(&Variable::full(&[3], 1.0))?;
    assert_eq!(y.to_vec(), vec![3.0, 3.0]);
    Ok(())
}

#[test]
fn test_linear_shape_error_through_container_leaves_flat_list() -> Result<(), EmberError> {
    let mut container = Container::new();
    container.add(Linear::new(3, 2, false)?);
    let before = container.param(0)?;

    assert!(matches!(
        container.set_params(Variable::zeros(&[1]), 0),
        Err(EmberError::ShapeMismatch { .. })
    ));
    assert!(container.param(0)?.ptr_eq(&before));
    let child = container.module(0)?.get().expect("valid child");
    assert!(child.param(0)?.ptr_eq(&before));
    Ok(())
}
