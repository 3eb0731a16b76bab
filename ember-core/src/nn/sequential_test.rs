use super::*;
use crate::nn::layers::{Linear, ReLU};
use crate::nn::wrapper::share;
use crate::utils::testing::MockModule;
use std::sync::Arc;

#[test]
fn test_forward_chains_children_in_order() -> Result<(), EmberError> {
    let model = Sequential::new()
        .with(MockModule::new("a", 0))
        .with(MockModule::new("b", 0))
        .with(MockModule::new("c", 0));

    let out = model.forward_one(&Variable::scalar(1.0))?;
    assert_eq!(out.to_vec(), vec![4.0]);
    assert_eq!(model.call(&Variable::scalar(0.0))?.to_vec(), vec![3.0]);
    Ok(())
}

#[test]
fn test_forward_sequence_returns_last_stage_unchanged() -> Result<(), EmberError> {
    let model = Sequential::new()
        .with(MockModule::new("a", 0))
        .with(MockModule::new("b", 0).with_outputs(2));
    let out = model.forward(&[Variable::scalar(0.0)])?;
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|v| v.to_vec() == vec![2.0]));
    Ok(())
}

#[test]
fn test_forward_one_rejects_other_arity() {
    let two = Sequential::new()
        .with(MockModule::new("a", 0))
        .with(MockModule::new("b", 0))
        .with(MockModule::new("c", 0).with_outputs(2));
    assert!(matches!(
        two.forward_one(&Variable::scalar(0.0)),
        Err(EmberError::InvalidArgument(_))
    ));

    let none = Sequential::new().with(MockModule::new("z", 0).with_outputs(0));
    assert!(matches!(
        none.call(&Variable::scalar(0.0)),
        Err(EmberError::InvalidArgument(_))
    ));
}

#[test]
fn test_empty_sequential_is_identity() -> Result<(), EmberError> {
    let model = Sequential::new();
    let x = Variable::scalar(3.0);
    assert!(model.forward_one(&x)?.ptr_eq(&x));
    assert_eq!(model.pretty_string(), "Sequential [input -> output]");
    Ok(())
}

#[test]
fn test_pretty_string_nests() -> Result<(), EmberError> {
    let inner = Sequential::new().with(ReLU::new());
    let model = Sequential::new()
        .with(Linear::new(2, 3, true)?)
        .with(inner);
    assert_eq!(
        model.pretty_string(),
        "Sequential [input -> (0) -> (1) -> output]\n\t(0): Linear (2->3)\n\t(1): Sequential [input -> (0) -> output]\n\t(0): ReLU"
    );
    // Through the trait object the label is kept.
    let boxed: Box<dyn Module> = Box::new(Sequential::new());
    assert_eq!(boxed.pretty_string(), "Sequential [input -> output]");
    Ok(())
}

#[test]
fn test_nested_mode_propagation() {
    let inner = Sequential::new().with(MockModule::new("deep", 2));
    let mut model = Sequential::new().with(MockModule::new("top", 1)).with(inner);
    assert_eq!(model.num_params(), 3);

    model.eval();
    assert!(!model.is_training());
    assert!(model.params().iter().all(|p| !p.is_calc_grad()));
    let inner_ref = model.module(1).expect("inner exists").get().expect("valid");
    assert!(!inner_ref.is_training());
    drop(inner_ref);

    model.train();
    assert!(model.params().iter().all(|p| p.is_calc_grad()));
}

#[test]
fn test_nested_set_params_reaches_leaf() -> Result<(), EmberError> {
    let inner = Sequential::new().with(MockModule::new("deep", 2));
    let mut model = Sequential::new().with(MockModule::new("top", 1)).with(inner);

    let replacement = Variable::scalar(8.0);
    model.set_params(replacement.clone(), 2)?;

    let inner_ref = model.module(1)?.get().expect("valid");
    assert!(inner_ref.param(1)?.ptr_eq(&replacement));
    Ok(())
}

#[test]
fn test_shared_child_visible_from_two_models() -> Result<(), EmberError> {
    let block = share(MockModule::new("shared", 1));
    let mut first = Sequential::new();
    first.add_shared(Arc::clone(&block))?;
    let mut second = Sequential::new();
    second.add_shared(Arc::clone(&block))?;

    let replacement = Variable::scalar(11.0);
    first.set_params(replacement.clone(), 0)?;
    let seen = second.module(0)?.get().expect("valid").param(0)?;
    assert!(seen.ptr_eq(&replacement));

    first.eval();
    assert!(!second.module(0)?.get().expect("valid").is_training());
    Ok(())
}

#[test]
fn test_clone_module_is_deep() -> Result<(), EmberError> {
    let mut model = Sequential::new()
        .with(MockModule::new("a", 2))
        .with(MockModule::new("b", 1));
    model.add_param(Variable::scalar(9.0));

    let cloned = model.clone_module();
    assert_eq!(cloned.pretty_string(), model.pretty_string());
    assert_eq!(cloned.num_params(), 4);
    for (a, b) in model.params().iter().zip(cloned.params().iter()) {
        assert_eq!(a, b);
        assert!(!a.ptr_eq(b));
    }
    Ok(())
}
