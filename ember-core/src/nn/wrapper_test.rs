use super::*;
use crate::error::EmberError;
use crate::utils::testing::MockModule;
use crate::variable::Variable;
use std::thread;

#[test]
fn test_empty_wrapper() {
    let wrapper = ModuleWrapper::default();
    assert!(!wrapper.is_valid());
    assert!(wrapper.get().is_none());
    assert_eq!(wrapper.holders(), 0);

    let copy = wrapper.clone();
    assert!(!copy.is_valid(), "Copy of an empty wrapper is empty");
}

#[test]
fn test_owned_clone_is_deep() -> Result<(), EmberError> {
    let wrapper = ModuleWrapper::owned(MockModule::new("a", 2));
    let copy = wrapper.clone();
    assert!(copy.is_owned());
    assert!(!copy.ptr_eq(&wrapper));

    let original = wrapper.get().expect("owned wrapper is valid");
    let cloned = copy.get().expect("owned copy is valid");
    assert_eq!(original.pretty_string(), cloned.pretty_string());

    let (p, q) = (original.params(), cloned.params());
    assert_eq!(p.len(), q.len());
    for (a, b) in p.iter().zip(q.iter()) {
        assert_eq!(a, b, "Clone keeps parameter values");
        assert!(!a.ptr_eq(b), "Clone must not alias parameter storage");
    }
    Ok(())
}

#[test]
fn test_owned_clone_mutation_is_isolated() -> Result<(), EmberError> {
    let mut wrapper = ModuleWrapper::owned(MockModule::new("a", 1));
    let copy = wrapper.clone();

    wrapper
        .get_mut()
        .expect("owned wrapper is valid")
        .set_params(Variable::scalar(42.0), 0)?;

    let seen = copy.get().expect("copy is valid").param(0)?;
    assert_eq!(seen.to_vec(), vec![0.0]);
    Ok(())
}

#[test]
fn test_shared_clone_aliases() -> Result<(), EmberError> {
    let wrapper = ModuleWrapper::shared(share(MockModule::new("s", 1)));
    let mut copy = wrapper.clone();
    assert!(copy.is_shared());
    assert!(copy.ptr_eq(&wrapper), "Shared copies point at the same module");
    assert_eq!(wrapper.holders(), 2);

    copy.get_mut()
        .expect("shared wrapper is valid")
        .set_params(Variable::scalar(7.0), 0)?;
    copy.get_mut().expect("shared wrapper is valid").eval();

    let original = wrapper.get().expect("shared wrapper is valid");
    assert_eq!(original.param(0)?.to_vec(), vec![7.0]);
    assert!(!original.is_training());
    Ok(())
}

#[test]
fn test_reset_releases_per_mode() {
    let shared = share(MockModule::new("s", 1));
    let mut a = ModuleWrapper::shared(Arc::clone(&shared));
    let b = a.clone();
    assert_eq!(Arc::strong_count(&shared), 3);

    a.reset();
    assert!(!a.is_valid());
    assert_eq!(Arc::strong_count(&shared), 2);
    assert!(b.is_valid(), "Other holders keep the module alive");

    let mut owned = ModuleWrapper::owned(MockModule::new("o", 1));
    owned.reset();
    assert!(!owned.is_valid());
    owned.reset();
    assert!(owned.get().is_none());
}

#[test]
fn test_make_shared_transfers_ownership() -> Result<(), EmberError> {
    let mut wrapper = ModuleWrapper::owned(MockModule::new("p", 2));
    let before = wrapper.get().expect("valid").params();

    let handle = wrapper.make_shared().expect("owned wrapper promotes");
    assert!(wrapper.is_shared());
    assert_eq!(Arc::strong_count(&handle), 2);

    let after = handle.read().expect("lock is healthy").params();
    assert!(before[0].ptr_eq(&after[0]), "Promotion moves, it does not copy");

    let again = wrapper.make_shared().expect("shared wrapper returns its handle");
    assert!(Arc::ptr_eq(&handle, &again));

    let mut empty = ModuleWrapper::Empty;
    assert!(empty.make_shared().is_none());
    assert!(!empty.is_valid());
    Ok(())
}

#[test]
fn test_poisoned_shared_module_is_invalid() {
    let shared = share(MockModule::new("poison", 1));
    let wrapper = ModuleWrapper::shared(Arc::clone(&shared));

    let poisoner = Arc::clone(&shared);
    let result = thread::spawn(move || {
        let _guard = poisoner.write().expect("lock is healthy");
        panic!("poison the module lock");
    })
    .join();
    assert!(result.is_err());

    assert!(!wrapper.is_valid(), "Poisoned module fails safe to invalid");
    assert!(wrapper.get().is_none());
    let copy = wrapper.clone();
    assert!(!copy.is_valid());
}
