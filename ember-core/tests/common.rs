use ember_core::utils::testing::MockModule;
use ember_core::Sequential;

// Installs env_logger so `RUST_LOG=debug cargo test` shows container activity.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Sequential whose children contribute `counts[i]` parameters each.
#[allow(dead_code)]
pub fn sequential_with(counts: &[usize]) -> Sequential {
    counts
        .iter()
        .enumerate()
        .fold(Sequential::new(), |model, (i, &n)| {
            model.with(MockModule::new(&format!("m{}", i), n))
        })
}
