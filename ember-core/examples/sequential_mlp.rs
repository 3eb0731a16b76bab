use ember_core::nn::{
    load_state_dict, share, state_dict, sync_gradients, Linear, MeanReducer, Module, ReLU,
    Sequential,
};
use ember_core::{EmberError, Variable};
use log::info;
use std::sync::Arc;

fn main() -> Result<(), EmberError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Hidden block shared by the encoder and the head below.
    let hidden = share(Sequential::new().with(Linear::new(8, 8, true)?).with(ReLU::new()));

    let mut encoder = Sequential::new().with(Linear::new(4, 8, true)?).with(ReLU::new());
    encoder.add_shared(Arc::clone(&hidden))?;

    let mut model = Sequential::new().with(encoder);
    model.add_shared(Arc::clone(&hidden))?;
    model.add(Linear::new(8, 2, false)?);

    println!("{}", model.pretty_string());
    info!("model holds {} parameters", model.num_params());

    let x = Variable::new(vec![0.5, -1.0, 2.0, 0.0, 1.0, 1.0, -0.5, 0.25], vec![2, 4])?;
    let y = model.call(&x)?;
    info!("output shape {:?}: {:?}", y.shape(), y.to_vec());

    model.eval();
    info!(
        "eval: training={} frozen params={}",
        model.is_training(),
        model.params().iter().filter(|p| !p.is_calc_grad()).count()
    );
    model.train();

    let snapshot = state_dict(&model);
    model.set_params(Variable::zeros(&[8, 4]), 0)?;
    load_state_dict(&mut model, &snapshot)?;
    info!("restored {} parameters from snapshot", snapshot.len());

    for param in model.params() {
        let grad = vec![1.0; param.numel()];
        param.set_grad(grad)?;
    }
    let reduced = sync_gradients(&model, &MeanReducer::new(4)?)?;
    info!("averaged {} gradient buffers over 4 workers", reduced);

    Ok(())
}
