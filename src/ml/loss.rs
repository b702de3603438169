use burn::{prelude::*, tensor::activation::log_softmax};

/// Cross-entropy over every decoder step, ignoring padding.
///
/// logits:  [batch, steps, classes]
/// targets: [batch, steps]
///
/// Each position's negative log-likelihood is weighted 1 when the
/// target is not `pad_index` and 0 otherwise; the result is the sum of
/// the weighted terms divided by the number of unmasked positions.
pub fn masked_cross_entropy<B: Backend>(
    logits:    Tensor<B, 3>,
    targets:   Tensor<B, 2, Int>,
    pad_index: u32,
) -> Tensor<B, 1> {
    let [batch, steps, classes] = logits.dims();
    let positions = batch * steps;

    let log_probs = log_softmax(logits.reshape([positions, classes]), 1);
    let targets   = targets.reshape([positions]);
    let mask      = targets.clone().not_equal_elem(pad_index as i32).float();

    let picked = log_probs
        .gather(1, targets.reshape([positions, 1]))
        .reshape([positions]);

    let total = (picked.neg() * mask.clone()).sum();
    total / mask.sum().clamp_min(1.0)
}
