use burn::{
    nn::{loss::CrossEntropyLossConfig, Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
};

#[derive(Config, Debug)]
pub struct SkipGramModelConfig {
    pub vocab_size:     usize,
    pub embedding_size: usize,
    pub hidden_size:    usize,
}

impl SkipGramModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SkipGramModel<B> {
        SkipGramModel {
            embedding:       EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device),
            projection:      LinearConfig::new(self.embedding_size, self.hidden_size).init(device),
            softmax_weights: EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device),
            softmax_biases:  EmbeddingConfig::new(self.vocab_size, 1).init(device),
        }
    }
}

/// Center-word embeddings trained with a sampled softmax.
///
/// The output side is stored as two lookup tables (weights and biases)
/// so only the rows of the true context and its noise words take part
/// in each step.
#[derive(Module, Debug)]
pub struct SkipGramModel<B: Backend> {
    pub embedding:       Embedding<B>,
    pub projection:      Linear<B>,
    pub softmax_weights: Embedding<B>,
    pub softmax_biases:  Embedding<B>,
}

impl<B: Backend> SkipGramModel<B> {
    /// centers: [batch] → [batch, hidden]
    pub fn forward(&self, centers: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [batch] = centers.dims();
        let embedded = self.embedding.forward(centers.reshape([batch, 1]));
        let [_, _, width] = embedded.dims();
        self.projection.forward(embedded.reshape([batch, width]))
    }

    /// Sampled-softmax logits: column 0 is the true context, columns
    /// 1..=n the noise words. Shape [batch, 1 + n].
    pub fn sampled_logits(
        &self,
        centers:   Tensor<B, 1, Int>,
        contexts:  Tensor<B, 2, Int>,
        negatives: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let hidden = self.forward(centers);
        let [batch, width] = hidden.dims();

        let candidates = Tensor::cat(vec![contexts, negatives], 1);
        let [_, classes] = candidates.dims();

        let weights = self.softmax_weights.forward(candidates.clone()); // [batch, classes, hidden]
        let biases  = self.softmax_biases.forward(candidates).reshape([batch, classes]);

        weights
            .matmul(hidden.reshape([batch, width, 1]))
            .reshape([batch, classes])
            + biases
    }

    pub fn forward_loss(
        &self,
        centers:   Tensor<B, 1, Int>,
        contexts:  Tensor<B, 2, Int>,
        negatives: Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let logits = self.sampled_logits(centers, contexts, negatives);
        let [batch, _] = logits.dims();
        let device = logits.device();
        let labels = Tensor::<B, 1, Int>::zeros([batch], &device);
        CrossEntropyLossConfig::new().init(&device).forward(logits, labels)
    }

    /// Cosine similarity of each query word against the whole
    /// vocabulary. queries: [q] → [q, vocab_size]
    pub fn similarity(&self, queries: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let table = self.embedding.weight.val();
        let norms = (table.clone() * table.clone())
            .sum_dim(1)
            .sqrt()
            .clamp_min(1e-12);
        let unit = table / norms;
        let query = unit.clone().select(0, queries);
        query.matmul(unit.transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny(device: &<TestBackend as Backend>::Device) -> SkipGramModel<TestBackend> {
        SkipGramModelConfig::new(12, 6, 4).init(device)
    }

    #[test]
    fn test_sampled_logits_shape() {
        let device = Default::default();
        let model = tiny(&device);
        let centers   = Tensor::<TestBackend, 1, Int>::from_ints([2, 3, 4], &device);
        let contexts  = Tensor::<TestBackend, 1, Int>::from_ints([3, 4, 5], &device).reshape([3, 1]);
        let negatives = Tensor::<TestBackend, 1, Int>::from_ints([6, 7, 8, 9, 10, 11], &device).reshape([3, 2]);

        let logits = model.sampled_logits(centers.clone(), contexts.clone(), negatives.clone());
        assert_eq!(logits.dims(), [3, 3]);

        let loss = model.forward_loss(centers, contexts, negatives).into_scalar().elem::<f64>();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_self_similarity_is_one() {
        let device = Default::default();
        let model = tiny(&device);
        let sims = model
            .similarity(Tensor::<TestBackend, 1, Int>::from_ints([5], &device))
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(sims.len(), 12);
        assert!((sims[5] - 1.0).abs() < 1e-4);
        assert!(sims.iter().all(|s| *s <= 1.0 + 1e-4 && *s >= -1.0 - 1e-4));
    }
}
