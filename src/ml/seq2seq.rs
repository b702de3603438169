use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Lstm, LstmConfig, LstmState},
    prelude::*,
};

use crate::ml::loss::masked_cross_entropy;

/// Upper bound on generated tokens per sentence at inference.
pub const MAX_DECODE_STEPS: usize = 20;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    pub source_vocab_size: usize,
    pub target_vocab_size: usize,
    pub embedding_size:    usize,
    pub hidden_size:       usize,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2Seq<B> {
        Seq2Seq {
            encoder: Encoder {
                embedding:   EmbeddingConfig::new(self.source_vocab_size, self.embedding_size).init(device),
                lstm:        LstmConfig::new(self.embedding_size, self.hidden_size, true).init(device),
                hidden_size: self.hidden_size,
            },
            decoder: Decoder {
                embedding:  EmbeddingConfig::new(self.target_vocab_size, self.embedding_size).init(device),
                lstm:       LstmConfig::new(self.embedding_size, self.hidden_size, true).init(device),
                projection: LinearConfig::new(self.hidden_size, self.target_vocab_size).init(device),
            },
        }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub embedding:   Embedding<B>,
    pub lstm:        Lstm<B>,
    pub hidden_size: usize,
}

impl<B: Backend> Encoder<B> {
    /// Zero cell and hidden state for `batch` sequences.
    pub fn init_state(&self, batch: usize, device: &B::Device) -> LstmState<B, 2> {
        LstmState::new(
            Tensor::zeros([batch, self.hidden_size], device),
            Tensor::zeros([batch, self.hidden_size], device),
        )
    }

    /// source: [batch, src_len] → outputs [batch, src_len, hidden], final state
    pub fn forward(
        &self,
        source: Tensor<B, 2, Int>,
        state:  LstmState<B, 2>,
    ) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let embedded = self.embedding.forward(source);
        self.lstm.forward(embedded, Some(state))
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub embedding:  Embedding<B>,
    pub lstm:       Lstm<B>,
    pub projection: Linear<B>,
}

impl<B: Backend> Decoder<B> {
    /// tokens: [batch, steps] → logits [batch, steps, target_vocab], state
    ///
    /// Training passes the whole `<start> target` sequence at once;
    /// greedy decoding passes a single step and threads the state.
    pub fn forward(
        &self,
        tokens: Tensor<B, 2, Int>,
        state:  LstmState<B, 2>,
    ) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let embedded = self.embedding.forward(tokens);
        let (outputs, state) = self.lstm.forward(embedded, Some(state));
        (self.projection.forward(outputs), state)
    }
}

// ─── Seq2Seq ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Seq2Seq<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> Seq2Seq<B> {
    /// Teacher-forced logits: [batch, tgt_len, target_vocab]
    pub fn forward(&self, source: Tensor<B, 2, Int>, target_in: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch, _] = source.dims();
        let state = self.encoder.init_state(batch, &source.device());
        let (_, state) = self.encoder.forward(source, state);
        let (logits, _) = self.decoder.forward(target_in, state);
        logits
    }

    pub fn forward_loss(
        &self,
        source:     Tensor<B, 2, Int>,
        target_in:  Tensor<B, 2, Int>,
        target_out: Tensor<B, 2, Int>,
        pad_index:  u32,
    ) -> Tensor<B, 1> {
        let logits = self.forward(source, target_in);
        masked_cross_entropy(logits, target_out, pad_index)
    }

    /// Encode one sentence ([1, src_len]) and emit the argmax token at
    /// each step until `end` or `max_steps` tokens. `end` is not part
    /// of the result.
    pub fn greedy_decode(
        &self,
        source:    Tensor<B, 2, Int>,
        start:     u32,
        end:       u32,
        max_steps: usize,
    ) -> Vec<u32> {
        let device = source.device();
        let state = self.encoder.init_state(1, &device);
        let (_, mut state) = self.encoder.forward(source, state);

        let mut token  = start;
        let mut output = Vec::with_capacity(max_steps);
        for _ in 0..max_steps {
            let input = Tensor::<B, 1, Int>::from_ints([token as i32], &device).reshape([1, 1]);
            let (logits, next_state) = self.decoder.forward(input, state);
            state = next_state;

            token = logits.argmax(2).reshape([1]).into_scalar().elem::<i64>() as u32;
            if token == end {
                break;
            }
            output.push(token);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny(device: &<TestBackend as Backend>::Device) -> Seq2Seq<TestBackend> {
        Seq2SeqConfig::new(9, 11, 6, 8).init(device)
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model = tiny(&device);
        let source    = Tensor::<TestBackend, 1, Int>::from_ints([4, 5, 6, 0, 7, 8, 0, 0], &device).reshape([2, 4]);
        let target_in = Tensor::<TestBackend, 1, Int>::from_ints([2, 4, 5, 2, 6, 0], &device).reshape([2, 3]);

        let logits = model.forward(source.clone(), target_in.clone());
        assert_eq!(logits.dims(), [2, 3, 11]);

        let state = model.encoder.init_state(2, &device);
        let (outputs, state) = model.encoder.forward(source, state);
        assert_eq!(outputs.dims(), [2, 4, 8]);
        assert_eq!(state.hidden.dims(), [2, 8]);
        assert_eq!(state.cell.dims(), [2, 8]);
    }

    #[test]
    fn test_greedy_decode_is_bounded() {
        let device = Default::default();
        let model = tiny(&device);
        let source = Tensor::<TestBackend, 1, Int>::from_ints([4, 5, 6], &device).reshape([1, 3]);

        // 11 is outside the target vocabulary, so only the cap stops decoding
        let produced = model.greedy_decode(source.clone(), 2, 11, MAX_DECODE_STEPS);
        assert_eq!(produced.len(), MAX_DECODE_STEPS);
        assert!(produced.iter().all(|&t| t < 11));

        let produced = model.greedy_decode(source, 2, 3, MAX_DECODE_STEPS);
        assert!(produced.len() <= MAX_DECODE_STEPS);
        assert!(!produced.contains(&3));
    }

    #[test]
    fn test_zero_steps_produce_nothing() {
        let device = Default::default();
        let model = tiny(&device);
        let source = Tensor::<TestBackend, 1, Int>::from_ints([4], &device).reshape([1, 1]);
        assert!(model.greedy_decode(source, 2, 3, 0).is_empty());
    }
}
