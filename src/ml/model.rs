use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::{log_softmax, relu, softmax},
};

pub const DEFAULT_HIDDEN_NODES: usize = 10;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct VideoClassifierConfig {
    pub num_tags:       usize,
    pub num_categories: usize,
    #[config(default = 10)]
    pub num_hidden:     usize,
}

impl VideoClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> VideoClassifier<B> {
        let hidden = LinearConfig::new(self.num_tags, self.num_hidden).init(device);
        let output = LinearConfig::new(self.num_hidden, self.num_categories).init(device);
        VideoClassifier { hidden, output }
    }
}

/// Dense(num_tags → hidden, ReLU) → Dense(hidden → num_categories, softmax).
#[derive(Module, Debug)]
pub struct VideoClassifier<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> VideoClassifier<B> {
    /// inputs: [batch, num_tags] → logits: [batch, num_categories]
    pub fn forward(&self, inputs: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(inputs));
        self.output.forward(x)
    }

    /// Softmax over the category axis; each row sums to 1.
    pub fn predict_proba(&self, inputs: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(inputs), 1)
    }

    pub fn forward_loss(&self, inputs: Tensor<B, 2>, targets: Tensor<B, 2>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(inputs);
        let loss   = categorical_cross_entropy(logits.clone(), targets);
        (loss, logits)
    }
}

/// Mean over the batch of -Σ target·log(softmax(logits)).
///
/// Targets are one-hot rows. An all-zero row (video whose category is
/// not in the category list) contributes 0 to the sum.
pub fn categorical_cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    (targets * log_probs).sum_dim(1).neg().mean()
}

/// Number of rows whose predicted class equals the target's argmax.
/// An all-zero target row has argmax 0.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> usize {
    let predicted = logits.argmax(1);
    let expected  = targets.argmax(1);
    let correct: i64 = predicted
        .equal(expected)
        .int().sum().into_scalar().elem::<i64>();
    correct as usize
}
