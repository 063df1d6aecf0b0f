// ============================================================
// Layer 4 — Video Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<VideoSample>
// into two float tensors.
//
//   Input:  N samples, inputs of length T, targets of length C
//   Output: VideoBatch { inputs: [N, T], targets: [N, C] }
//
// Every sample in a run has the same T and C, so the rows can
// be flattened and reshaped without padding.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::VideoSample;

// ─── VideoBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct VideoBatch<B: Backend> {
    /// Tag indicator vectors — shape: [batch_size, num_tags]
    pub inputs: Tensor<B, 2>,

    /// One-hot category vectors — shape: [batch_size, num_categories]
    pub targets: Tensor<B, 2>,
}

// ─── VideoBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct VideoBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> VideoBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack equal-length rows into a [rows, width] tensor.
pub fn rows_to_tensor<B: Backend>(rows: &[Vec<f32>], width: usize, device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([rows.len(), width])
}

impl<B: Backend> Batcher<VideoSample, VideoBatch<B>> for VideoBatcher<B> {
    fn batch(&self, items: Vec<VideoSample>) -> VideoBatch<B> {
        let num_tags       = items[0].input.len();
        let num_categories = items[0].target.len();

        let (inputs, targets): (Vec<Vec<f32>>, Vec<Vec<f32>>) = items
            .into_iter()
            .map(|s| (s.input, s.target))
            .unzip();

        VideoBatch {
            inputs:  rows_to_tensor::<B>(&inputs,  num_tags,       &self.device),
            targets: rows_to_tensor::<B>(&targets, num_categories, &self.device),
        }
    }
}
