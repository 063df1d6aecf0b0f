use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One vectorised video: tag indicator input and one-hot target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSample {
    pub input:  Vec<f32>,
    pub target: Vec<f32>,
}

pub struct VideoDataset {
    samples: Vec<VideoSample>,
}

impl VideoDataset {
    pub fn new(samples: Vec<VideoSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<VideoSample> for VideoDataset {
    fn get(&self, index: usize) -> Option<VideoSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_serves_samples_in_order() {
        let ds = VideoDataset::new(vec![
            VideoSample { input: vec![1.0, 0.0], target: vec![0.0, 1.0] },
            VideoSample { input: vec![0.0, 1.0], target: vec![0.0, 0.0] },
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(0).unwrap().input, vec![1.0, 0.0]);
        assert_eq!(ds.get(1).unwrap().target, vec![0.0, 0.0]);
        assert!(ds.get(2).is_none());
    }
}
