// ============================================================
// Layer 4 — Vectoriser
// ============================================================
// Turns a video into the two fixed-length vectors the model
// trains on:
//
//   input  — indicator vector over the tag vocabulary
//            (1 at every index whose tag the video carries)
//   target — one-hot vector over the category list
//            (1 at the index of the video's category)
//
// Example with tags {drama: 0, comedy: 1} and categories [5, 9]:
//   {"tags": ["comedy"], "target_category_id": 9}
//     → input [0, 1], target [0, 1]
//
// Unknown tags and unknown category ids are skipped without
// error; an unknown category gives an all-zero target.
//
// All functions here are pure: the lookup tables are passed in.

use crate::data::dataset::VideoSample;
use crate::data::vocabulary::{CategoryIndex, TagIndex};
use crate::domain::video::Video;

/// Indicator vector of length `vocab_size` for the video's tags.
pub fn vectorize_input(video: &Video, tag_index: &TagIndex, vocab_size: usize) -> Vec<f32> {
    vectorize_tags(&video.tags, tag_index, vocab_size)
}

/// Indicator vector for a bare tag list, used when predicting.
pub fn vectorize_tags<S: AsRef<str>>(tags: &[S], tag_index: &TagIndex, vocab_size: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; vocab_size];
    for tag in tags {
        if let Some(slot) = tag_index.get(tag.as_ref()).and_then(|i| vector.get_mut(i)) {
            *slot = 1.0;
        }
    }
    vector
}

/// One-hot vector of length `category_count`, all zero when unmapped.
pub fn vectorize_target(
    video:          &Video,
    category_index: &CategoryIndex,
    category_count: usize,
) -> Vec<f32> {
    let mut vector = vec![0.0f32; category_count];
    if let Some(slot) = category_index
        .get(&video.target_category_id)
        .and_then(|i| vector.get_mut(i))
    {
        *slot = 1.0;
    }
    vector
}

/// Vectorise every video, preserving order.
pub fn vectorize_all(
    videos:         &[Video],
    tag_index:      &TagIndex,
    category_index: &CategoryIndex,
) -> Vec<VideoSample> {
    let vocab_size     = tag_index.len();
    let category_count = category_index.len();
    videos
        .iter()
        .map(|video| VideoSample {
            input:  vectorize_input(video, tag_index, vocab_size),
            target: vectorize_target(video, category_index, category_count),
        })
        .collect()
}
