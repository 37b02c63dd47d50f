//! Identity cross-verification across the documents of a batch.

mod cross;
mod names;

pub use cross::{
    common_words, cross_verify, CONFIDENCE_MATCH, CONFIDENCE_NO_MATCH, CONFIDENCE_PARTIAL,
    MIN_COMMON_WORDS,
};
pub use names::normalize_name;
