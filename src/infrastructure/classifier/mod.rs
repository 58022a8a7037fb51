mod huggingface;

pub use huggingface::HfZeroShotClassifier;
