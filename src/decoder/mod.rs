pub mod sample;

pub use sample::SampledImage;
