//! Integration tests for embedding generation and runtime resolution

mod error_agreement;
mod facade_round_trip;
mod generator_pipeline;
mod live_vs_baked;
mod test_utils;
