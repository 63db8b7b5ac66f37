// inference — Tokenization, forward passes, pooling and generation.

pub mod executor;
pub mod generate;
pub mod language;
pub mod pooling;
pub mod tokenize;
