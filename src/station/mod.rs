//! Minute bucketing of decoded frames into observations

pub mod assembler;
pub mod observation;
