// Pipeline processing: quality audits and normalization

pub mod normalize;
pub mod quality_gate;
