pub(crate) mod resample;
pub(crate) mod sampler;
