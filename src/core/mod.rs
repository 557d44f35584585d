pub mod builder;
pub mod classifier;
pub mod naming;
pub mod properties;
pub mod serializer;
pub mod workflow;
