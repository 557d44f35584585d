// Domain layer: project entities, the manifest object model and ports (interfaces).

pub mod manifest;
pub mod model;
pub mod ports;
