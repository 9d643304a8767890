// Domain layer: page/transport ports and the values that flow through them.

pub mod model;
pub mod ports;
