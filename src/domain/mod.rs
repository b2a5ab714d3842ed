// Domain layer: register records, derived dashboard data and the ports the pipeline depends on.

pub mod model;
pub mod ports;
pub mod reference;
pub mod services;
