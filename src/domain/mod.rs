// Domain layer: row model and the writer port. No I/O lives here.

pub mod model;
pub mod ports;
