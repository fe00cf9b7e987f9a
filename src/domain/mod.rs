// Domain layer: record shapes only. No I/O.

pub mod model;
