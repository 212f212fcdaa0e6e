// Domain layer: records, tables and the ports the export pipeline is written against.

pub mod model;
pub mod ports;
