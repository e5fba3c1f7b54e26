// Domain layer: category table model, typed sheet schema and the table source port.

pub mod model;
pub mod ports;
pub mod schema;
