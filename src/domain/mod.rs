//! Domain layer: wizard schemas, the step engine, loan records and the ports
//! through which the engine reaches voice capture, approval and timing.

pub mod language;
pub mod loan;
pub mod manual;
pub mod ports;
pub mod schema;
pub mod wizard;
