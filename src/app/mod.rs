// Application layer: pipelines wiring the core to concrete ports.

pub mod pipelines;
