//! Sink implementations

pub mod memory;
pub mod multi_writer;
pub mod network;
pub mod out;
pub mod sink;

pub use memory::MemorySink;
pub use multi_writer::MultiWriter;
pub use network::{ConnAddr, NetworkSink};
pub use out::{partition, Out};
pub use sink::Sink;
