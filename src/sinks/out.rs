//! Output targets accepted by `set_outs` / `add_outs`

use super::network::ConnAddr;
use super::sink::Sink;

/// One output target: a local writer or a set of remote addresses
#[derive(Debug, Clone)]
pub enum Out {
    Writer(Sink),
    Remote(ConnAddr),
}

impl From<Sink> for Out {
    fn from(sink: Sink) -> Self {
        Out::Writer(sink)
    }
}

impl From<ConnAddr> for Out {
    fn from(addr: ConnAddr) -> Self {
        Out::Remote(addr)
    }
}

/// Split targets into plain writers and remote addresses, keeping order
/// within each group
pub fn partition(outs: Vec<Out>) -> (Vec<Sink>, Vec<ConnAddr>) {
    let mut writers = Vec::new();
    let mut remotes = Vec::new();
    for out in outs {
        match out {
            Out::Writer(sink) => writers.push(sink),
            Out::Remote(addr) => remotes.push(addr),
        }
    }
    (writers, remotes)
}
