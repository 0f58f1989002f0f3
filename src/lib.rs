pub mod config;
pub mod connectivity;
pub mod emu;
pub mod error;
pub mod net;
pub mod parse;
pub mod registry;
pub mod report;
pub mod session;
pub mod shell;
pub mod sweep;
pub mod topo;
pub mod trial;

#[cfg(test)]
mod test;
