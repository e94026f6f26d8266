//! The syqure driver: runs a compiler toolchain with its diagnostics
//! optionally suppressed, captures what the compiled program writes, and
//! provides the [Syqure] facade over the Codon toolchain.

pub mod codon;
pub mod driver;
pub mod syqure;

pub use driver::Driver;
pub use syqure::{RunOutput, Syqure};
