//! Syqure pipeline types shared between the driver and the toolchains it
//! drives: the settings of a build, the contract a toolchain implements, the
//! result record of a build and the errors of the pipeline.

pub mod error;
pub mod fs;
pub mod interface;
pub mod result;
pub mod settings;
