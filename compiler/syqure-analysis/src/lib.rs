//! Static analysis of Sequre programs.
//!
//! The analysis is purely textual: it looks for the secure types and
//! operations that a program mentions and derives a rough estimate of how
//! long a run takes from them. Nothing is compiled.

mod patterns;
pub mod report;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;

use crate::patterns::*;

/// Seconds spent JIT-compiling a program.
const JIT_SECONDS: f64 = 20.0;

/// Seconds spent setting up the keys for homomorphic encryption.
const MHE_SETUP_SECONDS: f64 = 15.0;

/// Seconds spent establishing the MPC network.
const MPC_SECONDS: f64 = 3.0;

/// Rough cost of a matrix multiplication of secret-shared tensors.
const SHARETENSOR_MATMUL_SECONDS: f64 = 1000.0 * 0.00003;

/// Rough cost of a matrix multiplication of encrypted tensors.
const CIPHERTENSOR_MATMUL_SECONDS: f64 = 100.0 * 0.033;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("couldn't read `{}`: {error}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("couldn't serialise the analysis: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which secure types the program uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeUsage {
    pub sharetensor: bool,
    pub ciphertensor: bool,
    pub mpu: bool,
    pub mpp: bool,
    pub mpa: bool,
}

/// How often the program performs the operations that dominate a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operations {
    pub matmul: usize,
    pub encrypt: usize,
    pub decrypt: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    /// Whether the run needs homomorphic encryption keys.
    pub needs_mhe: bool,
    pub can_skip_mhe: bool,
    pub uses_local: bool,
}

/// The estimated duration of a run, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub jit_seconds: f64,
    pub mhe_seconds: f64,
    pub mpc_seconds: f64,
    pub ops_seconds: f64,
    pub total_seconds: f64,
}

impl Estimate {
    fn new(types: &TypeUsage, operations: &Operations, needs_mhe: bool) -> Self {
        let mhe_seconds = if needs_mhe { MHE_SETUP_SECONDS } else { 0.0 };
        let matmuls = operations.matmul as f64;

        let mut ops_seconds = 0.0;
        if types.sharetensor {
            ops_seconds += matmuls * SHARETENSOR_MATMUL_SECONDS;
        }
        if types.ciphertensor {
            ops_seconds += matmuls * CIPHERTENSOR_MATMUL_SECONDS;
        }
        let ops_seconds = round_to(ops_seconds, 3);

        let total_seconds = round_to(JIT_SECONDS + mhe_seconds + MPC_SECONDS + ops_seconds, 1);

        Self { jit_seconds: JIT_SECONDS, mhe_seconds, mpc_seconds: MPC_SECONDS, ops_seconds, total_seconds }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// The analysis of one program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// The file name of the program.
    pub file: String,

    /// The canonical path of the program, when it can be resolved.
    pub path: String,

    pub types: TypeUsage,
    pub operations: Operations,
    pub runtime: RuntimeInfo,
    pub estimate: Estimate,
}

impl Analysis {
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read and analyse the program at `path`.
pub fn analyze_file(path: &Path) -> Result<Analysis, AnalysisError> {
    let source = fs::read_to_string(path)
        .map_err(|error| AnalysisError::Read { path: path.to_path_buf(), error })?;

    Ok(analyze_source(path, &source))
}

/// Analyse `source`, the contents of the program at `path`.
pub fn analyze_source(path: &Path, source: &str) -> Analysis {
    let types = TypeUsage {
        sharetensor: SHARETENSOR.is_match(source),
        ciphertensor: CIPHERTENSOR.is_match(source),
        mpu: MPU.is_match(source),
        mpp: MPP.is_match(source),
        mpa: MPA.is_match(source),
    };

    let operations = Operations {
        matmul: source.matches('@').count(),
        encrypt: ENCRYPT_CALL.find_iter(source).count(),
        decrypt: DECRYPT_CALL.find_iter(source).count(),
    };

    let needs_mhe =
        types.ciphertensor || types.mpu || types.mpp || types.mpa || MHE_MODULE.is_match(source);

    let runtime =
        RuntimeInfo { needs_mhe, can_skip_mhe: !needs_mhe, uses_local: LOCAL_DECORATOR.is_match(source) };

    let file = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    Analysis {
        file,
        path: resolved.to_string_lossy().into_owned(),
        estimate: Estimate::new(&types, &operations, needs_mhe),
        types,
        operations,
        runtime,
    }
}
