//! Human readable rendering of an [Analysis].
use syqure_utils::{stream::CompilerOutputStream, stream_writeln};

use crate::Analysis;

const RULE: &str = "============================================================";

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Write the analysis to `stream` as a sectioned text report.
pub fn write_report(analysis: &Analysis, mut stream: CompilerOutputStream) {
    let Analysis { types, operations, runtime, estimate, .. } = analysis;

    stream_writeln!(stream, "{RULE}");
    stream_writeln!(stream, "STATIC ANALYSIS: {}", analysis.file);
    stream_writeln!(stream, "{RULE}");

    stream_writeln!(stream, "\n--- Type Usage ---");
    stream_writeln!(stream, "  Sharetensor (MPC):   {}", yes_no(types.sharetensor));
    stream_writeln!(stream, "  Ciphertensor (HE):   {}", yes_no(types.ciphertensor));
    stream_writeln!(stream, "  MPU (Union):         {}", yes_no(types.mpu));
    stream_writeln!(stream, "  MPP (Partition):     {}", yes_no(types.mpp));
    stream_writeln!(stream, "  MPA (Aggregate):     {}", yes_no(types.mpa));

    stream_writeln!(stream, "\n--- Operation Patterns ---");
    stream_writeln!(stream, "  Matrix multiplications (@): {}", operations.matmul);
    stream_writeln!(stream, "  Encrypt calls:              {}", operations.encrypt);
    stream_writeln!(stream, "  Decrypt/reveal calls:       {}", operations.decrypt);

    let mhe = if runtime.needs_mhe { "Yes" } else { "No (MPC only)" };
    stream_writeln!(stream, "\n--- Runtime Requirements ---");
    stream_writeln!(stream, "  Requires MHE setup:  {mhe}");
    stream_writeln!(stream, "  Can use --skip-mhe:  {}", yes_no(runtime.can_skip_mhe));
    stream_writeln!(stream, "  Uses @local:         {}", yes_no(runtime.uses_local));

    stream_writeln!(stream, "\n--- Estimated Runtime ---");
    stream_writeln!(stream, "  JIT Compilation:     {:>6.1}s", estimate.jit_seconds);
    if runtime.needs_mhe {
        stream_writeln!(stream, "  MHE Key Setup:       {:>6.1}s", estimate.mhe_seconds);
    }
    stream_writeln!(stream, "  MPC Network:         {:>6.1}s", estimate.mpc_seconds);
    stream_writeln!(stream, "  Operations (rough):  {:>6.1}s", estimate.ops_seconds);
    stream_writeln!(stream, "  --------------------------");
    stream_writeln!(stream, "  TOTAL:               {:>6.1}s", estimate.total_seconds);
    stream_writeln!(stream, "{RULE}");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::analyze_source;

    #[test]
    fn key_setup_is_only_listed_when_needed() {
        let stream = CompilerOutputStream::owned();
        write_report(&analyze_source(Path::new("mpc.codon"), "a = b @ c"), stream.clone());

        let report = stream.contents().unwrap();
        assert!(report.contains("STATIC ANALYSIS: mpc.codon"));
        assert!(report.contains("  Requires MHE setup:  No (MPC only)"));
        assert!(report.contains("  TOTAL:                 23.0s"));
        assert!(!report.contains("MHE Key Setup"));

        let stream = CompilerOutputStream::owned();
        write_report(&analyze_source(Path::new("he.codon"), "Ciphertensor"), stream.clone());
        assert!(stream.contents().unwrap().contains("  MHE Key Setup:         15.0s"));
    }
}
