//! Syqure logging utilities. This defines the logger that every crate in the
//! workspace reaches through the [log] facade.
//!
//! Nothing should be logged while a standard stream is redirected, since the
//! record would end up in the captured output (or be discarded).

use once_cell::sync::OnceCell;

use crate::{
    highlight::{highlight, Colour, Modifier},
    log::{Level, LevelFilter, Log, Metadata, Record},
    stream::CompilerOutputStream,
    stream_writeln,
};

/// The logger used for `log!` statements.
///
/// Error records go to the error stream, everything else to the output
/// stream. Records are dropped until both streams are set.
#[derive(Default)]
pub struct CompilerLogger {
    /// The output stream that the logger will write to.
    pub output_stream: OnceCell<CompilerOutputStream>,

    /// The error stream that the logger will write to.
    pub error_stream: OnceCell<CompilerOutputStream>,
}

impl CompilerLogger {
    /// Create a new compiler logger.
    pub const fn new() -> Self {
        Self { output_stream: OnceCell::new(), error_stream: OnceCell::new() }
    }

    /// Attach the logger to the given streams, install it as the global
    /// logger and set the maximum level. Streams that were already attached
    /// are kept.
    pub fn install(
        &'static self,
        output_stream: CompilerOutputStream,
        error_stream: CompilerOutputStream,
        level: LevelFilter,
    ) -> Result<(), log::SetLoggerError> {
        let _ = self.output_stream.set(output_stream);
        let _ = self.error_stream.set(error_stream);

        log::set_logger(self)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CompilerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_prefix = match record.level() {
            Level::Error => highlight(Colour::Red | Modifier::Bold, "error"),
            Level::Warn => highlight(Colour::Yellow | Modifier::Bold, "warn"),
            Level::Info => highlight(Colour::Blue | Modifier::Bold, "info"),
            Level::Debug => highlight(Colour::Blue | Modifier::Bold, "debug"),
            Level::Trace => highlight(Colour::Magenta | Modifier::Bold, "trace"),
        };

        let stream = if record.level() == Level::Error {
            self.error_stream.get()
        } else {
            self.output_stream.get()
        };

        if let Some(stream) = stream {
            let mut out = stream.clone();
            stream_writeln!(out, "{level_prefix}: {}", record.args());
        }
    }

    fn flush(&self) {}
}
