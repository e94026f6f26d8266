//! The orchestrator that walks a [CompilerSession] through a build, hiding
//! its diagnostics when asked to and capturing what the compiled program
//! writes.
use std::{
    iter,
    ops::{Deref, DerefMut},
    path::Path,
};

use log::Level;
use syqure_pipeline::{
    interface::{CompilerSession, LinkOptions, Toolchain, ToolchainResult},
    result::BuildResult,
    settings::CompilerSettings,
};
use syqure_stdio::{CapturedOutput, OutputCapture, StreamSuppressor};
use syqure_utils::timing::{timed, PhaseTimings};

/// The syqure driver. A [Driver] owns a [Toolchain] and creates one compiler
/// session per request from it.
///
/// While a request is in flight the process's standard streams may be
/// redirected, so the driver only records phase timings and defers all
/// logging until the streams are back in place.
pub struct Driver<T: Toolchain> {
    /// The toolchain that builds are delegated to.
    toolchain: T,

    /// Whether the output of programs executed by [Driver::run] is captured.
    capture: bool,

    /// Whether captures read their pipes without blocking.
    nonblocking_reads: bool,

    /// How long each phase of the last request took.
    timings: PhaseTimings,
}

impl<T: Toolchain> Deref for Driver<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.toolchain
    }
}

impl<T: Toolchain> DerefMut for Driver<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.toolchain
    }
}

impl<T: Toolchain> Driver<T> {
    pub fn new(toolchain: T) -> Self {
        Self { toolchain, capture: true, nonblocking_reads: false, timings: PhaseTimings::new() }
    }

    /// Disable capturing to let programs write straight to the process's
    /// streams.
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Make the capture readers poll their pipes rather than block on them.
    pub fn with_nonblocking_reads(mut self, nonblocking: bool) -> Self {
        self.nonblocking_reads = nonblocking;
        self
    }

    /// The phase timings of the last request. Only recorded when `debug`
    /// logging is enabled.
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Compile the input of `settings` and run it with `program_args`.
    ///
    /// The program is invoked with the input path as its first argument.
    /// Its output is captured and returned in the [BuildResult], including
    /// when it fails.
    pub fn run(&mut self, settings: &CompilerSettings, program_args: &[String]) -> BuildResult {
        self.timings = PhaseTimings::new();

        let mut suppressor = StreamSuppressor::stderr(settings.quiet);
        let mut session = self.toolchain.create_session(settings);

        let prepared = self.prepare(&mut session, settings);
        suppressor.restore();

        if let Err(error) = prepared {
            self.report_timings();
            return BuildResult::failure(error.message());
        }

        let args: Vec<String> = iter::once(settings.input.to_string_lossy().into_owned())
            .chain(program_args.iter().cloned())
            .collect();

        let mut capture = OutputCapture::new().with_nonblocking_reads(self.nonblocking_reads);
        let capturing = self.capture && self.start_capture(&mut capture);

        let timings = &mut self.timings;
        let ran = timed(
            || session.run(&args, &settings.libs),
            Level::Debug,
            |elapsed| timings.record("run", elapsed),
        );

        let output = if capturing { capture.into_output() } else { CapturedOutput::default() };
        self.report_timings();

        match ran {
            Ok(()) => BuildResult::ran(output),
            Err(error) => BuildResult::failure(error.message()).with_output(output),
        }
    }

    /// Compile the input of `settings` and write it out to `output` as an
    /// executable, or a shared library if the settings ask for one.
    pub fn build_exe(&mut self, settings: &CompilerSettings, output: &Path) -> BuildResult {
        self.timings = PhaseTimings::new();

        let mut suppressor = StreamSuppressor::stderr(settings.quiet);
        let mut session = self.toolchain.create_session(settings);

        let built = self.prepare(&mut session, settings).and_then(|()| {
            let timings = &mut self.timings;
            timed(
                || session.write_executable(output, LinkOptions::from_settings(settings)),
                Level::Debug,
                |elapsed| timings.record("link", elapsed),
            )
        });

        suppressor.restore();
        self.report_timings();

        match built {
            Ok(()) => BuildResult::built(output.to_path_buf()),
            Err(error) => BuildResult::failure(error.message()),
        }
    }

    /// Load the plugins, then parse and compile the input.
    fn prepare(
        &mut self,
        session: &mut T::Session,
        settings: &CompilerSettings,
    ) -> ToolchainResult<()> {
        let timings = &mut self.timings;

        timed(
            || settings.plugins.iter().try_for_each(|plugin| session.load_plugin(plugin)),
            Level::Debug,
            |elapsed| timings.record("plugins", elapsed),
        )?;
        timed(
            || session.parse_file(settings.input()),
            Level::Debug,
            |elapsed| timings.record("parse", elapsed),
        )?;
        timed(|| session.compile(), Level::Debug, |elapsed| timings.record("compile", elapsed))
    }

    /// Start capturing, or carry on without when the pipes can't be set up.
    /// A failed start leaves the streams untouched so it's safe to log here.
    fn start_capture(&self, capture: &mut OutputCapture) -> bool {
        match capture.start() {
            Ok(()) => true,
            Err(error) => {
                log::debug!("running without capturing output: {error}");
                false
            }
        }
    }

    fn report_timings(&self) {
        if log::log_enabled!(Level::Debug) {
            self.timings.report();
        }
    }
}
