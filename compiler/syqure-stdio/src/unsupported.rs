//! Stand-ins for platforms without descriptor redirection. Suppression never
//! engages and captures never start, so output simply stays visible.

use crate::{CaptureError, StdStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressorState {
    Inert,
    Engaged,
    Restored,
}

#[derive(Debug)]
pub struct StreamSuppressor {
    stream: StdStream,
}

impl StreamSuppressor {
    pub fn engage(stream: StdStream, _suppress: bool) -> Self {
        Self { stream }
    }

    pub fn stderr(suppress: bool) -> Self {
        Self::engage(StdStream::Stderr, suppress)
    }

    pub fn restore(&mut self) {}

    pub fn stream(&self) -> StdStream {
        self.stream
    }

    pub fn state(&self) -> SuppressorState {
        SuppressorState::Inert
    }

    pub fn is_engaged(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Default)]
pub struct OutputCapture;

impl OutputCapture {
    pub fn new() -> Self {
        Self
    }

    pub fn with_nonblocking_reads(self, _nonblocking: bool) -> Self {
        self
    }

    pub fn is_active(&self) -> bool {
        false
    }

    pub fn start(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    pub fn stop(&mut self) {}

    pub fn stdout(&self) -> String {
        String::new()
    }

    pub fn stderr(&self) -> String {
        String::new()
    }

    pub fn stdout_bytes(&self) -> Vec<u8> {
        Vec::new()
    }

    pub fn stderr_bytes(&self) -> Vec<u8> {
        Vec::new()
    }

    pub fn into_output(self) -> CapturedOutput {
        CapturedOutput::default()
    }
}
