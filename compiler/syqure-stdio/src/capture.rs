//! Capturing everything written to `stdout` and `stderr` by the process and
//! by the programs it spawns with inherited descriptors.
//!
//! While a capture is active both standard streams point at the write end of
//! a pipe. Each pipe is drained by its own reader thread into a buffer, so a
//! program producing lots of output never blocks on a full pipe. Stopping
//! the capture restores the streams, closes the write ends (which is what
//! lets the readers see the end of the stream) and joins the readers, after
//! which the buffers hold everything that was written. The read ends are
//! closed last.

use std::{
    fs::File,
    io::{self, Read},
    mem,
    os::fd::{AsFd, OwnedFd},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    fd::{self, Pipe},
    scope::RedirectionScope,
    CaptureError, StdStream,
};

/// How much is read from a pipe at once.
const READ_CHUNK_SIZE: usize = 4096;

/// Back-off when a non-blocking read has nothing to return yet.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Back-off once a stop has been requested, the remaining bytes are already
/// in the pipe so there is no point in spinning on it.
const DRAIN_INTERVAL: Duration = Duration::from_millis(5);

type PipeFactory = fn() -> io::Result<Pipe>;

/// An append-only byte buffer, written by exactly one reader thread.
#[derive(Debug, Default, Clone)]
struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    fn append(&self, bytes: &[u8]) {
        self.0.lock().extend_from_slice(bytes);
    }

    fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    fn take(&self) -> Vec<u8> {
        mem::take(&mut *self.0.lock())
    }
}

/// The captured text of both streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// One redirected stream of an active capture.
struct StreamTap {
    scope: RedirectionScope,

    /// The write end of the pipe, closed when the capture stops.
    writer: Option<OwnedFd>,

    /// The read end of the pipe, shared with the reader thread. It stays
    /// open until the reader is joined, so writes to the stream never find a
    /// pipe without a reader, even when the reader gave up early.
    reader: Option<Arc<File>>,

    worker: Option<JoinHandle<io::Result<()>>>,
}

impl StreamTap {
    fn new(scope: RedirectionScope, pipe: Pipe) -> Self {
        Self {
            scope,
            writer: Some(pipe.writer),
            reader: Some(Arc::new(File::from(pipe.reader))),
            worker: None,
        }
    }

    fn spawn_reader(
        &mut self,
        buffer: CaptureBuffer,
        stop: Arc<AtomicBool>,
        nonblocking: bool,
    ) -> io::Result<()> {
        let stream = self.scope.stream();
        let Some(reader) = self.reader.clone() else {
            return Ok(());
        };

        if nonblocking {
            fd::set_nonblocking(reader.as_fd())?;
        }

        let worker = thread::Builder::new()
            .name(format!("capture-{stream}"))
            .spawn(move || drain(&*reader, &buffer, &stop))?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Wait for the reader thread, which finishes once every write end of the
    /// pipe is closed.
    fn join(&mut self) -> io::Result<()> {
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| {
                Err(io::Error::other(format!("the `{}` reader panicked", self.scope.stream())))
            }),
            None => Ok(()),
        }
    }

    /// Close the read end, only valid once the reader has been joined.
    fn close_reader(&mut self) {
        debug_assert!(self.worker.is_none());
        self.reader.take();
    }
}

struct CaptureSession {
    stdout: StreamTap,
    stderr: StreamTap,
}

/// Captures `stdout` and `stderr` between [`OutputCapture::start`] and
/// [`OutputCapture::stop`].
///
/// The captured text is read with [`OutputCapture::stdout`] and
/// [`OutputCapture::stderr`] once the capture has been stopped. Starting the
/// same capture again appends to what was already captured. A capture that is
/// still active when dropped is stopped.
pub struct OutputCapture {
    stdout: CaptureBuffer,
    stderr: CaptureBuffer,

    /// Set when a stop has been requested, only changes how eagerly the
    /// readers poll.
    stop: Arc<AtomicBool>,

    session: Option<CaptureSession>,

    /// Whether the readers poll the pipes instead of blocking on them.
    nonblocking: bool,

    make_pipe: PipeFactory,
}

impl Default for OutputCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::with_pipe_factory(fd::pipe)
    }

    pub(crate) fn with_pipe_factory(make_pipe: PipeFactory) -> Self {
        Self {
            stdout: CaptureBuffer::default(),
            stderr: CaptureBuffer::default(),
            stop: Arc::new(AtomicBool::new(false)),
            session: None,
            nonblocking: false,
            make_pipe,
        }
    }

    /// Make the readers poll the pipes with a short sleep between attempts
    /// instead of blocking in `read`.
    pub fn with_nonblocking_reads(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Redirect both standard streams into pipes and start draining them.
    ///
    /// Fails with [CaptureError::AlreadyActive] when the capture is running.
    /// On any failure the standard streams are left exactly as they were and
    /// every descriptor created so far is closed.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_active() {
            return Err(CaptureError::AlreadyActive);
        }

        let stdout_pipe = (self.make_pipe)()
            .map_err(|error| CaptureError::Pipe { stream: StdStream::Stdout, error })?;
        let stderr_pipe = (self.make_pipe)()
            .map_err(|error| CaptureError::Pipe { stream: StdStream::Stderr, error })?;

        // Saving also flushes, anything written so far goes to the original
        // streams.
        let stdout_scope = save(StdStream::Stdout)?;
        let stderr_scope = save(StdStream::Stderr)?;

        redirect(&stdout_scope, &stdout_pipe)?;
        redirect(&stderr_scope, &stderr_pipe)?;

        self.stop.store(false, Ordering::SeqCst);

        let session = self.session.insert(CaptureSession {
            stdout: StreamTap::new(stdout_scope, stdout_pipe),
            stderr: StreamTap::new(stderr_scope, stderr_pipe),
        });

        let spawned = session
            .stdout
            .spawn_reader(self.stdout.clone(), self.stop.clone(), self.nonblocking)
            .map_err(|error| CaptureError::Reader { stream: StdStream::Stdout, error })
            .and_then(|_| {
                session
                    .stderr
                    .spawn_reader(self.stderr.clone(), self.stop.clone(), self.nonblocking)
                    .map_err(|error| CaptureError::Reader { stream: StdStream::Stderr, error })
            });

        if let Err(error) = spawned {
            self.stop();
            return Err(error);
        }

        Ok(())
    }

    /// Restore both standard streams and wait until everything written to
    /// them while capturing is in the buffers. Does nothing when the capture
    /// isn't active.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        self.stop.store(true, Ordering::SeqCst);

        // Restoring flushes each stream first, so buffered output still ends
        // up in the pipes.
        session.stdout.scope.restore();
        session.stderr.scope.restore();

        // With the standard descriptors pointing elsewhere, these are the last
        // write ends owned by this process.
        session.stdout.writer.take();
        session.stderr.writer.take();

        let results = [
            (StdStream::Stdout, session.stdout.join()),
            (StdStream::Stderr, session.stderr.join()),
        ];

        session.stdout.close_reader();
        session.stderr.close_reader();

        // The streams are restored, so this is safe to log now.
        for (stream, result) in results {
            if let Err(error) = result {
                log::debug!("the `{stream}` capture ended early: {error}");
            }
        }
    }

    /// The text captured from `stdout`, lossily decoded.
    pub fn stdout(&self) -> String {
        self.stdout.text()
    }

    /// The text captured from `stderr`, lossily decoded.
    pub fn stderr(&self) -> String {
        self.stderr.text()
    }

    pub fn stdout_bytes(&self) -> Vec<u8> {
        self.stdout.bytes()
    }

    pub fn stderr_bytes(&self) -> Vec<u8> {
        self.stderr.bytes()
    }

    /// Stop the capture if it is still active and take the captured text.
    pub fn into_output(mut self) -> CapturedOutput {
        self.stop();

        CapturedOutput {
            stdout: String::from_utf8_lossy(&self.stdout.take()).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr.take()).into_owned(),
        }
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn save(stream: StdStream) -> Result<RedirectionScope, CaptureError> {
    RedirectionScope::save(stream).map_err(|error| CaptureError::Redirect { stream, error })
}

fn redirect(scope: &RedirectionScope, pipe: &Pipe) -> Result<(), CaptureError> {
    scope
        .redirect_to(&pipe.writer)
        .map_err(|error| CaptureError::Redirect { stream: scope.stream(), error })
}

/// Read `source` into `buffer` until the end of the stream. Errors other
/// than an empty non-blocking pipe or an interrupted read end the loop,
/// keeping whatever was read before.
fn drain(mut source: impl Read, buffer: &CaptureBuffer, stop: &AtomicBool) -> io::Result<()> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        match source.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(count) => buffer.append(&chunk[..count]),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                let interval =
                    if stop.load(Ordering::SeqCst) { DRAIN_INTERVAL } else { POLL_INTERVAL };
                thread::sleep(interval);
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        os::fd::{AsRawFd, RawFd},
        sync::atomic::AtomicUsize,
    };

    use rusty_fork::rusty_fork_test;

    use super::*;

    fn identity(fd: RawFd) -> (u64, u64) {
        let mut stat = unsafe { mem::zeroed::<libc::stat>() };
        assert_eq!(unsafe { libc::fstat(fd, &mut stat) }, 0);
        (stat.st_dev as u64, stat.st_ino as u64)
    }

    fn is_open(fd: RawFd) -> bool {
        unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
    }

    #[test]
    fn drain_polls_an_empty_nonblocking_pipe_until_closed() {
        let Pipe { reader, writer } = fd::pipe().unwrap();
        fd::set_nonblocking(reader.as_fd()).unwrap();

        let buffer = CaptureBuffer::default();
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let (buffer, stop) = (buffer.clone(), stop.clone());
            thread::spawn(move || drain(File::from(reader), &buffer, &stop))
        };

        let mut writer = File::from(writer);
        thread::sleep(Duration::from_millis(10));
        writer.write_all(b"first ").unwrap();
        thread::sleep(Duration::from_millis(10));
        writer.write_all(b"second").unwrap();

        stop.store(true, Ordering::SeqCst);
        drop(writer);

        worker.join().unwrap().unwrap();
        assert_eq!(buffer.bytes(), b"first second");
    }

    #[test]
    fn drain_stops_on_a_read_error() {
        let Pipe { reader: _reader, writer } = fd::pipe().unwrap();
        let buffer = CaptureBuffer::default();

        // The write end of a pipe can't be read from.
        let result = drain(File::from(writer), &buffer, &AtomicBool::new(false));

        assert!(result.is_err());
        assert!(buffer.bytes().is_empty());
    }

    /// Fails every read, like a pipe that broke after some output arrived.
    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::EIO))
        }
    }

    #[test]
    fn drain_keeps_what_was_read_before_an_error() {
        let buffer = CaptureBuffer::default();
        let source = (&b"partial output"[..]).chain(BrokenPipe);

        let result = drain(source, &buffer, &AtomicBool::new(false));

        assert_eq!(result.unwrap_err().raw_os_error(), Some(libc::EIO));
        assert_eq!(buffer.bytes(), b"partial output");
    }

    static PIPES_MADE: AtomicUsize = AtomicUsize::new(0);
    static FIRST_PIPE: std::sync::Mutex<Option<(RawFd, RawFd)>> = std::sync::Mutex::new(None);

    fn fail_second_pipe() -> io::Result<Pipe> {
        if PIPES_MADE.fetch_add(1, Ordering::SeqCst) == 0 {
            let pipe = fd::pipe()?;
            *FIRST_PIPE.lock().unwrap() = Some((pipe.reader.as_raw_fd(), pipe.writer.as_raw_fd()));
            Ok(pipe)
        } else {
            Err(io::Error::from_raw_os_error(libc::EMFILE))
        }
    }

    rusty_fork_test! {
        #[test]
        fn read_end_stays_open_after_the_reader_finishes() {
            let pipe = fd::pipe().unwrap();
            let reader_fd = pipe.reader.as_raw_fd();

            let mut tap = StreamTap::new(RedirectionScope::save(StdStream::Stdout).unwrap(), pipe);
            tap.spawn_reader(CaptureBuffer::default(), Arc::new(AtomicBool::new(false)), false)
                .unwrap();

            tap.writer.take();
            tap.join().unwrap();
            assert!(is_open(reader_fd));

            tap.close_reader();
            assert!(!is_open(reader_fd));
        }

        #[test]
        fn failed_second_pipe_rolls_back() {
            let stdout_before = identity(libc::STDOUT_FILENO);
            let stderr_before = identity(libc::STDERR_FILENO);

            let mut capture = OutputCapture::with_pipe_factory(fail_second_pipe);
            let result = capture.start();

            assert!(matches!(
                result,
                Err(CaptureError::Pipe { stream: StdStream::Stderr, .. })
            ));
            assert!(!capture.is_active());

            let (reader, writer) = FIRST_PIPE.lock().unwrap().expect("first pipe was created");
            assert!(!is_open(reader));
            assert!(!is_open(writer));

            assert_eq!(identity(libc::STDOUT_FILENO), stdout_before);
            assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
        }

        #[test]
        fn start_while_active_changes_nothing() {
            let mut capture = OutputCapture::new();
            capture.start().unwrap();

            let redirected = identity(libc::STDOUT_FILENO);
            assert!(matches!(capture.start(), Err(CaptureError::AlreadyActive)));
            assert_eq!(identity(libc::STDOUT_FILENO), redirected);
            assert!(capture.is_active());

            capture.stop();
            assert!(!capture.is_active());
        }
    }
}
