//! Scenarios for suppressing the diagnostic stream.
#![cfg(test)]

use pretty_assertions::assert_eq;
use rusty_fork::rusty_fork_test;
use syqure_stdio::{OutputCapture, StdStream, StreamSuppressor, SuppressorState};

use crate::{discard_identity, identity, write_stderr, write_stdout};

rusty_fork_test! {
    #[test]
    fn unrequested_suppression_leaves_the_stream_alone() {
        let stderr_before = identity(libc::STDERR_FILENO);

        let mut suppressor = StreamSuppressor::stderr(false);
        assert_eq!(suppressor.state(), SuppressorState::Inert);
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);

        suppressor.restore();
        assert_eq!(suppressor.state(), SuppressorState::Inert);
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn suppressed_output_is_discarded_until_restored() {
        let stderr_before = identity(libc::STDERR_FILENO);

        // Capture around the suppressor to observe what reaches `stderr`.
        let mut capture = OutputCapture::new();
        capture.start().unwrap();

        let mut suppressor = StreamSuppressor::stderr(true);
        assert!(suppressor.is_engaged());
        assert_eq!(identity(libc::STDERR_FILENO), discard_identity());

        write_stderr(b"diagnostic\n");
        suppressor.restore();
        assert_eq!(suppressor.state(), SuppressorState::Restored);

        write_stderr(b"visible\n");
        capture.stop();

        assert_eq!(capture.stderr(), "visible\n");
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn restoring_twice_is_harmless() {
        let stderr_before = identity(libc::STDERR_FILENO);

        let mut suppressor = StreamSuppressor::stderr(true);
        suppressor.restore();
        suppressor.restore();

        assert_eq!(suppressor.state(), SuppressorState::Restored);
        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn dropping_an_engaged_suppressor_restores_the_stream() {
        let stderr_before = identity(libc::STDERR_FILENO);

        {
            let _suppressor = StreamSuppressor::stderr(true);
            assert_eq!(identity(libc::STDERR_FILENO), discard_identity());
        }

        assert_eq!(identity(libc::STDERR_FILENO), stderr_before);
    }

    #[test]
    fn a_stream_that_cant_be_duplicated_stays_visible() {
        // Nothing to duplicate once the descriptor is closed.
        assert_eq!(unsafe { libc::close(libc::STDERR_FILENO) }, 0);

        let mut suppressor = StreamSuppressor::stderr(true);
        assert_eq!(suppressor.state(), SuppressorState::Inert);
        assert!(!suppressor.is_engaged());

        suppressor.restore();
        assert_eq!(suppressor.state(), SuppressorState::Inert);
        assert_eq!(unsafe { libc::fcntl(libc::STDERR_FILENO, libc::F_GETFD) }, -1);
    }

    #[test]
    fn only_the_chosen_stream_is_suppressed() {
        let stdout_before = identity(libc::STDOUT_FILENO);

        let mut capture = OutputCapture::new();
        capture.start().unwrap();
        let redirected_stderr = identity(libc::STDERR_FILENO);

        let mut suppressor = StreamSuppressor::engage(StdStream::Stdout, true);
        assert_eq!(suppressor.stream(), StdStream::Stdout);
        assert_eq!(identity(libc::STDERR_FILENO), redirected_stderr);

        write_stdout(b"hidden\n");
        write_stderr(b"shown\n");
        suppressor.restore();
        capture.stop();

        assert_eq!(capture.stdout(), "");
        assert_eq!(capture.stderr(), "shown\n");
        assert_eq!(identity(libc::STDOUT_FILENO), stdout_before);
    }
}
