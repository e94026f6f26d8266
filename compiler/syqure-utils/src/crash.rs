//! Syqure crash handler
use std::{io::Write, panic::PanicHookInfo, process::exit, sync::atomic, thread};

use backtrace::Backtrace;

const BUG_REPORT_MSG: &str = "This is a bug in syqure, please file a bug report \
                              with the output above and the program that triggered it.";

/// The panic hook for the `syqure` binary. Only the first panicking thread
/// gets to print: the panic message, where it occurred and a backtrace. The
/// process then exits.
///
/// Panics can happen while a capture is active, so the report is written to
/// `stderr`; the capture guards are not unwound before `exit`.
///
/// # Registering the handler
/// ```ignore
/// use std::panic;
/// use syqure_utils::crash::crash_handler;
/// ...
///
/// panic::set_hook(Box::new(crash_handler));
/// ```
pub fn crash_handler(info: &PanicHookInfo) {
    static PANIC_ONCE: atomic::AtomicBool = atomic::AtomicBool::new(false);

    if !PANIC_ONCE.swap(true, atomic::Ordering::SeqCst) {
        let stderr = std::io::stderr();
        let mut stderr = stderr.lock();

        let _ = write!(&mut stderr, "Sorry :^(\nInternal Error");

        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str));

        match message {
            Some(message) => {
                let _ = writeln!(&mut stderr, ": {message}\n");
            }
            None => {
                let _ = writeln!(&mut stderr, "\n");
            }
        }

        if let Some(location) = info.location() {
            let _ = writeln!(
                &mut stderr,
                "Occurred at '{}:{}:{}'",
                location.file(),
                location.line(),
                location.column()
            );
        }

        let backtrace = Backtrace::new();

        match thread::current().name() {
            Some(name) => {
                let _ = writeln!(&mut stderr, "Backtrace for thread \"{name}\":\n{backtrace:?}");
            }
            None => {
                let _ = writeln!(&mut stderr, "Backtrace:\n{backtrace:?}");
            }
        }

        let _ = writeln!(&mut stderr, "{BUG_REPORT_MSG}");
    }

    exit(1);
}
