//! Thin wrappers around the descriptor syscalls used by the guards. Every
//! descriptor created here is owned by an [OwnedFd] (or a [File]) so that it
//! is closed on every path, and is marked close-on-exec so that programs
//! spawned during a capture only inherit the redirected standard streams.

use std::{
    fs::{File, OpenOptions},
    io,
    os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd},
    ptr,
};

/// Where suppressed output is sent.
pub(crate) const DISCARD_PATH: &str = "/dev/null";

/// Both ends of an anonymous pipe.
#[derive(Debug)]
pub(crate) struct Pipe {
    pub reader: OwnedFd,
    pub writer: OwnedFd,
}

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 { Err(io::Error::last_os_error()) } else { Ok(ret) }
}

/// Like [cvt], but retries the call when it was interrupted by a signal.
fn cvt_r(mut f: impl FnMut() -> libc::c_int) -> io::Result<libc::c_int> {
    loop {
        match cvt(f()) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Create a new pipe with both ends close-on-exec.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub(crate) fn pipe() -> io::Result<Pipe> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    cvt(unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) })?;

    // SAFETY: `pipe2` succeeded, so both descriptors are open and nothing else
    // owns them.
    let (reader, writer) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    Ok(Pipe { reader, writer })
}

/// Create a new pipe with both ends close-on-exec.
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
pub(crate) fn pipe() -> io::Result<Pipe> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    cvt(unsafe { libc::pipe(fds.as_mut_ptr()) })?;

    // SAFETY: `pipe` succeeded, so both descriptors are open and nothing else
    // owns them.
    let (reader, writer) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    // No `pipe2` here, there is a window in which a concurrent `fork` can
    // inherit these.
    set_cloexec(reader.as_raw_fd())?;
    set_cloexec(writer.as_raw_fd())?;
    Ok(Pipe { reader, writer })
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = cvt(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
    cvt(unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
    Ok(())
}

/// Put a descriptor into non-blocking mode, reads then fail with
/// [io::ErrorKind::WouldBlock] instead of waiting for data.
pub(crate) fn set_nonblocking(fd: BorrowedFd<'_>) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    let flags = cvt(unsafe { libc::fcntl(raw, libc::F_GETFL) })?;
    cvt(unsafe { libc::fcntl(raw, libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
    Ok(())
}

/// Duplicate `fd` into a new close-on-exec descriptor.
pub(crate) fn duplicate(fd: RawFd) -> io::Result<OwnedFd> {
    let new = cvt(unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) })?;

    // SAFETY: `fcntl` returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(new) })
}

/// Make `target` refer to the same open file as `source`. The descriptor
/// `target` keeps its number and is inheritable afterwards.
pub(crate) fn redirect(source: BorrowedFd<'_>, target: RawFd) -> io::Result<()> {
    cvt_r(|| unsafe { libc::dup2(source.as_raw_fd(), target) })?;
    Ok(())
}

pub(crate) fn open_discard() -> io::Result<File> {
    OpenOptions::new().write(true).open(DISCARD_PATH)
}

/// Flush every output stream of the C library.
pub(crate) fn flush_c_stdio() {
    // SAFETY: a null stream flushes all open output streams.
    unsafe {
        libc::fflush(ptr::null_mut());
    }
}
