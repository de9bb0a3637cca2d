//! Redirect construction

use crate::ast::{Command, Redirect, Word};

/// Descriptor a redirect applies to when the script names none: standard
/// input for operators starting with `<`, standard output otherwise.
pub fn default_fd(op: &str) -> u32 {
    if op.starts_with('<') {
        0
    } else {
        1
    }
}

/// `[fd]>&[n]-`: move a descriptor, or close it when no target is given.
pub fn move_fd(fd: Option<u32>, op: &str, dest: String) -> Redirect {
    Redirect::MoveFd {
        fd: fd.unwrap_or_else(|| default_fd(op)),
        op: op.to_string(),
        dest: Word::Literal { value: dest },
    }
}

/// `[fd]>&n`
pub fn duplicate_fd(src_fd: Option<u32>, op: &str, dest_fd: u32) -> Redirect {
    Redirect::DuplicateFd {
        src_fd: src_fd.unwrap_or_else(|| default_fd(op)),
        op: op.to_string(),
        dest_fd,
    }
}

/// `[fd]> file` and the other file operators.
pub fn redirect_fd(fd: Option<u32>, op: &str, filename: Word) -> Redirect {
    Redirect::RedirectFd {
        fd: fd.unwrap_or_else(|| default_fd(op)),
        op: op.to_string(),
        filename,
    }
}

/// The command on the right of `|`, attached to the one on its left.
pub fn pipe(command: Command) -> Redirect {
    Redirect::Pipe {
        command: Box::new(command),
    }
}
