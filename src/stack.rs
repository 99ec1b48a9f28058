//! Parsing and dumping recurse once per tree level, so both run on a
//! worker thread whose stack fits the deepest tree the parser accepts.

use std::io;
use std::panic;
use std::thread;

/// Stack for the worker thread. Pages are only committed when touched.
const DEEP_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Run `f` to completion on a thread with a `DEEP_STACK_SIZE` stack.
///
/// Fails only when the thread cannot be spawned; a panic inside `f` is
/// resumed on the calling thread.
pub(crate) fn with_deep_stack<T, F>(f: F) -> io::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("astgen-deep".to_string())
            .stack_size(DEEP_STACK_SIZE)
            .spawn_scoped(scope, f)?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u32) -> u32 {
        let pad = std::hint::black_box([0u8; 512]);
        if n == 0 {
            return u32::from(pad[0]);
        }
        depth(n - 1) + u32::from(pad[1]) + 1
    }

    #[test]
    fn test_runs_deep_recursion() {
        // About 50 MiB of frames, far past the default test thread stack.
        let result = with_deep_stack(|| depth(100_000)).unwrap();
        assert_eq!(result, 100_000);
    }

    #[test]
    fn test_panics_propagate() {
        let caught = panic::catch_unwind(|| {
            let _ = with_deep_stack(|| -> u32 { panic!("inner failure") });
        });
        assert!(caught.is_err());
    }
}
