//! Fatal Error Reporting
//!
//! A failing node writes exactly one diagnostic line and exits non-zero. Its
//! parent sees only the exit status and fails in turn, so the failure climbs
//! the tree one level at a time until the root reports it.

use std::fmt::Display;
use std::io::Write;

/// Exit status of a node that failed for any reason
pub const EXIT_FAILURE: i32 = 1;

/// Program name used as the diagnostic prefix: `argv[0]`, or "forkfft".
pub fn program_name() -> String {
    std::env::args()
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "forkfft".to_string())
}

/// Render the single diagnostic line, without a trailing newline.
pub fn diagnostic(program: &str, error: &dyn Display) -> String {
    let message = error.to_string();
    let message = message.lines().collect::<Vec<_>>().join(" ");
    format!("{program}: {message}")
}

/// Write the diagnostic line to `sink`.
pub fn write_fatal<W: Write>(sink: &mut W, program: &str, error: &dyn Display) {
    let _ = writeln!(sink, "{}", diagnostic(program, error));
    let _ = sink.flush();
}

/// Report a fatal error on stderr.
pub fn report_fatal(program: &str, error: &dyn Display) {
    write_fatal(&mut std::io::stderr().lock(), program, error);
}

/// Report a fatal error on stderr and terminate with [`EXIT_FAILURE`].
pub fn exit_fatal(program: &str, error: &dyn Display) -> ! {
    report_fatal(program, error);
    std::process::exit(EXIT_FAILURE)
}
