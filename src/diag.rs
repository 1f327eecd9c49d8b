//! Process-wide diagnostic sink.
//!
//! Library code reports failures through the [`log`] facade and stays silent
//! on success paths. Hosts that already install a logger keep full control of
//! the output; [`init`] is for binaries and tests that want the plain stderr
//! format below without wiring up their own sink.

use std::io::Write;

use env_logger::Env;

/// Install a line-buffered stderr sink formatting each record as
/// `[target:module:line] message`.
///
/// The filter defaults to `warn` and can be overridden through `RUST_LOG`.
/// Calling this more than once, or after another logger has been installed,
/// is a no-op; this function never fails.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}:{}:{}] {}",
                record.target(),
                record.module_path().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
