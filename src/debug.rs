//! Process-wide debug hook, bridged to the `log` facade.
//!
//! The reference implementation this crate is modeled on call a process-wide
//! `dbgprintf` callback from deep inside parsing and retrieval code. Rather
//! than carry a raw function-pointer callback into safe Rust, diagnostic
//! output is emitted through `log::debug!`/`log::trace!` at the call sites
//! themselves; [`set_debug_print`] exists only so callers migrating from that
//! model have a single place to install a `log` subscriber.

/// Installs `logger` as the global `log` implementation. Calling this more
/// than once returns an error, same as `log::set_boxed_logger` itself.
pub fn set_debug_print(logger: Box<dyn log::Log>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(logger)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
