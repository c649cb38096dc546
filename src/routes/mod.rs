mod chatbot;
mod health_check;
mod subscribe;

pub use chatbot::*;
pub use health_check::*;
pub use subscribe::*;

/// Print an error followed by every `source` in its chain; used for the
/// `Debug` impls of errors that end up in logs.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
