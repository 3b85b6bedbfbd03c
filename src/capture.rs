//! Run a unit of rendering that both writes text and returns a value.
//!
//! The unit receives its own buffer, so there is no ambient output stream to
//! start or tear down: a unit that fails simply drops what it wrote, and
//! nested captures each own a separate buffer.

/// Output text and return value of one captured unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured<T> {
    pub content: String,
    pub value: T,
}

/// Execute `unit` exactly once and return everything it wrote alongside
/// its return value.
pub fn capture<T, E>(unit: impl FnOnce(&mut String) -> Result<T, E>) -> Result<Captured<T>, E> {
    let mut content = String::new();
    let value = unit(&mut content)?;
    Ok(Captured { content, value })
}
