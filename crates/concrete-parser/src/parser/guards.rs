//! Parser guards to prevent infinite loops and stack overflow

use super::ParseError;
use crate::token::Span;

/// Maximum iterations for any parser loop before giving up
const MAX_LOOP_ITERATIONS: usize = 100_000;

/// Maximum nesting depth of type expressions before rejecting parse
pub const MAX_PARSE_DEPTH: usize = 64;

/// Guard against infinite loops in parser
///
/// Tracks iteration count and returns error if exceeded.
///
/// # Example
///
/// ```ignore
/// let mut guard = LoopGuard::new("struct_fields");
/// while !parser.check(&Token::RightBrace) {
///     guard.check()?;
///     // ... parse a field ...
/// }
/// ```
pub struct LoopGuard {
    name: &'static str,
    count: usize,
    max: usize,
}

impl LoopGuard {
    /// Create a new loop guard with default limit
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            count: 0,
            max: MAX_LOOP_ITERATIONS,
        }
    }

    /// Create a loop guard with custom limit
    #[inline]
    pub fn with_limit(name: &'static str, max: usize) -> Self {
        Self { name, count: 0, max }
    }

    /// Check iteration count, return error if exceeded
    #[inline]
    pub fn check(&mut self) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max {
            return Err(ParseError::parser_limit_exceeded(
                format!("loop '{}' exceeded {} iterations", self.name, self.max),
                Span::default(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_guard_under_limit() {
        let mut guard = LoopGuard::with_limit("test", 10);
        for _ in 0..10 {
            assert!(guard.check().is_ok());
        }
    }

    #[test]
    fn test_loop_guard_exceeds_limit() {
        let mut guard = LoopGuard::with_limit("test", 3);
        for _ in 0..3 {
            let _ = guard.check();
        }
        let err = guard.check().unwrap_err();
        assert!(err.message.contains("loop 'test' exceeded 3 iterations"));
    }
}
