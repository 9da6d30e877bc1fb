use std::fmt;

/// Error codes for all processor diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E1xxx: Declaration validation (local, per annotated element)
/// - E2xxx: Structural failures (linking, emission)
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Validation (E1xxx)
    /// Annotated member is private or static
    E1001,
    /// Annotated member is not contained in a class
    E1002,
    /// Annotated member is contained in a private class
    E1003,
    /// Annotated member's class lives in a reserved framework namespace
    E1004,
    /// Annotated member's type is neither a handle subtype nor an interface
    E1005,
    /// Key already bound by another field of the same type
    E1006,
    /// Annotated member's type is not resolvable yet (note)
    E1007,
    /// Annotation could not be read
    E1008,

    // Structural (E2xxx)
    /// Cyclic binding hierarchy
    E2001,
    /// Generated binder could not be written
    E2002,

    // Internal (E9xxx)
    /// Internal processor error
    E9001,
}

impl ErrorCode {
    /// Check if this is a per-element validation code (E1xxx range).
    pub fn is_validation_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a structural code (E2xxx range).
    pub fn is_structural_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E9001 => "E9001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
