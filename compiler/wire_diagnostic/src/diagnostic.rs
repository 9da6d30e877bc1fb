use std::fmt;

use wire_ir::{ResourceKey, TypeName};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// The program element a diagnostic is attached to.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementRef {
    /// A declared type.
    Type(TypeName),
    /// A member of a declared type.
    Member { owner: TypeName, name: String },
}

impl ElementRef {
    pub fn member(owner: &TypeName, name: impl Into<String>) -> Self {
        ElementRef::Member {
            owner: owner.clone(),
            name: name.into(),
        }
    }

    /// The declaring type this element belongs to.
    pub fn owner(&self) -> &TypeName {
        match self {
            ElementRef::Type(ty) | ElementRef::Member { owner: ty, .. } => ty,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Type(ty) => write!(f, "{ty}"),
            ElementRef::Member { owner, name } => write!(f, "{owner}.{name}"),
        }
    }
}

/// A diagnostic with everything needed to report it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// Element the diagnostic points at.
    pub element: Option<ElementRef>,
    /// Other elements involved (e.g. the first field of a key collision).
    pub related: Vec<ElementRef>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            element: None,
            related: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Create a new note diagnostic.
    pub fn note(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Note)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the diagnostic to an element.
    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }

    /// Add a related element.
    pub fn with_related(mut self, element: ElementRef) -> Self {
        self.related.push(element);
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// The declaring type this diagnostic is about, if attached.
    pub fn owner(&self) -> Option<&TypeName> {
        self.element.as_ref().map(ElementRef::owner)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        if let Some(element) = &self.element {
            write!(f, "\n  --> {element}")?;
        }

        for related in &self.related {
            write!(f, "\n      {related}")?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}

// Common diagnostics

/// A second field tried to bind a key that is already bound in the same type.
#[cold]
pub fn already_bound_key(
    owner: &TypeName,
    annotation: &str,
    key: &ResourceKey,
    existing: &str,
    field: &str,
) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1006)
        .with_message(format!(
            "Attempt to use @{annotation} for an already bound ID {key} on '{existing}'. ({owner}.{field})"
        ))
        .with_element(ElementRef::member(owner, field))
        .with_related(ElementRef::member(owner, existing))
}

/// A declaring type is part of an ancestor cycle.
#[cold]
pub fn cyclic_hierarchy(ty: &TypeName, cycle: &[TypeName]) -> Diagnostic {
    let path = cycle
        .iter()
        .map(TypeName::qualified)
        .collect::<Vec<_>>()
        .join(" -> ");
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("binding hierarchy of {ty} never reaches a root"))
        .with_element(ElementRef::Type(ty.clone()))
        .with_note(format!("cycle: {path}"))
}

/// The emission sink failed for a declaring type.
#[cold]
pub fn emission_failed(ty: &TypeName, reason: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!("Unable to write binding for type {ty}: {reason}"))
        .with_element(ElementRef::Type(ty.clone()))
}
