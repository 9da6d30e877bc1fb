//! Qualified type identities and the binder naming convention.

use std::fmt;

/// Suffix appended to a declaring type's name to form its binder's name.
pub const BINDER_SUFFIX: &str = "_ViewBinding";

/// Separator that replaces nesting when a nested type's binder is named.
///
/// Binders are always top-level, so `Outer.Inner` becomes `Outer$Inner`.
pub const NESTED_SEPARATOR: char = '$';

/// Qualified identity of a declared type.
///
/// A type name is a (possibly empty) package plus one or more simple names,
/// outermost first. `com.example.Outer.Inner` has package `com.example` and
/// names `[Outer, Inner]`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeName {
    package: String,
    names: Vec<String>,
}

impl TypeName {
    /// Create a top-level type name.
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        TypeName {
            package: package.into(),
            names: vec![simple_name.into()],
        }
    }

    /// Create the name of a type nested directly inside `self`.
    #[must_use]
    pub fn nested(&self, simple_name: impl Into<String>) -> Self {
        let mut names = self.names.clone();
        names.push(simple_name.into());
        TypeName {
            package: self.package.clone(),
            names,
        }
    }

    /// Parse a dotted qualified name.
    ///
    /// Segments up to the first one starting with an uppercase letter form
    /// the package; the rest are nested simple names. A name with no
    /// uppercase segment (`int`, `a.b.c`) treats its last segment as the
    /// simple name.
    pub fn parse(qualified: &str) -> Self {
        let segments: Vec<&str> = qualified.split('.').filter(|s| !s.is_empty()).collect();
        let split = segments
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_ascii_uppercase()))
            .unwrap_or(segments.len().saturating_sub(1));

        TypeName {
            package: segments[..split].join("."),
            names: segments[split..].iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// The package, empty for the default package and builtins.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The innermost simple name.
    pub fn simple_name(&self) -> &str {
        self.names.last().map_or("", String::as_str)
    }

    /// Simple names from outermost to innermost.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether this type is nested inside another type.
    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }

    /// The dotted fully qualified name.
    pub fn qualified(&self) -> String {
        let nested = self.names.join(".");
        if self.package.is_empty() {
            nested
        } else {
            format!("{}.{nested}", self.package)
        }
    }

    /// Whether the qualified name starts with `prefix` (e.g. `"java."`).
    pub fn in_namespace(&self, prefix: &str) -> bool {
        self.qualified().starts_with(prefix)
    }

    /// The name of the binder generated for this type.
    ///
    /// Same package; nested names flattened with [`NESTED_SEPARATOR`] and
    /// suffixed with [`BINDER_SUFFIX`].
    #[must_use]
    pub fn binder_name(&self) -> TypeName {
        let mut flat = String::new();
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                flat.push(NESTED_SEPARATOR);
            }
            flat.push_str(name);
        }
        flat.push_str(BINDER_SUFFIX);
        TypeName {
            package: self.package.clone(),
            names: vec![flat],
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}.", self.package)?;
        }
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl From<&str> for TypeName {
    fn from(qualified: &str) -> Self {
        TypeName::parse(qualified)
    }
}
