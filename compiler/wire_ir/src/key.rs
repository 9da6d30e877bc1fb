use std::fmt;

/// Key carried by a binding annotation.
///
/// Resources are addressed either by a numeric id (allocated by the resource
/// toolchain) or by name.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ResourceKey {
    Id(i32),
    Name(String),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{id}"),
            ResourceKey::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl From<i32> for ResourceKey {
    fn from(id: i32) -> Self {
        ResourceKey::Id(id)
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        ResourceKey::Name(name.to_owned())
    }
}
