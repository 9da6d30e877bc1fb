//! Emission sinks.
//!
//! A sink receives each synthesized binder together with the declaring type
//! it was generated for, then the supertype edges the runtime walk needs.
//! A failing write is reported against its type and never stops the round.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use thiserror::Error;
use wire_ir::{BinderDef, TypeName};
use wire_rt::BinderRegistry;

use crate::render::{module_ident, render_index, render_with, CratePaths};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("binder {0} was already emitted")]
    Duplicate(TypeName),

    #[error("binder registry is in use")]
    RegistryBusy,
}

/// Destination for generated binders.
pub trait EmissionSink {
    fn write_binder(&mut self, origin: &TypeName, def: &BinderDef) -> Result<(), EmitError>;

    /// Record that `ty` directly extends `supertype`.
    fn declare_supertype(&mut self, ty: &TypeName, supertype: &TypeName) -> Result<(), EmitError> {
        let _ = (ty, supertype);
        Ok(())
    }
}

/// Keeps rendered sources in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    paths: CratePaths,
    files: Vec<(TypeName, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_crate_paths(mut self, paths: CratePaths) -> Self {
        self.paths = paths;
        self
    }

    /// Rendered source of `binder`.
    pub fn get(&self, binder: &TypeName) -> Option<&str> {
        self.files
            .iter()
            .find(|(name, _)| name == binder)
            .map(|(_, source)| source.as_str())
    }

    pub fn files(&self) -> &[(TypeName, String)] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl EmissionSink for MemorySink {
    fn write_binder(&mut self, origin: &TypeName, def: &BinderDef) -> Result<(), EmitError> {
        if self.get(&def.name).is_some() {
            return Err(EmitError::Duplicate(def.name.clone()));
        }
        tracing::trace!(%origin, binder = %def.name, "rendered to memory");
        self.files
            .push((def.name.clone(), render_with(def, &self.paths)));
        Ok(())
    }
}

/// Writes one `.rs` file per binder under a root directory.
///
/// Files are laid out by package (`com/example/main_viewbinding.rs`).
/// [`DirSink::finish`] adds the package indexes, with `lib.rs` at the root.
#[derive(Debug)]
pub struct DirSink {
    root: PathBuf,
    paths: CratePaths,
    /// Package -> binders written into it.
    packages: BTreeMap<String, Vec<TypeName>>,
    /// Package -> supertype edges of its types.
    supertypes: BTreeMap<String, Vec<(TypeName, TypeName)>>,
    written: FxHashSet<PathBuf>,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSink {
            root: root.into(),
            paths: CratePaths::default(),
            packages: BTreeMap::new(),
            supertypes: BTreeMap::new(),
            written: FxHashSet::default(),
        }
    }

    /// Resolve bases outside the generated crate through `paths`.
    #[must_use]
    pub fn with_crate_paths(mut self, paths: CratePaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, package: &str) -> PathBuf {
        package
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    /// Write the package indexes and return every path written.
    pub fn finish(mut self) -> Result<Vec<PathBuf>, EmitError> {
        // Every ancestor package needs an index, even without binders.
        let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
        children.entry(String::new()).or_default();
        for package in self.packages.keys().chain(self.supertypes.keys()) {
            let mut parent = String::new();
            for segment in package.split('.').filter(|s| !s.is_empty()) {
                let siblings = children.entry(parent.clone()).or_default();
                if !siblings.iter().any(|s| s == segment) {
                    siblings.push(segment.to_owned());
                }
                if !parent.is_empty() {
                    parent.push('.');
                }
                parent.push_str(segment);
                children.entry(parent.clone()).or_default();
            }
        }

        for (package, subpackages) in &children {
            let binders = self.packages.get(package).map_or(&[][..], Vec::as_slice);
            let supertypes = self.supertypes.get(package).map_or(&[][..], Vec::as_slice);
            let file = if package.is_empty() { "lib.rs" } else { "mod.rs" };
            let path = self.package_dir(package).join(file);
            write_file(&path, &render_index(subpackages, binders, supertypes))?;
            self.written.insert(path);
        }

        let mut written: Vec<PathBuf> = self.written.into_iter().collect();
        written.sort();
        Ok(written)
    }
}

impl EmissionSink for DirSink {
    fn write_binder(&mut self, origin: &TypeName, def: &BinderDef) -> Result<(), EmitError> {
        let package = def.name.package().to_owned();
        let path = self
            .package_dir(&package)
            .join(format!("{}.rs", module_ident(&def.name)));
        if self.written.contains(&path) {
            return Err(EmitError::Duplicate(def.name.clone()));
        }

        write_file(&path, &render_with(def, &self.paths))?;
        tracing::debug!(%origin, path = %path.display(), "binder written");
        self.packages
            .entry(package)
            .or_default()
            .push(def.name.clone());
        self.written.insert(path);
        Ok(())
    }

    fn declare_supertype(&mut self, ty: &TypeName, supertype: &TypeName) -> Result<(), EmitError> {
        self.supertypes
            .entry(ty.package().to_owned())
            .or_default()
            .push((ty.clone(), supertype.clone()));
        Ok(())
    }
}

/// Create `path` (and its directory) and write `contents` through a buffer.
fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    let io_err = |source: io::Error| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    let written = writer.write_all(contents.as_bytes());
    let flushed = writer.flush();
    written.and(flushed).map_err(io_err)
}

/// Registers interpreted binders directly into a runtime registry.
pub struct RegistrySink<'a> {
    registry: &'a mut BinderRegistry,
}

impl<'a> RegistrySink<'a> {
    pub fn new(registry: &'a mut BinderRegistry) -> Self {
        RegistrySink { registry }
    }
}

impl EmissionSink for RegistrySink<'_> {
    fn write_binder(&mut self, origin: &TypeName, def: &BinderDef) -> Result<(), EmitError> {
        if self.registry.contains(&def.name) {
            return Err(EmitError::Duplicate(def.name.clone()));
        }
        if !self.registry.register_def(def.clone()) {
            return Err(EmitError::RegistryBusy);
        }
        tracing::trace!(%origin, binder = %def.name, "registered");
        Ok(())
    }

    fn declare_supertype(&mut self, ty: &TypeName, supertype: &TypeName) -> Result<(), EmitError> {
        self.registry
            .declare_supertype(ty.clone(), supertype.clone());
        Ok(())
    }
}
