//! Processor configuration.

use wire_ir::{FieldKind, TypeName};

/// A binding annotation the collector recognizes.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BindingAnnotation {
    /// Simple name of the annotation, without the `@`.
    pub name: String,
    pub kind: FieldKind,
}

impl BindingAnnotation {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        BindingAnnotation {
            name: name.into(),
            kind,
        }
    }
}

/// Configuration for a processing round.
///
/// The defaults describe the Android platform: views are the handle type,
/// activities are containers and dialogs are modal containers.
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Base type of every handle a resource source hands out.
    pub handle_type: TypeName,
    pub view_type: TypeName,
    pub container_type: TypeName,
    pub modal_type: TypeName,
    /// Accepted base types of `Resource` kind fields.
    pub resource_value_types: Vec<TypeName>,
    /// Namespaces user types may not be declared in.
    pub reserved_namespaces: Vec<String>,
    /// Simple name of the annotation that makes a field optional.
    pub nullable_marker: String,
    pub annotations: Vec<BindingAnnotation>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        let view = TypeName::parse("android.view.View");
        ProcessorConfig {
            handle_type: view.clone(),
            view_type: view,
            container_type: TypeName::parse("android.app.Activity"),
            modal_type: TypeName::parse("android.app.Dialog"),
            resource_value_types: vec![
                TypeName::parse("java.lang.String"),
                TypeName::parse("java.lang.Integer"),
                TypeName::new("", "int"),
            ],
            reserved_namespaces: vec!["android.".into(), "java.".into()],
            nullable_marker: "Nullable".into(),
            annotations: vec![
                BindingAnnotation::new("BindView", FieldKind::Handle),
                BindingAnnotation::new("BindResource", FieldKind::Resource),
            ],
        }
    }
}

impl ProcessorConfig {
    #[must_use]
    pub fn with_handle_type(mut self, ty: TypeName) -> Self {
        self.handle_type = ty;
        self
    }

    #[must_use]
    pub fn with_roles(mut self, view: TypeName, container: TypeName, modal: TypeName) -> Self {
        self.view_type = view;
        self.container_type = container;
        self.modal_type = modal;
        self
    }

    #[must_use]
    pub fn with_resource_value_types(mut self, types: impl IntoIterator<Item = TypeName>) -> Self {
        self.resource_value_types = types.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_reserved_namespaces<S: Into<String>>(
        mut self,
        namespaces: impl IntoIterator<Item = S>,
    ) -> Self {
        self.reserved_namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_nullable_marker(mut self, marker: impl Into<String>) -> Self {
        self.nullable_marker = marker.into();
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: BindingAnnotation) -> Self {
        self.annotations.retain(|a| a.name != annotation.name);
        self.annotations.push(annotation);
        self
    }

    /// The binding annotation named `name`, if configured.
    pub fn annotation(&self, name: &str) -> Option<&BindingAnnotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// The reserved namespace `ty` lives in, if any.
    pub fn reserved_namespace(&self, ty: &TypeName) -> Option<&str> {
        self.reserved_namespaces
            .iter()
            .find(|ns| ty.in_namespace(ns))
            .map(String::as_str)
    }
}
