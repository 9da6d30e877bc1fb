//! Declaration collector.
//!
//! Validates every annotated element in isolation and groups the valid ones
//! into one `BindingSetBuilder` per declaring type. Errors are aggregated:
//! a bad element is reported and dropped, and collection continues.

use rustc_hash::{FxHashMap, FxHashSet};
use wire_diagnostic::{
    already_bound_key, Diagnostic, DiagnosticQueue, ElementRef, ErrorCode, ErrorGuaranteed,
};
use wire_ir::{BindingSet, BindingSetBuilder, FieldBinding, FieldKind, TargetRoles, TypeName};

use crate::config::{BindingAnnotation, ProcessorConfig};
use crate::introspect::{
    AnnotatedElement, DeclKind, MemberDecl, Modifiers, TypeDecl, TypeIntrospector, TypeRef,
};

/// Builders for every declaring type touched this round.
#[derive(Debug, Default)]
pub struct Collected {
    /// In first-seen order.
    builders: Vec<BindingSetBuilder>,
    index: FxHashMap<TypeName, usize>,
    /// Every declaring type seen this round, valid bindings or not.
    owners: FxHashSet<TypeName>,
}

impl Collected {
    pub fn builder(&self, ty: &TypeName) -> Option<&BindingSetBuilder> {
        self.index.get(ty).map(|&i| &self.builders[i])
    }

    /// Whether `ty` has at least one valid binding this round.
    pub fn is_touched(&self, ty: &TypeName) -> bool {
        self.index.contains_key(ty)
    }

    /// Whether `ty` declared an annotated element this round, even if every
    /// one of them was rejected.
    pub fn is_owner(&self, ty: &TypeName) -> bool {
        self.owners.contains(ty)
    }

    /// Owners that ended up with no valid binding.
    pub fn rejected_owners(&self) -> impl Iterator<Item = &TypeName> {
        self.owners.iter().filter(|ty| !self.index.contains_key(*ty))
    }

    /// Declaring types in first-seen order.
    pub fn touched(&self) -> impl Iterator<Item = &TypeName> {
        self.builders.iter().map(BindingSetBuilder::target_type)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    pub fn into_builders(self) -> Vec<BindingSetBuilder> {
        self.builders
    }

    fn builder_mut(
        &mut self,
        ty: &TypeName,
        create: impl FnOnce() -> BindingSetBuilder,
    ) -> &mut BindingSetBuilder {
        let i = match self.index.get(ty) {
            Some(&i) => i,
            None => {
                self.builders.push(create());
                let i = self.builders.len() - 1;
                self.index.insert(ty.clone(), i);
                i
            }
        };
        &mut self.builders[i]
    }
}

/// Collects binding declarations from annotated elements.
pub struct Collector<'a> {
    types: &'a dyn TypeIntrospector,
    config: &'a ProcessorConfig,
    collected: Collected,
}

impl<'a> Collector<'a> {
    pub fn new(types: &'a dyn TypeIntrospector, config: &'a ProcessorConfig) -> Self {
        Collector {
            types,
            config,
            collected: Collected::default(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(elements = elements.len()))]
    pub fn collect(
        mut self,
        elements: &[AnnotatedElement],
        queue: &mut DiagnosticQueue,
    ) -> Collected {
        for element in elements {
            self.collected.owners.insert(element.owner.clone());
            if self.collect_element(element, queue).is_err() {
                tracing::debug!(
                    owner = %element.owner,
                    member = %element.member,
                    "element dropped"
                );
            }
        }
        tracing::debug!(types = self.collected.len(), "collection finished");
        self.collected
    }

    fn collect_element(
        &mut self,
        element: &AnnotatedElement,
        queue: &mut DiagnosticQueue,
    ) -> Result<(), ErrorGuaranteed> {
        let owner = &element.owner;
        let field = element.member.as_str();
        let internal = |message: String| {
            Diagnostic::error(ErrorCode::E9001)
                .with_message(message)
                .with_element(ElementRef::member(owner, field))
        };

        let Some(annotation) = self.config.annotation(&element.annotation) else {
            return Err(queue.emit_error(internal(format!(
                "@{} is not a binding annotation",
                element.annotation
            ))));
        };
        let Some(decl) = self.types.type_decl(owner) else {
            return Err(queue.emit_error(internal(format!("declaring type {owner} is unknown"))));
        };
        let Some(member) = decl.find_member(field) else {
            return Err(queue.emit_error(internal(format!("{owner} declares no member '{field}'"))));
        };

        let mut failed = None;
        for diag in self.validate(annotation, decl, member) {
            if diag.is_error() {
                failed = Some(queue.emit_error(diag));
            } else {
                queue.add(diag);
            }
        }
        if let Some(guarantee) = failed {
            return Err(guarantee);
        }

        let Some(key) = member.annotation(&annotation.name).and_then(|a| a.key.clone()) else {
            return Err(queue.emit_error(
                Diagnostic::error(ErrorCode::E1008)
                    .with_message(format!(
                        "Unable to parse @{} binding. ({owner}.{field})",
                        annotation.name
                    ))
                    .with_element(ElementRef::member(owner, field))
                    .with_note("the annotation carries no usable key"),
            ));
        };

        let required = !member.has_annotation(&self.config.nullable_marker);
        let binding =
            FieldBinding::new(key, field, member.ty.type_name(), required, annotation.kind);
        let (types, config) = (self.types, self.config);
        let builder = self
            .collected
            .builder_mut(owner, || new_builder(types, config, decl));
        builder.add_field(binding).map_err(|dup| {
            queue.emit_error(already_bound_key(
                owner,
                &annotation.name,
                dup.rejected.key(),
                &dup.existing,
                field,
            ))
        })?;

        tracing::trace!(%owner, field, "binding collected");
        Ok(())
    }

    /// Per-element checks, in reporting order.
    fn validate(
        &self,
        annotation: &BindingAnnotation,
        decl: &TypeDecl,
        member: &MemberDecl,
    ) -> Vec<Diagnostic> {
        let ann = &annotation.name;
        let owner = &decl.name;
        let field = &member.name;
        let at_member = || ElementRef::member(owner, field.clone());
        let mut diags = Vec::new();

        if member.modifiers.intersects(Modifiers::PRIVATE | Modifiers::STATIC) {
            diags.push(
                Diagnostic::error(ErrorCode::E1001)
                    .with_message(format!(
                        "@{ann} fields must not be private or static. ({owner}.{field})"
                    ))
                    .with_element(at_member()),
            );
        }
        if decl.kind != DeclKind::Class {
            diags.push(
                Diagnostic::error(ErrorCode::E1002)
                    .with_message(format!(
                        "@{ann} fields may only be contained in classes. ({owner}.{field})"
                    ))
                    .with_element(at_member()),
            );
        }
        if decl.modifiers.contains(Modifiers::PRIVATE) {
            diags.push(
                Diagnostic::error(ErrorCode::E1003)
                    .with_message(format!(
                        "@{ann} fields may not be contained in private classes. ({owner}.{field})"
                    ))
                    .with_element(at_member()),
            );
        }
        if let Some(ns) = self.config.reserved_namespace(owner) {
            diags.push(
                Diagnostic::error(ErrorCode::E1004)
                    .with_message(format!(
                        "@{ann}-annotated class incorrectly in framework namespace '{ns}'. ({owner})"
                    ))
                    .with_element(at_member()),
            );
        }
        diags.extend(self.check_member_type(annotation, owner, member));
        diags
    }

    fn check_member_type(
        &self,
        annotation: &BindingAnnotation,
        owner: &TypeName,
        member: &MemberDecl,
    ) -> Option<Diagnostic> {
        let ann = &annotation.name;
        let field = &member.name;
        let at_member = ElementRef::member(owner, field.clone());

        if let TypeRef::Unresolved(name) = member.ty.erased() {
            let expected = match annotation.kind {
                FieldKind::Handle => {
                    format!("a {} or interface", self.config.handle_type.simple_name())
                }
                FieldKind::Resource => "a resource value type".to_owned(),
            };
            return Some(
                Diagnostic::note(ErrorCode::E1007)
                    .with_message(format!(
                        "@{ann} field with unresolved type ({name}) must elsewhere be generated as {expected}. ({owner}.{field})"
                    ))
                    .with_element(at_member),
            );
        }

        let ty = member.ty.type_name();
        let valid = match annotation.kind {
            FieldKind::Handle => {
                matches!(member.ty.erased(), TypeRef::Declared(_))
                    && (self.types.is_subtype_of(&ty, &self.config.handle_type)
                        || self.types.is_interface(&ty))
            }
            FieldKind::Resource => self
                .config
                .resource_value_types
                .iter()
                .any(|accepted| self.types.is_subtype_of(&ty, accepted)),
        };
        if valid {
            return None;
        }

        let message = match annotation.kind {
            FieldKind::Handle => format!(
                "@{ann} fields must extend from {} or be an interface. ({owner}.{field})",
                self.config.handle_type.simple_name()
            ),
            FieldKind::Resource => {
                let accepted = self
                    .config
                    .resource_value_types
                    .iter()
                    .map(TypeName::simple_name)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("@{ann} field type must be one of: {accepted}. ({owner}.{field})")
            }
        };
        Some(
            Diagnostic::error(ErrorCode::E1005)
                .with_message(message)
                .with_element(at_member),
        )
    }
}

fn new_builder(
    types: &dyn TypeIntrospector,
    config: &ProcessorConfig,
    decl: &TypeDecl,
) -> BindingSetBuilder {
    let ty = &decl.name;
    let mut roles = TargetRoles::empty();
    if types.is_subtype_of(ty, &config.view_type) {
        roles |= TargetRoles::VIEW;
    }
    if types.is_subtype_of(ty, &config.container_type) {
        roles |= TargetRoles::CONTAINER;
    }
    if types.is_subtype_of(ty, &config.modal_type) {
        roles |= TargetRoles::MODAL;
    }
    let is_final = decl.modifiers.contains(Modifiers::FINAL);
    BindingSet::builder(ty.clone(), is_final, roles)
}
