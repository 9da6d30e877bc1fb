//! In-memory targets and sources shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wire_ir::{ResourceKey, TypeName};

use crate::{BindError, Bindable, Handle, LookupError, ResourceContext, ResourceSource, Target};

pub fn view_type() -> TypeName {
    TypeName::parse("android.view.View")
}

pub fn text_view(label: &str) -> Handle {
    Handle::new(TypeName::parse("android.widget.TextView"), label.to_owned())
        .conforming_to([view_type()])
}

pub fn string(value: &str) -> Handle {
    Handle::new(TypeName::parse("java.lang.String"), value.to_owned())
}

#[derive(Default)]
pub struct Strings {
    pub values: FxHashMap<ResourceKey, Handle>,
}

impl ResourceContext for Strings {
    fn resolve(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError> {
        Ok(self.values.get(key).cloned())
    }
}

#[derive(Default)]
pub struct Widgets {
    pub handles: FxHashMap<ResourceKey, Handle>,
    pub strings: Rc<Strings>,
    pub broken: bool,
}

impl Widgets {
    pub fn with(mut self, key: i32, handle: Handle) -> Self {
        self.handles.insert(ResourceKey::Id(key), handle);
        self
    }

    pub fn with_string(mut self, key: i32, value: &str) -> Self {
        let mut strings = Strings::default();
        strings.values.extend(self.strings.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        strings.values.insert(ResourceKey::Id(key), string(value));
        self.strings = Rc::new(strings);
        self
    }
}

impl ResourceSource for Widgets {
    fn lookup(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError> {
        if self.broken {
            return Err(LookupError {
                key: key.clone(),
                message: "window detached".into(),
            });
        }
        Ok(self.handles.get(key).cloned())
    }

    fn context(&self) -> Rc<dyn ResourceContext> {
        Rc::clone(&self.strings) as Rc<dyn ResourceContext>
    }
}

/// A target with a fixed set of named fields.
pub struct Screen {
    pub ty: TypeName,
    pub fields: Vec<(String, Option<Handle>)>,
    /// Every field assigned `None`, binding included.
    pub cleared: Vec<String>,
    pub window: Option<Rc<Widgets>>,
}

impl Screen {
    pub fn new(ty: &str, fields: &[&str]) -> Self {
        Screen {
            ty: TypeName::parse(ty),
            fields: fields.iter().map(|f| ((*f).to_owned(), None)).collect(),
            cleared: Vec::new(),
            window: None,
        }
    }

    pub fn in_window(mut self, window: Widgets) -> Self {
        self.window = Some(Rc::new(window));
        self
    }

    pub fn into_target(self) -> (Rc<RefCell<Screen>>, Target) {
        let screen = Rc::new(RefCell::new(self));
        let target: Target = screen.clone();
        (screen, target)
    }

    /// Drain the clear log, e.g. between bind and unbind.
    pub fn take_cleared(&mut self) -> Vec<String> {
        std::mem::take(&mut self.cleared)
    }

    pub fn field(&self, name: &str) -> Option<&Handle> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_ref())
    }
}

impl Bindable for Screen {
    fn type_name(&self) -> TypeName {
        self.ty.clone()
    }

    fn assign(&mut self, field: &str, value: Option<Handle>) -> Result<(), BindError> {
        let Some(slot) = self.fields.iter_mut().find(|(name, _)| name == field) else {
            return Err(BindError::UnknownField {
                target: self.ty.clone(),
                field: field.to_owned(),
            });
        };
        if value.is_none() {
            self.cleared.push(field.to_owned());
        }
        slot.1 = value;
        Ok(())
    }

    fn root_source(&self) -> Option<Rc<dyn ResourceSource>> {
        self.window
            .clone()
            .map(|window| window as Rc<dyn ResourceSource>)
    }

    fn context(&self) -> Option<Rc<dyn ResourceContext>> {
        self.window.as_ref().map(|window| window.context())
    }
}
