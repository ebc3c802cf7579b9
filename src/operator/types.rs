//! Operator types and their registry

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::macros;
use super::Operator;
use crate::event::Event;
use crate::keymap::KeyMapKey;
use crate::properties::OperatorProperties;
use crate::wm::{Context, RegionType};

bitflags! {
    /// Operator type flags (`OPTYPE_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct OperatorTypeFlags: u32 {
        /// Finished runs are appended to the register log.
        const REGISTER = 1 << 0;
        /// Finished runs push an undo step.
        const UNDO = 1 << 1;
        /// Modal handler swallows every event.
        const BLOCKING = 1 << 2;
        const MACRO = 1 << 3;
        const GRAB_CURSOR = 1 << 4;
        const PRESET = 1 << 5;
        /// Hidden from search.
        const INTERNAL = 1 << 6;
        const LOCK_BYPASS = 1 << 7;
        /// Consecutive runs share one undo step.
        const UNDO_GROUPED = 1 << 8;
        const DEPENDS_ON_CURSOR = 1 << 9;
    }
}

bitflags! {
    /// Operator return value (`OPERATOR_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct OperatorResult: u8 {
        const RUNNING_MODAL = 1 << 0;
        const CANCELLED = 1 << 1;
        const FINISHED = 1 << 2;
        /// Let the event continue to the next handler.
        const PASS_THROUGH = 1 << 3;
        /// Already handled elsewhere; nothing left to do.
        const HANDLED = 1 << 4;
        const INTERFACE = 1 << 5;
    }
}

/// Where and how an operator call runs.
///
/// `Invoke*` contexts hand the operator an event and need a window; `Exec*`
/// contexts never do. The suffix picks the region or area the call runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OperatorContext {
    #[default]
    InvokeDefault,
    InvokeRegionWin,
    InvokeRegionChannels,
    InvokeRegionPreview,
    InvokeArea,
    InvokeScreen,
    ExecDefault,
    ExecRegionWin,
    ExecRegionChannels,
    ExecRegionPreview,
    ExecArea,
    ExecScreen,
}

impl OperatorContext {
    pub fn is_invoke(self) -> bool {
        matches!(
            self,
            OperatorContext::InvokeDefault
                | OperatorContext::InvokeRegionWin
                | OperatorContext::InvokeRegionChannels
                | OperatorContext::InvokeRegionPreview
                | OperatorContext::InvokeArea
                | OperatorContext::InvokeScreen
        )
    }

    /// Region type the call is moved to, if any.
    pub fn region_type(self) -> Option<RegionType> {
        match self {
            OperatorContext::InvokeRegionWin | OperatorContext::ExecRegionWin => {
                Some(RegionType::Window)
            }
            OperatorContext::InvokeRegionChannels | OperatorContext::ExecRegionChannels => {
                Some(RegionType::Channels)
            }
            OperatorContext::InvokeRegionPreview | OperatorContext::ExecRegionPreview => {
                Some(RegionType::Preview)
            }
            _ => None,
        }
    }

    pub fn is_area(self) -> bool {
        matches!(self, OperatorContext::InvokeArea | OperatorContext::ExecArea)
    }

    pub fn is_screen(self) -> bool {
        matches!(self, OperatorContext::InvokeScreen | OperatorContext::ExecScreen)
    }
}

pub type PollFn = Rc<dyn Fn(&Context<'_>) -> bool>;
pub type ExecFn = Rc<dyn Fn(&mut Context<'_>, &mut Operator) -> OperatorResult>;
/// Signature of both `invoke` and `modal`.
pub type InvokeFn = Rc<dyn Fn(&mut Context<'_>, &mut Operator, &Event) -> OperatorResult>;
pub type CancelFn = Rc<dyn Fn(&mut Context<'_>, &mut Operator)>;

/// One step of a macro operator.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroItem {
    pub idname: String,
    pub properties: OperatorProperties,
}

/// Definition of an operator: its callbacks and flags.
#[derive(Clone)]
pub struct OperatorType {
    pub idname: String,
    pub name: String,
    pub description: String,
    pub flags: OperatorTypeFlags,
    pub poll: Option<PollFn>,
    pub exec: Option<ExecFn>,
    pub invoke: Option<InvokeFn>,
    pub modal: Option<InvokeFn>,
    pub cancel: Option<CancelFn>,
    /// Modal keymap translating events for the running operator.
    pub modalkeymap: Option<KeyMapKey>,
    pub macro_items: Vec<MacroItem>,
}

impl fmt::Debug for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorType")
            .field("idname", &self.idname)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("poll", &self.poll.is_some())
            .field("exec", &self.exec.is_some())
            .field("invoke", &self.invoke.is_some())
            .field("modal", &self.modal.is_some())
            .field("modalkeymap", &self.modalkeymap)
            .field("macro_items", &self.macro_items)
            .finish()
    }
}

impl OperatorType {
    pub fn new(idname: &str, name: &str) -> Self {
        Self {
            idname: idname.to_string(),
            name: name.to_string(),
            description: String::new(),
            flags: OperatorTypeFlags::empty(),
            poll: None,
            exec: None,
            invoke: None,
            modal: None,
            cancel: None,
            modalkeymap: None,
            macro_items: Vec::new(),
        }
    }

    /// A macro: runs the operators added with [`OperatorType::macro_define`]
    /// in order.
    pub fn new_macro(idname: &str, name: &str, flags: OperatorTypeFlags) -> Self {
        let exec: ExecFn = Rc::new(macros::macro_exec);
        let invoke: InvokeFn = Rc::new(macros::macro_invoke);
        let modal: InvokeFn = Rc::new(macros::macro_modal);
        let cancel: CancelFn = Rc::new(macros::macro_cancel);

        Self {
            flags: flags | OperatorTypeFlags::MACRO,
            exec: Some(exec),
            invoke: Some(invoke),
            modal: Some(modal),
            cancel: Some(cancel),
            ..Self::new(idname, name)
        }
    }

    /// Append a step to a macro. Returns it so its properties can be set.
    pub fn macro_define(&mut self, idname: &str) -> &mut MacroItem {
        self.macro_items.push(MacroItem {
            idname: idname.to_string(),
            properties: OperatorProperties::new(),
        });
        let last = self.macro_items.len() - 1;
        &mut self.macro_items[last]
    }

    pub fn is_macro(&self) -> bool {
        self.flags.contains(OperatorTypeFlags::MACRO)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_flags(mut self, flags: OperatorTypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_poll(mut self, poll: impl Fn(&Context<'_>) -> bool + 'static) -> Self {
        self.poll = Some(Rc::new(poll));
        self
    }

    pub fn with_exec(
        mut self,
        exec: impl Fn(&mut Context<'_>, &mut Operator) -> OperatorResult + 'static,
    ) -> Self {
        self.exec = Some(Rc::new(exec));
        self
    }

    pub fn with_invoke(
        mut self,
        invoke: impl Fn(&mut Context<'_>, &mut Operator, &Event) -> OperatorResult + 'static,
    ) -> Self {
        self.invoke = Some(Rc::new(invoke));
        self
    }

    pub fn with_modal(
        mut self,
        modal: impl Fn(&mut Context<'_>, &mut Operator, &Event) -> OperatorResult + 'static,
    ) -> Self {
        self.modal = Some(Rc::new(modal));
        self
    }

    pub fn with_cancel(
        mut self,
        cancel: impl Fn(&mut Context<'_>, &mut Operator) + 'static,
    ) -> Self {
        self.cancel = Some(Rc::new(cancel));
        self
    }

    pub fn with_modalkeymap(mut self, key: KeyMapKey) -> Self {
        self.modalkeymap = Some(key);
        self
    }
}

/// All operator types by idname, plus the last-used properties of each.
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    types: HashMap<String, Rc<OperatorType>>,
    last_properties: HashMap<String, OperatorProperties>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ot: OperatorType) {
        if self.types.contains_key(&ot.idname) {
            tracing::warn!("Operator type '{}' registered twice, replacing", ot.idname);
        }
        tracing::debug!("Registered operator type '{}'", ot.idname);
        self.types.insert(ot.idname.clone(), Rc::new(ot));
    }

    pub fn unregister(&mut self, idname: &str) -> bool {
        self.last_properties.remove(idname);
        self.types.remove(idname).is_some()
    }

    pub fn find(&self, idname: &str) -> Option<Rc<OperatorType>> {
        self.types.get(idname).cloned()
    }

    /// Like [`OperatorRegistry::find`], logging unknown names.
    pub fn find_or_warn(&self, idname: &str) -> Option<Rc<OperatorType>> {
        let found = self.find(idname);
        if found.is_none() {
            tracing::warn!("Unknown operator '{}'", idname);
        }
        found
    }

    pub fn contains(&self, idname: &str) -> bool {
        self.types.contains_key(idname)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered idnames, sorted.
    pub fn idnames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn last_properties(&self, idname: &str) -> Option<&OperatorProperties> {
        self.last_properties.get(idname)
    }

    pub fn store_last_properties(&mut self, idname: &str, properties: &OperatorProperties) {
        tracing::trace!("Storing last properties of '{}': {}", idname, properties);
        self.last_properties
            .insert(idname.to_string(), properties.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_kinds() {
        assert!(OperatorContext::InvokeArea.is_invoke());
        assert!(!OperatorContext::ExecRegionPreview.is_invoke());
        assert_eq!(
            OperatorContext::ExecRegionChannels.region_type(),
            Some(RegionType::Channels)
        );
        assert_eq!(OperatorContext::InvokeDefault.region_type(), None);
        assert!(OperatorContext::ExecScreen.is_screen());
    }

    #[test]
    fn test_registry_find_and_last_properties() {
        let mut reg = OperatorRegistry::new();
        reg.register(OperatorType::new("object.delete", "Delete"));
        reg.register(OperatorType::new("object.add", "Add"));
        assert!(reg.find("object.delete").is_some());
        assert!(reg.find("object.nope").is_none());
        assert_eq!(reg.idnames(), vec!["object.add", "object.delete"]);

        let props = OperatorProperties::new().with("use_global", true);
        reg.store_last_properties("object.delete", &props);
        assert_eq!(reg.last_properties("object.delete"), Some(&props));
        assert!(reg.unregister("object.delete"));
        assert!(reg.last_properties("object.delete").is_none());
    }

    #[test]
    fn test_macro_definition() {
        let mut ot = OperatorType::new_macro(
            "object.duplicate_move",
            "Duplicate and Move",
            OperatorTypeFlags::REGISTER | OperatorTypeFlags::UNDO,
        );
        ot.macro_define("object.duplicate");
        ot.macro_define("transform.translate")
            .properties
            .set("release_confirm", true);

        assert!(ot.is_macro());
        assert!(ot.exec.is_some() && ot.modal.is_some());
        assert_eq!(ot.macro_items.len(), 2);
        assert!(ot.macro_items[1].properties.is_set("release_confirm"));
    }
}
