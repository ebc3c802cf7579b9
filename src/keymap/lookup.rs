//! Keymap resolution in a context: which keymaps are active, and which
//! binding runs a given operator

use super::item::KeyMapItem;
use super::keymap::{KeyMap, KeyMapKey};
use super::render::{keymap_item_to_string, KeyStringStyle};
use super::types::Platform;
use crate::handler::{HandlerKind, HandlerStack, KeymapSource};
use crate::operator::OperatorContext;
use crate::properties::OperatorProperties;
use crate::wm::Context;

/// Whether `keymap` may run in `ctx`.
///
/// Keymaps owned by an add-on only run in workspaces allowing that owner,
/// and never without a workspace. An empty keymap is allowed but reported,
/// unless its name marks it as a fallback.
pub fn keymap_poll(ctx: &Context<'_>, keymap: &KeyMap) -> bool {
    if !keymap.owner_id.is_empty() {
        match ctx.workspace() {
            Some(workspace) if workspace.owner_id_check(&keymap.owner_id) => {}
            _ => return false,
        }
    }

    if keymap.items.is_empty() && !keymap.idname.ends_with(" (fallback)") {
        tracing::warn!("Empty keymap '{}'", keymap.idname);
    }

    keymap.poll.as_ref().is_none_or(|poll| poll(ctx))
}

/// Keymap identities a keymap handler stands for right now.
pub fn handler_keymaps(ctx: &Context<'_>, source: &KeymapSource) -> Vec<KeyMapKey> {
    match source {
        KeymapSource::Fixed(key) => vec![key.clone()],
        KeymapSource::Dynamic(keymap_fn) => keymap_fn(ctx),
    }
}

/// Item filter passed to the lookup functions.
pub type KeyMapItemFilter<'f> = &'f dyn Fn(&KeyMapItem) -> bool;

fn find_in_handlers(
    ctx: &Context<'_>,
    handlers: &HandlerStack,
    opname: &str,
    properties: Option<&OperatorProperties>,
    is_strict: bool,
    filter: Option<KeyMapItemFilter<'_>>,
) -> Option<(KeyMapKey, KeyMapItem)> {
    for handler in handlers.iter().filter(|h| !h.is_freed()) {
        let HandlerKind::Keymap { source, .. } = &handler.kind else {
            continue;
        };
        for key in handler_keymaps(ctx, source) {
            let Some(keymap) = ctx.wm().keyconfigs.keymap_active_by_key(&key) else {
                continue;
            };
            if !keymap_poll(ctx, keymap) {
                continue;
            }
            if let Some(kmi) = keymap.find_item(opname, properties, is_strict, filter) {
                return Some((keymap.key(), kmi.clone()));
            }
        }
    }
    None
}

/// Binding that would run `opname` from `ctx`.
///
/// Searches the window's modal and regular handlers, then the area's, then
/// the region `opcontext` points at. Macros always compare properties
/// loosely.
pub fn keymap_item_find(
    ctx: &Context<'_>,
    opname: &str,
    opcontext: OperatorContext,
    properties: Option<&OperatorProperties>,
    is_strict: bool,
    filter: Option<KeyMapItemFilter<'_>>,
) -> Option<(KeyMapKey, KeyMapItem)> {
    let is_strict = is_strict
        && !ctx
            .wm()
            .operators
            .find(opname)
            .is_some_and(|ot| ot.is_macro());

    let search = |handlers: &HandlerStack| {
        find_in_handlers(ctx, handlers, opname, properties, is_strict, filter)
    };

    if let Some(win) = ctx.window() {
        if let Some(found) = search(&win.modalhandlers).or_else(|| search(&win.handlers)) {
            return Some(found);
        }
    }

    let area = ctx.area();
    if let Some(found) = area.and_then(|a| search(&a.handlers)) {
        return Some(found);
    }

    let region = match opcontext.region_type() {
        Some(region_type) => {
            let current = ctx.region().filter(|r| r.region_type == region_type);
            match current {
                Some(region) => Some(region),
                None => area.and_then(|a| a.region_by_type(region_type)),
            }
        }
        None => ctx.region(),
    };
    region.and_then(|r| search(&r.handlers))
}

/// Shortcut text for the binding running `opname`, e.g. `"Shift Ctrl A"`.
pub fn key_event_operator_string(
    ctx: &Context<'_>,
    opname: &str,
    opcontext: OperatorContext,
    properties: Option<&OperatorProperties>,
    is_strict: bool,
) -> Option<String> {
    let (_, kmi) = keymap_item_find(ctx, opname, opcontext, properties, is_strict, None)?;
    let platform = Platform::current();
    let glyphs = ctx
        .wm()
        .config
        .keymap_glyphs
        .unwrap_or(platform == Platform::MacOs);
    Some(keymap_item_to_string(
        &kmi,
        true,
        &KeyStringStyle::new(platform, glyphs),
    ))
}
