//! Integration tests for the keymap system

use super::*;
use crate::event::{Event, EventModifiers, EventType, KeyValue, ModState};
use crate::properties::OperatorProperties;
use crate::wm::{RegionType, SpaceType};

fn press(event_type: EventType, modifiers: Modifiers) -> Event {
    Event::new(event_type, KeyValue::Press).with_modifiers(modifiers.to_mod_states())
}

fn active<'a>(set: &'a KeyConfigSet, idname: &str, space: SpaceType) -> &'a KeyMap {
    set.keymap_active_by_key(&KeyMapKey::new(idname, space, RegionType::Window))
        .expect("keymap should exist")
}

#[test]
fn test_load_default_keyconfig() {
    let kc = default_keyconfig();
    for name in ["Window", "Screen", "Gesture Box"] {
        assert!(
            kc.find(name, SpaceType::Empty, RegionType::Window).is_some(),
            "missing keymap {name}"
        );
    }
    assert!(kc
        .find("3D View", SpaceType::View3D, RegionType::Window)
        .is_some());
}

#[test]
fn test_window_keymap_quit_uses_cmd() {
    let set = KeyConfigSet::new(default_keyconfig());
    let window = active(&set, "Window", SpaceType::Empty);

    let kmi = window
        .find_match(&press(EventType::Q, Modifiers::cmd()))
        .expect("cmd+q should be bound");
    assert_eq!(kmi.idname, "wm.quit_kraken");

    assert!(window.find_match(&press(EventType::Q, Modifiers::NONE)).is_none());
}

#[test]
fn test_screen_keymap_first_match_wins() {
    let set = KeyConfigSet::new(default_keyconfig());
    let screen = active(&set, "Screen", SpaceType::Empty);

    let plain = screen
        .find_match(&press(EventType::B, Modifiers::NONE))
        .unwrap();
    assert_eq!(plain.idname, "wm.gesture_box");
    assert!(plain.properties.is_none());

    let ctrl = screen
        .find_match(&press(EventType::B, Modifiers::CTRL))
        .unwrap();
    let props = ctrl.properties.as_ref().unwrap();
    assert_eq!(props.get("deselect").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn test_any_modifier_click_drag() {
    let set = KeyConfigSet::new(default_keyconfig());
    let screen = active(&set, "Screen", SpaceType::Empty);

    let mut event = Event::new(EventType::MiddleMouse, KeyValue::ClickDrag);
    event.modifiers = EventModifiers {
        shift: ModState::FIRST,
        alt: ModState::FIRST,
        ..EventModifiers::NONE
    };
    let kmi = screen.find_match(&event).expect("any+middlemouse drag");
    assert_eq!(
        kmi.properties
            .as_ref()
            .and_then(|p| p.get("wait_for_input"))
            .and_then(|v| v.as_bool()),
        Some(false)
    );

    event.val = KeyValue::Press;
    assert!(screen.find_match(&event).is_none());
}

#[test]
fn test_modal_keymap_propvalues() {
    let set = KeyConfigSet::new(default_keyconfig());
    let modal = active(&set, "Gesture Box", SpaceType::Empty);
    assert!(modal.is_modal());

    let esc = modal
        .find_match(&press(EventType::Esc, Modifiers::NONE))
        .unwrap();
    assert_eq!(esc.propvalue, 1);

    let begin = modal
        .find_match(&press(EventType::LeftMouse, Modifiers::NONE))
        .unwrap();
    assert_eq!(begin.propvalue, 7);

    let release = Event::new(EventType::LeftMouse, KeyValue::Release);
    assert_eq!(modal.find_match(&release).unwrap().propvalue, 2);
}

#[test]
fn test_repeat_false_ignores_autorepeat() {
    let set = KeyConfigSet::new(default_keyconfig());
    let window = active(&set, "Window", SpaceType::Empty);

    let mut event = press(EventType::R, Modifiers::CTRL | Modifiers::SHIFT);
    assert!(window.find_match(&event).is_some());
    event.is_repeat = true;
    assert!(window.find_match(&event).is_none());
}

#[test]
fn test_find_item_by_properties() {
    let set = KeyConfigSet::new(default_keyconfig());
    let screen = active(&set, "Screen", SpaceType::Empty);

    let want = OperatorProperties::new().with("deselect", true);
    let kmi = screen
        .find_item("wm.gesture_box", Some(&want), false, None)
        .unwrap();
    assert_eq!(
        kmi.kmi_type,
        KmiType::Event(EventType::B),
        "ctrl+b carries the deselect property"
    );
    assert!(kmi.ctrl.is_set());
}

#[test]
fn test_user_edit_supersedes_shipped_binding() {
    let mut set = KeyConfigSet::new(default_keyconfig());
    let mut edited = active(&set, "Window", SpaceType::Empty).clone();
    let f5 = edited
        .items
        .iter_mut()
        .find(|kmi| kmi.kmi_type == KmiType::Event(EventType::F5))
        .unwrap();
    f5.kmi_type = KmiType::Event(EventType::F6);
    assert!(set.set_user_keymap(&edited));

    let window = active(&set, "Window", SpaceType::Empty);
    assert!(window.flags.contains(KeyMapFlags::USER));
    assert!(window.find_match(&press(EventType::F5, Modifiers::NONE)).is_none());
    assert_eq!(
        window
            .find_match(&press(EventType::F6, Modifiers::NONE))
            .unwrap()
            .idname,
        "wm.redraw_all"
    );

    // Round-trips through the user file as a diff.
    let yaml = keymaps_to_yaml(Some("user"), set.user_diffs.iter()).unwrap();
    assert!(yaml.contains("diff"));
    let reparsed = parse_keyconfig_yaml(&yaml).unwrap();
    let mut fresh = KeyConfigSet::new(default_keyconfig());
    apply_user_keyconfig(&mut fresh, reparsed);
    let window = active(&fresh, "Window", SpaceType::Empty);
    assert!(window.find_match(&press(EventType::F6, Modifiers::NONE)).is_some());
}

#[test]
fn test_render_default_bindings() {
    let set = KeyConfigSet::new(default_keyconfig());
    let screen = active(&set, "Screen", SpaceType::Empty);
    let kmi = screen
        .find_match(&press(EventType::B, Modifiers::CTRL))
        .unwrap();
    let style = KeyStringStyle::new(Platform::Unix, false);
    assert_eq!(keymap_item_to_string(kmi, false, &style), "Ctrl B");
}

#[test]
fn test_keymap_poll_filters_by_workspace_owner() {
    use crate::wm::WindowManager;

    let mut wm = WindowManager::with_defaults();
    let win = wm.add_window((800, 600));
    let mut km = KeyMap::new("Add-on Tools", SpaceType::View3D, RegionType::Window);
    km.owner_id = "node_wrangler".to_string();
    km.add_item(KeyMapItem::new("test.op", EventType::X, KeyValue::Press));

    // Unfiltered workspaces accept every owner.
    assert!(keymap_poll(&wm.context(win), &km));

    let workspace = &mut wm.window_mut(win).unwrap().workspace;
    workspace.use_filter_by_owner = true;
    assert!(!keymap_poll(&wm.context(win), &km));

    wm.window_mut(win)
        .unwrap()
        .workspace
        .owner_ids
        .push("node_wrangler".to_string());
    assert!(keymap_poll(&wm.context(win), &km));

    // Owned keymaps never run without a window.
    let ctx = crate::wm::Context::new(&mut wm);
    assert!(!keymap_poll(&ctx, &km));
}

#[test]
fn test_keymap_poll_callback_decides_last() {
    use crate::wm::WindowManager;
    use std::rc::Rc;

    let mut wm = WindowManager::with_defaults();
    let win = wm.add_window((800, 600));
    let mut km = KeyMap::new("Test", SpaceType::Empty, RegionType::Window);
    km.add_item(KeyMapItem::new("test.op", EventType::X, KeyValue::Press));
    km.poll = Some(Rc::new(|ctx| ctx.area_id().is_some()));

    assert!(!keymap_poll(&wm.context(win), &km));
}
