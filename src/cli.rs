//! Command-line interface of the `kraken-wm` binary
//!
//! Supports:
//! - Dumping the active keyconfig as YAML
//! - Replaying a scripted input session headlessly
//! - Opening a live window that feeds winit input through the window manager

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use thiserror::Error;

use crate::config::WmConfig;
use crate::event::{EventType, PlatformEvent};
use crate::keymap::{
    default_keyconfig, keymaps_to_yaml, load_keyconfig_set, parse_event_type, parse_key_string,
    KeyConfigSet, KeymapError, KmiType, Modifiers,
};
use crate::wm::{Rect, RegionType, SpaceType, WindowManager};

/// Window-manager event core of the Kraken DCC
#[derive(Parser, Debug)]
#[command(name = "kraken-wm", version, about = "Kraken window-manager event core")]
pub struct CliArgs {
    /// Preferences file (default: ~/.config/kraken-wm/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// User keyconfig file (default: ~/.config/kraken-wm/keymap.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub keymap: Option<PathBuf>,

    /// Ignore the user keyconfig and use the shipped keymaps only
    #[arg(long, global = true)]
    pub factory_keymap: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Print the active keymaps as YAML
    Keymap {
        /// Only keymaps with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Run a scripted input session and report what the window manager did
    Replay {
        /// Replay script (YAML)
        script: PathBuf,
    },
    /// Open a window and dispatch live input (default)
    Run {
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
    },
}

impl CliArgs {
    /// Preferences from `--config`, or the default location.
    pub fn load_config(&self) -> WmConfig {
        match &self.config {
            Some(path) => WmConfig::load_from(path),
            None => WmConfig::load(),
        }
    }

    /// Keyconfigs: shipped defaults plus the user file unless disabled.
    pub fn load_keyconfigs(&self) -> KeyConfigSet {
        if self.factory_keymap {
            return KeyConfigSet::new(default_keyconfig());
        }
        let user = self
            .keymap
            .clone()
            .or_else(crate::config_paths::keymap_file);
        load_keyconfig_set(user.as_deref())
    }

    pub fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Run {
            width: 1280,
            height: 720,
        })
    }
}

/// Active keymaps (user versions where customized) as YAML.
pub fn dump_keymaps(set: &KeyConfigSet, name: Option<&str>) -> Result<String, KeymapError> {
    let keymaps = set
        .default
        .keymaps
        .iter()
        .chain(set.addon.keymaps.iter())
        .filter(|km| name.is_none_or(|n| km.idname == n))
        .map(|km| set.keymap_active(km));
    keymaps_to_yaml(Some(&set.default.idname), keymaps)
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse replay script: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("step {step}: {source}")]
    Key {
        step: usize,
        #[source]
        source: KeymapError,
    },

    #[error("unknown space type: {0}")]
    InvalidSpace(String),

    #[error("unknown region type: {0}")]
    InvalidRegion(String),
}

/// A scripted input session
#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_size")]
    pub size: (i32, i32),
    #[serde(default)]
    pub areas: Vec<ReplayArea>,
    pub steps: Vec<ReplayStep>,
}

/// An area of the replay window; each listed region covers the whole area.
#[derive(Debug, Deserialize)]
pub struct ReplayArea {
    pub space: String,
    pub rect: [i32; 4],
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

/// One scripted input
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    /// Cursor move to `[x, y]`.
    Move([i32; 2]),
    /// Press a key or button, e.g. `"leftmouse"`, `"lshift"`.
    Press(String),
    Release(String),
    /// Press and release a chord such as `"ctrl+b"`.
    Tap(String),
    /// Wheel steps, positive is up.
    Wheel(i32),
    /// Advance the clock without input.
    WaitMs(u64),
}

fn default_size() -> (i32, i32) {
    (1280, 720)
}

fn default_regions() -> Vec<String> {
    vec![RegionType::Window.id().to_string()]
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(yaml: &str) -> Result<Self, ReplayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// What happened while a script ran
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplayReport {
    /// One line per step that changed something.
    pub lines: Vec<String>,
    /// Registered operators, oldest first.
    pub registered: Vec<String>,
    pub undo_steps: Vec<String>,
    pub quit: bool,
}

/// Platform events for one step. Key names go through the keyconfig parser.
fn step_events(index: usize, step: &ReplayStep) -> Result<Vec<PlatformEvent>, ReplayError> {
    let key_err = |source| ReplayError::Key {
        step: index,
        source,
    };
    let key_or_button = |key: EventType, pressed: bool| {
        if key.is_mouse_button() {
            PlatformEvent::Button {
                button: key,
                pressed,
                tablet: None,
            }
        } else {
            PlatformEvent::Key {
                key,
                pressed,
                is_repeat: false,
                utf8: None,
            }
        }
    };

    let events = match step {
        ReplayStep::Move([x, y]) => vec![PlatformEvent::CursorMove {
            x: *x,
            y: *y,
            tablet: None,
        }],
        ReplayStep::Press(key) => {
            vec![key_or_button(parse_event_type(key).map_err(key_err)?, true)]
        }
        ReplayStep::Release(key) => {
            vec![key_or_button(parse_event_type(key).map_err(key_err)?, false)]
        }
        ReplayStep::Tap(chord) => {
            let parsed = parse_key_string(chord).map_err(key_err)?;
            let KmiType::Event(key) = parsed.kmi_type else {
                return Err(key_err(KeymapError::InvalidKey(chord.clone())));
            };
            let mods = Modifiers::from_mod_states(&parsed.modifiers);
            let mut modifier_keys = Vec::new();
            if mods.shift() {
                modifier_keys.push(EventType::LeftShift);
            }
            if mods.ctrl() {
                modifier_keys.push(EventType::LeftCtrl);
            }
            if mods.alt() {
                modifier_keys.push(EventType::LeftAlt);
            }
            if mods.oskey() {
                modifier_keys.push(EventType::OsKey);
            }

            let mut events: Vec<_> = modifier_keys
                .iter()
                .map(|m| key_or_button(*m, true))
                .collect();
            events.push(key_or_button(key, true));
            events.push(key_or_button(key, false));
            events.extend(modifier_keys.iter().rev().map(|m| key_or_button(*m, false)));
            events
        }
        ReplayStep::Wheel(z) => (0..z.unsigned_abs())
            .map(|_| PlatformEvent::Wheel { z: z.signum() })
            .collect(),
        ReplayStep::WaitMs(_) => Vec::new(),
    };
    Ok(events)
}

/// Run `script` against a fresh window manager on a simulated clock.
pub fn run_replay(
    script: &ReplayScript,
    config: WmConfig,
    keyconfigs: KeyConfigSet,
) -> Result<ReplayReport, ReplayError> {
    let mut wm = WindowManager::new(config, keyconfigs);
    let win = wm.add_window(script.size);

    for area in &script.areas {
        let space = SpaceType::from_id(&area.space)
            .ok_or_else(|| ReplayError::InvalidSpace(area.space.clone()))?;
        let [xmin, ymin, xmax, ymax] = area.rect;
        let rect = Rect::new(xmin, ymin, xmax, ymax);
        let Some(area_id) = wm.add_area(win, space, rect) else {
            continue;
        };
        for region in &area.regions {
            let region_type = RegionType::from_id(region)
                .ok_or_else(|| ReplayError::InvalidRegion(region.clone()))?;
            wm.add_region(win, area_id, region_type, rect);
        }
    }

    let mut report = ReplayReport::default();
    let mut now = Instant::now();
    let mut modal_prev: Vec<String> = Vec::new();
    let mut registered_prev = 0;

    for (index, step) in script.steps.iter().enumerate() {
        // Each step happens a little after the previous one.
        now += match step {
            ReplayStep::WaitMs(ms) => Duration::from_millis(*ms),
            _ => Duration::from_millis(16),
        };

        for platform in step_events(index, step)? {
            wm.add_platform_event(win, platform, now);
            wm.step(now);
        }
        wm.step(now);

        let modal = wm.modal_operators(win);
        if modal != modal_prev {
            report
                .lines
                .push(format!("step {}: {:?} -> modal {:?}", index, step, modal));
            modal_prev = modal;
        }
        let registered: Vec<_> = wm
            .operator_log
            .iter()
            .map(|r| r.idname.clone())
            .collect();
        if registered.len() != registered_prev {
            for idname in &registered[registered_prev.min(registered.len())..] {
                report
                    .lines
                    .push(format!("step {}: {:?} -> finished {}", index, step, idname));
            }
            registered_prev = registered.len();
        }
        if wm.quit_requested {
            report.lines.push(format!("step {}: {:?} -> quit", index, step));
            break;
        }
    }

    report.registered = wm.operator_log.iter().map(|r| r.idname.clone()).collect();
    report.undo_steps = wm.undo_stack.iter().map(|s| s.name.clone()).collect();
    report.quit = wm.quit_requested;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs() {
        let args = CliArgs::parse_from(["kraken-wm"]);
        assert!(matches!(args.command(), CliCommand::Run { width: 1280, .. }));
    }

    #[test]
    fn test_keymap_subcommand() {
        let args =
            CliArgs::parse_from(["kraken-wm", "--factory-keymap", "keymap", "--name", "Window"]);
        assert!(args.factory_keymap);
        assert_eq!(
            args.command(),
            CliCommand::Keymap {
                name: Some("Window".to_string())
            }
        );
    }

    #[test]
    fn test_dump_single_keymap() {
        let set = KeyConfigSet::new(default_keyconfig());
        let yaml = dump_keymaps(&set, Some("Window")).unwrap();
        assert!(yaml.contains("wm.quit_kraken"));
        assert!(!yaml.contains("Gesture Box"));
    }

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::parse(
            r#"
size: [800, 600]
areas:
  - space: VIEW_3D
    rect: [0, 0, 799, 599]
steps:
  - move: [10, 10]
  - tap: ctrl+b
  - press: leftmouse
  - wait_ms: 400
  - wheel: -2
"#,
        )
        .unwrap();
        assert_eq!(script.size, (800, 600));
        assert_eq!(script.areas[0].regions, vec!["WINDOW".to_string()]);
        assert_eq!(script.steps[1], ReplayStep::Tap("ctrl+b".to_string()));
        assert_eq!(script.steps[3], ReplayStep::WaitMs(400));
    }

    #[test]
    fn test_tap_wraps_key_in_modifiers() {
        let events = step_events(0, &ReplayStep::Tap("shift+a".to_string())).unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            PlatformEvent::Key {
                key: EventType::LeftShift,
                pressed: true,
                ..
            }
        ));
        assert!(matches!(
            events[3],
            PlatformEvent::Key {
                key: EventType::LeftShift,
                pressed: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_key_reports_step() {
        let err = step_events(3, &ReplayStep::Press("nokey".to_string())).unwrap_err();
        assert!(err.to_string().starts_with("step 3:"));
    }

    #[test]
    fn test_replay_box_gesture() {
        let script = ReplayScript::parse(
            r#"
steps:
  - move: [100, 100]
  - tap: b
  - press: leftmouse
  - move: [200, 180]
  - release: leftmouse
"#,
        )
        .unwrap();
        let report = run_replay(
            &script,
            WmConfig::default(),
            KeyConfigSet::new(default_keyconfig()),
        )
        .unwrap();
        assert_eq!(report.registered, vec!["wm.gesture_box".to_string()]);
        assert_eq!(report.undo_steps, vec!["Box Select".to_string()]);
        assert!(!report.quit);
    }

    #[test]
    fn test_replay_quit() {
        let script = ReplayScript::parse("steps:\n  - tap: cmd+q\n  - move: [1, 1]\n").unwrap();
        let report = run_replay(
            &script,
            WmConfig::default(),
            KeyConfigSet::new(default_keyconfig()),
        )
        .unwrap();
        assert!(report.quit);
        assert!(report.lines.last().unwrap().ends_with("quit"));
    }
}
