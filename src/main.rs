use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window as OsWindow, WindowId as OsWindowId};

use kraken_wm::cli::{dump_keymaps, run_replay, CliArgs, CliCommand, ReplayScript};
use kraken_wm::keymap::platform_event_from_winit;
use kraken_wm::wm::WindowId;
use kraken_wm::WindowManager;

/// One live window driving a window manager
struct App {
    wm: WindowManager,
    size: (u32, u32),
    os_window: Option<OsWindow>,
    win: Option<WindowId>,
}

impl App {
    fn new(wm: WindowManager, size: (u32, u32)) -> Self {
        Self {
            wm,
            size,
            os_window: None,
            win: None,
        }
    }

    fn step(&mut self, event_loop: &ActiveEventLoop) {
        if !self.wm.step(Instant::now()) {
            event_loop.exit();
            return;
        }
        let any_redraw = self
            .wm
            .windows
            .iter()
            .flat_map(|w| w.regions())
            .any(|r| r.do_draw);
        if any_redraw {
            if let Some(os_window) = &self.os_window {
                os_window.request_redraw();
            }
        }
        match self.wm.timers.next_due() {
            Some(due) => event_loop.set_control_flow(ControlFlow::WaitUntil(due)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.os_window.is_some() {
            return;
        }
        let attributes = OsWindow::default_attributes()
            .with_title("Kraken")
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));
        match event_loop.create_window(attributes) {
            Ok(os_window) => {
                let inner = os_window.inner_size();
                let win = self
                    .wm
                    .add_window((inner.width as i32, inner.height as i32));
                self.win = Some(win);
                self.os_window = Some(os_window);
            }
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: OsWindowId,
        event: WindowEvent,
    ) {
        let Some(win) = self.win else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                self.wm.close_window(win);
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.wm.window_mut(win) {
                    window.size = (size.width as i32, size.height as i32);
                }
            }
            WindowEvent::RedrawRequested => {
                for window in &mut self.wm.windows {
                    for area in &mut window.areas {
                        for region in &mut area.regions {
                            region.do_draw = false;
                        }
                    }
                }
            }
            _ => {}
        }

        let Some(window) = self.wm.window(win) else {
            return;
        };
        let height = window.size.1;
        let cursor = window.input.mouse_pos();
        if let Some(platform) = platform_event_from_winit(&event, height, cursor) {
            self.wm.add_platform_event(win, platform, Instant::now());
        }
        self.step(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.step(event_loop);
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    kraken_wm::tracing::init();

    let config = args.load_config();
    let keyconfigs = args.load_keyconfigs();

    match args.command() {
        CliCommand::Keymap { name } => {
            print!("{}", dump_keymaps(&keyconfigs, name.as_deref())?);
        }
        CliCommand::Replay { script } => {
            let parsed = ReplayScript::load(&script)
                .with_context(|| format!("loading {}", script.display()))?;
            let report = run_replay(&parsed, config, keyconfigs)?;
            for line in &report.lines {
                println!("{}", line);
            }
            println!("registered: {:?}", report.registered);
            println!("undo: {:?}", report.undo_steps);
        }
        CliCommand::Run { width, height } => {
            let event_loop = EventLoop::new()?;
            let mut app = App::new(WindowManager::new(config, keyconfigs), (width, height));
            event_loop.run_app(&mut app)?;
        }
    }

    Ok(())
}
