//! Windowed host.
//!
//! Opens a window, renders the field into it with [`GpuContext`], and wires
//! window events to the field: resize, pointer move/leave, platform theme
//! changes. One field tick runs per redraw while the field is running.
//!
//! Keys: `Space` pauses/resumes, `T` toggles and saves the theme preference,
//! `Escape` quits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::error::RunError;
use crate::gpu::GpuContext;
use crate::input::{FieldEvent, HostCommand};
use crate::simulation::ParticleField;
use crate::theme::{Theme, ThemePreference, ThemeWatcher};
use crate::time::FrameTimer;

/// Settings for [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: FieldConfig,
    /// Fixed population seed; random when `None`.
    pub seed: Option<u64>,
    /// Where the theme preference is loaded from and saved to.
    pub preference_path: Option<PathBuf>,
    pub title: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: FieldConfig::default(),
            seed: None,
            preference_path: None,
            title: "netfield".into(),
        }
    }
}

/// Open a window and animate the field until it is closed.
pub fn run(options: RunOptions) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    options: RunOptions,
    preference: ThemePreference,
    system_theme: Theme,
    watcher: ThemeWatcher,
    timer: FrameTimer,
    window: Option<Arc<Window>>,
    field: Option<ParticleField<GpuContext>>,
    error: Option<RunError>,
}

impl App {
    fn new(options: RunOptions) -> Self {
        let preference = match &options.preference_path {
            Some(path) => ThemePreference::load(path).unwrap_or_else(|e| {
                log::warn!("Ignoring theme preference at {}: {}", path.display(), e);
                ThemePreference::System
            }),
            None => ThemePreference::System,
        };

        Self {
            watcher: ThemeWatcher::new(options.config.theme_delay()),
            options,
            preference,
            system_theme: Theme::Light,
            timer: FrameTimer::new(),
            window: None,
            field: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.system_theme = window.theme().map(Theme::from).unwrap_or_default();

        let theme = self.preference.resolve(self.system_theme);
        let background = self.options.config.palette.background(theme);
        let context = pollster::block_on(GpuContext::new(window.clone(), background))?;

        let config = self.options.config.clone();
        let mut field = match self.options.seed {
            Some(seed) => ParticleField::with_seed(context, config, seed)?,
            None => ParticleField::new(context, config)?,
        };
        field.set_theme(theme);

        self.window = Some(window);
        self.field = Some(field);
        Ok(())
    }

    /// Re-read the effective theme and hand it to the field.
    fn apply_theme(&mut self) {
        let theme = self.preference.resolve(self.system_theme);
        if let Some(field) = &mut self.field {
            let background = field.config().palette.background(theme);
            field.set_theme(theme);
            field.context_mut().set_background(background);
        }
    }

    fn command(&mut self, event_loop: &ActiveEventLoop, command: HostCommand) {
        match command {
            HostCommand::Exit => event_loop.exit(),
            HostCommand::ToggleRunning => {
                if let Some(field) = &mut self.field {
                    if field.is_running() {
                        field.stop();
                    } else {
                        field.start();
                    }
                }
            }
            HostCommand::ToggleTheme => {
                self.preference = self.preference.toggle(self.system_theme);
                log::info!("Theme preference set to {:?}", self.preference);
                if let Some(path) = &self.options.preference_path {
                    if let Err(e) = self.preference.save(path) {
                        log::error!("Failed to save theme preference: {}", e);
                    }
                }
                self.watcher.notify(Instant::now());
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.timer.update();
        if self.watcher.poll(now) {
            self.apply_theme();
        }

        let Some(field) = &mut self.field else {
            return;
        };

        if field.is_running() {
            field.tick();
        }

        match field.context_mut().present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                field.context_mut().reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if let Some(fps) = self.timer.take_fps_report() {
                window.set_title(&format!("{} - {:.0} fps", self.options.title, fps));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(command) = HostCommand::from_window_event(&event) {
            self.command(event_loop, command);
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            event => match FieldEvent::from_window_event(&event) {
                Some(FieldEvent::ThemeChanged(theme)) => {
                    self.system_theme = theme;
                    if self.preference.follows_system() {
                        self.watcher.notify(Instant::now());
                    }
                }
                Some(field_event) => {
                    if let Some(field) = &mut self.field {
                        field.handle_event(field_event);
                    }
                }
                None => {}
            },
        }
    }
}
