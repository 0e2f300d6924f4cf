//! Input handling for the particle field.
//!
//! Window events are reduced to the handful of signals the field reacts to
//! ([`FieldEvent`]) plus the host's own keyboard commands ([`HostCommand`]).
//! The pointer itself is a last-writer-wins [`Pointer`] signal: the most
//! recent move or leave decides what the next tick sees.

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::theme::Theme;

/// The pointer signal: absent, or a position in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    position: Option<Vec2>,
}

impl Pointer {
    /// Overwrite the signal. `None` marks the pointer as gone.
    #[inline]
    pub fn set(&mut self, position: Option<Vec2>) {
        self.position = position;
    }

    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.position.is_some()
    }
}

/// Signals the field consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    /// Viewport resized to the given pixel size.
    Resized { width: f32, height: f32 },
    /// Pointer moved to a surface position.
    PointerMoved(Vec2),
    /// Pointer left the surface.
    PointerLeft,
    /// Effective theme changed.
    ThemeChanged(Theme),
}

impl FieldEvent {
    /// Translate a window event. Cursor positions arrive in physical
    /// pixels, the same space the surface is sized in.
    ///
    /// `ThemeChanged` carries the platform theme; hosts with a saved
    /// preference filter it before forwarding.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => Some(FieldEvent::Resized {
                width: size.width as f32,
                height: size.height as f32,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(FieldEvent::PointerMoved(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),
            WindowEvent::CursorLeft { .. } => Some(FieldEvent::PointerLeft),
            WindowEvent::ThemeChanged(theme) => Some(FieldEvent::ThemeChanged((*theme).into())),
            _ => None,
        }
    }
}

/// Keyboard commands understood by the windowed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Pause or resume the animation (Space).
    ToggleRunning,
    /// Flip and save the theme preference (T).
    ToggleTheme,
    /// Close the window (Escape).
    Exit,
}

impl HostCommand {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Space => Some(HostCommand::ToggleRunning),
            KeyCode::KeyT => Some(HostCommand::ToggleTheme),
            KeyCode::Escape => Some(HostCommand::Exit),
            _ => None,
        }
    }

    /// Key presses only; repeats are ignored.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(key) => Self::from_key(key),
                    PhysicalKey::Unidentified(_) => None,
                }
            }
            _ => None,
        }
    }
}
