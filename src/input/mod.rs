//! Keyboard events and the trigger dispatch.
//!
//! The platform hook turns raw messages into [`KeyEvent`]s and hands them to
//! a [`TriggerDispatcher`], which starts a playback attempt for every press
//! of the trigger key without waiting for it.

#[cfg(windows)]
pub mod hook;

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::error::PlaybackError;
use crate::playback::PlaybackController;

#[cfg(windows)]
pub use hook::{KeyboardHook, QuitHandle};

// Low-level keyboard hook message ids
const WM_KEYDOWN: u32 = 0x0100;
const WM_KEYUP: u32 = 0x0101;
const WM_SYSKEYDOWN: u32 = 0x0104;
const WM_SYSKEYUP: u32 = 0x0105;

/// Windows virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u32);

impl VirtualKey {
    /// Letter and digit keys share their uppercase ASCII code.
    pub const fn from_ascii(c: u8) -> Self {
        VirtualKey(c.to_ascii_uppercase() as u32)
    }
}

/// The key that fires the sound.
pub const TRIGGER_KEY: VirtualKey = VirtualKey::from_ascii(b'Q');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
    /// Key down while Alt is held
    SysKeyDown,
    SysKeyUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: VirtualKey,
}

impl KeyEvent {
    pub fn new(kind: KeyEventKind, key: VirtualKey) -> Self {
        Self { kind, key }
    }

    /// Classifies a hook message. Anything that is not a key transition
    /// yields `None`.
    pub fn from_raw(message: u32, vk_code: u32) -> Option<Self> {
        let kind = match message {
            WM_KEYDOWN => KeyEventKind::KeyDown,
            WM_KEYUP => KeyEventKind::KeyUp,
            WM_SYSKEYDOWN => KeyEventKind::SysKeyDown,
            WM_SYSKEYUP => KeyEventKind::SysKeyUp,
            _ => return None,
        };
        Some(Self::new(kind, VirtualKey(vk_code)))
    }

    /// A plain press (not a release, not an Alt combination) of `key`.
    pub fn is_press_of(&self, key: VirtualKey) -> bool {
        self.kind == KeyEventKind::KeyDown && self.key == key
    }
}

/// Receives every keyboard event in the system. Must return quickly.
pub type KeyCallback = Box<dyn Fn(KeyEvent) + Send + Sync + 'static>;

/// Called when a playback attempt hits an unrecoverable error.
pub type FatalHandler = Arc<dyn Fn(PlaybackError) + Send + Sync + 'static>;

/// Bridges key presses to the playback controller.
#[derive(Clone)]
pub struct TriggerDispatcher {
    key: VirtualKey,
    controller: Arc<PlaybackController>,
    on_fatal: FatalHandler,
}

impl TriggerDispatcher {
    pub fn new(key: VirtualKey, controller: Arc<PlaybackController>, on_fatal: FatalHandler) -> Self {
        Self {
            key,
            controller,
            on_fatal,
        }
    }

    pub fn key(&self) -> VirtualKey {
        self.key
    }

    /// Starts a detached playback attempt if `event` is a press of the
    /// trigger key. Returns whether one was started.
    pub fn handle(&self, event: KeyEvent) -> bool {
        if !event.is_press_of(self.key) {
            return false;
        }

        let controller = self.controller.clone();
        let on_fatal = self.on_fatal.clone();
        let spawned = thread::Builder::new()
            .name("trigger".to_string())
            .spawn(move || match controller.trigger() {
                Ok(outcome) => debug!("Trigger finished: {:?}", outcome),
                Err(e) => on_fatal(e),
            });

        if let Err(e) = spawned {
            warn!("Failed to start playback thread: {}", e);
            return false;
        }
        true
    }

    /// Wraps the dispatcher as a hook callback.
    pub fn into_callback(self) -> KeyCallback {
        Box::new(move |event| {
            self.handle(event);
        })
    }
}
