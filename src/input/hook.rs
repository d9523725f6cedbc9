//! System-wide low-level keyboard hook.
//!
//! `WH_KEYBOARD_LL` callbacks run on the thread that installed the hook and
//! only while that thread pumps messages, so `start`, `run_loop` and `stop`
//! all belong to one dedicated thread. Other threads end the loop through a
//! [`QuitHandle`].

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{error, info, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::{KeyCallback, KeyEvent};
use crate::error::HookError;
use crate::guard::{ProcessSlot, SlotClaim};

static KEYBOARD_HOOK: ProcessSlot = ProcessSlot::new("keyboard hook");

lazy_static! {
    // The hook procedure has no user data pointer
    static ref HOOK_CALLBACK: RwLock<Option<KeyCallback>> = RwLock::new(None);
}

unsafe extern "system" fn keyboard_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        let kbd_struct = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        if let Some(event) = KeyEvent::from_raw(wparam.0 as u32, kbd_struct.vkCode) {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                if let Some(callback) = HOOK_CALLBACK.read().as_ref() {
                    callback(event);
                }
            }));
            if result.is_err() {
                error!("Panic in keyboard hook callback");
            }
        }
    }
    // Always pass the event on, matched or not
    CallNextHookEx(None, code, wparam, lparam)
}

/// Posts `WM_QUIT` to the hook thread so `run_loop` returns.
#[derive(Debug, Clone, Copy)]
pub struct QuitHandle {
    thread_id: u32,
}

impl QuitHandle {
    pub fn request(&self) {
        unsafe {
            if let Err(e) = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) {
                warn!("Failed to post quit to keyboard hook thread: {}", e);
            }
        }
    }
}

pub struct KeyboardHook {
    handle: Option<HHOOK>,
    thread_id: u32,
    _claim: SlotClaim,
}

impl KeyboardHook {
    /// Installs the hook on the calling thread. Every keyboard event in the
    /// system is passed to `callback` until [`stop`](Self::stop).
    pub fn start(callback: KeyCallback) -> Result<Self, HookError> {
        let claim = KEYBOARD_HOOK.claim()?;
        *HOOK_CALLBACK.write() = Some(callback);

        let installed = unsafe {
            // Create this thread's message queue before anyone can post to it
            let mut msg = MSG::default();
            let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);

            GetModuleHandleW(None).and_then(|module| {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), Some(module.into()), 0)
            })
        };

        match installed {
            Ok(handle) => {
                info!("Keyboard hook installed");
                Ok(Self {
                    handle: Some(handle),
                    thread_id: unsafe { GetCurrentThreadId() },
                    _claim: claim,
                })
            }
            Err(e) => {
                HOOK_CALLBACK.write().take();
                Err(HookError::Register(e.to_string()))
            }
        }
    }

    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            thread_id: self.thread_id,
        }
    }

    /// Pumps this thread's message queue until `WM_QUIT` arrives.
    pub fn run_loop(&self) {
        let mut msg = MSG::default();
        unsafe {
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if ret.0 == 0 {
                    break;
                }
                if ret.0 == -1 {
                    warn!("GetMessageW failed; leaving message loop");
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    /// Removes the hook. Safe to call more than once.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        unsafe {
            if let Err(e) = UnhookWindowsHookEx(handle) {
                warn!("Failed to remove keyboard hook: {}", e);
            }
        }
        HOOK_CALLBACK.write().take();
        info!("Keyboard hook removed");
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        self.stop();
    }
}
