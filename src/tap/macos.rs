//! CGEventTap backend
//!
//! The tap is attached to the run loop of the thread that installs it,
//! which is the main thread: NSWorkspace only refreshes its frontmost and
//! active application state while the main run loop runs, so the callback
//! and the app lookups it makes both live there (see [`super::MainLoop`]).
//! The handler is boxed and passed to the OS as the callback's user info;
//! the box is freed only after the tap is disabled and its run loop source
//! removed.

use std::cell::Cell;
use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::os::raw::c_ulong;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use core_foundation::base::TCFType;
use core_foundation::mach_port::{CFMachPort, CFMachPortRef};
use core_foundation::runloop::{
    kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopSource,
};
use core_graphics::event::{
    CGEvent, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType, EventField,
};
use foreign_types::ForeignType;
use tracing::{debug, error, info, warn};

use super::{Delivery, EventHandler, TapBackend, TapError};
use crate::events::{KeyEvent, Phase};
use crate::keys::{KeyCode, Modifiers};

/// CGEventMask type for raw FFI
type CGEventMask = u64;

/// Callback signature for raw FFI. The event type is taken as a plain
/// integer because the OS also sends values outside `CGEventType`.
type TapCallback = unsafe extern "C" fn(
    proxy: *const c_void,
    event_type: u32,
    event: *mut c_void,
    user_info: *mut c_void,
) -> *mut c_void;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: CGEventMask,
        callback: TapCallback,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);

    fn CGEventKeyboardGetUnicodeString(
        event: *mut c_void,
        max_len: c_ulong,
        actual_len: *mut c_ulong,
        buffer: *mut u16,
    );
}

const TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

/// Callbacks slower than this hold up input for every app
const SLOW_CALLBACK: Duration = Duration::from_millis(10);

/// How long the main run loop runs before re-checking its stop flag
const RUN_LOOP_SLICE: Duration = Duration::from_millis(100);

/// Callback user info
struct TapContext {
    handler: EventHandler,
    port: Cell<CFMachPortRef>,
}

/// A registered tap and everything that must be torn down with it
struct InstalledTap {
    context: *mut TapContext,
    port: CFMachPort,
    source: CFRunLoopSource,
    run_loop: CFRunLoop,
}

/// Session-level, head-inserted, modifying event tap
///
/// Must be installed and uninstalled on the thread that runs
/// [`super::MainLoop::run`].
#[derive(Default)]
pub struct CgEventTapBackend {
    tap: Option<InstalledTap>,
}

impl TapBackend for CgEventTapBackend {
    fn install(&mut self, handler: EventHandler) -> Result<(), TapError> {
        let event_mask: CGEventMask =
            (1 << CGEventType::KeyDown as u64) | (1 << CGEventType::KeyUp as u64);

        let context = Box::into_raw(Box::new(TapContext {
            handler,
            port: Cell::new(ptr::null_mut()),
        }));

        let tap_ref = unsafe {
            CGEventTapCreate(
                CGEventTapLocation::Session as u32,
                CGEventTapPlacement::HeadInsertEventTap as u32,
                CGEventTapOptions::Default as u32,
                event_mask,
                tap_callback,
                context as *mut c_void,
            )
        };

        if tap_ref.is_null() {
            drop(unsafe { Box::from_raw(context) });
            error!("failed to create event tap - is Input Monitoring permission granted?");
            return Err(TapError::TapCreationFailed(
                "CGEventTapCreate returned null".to_string(),
            ));
        }

        unsafe { (*context).port.set(tap_ref) };
        let port = unsafe { CFMachPort::wrap_under_create_rule(tap_ref) };

        let source = match port.create_runloop_source(0) {
            Ok(source) => source,
            Err(()) => {
                drop(port);
                drop(unsafe { Box::from_raw(context) });
                return Err(TapError::TapCreationFailed(
                    "failed to create run loop source".to_string(),
                ));
            }
        };

        let run_loop = CFRunLoop::get_current();
        run_loop.add_source(&source, unsafe { kCFRunLoopCommonModes });

        unsafe { CGEventTapEnable(port.as_concrete_TypeRef(), true) };
        info!("event tap created and enabled");

        self.tap = Some(InstalledTap {
            context,
            port,
            source,
            run_loop,
        });
        Ok(())
    }

    fn uninstall(&mut self) {
        let Some(tap) = self.tap.take() else {
            return;
        };

        unsafe { CGEventTapEnable(tap.port.as_concrete_TypeRef(), false) };
        tap.run_loop
            .remove_source(&tap.source, unsafe { kCFRunLoopCommonModes });
        drop(tap.source);
        drop(tap.port);

        // No callback can run now: the tap is disabled and detached from the
        // only run loop that dispatched it.
        drop(unsafe { Box::from_raw(tap.context) });
        debug!("event tap released");
    }
}

impl Drop for CgEventTapBackend {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Run the current thread's CFRunLoop in slices until `running` clears
pub(super) fn run_main_loop(running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        let _ = CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, RUN_LOOP_SLICE, false);
    }
}

/// Cut the main run loop's current slice short
pub(super) fn wake_main_loop() {
    CFRunLoop::get_main().stop();
}

/// Raw CGEventTap callback
///
/// Returns the (possibly rewritten) event to deliver it, or null to drop it.
unsafe extern "C" fn tap_callback(
    _proxy: *const c_void,
    event_type: u32,
    event_ref: *mut c_void,
    user_info: *mut c_void,
) -> *mut c_void {
    if user_info.is_null() {
        return event_ref;
    }
    let context = &*(user_info as *const TapContext);

    if event_type == TAP_DISABLED_BY_TIMEOUT || event_type == TAP_DISABLED_BY_USER_INPUT {
        warn!(event_type, "event tap disabled by the system, re-enabling");
        CGEventTapEnable(context.port.get(), true);
        return event_ref;
    }

    if event_ref.is_null() {
        return event_ref;
    }

    // Borrowed from the OS; must not be released here
    let event = ManuallyDrop::new(CGEvent::from_ptr(event_ref as *mut _));

    let start = Instant::now();
    let deliver = panic::catch_unwind(AssertUnwindSafe(|| {
        handle_event(&context.handler, event_type, &event)
    }));

    let elapsed = start.elapsed();
    if elapsed > SLOW_CALLBACK {
        warn!(?elapsed, "slow event tap callback, system input was held");
    }

    match deliver {
        Ok(true) => event_ref,
        Ok(false) => ptr::null_mut(),
        Err(_) => {
            error!("event tap callback panicked, passing event through");
            event_ref
        }
    }
}

/// Run the handler and apply its action to the OS event in place.
/// Returns whether the event should be delivered.
fn handle_event(handler: &EventHandler, event_type: u32, event: &CGEvent) -> bool {
    let key_code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as KeyCode;
    let mut key_event = KeyEvent::new(key_code, Phase::from_event_type(event_type))
        .with_modifiers(Modifiers::from_flags(event.get_flags().bits()));
    if let Some(text) = unicode_string(event) {
        key_event = key_event.with_character(text);
    }

    match handler.delivery(key_event) {
        Delivery::Unchanged => true,
        Delivery::SetKeyCode(new_key_code) => {
            event.set_integer_value_field(
                EventField::KEYBOARD_EVENT_KEYCODE,
                i64::from(new_key_code),
            );
            true
        }
        Delivery::Drop => false,
    }
}

/// Text the key produces under the current layout and modifiers
fn unicode_string(event: &CGEvent) -> Option<String> {
    let mut buffer = [0u16; 8];
    let mut len: c_ulong = 0;
    unsafe {
        CGEventKeyboardGetUnicodeString(
            event.as_ptr() as *mut c_void,
            buffer.len() as c_ulong,
            &mut len,
            buffer.as_mut_ptr(),
        );
    }
    let len = (len as usize).min(buffer.len());
    (len > 0).then(|| String::from_utf16_lossy(&buffer[..len]))
}
