//! NSWorkspace queries for the foreground application
//!
//! Called from the tap callback on the main thread. The answers only track
//! app switches while the main run loop runs. Every call runs inside its
//! own autorelease pool since no AppKit event loop drains one.

use std::ffi::CStr;
use std::os::raw::c_char;

use objc::rc::autoreleasepool;
use objc::runtime::{Object, BOOL, NO};
use objc::{class, msg_send, sel, sel_impl};

use super::{ResolutionFailure, RunningApp, WorkspaceQuery};

type Id = *mut Object;

/// `NSWorkspace.sharedWorkspace`
#[derive(Debug, Default, Clone, Copy)]
pub struct NsWorkspace;

impl WorkspaceQuery for NsWorkspace {
    fn frontmost(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        autoreleasepool(|| unsafe {
            let workspace = shared_workspace()?;
            let app: Id = msg_send![workspace, frontmostApplication];
            Ok(running_app(app))
        })
    }

    fn menu_bar_owner(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        autoreleasepool(|| unsafe {
            let workspace = shared_workspace()?;
            let app: Id = msg_send![workspace, menuBarOwningApplication];
            Ok(running_app(app))
        })
    }

    fn first_active(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        autoreleasepool(|| unsafe {
            let workspace = shared_workspace()?;
            let apps: Id = msg_send![workspace, runningApplications];
            if apps.is_null() {
                return Err(ResolutionFailure::WorkspaceUnavailable);
            }

            let count: usize = msg_send![apps, count];
            for i in 0..count {
                let app: Id = msg_send![apps, objectAtIndex: i];
                if app.is_null() {
                    continue;
                }
                let active: BOOL = msg_send![app, isActive];
                if active != NO {
                    return Ok(running_app(app));
                }
            }
            Ok(None)
        })
    }
}

unsafe fn shared_workspace() -> Result<Id, ResolutionFailure> {
    let workspace: Id = msg_send![class!(NSWorkspace), sharedWorkspace];
    if workspace.is_null() {
        Err(ResolutionFailure::WorkspaceUnavailable)
    } else {
        Ok(workspace)
    }
}

/// Read name and bundle id off an `NSRunningApplication`
unsafe fn running_app(app: Id) -> Option<RunningApp> {
    if app.is_null() {
        return None;
    }
    let name: Id = msg_send![app, localizedName];
    let bundle_id: Id = msg_send![app, bundleIdentifier];
    Some(RunningApp {
        name: ns_string(name),
        bundle_id: ns_string(bundle_id),
    })
}

unsafe fn ns_string(string: Id) -> Option<String> {
    if string.is_null() {
        return None;
    }
    let cstr: *const c_char = msg_send![string, UTF8String];
    if cstr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(cstr).to_string_lossy().into_owned())
}
