//! Panic-site capture for the dispatch fault boundary.
//!
//! # Design Decisions
//! - `catch_unwind` only sees the payload after the stack has unwound, so the
//!   location and backtrace are taken inside a panic hook instead
//! - The hook is installed once per process and chains whatever hook was
//!   installed before it
//! - Captures are thread-local; the boundary takes the capture from the
//!   thread that panicked

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

/// Where a panic was raised and the stack at that moment.
#[derive(Debug)]
pub struct PanicSite {
    pub location: Option<String>,
    pub backtrace: Backtrace,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Install the capturing hook. Later calls are no-ops.
pub fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(site));
            previous(info);
        }));
    });
}

/// Take the most recent capture on this thread, if any.
pub fn take() -> Option<PanicSite> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}
