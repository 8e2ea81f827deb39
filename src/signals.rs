//! Job-control signal coordination
//!
//! The handlers installed here only set atomic flags. A blocked terminal read
//! returns `EINTR` when one of them runs (they are installed without
//! `SA_RESTART`), and the read loop then takes the pending flags and performs
//! the terminal transitions itself:
//!
//! - SIGTSTP: restore the terminal, stop the process, re-apply raw mode when
//!   continued
//! - SIGCONT: re-apply raw mode if a read is active
//! - SIGINT: abandon the current line

use std::sync::atomic::{AtomicBool, Ordering};

use nix::libc::{c_int, SIGCONT, SIGINT, SIGTSTP};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::{debug, warn};

static INTERRUPT: AtomicBool = AtomicBool::new(false);
static SUSPEND: AtomicBool = AtomicBool::new(false);
static RESUME: AtomicBool = AtomicBool::new(false);

const HANDLED: [Signal; 3] = [Signal::SIGTSTP, Signal::SIGCONT, Signal::SIGINT];

extern "C" fn on_signal(sig: c_int) {
    match sig {
        SIGINT => INTERRUPT.store(true, Ordering::SeqCst),
        SIGTSTP => SUSPEND.store(true, Ordering::SeqCst),
        SIGCONT => RESUME.store(true, Ordering::SeqCst),
        _ => {}
    }
}

/// Signals received since the last [`SignalCoordinator::take_pending`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pending {
    pub interrupt: bool,
    pub suspend: bool,
    pub resume: bool,
}

impl Pending {
    /// Whether no signal is pending
    pub fn is_empty(&self) -> bool {
        !(self.interrupt || self.suspend || self.resume)
    }
}

/// Installed SIGTSTP/SIGCONT/SIGINT handlers
///
/// The previous dispositions are restored when the coordinator is dropped.
#[derive(Debug)]
pub struct SignalCoordinator {
    previous: Vec<(Signal, SigAction)>,
}

impl SignalCoordinator {
    /// Install the flag-setting handlers
    pub fn install() -> nix::Result<Self> {
        // Discard anything left over from an earlier coordinator
        let _ = Self::drain();

        let mut coordinator = Self {
            previous: Vec::with_capacity(HANDLED.len()),
        };
        for sig in HANDLED {
            // SAFETY: the handler only stores to atomics, which is async-signal-safe
            let old = unsafe { signal::sigaction(sig, &flag_action()) }?;
            coordinator.previous.push((sig, old));
        }
        debug!("signal handlers installed");
        Ok(coordinator)
    }

    /// Take and clear the pending flags
    pub fn take_pending(&self) -> Pending {
        Self::drain()
    }

    /// Stop the process with the default SIGTSTP action.
    ///
    /// Returns once the process is continued. The caller restores the terminal
    /// before calling this and re-applies raw mode afterwards.
    pub fn suspend_process(&self) -> nix::Result<()> {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        // SAFETY: the default disposition runs no code in signal context
        unsafe { signal::sigaction(Signal::SIGTSTP, &default) }?;
        let stopped = signal::raise(Signal::SIGTSTP);
        // SAFETY: see `install`
        unsafe { signal::sigaction(Signal::SIGTSTP, &flag_action()) }?;
        stopped
    }

    fn drain() -> Pending {
        Pending {
            interrupt: INTERRUPT.swap(false, Ordering::SeqCst),
            suspend: SUSPEND.swap(false, Ordering::SeqCst),
            resume: RESUME.swap(false, Ordering::SeqCst),
        }
    }
}

impl Drop for SignalCoordinator {
    fn drop(&mut self) {
        for (sig, old) in self.previous.drain(..) {
            // SAFETY: restores the disposition that was active before `install`
            if let Err(e) = unsafe { signal::sigaction(sig, &old) } {
                warn!("Failed to restore handler for {}: {}", sig, e);
            }
        }
        debug!("signal handlers removed");
    }
}

fn flag_action() -> SigAction {
    SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::empty(),
        SigSet::empty(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every test touching the process-wide flags lives in this one function.
    #[test]
    fn test_handlers_set_flags() {
        let coordinator = SignalCoordinator::install().expect("Failed to install handlers");
        assert!(coordinator.take_pending().is_empty());

        signal::raise(Signal::SIGINT).unwrap();
        let pending = coordinator.take_pending();
        assert!(pending.interrupt);
        assert!(!pending.suspend);
        assert!(coordinator.take_pending().is_empty());

        signal::raise(Signal::SIGCONT).unwrap();
        assert!(coordinator.take_pending().resume);

        drop(coordinator);

        // SAFETY: installs the default disposition and returns the one in place
        let current = unsafe {
            signal::sigaction(
                Signal::SIGCONT,
                &SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty()),
            )
        }
        .unwrap();
        assert!(!matches!(current.handler(), SigHandler::Handler(_)));
    }

    #[test]
    fn test_pending_is_empty() {
        assert!(Pending::default().is_empty());
        let pending = Pending {
            resume: true,
            ..Pending::default()
        };
        assert!(!pending.is_empty());
    }
}
