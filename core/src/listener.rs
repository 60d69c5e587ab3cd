//! Observer registration for panel events.

use crate::biometric::BiometricError;
use log::debug;
use std::rc::{Rc, Weak};
use zeroize::Zeroizing;

/// Receives completion events from a panel of type `P`.
pub trait PasscodeListener<P: ?Sized> {
    /// The expected number of digits has been entered.
    fn input_complete(&self, panel: &P, input: &str);

    /// A biometric attempt finished.
    fn biometric_complete(&self, panel: &P, success: bool, error: Option<&BiometricError>);
}

/// Something the panel reports to its listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    InputComplete(Zeroizing<String>),
    BiometricComplete {
        success: bool,
        error: Option<BiometricError>,
    },
}

impl PanelEvent {
    pub fn dispatch<P: ?Sized>(&self, listener: &dyn PasscodeListener<P>, panel: &P) {
        match self {
            PanelEvent::InputComplete(input) => listener.input_complete(panel, input),
            PanelEvent::BiometricComplete { success, error } => {
                listener.biometric_complete(panel, *success, error.as_ref())
            }
        }
    }
}

/// Non-owning handle to the registered listener.
///
/// The host keeps the listener alive; once it is dropped events are silently
/// discarded.
pub struct ListenerSlot<P: ?Sized> {
    listener: Option<Weak<dyn PasscodeListener<P>>>,
}

impl<P: ?Sized> ListenerSlot<P> {
    pub fn new() -> Self {
        Self { listener: None }
    }

    pub fn register<L>(&mut self, listener: &Rc<L>)
    where
        L: PasscodeListener<P> + 'static,
    {
        let weak: Weak<L> = Rc::downgrade(listener);
        self.listener = Some(weak);
    }

    pub fn deregister(&mut self) {
        self.listener = None;
    }

    /// Live listener, if one is registered and still alive.
    pub fn upgrade(&self) -> Option<Rc<dyn PasscodeListener<P>>> {
        self.listener.as_ref().and_then(Weak::upgrade)
    }

    /// Deliver `event`; returns whether a live listener received it.
    ///
    /// Holds `&self` for the duration of the callback. Callers that let the
    /// listener re-enter should `upgrade` first and dispatch themselves.
    pub fn deliver(&self, panel: &P, event: &PanelEvent) -> bool {
        match self.upgrade() {
            Some(listener) => {
                event.dispatch(listener.as_ref(), panel);
                true
            }
            None => {
                debug!("Dropping panel event: no live listener");
                false
            }
        }
    }
}

impl<P: ?Sized> Default for ListenerSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every callback it receives.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub completed: RefCell<Vec<String>>,
        pub biometric: RefCell<Vec<(bool, Option<BiometricError>)>>,
    }

    impl<P: ?Sized> PasscodeListener<P> for Recorder {
        fn input_complete(&self, _panel: &P, input: &str) {
            self.completed.borrow_mut().push(input.to_string());
        }

        fn biometric_complete(&self, _panel: &P, success: bool, error: Option<&BiometricError>) {
            self.biometric.borrow_mut().push((success, error.cloned()));
        }
    }

    #[test]
    fn test_deliver_to_registered_listener() {
        let recorder = Rc::new(Recorder::default());
        let mut slot = ListenerSlot::<()>::new();
        slot.register(&recorder);

        let event = PanelEvent::InputComplete(Zeroizing::new("1234".to_string()));
        assert!(slot.deliver(&(), &event));
        assert_eq!(*recorder.completed.borrow(), vec!["1234".to_string()]);
    }

    #[test]
    fn test_slot_does_not_keep_listener_alive() {
        let recorder = Rc::new(Recorder::default());
        let mut slot = ListenerSlot::<()>::new();
        slot.register(&recorder);
        assert_eq!(Rc::strong_count(&recorder), 1);

        drop(recorder);
        assert!(slot.upgrade().is_none());
        let event = PanelEvent::BiometricComplete {
            success: true,
            error: None,
        };
        assert!(!slot.deliver(&(), &event));
    }

    #[test]
    fn test_deregister() {
        let recorder = Rc::new(Recorder::default());
        let mut slot = ListenerSlot::<()>::new();
        slot.register(&recorder);
        slot.deregister();

        let event = PanelEvent::BiometricComplete {
            success: false,
            error: Some(BiometricError::NoMatch),
        };
        assert!(!slot.deliver(&(), &event));
        assert!(recorder.biometric.borrow().is_empty());
    }
}
