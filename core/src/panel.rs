//! Display-free panel behaviour.
//!
//! [`PanelModel`] owns the entry, the biometric gate and the listener. A host
//! widget implements [`PanelView`], forwards user actions to the model and
//! passes itself along so listeners receive the host. Listener callbacks run
//! after the model has released its own borrows, so a listener may call
//! straight back into the host.

use crate::biometric::{Availability, BiometricAttempt, BiometricGate, BiometricService};
use crate::entry::{EntryError, PasscodeEntry};
use crate::listener::{ListenerSlot, PanelEvent, PasscodeListener};
use futures_util::future::BoxFuture;
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Rendering hooks provided by the host widget.
pub trait PanelView {
    /// Draw the first `filled` indicator dots filled.
    fn show_filled(&self, filled: usize);

    /// Play the wrong-passcode animation, then call
    /// [`PanelModel::finish_rejection`] with `rejection`.
    fn start_shake(&self, rejection: u64);

    fn show_biometric_control(&self, visible: bool);
}

pub struct PanelModel<P: ?Sized> {
    entry: RefCell<PasscodeEntry>,
    gate: RefCell<BiometricGate>,
    listener: RefCell<ListenerSlot<P>>,
    reason: RefCell<String>,
    rejection: Cell<u64>,
}

impl<P: PanelView + ?Sized> PanelModel<P> {
    pub fn new(
        expected_len: usize,
        service: Arc<dyn BiometricService>,
        reason: impl Into<String>,
    ) -> Result<Self, EntryError> {
        Ok(Self {
            entry: RefCell::new(PasscodeEntry::new(expected_len)?),
            gate: RefCell::new(BiometricGate::new(service)),
            listener: RefCell::new(ListenerSlot::new()),
            reason: RefCell::new(reason.into()),
            rejection: Cell::new(0),
        })
    }

    pub fn expected_len(&self) -> usize {
        self.entry.borrow().expected_len()
    }

    pub fn input_len(&self) -> usize {
        self.entry.borrow().len()
    }

    pub fn filled_count(&self) -> usize {
        self.entry.borrow().filled_count()
    }

    /// A wrong-passcode animation is running; input is frozen.
    pub fn is_rejecting(&self) -> bool {
        self.entry.borrow().is_rejecting()
    }

    pub fn set_listener<L>(&self, listener: &Rc<L>)
    where
        L: PasscodeListener<P> + 'static,
    {
        self.listener.borrow_mut().register(listener);
    }

    pub fn remove_listener(&self) {
        self.listener.borrow_mut().deregister();
    }

    pub fn reason(&self) -> String {
        self.reason.borrow().clone()
    }

    pub fn set_reason(&self, reason: impl Into<String>) {
        *self.reason.borrow_mut() = reason.into();
    }

    pub fn digit_tapped(&self, host: &P, digit: char) {
        let event = self.entry.borrow_mut().digit_tapped(digit);
        self.refresh_indicator(host);
        if let Some(event) = event {
            info!("Passcode input complete");
            self.notify(host, event);
        }
    }

    pub fn delete_pressed(&self, host: &P) {
        if self.entry.borrow_mut().delete_pressed() {
            self.refresh_indicator(host);
        }
    }

    pub fn clear_input(&self, host: &P) {
        self.entry.borrow_mut().clear_input();
        self.refresh_indicator(host);
    }

    /// Freeze input and ask the host to shake. A second call while shaking
    /// starts a new rejection; only its completion clears the input.
    pub fn wrong_passcode(&self, host: &P) {
        info!("Wrong passcode, rejecting input");
        self.entry.borrow_mut().begin_rejection();
        let rejection = self.rejection.get() + 1;
        self.rejection.set(rejection);
        host.start_shake(rejection);
    }

    /// Clear the input once the shake for `rejection` ends. Stale or repeated
    /// completions are ignored; returns whether the input was cleared.
    pub fn finish_rejection(&self, host: &P, rejection: u64) -> bool {
        if rejection != self.rejection.get() || !self.is_rejecting() {
            debug!("Ignoring stale rejection {}", rejection);
            return false;
        }
        self.entry.borrow_mut().finish_rejection();
        self.refresh_indicator(host);
        true
    }

    pub fn is_biometric_available(&self) -> bool {
        self.gate.borrow().is_available()
    }

    pub fn biometric_availability(&self) -> Availability {
        self.gate.borrow().availability()
    }

    pub fn is_biometric_enabled(&self) -> bool {
        self.gate.borrow().is_enabled()
    }

    pub fn set_biometric_enabled(&self, host: &P, enabled: bool) {
        self.gate.borrow_mut().set_enabled(enabled);
        self.refresh_biometric_control(host);
    }

    /// Availability query to run off the UI thread; report the result with
    /// [`biometric_probed`](Self::biometric_probed).
    pub fn probe_biometric(&self) -> BoxFuture<'static, bool> {
        self.gate.borrow().probe()
    }

    pub fn biometric_probed(&self, host: &P, available: bool) {
        debug!("Biometric availability: {}", available);
        self.gate.borrow_mut().set_available(available);
        self.refresh_biometric_control(host);
    }

    /// Attempt to run off the UI thread; report the result with
    /// [`finish_biometric`](Self::finish_biometric).
    pub fn begin_biometric(&self) -> Option<BoxFuture<'static, BiometricAttempt>> {
        let reason = self.reason();
        self.gate.borrow_mut().begin(&reason)
    }

    /// Success fills the indicator; failure rejects the input. The listener
    /// hears about both, an unavailable device stays silent.
    pub fn finish_biometric(&self, host: &P, attempt: BiometricAttempt) {
        let event = self.gate.borrow_mut().finish(attempt);
        self.refresh_biometric_control(host);
        let Some(event) = event else {
            return;
        };

        if let PanelEvent::BiometricComplete { success, .. } = &event {
            if *success {
                self.entry.borrow_mut().fill_indicator();
                self.refresh_indicator(host);
            } else {
                self.wrong_passcode(host);
            }
        }
        self.notify(host, event);
    }

    fn refresh_indicator(&self, host: &P) {
        let filled = self.filled_count();
        host.show_filled(filled);
    }

    fn refresh_biometric_control(&self, host: &P) {
        let visible = self.gate.borrow().control_visible();
        host.show_biometric_control(visible);
    }

    fn notify(&self, host: &P, event: PanelEvent) {
        let listener = self.listener.borrow().upgrade();
        match listener {
            Some(listener) => event.dispatch(listener.as_ref(), host),
            None => debug!("Dropping panel event: no live listener"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biometric::tests::MockService;
    use crate::biometric::BiometricError;
    use std::sync::atomic::Ordering;

    struct Host {
        model: PanelModel<Host>,
        filled: Cell<usize>,
        shakes: RefCell<Vec<u64>>,
        control: Cell<Option<bool>>,
    }

    impl PanelView for Host {
        fn show_filled(&self, filled: usize) {
            self.filled.set(filled);
        }

        fn start_shake(&self, rejection: u64) {
            self.shakes.borrow_mut().push(rejection);
        }

        fn show_biometric_control(&self, visible: bool) {
            self.control.set(Some(visible));
        }
    }

    impl Host {
        fn new(n: usize, service: Arc<MockService>) -> Self {
            Self {
                model: PanelModel::new(n, service, "Touch to unlock").unwrap(),
                filled: Cell::new(0),
                shakes: RefCell::new(Vec::new()),
                control: Cell::new(None),
            }
        }

        fn tap(&self, digits: &str) {
            for d in digits.chars() {
                self.model.digit_tapped(self, d);
            }
        }

        /// Completes the latest shake.
        fn end_shake(&self) -> bool {
            let rejection = *self.shakes.borrow().last().unwrap();
            self.model.finish_rejection(self, rejection)
        }

        async fn run_biometric(&self) {
            let attempt = self.model.begin_biometric().unwrap().await;
            self.model.finish_biometric(self, attempt);
        }
    }

    #[derive(Clone, Copy)]
    enum Reaction {
        Nothing,
        Clear,
        Reject,
    }

    /// Records callbacks and reacts by calling back into the host.
    struct Listener {
        reaction: Reaction,
        completed: RefCell<Vec<String>>,
        biometric: RefCell<Vec<(bool, Option<BiometricError>)>>,
    }

    impl Listener {
        fn new(reaction: Reaction) -> Rc<Self> {
            Rc::new(Self {
                reaction,
                completed: RefCell::new(Vec::new()),
                biometric: RefCell::new(Vec::new()),
            })
        }

        fn react(&self, host: &Host) {
            match self.reaction {
                Reaction::Nothing => {}
                Reaction::Clear => host.model.clear_input(host),
                Reaction::Reject => host.model.wrong_passcode(host),
            }
        }
    }

    impl PasscodeListener<Host> for Listener {
        fn input_complete(&self, host: &Host, input: &str) {
            self.completed.borrow_mut().push(input.to_string());
            self.react(host);
        }

        fn biometric_complete(&self, host: &Host, success: bool, error: Option<&BiometricError>) {
            self.biometric.borrow_mut().push((success, error.cloned()));
            self.react(host);
        }
    }

    fn available() -> Arc<MockService> {
        MockService::new(true, Ok(()))
    }

    #[test]
    fn test_completion_notifies_once() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);

        host.tap("12345");

        assert_eq!(*listener.completed.borrow(), vec!["1234".to_string()]);
        assert_eq!(host.filled.get(), 4);
    }

    #[test]
    fn test_listener_clears_from_callback() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Clear);
        host.model.set_listener(&listener);

        host.tap("1234");
        assert_eq!(host.filled.get(), 0);
        assert_eq!(host.model.input_len(), 0);

        host.tap("56");
        assert_eq!(host.filled.get(), 2);
    }

    #[test]
    fn test_listener_rejects_from_callback() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Reject);
        host.model.set_listener(&listener);

        host.tap("1111");
        assert_eq!(*host.shakes.borrow(), vec![1]);
        assert!(host.model.is_rejecting());
        assert_eq!(host.filled.get(), 4);

        host.tap("2");
        assert!(host.end_shake());
        assert_eq!(host.filled.get(), 0);
        assert_eq!(host.model.input_len(), 0);
        assert!(!host.model.is_rejecting());
    }

    #[test]
    fn test_restarted_shake_ignores_stale_completion() {
        let host = Host::new(4, available());
        host.tap("12");
        host.model.wrong_passcode(&host);
        host.model.wrong_passcode(&host);
        assert_eq!(*host.shakes.borrow(), vec![1, 2]);

        assert!(!host.model.finish_rejection(&host, 1));
        assert_eq!(host.model.input_len(), 2);

        assert!(host.model.finish_rejection(&host, 2));
        assert!(!host.model.finish_rejection(&host, 2));
        assert_eq!(host.filled.get(), 0);
    }

    #[test]
    fn test_dropped_listener_is_not_called() {
        let host = Host::new(2, available());
        let listener = Listener::new(Reaction::Clear);
        host.model.set_listener(&listener);
        drop(listener);

        host.tap("12");
        assert_eq!(host.filled.get(), 2);
    }

    #[tokio::test]
    async fn test_biometric_success_fills_indicator() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);
        host.tap("1");

        host.run_biometric().await;

        assert_eq!(host.filled.get(), 4);
        assert_eq!(*listener.biometric.borrow(), vec![(true, None)]);
        assert_eq!(host.control.get(), Some(true));

        host.tap("2");
        assert!(listener.completed.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_biometric_failure_rejects_input() {
        let host = Host::new(4, MockService::new(true, Err(BiometricError::NoMatch)));
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);
        host.tap("12");

        host.run_biometric().await;

        assert_eq!(host.shakes.borrow().len(), 1);
        assert_eq!(
            *listener.biometric.borrow(),
            vec![(false, Some(BiometricError::NoMatch))]
        );
        assert!(host.end_shake());
        assert_eq!(host.filled.get(), 0);
    }

    #[tokio::test]
    async fn test_wrong_passcode_then_biometric_success() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);
        host.tap("12");
        host.model.wrong_passcode(&host);

        host.run_biometric().await;
        assert_eq!(host.filled.get(), 4);
        assert_eq!(*listener.biometric.borrow(), vec![(true, None)]);

        assert!(host.end_shake());
        assert_eq!(host.filled.get(), 0);
        assert_eq!(host.model.input_len(), 0);
    }

    #[tokio::test]
    async fn test_listener_clears_after_biometric_success() {
        let host = Host::new(4, available());
        let listener = Listener::new(Reaction::Clear);
        host.model.set_listener(&listener);

        host.run_biometric().await;

        assert_eq!(host.filled.get(), 0);
        host.tap("9");
        assert_eq!(host.filled.get(), 1);
    }

    #[tokio::test]
    async fn test_request_before_probe_result() {
        let service = available();
        let host = Host::new(4, service.clone());
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);
        assert_eq!(host.model.biometric_availability(), Availability::Unknown);

        host.run_biometric().await;

        assert_eq!(service.authentications.load(Ordering::SeqCst), 1);
        assert_eq!(listener.biometric.borrow().len(), 1);
        assert!(host.model.is_biometric_available());
    }

    #[tokio::test]
    async fn test_unsupported_device_is_silent() {
        let service = MockService::new(false, Ok(()));
        let host = Host::new(4, service.clone());
        let listener = Listener::new(Reaction::Nothing);
        host.model.set_listener(&listener);

        host.run_biometric().await;

        assert_eq!(service.authentications.load(Ordering::SeqCst), 0);
        assert!(listener.biometric.borrow().is_empty());
        assert_eq!(host.control.get(), Some(false));
        assert!(host.model.begin_biometric().is_none());
    }

    #[tokio::test]
    async fn test_probe_updates_control() {
        let host = Host::new(4, available());
        let available = host.model.probe_biometric().await;
        host.model.biometric_probed(&host, available);
        assert_eq!(host.control.get(), Some(true));

        host.model.set_biometric_enabled(&host, false);
        assert_eq!(host.control.get(), Some(false));
        assert!(host.model.begin_biometric().is_none());
    }
}
