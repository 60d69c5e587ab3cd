//! The passcode entry panel: indicator row, keypad and controls.

use crate::config::biometric::{DEFAULT_REASON, RESULT_POLL_INTERVAL};
use crate::ui::digit_button::DigitButton;
use crate::ui::dot_row::DotRow;
use crate::ui::paint;
use gtk4::prelude::*;
use gtk4::{
    gdk, glib, AspectFrame, Box as GtkBox, Button, CssProvider, EventControllerKey, Grid,
    Orientation,
};
use log::{debug, info, warn};
use pinpad_core::animation::SHAKE_DURATION;
use pinpad_core::{
    BiometricAttempt, BiometricError, BiometricService, EntryError, PanelModel, PanelView,
    PasscodeListener, Style, StyleError, KEYPAD,
};
use thiserror::Error;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

static NEXT_PANEL_ID: AtomicUsize = AtomicUsize::new(1);

/// Palette rules sit above the static stylesheet.
const PANEL_CSS_PRIORITY: u32 = gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION + 1;

/// Ends a rejection when the shake never ticks, e.g. while the panel is unmapped.
const SHAKE_FALLBACK: Duration = SHAKE_DURATION.saturating_add(Duration::from_millis(100));

#[derive(Error, Debug)]
pub enum PanelError {
    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Style(#[from] StyleError),
}

struct PanelInner {
    name: String,
    root: AspectFrame,
    dots: DotRow,
    keys: Vec<DigitButton>,
    delete_button: Button,
    biometric_button: Button,
    css: CssProvider,
    model: PanelModel<PasscodePanel>,
    style: RefCell<Rc<Style>>,
    rt: Arc<Runtime>,
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        if let Some(display) = gdk::Display::default() {
            gtk4::style_context_remove_provider_for_display(&display, &self.css);
        }
    }
}

/// Fixed-length passcode entry with an optional fingerprint shortcut.
///
/// Cloning yields another handle to the same panel. The listener is held
/// weakly; events are delivered on the GTK main thread after the panel has
/// finished updating its own state, so listeners may call straight back into
/// the panel.
#[derive(Clone)]
pub struct PasscodePanel {
    inner: Rc<PanelInner>,
}

impl PasscodePanel {
    pub fn new(
        expected_len: usize,
        style: Style,
        service: Arc<dyn BiometricService>,
        rt: Arc<Runtime>,
    ) -> Result<Self, PanelError> {
        let model = PanelModel::new(expected_len, service, DEFAULT_REASON)?;
        style.validate()?;
        let style = Rc::new(style);

        let name = format!(
            "pinpad-panel-{}",
            NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed)
        );
        info!("Creating passcode panel {} ({} digits)", name, expected_len);

        let dots = DotRow::new(expected_len, Rc::clone(&style));
        let keys: Vec<DigitButton> = KEYPAD
            .iter()
            .map(|(digit, sub_label)| {
                let key = DigitButton::new(Rc::clone(&style));
                key.configure(*digit, sub_label, Rc::clone(&style));
                key
            })
            .collect();

        let biometric_button = Button::new();
        biometric_button.add_css_class("pinpad-control");
        biometric_button.add_css_class("pinpad-biometric");

        let delete_button = Button::new();
        delete_button.add_css_class("pinpad-control");
        delete_button.add_css_class("pinpad-delete");

        let grid = Grid::new();
        grid.set_row_homogeneous(true);
        grid.set_column_homogeneous(true);
        grid.set_row_spacing(12);
        grid.set_column_spacing(18);
        grid.set_vexpand(true);
        for (i, key) in keys.iter().enumerate() {
            let (column, row) = match i {
                0..=8 => ((i % 3) as i32, (i / 3) as i32),
                _ => (1, 3),
            };
            grid.attach(key.widget(), column, row, 1, 1);
        }
        grid.attach(&biometric_button, 0, 3, 1, 1);
        grid.attach(&delete_button, 2, 3, 1, 1);

        let column = GtkBox::new(Orientation::Vertical, 0);
        column.append(dots.widget());
        column.append(&grid);

        let root = AspectFrame::new(0.5, 0.5, style.aspect_ratio as f32, false);
        root.set_widget_name(&name);
        root.add_css_class("pinpad-panel");
        root.set_focusable(true);
        root.set_child(Some(&column));

        let css = CssProvider::new();
        match gdk::Display::default() {
            Some(display) => {
                gtk4::style_context_add_provider_for_display(&display, &css, PANEL_CSS_PRIORITY)
            }
            None => warn!("No default display found - panel colors will not apply"),
        }

        let panel = Self {
            inner: Rc::new(PanelInner {
                name,
                root,
                dots,
                keys,
                delete_button,
                biometric_button,
                css,
                model,
                style: RefCell::new(Rc::clone(&style)),
                rt,
            }),
        };

        panel.apply_validated(style);
        panel.set_biometric_reason(DEFAULT_REASON);
        panel.connect_signals();
        panel.show_biometric_control(false);
        panel.refresh_biometric_availability();
        Ok(panel)
    }

    fn upgrade(weak: &Weak<PanelInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn downgrade(&self) -> Weak<PanelInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn widget(&self) -> &AspectFrame {
        &self.inner.root
    }

    pub fn expected_len(&self) -> usize {
        self.inner.model.expected_len()
    }

    /// Number of digits typed so far.
    pub fn input_len(&self) -> usize {
        self.inner.model.input_len()
    }

    /// The wrong-passcode shake is running and input is ignored.
    pub fn is_rejecting(&self) -> bool {
        self.inner.model.is_rejecting()
    }

    pub fn set_listener<L>(&self, listener: &Rc<L>)
    where
        L: PasscodeListener<PasscodePanel> + 'static,
    {
        self.inner.model.set_listener(listener);
    }

    pub fn remove_listener(&self) {
        self.inner.model.remove_listener();
    }

    fn connect_signals(&self) {
        for key in &self.inner.keys {
            let weak = self.downgrade();
            key.connect_tapped(move |digit| {
                if let Some(panel) = Self::upgrade(&weak) {
                    panel.digit_tapped(digit);
                }
            });
        }

        let weak = self.downgrade();
        self.inner.delete_button.connect_clicked(move |_| {
            if let Some(panel) = Self::upgrade(&weak) {
                panel.delete_pressed();
            }
        });

        let weak = self.downgrade();
        self.inner.biometric_button.connect_clicked(move |_| {
            if let Some(panel) = Self::upgrade(&weak) {
                panel.request_biometric_auth();
            }
        });

        let keyboard = EventControllerKey::new();
        let weak = self.downgrade();
        keyboard.connect_key_pressed(move |_, keyval, _, _| {
            let Some(panel) = Self::upgrade(&weak) else {
                return glib::Propagation::Proceed;
            };
            if keyval == gdk::Key::BackSpace {
                panel.delete_pressed();
                return glib::Propagation::Stop;
            }
            match keyval.to_unicode() {
                Some(c) if c.is_ascii_digit() => {
                    panel.press_key(c);
                    glib::Propagation::Stop
                }
                _ => glib::Propagation::Proceed,
            }
        });
        self.inner.root.add_controller(keyboard);
    }

    /// Keyboard input plays the same animation as a click.
    fn press_key(&self, digit: char) {
        if let Some(key) = self.inner.keys.iter().find(|key| key.value() == digit) {
            key.press_start();
            key.press_end();
        }
    }

    /// Append `digit` to the input. Completing the input notifies the
    /// listener; taps on a full input are ignored.
    pub fn digit_tapped(&self, digit: char) {
        self.inner.model.digit_tapped(self, digit);
    }

    /// Remove the last digit unless the input is empty or full.
    pub fn delete_pressed(&self) {
        self.inner.model.delete_pressed(self);
    }

    /// Discard all input immediately.
    pub fn clear_input(&self) {
        self.inner.model.clear_input(self);
    }

    /// Shake the indicator, then clear the input.
    pub fn wrong_passcode(&self) {
        self.inner.model.wrong_passcode(self);
    }

    /// Cached availability from the last probe or attempt.
    pub fn is_biometric_available(&self) -> bool {
        self.inner.model.is_biometric_available()
    }

    pub fn is_biometric_enabled(&self) -> bool {
        self.inner.model.is_biometric_enabled()
    }

    /// Show or hide the biometric control. Enabling re-checks availability.
    pub fn set_biometric_enabled(&self, enabled: bool) {
        self.inner.model.set_biometric_enabled(self, enabled);
        if enabled {
            self.refresh_biometric_availability();
        }
    }

    /// Text shown to the user while a fingerprint is requested.
    pub fn set_biometric_reason(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.inner
            .biometric_button
            .set_tooltip_text(Some(reason.as_str()).filter(|r| !r.is_empty()));
        self.inner.model.set_reason(reason);
    }

    /// Start a fingerprint attempt. Does nothing while biometrics are
    /// disabled or known to be unavailable, or another attempt is running.
    pub fn request_biometric_auth(&self) {
        let Some(attempt) = self.inner.model.begin_biometric() else {
            return;
        };

        let (tx, rx) = mpsc::channel::<BiometricAttempt>();
        let weak = self.downgrade();
        glib::timeout_add_local(RESULT_POLL_INTERVAL, move || match rx.try_recv() {
            Ok(attempt) => {
                if let Some(panel) = Self::upgrade(&weak) {
                    panel.inner.model.finish_biometric(&panel, attempt);
                }
                glib::ControlFlow::Break
            }
            Err(TryRecvError::Empty) => glib::ControlFlow::Continue,
            Err(TryRecvError::Disconnected) => {
                warn!("Biometric task ended without a result");
                if let Some(panel) = Self::upgrade(&weak) {
                    let attempt = BiometricAttempt::Failed(BiometricError::Cancelled);
                    panel.inner.model.finish_biometric(&panel, attempt);
                }
                glib::ControlFlow::Break
            }
        });

        self.inner.rt.spawn(async move {
            let _ = tx.send(attempt.await);
        });
    }

    /// Probe the biometric service in the background and update the control.
    pub fn refresh_biometric_availability(&self) {
        let probe = self.inner.model.probe_biometric();

        let (tx, rx) = mpsc::channel::<bool>();
        let weak = self.downgrade();
        glib::timeout_add_local(RESULT_POLL_INTERVAL, move || match rx.try_recv() {
            Ok(available) => {
                if let Some(panel) = Self::upgrade(&weak) {
                    panel.inner.model.biometric_probed(&panel, available);
                }
                glib::ControlFlow::Break
            }
            Err(TryRecvError::Empty) => glib::ControlFlow::Continue,
            Err(TryRecvError::Disconnected) => glib::ControlFlow::Break,
        });

        self.inner.rt.spawn(async move {
            let _ = tx.send(probe.await);
        });
    }

    pub fn style(&self) -> Rc<Style> {
        Rc::clone(&self.inner.style.borrow())
    }

    /// Replace colors, fonts, icons and geometry in one step.
    pub fn apply_style(&self, style: Style) -> Result<(), StyleError> {
        style.validate()?;
        self.apply_validated(Rc::new(style));
        Ok(())
    }

    /// Switch between the standard and white-on-clear palettes.
    pub fn set_vibrancy(&self, vibrancy: bool) {
        let style = self.inner.style.borrow().with_vibrancy(vibrancy);
        self.apply_validated(Rc::new(style));
    }

    fn apply_validated(&self, style: Rc<Style>) {
        debug!(
            "Applying style to {} (vibrancy={})",
            self.inner.name, style.vibrancy
        );
        *self.inner.style.borrow_mut() = Rc::clone(&style);

        for key in &self.inner.keys {
            key.set_style(Rc::clone(&style));
        }
        self.inner.dots.set_style(Rc::clone(&style));

        self.inner.root.set_ratio(style.aspect_ratio as f32);
        self.inner.root.set_size_request(style.width, style.height());

        self.inner
            .biometric_button
            .set_icon_name(&style.biometric_icon);
        match &style.delete_icon {
            Some(icon) => self.inner.delete_button.set_icon_name(icon),
            None => self.inner.delete_button.set_label(&style.delete_label),
        }
        self.inner
            .delete_button
            .set_tooltip_text(Some(style.delete_label.as_str()));

        self.inner
            .css
            .load_from_data(&paint::panel_css(&self.inner.name, &style));
    }
}

impl PanelView for PasscodePanel {
    fn show_filled(&self, filled: usize) {
        self.inner.dots.set_filled(filled);
    }

    fn start_shake(&self, rejection: u64) {
        let weak = self.downgrade();
        self.inner.dots.shake(move || {
            if let Some(panel) = Self::upgrade(&weak) {
                panel.inner.model.finish_rejection(&panel, rejection);
            }
        });

        // The tick callback only runs while the row is mapped.
        let weak = self.downgrade();
        glib::timeout_add_local_once(SHAKE_FALLBACK, move || {
            if let Some(panel) = Self::upgrade(&weak) {
                if panel.inner.model.finish_rejection(&panel, rejection) {
                    debug!("Shake did not finish in time, input cleared");
                }
            }
        });
    }

    fn show_biometric_control(&self, visible: bool) {
        let button = &self.inner.biometric_button;
        button.set_sensitive(visible);
        button.set_can_target(visible);
    }
}
