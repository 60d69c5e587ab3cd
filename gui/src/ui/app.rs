//! Demo application: a window hosting one passcode panel.

use crate::config::{app_info, Args, UNLOCKED_RESET_DELAY};
use crate::platform::FprintdService;
use crate::ui::panel::PasscodePanel;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{
    gio, Align, Application, ApplicationWindow, Box as GtkBox, CheckButton, CssProvider, Label,
    Orientation,
};
use log::{error, info, warn};
use pinpad_core::{BiometricError, BiometricService, PasscodeListener, Style};

use std::rc::Rc;
use std::sync::Arc;
use tokio::runtime::Runtime;

const PROMPT: &str = "Enter passcode";

/// Checks completed input against the configured passcode.
struct DemoListener {
    passcode: String,
    status: Label,
}

impl DemoListener {
    fn unlocked(&self, panel: &PasscodePanel, message: &str) {
        self.status.set_text(message);

        let panel = panel.clone();
        let status = self.status.clone();
        glib::timeout_add_local_once(UNLOCKED_RESET_DELAY, move || {
            panel.clear_input();
            status.set_text(PROMPT);
        });
    }
}

impl PasscodeListener<PasscodePanel> for DemoListener {
    fn input_complete(&self, panel: &PasscodePanel, input: &str) {
        if input == self.passcode {
            info!("Passcode accepted");
            self.unlocked(panel, "Unlocked");
        } else {
            info!("Passcode rejected");
            self.status.set_text("Wrong passcode");
            panel.wrong_passcode();
        }
    }

    fn biometric_complete(
        &self,
        panel: &PasscodePanel,
        success: bool,
        error: Option<&BiometricError>,
    ) {
        match (success, error) {
            (true, _) => self.unlocked(panel, "Unlocked with fingerprint"),
            (false, Some(e)) => self.status.set_text(&format!("Fingerprint not accepted: {}", e)),
            (false, None) => self.status.set_text("Fingerprint not accepted"),
        }
    }
}

/// Initialize and set up main application UI.
pub fn setup_application_ui(app: &Application, args: &Args, style: Style, rt: Arc<Runtime>) {
    info!("Initializing application components");
    setup_resources_and_theme();

    let vibrancy = style.vibrancy;
    let service: Arc<dyn BiometricService> = Arc::new(FprintdService::default());
    let panel = match PasscodePanel::new(usize::from(args.length), style, service, rt) {
        Ok(panel) => panel,
        Err(e) => {
            error!("Failed to create passcode panel: {}", e);
            app.quit();
            return;
        }
    };
    panel.set_biometric_reason(args.reason.as_str());
    panel.set_biometric_enabled(!args.no_biometric);

    let status = Label::new(Some(PROMPT));
    status.add_css_class("pinpad-status");

    let listener = Rc::new(DemoListener {
        passcode: args.passcode.clone(),
        status: status.clone(),
    });
    panel.set_listener(&listener);

    let content = GtkBox::new(Orientation::Vertical, 0);
    content.set_valign(Align::Center);
    content.append(&status);
    content.append(panel.widget());
    content.append(&create_options(&panel, vibrancy, !args.no_biometric));

    let window = ApplicationWindow::builder()
        .application(app)
        .title(app_info::NAME)
        .icon_name("fingerprint-symbolic")
        .child(&content)
        .build();

    // The panel only holds the listener weakly; the window keeps it alive.
    window.connect_close_request(move |_| {
        info!("Closing {}", app_info::NAME);
        let _ = &listener;
        glib::Propagation::Proceed
    });

    window.present();
    panel.widget().grab_focus();
    info!("{} startup complete", app_info::NAME);
}

/// Toggles for the palette and the fingerprint control.
fn create_options(panel: &PasscodePanel, vibrancy: bool, biometric: bool) -> GtkBox {
    let vibrant = CheckButton::with_label("Vibrant");
    vibrant.set_active(vibrancy);
    let panel_clone = panel.clone();
    vibrant.connect_toggled(move |button| panel_clone.set_vibrancy(button.is_active()));

    let fingerprint = CheckButton::with_label("Fingerprint");
    fingerprint.set_active(biometric);
    let panel_clone = panel.clone();
    fingerprint.connect_toggled(move |button| {
        panel_clone.set_biometric_enabled(button.is_active())
    });

    let options = GtkBox::new(Orientation::Horizontal, 12);
    options.set_halign(Align::Center);
    options.set_margin_top(12);
    options.set_margin_bottom(12);
    options.append(&vibrant);
    options.append(&fingerprint);
    options
}

/// Set up resources and theme.
fn setup_resources_and_theme() {
    gio::resources_register_include!("io.github.pinpad.gresource")
        .expect("Failed to register gresources");

    if let Some(display) = gtk4::gdk::Display::default() {
        info!("Setting up UI theme and styling");
        let css_provider = CssProvider::new();
        css_provider.load_from_resource(&format!("{}/css/style.css", app_info::RESOURCE_PREFIX));
        gtk4::style_context_add_provider_for_display(
            &display,
            &css_provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("No default display found - UI theming may not work properly");
    }
}
