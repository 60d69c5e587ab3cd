use clap::Parser;
use gtk4::prelude::*;
use gtk4::{glib, Application};
use log::{error, info};

use pinpad_gui::config::{self, app_info};
use pinpad_gui::ui;
use std::sync::Arc;

fn main() -> glib::ExitCode {
    let args = config::Args::parse();

    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(args.log_level())
        .init()
    {
        eprintln!("Failed to initialize logger: {}", e);
    }

    info!("Starting {} v{}", app_info::NAME, app_info::VERSION);
    info!("Application ID: {}", app_info::ID);

    if let Err(e) = args.validate() {
        error!("Invalid arguments: {}", e);
        eprintln!("{}: {}", app_info::NAME, e);
        return glib::ExitCode::FAILURE;
    }

    let style = match args.resolve_style() {
        Ok(style) => style,
        Err(e) => {
            error!("Failed to load style: {}", e);
            eprintln!("{}: {}", app_info::NAME, e);
            return glib::ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => Arc::new(rt),
        Err(e) => {
            error!("Failed to build Tokio runtime: {}", e);
            return glib::ExitCode::FAILURE;
        }
    };
    info!("Tokio async runtime initialized");

    let app = Application::builder()
        .application_id(app_info::ID)
        .build();

    app.connect_activate(move |app| {
        ui::setup_application_ui(app, &args, style.clone(), Arc::clone(&rt));
    });

    // Our own arguments were consumed by clap; GTK only sees the program name.
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| app_info::NAME.to_string());
    app.run_with_args(&[program])
}
