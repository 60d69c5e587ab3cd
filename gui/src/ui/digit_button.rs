//! Circular keypad button drawn with cairo.

use crate::ui::paint;
use gtk4::prelude::*;
use gtk4::{
    cairo, glib, Align, Box as GtkBox, DrawingArea, GestureClick, Label, Orientation, Overlay,
};
use log::{trace, warn};
use pinpad_core::geometry::CircleGeometry;
use pinpad_core::{DigitKey, Style};

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};
use std::time::Instant;

type TapHandler = Rc<dyn Fn(char)>;

struct Inner {
    root: Overlay,
    area: DrawingArea,
    digit_label: Label,
    symbols_label: Label,
    key: RefCell<DigitKey>,
    style: RefCell<Rc<Style>>,
    on_tap: RefCell<Option<TapHandler>>,
    ticking: Cell<bool>,
}

/// One keypad key. Cloning shares the same widget.
#[derive(Clone)]
pub struct DigitButton {
    inner: Rc<Inner>,
}

impl DigitButton {
    pub fn new(style: Rc<Style>) -> Self {
        let area = DrawingArea::new();
        area.set_hexpand(true);
        area.set_vexpand(true);

        let digit_label = Label::new(None);
        digit_label.add_css_class("pinpad-key-digit");
        let symbols_label = Label::new(None);
        symbols_label.add_css_class("pinpad-key-symbols");

        let labels = GtkBox::new(Orientation::Vertical, 0);
        labels.set_halign(Align::Center);
        labels.set_valign(Align::Center);
        labels.set_can_target(false);
        labels.append(&digit_label);
        labels.append(&symbols_label);

        let root = Overlay::new();
        root.set_child(Some(&area));
        root.add_overlay(&labels);

        let button = Self {
            inner: Rc::new(Inner {
                root,
                area,
                digit_label,
                symbols_label,
                key: RefCell::new(DigitKey::new(' ', "")),
                style: RefCell::new(style),
                on_tap: RefCell::new(None),
                ticking: Cell::new(false),
            }),
        };
        button.connect_drawing();
        button.connect_gestures();
        button
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn widget(&self) -> &Overlay {
        &self.inner.root
    }

    pub fn value(&self) -> char {
        self.inner.key.borrow().value()
    }

    /// Called with the key's digit on every press.
    pub fn connect_tapped<F: Fn(char) + 'static>(&self, f: F) {
        *self.inner.on_tap.borrow_mut() = Some(Rc::new(f));
    }

    /// Replace the digit, sub-label and style. Only redraws.
    pub fn configure(&self, value: char, sub_label: &str, style: Rc<Style>) {
        self.inner.key.borrow_mut().configure(value, sub_label);
        self.set_style(style);
    }

    pub fn set_style(&self, style: Rc<Style>) {
        *self.inner.style.borrow_mut() = style;
        self.refresh_labels();
        self.inner.area.queue_draw();
    }

    /// Highlight the key and report the tap.
    pub fn press_start(&self) {
        let value = self.inner.key.borrow_mut().press_start(Instant::now());
        trace!("Key {} pressed", value);
        self.animate();

        let handler = self.inner.on_tap.borrow().clone();
        if let Some(handler) = handler {
            handler(value);
        }
    }

    /// Return to normal colors once the press animation has played.
    pub fn press_end(&self) {
        self.inner.key.borrow_mut().press_end(Instant::now());
        self.animate();
    }

    fn connect_drawing(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.area.set_draw_func(move |_, cr, width, height| {
            if let Some(button) = Self::upgrade(&weak) {
                button.draw(cr, f64::from(width), f64::from(height));
            }
        });

        let weak = Rc::downgrade(&self.inner);
        self.inner.area.connect_resize(move |_, _, _| {
            if let Some(button) = Self::upgrade(&weak) {
                button.refresh_labels();
            }
        });
    }

    fn connect_gestures(&self) {
        let gesture = GestureClick::new();

        let weak = Rc::downgrade(&self.inner);
        gesture.connect_pressed(move |_, _, x, y| {
            let Some(button) = Self::upgrade(&weak) else {
                return;
            };
            if button.geometry().contains(x, y) {
                button.press_start();
            }
        });

        let weak = Rc::downgrade(&self.inner);
        gesture.connect_released(move |_, _, _, _| {
            if let Some(button) = Self::upgrade(&weak) {
                button.press_end();
            }
        });

        // Pointer left or the grab was taken: treat as a release.
        let weak = Rc::downgrade(&self.inner);
        gesture.connect_stopped(move |_| {
            if let Some(button) = Self::upgrade(&weak) {
                button.press_end();
            }
        });

        self.inner.root.add_controller(gesture);
    }

    fn geometry(&self) -> CircleGeometry {
        CircleGeometry::for_bounds(
            f64::from(self.inner.area.width()),
            f64::from(self.inner.area.height()),
        )
    }

    /// Drive the key animation from the frame clock until it settles.
    fn animate(&self) {
        self.refresh_labels();
        self.inner.area.queue_draw();
        if self.inner.ticking.replace(true) {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.area.add_tick_callback(move |_, _| {
            let Some(button) = Self::upgrade(&weak) else {
                return glib::ControlFlow::Break;
            };
            let running = button.inner.key.borrow_mut().tick(Instant::now());
            button.refresh_labels();
            button.inner.area.queue_draw();
            if running {
                glib::ControlFlow::Continue
            } else {
                button.inner.ticking.set(false);
                glib::ControlFlow::Break
            }
        });
    }

    fn refresh_labels(&self) {
        let key = self.inner.key.borrow();
        let style = self.inner.style.borrow();
        let geometry = self.geometry();
        let palette = &style.palette;
        let color = palette
            .key_text
            .mix(palette.key_text_highlighted, key.highlight(Instant::now()));

        self.inner.digit_label.set_text(&key.value().to_string());
        self.inner.digit_label.set_attributes(Some(&paint::label_attributes(
            &style.digit_font,
            geometry.digit_font_size,
            color,
        )));

        let sub_label = key.sub_label();
        self.inner.symbols_label.set_visible(!sub_label.is_empty());
        self.inner.symbols_label.set_text(sub_label);
        self.inner.symbols_label.set_attributes(Some(&paint::label_attributes(
            &style.symbols_font,
            geometry.symbols_font_size,
            color,
        )));
    }

    fn draw(&self, cr: &cairo::Context, width: f64, height: f64) {
        let geometry = CircleGeometry::for_bounds(width, height);
        let level = self.inner.key.borrow().highlight(Instant::now());
        let style = self.inner.style.borrow();
        let palette = &style.palette;

        cr.arc(
            geometry.center_x,
            geometry.center_y,
            geometry.stroke_radius(),
            0.0,
            TAU,
        );
        paint::set_source(cr, palette.key_background);
        if let Err(e) = cr.fill_preserve() {
            warn!("Failed to fill key background: {}", e);
        }

        paint::set_source(
            cr,
            palette.key_border.mix(palette.key_border_highlighted, level),
        );
        cr.set_line_width(geometry.border_width);
        if let Err(e) = cr.stroke() {
            warn!("Failed to stroke key border: {}", e);
        }
    }
}
