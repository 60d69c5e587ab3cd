//! Row of passcode indicator dots with the wrong-passcode shake.

use crate::ui::paint;
use gtk4::prelude::*;
use gtk4::{cairo, glib, DrawingArea};
use log::warn;
use pinpad_core::animation::Shake;
use pinpad_core::geometry::{self, MIN_BORDER_WIDTH};
use pinpad_core::Style;

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};
use std::time::Instant;

/// Peak horizontal displacement of the shake, in pixels.
const SHAKE_AMPLITUDE: f64 = 14.0;

const ROW_HEIGHT: i32 = 28;

struct Inner {
    area: DrawingArea,
    count: usize,
    filled: Cell<usize>,
    style: RefCell<Rc<Style>>,
    shake: Cell<Option<Shake>>,
    on_shaken: RefCell<Option<Box<dyn FnOnce()>>>,
    ticking: Cell<bool>,
}

#[derive(Clone)]
pub struct DotRow {
    inner: Rc<Inner>,
}

impl DotRow {
    pub fn new(count: usize, style: Rc<Style>) -> Self {
        let area = DrawingArea::new();
        area.set_content_height(ROW_HEIGHT);
        area.set_hexpand(true);
        area.add_css_class("pinpad-dots");

        let row = Self {
            inner: Rc::new(Inner {
                area,
                count,
                filled: Cell::new(0),
                style: RefCell::new(style),
                shake: Cell::new(None),
                on_shaken: RefCell::new(None),
                ticking: Cell::new(false),
            }),
        };

        let weak = Rc::downgrade(&row.inner);
        row.inner.area.set_draw_func(move |_, cr, width, height| {
            if let Some(row) = Self::upgrade(&weak) {
                row.draw(cr, f64::from(width), f64::from(height));
            }
        });
        row
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn widget(&self) -> &DrawingArea {
        &self.inner.area
    }

    pub fn set_filled(&self, filled: usize) {
        self.inner.filled.set(filled.min(self.inner.count));
        self.inner.area.queue_draw();
    }

    pub fn set_style(&self, style: Rc<Style>) {
        *self.inner.style.borrow_mut() = style;
        self.inner.area.queue_draw();
    }

    /// Shake the row and call `on_done` when it settles.
    ///
    /// A shake started while another is running restarts the motion; only the
    /// latest `on_done` runs.
    pub fn shake<F: FnOnce() + 'static>(&self, on_done: F) {
        self.inner
            .shake
            .set(Some(Shake::new(Instant::now(), SHAKE_AMPLITUDE)));
        *self.inner.on_shaken.borrow_mut() = Some(Box::new(on_done));
        self.inner.area.queue_draw();

        if self.inner.ticking.replace(true) {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.area.add_tick_callback(move |area, _| {
            let Some(row) = Self::upgrade(&weak) else {
                return glib::ControlFlow::Break;
            };
            area.queue_draw();

            let finished = row
                .inner
                .shake
                .get()
                .map_or(true, |shake| shake.is_finished(Instant::now()));
            if !finished {
                return glib::ControlFlow::Continue;
            }

            row.inner.shake.set(None);
            row.inner.ticking.set(false);
            let on_done = row.inner.on_shaken.borrow_mut().take();
            if let Some(on_done) = on_done {
                on_done();
            }
            glib::ControlFlow::Break
        });
    }

    fn draw(&self, cr: &cairo::Context, width: f64, height: f64) {
        let offset = self
            .inner
            .shake
            .get()
            .map_or(0.0, |shake| shake.offset_at(Instant::now()));
        let filled = self.inner.filled.get();
        let style = self.inner.style.borrow();
        let palette = &style.palette;

        for (i, dot) in geometry::dot_row(width, height, self.inner.count)
            .into_iter()
            .enumerate()
        {
            cr.new_path();
            cr.arc(dot.center_x + offset, dot.center_y, dot.radius, 0.0, TAU);
            let result = if i < filled {
                paint::set_source(cr, palette.dot_filled);
                cr.fill()
            } else {
                paint::set_source(cr, palette.dot_empty);
                cr.set_line_width(MIN_BORDER_WIDTH);
                cr.stroke()
            };
            if let Err(e) = result {
                warn!("Failed to draw indicator dot: {}", e);
            }
        }
    }
}
