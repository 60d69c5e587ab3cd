//! Conversions from core styles to cairo, pango and CSS.

use gtk4::{cairo, pango};
use pinpad_core::{Color, Style};

pub fn set_source(cr: &cairo::Context, color: Color) {
    let (r, g, b, a) = color.to_f64();
    cr.set_source_rgba(r, g, b, a);
}

/// Font family, absolute pixel size and foreground color for a label.
pub fn label_attributes(family: &str, size_px: f64, color: Color) -> pango::AttrList {
    let attrs = pango::AttrList::new();
    attrs.insert(pango::AttrString::new_family(family));
    let size = (size_px.max(1.0) * f64::from(pango::SCALE)).round() as i32;
    attrs.insert(pango::AttrSize::new_size_absolute(size));
    attrs.insert(pango::AttrColor::new_foreground(
        u16::from(color.red) * 257,
        u16::from(color.green) * 257,
        u16::from(color.blue) * 257,
    ));
    attrs
}

fn css_color(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        color.red,
        color.green,
        color.blue,
        f64::from(color.alpha) / 255.0
    )
}

/// Palette rules for the controls of the panel named `panel_name`.
pub fn panel_css(panel_name: &str, style: &Style) -> String {
    let palette = &style.palette;
    format!(
        "#{name} .pinpad-delete {{ color: {delete}; }}\n\
         #{name} .pinpad-biometric {{ color: {biometric}; }}\n",
        name = panel_name,
        delete = css_color(palette.delete_label),
        biometric = css_color(palette.biometric_tint),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color::WHITE), "rgba(255, 255, 255, 1.000)");
        assert_eq!(css_color(Color::CLEAR), "rgba(0, 0, 0, 0.000)");
    }

    #[test]
    fn test_panel_css_follows_palette() {
        let standard = Style::default();
        let css = panel_css("pinpad-panel-3", &standard);
        assert!(css.contains(
            "#pinpad-panel-3 .pinpad-delete { color: rgba(94, 162, 255, 1.000); }"
        ));

        let vibrant = standard.with_vibrancy(true);
        let css = panel_css("pinpad-panel-3", &vibrant);
        assert!(css.contains(
            "#pinpad-panel-3 .pinpad-biometric { color: rgba(255, 255, 255, 1.000); }"
        ));
    }
}
