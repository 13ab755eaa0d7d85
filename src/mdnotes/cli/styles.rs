use console::Style;
use once_cell::sync::Lazy;

pub(super) struct Styles {
    pub folder: Style,
    pub note: Style,
    pub id: Style,
    pub heading: Style,
}

pub(super) static STYLES: Lazy<Styles> = Lazy::new(|| Styles {
    folder: Style::new().blue().bold(),
    note: Style::new(),
    id: Style::new().color256(245).italic(),
    heading: Style::new().bold(),
});
