/// Global keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    CloseModal,
    /// Take a snapshot; the key's default (page scroll) must be suppressed.
    Capture,
}

pub fn shortcut_for(key: &str, capturing: bool) -> Option<Shortcut> {
    match key {
        "Escape" => Some(Shortcut::CloseModal),
        " " if capturing => Some(Shortcut::Capture),
        _ => None,
    }
}
