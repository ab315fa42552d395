//! Key bindings for the editor commands.
//!
//! The host listens to the keyboard and forwards `KeyboardEvent.key` plus
//! modifier flags; [`ShortcutMap::resolve`] turns that into an action and
//! [`Editor::run_shortcut`] performs it.

use crate::adapter::SceneAdapter;
use crate::editor::Editor;
use crate::error::EditorResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    SelectAll,
    Deselect,
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    SendBackward,
    BringForward,
}

impl ShortcutAction {
    /// Name reported to the UI.
    pub fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Delete => "delete",
            Self::SelectAll => "selectAll",
            Self::Deselect => "deselect",
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
            Self::ZoomToFit => "zoomToFit",
            Self::SendBackward => "sendBackward",
            Self::BringForward => "bringForward",
        }
    }
}

/// Modifier state a binding requires. `Cmd` is Ctrl, or Meta on macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chord {
    Plain,
    Cmd,
    CmdShift,
}

struct Binding {
    chord: Chord,
    keys: &'static [&'static str],
    action: ShortcutAction,
}

const BINDINGS: &[Binding] = &[
    Binding {
        chord: Chord::CmdShift,
        keys: &["z"],
        action: ShortcutAction::Redo,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["z"],
        action: ShortcutAction::Undo,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["y"],
        action: ShortcutAction::Redo,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["a"],
        action: ShortcutAction::SelectAll,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["c"],
        action: ShortcutAction::Copy,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["v"],
        action: ShortcutAction::Paste,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["=", "+"],
        action: ShortcutAction::ZoomIn,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["-"],
        action: ShortcutAction::ZoomOut,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["0"],
        action: ShortcutAction::ZoomToFit,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["["],
        action: ShortcutAction::SendBackward,
    },
    Binding {
        chord: Chord::Cmd,
        keys: &["]"],
        action: ShortcutAction::BringForward,
    },
    Binding {
        chord: Chord::Plain,
        keys: &["delete", "backspace"],
        action: ShortcutAction::Delete,
    },
    Binding {
        chord: Chord::Plain,
        keys: &["escape"],
        action: ShortcutAction::Deselect,
    },
];

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event. Letter keys match in either case, since Shift
    /// reports `"Z"` for `z`. Alt is not used by any binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let chord = match (ctrl || meta, shift) {
            (true, true) => Chord::CmdShift,
            (true, false) => Chord::Cmd,
            (false, false) => Chord::Plain,
            (false, true) => return None,
        };
        BINDINGS
            .iter()
            .find(|b| b.chord == chord && b.keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
            .map(|b| b.action)
    }
}

impl<S: SceneAdapter> Editor<S> {
    /// Run a resolved shortcut. Returns whether it did anything.
    pub fn run_shortcut(&mut self, action: ShortcutAction) -> EditorResult<bool> {
        Ok(match action {
            ShortcutAction::Undo => self.undo()?,
            ShortcutAction::Redo => self.redo()?,
            ShortcutAction::Copy => self.copy()?,
            ShortcutAction::Paste => self.paste()? > 0,
            ShortcutAction::Delete => self.delete()? > 0,
            ShortcutAction::SelectAll => self.select_all()? > 0,
            ShortcutAction::Deselect => {
                let had_selection = !self.selection().is_empty();
                self.deselect()?;
                had_selection
            }
            ShortcutAction::ZoomIn => {
                let before = self.zoom();
                self.zoom_in() != before
            }
            ShortcutAction::ZoomOut => {
                let before = self.zoom();
                self.zoom_out() != before
            }
            ShortcutAction::ZoomToFit => self.auto_zoom(),
            ShortcutAction::SendBackward => self.send_backwards()?,
            ShortcutAction::BringForward => self.bring_forward()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// (key, ctrl, shift, meta) → expected action
    const CASES: &[(&str, bool, bool, bool, Option<ShortcutAction>)] = &[
        ("z", false, false, true, Some(ShortcutAction::Undo)),
        ("z", true, false, false, Some(ShortcutAction::Undo)),
        ("Z", false, true, true, Some(ShortcutAction::Redo)),
        ("y", true, false, false, Some(ShortcutAction::Redo)),
        ("c", true, false, false, Some(ShortcutAction::Copy)),
        ("v", false, false, true, Some(ShortcutAction::Paste)),
        ("Backspace", false, false, false, Some(ShortcutAction::Delete)),
        ("Delete", false, false, false, Some(ShortcutAction::Delete)),
        ("Escape", false, false, false, Some(ShortcutAction::Deselect)),
        ("+", true, false, false, Some(ShortcutAction::ZoomIn)),
        ("0", true, false, false, Some(ShortcutAction::ZoomToFit)),
        ("]", false, false, true, Some(ShortcutAction::BringForward)),
        ("q", false, false, false, None),
        ("a", false, true, false, None),
        ("c", true, true, false, None),
        ("z", false, false, false, None),
    ];

    #[test]
    fn bindings_resolve() {
        for &(key, ctrl, shift, meta, expected) in CASES {
            assert_eq!(
                ShortcutMap::resolve(key, ctrl, shift, false, meta),
                expected,
                "{key} ctrl={ctrl} shift={shift} meta={meta}"
            );
        }
    }

    #[test]
    fn alt_is_ignored() {
        assert_eq!(
            ShortcutMap::resolve("a", true, false, true, false),
            Some(ShortcutAction::SelectAll)
        );
    }

    #[test]
    fn names_are_camel_case() {
        assert_eq!(ShortcutAction::SelectAll.name(), "selectAll");
        assert_eq!(ShortcutAction::ZoomToFit.name(), "zoomToFit");
    }
}
