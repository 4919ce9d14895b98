//! Terminal key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::Action;

/// Translate a key press into a session action; unbound keys yield `None`.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if let KeyCode::Enter = key.code {
        return Some(if shift {
            Action::ConfirmInput { keep_open: ctrl }
        } else {
            Action::Confirm { keep_open: ctrl }
        });
    }

    if ctrl {
        return match key.code {
            KeyCode::Char(c) => ctrl_binding(c.to_ascii_lowercase()),
            KeyCode::Left => Some(Action::WordLeft),
            KeyCode::Right => Some(Action::WordRight),
            _ => None,
        };
    }

    if alt {
        return match key.code {
            KeyCode::Char('b') => Some(Action::WordLeft),
            KeyCode::Char('f') => Some(Action::WordRight),
            KeyCode::Char('g') => Some(Action::Home),
            KeyCode::Char('G') => Some(Action::End),
            KeyCode::Char('h') => Some(Action::MovePrev),
            KeyCode::Char('j') => Some(Action::PageNext),
            KeyCode::Char('k') => Some(Action::PagePrev),
            KeyCode::Char('l') => Some(Action::MoveNext),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Home => Some(Action::Home),
        KeyCode::End => Some(Action::End),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        KeyCode::Up | KeyCode::BackTab => Some(Action::MovePrev),
        KeyCode::Down => Some(Action::MoveNext),
        KeyCode::PageUp => Some(Action::PagePrev),
        KeyCode::PageDown => Some(Action::PageNext),
        KeyCode::Tab => Some(Action::Complete),
        KeyCode::Backspace => Some(Action::DeleteBackward),
        KeyCode::Delete => Some(Action::DeleteForward),
        KeyCode::Char(c) => {
            let mut utf8 = [0u8; 4];
            Some(Action::Insert(c.encode_utf8(&mut utf8).as_bytes().to_vec()))
        }
        _ => None,
    }
}

fn ctrl_binding(c: char) -> Option<Action> {
    let action = match c {
        'a' => Action::Home,
        'b' => Action::Left,
        'c' | 'g' | '[' => Action::Cancel,
        'd' => Action::DeleteForward,
        'e' => Action::End,
        'f' => Action::Right,
        'h' => Action::DeleteBackward,
        'i' => Action::Complete,
        'j' | 'm' => Action::Confirm { keep_open: false },
        'k' => Action::KillToEnd,
        'n' => Action::MoveNext,
        'p' => Action::MovePrev,
        'u' => Action::KillToStart,
        'w' => Action::DeleteWordBackward,
        _ => return None,
    };
    Some(action)
}
