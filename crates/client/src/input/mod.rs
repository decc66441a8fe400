// Keyboard and on-screen control mapping
use board::Action;

/// Id of the chat input; game keys are ignored while it has focus.
pub const CHAT_INPUT_ID: &str = "console";

/// Map a `KeyboardEvent.key` value to a game action.
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        " " | "Spacebar" => Some(Action::Bomb),
        "ArrowLeft" | "Left" => Some(Action::Left),
        "ArrowUp" | "Up" => Some(Action::Up),
        "ArrowRight" | "Right" => Some(Action::Right),
        "ArrowDown" | "Down" => Some(Action::Down),
        _ => None,
    }
}

/// What a keyboard event does. Holding a key auto-repeats `keydown`, so
/// actions go out on `keyup`; `keydown` only claims the key so the page
/// does not scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEffect {
    Ignore,
    Claim,
    Send(Action),
}

pub fn key_effect(event_type: &str, key: &str) -> KeyEffect {
    match (event_type, action_for_key(key)) {
        ("keydown", Some(_)) => KeyEffect::Claim,
        ("keyup", Some(action)) => KeyEffect::Send(action),
        _ => KeyEffect::Ignore,
    }
}

/// DOM id of the on-screen button for an action.
pub fn control_id(action: Action) -> String {
    format!("control-{}", action.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_and_space() {
        assert_eq!(action_for_key(" "), Some(Action::Bomb));
        assert_eq!(action_for_key("ArrowLeft"), Some(Action::Left));
        assert_eq!(action_for_key("ArrowUp"), Some(Action::Up));
        assert_eq!(action_for_key("ArrowRight"), Some(Action::Right));
        assert_eq!(action_for_key("ArrowDown"), Some(Action::Down));
    }

    #[test]
    fn test_other_keys_ignored() {
        for key in ["Enter", "w", "a", "Escape", ""] {
            assert_eq!(action_for_key(key), None);
        }
    }

    #[test]
    fn test_actions_sent_on_release_only() {
        // a held key repeats keydown; none of those may send
        for _ in 0..10 {
            assert_eq!(key_effect("keydown", "ArrowUp"), KeyEffect::Claim);
        }
        assert_eq!(key_effect("keyup", "ArrowUp"), KeyEffect::Send(Action::Up));
        assert_eq!(key_effect("keyup", " "), KeyEffect::Send(Action::Bomb));
        assert_eq!(key_effect("keydown", "a"), KeyEffect::Ignore);
        assert_eq!(key_effect("keyup", "Enter"), KeyEffect::Ignore);
    }

    #[test]
    fn test_control_ids() {
        let ids: Vec<String> = Action::ALL.into_iter().map(control_id).collect();
        assert_eq!(
            ids,
            ["control-left", "control-right", "control-up", "control-down", "control-bomb"]
        );
    }
}
