//! Keyboard state fed to the camera

use std::collections::HashSet;

/// Keys the scene reacts to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Any other key, by name
    Named(String),
}

impl Key {
    /// Parse a key name such as `"left"` or `"page up"`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "up" => Self::Up,
            "down" => Self::Down,
            "page up" | "page_up" | "pageup" => Self::PageUp,
            "page down" | "page_down" | "pagedown" => Self::PageDown,
            other => Self::Named(other.to_string()),
        }
    }
}

/// Set of keys currently held down
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Key>,
}

impl KeyState {
    /// Create an empty key state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Mark a key as released
    pub fn release(&mut self, key: &Key) {
        self.held.remove(key);
    }

    /// Whether a key is held
    pub fn is_down(&self, key: &Key) -> bool {
        self.held.contains(key)
    }

    /// `+1` if only `positive` is held, `-1` if only `negative` is, else `0`
    pub fn axis(&self, negative: &Key, positive: &Key) -> f32 {
        match (self.is_down(negative), self.is_down(positive)) {
            (false, true) => 1.0,
            (true, false) => -1.0,
            _ => 0.0,
        }
    }
}
