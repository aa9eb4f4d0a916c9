//! Input handling.
//!
//! Windowing and raw devices live outside this crate. What arrives here is a
//! key name and whether it went down or up; bindings turn that into a
//! [`Command`] for the app to apply.
//!
//! Walking and panning are held state: a key adds its direction on press
//! and takes it back on release. Only keys seen going down are taken back,
//! so the sums survive level loads and never drift.

use std::collections::{HashMap, HashSet};

use maze_shared::math::{Vec2, Vec3};

/// Something a key can do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    /// Add to the held walk direction, in player space.
    Walk(Vec3),
    /// Add to the camera pan rate.
    Pan(Vec2),
    Jump,
    /// Flip a boolean console variable.
    Toggle(String),
}

/// What a key does on press and on release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub down: Option<Command>,
    pub up: Option<Command>,
}

/// Key name to command table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    keys: HashMap<String, Binding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind("escape", Some(Command::Quit), None);
        b.bind("q", Some(Command::Quit), None);

        b.bind_held_pan("i", Vec2::new(0.0, 1.0));
        b.bind_held_pan("k", Vec2::new(0.0, -1.0));
        b.bind_held_pan("j", Vec2::new(-1.0, 0.0));
        b.bind_held_pan("l", Vec2::new(1.0, 0.0));

        b.bind_held_walk("w", Vec3::X);
        b.bind_held_walk("s", Vec3::NEG_X);
        b.bind_held_walk("a", Vec3::Y);
        b.bind_held_walk("d", Vec3::NEG_Y);

        b.bind("space", Some(Command::Jump), None);
        b.bind("p", Some(Command::Toggle("pause".into())), None);
        b.bind("f2", Some(Command::Toggle("wireframe".into())), None);
        b.bind("f3", Some(Command::Toggle("backface".into())), None);
        b.bind("f4", Some(Command::Toggle("lowfps".into())), None);
        b
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Binds `key` (case-insensitive), replacing any previous binding.
    pub fn bind(&mut self, key: &str, down: Option<Command>, up: Option<Command>) {
        self.keys.insert(key.to_ascii_lowercase(), Binding { down, up });
    }

    fn bind_held_walk(&mut self, key: &str, dir: Vec3) {
        self.bind(key, Some(Command::Walk(dir)), Some(Command::Walk(-dir)));
    }

    fn bind_held_pan(&mut self, key: &str, dir: Vec2) {
        self.bind(key, Some(Command::Pan(dir)), Some(Command::Pan(-dir)));
    }

    pub fn unbind(&mut self, key: &str) {
        self.keys.remove(&key.to_ascii_lowercase());
    }

    /// The command for a key event, if the key does anything on that edge.
    pub fn lookup(&self, key: &str, down: bool) -> Option<&Command> {
        let binding = self.keys.get(&key.to_ascii_lowercase())?;
        if down {
            binding.down.as_ref()
        } else {
            binding.up.as_ref()
        }
    }

    /// Bound key names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Input held across ticks.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    walk: Vec3,
    pan: Vec2,
}

impl InputState {
    /// Records `key` going down. False if it was already down.
    pub fn press(&mut self, key: &str) -> bool {
        self.held.insert(key.to_ascii_lowercase())
    }

    /// Records `key` coming up. False if we never saw it go down.
    pub fn release(&mut self, key: &str) -> bool {
        self.held.remove(&key.to_ascii_lowercase())
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_ascii_lowercase())
    }

    pub fn add_walk(&mut self, dir: Vec3) {
        self.walk += dir;
    }

    pub fn add_pan(&mut self, v: Vec2) {
        self.pan += v;
    }

    /// Walk direction to hand the player this tick.
    pub fn walking(&self) -> Vec3 {
        self.walk
    }

    /// Pan input currently held, before the camera's pan speed.
    pub fn panning(&self) -> Vec2 {
        self.pan
    }
}
