//! Level descriptions.
//!
//! A level is a single JSON document describing the start pose, the fall
//! limit, the floors and walls, and the items placed in it. Item records
//! are tagged by their `"type"` field; an unknown tag fails the parse, so a
//! level with a misspelt item never loads half-built.
//!
//! # Usage
//! ```ignore
//! let levels = LevelDir::new("levels");
//! let desc = levels.load("start")?;
//! println!("{} floors, {} items", desc.floors.len(), desc.items.len());
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// A floor slab: corner plus two horizontal edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorDesc {
    pub pos: Vec3,
    pub edges: [Vec3; 2],
    #[serde(default, alias = "material")]
    pub colour: String,
    /// Standing on this floor wins the game.
    #[serde(default)]
    pub win: bool,
}

/// A wall: corner plus three edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallDesc {
    pub pos: Vec3,
    pub edges: [Vec3; 3],
    #[serde(default, alias = "material")]
    pub colour: String,
}

/// A placed item. The variant is selected by the `"type"` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemDesc {
    Key {
        pos: Vec3,
    },
    Portal {
        pos: Vec3,
        #[serde(default)]
        to: Option<String>,
        /// Degrees about the vertical axis.
        #[serde(default)]
        angle: f64,
    },
    LockedDoor {
        pos: Vec3,
        #[serde(default)]
        to: Option<String>,
        #[serde(default)]
        angle: f64,
    },
    Spike {
        pos: Vec3,
        #[serde(default)]
        angle: f64,
        #[serde(default = "default_spike_size")]
        size: f64,
    },
    Heart {
        pos: Vec3,
    },
}

fn default_spike_size() -> f64 {
    1.0
}

impl ItemDesc {
    pub fn pos(&self) -> Vec3 {
        match self {
            ItemDesc::Key { pos }
            | ItemDesc::Portal { pos, .. }
            | ItemDesc::LockedDoor { pos, .. }
            | ItemDesc::Spike { pos, .. }
            | ItemDesc::Heart { pos } => *pos,
        }
    }
}

/// One level, as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    pub start: Vec3,
    /// `(yaw, pitch)` in degrees.
    #[serde(default)]
    pub start_angle: [f64; 2],
    pub doom_z: f64,
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(default)]
    pub floors: Vec<FloorDesc>,
    #[serde(default)]
    pub walls: Vec<WallDesc>,
    #[serde(default)]
    pub items: Vec<ItemDesc>,
    /// Colour palette for the renderer, keyed by material tag.
    #[serde(default)]
    pub colours: HashMap<String, [f64; 3]>,
}

impl LevelDesc {
    /// Parses a level from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a level file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse {}", path.display()))
    }
}

/// Somewhere levels can be loaded from by id.
pub trait LevelSource {
    fn load(&self, id: &str) -> anyhow::Result<LevelDesc>;
}

/// Levels stored as `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct LevelDir {
    root: PathBuf,
}

impl LevelDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl LevelSource for LevelDir {
    fn load(&self, id: &str) -> anyhow::Result<LevelDesc> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.starts_with('.') {
            bail!("invalid level id: {:?}", id);
        }
        LevelDesc::load(self.path_for(id)).with_context(|| format!("load level {id}"))
    }
}

/// In-memory levels, mostly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct LevelSet {
    levels: HashMap<String, LevelDesc>,
}

impl LevelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, desc: LevelDesc) -> Self {
        self.insert(id, desc);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, desc: LevelDesc) {
        self.levels.insert(id.into(), desc);
    }
}

impl LevelSource for LevelSet {
    fn load(&self, id: &str) -> anyhow::Result<LevelDesc> {
        match self.levels.get(id) {
            Some(desc) => Ok(desc.clone()),
            None => bail!("unknown level: {}", id),
        }
    }
}
