use std::{collections::HashMap, sync::Arc};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::config_io;
use crate::scene::{ColliderShape, MaterialId, LAYER_DEFAULT};

const ITEMS_FILE: &str = "items.yaml";

fn def_layers() -> u32 {
    LAYER_DEFAULT
}

fn def_mass() -> f32 {
    1.0
}

/// The spawnable form of a catalog item: everything needed to stamp a
/// physical instance (or a stripped-down preview) into a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prototype {
    pub name: Arc<str>,

    #[serde(default)]
    pub tag: Option<Arc<str>>,

    #[serde(default = "def_layers")]
    pub layers: u32,

    pub collider: ColliderShape,

    #[serde(default = "def_mass")]
    pub mass: f32,

    #[serde(default)]
    pub materials: Vec<MaterialId>,
}

/// Item-id to spawnable-prototype lookup. The registry itself lives
/// outside this subsystem; this is the seam it is called through.
pub trait ItemCatalog {
    fn prototype(&self, item_id: &str) -> Option<&Prototype>;
}

/// In-memory catalog, loadable from a YAML map of item id to prototype.
#[derive(Default)]
pub struct StaticCatalog {
    items: HashMap<Arc<str>, Prototype>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item_id: &str, prototype: Prototype) {
        self.items.insert(item_id.into(), prototype);
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let items: HashMap<Arc<str>, Prototype> = serde_yaml::from_str(yaml)?;
        log::info!("Loaded {} item prototypes", items.len());
        Ok(Self { items })
    }

    pub fn load_from_config() -> anyhow::Result<Self> {
        let Some(yaml) = config_io::load(ITEMS_FILE) else {
            bail!("Could not read file at {}", ITEMS_FILE);
        };
        Self::from_yaml(&yaml)
    }
}

impl ItemCatalog for StaticCatalog {
    fn prototype(&self, item_id: &str) -> Option<&Prototype> {
        let prototype = self.items.get(item_id);
        if prototype.is_none() {
            log::debug!("no prototype registered for item {}", item_id);
        }
        prototype
    }
}
