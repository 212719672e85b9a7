use std::sync::Arc;

use log::error;
use serde::{Deserialize, Serialize};

use crate::config_io;

const CONFIG_FILE: &str = "interaction.yaml";

fn def_true() -> bool {
    true
}

fn def_false() -> bool {
    false
}

fn def_grab_distance() -> f32 {
    5.0
}

fn def_hold_distance() -> f32 {
    2.0
}

fn def_throw_force() -> f32 {
    10.0
}

fn def_held_drag() -> f32 {
    6.0
}

fn def_break_threshold() -> f32 {
    10000.0
}

fn def_placement_distance() -> f32 {
    3.0
}

fn def_all_layers() -> u32 {
    u32::MAX
}

fn def_grabbable_tag() -> Arc<str> {
    "grabbable".into()
}

#[derive(Deserialize, Serialize)]
pub struct InteractionConfig {
    /// Reach of the viewpoint-forward targeting ray.
    #[serde(default = "def_grab_distance")]
    pub max_grab_distance: f32,

    /// Distance at which the follow anchor floats in front of the viewpoint.
    #[serde(default = "def_hold_distance")]
    pub hold_distance: f32,

    #[serde(default = "def_throw_force")]
    pub throw_force: f32,

    /// Linear damping applied to a body while it is being carried.
    #[serde(default = "def_held_drag")]
    pub held_drag: f32,

    #[serde(default = "def_break_threshold")]
    pub break_force: f32,

    #[serde(default = "def_break_threshold")]
    pub break_torque: f32,

    /// Reach of the cursor ray while placing.
    #[serde(default = "def_placement_distance")]
    pub placement_distance: f32,

    #[serde(default = "def_all_layers")]
    pub grab_layers: u32,

    #[serde(default = "def_all_layers")]
    pub placement_layers: u32,

    /// Tag marking a node (or one of its ancestors) as a grab root.
    #[serde(default = "def_grabbable_tag")]
    pub grabbable_tag: Arc<str>,

    /// When false, fall back to the nearest ancestor owning a physics body
    /// instead of requiring a tag match.
    #[serde(default = "def_true")]
    pub require_tag: bool,

    /// When true, a confirmed placement also leaves placement mode.
    #[serde(default = "def_false")]
    pub exit_after_place: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            max_grab_distance: def_grab_distance(),
            hold_distance: def_hold_distance(),
            throw_force: def_throw_force(),
            held_drag: def_held_drag(),
            break_force: def_break_threshold(),
            break_torque: def_break_threshold(),
            placement_distance: def_placement_distance(),
            grab_layers: def_all_layers(),
            placement_layers: def_all_layers(),
            grabbable_tag: def_grabbable_tag(),
            require_tag: def_true(),
            exit_after_place: def_false(),
        }
    }
}

impl InteractionConfig {
    fn sanitize_range(name: &str, val: f32, from: f32, to: f32) {
        if !val.is_normal() || val < from || val > to {
            panic!(
                "InteractionConfig: {} needs to be between {} and {}",
                name, from, to
            );
        }
    }

    pub fn load_from_disk() -> InteractionConfig {
        let config = load_interaction();
        config.post_load();
        config
    }

    fn post_load(&self) {
        InteractionConfig::sanitize_range("max_grab_distance", self.max_grab_distance, 0.05, 500.0);
        InteractionConfig::sanitize_range("hold_distance", self.hold_distance, 0.05, 100.0);
        InteractionConfig::sanitize_range(
            "placement_distance",
            self.placement_distance,
            0.05,
            500.0,
        );
    }
}

fn load_interaction() -> InteractionConfig {
    if let Some(yaml) = config_io::load(CONFIG_FILE) {
        match serde_yaml::from_str::<InteractionConfig>(&yaml) {
            Ok(config) => return config,
            Err(e) => {
                error!("Failed to parse {}, falling back to defaults.", CONFIG_FILE);
                error!("{}", e);
            }
        }
    }
    InteractionConfig::default()
}
