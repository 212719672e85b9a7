//! telekin: first-person object interaction for 3D physics scenes.
//!
//! Lets an agent target, highlight, grab, carry, throw and place
//! physical objects using ray-based targeting and constraint-based
//! holding, plus a surface-snapped placement preview for spawning
//! inventory items.
//!
//! # Modules
//!
//! - [`interaction`] - The mode state machine and its components:
//!   targeting, highlighting, holding, placement
//! - [`scene`] - Node arena, rigid bodies, constraints, ray queries
//! - [`input`] - Viewpoint pose, cursor ray and edge-detected actions
//! - [`inventory`] / [`catalog`] / [`ui`] - Collaborator seams:
//!   quantity ledger, prototype registry, crosshair prompt
//! - [`config`] - Tunables with YAML loading
//!
//! The host owns the loop: feed [`input::InputState`], step physics,
//! then call [`interaction::InteractionSystem::tick`] once per frame.

pub mod catalog;
pub mod config;
pub mod config_io;
pub mod input;
pub mod interaction;
pub mod inventory;
pub mod scene;
pub mod ui;

pub use config::InteractionConfig;
pub use input::InputState;
pub use interaction::{InteractionSystem, ModeKind};
pub use scene::{MaterialId, NodeId, Scene, SceneNode};
