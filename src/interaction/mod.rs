pub mod highlight;
pub mod hold;
pub mod placement;
pub mod target;

use std::sync::Arc;

use crate::catalog::ItemCatalog;
use crate::config::InteractionConfig;
use crate::input::InputState;
use crate::inventory::Inventory;
use crate::scene::{MaterialId, NodeId, Scene};
use crate::ui::PromptUi;

use self::highlight::HighlightTracker;
use self::hold::HoldState;
use self::placement::PlacementState;
use self::target::Target;

pub const PROMPT_PICK_UP: &str = "Pick Up";
pub const PROMPT_DROP: &str = "Drop";
pub const PROMPT_PLACE: &str = "Place / Cancel";

/// Which mode the state machine is in, without the per-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ModeKind {
    Idle,
    Holding,
    Placing,
}

/// Mode plus the transient state only valid inside it: anchor and
/// constraint handles exist only while Holding, the preview only while
/// Placing. Transitions replace the whole variant, so stale handles
/// cannot leak across modes.
enum InteractionMode {
    Idle { target: Option<Target> },
    Holding(HoldState),
    Placing(PlacementState),
}

impl InteractionMode {
    fn idle() -> Self {
        InteractionMode::Idle { target: None }
    }
}

/// The top-level driver. Each simulation step, `tick` runs exactly one
/// mode's behavior, reports the mode-appropriate crosshair prompt, and
/// performs at most one transition.
///
/// Call order per frame: feed `input`, run the host physics step
/// ([`Scene::step`] or the real thing), then `tick`. The follow anchor
/// must move after integration but before render poses are read.
pub struct InteractionSystem {
    pub config: InteractionConfig,
    pub input: InputState,
    highlight: HighlightTracker,
    mode: InteractionMode,
    preview_material: MaterialId,
    inventory: Box<dyn Inventory>,
    catalog: Box<dyn ItemCatalog>,
    ui: Box<dyn PromptUi>,
}

impl InteractionSystem {
    pub fn new(
        config: InteractionConfig,
        highlight_material: MaterialId,
        preview_material: MaterialId,
        inventory: Box<dyn Inventory>,
        catalog: Box<dyn ItemCatalog>,
        ui: Box<dyn PromptUi>,
    ) -> Self {
        Self {
            config,
            input: InputState::new(),
            highlight: HighlightTracker::new(highlight_material),
            mode: InteractionMode::idle(),
            preview_material,
            inventory,
            catalog,
            ui,
        }
    }

    pub fn mode(&self) -> ModeKind {
        match &self.mode {
            InteractionMode::Idle { .. } => ModeKind::Idle,
            InteractionMode::Holding(_) => ModeKind::Holding,
            InteractionMode::Placing(_) => ModeKind::Placing,
        }
    }

    /// The node currently held, while in Holding mode.
    pub fn held_object(&self) -> Option<NodeId> {
        match &self.mode {
            InteractionMode::Holding(hold) => Some(hold.held()),
            _ => None,
        }
    }

    /// The grab root under the crosshair, while in Idle mode.
    pub fn current_target(&self) -> Option<NodeId> {
        match &self.mode {
            InteractionMode::Idle { target } => target.as_ref().map(|t| t.root),
            _ => None,
        }
    }

    /// The preview node, while in Placing mode.
    pub fn placement_preview(&self) -> Option<NodeId> {
        match &self.mode {
            InteractionMode::Placing(placement) => Some(placement.preview()),
            _ => None,
        }
    }

    pub fn inventory(&self) -> &dyn Inventory {
        self.inventory.as_ref()
    }

    pub fn inventory_mut(&mut self) -> &mut dyn Inventory {
        self.inventory.as_mut()
    }

    pub fn catalog(&self) -> &dyn ItemCatalog {
        self.catalog.as_ref()
    }

    /// Run one simulation step's worth of interaction logic.
    pub fn tick(&mut self, scene: &mut Scene) {
        let mode = std::mem::replace(&mut self.mode, InteractionMode::idle());
        self.mode = match mode {
            InteractionMode::Idle { .. } => self.tick_idle(scene),
            InteractionMode::Holding(hold) => self.tick_holding(scene, hold),
            InteractionMode::Placing(placement) => self.tick_placing(scene, placement),
        };
        self.input.pre_update();
    }

    fn tick_idle(&mut self, scene: &mut Scene) -> InteractionMode {
        let target = target::resolve(scene, self.input.forward_ray(), &self.config);

        match &target {
            Some(t) => self.highlight.apply_if_changed(scene, &t.surfaces),
            None => self.highlight.apply_if_changed(scene, &[]),
        }

        match &target {
            Some(_) => self.ui.show_prompt(PROMPT_PICK_UP),
            None => self.ui.hide_prompt(),
        }

        if self.input.grab_pressed() {
            if let Some(t) = &target {
                match HoldState::begin(
                    scene,
                    &mut self.highlight,
                    &self.config,
                    &self.input.viewpoint,
                    t.root,
                ) {
                    Ok(hold) => return InteractionMode::Holding(hold),
                    Err(e) => log::warn!("grab failed: {}", e),
                }
            }
        }

        InteractionMode::Idle { target }
    }

    fn tick_holding(&mut self, scene: &mut Scene, hold: HoldState) -> InteractionMode {
        // the joint may have broken under load since last step; unwind
        // the same way an explicit drop does, minus the throw
        if !hold.intact(scene) {
            log::warn!("hold constraint severed, dropping");
            hold.release(
                scene,
                &mut self.highlight,
                &self.config,
                &self.input.viewpoint,
                false,
            );
            self.ui.hide_prompt();
            return InteractionMode::idle();
        }

        hold.update_anchor(scene, &self.input.viewpoint, &self.config);
        self.ui.show_prompt(PROMPT_DROP);

        // a second grab press is not a drop; only the release action is
        if self.input.release_pressed() {
            hold.release(
                scene,
                &mut self.highlight,
                &self.config,
                &self.input.viewpoint,
                true,
            );
            return InteractionMode::idle();
        }

        InteractionMode::Holding(hold)
    }

    fn tick_placing(&mut self, scene: &mut Scene, mut placement: PlacementState) -> InteractionMode {
        placement.update(scene, self.input.cursor_ray, &self.config);

        if placement.visible() {
            self.ui.show_prompt(PROMPT_PLACE);
        } else {
            self.ui.hide_prompt();
        }

        // grab input is deliberately ignored here; confirm never exits
        // on its own unless configured to
        if self.input.place_pressed() {
            let placed = placement.confirm(scene, self.catalog.as_ref(), self.inventory.as_mut());
            if placed && self.config.exit_after_place {
                placement.cancel(scene);
                self.ui.hide_prompt();
                return InteractionMode::idle();
            }
        }

        if self.input.cancel_pressed() {
            placement.cancel(scene);
            self.ui.hide_prompt();
            return InteractionMode::idle();
        }

        InteractionMode::Placing(placement)
    }

    /// Enter placement mode for `item_id` (the UI panel's item click).
    /// Ignored while holding; while already placing, the selection is
    /// switched and the old preview destroyed.
    pub fn enter_placement(&mut self, scene: &mut Scene, item_id: &str) {
        if matches!(self.mode, InteractionMode::Holding(_)) {
            log::debug!("placement request for {} ignored while holding", item_id);
            return;
        }
        if matches!(self.mode, InteractionMode::Placing(_)) {
            if let InteractionMode::Placing(old) =
                std::mem::replace(&mut self.mode, InteractionMode::idle())
            {
                old.cancel(scene);
            }
        }

        match PlacementState::begin(
            scene,
            self.catalog.as_ref(),
            self.preview_material,
            Arc::from(item_id),
        ) {
            Ok(placement) => self.mode = InteractionMode::Placing(placement),
            Err(e) => {
                // no mode change; the caller decides what to do about it
                log::error!("{}", e);
            }
        }
    }

    /// Leave placement mode (the panel's toggle-off). No-op otherwise.
    pub fn exit_placement(&mut self, scene: &mut Scene) {
        if matches!(self.mode, InteractionMode::Placing(_)) {
            if let InteractionMode::Placing(placement) =
                std::mem::replace(&mut self.mode, InteractionMode::idle())
            {
                placement.cancel(scene);
                self.ui.hide_prompt();
            }
        }
    }

    /// Fully unwind whatever the current mode owns: anchor, constraint,
    /// preview, highlights. Safe at any point, including right after a
    /// mode was entered.
    pub fn shutdown(&mut self, scene: &mut Scene) {
        match std::mem::replace(&mut self.mode, InteractionMode::idle()) {
            InteractionMode::Holding(hold) => hold.release(
                scene,
                &mut self.highlight,
                &self.config,
                &self.input.viewpoint,
                false,
            ),
            InteractionMode::Placing(placement) => placement.cancel(scene),
            InteractionMode::Idle { .. } => {}
        }
        self.highlight.clear_all(scene);
        self.ui.hide_prompt();
    }
}
