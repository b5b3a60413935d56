//! Pointer interaction state machine
//!
//! All pointer/selection bookkeeping lives in one explicit state object with
//! pure transitions, so the drag/click tie-break and the highlight rules can
//! be tested without a window or a render loop. The owning controller feeds
//! it pointer events and applies the resulting tint changes.

use glam::Vec2;

/// Maximum pointer travel between press and release for the release to count
/// as a click. Enforced identically on release and on the click event.
pub const CLICK_THRESHOLD_PX: f32 = 5.0;

/// The current entity selection, mutually exclusive with member selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectedEntity {
    #[default]
    None,
    Panel(String),
    Sensor(String),
}

/// Outcome of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// The pointer stayed within the click threshold: treat as a selection
    /// attempt at the press position.
    Click(Vec2),
    /// The pointer travelled further: this was a drag ending, not a click.
    DragEnd,
}

/// Interaction state owned by the viewport controller. Ephemeral; never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub hovered_member: Option<String>,
    pub selected_member: Option<String>,
    pub selected_entity: SelectedEntity,
    pub dragging: bool,
    pub auto_rotate: bool,
    pointer_down: Option<Vec2>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            hovered_member: None,
            selected_member: None,
            selected_entity: SelectedEntity::None,
            dragging: false,
            auto_rotate: true,
            pointer_down: None,
        }
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed: anchor the click test and stop auto-rotation.
    pub fn pointer_pressed(&mut self, position: Vec2) {
        self.pointer_down = Some(position);
        self.dragging = false;
        self.auto_rotate = false;
    }

    /// Pointer moved while pressed. Returns true once the motion exceeds the
    /// click threshold, i.e. the gesture has become a drag.
    pub fn pointer_moved(&mut self, position: Vec2) -> bool {
        if let Some(down) = self.pointer_down {
            if position.distance(down) > CLICK_THRESHOLD_PX {
                self.dragging = true;
            }
        }
        self.dragging
    }

    /// Pointer released: classify the gesture using the stored press anchor.
    pub fn pointer_released(&mut self, position: Vec2) -> PointerRelease {
        let outcome = match self.pointer_down {
            Some(down) if position.distance(down) <= CLICK_THRESHOLD_PX => {
                PointerRelease::Click(down)
            }
            Some(_) => PointerRelease::DragEnd,
            None => PointerRelease::DragEnd,
        };
        self.pointer_down = None;
        self.dragging = false;
        outcome
    }

    /// Select a structural member. Clears any entity selection, and drops the
    /// hover mark if it pointed at the newly selected member.
    pub fn select_member(&mut self, id: &str) {
        self.selected_entity = SelectedEntity::None;
        self.selected_member = Some(id.to_string());
        if self.hovered_member.as_deref() == Some(id) {
            self.hovered_member = None;
        }
    }

    pub fn select_panel(&mut self, panel_id: &str) {
        self.selected_member = None;
        self.selected_entity = SelectedEntity::Panel(panel_id.to_string());
    }

    pub fn select_sensor(&mut self, sensor_id: &str) {
        self.selected_member = None;
        self.selected_entity = SelectedEntity::Sensor(sensor_id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected_member = None;
        self.selected_entity = SelectedEntity::None;
    }

    /// Update the hover mark from a ray-cast result. The selected member
    /// never receives the hover tint; a miss clears the previous hover.
    pub fn set_hover(&mut self, hit: Option<&str>) {
        self.hovered_member = match hit {
            Some(id) if self.selected_member.as_deref() != Some(id) => Some(id.to_string()),
            _ => None,
        };
    }

    /// "Reset view": clears the selection and re-enables auto-rotation.
    pub fn reset_view(&mut self) {
        self.clear_selection();
        self.hovered_member = None;
        self.dragging = false;
        self.pointer_down = None;
        self.auto_rotate = true;
    }
}
