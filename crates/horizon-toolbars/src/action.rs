//! Actions: the source of toolbar items.
//!
//! An [`Action`] describes one toolbar entry: a standard tool button, a
//! separator, or a host-provided custom widget. Actions are owned by an
//! [`ActionRegistry`] and referenced everywhere else by [`ActionId`], so the
//! same action can appear on several toolbars and survive being removed from
//! all of them.
//!
//! The registry also remembers every action that was ever placed on a
//! toolbar of its window. Restoring a saved layout resolves action names
//! against that list, which brings back actions the user removed during
//! customization.

use horizon_toolbars_core::Size;
use slotmap::{SlotMap, new_key_type};

use crate::state::ActionState;

new_key_type! {
    /// Handle to an [`Action`] stored in an [`ActionRegistry`].
    pub struct ActionId;
}

// ============================================================================
// ToolButtonStyle
// ============================================================================

/// How a standard tool button presents its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolButtonStyle {
    /// Display only the icon.
    #[default]
    IconOnly,
    /// Display only the text.
    TextOnly,
    /// Display text beside the icon.
    TextBesideIcon,
    /// Display text under the icon.
    TextUnderIcon,
}

// ============================================================================
// ActionKind
// ============================================================================

/// What kind of toolbar item an action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// A standard tool button. `label_size` is the measured size of the
    /// action's text as rendered by the host.
    Button { label_size: Size },
    /// A separator between groups of items.
    Separator,
    /// A custom widget provided by the host, with its preferred size.
    Widget { size_hint: Size },
}

impl ActionKind {
    /// Check if this kind is a separator.
    pub fn is_separator(&self) -> bool {
        matches!(self, ActionKind::Separator)
    }
}

// ============================================================================
// Action
// ============================================================================

/// A toolbar action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    object_name: String,
    text: String,
    kind: ActionKind,
    visible: bool,
}

impl Action {
    /// Create a standard button action with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            object_name: String::new(),
            text: text.into(),
            kind: ActionKind::Button {
                label_size: Size::ZERO,
            },
            visible: true,
        }
    }

    /// Create a separator action.
    pub fn separator() -> Self {
        Self {
            object_name: String::new(),
            text: String::new(),
            kind: ActionKind::Separator,
            visible: true,
        }
    }

    /// Create a custom widget action with the given preferred size.
    pub fn widget(text: impl Into<String>, size_hint: Size) -> Self {
        Self {
            object_name: String::new(),
            text: text.into(),
            kind: ActionKind::Widget { size_hint },
            visible: true,
        }
    }

    /// Set the stable identity name used for persistence.
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    /// Set the measured label size of a button action.
    ///
    /// Has no effect on separators and custom widgets.
    pub fn with_label_size(mut self, size: Size) -> Self {
        if let ActionKind::Button { label_size } = &mut self.kind {
            *label_size = size;
        }
        self
    }

    /// Set whether toolbars show the action.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Stable identity name.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Set the stable identity name.
    pub fn set_object_name(&mut self, name: impl Into<String>) {
        self.object_name = name.into();
    }

    /// Action text, possibly containing `&` mnemonic markers.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the action text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Text with mnemonic markers removed (`&&` becomes `&`).
    pub fn display_text(&self) -> String {
        let mut result = String::with_capacity(self.text.len());
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '&' {
                if chars.peek() == Some(&'&') {
                    result.push('&');
                    chars.next();
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    /// Item kind.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Check if this action is a separator.
    pub fn is_separator(&self) -> bool {
        self.kind.is_separator()
    }

    /// Whether toolbars show the action. Hidden actions keep their place in
    /// the action list but are not packed.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

// ============================================================================
// ActionRegistry
// ============================================================================

/// Owner of all actions used by a window's toolbars.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: SlotMap<ActionId, Action>,
    /// Actions that have been placed on a toolbar at least once, in
    /// placement order.
    known: Vec<ActionId>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action and return its handle.
    pub fn insert(&mut self, action: Action) -> ActionId {
        self.actions.insert(action)
    }

    /// Remove an action entirely.
    ///
    /// Toolbars still referencing the handle must drop it themselves.
    pub fn remove(&mut self, id: ActionId) -> Option<Action> {
        self.known.retain(|&known| known != id);
        self.actions.remove(id)
    }

    /// Look up an action.
    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id)
    }

    /// Look up an action mutably.
    pub fn get_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions.get_mut(id)
    }

    /// Number of actions owned by the registry.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the registry owns no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Remember that an action was placed on a toolbar.
    pub fn mark_known(&mut self, id: ActionId) {
        if self.actions.contains_key(id) && !self.known.contains(&id) {
            self.known.push(id);
        }
    }

    /// Whether the action was ever placed on a toolbar.
    pub fn is_known(&self, id: ActionId) -> bool {
        self.known.contains(&id)
    }

    /// Persisted form of an action.
    pub fn action_state(&self, id: ActionId) -> Option<ActionState> {
        self.actions.get(id).map(|action| ActionState {
            is_separator: action.is_separator(),
            name: action.object_name.clone(),
        })
    }

    /// Resolve a persisted action to a live one.
    ///
    /// Separators are recreated as fresh actions. Named actions are matched
    /// against known actions by object name; unnamed or unknown actions
    /// resolve to `None`.
    pub fn resolve(&mut self, state: &ActionState) -> Option<ActionId> {
        if state.is_separator {
            let id = self.actions.insert(Action::separator());
            self.known.push(id);
            return Some(id);
        }
        if state.name.is_empty() {
            return None;
        }
        self.known.iter().copied().find(|&id| {
            self.actions
                .get(id)
                .is_some_and(|action| action.object_name == state.name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_strips_mnemonics() {
        assert_eq!(Action::new("&Open").display_text(), "Open");
        assert_eq!(Action::new("Save && Close").display_text(), "Save & Close");
    }

    #[test]
    fn test_label_size_only_for_buttons() {
        let button = Action::new("Open").with_label_size(Size::new(30, 12));
        assert_eq!(
            button.kind(),
            ActionKind::Button {
                label_size: Size::new(30, 12)
            }
        );

        let separator = Action::separator().with_label_size(Size::new(30, 12));
        assert_eq!(separator.kind(), ActionKind::Separator);
    }

    #[test]
    fn test_resolve_known_by_name() {
        let mut registry = ActionRegistry::new();
        let open = registry.insert(Action::new("Open").with_object_name("open"));
        let save = registry.insert(Action::new("Save").with_object_name("save"));
        registry.mark_known(open);

        let state = ActionState {
            is_separator: false,
            name: "open".into(),
        };
        assert_eq!(registry.resolve(&state), Some(open));

        // never placed on a toolbar
        let state = ActionState {
            is_separator: false,
            name: "save".into(),
        };
        assert_eq!(registry.resolve(&state), None);
        registry.mark_known(save);
        assert_eq!(registry.resolve(&state), Some(save));
    }

    #[test]
    fn test_resolve_separator_creates_action() {
        let mut registry = ActionRegistry::new();
        let state = ActionState {
            is_separator: true,
            name: String::new(),
        };
        let id = registry.resolve(&state).unwrap();
        assert!(registry.get(id).unwrap().is_separator());
        assert!(registry.is_known(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unnamed_is_none() {
        let mut registry = ActionRegistry::new();
        let id = registry.insert(Action::new("Anonymous"));
        registry.mark_known(id);
        let state = ActionState {
            is_separator: false,
            name: String::new(),
        };
        assert_eq!(registry.resolve(&state), None);
    }
}
