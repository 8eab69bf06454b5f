//! Interaction state machine.
//!
//! [`InteractionController`] is the only stateful piece of the engine. Every input event is a
//! total transition of the previous state; side effects leave as [`Command`]s (camera moves,
//! search focus changes, new upstream queries) for the host to carry out.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::graph::{DEFAULT_HOPS, FocusKind, FocusRef, GraphResponse, MAX_HOPS, MIN_HOPS};

use super::camera::CameraCommand;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "2d")]
    TwoD,
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::TwoD => Self::ThreeD,
            Self::ThreeD => Self::TwoD,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TwoD => "2d",
            Self::ThreeD => "3d",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "2d" => Ok(Self::TwoD),
            "3d" => Ok(Self::ThreeD),
            other => Err(format!("unknown view `{other}`, expected 2d or 3d")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionState {
    pub hovered_node_id: Option<String>,
    pub selected_node_id: Option<String>,
    pub focus_node_id: Option<String>,
    pub hops: u8,
    pub view: ViewMode,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            hovered_node_id: None,
            selected_node_id: None,
            focus_node_id: None,
            hops: DEFAULT_HOPS,
            view: ViewMode::default(),
        }
    }
}

impl InteractionState {
    /// The node driving highlights: the selection, or the hovered node when nothing is selected.
    pub fn active_node_id(&self) -> Option<&str> {
        self.selected_node_id
            .as_deref()
            .or(self.hovered_node_id.as_deref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Slash,
    Escape,
    Tab,
    F,
    V,
    Digit(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer is over a node, or over nothing.
    PointerOver(Option<String>),
    Click(String),
    ClickEmpty,
    KeyPressed(KeyPress),
    /// A text field gained or lost keyboard focus.
    InputFocusChanged(bool),
    SearchSelected(FocusRef),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Camera(CameraCommand),
    FocusSearch,
    BlurSearch,
    Query { focus: FocusRef, hops: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    FocusSearch,
    Escape,
    CycleForward,
    CycleBackward,
    FlyToCurrent,
    ToggleView,
    SetHops,
}

#[derive(Clone, Copy, Debug)]
enum KeyMatch {
    Exact(Key),
    HopDigit,
}

#[derive(Clone, Copy, Debug)]
struct Shortcut {
    key: KeyMatch,
    /// `None` accepts either shift state.
    shift: Option<bool>,
    allow_while_typing: bool,
    action: Action,
}

impl Shortcut {
    fn matches(&self, press: KeyPress) -> bool {
        let key_matches = match self.key {
            KeyMatch::Exact(key) => key == press.key,
            KeyMatch::HopDigit => matches!(
                press.key,
                Key::Digit(digit) if (MIN_HOPS..=MAX_HOPS).contains(&digit)
            ),
        };
        key_matches && self.shift.is_none_or(|shift| shift == press.shift)
    }
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        key: KeyMatch::Exact(Key::Slash),
        shift: None,
        allow_while_typing: false,
        action: Action::FocusSearch,
    },
    Shortcut {
        key: KeyMatch::Exact(Key::Escape),
        shift: None,
        allow_while_typing: true,
        action: Action::Escape,
    },
    Shortcut {
        key: KeyMatch::Exact(Key::Tab),
        shift: Some(true),
        allow_while_typing: false,
        action: Action::CycleBackward,
    },
    Shortcut {
        key: KeyMatch::Exact(Key::Tab),
        shift: Some(false),
        allow_while_typing: false,
        action: Action::CycleForward,
    },
    Shortcut {
        key: KeyMatch::Exact(Key::F),
        shift: None,
        allow_while_typing: false,
        action: Action::FlyToCurrent,
    },
    Shortcut {
        key: KeyMatch::Exact(Key::V),
        shift: None,
        allow_while_typing: false,
        action: Action::ToggleView,
    },
    Shortcut {
        key: KeyMatch::HopDigit,
        shift: None,
        allow_while_typing: false,
        action: Action::SetHops,
    },
];

/// Human-readable shortcut list for the host's help overlay.
pub const SHORTCUT_HELP: &[(&str, &str)] = &[
    ("/", "focus search"),
    ("Esc", "leave search, then clear selection"),
    ("Tab / Shift+Tab", "cycle selection by impact"),
    ("f", "fly to selection or focus"),
    ("v", "toggle 2D / 3D"),
    ("1-5", "set hop depth"),
];

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
    focus: Option<FocusRef>,
    input_focused: bool,
    /// Node ids by descending impact, the Tab cycle order.
    cycle_order: Vec<String>,
    node_ids: HashSet<String>,
    pending_selection: Option<String>,
}

impl InteractionController {
    pub fn new(focus: Option<FocusRef>, hops: u8, view: ViewMode) -> Self {
        Self {
            state: InteractionState {
                hops: hops.clamp(MIN_HOPS, MAX_HOPS),
                view,
                ..InteractionState::default()
            },
            focus,
            ..Self::default()
        }
    }

    /// Restores a shared state tuple; the selection is applied once the graph containing it loads.
    pub fn from_share_state(share: &ShareState) -> Self {
        Self::new(
            Some(FocusRef::new(
                share.focus_kind,
                share.focus_id.clone(),
                share.focus_id.clone(),
            )),
            share.hops,
            share.view,
        )
        .with_pending_selection(share.selected_node_id.clone())
    }

    /// Node to select once a graph containing it arrives.
    pub fn with_pending_selection(mut self, node_id: Option<String>) -> Self {
        self.pending_selection = node_id;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn focus(&self) -> Option<&FocusRef> {
        self.focus.as_ref()
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// The query for the current focus and hop depth, if a focus is set.
    pub fn current_query(&self) -> Option<Command> {
        self.focus.as_ref().map(|focus| Command::Query {
            focus: focus.clone(),
            hops: self.state.hops,
        })
    }

    pub fn share_state(&self) -> Option<ShareState> {
        self.focus.as_ref().map(|focus| ShareState {
            focus_kind: focus.kind,
            focus_id: focus.id.clone(),
            hops: self.state.hops,
            selected_node_id: self.state.selected_node_id.clone(),
            view: self.state.view,
        })
    }

    /// Changes the hop depth and re-queries; an unchanged depth is a no-op.
    pub fn set_hops(&mut self, hops: u8) -> Vec<Command> {
        let hops = hops.clamp(MIN_HOPS, MAX_HOPS);
        if hops == self.state.hops {
            return Vec::new();
        }
        self.state.hops = hops;
        self.current_query().into_iter().collect()
    }

    pub fn set_view(&mut self, view: ViewMode) -> Vec<Command> {
        if view == self.state.view {
            return Vec::new();
        }
        self.state.view = view;
        vec![Command::Camera(CameraCommand::SetView(view))]
    }

    /// Adopts a freshly arrived graph: the advertised focus becomes `focus_node_id`, hover is
    /// cleared and a selection that no longer exists is dropped.
    pub fn load_graph(&mut self, response: &GraphResponse) {
        self.node_ids = response
            .nodes
            .iter()
            .map(|node| node.node_id.clone())
            .collect();

        let mut ranked = response.nodes.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.impact_score
                .partial_cmp(&a.impact_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        self.cycle_order = ranked.into_iter().map(|node| node.node_id.clone()).collect();

        self.state.focus_node_id = if response.focus_node_id.is_empty() {
            None
        } else {
            Some(response.focus_node_id.clone())
        };
        self.state.hovered_node_id = None;

        if let Some(pending) = self.pending_selection.take() {
            self.state.selected_node_id = Some(pending);
        }
        if let Some(selected) = &self.state.selected_node_id
            && !self.node_ids.contains(selected)
        {
            self.state.selected_node_id = None;
        }

        if let (Some(focus), Some(node)) = (
            self.focus.as_mut(),
            response.node(&response.focus_node_id),
        ) && focus.kind != FocusKind::Domain
        {
            focus.display_name = node.display_name.clone();
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Command> {
        debug!("interaction event {event:?}");
        match event {
            InputEvent::PointerOver(node_id) => {
                if node_id.is_none() {
                    self.state.hovered_node_id = None;
                } else if !self.input_focused {
                    self.state.hovered_node_id = node_id.filter(|id| self.node_ids.contains(id));
                }
                Vec::new()
            }
            InputEvent::Click(node_id) => {
                if !self.node_ids.contains(&node_id) {
                    return Vec::new();
                }
                self.state.selected_node_id = Some(node_id.clone());
                vec![Command::Camera(CameraCommand::FlyToNode(node_id))]
            }
            InputEvent::ClickEmpty => {
                self.state.selected_node_id = None;
                Vec::new()
            }
            InputEvent::InputFocusChanged(focused) => {
                self.input_focused = focused;
                if focused {
                    self.state.hovered_node_id = None;
                }
                Vec::new()
            }
            InputEvent::SearchSelected(focus) => {
                self.state.selected_node_id = None;
                self.state.hovered_node_id = None;
                self.focus = Some(focus.clone());
                vec![
                    Command::BlurSearch,
                    Command::Query {
                        focus,
                        hops: self.state.hops,
                    },
                ]
            }
            InputEvent::KeyPressed(press) => self.dispatch_key(press),
        }
    }

    fn dispatch_key(&mut self, press: KeyPress) -> Vec<Command> {
        let Some(shortcut) = SHORTCUTS
            .iter()
            .find(|shortcut| shortcut.matches(press))
        else {
            return Vec::new();
        };

        if self.input_focused && !shortcut.allow_while_typing {
            return Vec::new();
        }

        match shortcut.action {
            Action::FocusSearch => {
                self.input_focused = true;
                self.state.hovered_node_id = None;
                vec![Command::FocusSearch]
            }
            Action::Escape => {
                if self.input_focused {
                    self.input_focused = false;
                    vec![Command::BlurSearch]
                } else {
                    self.state.selected_node_id = None;
                    Vec::new()
                }
            }
            Action::CycleForward => self.cycle_selection(true),
            Action::CycleBackward => self.cycle_selection(false),
            Action::FlyToCurrent => {
                let target = self
                    .state
                    .selected_node_id
                    .clone()
                    .or_else(|| self.state.focus_node_id.clone());
                let command = match target {
                    Some(node_id) => CameraCommand::FlyToNode(node_id),
                    None => CameraCommand::Reset,
                };
                vec![Command::Camera(command)]
            }
            Action::ToggleView => self.set_view(self.state.view.toggled()),
            Action::SetHops => match press.key {
                Key::Digit(hops) => self.set_hops(hops),
                _ => Vec::new(),
            },
        }
    }

    fn cycle_selection(&mut self, forward: bool) -> Vec<Command> {
        let count = self.cycle_order.len();
        if count == 0 {
            return Vec::new();
        }

        let current = self
            .state
            .selected_node_id
            .as_ref()
            .and_then(|selected| self.cycle_order.iter().position(|id| id == selected));
        let next = match (current, forward) {
            (Some(index), true) => (index + 1) % count,
            (Some(index), false) => (index + count - 1) % count,
            (None, true) => 0,
            (None, false) => count - 1,
        };

        let node_id = self.cycle_order[next].clone();
        self.state.selected_node_id = Some(node_id.clone());
        vec![Command::Camera(CameraCommand::FlyToNode(node_id))]
    }
}

/// The bookmarkable view state: `focusKind=service&focusId=checkout&hops=3&selected=...&view=3d`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareState {
    pub focus_kind: FocusKind,
    pub focus_id: String,
    pub hops: u8,
    pub selected_node_id: Option<String>,
    pub view: ViewMode,
}

impl fmt::Display for ShareState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "focusKind={}&focusId={}&hops={}",
            self.focus_kind,
            percent_encode(&self.focus_id),
            self.hops
        )?;
        if let Some(selected) = &self.selected_node_id {
            write!(f, "&selected={}", percent_encode(selected))?;
        }
        write!(f, "&view={}", self.view.label())
    }
}

impl FromStr for ShareState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let query = value
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or(value);

        let mut focus_kind = None;
        let mut focus_id = None;
        let mut hops = DEFAULT_HOPS;
        let mut selected_node_id = None;
        let mut view = ViewMode::default();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let decoded = percent_decode(raw)?;
            match key {
                "focusKind" => focus_kind = Some(decoded.parse::<FocusKind>()?),
                "focusId" => focus_id = Some(decoded).filter(|id| !id.is_empty()),
                "hops" => {
                    hops = decoded
                        .parse::<u8>()
                        .ok()
                        .filter(|hops| (MIN_HOPS..=MAX_HOPS).contains(hops))
                        .ok_or_else(|| format!("hops must be {MIN_HOPS}..={MAX_HOPS}"))?;
                }
                "selected" => selected_node_id = Some(decoded).filter(|id| !id.is_empty()),
                "view" => view = decoded.parse()?,
                _ => {}
            }
        }

        Ok(Self {
            focus_kind: focus_kind.ok_or("missing focusKind")?,
            focus_id: focus_id.ok_or("missing focusId")?,
            hops,
            selected_node_id,
            view,
        })
    }
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn percent_decode(value: &str) -> Result<String, String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'%' => {
                let hex = value
                    .get(index + 1..index + 3)
                    .ok_or_else(|| format!("truncated escape in `{value}`"))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("invalid escape `%{hex}` in `{value}`"))?;
                decoded.push(byte);
                index += 3;
            }
            b'+' => {
                decoded.push(b' ');
                index += 1;
            }
            byte => {
                decoded.push(byte);
                index += 1;
            }
        }
    }
    String::from_utf8(decoded).map_err(|_| format!("`{value}` is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_escapes_reserved_characters() {
        assert_eq!(percent_encode("svc:a&b"), "svc%3Aa%26b");
        assert_eq!(percent_decode("svc%3Aa%26b").unwrap(), "svc:a&b");
        assert!(percent_decode("%4").is_err());
    }

    #[test]
    fn shift_tab_matches_backward_cycle_only() {
        let backward = SHORTCUTS
            .iter()
            .find(|shortcut| shortcut.matches(KeyPress::shifted(Key::Tab)))
            .unwrap();
        assert_eq!(backward.action, Action::CycleBackward);
        let forward = SHORTCUTS
            .iter()
            .find(|shortcut| shortcut.matches(KeyPress::new(Key::Tab)))
            .unwrap();
        assert_eq!(forward.action, Action::CycleForward);
    }

    #[test]
    fn out_of_range_digits_are_not_shortcuts() {
        for digit in [0, 6, 9] {
            assert!(
                !SHORTCUTS
                    .iter()
                    .any(|shortcut| shortcut.matches(KeyPress::new(Key::Digit(digit))))
            );
        }
    }
}
