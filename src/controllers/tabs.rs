//! Single-selection tab bar with show/hide content panes.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How long a flashed tab stays highlighted.
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// The tabs of the viewer, in bar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Help,
    Info,
    Timelapse,
    Log,
    Weather,
}

impl TabId {
    pub const ALL: [TabId; 5] = [
        TabId::Help,
        TabId::Info,
        TabId::Timelapse,
        TabId::Log,
        TabId::Weather,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TabId::Help => "Help",
            TabId::Info => "Info",
            TabId::Timelapse => "Timelapse",
            TabId::Log => "Log",
            TabId::Weather => "Weather",
        }
    }

    /// Pane this tab controls in the standard layout.
    pub fn default_pane(&self) -> PaneId {
        match self {
            TabId::Help => PaneId::Help,
            TabId::Info => PaneId::Info,
            TabId::Timelapse => PaneId::Timelapse,
            TabId::Log => PaneId::Scrapes,
            TabId::Weather => PaneId::Weather,
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content areas that tabs show and hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Help,
    Info,
    Timelapse,
    Scrapes,
    Weather,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    #[error("no tab registered as {0}")]
    UnknownTab(TabId),
}

#[derive(Debug, Clone)]
struct TabEntry {
    id: TabId,
    pane: PaneId,
    visible: bool,
    flash_until: Option<Instant>,
}

/// Tracks the selected tab, which tab controls are shown in the bar and
/// which panes are visible.
#[derive(Debug, Clone, Default)]
pub struct TabController {
    tabs: Vec<TabEntry>,
    panes: HashMap<PaneId, bool>,
    selected: Option<TabId>,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tab of [`TabId::ALL`] registered against its default pane.
    pub fn standard() -> Self {
        let mut controller = Self::new();
        for id in TabId::ALL {
            controller.register_tab(id, id.default_pane());
        }
        controller
    }

    /// Add a tab. Its control and pane start hidden. Registering an id
    /// again rebinds it to `pane`.
    pub fn register_tab(&mut self, id: TabId, pane: PaneId) {
        self.panes.entry(pane).or_insert(false);
        if let Some(entry) = self.tabs.iter_mut().find(|t| t.id == id) {
            entry.pane = pane;
            return;
        }
        self.tabs.push(TabEntry {
            id,
            pane,
            visible: false,
            flash_until: None,
        });
    }

    fn entry(&self, id: TabId) -> Result<&TabEntry, TabError> {
        self.tabs
            .iter()
            .find(|t| t.id == id)
            .ok_or(TabError::UnknownTab(id))
    }

    fn entry_mut(&mut self, id: TabId) -> Result<&mut TabEntry, TabError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TabError::UnknownTab(id))
    }

    /// Select `id`, hiding the previously selected tab's pane and showing
    /// this one's.
    pub fn select(&mut self, id: TabId) -> Result<(), TabError> {
        let pane = self.entry(id)?.pane;
        if let Some(previous) = self.selected.filter(|p| *p != id) {
            let old_pane = self.entry(previous)?.pane;
            self.panes.insert(old_pane, false);
        }
        self.selected = Some(id);
        self.panes.insert(pane, true);
        Ok(())
    }

    /// Show or hide the tab control itself. Pane visibility is untouched.
    pub fn set_tab_visible(&mut self, id: TabId, visible: bool) -> Result<(), TabError> {
        self.entry_mut(id)?.visible = visible;
        Ok(())
    }

    /// Show or hide a pane directly, outside of tab selection.
    pub fn set_pane_visible(&mut self, pane: PaneId, visible: bool) {
        self.panes.insert(pane, visible);
    }

    /// Highlight a tab briefly.
    pub fn flash(&mut self, id: TabId, now: Instant) -> Result<(), TabError> {
        self.entry_mut(id)?.flash_until = Some(now + FLASH_DURATION);
        Ok(())
    }

    pub fn is_flashing(&self, id: TabId, now: Instant) -> bool {
        self.entry(id)
            .ok()
            .and_then(|t| t.flash_until)
            .is_some_and(|until| now < until)
    }

    pub fn selected(&self) -> Option<TabId> {
        self.selected
    }

    pub fn selected_pane(&self) -> Option<PaneId> {
        self.selected
            .and_then(|id| self.entry(id).ok())
            .map(|t| t.pane)
    }

    pub fn is_tab_visible(&self, id: TabId) -> Result<bool, TabError> {
        Ok(self.entry(id)?.visible)
    }

    pub fn is_pane_visible(&self, pane: PaneId) -> bool {
        self.panes.get(&pane).copied().unwrap_or(false)
    }

    /// Tabs currently shown in the bar, in registration order.
    pub fn visible_tabs(&self) -> impl Iterator<Item = TabId> + '_ {
        self.tabs.iter().filter(|t| t.visible).map(|t| t.id)
    }

    /// Select the visible tab `offset` positions from the selected one,
    /// wrapping. Does nothing when no tab is visible.
    pub fn cycle(&mut self, offset: isize) -> Result<(), TabError> {
        let visible: Vec<TabId> = self.visible_tabs().collect();
        if visible.is_empty() {
            return Ok(());
        }
        let len = visible.len() as isize;
        let position = self
            .selected
            .and_then(|id| visible.iter().position(|v| *v == id))
            .map(|p| p as isize)
            .unwrap_or(if offset >= 0 { -1 } else { 0 });
        let next = (position + offset).rem_euclid(len) as usize;
        self.select(visible[next])
    }
}
