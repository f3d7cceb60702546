//! Panel layout and keyboard focus between the dashboard, graph and
//! conductor columns.
//!
//! The layout is recomputed from scratch on every resize or visibility
//! toggle, and focus is re-checked against it in the same call: focus never
//! points at a panel the layout left out.

use tracing::debug;

use crate::conductor::ConductorSection;
use crate::graph::GraphSection;
use crate::keys::Nav;

/// Widths above this get up to three columns.
pub const THREE_COLUMN_WIDTH: usize = 80;
/// Widths above this get a second column.
pub const TWO_COLUMN_WIDTH: usize = 40;
pub const CONDUCTOR_PERCENT: usize = 30;
pub const GRAPH_MIN_WIDTH: usize = 20;

/// Top-level screen. Only `Dashboard` has panel focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Dashboard,
    Diff,
    Commit,
    BranchPicker,
    ProjectManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Dashboard,
    Graph,
    Conductor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelFocus {
    #[default]
    Dashboard,
    Graph(GraphSection),
    Conductor(ConductorSection),
}

impl PanelFocus {
    pub fn panel(self) -> Panel {
        match self {
            Self::Dashboard => Panel::Dashboard,
            Self::Graph(_) => Panel::Graph,
            Self::Conductor(_) => Panel::Conductor,
        }
    }

    pub fn graph_section(self) -> Option<GraphSection> {
        match self {
            Self::Graph(section) => Some(section),
            _ => None,
        }
    }

    pub fn conductor_section(self) -> Option<ConductorSection> {
        match self {
            Self::Conductor(section) => Some(section),
            _ => None,
        }
    }
}

/// Column widths for one terminal size. A width of zero means the panel is
/// not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub width: usize,
    /// Rows available to the panels; the status bar takes the last row.
    pub height: usize,
    pub dashboard: usize,
    pub graph: usize,
    pub conductor: usize,
}

impl Layout {
    pub fn compute(
        width: usize,
        height: usize,
        show_graph: bool,
        show_conductor: bool,
        dashboard_percent: u16,
    ) -> Self {
        let height = height.saturating_sub(1).max(3);
        let mut layout = Self {
            width,
            height,
            dashboard: width,
            graph: 0,
            conductor: 0,
        };

        if width > THREE_COLUMN_WIDTH && (show_graph || show_conductor) {
            let conductor = if show_conductor {
                width * CONDUCTOR_PERCENT / 100
            } else {
                0
            };
            let mut dashboard = width * usize::from(dashboard_percent) / 100;
            let graph = if show_graph {
                width
                    .saturating_sub(dashboard + conductor)
                    .max(GRAPH_MIN_WIDTH)
            } else {
                0
            };
            dashboard = width.saturating_sub(conductor + graph);
            layout.dashboard = dashboard;
            layout.graph = graph;
            layout.conductor = conductor;
        } else if width > TWO_COLUMN_WIDTH && show_graph {
            layout.graph = width / 2;
            layout.dashboard = width - layout.graph;
        } else if width > TWO_COLUMN_WIDTH && show_conductor {
            layout.conductor = width / 2;
            layout.dashboard = width - layout.conductor;
        }
        layout
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.column(panel) > 0
    }

    pub fn column(&self, panel: Panel) -> usize {
        match panel {
            Panel::Dashboard => self.dashboard,
            Panel::Graph => self.graph,
            Panel::Conductor => self.conductor,
        }
    }

    /// Width inside the panel; graph and conductor give one column to their
    /// left border.
    pub fn inner_width(&self, panel: Panel) -> usize {
        match panel {
            Panel::Dashboard => self.dashboard,
            Panel::Graph | Panel::Conductor => self.column(panel).saturating_sub(1),
        }
    }

    /// Left to right.
    pub fn visible_panels(&self) -> Vec<Panel> {
        [Panel::Dashboard, Panel::Graph, Panel::Conductor]
            .into_iter()
            .filter(|panel| self.is_visible(*panel))
            .collect()
    }
}

/// Section availability the router cannot see on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sections {
    pub graph_files: bool,
    pub conductor_detail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRouter {
    focus: PanelFocus,
    show_graph: bool,
    show_conductor: bool,
    dashboard_percent: u16,
    terminal: (usize, usize),
    layout: Layout,
}

impl FocusRouter {
    pub fn new(show_graph: bool, show_conductor: bool, dashboard_percent: u16) -> Self {
        Self {
            focus: PanelFocus::Dashboard,
            show_graph,
            show_conductor,
            dashboard_percent,
            terminal: (0, 0),
            layout: Layout::compute(0, 0, show_graph, show_conductor, dashboard_percent),
        }
    }

    pub fn focus(&self) -> PanelFocus {
        self.focus
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn show_graph(&self) -> bool {
        self.show_graph
    }

    pub fn show_conductor(&self) -> bool {
        self.show_conductor
    }

    pub fn set_size(&mut self, width: usize, height: usize, sections: Sections) {
        self.terminal = (width, height);
        self.relayout();
        self.enforce(sections);
    }

    pub fn toggle_graph(&mut self, sections: Sections) -> bool {
        self.show_graph = !self.show_graph;
        self.relayout();
        self.enforce(sections);
        self.show_graph
    }

    pub fn toggle_conductor(&mut self, sections: Sections) -> bool {
        self.show_conductor = !self.show_conductor;
        self.relayout();
        self.enforce(sections);
        self.show_conductor
    }

    /// Focus change requested by a panel section, e.g. the graph moving from
    /// commits to files. Ignored if it names a different panel.
    pub fn set_section(&mut self, focus: PanelFocus, sections: Sections) {
        if focus.panel() == self.focus.panel() {
            self.focus = focus;
            self.enforce(sections);
        }
    }

    /// Handles a navigation key the focused panel declined. Returns true if
    /// focus moved.
    pub fn route(&mut self, nav: Nav, sections: Sections) -> bool {
        let next = transition(self.focus, nav, &self.layout);
        if next == self.focus {
            return false;
        }
        self.set(next);
        self.enforce(sections);
        true
    }

    /// Pulls focus back to something the layout shows.
    pub fn enforce(&mut self, sections: Sections) {
        let next = enforce_visible(self.focus, &self.layout, sections);
        if next != self.focus {
            self.set(next);
        }
    }

    fn set(&mut self, focus: PanelFocus) {
        debug!(from = ?self.focus, to = ?focus, "panel focus");
        self.focus = focus;
    }

    fn relayout(&mut self) {
        let (width, height) = self.terminal;
        self.layout = Layout::compute(
            width,
            height,
            self.show_graph,
            self.show_conductor,
            self.dashboard_percent,
        );
    }
}

/// Where focus goes for a key the focused panel did not use.
pub fn transition(focus: PanelFocus, nav: Nav, layout: &Layout) -> PanelFocus {
    let graph = layout.is_visible(Panel::Graph);
    let conductor = layout.is_visible(Panel::Conductor);
    match (focus, nav) {
        (PanelFocus::Dashboard, Nav::FocusRight) if graph => {
            PanelFocus::Graph(GraphSection::Commits)
        }
        (PanelFocus::Dashboard, Nav::FocusRight) if conductor => {
            PanelFocus::Conductor(ConductorSection::List)
        }
        (PanelFocus::Graph(_), Nav::FocusLeft | Nav::Back) => PanelFocus::Dashboard,
        (PanelFocus::Graph(_), Nav::FocusRight)
            if conductor && layout.width > THREE_COLUMN_WIDTH =>
        {
            PanelFocus::Conductor(ConductorSection::List)
        }
        (PanelFocus::Conductor(_), Nav::FocusLeft) if graph => {
            PanelFocus::Graph(GraphSection::Commits)
        }
        (PanelFocus::Conductor(_), Nav::FocusLeft | Nav::Back) => PanelFocus::Dashboard,
        (current, _) => current,
    }
}

pub fn enforce_visible(focus: PanelFocus, layout: &Layout, sections: Sections) -> PanelFocus {
    if !layout.is_visible(focus.panel()) {
        return PanelFocus::Dashboard;
    }
    match focus {
        PanelFocus::Graph(GraphSection::Files) if !sections.graph_files => {
            PanelFocus::Graph(GraphSection::Commits)
        }
        PanelFocus::Conductor(ConductorSection::Detail) if !sections.conductor_detail => {
            PanelFocus::Conductor(ConductorSection::List)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests;
