use pretty_assertions::assert_eq;

use super::*;

const ALL: Sections = Sections {
    graph_files: true,
    conductor_detail: true,
};

fn router(show_graph: bool, show_conductor: bool, width: usize) -> FocusRouter {
    let mut router = FocusRouter::new(show_graph, show_conductor, 25);
    router.set_size(width, 40, ALL);
    router
}

fn columns(layout: &Layout) -> (usize, usize, usize) {
    (layout.dashboard, layout.graph, layout.conductor)
}

#[test]
fn wide_terminal_gets_three_columns() {
    let layout = Layout::compute(120, 40, true, true, 25);
    assert_eq!(columns(&layout), (30, 54, 36));
    assert_eq!(layout.height, 39);
    assert_eq!(layout.inner_width(Panel::Graph), 53);
    assert_eq!(
        layout.visible_panels(),
        vec![Panel::Dashboard, Panel::Graph, Panel::Conductor]
    );
}

#[test]
fn hidden_panels_give_their_width_to_the_dashboard() {
    assert_eq!(columns(&Layout::compute(120, 40, true, false, 25)), (30, 90, 0));
    assert_eq!(columns(&Layout::compute(120, 40, false, true, 25)), (84, 0, 36));
    assert_eq!(columns(&Layout::compute(120, 40, false, false, 25)), (120, 0, 0));
}

#[test]
fn graph_keeps_its_minimum_width() {
    let layout = Layout::compute(81, 40, true, true, 79);
    assert_eq!(columns(&layout), (37, 20, 24));
}

#[test]
fn medium_terminal_splits_in_half_and_narrow_shows_dashboard_only() {
    assert_eq!(columns(&Layout::compute(60, 40, true, true, 25)), (30, 30, 0));
    assert_eq!(columns(&Layout::compute(61, 40, false, true, 25)), (31, 0, 30));
    assert_eq!(columns(&Layout::compute(40, 40, true, true, 25)), (40, 0, 0));
    assert_eq!(Layout::compute(40, 2, true, true, 25).height, 3);
}

#[test]
fn focus_walks_right_and_back_left() {
    let mut router = router(true, true, 120);
    assert!(router.route(Nav::FocusRight, ALL));
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Commits));
    assert!(router.route(Nav::FocusRight, ALL));
    assert_eq!(router.focus(), PanelFocus::Conductor(ConductorSection::List));
    assert!(!router.route(Nav::FocusRight, ALL));
    assert!(router.route(Nav::FocusLeft, ALL));
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Commits));
    assert!(router.route(Nav::Back, ALL));
    assert_eq!(router.focus(), PanelFocus::Dashboard);
}

#[test]
fn escape_from_conductor_list_returns_to_dashboard() {
    let mut router = router(true, true, 120);
    router.route(Nav::FocusRight, ALL);
    router.route(Nav::FocusRight, ALL);
    router.route(Nav::Back, ALL);
    assert_eq!(router.focus(), PanelFocus::Dashboard);
}

#[test]
fn graph_does_not_reach_a_conductor_that_is_not_shown() {
    let mut router = router(true, true, 60);
    router.route(Nav::FocusRight, ALL);
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Commits));
    assert!(!router.route(Nav::FocusRight, ALL));
}

#[test]
fn dashboard_reaches_conductor_when_graph_is_hidden() {
    let mut router = router(false, true, 120);
    router.route(Nav::FocusRight, ALL);
    assert_eq!(router.focus(), PanelFocus::Conductor(ConductorSection::List));
    router.route(Nav::FocusLeft, ALL);
    assert_eq!(router.focus(), PanelFocus::Dashboard);
}

#[test]
fn hiding_the_focused_graph_returns_focus_to_dashboard() {
    let mut router = router(true, false, 120);
    router.route(Nav::FocusRight, ALL);
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Commits));

    assert!(!router.toggle_graph(ALL));
    assert_eq!(router.focus(), PanelFocus::Dashboard);
    assert!(!router.layout().is_visible(Panel::Graph));
}

#[test]
fn shrinking_the_terminal_drops_focus_from_vanished_panel() {
    let mut router = router(true, true, 120);
    router.route(Nav::FocusRight, ALL);
    router.route(Nav::FocusRight, ALL);
    router.set_size(60, 40, ALL);
    assert_eq!(router.focus(), PanelFocus::Dashboard);

    router.route(Nav::FocusRight, ALL);
    router.set_size(30, 40, ALL);
    assert_eq!(router.focus(), PanelFocus::Dashboard);
}

#[test]
fn sections_fall_back_when_their_region_disappears() {
    let mut router = router(true, true, 120);
    router.route(Nav::FocusRight, ALL);
    router.set_section(PanelFocus::Graph(GraphSection::Files), ALL);
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Files));
    router.enforce(Sections {
        graph_files: false,
        conductor_detail: true,
    });
    assert_eq!(router.focus(), PanelFocus::Graph(GraphSection::Commits));

    router.route(Nav::FocusRight, ALL);
    router.set_section(PanelFocus::Conductor(ConductorSection::Detail), ALL);
    router.set_size(120, 12, Sections::default());
    assert_eq!(router.focus(), PanelFocus::Conductor(ConductorSection::List));
}

#[test]
fn section_change_for_another_panel_is_ignored() {
    let mut router = router(true, true, 120);
    router.set_section(PanelFocus::Graph(GraphSection::Files), ALL);
    assert_eq!(router.focus(), PanelFocus::Dashboard);
}
