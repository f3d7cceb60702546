use pretty_assertions::assert_eq;

use super::*;
use crate::source::Handoff;
use crate::source::Memory;
use crate::source::QualityReflection;
use crate::source::Session;

fn feature(id: &str, status: FeatureStatus) -> Feature {
    Feature {
        id: id.to_string(),
        category: "core".to_string(),
        description: format!("feature {id}"),
        status,
        phase: 1,
        attempt_count: 0,
        commit_hash: None,
        last_error: None,
    }
}

fn sample() -> ConductorData {
    ConductorData {
        features: vec![
            feature("f1", FeatureStatus::Passed),
            feature("f2", FeatureStatus::InProgress),
            feature("f3", FeatureStatus::Pending),
        ],
        session: Some(Session {
            id: "s".to_string(),
            number: 4,
            status: "active".to_string(),
            progress_notes: String::new(),
        }),
        handoff: Some(Handoff {
            current_task: "wire panels".to_string(),
            next_steps: vec!["tests".to_string(), "docs".to_string()],
            blockers: Vec::new(),
            files_modified: vec!["src/lib.rs".to_string()],
        }),
        quality: vec![QualityReflection {
            reflection_type: "post".to_string(),
            shortcuts_taken: vec!["no retries".to_string()],
            technical_debt: vec!["copy paste".to_string()],
            ..QualityReflection::default()
        }],
        memories: vec![Memory {
            name: "layout".to_string(),
            content: "three columns".to_string(),
            tags: vec!["ui".to_string()],
        }],
    }
}

fn panel(height: usize) -> ConductorPanel {
    let mut panel = ConductorPanel::new(Arc::new(Theme::default()));
    panel.set_size(40, height);
    panel
}

fn kinds(panel: &ConductorPanel) -> Vec<ConductorKind> {
    panel.view().items().iter().map(ConductorItem::kind).collect()
}

#[test]
fn split_reserves_detail_only_above_threshold() {
    assert_eq!(split_heights(15), (15, 0));
    assert_eq!(split_heights(16), (9, 6));
    assert_eq!(split_heights(40), (25, 14));
    assert_eq!(split_heights(0), (1, 0));
}

#[test]
fn pending_features_come_before_passed_and_memories_start_collapsed() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));

    let ids: Vec<&str> = panel
        .view()
        .items()
        .iter()
        .filter_map(|item| match item {
            ConductorItem::Feature { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["f2", "f3", "f1"]);
    assert!(panel.is_collapsed(ConductorGroup::Memories));
    assert_eq!(kinds(&panel).last(), Some(&ConductorKind::MemoryHeader));
}

#[test]
fn handoff_and_quality_rows_carry_their_labels() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));
    let labels: Vec<String> = panel
        .view()
        .items()
        .iter()
        .filter_map(ConductorItem::label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "Task: wire panels",
            "Next: tests",
            "Next: docs",
            "File: src/lib.rs",
            "Shortcut: no retries",
            "Debt: copy paste",
        ]
    );
}

#[test]
fn cursor_never_rests_on_spacers() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));
    for _ in 0..20 {
        panel.handle_nav(ConductorSection::List, Nav::Down);
        assert!(panel.selected().is_some());
    }
    for _ in 0..20 {
        panel.handle_nav(ConductorSection::List, Nav::Up);
        assert!(panel.selected().is_some());
    }
    assert_eq!(
        panel.selected(),
        Some(&ConductorItem::Header(ConductorGroup::Features))
    );
}

#[test]
fn section_jump_visits_every_header_and_wraps() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));
    let mut seen = Vec::new();
    for _ in 0..4 {
        panel.handle_nav(ConductorSection::List, Nav::NextGroup);
        seen.push(panel.selected().map(ConductorItem::kind));
    }
    assert_eq!(
        seen,
        vec![
            Some(ConductorKind::SessionHeader),
            Some(ConductorKind::QualityHeader),
            Some(ConductorKind::MemoryHeader),
            Some(ConductorKind::FeatureHeader),
        ]
    );
}

#[test]
fn open_toggles_headers_and_enters_detail_on_items() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));
    assert_eq!(
        panel.handle_nav(ConductorSection::List, Nav::Open),
        Some(ConductorSection::List)
    );
    assert!(panel.is_collapsed(ConductorGroup::Features));
    assert_eq!(
        kinds(&panel)[..2].to_vec(),
        vec![ConductorKind::FeatureHeader, ConductorKind::SectionSpacer]
    );

    panel.handle_nav(ConductorSection::List, Nav::Open);
    panel.handle_nav(ConductorSection::List, Nav::Down);
    assert_eq!(
        panel.handle_nav(ConductorSection::List, Nav::Open),
        Some(ConductorSection::Detail)
    );
    assert_eq!(
        panel.handle_nav(ConductorSection::Detail, Nav::Back),
        Some(ConductorSection::List)
    );
    assert_eq!(panel.handle_nav(ConductorSection::List, Nav::Back), None);
}

#[test]
fn short_panel_has_no_detail_section() {
    let mut panel = panel(10);
    panel.set_data(Some(sample()));
    panel.handle_nav(ConductorSection::List, Nav::Down);
    assert_eq!(
        panel.handle_nav(ConductorSection::List, Nav::Open),
        Some(ConductorSection::List)
    );
    assert_eq!(
        panel.handle_nav(ConductorSection::List, Nav::FocusDown),
        Some(ConductorSection::List)
    );
    assert_eq!(panel.render(Some(ConductorSection::List)).len(), 10);
}

#[test]
fn detail_follows_cursor() {
    let mut panel = panel(30);
    let mut data = sample();
    data.features[1].commit_hash = Some("abcdef0123456789".to_string());
    data.features[1].attempt_count = 3;
    panel.set_data(Some(data));
    panel.handle_nav(ConductorSection::List, Nav::Down);

    let text: Vec<String> = panel.detail().lines().iter().map(StyledLine::text).collect();
    assert!(text.iter().any(|line| line.starts_with("  desc") && line.ends_with("feature f2")));
    assert!(text.iter().any(|line| line.ends_with("in_progress")));
    assert!(text.iter().any(|line| line.starts_with("  tries") && line.ends_with('3')));
    assert!(text.iter().any(|line| line.ends_with("abcdef012345")));

    panel.handle_nav(ConductorSection::List, Nav::Down);
    let text: Vec<String> = panel.detail().lines().iter().map(StyledLine::text).collect();
    assert!(text.iter().any(|line| line.ends_with("feature f3")));
}

#[test]
fn render_splits_list_divider_and_detail() {
    let mut panel = panel(20);
    panel.set_data(Some(sample()));
    let lines = panel.render(Some(ConductorSection::List));
    let (list, detail) = split_heights(20);
    assert_eq!(lines.len(), list + 1 + detail);
    assert!(lines[list].text().chars().all(|c| c == '─'));
    assert!(lines[0].text().starts_with("▼ Features"));
    assert!(lines[0].text().ends_with("1/3 passed"));
    assert!(lines[0].fill.is_some());
}

#[test]
fn detail_focus_hides_list_cursor() {
    let mut panel = panel(20);
    panel.set_data(Some(sample()));
    let lines = panel.render(Some(ConductorSection::Detail));
    assert!(lines.iter().all(|line| line.fill.is_none()));
}

#[test]
fn refresh_keeps_cursor_and_collapse_choices() {
    let mut panel = panel(30);
    panel.set_data(Some(sample()));
    panel.handle_nav(ConductorSection::List, Nav::Down);
    panel.handle_nav(ConductorSection::List, Nav::Down);
    let before = panel.selected().cloned();

    let mut refreshed = sample();
    refreshed.features.insert(0, feature("f0", FeatureStatus::Pending));
    panel.set_data(Some(refreshed));
    assert_eq!(panel.selected().map(FlatItem::key), before.map(|item| item.key()));
    assert!(panel.is_collapsed(ConductorGroup::Memories));
}

#[test]
fn empty_states() {
    let mut panel = panel(20);
    assert_eq!(panel.render(None)[0].text(), "  No conductor data");
    panel.set_data(Some(ConductorData::default()));
    assert_eq!(panel.render(None)[0].text(), "  No features");
}
