use pretty_assertions::assert_eq;

use super::*;

fn lib_rs() -> FileEntry {
    FileEntry::new("src/lib.rs", FileStatus::Modified, Staging::Staged)
}

#[test]
fn entering_a_project_requests_graph_and_conductor_for_first_repo() {
    let mut state = state();
    load_statuses(&mut state);
    assert_eq!(state.dashboard.selected_repo(), None);

    let effects = press(&mut state, Key::Enter);
    assert_eq!(
        effects,
        vec![
            DeckEffect::FetchGraph {
                repo: api(),
                max_commits: 50,
            },
            DeckEffect::FetchConductor { repo: api() },
        ]
    );

    // Expanding the same repo asks for nothing new.
    assert_eq!(press(&mut state, Key::Enter), Vec::new());
}

#[test]
fn moving_to_another_repo_refreshes_its_graph() {
    let mut state = ready();
    for _ in 0..2 {
        assert_eq!(press(&mut state, Key::Char('j')), Vec::new());
    }
    let effects = press(&mut state, Key::Char('j'));
    assert_eq!(
        effects,
        vec![
            DeckEffect::FetchGraph {
                repo: web(),
                max_commits: 50,
            },
            DeckEffect::FetchConductor { repo: web() },
        ]
    );
    assert_eq!(state.graph_repo, Some(web()));
}

#[test]
fn stage_keys_follow_the_selected_row() {
    let mut state = ready();
    assert_eq!(
        press(&mut state, Key::Char('s')),
        vec![DeckEffect::StageAll { repo: api() }]
    );
    assert_eq!(
        press(&mut state, Key::Char('u')),
        vec![DeckEffect::UnstageAll { repo: api() }]
    );

    press(&mut state, Key::Char('j'));
    assert_eq!(
        press(&mut state, Key::Char('u')),
        vec![DeckEffect::Unstage {
            repo: api(),
            path: "src/lib.rs".to_string(),
        }]
    );
    assert_eq!(
        press(&mut state, Key::Char('s')),
        vec![DeckEffect::Stage {
            repo: api(),
            path: "src/lib.rs".to_string(),
        }]
    );
    // Capital letters always act on the whole repo.
    assert_eq!(
        press(&mut state, Key::Char('S')),
        vec![DeckEffect::StageAll { repo: api() }]
    );
}

#[test]
fn stage_keys_do_nothing_on_the_project_list() {
    let mut state = state();
    load_statuses(&mut state);
    assert_eq!(press(&mut state, Key::Char('s')), Vec::new());
    assert_eq!(press(&mut state, Key::Char('S')), Vec::new());
}

#[test]
fn diff_key_and_enter_on_a_file_fetch_its_diff() {
    let mut state = ready();
    assert_eq!(press(&mut state, Key::Char('d')), Vec::new());

    press(&mut state, Key::Char('j'));
    let expected = vec![DeckEffect::FetchFileDiff {
        repo: api(),
        file: lib_rs(),
    }];
    assert_eq!(press(&mut state, Key::Char('d')), expected);
    assert_eq!(press(&mut state, Key::Enter), expected);
}

#[test]
fn diff_view_opens_and_closing_it_refreshes_status() {
    let mut state = ready();
    run_quiet(
        &mut state,
        RuntimeAction::FileDiffFetched {
            repo: api(),
            file: lib_rs(),
            result: Ok("@@ -1 +1 @@\n-a\n+b\n".to_string()),
        },
    );
    assert_eq!(state.active_view(), ActiveView::Diff);

    // Panel shortcuts are not live under the diff view.
    assert_eq!(press(&mut state, Key::Char('g')), Vec::new());
    assert!(state.router.show_graph());

    assert_eq!(
        press(&mut state, Key::Char('s')),
        vec![DeckEffect::Stage {
            repo: api(),
            path: "src/lib.rs".to_string(),
        }]
    );
    assert_eq!(press(&mut state, Key::Char('q')), vec![fetch_status(2)]);
    assert_eq!(state.active_view(), ActiveView::Dashboard);
}

#[test]
fn failed_diff_reports_instead_of_opening() {
    let mut state = ready();
    run_quiet(
        &mut state,
        RuntimeAction::FileDiffFetched {
            repo: api(),
            file: lib_rs(),
            result: Err("bad object".to_string()),
        },
    );
    assert_eq!(state.active_view(), ActiveView::Dashboard);
    assert_eq!(
        feedback(&state),
        Some((FeedbackLevel::Error, "Error: bad object".to_string()))
    );
}

#[test]
fn commit_needs_staged_files() {
    let mut state = ready();
    for _ in 0..3 {
        press(&mut state, Key::Char('j'));
    }
    assert_eq!(state.dashboard.selected_repo().map(|repo| repo.name.as_str()), Some("web"));
    assert_eq!(press(&mut state, Key::Char('c')), Vec::new());
    assert_eq!(state.active_view(), ActiveView::Dashboard);
    assert_eq!(
        feedback(&state),
        Some((FeedbackLevel::Info, "No staged files to commit".to_string()))
    );
}

#[test]
fn commit_view_types_a_message_and_commits_once() {
    let mut state = ready();
    press(&mut state, Key::Char('c'));
    assert_eq!(state.active_view(), ActiveView::Commit);
    assert!(state.captures_text());

    // Enter on an empty message is rejected in place.
    assert_eq!(press(&mut state, Key::Enter), Vec::new());
    let Screen::Commit(view) = &state.screen else {
        panic!("commit view closed");
    };
    assert_eq!(view.error(), Some("Commit message is empty"));

    // `q` and `g` are text here, not shortcuts.
    type_text(&mut state, "fix: quirk in graph");
    assert!(state.router.show_graph());
    let expected = vec![DeckEffect::Commit {
        repo: api(),
        message: "fix: quirk in graph".to_string(),
    }];
    assert_eq!(press(&mut state, Key::Enter), expected);
    assert_eq!(press(&mut state, Key::Enter), Vec::new());

    let Screen::Commit(view) = &state.screen else {
        panic!("commit view closed");
    };
    assert_eq!(view.selected_type(), Some("fix"));
    assert!(view.is_pending());
}

#[test]
fn escape_cancels_the_commit_view() {
    let mut state = ready();
    press(&mut state, Key::Char('c'));
    type_text(&mut state, "wip");
    assert_eq!(press(&mut state, Key::Esc), Vec::new());
    assert_eq!(state.active_view(), ActiveView::Dashboard);
}

#[test]
fn branch_key_fetches_branches_of_selected_repo() {
    let mut state = ready();
    assert_eq!(
        press(&mut state, Key::Char('b')),
        vec![DeckEffect::FetchBranches { repo: api() }]
    );
}

#[test]
fn quit_and_refresh() {
    let mut state = ready();
    assert_eq!(press(&mut state, Key::Char('q')), vec![DeckEffect::Quit]);
    assert_eq!(press(&mut state, Key::Ctrl('c')), vec![DeckEffect::Quit]);
    assert_eq!(
        press(&mut state, Key::Char('r')),
        vec![
            fetch_status(2),
            DeckEffect::FetchGraph {
                repo: api(),
                max_commits: 50,
            },
            DeckEffect::FetchConductor { repo: api() },
        ]
    );
}

#[test]
fn escape_returns_to_the_project_list() {
    let mut state = ready();
    assert_eq!(press(&mut state, Key::Esc), Vec::new());
    assert_eq!(state.dashboard.selected_repo(), None);
    assert_eq!(state.router.focus(), PanelFocus::Dashboard);
}
