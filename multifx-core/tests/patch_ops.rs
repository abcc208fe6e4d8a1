//! Orchestration sequences replayed against a scripted host: every
//! test asserts the exact command list (or the resulting edge set) a
//! chain mutation issues.

mod common;

use std::collections::HashSet;

use common::{
    connected_session, connected_session_scripted, drain, mono_plugin, profile, stereo_plugin,
};
use multifx_core::{SessionError, SessionStatus};
use multifx_types::ChainError;

#[test]
fn connecting_enters_passthrough() {
    let (mock, log) = common::MockHost::new();
    let session = multifx_core::Session::with_backend(
        multifx_core::Config::immediate(),
        Box::new(mock),
    );
    assert_eq!(session.status(), SessionStatus::Passthrough);
    assert_eq!(
        drain(&log),
        vec![
            "connect system:capture_1 system:playback_1",
            "connect system:capture_2 system:playback_2",
        ]
    );
}

#[test]
fn bulk_load_wires_capture_to_playback_in_order() {
    let (mut session, log) = connected_session();
    let record = profile(vec![mono_plugin("A"), mono_plugin("B"), mono_plugin("C")]);

    let report = session.load_profile(&record).unwrap();
    assert_eq!(report.added, 3);
    assert!(report.failed_params.is_empty());
    assert_eq!(session.status(), SessionStatus::ChainLoaded);

    assert_eq!(
        drain(&log),
        vec![
            // leave passthrough before the first instance is wired
            "disconnect system:capture_1 system:playback_1",
            "disconnect system:capture_2 system:playback_2",
            "add http://example.org/A 0",
            "add http://example.org/B 1",
            "add http://example.org/C 2",
            "connect system:capture_1 effect_0:in",
            "connect system:capture_2 effect_0:in",
            "connect effect_0:out effect_1:in",
            "connect effect_1:out effect_2:in",
            "connect effect_2:out system:playback_1",
            "connect effect_2:out system:playback_2",
        ]
    );
}

#[test]
fn bulk_load_wires_stereo_pairs() {
    let (mut session, log) = connected_session();
    let record = profile(vec![stereo_plugin("A"), stereo_plugin("B")]);
    session.load_profile(&record).unwrap();

    assert_eq!(
        drain(&log),
        vec![
            "disconnect system:capture_1 system:playback_1",
            "disconnect system:capture_2 system:playback_2",
            "add http://example.org/A 0",
            "add http://example.org/B 1",
            "connect system:capture_1 effect_0:in_l",
            "connect system:capture_2 effect_0:in_r",
            "connect effect_0:out_l effect_1:in_l",
            "connect effect_0:out_r effect_1:in_r",
            "connect effect_1:out_l system:playback_1",
            "connect effect_1:out_r system:playback_2",
        ]
    );
}

#[test]
fn bulk_load_stops_instantiating_after_a_rejected_add() {
    let (mut session, log) =
        connected_session_scripted(&[("add http://example.org/B", -101)]);
    let record = profile(vec![mono_plugin("A"), mono_plugin("B"), mono_plugin("C")]);

    let report = session.load_profile(&record).unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(session.chain().names(), ["A"]);

    assert_eq!(
        drain(&log),
        vec![
            "disconnect system:capture_1 system:playback_1",
            "disconnect system:capture_2 system:playback_2",
            "add http://example.org/A 0",
            "add http://example.org/B 1",
            // C is never attempted; the survivor is still fully wired
            "connect system:capture_1 effect_0:in",
            "connect system:capture_2 effect_0:in",
            "connect effect_0:out system:playback_1",
            "connect effect_0:out system:playback_2",
        ]
    );
}

#[test]
fn loading_an_empty_profile_keeps_passthrough_silent() {
    let (mut session, log) = connected_session();
    let report = session.load_profile(&profile(vec![])).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(session.status(), SessionStatus::Passthrough);
    // already in passthrough: no wiring traffic at all
    assert!(drain(&log).is_empty());
}

#[test]
fn reloading_tears_down_the_live_graph_first() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    session.load_profile(&profile(vec![mono_plugin("C")])).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            // the old board goes away before the new instance 0 exists
            "remove 0",
            "remove 1",
            "add http://example.org/C 0",
            "connect system:capture_1 effect_0:in",
            "connect system:capture_2 effect_0:in",
            "connect effect_0:out system:playback_1",
            "connect effect_0:out system:playback_2",
        ]
    );
    assert_eq!(session.chain().names(), ["C"]);
    assert_eq!(session.status(), SessionStatus::ChainLoaded);
}

#[test]
fn reloading_an_empty_profile_unloads_into_passthrough() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    session.load_profile(&profile(vec![])).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "remove 0",
            "remove 1",
            "connect system:capture_1 system:playback_1",
            "connect system:capture_2 system:playback_2",
        ]
    );
    assert_eq!(session.status(), SessionStatus::Passthrough);
    assert!(session.chain().is_empty());
}

#[test]
fn load_saved_bypass_flags_are_pushed() {
    let (mut session, log) = connected_session();
    let mut plugin = mono_plugin("A");
    plugin.bypass = 1;
    session.load_profile(&profile(vec![plugin])).unwrap();
    assert!(drain(&log).contains(&"bypass 0 1".to_string()));
    assert!(session.chain().get(0).unwrap().bypass);
}

#[test]
fn remove_interior_bridges_the_neighbors() {
    let (mut session, log) = connected_session();
    let record = profile(vec![mono_plugin("A"), mono_plugin("B"), mono_plugin("C")]);
    session.load_profile(&record).unwrap();
    drain(&log);

    session.remove_at(1).unwrap();
    assert_eq!(
        drain(&log),
        vec!["remove 1", "connect effect_0:out effect_2:in"]
    );
    assert_eq!(session.chain().names(), ["A", "C"]);
    let nums: Vec<i32> = session.chain().iter().map(|i| i.num().get()).collect();
    assert_eq!(nums, [0, 2]);
}

#[test]
fn remove_first_rewires_capture_to_the_new_head() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    session.remove_at(0).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "remove 0",
            "connect system:capture_1 effect_1:in",
            "connect system:capture_2 effect_1:in",
        ]
    );
    assert_eq!(session.chain().names(), ["B"]);
}

#[test]
fn remove_last_rewires_the_new_tail_to_playback() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    session.remove_at(1).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "remove 1",
            "connect effect_0:out system:playback_1",
            "connect effect_0:out system:playback_2",
        ]
    );
}

#[test]
fn removing_the_sole_instance_restores_passthrough() {
    let (mut session, log) = connected_session();
    session.load_profile(&profile(vec![mono_plugin("A")])).unwrap();
    drain(&log);

    session.remove_at(0).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "remove 0",
            "connect system:capture_1 system:playback_1",
            "connect system:capture_2 system:playback_2",
        ]
    );
    assert_eq!(session.status(), SessionStatus::Passthrough);
    assert!(session.chain().is_empty());
}

#[test]
fn remove_with_a_stale_position_is_a_clean_no_op() {
    let (mut session, log) = connected_session();
    session.load_profile(&profile(vec![mono_plugin("A")])).unwrap();
    drain(&log);

    let err = session.remove_at(4).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Chain(ChainError::OutOfRange { index: 4, len: 1 })
    ));
    // no commands issued for a rejected mutation
    assert!(drain(&log).is_empty());
    assert_eq!(session.chain().len(), 1);
}

#[test]
fn add_at_end_rewires_exactly_one_boundary() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    let desc =
        multifx_core::catalog::descriptor_from_record(&mono_plugin("C")).unwrap();
    session.add_plugin_end(&desc).unwrap();

    assert_eq!(
        drain(&log),
        vec![
            "add http://example.org/C 2",
            "disconnect effect_1:out system:playback_1",
            "disconnect effect_1:out system:playback_2",
            "connect effect_1:out effect_2:in",
            "connect effect_2:out system:playback_1",
            "connect effect_2:out system:playback_2",
        ]
    );
    assert_eq!(session.chain().names(), ["A", "B", "C"]);
}

#[test]
fn add_to_an_empty_chain_replaces_passthrough() {
    let (mut session, log) = connected_session();
    let desc =
        multifx_core::catalog::descriptor_from_record(&mono_plugin("A")).unwrap();
    session.add_plugin_end(&desc).unwrap();

    assert_eq!(
        drain(&log),
        vec![
            "add http://example.org/A 0",
            "disconnect system:capture_1 system:playback_1",
            "disconnect system:capture_2 system:playback_2",
            "connect system:capture_1 effect_0:in",
            "connect system:capture_2 effect_0:in",
            "connect effect_0:out system:playback_1",
            "connect effect_0:out system:playback_2",
        ]
    );
    assert_eq!(session.status(), SessionStatus::ChainLoaded);
}

#[test]
fn rejected_add_leaves_the_chain_untouched() {
    let (mut session, log) = connected_session_scripted(&[("add ", -101)]);
    let desc =
        multifx_core::catalog::descriptor_from_record(&mono_plugin("A")).unwrap();
    let err = session.add_plugin_end(&desc).unwrap_err();
    assert!(matches!(err, SessionError::AddRejected { code: -101, .. }));
    assert!(session.chain().is_empty());
    // only the add was attempted; no wiring was torn down
    assert_eq!(drain(&log), vec!["add http://example.org/A 0"]);
}

#[test]
fn swap_interior_pair_rewires_three_boundaries() {
    let (mut session, log) = connected_session();
    let record = profile(vec![
        mono_plugin("A"),
        mono_plugin("B"),
        mono_plugin("C"),
        mono_plugin("D"),
    ]);
    session.load_profile(&record).unwrap();
    drain(&log);

    session.swap_adjacent(1).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "disconnect effect_0:out effect_1:in",
            "disconnect effect_1:out effect_2:in",
            "disconnect effect_2:out effect_3:in",
            "connect effect_0:out effect_2:in",
            "connect effect_2:out effect_1:in",
            "connect effect_1:out effect_3:in",
        ]
    );
    assert_eq!(session.chain().names(), ["A", "C", "B", "D"]);
}

#[test]
fn swap_at_both_endpoints_uses_system_ports() {
    let (mut session, log) = connected_session();
    session
        .load_profile(&profile(vec![mono_plugin("A"), mono_plugin("B")]))
        .unwrap();
    drain(&log);

    session.swap_adjacent(0).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            "disconnect system:capture_1 effect_0:in",
            "disconnect system:capture_2 effect_0:in",
            "disconnect effect_0:out effect_1:in",
            "disconnect effect_1:out system:playback_1",
            "disconnect effect_1:out system:playback_2",
            "connect system:capture_1 effect_1:in",
            "connect system:capture_2 effect_1:in",
            "connect effect_1:out effect_0:in",
            "connect effect_0:out system:playback_1",
            "connect effect_0:out system:playback_2",
        ]
    );
    assert_eq!(session.chain().names(), ["B", "A"]);
}

/// Replay a command log against an edge set: connects insert, disconnects remove.
fn replay_edges(edges: &mut HashSet<(String, String)>, commands: &[String]) {
    for command in commands {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        match tokens.as_slice() {
            ["connect", a, b] => {
                edges.insert((a.to_string(), b.to_string()));
            }
            ["disconnect", a, b] => {
                edges.remove(&(a.to_string(), b.to_string()));
            }
            _ => {}
        }
    }
}

#[test]
fn double_swap_restores_order_and_wiring() {
    let (mut session, log) = connected_session();
    let record = profile(vec![mono_plugin("A"), mono_plugin("B"), mono_plugin("C")]);
    session.load_profile(&record).unwrap();

    let mut edges = HashSet::new();
    replay_edges(&mut edges, &drain(&log));
    let original_edges = edges.clone();
    let original_names: Vec<String> =
        session.chain().names().iter().map(|s| s.to_string()).collect();

    session.swap_adjacent(1).unwrap();
    session.swap_adjacent(1).unwrap();
    replay_edges(&mut edges, &drain(&log));

    assert_eq!(edges, original_edges);
    let names: Vec<String> =
        session.chain().names().iter().map(|s| s.to_string()).collect();
    assert_eq!(names, original_names);
}

#[test]
fn mutations_require_a_connection() {
    let mut session = multifx_core::Session::new(multifx_core::Config::immediate());
    assert!(matches!(
        session.load_profile(&profile(vec![mono_plugin("A")])),
        Err(SessionError::NotConnected)
    ));
    assert!(matches!(session.remove_at(0), Err(SessionError::NotConnected)));
    assert!(matches!(session.swap_adjacent(0), Err(SessionError::NotConnected)));
    assert!(matches!(
        session.set_bypass(0, true),
        Err(SessionError::NotConnected)
    ));
}

#[test]
fn bypass_toggle_is_pushed_and_kept_locally() {
    let (mut session, log) = connected_session_scripted(&[("bypass 0 0", -3)]);
    session.load_profile(&profile(vec![mono_plugin("A")])).unwrap();
    drain(&log);

    session.set_bypass(0, true).unwrap();
    assert_eq!(drain(&log), vec!["bypass 0 1"]);
    assert!(session.chain().get(0).unwrap().bypass);

    // host rejects the un-bypass; the model still reflects the intent
    session.set_bypass(0, false).unwrap();
    assert_eq!(drain(&log), vec!["bypass 0 0"]);
    assert!(!session.chain().get(0).unwrap().bypass);
}
