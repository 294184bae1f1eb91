// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use threadline::controller::{IgnoreReason, Outcome};
use threadline::gateway::{MemorySnapshot, Table};
use threadline::model::{NodeKind, Position, ProjectId};
use threadline::view::{aggregate, filter};
use threadline::{CanvasConfig, Controller, Gateway, Gesture, MemoryRemote, View};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("canvas")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
}

fn demo_remote() -> MemoryRemote {
    let snapshot: MemorySnapshot = serde_json::from_str(&read_fixture("store.json")).expect("store fixture");
    MemoryRemote::from_snapshot(snapshot)
}

fn demo_project() -> ProjectId {
    ProjectId::new("p-demo").expect("project id")
}

#[tokio::test]
async fn load_then_process_view_reproduces_the_stored_graph() {
    let remote = demo_remote();
    let gateway = Gateway::new(Arc::new(remote.clone()));
    let loaded = gateway.load_project(&demo_project()).await.expect("load project");

    let mut controller = Controller::new(demo_project(), gateway, CanvasConfig::default());
    let summary = controller.load().await.expect("controller load");
    assert_eq!(summary.nodes, 5);
    assert_eq!(summary.links, 3);
    assert_eq!(summary.dropped_links, 0);
    assert_eq!(summary.skipped_rows, 0);

    let store = controller.store();
    let projection = filter(store.nodes(), store.links(), View::Process);
    assert_eq!(projection.nodes.len(), loaded.nodes.len());
    assert_eq!(projection.links.len(), loaded.links.len());
    for (shown, stored) in projection.nodes.iter().zip(&loaded.nodes) {
        assert_eq!(*shown, stored);
    }
    for (shown, stored) in projection.links.iter().zip(&loaded.links) {
        assert_eq!(*shown, stored);
    }

    // rows of other projects never leak in
    assert!(store.nodes().all(|node| node.id().as_str() != "d-elsewhere"));
    let credit = store.nodes().find(|node| node.id().as_str() == "d-credit").expect("credit");
    assert_eq!(credit.kind(), NodeKind::Choice);
    let portal = store.nodes().find(|node| node.id().as_str() == "d-portal").expect("portal");
    assert_eq!(portal.position(), Position::new(100.0, 100.0));

    let totals = aggregate(store.nodes(), View::Process);
    assert_eq!(totals.queue, 150.0);
    assert_eq!(totals.action, 52.0);
    assert_eq!(totals.total, 202.0);
}

#[tokio::test]
async fn replayed_gesture_script_settles_into_a_consistent_graph() {
    let remote = demo_remote();
    let mut controller = Controller::new(
        demo_project(),
        Gateway::new(Arc::new(remote.clone())),
        CanvasConfig::default(),
    );
    controller.load().await.expect("load");

    let gestures: Vec<Gesture> =
        serde_json::from_str(&read_fixture("gestures.json")).expect("gesture fixture");
    let outcomes = gestures
        .into_iter()
        .map(|gesture| controller.dispatch(gesture))
        .collect::<Vec<_>>();

    assert!(outcomes[0].created_node().is_some());
    assert!(outcomes[2].created_link().is_some());
    assert!(outcomes[3].created_link().is_some());
    assert_eq!(outcomes[8], Outcome::Ignored(IgnoreReason::SelfLoop("d-crm".parse().expect("id"))));
    assert_eq!(outcomes[11], Outcome::Ignored(IgnoreReason::AlreadyConnected));

    controller.settle().await;
    assert_eq!(controller.in_flight(), 0);
    assert!(controller.take_notices().is_empty());

    let store = controller.store();
    assert_eq!(store.nodes().len(), 8);
    assert_eq!(store.links().len(), 4);
    assert!(store.nodes().all(|node| !node.id().is_provisional()));
    assert!(store.links().all(|link| !link.id().is_provisional()));
    for link in store.links() {
        assert!(store.contains_node(link.from_id()));
        assert!(store.contains_node(link.to_id()));
    }

    let process = controller.scene(View::Process);
    assert_eq!(process.totals.queue, 150.0);
    assert_eq!(process.totals.action, 62.0);
    let information = controller.scene(View::Information);
    assert_eq!(information.nodes.len(), 2);
    assert_eq!(information.links.len(), 1);
    let opportunities = controller.scene(View::Opportunities);
    assert_eq!(opportunities.nodes.len(), 1);
    assert_eq!(opportunities.nodes[0].position, Position::new(600.0, 400.0));
    assert!(opportunities.links.is_empty());

    let decisions = remote.rows(Table::Decisions);
    assert_eq!(decisions.len(), 9);
    for title in ["Invoice", "Archive"] {
        assert!(decisions.iter().any(|row| row["title"] == json!(title)), "missing {title}");
    }
    let links = remote.rows(Table::DecisionLinks);
    assert_eq!(links.len(), 4);
    assert!(links.iter().all(|row| row["id"] != json!("l-credit-ship")));

    // a fresh load sees the same graph the controller ended up with
    let mut reloaded = Controller::new(
        demo_project(),
        Gateway::new(Arc::new(remote.clone())),
        CanvasConfig::default(),
    );
    reloaded.load().await.expect("reload");
    assert_eq!(reloaded.scene(View::Process), controller.scene(View::Process));
}

#[tokio::test]
async fn snapshot_survives_a_json_round_trip() {
    let remote = demo_remote();
    let text = serde_json::to_string(&remote.snapshot()).expect("serialize snapshot");
    let restored: MemorySnapshot = serde_json::from_str(&text).expect("parse snapshot");
    assert_eq!(restored, remote.snapshot());
}
