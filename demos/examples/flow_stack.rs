// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A panel flow driven end to end: observation, discovery, projection, and
//! back-navigation with a gated removal.
//!
//! This example shows how to combine:
//! - `trellis_tree` for the live tree, its change journal, and watches,
//! - `trellis_composite` for discovery, role projection, and the request
//!   bridge.
//!
//! Run:
//! - `cargo run -p trellis_demos --example flow_stack`

use trellis_composite::{Bridge, Composite, Notification, Request, SelectionMode, hook_gate};
use trellis_tree::{NodeData, NodeId, RoleFlags, Tag, Tree, Watches};

const FLOW: Tag = Tag(1);
const FLOW_ITEM: Tag = Tag(2);

fn describe(tree: &Tree, label: &str, children: &[NodeId]) {
    println!("\n== {label} ==");
    for &child in children {
        let Some(config) = tree.config(child) else {
            continue;
        };
        println!(
            "  panel @{}: active={} visible={} back={}",
            config.position,
            config.flags.contains(RoleFlags::ACTIVE),
            config.flags.contains(RoleFlags::VISIBLE),
            config.flags.contains(RoleFlags::SHOW_BACK),
        );
    }
}

fn main() {
    let mut tree = Tree::new();
    let flow = tree.insert(None, NodeData::new(FLOW));
    let mut composite = Composite::new(flow, FLOW_ITEM, FLOW, SelectionMode::SingleActive);
    let mut bridge = Bridge::new();
    let mut watches = Watches::new();

    // A watch scoped to the flow's subtree; unrelated churn stays silent.
    let mut fired = 0_u32;
    let watch = watches.observe(flow);

    // Push two panels. Edits are journaled; nothing is observed until commit,
    // so a burst of mutations costs one notification pass.
    let settings = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
    let details = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
    let churn = tree.commit();
    watches.notify(&tree, &churn, |_, _| fired += 1);
    println!("watch fired {fired} time(s) for 2 inserts");

    composite.project(&mut tree);
    describe(&tree, "after push x2 (most recent is active)", composite.children());

    // The details panel carries an exit animation: its removal is deferred on
    // a gate until the animation reports completion.
    let (gate, signal) = hook_gate();
    bridge.set_removal_hook(details, move |_| {
        println!("  (exit animation started)");
        signal.clone()
    });

    // The panel's back control posts a request; the bridge drains it on step.
    bridge.sender().send(Request::Back);
    bridge.step(&mut composite, &mut tree);
    describe(
        &tree,
        "back requested, animation still running",
        composite.children(),
    );

    // Animation done: the next step completes the removal and re-projects.
    gate.resolve();
    bridge.step(&mut composite, &mut tree);
    describe(&tree, "after back", composite.children());
    for notification in bridge.take_notifications() {
        if let Notification::SelectionChanged {
            index, direction, ..
        } = notification
        {
            println!("  -> selection changed: index={index:?} direction={direction:?}");
        }
    }

    assert_eq!(composite.active(), Some(settings));
    watches.disconnect(watch);
}
