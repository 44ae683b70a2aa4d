use std::sync::atomic::{AtomicBool, Ordering};

use fairview_core::{
    AllocationConfiguration, ClusterContext, LeafAppState, QueueAllocation, QueueNode,
    QueueShares, Resource, SchedulingPolicy, ZeroCapacityPolicy, UNBOUNDED_MAX_APPS,
};

use super::*;
use crate::error::SummaryError;

const CLUSTER: Resource = Resource::new(100, 10);

fn leaf(name: &str) -> QueueNode {
    QueueNode::leaf(name, SchedulingPolicy::Fair)
}

fn parent(name: &str, children: Vec<QueueNode>) -> QueueNode {
    let node = QueueNode::parent(name, SchedulingPolicy::Drf);
    let p = node.as_parent().unwrap();
    for child in children {
        p.add_child(child);
    }
    node
}

/// root
/// ├── root.reservations (3 children)
/// └── root.adhoc (leaf)
fn reservation_tree() -> QueueNode {
    parent(
        "root",
        vec![
            parent(
                "root.reservations",
                vec![
                    leaf("root.reservations.r1"),
                    leaf("root.reservations.r2"),
                    leaf("root.reservations.r3"),
                ],
            ),
            leaf("root.adhoc"),
        ],
    )
}

fn reservable(show: bool) -> AllocationConfiguration {
    AllocationConfiguration::new().with_queue(
        "root.reservations",
        QueueAllocation {
            max_apps: None,
            reservable: true,
            show_reservation_as_queues: show,
        },
    )
}

fn build(queue: &QueueNode, alloc: &AllocationConfiguration) -> QueueSummary {
    let ctx = SummaryContext::with_cluster_resource(CLUSTER, alloc);
    QueueSummary::build(queue, &ctx).expect("build")
}

fn names(summaries: &[QueueSummary]) -> Vec<&str> {
    summaries.iter().map(|s| s.queue_name.as_str()).collect()
}

#[test]
fn used_fraction_is_exact_quarter() {
    let q = leaf("root.a");
    q.base().set_resource_usage(Resource::new(25, 1));
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.used_resources, Resource::new(25, 1));
    assert_eq!(s.cluster_resources, CLUSTER);
    assert_eq!(s.used_memory_fraction, 0.25);
}

#[test]
fn share_fractions_use_memory_only() {
    let q = leaf("root.a");
    q.base().set_shares(QueueShares {
        min_share: Resource::new(10, 10),
        max_share: Resource::new(50, 1),
        fair_share: Resource::new(40, 0),
        steady_fair_share: Resource::new(20, 9),
    });
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.min_share_memory_fraction, 0.1);
    assert_eq!(s.max_share_memory_fraction, 0.5);
    assert_eq!(s.fair_share_memory_fraction, 0.4);
    assert_eq!(s.steady_fair_share_memory_fraction, 0.2);
    assert_eq!(s.min_resources, Resource::new(10, 10));
    assert_eq!(s.fair_resources, Resource::new(40, 0));
    assert_eq!(s.steady_fair_resources, Resource::new(20, 9));
}

#[test]
fn max_resources_clamped_to_cluster() {
    let q = leaf("root.a");
    q.base().set_shares(QueueShares {
        max_share: Resource::new(1000, 5),
        ..QueueShares::default()
    });
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.max_resources, Resource::new(100, 5));
    assert_eq!(s.max_share_memory_fraction, 1.0);
}

#[test]
fn max_resources_clamped_for_parent_queues() {
    let root = reservation_tree();
    let s = build(&root, &AllocationConfiguration::new());
    assert!(!s.is_leaf());
    // default max share is unbounded in every dimension
    assert_eq!(s.max_resources, CLUSTER);
    for summary in s.iter() {
        assert!(summary.max_resources.fits_in(&summary.cluster_resources));
    }
}

#[test]
fn reservable_hidden_omits_children() {
    let root = reservation_tree();
    let s = build(&root, &reservable(false));
    let res = s.find("root.reservations").expect("reservations present");

    assert!(!res.is_leaf());
    assert_eq!(res.child_queues(), None);
    assert!(matches!(res.kind, SummaryKind::Parent { child_queues: None }));

    // the rest of the tree is unaffected
    assert_eq!(names(s.child_queues().unwrap()), vec!["root.reservations", "root.adhoc"]);
    assert!(s.find("root.reservations.r1").is_none());
}

#[test]
fn reservable_shown_expands_children_in_order() {
    let root = reservation_tree();
    let s = build(&root, &reservable(true));
    let res = s.find("root.reservations").unwrap();
    let children = res.child_queues().expect("children expanded");
    assert_eq!(
        names(children),
        vec![
            "root.reservations.r1",
            "root.reservations.r2",
            "root.reservations.r3"
        ]
    );
}

#[test]
fn non_reservable_childless_parent_has_empty_children() {
    let q = parent("root.empty", vec![]);
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.child_queues(), Some(&[][..]));
    assert!(matches!(
        s.kind,
        SummaryKind::Parent { child_queues: Some(ref c) } if c.is_empty()
    ));
}

#[test]
fn json_distinguishes_absent_and_empty_children() {
    let hidden = build(&reservation_tree(), &reservable(false));
    let json = serde_json::to_value(hidden.find("root.reservations").unwrap()).unwrap();
    assert_eq!(json["type"], "parent");
    assert!(json.get("child_queues").is_none());

    let empty = build(&parent("root.empty", vec![]), &AllocationConfiguration::new());
    let json = serde_json::to_value(&empty).unwrap();
    assert_eq!(json["child_queues"], serde_json::json!([]));
}

#[test]
fn json_leaf_carries_type_and_leaf_fields() {
    let s = build(&leaf("root.a"), &AllocationConfiguration::new());
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["type"], "leaf");
    assert_eq!(json["queue_name"], "root.a");
    assert_eq!(json["scheduling_policy"], "fair");
    assert!(json.get("num_active_apps").is_some());
    assert!(json.get("child_queues").is_none());
    assert_eq!(json["cluster_resources"]["memory_mb"], 100);
}

#[test]
fn children_dispatch_on_their_own_kind() {
    let root = parent(
        "root",
        vec![leaf("root.l"), parent("root.p", vec![leaf("root.p.x")])],
    );
    let s = build(&root, &AllocationConfiguration::new());
    let children = s.child_queues().unwrap();
    assert_eq!(children.len(), 2);

    assert!(children[0].is_leaf());
    assert!(children[0].leaf_details().is_some());
    assert_eq!(children[0].child_queues(), None);

    assert!(!children[1].is_leaf());
    assert!(children[1].leaf_details().is_none());
    assert_eq!(names(children[1].child_queues().unwrap()), vec!["root.p.x"]);
}

#[test]
fn leaf_root_yields_leaf_summary() {
    let s = build(&leaf("root.only"), &AllocationConfiguration::new());
    assert!(s.is_leaf());
}

#[test]
fn reservable_flag_on_leaf_has_no_effect() {
    let alloc = AllocationConfiguration::new().with_queue(
        "root.a",
        QueueAllocation {
            reservable: true,
            ..Default::default()
        },
    );
    let s = build(&leaf("root.a"), &alloc);
    assert!(s.is_leaf());
}

#[test]
fn leaf_details_are_copied_and_am_max_clamped() {
    let q = leaf("root.a");
    q.as_leaf().unwrap().set_app_state(LeafAppState {
        runnable_apps: 4,
        non_runnable_apps: 2,
        demand: Resource::new(80, 8),
        am_resource_usage: Resource::new(5, 1),
        max_am_resource: Resource::new(500, 3),
        preemptable: false,
    });
    let s = build(&q, &AllocationConfiguration::new());
    let d = s.leaf_details().unwrap();
    assert_eq!(d.num_active_apps, 4);
    assert_eq!(d.num_pending_apps, 2);
    assert_eq!(d.demand_resources, Resource::new(80, 8));
    assert_eq!(d.am_used_resources, Resource::new(5, 1));
    assert_eq!(d.am_max_resources, Resource::new(100, 3));
    assert!(!d.preemptable);
}

#[test]
fn counters_and_policy_are_copied() {
    let q = QueueNode::parent("root", SchedulingPolicy::Fifo);
    let m = q.base().metrics();
    m.set_pending_containers(7);
    m.set_allocated_containers(3);
    m.set_reserved_containers(1);
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.scheduling_policy, "fifo");
    assert_eq!(s.pending_containers, 7);
    assert_eq!(s.allocated_containers, 3);
    assert_eq!(s.reserved_containers, 1);
}

#[test]
fn max_apps_from_config_or_default() {
    let alloc = AllocationConfiguration::new().with_queue(
        "root.adhoc",
        QueueAllocation {
            max_apps: Some(12),
            ..Default::default()
        },
    );
    let s = build(&reservation_tree(), &alloc);
    assert_eq!(s.find("root.adhoc").unwrap().max_apps, 12);
    assert_eq!(s.max_apps, UNBOUNDED_MAX_APPS);
}

#[test]
fn repeated_builds_are_identical() {
    let root = reservation_tree();
    root.base().set_resource_usage(Resource::new(33, 3));
    let alloc = reservable(true);
    let first = build(&root, &alloc);
    let second = build(&root, &alloc);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn zero_memory_reports_zero_fractions_everywhere() {
    let root = reservation_tree();
    for q in root.child_queues() {
        q.base().set_resource_usage(Resource::new(10, 1));
    }
    let alloc = reservable(true);
    let ctx = SummaryContext::with_cluster_resource(Resource::new(0, 10), &alloc);
    let s = QueueSummary::build(&root, &ctx).unwrap();

    assert_eq!(s.iter().count(), 6);
    for q in s.iter() {
        for f in [
            q.used_memory_fraction,
            q.steady_fair_share_memory_fraction,
            q.fair_share_memory_fraction,
            q.min_share_memory_fraction,
            q.max_share_memory_fraction,
        ] {
            assert_eq!(f, 0.0, "queue {}", q.queue_name);
        }
    }
}

#[test]
fn zero_memory_rejected_when_configured() {
    let alloc = AllocationConfiguration::new();
    let ctx = SummaryContext::with_cluster_resource(Resource::none(), &alloc)
        .zero_capacity(ZeroCapacityPolicy::Reject);
    let err = QueueSummary::build(&reservation_tree(), &ctx).unwrap_err();
    assert!(matches!(err, SummaryError::ZeroClusterCapacity { ref queue } if queue == "root"));
}

#[test]
fn context_snapshots_cluster_once() {
    let cluster = ClusterContext::new(CLUSTER);
    let alloc = AllocationConfiguration::new();
    let ctx = SummaryContext::new(&cluster, &alloc);
    cluster.set_cluster_resource(Resource::new(400, 40));

    let s = QueueSummary::build(&reservation_tree(), &ctx).unwrap();
    for q in s.iter() {
        assert_eq!(q.cluster_resources, CLUSTER);
    }
}

#[test]
fn build_subtree_finds_nested_queue() {
    let root = reservation_tree();
    let alloc = reservable(true);
    let ctx = SummaryContext::with_cluster_resource(CLUSTER, &alloc);
    let s = QueueSummary::build_subtree(&root, "root.reservations", &ctx).unwrap();
    assert_eq!(s.queue_name, "root.reservations");
    assert_eq!(s.child_queues().unwrap().len(), 3);

    let err = QueueSummary::build_subtree(&root, "root.nope", &ctx).unwrap_err();
    assert!(matches!(err, SummaryError::QueueNotFound(ref n) if n == "root.nope"));
}

#[test]
fn iter_is_pre_order() {
    let s = build(&reservation_tree(), &reservable(true));
    let order: Vec<&str> = s.iter().map(|q| q.queue_name.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "root",
            "root.reservations",
            "root.reservations.r1",
            "root.reservations.r2",
            "root.reservations.r3",
            "root.adhoc",
        ]
    );
}

#[test]
fn build_tolerates_concurrent_mutation() {
    let root = reservation_tree();
    let alloc = AllocationConfiguration::new();
    let cluster = ClusterContext::new(CLUSTER);
    let done = AtomicBool::new(false);
    let target = root.find("root.adhoc").unwrap();
    let reservations = root.find("root.reservations").unwrap();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let res = reservations.as_parent().unwrap();
            let mut i = 0u64;
            while !done.load(Ordering::Relaxed) {
                target.base().set_resource_usage(Resource::new(i % 100, 1));
                target.base().metrics().set_pending_containers(2);
                target.base().metrics().allocate_pending();
                if let Some(r2) = res.remove_child("root.reservations.r2") {
                    res.add_child(r2);
                }
                cluster.add_node(Resource::new(1, 1));
                i += 1;
            }
        });

        for _ in 0..200 {
            let ctx = SummaryContext::new(&cluster, &alloc);
            let s = QueueSummary::build(&root, &ctx).unwrap();

            for q in s.iter() {
                assert_eq!(q.cluster_resources, ctx.cluster_resource());
                assert!(q.max_resources.fits_in(&q.cluster_resources));
            }

            let adhoc = s.find("root.adhoc").unwrap();
            assert!(adhoc.used_memory_fraction >= 0.0 && adhoc.used_memory_fraction < 1.0);

            let res = s.find("root.reservations").unwrap();
            let children = names(res.child_queues().unwrap());
            assert!(children.len() == 2 || children.len() == 3, "{:?}", children);
            assert!(children.iter().all(|n| n.starts_with("root.reservations.r")));
        }
        done.store(true, Ordering::Relaxed);
    });

    // r2 is detached and re-attached, never lost
    assert_eq!(reservations.child_queues().len(), 3);
}

#[test]
fn leaf_without_am_ceiling_reports_cluster_total() {
    let q = leaf("root.a");
    let s = build(&q, &AllocationConfiguration::new());
    assert_eq!(s.leaf_details().unwrap().am_max_resources, CLUSTER);
}

#[test]
fn children_added_after_build_are_not_reflected() {
    let root = parent("root", vec![leaf("root.a")]);
    let alloc = AllocationConfiguration::new();
    let s = build(&root, &alloc);
    root.as_parent().unwrap().add_child(leaf("root.b"));

    assert_eq!(names(s.child_queues().unwrap()), vec!["root.a"]);
    let again = build(&root, &alloc);
    assert_eq!(names(again.child_queues().unwrap()), vec!["root.a", "root.b"]);
}
