//! End-to-end scenarios over the 6-router demo topology: a ring with unit
//! metrics plus the R1-R4 (metric 3) and R2-R5 (metric 2) shortcuts.

use serde_json::json;

use linkstate_sim::config::demo_topology;
use linkstate_sim::{Delivery, Destination, Network, NextHop};

fn converged_demo() -> Network {
    let mut network = demo_topology().build().unwrap();
    network.update_all_link_states();
    network
}

fn delivered_path(outcome: Delivery) -> Vec<String> {
    match outcome {
        Delivery::Delivered { path, .. } => path,
        other => panic!("expected delivery, got {other:?}"),
    }
}

#[test]
fn every_router_learns_the_whole_topology() {
    let network = converged_demo();

    for id in ["R1", "R2", "R3", "R4", "R5", "R6"] {
        let router = network.router(id).unwrap();
        assert_eq!(router.lsdb().len(), 6, "{id} has an incomplete LSDB");
        // One connected seed plus a route to each of the 5 other routers.
        assert_eq!(router.routing_table().len(), 6, "{id} table incomplete");
    }
}

#[test]
fn all_pairs_deliver_along_shortest_paths() {
    let mut network = converged_demo();
    let ids: Vec<String> = network.router_ids().cloned().collect();

    for src in &ids {
        for dst in &ids {
            if src == dst {
                continue;
            }
            let expected_metric = network
                .router(src)
                .unwrap()
                .find_route(dst)
                .unwrap()
                .metric;

            let path = delivered_path(network.send(src, dst, json!("probe")).unwrap());
            assert_eq!(path.first().unwrap(), src);
            assert_eq!(path.last().unwrap(), dst);

            // Sum the advertised per-hop metrics along the traversed path
            // and compare against the table's cumulative metric.
            let mut cost = 0;
            for pair in path.windows(2) {
                cost += network.router(&pair[0]).unwrap().connections()[&pair[1]].metric;
            }
            assert_eq!(cost, expected_metric, "{src} -> {dst} took a non-shortest path");
        }
    }
}

#[test]
fn r1_to_r4_takes_the_direct_shortcut() {
    // Both R1-R4 (metric 3) and R1-R2-R3-R4 (1+1+1) cost 3. The direct
    // edge is relaxed straight from the source and strictly-less
    // relaxation never replaces it, so the tie deterministically resolves
    // to the shortcut.
    let mut network = converged_demo();

    let route = network.router("R1").unwrap().find_route("R4").unwrap();
    assert_eq!(route.next_hop, NextHop::Router("R4".to_string()));
    assert_eq!(route.metric, 3);

    let path = delivered_path(network.send("R1", "R4", json!("hello")).unwrap());
    assert_eq!(path, vec!["R1", "R4"]);
}

#[test]
fn breaking_the_ring_keeps_r4_reachable_via_the_shortcut() {
    let mut network = converged_demo();
    network.simulate_link_failure("R3", "R4").unwrap();

    // R3 no longer advertises R4 anywhere.
    let r1 = network.router("R1").unwrap();
    assert!(!r1.lsdb()["R3"].contains_key("R4"));

    let path = delivered_path(network.send("R1", "R4", json!("after failure")).unwrap());
    assert_eq!(path, vec!["R1", "R4"]);
}

#[test]
fn r2_to_r6_reroutes_through_r1_after_the_failure() {
    let mut network = converged_demo();
    network.simulate_link_failure("R3", "R4").unwrap();

    let path = delivered_path(network.send("R2", "R6", json!("hi")).unwrap());
    assert_eq!(path, vec!["R2", "R1", "R6"]);
}

#[test]
fn recovery_restores_the_pre_failure_tables() {
    let mut network = converged_demo();
    let before: Vec<_> = network
        .router_ids()
        .cloned()
        .map(|id| network.router(&id).unwrap().routing_table().clone())
        .collect();

    network.simulate_link_failure("R3", "R4").unwrap();
    network
        .simulate_link_recovery("R3", "R4", "eth2", "eth1", 1, 1)
        .unwrap();

    let after: Vec<_> = network
        .router_ids()
        .cloned()
        .map(|id| network.router(&id).unwrap().routing_table().clone())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn isolated_destination_reports_no_route() {
    let mut network = converged_demo();
    network.add_router("R7").unwrap();
    network.update_all_link_states();

    assert_eq!(
        network.send("R1", "R7", json!("anyone home?")).unwrap(),
        Delivery::NoRoute { at: "R1".to_string() }
    );
    assert!(
        network
            .router("R1")
            .unwrap()
            .routing_table()
            .route_to_router("R7")
            .is_none()
    );
}

#[test]
fn connected_prefixes_survive_reconvergence() {
    let mut network = converged_demo();
    network.update_all_link_states();
    network.update_all_link_states();

    let r3 = network.router("R3").unwrap();
    let seed = Destination::Network("192.168.3.0/24".parse().unwrap());
    let route = r3.routing_table().get_route(&seed).unwrap();
    assert_eq!(route.next_hop, NextHop::Connected);
    assert_eq!(route.metric, 0);

    // Seeds come first in the dump.
    assert_eq!(r3.routing_table().iter().next().unwrap().destination, seed);
}

#[test]
fn routing_table_dump_lists_entries_in_order() {
    let network = converged_demo();
    let dump = network.router("R1").unwrap().format_routing_table();

    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines[0], "--- Routing Table for R1 ---");
    assert!(lines[1].starts_with("Destination"));
    assert!(lines[3].starts_with("192.168.1.0/24"));
    assert!(lines[4].starts_with("R2"));
    assert!(dump.contains("directly connected"));
}
