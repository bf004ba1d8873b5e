//! Unit tests for av-spatial.
//!
//! Network tests use hand-crafted graphs; generator tests run the real
//! generator under fixed seeds and assert its postconditions.

#[cfg(test)]
mod helpers {
    use av_core::{GeoPoint, NodeId};

    use crate::RoadNetwork;

    /// Three nodes on the equator, ~11 km apart, chained 0 ↔ 1 ↔ 2.
    pub fn line_network() -> (RoadNetwork, [NodeId; 3]) {
        let mut net = RoadNetwork::new();
        let a = net.add_node("A", GeoPoint::new(0.0, 0.0));
        let b = net.add_node("B", GeoPoint::new(0.0, 0.1));
        let c = net.add_node("C", GeoPoint::new(0.0, 0.2));
        net.add_road(a, b, 50).unwrap();
        net.add_road(b, c, 60).unwrap();
        (net, [a, b, c])
    }
}

// ── Network structure ─────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use av_core::{GeoPoint, NodeId};

    use crate::{RoadNetwork, SpatialError};

    #[test]
    fn empty_network() {
        let net = RoadNetwork::new();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.link_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_node(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn sequential_ids_and_lookup() {
        let (net, [a, b, c]) = super::helpers::line_network();
        assert_eq!((a, b, c), (NodeId(0), NodeId(1), NodeId(2)));
        assert_eq!(net.node(b).unwrap().name, "B");
        assert!(net.node(NodeId(99)).is_none());
        assert!(net.contains(c));
        assert!(!net.contains(NodeId(3)));
    }

    #[test]
    fn bidirectional_road_inserts_both_links() {
        let (net, [a, b, _]) = super::helpers::line_network();
        assert_eq!(net.link_count(), 4);
        assert!(net.out_links(a).iter().any(|l| l.to == b));
        assert!(net.out_links(b).iter().any(|l| l.to == a));
    }

    #[test]
    fn directed_link_is_one_way() {
        let mut net = RoadNetwork::new();
        let a = net.add_node("a", GeoPoint::new(0.0, 0.0));
        let b = net.add_node("b", GeoPoint::new(0.0, 0.1));
        net.add_link(a, b, 50).unwrap();
        assert_eq!(net.out_degree(a), 1);
        assert_eq!(net.out_degree(b), 0);
    }

    #[test]
    fn link_distance_cached_from_endpoints() {
        let (net, [a, b, _]) = super::helpers::line_network();
        let link = net.out_links(a)[0];
        let expected = net.node(a).unwrap().pos.distance_km(net.node(b).unwrap().pos);
        assert!((link.distance_km - expected).abs() < 1e-12);
        assert!((link.distance_km - 11.12).abs() < 0.01, "got {}", link.distance_km);
    }

    #[test]
    fn out_links_keep_insertion_order() {
        let mut net = RoadNetwork::new();
        let hub = net.add_node("hub", GeoPoint::new(0.0, 0.0));
        let spokes: Vec<_> = (1..=3)
            .map(|i| net.add_node(format!("s{i}"), GeoPoint::new(0.0, 0.1 * i as f64)))
            .collect();
        for &s in &spokes {
            net.add_link(hub, s, 50).unwrap();
        }
        let order: Vec<_> = net.out_links(hub).iter().map(|l| l.to).collect();
        assert_eq!(order, spokes);
    }

    #[test]
    fn dangling_link_is_loud() {
        let mut net = RoadNetwork::new();
        let a = net.add_node("a", GeoPoint::new(0.0, 0.0));
        let missing = NodeId(7);
        let err = net.add_link(a, missing, 50).unwrap_err();
        assert!(matches!(err, SpatialError::NodeNotFound(id) if id == missing));
        assert_eq!(net.link_count(), 0);
    }

    #[test]
    fn node_equality_is_by_id() {
        let mut net = RoadNetwork::new();
        let a = net.add_node("same-spot", GeoPoint::new(1.0, 1.0));
        let b = net.add_node("same-spot", GeoPoint::new(1.0, 1.0));
        assert_ne!(net.node(a).unwrap(), net.node(b).unwrap());
    }

    #[test]
    fn nearest_node_snaps() {
        let (net, [a, b, _]) = super::helpers::line_network();
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.01)).unwrap(), a);
        assert_eq!(net.nearest_node(GeoPoint::new(0.01, 0.09)).unwrap(), b);
    }

    #[test]
    fn k_nearest_sorted_by_distance() {
        let (net, [a, b, c]) = super::helpers::line_network();
        let near = net.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 3);
        assert_eq!(near, vec![a, b, c]);
    }
}

// ── Generator postconditions ──────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use av_core::SimRng;

    use crate::generator::undirected_components;
    use crate::{GeneratorConfig, NetworkGenerator};

    #[test]
    fn node_count_within_configured_range() {
        let generator = NetworkGenerator::default();
        let config = generator.config().clone();
        for seed in 0..5 {
            let net = generator.generate(&mut SimRng::new(seed)).unwrap();
            assert!(
                (config.min_nodes..=config.max_nodes).contains(&net.node_count()),
                "seed {seed}: {} nodes",
                net.node_count()
            );
        }
    }

    #[test]
    fn every_node_has_a_road() {
        let generator = NetworkGenerator::default();
        for seed in 0..10 {
            let net = generator.generate(&mut SimRng::new(seed)).unwrap();
            for node in net.nodes() {
                assert!(
                    net.out_degree(node.id) >= 1,
                    "seed {seed}: {} is isolated",
                    node.id
                );
            }
        }
    }

    #[test]
    fn single_connected_component() {
        let generator = NetworkGenerator::default();
        for seed in 0..10 {
            let net = generator.generate(&mut SimRng::new(seed)).unwrap();
            let components = undirected_components(&net);
            assert_eq!(components.len(), 1, "seed {seed}");
            assert_eq!(components[0].len(), net.node_count());
        }
    }

    #[test]
    fn speed_limits_come_from_the_configured_set() {
        let generator = NetworkGenerator::default();
        let limits = generator.config().speed_limits_kmh.clone();
        let net = generator.generate(&mut SimRng::new(3)).unwrap();
        for node in net.nodes() {
            for link in net.out_links(node.id) {
                assert!(limits.contains(&link.speed_limit_kmh));
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_map() {
        let generator = NetworkGenerator::default();
        let one = generator.generate(&mut SimRng::new(99)).unwrap();
        let two = generator.generate(&mut SimRng::new(99)).unwrap();
        assert_eq!(one.node_count(), two.node_count());
        assert_eq!(one.link_count(), two.link_count());
        for (a, b) in one.nodes().iter().zip(two.nodes()) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(one.out_links(a.id), two.out_links(b.id));
        }
    }

    #[test]
    fn components_of_hand_built_graphs() {
        use av_core::GeoPoint;

        use crate::RoadNetwork;

        let mut net = RoadNetwork::new();
        let a = net.add_node("a", GeoPoint::new(0.0, 0.0));
        let b = net.add_node("b", GeoPoint::new(0.0, 0.1));
        let c = net.add_node("c", GeoPoint::new(1.0, 0.0));
        let d = net.add_node("d", GeoPoint::new(1.0, 0.1));
        net.add_road(a, b, 50).unwrap();
        // One-way link still merges components in the undirected view.
        net.add_link(d, c, 50).unwrap();

        let components = undirected_components(&net);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec![a, b]);
        assert_eq!(components[1], vec![c, d]);
    }

    #[test]
    fn small_maps_generate_too() {
        let config = GeneratorConfig {
            min_nodes: 2,
            max_nodes: 4,
            ..GeneratorConfig::default()
        };
        let generator = NetworkGenerator::new(config);
        for seed in 0..20 {
            let net = generator.generate(&mut SimRng::new(seed)).unwrap();
            assert_eq!(undirected_components(&net).len(), 1, "seed {seed}");
        }
    }
}
