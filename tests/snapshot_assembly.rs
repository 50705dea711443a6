// Integration tests for full snapshot assembly through the public API
#[cfg(test)]
mod tests {
    use serde_json::Value;
    use xds_forge::{RoutingIntent, SnapshotAssembler, XdsError};

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn virtual_host_routes(routes_envelope: &str) -> Vec<Value> {
        let routes = parse(routes_envelope);
        routes["resources"][0]["virtual_hosts"][0]["routes"]
            .as_array()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_secure_origin_example() {
        let mut assembler = SnapshotAssembler::new();
        let snapshot = assembler
            .submit("https://api.example.com", "/v1/", None, None)
            .unwrap();

        let clusters = parse(&snapshot.clusters);
        let cluster = &clusters["resources"][0];
        assert_eq!(cluster["name"], "https://api.example.com");
        assert_eq!(
            cluster["transport_socket"]["typed_config"]["sni"],
            "api.example.com"
        );
        assert_eq!(
            cluster["load_assignment"]["endpoints"][0]["lb_endpoints"][0]["endpoint"]["address"]
                ["socket_address"]["port_value"],
            443
        );

        let routes = virtual_host_routes(&snapshot.routes);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0]["match"]["prefix"], "/v1/");
        assert_eq!(routes[0]["route"]["cluster"], "https://api.example.com");
        assert_eq!(routes[0]["route"]["timeout"], "25s");
    }

    #[test]
    fn test_n_submissions_produce_n_pairs_in_order() {
        let intents = [
            RoutingIntent::new("http://a.internal", "/a/"),
            RoutingIntent::new("https://b.internal:8443", "/b/"),
            RoutingIntent::new("http://c.internal:9000", "/")
                .with_prefix_rewrite("/root/")
                .with_host_rewrite_literal("c.example.com"),
        ];

        let mut assembler = SnapshotAssembler::new();
        for intent in &intents {
            assembler.submit_intent(intent).unwrap();
        }
        let snapshot = assembler.build().unwrap();

        let clusters = parse(&snapshot.clusters);
        let names: Vec<&str> = clusters["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["http://a.internal", "https://b.internal:8443", "http://c.internal:9000"]
        );

        let routes = virtual_host_routes(&snapshot.routes);
        assert_eq!(routes.len(), 3);
        for (route, intent) in routes.iter().zip(&intents) {
            assert_eq!(route["match"]["prefix"], intent.prefix.as_str());
            assert_eq!(route["route"]["cluster"], intent.origin.as_str());
        }
        assert_eq!(routes[2]["route"]["prefix_rewrite"], "/root/");
        assert_eq!(routes[2]["route"]["host_rewrite_literal"], "c.example.com");
        assert!(routes[0]["route"].get("prefix_rewrite").is_none());
    }

    #[test]
    fn test_every_route_references_a_cluster_in_the_same_snapshot() {
        let mut assembler = SnapshotAssembler::new();
        assembler.submit("http://a.internal", "/a", None, None).unwrap();
        assembler.submit("https://b.internal", "/b", None, None).unwrap();
        let snapshot = assembler.build().unwrap();

        let clusters = parse(&snapshot.clusters);
        let cluster_names: Vec<&str> = clusters["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        for route in virtual_host_routes(&snapshot.routes) {
            let target = route["route"]["cluster"].as_str().unwrap();
            assert!(cluster_names.contains(&target));
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut assembler = SnapshotAssembler::new();
        assembler.submit("https://a.internal", "/a", None, None).unwrap();
        assert_eq!(assembler.build().unwrap(), assembler.build().unwrap());
    }

    #[test]
    fn test_blank_prefix_rewrite_is_absent() {
        let mut assembler = SnapshotAssembler::new();
        let snapshot = assembler
            .submit("http://a.internal", "/a", Some("   "), None)
            .unwrap();
        let routes = virtual_host_routes(&snapshot.routes);
        assert!(routes[0]["route"].get("prefix_rewrite").is_none());
    }

    #[test]
    fn test_malformed_origin_changes_nothing() {
        let mut assembler = SnapshotAssembler::new();
        assembler.submit("http://a.internal", "/a", None, None).unwrap();
        let before = assembler.build().unwrap();

        let err = assembler.submit("not-a-url", "/b", None, None).unwrap_err();
        assert!(matches!(err, XdsError::MalformedOrigin { .. }));
        assert_eq!(assembler.clusters().len(), 1);
        assert_eq!(assembler.routes().len(), 1);
        assert_eq!(assembler.build().unwrap(), before);
    }
}
