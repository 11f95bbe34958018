use fvmesh::prelude::*;

#[test]
fn empty_document_gives_defaults() {
    let config: DecompositionConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, DecompositionConfig::default());
    assert_eq!(config.partitioner, PartitionStrategy::Trivial);
    assert!(config.periodic.is_none());
}

#[test]
fn strategy_names_are_kebab_case() {
    let json = serde_json::to_string(&PartitionStrategy::ExternalGraph).unwrap();
    assert_eq!(json, "\"external-graph\"");
    assert_eq!(PartitionStrategy::ExternalGraph.to_string(), "external-graph");
    let parsed: PartitionStrategy = "External_Graph".parse().unwrap();
    assert_eq!(parsed, PartitionStrategy::ExternalGraph);
    let err = "scotch".parse::<PartitionStrategy>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn periodic_tolerance_defaults_when_omitted() {
    let config: DecompositionConfig = serde_json::from_str(
        r#"{ "partitioner": "external-graph",
             "periodic": { "marker": 4, "partner_marker": 2, "axis": "x" } }"#,
    )
    .unwrap();
    let periodic = config.periodic.as_ref().unwrap();
    assert_eq!(periodic, &PeriodicConfig::new(4, Axis::X).with_partner(2));
    assert_eq!(periodic.tolerance, 1e-6);
    config.validate().unwrap();

    let back: DecompositionConfig =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn non_positive_tolerance_is_rejected() {
    let config = DecompositionConfig {
        partitioner: PartitionStrategy::Trivial,
        periodic: Some(PeriodicConfig::new(1, Axis::Y).with_tolerance(0.0)),
    };
    assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
}

#[test]
fn local_mesh_serialises() {
    let mut global = fvmesh::algs::meshgen::rectangle_mesh(
        4,
        1,
        [0.0, 0.0],
        [4.0, 1.0],
        fvmesh::algs::meshgen::StructuredCell::Quadrilateral,
    )
    .unwrap();
    prepare_global(&mut global, &DecompositionConfig::default()).unwrap();
    let local = decompose(
        &global,
        &DecompositionConfig::default(),
        None,
        ParallelContext::new(0, 2).unwrap(),
    )
    .unwrap();
    let value = serde_json::to_value(&local).unwrap();
    assert_eq!(value["elem_l2g"], serde_json::json!([0, 1]));
    assert_eq!(value["conn_faces"][0]["neighbor_rank"], 1);
}
