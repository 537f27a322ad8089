// tests/program_json.rs
use cga_shapes::{Axiom, Interpreter, Program, Shape, ShapeKind};
use glam::Vec3;

// A parser that emits JSON instead of building the program in-process.
const FACADE: &str = r#"{
  "statements": [
    { "Attribute": { "name": "floor", "value": 3.0 } },
    { "Rule": {
        "predecessor": "lot",
        "successors": [
          { "Operation": { "Extrude": { "distance": { "kind": { "Constant": 9.0 } } } } },
          { "Operation": { "ComponentSplit": {
              "selector": "faces",
              "args": [
                { "selector": "front", "successor": { "Symbol": "facade" } }
              ] } } }
        ] } },
    { "Rule": {
        "predecessor": "facade",
        "successors": [
          { "Operation": { "Split": {
              "axis": "y",
              "pattern": { "items": [
                { "Step": { "size": { "Absolute": { "kind": { "Attribute": "floor" } } },
                            "successor": { "Symbol": "ground" } } },
                { "Step": { "size": { "Relative": { "kind": { "Constant": 1.0 } } },
                            "successor": { "Symbol": "upper" } } }
              ] } } } }
        ] } }
  ]
}"#;

#[test]
fn test_program_loads_from_json() {
    let program: Program = serde_json::from_str(FACADE).unwrap();
    assert_eq!(program.rules().count(), 2);
    assert_eq!(
        program.to_string(),
        "attr floor = 3\n\
         lot --> extrude(9) split(faces) { front: facade }\n\
         facade --> split(y) { floor: ground | ~1: upper }\n"
    );
}

#[test]
fn test_json_program_derives_facade() {
    let program: Program = serde_json::from_str(FACADE).unwrap();
    let derivation = Interpreter::default()
        .run(&program, &Axiom::new("lot", Shape::unit_quad()))
        .unwrap();

    // The front face of a 1 x 9 x 1 box is a 1 x 9 quad, split into a 3-high
    // ground floor and a 6-high remainder.
    let terminals = derivation.terminals();
    assert_eq!(terminals.len(), 2);
    assert!(terminals.iter().all(|s| s.kind() == ShapeKind::Quad));
    assert!((terminals[0].size().y - 3.0).abs() < 1e-5);
    assert!((terminals[1].size().y - 6.0).abs() < 1e-5);
    assert!((terminals[0].measure() + terminals[1].measure() - 9.0).abs() < 1e-4);
}

#[test]
fn test_shapes_serialize_for_export() {
    let terminals = Interpreter::default()
        .run(
            &serde_json::from_str(FACADE).unwrap(),
            &Axiom::new("lot", Shape::unit_quad()),
        )
        .unwrap()
        .into_terminals();

    let json = serde_json::to_value(&terminals).unwrap();
    let first = &json[0]["Quad"];
    assert_eq!(first["size"][1], serde_json::json!(3.0));
    assert_eq!(first["transform"].as_array().map(Vec::len), Some(16));

    let back: Vec<Shape> = serde_json::from_value(json).unwrap();
    assert_eq!(back, terminals);
    assert_eq!(back[0].model_matrix().transform_point3(Vec3::ZERO), back[0].position());
}
