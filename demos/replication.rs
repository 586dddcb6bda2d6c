//! Replication snapshot - encoding a game world for the wire.
//!
//! This example demonstrates:
//! - Building a schema with the builder functions
//! - Registering an enumeration leaf
//! - Packing flags and presence bits into the prefix
//! - Passing a non-serializable handle through the blob side channel
//!
//! ```text
//! cargo run --example replication
//! ```

use std::sync::Arc;

use packwire::leaf::EnumLeaf;
use packwire::{BinarySerializer, Blob, SchemaNode, Value};

/// Server-side resource that never crosses the wire as bytes.
#[derive(Debug)]
struct MeshHandle {
    path: String,
}

fn entity_schema() -> SchemaNode {
    SchemaNode::object([
        ("id", SchemaNode::u32()),
        ("kind", SchemaNode::leaf("entity_kind")),
        (
            "position",
            SchemaNode::tuple(vec![SchemaNode::f32(), SchemaNode::f32()], None),
        ),
        (
            "state",
            SchemaNode::packed(SchemaNode::object([
                ("visible", SchemaNode::bool()),
                ("grounded", SchemaNode::bool()),
                ("target", SchemaNode::optional(SchemaNode::u32())),
            ])),
        ),
        ("mesh", SchemaNode::blob()),
    ])
}

fn entity(id: u32, kind: &str, x: f64, y: f64, target: Option<u32>, mesh: &Blob) -> Value {
    Value::object([
        ("id", Value::from(id)),
        ("kind", Value::from(kind)),
        ("position", Value::Array(vec![Value::Float(x), Value::Float(y)])),
        (
            "state",
            Value::object([
                ("visible", Value::Bool(true)),
                ("grounded", Value::Bool(id % 2 == 0)),
                ("target", Value::from(target)),
            ]),
        ),
        ("mesh", Value::Blob(mesh.clone())),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let serializer = BinarySerializer::builder()
        .leaf(EnumLeaf::new("entity_kind", ["player", "npc", "projectile"])?)
        .build(&SchemaNode::object([
            ("tick", SchemaNode::u32()),
            ("entities", SchemaNode::array(entity_schema())),
        ]))?;

    let packing = serializer.schema().packing();
    println!(
        "schema: packing={} variable={} guaranteed_bits={}",
        packing.has_packing, packing.has_variable_arity_packing, packing.minimum_guaranteed_bits
    );

    let hero = Blob::from_arc(Arc::new(MeshHandle {
        path: "meshes/hero.glb".into(),
    }));
    let arrow = Blob::new(MeshHandle {
        path: "meshes/arrow.glb".into(),
    });

    let snapshot = Value::object([
        ("tick", Value::from(1024u32)),
        (
            "entities",
            Value::Array(vec![
                entity(1, "player", 10.0, 4.5, None, &hero),
                entity(2, "npc", -3.25, 0.0, Some(1), &hero),
                entity(3, "projectile", 11.0, 5.0, Some(2), &arrow),
            ]),
        ),
    ]);

    let encoded = serializer.serialize(&snapshot)?;
    println!(
        "encoded {} bytes, {} blobs: {:02x?}",
        encoded.len(),
        encoded.blobs.len(),
        &encoded.bytes[..]
    );

    let decoded = serializer.deserialize(&encoded.bytes, &encoded.blobs)?;
    assert_eq!(decoded, snapshot);

    if let Some(Value::Array(entities)) = decoded.get("entities") {
        for entity in entities {
            let mesh = entity
                .get("mesh")
                .and_then(Value::as_blob)
                .and_then(|blob| blob.downcast_ref::<MeshHandle>());
            println!(
                "entity {:?} kind={:?} mesh={:?}",
                entity.get("id"),
                entity.get("kind"),
                mesh.map(|m| m.path.as_str())
            );
        }
    }

    Ok(())
}
