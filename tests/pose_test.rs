use triplemap::mapping::{unknown_member, AsAny};
use triplemap::rdf::{Position, RdfStore};
use triplemap::{
    Mapped, MappingConfig, MappingContext, MappingResult, RdfTerm, Schema, Value, View,
};

const POSE_SCHEMA: &str = r#"
classes:
  Rotation:
    triples:
      - ["$this", "rdf:type", "spatial:Rotation3D"]
      - ["$this", "vom:quantityValue", "_:2"]
      - ["_:2", "rdf:type", "maths:Vector4D"]
      - ["_:2", "rdf:type", "maths:Quaternion"]
    members:
      - { name: x, type: float, triples: [["_:2", "maths:x", "$that"]] }
      - { name: y, type: float, triples: [["_:2", "maths:y", "$that"]] }
      - { name: z, type: float, triples: [["_:2", "maths:z", "$that"]] }
      - { name: w, type: float, triples: [["_:2", "maths:w", "$that"]] }
  Translation:
    triples:
      - ["$this", "rdf:type", "spatial:Translation3D"]
      - ["$this", "vom:quantityValue", "_:2"]
      - ["_:2", "rdf:type", "maths:Vector3D"]
    members:
      - { name: x, type: float, triples: [["_:2", "maths:x", "$that"]] }
      - { name: y, type: float, triples: [["_:2", "maths:y", "$that"]] }
      - { name: z, type: float, triples: [["_:2", "maths:z", "$that"]] }
  Pose:
    triples:
      - ["$this", "rdf:type", "spatial:SpatialRelationship"]
      - ["$this", "spatial:sourceCoordinateSystem", "_:1"]
      - ["_:1", "rdf:type", "maths:LeftHandedCartesianCoordinateSystem3D"]
      - ["$this", "spatial:targetCoordinateSystem", "_:2"]
      - ["_:2", "rdf:type", "maths:RightHandedCartesianCoordinateSystem2D"]
    members:
      - name: translation
        type: Translation
        path: /transl
        triples:
          - ["$this", "spatial:translation", "$that"]
      - name: rotation
        type: Rotation
        path: /rot
        triples:
          - ["$this", "spatial:rotation", "$that"]
  Device:
    identity:
      unique_id: uri
    triples:
      - ["$this", "rdf:type", "core:Device"]
    members:
      - name: name
        type: string
        triples:
          - ["$this", "rdfs:label", "$that"]
      - name: head
        type: Pose
        absolute_path: "http://example.com/{device_id}/head"
        triples:
          - ["$this", "core:head", "$that"]
      - name: device_id
        type: string
        direction: writer_only
        triples:
          - ["$this", "core:deviceId", "$that"]
"#;

#[derive(Debug, Default, Clone, PartialEq)]
struct Vector {
    x: f64,
    y: f64,
    z: f64,
    w: Option<f64>,
}

impl Vector {
    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "x" => Some(View::scalar(self.x)),
            "y" => Some(View::scalar(self.y)),
            "z" => Some(View::scalar(self.z)),
            "w" => Some(View::optional(self.w)),
            _ => None,
        }
    }

    fn set(&mut self, type_name: &str, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "x" => self.x = value.extract()?,
            "y" => self.y = value.extract()?,
            "z" => self.z = value.extract()?,
            "w" => self.w = value.extract()?,
            _ => return Err(unknown_member(type_name, member)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Translation(Vector);

impl Mapped for Translation {
    fn type_name(&self) -> &str {
        "Translation"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        self.0.get(member)
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        self.0.set("Translation", member, value)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Rotation(Vector);

impl Mapped for Rotation {
    fn type_name(&self) -> &str {
        "Rotation"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        self.0.get(member)
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        self.0.set("Rotation", member, value)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Pose {
    translation: Translation,
    rotation: Rotation,
}

impl Mapped for Pose {
    fn type_name(&self) -> &str {
        "Pose"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "translation" => Some(View::object(&self.translation)),
            "rotation" => Some(View::object(&self.rotation)),
            _ => None,
        }
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "translation" => self.translation = value.downcast()?,
            "rotation" => self.rotation = value.downcast()?,
            _ => return Err(unknown_member(self.type_name(), member)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Device {
    uri: String,
    name: String,
    device_id: String,
    head: Pose,
}

impl Mapped for Device {
    fn type_name(&self) -> &str {
        "Device"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "uri" => Some(View::scalar(self.uri.as_str())),
            "name" => Some(View::scalar(self.name.as_str())),
            "device_id" => Some(View::scalar(self.device_id.as_str())),
            "head" => Some(View::object(&self.head)),
            _ => None,
        }
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "uri" => self.uri = value.extract()?,
            "name" => self.name = value.extract()?,
            "device_id" => self.device_id = value.extract()?,
            "head" => self.head = value.downcast()?,
            _ => return Err(unknown_member(self.type_name(), member)),
        }
        Ok(())
    }
}

fn context() -> MappingContext {
    let mut schema = Schema::from_yaml_str(POSE_SCHEMA).unwrap();
    schema.register::<Translation>("Translation");
    schema.register::<Rotation>("Rotation");
    schema.register::<Pose>("Pose");
    schema.register::<Device>("Device");

    let config = MappingConfig::new("http://example.com/")
        .with_prefix("spatial", "http://example.org/spatial#")
        .with_prefix("maths", "http://example.org/maths#")
        .with_prefix("vom", "http://example.org/vom#")
        .with_prefix("core", "http://example.org/core#");
    MappingContext::new(schema, config).unwrap()
}

fn pose(offset: f64) -> Pose {
    Pose {
        translation: Translation(Vector {
            x: 1.0 + offset,
            y: 2.0 + offset,
            z: 3.0 + offset,
            w: None,
        }),
        rotation: Rotation(Vector {
            x: 0.0,
            y: 0.0,
            z: offset.sin(),
            w: Some(offset.cos()),
        }),
    }
}

fn objects_of(store: &RdfStore, subject: &RdfTerm, predicate: &str) -> Vec<RdfTerm> {
    store
        .iter()
        .filter(|t| t.term_at(Position::Subject) == *subject)
        .filter(|t| t.predicate.as_named_node().as_str() == predicate)
        .map(|t| t.term_at(Position::Object))
        .collect()
}

#[test]
fn test_pose_round_trip() {
    let ctx = context();
    let mut store = RdfStore::new();

    let original = pose(0.5);
    let subject = ctx.insert(&mut store, &original).unwrap();
    assert!(subject.is_blank_node());

    // Pose: 5 class triples + 2 member triples
    // Translation: 3 class triples + 3 members; Rotation: 4 class triples + 4 members
    assert_eq!(store.len(), 7 + 6 + 8);

    let back: Pose = ctx.load_as(&store, &subject).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_relative_paths_under_blank_pose() {
    let ctx = context();
    let mut store = RdfStore::new();
    let subject = ctx.insert(&mut store, &pose(0.0)).unwrap();

    // A blank pose has no IRI to join "/transl" onto
    let translation = objects_of(&store, &subject, "http://example.org/spatial#translation");
    assert_eq!(translation.len(), 1);
    assert!(translation[0].is_blank_node());
}

#[test]
fn test_device_head_pose() {
    let ctx = context();
    let mut store = RdfStore::new();

    let device = Device {
        uri: "devices/hmd-1".to_string(),
        name: "Headset".to_string(),
        device_id: "hmd-1".to_string(),
        head: pose(0.25),
    };
    let subject = ctx.insert(&mut store, &device).unwrap();
    assert_eq!(subject.as_iri(), Some("http://example.com/devices/hmd-1"));

    let head = objects_of(&store, &subject, "http://example.org/core#head");
    assert_eq!(head.len(), 1);
    assert_eq!(head[0].as_iri(), Some("http://example.com/hmd-1/head"));

    let translation = objects_of(&store, &head[0], "http://example.org/spatial#translation");
    assert_eq!(translation[0].as_iri(), Some("http://example.com/hmd-1/head/transl"));
    let rotation = objects_of(&store, &head[0], "http://example.org/spatial#rotation");
    assert_eq!(rotation[0].as_iri(), Some("http://example.com/hmd-1/head/rot"));

    let back: Device = ctx.load_as(&store, &subject).unwrap();
    assert_eq!(back.name, "Headset");
    assert_eq!(back.head, device.head);
    // Writer-only, and the unique id is never asserted as a triple
    assert_eq!(back.device_id, "");
    assert_eq!(back.uri, "");
}

#[test]
fn test_two_poses_keep_their_own_blank_nodes() {
    let ctx = context();
    let mut store = RdfStore::new();

    let first = pose(1.0);
    let second = pose(2.0);
    let a = ctx.insert(&mut store, &first).unwrap();
    let b = ctx.insert(&mut store, &second).unwrap();

    let source_a = objects_of(&store, &a, "http://example.org/spatial#sourceCoordinateSystem");
    let source_b = objects_of(&store, &b, "http://example.org/spatial#sourceCoordinateSystem");
    assert_ne!(source_a, source_b);

    assert_eq!(ctx.load_as::<Pose, _>(&store, &a).unwrap(), first);
    assert_eq!(ctx.load_as::<Pose, _>(&store, &b).unwrap(), second);
}

#[test]
fn test_load_uses_registered_factories() {
    let ctx = context();
    let mut store = RdfStore::new();
    let original = pose(0.75);
    let subject = ctx.insert(&mut store, &original).unwrap();

    let loaded = ctx.load(&store, &subject, "Pose").unwrap();
    let typed = loaded.as_ref().as_any().downcast_ref::<Pose>().unwrap();
    assert_eq!(typed, &original);
}
