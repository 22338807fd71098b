use triplemap::mapping::{unknown_member, MemberMapping, PathRule, ScalarKind, ValueKind};
use triplemap::{
    ClassMapping, Identity, Mapped, MappingConfig, MappingContext, MappingResult, RdfFormat,
    RdfSerializer, RdfStore, Schema, SchemaError, TriplePattern, Value, View,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Translation {
    x: f64,
    y: f64,
    z: f64,
}

impl Mapped for Translation {
    fn type_name(&self) -> &str {
        "Translation"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "x" => Some(View::scalar(self.x)),
            "y" => Some(View::scalar(self.y)),
            "z" => Some(View::scalar(self.z)),
            _ => None,
        }
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "x" => self.x = value.extract()?,
            "y" => self.y = value.extract()?,
            "z" => self.z = value.extract()?,
            _ => return Err(unknown_member(self.type_name(), member)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Rotation {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

impl Mapped for Rotation {
    fn type_name(&self) -> &str {
        "Rotation"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "x" => Some(View::scalar(self.x)),
            "y" => Some(View::scalar(self.y)),
            "z" => Some(View::scalar(self.z)),
            "w" => Some(View::scalar(self.w)),
            _ => None,
        }
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "x" => self.x = value.extract()?,
            "y" => self.y = value.extract()?,
            "z" => self.z = value.extract()?,
            "w" => self.w = value.extract()?,
            _ => return Err(unknown_member(self.type_name(), member)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Pose {
    name: String,
    translation: Translation,
    rotation: Rotation,
}

impl Mapped for Pose {
    fn type_name(&self) -> &str {
        "Pose"
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        match member {
            "name" => Some(View::scalar(self.name.as_str())),
            "translation" => Some(View::object(&self.translation)),
            "rotation" => Some(View::object(&self.rotation)),
            _ => None,
        }
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        match member {
            "name" => self.name = value.extract()?,
            "translation" => self.translation = value.downcast()?,
            "rotation" => self.rotation = value.downcast()?,
            _ => return Err(unknown_member(self.type_name(), member)),
        }
        Ok(())
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("triplemap v{}", triplemap::version());
    println!("==========================================");
    println!();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = MappingConfig::new("http://example.org/")
        .with_prefix("spatial", "http://example.org/spatial#")
        .with_prefix("maths", "http://example.org/maths#")
        .with_prefix("vom", "http://example.org/vom#");
    let ctx = MappingContext::new(pose_schema()?, config)?;

    println!("=== Demo 1: Write a pose ===");
    let pose = Pose {
        name: "head".to_string(),
        translation: Translation {
            x: 0.5,
            y: 1.25,
            z: -2.0,
        },
        rotation: Rotation {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        },
    };

    let mut store = RdfStore::new();
    let subject = ctx.insert(&mut store, &pose)?;
    println!("✓ Wrote {} as {} ({} statements)", pose.type_name(), subject, store.len());
    println!();
    println!("{}", RdfSerializer::serialize_store(&store, RdfFormat::Turtle)?);

    println!("=== Demo 2: Read it back ===");
    let read: Pose = ctx.load_as(&store, &subject)?;
    println!("✓ Read {:?}", read);
    println!("  Round-trip equal: {}", read == pose);
    println!();

    println!("=== Demo 3: Identity ===");
    let again = ctx.identity_of(&store, &pose)?;
    println!("✓ identityOf(pose) = {} (stable: {})", again, again == subject);

    Ok(())
}

fn pose_schema() -> Result<Schema, SchemaError> {
    let t = |s: &str, p: &str, o: &str| TriplePattern::parse(s, p, o);

    let rotation = ClassMapping::new("Rotation")
        .class_triple(t("$this", "rdf:type", "spatial:Rotation3D")?)
        .class_triple(t("$this", "vom:quantityValue", "_:2")?)
        .class_triple(t("_:2", "rdf:type", "maths:Vector4D")?)
        .class_triple(t("_:2", "rdf:type", "maths:Quaternion")?)
        .member(MemberMapping::new("x", ScalarKind::Float).triple(t("_:2", "maths:x", "$that")?))
        .member(MemberMapping::new("y", ScalarKind::Float).triple(t("_:2", "maths:y", "$that")?))
        .member(MemberMapping::new("z", ScalarKind::Float).triple(t("_:2", "maths:z", "$that")?))
        .member(MemberMapping::new("w", ScalarKind::Float).triple(t("_:2", "maths:w", "$that")?));

    let translation = ClassMapping::new("Translation")
        .class_triple(t("$this", "rdf:type", "spatial:Translation3D")?)
        .class_triple(t("$this", "vom:quantityValue", "_:2")?)
        .class_triple(t("_:2", "rdf:type", "maths:Vector3D")?)
        .member(MemberMapping::new("x", ScalarKind::Float).triple(t("_:2", "maths:x", "$that")?))
        .member(MemberMapping::new("y", ScalarKind::Float).triple(t("_:2", "maths:y", "$that")?))
        .member(MemberMapping::new("z", ScalarKind::Float).triple(t("_:2", "maths:z", "$that")?));

    let pose = ClassMapping::new("Pose")
        .identity(Identity::PathTemplate("poses/{name}".into()))
        .class_triple(t("$this", "rdf:type", "spatial:SpatialRelationship")?)
        .class_triple(t("$this", "spatial:sourceCoordinateSystem", "_:1")?)
        .class_triple(t("_:1", "rdf:type", "maths:LeftHandedCartesianCoordinateSystem3D")?)
        .class_triple(t("$this", "spatial:targetCoordinateSystem", "_:2")?)
        .class_triple(t("_:2", "rdf:type", "maths:RightHandedCartesianCoordinateSystem2D")?)
        .member(MemberMapping::new("name", ScalarKind::String).triple(t("$this", "rdfs:label", "$that")?))
        .member(
            MemberMapping::new("translation", ValueKind::object("Translation"))
                .path(PathRule::relative("/transl"))
                .triple(t("$this", "spatial:translation", "$that")?),
        )
        .member(
            MemberMapping::new("rotation", ValueKind::object("Rotation"))
                .path(PathRule::relative("/rot"))
                .triple(t("$this", "spatial:rotation", "$that")?),
        );

    let mut schema = Schema::new()
        .with_class(rotation)?
        .with_class(translation)?
        .with_class(pose)?;
    schema.register::<Translation>("Translation");
    schema.register::<Rotation>("Rotation");
    schema.register::<Pose>("Pose");
    Ok(schema)
}
