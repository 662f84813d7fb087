use std::sync::Once;

use minecraft_schematic_assembler::{
    assemble, generate_litematic, litematic, AssemblyError, BlockPosition, Direction, Document, DocumentError,
    Error, GenerationConfig, PlacementRule,
};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn xyz(x: i32, y: i32, z: i32) -> NbtTag {
    let mut compound = NbtCompound::new();
    compound.insert("x", NbtTag::Int(x));
    compound.insert("y", NbtTag::Int(y));
    compound.insert("z", NbtTag::Int(z));
    NbtTag::Compound(compound)
}

fn unit_region(size: (i32, i32, i32)) -> NbtCompound {
    let mut palette = NbtList::new();
    let mut stone = NbtCompound::new();
    stone.insert("Name", NbtTag::String("minecraft:stone".to_string()));
    palette.push(NbtTag::Compound(stone));

    let mut region = NbtCompound::new();
    region.insert("Position", xyz(0, 0, 0));
    region.insert("Size", xyz(size.0, size.1, size.2));
    region.insert("BlockStatePalette", NbtTag::List(palette));
    region.insert("BlockStates", NbtTag::LongArray(vec![0, 0, 0, 0]));
    region.insert("Entities", NbtTag::List(NbtList::new()));
    region.insert("TileEntities", NbtTag::List(NbtList::new()));
    region
}

fn base_document(regions: &[(&str, NbtCompound)]) -> Document {
    let mut regions_nbt = NbtCompound::new();
    for (name, region) in regions {
        regions_nbt.insert(*name, NbtTag::Compound(region.clone()));
    }

    let mut metadata = NbtCompound::new();
    metadata.insert("Name", NbtTag::String("Corridor".to_string()));
    metadata.insert("Author", NbtTag::String("builder".to_string()));
    metadata.insert("RegionCount", NbtTag::Int(regions.len() as i32));

    let mut root = NbtCompound::new();
    root.insert("Version", NbtTag::Int(6));
    root.insert("MinecraftDataVersion", NbtTag::Int(3700));
    root.insert("Metadata", NbtTag::Compound(metadata));
    root.insert("Regions", NbtTag::Compound(regions_nbt));
    Document::new(root)
}

fn unit_base() -> Document {
    base_document(&[("unit", unit_region((16, 8, 16)))])
}

fn layout(document: &Document) -> Vec<(String, BlockPosition)> {
    document
        .region_names()
        .unwrap()
        .into_iter()
        .map(|name| {
            let position = document.region_position(&name).unwrap();
            (name, position)
        })
        .collect()
}

#[test]
fn test_tiled_unit_covers_target_width() {
    init_logging();
    let rules = vec![PlacementRule::tiled("unit", ["0", "0", "0"], Direction::PositiveX).unwrap()];
    let output = assemble(&unit_base(), &rules, 40, 16).expect("Failed to assemble");

    assert_eq!(
        layout(&output),
        vec![
            ("0_0".to_string(), BlockPosition::new(0, 0, 0)),
            ("0_1".to_string(), BlockPosition::new(16, 0, 0)),
        ]
    );
}

#[test]
fn test_single_placement_ignores_footprint() {
    init_logging();
    let rules = vec![PlacementRule::single("unit", ["0", "0", "0"]).unwrap()];
    for (target_x, target_z) in [(40, 16), (1, 1), (512, 96)] {
        let output = assemble(&unit_base(), &rules, target_x, target_z).unwrap();
        assert_eq!(layout(&output), vec![("0".to_string(), BlockPosition::new(0, 0, 0))]);
    }
}

#[test]
fn test_missing_source_produces_no_output() {
    init_logging();
    let rules = vec![PlacementRule::single("missing", ["0", "0", "0"]).unwrap()];
    let result = assemble(&unit_base(), &rules, 40, 16);
    assert_eq!(
        result.unwrap_err(),
        AssemblyError::Document(DocumentError::MissingRegion("missing".to_string()))
    );
}

#[test]
fn test_base_bytes_unchanged() {
    init_logging();
    let base = base_document(&[
        ("unit", unit_region((16, 8, 16))),
        ("cap", unit_region((4, 8, 16))),
    ]);
    let before = litematic::to_litematic(&base).unwrap();

    let rules = vec![
        PlacementRule::tiled("unit", ["4", "0", "0"], Direction::PositiveX).unwrap(),
        PlacementRule::single("cap", ["0", "0", "0"]).unwrap(),
        PlacementRule::single("cap", ["targetX - 4", "0", "0"]).unwrap(),
    ];
    let output = assemble(&base, &rules, 100, 16).unwrap();
    let after = litematic::to_litematic(&base).unwrap();

    assert_eq!(before, after);
    assert_eq!(output.region_count().unwrap(), 2 + 6);
}

#[test]
fn test_no_source_keys_leak() {
    init_logging();
    let base = base_document(&[
        ("unit", unit_region((16, 8, 16))),
        ("cap", unit_region((4, 8, 16))),
        ("unused", unit_region((1, 1, 1))),
    ]);
    let rules = vec![
        PlacementRule::tiled("unit", ["0", "0", "0"], Direction::PositiveZ).unwrap(),
        PlacementRule::single("cap", ["0", "0", "targetZ"]).unwrap(),
    ];

    for (target_x, target_z) in [(16, 16), (16, 64), (3, 300)] {
        let output = assemble(&base, &rules, target_x, target_z).unwrap();
        for name in ["unit", "cap", "unused"] {
            assert!(!output.has_region(name), "{} leaked for {}x{}", name, target_x, target_z);
        }
    }
}

#[test]
fn test_generated_rule_places_at_least_one_tile() {
    init_logging();
    let rules = vec![PlacementRule::tiled("unit", ["targetX + 100", "0", "0"], Direction::PositiveX).unwrap()];
    for target_x in [1, 15, 16, 17] {
        let output = assemble(&unit_base(), &rules, target_x, 16).unwrap();
        assert_eq!(output.region_count().unwrap(), 1);
    }
}

#[test]
fn test_assembly_is_deterministic() {
    init_logging();
    let base = base_document(&[
        ("unit", unit_region((16, 8, 16))),
        ("cap", unit_region((4, 8, 16))),
    ]);
    let rules = vec![
        PlacementRule::single("cap", ["0", "0", "0"]).unwrap(),
        PlacementRule::tiled("unit", ["4", "0", "0"], Direction::PositiveX).unwrap(),
        PlacementRule::tiled("unit", ["4", "0", "targetZ - 16"], Direction::NegativeZ).unwrap(),
    ];

    let first = assemble(&base, &rules, 70, 48).unwrap();
    let second = assemble(&base, &rules, 70, 48).unwrap();
    assert_eq!(layout(&first), layout(&second));
}

#[test]
fn test_generated_regions_do_not_alias() {
    init_logging();
    let rules = vec![PlacementRule::tiled("unit", ["0", "0", "0"], Direction::PositiveX).unwrap()];
    let mut output = assemble(&unit_base(), &rules, 64, 16).unwrap();
    let untouched = layout(&output);

    if let Some(NbtTag::Compound(region)) = output.regions_mut().unwrap().inner_mut().get_mut("0_1") {
        region.insert("Position", xyz(1000, 1000, 1000));
    }

    for (name, position) in layout(&output) {
        if name == "0_1" {
            assert_eq!(position, BlockPosition::new(1000, 1000, 1000));
        } else {
            let expected = untouched.iter().find(|(n, _)| *n == name).unwrap().1;
            assert_eq!(position, expected);
        }
    }
}

#[test]
fn test_concurrent_assemblies() {
    init_logging();
    let base = unit_base();
    let rules = vec![PlacementRule::tiled("unit", ["0", "0", "0"], Direction::PositiveX).unwrap()];

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let (base, rules) = (&base, &rules);
                scope.spawn(move || assemble(base, rules, 16 * n, 16).unwrap().region_count().unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_generate_litematic_bytes() {
    init_logging();
    let config = GenerationConfig::from_json(
        r#"{
            "type": 1,
            "config": [
                { "sourceName": "cap", "position": ["0", "0", "0"], "generate": false },
                { "sourceName": "unit", "position": ["4", "0", "0"], "generate": true, "direction": "+x" },
                { "sourceName": "cap", "position": ["targetX - 4", "0", "0"], "generate": false }
            ]
        }"#,
    )
    .unwrap();
    let base = base_document(&[
        ("unit", unit_region((16, 8, 16))),
        ("cap", unit_region((-4, 8, 16))),
    ]);
    let data = litematic::to_litematic(&base).unwrap();

    let generated = generate_litematic(&data, &config, 72, 16).expect("Failed to generate");
    assert!(litematic::is_litematic(&generated));

    let output = litematic::from_litematic(&generated).unwrap();
    assert_eq!(
        layout(&output),
        vec![
            ("0".to_string(), BlockPosition::new(0, 0, 0)),
            ("1".to_string(), BlockPosition::new(68, 0, 0)),
            ("1_0".to_string(), BlockPosition::new(4, 0, 0)),
            ("1_1".to_string(), BlockPosition::new(20, 0, 0)),
            ("1_2".to_string(), BlockPosition::new(36, 0, 0)),
            ("1_3".to_string(), BlockPosition::new(52, 0, 0)),
        ]
    );

    let metadata = output.root().get::<_, &NbtCompound>("Metadata").unwrap();
    assert_eq!(metadata.get::<_, &str>("Author").unwrap(), "builder");
    assert_eq!(metadata.get::<_, i32>("RegionCount").unwrap(), 6);
    assert_eq!(output.root().get::<_, i32>("MinecraftDataVersion").unwrap(), 3700);
}

#[test]
fn test_static_config_returns_same_document() {
    init_logging();
    let config = GenerationConfig::from_json(r#"{ "type": 0, "config": [] }"#).unwrap();
    let data = litematic::to_litematic(&unit_base()).unwrap();

    let served = generate_litematic(&data, &config, 40, 16).unwrap();
    assert_eq!(litematic::from_litematic(&served).unwrap(), unit_base());
}

#[test]
fn test_tile_limit_from_config() {
    init_logging();
    let config = GenerationConfig::from_json(
        r#"{
            "type": 1,
            "config": [{ "sourceName": "unit", "position": ["0", "0", "0"], "generate": true, "direction": "+x" }],
            "limits": { "maxTilesPerRule": 10 }
        }"#,
    )
    .unwrap();
    let data = litematic::to_litematic(&unit_base()).unwrap();

    assert!(generate_litematic(&data, &config, 16 * 10, 16).is_ok());
    assert!(matches!(
        generate_litematic(&data, &config, 16 * 11, 16),
        Err(Error::Assembly(AssemblyError::TileLimitExceeded { count: 11, limit: 10, .. }))
    ));
}
