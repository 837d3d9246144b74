use super::*;
use image::{Rgba, RgbaImage};
use serde_json::json;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("strata_loader_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("defs")).unwrap();
    dir
}

fn write(path: PathBuf, value: serde_json::Value) {
    std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn write_project(dir: &Path) {
    write(
        dir.join("level.json"),
        json!({
            "name": "outskirts",
            "width": 3,
            "height": 2,
            "cameras": [{ "position": { "x": 0.0, "y": 0.0 } }],
            "light": { "angle": 0.5, "distance": 2.0 },
            "default_tile": "stone"
        }),
    );
    write(
        dir.join("geometry.json"),
        json!([
            [
                { "geo": "solid" }, {}, { "geo": "platform", "tile": "brick" },
                {}, { "pole": "vertical" }, { "geo": "solid" }
            ]
        ]),
    );
    write(
        dir.join("connections.json"),
        json!(["entrance", "path", "exit", "none", "none", "none"]),
    );
    write(
        dir.join("props.json"),
        json!([{
            "prop": "barrel",
            "quad": [
                { "x": 0.0, "y": 0.0 }, { "x": 4.0, "y": 0.0 },
                { "x": 4.0, "y": 4.0 }, { "x": 0.0, "y": 4.0 }
            ],
            "depth": 2
        }]),
    );
    write(
        dir.join("effects.json"),
        json!([{
            "effect": "moss",
            "intensity": [0.0, 0.5, 1.0, 0.0, 0.0, 0.25],
            "layers": 1
        }]),
    );
    write(
        dir.join("defs/tiles.json"),
        json!([
            { "name": "stone", "kind": "box" },
            { "name": "brick", "kind": "voxel_struct" }
        ]),
    );
    write(
        dir.join("defs/props.json"),
        json!([
            { "name": "barrel", "kind": "soft", "image": "barrel.png" },
            { "name": "crate", "kind": "voxel_struct", "image": "barrel.png",
              "slice": { "width": 2, "height": 1 }, "repeat": [1, 1] },
            { "name": "spirit", "kind": "custom" }
        ]),
    );
    write(
        dir.join("defs/effects.json"),
        json!([{ "name": "moss", "granularity": "cell" }]),
    );
    RgbaImage::from_pixel(2, 2, Rgba([200, 200, 200, 255]))
        .save(dir.join("defs/barrel.png"))
        .unwrap();
}

#[test]
fn loads_and_resolves_a_project() {
    let dir = scratch("ok");
    write_project(&dir);
    let project = load_project(&dir).unwrap();
    let (level, defs) = (&project.level, &project.defs);

    assert_eq!(level.name, "outskirts");
    assert_eq!((level.width(), level.height(), level.depth()), (3, 2, 1));
    assert_eq!(level.cameras.len(), 1);
    assert_eq!(level.light.distance, 2.0);
    assert_eq!(level.default_tile, defs.tile_id("stone"));
    assert_eq!(level.cell(2, 0, 0).unwrap().tile, defs.tile_id("brick"));
    assert_eq!(level.cell(1, 1, 0).unwrap().pole, Pole::Vertical);
    assert_eq!(level.connection(2, 0), Connection::Exit);
    assert_eq!(level.props[0].extrude, 1);
    assert_eq!(level.effects[0].intensity.get(2, 0), Some(&1.0));
    assert!(level.lightmap.is_none());

    assert_eq!(defs.props.len(), 3);
    assert_eq!(defs.props[0].image.dimensions(), (2, 2));
    assert_eq!(defs.props[1].slice_count(), 2);
    assert!(matches!(defs.props[2].kind, PropKind::Custom));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_names_fail_the_load() {
    let dir = scratch("unknown");
    write_project(&dir);
    write(
        dir.join("props.json"),
        json!([{
            "prop": "ghost",
            "quad": [
                { "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 },
                { "x": 1.0, "y": 1.0 }, { "x": 0.0, "y": 1.0 }
            ],
            "depth": 0
        }]),
    );
    let err = load_project(&dir).unwrap_err();
    assert!(matches!(err, StrataError::Validation(ref m) if m.contains("ghost")));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mis_sized_matrices_fail_the_load() {
    let dir = scratch("size");
    write_project(&dir);
    write(dir.join("connections.json"), json!(["none", "none"]));
    assert!(matches!(
        load_project(&dir),
        Err(StrataError::Validation(_))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_required_file_is_reported() {
    let dir = scratch("missing");
    write_project(&dir);
    std::fs::remove_file(dir.join("geometry.json")).unwrap();
    let err = load_project(&dir).unwrap_err();
    assert!(format!("{err:#}").contains("geometry.json"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn optional_lightmap_is_loaded_as_gray() {
    let dir = scratch("lightmap");
    write_project(&dir);
    RgbaImage::from_pixel(3, 2, Rgba([255, 255, 255, 255]))
        .save(dir.join("lightmap.png"))
        .unwrap();
    let project = load_project(&dir).unwrap();
    let map = project.level.lightmap.unwrap();
    assert_eq!(map.dimensions(), (3, 2));
    assert_eq!(map.get_pixel(0, 0).0[0], 255);
    let _ = std::fs::remove_dir_all(&dir);
}
