//! Programmatic .bbmodel generation for integration tests

use serde_json::{json, Value};
use std::path::Path;

/// 1x1 transparent PNG
pub const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Biped with a textured body, a rotated arm and one animation
pub fn biped() -> Value {
    json!({
        "meta": { "format_version": "4.5", "model_format": "free", "box_uv": false },
        "name": "biped",
        "geometry_name": "",
        "resolution": { "width": 32, "height": 32 },
        "elements": [
            {
                "name": "torso", "uuid": "e-torso",
                "from": [-4, 12, -2], "to": [4, 24, 2], "origin": [0, 12, 0],
                "faces": {
                    "north": { "uv": [0, 0, 8, 12], "texture": 0 },
                    "south": { "uv": [8, 0, 16, 12], "texture": 0 }
                }
            },
            {
                "name": "arm", "uuid": "e-arm",
                "from": [4, 12, -2], "to": [8, 24, 2], "origin": [6, 22, 0],
                "rotation": [0, 0, -22.5],
                "faces": { "east": { "uv": [16, 0, 20, 12], "texture": 0, "tint": 0 } }
            }
        ],
        "outliner": [
            {
                "name": "body", "uuid": "g-body", "origin": [0, 12, 0],
                "children": [
                    "e-torso",
                    { "name": "right_arm", "uuid": "g-arm", "origin": [6, 22, 0], "children": ["e-arm"] },
                    { "name": "empty", "uuid": "g-empty", "origin": [0, 0, 0], "children": [] }
                ]
            }
        ],
        "textures": [
            { "name": "biped.png", "uuid": "t-biped", "source": format!("data:image/png;base64,{}", PIXEL_PNG) }
        ],
        "animations": [
            {
                "name": "wave", "loop": "loop", "override": false, "length": 1,
                "animators": {
                    "g-arm": {
                        "name": "right_arm", "type": "bone",
                        "keyframes": [
                            { "channel": "rotation", "time": 0, "data_points": [{ "x": 0, "y": 0, "z": 0 }] },
                            { "channel": "rotation", "time": 1, "data_points": [{ "x": "0", "y": "45", "z": "0" }] }
                        ]
                    },
                    "g-body": { "name": "body", "type": "bone", "keyframes": [] }
                }
            }
        ]
    })
}

pub fn write_project(path: &Path, project: &Value) -> std::io::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(project).expect("serializable project"))
}
