//! Document writer for .hepmodel files
//!
//! Re-exports the document types from hephaestus-shared.

pub use hephaestus_shared::formats::*;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON layout of the written document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Two-space indented, the layout the authoring plugin writes
    #[default]
    Pretty,
    /// No insignificant whitespace
    Compact,
}

/// Write a complete HepModel document
pub fn write_model<W: Write>(w: &mut W, model: &Model, style: OutputStyle) -> Result<()> {
    let serialized = match style {
        OutputStyle::Pretty => serde_json::to_writer_pretty(&mut *w, model),
        OutputStyle::Compact => serde_json::to_writer(&mut *w, model),
    };
    serialized.context("Failed to serialize model")?;
    w.flush()?;
    Ok(())
}

/// Serialize a document to bytes
pub fn model_to_vec(model: &Model, style: OutputStyle) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_model(&mut buffer, model, style)?;
    Ok(buffer)
}

/// Write a document to `path`, creating or truncating the file
pub fn write_model_file(path: &Path, model: &Model, style: OutputStyle) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_model(&mut writer, model, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn model() -> Model {
        Model {
            name: "cube".into(),
            meta: Meta {
                format_version: FORMAT_VERSION,
                creation_time: 42,
                model_format: "free".into(),
            },
            resolution: Resolution::default(),
            outliner: vec![OutlinerNode::Bone(Bone {
                name: "root".into(),
                uuid: "root".into(),
                origin: [0.0; 3],
                rotation: None,
                children: vec![],
            })],
            textures: vec![Texture {
                name: "t.png".into(),
                source: "AAAA".into(),
            }],
            animations: vec![Animation {
                name: "idle".into(),
                loop_mode: LoopMode::Hold,
                override_previous: true,
                length: 2.0,
                animators: BTreeMap::new(),
            }],
        }
    }

    #[test]
    fn test_required_top_level_fields() {
        let bytes = model_to_vec(&model(), OutputStyle::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["name"], "cube");
        assert_eq!(value["meta"]["format_version"], 1);
        assert_eq!(value["meta"]["creation_time"], 42);
        assert_eq!(value["meta"]["model_format"], "free");
        assert_eq!(value["resolution"]["width"], 16);
        assert_eq!(value["resolution"]["height"], 16);
        assert!(value["outliner"].is_array());
        assert_eq!(value["textures"][0]["source"], "AAAA");
        assert_eq!(value["animations"][0]["loop"], "hold");
        assert_eq!(value["animations"][0]["override"], true);
    }

    #[test]
    fn test_styles() {
        let pretty = String::from_utf8(model_to_vec(&model(), OutputStyle::Pretty).unwrap()).unwrap();
        let compact = String::from_utf8(model_to_vec(&model(), OutputStyle::Compact).unwrap()).unwrap();

        assert!(pretty.contains("\n  \"meta\""));
        assert!(!compact.contains('\n'));
        let a: Model = serde_json::from_str(&pretty).unwrap();
        let b: Model = serde_json::from_str(&compact).unwrap();
        assert_eq!(a, b);
    }
}
