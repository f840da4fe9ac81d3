use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use threadswatch_core::codec::{AseCodec, Codec, Format, XmlCodec};

pub fn run(file: &Path, format: Option<&str>, json: bool) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    let format = match format {
        Some(f) => f.parse()?,
        None => Format::detect(file, &bytes).with_context(|| {
            format!("cannot tell the swatch format of {}; pass --format", file.display())
        })?,
    };
    let codec: Box<dyn Codec> = match format {
        Format::Ase => Box::new(AseCodec),
        Format::Xml => Box::new(XmlCodec::default()),
    };
    let decoded = codec
        .decode(&bytes)
        .with_context(|| format!("failed to decode {}", file.display()))?;

    if json {
        print_json(&decoded)?;
        return Ok(());
    }

    println!("Palette: {}", decoded.name);
    println!("Format:  {format}");
    println!("Colors:  {}\n", decoded.colors.len());
    let rows = decoded
        .colors
        .iter()
        .map(|(name, rgb)| {
            vec![
                decoded
                    .ids
                    .get(name)
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                name.clone(),
                rgb.red.to_string(),
                rgb.green.to_string(),
                rgb.blue.to_string(),
                rgb.to_hex(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "R", "G", "B", "HEX"], rows);
    Ok(())
}
