//! CorelDRAW palette XML.
//!
//! Unlike the binary container this format carries each swatch's identifier
//! in a `fixedID` attribute, so it is the one identifiers survive in.

use super::{Codec, Decoded, Format};
use crate::error::{Result, SwatchError};
use crate::ident::{self, IdentityMap};
use crate::model::{unit_to_channel, Palette, Rgb};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use uuid::Uuid;

const BOM: char = '\u{feff}';
const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

#[derive(Debug, Clone)]
pub struct XmlCodec {
    pub locked: bool,
    /// Emitted as `<!-- ... -->` lines above the palette element.
    pub comments: Vec<String>,
}

impl Default for XmlCodec {
    fn default() -> Self {
        Self {
            locked: true,
            comments: Vec::new(),
        }
    }
}

impl Codec for XmlCodec {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn encode(&self, palette: &Palette, ids: &IdentityMap) -> Result<Vec<u8>> {
        palette.validate()?;
        let assigned = ident::assign(palette, ids);

        let mut out = String::new();
        out.push(BOM);
        out.push_str(XML_DECL);
        out.push('\n');
        for comment in &self.comments {
            out.push_str(&format!("<!-- {} -->\n", comment_text(comment)));
        }
        out.push_str(&format!(
            "<palette guid=\"{}\" name=\"{}\" locked=\"{}\">\n",
            Uuid::new_v4(),
            escape(&palette.name),
            self.locked
        ));
        out.push_str("<colors>\n<page>\n");
        for (entry, id) in palette.entries.iter().zip(assigned) {
            let [r, g, b] = tints(entry.rgb);
            out.push_str(&format!(
                "<color name=\"{}\" cs=\"RGB\" tints=\"{r},{g},{b}\" fixedID=\"{id}\"/>\n",
                escape(&entry.display_name)
            ));
        }
        out.push_str("</page>\n</colors>\n</palette>\n");
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        decode(bytes)
    }

    fn stores_ids(&self) -> bool {
        true
    }
}

/// Comment body that is legal XML: no `--` inside and no trailing `-`.
fn comment_text(raw: &str) -> String {
    let mut text = raw.to_string();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    if text.ends_with('-') {
        text.push(' ');
    }
    text
}

fn tints(rgb: Rgb) -> [f64; 3] {
    [rgb.red, rgb.green, rgb.blue].map(|c| f64::from(c) / 255.0)
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

static PALETTE_RE: OnceLock<Regex> = OnceLock::new();
static COLOR_RE: OnceLock<Regex> = OnceLock::new();
static ATTR_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();
static COMMENT_RE: OnceLock<Regex> = OnceLock::new();

fn palette_re() -> &'static Regex {
    PALETTE_RE.get_or_init(|| Regex::new(r"<palette\b([^>]*)>").unwrap())
}

fn color_re() -> &'static Regex {
    COLOR_RE.get_or_init(|| Regex::new(r"<color\b([^>]*?)/?>").unwrap())
}

fn attr_re() -> &'static Regex {
    ATTR_RE.get_or_init(|| Regex::new(r#"([A-Za-z_][\w:.\-]*)\s*=\s*"([^"]*)""#).unwrap())
}

fn entity_re() -> &'static Regex {
    ENTITY_RE.get_or_init(|| Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").unwrap())
}

fn comment_re() -> &'static Regex {
    COMMENT_RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SwatchError::Corrupt(format!("palette xml is not UTF-8: {e}")))?;
    let text = text.trim_start_matches(BOM);
    // markup quoted inside comments is not part of the palette
    let text = comment_re().replace_all(text, "");
    let text: &str = &text;

    let palette = palette_re()
        .captures(text)
        .ok_or_else(|| SwatchError::Corrupt("no <palette> element".to_string()))?;
    let name = attrs(&palette[1])
        .remove("name")
        .ok_or_else(|| SwatchError::Corrupt("<palette> has no name".to_string()))?;
    if !text.contains("</palette>") {
        return Err(SwatchError::Corrupt("palette xml is truncated".to_string()));
    }

    let mut colors = BTreeMap::new();
    let mut ids = IdentityMap::new();
    for caps in color_re().captures_iter(text) {
        let mut attrs = attrs(&caps[1]);
        let Some(label) = attrs.remove("name") else {
            tracing::debug!("skipping <color> without a name");
            continue;
        };
        if attrs.get("cs").map(String::as_str) != Some("RGB") {
            tracing::debug!(swatch = %label, "skipping non-RGB color");
            continue;
        }
        let rgb = parse_tints(&label, attrs.get("tints").map(String::as_str).unwrap_or(""))?;
        match attrs.get("fixedID").and_then(|v| v.trim().parse::<u32>().ok()) {
            // duplicate names keep the first id
            Some(id) if id > 0 => {
                ids.entry(label.clone()).or_insert(id);
            }
            _ => tracing::debug!(swatch = %label, "color has no usable fixedID"),
        }
        colors.insert(label, rgb);
    }

    Ok(Decoded { name, colors, ids })
}

fn attrs(raw: &str) -> HashMap<String, String> {
    attr_re()
        .captures_iter(raw)
        .map(|c| (c[1].to_string(), unescape(&c[2])))
        .collect()
}

fn parse_tints(label: &str, raw: &str) -> Result<Rgb> {
    let bad = || SwatchError::Corrupt(format!("color '{label}' has unreadable tints '{raw}'"));
    let values: Vec<f64> = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|_| bad()))
        .collect::<Result<_>>()?;
    let [r, g, b] = values.as_slice() else {
        return Err(bad());
    };
    let channel = |v: f64| unit_to_channel(v).ok_or_else(bad);
    Ok(Rgb::new(channel(*r)?, channel(*g)?, channel(*b)?))
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    entity_re()
        .replace_all(s, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(|n| n.ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Cheap sniff used by format detection.
pub fn looks_like_xml(bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(64)]);
    let text = text.trim_start_matches(BOM).trim_start();
    text.starts_with("<?xml") || text.starts_with("<palette")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> XmlCodec {
        XmlCodec::default()
    }

    fn reds() -> Palette {
        Palette::new("Reds")
            .with_entry("0345 - Moss", Rgb::new(110, 90, 33))
            .with_entry("0352 - Marsh", Rgb::new(180, 171, 93))
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn encodes_corel_layout() {
        let out = text(&codec().encode(&reds(), &IdentityMap::new()).unwrap());
        assert!(out.starts_with("\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(out.contains(" name=\"Reds\" locked=\"true\">\n<colors>\n<page>\n"));
        assert!(out.contains(&format!(
            "<color name=\"0345 - Moss\" cs=\"RGB\" tints=\"{},{},{}\" fixedID=\"1\"/>",
            110.0 / 255.0,
            90.0 / 255.0,
            33.0 / 255.0
        )));
        assert!(out.contains("fixedID=\"2\"/>"));
        assert!(out.ends_with("</page>\n</colors>\n</palette>\n"));
    }

    #[test]
    fn round_trip_recovers_names_colors_and_ids() {
        let decoded = decode(&codec().encode(&reds(), &IdentityMap::new()).unwrap()).unwrap();
        assert_eq!(decoded.name, "Reds");
        assert_eq!(decoded.colors["0345 - Moss"], Rgb::new(110, 90, 33));
        assert_eq!(decoded.colors["0352 - Marsh"], Rgb::new(180, 171, 93));
        assert_eq!(decoded.ids["0345 - Moss"], 1);
        assert_eq!(decoded.ids["0352 - Marsh"], 2);
    }

    #[test]
    fn prior_ids_are_written_back() {
        let prior = IdentityMap::from([("0352 - Marsh".to_string(), 7)]);
        let decoded = decode(&codec().encode(&reds(), &prior).unwrap()).unwrap();
        assert_eq!(decoded.ids["0352 - Marsh"], 7);
        assert_eq!(decoded.ids["0345 - Moss"], 1);
    }

    #[test]
    fn special_characters_are_escaped() {
        let palette = Palette::new("Tom & \"Jerry\"").with_entry("<Red's>", Rgb::new(255, 0, 0));
        let bytes = codec().encode(&palette, &IdentityMap::new()).unwrap();
        let out = text(&bytes);
        assert!(out.contains("name=\"Tom &amp; &quot;Jerry&quot;\""));
        assert!(out.contains("name=\"&lt;Red&apos;s&gt;\""));
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.name, "Tom & \"Jerry\"");
        assert!(decoded.colors.contains_key("<Red's>"));
    }

    #[test]
    fn numeric_entities_are_decoded() {
        assert_eq!(unescape("Cr&#232;me &#x41;"), "Crème A");
        assert_eq!(unescape("&bogus; &"), "&bogus; &");
    }

    #[test]
    fn comments_are_emitted_safely() {
        let codec = XmlCodec {
            locked: false,
            comments: vec!["Provided as-is -- no warranty".to_string()],
        };
        let out = text(&codec.encode(&reds(), &IdentityMap::new()).unwrap());
        assert!(out.contains("<!-- Provided as-is - - no warranty -->\n"));
        assert!(out.contains("locked=\"false\""));
    }

    #[test]
    fn comment_text_never_contains_double_hyphens() {
        for raw in ["a --- b", "----", "trailing -", "x--"] {
            let body = comment_text(raw);
            assert!(!body.contains("--"), "{raw:?} -> {body:?}");
            assert!(!body.ends_with('-'), "{raw:?} -> {body:?}");
        }
        assert_eq!(comment_text("a --- b"), "a - - - b");
    }

    #[test]
    fn markup_inside_comments_is_ignored() {
        let codec = XmlCodec {
            locked: true,
            comments: vec![
                "import into <palette name=\"Old\"> slots".to_string(),
                "e.g. <color name=\"Z\" cs=\"RGB\" tints=\"0,0,0\" fixedID=\"9\"/>".to_string(),
            ],
        };
        let decoded = decode(&codec.encode(&reds(), &IdentityMap::new()).unwrap()).unwrap();
        assert_eq!(decoded.name, "Reds");
        assert_eq!(decoded.colors.len(), 2);
        assert!(!decoded.colors.contains_key("Z"));
        assert!(!decoded.ids.contains_key("Z"));
    }

    #[test]
    fn guid_is_a_uuid() {
        let out = text(&codec().encode(&reds(), &IdentityMap::new()).unwrap());
        let start = out.find("guid=\"").unwrap() + 6;
        assert!(Uuid::parse_str(&out[start..start + 36]).is_ok());
    }

    #[test]
    fn missing_palette_is_corrupt() {
        let err = decode(b"<?xml version=\"1.0\"?><colors/>").unwrap_err();
        assert!(matches!(err, SwatchError::Corrupt(_)));
    }

    #[test]
    fn truncated_document_is_corrupt() {
        let bytes = codec().encode(&reds(), &IdentityMap::new()).unwrap();
        let cut = &bytes[..bytes.len() - 20];
        assert!(matches!(decode(cut), Err(SwatchError::Corrupt(_))));
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        assert!(matches!(
            decode(&[0x3c, 0xff, 0xfe]),
            Err(SwatchError::Corrupt(_))
        ));
    }

    #[test]
    fn unreadable_tints_are_corrupt() {
        let doc = r#"<palette name="P"><colors><page>
<color name="A" cs="RGB" tints="0.5,oops,1" fixedID="1"/>
</page></colors></palette>"#;
        assert!(matches!(decode(doc.as_bytes()), Err(SwatchError::Corrupt(_))));
    }

    #[test]
    fn foreign_colors_and_ids_are_tolerated() {
        let doc = r#"<palette name="P"><colors><page>
<color name="A" cs="CMYK" tints="0,0,0,1" fixedID="1"/>
<color name="B" cs="RGB" tints="1,0,0" fixedID="b-2"/>
<color cs="RGB" tints="0,0,0"/>
</page></colors></palette>"#;
        let decoded = decode(doc.as_bytes()).unwrap();
        assert_eq!(decoded.colors.len(), 1);
        assert_eq!(decoded.colors["B"], Rgb::new(255, 0, 0));
        assert!(decoded.ids.is_empty());
    }

    #[test]
    fn sniffing() {
        assert!(looks_like_xml("\u{feff}<?xml version".as_bytes()));
        assert!(looks_like_xml(b"  <palette name=\"x\">"));
        assert!(!looks_like_xml(b"ASEF"));
    }
}
