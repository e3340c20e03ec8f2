//! Font resolution: code-to-unicode tables per resource name.
//!
//! For every page's `/Resources /Font` sub-dictionary, each entry like
//! `/F1 7 0 R` becomes a [`Font`] keyed by its resource name. The map
//! is seeded from the `/Encoding` name and then overridden by the
//! `/ToUnicode` CMap when present. A `/DefaultFont` with full 8-bit
//! identity is always injected for content streams that select a name
//! the resources never declared.

pub mod cmap;
pub mod encoding;

use crate::object::{Object, resolve};
use crate::page::Page;
use std::collections::HashMap;

/// Key under which the fallback font is stored.
pub const DEFAULT_FONT: &str = "DefaultFont";

/// A font as seen by the text extractor.
#[derive(Debug, Clone, Default)]
pub struct Font {
    /// Resource name the content stream selects it by (e.g. "F1")
    pub name: String,
    /// /Subtype value (Type1, TrueType, Type0, ...)
    pub subtype: String,
    /// /Encoding name, empty when absent
    pub encoding: String,
    /// Code-to-unicode map used to decode show-operator strings
    pub code_to_unicode: HashMap<u32, char>,
}

impl Font {
    /// Map a character code through the font, falling back to the raw
    /// byte as Latin-1 when unmapped.
    pub fn decode_code(&self, code: u32) -> Option<char> {
        self.code_to_unicode
            .get(&code)
            .copied()
            .or_else(|| char::from_u32(code))
    }
}

/// Build the document font table from every page's resources.
///
/// Later pages win on resource-name collisions, which matches how the
/// extractor consumes the table (names are page-scoped in real PDFs,
/// but the table is document-wide here, as in the original tool).
pub fn build_font_table(
    pages: &[Page],
    objects: &HashMap<u32, Object>,
) -> HashMap<String, Font> {
    let mut fonts = HashMap::new();

    for page in pages {
        let Some(font_dict) = page
            .resources
            .get("Font")
            .map(|f| resolve(objects, f))
            .and_then(|f| f.as_dict())
        else {
            continue;
        };

        for (res_name, font_ref) in font_dict {
            match build_font(res_name, font_ref, objects) {
                Some(font) => {
                    fonts.insert(res_name.clone(), font);
                },
                None => {
                    log::warn!("font resource /{} does not resolve to a dictionary", res_name);
                },
            }
        }
    }

    // The fallback for content streams referencing unknown names.
    let mut default = Font {
        name: DEFAULT_FONT.to_string(),
        ..Default::default()
    };
    encoding::seed_identity_latin(&mut default.code_to_unicode);
    fonts.insert(DEFAULT_FONT.to_string(), default);

    fonts
}

fn build_font(
    res_name: &str,
    font_ref: &Object,
    objects: &HashMap<u32, Object>,
) -> Option<Font> {
    let dict = resolve(objects, font_ref).as_dict()?;

    let mut font = Font {
        name: res_name.to_string(),
        subtype: dict
            .get("Subtype")
            .and_then(|s| s.as_name())
            .unwrap_or_default()
            .to_string(),
        encoding: encoding_name(dict.get("Encoding"), objects),
        code_to_unicode: HashMap::new(),
    };

    match font.encoding.as_str() {
        "WinAnsiEncoding" => encoding::seed_win_ansi(&mut font.code_to_unicode),
        "MacRomanEncoding" => encoding::seed_mac_roman(&mut font.code_to_unicode),
        enc if enc.starts_with("Identity") => {
            encoding::seed_identity_ascii(&mut font.code_to_unicode)
        },
        _ => encoding::seed_identity_ascii(&mut font.code_to_unicode),
    }

    if let Some(to_unicode) = dict.get("ToUnicode") {
        match resolve(objects, to_unicode) {
            Object::Stream { data, .. } => {
                cmap::parse_tounicode(data, &mut font.code_to_unicode);
            },
            other => {
                log::warn!(
                    "/ToUnicode for /{} is a {}, expected stream; keeping encoding-only map",
                    res_name,
                    other.type_name()
                );
            },
        }
    }

    Some(font)
}

/// The /Encoding entry is usually a name, but may be a dictionary whose
/// /BaseEncoding names the underlying table.
fn encoding_name(value: Option<&Object>, objects: &HashMap<u32, Object>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match resolve(objects, value) {
        Object::Name(n) => n.clone(),
        Object::Dictionary(d) => d
            .get("BaseEncoding")
            .and_then(|b| b.as_name())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}
