//! Built-in encoding tables.
//!
//! Seeds a font's code-to-unicode map from the `/Encoding` name before
//! any `/ToUnicode` CMap overrides are applied. WinAnsi is Latin-1 with
//! the 0x80-0x9F block replaced; MacRoman replaces the whole upper half.

use std::collections::HashMap;

/// WinAnsiEncoding: Latin-1 identity with the Windows-1252 overrides in
/// the 0x80-0x9F range. Codes 0x81, 0x8D, 0x8F, 0x90 and 0x9D are
/// unassigned in Windows-1252 and keep their identity mapping.
pub fn seed_win_ansi(map: &mut HashMap<u32, char>) {
    for code in 0u32..=255 {
        if let Some(ch) = char::from_u32(code) {
            map.insert(code, ch);
        }
    }
    for &(code, ch) in WIN_ANSI_OVERRIDES {
        map.insert(code, ch);
    }
}

const WIN_ANSI_OVERRIDES: &[(u32, char)] = &[
    (0x80, '\u{20AC}'), // Euro sign
    (0x82, '\u{201A}'), // single low-9 quotation mark
    (0x83, '\u{0192}'), // f with hook
    (0x84, '\u{201E}'), // double low-9 quotation mark
    (0x85, '\u{2026}'), // horizontal ellipsis
    (0x86, '\u{2020}'), // dagger
    (0x87, '\u{2021}'), // double dagger
    (0x88, '\u{02C6}'), // modifier circumflex
    (0x89, '\u{2030}'), // per mille
    (0x8A, '\u{0160}'), // S with caron
    (0x8B, '\u{2039}'), // single left angle quote
    (0x8C, '\u{0152}'), // ligature OE
    (0x8E, '\u{017D}'), // Z with caron
    (0x91, '\u{2018}'), // left single quote
    (0x92, '\u{2019}'), // right single quote
    (0x93, '\u{201C}'), // left double quote
    (0x94, '\u{201D}'), // right double quote
    (0x95, '\u{2022}'), // bullet
    (0x96, '\u{2013}'), // en dash
    (0x97, '\u{2014}'), // em dash
    (0x98, '\u{02DC}'), // small tilde
    (0x99, '\u{2122}'), // trade mark
    (0x9A, '\u{0161}'), // s with caron
    (0x9B, '\u{203A}'), // single right angle quote
    (0x9C, '\u{0153}'), // ligature oe
    (0x9E, '\u{017E}'), // z with caron
    (0x9F, '\u{0178}'), // Y with diaeresis
];

/// MacRomanEncoding: ASCII identity below 0x80, the MacRoman table above.
pub fn seed_mac_roman(map: &mut HashMap<u32, char>) {
    for code in 0u32..0x80 {
        if let Some(ch) = char::from_u32(code) {
            map.insert(code, ch);
        }
    }
    for (i, &ch) in MAC_ROMAN_HIGH.iter().enumerate() {
        map.insert(0x80 + i as u32, ch);
    }
}

/// MacRoman codes 0x80..=0xFF in order.
const MAC_ROMAN_HIGH: &[char; 128] = &[
    '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}', '\u{00E1}',
    '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}', '\u{00E9}', '\u{00E8}',
    '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}', '\u{00EF}', '\u{00F1}', '\u{00F3}',
    '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}', '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    '\u{2020}', '\u{00B0}', '\u{00A2}', '\u{00A3}', '\u{00A7}', '\u{2022}', '\u{00B6}', '\u{00DF}',
    '\u{00AE}', '\u{00A9}', '\u{2122}', '\u{00B4}', '\u{00A8}', '\u{2260}', '\u{00C6}', '\u{00D8}',
    '\u{221E}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{00A5}', '\u{00B5}', '\u{2202}', '\u{2211}',
    '\u{220F}', '\u{03C0}', '\u{222B}', '\u{00AA}', '\u{00BA}', '\u{03A9}', '\u{00E6}', '\u{00F8}',
    '\u{00BF}', '\u{00A1}', '\u{00AC}', '\u{221A}', '\u{0192}', '\u{2248}', '\u{2206}', '\u{00AB}',
    '\u{00BB}', '\u{2026}', '\u{00A0}', '\u{00C0}', '\u{00C3}', '\u{00D5}', '\u{0152}', '\u{0153}',
    '\u{2013}', '\u{2014}', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00F7}', '\u{25CA}',
    '\u{00FF}', '\u{0178}', '\u{2044}', '\u{20AC}', '\u{2039}', '\u{203A}', '\u{FB01}', '\u{FB02}',
    '\u{2021}', '\u{00B7}', '\u{201A}', '\u{201E}', '\u{2030}', '\u{00C2}', '\u{00CA}', '\u{00C1}',
    '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}', '\u{00CC}', '\u{00D3}', '\u{00D4}',
    ' ', '\u{00D2}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{0131}', '\u{02C6}', '\u{02DC}',
    '\u{00AF}', '\u{02D8}', '\u{02D9}', '\u{02DA}', '\u{00B8}', '\u{02DD}', '\u{02DB}', '\u{02C7}',
];

/// ASCII identity placeholder, used for `/Identity-H`, `/Identity-V`,
/// and fonts with no `/Encoding` at all. A `/ToUnicode` CMap usually
/// follows and overrides this.
pub fn seed_identity_ascii(map: &mut HashMap<u32, char>) {
    for code in 0u32..0x80 {
        if let Some(ch) = char::from_u32(code) {
            map.insert(code, ch);
        }
    }
}

/// Full 8-bit identity, used for the injected `/DefaultFont`.
pub fn seed_identity_latin(map: &mut HashMap<u32, char>) {
    for code in 0u32..=255 {
        if let Some(ch) = char::from_u32(code) {
            map.insert(code, ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_overrides() {
        let mut map = HashMap::new();
        seed_win_ansi(&mut map);
        assert_eq!(map[&0x80], '\u{20AC}'); // Euro
        assert_eq!(map[&0x91], '\u{2018}');
        assert_eq!(map[&0x96], '\u{2013}'); // en dash
        assert_eq!(map[&0x97], '\u{2014}'); // em dash
        // Latin-1 region untouched
        assert_eq!(map[&0xE9], '\u{00E9}');
        assert_eq!(map[&(b'A' as u32)], 'A');
    }

    #[test]
    fn test_mac_roman_table() {
        let mut map = HashMap::new();
        seed_mac_roman(&mut map);
        assert_eq!(map[&0x80], '\u{00C4}'); // A-umlaut
        assert_eq!(map[&0xD0], '\u{2013}'); // en dash
        assert_eq!(map[&0xDB], '\u{20AC}'); // Euro
        assert_eq!(map[&0xFF], '\u{02C7}'); // caron
        assert_eq!(map[&(b'A' as u32)], 'A');
        assert_eq!(map.len(), 256);
    }

    #[test]
    fn test_identity_seeds() {
        let mut ascii = HashMap::new();
        seed_identity_ascii(&mut ascii);
        assert_eq!(ascii.len(), 128);
        assert_eq!(ascii[&0x41], 'A');

        let mut latin = HashMap::new();
        seed_identity_latin(&mut latin);
        assert_eq!(latin.len(), 256);
        assert_eq!(latin[&0xE9], '\u{00E9}');
    }
}
