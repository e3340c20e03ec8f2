//! Page records and the page tree walk.
//!
//! Pages come from the `/Catalog -> /Pages` tree: `/Pages` nodes carry
//! `/Kids` arrays, `/Page` leaves become page records numbered in
//! traversal order (1-based). `/MediaBox` is inherited from the nearest
//! ancestor that declares one; `/Contents` may be a single stream
//! reference or an array of them, concatenated with a newline so that
//! operator tokens from adjacent streams cannot fuse.

use crate::object::{Object, resolve};
use crate::text::TextRun;
use std::collections::{HashMap, HashSet};

/// Maximum page tree depth before the walk gives up (cycle guard).
const MAX_TREE_DEPTH: usize = 64;

/// A single page, frozen after the text stage fills in `runs` and `text`.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// 1-based page number in reading order
    pub number: usize,
    /// MediaBox as (llx, lly, urx, ury); zeros when absent everywhere
    pub media_box: (f64, f64, f64, f64),
    /// Resolved /Resources dictionary (may be empty)
    pub resources: HashMap<String, Object>,
    /// Concatenated decoded content-stream bytes
    pub contents: Vec<u8>,
    /// Positioned text runs, in content-stream order
    pub runs: Vec<TextRun>,
    /// Reading-order text for this page
    pub text: String,
}

impl Page {
    /// Page width (`urx - llx`).
    pub fn width(&self) -> f64 {
        self.media_box.2 - self.media_box.0
    }

    /// Page height (`ury - lly`).
    pub fn height(&self) -> f64 {
        self.media_box.3 - self.media_box.1
    }
}

/// Walk the page tree and collect page records in order.
///
/// When the trailer has no usable `/Root`, falls back to scanning the
/// object table for a `/Type /Catalog` dictionary. When no catalog can
/// be found at all, logs a warning and returns an empty list (the
/// document stays usable for object-level queries).
pub fn collect_pages(
    trailer: &HashMap<String, Object>,
    objects: &HashMap<u32, Object>,
) -> Vec<Page> {
    let catalog = find_catalog(trailer, objects);
    let Some(catalog) = catalog else {
        log::warn!("no /Root in trailer and no /Catalog object found; page list is empty");
        return Vec::new();
    };

    let Some(pages_obj) = catalog.get("Pages") else {
        log::warn!("catalog has no /Pages entry");
        return Vec::new();
    };

    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    walk_node(pages_obj, objects, None, &mut pages, &mut visited, 0);
    pages
}

fn find_catalog<'a>(
    trailer: &'a HashMap<String, Object>,
    objects: &'a HashMap<u32, Object>,
) -> Option<&'a HashMap<String, Object>> {
    if let Some(root) = trailer.get("Root") {
        if let Some(dict) = resolve(objects, root).as_dict() {
            return Some(dict);
        }
        log::warn!("trailer /Root does not resolve to a dictionary");
    }

    // Tie-break: take any object whose /Type is /Catalog. Scan in
    // object-number order so the choice is deterministic.
    let mut nums: Vec<&u32> = objects.keys().collect();
    nums.sort_unstable();
    for num in nums {
        if let Some(dict) = objects[num].as_dict() {
            if dict.get("Type").and_then(|t| t.as_name()) == Some("Catalog") {
                log::warn!("recovered catalog from object {}", num);
                return Some(dict);
            }
        }
    }
    None
}

fn walk_node(
    node: &Object,
    objects: &HashMap<u32, Object>,
    inherited_media_box: Option<(f64, f64, f64, f64)>,
    pages: &mut Vec<Page>,
    visited: &mut HashSet<u32>,
    depth: usize,
) {
    if depth > MAX_TREE_DEPTH {
        log::warn!("page tree deeper than {} levels; stopping walk", MAX_TREE_DEPTH);
        return;
    }
    if let Some(r) = node.as_reference() {
        if !visited.insert(r.num) {
            log::warn!("page tree cycle through object {}", r.num);
            return;
        }
    }

    let resolved = resolve(objects, node);
    let Some(dict) = resolved.as_dict() else {
        log::warn!("page tree node is not a dictionary");
        return;
    };

    let media_box = parse_media_box(dict.get("MediaBox"), objects).or(inherited_media_box);

    match dict.get("Type").and_then(|t| t.as_name()) {
        Some("Pages") => {
            let Some(kids) = dict.get("Kids").map(|k| resolve(objects, k)) else {
                log::warn!("/Pages node without /Kids");
                return;
            };
            let Some(kids) = kids.as_array() else {
                log::warn!("/Kids is not an array");
                return;
            };
            for kid in kids {
                walk_node(kid, objects, media_box, pages, visited, depth + 1);
            }
        },
        Some("Page") => {
            pages.push(build_page(dict, objects, media_box, pages.len() + 1));
        },
        other => {
            log::warn!("page tree node with unexpected /Type {:?}", other);
        },
    }
}

fn build_page(
    dict: &HashMap<String, Object>,
    objects: &HashMap<u32, Object>,
    media_box: Option<(f64, f64, f64, f64)>,
    number: usize,
) -> Page {
    let resources = dict
        .get("Resources")
        .map(|r| resolve(objects, r))
        .and_then(|r| r.as_dict())
        .cloned()
        .unwrap_or_default();

    let contents = collect_contents(dict.get("Contents"), objects);

    Page {
        number,
        media_box: media_box.unwrap_or((0.0, 0.0, 0.0, 0.0)),
        resources,
        contents,
        runs: Vec::new(),
        text: String::new(),
    }
}

/// Gather the page's content bytes: a single stream, or an array of
/// streams joined with `\n`.
fn collect_contents(contents: Option<&Object>, objects: &HashMap<u32, Object>) -> Vec<u8> {
    let Some(contents) = contents else {
        return Vec::new();
    };

    let mut out = Vec::new();
    match resolve(objects, contents) {
        Object::Stream { data, .. } => out.extend_from_slice(data),
        Object::Array(items) => {
            for item in items {
                if let Object::Stream { data, .. } = resolve(objects, item) {
                    if !out.is_empty() {
                        out.push(b'\n');
                    }
                    out.extend_from_slice(data);
                } else {
                    log::warn!("/Contents array element is not a stream");
                }
            }
        },
        other => log::warn!("/Contents is a {}, expected stream or array", other.type_name()),
    }
    out
}

fn parse_media_box(
    value: Option<&Object>,
    objects: &HashMap<u32, Object>,
) -> Option<(f64, f64, f64, f64)> {
    let arr = resolve(objects, value?).as_array()?;
    if arr.len() != 4 {
        log::warn!("/MediaBox has {} elements, expected 4", arr.len());
        return None;
    }
    let nums: Vec<f64> = arr
        .iter()
        .filter_map(|v| resolve(objects, v).as_number())
        .collect();
    if nums.len() != 4 {
        log::warn!("/MediaBox contains non-numeric entries");
        return None;
    }
    Some((nums[0], nums[1], nums[2], nums[3]))
}
