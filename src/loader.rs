//! Map document discovery and loading.
//!
//! Maps are described by `.map.json` / `.map.yaml` documents next to the
//! tilesheet images they reference. A document declares the grid and tile
//! size, the tilesheets, and one tile grid per layer:
//!
//! ```yaml
//! name: Farm
//! width: 4
//! height: 3
//! tile_width: 16
//! tile_height: 16
//! tilesheets:
//!   - id: outdoors
//!     image: outdoors.png
//! layers:
//!   - id: Back
//!     sheet: outdoors
//!     tiles:
//!       - [0, 0, 1, 1]
//!       - [0, -1, 1, -1]
//!       - [{sheet: outdoors, index: 2}, 0, 0, 0]
//! ```
//!
//! A cell is a bare tile index into the layer's default sheet, `-1` or
//! `null` for empty, or an explicit `{sheet, index}` pair.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{Result, SnapError};
use crate::host::Host;
use crate::types::{Layer, TileMap, TileRef};

/// Recognized map document suffixes.
pub const MAP_SUFFIXES: [&str; 3] = [".map.json", ".map.yaml", ".map.yml"];

/// Check whether a path looks like a map document.
pub fn is_map_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| MAP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
        .unwrap_or(false)
}

/// Collect map documents from files and directories.
///
/// Directories are walked recursively; results are sorted so load order is
/// deterministic across platforms.
pub fn scan_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.path().is_file() && is_map_document(entry.path()) {
                    found.push(entry.path().to_path_buf());
                }
            }
        } else if is_map_document(path) {
            found.push(path.clone());
        }
    }

    found.sort();
    found
}

/// Load one map document.
pub fn load_map(path: &Path) -> Result<TileMap> {
    Ok(load_document(path)?.0)
}

/// Scan the given paths and load every discovered map into a host.
///
/// A document flagged `current: true` becomes the host's current map;
/// otherwise the first map loaded is current.
pub fn load_maps(paths: &[PathBuf]) -> Result<Host> {
    let mut host = Host::new();
    let mut current: Option<String> = None;

    for doc_path in scan_paths(paths) {
        let (map, is_current) = load_document(&doc_path)?;
        if is_current {
            current = Some(map.name.clone());
        }
        host.insert(map);
    }

    if let Some(name) = current {
        host.set_current(&name);
    }

    Ok(host)
}

fn default_tile_size() -> u32 {
    16
}

#[derive(Debug, Deserialize)]
struct MapDocument {
    name: String,
    #[serde(default)]
    unique_name: Option<String>,
    width: u32,
    height: u32,
    #[serde(default = "default_tile_size")]
    tile_width: u32,
    #[serde(default = "default_tile_size")]
    tile_height: u32,
    #[serde(default)]
    tilesheets: Vec<SheetEntry>,
    layers: Vec<LayerEntry>,
    #[serde(default)]
    current: bool,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    id: String,
    image: PathBuf,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    id: String,
    /// Default sheet for bare-index cells.
    #[serde(default)]
    sheet: Option<String>,
    tiles: Vec<Vec<Option<CellEntry>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellEntry {
    /// Bare index into the layer's default sheet; negative means empty.
    Index(i64),
    Full {
        sheet: String,
        index: u32,
    },
}

fn load_document(path: &Path) -> Result<(TileMap, bool)> {
    let source = fs::read_to_string(path).map_err(|e| SnapError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read map document: {}", e),
    })?;

    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let doc: MapDocument = if filename.ends_with(".map.json") {
        serde_json::from_str(&source).map_err(|e| parse_error(path, e.to_string()))?
    } else if filename.ends_with(".map.yaml") || filename.ends_with(".map.yml") {
        serde_yaml::from_str(&source).map_err(|e| parse_error(path, e.to_string()))?
    } else {
        return Err(SnapError::Parse {
            message: format!("unsupported map document: {}", path.display()),
            help: Some(format!("expected one of: {}", MAP_SUFFIXES.join(", "))),
        });
    };

    let doc_dir = path.parent().unwrap_or_else(|| Path::new("."));
    convert(doc, doc_dir).map_err(|e| match e {
        SnapError::Parse { message, help } => SnapError::Parse {
            message: format!("{}: {}", path.display(), message),
            help,
        },
        other => other,
    })
}

fn parse_error(path: &Path, message: String) -> SnapError {
    SnapError::Parse {
        message: format!("{}: {}", path.display(), message),
        help: None,
    }
}

fn convert(doc: MapDocument, doc_dir: &Path) -> Result<(TileMap, bool)> {
    let mut map = TileMap::new(
        doc.name.clone(),
        doc.width,
        doc.height,
        doc.tile_width,
        doc.tile_height,
    );
    if let Some(unique) = &doc.unique_name {
        map = map.with_unique_name(unique.clone());
    }

    for sheet in &doc.tilesheets {
        let image = if sheet.image.is_absolute() {
            sheet.image.clone()
        } else {
            doc_dir.join(&sheet.image)
        };
        map.add_sheet(sheet.id.clone(), image);
    }

    for entry in doc.layers {
        if entry.tiles.len() != doc.height as usize {
            return Err(SnapError::Parse {
                message: format!(
                    "layer '{}' has {} rows, map declares {}",
                    entry.id,
                    entry.tiles.len(),
                    doc.height
                ),
                help: Some("every layer grid must match the map's width and height".to_string()),
            });
        }

        let mut rows = Vec::with_capacity(entry.tiles.len());
        for (y, row) in entry.tiles.into_iter().enumerate() {
            if row.len() != doc.width as usize {
                return Err(SnapError::Parse {
                    message: format!(
                        "layer '{}' row {} has {} cells, map declares {}",
                        entry.id,
                        y,
                        row.len(),
                        doc.width
                    ),
                    help: Some("every layer grid must match the map's width and height".to_string()),
                });
            }

            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(convert_cell(cell, &entry.id, entry.sheet.as_deref())?);
            }
            rows.push(cells);
        }

        map.add_layer(Layer::new(entry.id, rows));
    }

    Ok((map, doc.current))
}

fn convert_cell(
    cell: Option<CellEntry>,
    layer_id: &str,
    default_sheet: Option<&str>,
) -> Result<Option<TileRef>> {
    match cell {
        None => Ok(None),
        Some(CellEntry::Index(i)) if i < 0 => Ok(None),
        Some(CellEntry::Index(i)) => {
            let sheet = default_sheet.ok_or_else(|| SnapError::Parse {
                message: format!(
                    "layer '{}' uses bare tile indices but declares no default sheet",
                    layer_id
                ),
                help: Some("add a 'sheet' field to the layer or use {sheet, index} cells".to_string()),
            })?;
            Ok(Some(TileRef {
                sheet: sheet.to_string(),
                index: i as u32,
            }))
        }
        Some(CellEntry::Full { sheet, index }) => Ok(Some(TileRef { sheet, index })),
    }
}
