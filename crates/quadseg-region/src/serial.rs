//! Serialization for RegionTree
//!
//! Text-based format listing every region of the arena, so merged regions
//! and internal nodes survive a round trip.
//!
//! # Format
//!
//! ```text
//! Region tree Version 1
//! ROI: x = X, y = Y, w = W, h = H
//! Channels = C
//! Number of regions = N
//!   Region[0]: x = X, y = Y, w = W, h = H, children = A B C D
//!   Region[1]: x = X, y = Y, w = W, h = H, label = V1 [V2 ...]
//!   Region[2]: x = X, y = Y, w = W, h = H, label = V1, merged = 1
//!   ...
//! ```
//!
//! Label values use Rust's shortest round-trip formatting, so reading a
//! written tree yields an identical tree.

use crate::error::{RegionError, RegionResult};
use crate::tree::{Label, RegionId, RegionRaw, RegionTree};
use quadseg_core::{Error, MAX_CHANNELS, Rect};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Serialization format version
const REGION_TREE_VERSION: i32 = 1;

/// Maximum number of regions in a serialized tree
const MAX_REGIONS: usize = 50_000_000;

/// Maximum region-of-interest area in cells (bounds `label_map` allocations)
const MAX_ROI_AREA: u64 = 1 << 28;

/// Maximum input size in bytes to prevent unbounded memory growth
const MAX_INPUT_SIZE: usize = 2_000_000_000;

fn decode_err(msg: impl Into<String>) -> RegionError {
    RegionError::Core(Error::DecodeError(msg.into()))
}

impl RegionTree {
    /// Read a tree from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> RegionResult<Self> {
        let mut buf = String::new();
        reader
            .take(MAX_INPUT_SIZE as u64)
            .read_to_string(&mut buf)
            .map_err(Error::from)?;
        Self::read_from_bytes(buf.as_bytes())
    }

    /// Read a tree from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> RegionResult<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(Error::from)?;
        let mut reader = BufReader::new(file);
        Self::read_from_reader(&mut reader)
    }

    /// Read a tree from bytes.
    ///
    /// The rebuilt tree is checked with [`RegionTree::validate`].
    pub fn read_from_bytes(data: &[u8]) -> RegionResult<Self> {
        let text =
            std::str::from_utf8(data).map_err(|e| decode_err(format!("invalid UTF-8: {e}")))?;
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        parse_tree(&mut lines)
    }

    /// Write a tree to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> RegionResult<()> {
        write_tree(writer, self).map_err(Error::from)?;
        Ok(())
    }

    /// Write a tree to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> RegionResult<()> {
        let file = std::fs::File::create(path.as_ref()).map_err(Error::from)?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush().map_err(Error::from)?;
        Ok(())
    }

    /// Write a tree to bytes.
    pub fn write_to_bytes(&self) -> RegionResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

fn write_tree(w: &mut impl Write, tree: &RegionTree) -> std::io::Result<()> {
    let roi = tree.roi();
    writeln!(w, "Region tree Version {}", REGION_TREE_VERSION)?;
    writeln!(
        w,
        "ROI: x = {}, y = {}, w = {}, h = {}",
        roi.x, roi.y, roi.w, roi.h
    )?;
    writeln!(w, "Channels = {}", tree.channels())?;
    writeln!(w, "Number of regions = {}", tree.len())?;

    for (id, region) in tree.iter() {
        let r = region.rect();
        write!(
            w,
            "  Region[{}]: x = {}, y = {}, w = {}, h = {}",
            id, r.x, r.y, r.w, r.h
        )?;
        if let Some(children) = region.children() {
            write!(
                w,
                ", children = {} {} {} {}",
                children[0], children[1], children[2], children[3]
            )?;
        }
        if let Some(label) = region.label() {
            write!(w, ", label =")?;
            for v in label.values() {
                write!(w, " {}", v)?;
            }
        }
        if let Some(target) = region.merged_into() {
            write!(w, ", merged = {}", target)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn next_line<'a>(lines: &mut impl Iterator<Item = &'a str>, what: &str) -> RegionResult<&'a str> {
    lines
        .next()
        .ok_or_else(|| decode_err(format!("unexpected end of data: missing {what}")))
}

fn parse_number<T: std::str::FromStr>(s: &str, what: &str) -> RegionResult<T> {
    s.trim()
        .parse()
        .map_err(|_| decode_err(format!("invalid {what}: '{}'", s.trim())))
}

fn parse_after<'a>(line: &'a str, prefix: &str) -> RegionResult<&'a str> {
    line.strip_prefix(prefix)
        .ok_or_else(|| decode_err(format!("expected '{prefix}', got '{line}'")))
}

/// Parse the `x = X, y = Y, w = W, h = H` part shared by ROI and region lines
fn parse_rect(fields: &[(&str, &str)]) -> RegionResult<Rect> {
    let get = |key: &str| -> RegionResult<u32> {
        let (_, v) = fields
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| decode_err(format!("missing '{key}'")))?;
        parse_number(v, key)
    };
    Ok(Rect::new(get("x")?, get("y")?, get("w")?, get("h")?))
}

fn split_fields(s: &str) -> RegionResult<Vec<(&str, &str)>> {
    s.split(',')
        .map(|part| {
            part.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| decode_err(format!("expected 'key = value', got '{}'", part.trim())))
        })
        .collect()
}

fn parse_tree<'a>(lines: &mut impl Iterator<Item = &'a str>) -> RegionResult<RegionTree> {
    let version_line = next_line(lines, "version header")?;
    let version: i32 = parse_number(parse_after(version_line, "Region tree Version")?, "version")?;
    if version != REGION_TREE_VERSION {
        return Err(decode_err(format!(
            "unsupported region tree version: {version}"
        )));
    }

    let roi_line = next_line(lines, "ROI")?;
    let roi = parse_rect(&split_fields(parse_after(roi_line, "ROI:")?)?)?;
    if roi.area() > MAX_ROI_AREA {
        return Err(decode_err(format!("region of interest too large: {roi}")));
    }

    let channels_line = next_line(lines, "channel count")?;
    let channels: u32 = parse_number(parse_after(channels_line, "Channels =")?, "channels")?;
    if channels == 0 || channels as usize > MAX_CHANNELS {
        return Err(RegionError::Core(Error::InvalidChannels(channels)));
    }

    let count_line = next_line(lines, "region count")?;
    let count: usize =
        parse_number(parse_after(count_line, "Number of regions =")?, "region count")?;
    if count == 0 || count > MAX_REGIONS {
        return Err(decode_err(format!("invalid region count: {count}")));
    }

    let mut nodes = Vec::with_capacity(count.min(1 << 16));
    for i in 0..count {
        let line = next_line(lines, "region")?;
        let rest = parse_after(line, &format!("Region[{i}]:"))?;
        nodes.push(parse_region(rest, channels)?);
    }

    RegionTree::from_parts(roi, channels, nodes)
}

fn parse_ids<const N: usize>(s: &str) -> RegionResult<[RegionId; N]> {
    let ids: Vec<RegionId> = s
        .split_whitespace()
        .map(|t| parse_number::<usize>(t, "region id").map(RegionId::new))
        .collect::<RegionResult<_>>()?;
    ids.try_into()
        .map_err(|_| decode_err(format!("expected {N} region ids, got '{s}'")))
}

fn parse_region(s: &str, channels: u32) -> RegionResult<RegionRaw> {
    let fields = split_fields(s)?;
    let rect = parse_rect(&fields)?;
    let mut raw = RegionRaw {
        rect,
        label: None,
        children: None,
        merged_into: None,
    };

    for (key, value) in fields {
        match key {
            "x" | "y" | "w" | "h" => {}
            "children" => raw.children = Some(parse_ids::<4>(value)?),
            "merged" => raw.merged_into = Some(parse_ids::<1>(value)?[0]),
            "label" => {
                let values: Vec<f64> = value
                    .split_whitespace()
                    .map(|t| parse_number(t, "label value"))
                    .collect::<RegionResult<_>>()?;
                if values.len() != channels as usize {
                    return Err(decode_err(format!(
                        "label has {} values, expected {}",
                        values.len(),
                        channels
                    )));
                }
                raw.label = Some(Label::from_values(&values));
            }
            other => return Err(decode_err(format!("unknown region field '{other}'"))),
        }
    }
    Ok(raw)
}
