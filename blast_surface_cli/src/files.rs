//! Plain-text readers for points, breaklines and clip polygons.

use std::fs;
use std::io::{self, Write};

use blast_surface::{Breakline, Point, Point3, RawPoint, SourceTag, Surface};

fn invalid(line: usize, msg: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {line}: {msg}"))
}

fn parse_coord(line: usize, field: &str) -> io::Result<f64> {
    field.trim().parse::<f64>().map_err(|e| invalid(line, e))
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_tag(line: usize, field: &str) -> io::Result<SourceTag> {
    match field.trim().to_ascii_lowercase().as_str() {
        "" | "point" | "survey" => Ok(SourceTag::RawPoint),
        "collar" | "hole" => Ok(SourceTag::HoleCollar),
        other => Err(invalid(line, format!("unknown point tag `{other}`"))),
    }
}

/// Reads `x,y,z[,tag]` rows. The tag is `collar`/`hole` for hole collars,
/// anything else in `point`/`survey` or empty for survey points.
pub fn read_points_csv(path: &str) -> io::Result<Vec<RawPoint>> {
    let text = fs::read_to_string(path)?;
    let mut points = Vec::new();
    for (line, row) in data_lines(&text) {
        let parts: Vec<&str> = row.split(',').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(invalid(line, "expected x,y,z[,tag]"));
        }
        let position = Point3::new(
            parse_coord(line, parts[0])?,
            parse_coord(line, parts[1])?,
            parse_coord(line, parts[2])?,
        );
        let tag = parse_tag(line, parts.get(3).copied().unwrap_or(""))?;
        points.push(RawPoint::new(position, tag, format!("{path}:{line}")));
    }
    Ok(points)
}

/// Reads blocks of `x,y,z` rows separated by blank lines. Each block starts
/// with a header row `open` or `closed`.
pub fn read_breaklines(path: &str) -> io::Result<Vec<Breakline>> {
    let text = fs::read_to_string(path)?;
    let mut lines = Vec::new();
    let mut current: Option<(usize, bool, Vec<Point3>)> = None;

    let mut finish = |block: Option<(usize, bool, Vec<Point3>)>| {
        if let Some((start, closed, vertices)) = block {
            let line = if closed {
                Breakline::closed(vertices)
            } else {
                Breakline::open(vertices)
            };
            lines.push(line.with_source_ref(format!("{path}:{start}")));
        }
    };

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let row = raw.trim();
        if row.starts_with('#') {
            continue;
        }
        if row.is_empty() {
            finish(current.take());
            continue;
        }
        match current.as_mut() {
            None => {
                let closed = match row.to_ascii_lowercase().as_str() {
                    "open" => false,
                    "closed" => true,
                    _ => return Err(invalid(line, "expected `open` or `closed` header")),
                };
                current = Some((line, closed, Vec::new()));
            }
            Some((_, _, vertices)) => {
                let parts: Vec<&str> = row.split(',').collect();
                if parts.len() != 3 {
                    return Err(invalid(line, "expected x,y,z"));
                }
                vertices.push(Point3::new(
                    parse_coord(line, parts[0])?,
                    parse_coord(line, parts[1])?,
                    parse_coord(line, parts[2])?,
                ));
            }
        }
    }
    finish(current.take());
    Ok(lines)
}

/// Reads a polygon as `x,y` rows.
pub fn read_polygon(path: &str) -> io::Result<Vec<Point>> {
    let text = fs::read_to_string(path)?;
    let mut poly = Vec::new();
    for (line, row) in data_lines(&text) {
        let parts: Vec<&str> = row.split(',').collect();
        if parts.len() != 2 {
            return Err(invalid(line, "expected x,y"));
        }
        poly.push(Point::new(
            parse_coord(line, parts[0])?,
            parse_coord(line, parts[1])?,
        ));
    }
    Ok(poly)
}

pub fn write_surface(path: &str, surface: &Surface) -> io::Result<()> {
    let json = serde_json::to_string_pretty(surface)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    writeln!(file)
}
