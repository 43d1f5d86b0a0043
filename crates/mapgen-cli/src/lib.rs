//! SVG rendering and option parsing for the `mapgen` binary
//!
//! The renderer only reads a finished [`Layout`]; it has no influence on
//! generation.

use std::fmt::Write;

use anyhow::{Context, bail};
use mapgen_core::{ConnectorGeometry, Layout, Rect};

/// Colors and stroke sizes used by [`render_svg`]
#[derive(Debug, Clone)]
pub struct SvgTheme {
    pub background: &'static str,
    pub room_fill: &'static str,
    pub room_stroke: &'static str,
    pub corridor: &'static str,
    pub forced: &'static str,
    pub door: &'static str,
    pub label: &'static str,
}

impl Default for SvgTheme {
    fn default() -> Self {
        Self {
            background: "#1e1e2e",
            room_fill: "#45475a",
            room_stroke: "#cdd6f4",
            corridor: "#a6adc8",
            forced: "#f38ba8",
            door: "#f9e2af",
            label: "#cdd6f4",
        }
    }
}

/// Render the layout as a standalone SVG document, `scale` pixels per unit
pub fn render_svg(layout: &Layout, scale: f64) -> String {
    render_svg_with_theme(layout, scale, &SvgTheme::default())
}

pub fn render_svg_with_theme(layout: &Layout, scale: f64, theme: &SvgTheme) -> String {
    let bounds = layout.bounds();
    let mut svg = String::new();
    // Writing into a String never fails
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        fmt(bounds.width * scale),
        fmt(bounds.height * scale),
        fmt(bounds.x * scale),
        fmt(bounds.y * scale),
        fmt(bounds.width * scale),
        fmt(bounds.height * scale),
    );
    let _ = writeln!(
        svg,
        r#"  <rect {} fill="{}"/>"#,
        rect_attrs(&bounds, scale),
        theme.background
    );

    for connector in layout.connectors() {
        let color = if connector.forced() { theme.forced } else { theme.corridor };
        match connector.geometry() {
            ConnectorGeometry::Segments(rects) => {
                for rect in rects {
                    let _ =
                        writeln!(svg, r#"  <rect {} fill="{}"/>"#, rect_attrs(rect, scale), color);
                }
            }
            ConnectorGeometry::Path(cells) => {
                let points: Vec<String> = cells
                    .iter()
                    .map(|c| {
                        format!(
                            "{},{}",
                            fmt((c.x as f64 + 0.5) * scale),
                            fmt((c.y as f64 + 0.5) * scale)
                        )
                    })
                    .collect();
                let _ = writeln!(
                    svg,
                    r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
                    points.join(" "),
                    color,
                    fmt(scale)
                );
            }
            ConnectorGeometry::Doorway => {}
        }
    }

    for room in layout.rooms() {
        let rect = room.rect();
        let _ = writeln!(
            svg,
            r#"  <rect {} fill="{}" stroke="{}" stroke-width="{}"/>"#,
            rect_attrs(rect, scale),
            theme.room_fill,
            theme.room_stroke,
            fmt((scale / 8.0).max(0.5))
        );
        let center = room.center();
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" fill="{}" font-family="monospace" font-size="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            fmt(center.x * scale),
            fmt(center.y * scale),
            theme.label,
            fmt((scale * 2.0).max(8.0)),
            room.id()
        );
    }

    for room in layout.rooms() {
        for door in room.doors() {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                fmt(door.anchor.x * scale),
                fmt(door.anchor.y * scale),
                fmt((scale / 3.0).max(1.0)),
                theme.door
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn rect_attrs(rect: &Rect, scale: f64) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        fmt(rect.x * scale),
        fmt(rect.y * scale),
        fmt(rect.width * scale),
        fmt(rect.height * scale)
    )
}

/// Compact number formatting (no trailing zeros)
fn fmt(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Parse a size list such as `10x10,20x8`
pub fn parse_sizes(spec: &str) -> anyhow::Result<Vec<(u32, u32)>> {
    let mut sizes = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((w, h)) = item.split_once(['x', 'X']) else {
            bail!("room size `{}` is not WIDTHxHEIGHT", item);
        };
        let w: u32 = w.trim().parse().with_context(|| format!("bad width in `{}`", item))?;
        let h: u32 = h.trim().parse().with_context(|| format!("bad height in `{}`", item))?;
        sizes.push((w, h));
    }
    if sizes.is_empty() {
        bail!("no room sizes given");
    }
    Ok(sizes)
}
