//! Render the Phantom layout, either as a matrix grid for the terminal or as
//! an HTML page with the physical TKL arrangement drawn in SVG.

use phantom_core::{Col, KeyPosition, LayoutEntry, Row, LAYOUT, NCOL, NROW};

/// Physical placement of one switch, in key units.
struct Key {
    row: u8,
    col: u8,
    x: f64,
    y: f64,
    w: f64,
}

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

/// One physical row: its height on the board and the switches in it,
/// left to right, as (matrix row, matrix column, x, width).
type PhysicalRow = (f64, &'static [(u8, u8, f64, f64)]);

/// Physical rows from the top of the board. The function row sits half a
/// unit above the rest; Esc and Grave share matrix row 5.
#[rustfmt::skip]
const PHYSICAL: [PhysicalRow; 6] = [
    (0.0, &[
        (5, 0, 0.0, 1.0),
        (5, 2, 2.0, 1.0), (5, 3, 3.0, 1.0), (5, 4, 4.0, 1.0), (5, 5, 5.0, 1.0),
        (5, 6, 6.5, 1.0), (5, 7, 7.5, 1.0), (5, 8, 8.5, 1.0), (5, 9, 9.5, 1.0),
        (5, 10, 11.0, 1.0), (5, 11, 12.0, 1.0), (5, 12, 13.0, 1.0), (5, 13, 14.0, 1.0),
        (5, 14, 15.25, 1.0), (5, 15, 16.25, 1.0), (5, 16, 17.25, 1.0),
    ]),
    (1.5, &[
        (5, 1, 0.0, 1.0),
        (4, 0, 1.0, 1.0), (4, 1, 2.0, 1.0), (4, 2, 3.0, 1.0), (4, 3, 4.0, 1.0),
        (4, 4, 5.0, 1.0), (4, 5, 6.0, 1.0), (4, 6, 7.0, 1.0), (4, 7, 8.0, 1.0),
        (4, 8, 9.0, 1.0), (4, 9, 10.0, 1.0), (4, 10, 11.0, 1.0), (4, 11, 12.0, 1.0),
        (4, 13, 13.0, 2.0),
        (4, 14, 15.25, 1.0), (4, 15, 16.25, 1.0), (4, 16, 17.25, 1.0),
    ]),
    (2.5, &[
        (3, 0, 0.0, 1.5),
        (3, 1, 1.5, 1.0), (3, 2, 2.5, 1.0), (3, 3, 3.5, 1.0), (3, 4, 4.5, 1.0),
        (3, 5, 5.5, 1.0), (3, 6, 6.5, 1.0), (3, 7, 7.5, 1.0), (3, 8, 8.5, 1.0),
        (3, 9, 9.5, 1.0), (3, 10, 10.5, 1.0), (3, 11, 11.5, 1.0), (3, 12, 12.5, 1.0),
        (3, 13, 13.5, 1.5),
        (3, 14, 15.25, 1.0), (3, 15, 16.25, 1.0), (3, 16, 17.25, 1.0),
    ]),
    (3.5, &[
        (2, 0, 0.0, 1.75),
        (2, 1, 1.75, 1.0), (2, 2, 2.75, 1.0), (2, 3, 3.75, 1.0), (2, 4, 4.75, 1.0),
        (2, 5, 5.75, 1.0), (2, 6, 6.75, 1.0), (2, 7, 7.75, 1.0), (2, 8, 8.75, 1.0),
        (2, 9, 9.75, 1.0), (2, 10, 10.75, 1.0), (2, 11, 11.75, 1.0),
        (2, 12, 12.75, 1.0), (2, 13, 13.75, 1.25),
    ]),
    (4.5, &[
        (1, 0, 0.0, 1.25),
        (1, 1, 1.25, 1.0), (1, 2, 2.25, 1.0), (1, 3, 3.25, 1.0), (1, 4, 4.25, 1.0),
        (1, 5, 5.25, 1.0), (1, 6, 6.25, 1.0), (1, 7, 7.25, 1.0), (1, 8, 8.25, 1.0),
        (1, 9, 9.25, 1.0), (1, 10, 10.25, 1.0), (1, 11, 11.25, 1.0),
        (1, 13, 12.25, 2.75),
        (1, 15, 16.25, 1.0),
    ]),
    (5.5, &[
        (0, 0, 0.0, 1.25), (0, 1, 1.25, 1.25), (0, 2, 2.5, 1.25),
        (0, 7, 3.75, 6.25),
        (0, 10, 10.0, 1.25), (0, 11, 11.25, 1.25), (0, 12, 12.5, 1.25), (0, 13, 13.75, 1.25),
        (0, 14, 15.25, 1.0), (0, 15, 16.25, 1.0), (0, 16, 17.25, 1.0),
    ]),
];

fn build_keys() -> Vec<Key> {
    PHYSICAL
        .iter()
        .flat_map(|&(y, keys)| {
            keys.iter().map(move |&(row, col, x, w)| Key { row, col, x, y, w })
        })
        .collect()
}

fn entry_at(row: u8, col: u8) -> LayoutEntry {
    match (Row::new(row), Col::new(col)) {
        (Some(row), Some(col)) => KeyPosition::new(row, col).entry(),
        _ => LayoutEntry::Absent,
    }
}

fn label(entry: LayoutEntry) -> &'static str {
    entry.keycode().map(|kc| kc.display_name()).unwrap_or("")
}

/// Compute the bounding box of all keys in pixels.
fn bbox(keys: &[Key]) -> (f64, f64) {
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for k in keys {
        max_x = max_x.max((k.x + k.w) * S);
        max_y = max_y.max((k.y + 1.0) * S);
    }
    (max_x, max_y)
}

fn render_keys(keys: &[Key]) -> String {
    let mut svg = format!(r#"<g transform="translate({MARGIN}, {MARGIN})">"#);

    for key in keys {
        let entry = entry_at(key.row, key.col);
        let key_class = if entry.is_modifier() { "key modifier" } else { "key" };

        let (x, y) = (key.x * S, key.y * S);
        let width = key.w * S - GAP;
        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{width}" height="{U}" rx="{R}" class="{key_class}"><title>r{}c{}</title></rect>"#,
            key.row, key.col,
        ));

        let text = label(entry);
        if !text.is_empty() {
            let font_class = if text.len() > 3 { " small" } else { "" };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
                x + width / 2.0,
                y + U / 2.0 + 1.0,
                html_escape(text),
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let keys = build_keys();
    let (content_w, content_h) = bbox(&keys);
    let total_width = content_w + 2.0 * MARGIN;
    let total_height = content_h + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Phantom Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key:hover {{
    fill: #1a1a5e;
    stroke: #e94560;
  }}
  .key.modifier {{
    fill: #1b2e4e;
    stroke: #53a8b6;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .label.small {{
    font-size: 10px;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    html.push_str(&render_keys(&keys));
    html.push_str("\n</svg>\n</body>\n</html>\n");
    html
}

/// The layout as the firmware sees it: one line per matrix row, top row
/// first, `--` for unpopulated intersections.
pub fn generate_grid() -> String {
    let mut out = String::from("    ");
    for col in 0..NCOL {
        out.push_str(&format!("{:>5}", format!("c{}", col)));
    }
    out.push('\n');

    for row in Row::all().collect::<Vec<_>>().into_iter().rev() {
        out.push_str(&format!("r{}  ", row.index()));
        for col in Col::all() {
            let entry = KeyPosition::new(row, col).entry();
            let text = if entry.is_absent() { "--" } else { label(entry) };
            out.push_str(&format!("{:>5}", text));
        }
        out.push('\n');
    }

    let populated = LAYOUT.iter().filter(|e| !e.is_absent()).count();
    out.push_str(&format!(
        "{} rows x {} columns, {} switches populated\n",
        NROW, NCOL, populated
    ));
    out
}
