//! SVG rendering of a computed layout

use std::fmt::Write;

use crate::domain::layout::{DiagramLayout, Label, Segment};
use crate::domain::ViewTransform;

const STROKE: &str = "#333";
const MAIN_STROKE_WIDTH: f64 = 2.0;
const SUB_STROKE_WIDTH: f64 = 1.5;
const SPINE_STROKE_WIDTH: f64 = 3.0;
const MAIN_FONT_SIZE: u32 = 14;
const SUB_FONT_SIZE: u32 = 12;

/// Escape text for use in element content and attribute values.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn line(out: &mut String, segment: &Segment, width: f64) {
    // writing into a String cannot fail
    let _ = writeln!(
        out,
        r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
        segment.start.x, segment.start.y, segment.end.x, segment.end.y, STROKE, width
    );
}

fn text(out: &mut String, label: &Label, font_size: u32) {
    let _ = writeln!(
        out,
        r#"    <text x="{x}" y="{y}" font-size="{font_size}" text-anchor="{anchor}" transform="rotate({rot} {x} {y})">{text}</text>"#,
        x = label.anchor.x,
        y = label.anchor.y,
        anchor = label.text_anchor.as_str(),
        rot = label.rotation_deg,
        text = escape_xml(&label.text),
    );
}

/// Render `layout` as a standalone SVG document with `view` applied to the
/// drawing group.
pub fn render_svg(layout: &DiagramLayout, view: ViewTransform) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.viewport.width,
        h = layout.viewport.height,
    );
    let _ = writeln!(out, r#"  <g transform="{}">"#, view.svg_attr());

    line(&mut out, &layout.spine, SPINE_STROKE_WIDTH);
    let points: Vec<String> = layout
        .head
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect();
    let _ = writeln!(
        out,
        r#"    <polygon points="{}" fill="{}"/>"#,
        points.join(" "),
        STROKE
    );

    for branch in &layout.branches {
        line(&mut out, &branch.segment, MAIN_STROKE_WIDTH);
        text(&mut out, &branch.label, MAIN_FONT_SIZE);
        for sub in &branch.sub_branches {
            line(&mut out, &sub.segment, SUB_STROKE_WIDTH);
            text(&mut out, &sub.label, SUB_FONT_SIZE);
        }
    }

    out.push_str("  </g>\n</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{compute_layout, Bone, Viewport};

    #[test]
    fn given_markup_in_name_when_escaping_then_entities_replace_it() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn given_forest_when_rendering_then_one_line_and_text_per_bone() {
        let mut root = Bone::new_root("r1", "Machine", "user");
        root.children.push(Bone::new_child("c1", "Wear", "user", "r1"));
        let forest = vec![root, Bone::new_root("r2", "People <ops>", "user")];
        let layout = compute_layout(&forest, Viewport::default());

        let svg = render_svg(&layout, ViewTransform::default());

        // spine plus three bones
        assert_eq!(svg.matches("<line ").count(), 4);
        assert_eq!(svg.matches("<text ").count(), 3);
        assert!(svg.contains("People &lt;ops&gt;"));
        assert!(svg.contains(r#"transform="translate(0,0) scale(1)""#));
    }
}
