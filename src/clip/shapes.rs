// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Clip shape inspection and geometry emission.
//!
//! Every child of a `<clipPath>` is reduced to a [`ClipShape`]: the
//! facts the classifier needs (elementary or not, command count,
//! transform/filter presence) plus an absolute-coordinate outline for
//! `custGeom` emission.

use std::str::FromStr;

use kurbo::{Arc, BezPath, PathEl, Point, Shape, SvgArc, Vec2};
use svgtypes::{PathParser, PathSegment};
use xmlwriter::XmlWriter;

use crate::svgtree::SvgNodeExt;
use crate::units;

/// One shape inside a `<clipPath>`, reduced to classification facts.
#[derive(Clone, Debug)]
pub struct ClipShape {
    /// The element's local tag name.
    pub tag: String,

    /// `rect`, `circle` or `ellipse`.
    pub elementary: bool,

    /// Number of drawing commands. Elementary shapes count as one.
    pub command_count: usize,

    /// Raw `d` attribute length, zero for non-path shapes.
    pub path_data_len: usize,

    /// The shape carries its own `transform`.
    pub has_transform: bool,

    /// The shape carries its own `filter`.
    pub has_filter: bool,

    /// `text`, `tspan`, `image` or `use`, directly or in a descendant.
    pub unsupported: bool,

    /// Absolute-coordinate outline, when the geometry is expressible.
    pub outline: Option<BezPath>,
}

const UNSUPPORTED_TAGS: &[&str] = &["text", "tspan", "image", "use"];

/// Collects all element children of a `<clipPath>` node.
pub fn collect(clip_node: roxmltree::Node) -> Vec<ClipShape> {
    clip_node
        .children()
        .filter(|n| n.is_element())
        .map(from_node)
        .collect()
}

/// Reduces a single clip child to its classification facts.
pub fn from_node(node: roxmltree::Node) -> ClipShape {
    let tag = node.tag_name().name().to_string();
    let unsupported = node
        .descendants()
        .filter(|n| n.is_element())
        .any(|n| UNSUPPORTED_TAGS.contains(&n.tag_name().name()));

    let path_data = if tag == "path" { node.attr("d") } else { None };
    let outline = outline_of(node, &tag);

    let command_count = match path_data {
        Some(d) => PathParser::from(d).count(),
        None => 1,
    };

    ClipShape {
        elementary: matches!(tag.as_str(), "rect" | "circle" | "ellipse"),
        command_count,
        path_data_len: path_data.map_or(0, str::len),
        has_transform: node.attr("transform").is_some(),
        has_filter: node.attr("filter").is_some(),
        unsupported,
        outline,
        tag,
    }
}

fn length_of(node: roxmltree::Node, name: &str, default: f64) -> f64 {
    // Units other than plain numbers and px are rare inside clips;
    // everything is treated as user units.
    match node.attr(name).map(svgtypes::Length::from_str) {
        Some(Ok(len)) => len.number,
        Some(Err(_)) => {
            log::warn!("Failed to parse '{}' value.", name);
            default
        }
        None => default,
    }
}

fn outline_of(node: roxmltree::Node, tag: &str) -> Option<BezPath> {
    match tag {
        "rect" => {
            let x = length_of(node, "x", 0.0);
            let y = length_of(node, "y", 0.0);
            let w = length_of(node, "width", 0.0);
            let h = length_of(node, "height", 0.0);
            if w <= 0.0 || h <= 0.0 {
                return None;
            }

            Some(kurbo::Rect::new(x, y, x + w, y + h).to_path(0.1))
        }
        "circle" => {
            let cx = length_of(node, "cx", 0.0);
            let cy = length_of(node, "cy", 0.0);
            let r = length_of(node, "r", 0.0);
            if r <= 0.0 {
                return None;
            }

            Some(kurbo::Circle::new((cx, cy), r).to_path(0.1))
        }
        "ellipse" => {
            let cx = length_of(node, "cx", 0.0);
            let cy = length_of(node, "cy", 0.0);
            let rx = length_of(node, "rx", 0.0);
            let ry = length_of(node, "ry", 0.0);
            if rx <= 0.0 || ry <= 0.0 {
                return None;
            }

            let ellipse = kurbo::Ellipse::new((cx, cy), (rx, ry), 0.0);
            Some(ellipse.to_path(0.1))
        }
        "path" => parse_path(node.attr("d")?),
        _ => None,
    }
}

/// Parses SVG path data into an absolute-coordinate `BezPath`.
///
/// Relative commands are resolved, shorthand commands expanded and
/// elliptical arcs converted to cubics. Returns `None` for malformed
/// or empty data.
pub fn parse_path(data: &str) -> Option<BezPath> {
    let mut path = BezPath::new();

    // Current point, subpath start and the previous control points
    // needed by the smooth shorthands.
    let mut pos = Point::ZERO;
    let mut start = Point::ZERO;
    let mut prev_cubic_ctrl: Option<Point> = None;
    let mut prev_quad_ctrl: Option<Point> = None;

    for segment in PathParser::from(data) {
        let segment = segment.ok()?;

        let mut new_cubic_ctrl = None;
        let mut new_quad_ctrl = None;

        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                pos = resolve(pos, abs, x, y);
                start = pos;
                path.move_to(pos);
            }
            PathSegment::LineTo { abs, x, y } => {
                pos = resolve(pos, abs, x, y);
                path.line_to(pos);
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                pos = if abs { Point::new(x, pos.y) } else { Point::new(pos.x + x, pos.y) };
                path.line_to(pos);
            }
            PathSegment::VerticalLineTo { abs, y } => {
                pos = if abs { Point::new(pos.x, y) } else { Point::new(pos.x, pos.y + y) };
                path.line_to(pos);
            }
            PathSegment::CurveTo { abs, x1, y1, x2, y2, x, y } => {
                let p1 = resolve(pos, abs, x1, y1);
                let p2 = resolve(pos, abs, x2, y2);
                pos = resolve(pos, abs, x, y);
                path.curve_to(p1, p2, pos);
                new_cubic_ctrl = Some(p2);
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let p1 = reflect(pos, prev_cubic_ctrl);
                let p2 = resolve(pos, abs, x2, y2);
                pos = resolve(pos, abs, x, y);
                path.curve_to(p1, p2, pos);
                new_cubic_ctrl = Some(p2);
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let q = resolve(pos, abs, x1, y1);
                pos = resolve(pos, abs, x, y);
                path.quad_to(q, pos);
                new_quad_ctrl = Some(q);
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let q = reflect(pos, prev_quad_ctrl);
                pos = resolve(pos, abs, x, y);
                path.quad_to(q, pos);
                new_quad_ctrl = Some(q);
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let to = resolve(pos, abs, x, y);
                let svg_arc = SvgArc {
                    from: pos,
                    to,
                    radii: Vec2::new(rx, ry),
                    x_rotation: x_axis_rotation.to_radians(),
                    large_arc,
                    sweep,
                };

                match Arc::from_svg_arc(&svg_arc) {
                    Some(arc) => {
                        arc.to_cubic_beziers(0.1, |p1, p2, p| path.curve_to(p1, p2, p));
                    }
                    // Degenerate radii draw a straight line per the
                    // SVG arc rules.
                    None => path.line_to(to),
                }

                pos = to;
            }
            PathSegment::ClosePath { .. } => {
                path.close_path();
                pos = start;
            }
        }

        prev_cubic_ctrl = new_cubic_ctrl;
        prev_quad_ctrl = new_quad_ctrl;
    }

    if path.elements().is_empty() {
        None
    } else {
        Some(path)
    }
}

fn resolve(pos: Point, abs: bool, x: f64, y: f64) -> Point {
    if abs {
        Point::new(x, y)
    } else {
        Point::new(pos.x + x, pos.y + y)
    }
}

fn reflect(pos: Point, ctrl: Option<Point>) -> Point {
    match ctrl {
        Some(c) => Point::new(2.0 * pos.x - c.x, 2.0 * pos.y - c.y),
        None => pos,
    }
}

/// Union bounding box of all expressible outlines.
pub fn union_bbox(shapes: &[ClipShape]) -> Option<kurbo::Rect> {
    let mut bbox: Option<kurbo::Rect> = None;
    for shape in shapes {
        if let Some(ref outline) = shape.outline {
            let b = outline.bounding_box();
            bbox = Some(match bbox {
                Some(prev) => prev.union(b),
                None => b,
            });
        }
    }

    bbox
}

/// Writes an `<a:prstGeom>` for a single elementary shape.
pub fn write_prst_geom(xml: &mut XmlWriter, shape: &ClipShape) {
    let preset = match shape.tag.as_str() {
        "rect" => "rect",
        _ => "ellipse",
    };

    xml.start_element("a:prstGeom");
    xml.write_attribute("prst", preset);
    xml.start_element("a:avLst");
    xml.end_element();
    xml.end_element();
}

/// Writes an `<a:custGeom>` containing one `<a:path>` per shape
/// outline, in EMU relative to the union bounding box.
pub fn write_cust_geom(xml: &mut XmlWriter, shapes: &[ClipShape], dpi: f64) {
    let bbox = match union_bbox(shapes) {
        Some(b) => b,
        None => return,
    };

    let w = units::px_to_emu(bbox.width(), dpi);
    let h = units::px_to_emu(bbox.height(), dpi);
    let to_emu = |p: Point| {
        (
            units::px_to_emu(p.x - bbox.x0, dpi),
            units::px_to_emu(p.y - bbox.y0, dpi),
        )
    };

    xml.start_element("a:custGeom");
    xml.start_element("a:avLst");
    xml.end_element();
    xml.start_element("a:gdLst");
    xml.end_element();
    xml.start_element("a:ahLst");
    xml.end_element();
    xml.start_element("a:cxnLst");
    xml.end_element();

    xml.start_element("a:rect");
    xml.write_attribute("l", "0");
    xml.write_attribute("t", "0");
    xml.write_attribute("r", &w);
    xml.write_attribute("b", &h);
    xml.end_element();

    xml.start_element("a:pathLst");
    for shape in shapes {
        let outline = match shape.outline {
            Some(ref outline) => outline,
            None => continue,
        };

        xml.start_element("a:path");
        xml.write_attribute("w", &w);
        xml.write_attribute("h", &h);

        let mut pos = Point::ZERO;
        for element in outline.elements() {
            match *element {
                PathEl::MoveTo(p) => {
                    write_pt_element(xml, "a:moveTo", &[to_emu(p)]);
                    pos = p;
                }
                PathEl::LineTo(p) => {
                    write_pt_element(xml, "a:lnTo", &[to_emu(p)]);
                    pos = p;
                }
                PathEl::CurveTo(p1, p2, p) => {
                    write_pt_element(xml, "a:cubicBezTo", &[to_emu(p1), to_emu(p2), to_emu(p)]);
                    pos = p;
                }
                PathEl::QuadTo(q, p) => {
                    // DrawingML has no quadratic segment; raise to a
                    // cubic with the standard 2/3 control points.
                    let quad = kurbo::QuadBez::new(pos, q, p);
                    let cubic = quad.raise();
                    write_pt_element(
                        xml,
                        "a:cubicBezTo",
                        &[to_emu(cubic.p1), to_emu(cubic.p2), to_emu(cubic.p3)],
                    );
                    pos = p;
                }
                PathEl::ClosePath => {
                    xml.start_element("a:close");
                    xml.end_element();
                }
            }
        }

        xml.end_element();
    }
    xml.end_element();

    xml.end_element();
}

fn write_pt_element(xml: &mut XmlWriter, name: &str, points: &[(i64, i64)]) {
    xml.start_element(name);
    for &(x, y) in points {
        xml.start_element("a:pt");
        xml.write_attribute("x", &x);
        xml.write_attribute("y", &y);
        xml.end_element();
    }
    xml.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_from(text: &str) -> ClipShape {
        let text = format!("<svg>{}</svg>", text);
        let doc = roxmltree::Document::parse(&text).unwrap();
        from_node(doc.root_element().first_element_child().unwrap())
    }

    #[test]
    fn rect_is_elementary() {
        let shape = shape_from("<rect x='10' y='10' width='100' height='50'/>");
        assert!(shape.elementary);
        assert_eq!(shape.command_count, 1);
        assert!(!shape.unsupported);
        assert!(shape.outline.is_some());
    }

    #[test]
    fn path_commands_are_counted() {
        let shape = shape_from("<path d='M 0 0 L 10 0 L 10 10 L 0 10 Z'/>");
        assert!(!shape.elementary);
        assert_eq!(shape.command_count, 5);
    }

    #[test]
    fn text_descendant_is_unsupported() {
        let shape = shape_from("<g><text x='0' y='0'>hi</text></g>");
        assert!(shape.unsupported);

        let shape = shape_from("<use href='#other'/>");
        assert!(shape.unsupported);
    }

    #[test]
    fn relative_path_is_resolved() {
        let path = parse_path("m 10 10 l 5 0 v 5 h -5 z").unwrap();
        let bbox = path.bounding_box();
        assert_eq!(bbox.x0, 10.0);
        assert_eq!(bbox.y0, 10.0);
        assert_eq!(bbox.x1, 15.0);
        assert_eq!(bbox.y1, 15.0);
    }

    #[test]
    fn arc_becomes_cubics() {
        let path = parse_path("M 0 0 A 10 10 0 0 1 20 0").unwrap();
        let has_curve = path
            .elements()
            .iter()
            .any(|e| matches!(e, PathEl::CurveTo(..)));
        assert!(has_curve);
    }

    #[test]
    fn malformed_path_is_rejected() {
        assert!(parse_path("M 0 zz").is_none());
        assert!(parse_path("").is_none());
    }

    #[test]
    fn cust_geom_uses_emu() {
        let shape = shape_from("<rect width='96' height='48'/>");
        let mut xml = XmlWriter::new(xmlwriter::Options::default());
        write_cust_geom(&mut xml, &[shape], 96.0);
        let out = xml.end_document();

        // 96px at 96dpi is exactly one inch.
        assert!(out.contains("w=\"914400\""));
        assert!(out.contains("h=\"457200\""));
        assert!(out.contains("a:lnTo"));
    }
}
