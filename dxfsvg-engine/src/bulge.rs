//! 多段线顶点凸度转换。

use dxfsvg_core::document::PolylineVertex;
use dxfsvg_core::geometry::Point2;
use dxfsvg_core::path::{ArcTo, Path, PathSegment};

/// 两点距离低于该值视为重合，退化为直线段。
pub const COINCIDENT_TOLERANCE: f64 = 1e-10;

/// 由起点的凸度生成到下一顶点的段：凸度为 0 或两点重合时为直线，否则为圆弧。
pub fn bulge_segment(from: Point2, to: Point2, bulge: f64) -> PathSegment {
    let distance = from.distance_to(to);
    if bulge == 0.0 || distance < COINCIDENT_TOLERANCE {
        return PathSegment::LineTo(to);
    }

    let included_angle = 4.0 * bulge.abs().atan();
    let radius = (distance * 0.5) / (included_angle * 0.5).sin();
    PathSegment::ArcTo(ArcTo {
        radius_x: radius,
        radius_y: radius,
        x_axis_rotation: 0.0,
        is_large_arc: included_angle > std::f64::consts::PI,
        is_counter_clockwise: bulge > 0.0,
        end: to,
    })
}

/// 多段线的完整段序列（含起始 `MoveTo`）；闭合时追加末点回到首点的一段。
pub fn polyline_segments(vertices: &[PolylineVertex], is_closed: bool) -> Vec<PathSegment> {
    let Some(first) = vertices.first() else {
        return Vec::new();
    };

    let mut segments = Vec::with_capacity(vertices.len() + 1);
    segments.push(PathSegment::MoveTo(first.position));
    for pair in vertices.windows(2) {
        segments.push(bulge_segment(pair[0].position, pair[1].position, pair[0].bulge));
    }
    if is_closed {
        if let Some(last) = vertices.last() {
            segments.push(bulge_segment(last.position, first.position, last.bulge));
        }
    }
    segments
}

/// 没有顶点的多段线不产生路径。
pub fn polyline_path(vertices: &[PolylineVertex], is_closed: bool) -> Option<Path> {
    Path::new(polyline_segments(vertices, is_closed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bulge_is_straight_line() {
        let segment = bulge_segment(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0), 0.0);
        assert_eq!(segment, PathSegment::LineTo(Point2::new(3.0, 4.0)));
    }

    #[test]
    fn coincident_points_collapse_to_line() {
        let point = Point2::new(1.0, 1.0);
        let nearly = Point2::new(1.0 + 1e-12, 1.0);
        assert_eq!(bulge_segment(point, nearly, 0.8), PathSegment::LineTo(nearly));
    }

    #[test]
    fn positive_half_bulge_is_small_counter_clockwise_arc() {
        let segment = bulge_segment(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), 0.5);
        match segment {
            PathSegment::ArcTo(arc) => {
                assert!(arc.is_counter_clockwise);
                assert!(!arc.is_large_arc);
                let included = 4.0 * 0.5_f64.atan();
                let expected = 1.0 / (included * 0.5).sin();
                assert!((arc.radius_x - expected).abs() < 1e-9);
                assert_eq!(arc.radius_x, arc.radius_y);
                assert_eq!(arc.x_axis_rotation, 0.0);
                assert_eq!(arc.end, Point2::new(2.0, 0.0));
            }
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn negative_bulge_above_one_is_large_clockwise_arc() {
        let segment = bulge_segment(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), -2.0);
        match segment {
            PathSegment::ArcTo(arc) => {
                assert!(!arc.is_counter_clockwise);
                assert!(arc.is_large_arc);
            }
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn semicircle_bulge_radius_is_half_chord() {
        match bulge_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0), 1.0) {
            PathSegment::ArcTo(arc) => {
                assert!((arc.radius_x - 2.0).abs() < 1e-9);
                assert!(!arc.is_large_arc);
            }
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn closed_square_has_move_and_four_lines() {
        let vertices: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .into_iter()
            .map(|(x, y)| PolylineVertex::new(Point2::new(x, y)))
            .collect();
        let path = polyline_path(&vertices, true).expect("square path");
        assert_eq!(path.len(), 5);
        assert_eq!(path.to_string(), "M 0.0 0.0 L 1.0 0.0 L 1.0 1.0 L 0.0 1.0 L 0.0 0.0");

        let open = polyline_path(&vertices, false).expect("open path");
        assert_eq!(open.len(), 4);
    }

    #[test]
    fn closing_segment_uses_last_vertex_bulge() {
        let vertices = [
            PolylineVertex::new(Point2::new(0.0, 0.0)),
            PolylineVertex::with_bulge(Point2::new(2.0, 0.0), 1.0),
        ];
        let segments = polyline_segments(&vertices, true);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], PathSegment::LineTo(Point2::new(2.0, 0.0)));
        match segments[2] {
            PathSegment::ArcTo(arc) => {
                assert!(arc.is_counter_clockwise);
                assert_eq!(arc.end, Point2::new(0.0, 0.0));
            }
            other => panic!("unexpected closing segment: {other:?}"),
        }
    }

    #[test]
    fn empty_polyline_has_no_path() {
        assert!(polyline_path(&[], true).is_none());
        assert!(polyline_segments(&[], false).is_empty());
    }
}
