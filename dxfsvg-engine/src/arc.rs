//! 圆弧、椭圆弧转换为 SVG 弧段。

use std::f64::consts::{PI, TAU};

use dxfsvg_core::geometry::{Point2, Vector2};
use dxfsvg_core::path::{ArcTo, Path, PathSegment};

/// 接近半圆时拆分为两段弧的容差（1°）。
pub const SEMICIRCLE_TOLERANCE: f64 = PI / 180.0;

/// 判定椭圆参数是否覆盖整周（起点 0、终点 2π）的容差。
pub const FULL_TURN_TOLERANCE: f64 = 1e-10;

/// 逐次前推整周的上限，相差更多时先按整周跳过。
const MAX_TURN_STEPS: f64 = 1024.0;

/// 把终止角逐次加 2π，直到 `end >= start`，即始终按角度递增方向遍历。
///
/// 相差超过 1024 周时，`end + 2π` 可能因精度不再变化，逐次相加无法结束，
/// 此时先按整周数跳到起始角附近（大数舍入误差可能需要多跳几次），再逐次补足。
pub fn normalized_end_angle(start_angle: f64, end_angle: f64) -> f64 {
    let mut end = end_angle;
    while start_angle - end > MAX_TURN_STEPS * TAU {
        end += ((start_angle - end) / TAU).floor() * TAU;
    }
    while end < start_angle {
        end += TAU;
    }
    end
}

/// 参数方程求椭圆上的点，主轴旋转不参与计算。
#[inline]
fn ellipse_point(center: Point2, major: f64, minor: f64, angle: f64) -> Point2 {
    Point2::new(
        center.x() + angle.cos() * major,
        center.y() + angle.sin() * minor,
    )
}

/// 主轴旋转角。沿用既有输出：两个参数都取主轴 Y 分量，结果只取决于其符号。
#[inline]
fn axis_rotation(major_axis: Vector2) -> f64 {
    major_axis.y().atan2(major_axis.y())
}

/// 将椭圆弧（圆弧视为 `ratio = 1`）转换为 `MoveTo` 加一到两段 `ArcTo`。
///
/// 包含角与 π 相差不超过 1° 时，在角平分处拆成两段非大弧，避免渲染器在精确半圆处失真。
pub fn ellipse_path(
    center: Point2,
    major_axis: Vector2,
    ratio: f64,
    start_angle: f64,
    end_angle: f64,
) -> Path {
    let end_angle = normalized_end_angle(start_angle, end_angle);
    let major = major_axis.length();
    let minor = major * ratio;
    let rotation = axis_rotation(major_axis);

    let start = ellipse_point(center, major, minor, start_angle);
    let end = ellipse_point(center, major, minor, end_angle);
    let enclosed = end_angle - start_angle;
    let is_counter_clockwise = end_angle > start_angle;

    let arc = |is_large_arc: bool, end: Point2| {
        PathSegment::ArcTo(ArcTo {
            radius_x: major,
            radius_y: minor,
            x_axis_rotation: rotation,
            is_large_arc,
            is_counter_clockwise,
            end,
        })
    };

    if (PI - enclosed).abs() <= SEMICIRCLE_TOLERANCE {
        let mid_angle = (start_angle + end_angle) * 0.5;
        let mid = ellipse_point(center, major, minor, mid_angle);
        Path::from_start(start, [arc(false, mid), arc(false, end)])
    } else {
        Path::from_start(start, [arc(enclosed > PI, end)])
    }
}

/// 整圆/整椭圆：经 π 处分成两段弧并闭合，单段弧首尾重合时不会被绘制。
pub fn full_ellipse_path(center: Point2, major_axis: Vector2, ratio: f64) -> Path {
    let major = major_axis.length();
    let minor = major * ratio;
    let rotation = axis_rotation(major_axis);
    let start = ellipse_point(center, major, minor, 0.0);
    let opposite = ellipse_point(center, major, minor, PI);
    let half = |end: Point2| {
        PathSegment::ArcTo(ArcTo {
            radius_x: major,
            radius_y: minor,
            x_axis_rotation: rotation,
            is_large_arc: false,
            is_counter_clockwise: true,
            end,
        })
    };
    Path::from_start(start, [half(opposite), half(start), PathSegment::ClosePath])
}

/// 椭圆参数是否为 `[0, 2π]` 整周。
#[inline]
pub fn is_full_turn(start_parameter: f64, end_parameter: f64) -> bool {
    start_parameter.abs() <= FULL_TURN_TOLERANCE && (end_parameter - TAU).abs() <= FULL_TURN_TOLERANCE
}

/// 圆弧实体：主轴 `(radius, 0)`，比例 1。
#[inline]
pub fn circular_arc_path(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Path {
    ellipse_path(center, Vector2::new(radius, 0.0), 1.0, start_angle, end_angle)
}

#[inline]
pub fn circle_path(center: Point2, radius: f64) -> Path {
    full_ellipse_path(center, Vector2::new(radius, 0.0), 1.0)
}
