//! SVG 路径段模型与数值格式化。

use std::fmt;

use crate::geometry::Point2;

/// 路径数值允许的最大小数位数。
const MAX_FRACTION_DIGITS: usize = 15;

/// 椭圆弧段参数，对应 SVG `A` 指令。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTo {
    pub radius_x: f64,
    pub radius_y: f64,
    /// 椭圆 X 轴旋转角，按弧度原样输出。
    pub x_axis_rotation: f64,
    pub is_large_arc: bool,
    pub is_counter_clockwise: bool,
    pub end: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point2),
    LineTo(Point2),
    CubicCurveTo {
        control1: Point2,
        control2: Point2,
        end: Point2,
    },
    QuadraticCurveTo {
        control: Point2,
        end: Point2,
    },
    ArcTo(ArcTo),
    ClosePath,
}

impl PathSegment {
    /// 段的终点。`ClosePath` 没有独立终点，按原点处理，去重时据此比较。
    pub fn end_point(&self) -> Point2 {
        match self {
            PathSegment::MoveTo(point) | PathSegment::LineTo(point) => *point,
            PathSegment::CubicCurveTo { end, .. } | PathSegment::QuadraticCurveTo { end, .. } => {
                *end
            }
            PathSegment::ArcTo(arc) => arc.end,
            PathSegment::ClosePath => Point2::ORIGIN,
        }
    }

    #[inline]
    pub fn is_move_to(&self) -> bool {
        matches!(self, PathSegment::MoveTo(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::MoveTo(point) => write!(f, "M {}", Coord(*point)),
            PathSegment::LineTo(point) => write!(f, "L {}", Coord(*point)),
            PathSegment::CubicCurveTo {
                control1,
                control2,
                end,
            } => write!(
                f,
                "C {} {} {}",
                Coord(*control1),
                Coord(*control2),
                Coord(*end)
            ),
            PathSegment::QuadraticCurveTo { control, end } => {
                write!(f, "Q {} {}", Coord(*control), Coord(*end))
            }
            PathSegment::ArcTo(arc) => write!(
                f,
                "A {} {} {} {} {} {}",
                format_number(arc.radius_x),
                format_number(arc.radius_y),
                format_number(arc.x_axis_rotation),
                u8::from(arc.is_large_arc),
                u8::from(arc.is_counter_clockwise),
                Coord(arc.end)
            ),
            PathSegment::ClosePath => f.write_str("Z"),
        }
    }
}

struct Coord(Point2);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_number(self.0.x()), format_number(self.0.y()))
    }
}

/// 以 `MoveTo` 开头的非空有序路径段序列，构建后不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// 首段不是 `MoveTo`（或序列为空）时返回 `None`。
    pub fn new(segments: Vec<PathSegment>) -> Option<Self> {
        match segments.first() {
            Some(PathSegment::MoveTo(_)) => Some(Self { segments }),
            _ => None,
        }
    }

    /// 以 `MoveTo(start)` 开头并追加其余段，总能得到合法路径。
    pub fn from_start(start: Point2, rest: impl IntoIterator<Item = PathSegment>) -> Self {
        let mut segments = vec![PathSegment::MoveTo(start)];
        segments.extend(rest);
        Self { segments }
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// 恒为 `false`，路径至少包含一个 `MoveTo`。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 整条路径的终点，即最后一段的终点。
    pub fn end_point(&self) -> Point2 {
        self.segments
            .last()
            .map(PathSegment::end_point)
            .unwrap_or(Point2::ORIGIN)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// 与区域设置无关的十进制格式：至少一位、至多 15 位小数，去掉末尾多余的零。
///
/// `-0` 输出为 `0.0`；非有限值在标记中没有意义，同样输出 `0.0`。
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    let mut text = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed_len = text.trim_end_matches('0').len();
    text.truncate(trimmed_len);
    if text.ends_with('.') {
        text.push('0');
    }
    if text == "-0.0" {
        text.remove(0);
    }
    text
}
