//! 通过 Boehm 节点插入把钳位 B 样条分解为分段贝塞尔曲线。

use dxfsvg_core::geometry::Point2;
use dxfsvg_core::path::{Path, PathSegment};
use tracing::debug;

use crate::errors::ConvertError;

/// 内部节点重数补足到 `order - 1` 之后的样条，每个节点区间对应一段贝塞尔曲线。
#[derive(Debug, Clone)]
pub struct PiecewiseBezier {
    order: usize,
    control_points: Vec<Point2>,
    knots: Vec<f64>,
}

impl PiecewiseBezier {
    /// 校验钳位与节点数量，然后插入节点直到每个内部节点重数为 `degree`。
    ///
    /// 仅支持二次与三次样条，其余阶数返回 [`ConvertError::UnsupportedSplineDegree`]。
    /// 权重被忽略。
    pub fn new(degree: i32, control_points: &[Point2], knots: &[f64]) -> Result<Self, ConvertError> {
        let order = match degree {
            2 | 3 => degree as usize + 1,
            other => return Err(ConvertError::UnsupportedSplineDegree(other)),
        };

        let expected = control_points.len() + order;
        if knots.len() != expected {
            return Err(ConvertError::KnotCountMismatch {
                expected,
                actual: knots.len(),
            });
        }
        check_pinned(order, knots)?;

        let insertions = compute_insertions(order, knots);
        let mut control_points = control_points.to_vec();
        let mut knots = knots.to_vec();
        for knot in &insertions {
            let (points, refined) = insert_knot(order, &control_points, &knots, *knot)?;
            control_points = points;
            knots = refined;
        }
        debug!(
            order,
            insertions = insertions.len(),
            control_points = control_points.len(),
            "样条节点插入完成"
        );

        Ok(Self {
            order,
            control_points,
            knots,
        })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.order - 1
    }

    #[inline]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[inline]
    pub fn control_points(&self) -> &[Point2] {
        &self.control_points
    }

    /// 逐区间输出贝塞尔段。相邻区间首尾相接时不重复 `MoveTo`。
    pub fn to_segments(&self) -> Result<Vec<PathSegment>, ConvertError> {
        let order = self.order;
        let mut segments = Vec::new();
        let mut last: Option<Point2> = None;
        let mut control_index = 0;
        let mut knot_index = order;

        while knot_index + order < self.knots.len() + 1 {
            let multiplicity = multiplicity(&self.knots, knot_index);
            let end = control_index + order;
            let span = self
                .control_points
                .get(control_index..end)
                .ok_or(ConvertError::SpanOutOfRange {
                    knot_index,
                    start: control_index,
                    end,
                    available: self.control_points.len(),
                })?;

            if last != Some(span[0]) {
                segments.push(PathSegment::MoveTo(span[0]));
            }
            let segment = match span {
                [_, control1, control2, end] => PathSegment::CubicCurveTo {
                    control1: *control1,
                    control2: *control2,
                    end: *end,
                },
                [_, control, end] => PathSegment::QuadraticCurveTo {
                    control: *control,
                    end: *end,
                },
                _ => return Err(ConvertError::UnsupportedSplineDegree(self.degree() as i32)),
            };
            last = Some(segment.end_point());
            segments.push(segment);

            control_index += multiplicity;
            knot_index += multiplicity;
        }
        Ok(segments)
    }

    /// 转换为路径；没有任何区间时返回 `None`。
    pub fn to_path(&self) -> Result<Option<Path>, ConvertError> {
        Ok(Path::new(self.to_segments()?))
    }
}

/// 从 `index` 开始连续相等的节点个数。
pub fn multiplicity(knots: &[f64], index: usize) -> usize {
    let Some(value) = knots.get(index) else {
        return 0;
    };
    1 + knots[index + 1..]
        .iter()
        .take_while(|knot| *knot == value)
        .count()
}

/// 前后各 `order` 个节点必须分别相等。
fn check_pinned(order: usize, knots: &[f64]) -> Result<(), ConvertError> {
    let not_pinned = || ConvertError::NotPinned {
        order,
        knots: knots.to_vec(),
    };
    if knots.len() < order {
        return Err(not_pinned());
    }
    let head = &knots[..order];
    let tail = &knots[knots.len() - order..];
    let pinned = head.iter().all(|knot| *knot == head[0])
        && tail.iter().all(|knot| *knot == tail[order - 1]);
    if pinned { Ok(()) } else { Err(not_pinned()) }
}

/// 每个重数 `m < order - 1` 的内部节点需要再插入 `order - m - 1` 次。
fn compute_insertions(order: usize, knots: &[f64]) -> Vec<f64> {
    let mut insertions = Vec::new();
    let mut index = order;
    while index + order < knots.len() {
        let knot = knots[index];
        let m = multiplicity(knots, index);
        for _ in 0..(order - 1).saturating_sub(m) {
            insertions.push(knot);
        }
        index += m;
    }
    insertions
}

/// 单次节点插入（Boehm）：在区间 `(x[i], x[i+1]]` 中插入 `new_knot`，曲线形状不变。
fn insert_knot(
    order: usize,
    control_points: &[Point2],
    knots: &[f64],
    new_knot: f64,
) -> Result<(Vec<Point2>, Vec<f64>), ConvertError> {
    let out_of_range = || ConvertError::KnotOutOfRange { knot: new_knot };
    let span = knots
        .windows(2)
        .position(|pair| new_knot > pair[0] && new_knot <= pair[1])
        .ok_or_else(out_of_range)?;

    let mut refined = Vec::with_capacity(knots.len() + 1);
    refined.extend_from_slice(&knots[..=span]);
    refined.push(new_knot);
    refined.extend_from_slice(&knots[span + 1..]);

    let count = control_points.len();
    let mut points = Vec::with_capacity(count + 1);
    for j in 0..=count {
        // j <= span - order + 1 时 alpha = 1；span - order + 2 <= j <= span 时线性插值；否则为 0
        let alpha = if j + order <= span + 1 {
            1.0
        } else if j <= span {
            let (Some(low), Some(high)) = (knots.get(j), knots.get(j + order - 1)) else {
                return Err(out_of_range());
            };
            let denominator = high - low;
            if denominator == 0.0 {
                0.0
            } else {
                (new_knot - low) / denominator
            }
        } else {
            0.0
        };

        let previous = j.checked_sub(1).and_then(|index| control_points.get(index));
        let current = control_points.get(j);
        let point = if alpha == 0.0 {
            previous.copied()
        } else if alpha == 1.0 {
            current.copied()
        } else {
            previous
                .zip(current)
                .map(|(previous, current)| previous.lerp(*current, alpha))
        };
        points.push(point.ok_or_else(out_of_range)?);
    }
    Ok((points, refined))
}

/// 样条路径；阶数不支持时返回 `Err(UnsupportedSplineDegree)`，由调用方决定是否跳过。
pub fn spline_path(
    degree: i32,
    control_points: &[Point2],
    knots: &[f64],
) -> Result<Option<Path>, ConvertError> {
    PiecewiseBezier::new(degree, control_points, knots)?.to_path()
}
