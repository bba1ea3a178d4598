//! 填充边界展开与填充样式策略。

use dxfsvg_core::document::{Hatch, HatchEdge, HatchLoop, HatchStyle};
use dxfsvg_core::path::{Path, PathSegment};
use tracing::debug;

use crate::bulge::polyline_segments;
use crate::errors::ConvertError;
use crate::nurbs::PiecewiseBezier;

/// 按孤岛检测方式与透明度决定填充输出方式。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillPolicy {
    /// 需要镂空内部孤岛的样式无法用单一路径正确表达，整个填充跳过。
    Unsupported,
    FullOpacity,
    /// 由透明度百分比换算的不透明度，取值 `[0, 1]`。
    TransparencyDerived(f64),
}

impl FillPolicy {
    #[inline]
    pub fn opacity(self) -> Option<f64> {
        match self {
            FillPolicy::Unsupported => None,
            FillPolicy::FullOpacity => Some(1.0),
            FillPolicy::TransparencyDerived(opacity) => Some(opacity),
        }
    }
}

/// | 样式 | 透明度 | 策略 |
/// |---|---|---|
/// | OddParity / Outermost | 任意 | 不支持 |
/// | Ignore | 无 | 完全不透明 |
/// | Ignore | `t` | `(100 - min(t, 100)) / 100` |
pub fn fill_policy(hatch: &Hatch) -> FillPolicy {
    match (hatch.style, hatch.transparency) {
        (HatchStyle::OddParity | HatchStyle::Outermost, _) => FillPolicy::Unsupported,
        (HatchStyle::Ignore, None) => FillPolicy::FullOpacity,
        (HatchStyle::Ignore, Some(transparency)) => {
            let transparency = f64::from(transparency.min(100));
            FillPolicy::TransparencyDerived((100.0 - transparency) / 100.0)
        }
    }
}

/// 单条边的路径段。直线边自带 `MoveTo`，相接处的重复终点由 [`optimize_segments`] 去掉。
fn edge_segments(edge: &HatchEdge) -> Result<Vec<PathSegment>, ConvertError> {
    match edge {
        HatchEdge::Line { start, end } => {
            Ok(vec![PathSegment::MoveTo(*start), PathSegment::LineTo(*end)])
        }
        HatchEdge::Spline {
            degree,
            control_points,
            knot_values,
        } => PiecewiseBezier::new(*degree, control_points, knot_values)?.to_segments(),
        HatchEdge::Arc { .. } | HatchEdge::Ellipse { .. } => {
            Err(ConvertError::UnsupportedBoundaryEdge(edge.kind_name()))
        }
    }
}

/// 展开单条边界。多段线边界沿用凸度规则；边列表边界假定首尾相接且隐式闭合，
/// 拼接后做一次去重。
pub fn boundary_segments(boundary: &HatchLoop) -> Result<Vec<PathSegment>, ConvertError> {
    match boundary {
        HatchLoop::Polyline {
            vertices,
            is_closed,
        } => Ok(polyline_segments(vertices, *is_closed)),
        HatchLoop::Edges { edges } => {
            let mut segments = Vec::new();
            for edge in edges {
                segments.extend(edge_segments(edge)?);
            }
            Ok(optimize_segments(segments))
        }
    }
}

/// 保留首个 `MoveTo`，丢弃终点与前一段终点相同的段。
///
/// 比较对象始终是输入序列中的前一段，被丢弃的段同样会更新比较基准。
pub fn optimize_segments(segments: Vec<PathSegment>) -> Vec<PathSegment> {
    let mut iter = segments.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut current = first.end_point();
    let mut optimized = vec![first];
    for segment in iter {
        let end = segment.end_point();
        if end != current {
            optimized.push(segment);
        }
        current = end;
    }
    optimized
}

/// 填充区域路径：全部边界依次拼接，每条边界各自以 `MoveTo` 开始。
///
/// 样式不受支持或包含圆弧/椭圆弧边时返回不支持错误；没有任何边界段时返回 `None`。
pub fn hatch_path(hatch: &Hatch) -> Result<Option<Path>, ConvertError> {
    if fill_policy(hatch) == FillPolicy::Unsupported {
        return Err(ConvertError::UnsupportedHatchStyle(hatch.style));
    }

    let mut segments = Vec::new();
    for boundary in &hatch.loops {
        segments.extend(boundary_segments(boundary)?);
    }
    debug!(
        pattern = %hatch.pattern_name,
        loops = hatch.loops.len(),
        segments = segments.len(),
        "填充边界已展开"
    );
    Ok(Path::new(segments))
}
