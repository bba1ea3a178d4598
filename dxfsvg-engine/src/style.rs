//! 路径的描边/填充样式。

use dxfsvg_core::document::{Entity, Hatch};
use dxfsvg_core::path::format_number;

use crate::hatch::{FillPolicy, fill_policy};

/// 最小描边宽度（像素）。
pub const MIN_STROKE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PathStyle {
    /// 线框实体：不填充，描边宽度不随缩放变化。
    Stroke { color: String, width: f64 },
    /// 填充实体：不描边。
    Fill { color: String, opacity: f64 },
}

impl PathStyle {
    /// 按输出顺序排列的 SVG 属性。
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            PathStyle::Stroke { color, width } => vec![
                ("fill-opacity", "0".to_string()),
                ("stroke", color.clone()),
                ("stroke-width", format!("{}px", format_number(*width))),
                ("vector-effect", "non-scaling-stroke".to_string()),
            ],
            PathStyle::Fill { color, opacity } => vec![
                ("fill", color.clone()),
                ("fill-opacity", format_number(*opacity)),
                ("stroke", "none".to_string()),
            ],
        }
    }
}

/// 带厚度的实体取 `max(厚度, 1)`，其余固定为 1。
#[inline]
fn stroke_width(entity: &Entity) -> f64 {
    entity
        .thickness()
        .map_or(MIN_STROKE_WIDTH, |thickness| thickness.max(MIN_STROKE_WIDTH))
}

fn hatch_style(hatch: &Hatch) -> Option<PathStyle> {
    match fill_policy(hatch) {
        FillPolicy::Unsupported => None,
        policy => Some(PathStyle::Fill {
            color: hatch.color.to_rgb_string(),
            opacity: policy.opacity().unwrap_or(1.0),
        }),
    }
}

/// 实体样式；文字与未支持的实体没有路径，也就没有样式。
pub fn entity_style(entity: &Entity) -> Option<PathStyle> {
    match entity {
        Entity::Line(_)
        | Entity::Circle(_)
        | Entity::Arc(_)
        | Entity::Ellipse(_)
        | Entity::LwPolyline(_)
        | Entity::Polyline(_)
        | Entity::Spline(_) => Some(PathStyle::Stroke {
            color: entity.color().to_rgb_string(),
            width: stroke_width(entity),
        }),
        Entity::Hatch(hatch) => hatch_style(hatch),
        Entity::Text(_) | Entity::MText(_) | Entity::Other(_) => None,
    }
}
