//! 按实体类型分派到各个转换器，并按图层组织整份文档的转换结果。

use dxfsvg_core::document::{Document, Entity, EntityId, Layer};
use dxfsvg_core::path::{Path, PathSegment};
use tracing::debug;

use crate::arc::{circle_path, circular_arc_path, ellipse_path, full_ellipse_path, is_full_turn};
use crate::associate::{AnnotatedEntity, associate_descriptions};
use crate::bulge::polyline_path;
use crate::errors::ConvertError;
use crate::hatch::hatch_path;
use crate::nurbs::spline_path;
use crate::style::{PathStyle, entity_style};

/// 单个实体的路径。
///
/// 文字等没有转换器的实体返回 `Ok(None)`；不支持的样式/阶数/边界边记录日志后同样返回
/// `Ok(None)`；结构性错误向上传播。
pub fn entity_path(entity: &Entity) -> Result<Option<Path>, ConvertError> {
    let converted = match entity {
        Entity::Line(line) => Ok(Some(Path::from_start(
            line.start,
            [PathSegment::LineTo(line.end)],
        ))),
        Entity::Circle(circle) => Ok(Some(circle_path(circle.center, circle.radius))),
        Entity::Arc(arc) => Ok(Some(circular_arc_path(
            arc.center,
            arc.radius,
            arc.start_angle,
            arc.end_angle,
        ))),
        Entity::Ellipse(ellipse) => {
            if is_full_turn(ellipse.start_parameter, ellipse.end_parameter) {
                Ok(Some(full_ellipse_path(
                    ellipse.center,
                    ellipse.major_axis,
                    ellipse.ratio,
                )))
            } else {
                Ok(Some(ellipse_path(
                    ellipse.center,
                    ellipse.major_axis,
                    ellipse.ratio,
                    ellipse.start_parameter,
                    ellipse.end_parameter,
                )))
            }
        }
        Entity::LwPolyline(polyline) | Entity::Polyline(polyline) => {
            Ok(polyline_path(&polyline.vertices, polyline.is_closed))
        }
        Entity::Spline(spline) => {
            spline_path(spline.degree, &spline.control_points, &spline.knot_values)
        }
        Entity::Hatch(hatch) => hatch_path(hatch),
        Entity::Text(_) | Entity::MText(_) | Entity::Other(_) => Ok(None),
    };

    match converted {
        Err(err) if !err.is_fatal() => {
            debug!(
                kind = entity.kind_name(),
                layer = entity.layer_name(),
                reason = %err,
                "实体不受支持，已跳过"
            );
            Ok(None)
        }
        other => other,
    }
}

/// 文档级转换选项。
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 仅转换这些图层；为空表示全部。
    pub layers: Vec<String>,
    /// 是否把说明文字与图形实体配对。
    pub associate_descriptions: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            associate_descriptions: true,
        }
    }
}

impl ConvertOptions {
    #[inline]
    fn includes_layer(&self, name: &str) -> bool {
        self.layers.is_empty() || self.layers.iter().any(|layer| layer == name)
    }
}

#[derive(Debug, Clone)]
pub struct ConvertedEntity<'a> {
    pub id: EntityId,
    pub description: Option<&'a str>,
    pub entity: &'a Entity,
    pub path: Path,
    pub style: PathStyle,
}

#[derive(Debug, Clone)]
pub struct ConvertedLayer<'a> {
    pub layer: &'a Layer,
    pub entities: Vec<ConvertedEntity<'a>>,
}

/// 转换整份文档：逐图层配对说明文字并生成路径。
///
/// 任一结构性错误都会终止转换，不返回部分结果。
pub fn convert_document<'a>(
    document: &'a Document,
    options: &ConvertOptions,
) -> Result<Vec<ConvertedLayer<'a>>, ConvertError> {
    let mut layers = Vec::new();
    for layer in document.layers() {
        if !options.includes_layer(&layer.name) {
            debug!(layer = %layer.name, "图层未在转换范围内");
            continue;
        }

        let members = document
            .entities()
            .filter(|(_, entity)| entity.layer_name() == layer.name);
        let annotated = if options.associate_descriptions {
            associate_descriptions(members)?
        } else {
            members
                .map(|(id, entity)| AnnotatedEntity {
                    description: None,
                    id: *id,
                    entity,
                })
                .collect()
        };

        let mut entities = Vec::with_capacity(annotated.len());
        for item in annotated {
            let Some(path) = entity_path(item.entity)? else {
                continue;
            };
            let Some(style) = entity_style(item.entity) else {
                continue;
            };
            entities.push(ConvertedEntity {
                id: item.id,
                description: item.description,
                entity: item.entity,
                path,
                style,
            });
        }

        debug!(
            layer = %layer.name,
            entities = entities.len(),
            "图层转换完成"
        );
        layers.push(ConvertedLayer { layer, entities });
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use dxfsvg_core::document::{Color, Spline, Text};
    use dxfsvg_core::geometry::Point2;

    use super::*;

    #[test]
    fn text_and_other_kinds_have_no_path() {
        let text = Entity::Text(Text {
            insert: Point2::new(1.0, 1.0),
            content: "label".to_string(),
            height: 1.0,
            rotation: 0.0,
            color: Color::ByLayer,
            layer: "0".to_string(),
        });
        assert!(entity_path(&text).expect("no error").is_none());
    }

    #[test]
    fn unsupported_spline_degree_is_skipped() {
        let spline = Entity::Spline(Spline {
            degree: 5,
            is_rational: false,
            control_points: Vec::new(),
            weights: Vec::new(),
            knot_values: Vec::new(),
            color: Color::ByLayer,
            layer: "0".to_string(),
        });
        assert!(entity_path(&spline).expect("skipped, not failed").is_none());
    }

    #[test]
    fn unpinned_spline_aborts_conversion() {
        let mut document = Document::new();
        document.add_entity(Entity::Spline(Spline {
            degree: 2,
            is_rational: false,
            control_points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 0.0),
            ],
            weights: Vec::new(),
            knot_values: vec![0.0, 0.5, 0.5, 0.5, 1.0, 1.0],
            color: Color::ByLayer,
            layer: "0".to_string(),
        }));
        let err = convert_document(&document, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::NotPinned { .. }));
    }

    #[test]
    fn layer_filter_limits_output() {
        let mut document = Document::new();
        document.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "KEEP");
        document.add_line(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0), "DROP");

        let options = ConvertOptions {
            layers: vec!["KEEP".to_string()],
            associate_descriptions: true,
        };
        let layers = convert_document(&document, &options).expect("converted");
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].layer.name, "KEEP");
        assert_eq!(layers[0].entities.len(), 1);
        assert_eq!(layers[0].entities[0].path.to_string(), "M 0.0 0.0 L 1.0 0.0");
    }
}
