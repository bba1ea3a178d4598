//! 将游离的说明文字与最近的图形实体配对。

use dxfsvg_core::document::{Entity, EntityId};
use dxfsvg_core::geometry::Point2;
use tracing::debug;

use crate::errors::ConvertError;

/// 配对结果：说明文字（可能没有）与其描述的图形实体。
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedEntity<'a> {
    pub description: Option<&'a str>,
    pub id: EntityId,
    pub entity: &'a Entity,
}

struct Located<'a, T> {
    anchor: Point2,
    value: T,
    id: EntityId,
    entity: &'a Entity,
}

/// 贪心最近邻配对。
///
/// 文字实体（锚点不在原点）作为说明，其余可求锚点的实体作为图形。没有说明时按输入顺序
/// 原样输出所有图形实体；否则两者数量必须相等，按说明的输入顺序各自认领最近且尚未被认领的
/// 图形实体。距离相同时取扫描中先出现者。
pub fn associate_descriptions<'a, I>(entities: I) -> Result<Vec<AnnotatedEntity<'a>>, ConvertError>
where
    I: IntoIterator<Item = &'a (EntityId, Entity)>,
{
    let mut graphical: Vec<Located<'a, ()>> = Vec::new();
    let mut descriptions: Vec<Located<'a, &'a str>> = Vec::new();

    for (id, entity) in entities {
        let Some(anchor) = entity.anchor() else {
            debug!(entity = id.get(), kind = entity.kind_name(), "实体无法确定锚点，跳过配对");
            continue;
        };
        match entity.description() {
            None => graphical.push(Located {
                anchor,
                value: (),
                id: *id,
                entity,
            }),
            Some(text) if anchor != Point2::ORIGIN => descriptions.push(Located {
                anchor,
                value: text,
                id: *id,
                entity,
            }),
            Some(_) => {}
        }
    }

    if descriptions.is_empty() {
        return Ok(graphical
            .into_iter()
            .map(|located| AnnotatedEntity {
                description: None,
                id: located.id,
                entity: located.entity,
            })
            .collect());
    }

    if descriptions.len() != graphical.len() {
        return Err(ConvertError::DescriptionCountMismatch {
            descriptions: descriptions.len(),
            entities: graphical.len(),
        });
    }

    let mut claimed = vec![false; graphical.len()];
    let mut result = Vec::with_capacity(descriptions.len());
    for description in &descriptions {
        let mut closest: Option<(usize, f64)> = None;
        for (index, candidate) in graphical.iter().enumerate() {
            if claimed[index] {
                continue;
            }
            let distance = candidate.anchor.distance_to(description.anchor);
            if distance < closest.map_or(f64::MAX, |(_, best)| best) {
                closest = Some((index, distance));
            }
        }
        if let Some((index, distance)) = closest {
            claimed[index] = true;
            let target = &graphical[index];
            debug!(
                description = description.id.get(),
                entity = target.id.get(),
                distance,
                "说明文字已配对"
            );
            result.push(AnnotatedEntity {
                description: Some(description.value),
                id: target.id,
                entity: target.entity,
            });
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use dxfsvg_core::document::{Color, Document, Other};

    use super::*;

    fn entries(doc: &Document) -> Vec<&(EntityId, Entity)> {
        doc.entities().collect()
    }

    #[test]
    fn without_descriptions_every_entity_is_unpaired_in_order() {
        let mut doc = Document::new();
        let a = doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
        let b = doc.add_circle(Point2::new(5.0, 5.0), 1.0, "0");
        let c = doc.add_arc(Point2::new(9.0, 9.0), 1.0, 0.0, 1.0, "0");
        // 位于原点的文字不计为说明
        doc.add_text(Point2::ORIGIN, "placeholder", 1.0, "0");

        let result = associate_descriptions(entries(&doc)).expect("no descriptions");
        let ids: Vec<_> = result.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert!(result.iter().all(|item| item.description.is_none()));
    }

    #[test]
    fn entities_without_anchor_are_left_out() {
        let mut doc = Document::new();
        let line = doc.add_line(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), "0");
        doc.add_lw_polyline(Vec::new(), false, "0");
        doc.add_entity(Entity::Other(Other {
            kind: "INSERT".to_string(),
            extents: None,
            color: Color::ByLayer,
            layer: "0".to_string(),
        }));

        let unpaired = associate_descriptions(entries(&doc)).expect("no descriptions");
        let ids: Vec<_> = unpaired.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![line]);

        // 无锚点的实体不参与计数，一条说明对应一条直线
        doc.add_text(Point2::new(1.0, 1.0), "pipe", 1.0, "0");
        let paired = associate_descriptions(entries(&doc)).expect("counts match");
        assert_eq!(paired.len(), 1);
        assert_eq!(paired[0].id, line);
        assert_eq!(paired[0].description, Some("pipe"));
    }

    #[test]
    fn each_description_claims_nearest_unclaimed_entity() {
        let mut doc = Document::new();
        let left = doc.add_circle(Point2::new(0.0, 0.0), 1.0, "0");
        let right = doc.add_circle(Point2::new(10.0, 0.0), 1.0, "0");
        let top = doc.add_circle(Point2::new(5.0, 10.0), 1.0, "0");
        doc.add_text(Point2::new(9.0, 1.0), "right", 1.0, "0");
        doc.add_text(Point2::new(6.0, 9.0), "top", 1.0, "0");
        // 离 right 更近，但 right 已被认领
        doc.add_text(Point2::new(8.0, 0.0), "left", 1.0, "0");

        let result = associate_descriptions(entries(&doc)).expect("paired");
        assert_eq!(result.len(), 3);
        let pairs: Vec<_> = result
            .iter()
            .map(|item| (item.description, item.id))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Some("right"), right),
                (Some("top"), top),
                (Some("left"), left),
            ]
        );
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let mut doc = Document::new();
        let first = doc.add_circle(Point2::new(-1.0, 0.0), 0.5, "0");
        let second = doc.add_circle(Point2::new(1.0, 0.0), 0.5, "0");
        doc.add_text(Point2::new(0.0, 1.0), "a", 1.0, "0");
        doc.add_text(Point2::new(0.0, 2.0), "b", 1.0, "0");

        let result = associate_descriptions(entries(&doc)).expect("paired");
        assert_eq!(result[0].id, first);
        assert_eq!(result[1].id, second);
    }

    #[test]
    fn mismatched_counts_are_fatal() {
        let mut doc = Document::new();
        doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
        doc.add_line(Point2::new(0.0, 2.0), Point2::new(1.0, 2.0), "0");
        doc.add_line(Point2::new(0.0, 4.0), Point2::new(1.0, 4.0), "0");
        doc.add_text(Point2::new(0.5, 0.5), "one", 1.0, "0");
        doc.add_text(Point2::new(0.5, 2.5), "two", 1.0, "0");

        let err = associate_descriptions(entries(&doc)).unwrap_err();
        assert_eq!(
            err,
            ConvertError::DescriptionCountMismatch {
                descriptions: 2,
                entities: 3
            }
        );
        assert!(err.is_fatal());
    }
}
