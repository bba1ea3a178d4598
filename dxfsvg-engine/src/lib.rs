pub mod arc;
pub mod associate;
pub mod bulge;
pub mod convert;
pub mod hatch;
pub mod nurbs;
pub mod style;

pub mod errors {
    use dxfsvg_core::document::HatchStyle;
    use thiserror::Error;

    /// 转换错误。结构性错误终止整个文档，不支持的特性只跳过当前实体。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum ConvertError {
        #[error("knot vector is not pinned for order {order}: {knots:?}")]
        NotPinned { order: usize, knots: Vec<f64> },
        #[error("spline has {actual} knots, expected {expected} (control points + order)")]
        KnotCountMismatch { expected: usize, actual: usize },
        #[error("knot {knot} does not fall inside any knot span")]
        KnotOutOfRange { knot: f64 },
        #[error("bezier span at knot {knot_index} needs control points {start}..{end}, only {available} available")]
        SpanOutOfRange {
            knot_index: usize,
            start: usize,
            end: usize,
            available: usize,
        },
        #[error("{descriptions} descriptions cannot be paired with {entities} graphical entities")]
        DescriptionCountMismatch { descriptions: usize, entities: usize },
        #[error("spline degree {0} is not supported")]
        UnsupportedSplineDegree(i32),
        #[error("hatch style {0:?} is not supported")]
        UnsupportedHatchStyle(HatchStyle),
        #[error("hatch boundary edge `{0}` is not supported")]
        UnsupportedBoundaryEdge(&'static str),
    }

    impl ConvertError {
        /// 结构性输入错误：输入违反格式约定，整个文档无法转换。
        pub fn is_fatal(&self) -> bool {
            !matches!(
                self,
                ConvertError::UnsupportedSplineDegree(_)
                    | ConvertError::UnsupportedHatchStyle(_)
                    | ConvertError::UnsupportedBoundaryEdge(_)
            )
        }
    }
}

pub use convert::{ConvertOptions, ConvertedEntity, ConvertedLayer, convert_document, entity_path};
pub use errors::ConvertError;
