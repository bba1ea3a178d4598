pub mod path;

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，保持双精度。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        pub const ORIGIN: Point2 = Point2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn distance_to(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        /// 沿参数 `t` 在两点之间做线性插值（`t = 0` 返回自身）。
        #[inline]
        pub fn lerp(self, other: Point2, t: f64) -> Self {
            Self(self.0 * (1.0 - t) + other.0 * t)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    /// 二维向量，主要用于椭圆主轴与位移。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于估算实体范围与锚点。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let min_vec = self.min.as_vec2();
            let max_vec = self.max.as_vec2();
            let center = (min_vec + max_vec) * 0.5;
            Point2::from_vec(center)
        }
    }
}

pub mod document {
    use std::collections::BTreeMap;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds2D, Point2, Vector2};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于输出 class 属性或日志。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 实体颜色。索引色遵循 AutoCAD ACI 调色板。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Color {
        #[default]
        ByLayer,
        ByBlock,
        Index(u8),
        TrueColor(u32),
    }

    impl Color {
        /// 解析为 24 位 RGB；随层/随块无法在实体层面确定，返回 `None`。
        pub fn to_rgb(self) -> Option<u32> {
            match self {
                Color::Index(index) => Some(aci_to_rgb(index)),
                Color::TrueColor(rgb) => Some(rgb & 0x00FF_FFFF),
                Color::ByLayer | Color::ByBlock => None,
            }
        }

        /// `#RRGGBB` 形式，无法解析时退化为黑色。
        pub fn to_rgb_string(self) -> String {
            let rgb = self.to_rgb().unwrap_or(0);
            format!(
                "#{:02X}{:02X}{:02X}",
                (rgb >> 16) & 0xFF,
                (rgb >> 8) & 0xFF,
                rgb & 0xFF
            )
        }
    }

    /// ACI 索引色。1–9 为标准色，10–249 按 15° 色相分组（偶数满饱和、奇数半饱和），
    /// 250–255 为灰阶。
    fn aci_to_rgb(index: u8) -> u32 {
        match index {
            0 => 0x000000,
            1 => 0xFF0000,
            2 => 0xFFFF00,
            3 => 0x00FF00,
            4 => 0x00FFFF,
            5 => 0x0000FF,
            6 => 0xFF00FF,
            7 => 0xFFFFFF,
            8 => 0x808080,
            9 => 0xC0C0C0,
            10..=249 => {
                const VALUES: [f64; 5] = [1.0, 0.8, 0.6, 0.5, 0.3];
                let hue = f64::from(index / 10 - 1) * 15.0;
                let shade = index % 10;
                let value = VALUES[usize::from(shade / 2)];
                let saturation = if shade % 2 == 0 { 1.0 } else { 0.5 };
                hsv_to_rgb(hue, saturation, value)
            }
            250 => 0x333333,
            251 => 0x505050,
            252 => 0x696969,
            253 => 0x828282,
            254 => 0xBEBEBE,
            255 => 0xFFFFFF,
        }
    }

    fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> u32 {
        let chroma = value * saturation;
        let sector = hue / 60.0;
        let secondary = chroma * (1.0 - ((sector % 2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };
        let base = value - chroma;
        let channel = |c: f64| ((c + base) * 255.0 + 1e-9).floor().clamp(0.0, 255.0) as u32;
        (channel(r) << 16) | (channel(g) << 8) | channel(b)
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<Color>,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                color: None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum Entity {
        Line(Line),
        Circle(Circle),
        Arc(Arc),
        Ellipse(Ellipse),
        LwPolyline(Polyline),
        Polyline(Polyline),
        Spline(Spline),
        Hatch(Hatch),
        Text(Text),
        MText(MText),
        Other(Other),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::Circle(circle) => &circle.layer,
                Entity::Arc(arc) => &arc.layer,
                Entity::Ellipse(ellipse) => &ellipse.layer,
                Entity::LwPolyline(polyline) | Entity::Polyline(polyline) => &polyline.layer,
                Entity::Spline(spline) => &spline.layer,
                Entity::Hatch(hatch) => &hatch.layer,
                Entity::Text(text) => &text.layer,
                Entity::MText(mtext) => &mtext.layer,
                Entity::Other(other) => &other.layer,
            }
        }

        #[inline]
        pub fn color(&self) -> Color {
            match self {
                Entity::Line(line) => line.color,
                Entity::Circle(circle) => circle.color,
                Entity::Arc(arc) => arc.color,
                Entity::Ellipse(ellipse) => ellipse.color,
                Entity::LwPolyline(polyline) | Entity::Polyline(polyline) => polyline.color,
                Entity::Spline(spline) => spline.color,
                Entity::Hatch(hatch) => hatch.color,
                Entity::Text(text) => text.color,
                Entity::MText(mtext) => mtext.color,
                Entity::Other(other) => other.color,
            }
        }

        /// 线宽（厚度），仅直线、圆、圆弧携带该属性。
        #[inline]
        pub fn thickness(&self) -> Option<f64> {
            match self {
                Entity::Line(line) => Some(line.thickness),
                Entity::Circle(circle) => Some(circle.thickness),
                Entity::Arc(arc) => Some(arc.thickness),
                _ => None,
            }
        }

        /// DXF 实体类型名，用于 class 属性与日志。
        pub fn kind_name(&self) -> &str {
            match self {
                Entity::Line(_) => "LINE",
                Entity::Circle(_) => "CIRCLE",
                Entity::Arc(_) => "ARC",
                Entity::Ellipse(_) => "ELLIPSE",
                Entity::LwPolyline(_) => "LWPOLYLINE",
                Entity::Polyline(_) => "POLYLINE",
                Entity::Spline(_) => "SPLINE",
                Entity::Hatch(_) => "HATCH",
                Entity::Text(_) => "TEXT",
                Entity::MText(_) => "MTEXT",
                Entity::Other(other) => &other.kind,
            }
        }

        /// 文字类实体的内容；图形实体返回 `None`。
        #[inline]
        pub fn description(&self) -> Option<&str> {
            match self {
                Entity::Text(text) => Some(&text.content),
                Entity::MText(mtext) => Some(&mtext.content),
                _ => None,
            }
        }

        /// 关联文字时使用的锚点：文字取插入点，其余取包围盒中心。
        pub fn anchor(&self) -> Option<Point2> {
            match self {
                Entity::Text(text) => Some(text.insert),
                Entity::MText(mtext) => Some(mtext.insert),
                other => other.bounds().map(|bounds| bounds.center()),
            }
        }

        /// 计算实体的 2D 轴对齐范围，文本退化为插入点。
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            match self {
                Entity::Line(line) => {
                    bounds.include_point(line.start);
                    bounds.include_point(line.end);
                }
                Entity::Circle(circle) => {
                    let radius = circle.radius.abs();
                    let center = circle.center;
                    bounds.include_point(Point2::new(center.x() - radius, center.y() - radius));
                    bounds.include_point(Point2::new(center.x() + radius, center.y() + radius));
                }
                Entity::Arc(arc) => {
                    arc_bounds(arc.center, arc.radius, arc.start_angle, arc.end_angle, &mut bounds);
                }
                Entity::Ellipse(ellipse) => {
                    ellipse_bounds(
                        ellipse.center,
                        ellipse.major_axis,
                        ellipse.ratio,
                        ellipse.start_parameter,
                        ellipse.end_parameter,
                        &mut bounds,
                    );
                }
                Entity::LwPolyline(polyline) | Entity::Polyline(polyline) => {
                    polyline_bounds(&polyline.vertices, polyline.is_closed, &mut bounds);
                }
                Entity::Spline(spline) => {
                    for point in &spline.control_points {
                        bounds.include_point(*point);
                    }
                }
                Entity::Hatch(hatch) => {
                    for hatch_loop in &hatch.loops {
                        match hatch_loop {
                            HatchLoop::Polyline {
                                vertices,
                                is_closed,
                            } => polyline_bounds(vertices, *is_closed, &mut bounds),
                            HatchLoop::Edges { edges } => {
                                for edge in edges {
                                    include_hatch_edge_bounds(edge, &mut bounds);
                                }
                            }
                        }
                    }
                }
                Entity::Text(text) => {
                    bounds.include_point(text.insert);
                }
                Entity::MText(mtext) => {
                    bounds.include_point(mtext.insert);
                }
                Entity::Other(other) => {
                    if let Some(extents) = &other.extents {
                        bounds.include_bounds(extents);
                    }
                }
            }
            if bounds.is_empty() {
                None
            } else {
                Some(bounds)
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
        #[serde(default)]
        pub thickness: f64,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f64,
        #[serde(default)]
        pub thickness: f64,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 圆弧实体，角度以弧度形式储存，遵循数学正方向。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
        #[serde(default)]
        pub thickness: f64,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 椭圆实体，记录主轴向量与参数范围（单位为弧度）。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Ellipse {
        pub center: Point2,
        pub major_axis: Vector2,
        pub ratio: f64,
        pub start_parameter: f64,
        pub end_parameter: f64,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 轻量多段线（LWPOLYLINE）与重量多段线（POLYLINE）共用的结构。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<PolylineVertex>,
        pub is_closed: bool,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct PolylineVertex {
        pub position: Point2,
        /// 到下一顶点的凸度，`tan(包含角 / 4)`，正值为逆时针。
        #[serde(default)]
        pub bulge: f64,
    }

    impl PolylineVertex {
        #[inline]
        pub fn new(position: Point2) -> Self {
            Self {
                position,
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(position: Point2, bulge: f64) -> Self {
            Self { position, bulge }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Spline {
        pub degree: i32,
        #[serde(default)]
        pub is_rational: bool,
        pub control_points: Vec<Point2>,
        /// 有理样条的权重，转换时忽略。
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub weights: Vec<f64>,
        pub knot_values: Vec<f64>,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Text {
        pub insert: Point2,
        pub content: String,
        pub height: f64,
        #[serde(default)]
        pub rotation: f64,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MText {
        pub insert: Point2,
        pub content: String,
        pub height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub reference_width: Option<f64>,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 填充孤岛检测方式（DXF 组码 75）。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum HatchStyle {
        /// 奇偶规则，内部孤岛交替镂空（DXF 默认）。
        #[default]
        OddParity,
        /// 仅填充最外层区域。
        Outermost,
        /// 忽略内部结构，整个区域填充。
        Ignore,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum HatchLoop {
        Polyline {
            vertices: Vec<PolylineVertex>,
            is_closed: bool,
        },
        Edges {
            edges: Vec<HatchEdge>,
        },
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum HatchEdge {
        Line {
            start: Point2,
            end: Point2,
        },
        Arc {
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            is_counter_clockwise: bool,
        },
        Ellipse {
            center: Point2,
            major_axis: Vector2,
            minor_ratio: f64,
            start_angle: f64,
            end_angle: f64,
            is_counter_clockwise: bool,
        },
        Spline {
            degree: i32,
            control_points: Vec<Point2>,
            knot_values: Vec<f64>,
        },
    }

    impl HatchEdge {
        /// 边界边的 DXF 类型名，用于日志与错误信息。
        pub fn kind_name(&self) -> &'static str {
            match self {
                HatchEdge::Line { .. } => "line",
                HatchEdge::Arc { .. } => "circular arc",
                HatchEdge::Ellipse { .. } => "elliptic arc",
                HatchEdge::Spline { .. } => "spline",
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Hatch {
        pub pattern_name: String,
        pub is_solid: bool,
        #[serde(default)]
        pub style: HatchStyle,
        /// 透明度百分比（0 表示不透明），随层时为 `None`。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub transparency: Option<u8>,
        pub loops: Vec<HatchLoop>,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 暂不转换的实体（INSERT、DIMENSION 等），仅保留类型名与范围供关联使用。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Other {
        pub kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub extents: Option<Bounds2D>,
        #[serde(default)]
        pub color: Color,
        pub layer: String,
    }

    /// 已解析的图纸：图层表与按绘制顺序排列的实体。
    ///
    /// 反序列化时补齐实体引用但未声明的图层，并由已有实体编号推算下一个编号。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    #[serde(from = "DocumentRecord")]
    pub struct Document {
        layers: BTreeMap<String, Layer>,
        entities: Vec<(EntityId, Entity)>,
        #[serde(skip_serializing)]
        next_entity_id: u64,
    }

    /// 图纸的外部表示，只包含图层表与实体列表。
    #[derive(Deserialize)]
    struct DocumentRecord {
        #[serde(default)]
        layers: BTreeMap<String, Layer>,
        #[serde(default)]
        entities: Vec<(EntityId, Entity)>,
    }

    impl From<DocumentRecord> for Document {
        fn from(record: DocumentRecord) -> Self {
            let next_entity_id = record
                .entities
                .iter()
                .map(|(id, _)| id.get() + 1)
                .max()
                .unwrap_or(0);
            let mut doc = Self {
                layers: record.layers,
                entities: record.entities,
                next_entity_id,
            };
            let referenced: Vec<String> = doc
                .entities
                .iter()
                .map(|(_, entity)| entity.layer_name().to_string())
                .collect();
            for name in referenced {
                doc.ensure_layer(name);
            }
            doc
        }
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer("0");
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        /// 设置图层颜色，图层不存在时自动创建。
        pub fn set_layer_color(&mut self, name: impl AsRef<str>, color: Color) {
            let key = name.as_ref();
            self.ensure_layer(key);
            if let Some(layer) = self.layers.get_mut(key) {
                layer.color = Some(color);
            }
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            self.ensure_layer(entity.layer_name());
            let id = self.next_id();
            self.entities.push((id, entity));
            id
        }

        pub fn add_line(
            &mut self,
            start: Point2,
            end: Point2,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Line(Line {
                start,
                end,
                thickness: 0.0,
                color: Color::ByLayer,
                layer: layer.into(),
            }))
        }

        pub fn add_circle(
            &mut self,
            center: Point2,
            radius: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Circle(Circle {
                center,
                radius,
                thickness: 0.0,
                color: Color::ByLayer,
                layer: layer.into(),
            }))
        }

        pub fn add_arc(
            &mut self,
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Arc(Arc {
                center,
                radius,
                start_angle,
                end_angle,
                thickness: 0.0,
                color: Color::ByLayer,
                layer: layer.into(),
            }))
        }

        pub fn add_lw_polyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = PolylineVertex>,
        {
            self.add_entity(Entity::LwPolyline(Polyline {
                vertices: vertices.into_iter().collect(),
                is_closed,
                color: Color::ByLayer,
                layer: layer.into(),
            }))
        }

        pub fn add_text(
            &mut self,
            insert: Point2,
            content: impl Into<String>,
            height: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::Text(Text {
                insert,
                content: content.into(),
                height,
                rotation: 0.0,
                color: Color::ByLayer,
                layer: layer.into(),
            }))
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find_map(|(entity_id, entity)| (*entity_id == id).then_some(entity))
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            let mut has = false;
            for (_, entity) in &self.entities {
                if let Some(entity_bounds) = entity.bounds() {
                    bounds.include_bounds(&entity_bounds);
                    has = true;
                }
            }
            if has { Some(bounds) } else { None }
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

    fn normalize_angle(angle: f64) -> f64 {
        let mut result = angle % TAU;
        if result < 0.0 {
            result += TAU;
        }
        result
    }

    fn canonical_interval(start: f64, end: f64) -> (f64, f64) {
        let start = normalize_angle(start);
        let mut end = normalize_angle(end);
        if (end - start).abs() < 1e-9 {
            end = start + TAU;
        } else if end < start {
            end += TAU;
        }
        (start, end)
    }

    fn arc_point(center: Point2, radius: f64, angle: f64) -> Point2 {
        let offset = Vector2::new(radius * angle.cos(), radius * angle.sin());
        center.translate(offset)
    }

    fn arc_bounds(center: Point2, radius: f64, start_angle: f64, end_angle: f64, bounds: &mut Bounds2D) {
        let radius = radius.abs();
        if radius <= f64::EPSILON {
            bounds.include_point(center);
            return;
        }

        let (start, end) = canonical_interval(start_angle, end_angle);
        bounds.include_point(arc_point(center, radius, start));
        bounds.include_point(arc_point(center, radius, end));

        const QUADRANTS: [f64; 4] = [0.0, FRAC_PI_2, PI, FRAC_PI_2 * 3.0];
        for base in QUADRANTS {
            let mut candidate = base;
            while candidate < start {
                candidate += TAU;
            }
            if candidate <= end {
                bounds.include_point(arc_point(center, radius, candidate));
            }
        }
    }

    fn ellipse_bounds(
        center: Point2,
        major_axis: Vector2,
        ratio: f64,
        start_parameter: f64,
        end_parameter: f64,
        bounds: &mut Bounds2D,
    ) {
        let major_vec = major_axis.as_vec2();
        let major_length = major_vec.length();

        if major_length <= f64::EPSILON {
            bounds.include_point(center);
            return;
        }
        let minor_length = major_length * ratio.abs();
        let major_dir = major_vec / major_length;
        let minor_dir = DVec2::new(-major_dir.y, major_dir.x);
        let minor_vec = minor_dir * minor_length;

        let start = start_parameter;
        let mut end = end_parameter;
        if (end - start).abs() < 1e-9 {
            end = start + TAU;
        } else {
            while end < start {
                end += TAU;
            }
        }
        let span = end - start;
        let step_count = ((span / (TAU / 64.0)).ceil() as usize).max(16);
        for i in 0..=step_count {
            let t = start + span * (i as f64 / step_count as f64);
            let offset = major_vec * t.cos() + minor_vec * t.sin();
            bounds.include_point(center.translate(Vector2::from(offset)));
        }
    }

    fn polyline_bounds(vertices: &[PolylineVertex], is_closed: bool, bounds: &mut Bounds2D) {
        for vertex in vertices {
            bounds.include_point(vertex.position);
        }
        let closing = if is_closed {
            vertices.last().zip(vertices.first())
        } else {
            None
        };
        let pairs = vertices.windows(2).map(|pair| (&pair[0], &pair[1]));
        for (from, to) in pairs.chain(closing) {
            polyline_segment_bounds(from.position, to.position, from.bulge, bounds);
        }
    }

    fn include_hatch_edge_bounds(edge: &HatchEdge, bounds: &mut Bounds2D) {
        match edge {
            HatchEdge::Line { start, end } => {
                bounds.include_point(*start);
                bounds.include_point(*end);
            }
            HatchEdge::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                arc_bounds(*center, *radius, *start_angle, *end_angle, bounds);
            }
            HatchEdge::Ellipse {
                center,
                major_axis,
                minor_ratio,
                start_angle,
                end_angle,
                ..
            } => {
                ellipse_bounds(
                    *center,
                    *major_axis,
                    *minor_ratio,
                    *start_angle,
                    *end_angle,
                    bounds,
                );
            }
            HatchEdge::Spline { control_points, .. } => {
                for point in control_points {
                    bounds.include_point(*point);
                }
            }
        }
    }

    fn polyline_segment_bounds(start: Point2, end: Point2, bulge: f64, bounds: &mut Bounds2D) {
        if bulge.abs() <= 1e-9 {
            return;
        }

        let start_vec = start.as_vec2();
        let end_vec = end.as_vec2();
        let chord = end_vec - start_vec;
        let chord_len = chord.length();
        if chord_len <= f64::EPSILON {
            return;
        }

        let theta = 4.0 * bulge.atan();
        let half_theta = theta / 2.0;
        let sin_half = half_theta.sin();
        if sin_half.abs() <= 1e-9 {
            return;
        }

        let radius = chord_len / (2.0 * sin_half);
        let midpoint = (start_vec + end_vec) * 0.5;
        let perp_dir = DVec2::new(-chord.y, chord.x).normalize();
        // 圆心到弦中点的有向距离
        let offset = radius * half_theta.cos();
        let center_vec = midpoint + perp_dir * offset;

        let start_dir = start_vec - center_vec;
        let start_angle = start_dir.y.atan2(start_dir.x);
        let (arc_start, arc_end) = if theta > 0.0 {
            (start_angle, start_angle + theta)
        } else {
            (start_angle + theta, start_angle)
        };
        arc_bounds(
            Point2::from_vec(center_vec),
            radius,
            arc_start,
            arc_end,
            bounds,
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::geometry::Point2;
        use std::f64::consts::FRAC_PI_2;

        #[test]
        fn document_stores_entities_in_draw_order() {
            let mut doc = Document::new();
            let line = doc.add_line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), "0");
            let circle = doc.add_circle(Point2::new(5.0, 5.0), 2.0, "ANNOT");
            let arc = doc.add_arc(Point2::new(5.0, 0.0), 3.5, 0.0, FRAC_PI_2, "GEOM");
            let text = doc.add_text(Point2::new(1.0, 1.0), "Hello", 2.5, "ANNOT");

            assert_eq!(line.get(), 0);
            assert_eq!(circle.get(), 1);
            assert_eq!(arc.get(), 2);
            assert_eq!(text.get(), 3);

            let layers: Vec<_> = doc.layers().map(|l| l.name.clone()).collect();
            assert_eq!(layers, vec!["0", "ANNOT", "GEOM"]);
            let kinds: Vec<_> = doc.entities().map(|(_, e)| e.kind_name()).collect();
            assert_eq!(kinds, vec!["LINE", "CIRCLE", "ARC", "TEXT"]);

            match doc.entity(arc) {
                Some(Entity::Arc(arc)) => {
                    assert_eq!(arc.layer, "GEOM");
                    assert!((arc.radius - 3.5).abs() < f64::EPSILON);
                }
                other => panic!("unexpected entity lookup result: {other:?}"),
            }
            assert_eq!(doc.entity(text).and_then(Entity::description), Some("Hello"));
            assert!(doc.entity(EntityId::new(42)).is_none());

            let bounds = doc.bounds().expect("document bounds should exist");
            assert!((bounds.min().x() - 0.0).abs() < 1e-9);
            assert!((bounds.min().y() - 0.0).abs() < 1e-9);
            assert!((bounds.max().x() - 10.0).abs() < 1e-9);
            assert!((bounds.max().y() - 7.0).abs() < 1e-9);
        }

        #[test]
        fn json_input_needs_only_layers_and_entities() {
            let mut doc: Document = serde_json::from_str(
                r#"{
                    "layers": { "GEOM": { "name": "GEOM", "color": { "index": 3 } } },
                    "entities": [
                        [4, { "Line": { "start": [0.0, 0.0], "end": [1.0, 0.0], "layer": "GEOM" } }],
                        [7, { "Circle": { "center": [2.0, 2.0], "radius": 1.0, "layer": "PIPES" } }]
                    ]
                }"#,
            )
            .expect("document without counter");

            let layers: Vec<_> = doc.layers().map(|l| l.name.as_str()).collect();
            assert_eq!(layers, vec!["GEOM", "PIPES"]);
            let next = doc.add_line(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0), "GEOM");
            assert_eq!(next.get(), 8);

            let json = serde_json::to_value(&doc).expect("serialize document");
            assert!(json.get("next_entity_id").is_none());
            assert!(json["layers"]["GEOM"].get("is_visible").is_none());

            let empty: Document = serde_json::from_str("{}").expect("empty document");
            assert!(empty.entities().next().is_none());
        }

        #[test]
        fn anchor_uses_insert_for_text_and_box_center_otherwise() {
            let text = Entity::Text(Text {
                insert: Point2::new(3.0, 4.0),
                content: "A".to_string(),
                height: 1.0,
                rotation: 0.0,
                color: Color::ByLayer,
                layer: "0".to_string(),
            });
            assert_eq!(text.anchor(), Some(Point2::new(3.0, 4.0)));

            let line = Entity::Line(Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(4.0, 2.0),
                thickness: 0.0,
                color: Color::ByLayer,
                layer: "0".to_string(),
            });
            assert_eq!(line.anchor(), Some(Point2::new(2.0, 1.0)));
            assert!(line.description().is_none());

            let empty = Entity::LwPolyline(Polyline {
                vertices: Vec::new(),
                is_closed: false,
                color: Color::ByLayer,
                layer: "0".to_string(),
            });
            assert!(empty.anchor().is_none());
        }

        #[test]
        fn bulged_polyline_bounds_include_arc_apex() {
            // 半圆凸度 1：从 (0,0) 到 (2,0)，逆时针经过 (1,-1)
            let polyline = Entity::LwPolyline(Polyline {
                vertices: vec![
                    PolylineVertex::with_bulge(Point2::new(0.0, 0.0), 1.0),
                    PolylineVertex::new(Point2::new(2.0, 0.0)),
                ],
                is_closed: false,
                color: Color::ByLayer,
                layer: "0".to_string(),
            });
            let bounds = polyline.bounds().expect("polyline bounds");
            assert!((bounds.min().y() + 1.0).abs() < 1e-9);
            assert!(bounds.max().y().abs() < 1e-9);
        }

        #[test]
        fn color_resolves_aci_palette() {
            assert_eq!(Color::Index(1).to_rgb_string(), "#FF0000");
            assert_eq!(Color::Index(7).to_rgb_string(), "#FFFFFF");
            assert_eq!(Color::Index(10).to_rgb_string(), "#FF0000");
            assert_eq!(Color::Index(11).to_rgb_string(), "#FF7F7F");
            assert_eq!(Color::Index(14).to_rgb_string(), "#990000");
            assert_eq!(Color::Index(20).to_rgb_string(), "#FF3F00");
            assert_eq!(Color::Index(250).to_rgb_string(), "#333333");
            assert_eq!(Color::TrueColor(0x123456).to_rgb_string(), "#123456");
            assert_eq!(Color::ByLayer.to_rgb_string(), "#000000");
        }
    }
}
