use dxfsvg_core::document::{Color, Document};
use dxfsvg_core::path::format_number;
use dxfsvg_engine::ConvertedLayer;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// 将转换结果组装为完整的 SVG 文本。
///
/// CAD 坐标 Y 轴向上，外层分组做一次 Y 翻转，`viewBox` 取翻转后的文档范围。
pub fn render_svg(
    document: &Document,
    layers: &[ConvertedLayer<'_>],
    description_attribute: &str,
) -> String {
    let (min_x, min_y, width, height) = match document.bounds() {
        Some(bounds) => (
            bounds.min().x(),
            bounds.min().y(),
            bounds.max().x() - bounds.min().x(),
            bounds.max().y() - bounds.min().y(),
        ),
        None => (0.0, 0.0, 0.0, 0.0),
    };
    let width = width.max(1.0);
    let height = height.max(1.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"{SVG_NAMESPACE}\" version=\"1.1\" class=\"dxf-drawing\" viewBox=\"{} {} {} {}\">\n",
        format_number(min_x),
        format_number(-(min_y + height)),
        format_number(width),
        format_number(height)
    ));
    svg.push_str("<!-- this group corrects for the y-axis going in different directions -->\n");
    svg.push_str("<g transform=\"scale(1 -1)\">\n");

    for converted in layers {
        let layer = converted.layer;
        let color = layer.color.unwrap_or(Color::Index(0)).to_rgb_string();
        svg.push_str(&format!("<!-- layer '{}' -->\n", escape_xml(&layer.name)));
        svg.push_str(&format!(
            "<g stroke=\"{color}\" fill=\"{color}\" class=\"dxf-layer {}\">\n",
            escape_xml(&layer.name)
        ));

        for item in &converted.entities {
            svg.push_str(&format!("<path d=\"{}\"", item.path));
            for (name, value) in item.style.attributes() {
                svg.push_str(&format!(" {name}=\"{}\"", escape_xml(&value)));
            }
            if let Some(description) = item.description {
                svg.push_str(&format!(
                    " {description_attribute}=\"{}\"",
                    escape_xml(description)
                ));
            }
            svg.push_str(&format!(
                " class=\"dxf-entity {} {}\"/>\n",
                escape_xml(item.entity.kind_name()),
                item.id.get()
            ));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
