//! 颜色解析：CSS 颜色语法（颜色名、`#RGB[A]`、`#RRGGBB[AA]`、`rgb()` / `hsl()` 等），
//! 交给 `csscolorparser` 处理。

use image::Rgba;

/// 解析颜色字符串，无法识别时返回 `None`。
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    csscolorparser::parse(value)
        .ok()
        .map(|color| Rgba(color.to_rgba8()))
}
