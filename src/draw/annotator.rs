use anyhow::{Result, anyhow};
use font_kit::family_name::FamilyName;
use font_kit::font::Font;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use raqote::{DrawOptions, DrawTarget, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::config::LABEL_FONT_SIZE;
use crate::segment::BoundingBox;
use crate::utils::colors::text_color_for;
use crate::zone::geometry::Point;

/// 加载系统无衬线字体，用于绘制标签文字
pub fn load_label_font() -> Result<Font> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .map_err(|e| anyhow!("找不到无衬线字体: {:?}", e))?;
    handle.load().map_err(|e| anyhow!("无法加载字体: {:?}", e))
}

/// 文字宽度（像素）
///
/// 有字体时按字形前进宽度累加，字体中缺少的字符和没有字体时按`0.6 * size`估计。
///
/// # 参数
/// * `font` - 标签字体
/// * `text` - 待测量的文字
/// * `size` - 字号（像素）
pub fn measure_text(font: Option<&Font>, text: &str, size: f32) -> f32 {
    let fallback = size * 0.6;
    let Some(font) = font else {
        return text.chars().count() as f32 * fallback;
    };

    let units_per_em = font.metrics().units_per_em as f32;
    if units_per_em <= 0.0 {
        return text.chars().count() as f32 * fallback;
    }
    text.chars()
        .map(|c| {
            font.glyph_for_char(c)
                .and_then(|glyph| font.advance(glyph).ok())
                .map(|advance| advance.x() * size / units_per_em)
                .unwrap_or(fallback)
        })
        .sum()
}

fn solid([r, g, b]: [u8; 3]) -> Source<'static> {
    Source::Solid(SolidSource { r, g, b, a: 0xFF })
}

/// 帧标注器
///
/// 把图像复制到`DrawTarget`上，在其上绘制区域、检测框、标签、轨迹和计数，
/// 最后通过`into_image`取回标注后的图像。没有字体时只绘制图形，跳过文字。
pub struct Annotator<'f> {
    dt: DrawTarget,
    width: u32,
    height: u32,
    line_width: f32,
    font: Option<&'f Font>,
    font_size: f32,
}

impl<'f> Annotator<'f> {
    /// # 参数
    /// * `image` - 待标注的图像
    /// * `line_width` - 检测框线宽，最小为1
    pub fn new(image: &DynamicImage, line_width: u32) -> Self {
        let (width, height) = image.dimensions();
        let mut dt = DrawTarget::new(width as i32, height as i32);

        // raqote使用预乘alpha的ARGB
        let rgba_image = image.to_rgba8();
        let image_data: Vec<u32> = rgba_image
            .pixels()
            .map(|&Rgba([r, g, b, a])| {
                let premul = |c: u8| ((c as u16 * a as u16) / 255) as u8;
                u32::from_le_bytes([premul(b), premul(g), premul(r), a])
            })
            .collect();

        let img = raqote::Image {
            width: width as i32,
            height: height as i32,
            data: &image_data,
        };
        dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

        Self {
            dt,
            width,
            height,
            line_width: line_width.max(1) as f32,
            font: None,
            font_size: LABEL_FONT_SIZE,
        }
    }

    /// 设置标签字体
    pub fn with_font(mut self, font: Option<&'f Font>) -> Self {
        self.font = font;
        self
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    fn stroke_style(width: f32) -> StrokeStyle {
        StrokeStyle {
            join: LineJoin::Round,
            cap: LineCap::Round,
            width,
            ..StrokeStyle::default()
        }
    }

    /// 绘制闭合区域轮廓
    pub fn draw_region(&mut self, points: &[Point], color: [u8; 3], thickness: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        let path = pb.finish();

        self.dt.stroke(&path, &solid(color), &Self::stroke_style(thickness), &DrawOptions::default());
    }

    /// 绘制检测框及其标签
    pub fn box_label(&mut self, bbox: &BoundingBox, label: &str, color: [u8; 3]) {
        let mut pb = PathBuilder::new();
        pb.rect(bbox.x1, bbox.y1, bbox.x2 - bbox.x1, bbox.y2 - bbox.y1);
        let path = pb.finish();
        self.dt.stroke(&path, &solid(color), &Self::stroke_style(self.line_width), &DrawOptions::default());

        if label.is_empty() {
            return;
        }
        let (w, h) = self.text_extent(label);
        // 框上方放不下时画在框内
        let y = if bbox.y1 - h >= 0.0 { bbox.y1 - h } else { bbox.y1 };
        self.text_with_background(bbox.x1, y, w, h, label, color);
    }

    /// 绘制轨迹折线，并在最新位置画一个实心点
    pub fn draw_centroid_and_tracks(&mut self, track: &[(f32, f32)], color: [u8; 3], thickness: f32) {
        let Some(&(lx, ly)) = track.last() else {
            return;
        };

        if track.len() > 1 {
            let mut pb = PathBuilder::new();
            pb.move_to(track[0].0, track[0].1);
            for &(x, y) in &track[1..] {
                pb.line_to(x, y);
            }
            let path = pb.finish();
            self.dt.stroke(&path, &solid(color), &Self::stroke_style(thickness), &DrawOptions::default());
        }

        let mut pb = PathBuilder::new();
        pb.arc(lx, ly, thickness * 2.0, 0.0, 2.0 * std::f32::consts::PI);
        let path = pb.finish();
        self.dt.fill(&path, &solid(color), &DrawOptions::default());
    }

    /// 以`center`为中心绘制计数徽标
    pub fn count_badge(&mut self, center: Point, text: &str, background: [u8; 3]) {
        let (w, h) = self.text_extent(text);
        let x = (center.x as f32 - w / 2.0).clamp(0.0, (self.width as f32 - w).max(0.0));
        let y = (center.y as f32 - h / 2.0).clamp(0.0, (self.height as f32 - h).max(0.0));
        self.text_with_background(x, y, w, h, text, background);
    }

    fn text_extent(&self, text: &str) -> (f32, f32) {
        (measure_text(self.font, text, self.font_size) + 6.0, self.font_size + 6.0)
    }

    fn text_with_background(&mut self, x: f32, y: f32, w: f32, h: f32, text: &str, background: [u8; 3]) {
        self.dt.fill_rect(x, y, w, h, &solid(background), &DrawOptions::default());
        if let Some(font) = self.font {
            self.dt.draw_text(
                font,
                self.font_size,
                text,
                raqote::Point::new(x + 3.0, y + self.font_size),
                &solid(text_color_for(background)),
                &DrawOptions::default(),
            );
        }
    }

    /// 取回标注后的图像
    pub fn into_image(self) -> DynamicImage {
        let data = self.dt.get_data();
        let width = self.width;
        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [b, g, r, a] = data[(y * width + x) as usize].to_le_bytes();
            let unpremul = |c: u8| if a == 0 { 0 } else { ((c as u16 * 255) / a as u16).min(255) as u8 };
            Rgba([unpremul(r), unpremul(g), unpremul(b), a])
        });
        DynamicImage::ImageRgba8(image)
    }
}
