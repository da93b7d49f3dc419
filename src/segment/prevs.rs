use anyhow::{Context, Result, bail};
use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::{Array, Array4};
use std::path::Path;

/// 原始图像与模型输入之间的缩放信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMessage {
    /// 原始图像宽度
    pub o_width: u32,
    /// 原始图像高度
    pub o_height: u32,
    /// 模型输入宽度
    pub s_width: usize,
    /// 模型输入高度
    pub s_height: usize,
}

impl ScaleMessage {
    pub fn new(o_width: u32, o_height: u32, s_width: usize, s_height: usize) -> Self {
        Self { o_width, o_height, s_width, s_height }
    }

    /// x、y方向上从模型输入坐标到原始图像坐标的比例
    pub fn scale(&self) -> (f32, f32) {
        (
            self.o_width as f32 / self.s_width as f32,
            self.o_height as f32 / self.s_height as f32,
        )
    }
}

/// 加载图像文件
///
/// # 错误处理
/// 文件不存在或无法解码时返回Err
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("图像文件不存在: {:?}", path);
    }

    let img = image::open(path).with_context(|| format!("无法加载图像: {:?}", path))?;
    Ok(img)
}

/// 调整图像大小以适应模型输入
///
/// 使用CatmullRom插值算法将图像调整为指定尺寸。
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::CatmullRom)
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围
/// 2. 调整通道顺序为RGB
/// 3. 调整维度顺序为NCHW格式
///
/// 超出`input_width`/`input_height`的像素会被忽略。
pub fn image_to_tensor(img: &DynamicImage, input_height: usize, input_width: usize) -> Array4<f32> {
    let mut tensor = Array::zeros((1, 3, input_height, input_width));

    for (x, y, pixel) in img.pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= input_width || y >= input_height {
            continue;
        }
        let [r, g, b, _] = pixel.0;

        tensor[[0, 0, y, x]] = (r as f32) / 255.0;
        tensor[[0, 1, y, x]] = (g as f32) / 255.0;
        tensor[[0, 2, y, x]] = (b as f32) / 255.0;
    }

    tensor
}
