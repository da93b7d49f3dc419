/// 按ID取色的调色板（RGB）
pub const PALETTE: [[u8; 3]; 20] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
    [72, 249, 10],
    [146, 204, 23],
    [61, 219, 134],
    [26, 147, 52],
    [0, 212, 187],
    [44, 153, 168],
    [0, 194, 255],
    [52, 69, 147],
    [100, 115, 255],
    [0, 24, 236],
    [132, 56, 255],
    [82, 0, 133],
    [203, 56, 255],
    [255, 149, 200],
    [255, 55, 199],
];

/// 按类别或跟踪ID循环取色
pub fn color_for(index: u64) -> [u8; 3] {
    PALETTE[(index % PALETTE.len() as u64) as usize]
}

/// 根据背景亮度选择黑色或白色文字
pub fn text_color_for(background: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = background;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 160.0 { [0, 0, 0] } else { [255, 255, 255] }
}
