use anyhow::{Result, anyhow, bail};
use ndarray::{Array2, Array4};
use ort::{inputs, session::Session, value::Tensor};

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session，输入名为`images`
/// * `input` - 输入张量，形状为(1, 3, height, width)
///
/// # 返回值
/// 二维数组(num_boxes, num_params)，每行以`[x1, y1, x2, y2, conf]`开头
///
/// # 错误处理
/// 推理失败或输出形状不是`[1, N, P]`（P >= 5）时返回Err
pub fn run_inference(model: &mut Session, input: &Array4<f32>) -> Result<Array2<f32>> {
    let shape: Vec<usize> = input.shape().to_vec();
    let (data, _offset) = input.clone().into_raw_vec_and_offset();
    let input_tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data))
        .map_err(|e| anyhow!("无法构建输入张量: {}", e))?;
    let outputs = model
        .run(inputs!["images" => input_tensor])
        .map_err(|e| anyhow!("模型推理失败: {}", e))?;

    let output = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| anyhow!("无法提取输出张量: {}", e))?;
    let shape = output.0.clone();

    if shape.len() != 3 || shape[0] != 1 || shape[2] < 5 {
        bail!("模型输出形状不符合预期: {:?}", shape);
    }

    let data = output.1.to_vec();
    let array = Array2::from_shape_vec((shape[1] as usize, shape[2] as usize), data)?;
    Ok(array)
}
