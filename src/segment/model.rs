use ort::session::{Session, builder::GraphOptimizationLevel};

/// 加载ONNX格式的分割/检测模型，并应用优化配置。
///
/// # 错误处理
/// 如果模型加载失败会返回Err
pub fn load_model(model_path: &str, intra_threads: usize) -> Result<Session, ort::Error> {
    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(model_path)?;
    Ok(model)
}
