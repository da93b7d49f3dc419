use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use zonecount::segment::{SegmentPredictor, load_image};
use zonecount::zone::{IouTracker, TrackingPipeline, ZoneConfig, ZoneCounter};

/// 用法: zone_counting <模型.onnx> <帧目录> <输出目录> [区域配置.toml]
///
/// 区域配置也可以通过环境变量`ZONECOUNT_CONFIG`指定。
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("用法: zone_counting <模型.onnx> <帧目录> <输出目录> [区域配置.toml]");
    }
    let (model_path, frames_dir, output_dir) = (&args[0], Path::new(&args[1]), Path::new(&args[2]));

    let config_path = args
        .get(3)
        .cloned()
        .or_else(|| std::env::var("ZONECOUNT_CONFIG").ok());
    let config = match config_path {
        Some(path) => ZoneConfig::load(Path::new(&path))?,
        None => {
            log::info!("未指定区域配置，使用默认区域");
            ZoneConfig::default()
        }
    };
    log::info!("共 {} 个区域", config.zones.len());

    let predictor = SegmentPredictor::from_path(model_path)?;
    let mut pipeline = TrackingPipeline::new(predictor, IouTracker::default());
    let mut counter = ZoneCounter::new(config);

    let mut frames: Vec<PathBuf> = std::fs::read_dir(frames_dir)
        .with_context(|| format!("无法读取帧目录 {}", frames_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
                Some("jpg" | "jpeg" | "png")
            )
        })
        .collect();
    frames.sort();

    std::fs::create_dir_all(output_dir)?;
    for path in &frames {
        let frame = load_image(path)?;
        let annotated = counter.count_objects_in_zones(&frame, &mut pipeline)?;

        let Some(name) = path.file_name() else {
            continue;
        };
        let out = output_dir.join(name).with_extension("png");
        annotated.save(&out).with_context(|| format!("无法保存 {}", out.display()))?;

        for (idx, zone) in counter.config().zones.iter().enumerate() {
            log::info!("{:?} 区域 {}: {}", name, zone.name, counter.zone_count(idx));
        }
    }

    log::info!("处理完成，共 {} 帧", counter.frame_index());
    Ok(())
}
