//! 运行参数 - 通过JSON文件调整参数

use crate::geometry::simplify::DEFAULT_SIMPLIFY_RATIO;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// Per-category pollution weights. Categories not listed weigh 0.
static DEFAULT_POLLUTION_WEIGHTS: phf::Map<&'static str, f64> = phf_map! {
    "truck" => 10.0,
    "bus" => 8.0,
    "lcv" => 6.0,
    "autorickshaw" => 5.0,
    "tractor" => 5.0,
    "lmv" => 3.0,
    "motorbike" => 1.0,
};

const DEFAULT_TRAFFIC_CLASSES: [&str; 7] = [
    "lmv",
    "motorbike",
    "bus",
    "truck",
    "autorickshaw",
    "lcv",
    "tractor",
];

/// Worker-side analysis parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub processing_interval_secs: f64, // 采样间隔
    pub pollution_weights: BTreeMap<String, f64>,
    pub traffic_classes: Vec<String>, // 空 = 全部类别
    pub pedestrian_class: String,
    pub min_confidence: f32,
    pub jpeg_quality: u8,
    pub font_path: Option<String>, // 叠加文字字体 (TTF)
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            processing_interval_secs: 5.0,
            pollution_weights: DEFAULT_POLLUTION_WEIGHTS
                .entries()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            traffic_classes: DEFAULT_TRAFFIC_CLASSES.iter().map(|s| s.to_string()).collect(),
            pedestrian_class: "person".to_string(),
            min_confidence: 0.3,
            jpeg_quality: 80,
            font_path: None,
        }
    }
}

impl AnalyticsSettings {
    pub fn weight(&self, label: &str) -> f64 {
        self.pollution_weights.get(label).copied().unwrap_or(0.0)
    }

    pub fn is_traffic_class(&self, label: &str) -> bool {
        self.traffic_classes.is_empty() || self.traffic_classes.iter().any(|c| c == label)
    }

    pub fn load(path: &str) -> Self {
        load_or_create(path)
    }

    pub fn save(&self, path: &str) {
        save_json(self, path)
    }
}

/// Authoring tool parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub simplify_ratio: f64,  // epsilon = k * 周长
    pub erase_radius_px: f32, // 屏幕像素
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            simplify_ratio: DEFAULT_SIMPLIFY_RATIO,
            erase_radius_px: 15.0,
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
        }
    }
}

impl EditorSettings {
    pub fn load(path: &str) -> Self {
        load_or_create(path)
    }

    pub fn save(&self, path: &str) {
        save_json(self, path)
    }
}

/// 从JSON文件加载配置, 文件不存在时写入默认值
fn load_or_create<T>(path: &str) -> T
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    match fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(config) => {
                log::info!("✅ Settings loaded from {}", path);
                config
            }
            Err(e) => {
                log::warn!("⚠️  Failed to parse {}: {}, using defaults", path, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("📝 {} not found, writing defaults", path);
            let config = T::default();
            save_json(&config, path);
            config
        }
    }
}

fn save_json<T: Serialize>(value: &T, path: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                log::error!("❌ Failed to save {}: {}", path, e);
            } else {
                log::info!("💾 Settings saved to {}", path);
            }
        }
        Err(e) => log::error!("❌ Failed to serialise settings: {}", e),
    }
}
