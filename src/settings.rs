use std::fs;
use std::path::Path;

use crate::config::CardsConfig;
use crate::error::AppError;

/// 读取配置文件；文件不存在、无法解析或取值越界时回退到默认配置。
pub fn load_settings(path: &Path) -> CardsConfig {
    if !path.exists() {
        log::debug!("配置文件不存在，使用默认配置: {}", path.display());
        return CardsConfig::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("读取配置文件失败，使用默认配置: {}", e);
            return CardsConfig::default();
        }
    };

    match serde_json::from_str::<CardsConfig>(&content) {
        Ok(config) => match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("配置取值无效，使用默认配置: {}", e);
                CardsConfig::default()
            }
        },
        Err(e) => {
            log::warn!("解析配置文件失败，使用默认配置: {}", e);
            CardsConfig::default()
        }
    }
}

/// 以格式化 JSON 写出配置，必要时创建父目录。
pub fn save_settings(path: &Path, config: &CardsConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Settings(format!("创建配置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化配置失败: {}", e)))?;
    fs::write(path, content)
        .map_err(|e| AppError::Settings(format!("写入配置文件失败: {}", e)))?;
    Ok(())
}
