//! Synthesis Context - Value Objects

use std::path::PathBuf;

/// 远程合成的固定参数
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    /// 是否去除静音
    pub remove_silence: bool,
    /// 交叉淡化时长（秒）
    pub cross_fade_duration: f64,
    /// NFE 步数
    pub nfe_steps: u32,
    /// 语速倍率
    pub speed: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            remove_silence: false,
            cross_fade_duration: 0.15,
            nfe_steps: 32,
            speed: 1.0,
        }
    }
}

impl SynthesisParams {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.0..=1.0).contains(&self.cross_fade_duration) {
            return Err("cross_fade_duration must be between 0 and 1");
        }
        if self.nfe_steps == 0 {
            return Err("nfe_steps must be positive");
        }
        if !(self.speed > 0.0) {
            return Err("speed must be positive");
        }
        Ok(())
    }
}

/// 一次远程合成的结果
///
/// 由合成适配器产生，编排器立即将两个文件移动到结果槽位中
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// 生成音频的本地路径
    pub audio_path: PathBuf,
    /// 生成图片（频谱图）的本地路径
    pub image_path: PathBuf,
    /// 生成的文本
    pub generated_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SynthesisParams::default();
        assert!(!params.remove_silence);
        assert_eq!(params.cross_fade_duration, 0.15);
        assert_eq!(params.nfe_steps, 32);
        assert_eq!(params.speed, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let mut params = SynthesisParams::default();
        params.nfe_steps = 0;
        assert!(params.validate().is_err());

        let mut params = SynthesisParams::default();
        params.speed = 0.0;
        assert!(params.validate().is_err());

        let mut params = SynthesisParams::default();
        params.cross_fade_duration = 2.0;
        assert!(params.validate().is_err());
    }
}
