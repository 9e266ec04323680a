//! 전체 시스템 설정 통합 관리
//! Modern Rust 2024: serde, config crate 활용한 설정 시스템

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from file: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// 전체 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationSettings,
    pub completion: CompletionSettings,
    pub guard: GuardSettings,
    pub channels: ChannelSettings,
    pub logging: LoggingSettings,
}

/// 시뮬레이션 타이밍 설정 (모든 시간은 밀리초)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// 업로드 진행률 틱 간격
    pub upload_tick_ms: u64,
    /// 틱당 업로드 진행률 증가량 (%)
    pub upload_increment: f64,
    /// 업로드 100% 후 다음 단계 전 대기
    pub upload_settle_ms: u64,
    pub ocr_start_delay_ms: u64,
    /// 이미지 한 장당 OCR 소요 시간
    pub ocr_ms_per_file: u64,
    pub ocr_tick_ms: u64,
    pub nutrition_start_delay_ms: u64,
    /// 영양정보 단계의 0% → 50% → 100% 스텝 간격
    pub nutrition_step_ms: u64,
    pub recommendation_start_delay_ms: u64,
    pub recommendation_tick_ms: u64,
    /// LLM 단계 틱당 진행률 증가 범위
    pub llm_increment_min: f64,
    pub llm_increment_max: f64,
    /// 마지막 단계 100% 후 완료 신호 전 대기
    pub complete_delay_ms: u64,
}

/// 완료 연출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// 완료 메시지를 읽을 시간
    pub read_delay_ms: u64,
    /// 페이드아웃 트랜지션 길이
    pub fade_ms: u64,
}

/// 페이지 로드 가드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// 이 간격 안의 재로드는 실수 새로고침으로 간주
    pub refresh_debounce_ms: u64,
}

/// 채널 버퍼 크기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub signal_buffer_size: usize,
    pub inbound_buffer_size: usize,
}

/// 로깅 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file_logging: bool,
    pub log_dir: String,
}

impl SimulationSettings {
    pub fn upload_tick(&self) -> Duration {
        Duration::from_millis(self.upload_tick_ms)
    }

    pub fn ocr_tick(&self) -> Duration {
        Duration::from_millis(self.ocr_tick_ms)
    }
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("NUTRISCAN"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본값 위에 환경별 파일과 환경변수를 덮어씌워 로드
    pub fn for_environment(env: &str) -> Result<Self, ConfigError> {
        let base_path = "config/default";
        let env_path = &format!("config/{}", env);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(base_path).required(false))
            .add_source(config::File::with_name(env_path).required(false))
            .add_source(config::Environment::with_prefix("NUTRISCAN"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.upload_tick_ms == 0 {
            return Err(ConfigError::Validation {
                message: "upload_tick_ms must be greater than 0".to_string(),
            });
        }

        if self.simulation.upload_increment <= 0.0 {
            return Err(ConfigError::Validation {
                message: "upload_increment must be positive".to_string(),
            });
        }

        if self.simulation.llm_increment_min > self.simulation.llm_increment_max {
            return Err(ConfigError::Validation {
                message: "llm_increment_min cannot be greater than llm_increment_max".to_string(),
            });
        }

        if self.channels.signal_buffer_size == 0 {
            return Err(ConfigError::Validation {
                message: "signal_buffer_size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            upload_tick_ms: 100,
            upload_increment: 5.0,
            upload_settle_ms: 500,
            ocr_start_delay_ms: 100,
            ocr_ms_per_file: 2500,
            ocr_tick_ms: 200,
            nutrition_start_delay_ms: 200,
            nutrition_step_ms: 500,
            recommendation_start_delay_ms: 300,
            recommendation_tick_ms: 500,
            llm_increment_min: 2.0,
            llm_increment_max: 10.0,
            complete_delay_ms: 300,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            read_delay_ms: 2000,
            fade_ms: 500,
        }
    }
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: 1000,
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            signal_buffer_size: 256,
            inbound_buffer_size: 128,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: "./logs".to_string(),
        }
    }
}
