use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::head_loss::{FlowParameters, HeadLossError, InputField, PipeProperties};
use crate::sampling::{DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 슬라이더 하나의 범위/간격/기본값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// 표시 소수 자릿수
    pub decimals: usize,
}

impl SliderSpec {
    pub const fn new(min: f64, max: f64, step: f64, default: f64, decimals: usize) -> Self {
        Self {
            min,
            max,
            step,
            default,
            decimals,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// 값이 범위 안에 있는지 확인한다. 슬라이더 밖의 입력은 InvalidInput.
    pub fn check(&self, field: InputField, value: f64) -> Result<f64, HeadLossError> {
        if !value.is_finite() {
            return Err(HeadLossError::invalid(field, value, "must be a finite number"));
        }
        if !self.contains(value) {
            return Err(HeadLossError::invalid(field, value, "outside the slider range"));
        }
        Ok(value)
    }

    fn is_consistent(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min < self.max
            && self.step > 0.0
            && self.contains(self.default)
    }
}

/// 운전점 라벨 소수 자릿수.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPrecision {
    pub flow_decimals: usize,
    pub head_loss_decimals: usize,
}

/// 대시보드 한 벌의 구성. 화면 배치와 무관한 숫자 설정만 담는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 곡선 스윕 상한 Q_max [m3/s]
    pub flow_max: f64,
    pub sample_count: usize,
    /// y축 고정 상한 [m]
    pub head_loss_max: f64,
    pub show_formula: bool,
    pub friction: SliderSpec,
    pub length: SliderSpec,
    pub diameter: SliderSpec,
    pub flow_point: SliderSpec,
    /// 비교용 기준 배관
    pub reference: PipeProperties,
    pub label: LabelPrecision,
}

/// 설정 파일의 구성 항목 오류.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid dashboard setting `{setting}`: {reason}")]
pub struct InvalidDashboard {
    pub setting: &'static str,
    pub reason: String,
}

impl DashboardConfig {
    /// 슬라이더 기본값으로 만든 초기 입력.
    pub fn default_parameters(&self) -> FlowParameters {
        FlowParameters::new(
            self.friction.default,
            self.length.default,
            self.diameter.default,
            self.flow_point.default,
        )
    }

    /// 입력값이 선언된 슬라이더 범위 안에 있는지 검사한다.
    pub fn check_inputs(&self, params: &FlowParameters) -> Result<(), HeadLossError> {
        self.friction
            .check(InputField::FrictionCoefficient, params.friction_coefficient)?;
        self.length.check(InputField::PipeLength, params.pipe_length_m)?;
        self.diameter
            .check(InputField::PipeDiameter, params.pipe_diameter_m)?;
        self.flow_point
            .check(InputField::FlowRate, params.flow_rate_m3_per_s)?;
        params.validate()
    }

    /// 구성 자체의 일관성을 검사한다.
    pub fn validate(&self) -> Result<(), InvalidDashboard> {
        let sliders = [
            ("friction", &self.friction),
            ("length", &self.length),
            ("diameter", &self.diameter),
            ("flow_point", &self.flow_point),
        ];
        for (name, spec) in sliders {
            if !spec.is_consistent() {
                return Err(InvalidDashboard {
                    setting: name,
                    reason: format!(
                        "need min < max, step > 0 and min <= default <= max (got {spec:?})"
                    ),
                });
            }
        }
        if !(self.flow_max.is_finite() && self.flow_max > 0.0) {
            return Err(InvalidDashboard {
                setting: "flow_max",
                reason: format!("must be positive (got {})", self.flow_max),
            });
        }
        if !(2..=MAX_SAMPLE_COUNT).contains(&self.sample_count) {
            return Err(InvalidDashboard {
                setting: "sample_count",
                reason: format!(
                    "need between 2 and {MAX_SAMPLE_COUNT} samples (got {})",
                    self.sample_count
                ),
            });
        }
        if !(self.head_loss_max.is_finite() && self.head_loss_max > 0.0) {
            return Err(InvalidDashboard {
                setting: "head_loss_max",
                reason: format!("must be positive (got {})", self.head_loss_max),
            });
        }
        // 스윕 끝점까지 유한한 값이 나와야 기준 곡선을 그릴 수 있다.
        self.reference
            .head_loss_at(self.flow_max)
            .map(|_| ())
            .map_err(|e| InvalidDashboard {
                setting: "reference",
                reason: e.to_string(),
            })
    }
}

/// 배포 변형별 기본 구성.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// 좁은 내경 범위(0.25~0.30 m), y축 50 m.
    #[default]
    Standard,
    /// 넓은 내경 범위(0.1~0.5 m), y축 20 m.
    WideDiameter,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Standard, Preset::WideDiameter];

    pub fn code(&self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::WideDiameter => "wide-diameter",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "standard" => Some(Preset::Standard),
            "wide-diameter" | "wide" => Some(Preset::WideDiameter),
            _ => None,
        }
    }

    pub fn dashboard(&self) -> DashboardConfig {
        match self {
            Preset::Standard => DashboardConfig {
                friction: SliderSpec::new(0.01, 0.05, 0.001, 0.04, 3),
                length: SliderSpec::new(10.0, 100.0, 5.0, 80.0, 0),
                diameter: SliderSpec::new(0.25, 0.3, 0.01, 0.28, 2),
                flow_point: SliderSpec::new(0.0, 0.3, 0.01, 0.24, 2),
                flow_max: 0.5,
                sample_count: DEFAULT_SAMPLE_COUNT,
                head_loss_max: 50.0,
                reference: PipeProperties::new(0.04, 80.0, 0.28),
                label: LabelPrecision {
                    flow_decimals: 2,
                    head_loss_decimals: 1,
                },
                show_formula: true,
            },
            Preset::WideDiameter => DashboardConfig {
                friction: SliderSpec::new(0.01, 0.05, 0.005, 0.03, 3),
                length: SliderSpec::new(10.0, 100.0, 5.0, 30.0, 0),
                diameter: SliderSpec::new(0.1, 0.5, 0.05, 0.3, 2),
                flow_point: SliderSpec::new(0.0, 0.4, 0.01, 0.25, 2),
                flow_max: 0.4,
                sample_count: DEFAULT_SAMPLE_COUNT,
                head_loss_max: 20.0,
                reference: PipeProperties::new(0.03, 30.0, 0.3),
                label: LabelPrecision {
                    flow_decimals: 2,
                    head_loss_decimals: 2,
                },
                show_formula: false,
            },
        }
    }
}

/// 애플리케이션 설정을 표현한다. 슬라이더 위치는 저장하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/en-us/de-de/ko-kr)
    pub language: String,
    /// 언어팩 디렉터리 (선택)
    pub language_pack_dir: Option<String>,
    pub preset: Preset,
    /// 지정하면 프리셋 대신 사용한다.
    pub dashboard: Option<DashboardConfig>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            preset: Preset::Standard,
            dashboard: None,
            path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Invalid(#[from] InvalidDashboard),
    /// 기존 파일을 해석할 수 없으면 덮어쓰지 않는다.
    #[error("refusing to overwrite {}: existing file is not a valid config ({source})", path.display())]
    Unreadable {
        path: PathBuf,
        source: Box<ConfigError>,
    },
}

impl Config {
    /// 기본 설정이지만 저장 위치는 `path`로 고정한다.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// 저장 위치. 지정되지 않았으면 config.toml.
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// 사용할 대시보드 구성. 사용자 정의 구성이 있으면 우선한다.
    pub fn dashboard(&self) -> DashboardConfig {
        self.dashboard
            .clone()
            .unwrap_or_else(|| self.preset.dashboard())
    }

    /// TOML 문자열을 해석하고 대시보드 구성을 검증한다.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.dashboard().validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 설정을 불러온 파일(없으면 config.toml)에 저장한다.
    /// 기존 파일이 유효한 설정이 아니면 `Unreadable`을 돌려주고 그대로 둔다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path();
        if path.exists() {
            let existing = fs::read_to_string(&path)?;
            if let Err(e) = Config::from_toml_str(&existing) {
                return Err(ConfigError::Unreadable {
                    path,
                    source: Box::new(e),
                });
            }
        }
        fs::write(&path, self.to_toml_string()?)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본 설정을 만들어 저장한다.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "loading config");
        let mut cfg = Config::from_toml_str(&content)?;
        cfg.path = Some(path.to_path_buf());
        Ok(cfg)
    } else {
        tracing::info!(path = %path.display(), "config not found, writing defaults");
        let cfg = Config::with_path(path);
        cfg.save()?;
        Ok(cfg)
    }
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_from(Path::new(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_consistent() {
        for preset in Preset::ALL {
            preset.dashboard().validate().unwrap();
            assert_eq!(Preset::from_code(preset.code()), Some(preset));
        }
    }

    #[test]
    fn slider_check_rejects_out_of_range() {
        let spec = SliderSpec::new(0.25, 0.3, 0.01, 0.28, 2);
        assert_eq!(spec.check(InputField::PipeDiameter, 0.3).unwrap(), 0.3);
        assert!(spec.check(InputField::PipeDiameter, 0.31).is_err());
        assert!(spec.check(InputField::PipeDiameter, f64::INFINITY).is_err());
    }
}
