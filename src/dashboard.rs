//! 표시 계층에 넘길 차트 모델을 만든다.
//!
//! [`build_chart`]는 구성과 현재 입력만으로 결정되는 순수 함수이며, GUI/CLI는 결과를
//! 그리기만 한다.

use std::ops::RangeInclusive;

use crate::config::{DashboardConfig, LabelPrecision};
use crate::head_loss::{FlowParameters, HeadLossError};
use crate::sampling::{HeadLossCurve, OperatingPoint};

/// 차트 상단에 표시하는 식.
pub const FORMULA_ANNOTATION: &str =
    "h_r = λ·(L/D)·v²/(2g) = λ·(L/D)·(4Q/(πD²))²/(2g) = 8·λ·L·Q²/(g·π²·D⁵)";

/// 운전점 라벨을 기준 곡선 최대값의 이 비율만큼 위로 띄운다.
pub const LABEL_OFFSET_RATIO: f64 = 0.1;

/// 한 번의 상호작용으로 그려질 차트 전체.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub reference: HeadLossCurve,
    pub current: HeadLossCurve,
    pub point: OperatingPoint,
    /// 라벨 좌하단 위치 `[Q, h_r]`
    pub label_anchor: [f64; 2],
    pub label: String,
    pub x_range: RangeInclusive<f64>,
    pub y_range: RangeInclusive<f64>,
    pub formula: Option<&'static str>,
}

/// 구성과 현재 입력으로 차트 모델을 만든다.
pub fn build_chart(
    config: &DashboardConfig,
    params: &FlowParameters,
) -> Result<ChartModel, HeadLossError> {
    params.validate()?;
    let reference = HeadLossCurve::sample(config.reference, config.flow_max, config.sample_count)?;
    let current = HeadLossCurve::sample(params.pipe(), config.flow_max, config.sample_count)?;
    let point = OperatingPoint::evaluate(params)?;
    let label_anchor = [
        point.flow_rate_m3_per_s,
        point.head_loss_m + LABEL_OFFSET_RATIO * reference.max_head_loss(),
    ];
    tracing::debug!(
        q = point.flow_rate_m3_per_s,
        h_r = point.head_loss_m,
        "chart rebuilt"
    );
    Ok(ChartModel {
        label: format_point_label(&point, config.label),
        reference,
        current,
        point,
        label_anchor,
        x_range: 0.0..=config.flow_max,
        y_range: 0.0..=config.head_loss_max,
        formula: config.show_formula.then_some(FORMULA_ANNOTATION),
    })
}

/// `Q = 0.24 m³/s` / `h_r = 8.8 m` 두 줄 라벨.
pub fn format_point_label(point: &OperatingPoint, precision: LabelPrecision) -> String {
    format!(
        "Q = {:.qd$} m³/s\nh_r = {:.hd$} m",
        point.flow_rate_m3_per_s,
        point.head_loss_m,
        qd = precision.flow_decimals,
        hd = precision.head_loss_decimals,
    )
}

impl ChartModel {
    /// 운전점이 고정 y축 범위를 넘어 잘려 보이는지 여부.
    pub fn point_clipped(&self) -> bool {
        !self.y_range.contains(&self.point.head_loss_m)
            || !self.x_range.contains(&self.point.flow_rate_m3_per_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    #[test]
    fn label_uses_configured_precision() {
        let point = OperatingPoint {
            flow_rate_m3_per_s: 0.24,
            head_loss_m: 8.849,
        };
        let two = LabelPrecision {
            flow_decimals: 2,
            head_loss_decimals: 2,
        };
        assert_eq!(format_point_label(&point, two), "Q = 0.24 m³/s\nh_r = 8.85 m");
        let one = LabelPrecision {
            head_loss_decimals: 1,
            ..two
        };
        assert_eq!(format_point_label(&point, one), "Q = 0.24 m³/s\nh_r = 8.8 m");
    }

    #[test]
    fn formula_follows_config_flag() {
        let mut cfg = Preset::Standard.dashboard();
        let params = cfg.default_parameters();
        assert_eq!(build_chart(&cfg, &params).unwrap().formula, Some(FORMULA_ANNOTATION));
        cfg.show_formula = false;
        assert_eq!(build_chart(&cfg, &params).unwrap().formula, None);
    }
}
