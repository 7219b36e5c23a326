//! Darcy-Weisbach 연속 손실수두 계산.
//!
//! 모든 함수는 순수 함수이며 내부 상태를 갖지 않는다. 입력은 SI 단위(m, m3/s)만 다룬다.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// 중력가속도 [m/s2]. 설정으로 바꿀 수 없는 고정값이다.
pub const GRAVITY_M_PER_S2: f64 = 9.81;

/// 검증 대상 입력 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    FrictionCoefficient,
    PipeLength,
    PipeDiameter,
    FlowRate,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputField::FrictionCoefficient => "friction coefficient λ",
            InputField::PipeLength => "pipe length L",
            InputField::PipeDiameter => "pipe diameter D",
            InputField::FlowRate => "flow rate Q",
        };
        f.write_str(name)
    }
}

/// 손실수두 계산 오류.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeadLossError {
    /// 내경이 0 이하이면 유속 계산이 정의되지 않는다.
    #[error("pipe diameter must be greater than zero (got {diameter_m} m)")]
    Domain { diameter_m: f64 },
    /// 숫자가 아니거나 허용 범위를 벗어난 입력.
    #[error("invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: InputField,
        value: f64,
        reason: &'static str,
    },
    /// 입력은 유효하지만 결과가 유한한 f64로 표현되지 않는다 (내경이 극단적으로 작은 경우 등).
    #[error("head loss is not representable for D = {diameter_m} m, Q = {flow_rate_m3_per_s} m³/s")]
    NotFinite {
        diameter_m: f64,
        flow_rate_m3_per_s: f64,
    },
}

impl HeadLossError {
    pub(crate) fn invalid(field: InputField, value: f64, reason: &'static str) -> Self {
        HeadLossError::InvalidInput {
            field,
            value,
            reason,
        }
    }
}

/// 유량을 제외한 배관 조건. 유량 스윕 시 고정되는 부분이다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeProperties {
    /// 마찰계수 λ [-]
    pub friction_coefficient: f64,
    /// 배관 길이 [m]
    pub pipe_length_m: f64,
    /// 배관 내경 [m]
    pub pipe_diameter_m: f64,
}

/// 한 번의 평가에 쓰이는 네 가지 입력값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowParameters {
    /// 마찰계수 λ [-]
    pub friction_coefficient: f64,
    /// 배관 길이 [m]
    pub pipe_length_m: f64,
    /// 배관 내경 [m]
    pub pipe_diameter_m: f64,
    /// 체적 유량 [m3/s]
    pub flow_rate_m3_per_s: f64,
}

impl PipeProperties {
    pub fn new(friction_coefficient: f64, pipe_length_m: f64, pipe_diameter_m: f64) -> Self {
        Self {
            friction_coefficient,
            pipe_length_m,
            pipe_diameter_m,
        }
    }

    pub fn with_flow_rate(self, flow_rate_m3_per_s: f64) -> FlowParameters {
        FlowParameters {
            friction_coefficient: self.friction_coefficient,
            pipe_length_m: self.pipe_length_m,
            pipe_diameter_m: self.pipe_diameter_m,
            flow_rate_m3_per_s,
        }
    }

    /// λ, L, D를 검증한다. D ≤ 0은 Domain 오류, 음수/비유한값은 InvalidInput.
    pub fn validate(&self) -> Result<(), HeadLossError> {
        check_non_negative(InputField::FrictionCoefficient, self.friction_coefficient)?;
        check_non_negative(InputField::PipeLength, self.pipe_length_m)?;
        check_diameter(self.pipe_diameter_m)
    }

    /// 주어진 유량에서의 손실수두 [m].
    pub fn head_loss_at(&self, flow_rate_m3_per_s: f64) -> Result<f64, HeadLossError> {
        self.with_flow_rate(flow_rate_m3_per_s).head_loss()
    }
}

impl FlowParameters {
    pub fn new(
        friction_coefficient: f64,
        pipe_length_m: f64,
        pipe_diameter_m: f64,
        flow_rate_m3_per_s: f64,
    ) -> Self {
        Self {
            friction_coefficient,
            pipe_length_m,
            pipe_diameter_m,
            flow_rate_m3_per_s,
        }
    }

    pub fn pipe(&self) -> PipeProperties {
        PipeProperties::new(
            self.friction_coefficient,
            self.pipe_length_m,
            self.pipe_diameter_m,
        )
    }

    pub fn validate(&self) -> Result<(), HeadLossError> {
        self.pipe().validate()?;
        check_non_negative(InputField::FlowRate, self.flow_rate_m3_per_s)
    }

    /// 평균 유속 v = 4Q/(πD²) [m/s].
    pub fn velocity(&self) -> Result<f64, HeadLossError> {
        self.validate()?;
        Ok(flow_velocity(self.pipe_diameter_m, self.flow_rate_m3_per_s))
    }

    /// 손실수두 h_r [m].
    pub fn head_loss(&self) -> Result<f64, HeadLossError> {
        compute_head_loss(
            self.friction_coefficient,
            self.pipe_length_m,
            self.pipe_diameter_m,
            self.flow_rate_m3_per_s,
        )
    }
}

fn check_non_negative(field: InputField, value: f64) -> Result<(), HeadLossError> {
    if !value.is_finite() {
        return Err(HeadLossError::invalid(field, value, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(HeadLossError::invalid(field, value, "must not be negative"));
    }
    Ok(())
}

fn check_diameter(diameter_m: f64) -> Result<(), HeadLossError> {
    if !diameter_m.is_finite() {
        return Err(HeadLossError::invalid(
            InputField::PipeDiameter,
            diameter_m,
            "must be a finite number",
        ));
    }
    if diameter_m <= 0.0 {
        return Err(HeadLossError::Domain { diameter_m });
    }
    Ok(())
}

/// 원형 단면 평균 유속 v = 4Q/(πD²). 검증하지 않는다.
pub fn flow_velocity(pipe_diameter_m: f64, flow_rate_m3_per_s: f64) -> f64 {
    4.0 * flow_rate_m3_per_s / (PI * pipe_diameter_m.powi(2))
}

// 연산 순서는 ((λ·(L/D))·v²)/(2g)로 고정한다.
fn head_loss_unchecked(lambda: f64, length_m: f64, diameter_m: f64, flow_m3_s: f64) -> f64 {
    let v = flow_velocity(diameter_m, flow_m3_s);
    lambda * (length_m / diameter_m) * v.powi(2) / (2.0 * GRAVITY_M_PER_S2)
}

// D²가 0으로 언더플로하거나 결과가 넘치면 NaN/∞가 나오므로 여기서 걸러낸다.
fn finite_head_loss(
    lambda: f64,
    length_m: f64,
    diameter_m: f64,
    flow_m3_s: f64,
) -> Result<f64, HeadLossError> {
    let h = head_loss_unchecked(lambda, length_m, diameter_m, flow_m3_s);
    if h.is_finite() {
        Ok(h)
    } else {
        Err(HeadLossError::NotFinite {
            diameter_m,
            flow_rate_m3_per_s: flow_m3_s,
        })
    }
}

/// Darcy-Weisbach 손실수두 h_r = λ·(L/D)·v²/(2g) [m].
pub fn compute_head_loss(
    friction_coefficient: f64,
    pipe_length_m: f64,
    pipe_diameter_m: f64,
    flow_rate_m3_per_s: f64,
) -> Result<f64, HeadLossError> {
    let params = FlowParameters::new(
        friction_coefficient,
        pipe_length_m,
        pipe_diameter_m,
        flow_rate_m3_per_s,
    );
    params.validate()?;
    finite_head_loss(
        friction_coefficient,
        pipe_length_m,
        pipe_diameter_m,
        flow_rate_m3_per_s,
    )
}

/// 여러 유량에 대한 손실수두. 결과는 입력 순서와 같은 인덱스를 갖는다.
pub fn compute_head_loss_series(
    friction_coefficient: f64,
    pipe_length_m: f64,
    pipe_diameter_m: f64,
    flow_rates_m3_per_s: &[f64],
) -> Result<Vec<f64>, HeadLossError> {
    PipeProperties::new(friction_coefficient, pipe_length_m, pipe_diameter_m).validate()?;
    flow_rates_m3_per_s
        .iter()
        .map(|&q| {
            check_non_negative(InputField::FlowRate, q)?;
            finite_head_loss(friction_coefficient, pipe_length_m, pipe_diameter_m, q)
        })
        .collect()
}

/// 정리된 폐형식 h_r = 8λLQ²/(gπ²D⁵). 교차 검증용이며 입력을 검증하지 않는다.
pub fn head_loss_closed_form(
    friction_coefficient: f64,
    pipe_length_m: f64,
    pipe_diameter_m: f64,
    flow_rate_m3_per_s: f64,
) -> f64 {
    8.0 * friction_coefficient * pipe_length_m * flow_rate_m3_per_s.powi(2)
        / (GRAVITY_M_PER_S2 * PI.powi(2) * pipe_diameter_m.powi(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flow_gives_zero_loss() {
        let h = compute_head_loss(0.04, 80.0, 0.28, 0.0).unwrap();
        assert_eq!(h, 0.0);
    }

    #[test]
    fn velocity_matches_hand_calculation() {
        let v = FlowParameters::new(0.03, 30.0, 0.3, 0.25).velocity().unwrap();
        assert!((v - 3.5368).abs() < 1e-4, "v={v}");
    }

    #[test]
    fn negative_diameter_is_domain_error() {
        let err = compute_head_loss(0.04, 80.0, -0.1, 0.2).unwrap_err();
        assert_eq!(err, HeadLossError::Domain { diameter_m: -0.1 });
    }

    #[test]
    fn nan_flow_is_rejected() {
        let err = compute_head_loss(0.04, 80.0, 0.28, f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            HeadLossError::InvalidInput {
                field: InputField::FlowRate,
                ..
            }
        ));
    }

    #[test]
    fn series_rejects_a_single_bad_sample() {
        let err = compute_head_loss_series(0.04, 80.0, 0.28, &[0.1, -0.2, 0.3]).unwrap_err();
        assert!(matches!(
            err,
            HeadLossError::InvalidInput {
                field: InputField::FlowRate,
                ..
            }
        ));
    }

    #[test]
    fn series_is_co_indexed_with_scalar_calls() {
        let flows = [0.0, 0.1, 0.2, 0.35];
        let series = compute_head_loss_series(0.02, 45.0, 0.27, &flows).unwrap();
        assert_eq!(series.len(), flows.len());
        for (q, h) in flows.iter().zip(&series) {
            assert_eq!(*h, compute_head_loss(0.02, 45.0, 0.27, *q).unwrap());
        }
    }

    #[test]
    fn underflowing_diameter_is_not_reported_as_a_value() {
        for (lambda, q) in [(0.04, 0.0), (0.0, 0.1), (0.04, 0.1)] {
            let err = compute_head_loss(lambda, 80.0, 1e-200, q).unwrap_err();
            assert!(matches!(err, HeadLossError::NotFinite { .. }), "{err:?}");
        }
        let err = compute_head_loss_series(0.04, 80.0, 1e-200, &[0.0, 0.1]).unwrap_err();
        assert!(matches!(err, HeadLossError::NotFinite { .. }));
    }

    #[test]
    fn error_message_names_the_field() {
        let err = compute_head_loss(-0.01, 80.0, 0.28, 0.1).unwrap_err();
        assert!(err.to_string().contains("friction coefficient"), "{err}");
    }
}
