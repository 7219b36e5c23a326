//! 차트용 유량 샘플링과 곡선/운전점 생성.

use crate::head_loss::{compute_head_loss_series, FlowParameters, HeadLossError, PipeProperties};

/// 곡선 하나에 쓰는 기본 샘플 수.
pub const DEFAULT_SAMPLE_COUNT: usize = 200;

/// 설정으로 허용하는 곡선당 최대 샘플 수.
pub const MAX_SAMPLE_COUNT: usize = 10_000;

/// `[start, end]` 구간을 `count`개로 균등 분할한다. 끝점을 포함하며 마지막 값은 정확히 `end`이다.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = end;
            out
        }
    }
}

/// 유량-손실수두 곡선. 두 벡터는 항상 같은 길이이며 같은 인덱스끼리 대응한다.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadLossCurve {
    flow_rates: Vec<f64>,
    head_losses: Vec<f64>,
}

impl HeadLossCurve {
    /// `[0, q_max]` 구간을 `count`개 샘플로 평가한다.
    pub fn sample(
        pipe: PipeProperties,
        q_max_m3_per_s: f64,
        count: usize,
    ) -> Result<Self, HeadLossError> {
        let flow_rates = linspace(0.0, q_max_m3_per_s, count);
        Self::evaluate(pipe, flow_rates)
    }

    /// 임의의 유량 목록을 평가한다.
    pub fn evaluate(pipe: PipeProperties, flow_rates: Vec<f64>) -> Result<Self, HeadLossError> {
        let head_losses = compute_head_loss_series(
            pipe.friction_coefficient,
            pipe.pipe_length_m,
            pipe.pipe_diameter_m,
            &flow_rates,
        )?;
        Ok(Self {
            flow_rates,
            head_losses,
        })
    }

    pub fn flow_rates(&self) -> &[f64] {
        &self.flow_rates
    }

    pub fn head_losses(&self) -> &[f64] {
        &self.head_losses
    }

    pub fn len(&self) -> usize {
        self.flow_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flow_rates.is_empty()
    }

    /// (Q, h_r) 쌍을 순서대로 돌려준다.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.flow_rates
            .iter()
            .copied()
            .zip(self.head_losses.iter().copied())
    }

    /// 플롯 라이브러리에 바로 넘길 수 있는 `[x, y]` 목록.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.iter().map(|(q, h)| [q, h]).collect()
    }

    /// 최대 손실수두. 빈 곡선이면 0.
    pub fn max_head_loss(&self) -> f64 {
        self.head_losses.iter().copied().fold(0.0, f64::max)
    }

    /// 샘플 사이를 선형 보간한다. 샘플 구간 밖이면 None.
    pub fn interpolate(&self, flow_rate_m3_per_s: f64) -> Option<f64> {
        let q = flow_rate_m3_per_s;
        let idx = self.flow_rates.partition_point(|&x| x < q);
        if idx < self.len() && self.flow_rates[idx] == q {
            return Some(self.head_losses[idx]);
        }
        if idx == 0 || idx >= self.len() {
            return None;
        }
        let (q0, q1) = (self.flow_rates[idx - 1], self.flow_rates[idx]);
        let (h0, h1) = (self.head_losses[idx - 1], self.head_losses[idx]);
        let ratio = (q - q0) / (q1 - q0);
        Some(h0 + (h1 - h0) * ratio)
    }
}

/// 차트에 강조 표시되는 단일 운전점.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub flow_rate_m3_per_s: f64,
    pub head_loss_m: f64,
}

impl OperatingPoint {
    pub fn evaluate(params: &FlowParameters) -> Result<Self, HeadLossError> {
        Ok(Self {
            flow_rate_m3_per_s: params.flow_rate_m3_per_s,
            head_loss_m: params.head_loss()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let xs = linspace(0.0, 0.5, DEFAULT_SAMPLE_COUNT);
        assert_eq!(xs.len(), 200);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[199], 0.5);
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn interpolate_hits_samples_exactly() {
        let curve = HeadLossCurve::sample(PipeProperties::new(0.04, 80.0, 0.28), 0.5, 11).unwrap();
        assert_eq!(curve.interpolate(0.0), Some(0.0));
        assert_eq!(curve.interpolate(0.5), Some(curve.head_losses()[10]));
        assert_eq!(curve.interpolate(0.6), None);
        assert_eq!(curve.interpolate(-0.1), None);
    }

    #[test]
    fn empty_curve_has_zero_max() {
        let curve = HeadLossCurve::sample(PipeProperties::new(0.04, 80.0, 0.28), 0.5, 0).unwrap();
        assert!(curve.is_empty());
        assert_eq!(curve.max_head_loss(), 0.0);
    }
}
