//! Darcy-Weisbach 손실수두 계산 로직을 라이브러리로 분리하여 GUI와 CLI가 같은 코어를 쓴다.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod head_loss;
pub mod i18n;
pub mod sampling;
pub mod ui_cli;

pub use head_loss::{
    compute_head_loss, compute_head_loss_series, FlowParameters, HeadLossError, PipeProperties,
};
