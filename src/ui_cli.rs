use std::io::{self, Write};

use crate::app::{AppError, Session};
use crate::config::{Config, DashboardConfig, Preset, SliderSpec};
use crate::dashboard::{build_chart, ChartModel};
use crate::head_loss::{flow_velocity, FlowParameters, HeadLossError};
use crate::i18n::{keys, Translator};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    EditParameters,
    ShowChart,
    SwitchPreset,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    for key in [
        keys::MAIN_MENU_EDIT,
        keys::MAIN_MENU_CHART,
        keys::MAIN_MENU_PRESET,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        println!("{}", tr.t(key));
    }
    loop {
        let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::EditParameters),
            "2" => return Ok(MenuChoice::ShowChart),
            "3" => return Ok(MenuChoice::SwitchPreset),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 네 가지 입력값을 차례로 받는다. 범위를 벗어나면 다시 묻는다.
pub fn handle_edit_parameters(tr: &Translator, session: &mut Session) -> Result<(), AppError> {
    println!("\n-- {} --", tr.t(keys::PARAMS_HEADING));
    let d = &session.dashboard;
    let p = session.params;
    session.params = FlowParameters::new(
        read_slider(tr, keys::PARAM_FRICTION, &d.friction, p.friction_coefficient)?,
        read_slider(tr, keys::PARAM_LENGTH, &d.length, p.pipe_length_m)?,
        read_slider(tr, keys::PARAM_DIAMETER, &d.diameter, p.pipe_diameter_m)?,
        read_slider(tr, keys::PARAM_FLOW_POINT, &d.flow_point, p.flow_rate_m3_per_s)?,
    );
    Ok(())
}

/// 현재 입력으로 차트를 계산해 표로 출력한다. 계산 오류는 메시지만 보여준다.
pub fn handle_show_chart(tr: &Translator, session: &Session) {
    match build_chart(&session.dashboard, &session.params) {
        Ok(chart) => print!("{}", render_chart(tr, &chart, &session.params, 20)),
        Err(e) => report_skipped(tr, &e),
    }
}

/// 프리셋 메뉴를 처리한다. 사용자 정의 구성이 있으면 프리셋으로 교체된다.
pub fn handle_switch_preset(
    tr: &Translator,
    cfg: &mut Config,
    session: &mut Session,
) -> Result<(), AppError> {
    println!("\n-- {} --", tr.t(keys::PRESET_HEADING));
    for (i, preset) in Preset::ALL.iter().enumerate() {
        println!("{}) {}", i + 1, tr.t(preset_label_key(*preset)));
    }
    let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
    let preset = match sel.trim().parse::<usize>() {
        Ok(n) if (1..=Preset::ALL.len()).contains(&n) => Preset::ALL[n - 1],
        _ => {
            println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
            return Ok(());
        }
    };
    cfg.preset = preset;
    cfg.dashboard = None;
    session.switch_dashboard(cfg.dashboard());
    tracing::info!(preset = preset.code(), "preset switched");
    println!("{} {}", tr.t(keys::PRESET_CHANGED), tr.t(preset_label_key(preset)));
    Ok(())
}

/// 설정 메뉴를 처리한다.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<(), AppError> {
    println!("\n-- {} --", tr.t(keys::SETTINGS_HEADING));
    println!("{}: {}", tr.t(keys::SETTINGS_LANGUAGE), cfg.language);
    let sel = read_line(&tr.t(keys::SETTINGS_PROMPT_LANGUAGE))?;
    if !sel.trim().is_empty() {
        cfg.language = sel.trim().to_string();
    }
    Ok(())
}

pub fn preset_label_key(preset: Preset) -> &'static str {
    match preset {
        Preset::Standard => keys::PRESET_STANDARD,
        Preset::WideDiameter => keys::PRESET_WIDE_DIAMETER,
    }
}

pub fn report_skipped(tr: &Translator, err: &HeadLossError) {
    tracing::warn!(error = %err, "chart rendering skipped");
    eprintln!("{} {err}", tr.t(keys::ERROR_RENDER_SKIPPED));
}

/// 운전점 요약을 문자열로 만든다.
pub fn render_point(tr: &Translator, chart: &ChartModel, params: &FlowParameters) -> String {
    let mut out = String::new();
    let velocity = flow_velocity(params.pipe_diameter_m, params.flow_rate_m3_per_s);
    out.push_str(&format!(
        "{} = {:.3}, {} = {}, {} = {:.3}\n",
        tr.t(keys::PARAM_FRICTION),
        params.friction_coefficient,
        tr.t(keys::PARAM_LENGTH),
        params.pipe_length_m,
        tr.t(keys::PARAM_DIAMETER),
        params.pipe_diameter_m,
    ));
    out.push_str(&format!("{}: {velocity:.4}\n", tr.t(keys::CHART_VELOCITY)));
    out.push_str(&format!("{}:\n{}\n", tr.t(keys::CHART_POINT), chart.label));
    if chart.point_clipped() {
        out.push_str(&format!("{}\n", tr.t(keys::CHART_CLIPPED)));
    }
    out
}

/// 기준/현재 곡선을 `stride` 간격 표로 만든다. 마지막 샘플은 항상 포함한다.
pub fn render_table(tr: &Translator, chart: &ChartModel, stride: usize) -> String {
    let stride = stride.max(1);
    let mut out = format!(
        "{:>12} | {:>16} | {:>16}\n",
        "Q [m³/s]",
        tr.t(keys::CHART_REFERENCE),
        tr.t(keys::CHART_CURRENT)
    );
    let last = chart.current.len().saturating_sub(1);
    let rows = chart
        .reference
        .iter()
        .zip(chart.current.head_losses())
        .enumerate()
        .filter(|(i, _)| i % stride == 0 || *i == last);
    for (_, ((q, h_ref), h_cur)) in rows {
        out.push_str(&format!("{q:>12.4} | {h_ref:>16.3} | {h_cur:>16.3}\n"));
    }
    out
}

/// 운전점 요약 + 곡선 표.
pub fn render_chart(
    tr: &Translator,
    chart: &ChartModel,
    params: &FlowParameters,
    stride: usize,
) -> String {
    let mut out = format!("\n{}\n", tr.t(keys::APP_TITLE));
    if let Some(formula) = chart.formula {
        out.push_str(formula);
        out.push('\n');
    }
    out.push_str(&render_point(tr, chart, params));
    out.push_str(&render_table(tr, chart, stride));
    out
}

fn read_slider(
    tr: &Translator,
    label_key: &str,
    spec: &SliderSpec,
    current: f64,
) -> Result<f64, AppError> {
    let prompt = format!(
        "{} [{:.d$} – {:.d$}] {} {:.d$}: ",
        tr.t(label_key),
        spec.min,
        spec.max,
        tr.t(keys::PROMPT_KEEP_CURRENT),
        current,
        d = spec.decimals,
    );
    loop {
        let s = read_line(&prompt)?;
        if s.trim().is_empty() {
            return Ok(current);
        }
        match s.trim().parse::<f64>() {
            Ok(v) if spec.contains(v) => return Ok(v),
            Ok(_) => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
            Err(_) => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
        }
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

/// 명령행 입력을 검증한다. `strict_ranges`면 슬라이더 범위까지 검사한다.
pub fn checked_parameters(
    dashboard: &DashboardConfig,
    params: FlowParameters,
    strict_ranges: bool,
) -> Result<FlowParameters, HeadLossError> {
    if strict_ranges {
        dashboard.check_inputs(&params)?;
    } else {
        params.validate()?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_always_ends_with_last_sample() {
        let dashboard = Preset::Standard.dashboard();
        let chart = build_chart(&dashboard, &dashboard.default_parameters()).unwrap();
        let tr = Translator::new("en-us");
        let table = render_table(&tr, &chart, 50);
        // header + samples 0, 50, 100, 150, 199
        assert_eq!(table.lines().count(), 6);
        assert!(table.lines().last().unwrap().trim_start().starts_with("0.5000"));
    }

    #[test]
    fn point_summary_contains_label() {
        let dashboard = Preset::Standard.dashboard();
        let params = dashboard.default_parameters();
        let chart = build_chart(&dashboard, &params).unwrap();
        let text = render_point(&Translator::new("en"), &chart, &params);
        assert!(text.contains("Q = 0.24 m³/s"), "{text}");
        assert!(text.contains("h_r = 8.8 m"), "{text}");
    }

    #[test]
    fn strict_ranges_reject_values_outside_sliders() {
        let dashboard = Preset::Standard.dashboard();
        let params = FlowParameters::new(0.04, 80.0, 0.4, 0.2);
        assert!(checked_parameters(&dashboard, params, true).is_err());
        assert!(checked_parameters(&dashboard, params, false).is_ok());
    }
}
