#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 대시보드 진입점.

use std::path::PathBuf;

use clap::Parser;
use eframe::{egui, App, Frame};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text};
use head_loss_explorer::{
    config::{self, DashboardConfig, Preset, SliderSpec},
    dashboard::{build_chart, ChartModel},
    head_loss::{FlowParameters, HeadLossError},
    i18n::{self, keys},
    ui_cli::preset_label_key,
};

#[derive(Parser)]
#[command(name = "head_loss_explorer", about = "Darcy-Weisbach head loss dashboard")]
struct GuiArgs {
    /// Language: auto, en-us, de-de, ko-kr
    #[arg(long, short = 'L')]
    lang: Option<String>,
    /// Dashboard preset (standard, wide-diameter)
    #[arg(long)]
    preset: Option<String>,
    /// Settings file (default: config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt::init();
    let args = GuiArgs::parse();

    let loaded = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    };
    let (mut app_cfg, load_warning) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            tracing::warn!(error = %e, "config load failed, using defaults");
            let path = args
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));
            (config::Config::with_path(path), Some(e.to_string()))
        }
    };
    if let Some(lang_cli) = args.lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }
    if let Some(code) = args.preset.as_deref() {
        match Preset::from_code(code) {
            Some(preset) => {
                app_cfg.preset = preset;
                app_cfg.dashboard = None;
            }
            None => tracing::warn!(preset = code, "unknown preset, keeping configured one"),
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 680.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Head Loss Explorer",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            let mut app = GuiApp::new(app_cfg);
            app.load_warning = load_warning;
            Box::new(app)
        }),
    )
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    lang_input: String,
    settings_status: Option<String>,
    /// 설정 파일을 읽지 못했을 때의 오류. 설정 창에 계속 표시한다.
    load_warning: Option<String>,
    show_settings_modal: bool,
    dashboard: DashboardConfig,
    params: FlowParameters,
    chart: Result<ChartModel, HeadLossError>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        tracing::info!(lang = %lang_code, preset = config.preset.code(), "GUI started");
        let dashboard = config.dashboard();
        let params = dashboard.default_parameters();
        let chart = build_chart(&dashboard, &params);
        Self {
            lang_input: config.language.clone(),
            config,
            tr,
            settings_status: None,
            load_warning: None,
            show_settings_modal: false,
            dashboard,
            params,
            chart,
        }
    }

    /// 입력이 바뀔 때마다 차트 전체를 다시 계산한다.
    fn recompute(&mut self) {
        self.chart = build_chart(&self.dashboard, &self.params);
        if let Err(e) = &self.chart {
            tracing::warn!(error = %e, "chart rendering skipped");
        }
    }

    fn apply_preset(&mut self, preset: Preset) {
        self.config.preset = preset;
        self.config.dashboard = None;
        self.dashboard = preset.dashboard();
        self.reset_parameters();
    }

    fn reset_parameters(&mut self) {
        self.params = self.dashboard.default_parameters();
        self.recompute();
    }

    fn ui_parameters(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        ui.heading(tr.t(keys::PARAMS_HEADING));
        ui.add_space(8.0);

        let d = &self.dashboard;
        let p = &mut self.params;
        let mut changed = false;
        for (key, value, spec) in [
            (keys::PARAM_FRICTION, &mut p.friction_coefficient, &d.friction),
            (keys::PARAM_LENGTH, &mut p.pipe_length_m, &d.length),
            (keys::PARAM_DIAMETER, &mut p.pipe_diameter_m, &d.diameter),
            (keys::PARAM_FLOW_POINT, &mut p.flow_rate_m3_per_s, &d.flow_point),
        ] {
            changed |= param_slider(ui, &tr.t(key), value, spec);
        }
        if changed {
            self.recompute();
        }

        ui.separator();
        ui.label(tr.t(keys::PRESET_HEADING));
        let selected = if self.config.dashboard.is_some() {
            "custom".to_string()
        } else {
            tr.t(preset_label_key(self.config.preset))
        };
        let mut picked = None;
        egui::ComboBox::from_id_source("preset_choice")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for preset in Preset::ALL {
                    let is_current =
                        self.config.dashboard.is_none() && self.config.preset == preset;
                    if ui
                        .selectable_label(is_current, tr.t(preset_label_key(preset)))
                        .clicked()
                    {
                        picked = Some(preset);
                    }
                }
            });
        if let Some(preset) = picked {
            self.apply_preset(preset);
        }
        if ui.button(tr.t(keys::CHART_RESET)).clicked() {
            self.reset_parameters();
        }
    }

    fn ui_chart(&self, ui: &mut egui::Ui) {
        let tr = &self.tr;
        ui.heading(tr.t(keys::APP_TITLE));
        let chart = match &self.chart {
            Ok(chart) => chart,
            Err(e) => {
                ui.colored_label(
                    egui::Color32::RED,
                    format!("{} {e}", tr.t(keys::ERROR_RENDER_SKIPPED)),
                );
                return;
            }
        };
        if let Some(formula) = chart.formula {
            ui.label(egui::RichText::new(formula).size(16.0));
        }
        if chart.point_clipped() {
            ui.label(egui::RichText::new(tr.t(keys::CHART_CLIPPED)).italics());
        }
        ui.add_space(4.0);

        let reference_color = ui.visuals().strong_text_color();
        let bounds = PlotBounds::from_min_max(
            [*chart.x_range.start(), *chart.y_range.start()],
            [*chart.x_range.end(), *chart.y_range.end()],
        );
        Plot::new("head_loss_plot")
            .legend(Legend::default())
            .x_axis_label(tr.t(keys::CHART_X_AXIS))
            .y_axis_label(tr.t(keys::CHART_Y_AXIS))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(bounds);
                plot_ui.line(
                    Line::new(PlotPoints::from(chart.reference.points()))
                        .name(tr.t(keys::CHART_REFERENCE))
                        .color(reference_color)
                        .style(LineStyle::dashed_loose()),
                );
                plot_ui.line(
                    Line::new(PlotPoints::from(chart.current.points()))
                        .name(tr.t(keys::CHART_CURRENT))
                        .color(egui::Color32::BLUE)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(vec![[chart.point.flow_rate_m3_per_s, chart.point.head_loss_m]])
                        .name(tr.t(keys::CHART_POINT))
                        .color(egui::Color32::RED)
                        .radius(5.0),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(chart.label_anchor[0], chart.label_anchor[1]),
                        egui::RichText::new(&chart.label).color(egui::Color32::RED).size(14.0),
                    )
                    .anchor(egui::Align2::LEFT_BOTTOM),
                );
            });
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let tr = self.tr.clone();
        let mut open = self.show_settings_modal;
        let mut save_clicked = false;
        let mut picked = None;
        egui::Window::new(tr.t(keys::SETTINGS_HEADING))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(tr.t(keys::SETTINGS_LANGUAGE));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(self.lang_input.clone())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.lang_input, "auto".into(), "auto");
                        ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                        ui.selectable_value(&mut self.lang_input, "de-de".into(), "Deutsch");
                        ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                    });
                ui.label(tr.t(keys::PRESET_HEADING));
                egui::ComboBox::from_id_source("settings_preset_choice")
                    .selected_text(tr.t(preset_label_key(self.config.preset)))
                    .show_ui(ui, |ui| {
                        for preset in Preset::ALL {
                            let label = tr.t(preset_label_key(preset));
                            if ui
                                .selectable_label(self.config.preset == preset, label)
                                .clicked()
                            {
                                picked = Some(preset);
                            }
                        }
                    });
                if let Some(warning) = &self.load_warning {
                    ui.colored_label(
                        egui::Color32::DARK_RED,
                        format!("{} {warning}", tr.t(keys::ERROR_PREFIX)),
                    );
                }
                if ui.button(tr.t(keys::SETTINGS_SAVE)).clicked() {
                    save_clicked = true;
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg.as_str());
                }
            });
        self.show_settings_modal = open;
        if let Some(preset) = picked {
            self.apply_preset(preset);
        }
        if save_clicked {
            self.save_settings();
        }
    }

    fn save_settings(&mut self) {
        self.config.language = self.lang_input.clone();
        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr =
            i18n::Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        self.settings_status = Some(match self.config.save() {
            Ok(()) => self.tr.t(keys::SETTINGS_SAVED),
            Err(e) => {
                tracing::error!(error = %e, "settings save failed");
                format!("{} {e}", self.tr.t(keys::ERROR_PREFIX))
            }
        });
    }
}

fn param_slider(ui: &mut egui::Ui, label: &str, value: &mut f64, spec: &SliderSpec) -> bool {
    ui.label(label);
    let resp = ui.add(
        egui::Slider::new(value, spec.min..=spec.max)
            .step_by(spec.step)
            .fixed_decimals(spec.decimals),
    );
    ui.add_space(6.0);
    resp.changed()
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Head Loss Explorer");
                ui.separator();
                if ui.button(self.tr.t(keys::SETTINGS_HEADING)).clicked() {
                    self.show_settings_modal = true;
                }
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        egui::SidePanel::left("parameters")
            .resizable(true)
            .min_width(220.0)
            .default_width(260.0)
            .show(ctx, |ui| self.ui_parameters(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.ui_chart(ui));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_preset_defaults() {
        let app = GuiApp::new(config::Config::default());
        assert_eq!(app.params, Preset::Standard.dashboard().default_parameters());
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(*chart.y_range.end(), 50.0);
        assert_eq!(chart.current.len(), 200);
    }

    #[test]
    fn preset_switch_resets_parameters() {
        let mut app = GuiApp::new(config::Config::default());
        app.params.pipe_length_m = 10.0;
        app.apply_preset(Preset::WideDiameter);
        assert_eq!(app.params.pipe_length_m, 30.0);
        assert_eq!(app.params.pipe_diameter_m, 0.3);
        assert_eq!(*app.chart.as_ref().unwrap().x_range.end(), 0.4);
    }

    #[test]
    fn failed_load_keeps_the_requested_file() {
        let dir = std::env::temp_dir().join(format!("hle_gui_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "preset = [").unwrap();

        let mut app = GuiApp::new(config::Config::with_path(&path));
        app.lang_input = "de-de".into();
        app.save_settings();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "preset = [");
        let status = app.settings_status.as_deref().unwrap();
        assert!(status.contains("refusing to overwrite"), "{status}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn settings_save_persists_preset() {
        let dir = std::env::temp_dir().join(format!("hle_gui_preset_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut app = GuiApp::new(config::Config::with_path(&path));
        app.apply_preset(Preset::WideDiameter);
        app.save_settings();

        let saved = config::load_from(&path).unwrap();
        assert_eq!(saved.preset, Preset::WideDiameter);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_diameter_skips_chart() {
        let mut app = GuiApp::new(config::Config::default());
        app.params.pipe_diameter_m = 0.0;
        app.recompute();
        assert_eq!(
            app.chart.unwrap_err(),
            HeadLossError::Domain { diameter_m: 0.0 }
        );
    }
}
