use crate::config::{Config, ConfigError, DashboardConfig};
use crate::head_loss::{FlowParameters, HeadLossError};
use crate::i18n::{self, Translator};
use crate::ui_cli::{self, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 손실수두 계산 오류
    #[error(transparent)]
    HeadLoss(#[from] HeadLossError),
}

/// 대화형 CLI에서 현재 조작 중인 대시보드 상태. 저장하지 않는다.
#[derive(Debug, Clone)]
pub struct Session {
    pub dashboard: DashboardConfig,
    pub params: FlowParameters,
}

impl Session {
    pub fn new(dashboard: DashboardConfig) -> Self {
        let params = dashboard.default_parameters();
        Self { dashboard, params }
    }

    /// 구성을 바꾸고 입력을 새 기본값으로 되돌린다.
    pub fn switch_dashboard(&mut self, dashboard: DashboardConfig) {
        *self = Self::new(dashboard);
    }
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, tr: &mut Translator) -> Result<(), AppError> {
    let mut session = Session::new(config.dashboard());
    loop {
        match ui_cli::main_menu(tr)? {
            MenuChoice::EditParameters => ui_cli::handle_edit_parameters(tr, &mut session)?,
            MenuChoice::ShowChart => ui_cli::handle_show_chart(tr, &session),
            MenuChoice::SwitchPreset => ui_cli::handle_switch_preset(tr, config, &mut session)?,
            MenuChoice::Settings => {
                ui_cli::handle_settings(tr, config)?;
                config.save()?;
                let resolved = i18n::resolve_language(&config.language, None);
                *tr = Translator::new_with_pack(&resolved, config.language_pack_dir.as_deref());
            }
            MenuChoice::Exit => {
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        }
    }
    Ok(())
}
