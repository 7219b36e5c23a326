use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const APP_TITLE: &str = "general.app_title";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_EDIT: &str = "main_menu.edit";
    pub const MAIN_MENU_CHART: &str = "main_menu.chart";
    pub const MAIN_MENU_PRESET: &str = "main_menu.preset";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const ERROR_RENDER_SKIPPED: &str = "error.render_skipped";

    pub const PARAM_FRICTION: &str = "param.friction";
    pub const PARAM_LENGTH: &str = "param.length";
    pub const PARAM_DIAMETER: &str = "param.diameter";
    pub const PARAM_FLOW_POINT: &str = "param.flow_point";
    pub const PARAMS_HEADING: &str = "param.heading";
    pub const PROMPT_KEEP_CURRENT: &str = "prompt.keep_current";

    pub const CHART_REFERENCE: &str = "chart.reference";
    pub const CHART_CURRENT: &str = "chart.current";
    pub const CHART_POINT: &str = "chart.point";
    pub const CHART_X_AXIS: &str = "chart.x_axis";
    pub const CHART_Y_AXIS: &str = "chart.y_axis";
    pub const CHART_VELOCITY: &str = "chart.velocity";
    pub const CHART_CLIPPED: &str = "chart.clipped";
    pub const CHART_RESET: &str = "chart.reset";

    pub const PRESET_HEADING: &str = "preset.heading";
    pub const PRESET_STANDARD: &str = "preset.standard";
    pub const PRESET_WIDE_DIAMETER: &str = "preset.wide_diameter";
    pub const PRESET_CHANGED: &str = "preset.changed";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_LANGUAGE: &str = "settings.language";
    pub const SETTINGS_PROMPT_LANGUAGE: &str = "settings.prompt_language";
    pub const SETTINGS_SAVE: &str = "settings.save";
    pub const SETTINGS_SAVED: &str = "settings.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    En,
    De,
    Ko,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("de") {
            Language::De
        } else if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드에 따라 번역기를 생성한다. 알 수 없는 코드는 영어로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir.and_then(|dir| load_overrides(dir, lang_code));
        if pack_dir.is_some() && overrides.is_none() {
            tracing::warn!(lang = lang_code, "language pack not found, using built-in strings");
        }
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    /// 번역을 가져온다. 언어팩 → 내장 번역 → 영어 순으로 찾는다.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return v.clone();
        }
        let found = match self.lang {
            Language::En => en(key),
            Language::De => de(key),
            Language::Ko => ko(key),
        };
        found
            .or_else(|| en(key))
            .unwrap_or("[missing translation]")
            .to_string()
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        other if other.starts_with("de") => Some("de-de".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(code) = get_locale().and_then(|loc| normalize_locale_string(&loc)) {
        return Some(code);
    }
    for var in ["LANG", "LC_ALL"] {
        if let Some(code) = std::env::var(var)
            .ok()
            .and_then(|v| normalize_locale_string(&v))
        {
            return Some(code);
        }
    }
    None
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default();
    normalize_lang(lang)
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 로 구성된 플랫/중첩 맵.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., de-de)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., de)
    let (base, _) = lang.split_once(['-', '_'])?;
    try_load(base)
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        APP_TITLE => "Continuous losses after Darcy-Weisbach",
        MAIN_MENU_TITLE => "\n=== Head Loss Explorer ===",
        MAIN_MENU_EDIT => "1) Edit parameters",
        MAIN_MENU_CHART => "2) Show chart",
        MAIN_MENU_PRESET => "3) Switch preset",
        MAIN_MENU_SETTINGS => "4) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        ERROR_INVALID_NUMBER => "Please enter a number.",
        ERROR_RENDER_SKIPPED => "Chart not drawn:",
        PARAMS_HEADING => "Parameters",
        PARAM_FRICTION => "λ (friction coefficient)",
        PARAM_LENGTH => "L (pipe length) [m]",
        PARAM_DIAMETER => "D (diameter) [m]",
        PARAM_FLOW_POINT => "Q (point) [m³/s]",
        PROMPT_KEEP_CURRENT => "(enter keeps current)",
        CHART_REFERENCE => "Reference curve",
        CHART_CURRENT => "Current curve",
        CHART_POINT => "Operating point",
        CHART_X_AXIS => "Flow rate Q [m³/s]",
        CHART_Y_AXIS => "Head loss h_r [m]",
        CHART_VELOCITY => "Velocity v [m/s]",
        CHART_CLIPPED => "Operating point lies outside the fixed axis range.",
        CHART_RESET => "Reset to defaults",
        PRESET_HEADING => "Preset",
        PRESET_STANDARD => "Standard (D 0.25–0.30 m)",
        PRESET_WIDE_DIAMETER => "Wide diameter (D 0.10–0.50 m)",
        PRESET_CHANGED => "Preset changed to:",
        SETTINGS_HEADING => "Settings",
        SETTINGS_LANGUAGE => "Language",
        SETTINGS_PROMPT_LANGUAGE => "Language code (auto/en-us/de-de/ko-kr): ",
        SETTINGS_SAVE => "Save settings",
        SETTINGS_SAVED => "Saved.",
        _ => return None,
    })
}

fn de(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Fehler",
        APP_EXIT => "Programm wird beendet.",
        APP_TITLE => "Kontinuierliche Verluste nach Darcy-Weisbach",
        MAIN_MENU_EDIT => "1) Parameter ändern",
        MAIN_MENU_CHART => "2) Diagramm anzeigen",
        MAIN_MENU_PRESET => "3) Voreinstellung wechseln",
        MAIN_MENU_SETTINGS => "4) Einstellungen",
        MAIN_MENU_EXIT => "0) Beenden",
        PROMPT_MENU_SELECT => "Auswahl: ",
        INVALID_SELECTION_RETRY => "Ungültige Eingabe. Bitte erneut wählen.",
        ERROR_INVALID_NUMBER => "Bitte eine Zahl eingeben.",
        ERROR_RENDER_SKIPPED => "Diagramm nicht gezeichnet:",
        PARAMS_HEADING => "Parameter",
        PARAM_FRICTION => "λ (Reibungsbeiwert)",
        PARAM_LENGTH => "L (Rohrlänge) [m]",
        PARAM_DIAMETER => "D (Durchmesser) [m]",
        PARAM_FLOW_POINT => "Q (Punkt) [m³/s]",
        PROMPT_KEEP_CURRENT => "(Enter behält den Wert)",
        CHART_REFERENCE => "Referenzkurve",
        CHART_CURRENT => "Aktuelle Kurve",
        CHART_POINT => "Betriebspunkt",
        CHART_X_AXIS => "Durchfluss Q [m³/s]",
        CHART_Y_AXIS => "Verlusthöhe h_r [m]",
        CHART_VELOCITY => "Geschwindigkeit v [m/s]",
        CHART_CLIPPED => "Der Betriebspunkt liegt außerhalb des Achsenbereichs.",
        CHART_RESET => "Standardwerte",
        PRESET_HEADING => "Voreinstellung",
        PRESET_STANDARD => "Standard (D 0,25–0,30 m)",
        PRESET_WIDE_DIAMETER => "Großer Durchmesserbereich (D 0,10–0,50 m)",
        PRESET_CHANGED => "Voreinstellung geändert:",
        SETTINGS_HEADING => "Einstellungen",
        SETTINGS_LANGUAGE => "Sprache",
        SETTINGS_PROMPT_LANGUAGE => "Sprachcode (auto/en-us/de-de/ko-kr): ",
        SETTINGS_SAVE => "Einstellungen speichern",
        SETTINGS_SAVED => "Gespeichert.",
        _ => return None,
    })
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        APP_TITLE => "Darcy-Weisbach 연속 손실",
        MAIN_MENU_EDIT => "1) 입력값 변경",
        MAIN_MENU_CHART => "2) 차트 보기",
        MAIN_MENU_PRESET => "3) 프리셋 변경",
        MAIN_MENU_SETTINGS => "4) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        ERROR_INVALID_NUMBER => "숫자를 입력하세요.",
        ERROR_RENDER_SKIPPED => "차트를 그리지 않음:",
        PARAMS_HEADING => "입력값",
        PARAM_FRICTION => "λ (마찰계수)",
        PARAM_LENGTH => "L (배관 길이) [m]",
        PARAM_DIAMETER => "D (내경) [m]",
        PARAM_FLOW_POINT => "Q (운전점) [m³/s]",
        PROMPT_KEEP_CURRENT => "(엔터 시 현재값 유지)",
        CHART_REFERENCE => "기준 곡선",
        CHART_CURRENT => "현재 곡선",
        CHART_POINT => "운전점",
        CHART_X_AXIS => "유량 Q [m³/s]",
        CHART_Y_AXIS => "손실수두 h_r [m]",
        CHART_VELOCITY => "유속 v [m/s]",
        CHART_CLIPPED => "운전점이 고정 축 범위를 벗어났습니다.",
        CHART_RESET => "기본값으로",
        PRESET_HEADING => "프리셋",
        PRESET_STANDARD => "표준 (D 0.25~0.30 m)",
        PRESET_WIDE_DIAMETER => "넓은 내경 (D 0.10~0.50 m)",
        PRESET_CHANGED => "프리셋 변경:",
        SETTINGS_HEADING => "설정",
        SETTINGS_LANGUAGE => "언어",
        SETTINGS_PROMPT_LANGUAGE => "언어 코드 (auto/en-us/de-de/ko-kr): ",
        SETTINGS_SAVE => "설정 저장",
        SETTINGS_SAVED => "저장했습니다.",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn german_labels_match_original_dashboard() {
        let tr = Translator::new("de-de");
        assert_eq!(tr.t(keys::CHART_REFERENCE), "Referenzkurve");
        assert_eq!(tr.t(keys::CHART_X_AXIS), "Durchfluss Q [m³/s]");
    }

    #[test]
    fn missing_german_key_falls_back_to_english() {
        let tr = Translator::new("de");
        assert_eq!(tr.t(keys::MAIN_MENU_TITLE), "\n=== Head Loss Explorer ===");
        assert_eq!(tr.t("no.such.key"), "[missing translation]");
    }

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("de", Some("ko-kr")), "de-de");
        assert_eq!(resolve_language("auto", Some("ko")), "ko-kr");
    }

    #[test]
    fn pack_overrides_then_builtin_then_english() {
        let dir = std::env::temp_dir().join(format!("hle_pack_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        // de-de.toml이 없으므로 기본 코드 de.toml을 읽는다.
        fs::write(dir.join("de.toml"), "[chart]\nreference = \"Bezugskurve\"\n").unwrap();

        let tr = Translator::new_with_pack("de-de", dir.to_str());
        assert_eq!(tr.t(keys::CHART_REFERENCE), "Bezugskurve");
        assert_eq!(tr.t(keys::CHART_CURRENT), "Aktuelle Kurve");
        assert_eq!(tr.t(keys::MAIN_MENU_TITLE), "\n=== Head Loss Explorer ===");

        let missing = Translator::new_with_pack("ko-kr", dir.to_str());
        let builtin = Translator::new("ko-kr");
        assert_eq!(
            missing.t(keys::CHART_REFERENCE),
            builtin.t(keys::CHART_REFERENCE)
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn nested_pack_keys_are_flattened() {
        let map = parse_toml_to_map("[chart]\nreference = \"Ref\"\n").unwrap();
        assert_eq!(map.get("chart.reference").map(String::as_str), Some("Ref"));
    }
}
