use anyhow::anyhow;
use taskdeck_client::ManualScheme;
use taskdeck_shared::EffectiveTheme;
use tracing::debug;

use crate::config::Config;

/// Terminals give no change notifications, so the scheme is read once at
/// startup: `theme.system` pins it, `auto` inspects `COLORFGBG`.
#[tracing::instrument(skip(cfg))]
pub fn system_scheme(cfg: &Config) -> anyhow::Result<ManualScheme> {
    let setting = cfg
        .get("theme.system")
        .unwrap_or_else(|| "auto".to_string());

    let theme = match setting.trim().to_ascii_lowercase().as_str() {
        "light" => EffectiveTheme::Light,
        "dark" => EffectiveTheme::Dark,
        "auto" => {
            let colorfgbg = std::env::var("COLORFGBG").ok();
            scheme_from_colorfgbg(colorfgbg.as_deref()).unwrap_or_default()
        }
        other => return Err(anyhow!("invalid theme.system setting: {other}")),
    };

    debug!(%theme, setting = %setting, "terminal color scheme");
    Ok(ManualScheme::new(theme))
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); the last field is the
/// background palette index.
pub fn scheme_from_colorfgbg(value: Option<&str>) -> Option<EffectiveTheme> {
    let background: u8 = value?.rsplit(';').next()?.trim().parse().ok()?;
    let dark = matches!(background, 0..=6 | 8);
    Some(EffectiveTheme::from_prefers_dark(dark))
}

#[cfg(test)]
mod tests {
    use taskdeck_client::SystemScheme;

    use super::*;

    #[test]
    fn colorfgbg_background_decides_scheme() {
        assert_eq!(
            scheme_from_colorfgbg(Some("15;0")),
            Some(EffectiveTheme::Dark)
        );
        assert_eq!(
            scheme_from_colorfgbg(Some("0;default;15")),
            Some(EffectiveTheme::Light)
        );
        assert_eq!(scheme_from_colorfgbg(Some("garbage")), None);
        assert_eq!(scheme_from_colorfgbg(None), None);
    }

    #[test]
    fn pinned_setting_wins() {
        let mut cfg = Config::default();
        cfg.apply_overrides([("theme.system".to_string(), "dark".to_string())]);
        let scheme = system_scheme(&cfg).expect("valid setting");
        assert_eq!(scheme.current(), EffectiveTheme::Dark);

        cfg.apply_overrides([("theme.system".to_string(), "sepia".to_string())]);
        assert!(system_scheme(&cfg).is_err());
    }
}
