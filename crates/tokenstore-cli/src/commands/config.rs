use anyhow::Result;

use crate::config::AppConfig;

/// Render the effective configuration as TOML.
pub fn render(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_sections() {
        let rendered = render(&AppConfig::default()).unwrap();
        assert!(rendered.contains("[mongo]"));
        assert!(rendered.contains("[tokens]"));
        assert!(rendered.contains("expire_after = \"1s\""));
        assert!(rendered.contains("level = \"info\""));
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let config = AppConfig::default();
        let parsed: AppConfig = toml::from_str(&render(&config).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
