//! Loading of gameplay rules from disk and command-line overrides.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use tower_defence_core::{FieldPoint, Rules};

/// Builds the session rules from an optional TOML file and overrides.
///
/// Keys missing from the file keep their default values.
pub(crate) fn load_rules(path: Option<&Path>, tick_ms: Option<u64>) -> Result<Rules> {
    let mut rules = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => Rules::default(),
    };

    if let Some(tick_ms) = tick_ms {
        rules.tick_interval = Duration::from_millis(tick_ms);
    }

    rules.validate().context("invalid gameplay rules")?;
    Ok(rules)
}

/// Parses an `x,y` pair into a field position.
pub(crate) fn parse_field_point(value: &str) -> Result<FieldPoint, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but received `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid x coordinate `{x}`: {err}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid y coordinate `{y}`: {err}"))?;
    Ok(FieldPoint::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, process};

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("tower-defence-{}-{name}.toml", process::id()));
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn defaults_apply_without_config() {
        let rules = load_rules(None, None).expect("default rules are valid");
        assert_eq!(rules, Rules::default());
    }

    #[test]
    fn tick_override_replaces_interval() {
        let rules = load_rules(None, Some(25)).expect("valid override");
        assert_eq!(rules.tick_interval, Duration::from_millis(25));
        assert!(load_rules(None, Some(0)).is_err());
    }

    #[test]
    fn tick_override_beyond_maximum_is_rejected() {
        let max_ms = u64::try_from(Rules::MAX_TICK_INTERVAL.as_millis()).expect("fits");
        assert!(load_rules(None, Some(max_ms)).is_ok());
        let error = load_rules(None, Some(max_ms + 1)).expect_err("too long");
        assert!(format!("{error:#}").contains("exceeds the maximum"));
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let path = write_temp("partial", "attack_range = 250\nattack_cooldown = 200\n");
        let rules = load_rules(Some(&path), None).expect("config loads");
        fs::remove_file(&path).expect("remove temp config");

        assert_eq!(rules.attack_range, 250);
        assert_eq!(rules.attack_cooldown, Duration::from_millis(200));
        assert_eq!(rules.field_width, 800);
    }

    #[test]
    fn malformed_file_reports_path() {
        let path = write_temp("malformed", "attack_range = \"far\"\n");
        let error = load_rules(Some(&path), None).expect_err("wrong type must fail");
        fs::remove_file(&path).expect("remove temp config");

        assert!(format!("{error}").contains("failed to parse config file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = env::temp_dir().join("tower-defence-does-not-exist.toml");
        assert!(load_rules(Some(&path), None).is_err());
    }

    #[test]
    fn field_points_parse_with_whitespace_and_signs() {
        assert_eq!(parse_field_point("750,300"), Ok(FieldPoint::new(750, 300)));
        assert_eq!(parse_field_point(" -5 , 12 "), Ok(FieldPoint::new(-5, 12)));
        assert!(parse_field_point("750").is_err());
        assert!(parse_field_point("a,1").is_err());
    }
}
