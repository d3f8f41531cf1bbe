//! Loading-focused tests for configuration
//!
//! Tests for file parsing, environment overrides and the settings-file
//! concurrency source.

#[cfg(test)]
mod loading_tests {
    use std::io::Write;

    use serial_test::serial;

    use crate::{
        collaborators::ConcurrencyConfig,
        config::{
            load::{ENV_MAX_PARALLEL_REQUESTS, ENV_OVERRIDE_POLICY},
            load_toml_file, Config, OverridePolicy, SettingsFile,
        },
        pool::ConcurrencyLimit,
        Error, Result,
    };

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> Result<std::path::PathBuf> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)
            .map_err(|e| Error::io_error(format!("Failed to create test file: {e}")))?;
        file.write_all(body.as_bytes())
            .map_err(|e| Error::io_error(format!("Failed to write test file: {e}")))?;
        Ok(path)
    }

    fn temp_dir() -> Result<tempfile::TempDir> {
        tempfile::tempdir().map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "config.toml", "[concurrency]\nmax_parallel_requests = 6\n")?;

        let layer = load_toml_file(&path)?;
        assert_eq!(layer.concurrency.max_parallel_requests, Some(6));
        assert_eq!(layer.signout.override_policy, None);

        let config = Config::default().merge(layer);
        assert_eq!(config.concurrency.max_parallel_requests, 6);
        assert_eq!(config.signout.override_policy, OverridePolicy::Prompt);
        Ok(())
    }

    #[test]
    fn test_policy_parses_lowercase() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "config.toml", "[signout]\noverride_policy = \"always\"\n")?;
        assert_eq!(
            load_toml_file(&path)?.signout.override_policy,
            Some(OverridePolicy::Always)
        );
        Ok(())
    }

    #[test]
    fn test_project_file_can_restore_defaults_over_global() -> Result<()> {
        let dir = temp_dir()?;
        let global = write_file(
            &dir,
            "global.toml",
            "[concurrency]\nmax_parallel_requests = 8\n\n[signout]\noverride_policy = \"never\"\n",
        )?;
        let project = write_file(
            &dir,
            "project.toml",
            "[concurrency]\nmax_parallel_requests = 4\n\n[signout]\noverride_policy = \"prompt\"\n",
        )?;

        let config = Config::default()
            .merge(load_toml_file(&global)?)
            .merge(load_toml_file(&project)?);
        assert_eq!(config.concurrency.max_parallel_requests, 4);
        assert_eq!(config.signout.override_policy, OverridePolicy::Prompt);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "bad.toml", "[concurrency\nmax_parallel_requests = ")?;
        assert!(matches!(load_toml_file(&path), Err(Error::ParseError(_))));
        Ok(())
    }

    #[test]
    fn test_directory_is_rejected() -> Result<()> {
        let dir = temp_dir()?;
        assert!(matches!(load_toml_file(dir.path()), Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    fn test_settings_file_missing_uses_defaults() -> Result<()> {
        let dir = temp_dir()?;
        let settings = SettingsFile::new(dir.path().join("absent.toml"));
        assert_eq!(settings.max_concurrency()?, 4);
        Ok(())
    }

    #[test]
    fn test_settings_file_rereads_on_every_call() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "live.toml", "[concurrency]\nmax_parallel_requests = 3\n")?;
        let settings = SettingsFile::new(&path);
        assert_eq!(settings.max_concurrency()?, 3);

        write_file(&dir, "live.toml", "[concurrency]\nmax_parallel_requests = 5\n")?;
        assert_eq!(settings.max_concurrency()?, 5);
        Ok(())
    }

    #[test]
    fn test_broken_settings_file_falls_back_to_default_limit() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "broken.toml", "this is = = not toml")?;
        let settings = SettingsFile::new(path);

        assert!(settings.max_concurrency().is_err());
        assert_eq!(ConcurrencyLimit::from_config(&settings).get(), 4);
        Ok(())
    }

    #[test]
    fn test_out_of_range_file_value_is_configuration_error() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(&dir, "zero.toml", "[concurrency]\nmax_parallel_requests = 0\n")?;
        let settings = SettingsFile::new(path);

        let err = settings.max_concurrency().err();
        assert!(err.as_ref().is_some_and(Error::is_configuration));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_env_overrides() -> Result<()> {
        std::env::set_var(ENV_MAX_PARALLEL_REQUESTS, "10");
        std::env::set_var(ENV_OVERRIDE_POLICY, "NEVER");
        let result = Config::default().apply_env_vars();
        std::env::remove_var(ENV_MAX_PARALLEL_REQUESTS);
        std::env::remove_var(ENV_OVERRIDE_POLICY);

        let config = result?;
        assert_eq!(config.concurrency.max_parallel_requests, 10);
        assert_eq!(config.signout.override_policy, OverridePolicy::Never);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_env_rejects_garbage() {
        std::env::set_var(ENV_MAX_PARALLEL_REQUESTS, "lots");
        let result = Config::default().apply_env_vars();
        std::env::remove_var(ENV_MAX_PARALLEL_REQUESTS);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        std::env::set_var(ENV_OVERRIDE_POLICY, "sometimes");
        let result = Config::default().apply_env_vars();
        std::env::remove_var(ENV_OVERRIDE_POLICY);
        assert!(result.is_err());
    }
}
