//! Configuration loading and validation tests

#[cfg(test)]
mod tests {
    use labcost::Config;
    use labcost::EstimatorError;
    use labcost::core::tables::ReferenceTables;
    use labcost::server::AppState;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for yaml in [
            "llm:\n  temperature: 3.5\n",
            "llm:\n  num_predict: 0\n",
            "llm:\n  endpoint: \"ftp://models.local/generate\"\n",
            "estimator:\n  inflation_rate: 1.5\n",
            "server:\n  max_body_size: 0\n",
            "server:\n  cors:\n    allowed_origins: [\"not an origin\"]\n",
        ] {
            assert!(
                matches!(Config::from_yaml_str(yaml), Err(EstimatorError::Config(_))),
                "accepted: {}",
                yaml
            );
        }
    }

    #[test]
    fn test_env_style_overrides_revalidate() {
        let result = Config::default()
            .apply_overrides(|key| (key == "LABCOST_LLM_ENDPOINT").then(|| "nonsense".to_string()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_state_loads_replacement_tables() {
        let mut tables = ReferenceTables::builtin().unwrap();
        tables.fallback_region = "US East (Ohio)".to_string();
        let tables_file = yaml_file(&serde_yaml::to_string(&tables).unwrap());

        let config_file = yaml_file(&format!(
            "llm:\n  enabled: false\nestimator:\n  tables_path: \"{}\"\n",
            tables_file.path().display()
        ));
        let config = Config::from_file(config_file.path()).await.unwrap();
        let state = AppState::from_config(config).unwrap();

        assert_eq!(state.tables.fallback_region, "US East (Ohio)");
        assert_eq!(state.generator.name(), "disabled");
    }

    #[test]
    fn test_missing_tables_file_is_error() {
        let mut config = Config::default();
        config.llm.enabled = false;
        config.estimator.tables_path = Some("/no/such/tables.yaml".to_string());
        assert!(matches!(
            AppState::from_config(config),
            Err(EstimatorError::Config(_))
        ));
    }
}
