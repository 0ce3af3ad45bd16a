//! Snapshot tests for the Gemini client

#[cfg(test)]
mod snapshot_tests {
    use crate::{GeminiClient, GeminiConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot_hides_key() {
        let config = GeminiConfig::new("secret-key-never-serialized");

        assert_yaml_snapshot!(config, @r###"
        model: gemini-2.5-flash-lite
        api_url: "https://generativelanguage.googleapis.com"
        timeout_secs: 60
        max_output_tokens: 8192
        "###);
    }

    #[test]
    fn test_model_constants() {
        assert_yaml_snapshot!(GeminiClient::GEMINI_2_5_FLASH_LITE, @"gemini-2.5-flash-lite");
        assert_yaml_snapshot!(GeminiClient::GEMINI_2_5_FLASH, @"gemini-2.5-flash");
        assert_yaml_snapshot!(GeminiClient::GEMINI_2_5_PRO, @"gemini-2.5-pro");
    }
}
