//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{split_sections, RetryConfig, Section};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_section_order_snapshot() {
        assert_yaml_snapshot!(Section::ALL.to_vec(), @r###"
        - model_stack
        - scene_fit
        - data_moat
        - ux_friction
        - commercial_roi
        - suggestion
        "###);
    }

    #[test]
    fn test_canonical_split_snapshot() {
        let outcome = split_sections(
            "MODEL STACK: uses GPT-4.\nSCENE-FIT: chat assistant.\nDATA MOAT: none.\nUX FRICTION: slow.\nCOMMERCIAL ROI: freemium.\nSUGGESTION: focus on niche vertical.",
        );

        assert_yaml_snapshot!(outcome, @r###"
        response:
          model_stack: uses GPT-4.
          scene_fit: chat assistant.
          data_moat: none.
          ux_friction: slow.
          commercial_roi: freemium.
          suggestion: focus on niche vertical.
        warnings: []
        "###);
    }

    #[test]
    fn test_retry_config_snapshot() {
        assert_yaml_snapshot!(RetryConfig::default(), @r###"
        max_attempts: 2
        backoff:
          secs: 1
          nanos: 0
        "###);
    }
}
