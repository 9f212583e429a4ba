//! Property-based tests for configuration merging.

use super::merger::ConfigMerger;
use super::schema::{Config, OutputFormat};
use super::validator::ConfigValidator;
use proptest::prelude::*;

fn output_format_strategy() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![Just(OutputFormat::Human), Just(OutputFormat::Json)]
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of(1usize..=1000),
        prop::option::of(any::<bool>()),
        prop::option::of(1u64..=600),
        prop::option::of(any::<u64>()),
        prop::option::of(output_format_strategy()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(
            |(progress_interval, send_mail, lock_wait, seed, output_format, autoinit)| Config {
                progress_interval,
                send_mail,
                maximum_lock_wait_seconds: lock_wait,
                default_seed: seed,
                output_format,
                disable_autoinit: autoinit,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Every field set in the higher source wins, every unset one keeps the lower value
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        prop_assert_eq!(result.progress_interval, high.progress_interval.or(low.progress_interval));
        prop_assert_eq!(result.send_mail, high.send_mail.or(low.send_mail));
        prop_assert_eq!(
            result.maximum_lock_wait_seconds,
            high.maximum_lock_wait_seconds.or(low.maximum_lock_wait_seconds)
        );
        prop_assert_eq!(result.default_seed, high.default_seed.or(low.default_seed));
        prop_assert_eq!(result.output_format, high.output_format.or(low.output_format));
        prop_assert_eq!(result.disable_autoinit, high.disable_autoinit.or(low.disable_autoinit));
    }

    // Empty config is identity element for merge
    #[test]
    fn config_merge_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &Config::default());
        prop_assert_eq!(&merged, &config);

        let mut from_empty = Config::default();
        ConfigMerger::merge_into(&mut from_empty, &config);
        prop_assert_eq!(from_empty, config);
    }

    // Merging is associative
    #[test]
    fn config_merge_associative(
        a in config_strategy(),
        b in config_strategy(),
        c in config_strategy()
    ) {
        let mut left = a.clone();
        ConfigMerger::merge_into(&mut left, &b);
        ConfigMerger::merge_into(&mut left, &c);

        let mut b_merge_c = b;
        ConfigMerger::merge_into(&mut b_merge_c, &c);
        let mut right = a;
        ConfigMerger::merge_into(&mut right, &b_merge_c);

        prop_assert_eq!(left, right);
    }

    // Merging valid configs never produces an invalid one
    #[test]
    fn valid_configs_stay_valid_after_merge(a in config_strategy(), b in config_strategy()) {
        prop_assert!(ConfigValidator::validate(&a).is_ok());
        let mut merged = a;
        ConfigMerger::merge_into(&mut merged, &b);
        prop_assert!(ConfigValidator::validate(&merged).is_ok());
    }
}
