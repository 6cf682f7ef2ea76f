#[cfg(feature = "clap")]
mod common;

#[cfg(feature = "clap")]
mod mrca {
    use std::path::PathBuf;

    use rohage::structs::{EstimationResult, EstimatorConfig};

    use super::common::{self, TEST_ARMS, TEST_FREQS};

    fn mrca_cmd(
        prefix: &str,
        freq: Option<f64>,
        freq_file: Option<PathBuf>,
        config: EstimatorConfig,
        json: bool,
    ) -> rohage::clap::SubCommand {
        rohage::clap::SubCommand::Mrca {
            args: common::standard_args(TEST_ARMS, prefix),
            log_and_verbosity: common::silent_verbosity(),
            freq,
            freq_file,
            n: None,
            config,
            json,
        }
    }

    #[test]
    fn mrca() {
        let cmd = mrca_cmd("mrca", Some(0.3), None, EstimatorConfig::default(), false);
        rohage::clap::run_cmd(cmd).unwrap();

        let res = std::fs::read_to_string("tests/results/mrca_mrca_gamma_method.txt").unwrap();
        let lines: Vec<_> = res.lines().collect();
        assert_eq!(7, lines.len());
        assert_eq!("Individuals: 20", lines[0]);
        assert_eq!("Chance-sharing correction: 0.00845 M", lines[1]);
        assert_eq!(
            "Mean lengths: left 19.50 cM, right 20.50 cM, corrected total 38.31 cM",
            lines[2]
        );
        assert_eq!("Independent genealogy:", lines[3]);
        assert!(lines[4].starts_with("age: 4.837 95% CI ("));
        assert_eq!("Correlated genealogy:", lines[5]);
        assert!(lines[6].starts_with("age: 2.977 95% CI ("));
        assert!(lines[6].ends_with("rho: 0.789 n*: 1.250"));
    }

    #[test]
    fn mrca_confidence_level() {
        let config = EstimatorConfig {
            confidence: 0.9,
            ..Default::default()
        };
        let cmd = mrca_cmd("level", Some(0.3), None, config, true);
        rohage::clap::run_cmd(cmd).unwrap();

        let res = std::fs::read_to_string("tests/results/level_mrca_gamma_method.txt").unwrap();
        assert!(res.contains("age: 4.837 90% CI ("));

        let file = std::fs::File::open("tests/results/level_mrca_gamma_method.json").unwrap();
        let result: EstimationResult = serde_json::from_reader(file).unwrap();
        assert_eq!(0.9, result.confidence);
    }

    #[test]
    fn mrca_with_frequency_file() {
        let cmd = mrca_cmd(
            "freqfile",
            None,
            Some(PathBuf::from(TEST_FREQS)),
            EstimatorConfig::default(),
            false,
        );
        rohage::clap::run_cmd(cmd).unwrap();

        // The median of the frequency file is 0.3
        let res = std::fs::read_to_string("tests/results/freqfile_mrca_gamma_method.txt").unwrap();
        assert!(res.contains("Chance-sharing correction: 0.00845 M"));
        assert!(res.contains("age: 4.837 95% CI ("));
    }

    #[test]
    fn mrca_json() {
        let config = EstimatorConfig {
            apply_correction: false,
            ..Default::default()
        };
        let cmd = mrca_cmd("json", None, None, config, true);
        rohage::clap::run_cmd(cmd).unwrap();

        let file = std::fs::File::open("tests/results/json_mrca_gamma_method.json").unwrap();
        let result: EstimationResult = serde_json::from_reader(file).unwrap();

        assert_eq!(20, result.n);
        assert_eq!(0.0, result.cs_correction);
        assert_eq!("4.6429", format!("{:.4}", result.independent.tau));
        assert!(result.independent.ci.0 < result.independent.tau);
        assert!(result.independent.tau < result.independent.ci.1);
        assert!(result.correlated.n_star <= 20.0);
    }

    #[test]
    fn mrca_requires_frequency() {
        let cmd = mrca_cmd("nofreq", None, None, EstimatorConfig::default(), false);
        assert!(rohage::clap::run_cmd(cmd).is_err());
    }

    #[test]
    fn mrca_too_many_individuals() {
        let cmd = rohage::clap::SubCommand::Mrca {
            args: common::standard_args(TEST_ARMS, "toomany"),
            log_and_verbosity: common::silent_verbosity(),
            freq: Some(0.3),
            freq_file: None,
            n: Some(21),
            config: EstimatorConfig::default(),
            json: false,
        };
        assert!(rohage::clap::run_cmd(cmd).is_err());
    }
}
