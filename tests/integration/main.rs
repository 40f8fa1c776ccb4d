//! Integration tests for mobility-cache

const FP_AB: &str = "43258cff783fe7036d8a43033f830adf";

mod cli_tests {
    use super::FP_AB;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn mobility_cache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("mobility-cache");
        cmd.env("MOBILITY_CACHE_CONFIG", temp.path().join("config.toml"))
            .env("MOBILITY_PROJECT_DATA_FOLDER", temp.path());
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Print the fingerprint"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mobility-cache"));
    }

    #[test]
    fn fingerprint_of_json_file() {
        let temp = TempDir::new().unwrap();
        let inputs = temp.path().join("inputs.json");
        fs::write(&inputs, r#"{"b": 2, "a": 1}"#).unwrap();

        mobility_cache(&temp)
            .args(["fingerprint", "--canonical"])
            .arg(&inputs)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"a":1,"b":2}"#))
            .stdout(predicate::str::contains(FP_AB));
    }

    #[test]
    fn fingerprint_of_invalid_json_fails() {
        let temp = TempDir::new().unwrap();
        let inputs = temp.path().join("inputs.json");
        fs::write(&inputs, "{not json").unwrap();

        mobility_cache(&temp)
            .arg("fingerprint")
            .arg(&inputs)
            .assert()
            .failure()
            .stderr(predicate::str::contains("JSON error"));
    }

    #[test]
    fn status_stale_then_fresh() {
        let temp = TempDir::new().unwrap();

        mobility_cache(&temp)
            .args(["status", "--fingerprint", "abc", "--format", "plain", "result.bin"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stale"));

        fs::write(temp.path().join("abc-result.bin"), "x").unwrap();
        fs::write(temp.path().join("abc-result.inputs-hash"), "abc").unwrap();

        mobility_cache(&temp)
            .args(["status", "--fingerprint", "abc", "--format", "plain", "result.bin"])
            .assert()
            .success()
            .stdout(predicate::str::contains("fresh"));
    }

    #[test]
    fn status_json_named_group() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("hh-p1.parquet"), "x").unwrap();
        fs::write(temp.path().join("hh-p1.inputs-hash"), "hh").unwrap();

        mobility_cache(&temp)
            .args([
                "status",
                "--fingerprint",
                "hh",
                "--format",
                "json",
                "part1=p1.parquet",
                "part2=p2.parquet",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""fresh": false"#))
            .stdout(predicate::str::contains("hh-p2.parquet"));
    }

    #[test]
    fn status_single_path_with_equals() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .args(["status", "--fingerprint", "abc", "--format", "json", "run=2024.bin"])
            .assert()
            .success()
            .stdout(predicate::str::contains("abc-run=2024.bin"));

        mobility_cache(&temp)
            .args([
                "status",
                "--fingerprint",
                "abc",
                "--format",
                "json",
                "--named",
                "run=2024.bin",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""run""#))
            .stdout(predicate::str::contains("abc-2024.bin"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        mobility_cache(&temp)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));

        assert!(temp.path().join("config.toml").exists());
    }
}

mod lifecycle_tests {
    use super::FP_AB;
    use mobility_cache::{Asset, CacheConfig, CacheLocation, InputValue, Node, NodeSpec, NodeState};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// Stands in for a domain producer writing one binary file
    struct ResultAsset {
        created: Cell<usize>,
        cached: Cell<usize>,
    }

    impl ResultAsset {
        fn new() -> Self {
            Self {
                created: Cell::new(0),
                cached: Cell::new(0),
            }
        }
    }

    impl Asset for ResultAsset {
        type Output = Vec<u8>;
        type Error = std::io::Error;

        fn get_cached_asset(&self, location: &CacheLocation) -> std::io::Result<Vec<u8>> {
            self.cached.set(self.cached.get() + 1);
            fs::read(location.paths()[0])
        }

        fn create_and_get_asset(&self, location: &CacheLocation) -> std::io::Result<Vec<u8>> {
            self.created.set(self.created.get() + 1);
            let bytes = vec![1, 2, 3];
            fs::write(location.paths()[0], &bytes)?;
            Ok(bytes)
        }
    }

    #[test]
    fn end_to_end_result_bin() {
        let temp = TempDir::new().unwrap();
        let config = CacheConfig::with_root(temp.path());
        let spec = NodeSpec::new(
            "result",
            InputValue::mapping([("a", 1), ("b", 2)]),
            CacheLocation::single("result.bin"),
        );

        let node = Node::open_or_build(&config, spec.clone(), ResultAsset::new()).unwrap();

        assert_eq!(
            node.cache_path(),
            &CacheLocation::single(temp.path().join(format!("{FP_AB}-result.bin")))
        );
        assert_eq!(node.asset().created.get(), 1);
        assert_eq!(node.asset().cached.get(), 0);
        assert_eq!(node.state(), NodeState::Created);
        assert_eq!(fs::read_to_string(node.hash_path()).unwrap(), FP_AB);

        let again = Node::open_or_build(&config, spec, ResultAsset::new()).unwrap();
        assert_eq!(again.state(), NodeState::Cached);
        assert_eq!(again.asset().created.get(), 0);
        assert_eq!(again.asset().cached.get(), 1);
        assert_eq!(again.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn out_of_band_deletion_detected() {
        let temp = TempDir::new().unwrap();
        let config = CacheConfig::with_root(temp.path());
        let spec = NodeSpec::new(
            "result",
            InputValue::mapping([("a", 1), ("b", 2)]),
            CacheLocation::single("result.bin"),
        );

        let node = Node::open_or_build(&config, spec.clone(), ResultAsset::new()).unwrap();
        assert!(!node.is_update_needed());

        fs::remove_file(node.cache_path().paths()[0]).unwrap();
        assert!(node.is_update_needed());

        let rebuilt = Node::open_or_build(&config, spec, ResultAsset::new()).unwrap();
        assert_eq!(rebuilt.state(), NodeState::Created);
    }
}
