// ABOUTME: Integration tests for settings file discovery and merging.
// ABOUTME: Tests YAML parsing, file lookup order, and CLI precedence.

use ecs_pipeline_deploy::config::*;
use ecs_pipeline_deploy::deploy::{DeployFlags, WaitPolicy};
use ecs_pipeline_deploy::error::Error;
use ecs_pipeline_deploy::types::ImageRef;
use std::fs;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
region: eu-west-1
profile: deploy
delay: 2s
timeout: 10m
wait: true
only_new: true
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.profile.as_deref(), Some("deploy"));
        assert_eq!(settings.delay, Some(Duration::from_secs(2)));
        assert_eq!(settings.timeout, Some(Duration::from_secs(600)));
        assert!(settings.wait);
        assert!(settings.only_new);
    }

    #[test]
    fn parse_empty_mapping_gives_defaults() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = Settings::from_yaml("delay: soon\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn yml_is_preferred_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "region: us-east-1\n").unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_ALT), "region: eu-west-1\n").unwrap();

        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn dot_directory_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".ecs-pipeline-deploy")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), "wait: true\n").unwrap();

        let settings = Settings::discover(dir.path()).unwrap();
        assert!(settings.wait);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yml");

        let err = Settings::resolve(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(p) if p == path));
    }

    #[test]
    fn explicit_file_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "region: us-east-1\n").unwrap();
        let explicit = dir.path().join("ci.yml");
        fs::write(&explicit, "region: ap-southeast-2\n").unwrap();

        let settings = Settings::resolve(Some(&explicit), dir.path()).unwrap();
        assert_eq!(settings.region.as_deref(), Some("ap-southeast-2"));
    }
}

mod merging {
    use super::*;

    #[test]
    fn cli_switches_cannot_turn_settings_off() {
        let file = Settings {
            wait: true,
            only_new: true,
            ..Default::default()
        };
        let merged = file.merge(&Overrides::default());
        assert!(merged.wait);
        assert!(merged.only_new);
    }

    #[test]
    fn request_carries_wait_policy() {
        let settings = Settings {
            timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        }
        .merge(&Overrides {
            wait: true,
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });

        let image = ImageRef::parse("team/app:2").unwrap();
        let flags = DeployFlags {
            force: true,
            redeploy: false,
        };
        let request = settings.request("prod".into(), "app".into(), image.clone(), flags);

        assert_eq!(request.cluster, "prod");
        assert_eq!(request.service, "app");
        assert_eq!(request.image, image);
        assert_eq!(request.flags, flags);
        assert_eq!(
            request.wait,
            Some(WaitPolicy {
                delay: Duration::from_secs(1),
                require_all_new: false,
                timeout: Some(Duration::from_secs(60)),
            })
        );
    }
}
