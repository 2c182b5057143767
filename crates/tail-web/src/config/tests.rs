#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_match_demo_room() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.feed.port, 9475);
        assert_eq!(config.feed.kind, FeedKind::Emulator);
        assert_eq!(config.map.height, 5.35);
        assert_eq!(config.tags.merge, MergeMode::Fields);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config(
            r#"
            [feed]
            kind = "rtls"
            host = "rtls.local"
            filter_len = 10

            [tags]
            merge = "replace"
            "#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.feed.kind, FeedKind::Rtls);
        assert_eq!(config.feed.host, "rtls.local");
        assert_eq!(config.feed.filter_len, 10);
        assert_eq!(config.feed.port, 9475);
        assert_eq!(config.feed.reconnect_delay(), Duration::from_secs(1));
        assert_eq!(config.tags.merge, MergeMode::Replace);
        assert_eq!(config.map.width, 10.0);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/tail.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_rejects_degenerate_floorplan() {
        let file = write_config("[map]\nwidth = 0.0\n");
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_rejects_non_finite_durations_and_sizes() {
        for text in [
            "[feed]\nreconnect_secs = inf\n",
            "[feed]\nreconnect_secs = -1.0\n",
            "[feed]\ninterval_secs = inf\n",
            "[feed]\ninterval_secs = 0.0\n",
            "[map]\ndefault_radius = nan\n",
            "[map]\nheight = inf\n",
        ] {
            let file = write_config(text);
            assert!(Config::from_file(file.path()).is_err(), "accepted {:?}", text);
        }

        let file = write_config("[feed]\nreconnect_secs = 0.0\ninterval_secs = 0.25\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.feed.reconnect_delay(), Duration::ZERO);
        assert_eq!(config.feed.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_unknown_merge_mode() {
        let file = write_config("[tags]\nmerge = \"sometimes\"\n");
        assert!(Config::from_file(file.path()).is_err());
    }
}
