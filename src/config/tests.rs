use super::*;

#[test]
fn defaults_match_shipped_configuration() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:8000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
    assert_eq!(settings.database.max_connections.get(), 8);
    assert_eq!(settings.auth.user_header.as_str(), "x-remote-user");
    assert_eq!(settings.auth.login_url, "/auth/login/");
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("port zero");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.port",
            ..
        }
    ));
}

#[test]
fn zero_pool_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);

    let err = Settings::from_raw(raw).expect_err("empty pool");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.max_connections",
            ..
        }
    ));
}

#[test]
fn non_sqlite_urls_are_rejected() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("postgres://localhost/yatube".to_string());

    let err = Settings::from_raw(raw).expect_err("wrong driver");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.url",
            ..
        }
    ));
}

#[test]
fn login_url_must_be_a_path() {
    let mut raw = RawSettings::default();
    raw.auth.login_url = Some("https://example.com/login".to_string());

    let err = Settings::from_raw(raw).expect_err("absolute url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "auth.login_url",
            ..
        }
    ));
}

#[test]
fn user_header_must_be_a_valid_header_name() {
    let mut raw = RawSettings::default();
    raw.auth.user_header = Some("not a header".to_string());

    let err = Settings::from_raw(raw).expect_err("spaces");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "auth.user_header",
            ..
        }
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["yatube"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_users_add_arguments() {
    let args = CliArgs::parse_from([
        "yatube",
        "users",
        "add",
        "--database-url",
        "sqlite::memory:",
        "kir",
    ]);

    match args.command.expect("users command") {
        Command::Users(UsersArgs {
            command: UsersCommand::Add(add),
        }) => {
            assert_eq!(add.username, "kir");
            assert_eq!(add.database.database_url.as_deref(), Some("sqlite::memory:"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_groups_add_arguments() {
    let args = CliArgs::parse_from([
        "yatube",
        "groups",
        "add",
        "--title",
        "Test group",
        "--slug",
        "test-slug",
    ]);

    match args.command.expect("groups command") {
        Command::Groups(GroupsArgs {
            command: GroupsCommand::Add(add),
        }) => {
            assert_eq!(add.title, "Test group");
            assert_eq!(add.slug.as_deref(), Some("test-slug"));
            assert_eq!(add.description, "");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
