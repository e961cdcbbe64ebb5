use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["trendwatch-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_with_path_override() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "db", "seed", "--path", "/tmp/w.yaml"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Db {
            command: DbCommands::Seed { path },
        }) => assert_eq!(path, Some(std::path::PathBuf::from("/tmp/w.yaml"))),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["trendwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn collect_flags_default_off() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "collect"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            dry_run: false,
            analyze: false
        })
    ));
}

#[test]
fn parses_collect_dry_run_and_analyze() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "collect", "--dry-run", "--analyze"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            dry_run: true,
            analyze: true
        })
    ));
}

#[test]
fn parses_analyze_flags() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "analyze", "--notify", "--json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            notify: true,
            json: true
        })
    ));
}

#[test]
fn items_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "items", "--keyword", "갤럭시"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Items { keyword, limit }) => {
            assert_eq!(keyword.as_deref(), Some("갤럭시"));
            assert_eq!(limit, 20);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_keyword_disable() {
    let cli = Cli::try_parse_from(["trendwatch-cli", "keywords", "disable", "아이폰"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Keywords {
            command: KeywordCommands::Disable { name },
        }) => assert_eq!(name, "아이폰"),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn keyword_enable_requires_a_name() {
    assert!(Cli::try_parse_from(["trendwatch-cli", "keywords", "enable"]).is_err());
}

#[test]
fn settings_set_builds_partial_update() {
    let cli = Cli::try_parse_from([
        "trendwatch-cli",
        "settings",
        "set",
        "--threshold",
        "120",
        "--webhook",
        "",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Settings { command }) = cli.command else {
        panic!("expected settings command");
    };
    let update = command.to_update().expect("set yields an update");
    assert_eq!(update.threshold, Some(120));
    assert_eq!(update.webhook.as_deref(), Some(""));
    assert_eq!(update.email, None);
    assert_eq!(update.enabled, None);
}

#[test]
fn settings_show_has_no_update() {
    let cli =
        Cli::try_parse_from(["trendwatch-cli", "settings", "show"]).expect("expected valid cli args");

    let Some(Commands::Settings { command }) = cli.command else {
        panic!("expected settings command");
    };
    assert!(command.to_update().is_none());
}

#[test]
fn settings_enabled_takes_a_bool() {
    assert!(Cli::try_parse_from(["trendwatch-cli", "settings", "set", "--enabled", "maybe"]).is_err());
    assert!(Cli::try_parse_from(["trendwatch-cli", "settings", "set", "--enabled", "false"]).is_ok());
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["trendwatch-cli", "export", "--all"]).is_err());
}
