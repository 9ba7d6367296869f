use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use notion_merge_client::settings::{
    DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, mask_token,
};
use notion_merge_client::{NotionClient, SettingSource, Settings};

use crate::CliError;
use crate::prompt::read_line;

/// Show current settings and where each comes from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = notion_merge_client::config_path();
    let sources = notion_merge_client::setting_sources();

    log::info!(
        "{}",
        "Notion Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    // Without a token load() fails, so every value is shown as unresolved.
    let settings = Settings::load().ok();
    let fields: [(&str, &SettingSource, Option<String>); 4] = [
        (
            "token",
            &sources.token,
            settings.as_ref().map(|s| mask_token(&s.token)),
        ),
        (
            "version",
            &sources.api_version,
            settings.as_ref().map(|s| s.api_version.clone()),
        ),
        (
            "base_url",
            &sources.base_url,
            settings.as_ref().map(|s| s.base_url.clone()),
        ),
        (
            "timeout_secs",
            &sources.timeout,
            settings.as_ref().map(|s| s.timeout.as_secs().to_string()),
        ),
    ];

    for (name, source, value) in fields {
        let source_str = format!("({})", source);
        let value = match (source, value) {
            (SettingSource::Missing, _) | (_, None) => "not set"
                .if_supports_color(Stdout, |t| t.yellow())
                .to_string(),
            (_, Some(v)) => v,
        };
        log::info!(
            "  {} {} {}",
            format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
            value,
            source_str.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    Ok(())
}

/// Interactively write the config file.
pub(crate) fn run_config_setup() -> Result<(), CliError> {
    println!(
        "{}",
        "Notion Setup".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    let existing = Settings::load().ok();

    println!(
        "  {}",
        "Create an internal integration at https://www.notion.so/my-integrations"
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
    println!(
        "  {}",
        "and share the source databases and parent page with it."
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
    println!();

    let masked = existing.as_ref().map(|s| mask_token(&s.token));
    let token = match read_line("token", masked.as_deref(), true)? {
        // Keeping the masked default means keeping the existing token.
        Some(t) if Some(&t) == masked.as_ref() => existing
            .as_ref()
            .map(|s| s.token.clone())
            .unwrap_or(t),
        Some(t) => t,
        None => return Err(CliError::input("A token is required")),
    };

    let version = read_line(
        "version",
        Some(
            existing
                .as_ref()
                .map_or(DEFAULT_API_VERSION, |s| s.api_version.as_str()),
        ),
        false,
    )?
    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
    let base_url = read_line(
        "base_url",
        Some(
            existing
                .as_ref()
                .map_or(DEFAULT_BASE_URL, |s| s.base_url.as_str()),
        ),
        false,
    )?
    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let current_timeout = existing
        .as_ref()
        .map_or(DEFAULT_TIMEOUT_SECS, |s| s.timeout.as_secs())
        .to_string();
    let timeout_secs: u64 = read_line("timeout_secs", Some(&current_timeout), false)?
        .unwrap_or(current_timeout)
        .parse()
        .map_err(|_| CliError::input("timeout_secs must be a whole number of seconds"))?;

    let settings = Settings {
        token,
        api_version: version,
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout: std::time::Duration::from_secs(timeout_secs),
    };

    let path = notion_merge_client::save_to_file(&settings)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;

    println!();
    log::info!(
        "{} Settings saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    Ok(())
}

/// Check the token by asking who it belongs to.
pub(crate) fn run_config_test(quiet: bool) -> Result<(), CliError> {
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            log::warn!(
                "{} Failed to load settings: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            log::warn!("");
            log::warn!("Run 'notion-merge config setup' to configure a token.");
            return Ok(());
        }
    };

    log::info!("Testing token against the Notion API...");
    let rt = super::runtime()?;

    let pb = crate::spinner::spinner(quiet, "Connecting...");
    let result = rt.block_on(NotionClient::connect(&settings));
    pb.finish_and_clear();

    match result {
        Ok((_client, user)) => {
            log::info!(
                "{} Token is valid!",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
            crate::log_blank();
            log::info!(
                "  Integration: {}",
                user.name.as_deref().unwrap_or("(unnamed)")
            );
            log::info!("  User ID:     {}", user.id);
            if let Some(kind) = &user.user_type {
                log::info!("  Type:        {}", kind);
            }
        }
        Err(e) => {
            log::warn!(
                "{} Token check failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
        }
    }

    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match notion_merge_client::config_path() {
        Some(path) => println!("{}", path.display()),
        None => return Err(CliError::config("Could not determine config directory")),
    }
    Ok(())
}
