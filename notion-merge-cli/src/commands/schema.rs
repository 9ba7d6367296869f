use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use notion_merge_client::{NotionClient, Settings, WorkspaceApi};

use crate::CliError;

/// Print a database's properties, with declared options for select fields.
pub(crate) fn run_schema(database_id: &str, quiet: bool) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let client = NotionClient::new(&settings)?;
    let rt = super::runtime()?;

    let pb = crate::spinner::spinner(quiet, "Fetching database...");
    let database = rt.block_on(client.retrieve_database(database_id));
    pb.finish_and_clear();
    let database = database?;

    let mut title = database.plain_title();
    if title.is_empty() {
        title = "(untitled)".to_string();
    }
    log::info!(
        "{} {}",
        title.if_supports_color(Stdout, |t| t.bold()),
        format!("({})", database.id).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if let Some(url) = &database.url {
        log::info!("  {}", url.if_supports_color(Stdout, |t| t.cyan()));
    }
    crate::log_blank();

    for (name, config) in &database.properties {
        log::info!(
            "  {} {}",
            format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
            config.kind(),
        );
        if config.kind().is_enumerated() {
            let options = config.option_names();
            if options.is_empty() {
                log::info!(
                    "      {}",
                    "no options".if_supports_color(Stdout, |t| t.dimmed())
                );
            } else {
                log::info!("      options: {}", options.join(", "));
            }
        }
    }

    Ok(())
}
