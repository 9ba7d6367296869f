use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use notion_merge_client::{NotionClient, Settings};
use notion_merge_core::TransformOptions;
use notion_merge_lib::async_util::run_with_events;
use notion_merge_lib::{MergeEvent, MergeOptions, MergePlan, MergeReport, SchemaMerger};

use crate::CliError;
use crate::cli_types::MergeArgs;
use crate::prompt;

/// Merge the source databases into a new database.
pub(crate) fn run_merge(args: MergeArgs, quiet: bool) -> Result<(), CliError> {
    // A missing token is reported before anything is asked or sent.
    let settings = Settings::load()?;

    let sources = match args.sources {
        Some(ids) => prompt::clean_ids(ids),
        None => prompt::split_ids(&prompt::read_required("Source database IDs (comma-separated)")?),
    };
    if sources.is_empty() {
        return Err(CliError::input("At least one source database ID is required"));
    }

    let options = MergeOptions {
        transform: TransformOptions {
            skip_computed: args.skip_computed,
        },
        seed_options: args.seed_options,
    };
    let client = NotionClient::new(&settings)?;
    let merger = SchemaMerger::new(client).with_options(options);
    let rt = super::runtime()?;

    if args.dry_run {
        let pb = crate::spinner::spinner(quiet, "Reading source schemas...");
        let plan = rt.block_on(merger.plan(&sources));
        pb.finish_and_clear();
        print_plan(&plan?);
        return Ok(());
    }

    let parent = match args.parent {
        Some(parent) => parent,
        None => prompt::read_required("Parent page ID")?,
    };
    let title = match args.title {
        Some(title) => title,
        None => prompt::read_required("Title for the merged database")?,
    };

    log::info!(
        "Merging {} database(s) into \"{}\"",
        sources.len(),
        title.if_supports_color(Stdout, |t| t.bold()),
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let merger = merger.with_events(event_tx);
    let pb = crate::spinner::spinner(quiet, "Reading source schemas...");

    let result = rt.block_on(async {
        // The merger owns the event sender; dropping it with the task closes
        // the channel.
        let task = async move {
            let merger = merger;
            merger.merge_all(&sources, &title, &parent).await
        };
        run_with_events(task, event_rx, |e| show_event(&pb, e)).await
    });
    pb.finish_and_clear();

    let report = result?;
    print_report(&report);

    if let Some(path) = &args.report {
        report.write_to_file(path)?;
        log::info!(
            "Report written to {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
    }

    Ok(())
}

fn show_event(pb: &ProgressBar, event: MergeEvent) {
    match event {
        MergeEvent::FetchingSchema { database_id } => {
            pb.set_message(format!("Reading schema of {}", database_id));
        }
        MergeEvent::SchemasReconciled {
            properties,
            renamed,
        } => {
            pb.set_message(format!(
                "Merged schema: {} properties ({} renamed)",
                properties, renamed
            ));
        }
        MergeEvent::TargetCreated { database_id } => {
            pb.set_message(format!("Created {}", database_id));
        }
        MergeEvent::SourceStarted {
            index,
            total,
            database_id,
        } => {
            pb.set_message(format!("[{}/{}] Reading {}", index + 1, total, database_id));
        }
        MergeEvent::RecordsFetched { index, records } => {
            pb.set_message(format!("[{}] Fetched {} records", index + 1, records));
        }
        MergeEvent::OptionsSynced { property, added } => {
            pb.set_message(format!("Added {} option(s) to {}", added, property));
        }
        MergeEvent::RecordInserted {
            index,
            position,
            total,
        } => {
            pb.set_message(format!("[{}] Copying record {}/{}", index + 1, position, total));
        }
        MergeEvent::RecordFailed {
            index, record_id, ..
        } => {
            pb.set_message(format!("[{}] Record {} failed", index + 1, record_id));
        }
        MergeEvent::SourceFinished { .. } | MergeEvent::Done => {}
    }
}

fn print_plan(plan: &MergePlan) {
    log::info!(
        "{}",
        "Merged schema (dry run)".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    for (name, config) in plan.merged.iter() {
        let from: Vec<String> = plan
            .sources
            .sources(name)
            .iter()
            .map(|i| (i + 1).to_string())
            .collect();
        log::info!(
            "  {} {} {}",
            format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
            config.kind(),
            format!("(from {})", from.join(", ")).if_supports_color(Stdout, |t| t.dimmed()),
        );
        if let Some(options) = plan.property_options.get(name) {
            if !options.is_empty() {
                log::info!("      options: {}", options.join(", "));
            }
        }
    }

    let renamed = plan.renamed();
    if !renamed.is_empty() {
        crate::log_blank();
        log::info!("Renamed to avoid type conflicts:");
        for (merged, original, index) in renamed {
            log::info!("  \"{}\" from source {} -> {}", original, index + 1, merged);
        }
    }
}

fn print_report(report: &MergeReport) {
    let summary = report.summary();

    crate::log_blank();
    log::info!(
        "{} Created \"{}\" ({})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.title,
        report.target_id,
    );
    for source in &report.sources {
        log::info!(
            "  [{}] {}: {} inserted, {} skipped, {} failed",
            source.index + 1,
            source.database_id,
            source.inserted,
            source.skipped_empty,
            source.failures.len(),
        );
    }
    log::info!(
        "  Total: {} of {} records copied, {} option(s) added",
        summary.inserted,
        summary.fetched,
        summary.options_added,
    );

    if report.has_failures() {
        log::warn!(
            "{} {} record(s) could not be copied; see the warnings above",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            summary.failed,
        );
    }
}
