//! Command dispatch

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::application::services::{DiagramEditor, SaveOutcome};
use crate::application::{ApplicationResult, Notification};
use crate::cli::args::{BoneCommands, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::svg::render_svg;
use crate::config::{global_config_path, Settings};
use crate::domain::layout::{DiagramLayout, Point};
use crate::domain::{compute_layout, forest, PanZoom, PointerEvent, TreeNodeConvert, ViewTransform, Viewport};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Wheel delta of one notch; negative scrolls zoom in.
const WHEEL_NOTCH: f64 = 100.0;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'fishbone --help'".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        _ => {
            let settings = load_settings(cli)?;
            let container = ServiceContainer::new(settings)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| InfraError::io("start async runtime", e))?;

            runtime.block_on(async {
                let cancel = CancellationToken::new();
                let on_interrupt = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        debug!("interrupt received, cancelling");
                        on_interrupt.cancel();
                    }
                });
                dispatch(&container, command, &cancel).await
            })
        }
    }
}

/// Settings from all config layers, with `--server` on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    Ok(settings)
}

async fn dispatch(
    container: &ServiceContainer,
    command: &Commands,
    cancel: &CancellationToken,
) -> CliResult<()> {
    match command {
        Commands::List { search } => cmd_list(container, search.as_deref(), cancel).await,
        Commands::Show { id } => cmd_show(container, id, cancel).await,
        Commands::Create { title } => cmd_create(container, title, cancel).await,
        Commands::Delete { id } => cmd_delete(container, id, cancel).await,
        Commands::Title { id, title } => {
            let mut editor = open_editor(container, id, cancel).await?;
            let outcome = editor.rename_title(title, cancel).await?;
            report(outcome, &format!("Renamed diagram to '{}'", editor.diagram().title))
        }
        Commands::Bone { command } => cmd_bone(container, command, cancel).await,
        Commands::Render {
            id,
            width,
            height,
            pan,
            zoom,
            json,
            output,
        } => {
            let settings = &container.settings;
            let viewport = Viewport::new(
                width.unwrap_or(settings.viewport.width),
                height.unwrap_or(settings.viewport.height),
            );
            let opts = RenderOptions {
                viewport,
                view: view_transform(pan.as_deref(), *zoom),
                json: *json,
                output: output.clone(),
            };
            cmd_render(container, id, opts, cancel).await
        }
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not talk to the diagram store".into(),
        )),
    }
}

/// Run a store call unless the user interrupts first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ApplicationResult<T>>,
) -> CliResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CliError::Cancelled),
        result = call => Ok(result?),
    }
}

async fn open_editor(
    container: &ServiceContainer,
    id: &str,
    cancel: &CancellationToken,
) -> CliResult<DiagramEditor> {
    cancellable(cancel, container.open_editor(id)).await
}

/// Print the outcome of a save and turn failures into an exit code.
fn report(outcome: SaveOutcome, done: &str) -> CliResult<()> {
    match outcome {
        SaveOutcome::Saved(_) => {
            output::notify(&Notification::success(done));
            Ok(())
        }
        SaveOutcome::Unchanged => {
            output::notify(&Notification::info("Nothing to save"));
            Ok(())
        }
        SaveOutcome::Failed(n) => {
            output::notify(&Notification::warning(
                "local edit kept, store not updated",
            ));
            Err(CliError::SaveFailed(n.message))
        }
        SaveOutcome::Cancelled => Err(CliError::Cancelled),
    }
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_list(
    container: &ServiceContainer,
    search: Option<&str>,
    cancel: &CancellationToken,
) -> CliResult<()> {
    let mut catalog = container.catalog();
    cancellable(cancel, catalog.refresh()).await?;

    let rows = catalog.summaries(search.unwrap_or(""));
    if rows.is_empty() {
        output::info("No diagrams found");
        return Ok(());
    }

    output::header(&format!(
        "{:<36}  {:<30}  {:>5}  {:>5}  {}",
        "ID", "TITLE", "MAIN", "TOTAL", "UPDATED"
    ));
    for row in rows {
        output::info(&format!(
            "{:<36}  {:<30}  {:>5}  {:>5}  {}",
            row.id,
            row.title,
            row.top_level_bones,
            row.total_bones,
            row.updated_at.format("%Y-%m-%d %H:%M")
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_show(container: &ServiceContainer, id: &str, cancel: &CancellationToken) -> CliResult<()> {
    let mut catalog = container.catalog();
    let diagram = cancellable(cancel, catalog.fetch(id)).await?;

    output::header(&diagram.title);
    output::detail(&format!("id:         {}", diagram.id));
    output::detail(&format!("created by: {}", diagram.created_by));
    output::detail(&format!("created:    {}", diagram.created_at.format("%Y-%m-%d %H:%M")));
    output::detail(&format!(
        "modified:   {}",
        diagram.last_modified().format("%Y-%m-%d %H:%M")
    ));
    if let Some(status) = &diagram.status {
        output::detail(&format!("status:     {}", status));
    }
    if !diagram.tags.is_empty() {
        output::detail(&format!("tags:       {}", diagram.tags.join(", ")));
    }
    output::detail(&format!(
        "bones:      {} main, {} total, depth {}",
        diagram.bones.len(),
        forest::count_nodes(&diagram.bones),
        forest::depth(&diagram.bones)
    ));
    output::info("");
    output::info(&diagram.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_create(container: &ServiceContainer, title: &str, cancel: &CancellationToken) -> CliResult<()> {
    let mut catalog = container.catalog();
    let diagram = cancellable(cancel, catalog.create(title)).await?;
    output::action("Created", &format!("{} [{}]", diagram.title, diagram.id));
    Ok(())
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_delete(container: &ServiceContainer, id: &str, cancel: &CancellationToken) -> CliResult<()> {
    let mut catalog = container.catalog();
    cancellable(cancel, catalog.delete(id)).await?;
    output::action("Deleted", id);
    Ok(())
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_bone(
    container: &ServiceContainer,
    command: &BoneCommands,
    cancel: &CancellationToken,
) -> CliResult<()> {
    match command {
        BoneCommands::Add {
            diagram,
            parent,
            name,
        } => {
            let mut editor = open_editor(container, diagram, cancel).await?;
            let added = match parent {
                Some(parent) => {
                    if !forest::contains_id(editor.bones(), parent) {
                        output::notify(&Notification::warning(format!(
                            "parent bone {} not found, tree unchanged",
                            parent
                        )));
                    }
                    editor.add_child_bone(parent, name.as_deref(), cancel).await?
                }
                None => editor.add_root_bone(name.as_deref(), cancel).await?,
            };
            report(added.outcome, &format!("Added bone [{}]", added.bone_id))
        }
        BoneCommands::Rename {
            diagram,
            bone,
            name,
        } => {
            let mut editor = open_editor(container, diagram, cancel).await?;
            if editor.bone(bone).is_err() {
                output::notify(&Notification::warning(format!(
                    "bone {} not found",
                    bone
                )));
            }
            let outcome = editor.rename_bone(bone, name, cancel).await?;
            report(outcome, &format!("Renamed bone [{}]", bone))
        }
        BoneCommands::Delete { diagram, bone } => {
            let mut editor = open_editor(container, diagram, cancel).await?;
            let removed = editor
                .bone(bone)
                .map(forest::subtree_size)
                .unwrap_or_default();
            if removed == 0 {
                output::notify(&Notification::warning(format!(
                    "bone {} not found, tree unchanged",
                    bone
                )));
            }
            let outcome = editor.delete_bone(bone, cancel).await;
            report(outcome, &format!("Deleted {} bone(s)", removed))
        }
    }
}

/// Render parameters resolved from flags and settings.
#[derive(Debug, Clone)]
struct RenderOptions {
    viewport: Viewport,
    view: ViewTransform,
    json: bool,
    output: Option<PathBuf>,
}

/// JSON form of `render --json`.
#[derive(Debug, Serialize)]
struct RenderedLayout<'a> {
    view: ViewTransform,
    layout: &'a DiagramLayout,
}

/// Drive the pan/zoom state machine the way a pointer would.
///
/// `pan` drags from the origin to (DX, DY); each `zoom` notch is one wheel
/// event, positive notches zoom in.
pub fn view_transform(pan: Option<&[f64]>, zoom: Option<i32>) -> ViewTransform {
    let mut view = PanZoom::new();
    if let Some([dx, dy]) = pan {
        view.handle(PointerEvent::Down(Point::new(0.0, 0.0)));
        view.handle(PointerEvent::Move(Point::new(*dx, *dy)));
        view.handle(PointerEvent::Up);
    }
    if let Some(notches) = zoom {
        let delta_y = if notches > 0 { -WHEEL_NOTCH } else { WHEEL_NOTCH };
        for _ in 0..notches.unsigned_abs() {
            view.handle(PointerEvent::Wheel { delta_y });
        }
    }
    view.transform()
}

#[instrument(level = "debug", skip(container, cancel))]
async fn cmd_render(
    container: &ServiceContainer,
    id: &str,
    opts: RenderOptions,
    cancel: &CancellationToken,
) -> CliResult<()> {
    if opts.viewport.width <= 0.0 || opts.viewport.height <= 0.0 {
        return Err(CliError::InvalidArgs(format!(
            "canvas must be positive, got {}x{}",
            opts.viewport.width, opts.viewport.height
        )));
    }

    let mut catalog = container.catalog();
    let diagram = cancellable(cancel, catalog.fetch(id)).await?;
    let layout = compute_layout(&diagram.bones, opts.viewport);

    let rendered = if opts.json {
        let doc = RenderedLayout {
            view: opts.view,
            layout: &layout,
        };
        serde_json::to_string_pretty(&doc).map_err(|e| InfraError::Serialize {
            context: "encode layout".into(),
            source: e,
        })?
    } else {
        render_svg(&layout, opts.view)
    };

    match &opts.output {
        Some(path) => {
            write_output(path, &rendered)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(rendered.trim_end()),
    }
    Ok(())
}

fn write_output(path: &Path, content: &str) -> CliResult<()> {
    std::fs::write(path, content)
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::info(&format!("global:   {}{}", path.display(), state));
                }
                None => output::info("global:   (no config directory on this platform)"),
            }
            if let Some(path) = &cli.config {
                output::info(&format!("explicit: {}", path.display()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_pan_when_building_view_then_translates_by_drag_delta() {
        let view = view_transform(Some(&[40.0, -25.0]), None);
        assert_eq!(view.x, 40.0);
        assert_eq!(view.y, -25.0);
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn given_zoom_in_notches_when_building_view_then_scale_grows() {
        let view = view_transform(None, Some(5));
        assert!((view.scale - 1.5).abs() < 1e-9);
    }

    #[test]
    fn given_many_zoom_out_notches_when_building_view_then_scale_clamps_at_minimum() {
        let view = view_transform(None, Some(-50));
        assert_eq!(view.scale, crate::domain::view::MIN_SCALE);
    }

    #[test]
    fn given_failed_save_when_reporting_then_error_carries_store_message() {
        let err = report(
            SaveOutcome::Failed(Notification::error("Failed to update diagram")),
            "done",
        )
        .unwrap_err();
        assert!(matches!(err, CliError::SaveFailed(ref m) if m == "Failed to update diagram"));
    }
}
