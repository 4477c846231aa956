//! Command line front end (headless).

use clap::{Parser, Subcommand};
use dashpage_app::{App, AppConfig, AppError, StdoutNavigator};
use dashpage_core::{
    BoardView, CacheFileSource, FileStore, HeadlessView, ManualFrameScheduler, Theme, WidgetId,
};
use kurbo::{Point, Rect};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dashpage", version, about = "Personal start page board")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Storage directory, overrides the configuration.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every widget and its position.
    List,
    /// Create a widget.
    Add {
        text: String,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        theme: Option<Theme>,
    },
    /// Remove a widget.
    Remove { id: u64 },
    /// Drag a widget towards a container position.
    Drag {
        id: u64,
        x: f64,
        y: f64,
        /// Pointer samples along the way.
        #[arg(long, default_value_t = 8)]
        steps: u32,
    },
    /// Search with the current or given provider.
    Search {
        #[arg(long)]
        provider: Option<String>,
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// List search providers.
    Providers,
    /// Select the search provider.
    Use { provider: String },
    /// Show trending records from a cached payload.
    Trending {
        #[arg(long)]
        cache: Option<PathBuf>,
        #[arg(long)]
        refresh: bool,
        /// Open the record at this 1-based rank.
        #[arg(long)]
        open: Option<usize>,
    },
}

type CliApp = App<FileStore, HeadlessView, StdoutNavigator>;

fn main() -> Result<(), AppError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let store = match cli.data_dir.clone().or_else(|| config.data_dir.clone()) {
        Some(dir) => FileStore::new(dir)?,
        None => FileStore::default_location()?,
    };
    log::debug!("Using storage at {}", store.base_path().display());

    let container = Rect::from_origin_size(Point::ZERO, config.container);
    let view = HeadlessView::new(container, config.board.widget_size);
    let mut app: CliApp = App::new(
        Arc::new(store),
        config.board.clone(),
        view,
        StdoutNavigator,
        ManualFrameScheduler::new(),
    );
    app.start();

    let result = run(&mut app, &config, cli.command);
    for alert in app.view().alerts() {
        eprintln!("alert: {alert}");
    }
    result
}

fn run(app: &mut CliApp, config: &AppConfig, command: Command) -> Result<(), AppError> {
    match command {
        Command::List => print_widgets(app),
        Command::Add { text, x, y, theme } => {
            let position = match (x, y) {
                (Some(x), Some(y)) => Some(Point::new(x, y)),
                _ => None,
            };
            if let Some(id) = app.add_widget(&text, position, theme) {
                println!("added {id}");
            }
        }
        Command::Remove { id } => {
            let id = WidgetId(id);
            if !app.close_widget(id) {
                return Err(AppError::UnknownWidget(id));
            }
            if let Some(deadline) = app.next_removal() {
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
            }
            for removed in app.tick(Instant::now()) {
                println!("removed {removed}");
            }
        }
        Command::Drag { id, x, y, steps } => drag(app, WidgetId(id), Point::new(x, y), steps)?,
        Command::Search { provider, query } => {
            if let Some(key) = provider.as_deref() {
                if !app.search().providers().contains(key) {
                    return Err(AppError::UnknownProvider(key.to_string()));
                }
            }
            app.search_with(&query.join(" "), provider.as_deref());
        }
        Command::Providers => {
            let current = app.search().current_key().to_string();
            for provider in app.search().providers().iter() {
                let marker = if provider.key == current { "*" } else { " " };
                println!("{marker} {:<10} {}", provider.key, provider.name);
            }
        }
        Command::Use { provider } => {
            if !app.switch_provider(&provider) {
                return Err(AppError::UnknownProvider(provider));
            }
            println!("using {provider}");
        }
        Command::Trending {
            cache,
            refresh,
            open,
        } => {
            let path = cache
                .or_else(|| config.trending_cache.clone())
                .ok_or(AppError::NoTrendingSource)?;
            let source = CacheFileSource::new(path);
            if refresh {
                app.reload_trending(&source);
            } else {
                app.load_trending(&source);
            }
            let Some(block) = app.board().trending_blocks().first().copied() else {
                return Ok(());
            };
            print_trending(app, block);
            if let Some(rank) = open {
                app.open_trending_item(block, rank.saturating_sub(1));
            }
        }
    }
    Ok(())
}

/// Simulate a pointer gesture from the widget's centre to `target`.
fn drag(app: &mut CliApp, id: WidgetId, target: Point, steps: u32) -> Result<(), AppError> {
    let rect = app
        .view()
        .widget_rect(id)
        .ok_or(AppError::UnknownWidget(id))?;
    let container = app.view().container_rect().unwrap_or(Rect::ZERO);
    let grab = rect.center();
    let end = Point::new(
        grab.x + target.x - (rect.x0 - container.x0),
        grab.y + target.y - (rect.y0 - container.y0),
    );
    if !app.pointer_down(id, grab) {
        return Err(AppError::UnknownWidget(id));
    }
    let steps = steps.max(1);
    for step in 1..=steps {
        let t = f64::from(step) / f64::from(steps);
        app.pointer_move(grab.lerp(end, t));
        if step % 2 == 0 {
            app.advance_frame();
        }
    }
    if let Some((id, position)) = app.pointer_up() {
        println!("{id} -> ({:.0}, {:.0})", position.x, position.y);
    }
    Ok(())
}

fn print_widgets(app: &CliApp) {
    for widget in app.board().widgets() {
        println!(
            "{:>4}  {:<20} ({:.0}, {:.0})  {}",
            widget.id,
            widget.label(),
            widget.position.x,
            widget.position.y,
            widget.theme.class_name(),
        );
    }
}

fn print_trending(app: &CliApp, block: WidgetId) {
    let Some(items) = app.board().get(block).and_then(|w| w.trending_block()) else {
        return;
    };
    println!("{}  {}", items.title(), items.updated_label());
    for (rank, item, hot) in items.ranked() {
        let flame = if hot { " (hot)" } else { "" };
        println!("{:>3}. {}{}", rank + 1, item.show_name, flame);
    }
}
