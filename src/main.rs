use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Args, Parser, Subcommand};

use planline::config::Config;
use planline::core::{auto_schedule, scheduling_conflicts, DependencyGraph, PlanSnapshot, TaskGraphBuilder};
use planline::render::{
    RenderOptions, RenderOutcome, RendererFactory, RendererFlag, RendererKind, RendererStrategy, StdoutSurface,
    SurfaceHandle, ViewMode,
};
use planline::{plog, plog_warn, Result};

/// Planline - render initiative and work package timelines
#[derive(Parser, Debug)]
#[command(name = "planline")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    PLANLINE_DEBUG=1     Enable debug logging (alternative to --debug)\n    PLANLINE_LOG=LEVEL   Log level: error, warn, info, debug, trace")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.planline/planline.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Render a plan file to stdout
    Render(RenderArgs),

    /// List work packages that start before a dependency ends
    Conflicts {
        plan: PathBuf,
    },

    /// Shift work packages so each starts after its dependencies end
    Schedule {
        plan: PathBuf,

        /// Write the rescheduled plan back to the file instead of printing it
        #[arg(long)]
        write: bool,

        /// Days between a dependency's end and the dependent's start
        #[arg(long)]
        gap: Option<i64>,
    },

    /// Show or set the configured renderer
    Renderer {
        name: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RenderArgs {
    /// JSON file with `initiatives` and `workPackages`
    pub plan: PathBuf,

    /// Renderer to use instead of the configured one (mermaid, timeline).
    /// An unknown name is logged and the configured renderer is used.
    #[arg(long, short = 'r')]
    pub renderer: Option<String>,

    /// Reference year for default dates and the timeline window
    #[arg(long, short = 'y')]
    pub year: Option<i32>,

    /// Timeline granularity (Quarter Day, Half Day, Day, Week, Month)
    #[arg(long)]
    pub view_mode: Option<String>,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    planline::log::init_with_debug(cli.debug);
    plog!("planline starting: {:?}", cli.command);

    let config = Config::load()?;

    match cli.command {
        Command::Render(args) => run_render(&config, &args),
        Command::Conflicts { plan } => run_conflicts(&plan),
        Command::Schedule { plan, write, gap } => run_schedule(&config, &plan, write, gap),
        Command::Renderer { name } => run_renderer(config, name),
    }
}

fn read_plan(path: &Path) -> Result<PlanSnapshot> {
    let plan: PlanSnapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
    plog!(
        "Loaded plan {}: {} initiative(s), {} work package(s)",
        path.display(),
        plan.initiatives.len(),
        plan.work_packages.len()
    );
    Ok(plan)
}

fn run_render(config: &Config, args: &RenderArgs) -> Result<()> {
    let plan = read_plan(&args.plan)?;
    let surface: SurfaceHandle = Arc::new(Mutex::new(StdoutSurface::stdout()));

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(render_plan(config, &plan, args, surface))? {
        RenderOutcome::Degraded { reason } => plog_warn!("Render degraded: {}", reason),
        other => plog!("Render finished: {:?}", other),
    }
    Ok(())
}

/// The configured renderer, overridden by `requested` when it names a
/// known one. A rejected name is already logged by the flag.
fn select_renderer(configured: RendererKind, requested: Option<&str>) -> RendererFlag {
    let mut flag = RendererFlag::new(configured);
    if let Some(name) = requested {
        let _ = flag.set(name);
    }
    flag
}

async fn render_plan(
    config: &Config,
    plan: &PlanSnapshot,
    args: &RenderArgs,
    surface: SurfaceHandle,
) -> Result<RenderOutcome> {
    let flag = select_renderer(config.renderer, args.renderer.as_deref());
    let view_mode = match &args.view_mode {
        Some(raw) => raw.parse::<ViewMode>()?,
        None => config.view_mode,
    };
    let year = args.year.unwrap_or_else(|| config.effective_year());

    let tasks = TaskGraphBuilder::new(year).build(&plan.initiatives, &plan.work_packages);

    let mut options = RenderOptions::new().with_view_mode(view_mode).with_year(year);
    if let Some(title) = args.title.as_ref().or(config.title.as_ref()) {
        options = options.with_title(title);
    }

    let mut strategy = RendererFactory::from_flag(surface, &flag);
    let outcome = strategy.render(&tasks, &options).await;
    Ok(outcome)
}

fn run_conflicts(plan_path: &Path) -> Result<()> {
    let plan = read_plan(plan_path)?;

    let graph = DependencyGraph::from_work_packages(&plan.work_packages);
    if let Err(e) = graph.topological_order() {
        println!("{}", e);
    }

    let conflicts = scheduling_conflicts(&plan.work_packages);
    if conflicts.is_empty() {
        println!("No scheduling conflicts.");
        return Ok(());
    }
    for conflict in &conflicts {
        println!("{}", conflict);
    }
    println!("{} conflict(s)", conflicts.len());
    Ok(())
}

fn run_schedule(config: &Config, plan_path: &Path, write: bool, gap: Option<i64>) -> Result<()> {
    let mut plan = read_plan(plan_path)?;
    let report = auto_schedule(&mut plan.work_packages, gap.unwrap_or(config.min_gap_days));

    let json = serde_json::to_string_pretty(&plan)?;
    if write {
        fs::write(plan_path, json)?;
        println!(
            "Rescheduled {}: {} shift(s), {} conflict(s) remain",
            plan_path.display(),
            report.shifted,
            report.conflict_count
        );
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn run_renderer(mut config: Config, name: Option<String>) -> Result<()> {
    let Some(name) = name else {
        println!("{}", config.renderer);
        return Ok(());
    };

    let mut flag = RendererFlag::new(config.renderer);
    config.renderer = flag.set(&name)?;
    config.save()?;
    println!("Renderer set to {}", config.renderer);
    Ok(())
}
