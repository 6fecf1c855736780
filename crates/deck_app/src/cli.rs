//! Command-line front end.
//!
//! - `deck replay <events.jsonl>` folds an agent stream into a session and
//!   prints its timeline.
//! - `deck edit <slide.html> <script>` applies an edit script to a slide.
//! - `deck settings` shows (and with `--init` writes) the settings file.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{SessionSnapshot, SessionState};
use deck_editor::{decode_slide, write_atomic, HtmlSurface, SlideEditor};
use deck_logging::deck_info;

use crate::platform::{
    initialize_logging, EditorSettings, LogDestination, SettingsStore, DEFAULT_SETTINGS_FILENAME,
};
use crate::replay::{export_slides, render_timeline, replay, resume, write_snapshot};
use crate::script::{parse_script, run_script, ScriptReport};

#[derive(Debug, Parser)]
#[command(name = "deck", about = "Replay agent streams and edit generated slides.")]
pub struct Cli {
    /// Settings file (RON).
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILENAME)]
    pub settings: PathBuf,

    /// Where log output goes; overrides the settings file.
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogDestination>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fold a JSONL agent event stream into a session.
    Replay {
        /// One JSON event per line.
        events: PathBuf,

        /// Write the session snapshot (JSON) here.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Start from a snapshot written by an earlier replay.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Export the markup of every finished slide into this directory.
        #[arg(long)]
        slides_dir: Option<PathBuf>,
    },

    /// Apply an edit script to a slide's HTML.
    Edit {
        slide: PathBuf,
        script: PathBuf,

        /// Edited HTML destination; defaults to `<slide>.edited.html`.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write the grid overlay as SVG.
        #[arg(long)]
        grid_svg: Option<PathBuf>,

        /// Also write alignment guides for the last selected element as SVG.
        #[arg(long)]
        guides_svg: Option<PathBuf>,
    },

    /// Print the effective settings.
    Settings {
        /// Write the defaults when no settings file exists yet.
        #[arg(long)]
        init: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let store = SettingsStore::new(&cli.settings);
    let settings = store.load().context("loading settings")?;
    initialize_logging(cli.log.unwrap_or(settings.log_destination), cli.verbose);

    match cli.command {
        Command::Replay {
            events,
            out,
            resume: resume_from,
            slides_dir,
        } => run_replay(&events, out.as_deref(), resume_from.as_deref(), slides_dir.as_deref()),
        Command::Edit {
            slide,
            script,
            out,
            grid_svg,
            guides_svg,
        } => {
            let out = out.unwrap_or_else(|| slide.with_extension("edited.html"));
            let report = run_edit(
                &settings,
                &slide,
                &script,
                &EditOutputs {
                    html: out.clone(),
                    grid_svg,
                    guides_svg,
                },
            )?;
            println!(
                "{} changes, {} unchanged, {} undone, {} redone -> {}",
                report.changes,
                report.unchanged,
                report.undone,
                report.redone,
                out.display()
            );
            Ok(())
        }
        Command::Settings { init } => {
            if init && !store.exists() {
                store.save(&settings).context("writing default settings")?;
                println!("wrote {}", store.path().display());
            }
            print!("{}", ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::new())?);
            println!();
            Ok(())
        }
    }
}

fn run_replay(
    events: &Path,
    out: Option<&Path>,
    resume_from: Option<&Path>,
    slides_dir: Option<&Path>,
) -> Result<()> {
    let state = match resume_from {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let snapshot: SessionSnapshot = serde_json::from_str(&text)
                .with_context(|| format!("parsing snapshot {}", path.display()))?;
            resume(snapshot)
        }
        None => SessionState::new(),
    };

    let file = File::open(events).with_context(|| format!("opening {}", events.display()))?;
    let outcome = replay(BufReader::new(file), state)
        .with_context(|| format!("reading {}", events.display()))?;
    print!("{}", render_timeline(&outcome.state.view()));

    if let Some(out) = out {
        write_snapshot(out, &outcome.state)
            .with_context(|| format!("writing snapshot {}", out.display()))?;
        deck_info!("snapshot written to {:?}", out);
    }
    if let Some(dir) = slides_dir {
        let written = export_slides(dir, &outcome.state)
            .with_context(|| format!("exporting slides to {}", dir.display()))?;
        deck_info!("exported {} slides to {:?}", written.len(), dir);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct EditOutputs {
    pub html: PathBuf,
    pub grid_svg: Option<PathBuf>,
    pub guides_svg: Option<PathBuf>,
}

/// Loads a slide, runs the script against it and writes the results.
pub fn run_edit(
    settings: &EditorSettings,
    slide: &Path,
    script: &Path,
    outputs: &EditOutputs,
) -> Result<ScriptReport> {
    let bytes = fs::read(slide).with_context(|| format!("reading {}", slide.display()))?;
    let decoded = decode_slide(&bytes).with_context(|| format!("decoding {}", slide.display()))?;
    deck_info!("decoded {:?} as {}", slide, decoded.encoding_label);
    let surface = HtmlSurface::load(&decoded.html, settings.slide_size())
        .with_context(|| format!("loading {}", slide.display()))?;

    let source =
        fs::read_to_string(script).with_context(|| format!("reading {}", script.display()))?;
    let lines = parse_script(&source).with_context(|| format!("parsing {}", script.display()))?;

    let slide_id = slide
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slide".to_string());
    let mut editor = SlideEditor::new(surface, slide_id, settings.editor_options());
    let (_, report) = run_script(&mut editor, SessionState::new(), &lines)
        .with_context(|| format!("running {}", script.display()))?;

    if let Some(path) = &outputs.grid_svg {
        if let Some(svg) = editor.grid_svg() {
            write_atomic(path, &svg).with_context(|| format!("writing {}", path.display()))?;
        }
    }
    if let Some(path) = &outputs.guides_svg {
        if let Some(svg) = editor.guides_svg() {
            write_atomic(path, &svg).with_context(|| format!("writing {}", path.display()))?;
        }
    }
    let html = editor.into_surface().to_html();
    write_atomic(&outputs.html, &html)
        .with_context(|| format!("writing {}", outputs.html.display()))?;
    Ok(report)
}
