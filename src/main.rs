use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use examflat::config::ExamLayout;
use examflat::document::{
    classify_answer_document, classify_questions, read_docx_file, validate_docx_file, SkippedLine,
};
use examflat::images::{self, ImageStore, PlaceholderCounter, DEFAULT_DISPLAY_WIDTH_EMU};
use examflat::{export, reconcile, OutputFormat};

#[derive(Parser)]
#[command(
    name = "examflat",
    version,
    about = "Flatten Vietnamese exam .docx papers into a single keyed answer document"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge an exam paper and its answer key into one flattened document
    Flatten {
        /// Exam question document (.docx)
        #[arg(long)]
        exam: PathBuf,

        /// Answer key document (.docx)
        #[arg(long)]
        answers: PathBuf,

        /// Output path
        #[arg(long)]
        output: PathBuf,

        /// Directory receiving media extracted from the exam document
        /// (defaults to an `images` directory next to the output)
        #[arg(long)]
        media_dir: Option<PathBuf>,

        /// Exam layout TOML (defaults to the user configuration file,
        /// falling back to the built-in 40-question convention)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "docx")]
        format: OutputFormat,
    },

    /// Replace every embedded graphic with its numbered placeholder
    Strip {
        /// Source document (.docx)
        #[arg(long)]
        input: PathBuf,

        /// Output path
        #[arg(long)]
        output: PathBuf,
    },

    /// Re-insert extracted images over their numbered placeholders
    Restore {
        /// Flattened document containing placeholders (.docx)
        #[arg(long)]
        input: PathBuf,

        /// Directory of `image<n>.<ext>` assets
        #[arg(long)]
        images: PathBuf,

        /// Output path
        #[arg(long)]
        output: PathBuf,

        /// Display width of inserted images, in EMU
        #[arg(long, default_value_t = DEFAULT_DISPLAY_WIDTH_EMU)]
        width_emu: u32,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Flatten {
            exam,
            answers,
            output,
            media_dir,
            layout,
            format,
        } => run_flatten(&exam, &answers, &output, media_dir, layout, format),
        Command::Strip { input, output } => run_strip(&input, &output),
        Command::Restore {
            input,
            images,
            output,
            width_emu,
        } => run_restore(&input, &images, &output, width_emu),
    }
}

fn run_flatten(
    exam: &Path,
    answers: &Path,
    output: &Path,
    media_dir: Option<PathBuf>,
    layout_path: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let layout = match layout_path {
        Some(path) => ExamLayout::load(&path)
            .with_context(|| format!("loading layout from {}", path.display()))?,
        None => ExamLayout::load_default()?,
    };

    validate_docx_file(exam)?;
    validate_docx_file(answers)?;

    let media_dir = media_dir.unwrap_or_else(|| {
        output
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("images")
    });
    let extracted = images::extract_media(exam, &media_dir)?;
    if extracted.is_empty() {
        log::debug!("exam document carries no media");
    }

    let exam_doc = read_docx_file(exam)?;
    let mut counter = PlaceholderCounter::new();
    let (paper, skipped) = classify_questions(&exam_doc, &layout, &mut counter);
    report_skips("exam document", &skipped);
    log::info!(
        "classified {} question(s), {} image placeholder(s)",
        paper.questions.len(),
        counter.issued()
    );

    let answer_doc = read_docx_file(answers)?;
    let (key, skipped) = classify_answer_document(&answer_doc, &layout);
    report_skips("answer document", &skipped);
    log::info!(
        "collected {} table answer(s), {} paragraph answer(s), {} explanation(s)",
        key.table_answers.len(),
        key.answers.len(),
        key.explanations.len()
    );

    let records = reconcile::reconcile(&paper, &key, &layout)
        .context("the three sources do not line up")?;

    match format {
        OutputFormat::Docx => export::write_docx(&export::compose(&records), output)?,
        OutputFormat::Json => export::write_json(&records, output)?,
    }
    log::info!(
        "wrote {} question record(s) to {}",
        records.len(),
        output.display()
    );

    Ok(())
}

fn run_strip(input: &Path, output: &Path) -> anyhow::Result<()> {
    validate_docx_file(input)?;
    let docx = read_docx_file(input)?;
    let (stripped, count) = images::flatten_graphics(&docx);
    export::save_docx(stripped, output)?;
    log::info!(
        "replaced {count} graphic(s) with placeholders in {}",
        output.display()
    );
    Ok(())
}

fn run_restore(input: &Path, images_dir: &Path, output: &Path, width_emu: u32) -> anyhow::Result<()> {
    validate_docx_file(input)?;
    let store = ImageStore::scan(images_dir)
        .with_context(|| format!("scanning image assets in {}", images_dir.display()))?;
    if store.is_empty() {
        log::warn!("no image assets found in {}", images_dir.display());
    }

    let inserted = images::restore_images(input, output, &store, width_emu)?;
    log::info!("restored {inserted} image(s)");
    Ok(())
}

fn report_skips(source: &str, skipped: &[SkippedLine]) {
    for line in skipped {
        log::warn!(
            "{source}: dropped paragraph {} ({:?})",
            line.index,
            line.preview
        );
    }
}
