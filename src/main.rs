use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use seodiff::{
    AnalysisModel, DEFAULT_INSTRUCTIONS, EditScript, IoError, RenderOptions, SeoDiffError,
    TextInput, build_prompt, compute_edit_script, input, parse_ndiff, render,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "seodiff")]
#[command(version, about = "Compare two versions of a webpage with numbered, prompt-ready diffs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two saved versions of a page (use - for stdin)
    Diff {
        /// Earlier version
        before: PathBuf,
        /// Later version
        after: PathBuf,
        /// Treat each input line as one pre-tokenized sentence
        #[arg(long)]
        sentences: bool,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Print an SEO summary prompt for the diff of two versions
    Prompt {
        /// Earlier version
        before: PathBuf,
        /// Later version
        after: PathBuf,
        /// Treat each input line as one pre-tokenized sentence
        #[arg(long)]
        sentences: bool,
        /// Leave unchanged lines out of the embedded diff
        #[arg(long, env = "SEODIFF_ONLY_CHANGES")]
        only_changes: bool,
        /// File with instructions to use instead of the default ones
        #[arg(long, value_name = "FILE")]
        instructions: Option<PathBuf>,
        /// Model the prompt is meant for (echoed on stderr)
        #[arg(long, default_value_t = AnalysisModel::default())]
        model: AnalysisModel,
    },
    /// Render a saved ndiff-format script (use - for stdin)
    Render {
        /// ndiff-format file
        script: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Man,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Highlighted HTML for a browser
    Human,
    /// Numbered plain text for a prompt
    Machine,
    /// Two-character tagged records, one per unit
    Ndiff,
}

#[derive(Args)]
struct RenderArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Human, env = "SEODIFF_FORMAT")]
    format: Format,
    /// Hide unchanged lines
    #[arg(long, env = "SEODIFF_ONLY_CHANGES")]
    only_changes: bool,
    /// Trim whitespace around each line (always on for machine format)
    #[arg(long)]
    strip_whitespace: bool,
    /// Leave HTML in line content unescaped (human format)
    #[arg(long)]
    no_escape: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let options = match self.format {
            Format::Machine => RenderOptions::machine(),
            Format::Human | Format::Ndiff => RenderOptions {
                escape_markup: !self.no_escape,
                strip_whitespace: self.strip_whitespace,
                ..RenderOptions::human()
            },
        };
        options.only_changes(self.only_changes)
    }

    fn output(&self, script: &EditScript) -> String {
        match self.format {
            Format::Ndiff if self.only_changes => script
                .iter()
                .filter(|op| op.is_change())
                .cloned()
                .collect::<EditScript>()
                .to_string(),
            Format::Ndiff => script.to_string(),
            Format::Human | Format::Machine => {
                let mut rendered = render(script, &self.options());
                if !rendered.is_empty() {
                    rendered.push('\n');
                }
                rendered
            }
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Reads each path once, allowing `-` (stdin) for at most one of them.
#[derive(Default)]
struct Reader {
    stdin_used: bool,
}

impl Reader {
    fn read(&mut self, path: &Path) -> Result<Vec<u8>, IoError> {
        let read_failed = |e: std::io::Error| IoError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if path.as_os_str() == "-" {
            if self.stdin_used {
                return Err(IoError::StdinTwice);
            }
            self.stdin_used = true;
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(read_failed)?;
            Ok(bytes)
        } else {
            std::fs::read(path).map_err(read_failed)
        }
    }

    fn read_text(&mut self, path: &Path) -> Result<String, SeoDiffError> {
        Ok(input::decode(&self.read(path)?)?)
    }

    fn read_input(&mut self, path: &Path, sentences: bool) -> Result<TextInput, SeoDiffError> {
        let text = self.read_text(path)?;
        if !sentences {
            return Ok(TextInput::Document(text));
        }
        Ok(TextInput::Sentences(
            input::split_lines(&text)
                .into_iter()
                .map(|line| input::strip_terminator(line).to_string())
                .collect(),
        ))
    }
}

fn diff_inputs(
    reader: &mut Reader,
    before: &Path,
    after: &Path,
    sentences: bool,
) -> Result<EditScript, SeoDiffError> {
    let before = reader.read_input(before, sentences)?;
    let after = reader.read_input(after, sentences)?;
    tracing::debug!(sentences, "read both inputs");

    let (before, after) = input::units(&before, &after)?;
    Ok(compute_edit_script(&before, &after))
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = Reader::default();

    match cli.command {
        Commands::Diff {
            before,
            after,
            sentences,
            render,
        } => {
            let script = diff_inputs(&mut reader, &before, &after, sentences)?;
            print!("{}", render.output(&script));
        }
        Commands::Prompt {
            before,
            after,
            sentences,
            only_changes,
            instructions,
            model,
        } => {
            let instructions = match instructions {
                Some(path) => reader.read_text(&path)?,
                None => DEFAULT_INSTRUCTIONS.to_string(),
            };
            let script = diff_inputs(&mut reader, &before, &after, sentences)?;
            tracing::debug!(changed = script.has_changes(), "built analysis prompt");
            eprintln!("model: {model}");
            println!("{}", build_prompt(&instructions, &script, only_changes));
        }
        Commands::Render { script, render } => {
            let text = reader.read_text(&script)?;
            let script = parse_ndiff(&text)?;
            print!("{}", render.output(&script));
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "seodiff", &mut std::io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut std::io::stdout())?;
        }
    }

    Ok(())
}
