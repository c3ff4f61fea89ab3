use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use lpfill::config::FillConfig;
use lpfill::device::encoder_for;
use lpfill::{FillJob, JsonSource, Report};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example job into a directory
    Init {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Fill a template with JSON data
    Fill {
        /// Path to the YAML job configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the template, one report line per line
        #[arg(short, long)]
        template: PathBuf,

        /// Path to the JSON data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => init_project(&path)?,
        Commands::Fill {
            config,
            template,
            data,
            output,
        } => fill(&config, &template, &data, output.as_deref())?,
    }

    Ok(())
}

fn init_project(path: &Path) -> Result<()> {
    info!("Initializing lpfill job at {:?}", path);

    std::fs::create_dir_all(path)?;

    let config_content = r#"page_format:
  page_length: 12
  left_margin: 2
  pitch: elite
  auto_form_feed: true

format:
  currency_symbol: "$"
  grouping_separator: ","
  decimal_separator: "."

device: escp

header:
  - "%{BOLD}Payroll%{BOLD}                     Page %{PAGE_NO}"
  - ""
footer:
  - "%{45 R36}"
"#;
    std::fs::write(path.join("job.yaml"), config_content)?;

    let template_content = r#"Company: ${company}
Period:  ${period}
Total:   ${employees.gross:sum:currency:12:right}
Staff:   {{ employees | length }}
"#;
    std::fs::write(path.join("template.txt"), template_content)?;

    let data_content = r#"{
  "company": "Acme",
  "period": "2024-01",
  "employees": [
    {"name": "emp1", "gross": 50.0},
    {"name": "emp2", "gross": 1250.5}
  ]
}
"#;
    std::fs::write(path.join("data.json"), data_content)?;

    info!("✓ Job initialized successfully!");
    info!("  Run: lpfill fill -c job.yaml -t template.txt -d data.json");

    Ok(())
}

fn fill(config_path: &Path, template_path: &Path, data_path: &Path, output: Option<&Path>) -> Result<()> {
    info!("Loading config from {:?}", config_path);
    let config = FillConfig::load(config_path).context("Failed to load config")?;

    info!("Loading template from {:?}", template_path);
    let template =
        std::fs::read_to_string(template_path).context("Failed to read template file")?;

    info!("Loading data from {:?}", data_path);
    let data_content = std::fs::read_to_string(data_path).context("Failed to read data file")?;
    let data = JsonSource::parse(&data_content).context("Failed to parse JSON data")?;

    let mut report = Report::new(config.page_format.clone())
        .with_header(config.header.iter().cloned())
        .with_footer(config.footer.iter().cloned());
    for line in template.lines() {
        report
            .append_text(line)
            .context("Template does not fit the page format")?;
    }

    let text = FillJob::new()
        .with_encoder(encoder_for(config.device))
        .with_settings(config.format.clone())
        .fill(&report, &[&data])
        .context("Failed to fill template")?;

    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Wrote {:?}", path);
        }
        None => print!("{}", text),
    }

    Ok(())
}
