//! emoji-mosaic CLI - Turn images into emoji mosaics that fit a character budget

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::{Parser, Subcommand};
    use emoji_mosaic::download::Downloader;
    use emoji_mosaic::{BudgetPolicy, Catalog, MosaicError, Resample, Session, DEFAULT_BUDGET};
    use log::info;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Parser)]
    #[command(name = "emoji-mosaic", version, about = "Turn images into emoji mosaics")]
    struct Args {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Render an image as an emoji mosaic
        Render {
            /// Input image file
            image: PathBuf,
            /// Emoji catalog (JSON list of {name, color})
            #[arg(short, long, default_value = "emojis.json")]
            catalog: PathBuf,
            /// Maximum output length in UTF-16 code units
            #[arg(short, long, default_value_t = DEFAULT_BUDGET)]
            budget: usize,
            /// What to do when the mosaic is longer than the budget
            #[arg(short, long, value_enum, default_value_t = BudgetPolicy::Truncate)]
            policy: BudgetPolicy,
            /// Filter used to shrink the image onto the grid
            #[arg(short, long, value_enum, default_value_t = Resample::Triangle)]
            resample: Resample,
            /// Write the mosaic here instead of stdout
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
        /// Build an emoji catalog from a directory of emoji images
        Catalog {
            /// Directory holding one image per emoji
            dir: PathBuf,
            /// Keep only emoji whose file name contains this (repeatable)
            #[arg(short, long = "keyword")]
            keywords: Vec<String>,
            /// Output catalog file
            #[arg(short, long, default_value = "emojis.json")]
            output: PathBuf,
        },
        /// Download custom emoji images from a Misskey server
        Download {
            /// Server base URL, e.g. https://misskey.example
            server: String,
            /// Keep only emoji whose name contains this (repeatable)
            #[arg(short, long = "keyword")]
            keywords: Vec<String>,
            /// Directory to save images into
            #[arg(short, long, default_value = "emoji_images")]
            dir: PathBuf,
            /// Pause between downloads, in milliseconds
            #[arg(long, default_value_t = 1000)]
            delay_ms: u64,
        },
    }

    pub fn run() -> Result<(), MosaicError> {
        let _ = pretty_env_logger::try_init();
        let args = Args::parse();

        match args.command {
            Command::Render { image, catalog, budget, policy, resample, output } => {
                let mut session = Session::new()
                    .with_budget(budget)
                    .with_policy(policy)
                    .with_resample(resample);
                session.load_catalog(&catalog)?;
                session.select_image(&image)?;

                let mosaic = session.generate()?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &mosaic.text)?;
                        info!("wrote {} chars to {:?}", mosaic.length, path);
                    }
                    None => print!("{}", mosaic.text),
                }
            }
            Command::Catalog { dir, keywords, output } => {
                let catalog = Catalog::build_from_dir(&dir, &keywords)?;
                std::fs::write(&output, catalog.to_json()?)?;
                info!("wrote {} emoji to {:?}", catalog.len(), output);
            }
            Command::Download { server, keywords, dir, delay_ms } => {
                let report = Downloader::new(&server)?
                    .with_delay(Duration::from_millis(delay_ms))
                    .download_all(&dir, &keywords)?;
                info!(
                    "downloaded {}, skipped {}, failed {} into {:?}",
                    report.downloaded, report.skipped, report.failed, dir
                );
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), emoji_mosaic::MosaicError> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
