use super::commands;
use crate::commands::plot::PlotConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed every FASTA sequence in a directory and plot a 2-D UMAP layout
    Plot {
        /// Directory of `.fasta` / `.txt` sequence files
        #[arg(long, default_value = "fasta_dir")]
        fasta_dir: PathBuf,

        /// Output image path
        #[arg(long, default_value = "umap_plot.svg")]
        output: PathBuf,

        /// Embedding model: "prot-bert", "prot-bert-bfd", or a HuggingFace repo id
        #[arg(long, default_value = "prot-bert")]
        model: String,

        /// Run on CPU rather than on GPU
        #[arg(long)]
        cpu: bool,

        /// Principal components kept before the neighbor graph
        #[arg(long, default_value_t = 10)]
        n_components: usize,

        /// Neighborhood size for the UMAP graph
        #[arg(long, default_value_t = 15)]
        n_neighbors: usize,

        /// Seed for the stochastic layout optimization
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Plot {
                fasta_dir,
                output,
                model,
                cpu,
                n_components,
                n_neighbors,
                seed,
            } => commands::plot::execute(PlotConfig {
                fasta_dir,
                output,
                model_id: model,
                cpu,
                n_components,
                n_neighbors,
                seed,
            }),
        }
    }
}
