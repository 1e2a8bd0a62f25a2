//! The `plot` command: FASTA directory → embeddings → UMAP scatter plot.
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use seqscape_plms::{device, ProtBertModels, ProtBertRunner};
use seqscape_umap::{Pca, PcaConfig, Umap, UmapConfig};
use std::path::PathBuf;

pub struct PlotConfig {
    pub fasta_dir: PathBuf,
    pub output: PathBuf,
    pub model_id: String,
    pub cpu: bool,
    pub n_components: usize,
    pub n_neighbors: usize,
    pub seed: u64,
}

pub fn execute(config: PlotConfig) -> Result<()> {
    let sequences = seqscape_io::load_sequences(&config.fasta_dir)?;
    if sequences.is_empty() {
        bail!("no sequences found in {}", config.fasta_dir.display());
    }
    log::info!(
        "loaded {} sequence(s) from {}",
        sequences.len(),
        config.fasta_dir.display()
    );

    let device = device(config.cpu)?;
    let runner = ProtBertRunner::load_model(ProtBertModels::from_id(&config.model_id), device)?;
    let embeddings = runner.embed(&sequences)?;
    let (n, hidden) = embeddings.dims2()?;
    log::info!("embeddings: {} x {}", n, hidden);

    let flat: Vec<f32> = embeddings.to_vec2::<f32>()?.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((n, hidden), flat)?;

    let reduced = Pca::new(PcaConfig {
        n_components: config.n_components,
    })
    .fit_transform(&matrix);
    let layout = Umap::new(UmapConfig {
        n_neighbors: config.n_neighbors,
        seed: config.seed,
        ..Default::default()
    })
    .fit(&reduced);

    seqscape_umap::scatter::save(&config.output, &layout, &sequences)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    log::info!("wrote {}", config.output.display());
    Ok(())
}
