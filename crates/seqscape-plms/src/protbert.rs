//! ProtBert loading and embedding.
//!
//! Rostlab's ProtBert checkpoints are ordinary BERT encoders trained on
//! UniRef, so candle-transformers' `BertModel` runs them unmodified. The
//! vocabulary is per-residue: sequences are spaced out (`"M A F ..."`)
//! before tokenization.
use anyhow::{bail, Error as E, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use itertools::Itertools;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use crate::DTYPE;

/// Longest tokenized input fed to the encoder; longer sequences are truncated.
const MAX_TOKENS: usize = 1024;

/// Known ProtBert checkpoints on HuggingFace.
pub enum ProtBertModels {
    ProtBert,
    ProtBertBfd,
    /// Any other BERT-architecture checkpoint, by repo id.
    Custom(String),
}

impl ProtBertModels {
    pub fn from_id(id: &str) -> Self {
        match id {
            "prot-bert" => ProtBertModels::ProtBert,
            "prot-bert-bfd" => ProtBertModels::ProtBertBfd,
            other => ProtBertModels::Custom(other.to_string()),
        }
    }

    pub fn get_model_files(&self) -> (String, String) {
        let (repo, rev) = match self {
            ProtBertModels::ProtBert => ("Rostlab/prot_bert", "main"),
            ProtBertModels::ProtBertBfd => ("Rostlab/prot_bert_bfd", "main"),
            ProtBertModels::Custom(id) => (id.as_str(), "main"),
        };
        (repo.to_string(), rev.to_string())
    }
}

pub struct ProtBertRunner {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl ProtBertRunner {
    pub fn load_model(modeltype: ProtBertModels, device: Device) -> Result<ProtBertRunner> {
        let (model_id, revision) = modeltype.get_model_files();
        log::info!("loading {}", model_id);
        let repo = Repo::with_revision(model_id, RepoType::Model, revision);
        let (config_filename, tokenizer_filename, weights_filename) = {
            let api = Api::new()?;
            let api = api.repo(repo);
            let config = api.get("config.json")?;
            let tokenizer = api.get("tokenizer.json")?;
            let weights = api.get("model.safetensors")?;
            (config, tokenizer, weights)
        };
        let config_str = std::fs::read_to_string(config_filename)?;
        let config: Config = serde_json::from_str(&config_str)?;
        let mut tokenizer = Tokenizer::from_file(tokenizer_filename).map_err(E::msg)?;
        tokenizer.with_padding(Some(PaddingParams::default()));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(E::msg)?;
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_filename], DTYPE, &device)? };
        let model = BertModel::load(vb, &config)?;
        Ok(ProtBertRunner {
            model,
            tokenizer,
            device,
        })
    }

    /// Embeds a batch of sequences, one fixed-length vector per input.
    ///
    /// The batch is padded to its longest member, run through the encoder,
    /// and the last hidden state is mean-pooled over the token dimension,
    /// yielding an `[n, hidden]` tensor.
    pub fn embed(&self, sequences: &[String]) -> Result<Tensor> {
        if sequences.is_empty() {
            bail!("no sequences to embed");
        }
        let spaced: Vec<String> = sequences.iter().map(|s| spaced_residues(s)).collect();
        let encodings = self.tokenizer.encode_batch(spaced, true).map_err(E::msg)?;
        let token_ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let token_ids = Tensor::stack(&token_ids, 0)?;
        let attention_mask = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let attention_mask = Tensor::stack(&attention_mask, 0)?;
        let token_type_ids = token_ids.zeros_like()?;
        log::info!(
            "encoding {} sequence(s), {} token(s) each",
            token_ids.dim(0)?,
            token_ids.dim(1)?
        );
        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let (_n, n_tokens, _size) = hidden.dims3()?;
        let pooled = (hidden.sum(1)? / (n_tokens as f64))?;
        Ok(pooled)
    }
}

/// Inserts a single space between residues, as the ProtBert vocabulary expects.
pub fn spaced_residues(seq: &str) -> String {
    seq.chars().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaced_residues() {
        assert_eq!(spaced_residues("MAF"), "M A F");
        assert_eq!(spaced_residues("M"), "M");
        assert_eq!(spaced_residues(""), "");
    }

    #[test]
    fn test_model_id_mapping() {
        let (repo, rev) = ProtBertModels::from_id("prot-bert").get_model_files();
        assert_eq!(repo, "Rostlab/prot_bert");
        assert_eq!(rev, "main");
        let (repo, _) = ProtBertModels::from_id("prot-bert-bfd").get_model_files();
        assert_eq!(repo, "Rostlab/prot_bert_bfd");
        let (repo, _) = ProtBertModels::from_id("facebook/esm2_t6_8M_UR50D").get_model_files();
        assert_eq!(repo, "facebook/esm2_t6_8M_UR50D");
    }
}
