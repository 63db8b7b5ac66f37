// testing.rs — Tiny on-disk models for tests that must not touch the network.
//
// Weights are random, so outputs carry no meaning; they are still deterministic for a
// given fixture, which is all the engine tests rely on.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use serde_json::json;
use tempfile::TempDir;
use tokenizers::Tokenizer;

pub const PAD_ID: u32 = 0;
pub const CLS_ID: u32 = 1;
pub const SEP_ID: u32 = 2;
pub const HIDDEN_SIZE: usize = 16;

const WORDS: &[&str] = &[
    "a", "sentence", "another", "the", "cat", "sat", "on", "mat", "dog", "ran", "hello", "world",
];

/// A fresh, empty directory under the system temp dir, removed when the guard drops.
pub fn scratch_dir(name: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("candle_columns-{name}-"))
        .tempdir()
        .unwrap()
}

fn added_token(id: u32, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "content": content,
        "single_word": false,
        "lstrip": false,
        "rstrip": false,
        "normalized": false,
        "special": true
    })
}

fn tokenizer_json(specials: &[&str], extra: &[&str], post_processor: serde_json::Value) -> String {
    let mut vocab = serde_json::Map::new();
    let mut added = Vec::new();
    for (id, tok) in specials.iter().enumerate() {
        vocab.insert(tok.to_string(), json!(id));
        added.push(added_token(id as u32, tok));
    }
    for tok in extra.iter().chain(WORDS) {
        vocab.insert(tok.to_string(), json!(vocab.len()));
    }
    let unk = specials.iter().find(|t| t.contains("unk") || t.contains("UNK")).copied().unwrap_or("[UNK]");

    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added,
        "normalizer": null,
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": post_processor,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": unk }
    })
    .to_string()
}

fn bert_tokenizer_json(with_bert_processing: bool) -> String {
    let post = if with_bert_processing {
        json!({ "type": "BertProcessing", "sep": ["[SEP]", SEP_ID], "cls": ["[CLS]", CLS_ID] })
    } else {
        serde_json::Value::Null
    };
    tokenizer_json(&["[PAD]", "[CLS]", "[SEP]", "[UNK]"], &[], post)
}

/// Whitespace word-level tokenizer over a dozen words. With BERT processing, every
/// encoding is wrapped in `[CLS] … [SEP]`.
pub fn word_tokenizer(with_bert_processing: bool) -> Tokenizer {
    bert_tokenizer_json(with_bert_processing).parse().unwrap()
}

/// config.json, tokenizer.json and model.safetensors of a two-layer BERT.
pub fn write_tiny_bert(dir: &Path) {
    let config = json!({
        "model_type": "bert",
        "architectures": ["BertModel"],
        "vocab_size": 4 + WORDS.len(),
        "hidden_size": HIDDEN_SIZE,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 32,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "attention_probs_dropout_prob": 0.0,
        "max_position_embeddings": 64,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": PAD_ID,
        "position_embedding_type": "absolute",
        "use_cache": false,
        "classifier_dropout": null
    });
    let cfg: BertConfig = serde_json::from_value(config.clone()).unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    BertModel::load(vb, &cfg).unwrap();

    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
    std::fs::write(dir.join("tokenizer.json"), bert_tokenizer_json(true)).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();
}

pub const MARIAN_EOS_ID: u32 = 0;
pub const MARIAN_PAD_ID: u32 = 2;

/// config.json, tokenizer.json and model.safetensors of a one-layer Marian model that
/// accepts `>>deu<<` and `>>fra<<`.
pub fn write_tiny_marian(dir: &Path) {
    let vocab_size = 3 + 2 + WORDS.len();
    let config = json!({
        "model_type": "marian",
        "architectures": ["MarianMTModel"],
        "vocab_size": vocab_size,
        "decoder_vocab_size": vocab_size,
        "max_position_embeddings": 64,
        "encoder_layers": 1,
        "encoder_ffn_dim": 32,
        "encoder_attention_heads": 2,
        "decoder_layers": 1,
        "decoder_ffn_dim": 32,
        "decoder_attention_heads": 2,
        "use_cache": true,
        "is_encoder_decoder": true,
        "activation_function": "swish",
        "d_model": HIDDEN_SIZE,
        "decoder_start_token_id": MARIAN_PAD_ID,
        "scale_embedding": true,
        "pad_token_id": MARIAN_PAD_ID,
        "eos_token_id": MARIAN_EOS_ID,
        "forced_eos_token_id": MARIAN_EOS_ID,
        "share_encoder_decoder_embeddings": true
    });
    let cfg: MarianConfig = serde_json::from_value(config.clone()).unwrap();

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    MTModel::new(&cfg, vb).unwrap();

    let tokenizer = tokenizer_json(&["</s>", "<unk>", "<pad>"], &[">>deu<<", ">>fra<<"], serde_json::Value::Null);

    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
    std::fs::write(dir.join("tokenizer.json"), tokenizer).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();
}

#[test]
fn test_word_tokenizer_ids() {
    let tok = word_tokenizer(true);
    let enc = tok.encode("a sentence", true).unwrap();
    assert_eq!(enc.get_ids(), &[CLS_ID, 4, 5, SEP_ID]);
}

#[test]
fn test_fixture_dir_removed_on_drop() {
    let dir = scratch_dir("fixture");
    write_tiny_bert(dir.path());
    let path = dir.path().to_path_buf();
    assert!(path.join("model.safetensors").is_file());
    drop(dir);
    assert!(!path.exists());
}
