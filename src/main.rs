mod framing;
mod logging;
mod protocol;

use std::io::{stdin, stdout};

use base64::Engine as _;
use serde_json::Value;
use zerocopy::byteorder::little_endian::F32;
use zerocopy::IntoBytes;

use candle_columns::models::device::available_backends;
use candle_columns::{config, Engine, EmbeddingColumn, EmbeddingKwargs, ModelKey, TranslateKwargs};

use crate::protocol::{
    as_str_column, parse, EmbedTextBase64, EmbedTextJson, EmbedTextParams, EvictParams, ResponseErr, ResponseOk,
    TranslateParams, VectorEncoding,
};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("[column_host] fatal error: {e:?}");
        log::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    logging::init_logging()?;

    log::info!("=== Column Host Started ===");

    let engine = Engine::from_env();
    let mut in_stream = stdin();
    let mut out_stream = stdout();

    let mut message_count: u64 = 0;
    loop {
        let req = match framing::read_message(&mut in_stream) {
            Ok(Some(r)) => r,
            Ok(None) => {
                log::info!("No more messages after {} messages, exiting", message_count);
                break;
            }
            Err(e) => {
                log::error!("Error reading message: {:?}", e);
                break;
            }
        };

        message_count += 1;
        log::info!("Processing message #{}: {} (id: {})", message_count, req.method, req.id);

        let resp = match handle_request(&engine, &req.method, req.params) {
            Ok(result) => serde_json::to_value(ResponseOk { id: req.id, result })?,
            Err(e) => {
                log::error!("Handler error: {:#}", e);
                let kind = e
                    .downcast_ref::<candle_columns::Error>()
                    .map(candle_columns::Error::kind)
                    .unwrap_or("HostError");
                serde_json::to_value(ResponseErr {
                    id: req.id,
                    error: format!("{e:#}"),
                    kind: kind.to_string(),
                })?
            }
        };
        if let Err(e) = framing::write_json(&mut out_stream, &resp) {
            log::error!("Error sending response: {:?}", e);
            break;
        }
    }

    log::info!("=== Column Host Stopped ===");
    Ok(())
}

fn handle_request(engine: &Engine, method: &str, params: Value) -> anyhow::Result<Value> {
    match method {
        "hello" => handle_hello(),
        "embedText" => handle_embed_text(engine, params),
        "translate" => handle_translate(engine, params),
        "cacheStats" => handle_cache_stats(engine),
        "evict" => handle_evict(engine, params),
        _ => anyhow::bail!("Unknown method: {method}"),
    }
}

fn handle_hello() -> anyhow::Result<Value> {
    let (cuda, metal) = available_backends();
    Ok(serde_json::json!({
        "type": "hello-response",
        "hostVersion": config::HOST_VERSION,
        "devices": { "cpu": true, "cuda": cuda, "metal": metal }
    }))
}

fn handle_embed_text(engine: &Engine, params: Value) -> anyhow::Result<Value> {
    let params: EmbedTextParams = parse("params", params)?;
    let kwargs: EmbeddingKwargs = parse("kwargs", params.kwargs)?;
    let (repo, opts) = kwargs.into_options()?;

    let column = as_str_column(&params.column);
    log::debug!("embedText: {} rows, repo={}, {:?}", column.len(), repo, opts);
    let out = engine.embed_text(&column, &repo, &opts)?;

    let value = match params.encoding {
        VectorEncoding::Json => serde_json::to_value(EmbedTextJson {
            width: out.width(),
            null_count: out.null_count(),
            rows: out.into_rows(),
        })?,
        VectorEncoding::Base64 => serde_json::to_value(encode_base64(&out))?,
    };
    Ok(value)
}

fn encode_base64(column: &EmbeddingColumn) -> EmbedTextBase64 {
    let le: Vec<F32> = column.values().iter().map(|&v| F32::new(v)).collect();
    EmbedTextBase64 {
        width: column.width(),
        null_count: column.null_count(),
        validity: column.validity().to_vec(),
        values: base64::engine::general_purpose::STANDARD.encode(le.as_bytes()),
    }
}

fn handle_translate(engine: &Engine, params: Value) -> anyhow::Result<Value> {
    let params: TranslateParams = parse("params", params)?;
    let kwargs: TranslateKwargs = parse("kwargs", params.kwargs)?;
    let (repo, opts) = kwargs.into_options()?;

    let column = as_str_column(&params.column);
    log::debug!("translate: {} rows, repo={}, {:?}", column.len(), repo, opts);
    let rows = engine.translate(&column, &repo, &opts)?;
    Ok(serde_json::json!({ "rows": rows }))
}

fn handle_cache_stats(engine: &Engine) -> anyhow::Result<Value> {
    let keys: Vec<String> = engine.cache().keys().iter().map(ModelKey::to_string).collect();
    Ok(serde_json::json!({
        "stats": engine.cache().stats(),
        "models": keys
    }))
}

fn handle_evict(engine: &Engine, params: Value) -> anyhow::Result<Value> {
    let params: EvictParams = parse("params", params)?;
    let key = ModelKey::new(params.model_repo, params.device);
    let evicted = engine.cache().evict(&key);
    log::info!("Evict {}: {}", key, evicted);
    Ok(serde_json::json!({ "evicted": evicted }))
}
