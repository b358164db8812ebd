//! Command implementations
//!
//! Wires the pipeline together from config once per invocation, then runs
//! one stage (or the whole chain) and prints the result.

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use streamgate::extract::builtin;
use streamgate::store::{check_magnets, HttpStore};
use streamgate::{
    AddonClient, Aggregator, Config, ExtractorCache, MediaId, PassthroughIssuer, PlaybackResult,
    ResolveRequest, Resolver, StoreBinding, StoreName, StreamTemplate, StreamsOptions, Upstream,
};

use crate::cli::ExitCode;

/// Everything a command needs, built from config
struct Pipeline {
    config: Config,
    aggregator: Aggregator,
    upstreams: Vec<Upstream>,
    bindings: Vec<StoreBinding>,
    resolver: Resolver,
}

fn build_pipeline(config: Config) -> Result<Pipeline> {
    let extractors = ExtractorCache::new();

    let mut upstreams = Vec::with_capacity(config.upstreams.len());
    for up in &config.upstreams {
        let blob: &str = match up.extractor.as_deref() {
            Some(reference) => match builtin::ruleset(reference) {
                Some(seed) => seed,
                None => reference,
            },
            None => "",
        };
        let extractor = extractors
            .get(blob)
            .with_context(|| format!("bad extractor for upstream {}", up.label()))?;
        upstreams.push(Upstream {
            name: up.label(),
            url: up.url.clone(),
            extractor,
            reconfigure_store: up.reconfigure_store,
            no_content_proxy: up.no_content_proxy,
        });
    }

    let template = match &config.template {
        Some(blob) => blob.parse().context("bad display template")?,
        None => Some(StreamTemplate::default_template()),
    };

    let mut bindings = Vec::with_capacity(config.stores.len());
    for store in &config.stores {
        let name = StoreName::from_name(&store.name)
            .or_else(|| StoreName::from_code(&store.name))
            .ok_or_else(|| anyhow!("unknown store {:?}", store.name))?;
        bindings.push(StoreBinding {
            store: Arc::new(HttpStore::new(name, store.api_url.clone())),
            token: store.token.clone(),
        });
    }

    let sort = streamgate::rank::parse_sort_config(&config.sort);
    let aggregator = Aggregator::new(AddonClient::new(), template, sort);
    let resolver = Resolver::new(Arc::new(PassthroughIssuer), config.static_video_base());

    Ok(Pipeline {
        config,
        aggregator,
        upstreams,
        bindings,
        resolver,
    })
}

pub async fn cmd_streams(config: Config, id: &str, cached_only: bool, json: bool) -> ExitCode {
    let media = match MediaId::parse(id) {
        Ok(media) => media,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::InvalidArgs;
        }
    };

    let pipeline = match build_pipeline(config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::InvalidArgs;
        }
    };

    let wrapped = match pipeline
        .aggregator
        .fetch_streams(&pipeline.upstreams, &media)
        .await
    {
        Ok(wrapped) => wrapped,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::NetworkError;
        }
    };
    debug!(count = wrapped.len(), "aggregated streams");

    let opts = StreamsOptions {
        base_url: &pipeline.config.base_url,
        cached_only: cached_only || pipeline.config.cached_only,
        client_ip: None,
        proxy_authorized: false,
    };
    let streams = match streamgate::stream::aggregate::build_playable_streams(
        wrapped,
        &pipeline.bindings,
        &PassthroughIssuer,
        &media,
        &opts,
    )
    .await
    {
        Ok(streams) => streams,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::NetworkError;
        }
    };

    if streams.is_empty() {
        if json {
            println!("{}", json!({ "streams": [] }));
        } else {
            eprintln!("no streams found for {}", media);
        }
        return ExitCode::NoStreams;
    }

    if json {
        let value = json!({
            "streams": streams
                .iter()
                .map(|s| json!({
                    "name": s.name,
                    "description": s.description,
                    "url": s.url,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        for stream in &streams {
            println!("{}", stream.name.replace('\n', " "));
            for line in stream.description.lines() {
                println!("    {}", line);
            }
            println!("    → {}", stream.url);
        }
        println!("{} stream(s)", streams.len());
    }
    ExitCode::Success
}

pub async fn cmd_check(config: Config, hashes: &[String], json: bool) -> ExitCode {
    let mut normalized = Vec::with_capacity(hashes.len());
    for input in hashes {
        match streamgate::models::normalize_hash(input) {
            Some(hash) => normalized.push(hash),
            None => {
                eprintln!("error: invalid hash {:?}", input);
                return ExitCode::InvalidArgs;
            }
        }
    }

    let pipeline = match build_pipeline(config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::InvalidArgs;
        }
    };

    let outcome = match check_magnets(&pipeline.bindings, &normalized, None, None).await {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::NetworkError;
        }
    };

    if json {
        let value = json!({
            "cached": normalized
                .iter()
                .map(|hash| json!({ "hash": hash, "store": outcome.store_code(hash) }))
                .collect::<Vec<_>>(),
            "has_error": outcome.has_error,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        for hash in &normalized {
            match outcome.store_code(hash) {
                Some(code) => println!("{}  cached [{}]", hash, code),
                None => println!("{}  not cached", hash),
            }
        }
    }
    ExitCode::Success
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_resolve(
    config: Config,
    hash: &str,
    store_code: &str,
    file_idx: Option<i64>,
    file_name: Option<String>,
    sid: Option<String>,
    pattern: Option<String>,
    json: bool,
) -> ExitCode {
    let Some(hash) = streamgate::models::normalize_hash(hash) else {
        eprintln!("error: invalid hash {:?}", hash);
        return ExitCode::InvalidArgs;
    };

    let media_id = match sid.as_deref().map(MediaId::parse).transpose() {
        Ok(media_id) => media_id,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::InvalidArgs;
        }
    };

    let pipeline = match build_pipeline(config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::InvalidArgs;
        }
    };

    let Some(binding) = pipeline
        .bindings
        .iter()
        .find(|b| b.code().eq_ignore_ascii_case(store_code))
        .cloned()
    else {
        eprintln!("error: no configured store with code {:?}", store_code);
        return ExitCode::InvalidArgs;
    };

    let result = pipeline
        .resolver
        .resolve(ResolveRequest {
            binding,
            hash,
            file_idx: file_idx.unwrap_or(-1),
            file_name: file_name.unwrap_or_default(),
            media_id,
            pattern,
            client_ip: None,
        })
        .await;

    match &result {
        PlaybackResult::Link(url) => {
            if json {
                println!("{}", json!({ "url": url }));
            } else {
                println!("{}", url);
            }
            ExitCode::Success
        }
        PlaybackResult::Fallback { class, url } => {
            if json {
                println!("{}", json!({ "url": url, "failure": class.as_str() }));
            } else {
                eprintln!("resolution failed: {}", class.as_str());
                println!("{}", url);
            }
            ExitCode::ResolveFailed
        }
    }
}
