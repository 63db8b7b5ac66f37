// registry.rs — Resolves a model repository name to a local directory of artifacts.
//
// A repository name that is an existing directory is used as-is. Anything else is
// fetched from the registry endpoint on first use and cached on disk at
// <cache_dir>/<owner>--<name>/. Each download goes to its own temp file next to the
// destination and is renamed into place once verified against the registry's SHA256,
// so concurrent resolves of one repo never share a partial file. Files already in the
// cache directory are never fetched again, which is also how converted tokenizers are
// supplied for repos that only ship SentencePiece models.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use sha2::{Digest, Sha256};

use crate::config::{self, EngineConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    SafeTensors(PathBuf),
    Pytorch(PathBuf),
}

impl WeightsFile {
    pub fn path(&self) -> &Path {
        match self {
            WeightsFile::SafeTensors(p) | WeightsFile::Pytorch(p) => p,
        }
    }
}

/// Everything needed to build a model entry.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub dir: PathBuf,
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    /// Decoder vocabulary for translation models that do not share one with the encoder.
    pub target_tokenizer: Option<PathBuf>,
    pub weights: WeightsFile,
}

impl ModelFiles {
    /// Collect artifacts from a directory that already holds them.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let config = dir.join(config::registry::CONFIG_FILE);
        let tokenizer = dir.join(config::registry::TOKENIZER_FILE);
        for required in [&config, &tokenizer] {
            if !required.is_file() {
                bail!("missing {} in {}", file_name(required), dir.display());
            }
        }

        let target_tokenizer = Some(dir.join(config::registry::TARGET_TOKENIZER_FILE)).filter(|p| p.is_file());

        let safetensors = dir.join(config::registry::SAFETENSORS_FILE);
        let pytorch = dir.join(config::registry::PYTORCH_FILE);
        let weights = if safetensors.is_file() {
            WeightsFile::SafeTensors(safetensors)
        } else if pytorch.is_file() {
            WeightsFile::Pytorch(pytorch)
        } else {
            bail!(
                "no weights in {} (expected {} or {})",
                dir.display(),
                config::registry::SAFETENSORS_FILE,
                config::registry::PYTORCH_FILE
            );
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            tokenizer,
            target_tokenizer,
            weights,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    endpoint: String,
    revision: String,
    cache_dir: PathBuf,
    offline: bool,
}

impl ModelRegistry {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            endpoint: cfg.hub_endpoint.trim_end_matches('/').to_string(),
            revision: cfg.revision.clone(),
            cache_dir: cfg.cache_dir.clone(),
            offline: cfg.offline,
        }
    }

    /// Local directory for a repository in the download cache.
    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.cache_dir.join(repo.replace('/', "--"))
    }

    pub fn resolve(&self, repo: &str) -> anyhow::Result<ModelFiles> {
        let local = Path::new(repo);
        if local.is_dir() {
            log::info!("Using local model directory {}", local.display());
            return ModelFiles::from_dir(local);
        }

        validate_repo_name(repo)?;
        let dir = self.repo_dir(repo);

        if self.offline {
            log::info!("Offline mode: resolving {} from {}", repo, dir.display());
            return ModelFiles::from_dir(&dir)
                .with_context(|| format!("{repo} is not cached and offline mode is on"));
        }

        fs::create_dir_all(&dir).with_context(|| format!("failed to create model dir {}", dir.display()))?;

        if !self.ensure_file(repo, &dir, config::registry::CONFIG_FILE)? {
            bail!("{repo} has no {}", config::registry::CONFIG_FILE);
        }
        if !self.ensure_file(repo, &dir, config::registry::TOKENIZER_FILE)? {
            // Marian (opus-mt) repos ship source.spm/target.spm only.
            bail!(
                "{repo} has no {}. Marian (opus-mt) repos need converted tokenizers: place {} \
                 (and {} for a separate target vocabulary) in {}, or pass a local model directory",
                config::registry::TOKENIZER_FILE,
                config::registry::TOKENIZER_FILE,
                config::registry::TARGET_TOKENIZER_FILE,
                dir.display()
            );
        }
        self.ensure_file(repo, &dir, config::registry::TARGET_TOKENIZER_FILE)?;

        if !self.ensure_file(repo, &dir, config::registry::SAFETENSORS_FILE)?
            && !self.ensure_file(repo, &dir, config::registry::PYTORCH_FILE)?
        {
            bail!(
                "{repo} has neither {} nor {}",
                config::registry::SAFETENSORS_FILE,
                config::registry::PYTORCH_FILE
            );
        }

        ModelFiles::from_dir(&dir)
    }

    /// Make sure `name` exists in `dir`, downloading it if needed.
    /// Returns false if the registry does not have the file.
    fn ensure_file(&self, repo: &str, dir: &Path, name: &str) -> anyhow::Result<bool> {
        let dest = dir.join(name);
        if dest.is_file() {
            log::debug!("{} already cached at {}", name, dest.display());
            return Ok(true);
        }
        let url = format!("{}/{}/resolve/{}/{}", self.endpoint, repo, self.revision, name);
        download_and_verify(&url, &dest)
    }
}

/// Download a file from URL, verifying its SHA256 if the server advertises it.
/// Returns Ok(false) on 404.
fn download_and_verify(url: &str, dest: &Path) -> anyhow::Result<bool> {
    let filename = file_name(dest);
    log::info!("Downloading {} from {}", filename, url);

    let Some((resp, expected_sha256)) = fetch(url)? else {
        log::debug!("{} not present at {}", filename, url);
        return Ok(false);
    };

    // Unique per download; removed on drop unless persisted.
    let parent = dest
        .parent()
        .with_context(|| format!("{} has no parent directory", dest.display()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{filename}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;

    let mut hasher = Sha256::new();
    let mut reader = resp.into_reader();
    let mut buf = vec![0u8; 1 << 16];
    let mut total: u64 = 0;
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("failed to read response body for {url}"))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        tmp.write_all(&buf[..n])
            .with_context(|| format!("failed to write {}", tmp.path().display()))?;
        total += n as u64;
    }
    tmp.flush()?;

    let actual_hash = hex::encode(hasher.finalize());
    if let Some(expected) = expected_sha256 {
        if actual_hash != expected {
            bail!(
                "SHA256 mismatch for {}: expected {}, got {}",
                filename,
                expected,
                actual_hash
            );
        }
        log::info!("SHA256 verified for {} ({})", filename, &actual_hash[..12]);
    }

    if let Err(e) = tmp.persist(dest) {
        // Another resolve of the same repo may have won the race.
        if !dest.is_file() {
            return Err(e.error).with_context(|| format!("failed to move download into {}", dest.display()));
        }
        log::debug!("{} was stored concurrently", dest.display());
    }

    log::info!("Downloaded {} ({} bytes)", filename, total);
    Ok(true)
}

/// GET `url`, following redirects by hand so the hash the registry puts on the
/// redirect itself is not lost. Returns the final response and the SHA256 to
/// verify against, or None on 404.
fn fetch(url: &str) -> anyhow::Result<Option<(ureq::Response, Option<String>)>> {
    let agent = ureq::AgentBuilder::new()
        .redirects(0)
        .timeout(Duration::from_secs(config::registry::DOWNLOAD_TIMEOUT_SECS))
        .build();

    let mut current = url.to_string();
    let mut linked_sha256 = None;
    for _ in 0..=config::registry::MAX_REDIRECTS {
        let resp = match agent.get(&current).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("failed to download {current}")),
        };
        if linked_sha256.is_none() {
            linked_sha256 = advertised_sha256(resp.header(config::registry::SHA256_HEADER));
        }
        if !(300..400).contains(&resp.status()) {
            let expected = linked_sha256.or_else(|| advertised_sha256(resp.header("etag")));
            return Ok(Some((resp, expected)));
        }
        let location = resp
            .header("location")
            .with_context(|| format!("redirect from {current} has no Location"))?;
        log::debug!("{} redirected to {}", current, location);
        current = redirect_target(&current, location);
    }
    bail!("too many redirects for {url}")
}

fn redirect_target(from: &str, location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }
    if location.starts_with('/') {
        let after_scheme = from.find("://").map_or(0, |i| i + 3);
        let origin_end = from[after_scheme..].find('/').map_or(from.len(), |i| after_scheme + i);
        return format!("{}{}", &from[..origin_end], location);
    }
    let base_end = from.rfind('/').map_or(from.len(), |i| i + 1);
    format!("{}{}", &from[..base_end], location)
}

/// Registry hashes come quoted (`"abc…"`); only 64-hex values are SHA256.
fn advertised_sha256(header: Option<&str>) -> Option<String> {
    let v = header?.trim().trim_start_matches("W/").trim_matches('"').to_ascii_lowercase();
    (v.len() == 64 && v.chars().all(|c| c.is_ascii_hexdigit())).then_some(v)
}

fn validate_repo_name(repo: &str) -> anyhow::Result<()> {
    let ok = !repo.is_empty()
        && repo.split('/').count() <= 2
        && repo
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..")
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if !ok {
        bail!("{repo:?} is neither a local directory nor a valid repository name");
    }
    Ok(())
}

fn file_name(p: &Path) -> String {
    p.file_name().unwrap_or_default().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scratch_dir;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Route {
        status: u16,
        headers: Vec<(&'static str, String)>,
        body: Vec<u8>,
        // Promise more bytes than are sent, then hang up.
        cut_short: bool,
    }

    impl Route {
        fn ok(body: &[u8]) -> Self {
            Self { status: 200, headers: Vec::new(), body: body.to_vec(), cut_short: false }
        }

        fn redirect(location: &str, linked_sha256: &str) -> Self {
            Self {
                status: 302,
                headers: vec![
                    ("Location", location.to_string()),
                    ("X-Linked-Etag", format!("\"{linked_sha256}\"")),
                ],
                body: Vec::new(),
                cut_short: false,
            }
        }

        fn header(mut self, name: &'static str, value: &str) -> Self {
            self.headers.push((name, value.to_string()));
            self
        }
    }

    /// Minimal HTTP/1.1 registry on localhost. Unknown paths are 404.
    struct LocalHub {
        endpoint: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl LocalHub {
        fn start(routes: Vec<(&str, Route)>, body_delay: Duration) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let endpoint = format!("http://{}", listener.local_addr().unwrap());
            let routes: Arc<HashMap<String, Route>> =
                Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
            let requests = Arc::new(Mutex::new(Vec::new()));

            let seen = Arc::clone(&requests);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    let routes = Arc::clone(&routes);
                    let seen = Arc::clone(&seen);
                    std::thread::spawn(move || respond(stream, &routes, &seen, body_delay));
                }
            });
            Self { endpoint, requests }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.endpoint, path)
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn registry(&self, cache_dir: &Path) -> ModelRegistry {
            ModelRegistry::new(&EngineConfig {
                cache_dir: cache_dir.to_path_buf(),
                hub_endpoint: self.endpoint.clone(),
                offline: false,
                ..EngineConfig::default()
            })
        }
    }

    fn respond(mut stream: TcpStream, routes: &HashMap<String, Route>, seen: &Mutex<Vec<String>>, delay: Duration) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => {}
            }
        }
        let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
        seen.lock().unwrap().push(path.clone());

        let route = routes.get(&path).cloned().unwrap_or(Route {
            status: 404,
            headers: Vec::new(),
            body: b"Entry not found".to_vec(),
            cut_short: false,
        });
        let reason = match route.status {
            200 => "OK",
            302 => "Found",
            404 => "Not Found",
            _ => "Status",
        };
        let declared = route.body.len() + if route.cut_short { 1024 } else { 0 };
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            route.status, reason, declared
        );
        for (name, value) in &route.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");

        let (first, rest) = route.body.split_at(route.body.len() / 2);
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(first);
        let _ = stream.flush();
        std::thread::sleep(delay);
        let _ = stream.write_all(rest);
        let _ = stream.flush();
    }

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_advertised_sha256() {
        let sha = "53aa51172d142c89d9012cce15ae4d6cc0ca6895895114379cacb4fab128d9db";
        assert_eq!(advertised_sha256(Some(&format!("\"{sha}\""))), Some(sha.to_string()));
        // Git blob ids are SHA1 and are not used for verification.
        assert_eq!(advertised_sha256(Some("\"0a6f3b6c1e0b8e7e2d1c2b4a5f6e7d8c9b0a1f2e\"")), None);
        assert_eq!(advertised_sha256(None), None);
    }

    #[test]
    fn test_repo_names() {
        assert!(validate_repo_name("sentence-transformers/all-MiniLM-L6-v2").is_ok());
        assert!(validate_repo_name("bert-base-uncased").is_ok());
        assert!(validate_repo_name("../etc").is_err());
        assert!(validate_repo_name("a/b/c").is_err());
        assert!(validate_repo_name("a//b").is_err());
        assert!(validate_repo_name("a b").is_err());
    }

    #[test]
    fn test_redirect_target() {
        let from = "https://hub.example/org/m/resolve/main/model.safetensors";
        assert_eq!(redirect_target(from, "https://cdn.example/x/y"), "https://cdn.example/x/y");
        assert_eq!(redirect_target(from, "/api/blobs/abc"), "https://hub.example/api/blobs/abc");
        assert_eq!(
            redirect_target(from, "model.bin"),
            "https://hub.example/org/m/resolve/main/model.bin"
        );
    }

    #[test]
    fn test_from_dir_prefers_safetensors() {
        let dir = scratch_dir("prefers");
        for f in ["config.json", "tokenizer.json", "model.safetensors", "pytorch_model.bin"] {
            fs::write(dir.path().join(f), b"{}").unwrap();
        }
        let files = ModelFiles::from_dir(dir.path()).unwrap();
        assert_eq!(files.weights, WeightsFile::SafeTensors(dir.path().join("model.safetensors")));
        assert!(files.target_tokenizer.is_none());
    }

    #[test]
    fn test_from_dir_missing_weights() {
        let dir = scratch_dir("noweights");
        fs::write(dir.path().join("config.json"), b"{}").unwrap();
        fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();
        let err = ModelFiles::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no weights"));
    }

    #[test]
    fn test_offline_uncached_repo_fails() {
        let dir = scratch_dir("offline");
        let cfg = EngineConfig {
            cache_dir: dir.path().to_path_buf(),
            offline: true,
            ..EngineConfig::default()
        };
        let registry = ModelRegistry::new(&cfg);
        assert_eq!(registry.repo_dir("org/model"), dir.path().join("org--model"));
        let err = registry.resolve("org/model").unwrap_err();
        assert!(format!("{err:#}").contains("offline"));
    }

    #[test]
    fn test_download_not_found() {
        let hub = LocalHub::start(Vec::new(), Duration::ZERO);
        let dir = scratch_dir("dl-404");
        let dest = dir.path().join("model.safetensors");

        let found = download_and_verify(&hub.url("/org/m/resolve/main/model.safetensors"), &dest).unwrap();
        assert!(!found);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_download_follows_redirect_and_verifies_linked_hash() {
        let weights = vec![7u8; 100_000];
        let hub = LocalHub::start(
            vec![
                (
                    "/org/m/resolve/main/model.safetensors",
                    Route::redirect("/cdn/blob", &sha256_hex(&weights)),
                ),
                // The CDN's own ETag is not a SHA256 and must not replace the linked one.
                ("/cdn/blob", Route::ok(&weights).header("ETag", "\"abc123-1\"")),
            ],
            Duration::ZERO,
        );
        let dir = scratch_dir("dl-redirect");
        let dest = dir.path().join("model.safetensors");

        assert!(download_and_verify(&hub.url("/org/m/resolve/main/model.safetensors"), &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), weights);
        assert_eq!(dir_entries(dir.path()), vec!["model.safetensors"]);
        assert_eq!(hub.requests(), vec!["/org/m/resolve/main/model.safetensors", "/cdn/blob"]);
    }

    #[test]
    fn test_download_hash_mismatch_leaves_nothing() {
        let hub = LocalHub::start(
            vec![
                (
                    "/org/m/resolve/main/model.safetensors",
                    Route::redirect("/cdn/blob", &sha256_hex(b"the real weights")),
                ),
                ("/cdn/blob", Route::ok(b"tampered weights")),
            ],
            Duration::ZERO,
        );
        let dir = scratch_dir("dl-mismatch");
        let dest = dir.path().join("model.safetensors");

        let err = download_and_verify(&hub.url("/org/m/resolve/main/model.safetensors"), &dest).unwrap_err();
        assert!(err.to_string().contains("SHA256 mismatch"));
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_download_etag_checked_without_redirect() {
        let body = b"{\"architectures\": []}";
        let hub = LocalHub::start(
            vec![(
                "/org/m/resolve/main/config.json",
                Route::ok(body).header("ETag", &format!("\"{}\"", sha256_hex(b"something else"))),
            )],
            Duration::ZERO,
        );
        let dir = scratch_dir("dl-etag");
        let dest = dir.path().join("config.json");

        assert!(download_and_verify(&hub.url("/org/m/resolve/main/config.json"), &dest).is_err());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_download_cut_short_leaves_nothing() {
        let hub = LocalHub::start(
            vec![("/org/m/resolve/main/model.safetensors", Route {
                cut_short: true,
                ..Route::ok(&[1u8; 4096])
            })],
            Duration::ZERO,
        );
        let dir = scratch_dir("dl-short");
        let dest = dir.path().join("model.safetensors");

        assert!(download_and_verify(&hub.url("/org/m/resolve/main/model.safetensors"), &dest).is_err());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_resolve_uses_cached_files_without_network() {
        let hub = LocalHub::start(Vec::new(), Duration::ZERO);
        let cache = scratch_dir("resolve-cached");
        let registry = hub.registry(cache.path());
        let repo_dir = registry.repo_dir("org/m");
        fs::create_dir_all(&repo_dir).unwrap();
        for f in ["config.json", "tokenizer.json", "tokenizer_target.json", "model.safetensors"] {
            fs::write(repo_dir.join(f), b"{}").unwrap();
        }

        let files = registry.resolve("org/m").unwrap();
        assert_eq!(files.dir, repo_dir);
        assert!(files.target_tokenizer.is_some());
        assert!(hub.requests().is_empty());
    }

    #[test]
    fn test_resolve_with_placed_tokenizers() {
        // Repo ships config and weights but only SentencePiece vocabularies.
        let hub = LocalHub::start(
            vec![
                ("/Helsinki-NLP/opus-mt-en-de/resolve/main/config.json", Route::ok(b"{}")),
                ("/Helsinki-NLP/opus-mt-en-de/resolve/main/model.safetensors", Route::ok(b"weights")),
            ],
            Duration::ZERO,
        );
        let cache = scratch_dir("resolve-marian");
        let registry = hub.registry(cache.path());

        let err = registry.resolve("Helsinki-NLP/opus-mt-en-de").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("has no tokenizer.json"));
        assert!(msg.contains("converted tokenizers"));

        let repo_dir = registry.repo_dir("Helsinki-NLP/opus-mt-en-de");
        fs::write(repo_dir.join("tokenizer.json"), b"{}").unwrap();
        fs::write(repo_dir.join("tokenizer_target.json"), b"{}").unwrap();
        let files = registry.resolve("Helsinki-NLP/opus-mt-en-de").unwrap();
        assert_eq!(files.tokenizer, repo_dir.join("tokenizer.json"));
        assert_eq!(files.target_tokenizer, Some(repo_dir.join("tokenizer_target.json")));
        assert_eq!(
            hub.requests().iter().filter(|p| p.ends_with("/tokenizer.json")).count(),
            1
        );
    }

    #[test]
    fn test_concurrent_resolve_of_one_repo() {
        let weights = vec![3u8; 256 * 1024];
        let weights_sha = sha256_hex(&weights);
        let hub = LocalHub::start(
            vec![
                ("/org/m/resolve/main/config.json", Route::ok(b"{}")),
                ("/org/m/resolve/main/tokenizer.json", Route::ok(b"{}")),
                ("/org/m/resolve/main/model.safetensors", Route::redirect("/cdn/weights", &weights_sha)),
                ("/cdn/weights", Route::ok(&weights)),
            ],
            // Keeps both downloads in flight at the same time.
            Duration::from_millis(200),
        );
        let cache = scratch_dir("resolve-race");
        let registry = hub.registry(cache.path());

        let results: Vec<anyhow::Result<ModelFiles>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2).map(|_| s.spawn(|| registry.resolve("org/m"))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for result in &results {
            assert!(result.is_ok(), "{:#}", result.as_ref().unwrap_err());
        }

        let repo_dir = registry.repo_dir("org/m");
        assert_eq!(fs::read(repo_dir.join("model.safetensors")).unwrap(), weights);
        assert_eq!(dir_entries(&repo_dir), vec!["config.json", "model.safetensors", "tokenizer.json"]);
    }
}
