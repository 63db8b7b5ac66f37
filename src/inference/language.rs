// language.rs — Which languages a translation model accepts, and the control tokens
// that select them.
//
// Multilingual Marian models pick the target with a `>>xxx<<` token at the start of the
// source text. Bilingual ones have no such tokens; their pair is only visible in the
// repository name (`opus-mt-en-de`, `opus-mt-tc-big-fr-en`).

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageSupport {
    /// Target code → id of its `>>code<<` token.
    targets: BTreeMap<String, u32>,
    /// (source, target) declared by the repository name.
    pair: Option<(String, String)>,
}

impl LanguageSupport {
    pub fn from_vocab(vocab: &HashMap<String, u32>, repo: &str) -> Self {
        let targets = vocab
            .iter()
            .filter_map(|(tok, &id)| language_of_token(tok).map(|code| (code.to_string(), id)))
            .collect();
        Self {
            targets,
            pair: pair_from_repo(repo),
        }
    }

    pub fn is_multilingual(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn target_codes(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Control tokens to put in front of every source row. Fails for any language the
    /// model cannot be shown to handle.
    pub fn prefix_for(&self, target: &str, source: Option<&str>, repo: &str) -> Result<Vec<u32>> {
        let unsupported = |language: &str| Error::UnsupportedLanguage {
            language: language.to_string(),
            repo: repo.to_string(),
        };

        if let (Some(source), Some((declared, _))) = (source, &self.pair) {
            if is_single_language(declared) && !declared.eq_ignore_ascii_case(source) {
                return Err(unsupported(source));
            }
        }

        if self.is_multilingual() {
            return match self.targets.get(target) {
                Some(&id) => Ok(vec![id]),
                None => Err(unsupported(target)),
            };
        }

        match &self.pair {
            Some((_, declared)) if is_single_language(declared) && !declared.eq_ignore_ascii_case(target) => {
                Err(unsupported(target))
            }
            Some(_) => Ok(Vec::new()),
            None => {
                log::warn!(
                    "{} declares no languages; assuming it translates into {:?}",
                    repo,
                    target
                );
                Ok(Vec::new())
            }
        }
    }
}

/// `>>fra<<` → `fra`
pub fn language_of_token(token: &str) -> Option<&str> {
    let code = token.strip_prefix(">>")?.strip_suffix("<<")?;
    (!code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')).then_some(code)
}

/// Remove `>>xxx<<` control tokens a decoder may have echoed into the text.
/// Everything else, newlines and runs of spaces included, is kept as is.
pub fn strip_control_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(">>") {
        let after = &rest[start + 2..];
        let token_len = after.find("<<").map(|end| end + 4);
        match token_len.filter(|&len| language_of_token(&rest[start..start + len]).is_some()) {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + len..];
                // One separating space goes with the token.
                rest = rest.strip_prefix(' ').unwrap_or(rest);
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

fn pair_from_repo(repo: &str) -> Option<(String, String)> {
    let name = repo.rsplit('/').next()?;
    let rest = name.strip_prefix("opus-mt-")?;
    let rest = rest
        .strip_prefix("tc-big-")
        .or_else(|| rest.strip_prefix("tc-base-"))
        .unwrap_or(rest);
    let mut parts = rest.split('-');
    let (src, tgt) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || src.is_empty() || tgt.is_empty() {
        return None;
    }
    Some((src.to_string(), tgt.to_string()))
}

// Group names like `ROMANCE` or `mul` stand for many languages and are never checked.
fn is_single_language(code: &str) -> bool {
    code != "mul" && code.len() <= 3 && code.chars().all(|c| c.is_ascii_lowercase())
}
