//! Prompt templates for the two completion-backed steps
//!
//! `extract_offers` asks a model to list the offers on a page and
//! `extract_food_items` asks it to break a restaurant's offers into food
//! items. Both ship embedded in the binary. A file with the same id in the
//! override directory (~/.local/share/tilbod/prompts/overrides/) replaces the
//! embedded text without a rebuild.
//!
//! A prompt file is a YAML header between `---` lines followed by the body.
//! The body names its inputs as `{{placeholder}}`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

const EMBEDDED_EXTRACT_OFFERS: &str = include_str!("../../../prompts/extract_offers.md");
const EMBEDDED_EXTRACT_FOOD_ITEMS: &str = include_str!("../../../prompts/extract_food_items.md");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Offer discovery from page text
    ExtractOffers,
    /// Batched food item decomposition against the vocabulary
    ExtractFoodItems,
}

impl PromptId {
    pub const ALL: [PromptId; 2] = [Self::ExtractOffers, Self::ExtractFoodItems];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractOffers => "extract_offers",
            Self::ExtractFoodItems => "extract_food_items",
        }
    }

    /// Placeholders the pipeline fills when rendering this prompt
    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            Self::ExtractOffers => &["restaurant", "page_text"],
            Self::ExtractFoodItems => &["restaurant", "vocabulary", "offers"],
        }
    }

    fn file_name(&self) -> String {
        format!("{}.md", self.as_str())
    }

    fn embedded(&self) -> &'static str {
        match self {
            Self::ExtractOffers => EMBEDDED_EXTRACT_OFFERS,
            Self::ExtractFoodItems => EMBEDDED_EXTRACT_FOOD_ITEMS,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::InvalidData(format!("Unknown prompt: {}", s)))
    }
}

/// YAML header of a prompt file
#[derive(Debug, Clone, Deserialize)]
pub struct PromptHeader {
    pub id: String,
    pub version: u32,
    pub task_type: String,
}

/// Where a loaded prompt came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOrigin {
    Embedded,
    Override(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub id: PromptId,
    pub header: PromptHeader,
    pub body: String,
    pub origin: PromptOrigin,
}

impl Prompt {
    /// Split a prompt file into header and body. The header id must match `id`.
    pub fn parse(id: PromptId, text: &str, origin: PromptOrigin) -> Result<Self> {
        let rest = text
            .trim_start()
            .strip_prefix("---")
            .ok_or_else(|| Error::Config(format!("Prompt {} has no --- header", id)))?;
        let (header, body) = rest
            .split_once("\n---")
            .ok_or_else(|| Error::Config(format!("Prompt {} header is not closed", id)))?;

        let header: PromptHeader = serde_yaml::from_str(header)
            .map_err(|e| Error::Config(format!("Prompt {} header: {}", id, e)))?;
        if header.id != id.as_str() {
            return Err(Error::Config(format!(
                "Prompt file for {} declares id {}",
                id, header.id
            )));
        }

        Ok(Self {
            id,
            header,
            body: body.trim().to_string(),
            origin,
        })
    }

    pub fn is_override(&self) -> bool {
        matches!(self.origin, PromptOrigin::Override(_))
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut rest = self.body.as_str();
        while let Some((name, after)) = next_placeholder(rest) {
            if !names.contains(&name) {
                names.push(name);
            }
            rest = after;
        }
        names
    }

    /// Substitute `{{name}}` placeholders in one pass.
    ///
    /// Values are inserted verbatim, so page text that happens to contain
    /// braces is never expanded again. Unknown placeholders stay as written.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            match next_placeholder(tail) {
                Some((name, after)) if after.len() == tail.len() - name.len() - 4 => {
                    match vars.iter().find(|(key, _)| *key == name) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&tail[..name.len() + 4]),
                    }
                    rest = after;
                }
                _ => {
                    out.push_str("{{");
                    rest = &tail[2..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Find the next `{{name}}` where name is a plain identifier
fn next_placeholder(text: &str) -> Option<(&str, &str)> {
    let mut rest = text;
    loop {
        let open = rest.find("{{")?;
        let inner = &rest[open + 2..];
        let close = inner.find("}}")?;
        let name = &inner[..close];
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some((name, &inner[close + 2..]));
        }
        rest = &rest[open + 2..];
    }
}

/// Loads prompts once per id, preferring override files
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    loaded: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Overrides from the data dir
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            loaded: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            loaded: HashMap::new(),
        }
    }

    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            loaded: HashMap::new(),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Override file for `id`, if one exists
    pub fn override_file(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(id.file_name()))
            .filter(|path| path.is_file())
    }

    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.loaded.contains_key(&id) {
            let prompt = self.load(id)?;
            self.loaded.insert(id, prompt);
        }
        self.loaded
            .get(&id)
            .ok_or_else(|| Error::InvalidData(format!("Prompt {} missing after load", id)))
    }

    /// Every prompt, with the error for any override that fails to load
    pub fn load_all(&mut self) -> Vec<(PromptId, Result<Prompt>)> {
        PromptId::ALL
            .into_iter()
            .map(|id| (id, self.get(id).cloned()))
            .collect()
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        match self.override_file(id) {
            Some(path) => {
                let text = fs::read_to_string(&path)?;
                Prompt::parse(id, &text, PromptOrigin::Override(path))
            }
            None => Prompt::parse(id, id.embedded(), PromptOrigin::Embedded),
        }
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Where prompt overrides are looked up
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tilbod").join("prompts").join("overrides"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(body: &str) -> Prompt {
        Prompt::parse(
            PromptId::ExtractOffers,
            &format!("---\nid: extract_offers\nversion: 1\ntask_type: test\n---\n{}", body),
            PromptOrigin::Embedded,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_header_and_body() {
        let p = prompt("\n# System\nFinndu tilboðin.\n");
        assert_eq!(p.header.version, 1);
        assert_eq!(p.header.task_type, "test");
        assert_eq!(p.body, "# System\nFinndu tilboðin.");
        assert!(!p.is_override());
    }

    #[test]
    fn test_parse_rejects_bad_files() {
        let origin = PromptOrigin::Embedded;
        let id = PromptId::ExtractOffers;
        assert!(Prompt::parse(id, "no header", origin.clone()).is_err());
        assert!(Prompt::parse(id, "---\nid: extract_offers\n", origin.clone()).is_err());
        let wrong_id = "---\nid: extract_food_items\nversion: 1\ntask_type: x\n---\nbody";
        assert!(Prompt::parse(id, wrong_id, origin).is_err());
    }

    #[test]
    fn test_render_single_pass() {
        let p = prompt("Veitingastaður: {{restaurant}}\n{{page_text}}\n{{unknown}}");
        let rendered = p.render(&[
            ("restaurant", "Búllan"),
            ("page_text", "Tilboð {{restaurant}} {{ 2.990 kr"),
        ]);
        assert_eq!(
            rendered,
            "Veitingastaður: Búllan\nTilboð {{restaurant}} {{ 2.990 kr\n{{unknown}}"
        );
    }

    #[test]
    fn test_placeholders() {
        let p = prompt("{{a}} {{ b }} {{json: {}}} {{b_2}} {{a}}");
        assert_eq!(p.placeholders(), vec!["a", "b_2"]);
    }

    #[test]
    fn test_prompt_id_from_str() {
        for id in PromptId::ALL {
            assert_eq!(id.as_str().parse::<PromptId>().unwrap(), id);
        }
        assert!("summarize".parse::<PromptId>().is_err());
    }

    #[test]
    fn test_embedded_prompts_use_their_inputs() {
        let mut lib = PromptLibrary::embedded_only();
        for id in PromptId::ALL {
            let prompt = lib.get(id).unwrap();
            assert_eq!(prompt.origin, PromptOrigin::Embedded);
            let mut found = prompt.placeholders();
            let mut expected = id.inputs().to_vec();
            found.sort_unstable();
            expected.sort_unstable();
            assert_eq!(found, expected, "placeholders of {}", id);
        }
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extract_offers.md");
        std::fs::write(
            &path,
            "---\nid: extract_offers\nversion: 7\ntask_type: structured_extraction\n---\n# User\nOnly {{restaurant}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert_eq!(lib.override_file(PromptId::ExtractOffers), Some(path.clone()));
        assert_eq!(lib.override_file(PromptId::ExtractFoodItems), None);

        let prompt = lib.get(PromptId::ExtractOffers).unwrap();
        assert_eq!(prompt.origin, PromptOrigin::Override(path));
        assert_eq!(prompt.header.version, 7);
        assert!(prompt.render(&[("restaurant", "KFC")]).ends_with("Only KFC"));

        let food = lib.get(PromptId::ExtractFoodItems).unwrap();
        assert!(!food.is_override());
    }

    #[test]
    fn test_broken_override_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extract_food_items.md"), "just text").unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let all = lib.load_all();
        assert!(all[0].1.is_ok());
        assert!(all[1].1.is_err());
    }
}
