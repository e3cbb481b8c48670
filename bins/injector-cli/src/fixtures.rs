// Fixture loading for payload construction
// Layout: inputs/<stem>-1.txt, expected-outputs/<stem>-1.txt, source-code/<Source>

use anyhow::{Context, Result};
use injector_common::types::Language;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUTS_DIR: &str = "inputs";
pub const EXPECTED_OUTPUTS_DIR: &str = "expected-outputs";
pub const SOURCE_CODE_DIR: &str = "source-code";

/// Raw file contents for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub input: String,
    pub expected_output: String,
    pub source_code: String,
}

/// Fixtures for every supported language, read once at startup
#[derive(Debug, Clone)]
pub struct FixtureSet {
    fixtures: HashMap<Language, Fixture>,
}

impl FixtureSet {
    pub fn get(&self, language: Language) -> &Fixture {
        // load_all guarantees an entry for every language
        &self.fixtures[&language]
    }
}

pub fn input_path(root: &Path, language: Language) -> PathBuf {
    root.join(INPUTS_DIR)
        .join(format!("{}-1.txt", language.fixture_stem()))
}

pub fn expected_output_path(root: &Path, language: Language) -> PathBuf {
    root.join(EXPECTED_OUTPUTS_DIR)
        .join(format!("{}-1.txt", language.fixture_stem()))
}

pub fn source_code_path(root: &Path, language: Language) -> PathBuf {
    root.join(SOURCE_CODE_DIR).join(language.source_file())
}

fn read_fixture_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file {}", path.display()))
}

/// Load the fixture files for a single language
pub fn load(root: &Path, language: Language) -> Result<Fixture> {
    Ok(Fixture {
        input: read_fixture_file(&input_path(root, language))?,
        expected_output: read_fixture_file(&expected_output_path(root, language))?,
        source_code: read_fixture_file(&source_code_path(root, language))?,
    })
}

/// Load fixtures for all four languages; any unreadable file fails the whole set
pub fn load_all(root: &Path) -> Result<FixtureSet> {
    let mut fixtures = HashMap::new();
    for language in Language::ALL {
        let fixture = load(root, language)
            .with_context(|| format!("Failed to load {} fixtures", language))?;
        fixtures.insert(language, fixture);
    }
    Ok(FixtureSet { fixtures })
}
