use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Languages the compile service accepts a job for.
/// Wire form is the uppercase tag (`C`, `CPP`, `JAVA`, `PYTHON`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
}

impl Language {
    /// Canonical dispatch order
    pub const ALL: [Language; 4] = [Language::C, Language::Cpp, Language::Java, Language::Python];

    /// Stem shared by `inputs/<stem>-1.txt` and `expected-outputs/<stem>-1.txt`
    pub fn fixture_stem(&self) -> &'static str {
        match self {
            Language::C => "amShZWinsABet",
            Language::Cpp => "physEdOnline",
            Language::Java => "Watermelon",
            Language::Python => "makeEven",
        }
    }

    /// File name under `source-code/`
    pub fn source_file(&self) -> &'static str {
        match self {
            Language::C => "AmShZWinsABet.c",
            Language::Cpp => "PhysEdOnline.cpp",
            Language::Java => "Watermelon.java",
            Language::Python => "MakeEven.py",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Language::C => write!(f, "c"),
            Language::Cpp => write!(f, "cpp"),
            Language::Java => write!(f, "java"),
            Language::Python => write!(f, "python"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            _ => Err(format!(
                "unknown language '{}' (valid options: c, cpp, java, python)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub expected_output: String,
    pub input: String,
}

/// Job payload posted to `/api/compile/json`
///
/// Field names follow the compile service's JSON contract, including the
/// all-lowercase `sourcecode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub test_cases: BTreeMap<String, TestCase>,
    pub language: Language,
    pub memory_limit: u32,
    #[serde(rename = "sourcecode")]
    pub source_code: String,
    pub time_limit: u32,
}

/// Generate the test case key for a 1-based index
pub fn test_case_key(index: usize) -> String {
    format!("test{}", index)
}
