use std::path::Path;

use serde::{Deserialize, Serialize};
use stiletto::{RoundEnvironment, SymbolTable, TypeElement};

use crate::StdError;

/// Declarations of one compilation, as read from an input file.
///
/// ```json
/// {
///   "types": [{ "name": "app.AppComponent", "kind": "interface" }],
///   "rounds": [["app.AppComponent"]]
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolUniverse {
    #[serde(default)]
    pub types: Vec<TypeElement>,
    /// Root elements of each round. A single round over every type when absent.
    #[serde(default)]
    pub rounds: Option<Vec<Vec<String>>>,
}

impl SymbolUniverse {
    pub fn parse(text: impl AsRef<str>) -> Result<Self, StdError> {
        Ok(serde_json::from_str(text.as_ref())?)
    }

    pub async fn parse_file(path: impl AsRef<Path>) -> Result<Self, StdError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| format!("Cannot read input {}: {err}", path.display()))?;
        Self::parse(text).map_err(|err| format!("Invalid input {}: {err}", path.display()).into())
    }

    pub fn symbol_table(&self) -> SymbolTable {
        self.types.iter().cloned().collect()
    }

    pub fn round_environments(&self) -> Vec<RoundEnvironment> {
        match &self.rounds {
            Some(rounds) => rounds
                .iter()
                .map(|v| RoundEnvironment::new(v.iter().cloned()))
                .collect(),
            None => vec![RoundEnvironment::new(
                self.types.iter().map(|v| v.name.erasure().to_owned()),
            )],
        }
    }
}
